use crate::types::Phase;
use std::collections::BTreeMap;

/// Immutable table of the checklist substep names for each phase.
///
/// Built once at startup and handed to [`crate::progress::ProgressAggregator`]
/// by reference. Every phase is present, even if its list is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstepTemplate {
    phases: BTreeMap<Phase, Vec<String>>,
}

const DISCOVERY: &[&str] = &[
    "First Call",
    "Requirements Gathering Session PRD",
    "Project Kickoff Session",
];

const DESIGN: &[&str] = &[
    "Wireframes & User Flow",
    "UI Design & Prototypes",
    "Design Review & Approval",
];

const DEVELOPMENT: &[&str] = &[
    "Environment Setup",
    "Database Design",
    "Backend Development",
    "Frontend Development",
    "API Integration",
    "Third-party Integrations",
];

const TESTING: &[&str] = &[
    "Unit Testing",
    "Integration Testing",
    "User Acceptance Testing",
    "Bug Fixes & Optimization",
];

const LAUNCH: &[&str] = &[
    "Production Deployment",
    "Monitoring Setup",
    "Go Live",
    "Launch Support",
];

const SUPPORT: &[&str] = &[
    "Documentation & Handover",
    "User Training",
    "Ongoing Maintenance",
    "Performance Optimization",
];

impl SubstepTemplate {
    /// The agency's standard checklist (3 + 3 + 6 + 4 + 4 + 4 = 24 substeps).
    pub fn standard() -> Self {
        Self::from_lists(&[
            (Phase::Discovery, DISCOVERY),
            (Phase::Design, DESIGN),
            (Phase::Development, DEVELOPMENT),
            (Phase::Testing, TESTING),
            (Phase::Launch, LAUNCH),
            (Phase::Support, SUPPORT),
        ])
    }

    /// Build a template from explicit lists. Phases not mentioned get an empty list.
    pub fn from_lists(lists: &[(Phase, &[&str])]) -> Self {
        let mut phases: BTreeMap<Phase, Vec<String>> =
            Phase::all().iter().map(|p| (*p, Vec::new())).collect();
        for (phase, names) in lists {
            phases.insert(*phase, names.iter().map(|n| n.to_string()).collect());
        }
        Self { phases }
    }

    pub fn names(&self, phase: Phase) -> &[String] {
        self.phases.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, phase: Phase, name: &str) -> bool {
        self.names(phase).iter().any(|n| n == name)
    }

    /// Number of substeps across all phases.
    pub fn total(&self) -> usize {
        self.phases.values().map(Vec::len).sum()
    }

    /// First substep of a phase; used as the default `currentSubstep`.
    pub fn first(&self, phase: Phase) -> Option<&str> {
        self.names(phase).first().map(String::as_str)
    }
}

impl Default for SubstepTemplate {
    fn default() -> Self {
        Self::standard()
    }
}
