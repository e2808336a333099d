#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn studio(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("studio").unwrap();
    cmd.current_dir(dir.path()).env("STUDIO_ROOT", dir.path());
    cmd
}

fn init(dir: &TempDir) {
    studio(dir)
        .args(["init", "--name", "Pixel & Co"])
        .assert()
        .success();
}

fn json_out(cmd: &mut Command) -> Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

fn create_project(dir: &TempDir, name: &str, owner: &str) -> String {
    let v = json_out(studio(dir).args(["--json", "project", "create", name, "--owner", owner]));
    v["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// studio init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_directory_tree() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    assert!(dir.path().join(".studio").is_dir());
    assert!(dir.path().join(".studio/projects").is_dir());
    let cfg = std::fs::read_to_string(dir.path().join(".studio/config.yaml")).unwrap();
    let cfg: serde_yaml::Value = serde_yaml::from_str(&cfg).unwrap();
    assert_eq!(cfg["agency"]["name"].as_str(), Some("Pixel & Co"));
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    studio(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:"));
}

// ---------------------------------------------------------------------------
// studio project
// ---------------------------------------------------------------------------

#[test]
fn project_create_requires_init() {
    let dir = TempDir::new().unwrap();
    studio(&dir)
        .args(["project", "create", "Site", "--owner", "u1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn project_create_applies_defaults() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let v = json_out(studio(&dir).args([
        "--json", "project", "create", "Acme", "Storefront", "--owner", "u1",
    ]));

    assert_eq!(v["name"], "Acme Storefront");
    assert_eq!(v["ownerId"], "u1");
    assert_eq!(v["status"], "planning");
    assert_eq!(v["currentPhase"], "discovery");
    assert_eq!(v["currentSubstep"], "First Call");
    assert_eq!(v["lastUpdatedBy"], "cli");
    assert_eq!(v["progress"]["overall"], 0);
}

#[test]
fn project_create_rejects_bad_phase() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    studio(&dir)
        .args(["project", "create", "Acme", "--owner", "u1", "--phase", "qa"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("currentPhase"));
}

#[test]
fn project_list_filters_by_owner() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    create_project(&dir, "Alpha", "u1");
    create_project(&dir, "Beta", "u2");

    let v = json_out(studio(&dir).args(["--json", "project", "list", "--owner", "u2"]));
    assert_eq!(v["pagination"]["total"], 1);
    assert_eq!(v["projects"][0]["name"], "Beta");

    studio(&dir)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alpha").and(predicate::str::contains("Beta")));
}

#[test]
fn project_phase_moves_pointer_only() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let id = create_project(&dir, "Alpha", "u1");

    let v = json_out(studio(&dir).args([
        "--json", "project", "phase", id.as_str(), "design", "--notes", "wireframes signed off",
    ]));
    assert_eq!(v["currentPhase"], "design");
    assert_eq!(v["currentSubstep"], "Wireframes & User Flow");
    assert_eq!(v["adminNotes"], "wireframes signed off");
    assert_eq!(v["progress"]["phases"]["discovery"], 0);
}

#[test]
fn project_delete_then_info_fails() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let id = create_project(&dir, "Alpha", "u1");

    studio(&dir).args(["project", "delete", id.as_str()]).assert().success();
    studio(&dir)
        .args(["project", "info", id.as_str()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn project_stats_counts_projects() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    create_project(&dir, "Alpha", "u1");
    create_project(&dir, "Beta", "u1");

    let v = json_out(studio(&dir).args(["--json", "project", "stats"]));
    assert_eq!(v["totalProjects"], 2);
    assert_eq!(v["statusCounts"]["planning"], 2);
    assert_eq!(v["phaseCounts"]["discovery"], 2);
}

// ---------------------------------------------------------------------------
// studio substep / milestone
// ---------------------------------------------------------------------------

#[test]
fn substep_toggle_updates_progress() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let id = create_project(&dir, "Alpha", "u1");

    let v = json_out(studio(&dir).args([
        "--json", "substep", "toggle", id.as_str(), "discovery", "First", "Call",
    ]));
    assert_eq!(v["toggled"], true);
    assert_eq!(v["completed"], true);
    assert_eq!(v["progress"]["phases"]["discovery"], 33);
    assert_eq!(v["progress"]["overall"], 4);

    let info = json_out(studio(&dir).args(["--json", "project", "info", id.as_str()]));
    assert_eq!(info["progress"]["phases"]["discovery"], 33);
}

#[test]
fn substep_toggle_unknown_name_is_noop() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let id = create_project(&dir, "Alpha", "u1");

    let v = json_out(studio(&dir).args([
        "--json", "substep", "toggle", id.as_str(), "discovery", "Nope",
    ]));
    assert_eq!(v["toggled"], false);
    assert_eq!(v["reason"], "unknown_substep");
}

#[test]
fn milestone_add_and_complete() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let v = json_out(studio(&dir).args([
        "--json", "project", "create", "Alpha", "--owner", "u1", "--scheme", "milestones",
    ]));
    let id = v["id"].as_str().unwrap().to_string();

    let added = json_out(studio(&dir).args([
        "--json", "milestone", "add", id.as_str(), "Kickoff", "--phase", "discovery",
    ]));
    let mid = added["milestone"]["id"].as_str().unwrap().to_string();
    assert_eq!(added["progress"]["overall"], 0);

    json_out(studio(&dir).args([
        "--json", "milestone", "add", id.as_str(), "Sitemap", "--phase", "design", "--status", "completed",
    ]));
    let updated = json_out(studio(&dir).args([
        "--json", "milestone", "update", id.as_str(), mid.as_str(), "--status", "completed",
    ]));
    assert!(updated["milestone"]["completedDate"].is_string());
    assert_eq!(updated["progress"]["overall"], 100);

    studio(&dir)
        .args(["milestone", "list", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2/2 completed"));
}

#[test]
fn milestone_remove_missing_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let id = create_project(&dir, "Alpha", "u1");

    let v = json_out(studio(&dir).args(["--json", "milestone", "remove", id.as_str(), "ghost"]));
    assert_eq!(v["removed"], false);
}

#[test]
fn milestone_add_rejects_bad_weight() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let id = create_project(&dir, "Alpha", "u1");

    studio(&dir)
        .args(["milestone", "add", id.as_str(), "Kickoff", "--phase", "discovery", "--weight", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("weight"));
}
