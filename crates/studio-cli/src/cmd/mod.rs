pub mod init;
pub mod milestone;
pub mod project;
pub mod serve;
pub mod substep;

/// Recorded as `lastUpdatedBy` for changes made from the command line.
pub const CLI_ACTOR: &str = "cli";
