pub mod communication;
pub mod config;
pub mod deliverable;
pub mod error;
pub mod io;
pub mod milestone;
pub mod paths;
pub mod progress;
pub mod project;
pub mod query;
pub mod substep;
pub mod template;
pub mod types;

pub use error::{Result, StudioError};
