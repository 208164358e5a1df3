//! Route CLI - command line tools for the route editor.
//!
//! - replay_route: apply a recorded intent script and print the route

pub mod script;

pub use script::{load_script, parse_script, replay, ReplayOptions, ReplayReport};
