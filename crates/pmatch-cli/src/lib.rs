//! Library side of the `pmatch` review tool: logging setup and the review
//! workflow stages behind each subcommand.

pub mod logging;
pub mod workflow;
