//! Dashboard state, shell commands and the session that ties them to the
//! backend client
//!
//! The state holds the editable feature rows and the last scored results;
//! commands are what the interactive shell accepts.

pub mod command;
pub mod session;
pub mod state;

pub use command::{Command, CommandError, COMMANDS};
pub use session::{Outcome, Session};
pub use state::{DashboardState, StateError, DEFAULT_RANDOM_RANGE};
