//! Shared application service layer for the calculator front ends.
//!
//! [`Workbench`] ties a session controller to a persistence gateway and a
//! message dialog; [`ProcessPort`] runs the solver as a child process.

pub mod error;
pub mod process_port;
pub mod workbench;

pub use error::{AppError, AppResult};
pub use process_port::{ProcessPort, ProcessPortConfig};
pub use workbench::{EXPORT_UNAVAILABLE_TITLE, OK_LABEL, Workbench};
