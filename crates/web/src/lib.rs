//! SauceQA dashboard
//!
//! A local axum server that shows framework status, lists HTML reports,
//! serves report and static files, and starts `sauceqa` runs in the
//! background.

pub mod page;
pub mod runs;
pub mod server;
pub mod static_files;

pub use runs::{RunRegistry, RunStatus, RunTicket, RunnerCommand};
pub use server::{router, serve, DashboardState};
