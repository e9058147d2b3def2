//! Shared dataset/model readiness and its reconciliation with `/status`.

mod coordinator;
mod state;

pub use coordinator::{RefreshOutcome, RefreshTicket, SessionCoordinator, TicketSource};
pub use state::{DatasetInfo, Readiness, SessionState};
