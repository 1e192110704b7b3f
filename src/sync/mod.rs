//! Directory/spreadsheet reconciliation.
//!
//! Bidirectional synchronization between the ads table and the Google Sheet,
//! triggered on demand by an authenticated admin action. [`schema`] defines
//! the sheet column contract; [`reconciler`] implements the push and pull
//! operations over it.

pub mod reconciler;
pub mod schema;

pub use reconciler::{PullOutcome, PushOutcome, Reconciler, RowSkip, SyncError};
