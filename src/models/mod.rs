pub mod transaction;
pub mod notification;

pub use transaction::{TransactionSummary, UNKNOWN_TRANSACTION_TYPE};
pub use notification::{Notification, redact_address, solscan_url};
