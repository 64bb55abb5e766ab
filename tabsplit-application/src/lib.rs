#![warn(clippy::uninlined_format_args)]

pub mod action;
pub mod document;
pub mod error;
pub mod history;
pub mod ports;

pub use action::Action;
pub use document::{parse_action, parse_bill, serialize_action, serialize_bill};
pub use error::{ActionError, DocumentError, ReferenceError};
pub use history::{BillHistory, DispatchOutcome, DEFAULT_HISTORY_DEPTH};
pub use ports::{Clock, SystemClock};
