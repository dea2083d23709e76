#![warn(clippy::uninlined_format_args)]

pub mod debt_query;
pub mod error;
pub mod model;
pub mod ports;

pub use debt_query::DebtQuery;
pub use error::{DebtQueryError, LedgerParseError};
pub use model::{DebtSummary, ExpenseRecord, GroupRecord, Ledger, MemberRecord, PersonBalance};
pub use ports::{GroupRepository, LedgerParser, MemberDirectory};
