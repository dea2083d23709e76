use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParticipantsError {
    #[error("participant list is empty")]
    Empty,
    #[error("participant '{0}' is listed more than once")]
    Duplicate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount {0} is negative")]
    Negative(Decimal),
    #[error("amount {0} is more precise than one cent")]
    SubCentPrecision(Decimal),
    #[error("amount {0} does not fit in the cent range")]
    OutOfRange(Decimal),
}

/// A running total left the `i64` cent range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverflowError {
    #[error("debt of '{debtor}' to '{creditor}' exceeds the cent range")]
    Debt { debtor: String, creditor: String },
    #[error("net position of '{0}' exceeds the cent range")]
    Position(String),
}

/// Why a single expense cannot be split.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseError {
    #[error("invalid participants: {0}")]
    InvalidParticipants(#[from] ParticipantsError),
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    #[error("overflow: {0}")]
    Overflow(#[from] OverflowError),
}

/// A balance computation aborted at the expense at `index` (zero-based).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expense #{} rejected: {source}", .index + 1)]
pub struct BalanceError {
    pub index: usize,
    pub source: ExpenseError,
}
