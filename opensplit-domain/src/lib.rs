#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod services;

pub use error::{AmountError, BalanceError, ExpenseError, OverflowError, ParticipantsError};
pub use model::{
    Cents, Debt, DebtLedger, DebtsByDebtor, Expense, FxIndexMap, MINOR_UNIT_SCALE, Money,
    NetBalances, ParticipantId, Shares,
};
pub use services::{CostAllocator, NettingEngine, allocate, compute_balances};
