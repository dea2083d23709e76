use opensplit_domain::{BalanceError, OverflowError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerParseError {
    #[error("Syntax error at line {line}: {detail}")]
    SyntaxError { line: usize, detail: String },
    #[error("Group '{group}' has no MEMBERS declaration before line {line}")]
    MissingMembersDeclaration { group: String, line: usize },
    #[error("Group '{group}' declares MEMBERS again at line {line}")]
    DuplicateMembersDeclaration { group: String, line: usize },
    #[error("Member '{member}' is listed twice in MEMBERS (line {line})")]
    DuplicateMember { member: String, line: usize },
    #[error("Group '{name}' is declared twice (line {line})")]
    DuplicateGroup { name: String, line: usize },
    #[error("Invalid amount '{amount}' at line {line}")]
    InvalidAmount { amount: String, line: usize },
}

impl LedgerParseError {
    pub fn line(&self) -> usize {
        match self {
            Self::SyntaxError { line, .. }
            | Self::MissingMembersDeclaration { line, .. }
            | Self::DuplicateMembersDeclaration { line, .. }
            | Self::DuplicateMember { line, .. }
            | Self::DuplicateGroup { line, .. }
            | Self::InvalidAmount { line, .. } => *line,
        }
    }
}

/// Failure of a group debt query. Expense indexes are zero-based positions in
/// the group's expense list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DebtQueryError {
    #[error("Group '{0}' not found")]
    GroupNotFound(String),
    #[error("Expense #{} is paid by '{payer}', who is not a group member", .index + 1)]
    UnknownPayer { index: usize, payer: String },
    #[error("Expense #{} is shared with '{participant}', who is not a group member", .index + 1)]
    UnknownParticipant { index: usize, participant: String },
    #[error(transparent)]
    InvalidExpense(#[from] BalanceError),
    #[error(transparent)]
    Overflow(#[from] OverflowError),
}

impl DebtQueryError {
    pub fn expense_index(&self) -> Option<usize> {
        match self {
            Self::GroupNotFound(_) | Self::Overflow(_) => None,
            Self::UnknownPayer { index, .. } | Self::UnknownParticipant { index, .. } => {
                Some(*index)
            }
            Self::InvalidExpense(err) => Some(err.index),
        }
    }
}
