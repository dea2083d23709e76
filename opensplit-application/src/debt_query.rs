use crate::{
    error::DebtQueryError,
    model::{DebtSummary, GroupRecord, PersonBalance},
    ports::GroupRepository,
};
use opensplit_domain::{Cents, Expense, NettingEngine};

/// Answers "who owes whom" for the groups held by a repository.
#[derive(Clone, Copy)]
pub struct DebtQuery<'a> {
    repository: &'a dyn GroupRepository,
    engine: NettingEngine,
}

impl<'a> DebtQuery<'a> {
    pub fn new(repository: &'a dyn GroupRepository, engine: NettingEngine) -> Self {
        Self { repository, engine }
    }

    pub fn group_names(&self) -> Vec<&'a str> {
        self.repository.group_names()
    }

    pub fn debts_for_group(&self, name: &str) -> Result<DebtSummary<'a>, DebtQueryError> {
        let Some(group) = self.repository.load_group(name) else {
            tracing::warn!(group = name, "Unknown group requested");
            return Err(DebtQueryError::GroupNotFound(name.to_string()));
        };
        self.summarize(&group)
    }

    /// Validate membership, split every expense and net the resulting debts.
    ///
    /// When several expenses are wrong, the error names the earliest one.
    pub fn summarize<'b>(&self, group: &GroupRecord<'b>) -> Result<DebtSummary<'b>, DebtQueryError> {
        let membership = check_membership(group);
        let expenses: Vec<Expense<'b>> =
            group.expenses.iter().map(|record| record.to_expense()).collect();

        let balances = match (self.engine.compute_balances(&expenses), membership) {
            (Err(err), Err(membership_err))
                if membership_err
                    .expense_index()
                    .is_some_and(|index| err.index < index) =>
            {
                return Err(err.into());
            }
            (_, Err(membership_err)) => return Err(membership_err),
            (Err(err), Ok(())) => return Err(err.into()),
            (Ok(balances), Ok(())) => balances,
        };

        let net = balances.net_positions()?;
        let positions = group
            .members
            .iter()
            .map(|member| PersonBalance {
                id: member.id,
                balance: net.get(&member.id).copied().unwrap_or(Cents::ZERO),
            })
            .collect();

        tracing::info!(
            group = group.name,
            members = group.members.len(),
            expenses = expenses.len(),
            debts = balances.len(),
            "Summarized group debts"
        );

        Ok(DebtSummary {
            group: group.name,
            balances,
            positions,
        })
    }
}

fn check_membership(group: &GroupRecord<'_>) -> Result<(), DebtQueryError> {
    for (index, expense) in group.expenses.iter().enumerate() {
        if !group.is_member(expense.payer) {
            return Err(DebtQueryError::UnknownPayer {
                index,
                payer: expense.payer.to_string(),
            });
        }
        if let Some(participant) = expense
            .participants
            .iter()
            .find(|participant| !group.is_member(**participant))
        {
            return Err(DebtQueryError::UnknownParticipant {
                index,
                participant: participant.to_string(),
            });
        }
    }
    Ok(())
}
