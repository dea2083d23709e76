use crate::{
    error::{AmountError, ExpenseError, ParticipantsError},
    model::{Cents, ParticipantId, Shares},
};
use fxhash::FxHashSet;

/// Even cost split service
pub struct CostAllocator;

impl CostAllocator {
    /// Split `amount` across `participants`
    ///
    /// Every participant owes `amount / n` cents. The first `amount % n`
    /// participants, in the order given, owe one extra cent each, so the
    /// shares always add back up to `amount`.
    ///
    /// # Errors
    /// * `InvalidAmount` - `amount` is negative
    /// * `InvalidParticipants` - `participants` is empty or repeats an identifier
    pub fn allocate<'a>(
        &self,
        amount: Cents,
        participants: &[ParticipantId<'a>],
    ) -> Result<Shares<'a>, ExpenseError> {
        if amount.is_negative() {
            return Err(AmountError::Negative(amount.as_decimal()).into());
        }
        if participants.is_empty() {
            return Err(ParticipantsError::Empty.into());
        }

        let mut seen = FxHashSet::default();
        for &participant in participants {
            if !seen.insert(participant) {
                return Err(ParticipantsError::Duplicate(participant.to_string()).into());
            }
        }

        let participant_count = participants.len() as i64;
        let base = amount.amount() / participant_count;
        let remainder = (amount.amount() % participant_count) as usize;

        Ok(participants
            .iter()
            .enumerate()
            .map(|(idx, &participant)| {
                let mut share = base;
                if idx < remainder {
                    share += 1;
                }
                (participant, Cents::from_i64(share))
            })
            .collect())
    }
}

pub fn allocate<'a>(
    amount: Cents,
    participants: &[ParticipantId<'a>],
) -> Result<Shares<'a>, ExpenseError> {
    CostAllocator.allocate(amount, participants)
}
