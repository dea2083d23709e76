use opensplit_domain::{Cents, Expense, Money, NetBalances, ParticipantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRecord<'a> {
    pub id: ParticipantId<'a>,
    pub display_name: Option<&'a str>,
}

/// An expense as handed over by the persistence side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRecord<'a> {
    /// Source line, when the record came from a ledger file.
    pub line: Option<usize>,
    pub description: Option<&'a str>,
    pub amount: Money,
    pub payer: ParticipantId<'a>,
    pub participants: Vec<ParticipantId<'a>>,
}

impl<'a> ExpenseRecord<'a> {
    pub fn to_expense(&self) -> Expense<'a> {
        Expense::new(self.amount, self.payer, self.participants.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord<'a> {
    pub name: &'a str,
    pub members: Vec<MemberRecord<'a>>,
    pub expenses: Vec<ExpenseRecord<'a>>,
}

impl<'a> GroupRecord<'a> {
    pub fn member(&self, id: ParticipantId<'_>) -> Option<&MemberRecord<'a>> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn is_member(&self, id: ParticipantId<'_>) -> bool {
        self.member(id).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ledger<'a> {
    pub groups: Vec<GroupRecord<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonBalance<'a> {
    pub id: ParticipantId<'a>,
    /// Positive when the member is owed money.
    pub balance: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtSummary<'a> {
    pub group: &'a str,
    pub balances: NetBalances<'a>,
    /// One entry per group member, in roster order.
    pub positions: Vec<PersonBalance<'a>>,
}
