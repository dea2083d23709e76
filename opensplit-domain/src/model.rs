use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
    str::FromStr,
};

use crate::error::{AmountError, OverflowError};

/// Decimal places of one minor unit.
pub const MINOR_UNIT_SCALE: u32 = 2;

pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Debtor -> (creditor -> cents), in first-seen order.
pub type DebtsByDebtor<'a> = FxIndexMap<ParticipantId<'a>, FxIndexMap<ParticipantId<'a>, Cents>>;

/// Opaque participant identifier borrowed from the caller's records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId<'a>(pub &'a str);

impl<'a> ParticipantId<'a> {
    pub fn as_str(self) -> &'a str {
        self.0
    }
}

impl<'a> From<&'a str> for ParticipantId<'a> {
    fn from(value: &'a str) -> Self {
        Self(value)
    }
}

impl fmt::Display for ParticipantId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Decimal currency amount as supplied by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Converts to integer cents, rejecting negative values and anything
    /// that would lose a fraction of a cent.
    pub fn to_cents(self) -> Result<Cents, AmountError> {
        if self.0 < Decimal::ZERO {
            return Err(AmountError::Negative(self.0));
        }
        let units = self
            .0
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(AmountError::OutOfRange(self.0))?;
        if !units.fract().is_zero() {
            return Err(AmountError::SubCentPrecision(self.0));
        }
        units
            .to_i64()
            .map(Cents::from_i64)
            .ok_or(AmountError::OutOfRange(self.0))
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer amount of minor currency units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Self = Self(0);

    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn amount(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn as_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

impl Add for Cents {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Cents {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Cents {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Cents> for Cents {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// One recorded expense: `payer` covered `amount` on behalf of `participants`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense<'a> {
    pub amount: Money,
    pub payer: ParticipantId<'a>,
    pub participants: Vec<ParticipantId<'a>>,
}

impl<'a> Expense<'a> {
    pub fn new<I>(amount: Money, payer: ParticipantId<'a>, participants: I) -> Self
    where
        I: IntoIterator<Item = ParticipantId<'a>>,
    {
        Self {
            amount,
            payer,
            participants: participants.into_iter().collect(),
        }
    }
}

/// Per-participant cost of a single expense, in participant order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Shares<'a> {
    shares: FxIndexMap<ParticipantId<'a>, Cents>,
}

impl<'a> Shares<'a> {
    pub fn get(&self, participant: ParticipantId<'_>) -> Option<Cents> {
        self.shares.get(&participant).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId<'a>, Cents)> + '_ {
        self.shares.iter().map(|(id, cents)| (*id, *cents))
    }

    pub fn total(&self) -> Cents {
        self.shares.values().sum()
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

impl<'a> FromIterator<(ParticipantId<'a>, Cents)> for Shares<'a> {
    fn from_iter<I: IntoIterator<Item = (ParticipantId<'a>, Cents)>>(iter: I) -> Self {
        Self {
            shares: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Debt<'a> {
    pub debtor: ParticipantId<'a>,
    pub creditor: ParticipantId<'a>,
    pub amount: Cents,
}

/// Raw who-owes-whom aggregate, before mutual debts are cancelled.
///
/// Keys are `(debtor, creditor)`; a missing key means nothing is owed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebtLedger<'a> {
    debts: FxIndexMap<(ParticipantId<'a>, ParticipantId<'a>), Cents>,
}

impl<'a> DebtLedger<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_debts<I>(debts: I) -> Result<Self, OverflowError>
    where
        I: IntoIterator<Item = Debt<'a>>,
    {
        let mut ledger = Self::new();
        for debt in debts {
            ledger.record(debt.debtor, debt.creditor, debt.amount)?;
        }
        Ok(ledger)
    }

    /// Adds `amount` to what `debtor` owes `creditor`. Self-debts and zero
    /// amounts leave the ledger untouched; on overflow the entry keeps its
    /// previous value.
    pub fn record(
        &mut self,
        debtor: ParticipantId<'a>,
        creditor: ParticipantId<'a>,
        amount: Cents,
    ) -> Result<(), OverflowError> {
        debug_assert!(!amount.is_negative());
        if debtor == creditor || amount.is_zero() {
            return Ok(());
        }
        let entry = self.debts.entry((debtor, creditor)).or_insert(Cents::ZERO);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| OverflowError::Debt {
                debtor: debtor.to_string(),
                creditor: creditor.to_string(),
            })?;
        Ok(())
    }

    /// Folds one expense's shares in: every participant other than `payer` owes `payer`.
    pub fn record_shares(
        &mut self,
        payer: ParticipantId<'a>,
        shares: &Shares<'a>,
    ) -> Result<(), OverflowError> {
        shares
            .iter()
            .try_for_each(|(participant, share)| self.record(participant, payer, share))
    }

    pub fn owed(&self, debtor: ParticipantId<'_>, creditor: ParticipantId<'_>) -> Cents {
        self.debts
            .get(&(debtor, creditor))
            .copied()
            .unwrap_or(Cents::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = Debt<'a>> + '_ {
        self.debts.iter().map(|(&(debtor, creditor), &amount)| Debt {
            debtor,
            creditor,
            amount,
        })
    }

    pub fn len(&self) -> usize {
        self.debts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty()
    }

    /// Sums another ledger into this one. Pairs new to `self` are appended in
    /// `other`'s order.
    pub fn merge(&mut self, other: DebtLedger<'a>) -> Result<(), OverflowError> {
        other
            .debts
            .into_iter()
            .try_for_each(|((debtor, creditor), amount)| self.record(debtor, creditor, amount))
    }

    /// Collapses every mutual pair into a single net direction.
    ///
    /// Each unordered pair is reduced once: after the first visit one side is
    /// zero, so the reverse visit finds nothing left to cancel.
    pub fn net(mut self) -> NetBalances<'a> {
        for idx in 0..self.debts.len() {
            let Some((&(debtor, creditor), &amount)) = self.debts.get_index(idx) else {
                continue;
            };
            if !amount.is_positive() {
                continue;
            }
            let Some(reverse_idx) = self.debts.get_index_of(&(creditor, debtor)) else {
                continue;
            };
            let reverse = self.debts[reverse_idx];
            if !reverse.is_positive() {
                continue;
            }

            let diff = amount.min(reverse);
            self.debts[idx] -= diff;
            self.debts[reverse_idx] -= diff;
            tracing::debug!(
                debtor = %debtor,
                creditor = %creditor,
                cancelled = %diff,
                "Cancelled mutual debt"
            );
        }

        self.debts.retain(|_, amount| !amount.is_zero());
        NetBalances { debts: self.debts }
    }
}

/// Netted debts: never both `(a, b)` and `(b, a)`, never a zero amount.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetBalances<'a> {
    debts: FxIndexMap<(ParticipantId<'a>, ParticipantId<'a>), Cents>,
}

impl<'a> NetBalances<'a> {
    pub fn get(&self, debtor: ParticipantId<'_>, creditor: ParticipantId<'_>) -> Option<Cents> {
        self.debts.get(&(debtor, creditor)).copied()
    }

    pub fn owed(&self, debtor: ParticipantId<'_>, creditor: ParticipantId<'_>) -> Cents {
        self.get(debtor, creditor).unwrap_or(Cents::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = Debt<'a>> + '_ {
        self.debts.iter().map(|(&(debtor, creditor), &amount)| Debt {
            debtor,
            creditor,
            amount,
        })
    }

    pub fn len(&self) -> usize {
        self.debts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty()
    }

    pub fn by_debtor(&self) -> DebtsByDebtor<'a> {
        let mut grouped = DebtsByDebtor::default();
        for debt in self.iter() {
            grouped
                .entry(debt.debtor)
                .or_default()
                .insert(debt.creditor, debt.amount);
        }
        grouped
    }

    /// Net position per participant: positive when owed money, negative when
    /// owing. Positions always sum to zero.
    pub fn net_positions(&self) -> Result<FxIndexMap<ParticipantId<'a>, Cents>, OverflowError> {
        let overflow = |id: ParticipantId<'_>| OverflowError::Position(id.to_string());
        let mut positions: FxIndexMap<ParticipantId<'a>, Cents> = FxIndexMap::default();
        for debt in self.iter() {
            let owing = positions.entry(debt.debtor).or_insert(Cents::ZERO);
            *owing = owing
                .checked_sub(debt.amount)
                .ok_or_else(|| overflow(debt.debtor))?;
            let owed = positions.entry(debt.creditor).or_insert(Cents::ZERO);
            *owed = owed
                .checked_add(debt.amount)
                .ok_or_else(|| overflow(debt.creditor))?;
        }
        Ok(positions)
    }
}

impl<'a> From<NetBalances<'a>> for DebtLedger<'a> {
    fn from(balances: NetBalances<'a>) -> Self {
        Self {
            debts: balances.debts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const A: ParticipantId<'static> = ParticipantId("a");
    const B: ParticipantId<'static> = ParticipantId("b");
    const C: ParticipantId<'static> = ParticipantId("c");

    fn debt(
        debtor: ParticipantId<'static>,
        creditor: ParticipantId<'static>,
        cents: i64,
    ) -> Debt<'static> {
        Debt {
            debtor,
            creditor,
            amount: Cents::from_i64(cents),
        }
    }

    fn ledger(debts: Vec<Debt<'static>>) -> DebtLedger<'static> {
        DebtLedger::from_debts(debts).expect("debts within cent range")
    }

    #[rstest]
    #[case::whole(Money::new(30, 0), 3000)]
    #[case::two_places(Money::new(1234, 2), 1234)]
    #[case::one_place(Money::new(45, 1), 450)]
    #[case::trailing_zeros(Money::new(10000, 3), 1000)]
    #[case::zero(Money::ZERO, 0)]
    fn converts_money_to_cents(#[case] money: Money, #[case] expected: i64) {
        assert_eq!(money.to_cents(), Ok(Cents::from_i64(expected)));
    }

    #[rstest]
    #[case::sub_cent(Money::new(30005, 3), AmountError::SubCentPrecision(Decimal::new(30005, 3)))]
    #[case::negative(Money::new(-100, 2), AmountError::Negative(Decimal::new(-100, 2)))]
    #[case::too_large(
        Money::from_decimal(Decimal::MAX),
        AmountError::OutOfRange(Decimal::MAX)
    )]
    fn rejects_unrepresentable_money(#[case] money: Money, #[case] expected: AmountError) {
        assert_eq!(money.to_cents(), Err(expected));
    }

    #[rstest]
    #[case::whole(1500, "15.00")]
    #[case::small(5, "0.05")]
    #[case::negative(-250, "-2.50")]
    fn cents_display_as_decimal(#[case] cents: i64, #[case] expected: &str) {
        assert_eq!(Cents::from_i64(cents).to_string(), expected);
    }

    #[test]
    fn money_parses_from_str() {
        assert_eq!("30.00".parse::<Money>().ok(), Some(Money::new(3000, 2)));
        assert!("thirty".parse::<Money>().is_err());
    }

    #[test]
    fn ledger_ignores_self_debt_and_zero() {
        let mut ledger = DebtLedger::new();
        ledger.record(A, A, Cents::from_i64(100)).expect("in range");
        ledger.record(B, A, Cents::ZERO).expect("in range");
        assert!(ledger.is_empty());
    }

    #[test]
    fn ledger_accumulates_and_reports_absent_as_zero() {
        let mut ledger = DebtLedger::new();
        ledger.record(B, A, Cents::from_i64(500)).expect("in range");
        ledger.record(B, A, Cents::from_i64(250)).expect("in range");

        assert_eq!(ledger.owed(B, A), Cents::from_i64(750));
        assert_eq!(ledger.owed(A, B), Cents::ZERO);
        assert_eq!(ledger.len(), 1);
    }

    #[rstest]
    #[case::mutual_pair(
        vec![debt(B, A, 500), debt(A, B, 200)],
        vec![debt(B, A, 300)]
    )]
    #[case::exact_cancel(
        vec![debt(B, A, 500), debt(A, B, 500)],
        vec![]
    )]
    #[case::one_way(
        vec![debt(B, A, 500), debt(C, A, 200)],
        vec![debt(B, A, 500), debt(C, A, 200)]
    )]
    #[case::cycle_is_not_transitive(
        vec![debt(A, B, 100), debt(B, C, 100), debt(C, A, 100)],
        vec![debt(A, B, 100), debt(B, C, 100), debt(C, A, 100)]
    )]
    #[case::reverse_larger(
        vec![debt(A, B, 100), debt(C, B, 40), debt(B, A, 700)],
        vec![debt(C, B, 40), debt(B, A, 600)]
    )]
    fn net_cancels_mutual_pairs(#[case] debts: Vec<Debt<'static>>, #[case] expected: Vec<Debt<'static>>) {
        let balances = ledger(debts).net();
        assert_eq!(balances.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn netting_twice_changes_nothing() {
        let once = ledger(vec![debt(B, A, 500), debt(A, B, 200), debt(C, B, 70)]).net();
        let twice = DebtLedger::from(once.clone()).net();
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_sums_overlapping_pairs() {
        let mut left = ledger(vec![debt(B, A, 100)]);
        let right = ledger(vec![debt(B, A, 50), debt(C, A, 10)]);
        left.merge(right).expect("in range");

        assert_eq!(
            left.iter().collect::<Vec<_>>(),
            vec![debt(B, A, 150), debt(C, A, 10)]
        );
    }

    #[test]
    fn groups_by_debtor_and_sums_positions() {
        let balances = ledger(vec![debt(B, A, 300), debt(B, C, 100), debt(C, A, 50)]).net();

        let grouped = balances.by_debtor();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&B][&A], Cents::from_i64(300));
        assert_eq!(grouped[&B][&C], Cents::from_i64(100));
        assert_eq!(grouped[&C][&A], Cents::from_i64(50));

        let positions = balances.net_positions().expect("in range");
        assert_eq!(positions[&A], Cents::from_i64(350));
        assert_eq!(positions[&B], Cents::from_i64(-400));
        assert_eq!(positions[&C], Cents::from_i64(50));
        assert_eq!(positions.values().sum::<Cents>(), Cents::ZERO);
    }

    #[test]
    fn overflowing_record_is_rejected_and_keeps_entry() {
        let mut ledger = ledger(vec![debt(B, A, i64::MAX - 1)]);

        assert_eq!(
            ledger.record(B, A, Cents::from_i64(2)),
            Err(OverflowError::Debt {
                debtor: "b".to_string(),
                creditor: "a".to_string(),
            })
        );
        assert_eq!(ledger.owed(B, A), Cents::from_i64(i64::MAX - 1));
    }

    #[test]
    fn overflowing_merge_is_rejected() {
        let mut left = ledger(vec![debt(B, A, i64::MAX)]);
        let right = ledger(vec![debt(B, A, 1)]);

        assert!(matches!(left.merge(right), Err(OverflowError::Debt { .. })));
    }

    #[rstest]
    #[case::creditor(
        vec![debt(B, A, i64::MAX), debt(C, A, 1)],
        OverflowError::Position("a".to_string())
    )]
    #[case::debtor(
        vec![debt(A, B, i64::MAX), debt(A, C, 2)],
        OverflowError::Position("a".to_string())
    )]
    fn overflowing_positions_are_rejected(
        #[case] debts: Vec<Debt<'static>>,
        #[case] expected: OverflowError,
    ) {
        let balances = ledger(debts).net();
        assert_eq!(balances.net_positions(), Err(expected));
    }
}
