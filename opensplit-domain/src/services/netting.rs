use crate::{
    error::{BalanceError, ExpenseError},
    model::{DebtLedger, Expense, NetBalances},
    services::CostAllocator,
};
use std::{num::NonZeroUsize, panic, thread};

/// Turns a group's expenses into netted pairwise debts.
///
/// Aggregation may be spread over several workers; each worker folds a
/// contiguous chunk of expenses into a private ledger and the partial ledgers
/// are merged in chunk order, so the result does not depend on the worker
/// count. Cancellation always runs once, after aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NettingEngine {
    workers: NonZeroUsize,
}

impl NettingEngine {
    pub fn new() -> Self {
        Self {
            workers: NonZeroUsize::MIN,
        }
    }

    pub fn with_workers(workers: NonZeroUsize) -> Self {
        Self { workers }
    }

    /// Aggregate every expense and cancel mutual debts.
    ///
    /// A single malformed expense aborts the whole computation; the error
    /// names its position in `expenses`.
    pub fn compute_balances<'a>(
        &self,
        expenses: &[Expense<'a>],
    ) -> Result<NetBalances<'a>, BalanceError> {
        let ledger = self.aggregate(expenses)?;
        let ledger_entries = ledger.len();
        let balances = ledger.net();

        tracing::debug!(
            expense_count = expenses.len(),
            workers = self.workers.get(),
            ledger_entries,
            net_entries = balances.len(),
            "Computed net balances"
        );

        Ok(balances)
    }

    /// Fold every expense into a raw ledger without cancelling anything.
    pub fn aggregate<'a>(&self, expenses: &[Expense<'a>]) -> Result<DebtLedger<'a>, BalanceError> {
        let workers = self.workers.get().min(expenses.len());
        if workers <= 1 {
            return aggregate_chunk(expenses, 0);
        }

        let chunk_size = expenses.len().div_ceil(workers);
        let partials: Vec<Result<DebtLedger<'a>, BalanceError>> = thread::scope(|scope| {
            let handles: Vec<_> = expenses
                .chunks(chunk_size)
                .enumerate()
                .map(|(chunk_idx, chunk)| {
                    scope.spawn(move || aggregate_chunk(chunk, chunk_idx * chunk_size))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
                .collect()
        });

        // Chunk order keeps the first-seen pair order identical to a
        // sequential run. A failing chunk, or an overflow that only appears
        // once chunks are summed, is re-run sequentially so the reported
        // expense is the one a sequential fold would stop at.
        let mut ledger = DebtLedger::new();
        for partial in partials {
            let merged = partial.ok().map(|partial| ledger.merge(partial));
            if !matches!(merged, Some(Ok(()))) {
                tracing::debug!(workers, "Parallel aggregation failed, re-running sequentially");
                return aggregate_chunk(expenses, 0);
            }
        }
        Ok(ledger)
    }
}

impl Default for NettingEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn aggregate_chunk<'a>(
    expenses: &[Expense<'a>],
    offset: usize,
) -> Result<DebtLedger<'a>, BalanceError> {
    let allocator = CostAllocator;
    let mut ledger = DebtLedger::new();

    for (position, expense) in expenses.iter().enumerate() {
        let index = offset + position;
        fold_expense(&mut ledger, &allocator, index, expense).map_err(|source| {
            tracing::warn!(
                index,
                payer = %expense.payer,
                amount = %expense.amount,
                error = %source,
                "Rejected expense"
            );
            BalanceError { index, source }
        })?;
    }

    Ok(ledger)
}

fn fold_expense<'a>(
    ledger: &mut DebtLedger<'a>,
    allocator: &CostAllocator,
    index: usize,
    expense: &Expense<'a>,
) -> Result<(), ExpenseError> {
    let cents = expense.amount.to_cents()?;
    let shares = allocator.allocate(cents, &expense.participants)?;

    tracing::debug!(
        index,
        payer = %expense.payer,
        participant_count = shares.len(),
        total = %shares.total(),
        "Allocated expense"
    );
    ledger.record_shares(expense.payer, &shares)?;
    Ok(())
}

pub fn compute_balances<'a>(expenses: &[Expense<'a>]) -> Result<NetBalances<'a>, BalanceError> {
    NettingEngine::default().compute_balances(expenses)
}
