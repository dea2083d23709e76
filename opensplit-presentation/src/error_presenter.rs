use opensplit_application::{DebtQueryError, GroupRecord, LedgerParseError};

pub fn format_parse_error(error: &LedgerParseError) -> String {
    match error {
        LedgerParseError::SyntaxError { .. } => error.to_string(),
        LedgerParseError::MissingMembersDeclaration { group, line } => {
            format!("Group '{group}' needs a MEMBERS line before its first expense (line {line})")
        }
        LedgerParseError::DuplicateMembersDeclaration { group, line } => {
            format!("Group '{group}' already has a MEMBERS line (line {line})")
        }
        LedgerParseError::DuplicateMember { member, line } => {
            format!("Member '{member}' appears more than once in MEMBERS (line {line})")
        }
        LedgerParseError::DuplicateGroup { name, line } => {
            format!("Group '{name}' is declared more than once (line {line})")
        }
        LedgerParseError::InvalidAmount { amount, line } => {
            format!("'{amount}' is not a valid amount (line {line})")
        }
    }
}

/// Render a query failure, pointing at the ledger line of the offending
/// expense when `group` carries one.
pub fn format_query_error(error: &DebtQueryError, group: Option<&GroupRecord<'_>>) -> String {
    let message = match error {
        DebtQueryError::GroupNotFound(name) => return format!("Group '{name}' not found"),
        DebtQueryError::UnknownPayer { payer, .. } => {
            format!("'{payer}' paid for an expense but is not a member")
        }
        DebtQueryError::UnknownParticipant { participant, .. } => {
            format!("'{participant}' shares an expense but is not a member")
        }
        DebtQueryError::InvalidExpense(err) => format!("Invalid expense: {}", err.source),
        DebtQueryError::Overflow(err) => format!("Totals out of range: {err}"),
    };

    let line = error
        .expense_index()
        .and_then(|index| group?.expenses.get(index)?.line);
    match (line, error.expense_index()) {
        (Some(line), _) => format!("{message} (line {line})"),
        (None, Some(index)) => format!("{message} (expense #{})", index + 1),
        (None, None) => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opensplit_application::{ExpenseRecord, MemberRecord};
    use opensplit_domain::{
        AmountError, BalanceError, ExpenseError, Money, OverflowError, ParticipantId,
        ParticipantsError,
    };
    use rstest::{fixture, rstest};

    #[fixture]
    fn group() -> GroupRecord<'static> {
        let expense = |line| ExpenseRecord {
            line,
            description: None,
            amount: Money::new(100, 2),
            payer: ParticipantId("alice"),
            participants: vec![ParticipantId("bob")],
        };
        GroupRecord {
            name: "trip",
            members: vec![MemberRecord { id: ParticipantId("alice"), display_name: None }],
            expenses: vec![expense(Some(4)), expense(None)],
        }
    }

    #[rstest]
    #[case::payer_with_line(
        DebtQueryError::UnknownPayer { index: 0, payer: "dave".to_string() },
        "'dave' paid for an expense but is not a member (line 4)"
    )]
    #[case::participant_without_line(
        DebtQueryError::UnknownParticipant { index: 1, participant: "erin".to_string() },
        "'erin' shares an expense but is not a member (expense #2)"
    )]
    #[case::invalid_expense(
        DebtQueryError::InvalidExpense(BalanceError {
            index: 0,
            source: ExpenseError::InvalidParticipants(ParticipantsError::Empty),
        }),
        "Invalid expense: invalid participants: participant list is empty (line 4)"
    )]
    #[case::index_past_records(
        DebtQueryError::InvalidExpense(BalanceError {
            index: 7,
            source: ExpenseError::InvalidAmount(AmountError::Negative(
                rust_decimal::Decimal::new(-1, 0)
            )),
        }),
        "Invalid expense: invalid amount: amount -1 is negative (expense #8)"
    )]
    #[case::position_overflow(
        DebtQueryError::Overflow(OverflowError::Position("alice".to_string())),
        "Totals out of range: net position of 'alice' exceeds the cent range"
    )]
    #[case::group_not_found(
        DebtQueryError::GroupNotFound("office".to_string()),
        "Group 'office' not found"
    )]
    fn formats_query_errors(
        group: GroupRecord<'static>,
        #[case] error: DebtQueryError,
        #[case] expected: &str,
    ) {
        assert_eq!(format_query_error(&error, Some(&group)), expected);
    }

    #[test]
    fn query_error_without_group_uses_expense_number() {
        let error = DebtQueryError::UnknownPayer {
            index: 0,
            payer: "dave".to_string(),
        };
        assert_eq!(
            format_query_error(&error, None),
            "'dave' paid for an expense but is not a member (expense #1)"
        );
    }

    #[rstest]
    #[case::syntax(
        LedgerParseError::SyntaxError { line: 3, detail: "unparsed input '???'".to_string() },
        "Syntax error at line 3: unparsed input '???'"
    )]
    #[case::missing_members(
        LedgerParseError::MissingMembersDeclaration { group: "trip".to_string(), line: 2 },
        "Group 'trip' needs a MEMBERS line before its first expense (line 2)"
    )]
    #[case::duplicate_members(
        LedgerParseError::DuplicateMembersDeclaration { group: "default".to_string(), line: 5 },
        "Group 'default' already has a MEMBERS line (line 5)"
    )]
    #[case::duplicate_member(
        LedgerParseError::DuplicateMember { member: "alice".to_string(), line: 3 },
        "Member 'alice' appears more than once in MEMBERS (line 3)"
    )]
    #[case::duplicate_group(
        LedgerParseError::DuplicateGroup { name: "trip".to_string(), line: 9 },
        "Group 'trip' is declared more than once (line 9)"
    )]
    #[case::invalid_amount(
        LedgerParseError::InvalidAmount { amount: "1e99".to_string(), line: 1 },
        "'1e99' is not a valid amount (line 1)"
    )]
    fn formats_parse_errors(#[case] error: LedgerParseError, #[case] expected: &str) {
        assert_eq!(format_parse_error(&error), expected);
    }
}
