#![warn(clippy::uninlined_format_args)]

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_till, take_until, take_while1},
    character::complete::{char, digit1, space1},
    combinator::{eof, opt, recognize},
    multi::{many0, separated_list1},
    sequence::delimited,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member<'a> {
    pub id: &'a str,
    pub display_name: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense<'a> {
    pub payer: &'a str,
    /// Amount exactly as written; conversion to money happens downstream.
    pub amount: &'a str,
    pub participants: Vec<&'a str>,
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'a> {
    Group(&'a str),
    Members(Vec<Member<'a>>),
    Expense(Expense<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementWithLine<'a> {
    pub line: usize,
    pub statement: Statement<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ledger<'a> {
    pub statements: Vec<StatementWithLine<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Syntax error at line {line}: {detail}")]
    SyntaxError { line: usize, detail: String },
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '@'))(input)
}

fn sp(input: &str) -> IResult<&str, &str> {
    fn comment(input: &str) -> IResult<&str, &str> {
        delimited(tag("/*"), take_until("*/"), tag("*/")).parse(input)
    }

    fn line_comment(input: &str) -> IResult<&str, &str> {
        recognize((tag("//"), take_till(|c| c == '\n'))).parse(input)
    }

    recognize(many0(alt((space1, comment, line_comment)))).parse(input)
}

fn list_separator(input: &str) -> IResult<&str, char> {
    (sp, char(','), sp).map(|(_, comma, _)| comma).parse(input)
}

fn display_name(input: &str) -> IResult<&str, Option<&str>> {
    delimited(char('('), take_till(|c| c == ')'), char(')'))
        .map(|name: &str| Some(name.trim()).filter(|name| !name.is_empty()))
        .parse(input)
}

fn member(input: &str) -> IResult<&str, Member<'_>> {
    (identifier, opt((sp, display_name)))
        .map(|(id, name)| Member {
            id,
            display_name: name.and_then(|(_, name)| name),
        })
        .parse(input)
}

// GROUP weekend-trip
// Must fill the line, so `GROUP paid 3 for bob` is left to `expense`.
fn group_declaration(input: &str) -> IResult<&str, &str> {
    (tag("GROUP"), space1, sp, identifier, sp, eof)
        .map(|(_, _, _, name, _, _)| name)
        .parse(input)
}

// MEMBERS := alice (Alice Liddell), bob
fn members_declaration(input: &str) -> IResult<&str, Vec<Member<'_>>> {
    (
        tag("MEMBERS"),
        sp,
        tag(":="),
        sp,
        separated_list1(list_separator, member),
    )
        .map(|(_, _, _, _, members)| members)
        .parse(input)
}

fn amount(input: &str) -> IResult<&str, &str> {
    (
        opt(char('$')),
        recognize((digit1, opt((char('.'), digit1)))),
    )
        .map(|(_, amount)| amount)
        .parse(input)
}

fn description(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c| c == '"'), char('"')).parse(input)
}

// {payer} paid {amount} for {participant}, ... "description"
fn expense(input: &str) -> IResult<&str, Expense<'_>> {
    (
        identifier, // payer
        sp,
        tag_no_case("paid"),
        sp,
        amount,
        sp,
        tag_no_case("for"),
        sp,
        separated_list1(list_separator, identifier),
        sp,
        opt(description),
    )
        .map(
            |(payer, _, _, _, amount, _, _, _, participants, _, description)| Expense {
                payer,
                amount,
                participants,
                description,
            },
        )
        .parse(input)
}

fn statement(input: &str) -> IResult<&str, Statement<'_>> {
    alt((
        group_declaration.map(Statement::Group),
        members_declaration.map(Statement::Members),
        expense.map(Statement::Expense),
    ))
    .parse(input)
}

fn statement_with_sp(input: &str) -> IResult<&str, Statement<'_>> {
    (sp, statement, sp).map(|(_, stmt, _)| stmt).parse(input)
}

fn syntax_error_detail(err: nom::Err<nom::error::Error<&str>>) -> String {
    match err {
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            format!("unexpected input near '{}'", snippet(e.input))
        }
    }
}

fn snippet(input: &str) -> &str {
    let trimmed = input.trim();
    match trimmed.char_indices().nth(24) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    }
}

/// Parses a whole ledger, one statement per line.
pub fn parse_ledger(input: &str) -> Result<Ledger<'_>, ParseError> {
    let mut statements = Vec::new();

    for (idx, line) in input.lines().enumerate() {
        let (rest, _) = sp(line).map_err(|e| ParseError::SyntaxError {
            line: idx + 1,
            detail: syntax_error_detail(e),
        })?;
        if rest.trim().is_empty() {
            continue;
        }
        match statement_with_sp(rest) {
            Ok((rest, statement)) => {
                if !rest.trim().is_empty() {
                    return Err(ParseError::SyntaxError {
                        line: idx + 1,
                        detail: format!("unparsed input '{}'", snippet(rest)),
                    });
                }
                statements.push(StatementWithLine {
                    line: idx + 1,
                    statement,
                });
            }
            Err(e) => {
                return Err(ParseError::SyntaxError {
                    line: idx + 1,
                    detail: syntax_error_detail(e),
                });
            }
        }
    }

    Ok(Ledger { statements })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn expense_stmt(
        payer: &'static str,
        amount: &'static str,
        participants: &[&'static str],
        description: Option<&'static str>,
    ) -> Statement<'static> {
        Statement::Expense(Expense {
            payer,
            amount,
            participants: participants.to_vec(),
            description,
        })
    }

    #[rstest]
    #[case::plain("alice paid 30.00 for alice, bob", expense_stmt("alice", "30.00", &["alice", "bob"], None))]
    #[case::whole_amount("bob paid 4 for alice,bob", expense_stmt("bob", "4", &["alice", "bob"], None))]
    #[case::dollar_sign("bob paid $4.5 for carol", expense_stmt("bob", "4.5", &["carol"], None))]
    #[case::keywords_any_case("alice PAID 1 For bob", expense_stmt("alice", "1", &["bob"], None))]
    #[case::description(
        "alice paid 12.40 for alice, bob \"dinner at Luigi's\"",
        expense_stmt("alice", "12.40", &["alice", "bob"], Some("dinner at Luigi's"))
    )]
    #[case::order_kept("carol paid 1 for carol, alice, bob", expense_stmt("carol", "1", &["carol", "alice", "bob"], None))]
    #[case::sub_cent_kept_verbatim("alice paid 0.005 for bob", expense_stmt("alice", "0.005", &["bob"], None))]
    #[case::group("GROUP weekend-trip", Statement::Group("weekend-trip"))]
    #[case::payer_named_group("GROUP paid 3 for bob", expense_stmt("GROUP", "3", &["bob"], None))]
    #[case::participant_named_group("bob paid 3 for GROUP", expense_stmt("bob", "3", &["GROUP"], None))]
    #[case::members(
        "MEMBERS := alice (Alice Liddell), bob, carol ()",
        Statement::Members(vec![
            Member { id: "alice", display_name: Some("Alice Liddell") },
            Member { id: "bob", display_name: None },
            Member { id: "carol", display_name: None },
        ])
    )]
    fn parses_statements(#[case] input: &str, #[case] expected: Statement<'_>) {
        let (rest, stmt) = statement(input).unwrap();
        assert!(rest.is_empty(), "unparsed: {rest}");
        assert_eq!(stmt, expected);
    }

    #[rstest]
    #[case::trailing_line_comment("alice paid 3 for bob // taxi")]
    #[case::inline_comment("alice /* again */ paid 3 for bob")]
    #[case::leading_spaces("    alice paid 3 for bob")]
    fn accepts_comments_and_spacing(#[case] input: &str) {
        let ledger = parse_ledger(input).expect("should parse");
        assert_eq!(ledger.statements.len(), 1);
        assert_eq!(
            ledger.statements[0].statement,
            expense_stmt("alice", "3", &["bob"], None)
        );
    }

    #[test]
    fn skips_blank_and_comment_lines_and_numbers_from_one() {
        let input = "// trip ledger\n\nMEMBERS := alice, bob\n   \nalice paid 3 for bob\n";
        let ledger = parse_ledger(input).expect("should parse");

        let lines: Vec<usize> = ledger.statements.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![3, 5]);
    }

    #[rstest]
    #[case::missing_participants("alice paid 3 for", 1)]
    #[case::negative_amount("alice paid -3 for bob", 1)]
    #[case::missing_keyword("alice 3 for bob", 1)]
    #[case::glued_group_keyword("GROUPtrip", 1)]
    #[case::group_with_extra_words("GROUP trip extra", 1)]
    #[case::trailing_garbage("MEMBERS := alice\nalice paid 3 for bob ???", 2)]
    #[case::unterminated_comment("alice paid 3 /* for bob", 1)]
    #[case::unterminated_description("alice paid 3 for bob \"dinner", 1)]
    fn reports_syntax_errors_with_line(#[case] input: &str, #[case] expected_line: usize) {
        match parse_ledger(input) {
            Err(ParseError::SyntaxError { line, .. }) => assert_eq!(line, expected_line),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn error_message_names_line() {
        let err = parse_ledger("alice paid 3 for bob ???").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Syntax error at line 1: unparsed input '???'"
        );
    }
}
