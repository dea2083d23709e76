use opensplit_application::{
    ExpenseRecord, GroupRecord, Ledger, LedgerParseError, LedgerParser, MemberRecord,
};
use opensplit_domain::{Money, ParticipantId};
use opensplit_parser::{ParseError, Statement, parse_ledger};
use std::str::FromStr;

/// Name of the group that statements before the first `GROUP` line belong to.
pub const DEFAULT_GROUP: &str = "default";

#[derive(Default)]
pub struct LedgerFileParser;

impl LedgerParser for LedgerFileParser {
    fn parse<'a>(&self, content: &'a str) -> Result<Ledger<'a>, LedgerParseError> {
        let parsed = parse_ledger(content).map_err(|err| match err {
            ParseError::SyntaxError { line, detail } => {
                LedgerParseError::SyntaxError { line, detail }
            }
        })?;

        let mut builder = LedgerBuilder::default();
        for statement in parsed.statements {
            let line = statement.line;
            match statement.statement {
                Statement::Group(name) => builder.open_group(name, line)?,
                Statement::Members(members) => {
                    let group = builder.current_group(line)?;
                    if group.has_members {
                        return Err(LedgerParseError::DuplicateMembersDeclaration {
                            group: group.record.name.to_string(),
                            line,
                        });
                    }
                    let mut roster: Vec<MemberRecord<'a>> = Vec::with_capacity(members.len());
                    for member in members {
                        let id = ParticipantId(member.id);
                        if roster.iter().any(|known| known.id == id) {
                            return Err(LedgerParseError::DuplicateMember {
                                member: member.id.to_string(),
                                line,
                            });
                        }
                        roster.push(MemberRecord {
                            id,
                            display_name: member.display_name,
                        });
                    }
                    group.has_members = true;
                    group.record.members = roster;
                }
                Statement::Expense(expense) => {
                    let group = builder.current_group(line)?;
                    if !group.has_members {
                        return Err(LedgerParseError::MissingMembersDeclaration {
                            group: group.record.name.to_string(),
                            line,
                        });
                    }
                    let amount =
                        Money::from_str(expense.amount).map_err(|_| LedgerParseError::InvalidAmount {
                            amount: expense.amount.to_string(),
                            line,
                        })?;
                    group.record.expenses.push(ExpenseRecord {
                        line: Some(line),
                        description: expense.description,
                        amount,
                        payer: ParticipantId(expense.payer),
                        participants: expense.participants.into_iter().map(ParticipantId).collect(),
                    });
                }
            }
        }

        let ledger = builder.finish();
        tracing::debug!(groups = ledger.groups.len(), "Parsed ledger");
        Ok(ledger)
    }
}

struct PendingGroup<'a> {
    record: GroupRecord<'a>,
    has_members: bool,
}

impl<'a> PendingGroup<'a> {
    fn new(name: &'a str) -> Self {
        Self {
            record: GroupRecord {
                name,
                members: Vec::new(),
                expenses: Vec::new(),
            },
            has_members: false,
        }
    }
}

#[derive(Default)]
struct LedgerBuilder<'a> {
    groups: Vec<PendingGroup<'a>>,
}

impl<'a> LedgerBuilder<'a> {
    fn open_group(&mut self, name: &'a str, line: usize) -> Result<(), LedgerParseError> {
        if self.groups.iter().any(|group| group.record.name == name) {
            return Err(LedgerParseError::DuplicateGroup {
                name: name.to_string(),
                line,
            });
        }
        self.groups.push(PendingGroup::new(name));
        Ok(())
    }

    /// The group the next statement belongs to, opening the default group if
    /// nothing has been declared yet.
    fn current_group(&mut self, line: usize) -> Result<&mut PendingGroup<'a>, LedgerParseError> {
        if self.groups.is_empty() {
            self.open_group(DEFAULT_GROUP, line)?;
        }
        // Non-empty after the branch above.
        let last = self.groups.len() - 1;
        Ok(&mut self.groups[last])
    }

    fn finish(self) -> Ledger<'a> {
        Ledger {
            groups: self.groups.into_iter().map(|group| group.record).collect(),
        }
    }
}
