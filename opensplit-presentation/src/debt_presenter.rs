use crate::text_table::{Alignment, TextTableBuilder};
use opensplit_application::{DebtSummary, MemberDirectory, PersonBalance};
use opensplit_domain::{NetBalances, ParticipantId};
use std::{borrow::Cow, fmt::Write};

pub const MEMBER: &str = "Member";
pub const POSITION: &str = "Position";
pub const SETTLED: &str = "Everyone is settled up.";

pub struct DebtPresenter;

pub struct DebtView {
    pub group: String,
    /// `<debtor> owes <creditor> <amount>`, grouped by debtor.
    pub debt_lines: Vec<String>,
    pub positions_table: String,
}

impl DebtView {
    /// Plain-text report for one group.
    pub fn to_text(&self, show_positions: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(&mut out, "== {} ==", self.group);
        if self.debt_lines.is_empty() {
            let _ = writeln!(&mut out, "{SETTLED}");
        }
        for line in &self.debt_lines {
            let _ = writeln!(&mut out, "{line}");
        }
        if show_positions {
            out.push('\n');
            out.push_str(&self.positions_table);
        }
        out
    }
}

impl DebtPresenter {
    pub fn render(summary: &DebtSummary<'_>, member_directory: &dyn MemberDirectory) -> DebtView {
        DebtView {
            group: summary.group.to_string(),
            debt_lines: Self::debt_lines(&summary.balances, member_directory),
            positions_table: Self::build_positions_table(&summary.positions, member_directory),
        }
    }

    pub fn debt_lines(
        balances: &NetBalances<'_>,
        member_directory: &dyn MemberDirectory,
    ) -> Vec<String> {
        balances
            .by_debtor()
            .into_iter()
            .flat_map(|(debtor, creditors)| {
                let debtor = format_member_label(debtor, member_directory);
                creditors.into_iter().map(move |(creditor, amount)| {
                    format!(
                        "{debtor} owes {} {amount}",
                        format_member_label(creditor, member_directory)
                    )
                })
            })
            .collect()
    }

    pub fn build_positions_table(
        positions: &[PersonBalance<'_>],
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&[Cow::Borrowed(MEMBER), Cow::Borrowed(POSITION)]);

        for person in positions {
            let sign = if person.balance.is_positive() { "+" } else { "" };
            builder = builder.row([
                format_member_label(person.id, member_directory),
                Cow::Owned(format!("{sign}{}", person.balance)),
            ]);
        }

        builder.build()
    }
}

fn format_member_label<'a>(
    member_id: ParticipantId<'a>,
    member_directory: &'a dyn MemberDirectory,
) -> Cow<'a, str> {
    match member_directory.display_name(member_id) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Borrowed(member_id.as_str()),
    }
}
