use crate::{
    error::LedgerParseError,
    model::{GroupRecord, Ledger},
};
use opensplit_domain::ParticipantId;
use std::collections::HashMap;

pub trait LedgerParser: Send + Sync {
    fn parse<'a>(&self, content: &'a str) -> Result<Ledger<'a>, LedgerParseError>;
}

/// Read side of group and expense storage.
pub trait GroupRepository: Send + Sync {
    fn group_names(&self) -> Vec<&str>;

    fn load_group(&self, name: &str) -> Option<GroupRecord<'_>>;
}

pub trait MemberDirectory: Send + Sync {
    fn display_name(&self, member_id: ParticipantId<'_>) -> Option<&str>;
}

impl MemberDirectory for HashMap<String, String> {
    fn display_name(&self, member_id: ParticipantId<'_>) -> Option<&str> {
        self.get(member_id.as_str()).map(String::as_str)
    }
}

impl MemberDirectory for GroupRecord<'_> {
    fn display_name(&self, member_id: ParticipantId<'_>) -> Option<&str> {
        self.member(member_id).and_then(|member| member.display_name)
    }
}
