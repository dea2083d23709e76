use indexmap::IndexMap;
use opensplit_application::{GroupRecord, GroupRepository, Ledger};

/// Groups of one parsed ledger, kept in declaration order.
#[derive(Debug, Default)]
pub struct InMemoryGroupRepository<'a> {
    groups: IndexMap<&'a str, GroupRecord<'a>>,
}

impl<'a> InMemoryGroupRepository<'a> {
    pub fn new(ledger: Ledger<'a>) -> Self {
        let groups = ledger
            .groups
            .into_iter()
            .map(|group| (group.name, group))
            .collect();
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<'a> From<Ledger<'a>> for InMemoryGroupRepository<'a> {
    fn from(ledger: Ledger<'a>) -> Self {
        Self::new(ledger)
    }
}

impl GroupRepository for InMemoryGroupRepository<'_> {
    fn group_names(&self) -> Vec<&str> {
        self.groups.keys().copied().collect()
    }

    fn load_group(&self, name: &str) -> Option<GroupRecord<'_>> {
        self.groups.get(name).cloned()
    }
}
