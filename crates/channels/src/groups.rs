use tracing::debug;

use sigrelay_common::types::Group;

/// How the control group is picked out of the account's groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSelector {
    /// Send id (`group.…`) or internal id.
    Id(String),
    /// Exact group name.
    Name(String),
}

impl std::fmt::Display for GroupSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Name(name) => write!(f, "name '{name}'"),
        }
    }
}

/// Find the first group matching `selector`.
pub fn find_group<'a>(groups: &'a [Group], selector: &GroupSelector) -> Option<&'a Group> {
    let found = groups.iter().find(|group| match selector {
        GroupSelector::Id(id) => !id.is_empty() && (group.id == *id || group.internal_id == *id),
        GroupSelector::Name(name) => group.name == *name,
    });
    debug!(%selector, found = found.is_some(), "group lookup");
    found
}
