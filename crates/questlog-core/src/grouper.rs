//! Page grouping that mirrors the remote quest list pagination.
//!
//! The remote numbers its pages over an ascending-id ordering of the quests
//! admitted by the requested tab, [`PAGE_SIZE`] quests per page. Grouping
//! the local store the same way tells the merger which locally held quests
//! an incoming page replaces.
//!
//! Grouping is a pure function of its input: no store access, no state.

use crate::model::{Category, Quest, Tab};

/// Quests per remote page.
pub const PAGE_SIZE: usize = 5;

/// Filter applied before grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every quest.
    Unscoped,
    /// Quests taken on or accomplished.
    Active,
    /// Quests of one category.
    Category(Category),
}

impl Scope {
    #[must_use]
    pub fn admits(self, quest: &Quest) -> bool {
        match self {
            Self::Unscoped => true,
            Self::Active => quest.state().is_active(),
            Self::Category(category) => quest.category() == category,
        }
    }
}

impl From<Tab> for Scope {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::All => Self::Unscoped,
            Tab::Active => Self::Active,
            Tab::Category(category) => Self::Category(category),
        }
    }
}

/// One window of consecutive quests.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGroup<'a> {
    /// 0-based page index.
    pub index: usize,
    /// Quests on this page, ascending by id.
    pub quests: Vec<&'a Quest>,
}

/// Group `quests` into pages of `page_size` after filtering by `scope`.
///
/// The i-th admitted quest (ascending by id) lands in group `i / page_size`.
/// Every group but the last holds exactly `page_size` quests. A `page_size`
/// of zero is treated as one.
pub fn group_by_page<'a, I>(quests: I, scope: Scope, page_size: usize) -> Vec<PageGroup<'a>>
where
    I: IntoIterator<Item = &'a Quest>,
{
    let page_size = page_size.max(1);
    let mut admitted: Vec<&'a Quest> = quests.into_iter().filter(|q| scope.admits(q)).collect();
    admitted.sort_by_key(|q| q.id());

    admitted
        .chunks(page_size)
        .enumerate()
        .map(|(index, chunk)| PageGroup {
            index,
            quests: chunk.to_vec(),
        })
        .collect()
}

/// The group with the given index, if the grouping reaches that far.
#[must_use]
pub fn find_page<'g, 'a>(groups: &'g [PageGroup<'a>], index: usize) -> Option<&'g PageGroup<'a>> {
    groups.iter().find(|group| group.index == index)
}
