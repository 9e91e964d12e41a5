use uuid::Uuid;

use crate::domain::{BakedGood, User, user::UNKNOWN_BAKER};

/// How many baked goods the community feed shows by default.
pub const DEFAULT_COMMUNITY_LIMIT: usize = 12;

/// A public baked good with its author's display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommunityEntry<'a> {
    /// The baked good.
    pub baked_good: &'a BakedGood,
    /// Author display name, or [`UNKNOWN_BAKER`] if the author is gone.
    pub author_name: &'a str,
}

/// The most recently created baked goods across all users, newest first.
///
/// `author` looks up a user by UUID.
pub fn community_feed<'a, I, F>(baked_goods: I, author: F, limit: usize) -> Vec<CommunityEntry<'a>>
where
    I: IntoIterator<Item = &'a BakedGood>,
    F: Fn(Uuid) -> Option<&'a User>,
{
    let mut goods: Vec<&BakedGood> = baked_goods.into_iter().collect();
    goods.sort_by(|a, b| b.created().cmp(&a.created()));

    goods
        .into_iter()
        .take(limit)
        .map(|baked_good| CommunityEntry {
            baked_good,
            author_name: author(baked_good.owner()).map_or(UNKNOWN_BAKER, User::display_name),
        })
        .collect()
}
