//! Domain Services
//!
//! Reaction toggling, reply/reaction aggregation and the category tree.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Category, Post, ReactionKind};

// ============================================================================
// Reactions
// ============================================================================

/// Effect of a user pressing a reaction button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    Added(ReactionKind),
    /// Same kind pressed again
    Removed,
    Replaced { from: ReactionKind, to: ReactionKind },
}

pub fn toggle_reaction(existing: Option<ReactionKind>, requested: ReactionKind) -> ReactionChange {
    match existing {
        None => ReactionChange::Added(requested),
        Some(kind) if kind == requested => ReactionChange::Removed,
        Some(from) => ReactionChange::Replaced {
            from,
            to: requested,
        },
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionTally {
    pub likes: u64,
    pub dislikes: u64,
}

impl ReactionTally {
    pub fn add(&mut self, kind: ReactionKind, count: u64) {
        match kind {
            ReactionKind::Like => self.likes += count,
            ReactionKind::Dislike => self.dislikes += count,
        }
    }

    pub fn score(&self) -> i64 {
        self.likes as i64 - self.dislikes as i64
    }

    /// Fold `(target, kind, count)` rows from a `GROUP BY target, kind` query
    pub fn from_counts<T, I>(rows: I) -> HashMap<T, ReactionTally>
    where
        T: Eq + Hash,
        I: IntoIterator<Item = (T, ReactionKind, i64)>,
    {
        let mut tallies: HashMap<T, ReactionTally> = HashMap::new();
        for (target, kind, count) in rows {
            tallies.entry(target).or_default().add(kind, count.max(0) as u64);
        }
        tallies
    }
}

// ============================================================================
// Post aggregation
// ============================================================================

#[derive(Debug, Clone)]
pub struct PostSummary {
    pub post: Post,
    pub reply_count: u64,
    pub likes: u64,
    pub dislikes: u64,
    pub score: i64,
    /// Newest reply, or the post itself when there are none
    pub last_activity_at: DateTime<Utc>,
}

impl PostSummary {
    pub fn aggregate(
        post: Post,
        reply_count: u64,
        tally: ReactionTally,
        last_reply_at: Option<DateTime<Utc>>,
    ) -> Self {
        let last_activity_at = last_reply_at.map_or(post.created_at, |r| r.max(post.created_at));
        Self {
            post,
            reply_count,
            likes: tally.likes,
            dislikes: tally.dislikes,
            score: tally.score(),
            last_activity_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSort {
    /// Most recent activity first
    #[default]
    Latest,
    /// Highest score first, ties by activity
    Top,
}

impl PostSort {
    pub fn compare(&self, a: &PostSummary, b: &PostSummary) -> Ordering {
        let by_activity = b
            .last_activity_at
            .cmp(&a.last_activity_at)
            .then_with(|| b.post.created_at.cmp(&a.post.created_at));
        match self {
            PostSort::Latest => by_activity,
            PostSort::Top => b.score.cmp(&a.score).then(by_activity),
        }
    }
}

// ============================================================================
// Category tree
// ============================================================================

#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<Category>,
}

fn by_position(a: &Category, b: &Category) -> Ordering {
    a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name))
}

/// Roots with their children, both ordered by position then name.
/// Children whose parent is missing are dropped.
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let (mut roots, children): (Vec<_>, Vec<_>) =
        categories.into_iter().partition(|c| c.parent_id.is_none());
    roots.sort_by(by_position);

    let mut by_parent: HashMap<_, Vec<Category>> = HashMap::new();
    for child in children {
        if let Some(parent) = child.parent_id {
            by_parent.entry(parent).or_default().push(child);
        }
    }

    roots
        .into_iter()
        .map(|category| {
            let mut children = by_parent.remove(&category.id).unwrap_or_default();
            children.sort_by(by_position);
            CategoryNode { category, children }
        })
        .collect()
}
