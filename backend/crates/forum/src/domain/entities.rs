//! Domain Entities

use chrono::{DateTime, Utc};
use derive_more::Display;
use kernel::id::{CategoryId, PostId, ReplyId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{CategoryName, PostBody, PostTitle, ReplyBody};
use crate::error::{ForumError, ForumResult};

// ============================================================================
// Category
// ============================================================================

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum CategoryKind {
    #[display("city")]
    City = 0,
    #[display("property_type")]
    PropertyType = 1,
}

impl CategoryKind {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::City),
            1 => Some(Self::PropertyType),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub parent_id: Option<CategoryId>,
    pub kind: CategoryKind,
    pub name: String,
    /// Unique across the forum; children are prefixed with the city slug
    pub slug: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Two levels only: cities at the root, property types under a city.
    pub fn new(
        name: CategoryName,
        kind: CategoryKind,
        parent: Option<&Category>,
        position: i32,
    ) -> ForumResult<Self> {
        let slug = match (kind, parent) {
            (CategoryKind::City, None) => name.slug(),
            (CategoryKind::City, Some(_)) => {
                return Err(ForumError::InvalidHierarchy("city categories cannot have a parent"));
            }
            (CategoryKind::PropertyType, Some(p)) if p.kind == CategoryKind::City => {
                format!("{}-{}", p.slug, name.slug())
            }
            (CategoryKind::PropertyType, _) => {
                return Err(ForumError::InvalidHierarchy(
                    "property type categories must sit under a city",
                ));
            }
        };
        if slug.is_empty() {
            return Err(ForumError::InvalidHierarchy("category name has no usable characters"));
        }

        Ok(Self {
            id: CategoryId::new(),
            parent_id: parent.map(|p| p.id),
            kind,
            name: name.into_inner(),
            slug,
            position,
            created_at: Utc::now(),
        })
    }
}

// ============================================================================
// Post / Reply
// ============================================================================

#[derive(Debug, Clone)]
pub struct Post {
    pub id: PostId,
    pub category_id: CategoryId,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    /// Locked threads accept no replies
    pub locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(category_id: CategoryId, author_id: Uuid, title: PostTitle, body: PostBody) -> Self {
        let now = Utc::now();
        Self {
            id: PostId::new(),
            category_id,
            author_id,
            title: title.into_inner(),
            body: body.into_inner(),
            locked: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        self.updated_at = Utc::now();
    }

    pub fn ensure_open(&self) -> ForumResult<()> {
        if self.locked {
            Err(ForumError::PostLocked)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub id: ReplyId,
    pub post_id: PostId,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Reply {
    pub fn new(post_id: PostId, author_id: Uuid, body: ReplyBody) -> Self {
        Self {
            id: ReplyId::new(),
            post_id,
            author_id,
            body: body.into_inner(),
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Reaction
// ============================================================================

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum ReactionKind {
    #[display("like")]
    Like = 0,
    #[display("dislike")]
    Dislike = 1,
}

impl ReactionKind {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Like),
            1 => Some(Self::Dislike),
            _ => None,
        }
    }
}

/// What a reaction is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionTarget {
    Post(PostId),
    Reply(ReplyId),
}

impl ReactionTarget {
    /// Discriminant stored in `forum_reactions.target_kind`
    pub const fn kind_id(&self) -> i16 {
        match self {
            ReactionTarget::Post(_) => 0,
            ReactionTarget::Reply(_) => 1,
        }
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            ReactionTarget::Post(id) => id.into_uuid(),
            ReactionTarget::Reply(id) => id.into_uuid(),
        }
    }
}

/// At most one per user per target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub target: ReactionTarget,
    pub user_id: Uuid,
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(target: ReactionTarget, user_id: Uuid, kind: ReactionKind) -> Self {
        Self {
            target,
            user_id,
            kind,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str) -> Category {
        Category::new(CategoryName::new(name).unwrap(), CategoryKind::City, None, 0).unwrap()
    }

    #[test]
    fn test_category_hierarchy() {
        let pune = city("Pune");
        assert_eq!(pune.slug, "pune");
        assert!(pune.parent_id.is_none());

        let flats = Category::new(
            CategoryName::new("Apartments").unwrap(),
            CategoryKind::PropertyType,
            Some(&pune),
            1,
        )
        .unwrap();
        assert_eq!(flats.slug, "pune-apartments");
        assert_eq!(flats.parent_id, Some(pune.id));

        // Third level
        assert!(matches!(
            Category::new(
                CategoryName::new("2BHK").unwrap(),
                CategoryKind::PropertyType,
                Some(&flats),
                0
            ),
            Err(ForumError::InvalidHierarchy(_))
        ));
        // Orphan property type / nested city
        assert!(
            Category::new(CategoryName::new("Villas").unwrap(), CategoryKind::PropertyType, None, 0)
                .is_err()
        );
        assert!(
            Category::new(CategoryName::new("Thane").unwrap(), CategoryKind::City, Some(&pune), 0)
                .is_err()
        );
    }

    #[test]
    fn test_locked_post_rejects_replies() {
        let mut post = Post::new(
            CategoryId::new(),
            Uuid::new_v4(),
            PostTitle::new("Metro line 3 update").unwrap(),
            PostBody::new("Any news?").unwrap(),
        );
        assert!(post.ensure_open().is_ok());
        post.set_locked(true);
        assert!(matches!(post.ensure_open(), Err(ForumError::PostLocked)));
    }
}
