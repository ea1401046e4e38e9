//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, PostId, ReplyId};
use kernel::page::{Page, PageRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{
    Category, CategoryKind, Post, Reaction, ReactionKind, ReactionTarget, Reply,
};
use crate::domain::repository::{
    CategoryRepository, PostRepository, ReactionRepository, ReplyRepository,
};
use crate::domain::services::{PostSort, PostSummary, ReactionTally};
use crate::error::{ForumError, ForumResult};

const CATEGORY_COLUMNS: &str = "category_id, parent_id, kind, name, slug, position, created_at";

const POST_COLUMNS: &str =
    "post_id, category_id, author_id, title, body, locked, created_at, updated_at";

/// Post columns plus reply and reaction aggregates
const SUMMARY_SELECT: &str = r#"
    SELECT
        p.post_id,
        p.category_id,
        p.author_id,
        p.title,
        p.body,
        p.locked,
        p.created_at,
        p.updated_at,
        COALESCE(r.reply_count, 0) AS reply_count,
        r.last_reply_at,
        COALESCE(x.likes, 0) AS likes,
        COALESCE(x.dislikes, 0) AS dislikes,
        GREATEST(p.created_at, COALESCE(r.last_reply_at, p.created_at)) AS last_activity_at,
        COALESCE(x.likes, 0) - COALESCE(x.dislikes, 0) AS score
    FROM forum_posts p
    LEFT JOIN (
        SELECT post_id, COUNT(*) AS reply_count, MAX(created_at) AS last_reply_at
        FROM forum_replies
        GROUP BY post_id
    ) r ON r.post_id = p.post_id
    LEFT JOIN (
        SELECT
            target_id,
            COUNT(*) FILTER (WHERE reaction = 0) AS likes,
            COUNT(*) FILTER (WHERE reaction = 1) AS dislikes
        FROM forum_reactions
        WHERE target_kind = 0
        GROUP BY target_id
    ) x ON x.target_id = p.post_id
"#;

/// PostgreSQL-backed forum repository
#[derive(Clone)]
pub struct PgForumRepository {
    pool: PgPool,
}

impl PgForumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

// ============================================================================
// Categories
// ============================================================================

impl CategoryRepository for PgForumRepository {
    async fn create(&self, category: &Category) -> ForumResult<()> {
        sqlx::query(
            r#"
            INSERT INTO forum_categories (
                category_id, parent_id, kind, name, slug, position, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(category.id.into_uuid())
        .bind(category.parent_id.map(|id| id.into_uuid()))
        .bind(category.kind.id())
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.position)
        .bind(category.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ForumError::CategoryExists(category.slug.clone())
            } else {
                e.into()
            }
        })?;

        Ok(())
    }

    async fn find_by_slug(&self, slug: &str) -> ForumResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM forum_categories WHERE slug = $1");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CategoryRow::into_category).transpose()
    }

    async fn list_all(&self) -> ForumResult<Vec<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM forum_categories");
        let rows = sqlx::query_as::<_, CategoryRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CategoryRow::into_category).collect()
    }

    async fn list_children(&self, parent_id: CategoryId) -> ForumResult<Vec<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM forum_categories WHERE parent_id = $1 \
             ORDER BY position, name"
        );
        let rows = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(parent_id.into_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CategoryRow::into_category).collect()
    }
}

// ============================================================================
// Posts
// ============================================================================

impl PostRepository for PgForumRepository {
    async fn create(&self, post: &Post) -> ForumResult<()> {
        sqlx::query(
            r#"
            INSERT INTO forum_posts (
                post_id, category_id, author_id, title, body, locked, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(post.id.into_uuid())
        .bind(post.category_id.into_uuid())
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.locked)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: PostId) -> ForumResult<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM forum_posts WHERE post_id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(PostRow::into_post))
    }

    async fn update(&self, post: &Post) -> ForumResult<()> {
        let result =
            sqlx::query("UPDATE forum_posts SET locked = $2, updated_at = $3 WHERE post_id = $1")
                .bind(post.id.into_uuid())
                .bind(post.locked)
                .bind(post.updated_at)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ForumError::PostNotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: PostId) -> ForumResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM forum_reactions
            WHERE (target_kind = 0 AND target_id = $1)
               OR (target_kind = 1 AND target_id IN (
                    SELECT reply_id FROM forum_replies WHERE post_id = $1
               ))
            "#,
        )
        .bind(id.into_uuid())
        .execute(&mut *tx)
        .await?;

        // Replies cascade
        let result = sqlx::query("DELETE FROM forum_posts WHERE post_id = $1")
            .bind(id.into_uuid())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ForumError::PostNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn summary(&self, id: PostId) -> ForumResult<Option<PostSummary>> {
        let sql = format!("{SUMMARY_SELECT} WHERE p.post_id = $1");
        let row = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(SummaryRow::into_summary))
    }

    async fn list_summaries(
        &self,
        category_ids: &[CategoryId],
        sort: PostSort,
        page: PageRequest,
    ) -> ForumResult<Page<PostSummary>> {
        let ids: Vec<Uuid> = category_ids.iter().map(|id| id.into_uuid()).collect();

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM forum_posts WHERE category_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_one(&self.pool)
        .await?;

        let order = match sort {
            PostSort::Latest => "last_activity_at DESC, p.created_at DESC",
            PostSort::Top => "score DESC, last_activity_at DESC, p.created_at DESC",
        };
        let sql = format!(
            "{SUMMARY_SELECT} WHERE p.category_id = ANY($1) ORDER BY {order} LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(&ids)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows.into_iter().map(SummaryRow::into_summary).collect();
        Ok(Page::new(items, page, total.max(0) as u64))
    }
}

// ============================================================================
// Replies
// ============================================================================

impl ReplyRepository for PgForumRepository {
    async fn create(&self, reply: &Reply) -> ForumResult<()> {
        sqlx::query(
            r#"
            INSERT INTO forum_replies (reply_id, post_id, author_id, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(reply.id.into_uuid())
        .bind(reply.post_id.into_uuid())
        .bind(reply.author_id)
        .bind(&reply.body)
        .bind(reply.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: ReplyId) -> ForumResult<Option<Reply>> {
        let row = sqlx::query_as::<_, ReplyRow>(
            "SELECT reply_id, post_id, author_id, body, created_at FROM forum_replies WHERE reply_id = $1",
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ReplyRow::into_reply))
    }

    async fn delete(&self, id: ReplyId) -> ForumResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM forum_reactions WHERE target_kind = 1 AND target_id = $1")
            .bind(id.into_uuid())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM forum_replies WHERE reply_id = $1")
            .bind(id.into_uuid())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ForumError::ReplyNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_for_post(&self, post_id: PostId, limit: i64) -> ForumResult<Vec<Reply>> {
        let rows = sqlx::query_as::<_, ReplyRow>(
            r#"
            SELECT reply_id, post_id, author_id, body, created_at
            FROM forum_replies
            WHERE post_id = $1
            ORDER BY created_at, reply_id
            LIMIT $2
            "#,
        )
        .bind(post_id.into_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ReplyRow::into_reply).collect())
    }
}

// ============================================================================
// Reactions
// ============================================================================

impl ReactionRepository for PgForumRepository {
    async fn find(&self, target: ReactionTarget, user_id: Uuid) -> ForumResult<Option<Reaction>> {
        let row = sqlx::query_as::<_, (i16, DateTime<Utc>)>(
            r#"
            SELECT reaction, created_at FROM forum_reactions
            WHERE target_kind = $1 AND target_id = $2 AND user_id = $3
            "#,
        )
        .bind(target.kind_id())
        .bind(target.uuid())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(kind, created_at)| {
            Ok(Reaction {
                target,
                user_id,
                kind: reaction_kind(kind)?,
                created_at,
            })
        })
        .transpose()
    }

    async fn upsert(&self, reaction: &Reaction) -> ForumResult<()> {
        sqlx::query(
            r#"
            INSERT INTO forum_reactions (target_kind, target_id, user_id, reaction, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (target_kind, target_id, user_id)
            DO UPDATE SET reaction = EXCLUDED.reaction, created_at = EXCLUDED.created_at
            "#,
        )
        .bind(reaction.target.kind_id())
        .bind(reaction.target.uuid())
        .bind(reaction.user_id)
        .bind(reaction.kind.id())
        .bind(reaction.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, target: ReactionTarget, user_id: Uuid) -> ForumResult<()> {
        sqlx::query(
            "DELETE FROM forum_reactions WHERE target_kind = $1 AND target_id = $2 AND user_id = $3",
        )
        .bind(target.kind_id())
        .bind(target.uuid())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn tally(&self, target: ReactionTarget) -> ForumResult<ReactionTally> {
        let rows = sqlx::query_as::<_, (i16, i64)>(
            r#"
            SELECT reaction, COUNT(*) FROM forum_reactions
            WHERE target_kind = $1 AND target_id = $2
            GROUP BY reaction
            "#,
        )
        .bind(target.kind_id())
        .bind(target.uuid())
        .fetch_all(&self.pool)
        .await?;

        let mut tally = ReactionTally::default();
        for (kind, count) in rows {
            tally.add(reaction_kind(kind)?, count.max(0) as u64);
        }
        Ok(tally)
    }

    async fn reply_counts(&self, post_id: PostId) -> ForumResult<Vec<(ReplyId, ReactionKind, i64)>> {
        let rows = sqlx::query_as::<_, (Uuid, i16, i64)>(
            r#"
            SELECT x.target_id, x.reaction, COUNT(*)
            FROM forum_reactions x
            JOIN forum_replies r ON r.reply_id = x.target_id
            WHERE x.target_kind = 1 AND r.post_id = $1
            GROUP BY x.target_id, x.reaction
            "#,
        )
        .bind(post_id.into_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, kind, count)| Ok((ReplyId::from_uuid(id), reaction_kind(kind)?, count)))
            .collect()
    }
}

fn reaction_kind(id: i16) -> ForumResult<ReactionKind> {
    ReactionKind::from_id(id).ok_or_else(|| ForumError::Internal(format!("Unknown reaction {id}")))
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct CategoryRow {
    category_id: Uuid,
    parent_id: Option<Uuid>,
    kind: i16,
    name: String,
    slug: String,
    position: i32,
    created_at: DateTime<Utc>,
}

impl CategoryRow {
    fn into_category(self) -> ForumResult<Category> {
        let kind = CategoryKind::from_id(self.kind)
            .ok_or_else(|| ForumError::Internal(format!("Unknown category kind {}", self.kind)))?;

        Ok(Category {
            id: CategoryId::from_uuid(self.category_id),
            parent_id: self.parent_id.map(CategoryId::from_uuid),
            kind,
            name: self.name,
            slug: self.slug,
            position: self.position,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    post_id: Uuid,
    category_id: Uuid,
    author_id: Uuid,
    title: String,
    body: String,
    locked: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> Post {
        Post {
            id: PostId::from_uuid(self.post_id),
            category_id: CategoryId::from_uuid(self.category_id),
            author_id: self.author_id,
            title: self.title,
            body: self.body,
            locked: self.locked,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    #[sqlx(flatten)]
    post: PostRow,
    reply_count: i64,
    last_reply_at: Option<DateTime<Utc>>,
    likes: i64,
    dislikes: i64,
}

impl SummaryRow {
    fn into_summary(self) -> PostSummary {
        let tally = ReactionTally {
            likes: self.likes.max(0) as u64,
            dislikes: self.dislikes.max(0) as u64,
        };
        PostSummary::aggregate(
            self.post.into_post(),
            self.reply_count.max(0) as u64,
            tally,
            self.last_reply_at,
        )
    }
}

#[derive(sqlx::FromRow)]
struct ReplyRow {
    reply_id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    body: String,
    created_at: DateTime<Utc>,
}

impl ReplyRow {
    fn into_reply(self) -> Reply {
        Reply {
            id: ReplyId::from_uuid(self.reply_id),
            post_id: PostId::from_uuid(self.post_id),
            author_id: self.author_id,
            body: self.body,
            created_at: self.created_at,
        }
    }
}
