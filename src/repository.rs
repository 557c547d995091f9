use crate::models::{
    Category, CategoryRow, Comment, CommentRow, NewComment, NewPost, Notification,
    NotificationRow, Post, PostRow, PostStatus, PostType, Tag, TagRow, TargetType, User,
    UserRow, UserSetting, UserSettingRow,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

/// Repository Trait
///
/// The Data-Access Shim. Handlers talk to this contract only; which data source sits
/// behind it (the in-memory fixtures or the live Postgres store) is decided once at
/// startup from `AppConfig::data_source`.
///
/// Every method is infallible from the caller's point of view: store errors are
/// logged and degrade to `None`, an empty collection, or `false`.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Posts ---
    async fn get_post_by_id(&self, id: &str) -> Option<Post>;
    // Published posts only, newest first.
    async fn get_posts_by_category(&self, category_id: &str) -> Vec<Post>;
    async fn get_posts_by_type(&self, post_type: PostType) -> Vec<Post>;
    async fn get_posts_by_tag(&self, tag: &str) -> Vec<Post>;
    async fn get_posts_by_author(&self, author_id: &str) -> Vec<Post>;
    async fn increment_post_views(&self, id: &str);
    async fn create_post(&self, post: NewPost) -> Option<Post>;

    // --- Comments & Likes ---
    // Oldest first.
    async fn get_comments_by_post_id(&self, post_id: &str) -> Vec<Comment>;
    async fn create_comment(&self, comment: NewComment) -> Option<Comment>;
    /// Check-then-act: removes the like when present, inserts it otherwise.
    /// Returns true when a like was added. Not atomic against concurrent toggles
    /// by the same user.
    async fn toggle_like(&self, user_id: &str, target_type: TargetType, target_id: &str) -> bool;

    // --- Users & Taxonomy ---
    async fn get_user_by_id(&self, id: &str) -> Option<User>;
    async fn list_categories(&self) -> Vec<Category>;
    async fn list_tags(&self) -> Vec<Tag>;

    // --- Per-user Data ---
    // Newest first.
    async fn get_notifications(&self, user_id: &str) -> Vec<Notification>;
    async fn get_user_settings(&self, user_id: &str) -> Option<UserSetting>;
}

/// RepositoryState
///
/// The concrete type used to share the data source across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const POST_COLUMNS: &str = "id, title, content, author_id, category_id, type, status, tags, \
     likes_count, comments_count, views_count, images, is_solved, accepted_answer_id, \
     excerpt, reading_time, price, availability, metadata, created_at, updated_at";

const COMMENT_COLUMNS: &str = "id, content, author_id, post_id, parent_id, likes_count, \
     is_accepted, created_at, updated_at";

const USER_COLUMNS: &str = "id, username, display_name, email, avatar, bio, role, \
     is_verified, followers, following, post_count, created_at, updated_at";

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, parent_id, post_count, created_at, updated_at";

/// parse_key
///
/// The live store keys every table by UUID. Anything else cannot match a row, so
/// the query is skipped entirely.
fn parse_key(id: &str, operation: &'static str) -> Option<Uuid> {
    match Uuid::parse_str(id) {
        Ok(key) => Some(key),
        Err(_) => {
            tracing::debug!("{}: `{}` is not a store key, skipping query", operation, id);
            None
        }
    }
}

/// `Some(None)` when the key is absent, `None` when it is present but unusable.
fn parse_optional_key(id: Option<&str>, operation: &'static str) -> Option<Option<Uuid>> {
    match id {
        None => Some(None),
        Some(raw) => parse_key(raw, operation).map(Some),
    }
}

/// PostgresRepository
///
/// The live data source, backed by the hosted Postgres database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the users behind a set of ids in one round trip.
    async fn users_by_ids(&self, ids: Vec<Uuid>) -> HashMap<Uuid, User> {
        if ids.is_empty() {
            return HashMap::new();
        }
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        match sqlx::query_as::<_, UserRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
        {
            Ok(rows) => rows.into_iter().map(|row| (row.id, User::from(row))).collect(),
            Err(e) => {
                tracing::error!("users_by_ids error: {:?}", e);
                HashMap::new()
            }
        }
    }

    async fn categories_by_ids(&self, ids: Vec<Uuid>) -> HashMap<Uuid, Category> {
        if ids.is_empty() {
            return HashMap::new();
        }
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ANY($1)");
        match sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
        {
            Ok(rows) => rows
                .into_iter()
                .map(|row| (row.id, Category::from(row)))
                .collect(),
            Err(e) => {
                tracing::error!("categories_by_ids error: {:?}", e);
                HashMap::new()
            }
        }
    }

    /// hydrate_posts
    ///
    /// Translates rows into domain posts and attaches the author and category joins.
    /// A failed join leaves the field empty rather than dropping the post.
    async fn hydrate_posts(&self, rows: Vec<PostRow>) -> Vec<Post> {
        let mut author_ids: Vec<Uuid> = rows.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let mut category_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.category_id).collect();
        category_ids.sort_unstable();
        category_ids.dedup();

        let authors = self.users_by_ids(author_ids).await;
        let categories = self.categories_by_ids(category_ids).await;

        rows.into_iter()
            .map(|row| {
                let author = authors.get(&row.author_id).cloned();
                let category = row.category_id.and_then(|id| categories.get(&id).cloned());
                let mut post = Post::from(row);
                post.author = author;
                post.category = category;
                post
            })
            .collect()
    }

    async fn hydrate_comments(&self, rows: Vec<CommentRow>) -> Vec<Comment> {
        let mut author_ids: Vec<Uuid> = rows.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors = self.users_by_ids(author_ids).await;

        rows.into_iter()
            .map(|row| {
                let author = authors.get(&row.author_id).cloned();
                let mut comment = Comment::from(row);
                comment.author = author;
                comment
            })
            .collect()
    }

    /// Shared body of the published-post listings. `filter` is the WHERE fragment
    /// for the single bound parameter `$1`.
    async fn published_posts<T>(&self, filter: &str, value: T, operation: &'static str) -> Vec<Post>
    where
        T: for<'q> sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Send + 'static,
    {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE {filter} AND status = 'published' \
             ORDER BY created_at DESC"
        );
        match sqlx::query_as::<_, PostRow>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await
        {
            Ok(rows) => self.hydrate_posts(rows).await,
            Err(e) => {
                tracing::error!("{} error: {:?}", operation, e);
                vec![]
            }
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// get_post_by_id
    ///
    /// Single post with its author and category joined.
    async fn get_post_by_id(&self, id: &str) -> Option<Post> {
        let key = parse_key(id, "get_post_by_id")?;
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_post_by_id error: {:?}", e);
                None
            })?;
        self.hydrate_posts(vec![row]).await.pop()
    }

    async fn get_posts_by_category(&self, category_id: &str) -> Vec<Post> {
        match parse_key(category_id, "get_posts_by_category") {
            Some(key) => {
                self.published_posts("category_id = $1", key, "get_posts_by_category")
                    .await
            }
            None => vec![],
        }
    }

    async fn get_posts_by_type(&self, post_type: PostType) -> Vec<Post> {
        self.published_posts("type = $1", post_type.as_str(), "get_posts_by_type")
            .await
    }

    /// get_posts_by_tag
    ///
    /// Tags are stored inline as a `text[]` column on the post.
    async fn get_posts_by_tag(&self, tag: &str) -> Vec<Post> {
        self.published_posts("$1 = ANY(tags)", tag.to_string(), "get_posts_by_tag")
            .await
    }

    async fn get_posts_by_author(&self, author_id: &str) -> Vec<Post> {
        match parse_key(author_id, "get_posts_by_author") {
            Some(key) => {
                self.published_posts("author_id = $1", key, "get_posts_by_author")
                    .await
            }
            None => vec![],
        }
    }

    /// increment_post_views
    ///
    /// Delegates to the `increment_post_views` stored procedure so the counter is
    /// bumped server-side.
    async fn increment_post_views(&self, id: &str) {
        let Some(key) = parse_key(id, "increment_post_views") else {
            return;
        };
        if let Err(e) = sqlx::query("SELECT increment_post_views($1)")
            .bind(key)
            .execute(&self.pool)
            .await
        {
            tracing::error!("increment_post_views error: {:?}", e);
        }
    }

    /// create_post
    ///
    /// Inserts the post (snake_case columns) and returns the stored row translated
    /// back into the domain shape. Joins are not loaded on the returned value.
    async fn create_post(&self, post: NewPost) -> Option<Post> {
        let author_id = parse_key(&post.author_id, "create_post")?;
        let category_id = parse_optional_key(post.category_id.as_deref(), "create_post")?;
        let accepted_answer_id =
            parse_optional_key(post.accepted_answer_id.as_deref(), "create_post")?;

        let sql = format!(
            "INSERT INTO posts (title, content, author_id, category_id, type, status, tags, \
             likes_count, comments_count, views_count, images, is_solved, accepted_answer_id, \
             excerpt, reading_time, price, availability, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 0, 0, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, PostRow>(&sql)
            .bind(post.title)
            .bind(post.content)
            .bind(author_id)
            .bind(category_id)
            .bind(post.post_type.as_str())
            .bind(post.status.unwrap_or(PostStatus::Published).as_str())
            .bind(post.tags.unwrap_or_default())
            .bind(post.images.unwrap_or_default())
            .bind(post.is_solved.unwrap_or(false))
            .bind(accepted_answer_id)
            .bind(post.excerpt)
            .bind(post.reading_time)
            .bind(post.price)
            .bind(post.availability.map(|a| a.as_str()))
            .bind(post.metadata)
            .fetch_one(&self.pool)
            .await
            .map(Post::from)
            .map_err(|e| tracing::error!("create_post error: {:?}", e))
            .ok()
    }

    /// get_comments_by_post_id
    ///
    /// All comments for a post, oldest first, authors joined.
    async fn get_comments_by_post_id(&self, post_id: &str) -> Vec<Comment> {
        let Some(key) = parse_key(post_id, "get_comments_by_post_id") else {
            return vec![];
        };
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = $1 ORDER BY created_at ASC"
        );
        match sqlx::query_as::<_, CommentRow>(&sql)
            .bind(key)
            .fetch_all(&self.pool)
            .await
        {
            Ok(rows) => self.hydrate_comments(rows).await,
            Err(e) => {
                tracing::error!("get_comments_by_post_id error: {:?}", e);
                vec![]
            }
        }
    }

    /// create_comment
    ///
    /// Inserts a comment. The post's `comments_count` is maintained by the store.
    async fn create_comment(&self, comment: NewComment) -> Option<Comment> {
        let post_id = parse_key(&comment.post_id, "create_comment")?;
        // The live store has no guest account; an anonymous comment cannot be stored.
        let author_id = parse_key(comment.author_id.as_deref()?, "create_comment")?;
        let parent_id = parse_optional_key(comment.parent_id.as_deref(), "create_comment")?;

        let sql = format!(
            "INSERT INTO comments (content, author_id, post_id, parent_id, likes_count, is_accepted) \
             VALUES ($1, $2, $3, $4, 0, $5) RETURNING {COMMENT_COLUMNS}"
        );
        sqlx::query_as::<_, CommentRow>(&sql)
            .bind(comment.content)
            .bind(author_id)
            .bind(post_id)
            .bind(parent_id)
            .bind(comment.is_accepted.unwrap_or(false))
            .fetch_one(&self.pool)
            .await
            .map(Comment::from)
            .map_err(|e| tracing::error!("create_comment error: {:?}", e))
            .ok()
    }

    /// toggle_like
    ///
    /// Read-modify-write: look for an existing like, delete it if present, insert
    /// one otherwise. Any store error reports `false`.
    async fn toggle_like(&self, user_id: &str, target_type: TargetType, target_id: &str) -> bool {
        let (Some(user_key), Some(target_key)) = (
            parse_key(user_id, "toggle_like"),
            parse_key(target_id, "toggle_like"),
        ) else {
            return false;
        };

        let existing: Option<Uuid> = match sqlx::query_scalar(
            "SELECT id FROM likes WHERE user_id = $1 AND target_type = $2 AND target_id = $3",
        )
        .bind(user_key)
        .bind(target_type.as_str())
        .bind(target_key)
        .fetch_optional(&self.pool)
        .await
        {
            Ok(found) => found,
            Err(e) => {
                tracing::error!("toggle_like check error: {:?}", e);
                return false;
            }
        };

        match existing {
            Some(like_id) => {
                if let Err(e) = sqlx::query("DELETE FROM likes WHERE id = $1")
                    .bind(like_id)
                    .execute(&self.pool)
                    .await
                {
                    tracing::error!("toggle_like delete error: {:?}", e);
                }
                false
            }
            None => match sqlx::query(
                "INSERT INTO likes (user_id, target_type, target_id) VALUES ($1, $2, $3)",
            )
            .bind(user_key)
            .bind(target_type.as_str())
            .bind(target_key)
            .execute(&self.pool)
            .await
            {
                Ok(_) => true,
                Err(e) => {
                    tracing::error!("toggle_like insert error: {:?}", e);
                    false
                }
            },
        }
    }

    async fn get_user_by_id(&self, id: &str) -> Option<User> {
        let key = parse_key(id, "get_user_by_id")?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user_by_id error: {:?}", e);
                None
            })
            .map(User::from)
    }

    async fn list_categories(&self) -> Vec<Category> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name ASC");
        match sqlx::query_as::<_, CategoryRow>(&sql)
            .fetch_all(&self.pool)
            .await
        {
            Ok(rows) => rows.into_iter().map(Category::from).collect(),
            Err(e) => {
                tracing::error!("list_categories error: {:?}", e);
                vec![]
            }
        }
    }

    async fn list_tags(&self) -> Vec<Tag> {
        match sqlx::query_as::<_, TagRow>(
            "SELECT id, name, slug, post_count, created_at, updated_at FROM tags ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(rows) => rows.into_iter().map(Tag::from).collect(),
            Err(e) => {
                tracing::error!("list_tags error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_notifications(&self, user_id: &str) -> Vec<Notification> {
        let Some(key) = parse_key(user_id, "get_notifications") else {
            return vec![];
        };
        sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, type, message, is_read, target_type, target_id, created_at, updated_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map(|rows| rows.into_iter().map(Notification::from).collect())
        .unwrap_or_else(|e| {
            tracing::error!("get_notifications error: {:?}", e);
            vec![]
        })
    }

    async fn get_user_settings(&self, user_id: &str) -> Option<UserSetting> {
        let key = parse_key(user_id, "get_user_settings")?;
        sqlx::query_as::<_, UserSettingRow>(
            r#"
            SELECT id, user_id, theme, notifications_enabled, email_notifications_enabled,
                   ads_enabled, is_premium, subscription_end_date, created_at, updated_at
            FROM user_settings
            WHERE user_id = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_user_settings error: {:?}", e);
            None
        })
        .map(UserSetting::from)
    }
}
