use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation;

// --- Text-backed Enumerations ---

/// UnknownVariant
///
/// Returned when a text column (or query parameter) holds a value outside of the
/// known set for one of the enumerations below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant `{}`", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

/// Wires `as_str`, `FromStr` and `Display` onto an enum whose values are stored as
/// plain `text` columns in the external store.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Role
///
/// The RBAC field of a community member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Admin,
    Moderator,
}

text_enum!(Role { User => "user", Admin => "admin", Moderator => "moderator" });

/// PostType
///
/// The discriminator that selects which optional fields of a `Post` are meaningful.
/// The same four values double as the community-type selector of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PostType {
    #[default]
    Social,
    Forum,
    Blog,
    Ecommerce,
}

text_enum!(PostType {
    Social => "social",
    Forum => "forum",
    Blog => "blog",
    Ecommerce => "ecommerce",
});

impl PostType {
    pub const ALL: [PostType; 4] = [
        PostType::Social,
        PostType::Forum,
        PostType::Blog,
        PostType::Ecommerce,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PostStatus {
    #[default]
    Published,
    Draft,
    Archived,
}

text_enum!(PostStatus {
    Published => "published",
    Draft => "draft",
    Archived => "archived",
});

/// Availability
///
/// Stock state of a commerce listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Availability {
    InStock,
    OutOfStock,
    PreOrder,
}

text_enum!(Availability {
    InStock => "in_stock",
    OutOfStock => "out_of_stock",
    PreOrder => "pre_order",
});

/// TargetType
///
/// What a like points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TargetType {
    Post,
    Comment,
}

text_enum!(TargetType { Post => "post", Comment => "comment" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NotificationType {
    Like,
    Comment,
    Follow,
    Mention,
    #[default]
    System,
}

text_enum!(NotificationType {
    Like => "like",
    Comment => "comment",
    Follow => "follow",
    Mention => "mention",
    System => "system",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NotificationTarget {
    Post,
    Comment,
    User,
}

text_enum!(NotificationTarget { Post => "post", Comment => "comment", User => "user" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

text_enum!(Theme { Light => "light", Dark => "dark", System => "system" });

/// Parses a text column into one of the enumerations above. Unknown values are
/// logged and replaced by the enum default so a single bad row never hides a record.
fn parse_or_default<T>(value: &str, column: &'static str) -> T
where
    T: FromStr<Err = UnknownVariant> + Default,
{
    value.parse().unwrap_or_else(|e: UnknownVariant| {
        tracing::warn!("{} column holds {}; falling back to default", column, e);
        T::default()
    })
}

fn parse_optional<T>(value: Option<&str>, column: &'static str) -> Option<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    value.and_then(|v| match v.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("{} column holds {}; treating as absent", column, e);
            None
        }
    })
}

// --- Domain Objects (camelCase on the wire) ---

/// User
///
/// A community member as exposed to the UI. Mirrors the `public.users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    pub is_verified: bool,
    pub followers: Option<i32>,
    pub following: Option<i32>,
    pub post_count: Option<i32>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub post_count: Option<i32>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub post_count: Option<i32>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Post
///
/// The shared post model for every community type. `post_type` decides which of
/// the optional groups are meaningful:
/// - forum: `is_solved`, `accepted_answer_id`
/// - blog: `excerpt`, `reading_time`
/// - ecommerce: `price`, `availability`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Post {
    pub id: String,
    pub title: Option<String>,
    pub content: String,
    pub author_id: String,
    // Joined from `users` on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    pub category_id: Option<String>,
    // Joined from `categories` on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub status: PostStatus,
    pub tags: Option<Vec<String>>,
    pub likes_count: i32,
    pub comments_count: i32,
    pub views_count: i32,
    pub images: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_solved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_answer_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Comment
///
/// `parent_id` exists for threading but no screen renders nested replies yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub likes_count: i32,
    pub is_accepted: Option<bool>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Like
///
/// Join of a user to a post or a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Like {
    pub id: String,
    pub user_id: String,
    pub target_type: TargetType,
    pub target_id: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
    pub is_read: bool,
    pub target_type: Option<NotificationTarget>,
    pub target_id: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// UserSetting
///
/// Per-user preferences, including whether ad slots are rendered at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserSetting {
    pub id: String,
    pub user_id: String,
    pub theme: Theme,
    pub notifications_enabled: bool,
    pub email_notifications_enabled: bool,
    pub ads_enabled: bool,
    pub is_premium: bool,
    #[ts(type = "string | null")]
    pub subscription_end_date: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Store Rows (snake_case, as persisted) ---

/// UserRow
///
/// Raw `public.users` row. Converted to `User` through `From`.
#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct UserRow {
    pub id: uuid::Uuid,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub is_verified: bool,
    pub followers: Option<i32>,
    pub following: Option<i32>,
    pub post_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id.to_string(),
            username: row.username,
            display_name: row.display_name,
            email: row.email,
            avatar: row.avatar,
            bio: row.bio,
            role: parse_or_default(&row.role, "users.role"),
            is_verified: row.is_verified,
            followers: row.followers,
            following: row.following,
            post_count: row.post_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct CategoryRow {
    pub id: uuid::Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<uuid::Uuid>,
    pub post_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id.to_string(),
            name: row.name,
            slug: row.slug,
            description: row.description,
            parent_id: row.parent_id.map(|id| id.to_string()),
            post_count: row.post_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct TagRow {
    pub id: uuid::Uuid,
    pub name: String,
    pub slug: String,
    pub post_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Tag {
            id: row.id.to_string(),
            name: row.name,
            slug: row.slug,
            post_count: row.post_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostRow
///
/// Raw `public.posts` row. `type` is a reserved word in Rust, so the column is
/// read into `post_type` (same trick as the notification rows).
#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct PostRow {
    pub id: uuid::Uuid,
    pub title: Option<String>,
    pub content: String,
    pub author_id: uuid::Uuid,
    pub category_id: Option<uuid::Uuid>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub post_type: String,
    pub status: String,
    pub tags: Option<Vec<String>>,
    pub likes_count: i32,
    pub comments_count: i32,
    pub views_count: i32,
    pub images: Option<Vec<String>>,
    pub is_solved: Option<bool>,
    pub accepted_answer_id: Option<uuid::Uuid>,
    pub excerpt: Option<String>,
    pub reading_time: Option<i32>,
    pub price: Option<f64>,
    pub availability: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id.to_string(),
            title: row.title,
            content: row.content,
            author_id: row.author_id.to_string(),
            author: None,
            category_id: row.category_id.map(|id| id.to_string()),
            category: None,
            post_type: parse_or_default(&row.post_type, "posts.type"),
            status: parse_or_default(&row.status, "posts.status"),
            tags: row.tags,
            likes_count: row.likes_count,
            comments_count: row.comments_count,
            views_count: row.views_count,
            images: row.images,
            is_solved: row.is_solved,
            accepted_answer_id: row.accepted_answer_id.map(|id| id.to_string()),
            excerpt: row.excerpt,
            reading_time: row.reading_time,
            price: row.price,
            availability: parse_optional(row.availability.as_deref(), "posts.availability"),
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct CommentRow {
    pub id: uuid::Uuid,
    pub content: String,
    pub author_id: uuid::Uuid,
    pub post_id: uuid::Uuid,
    pub parent_id: Option<uuid::Uuid>,
    pub likes_count: i32,
    pub is_accepted: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id.to_string(),
            content: row.content,
            author_id: row.author_id.to_string(),
            author: None,
            post_id: row.post_id.to_string(),
            parent_id: row.parent_id.map(|id| id.to_string()),
            likes_count: row.likes_count,
            is_accepted: row.is_accepted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct NotificationRow {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: String,
    pub message: String,
    pub is_read: bool,
    pub target_type: Option<String>,
    pub target_id: Option<uuid::Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id.to_string(),
            user_id: row.user_id.to_string(),
            notification_type: parse_or_default(&row.notification_type, "notifications.type"),
            message: row.message,
            is_read: row.is_read,
            target_type: parse_optional(row.target_type.as_deref(), "notifications.target_type"),
            target_id: row.target_id.map(|id| id.to_string()),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct UserSettingRow {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub theme: String,
    pub notifications_enabled: bool,
    pub email_notifications_enabled: bool,
    pub ads_enabled: bool,
    pub is_premium: bool,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserSettingRow> for UserSetting {
    fn from(row: UserSettingRow) -> Self {
        UserSetting {
            id: row.id.to_string(),
            user_id: row.user_id.to_string(),
            theme: parse_or_default(&row.theme, "user_settings.theme"),
            notifications_enabled: row.notifications_enabled,
            email_notifications_enabled: row.email_notifications_enabled,
            ads_enabled: row.ads_enabled,
            is_premium: row.is_premium,
            subscription_end_date: row.subscription_end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// --- Repository Inputs ---

/// NewPost
///
/// Everything a data source needs to insert a post. Counters default to zero and the
/// status to `published` when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: Option<String>,
    pub content: String,
    pub author_id: String,
    pub category_id: Option<String>,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub is_solved: Option<bool>,
    pub accepted_answer_id: Option<String>,
    pub excerpt: Option<String>,
    pub reading_time: Option<i32>,
    pub price: Option<f64>,
    pub availability: Option<Availability>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    // Falls back to the guest author when absent.
    pub author_id: Option<String>,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub is_accepted: Option<bool>,
}

// --- Request Payloads (Input Schemas) ---

/// SignInRequest
///
/// Email/password sign-in form (POST /api/auth/sign-in).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct SignInRequest {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
}

/// SignUpRequest
///
/// Registration form (POST /api/auth/sign-up). The password is only passed through to
/// the external auth provider and never persisted or logged here.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SignUpRequest {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters."),
        custom(function = "validation::password_strength")
    )]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

/// UpdatePasswordRequest
///
/// Second half of the recovery flow: the user arrives from the emailed link with a
/// recovery session and picks a new password under the sign-up rules.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdatePasswordRequest {
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters."),
        custom(function = "validation::password_strength")
    )]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
}

/// CreatePostRequest
///
/// Post submission form. The author is always the signed-in user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    #[validate(custom(function = "validation::not_blank"))]
    pub content: String,
    pub category_id: Option<String>,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub excerpt: Option<String>,
    pub reading_time: Option<i32>,
    pub price: Option<f64>,
    pub availability: Option<Availability>,
}

impl CreatePostRequest {
    pub fn into_new_post(self, author_id: String) -> NewPost {
        NewPost {
            title: self.title,
            content: self.content.trim().to_string(),
            author_id,
            category_id: self.category_id,
            post_type: self.post_type,
            status: None,
            tags: self.tags,
            images: self.images,
            is_solved: None,
            accepted_answer_id: None,
            excerpt: self.excerpt,
            reading_time: self.reading_time,
            price: self.price,
            availability: self.availability,
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateCommentRequest {
    #[validate(
        length(max = 5000, message = "Comments are limited to 5000 characters."),
        custom(function = "validation::not_blank")
    )]
    pub content: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ToggleLikeRequest {
    pub target_type: TargetType,
    pub target_id: String,
}

// --- Response Schemas (Output) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ToggleLikeResponse {
    /// True when the like was added, false when it was removed (or could not be stored).
    pub liked: bool,
}

/// AuthConfigResponse
///
/// What the client needs to start an auth flow against the hosted provider.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthConfigResponse {
    pub url: String,
    pub redirect: String,
}

/// SessionResponse
///
/// Returned by sign-in/sign-up. Tokens are also mirrored into the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: Option<String>,
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
    /// True when the provider still waits for the email confirmation link.
    pub confirmation_pending: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct OAuthRedirectResponse {
    pub url: String,
}

/// MeResponse
///
/// The signed-in identity plus its community profile. Accounts that exist only at the
/// auth provider have no profile yet.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MeResponse {
    pub id: String,
    pub role: Role,
    pub email: Option<String>,
    pub profile: Option<User>,
}
