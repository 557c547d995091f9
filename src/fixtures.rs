use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio::sync::RwLock;

use crate::{
    models::{
        Availability, Category, Comment, NewComment, NewPost, Notification, Post, PostStatus,
        PostType, Role, Tag, TargetType, Theme, User, UserSetting,
    },
    repository::Repository,
};

/// Author recorded on comments submitted without a signed-in user.
pub const GUEST_USER_ID: &str = "guest-user-id";

/// Accounts the in-memory auth provider starts with, as (user id, email). All of
/// them sign in with `DEMO_PASSWORD`.
pub const DEMO_ACCOUNTS: [(&str, &str); 3] = [
    ("user-1", "curious_asker@example.com"),
    ("user-4", "kim_dev@example.com"),
    ("user-5", "choi_backend@example.com"),
];
pub const DEMO_PASSWORD: &str = "Demo1234!";

/// Comment ids handed out at runtime start here, well clear of the seeded ones.
const FIRST_RUNTIME_COMMENT_ID: u64 = 1000;

fn at(timestamp: &str) -> DateTime<Utc> {
    timestamp.parse().unwrap_or_default()
}

fn slugify(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

fn user(id: &str, username: &str, display_name: &str, verified: bool, since: &str) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        display_name: display_name.to_string(),
        email: format!("{}@example.com", username),
        avatar: None,
        bio: None,
        role: Role::User,
        is_verified: verified,
        followers: Some(0),
        following: Some(0),
        post_count: Some(0),
        created_at: at(since),
        updated_at: at(since),
    }
}

fn category(id: &str, name: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        slug: slugify(name),
        description: None,
        parent_id: None,
        post_count: Some(0),
        created_at: at("2023-08-01T00:00:00Z"),
        updated_at: at("2023-08-01T00:00:00Z"),
    }
}

fn tag(id: &str, name: &str) -> Tag {
    Tag {
        id: id.to_string(),
        name: name.to_string(),
        slug: slugify(name),
        post_count: Some(3),
        created_at: at("2023-08-01T00:00:00Z"),
        updated_at: at("2023-08-01T00:00:00Z"),
    }
}

/// A published post with the fields every type shares. Type-specific fields are
/// filled in by the callers below.
#[allow(clippy::too_many_arguments)]
fn post(
    id: &str,
    post_type: PostType,
    title: Option<&str>,
    content: &str,
    author_id: &str,
    category_id: Option<&str>,
    tags: &[&str],
    (likes, comments, views): (i32, i32, i32),
    created: &str,
) -> Post {
    Post {
        id: id.to_string(),
        title: title.map(str::to_string),
        content: content.to_string(),
        author_id: author_id.to_string(),
        author: None,
        category_id: category_id.map(str::to_string),
        category: None,
        post_type,
        status: PostStatus::Published,
        tags: Some(tags.iter().map(|t| t.to_string()).collect()),
        likes_count: likes,
        comments_count: comments,
        views_count: views,
        images: None,
        is_solved: None,
        accepted_answer_id: None,
        excerpt: None,
        reading_time: None,
        price: None,
        availability: None,
        metadata: None,
        created_at: at(created),
        updated_at: at(created),
    }
}

#[allow(clippy::too_many_arguments)]
fn forum_post(
    id: &str,
    title: &str,
    content: &str,
    author_id: &str,
    category_id: &str,
    counts: (i32, i32, i32),
    solved: bool,
    created: &str,
) -> Post {
    Post {
        is_solved: Some(solved),
        ..post(
            id,
            PostType::Forum,
            Some(title),
            content,
            author_id,
            Some(category_id),
            &["demo", "test"],
            counts,
            created,
        )
    }
}

fn social_post(
    id: &str,
    content: &str,
    author_id: &str,
    tags: &[&str],
    counts: (i32, i32, i32),
    created: &str,
) -> Post {
    Post {
        images: Some(vec![]),
        ..post(id, PostType::Social, None, content, author_id, None, tags, counts, created)
    }
}

#[allow(clippy::too_many_arguments)]
fn blog_post(
    id: &str,
    title: &str,
    content: &str,
    author_id: &str,
    tags: &[&str],
    counts: (i32, i32, i32),
    (excerpt, reading_time): (&str, i32),
    created: &str,
) -> Post {
    Post {
        excerpt: Some(excerpt.to_string()),
        reading_time: Some(reading_time),
        ..post(id, PostType::Blog, Some(title), content, author_id, Some("1"), tags, counts, created)
    }
}

#[allow(clippy::too_many_arguments)]
fn product_post(
    id: &str,
    title: &str,
    content: &str,
    author_id: &str,
    tags: &[&str],
    counts: (i32, i32, i32),
    (price, availability): (f64, Availability),
    created: &str,
) -> Post {
    Post {
        price: Some(price),
        availability: Some(availability),
        ..post(id, PostType::Ecommerce, Some(title), content, author_id, Some("3"), tags, counts, created)
    }
}

fn comment(
    id: &str,
    post_id: &str,
    author_id: &str,
    content: &str,
    likes: i32,
    accepted: bool,
    created: &str,
) -> Comment {
    Comment {
        id: id.to_string(),
        content: content.to_string(),
        author_id: author_id.to_string(),
        author: None,
        post_id: post_id.to_string(),
        parent_id: None,
        likes_count: likes,
        is_accepted: Some(accepted),
        created_at: at(created),
        updated_at: at(created),
    }
}

struct FixtureState {
    users: Vec<User>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    // Stored without joins; `author` and `category` are attached on read.
    posts: Vec<Post>,
    comments: Vec<Comment>,
    likes: HashSet<(String, TargetType, String)>,
    next_comment_id: u64,
}

impl FixtureState {
    fn seeded() -> Self {
        let users = vec![
            user("user-1", "curious_asker", "Curious Asker", true, "2023-07-01T00:00:00Z"),
            user("user-2", "new_coder", "New Coder", true, "2023-07-02T00:00:00Z"),
            user("user-3", "design_lover", "Design Lover", true, "2023-07-03T00:00:00Z"),
            user("user-101", "dev_a", "Developer A", true, "2023-07-10T00:00:00Z"),
            user("user-102", "frontend_dev", "Frontend Developer", true, "2023-07-10T00:00:00Z"),
            user("user-103", "senior_dev", "Senior Developer", true, "2023-07-10T00:00:00Z"),
            user("user-104", "ts_master", "TS Master", true, "2023-07-10T00:00:00Z"),
            user("user-105", "ux_designer", "UX Designer", true, "2023-07-10T00:00:00Z"),
            User {
                role: Role::Admin,
                ..user("user-4", "kim_dev", "Kim Dev", true, "2023-01-01T00:00:00Z")
            },
            User {
                role: Role::Moderator,
                ..user("user-5", "choi_backend", "Choi Backend", true, "2023-01-04T00:00:00Z")
            },
            user(GUEST_USER_ID, "guest", "Guest", false, "2023-07-01T00:00:00Z"),
        ];

        let categories = vec![
            category("1", "Programming"),
            category("2", "Design"),
            category("3", "Business"),
        ];
        let tags = vec![tag("1", "demo"), tag("2", "test")];

        let posts = vec![
            forum_post(
                "1",
                "How should I fetch data in Next.js?",
                "What is the most efficient way to load API data in a Next.js project? \
                 Would you pick React Query or SWR?",
                "user-1",
                "1",
                (8, 5, 42),
                false,
                "2023-08-15T06:00:00Z",
            ),
            forum_post(
                "2",
                "Should I learn TypeScript or JavaScript first?",
                "I am about to start frontend development. Which one should come first, \
                 and what are the trade-offs?",
                "user-2",
                "1",
                (15, 12, 128),
                true,
                "2023-08-14T09:00:00Z",
            ),
            forum_post(
                "3",
                "UI design trends of 2023",
                "Let's talk about this year's UI/UX trends. Which styles are getting popular?",
                "user-3",
                "2",
                (10, 8, 95),
                false,
                "2023-08-13T12:00:00Z",
            ),
            social_post(
                "4",
                "Kicked off a new side project today. Looking forward to where it goes!",
                "user-4",
                &["dev", "project"],
                (24, 0, 56),
                "2023-08-12T08:30:00Z",
            ),
            social_post(
                "5",
                "Spent the weekend at a developer conference and came back full of ideas. \
                 #devconf #techtrends",
                "user-2",
                &["conference", "dev", "techtrends"],
                (42, 0, 128),
                "2023-08-11T14:20:00Z",
            ),
            social_post(
                "6",
                "Sharing a few thoughts on UI design trends. Minimalism keeps going strong.",
                "user-3",
                &["design", "ui", "trends"],
                (18, 0, 87),
                "2023-08-10T11:15:00Z",
            ),
            blog_post(
                "7",
                "What changed in React 18",
                "# What changed in React 18\n\n\
                 ## Highlights\n\n\
                 1. **Automatic batching** groups several state updates into one render.\n\
                 2. **Concurrent rendering** lets updates be prioritised.\n\
                 3. **New hooks** such as useTransition and useDeferredValue.\n\n\
                 ## Migration notes\n\n\
                 Some patterns that worked in React 17 behave differently, and TypeScript \
                 users need updated type definitions.",
                "user-4",
                &["react", "javascript", "frontend"],
                (35, 0, 245),
                (
                    "The main new features of React 18 and what to watch out for when migrating.",
                    5,
                ),
                "2023-08-05T10:20:00Z",
            ),
            blog_post(
                "8",
                "Five tips for managing state",
                "# Five tips for managing state\n\n\
                 1. Keep state minimal and derive the rest.\n\
                 2. Put state at the narrowest scope that works.\n\
                 3. Never mutate state in place.\n\
                 4. Model loading and error states explicitly.\n\
                 5. Use the devtools to trace changes.",
                "user-3",
                &["react", "state", "javascript"],
                (42, 0, 310),
                (
                    "Five practical tips for keeping state manageable in a growing application.",
                    7,
                ),
                "2023-08-01T09:15:00Z",
            ),
            product_post(
                "9",
                "Ergonomic keyboard for developers",
                "An ergonomic keyboard tuned for long coding sessions. Eases wrist strain \
                 and helps with typing speed.",
                "user-5",
                &["keyboard", "ergonomics", "gear"],
                (12, 0, 180),
                (129000.0, Availability::InStock),
                "2023-08-08T08:40:00Z",
            ),
            product_post(
                "10",
                "Focus music collection for programmers",
                "A lo-fi collection for deep work: white noise and calm melodies.",
                "user-5",
                &["music", "focus", "gear"],
                (8, 0, 95),
                (9900.0, Availability::PreOrder),
                "2023-08-07T13:25:00Z",
            ),
        ];

        let comments = vec![
            comment(
                "101",
                "1",
                "user-101",
                "React Query. Caching, background refetching and invalidation come for free.",
                3,
                false,
                "2023-08-15T08:30:00Z",
            ),
            comment(
                "102",
                "1",
                "user-102",
                "SWR is a good fit as well. It comes from Vercel, plays nicely with Next.js \
                 and is simpler to set up.",
                5,
                true,
                "2023-08-15T09:15:00Z",
            ),
            comment(
                "103",
                "2",
                "user-103",
                "Start with JavaScript to learn the fundamentals, then move to TypeScript. \
                 The learning curve is gentler that way.",
                8,
                true,
                "2023-08-16T10:00:00Z",
            ),
            comment(
                "104",
                "2",
                "user-104",
                "Go straight to TypeScript. The type system catches a lot of mistakes and \
                 the editor support makes you faster.",
                6,
                false,
                "2023-08-16T12:30:00Z",
            ),
            comment(
                "105",
                "3",
                "user-105",
                "Neumorphism and dark mode are still going strong, and micro-interactions \
                 matter more every year.",
                4,
                false,
                "2023-08-17T14:20:00Z",
            ),
        ];

        Self {
            users,
            categories,
            tags,
            posts,
            comments,
            likes: HashSet::new(),
            next_comment_id: FIRST_RUNTIME_COMMENT_ID,
        }
    }

    fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn joined_post(&self, post: &Post) -> Post {
        let mut post = post.clone();
        post.author = self.user(&post.author_id).cloned();
        post.category = post
            .category_id
            .as_deref()
            .and_then(|id| self.categories.iter().find(|c| c.id == id))
            .cloned();
        post
    }

    fn joined_comment(&self, comment: &Comment) -> Comment {
        let mut comment = comment.clone();
        comment.author = self.user(&comment.author_id).cloned();
        comment
    }

    fn published_where(&self, keep: impl Fn(&Post) -> bool) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| p.status == PostStatus::Published && keep(p))
            .map(|p| self.joined_post(p))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    fn next_post_id(&self) -> String {
        let highest = self
            .posts
            .iter()
            .filter_map(|p| p.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (highest + 1).to_string()
    }

    /// Adds `delta` to the like counter of the target. Returns false when the target
    /// is not part of the fixture table.
    fn adjust_likes(&mut self, target_type: TargetType, target_id: &str, delta: i32) -> bool {
        let counter = match target_type {
            TargetType::Post => self
                .posts
                .iter_mut()
                .find(|p| p.id == target_id)
                .map(|p| &mut p.likes_count),
            TargetType::Comment => self
                .comments
                .iter_mut()
                .find(|c| c.id == target_id)
                .map(|c| &mut c.likes_count),
        };
        match counter {
            Some(count) => {
                *count = (*count + delta).max(0);
                true
            }
            None => false,
        }
    }
}

/// FixtureRepository
///
/// The demo data source. Serves a few posts of every community type (ids 1 to 3 are
/// the forum questions with their answers), their authors, three categories and two
/// tags entirely from memory. Writes only ever touch this
/// instance; nothing is persisted and every process starts from the same records.
pub struct FixtureRepository {
    state: RwLock<FixtureState>,
}

impl FixtureRepository {
    pub fn seeded() -> Self {
        Self {
            state: RwLock::new(FixtureState::seeded()),
        }
    }
}

impl Default for FixtureRepository {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl Repository for FixtureRepository {
    async fn get_post_by_id(&self, id: &str) -> Option<Post> {
        let state = self.state.read().await;
        let found = state.posts.iter().find(|p| p.id == id);
        if found.is_none() {
            tracing::debug!("fixture post `{}` not found", id);
        }
        found.map(|p| state.joined_post(p))
    }

    async fn get_posts_by_category(&self, category_id: &str) -> Vec<Post> {
        self.state
            .read()
            .await
            .published_where(|p| p.category_id.as_deref() == Some(category_id))
    }

    async fn get_posts_by_type(&self, post_type: PostType) -> Vec<Post> {
        self.state
            .read()
            .await
            .published_where(|p| p.post_type == post_type)
    }

    async fn get_posts_by_tag(&self, tag: &str) -> Vec<Post> {
        self.state
            .read()
            .await
            .published_where(|p| p.tags.iter().flatten().any(|t| t == tag))
    }

    async fn get_posts_by_author(&self, author_id: &str) -> Vec<Post> {
        self.state
            .read()
            .await
            .published_where(|p| p.author_id == author_id)
    }

    async fn increment_post_views(&self, id: &str) {
        let mut state = self.state.write().await;
        match state.posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                post.views_count += 1;
                tracing::debug!("fixture post {} views: {}", id, post.views_count);
            }
            None => tracing::debug!("fixture post `{}` not found, views unchanged", id),
        }
    }

    async fn create_post(&self, new_post: NewPost) -> Option<Post> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let post = Post {
            id: state.next_post_id(),
            title: new_post.title,
            content: new_post.content,
            author_id: new_post.author_id,
            author: None,
            category_id: new_post.category_id,
            category: None,
            post_type: new_post.post_type,
            status: new_post.status.unwrap_or(PostStatus::Published),
            tags: new_post.tags,
            likes_count: 0,
            comments_count: 0,
            views_count: 0,
            images: new_post.images,
            is_solved: new_post.is_solved,
            accepted_answer_id: new_post.accepted_answer_id,
            excerpt: new_post.excerpt,
            reading_time: new_post.reading_time,
            price: new_post.price,
            availability: new_post.availability,
            metadata: new_post.metadata,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(post.clone());
        tracing::info!("fixture post {} created", post.id);
        Some(post)
    }

    async fn get_comments_by_post_id(&self, post_id: &str) -> Vec<Comment> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| state.joined_comment(c))
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        comments
    }

    /// create_comment
    ///
    /// Appends the comment and bumps the parent post's answer counter. Comments on
    /// posts outside the fixture table are refused.
    async fn create_comment(&self, new_comment: NewComment) -> Option<Comment> {
        let mut state = self.state.write().await;
        let Some(post) = state.posts.iter_mut().find(|p| p.id == new_comment.post_id) else {
            tracing::debug!("fixture post `{}` not found, comment refused", new_comment.post_id);
            return None;
        };
        post.comments_count += 1;
        tracing::debug!("fixture post {} comments: {}", post.id, post.comments_count);

        let now = Utc::now();
        let id = state.next_comment_id;
        state.next_comment_id += 1;

        let comment = Comment {
            id: id.to_string(),
            content: new_comment.content,
            author_id: new_comment
                .author_id
                .unwrap_or_else(|| GUEST_USER_ID.to_string()),
            author: None,
            post_id: new_comment.post_id,
            parent_id: new_comment.parent_id,
            likes_count: 0,
            is_accepted: Some(new_comment.is_accepted.unwrap_or(false)),
            created_at: now,
            updated_at: now,
        };

        state.comments.push(comment.clone());
        Some(state.joined_comment(&comment))
    }

    async fn toggle_like(&self, user_id: &str, target_type: TargetType, target_id: &str) -> bool {
        let mut state = self.state.write().await;
        let key = (user_id.to_string(), target_type, target_id.to_string());

        if state.likes.contains(&key) {
            state.likes.remove(&key);
            state.adjust_likes(target_type, target_id, -1);
            return false;
        }
        if !state.adjust_likes(target_type, target_id, 1) {
            tracing::debug!("fixture {} `{}` not found, like ignored", target_type, target_id);
            return false;
        }
        state.likes.insert(key);
        true
    }

    async fn get_user_by_id(&self, id: &str) -> Option<User> {
        self.state.read().await.user(id).cloned()
    }

    async fn list_categories(&self) -> Vec<Category> {
        self.state.read().await.categories.clone()
    }

    async fn list_tags(&self) -> Vec<Tag> {
        self.state.read().await.tags.clone()
    }

    async fn get_notifications(&self, _user_id: &str) -> Vec<Notification> {
        vec![]
    }

    /// Every user gets the default preferences; the fixtures hold no stored settings.
    async fn get_user_settings(&self, user_id: &str) -> Option<UserSetting> {
        if user_id.is_empty() {
            return None;
        }
        let now = Utc::now();
        Some(UserSetting {
            id: format!("settings-{}", user_id),
            user_id: user_id.to_string(),
            theme: Theme::System,
            notifications_enabled: true,
            email_notifications_enabled: false,
            ads_enabled: true,
            is_premium: false,
            subscription_end_date: None,
            created_at: now,
            updated_at: now,
        })
    }
}
