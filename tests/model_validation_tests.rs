use chrono::Utc;
use community_kit::{
    models::{
        Availability, Comment, CommentRow, NotificationRow, Post, PostRow, PostStatus, PostType,
        Role, SignInRequest, SignUpRequest, UserRow,
    },
    validation::field_errors,
};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

fn post_row() -> PostRow {
    PostRow {
        id: Uuid::new_v4(),
        title: Some("Listing".to_string()),
        content: "A used bike".to_string(),
        author_id: Uuid::new_v4(),
        category_id: None,
        post_type: "ecommerce".to_string(),
        status: "published".to_string(),
        tags: Some(vec!["bikes".to_string()]),
        likes_count: 5,
        comments_count: 2,
        views_count: 40,
        images: None,
        is_solved: None,
        accepted_answer_id: None,
        excerpt: None,
        reading_time: None,
        price: Some(120.0),
        availability: Some("in_stock".to_string()),
        metadata: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// --- Row Translation ---

#[test]
fn test_post_row_translates_to_camel_case() {
    let row = post_row();
    let id = row.id;
    let post = Post::from(row);

    assert_eq!(post.id, id.to_string());
    assert_eq!(post.likes_count, 5);
    assert_eq!(post.post_type, PostType::Ecommerce);
    assert_eq!(post.availability, Some(Availability::InStock));

    let json = serde_json::to_value(&post).unwrap();
    assert_eq!(json["likesCount"], Value::from(5));
    assert_eq!(json["commentsCount"], Value::from(2));
    assert_eq!(json["type"], Value::from("ecommerce"));
    assert_eq!(json["availability"], Value::from("in_stock"));
    assert!(json.get("likes_count").is_none());
    assert!(json.get("post_type").is_none());
    // Groups of other post types are omitted, not null.
    assert!(json.get("isSolved").is_none());
    assert!(json.get("readingTime").is_none());
}

#[test]
fn test_unknown_enum_text_falls_back_instead_of_dropping_the_row() {
    let row = PostRow {
        status: "hidden".to_string(),
        availability: Some("discontinued".to_string()),
        ..post_row()
    };
    let post = Post::from(row);

    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.availability, None);
}

#[test]
fn test_comment_and_user_rows() {
    let comment = Comment::from(CommentRow {
        id: Uuid::new_v4(),
        content: "Agreed".to_string(),
        author_id: Uuid::new_v4(),
        post_id: Uuid::new_v4(),
        parent_id: None,
        likes_count: 5,
        is_accepted: Some(true),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    });
    let json = serde_json::to_value(&comment).unwrap();
    assert_eq!(json["likesCount"], Value::from(5));
    assert_eq!(json["isAccepted"], Value::from(true));
    assert!(json["parentId"].is_null());

    let user = community_kit::models::User::from(UserRow {
        id: Uuid::new_v4(),
        username: "mod".to_string(),
        display_name: "The Moderator".to_string(),
        email: "mod@example.com".to_string(),
        avatar: None,
        bio: None,
        role: "moderator".to_string(),
        is_verified: true,
        followers: Some(3),
        following: None,
        post_count: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    });
    assert_eq!(user.role, Role::Moderator);
    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["displayName"], Value::from("The Moderator"));
    assert_eq!(json["isVerified"], Value::from(true));
}

#[test]
fn test_notification_type_uses_type_key() {
    let notification = community_kit::models::Notification::from(NotificationRow {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        notification_type: "like".to_string(),
        message: "Someone liked your post".to_string(),
        is_read: false,
        target_type: Some("post".to_string()),
        target_id: Some(Uuid::new_v4()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    });

    let json_output = serde_json::to_string(&notification).unwrap();
    assert!(json_output.contains(r#""type":"like""#));
    assert!(json_output.contains(r#""targetType":"post""#));
    assert!(!json_output.contains("notification_type"));
}

// --- Form Validation ---

#[test]
fn test_sign_in_rules() {
    let ok = SignInRequest {
        email: "a@b.co".to_string(),
        password: "123456".to_string(),
    };
    assert!(ok.validate().is_ok());

    let bad = SignInRequest {
        email: "not-an-email".to_string(),
        password: "12345".to_string(),
    };
    let fields = field_errors(&bad.validate().unwrap_err());
    assert!(fields.contains_key("email"));
    assert_eq!(
        fields["password"],
        vec!["Password must be at least 6 characters.".to_string()]
    );
}

#[test]
fn test_sign_up_rejects_weak_password_and_mismatch_per_field() {
    let weak = SignUpRequest {
        email: "a@b.co".to_string(),
        password: "password".to_string(),
        confirm_password: "passw0rd".to_string(),
    };
    let fields = field_errors(&weak.validate().unwrap_err());
    assert!(fields.contains_key("password"));
    assert_eq!(
        fields["confirm_password"],
        vec!["Passwords do not match.".to_string()]
    );
    assert!(!fields.contains_key("email"));

    let strong = SignUpRequest {
        email: "a@b.co".to_string(),
        password: "Str0ng!pass".to_string(),
        confirm_password: "Str0ng!pass".to_string(),
    };
    assert!(strong.validate().is_ok());
}

#[test]
fn test_sign_up_request_uses_camel_case_confirmation() {
    let parsed: SignUpRequest = serde_json::from_str(
        r#"{"email":"a@b.co","password":"Str0ng!pass","confirmPassword":"Str0ng!pass"}"#,
    )
    .unwrap();
    assert_eq!(parsed.confirm_password, "Str0ng!pass");
}
