//! Integration tests for the notification inbox and email preferences.

use ems_db::models::notification::UpdatePreferences;
use ems_db::repositories::{NotificationRepo, PreferenceRepo, UserRepo};
use sqlx::PgPool;

async fn seed_user(pool: &PgPool, email: &str) -> i64 {
    UserRepo::create(pool, email, "Recipient", "$argon2id$fake-hash")
        .await
        .unwrap()
        .id
}

// ---------------------------------------------------------------------------
// Test: unread counting and read marking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_unread_count_and_mark_read(pool: PgPool) {
    let user = seed_user(&pool, "inbox@example.com").await;

    let first = NotificationRepo::create(&pool, user, "Mentioned", "You were mentioned", "mention", Some("/tasks"))
        .await
        .unwrap();
    NotificationRepo::create(&pool, user, "Assigned", "Task assigned to you", "info", None)
        .await
        .unwrap();

    assert_eq!(NotificationRepo::unread_count(&pool, user).await.unwrap(), 2);

    let marked = NotificationRepo::mark_read(&pool, first.id, user).await.unwrap();
    assert!(marked);
    assert_eq!(NotificationRepo::unread_count(&pool, user).await.unwrap(), 1);

    // Reading is terminal: marking again matches nothing.
    let again = NotificationRepo::mark_read(&pool, first.id, user).await.unwrap();
    assert!(!again);
}

// ---------------------------------------------------------------------------
// Test: mark_read is scoped to the owning user
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_mark_read_scoped_to_user(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com").await;
    let intruder = seed_user(&pool, "intruder@example.com").await;

    let note = NotificationRepo::create(&pool, owner, "Private", "for owner", "info", None)
        .await
        .unwrap();

    let marked = NotificationRepo::mark_read(&pool, note.id, intruder).await.unwrap();
    assert!(!marked, "another user's notification must not be markable");
}

// ---------------------------------------------------------------------------
// Test: mark all read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_mark_all_read(pool: PgPool) {
    let user = seed_user(&pool, "bulk@example.com").await;

    for i in 0..3 {
        NotificationRepo::create(&pool, user, "Ping", &format!("message {i}"), "info", None)
            .await
            .unwrap();
    }

    let marked = NotificationRepo::mark_all_read(&pool, user).await.unwrap();
    assert_eq!(marked, 3);
    assert_eq!(NotificationRepo::unread_count(&pool, user).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Test: unread-only listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_unread_only_listing(pool: PgPool) {
    let user = seed_user(&pool, "filter@example.com").await;

    let read_me = NotificationRepo::create(&pool, user, "Old", "seen already", "info", None)
        .await
        .unwrap();
    NotificationRepo::create(&pool, user, "New", "not yet seen", "info", None)
        .await
        .unwrap();
    NotificationRepo::mark_read(&pool, read_me.id, user).await.unwrap();

    let unread = NotificationRepo::list_for_user(&pool, user, true, 50, 0).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].title, "New");

    let all = NotificationRepo::list_for_user(&pool, user, false, 50, 0).await.unwrap();
    assert_eq!(all.len(), 2);
}

// ---------------------------------------------------------------------------
// Test: email preferences default to enabled and upsert partially
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_preferences_default_and_upsert(pool: PgPool) {
    let user = seed_user(&pool, "prefs@example.com").await;

    // No row yet: everything defaults to enabled.
    assert!(PreferenceRepo::mention_email_enabled(&pool, user).await.unwrap());
    assert!(PreferenceRepo::assignment_email_enabled(&pool, user).await.unwrap());

    // Turn off mention emails only.
    let prefs = PreferenceRepo::upsert(
        &pool,
        user,
        &UpdatePreferences {
            email_on_mention: Some(false),
            email_on_assignment: None,
        },
    )
    .await
    .unwrap();
    assert!(!prefs.email_on_mention);
    assert!(prefs.email_on_assignment);

    assert!(!PreferenceRepo::mention_email_enabled(&pool, user).await.unwrap());
    assert!(PreferenceRepo::assignment_email_enabled(&pool, user).await.unwrap());
}
