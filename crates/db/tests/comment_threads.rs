//! Integration tests for comment persistence: tombstone soft delete,
//! pinning, reactions, and threading over real rows.

use ems_core::comment::DELETED_PLACEHOLDER;
use ems_core::threading::build_threads;
use ems_db::models::comment::CreateComment;
use ems_db::models::task::CreateTask;
use ems_db::repositories::{CommentRepo, TaskRepo, UserRepo, WorkspaceRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_task(pool: &PgPool) -> (i64, i64) {
    let user = UserRepo::create(pool, "author@example.com", "Author", "$argon2id$fake-hash")
        .await
        .unwrap()
        .id;
    let statuses = serde_json::json!(ems_core::status::DEFAULT_STATUSES);
    let ws = WorkspaceRepo::create(pool, "Comment WS", user, &statuses)
        .await
        .unwrap()
        .id;
    let task = TaskRepo::create(
        pool,
        &CreateTask {
            workspace_id: ws,
            project_id: None,
            title: "Discussed task".to_string(),
            description: None,
            assignee_id: None,
            status: None,
            priority: None,
            due_date: None,
            start_date: None,
        },
        user,
    )
    .await
    .unwrap();
    (user, task.id)
}

fn new_comment(task_id: i64, body: &str, parent: Option<i64>) -> CreateComment {
    CreateComment {
        entity_type: "task".to_string(),
        entity_id: task_id,
        body: body.to_string(),
        parent_comment_id: parent,
    }
}

// ---------------------------------------------------------------------------
// Test: soft delete keeps the row and renders a placeholder
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_soft_delete_keeps_row_renders_placeholder(pool: PgPool) {
    let (user, task_id) = seed_task(&pool).await;

    let comment = CommentRepo::create(&pool, &new_comment(task_id, "hot take", None), user)
        .await
        .unwrap();

    let deleted = CommentRepo::soft_delete(&pool, comment.id, user).await.unwrap();
    assert!(deleted, "first soft delete should return true");

    let found = CommentRepo::find_by_id(&pool, comment.id)
        .await
        .unwrap()
        .expect("tombstoned row must still exist");
    assert!(found.is_deleted);
    assert_eq!(found.body, "hot take", "stored text is retained");
    assert_eq!(
        found.display_body(),
        DELETED_PLACEHOLDER,
        "rendered body is the placeholder, even for the author"
    );

    // The tombstone keeps its thread position.
    let listed = CommentRepo::list_for_entity(&pool, "task", task_id).await.unwrap();
    assert_eq!(listed.len(), 1);

    let again = CommentRepo::soft_delete(&pool, comment.id, user).await.unwrap();
    assert!(!again, "second soft delete should return false");
}

// ---------------------------------------------------------------------------
// Test: only the author can edit or delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_edit_scoped_to_author(pool: PgPool) {
    let (author, task_id) = seed_task(&pool).await;
    let other = UserRepo::create(&pool, "other@example.com", "Other", "$argon2id$fake-hash")
        .await
        .unwrap()
        .id;

    let comment = CommentRepo::create(&pool, &new_comment(task_id, "original", None), author)
        .await
        .unwrap();

    let denied = CommentRepo::update_body(&pool, comment.id, other, "hijacked")
        .await
        .unwrap();
    assert!(denied.is_none(), "non-author edit must not match");

    let edited = CommentRepo::update_body(&pool, comment.id, author, "revised")
        .await
        .unwrap()
        .expect("author edit should succeed");
    assert_eq!(edited.body, "revised");
    assert!(edited.edited_at.is_some());
}

// ---------------------------------------------------------------------------
// Test: threading over persisted rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_threads_from_persisted_rows(pool: PgPool) {
    let (user, task_id) = seed_task(&pool).await;

    let top_a = CommentRepo::create(&pool, &new_comment(task_id, "first", None), user)
        .await
        .unwrap();
    let reply = CommentRepo::create(
        &pool,
        &new_comment(task_id, "a reply", Some(top_a.id)),
        user,
    )
    .await
    .unwrap();
    let top_b = CommentRepo::create(&pool, &new_comment(task_id, "second", None), user)
        .await
        .unwrap();

    let comments = CommentRepo::list_for_entity(&pool, "task", task_id).await.unwrap();
    let threads = build_threads(comments);

    let top_ids: Vec<i64> = threads.top_level.iter().map(|c| c.id).collect();
    assert_eq!(top_ids.len(), 2);
    assert!(top_ids.contains(&top_a.id));
    assert!(top_ids.contains(&top_b.id));
    assert_eq!(threads.children[&top_a.id][0].id, reply.id);
}

// ---------------------------------------------------------------------------
// Test: pinned comments lead the thread listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_pinned_comment_leads_threads(pool: PgPool) {
    let (user, task_id) = seed_task(&pool).await;

    let old = CommentRepo::create(&pool, &new_comment(task_id, "old note", None), user)
        .await
        .unwrap();
    let newer = CommentRepo::create(&pool, &new_comment(task_id, "newer note", None), user)
        .await
        .unwrap();

    CommentRepo::set_pinned(&pool, old.id, true).await.unwrap().unwrap();

    let comments = CommentRepo::list_for_entity(&pool, "task", task_id).await.unwrap();
    let threads = build_threads(comments);
    let top_ids: Vec<i64> = threads.top_level.iter().map(|c| c.id).collect();
    assert_eq!(top_ids, vec![old.id, newer.id], "pinned first, then newest-first");
}

// ---------------------------------------------------------------------------
// Test: reaction toggling
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_reaction_toggle(pool: PgPool) {
    let (user, task_id) = seed_task(&pool).await;
    let comment = CommentRepo::create(&pool, &new_comment(task_id, "react to me", None), user)
        .await
        .unwrap();

    let reacted = CommentRepo::toggle_reaction(&pool, comment.id, "👍", user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reacted.reactions["👍"], serde_json::json!([user]));

    // Toggling again removes the reaction and prunes the emoji key.
    let unreacted = CommentRepo::toggle_reaction(&pool, comment.id, "👍", user)
        .await
        .unwrap()
        .unwrap();
    assert!(unreacted.reactions.get("👍").is_none());
}
