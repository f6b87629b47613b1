/// Integration tests for the tasktrack API
///
/// These tests require a running PostgreSQL database; the URL is taken
/// from DATABASE_URL (defaulting to a local tasktrack_test database).
///
/// They verify the full system end to end:
/// - Public signup vs authenticated task creation
/// - Assignment validation and replace semantics
/// - Per-user task lookup (missing parameter, unknown user, ordering)
/// - Default listing order
/// - Cascade behavior on user deletion
/// - Login and token refresh flow

mod common;

use axum::http::StatusCode;
use common::{assert_status, create_test_task, create_test_user, TestContext};
use serde_json::json;
use tasktrack_shared::models::task::Task;
use tasktrack_shared::models::user::User;

/// Creating a user without authentication succeeds (public signup)
#[tokio::test]
async fn test_signup_is_public() {
    let ctx = TestContext::new().await.unwrap();

    let username = common::unique_username();
    let response = ctx
        .request(
            "POST",
            "/v1/users",
            None,
            Some(json!({
                "username": username,
                "password": "MyP@ssw0rd!",
                "mobile": "5551234"
            })),
        )
        .await;

    let user = assert_status(response, StatusCode::CREATED).await;
    assert_eq!(user["username"], username.as_str());
    assert_eq!(user["mobile"], "5551234");
    assert!(
        user.get("password").is_none() && user.get("password_hash").is_none(),
        "Signup response must not echo the credential"
    );

    User::delete(&ctx.db, user["id"].as_i64().unwrap())
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Weak passwords and duplicate usernames are rejected
#[tokio::test]
async fn test_signup_rejections() {
    let ctx = TestContext::new().await.unwrap();

    let weak = ctx
        .request(
            "POST",
            "/v1/users",
            None,
            Some(json!({
                "username": common::unique_username(),
                "password": "weak"
            })),
        )
        .await;
    assert_status(weak, StatusCode::UNPROCESSABLE_ENTITY).await;

    let duplicate = ctx
        .request(
            "POST",
            "/v1/users",
            None,
            Some(json!({
                "username": ctx.user.username,
                "password": "MyP@ssw0rd!"
            })),
        )
        .await;
    assert_status(duplicate, StatusCode::CONFLICT).await;

    ctx.cleanup().await.unwrap();
}

/// Creating a task without authentication fails
#[tokio::test]
async fn test_task_create_requires_auth() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .request(
            "POST",
            "/v1/tasks",
            None,
            Some(json!({
                "name": "unauthenticated",
                "description": "should fail",
                "task_type": "BUG"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// Task creation fixes the creator and returns only the core fields
#[tokio::test]
async fn test_task_create_response_shape() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .request(
            "POST",
            "/v1/tasks",
            Some(&ctx.auth_header()),
            Some(json!({
                "name": "shape-test",
                "description": "creation response shape",
                "task_type": "DOCUMENTATION"
            })),
        )
        .await;

    let created = assert_status(response, StatusCode::CREATED).await;
    assert_eq!(created["name"], "shape-test");
    assert_eq!(created["status"], "PENDING");
    assert!(created.get("assigned_to").is_none());
    assert!(created.get("created_by").is_none());

    // The retrieve operation shows the server-side creator
    let task_id = created["id"].as_i64().unwrap();
    let response = ctx
        .request(
            "GET",
            &format!("/v1/tasks/{}", task_id),
            Some(&ctx.auth_header()),
            None,
        )
        .await;
    let full = assert_status(response, StatusCode::OK).await;
    assert_eq!(full["created_by"]["id"].as_i64().unwrap(), ctx.user.id);
    assert_eq!(full["assigned_to"].as_array().unwrap().len(), 0);

    ctx.cleanup().await.unwrap();
}

/// assign with an unknown ID fails and leaves the assigned set unchanged
#[tokio::test]
async fn test_assign_with_missing_user_fails_atomically() {
    let ctx = TestContext::new().await.unwrap();

    let a = create_test_user(&ctx).await;
    let b = create_test_user(&ctx).await;
    let task_id = create_test_task(&ctx, "assign-missing").await;

    // Seed the set with a valid assignment first
    let response = ctx
        .request(
            "POST",
            &format!("/v1/tasks/{}/assign", task_id),
            Some(&ctx.auth_header()),
            Some(json!({ "user_ids": [a.id] })),
        )
        .await;
    assert_status(response, StatusCode::OK).await;

    // A ghost ID makes the whole request fail
    let ghost = create_test_user(&ctx).await;
    let ghost_id = ghost.id;
    User::delete(&ctx.db, ghost_id).await.unwrap();

    let response = ctx
        .request(
            "POST",
            &format!("/v1/tasks/{}/assign", task_id),
            Some(&ctx.auth_header()),
            Some(json!({ "user_ids": [a.id, b.id, ghost_id] })),
        )
        .await;
    let error = assert_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(error["message"], "Some users were not found");

    // The earlier set is untouched
    let assignees = Task::assignees(&ctx.db, task_id).await.unwrap();
    assert_eq!(
        assignees.iter().map(|u| u.id).collect::<Vec<_>>(),
        vec![a.id]
    );

    User::delete(&ctx.db, a.id).await.unwrap();
    User::delete(&ctx.db, b.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

/// assign replaces the existing set rather than appending to it
#[tokio::test]
async fn test_assign_replaces_existing_set() {
    let ctx = TestContext::new().await.unwrap();

    let a = create_test_user(&ctx).await;
    let b = create_test_user(&ctx).await;
    let c = create_test_user(&ctx).await;
    let task_id = create_test_task(&ctx, "assign-replace").await;

    let response = ctx
        .request(
            "POST",
            &format!("/v1/tasks/{}/assign", task_id),
            Some(&ctx.auth_header()),
            Some(json!({ "user_ids": [a.id] })),
        )
        .await;
    assert_status(response, StatusCode::OK).await;

    // Disjoint second set: only it must remain
    let response = ctx
        .request(
            "POST",
            &format!("/v1/tasks/{}/assign", task_id),
            Some(&ctx.auth_header()),
            Some(json!({ "user_ids": [b.id, c.id] })),
        )
        .await;
    let full = assert_status(response, StatusCode::OK).await;

    let mut assigned: Vec<i64> = full["assigned_to"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assigned.sort_unstable();
    let mut expected = vec![b.id, c.id];
    expected.sort_unstable();
    assert_eq!(assigned, expected);

    for user in [a, b, c] {
        User::delete(&ctx.db, user.id).await.unwrap();
    }
    ctx.cleanup().await.unwrap();
}

/// An empty user_ids list is a validation error
#[tokio::test]
async fn test_assign_rejects_empty_list() {
    let ctx = TestContext::new().await.unwrap();

    let task_id = create_test_task(&ctx, "assign-empty").await;

    let response = ctx
        .request(
            "POST",
            &format!("/v1/tasks/{}/assign", task_id),
            Some(&ctx.auth_header()),
            Some(json!({ "user_ids": [] })),
        )
        .await;
    assert_status(response, StatusCode::UNPROCESSABLE_ENTITY).await;

    ctx.cleanup().await.unwrap();
}

/// user_tasks: missing parameter, unknown user, filtering and ordering
#[tokio::test]
async fn test_user_tasks_lookup() {
    let ctx = TestContext::new().await.unwrap();

    // Missing user_id parameter
    let response = ctx
        .request("GET", "/v1/tasks/user_tasks", Some(&ctx.auth_header()), None)
        .await;
    let error = assert_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(error["message"], "user_id parameter is required");

    // Unknown user
    let ghost = create_test_user(&ctx).await;
    let ghost_id = ghost.id;
    User::delete(&ctx.db, ghost_id).await.unwrap();

    let response = ctx
        .request(
            "GET",
            &format!("/v1/tasks/user_tasks?user_id={}", ghost_id),
            Some(&ctx.auth_header()),
            None,
        )
        .await;
    assert_status(response, StatusCode::NOT_FOUND).await;

    // Filtering and ordering: only assigned tasks, newest first
    let assignee = create_test_user(&ctx).await;
    let older = create_test_task(&ctx, "user-tasks-older").await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let newer = create_test_task(&ctx, "user-tasks-newer").await;
    let _unrelated = create_test_task(&ctx, "user-tasks-unrelated").await;

    for task_id in [older, newer] {
        let response = ctx
            .request(
                "POST",
                &format!("/v1/tasks/{}/assign", task_id),
                Some(&ctx.auth_header()),
                Some(json!({ "user_ids": [assignee.id] })),
            )
            .await;
        assert_status(response, StatusCode::OK).await;
    }

    let response = ctx
        .request(
            "GET",
            &format!("/v1/tasks/user_tasks?user_id={}", assignee.id),
            Some(&ctx.auth_header()),
            None,
        )
        .await;
    let tasks = assert_status(response, StatusCode::OK).await;
    let ids: Vec<i64> = tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![newer, older]);

    User::delete(&ctx.db, assignee.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

/// Task listing defaults to newest first: A, B, C lists as [C, B, A]
#[tokio::test]
async fn test_task_list_newest_first() {
    let ctx = TestContext::new().await.unwrap();

    let a = create_test_task(&ctx, "order-a").await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let b = create_test_task(&ctx, "order-b").await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let c = create_test_task(&ctx, "order-c").await;

    let response = ctx
        .request("GET", "/v1/tasks", Some(&ctx.auth_header()), None)
        .await;
    let tasks = assert_status(response, StatusCode::OK).await;

    // Other tests may have tasks in flight; compare the relative order
    // of this test's tasks only.
    let ids: Vec<i64> = tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .filter(|id| [a, b, c].contains(id))
        .collect();
    assert_eq!(ids, vec![c, b, a]);

    ctx.cleanup().await.unwrap();
}

/// Status updates accept any transition, including backward moves
#[tokio::test]
async fn test_status_transitions_unrestricted() {
    let ctx = TestContext::new().await.unwrap();

    let task_id = create_test_task(&ctx, "status-freeform").await;

    for status in ["COMPLETED", "PENDING", "CANCELLED", "IN_PROGRESS"] {
        let response = ctx
            .request(
                "PATCH",
                &format!("/v1/tasks/{}", task_id),
                Some(&ctx.auth_header()),
                Some(json!({ "status": status })),
            )
            .await;
        let updated = assert_status(response, StatusCode::OK).await;
        assert_eq!(updated["status"], status);
    }

    ctx.cleanup().await.unwrap();
}

/// Deleting a user removes their created tasks but only unlinks tasks
/// where they were an assignee
#[tokio::test]
async fn test_user_delete_cascades() {
    let ctx = TestContext::new().await.unwrap();

    let doomed = create_test_user(&ctx).await;

    // A task created by the doomed user
    let response = ctx
        .request(
            "POST",
            "/v1/tasks",
            Some(&ctx.auth_header_for(doomed.id)),
            Some(json!({
                "name": "doomed-task",
                "description": "dies with its creator",
                "task_type": "MAINTENANCE"
            })),
        )
        .await;
    let created = assert_status(response, StatusCode::CREATED).await;
    let doomed_task = created["id"].as_i64().unwrap();

    // A surviving task that merely has the doomed user assigned
    let surviving_task = create_test_task(&ctx, "surviving-task").await;
    let response = ctx
        .request(
            "POST",
            &format!("/v1/tasks/{}/assign", surviving_task),
            Some(&ctx.auth_header()),
            Some(json!({ "user_ids": [doomed.id] })),
        )
        .await;
    assert_status(response, StatusCode::OK).await;

    let response = ctx
        .request(
            "DELETE",
            &format!("/v1/users/{}", doomed.id),
            Some(&ctx.auth_header()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert!(
        Task::find_by_id(&ctx.db, doomed_task)
            .await
            .unwrap()
            .is_none(),
        "Created task must die with its creator"
    );

    let response = ctx
        .request(
            "GET",
            &format!("/v1/tasks/{}", surviving_task),
            Some(&ctx.auth_header()),
            None,
        )
        .await;
    let full = assert_status(response, StatusCode::OK).await;
    assert_eq!(
        full["assigned_to"].as_array().unwrap().len(),
        0,
        "Assignee-only task must survive with the user unlinked"
    );

    ctx.cleanup().await.unwrap();
}

/// Signup then login returns a token pair usable on protected routes
#[tokio::test]
async fn test_login_flow() {
    let ctx = TestContext::new().await.unwrap();

    let username = common::unique_username();
    let response = ctx
        .request(
            "POST",
            "/v1/users",
            None,
            Some(json!({
                "username": username,
                "password": "MyP@ssw0rd!"
            })),
        )
        .await;
    let user = assert_status(response, StatusCode::CREATED).await;
    let user_id = user["id"].as_i64().unwrap();

    // Wrong password rejected
    let response = ctx
        .request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "username": username, "password": "WrongP@ss1" })),
        )
        .await;
    assert_status(response, StatusCode::UNAUTHORIZED).await;

    // Correct credentials issue a token pair
    let response = ctx
        .request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "username": username, "password": "MyP@ssw0rd!" })),
        )
        .await;
    let tokens = assert_status(response, StatusCode::OK).await;
    assert_eq!(tokens["user_id"].as_i64().unwrap(), user_id);

    let access = tokens["access_token"].as_str().unwrap();
    let response = ctx
        .request(
            "GET",
            "/v1/tasks",
            Some(&format!("Bearer {}", access)),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Refresh token exchanges for a fresh access token
    let refresh = tokens["refresh_token"].as_str().unwrap();
    let response = ctx
        .request(
            "POST",
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        )
        .await;
    let refreshed = assert_status(response, StatusCode::OK).await;
    assert!(refreshed["access_token"].as_str().is_some());

    // A refresh token is not an access token
    let response = ctx
        .request(
            "GET",
            "/v1/tasks",
            Some(&format!("Bearer {}", refresh)),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    User::delete(&ctx.db, user_id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

/// User listing requires authentication even though signup shares the path
#[tokio::test]
async fn test_user_list_requires_auth() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.request("GET", "/v1/users", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = ctx
        .request("GET", "/v1/users", Some(&ctx.auth_header()), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

/// User update semantics: PUT clears omitted optional fields, PATCH keeps them
#[tokio::test]
async fn test_user_update_put_vs_patch() {
    let ctx = TestContext::new().await.unwrap();

    let user = create_test_user(&ctx).await;

    let response = ctx
        .request(
            "PATCH",
            &format!("/v1/users/{}", user.id),
            Some(&ctx.auth_header()),
            Some(json!({ "mobile": "5559876" })),
        )
        .await;
    let patched = assert_status(response, StatusCode::OK).await;
    assert_eq!(patched["mobile"], "5559876");
    assert_eq!(patched["username"], user.username.as_str());

    // Full update without mobile clears it
    let response = ctx
        .request(
            "PUT",
            &format!("/v1/users/{}", user.id),
            Some(&ctx.auth_header()),
            Some(json!({ "username": user.username })),
        )
        .await;
    let replaced = assert_status(response, StatusCode::OK).await;
    assert!(replaced["mobile"].is_null());

    User::delete(&ctx.db, user.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}
