//! Repository calls against a client that records the SQL it receives.

mod common;

use common::RecordingClient;
use common::users::{Users, UsersRecord};
use pgtyped::prelude::*;

fn alice() -> UsersRecord {
    UsersRecord {
        id: 1,
        email: "alice@example.com".to_string(),
        nickname: Some("al".to_string()),
        age: Some(30),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_insert_skips_excluded_columns() {
    let u = Users::new();
    let conn = RecordingClient::affecting(1);
    let opts = CallOptions::new().exclude([u.id.field()]);

    let n = u.repository().insert(&conn, &alice(), &opts).await.unwrap();

    assert_eq!(n, 1);
    assert_eq!(
        conn.statements(),
        vec!["INSERT INTO users (email, nickname, age, profile, tags) VALUES ($1, $2, $3, $4, $5);"]
    );
    assert_eq!(conn.seen.lock().unwrap()[0].1, 5);
}

#[tokio::test]
async fn test_insert_with_everything_excluded_fails_before_sending() {
    let u = Users::new();
    let conn = RecordingClient::default();
    let opts = CallOptions::new().exclude(u.table.all_fields());

    let err = u
        .repository()
        .insert(&conn, &alice(), &opts)
        .await
        .unwrap_err();

    assert!(err.is_empty_fields());
    assert!(conn.statements().is_empty());
}

#[tokio::test]
async fn test_insert_returning_without_row_is_not_found() {
    let u = Users::new();
    let conn = RecordingClient::default();

    let err = u
        .repository()
        .insert_returning(&conn, &alice(), &CallOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(
        conn.statements(),
        vec![
            "INSERT INTO users (id, email, nickname, age, profile, tags) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, email, nickname, age, profile, tags;"
        ]
    );
}

#[tokio::test]
async fn test_update_uses_filter_and_default_fields() {
    let u = Users::new();
    let conn = RecordingClient::affecting(2);
    let opts = CallOptions::new().exclude([u.id.field(), u.profile.field(), u.tags.field()]);

    let n = u
        .repository()
        .update(&conn, &alice(), u.id.eq(1), &opts)
        .await
        .unwrap();

    assert_eq!(n, 2);
    assert_eq!(
        conn.statements(),
        vec!["UPDATE users SET email = $1, nickname = $2, age = $3 WHERE users.id = $4;"]
    );
}

#[tokio::test]
async fn test_update_with_explicit_fields() {
    let u = Users::new();
    let conn = RecordingClient::affecting(1);
    let opts = CallOptions::new().update([u.age.field()]);

    u.repository()
        .update(&conn, &alice(), u.email.eq("alice@example.com"), &opts)
        .await
        .unwrap();

    assert_eq!(
        conn.statements(),
        vec!["UPDATE users SET age = $1 WHERE users.email = $2;"]
    );
}

#[tokio::test]
async fn test_update_with_no_fields_is_rejected() {
    let u = Users::new();
    let conn = RecordingClient::default();
    let opts = CallOptions::new().update(Vec::<Field<_>>::new());

    let err = u
        .repository()
        .update(&conn, &alice(), u.id.eq(1), &opts)
        .await
        .unwrap_err();

    assert!(err.is_empty_fields());
    assert!(conn.statements().is_empty());
}

#[tokio::test]
async fn test_upsert_updates_everything_but_conflict_target() {
    let u = Users::new();
    let conn = RecordingClient::affecting(1);
    let opts = CallOptions::new().exclude([u.profile.field(), u.tags.field()]);

    u.repository()
        .upsert(&conn, &alice(), &[u.id.field()], &opts)
        .await
        .unwrap();

    assert_eq!(
        conn.statements(),
        vec![
            "INSERT INTO users (id, email, nickname, age) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET email=EXCLUDED.email, \
             nickname=EXCLUDED.nickname, age=EXCLUDED.age;"
        ]
    );
}

#[tokio::test]
async fn test_upsert_requires_conflict_target() {
    let u = Users::new();
    let conn = RecordingClient::default();

    let err = u
        .repository()
        .upsert(&conn, &alice(), &[], &CallOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_empty_fields());
    assert!(conn.statements().is_empty());
}

#[tokio::test]
async fn test_upsert_ignore_uses_option_conflict() {
    let u = Users::new();
    let conn = RecordingClient::affecting(0);
    let opts = CallOptions::new()
        .conflict([u.email.field()])
        .exclude([u.id.field(), u.profile.field(), u.tags.field()]);

    let n = u
        .repository()
        .upsert_ignore(&conn, &alice(), &opts)
        .await
        .unwrap();

    assert_eq!(n, 0);
    assert_eq!(
        conn.statements(),
        vec![
            "INSERT INTO users (email, nickname, age) VALUES ($1, $2, $3) \
             ON CONFLICT (email) DO NOTHING;"
        ]
    );
}

#[tokio::test]
async fn test_upsert_ignore_without_conflict_is_rejected() {
    let u = Users::new();
    let conn = RecordingClient::default();

    let err = u
        .repository()
        .upsert_ignore(&conn, &alice(), &CallOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_empty_fields());
}

#[tokio::test]
async fn test_insert_many_empty_batch_sends_nothing() {
    let u = Users::new();
    let conn = RecordingClient::default();
    let opts = CallOptions::new().copy([u.id.field(), u.email.field()]);

    let n = u.repository().insert_many(&conn, &[], &opts).await.unwrap();

    assert_eq!(n, 0);
    assert!(conn.statements().is_empty());
}

#[tokio::test]
async fn test_insert_many_needs_copy_support() {
    let u = Users::new();
    let conn = RecordingClient::default();
    let opts = CallOptions::new().copy([u.id.field(), u.email.field()]);

    let err = u
        .repository()
        .insert_many(&conn, &[alice()], &opts)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "COPY is not supported by this client");
}

#[tokio::test]
async fn test_list_and_exec_pass_statements_through() {
    let u = Users::new();
    let conn = RecordingClient::affecting(4);
    let repo = u.repository();

    let rows = repo
        .list_by(&conn, &u.table.select_all().filter(u.age.gt(20)).limit(10))
        .await
        .unwrap();
    assert!(rows.is_empty());

    let missing = repo
        .get_by(&conn, &u.table.select_all().filter(u.id.eq(9)))
        .await
        .unwrap_err();
    assert!(missing.is_not_found());

    let n = repo
        .exec_affected(&conn, &u.table.delete().filter(u.age.is_null()))
        .await
        .unwrap();
    assert_eq!(n, 4);

    assert_eq!(
        conn.statements(),
        vec![
            "SELECT users.id, users.email, users.nickname, users.age, users.profile, users.tags \
             FROM users AS users WHERE users.age > $1 LIMIT 10;",
            "SELECT users.id, users.email, users.nickname, users.age, users.profile, users.tags \
             FROM users AS users WHERE users.id = $1;",
            "DELETE FROM users WHERE users.age IS NULL;",
        ]
    );
}

#[tokio::test]
async fn test_invalid_statement_is_not_sent() {
    let u = Users::new();
    let conn = RecordingClient::default();

    let err = u
        .repository()
        .exec(&conn, &u.table.update().filter(u.id.eq(1)))
        .await
        .unwrap_err();

    assert!(err.is_empty_fields());
    assert!(conn.statements().is_empty());
}
