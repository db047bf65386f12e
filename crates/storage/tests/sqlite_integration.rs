use chrono::Duration;
use portal_core::model::{ActivityId, ExamId, ExamResult, ExamResultId, LessonId, UserId};
use portal_core::time::fixed_now;
use storage::repository::{
    ExamResultRepository, KeyValueStore, LessonProgressRepository, RegistrationRepository,
    Storage, StorageError,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn result(user: &str, score: f64, minutes: i64) -> ExamResult {
    ExamResult {
        id: ExamResultId::generate(),
        user_id: UserId::new(user),
        exam_id: ExamId::new("e1"),
        score,
        passed: score >= 70.0,
        taken_at: fixed_now() + Duration::minutes(minutes),
    }
}

#[tokio::test]
async fn sqlite_profile_slot_roundtrips() {
    let repo = connect("memdb_kv").await;

    assert!(repo.get("ay_user").await.unwrap().is_none());
    repo.put("ay_user", r#"{"id":"u1"}"#).await.unwrap();
    repo.put("ay_user", r#"{"id":"u2"}"#).await.unwrap();
    assert_eq!(
        repo.get("ay_user").await.unwrap().as_deref(),
        Some(r#"{"id":"u2"}"#)
    );

    repo.remove("ay_user").await.unwrap();
    assert!(repo.get("ay_user").await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_lists_results_newest_first() {
    let repo = connect("memdb_results").await;

    let first = result("u1", 50.0, 0);
    let second = result("u1", 100.0, 10);
    repo.append_result(&first).await.unwrap();
    repo.append_result(&second).await.unwrap();
    repo.append_result(&result("u2", 0.0, 20)).await.unwrap();

    let listed = repo.list_results(&UserId::new("u1"), 10).await.unwrap();
    assert_eq!(listed, vec![second.clone(), first]);

    let limited = repo.list_results(&UserId::new("u1"), 1).await.unwrap();
    assert_eq!(limited, vec![second]);
}

#[tokio::test]
async fn sqlite_rejects_duplicate_result_id() {
    let repo = connect("memdb_dup_result").await;
    let r = result("u1", 50.0, 0);
    repo.append_result(&r).await.unwrap();
    let err = repo.append_result(&r).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_completions_and_registrations() {
    let repo = connect("memdb_progress").await;
    let user = UserId::new("u1");

    assert!(repo.mark_completed(&user, &LessonId::new("l1"), fixed_now()).await.unwrap());
    assert!(!repo.mark_completed(&user, &LessonId::new("l1"), fixed_now()).await.unwrap());
    assert!(repo.mark_completed(&user, &LessonId::new("l3"), fixed_now()).await.unwrap());
    assert_eq!(
        repo.completed_lessons(&user).await.unwrap(),
        vec![LessonId::new("l1"), LessonId::new("l3")]
    );

    repo.register(&user, &ActivityId::new("a2"), fixed_now()).await.unwrap();
    let err = repo
        .register(&user, &ActivityId::new("a2"), fixed_now())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
    assert_eq!(
        repo.registered_activities(&user).await.unwrap(),
        vec![ActivityId::new("a2")]
    );
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_sqlite_wires_all_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.slots.put("k", "v").await.unwrap();
    assert_eq!(storage.slots.get("k").await.unwrap().as_deref(), Some("v"));
    assert!(
        storage
            .exam_results
            .list_results(&UserId::new("u1"), 5)
            .await
            .unwrap()
            .is_empty()
    );
}
