use portal_core::model::{ActivityId, ExamId, LessonId, UserId};
use portal_core::time::fixed_now;
use services::{AppServices, Clock, LevelFilter, PROFILE_KEY};

fn services() -> AppServices {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    AppServices::in_memory(Clock::fixed(fixed_now()), None).unwrap()
}

#[tokio::test]
async fn member_journey_updates_profile_and_history() {
    let app = services();
    assert!(app.profile().restore().await.unwrap().is_none());

    let user = app.profile().sign_in(&UserId::new("u1")).await.unwrap();
    let snap = app.dashboard().snapshot(&user).await.unwrap();
    assert_eq!(snap.incomplete_lessons, 3);

    let done = app
        .lessons()
        .complete_lesson(&LessonId::new("l1"))
        .await
        .unwrap();
    assert_eq!(done.progress, 33);

    let user = app.profile().restore().await.unwrap().unwrap();
    assert_eq!(user.progress(), 33);
    let snap = app.dashboard().snapshot(&user).await.unwrap();
    assert_eq!(snap.incomplete_lessons, 2);
    assert_eq!(snap.next_lesson.unwrap().id(), &LessonId::new("l2"));

    app.activities()
        .register(user.id(), &ActivityId::new("a1"))
        .await
        .unwrap();
    let items = app.activities().list(user.id()).await.unwrap();
    assert!(items.iter().any(|i| i.registered && i.activity.id() == &ActivityId::new("a1")));

    app.exams()
        .submit_answers(user.id().clone(), &ExamId::new("e1"), &[2, 1])
        .await
        .unwrap();
    let history = app.exams().history(user.id(), 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].passed);

    let lessons = app.lessons().list(user.id(), LevelFilter::All).await.unwrap();
    assert_eq!(lessons.iter().filter(|l| l.completed).count(), 1);

    app.profile().sign_out().await.unwrap();
    assert!(app.profile().restore().await.unwrap().is_none());
}

#[tokio::test]
async fn seeding_twice_is_harmless() {
    let app = services();
    app.seed_demo().await.unwrap();
    app.seed_demo().await.unwrap();

    let user = app.profile().require_user().await.unwrap();
    assert_eq!(user.id(), &UserId::new("u1"));
    assert_eq!(user.progress(), 65);

    let items = app.lessons().list(user.id(), LevelFilter::All).await.unwrap();
    assert!(items[0].completed);
    let activities = app.activities().list(user.id()).await.unwrap();
    assert!(activities[0].registered);
    assert_eq!(PROFILE_KEY, "ay_user");
}

#[tokio::test]
async fn admin_roster_tracks_lesson_completion() {
    let app = services();
    app.seed_demo().await.unwrap();
    let done = app
        .lessons()
        .complete_lesson(&LessonId::new("l2"))
        .await
        .unwrap();
    assert_eq!(done.progress, 67);

    let user = app.profile().require_user().await.unwrap();
    let snap = app.dashboard().snapshot(&user).await.unwrap();
    let members = app.admin().members().await.unwrap();
    let listed = members.iter().find(|m| m.id() == user.id()).unwrap();
    assert_eq!(listed.progress(), snap.progress);

    // (67 + 100) / 2 = 83.5
    let overview = app.admin().overview().await.unwrap();
    assert_eq!(overview.average_progress, 84);
    assert_eq!(overview.members, 2);
}

#[tokio::test]
async fn sqlite_backed_services_persist_sign_in() {
    let url = "sqlite:file:portal_flow_sign_in?mode=memory&cache=shared";
    let app = AppServices::new_sqlite(url, Clock::fixed(fixed_now()), None)
        .await
        .unwrap();
    app.profile().sign_in(&UserId::new("u2")).await.unwrap();

    let reopened = AppServices::new_sqlite(url, Clock::fixed(fixed_now()), None)
        .await
        .unwrap();
    let user = reopened.profile().restore().await.unwrap().unwrap();
    assert_eq!(user.name(), "Director Sarah");
    // Keep the first pool alive so the shared in-memory database survives.
    drop(app);
}
