mod support;

use support::TestEnv;
use taskdeck::error::Error;
use taskdeck::notify::Level;
use taskdeck::task::{NewTask, Priority, Status, TaskPatch};
use uuid::Uuid;

fn new_task(title: &str, description: &str, priority: Priority) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: description.to_string(),
        priority,
    }
}

#[tokio::test]
async fn add_then_refresh_contains_the_populated_task() {
    let env = TestEnv::new();
    env.login_demo().await;

    let added = env
        .tasks
        .add(new_task("Write spec", "draft v1", Priority::High))
        .await
        .expect("add");
    assert_ne!(added.id, Uuid::nil());
    assert_eq!(added.status, Status::Todo);

    env.tasks.refresh().await.expect("refresh");
    let tasks = env.tasks.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, added.id);
    assert_eq!(tasks[0].created_at, added.created_at);
}

#[tokio::test]
async fn refresh_is_idempotent_against_a_stable_backend() {
    let env = TestEnv::new();
    env.login_demo().await;
    env.tasks
        .add(new_task("One", "", Priority::Low))
        .await
        .expect("add");
    env.tasks
        .add(new_task("Two", "", Priority::Medium))
        .await
        .expect("add");

    env.tasks.refresh().await.expect("first refresh");
    let first = env.tasks.tasks();
    env.tasks.refresh().await.expect("second refresh");
    let second = env.tasks.tasks();

    assert_eq!(first, second);
}

#[tokio::test]
async fn add_appends_at_the_end() {
    let env = TestEnv::new();
    env.login_demo().await;

    env.tasks
        .add(new_task("First", "", Priority::Low))
        .await
        .expect("add");
    env.tasks
        .add(new_task("Second", "", Priority::Low))
        .await
        .expect("add");
    let added = env
        .tasks
        .add(new_task("Third", "", Priority::Low))
        .await
        .expect("add");

    let tasks = env.tasks.tasks();
    assert_eq!(tasks.last().expect("last").id, added.id);
    let titles: Vec<&str> = tasks.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second", "Third"]);
}

#[tokio::test]
async fn update_merges_fields_and_keeps_position() {
    let env = TestEnv::new();
    env.login_demo().await;

    env.tasks
        .add(new_task("First", "", Priority::Low))
        .await
        .expect("add");
    let target = env
        .tasks
        .add(new_task("Write spec", "draft v1", Priority::High))
        .await
        .expect("add");
    env.tasks
        .add(new_task("Last", "", Priority::Low))
        .await
        .expect("add");

    let patch = TaskPatch {
        status: Some(Status::Completed),
        ..TaskPatch::default()
    };
    let updated = env.tasks.update(target.id, patch).await.expect("update");

    assert_eq!(updated.status, Status::Completed);
    assert_eq!(updated.title, "Write spec");
    assert_eq!(updated.description, "draft v1");
    assert_eq!(updated.priority, Priority::High);
    assert_eq!(updated.id, target.id);
    assert_eq!(updated.user_id, target.user_id);

    let tasks = env.tasks.tasks();
    assert_eq!(tasks[1].id, target.id);
    assert_eq!(tasks[1].status, Status::Completed);
}

#[tokio::test]
async fn update_unknown_id_reports_not_found() {
    let env = TestEnv::new();
    env.login_demo().await;

    let missing = Uuid::new_v4();
    let patch = TaskPatch {
        title: Some("nope".to_string()),
        ..TaskPatch::default()
    };
    let err = env
        .tasks
        .update(missing, patch)
        .await
        .expect_err("unknown id");
    assert!(matches!(err, Error::TaskNotFound(id) if id == missing));
    assert!(env.tasks.error().is_some());
}

#[tokio::test]
async fn delete_removes_and_second_delete_reports_not_found() {
    let env = TestEnv::new();
    env.login_demo().await;

    let task = env
        .tasks
        .add(new_task("Disposable", "", Priority::Low))
        .await
        .expect("add");

    env.tasks.delete(task.id).await.expect("delete");
    env.tasks.refresh().await.expect("refresh");
    assert!(env.tasks.tasks().iter().all(|entry| entry.id != task.id));

    let err = env
        .tasks
        .delete(task.id)
        .await
        .expect_err("second delete is reported, not ignored");
    assert!(matches!(err, Error::TaskNotFound(id) if id == task.id));

    let last = env.sink.last().expect("notification");
    assert_eq!(last.level, Level::Error);
}

#[tokio::test]
async fn retained_error_clears_on_the_next_success() {
    let env = TestEnv::new();
    env.login_demo().await;

    let missing = Uuid::new_v4();
    let _ = env.tasks.delete(missing).await;
    assert!(env.tasks.error().is_some());

    env.tasks.refresh().await.expect("refresh");
    assert!(env.tasks.error().is_none());
}

#[tokio::test]
async fn operations_require_a_session() {
    let env = TestEnv::new();
    env.session.restore().await.expect("restore");

    let err = env.tasks.refresh().await.expect_err("no session");
    assert!(matches!(err, Error::NotAuthenticated));
    assert!(env.tasks.error().is_some());
}

#[tokio::test]
async fn loading_flag_settles_after_each_operation() {
    let env = TestEnv::new();
    env.login_demo().await;

    assert!(!env.tasks.is_loading());
    env.tasks.refresh().await.expect("refresh");
    assert!(!env.tasks.is_loading());
}

#[tokio::test]
async fn create_and_cycle_scenario() {
    let env = TestEnv::new();
    env.login_demo().await;
    env.tasks.refresh().await.expect("refresh");
    let before = env.tasks.tasks().len();

    let task = env
        .tasks
        .add(new_task("Write spec", "draft v1", Priority::High))
        .await
        .expect("add");

    assert_eq!(env.tasks.tasks().len(), before + 1);
    assert_eq!(task.status, Status::Todo);
    assert_ne!(task.id, Uuid::nil());

    // Two steps through the view-side cycle: todo -> in-progress ->
    // completed.
    let patch = TaskPatch {
        status: Some(task.status.next()),
        ..TaskPatch::default()
    };
    let task = env.tasks.update(task.id, patch).await.expect("first cycle");
    assert_eq!(task.status, Status::InProgress);

    let patch = TaskPatch {
        status: Some(task.status.next()),
        ..TaskPatch::default()
    };
    let task = env.tasks.update(task.id, patch).await.expect("second cycle");
    assert_eq!(task.status, Status::Completed);
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let env = TestEnv::new();
    env.login_demo().await;

    let err = env
        .tasks
        .add(new_task("   ", "body", Priority::Low))
        .await
        .expect_err("blank title");
    assert!(matches!(err, Error::InvalidArgument(_)));
}
