//! Row shapes exchanged with the hosted service.

use taskdeck::profile::{Profile, ProfilePatch};
use taskdeck::task::{Priority, Status, Task, TaskPatch};
use taskdeck::theme::Theme;

#[test]
fn task_row_deserializes() {
    let row = r#"{
        "id": "7b1e2c64-9a1f-4f7e-8b60-3d2a1c9e5f10",
        "title": "Write spec",
        "description": "draft v1",
        "priority": "high",
        "status": "in-progress",
        "created_at": "2024-05-14T12:30:00Z",
        "user_id": "f6a3d1b2-4c5e-6f70-8192-a3b4c5d6e7f8"
    }"#;

    let task: Task = serde_json::from_str(row).expect("task row");
    assert_eq!(task.title, "Write spec");
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.status, Status::InProgress);
    assert_eq!(task.created_at.to_rfc3339(), "2024-05-14T12:30:00+00:00");
}

#[test]
fn profile_row_deserializes_with_and_without_avatar() {
    let row = r#"{
        "id": "f6a3d1b2-4c5e-6f70-8192-a3b4c5d6e7f8",
        "username": "demo",
        "avatar_url": "https://example.com/a.png",
        "theme": "light"
    }"#;
    let profile: Profile = serde_json::from_str(row).expect("profile row");
    assert_eq!(profile.username, "demo");
    assert_eq!(profile.theme, Theme::Light);
    assert!(profile.avatar_url.is_some());

    let bare = r#"{
        "id": "f6a3d1b2-4c5e-6f70-8192-a3b4c5d6e7f8",
        "username": "demo"
    }"#;
    let profile: Profile = serde_json::from_str(bare).expect("bare profile row");
    assert!(profile.avatar_url.is_none());
    assert_eq!(profile.theme, Theme::Dark);
}

#[test]
fn patches_serialize_only_set_fields() {
    let patch = TaskPatch {
        status: Some(Status::Completed),
        ..TaskPatch::default()
    };
    let body = serde_json::to_value(&patch).expect("serialize");
    assert_eq!(body, serde_json::json!({ "status": "completed" }));

    let patch = ProfilePatch {
        theme: Some(Theme::Dark),
        ..ProfilePatch::default()
    };
    let body = serde_json::to_value(&patch).expect("serialize");
    assert_eq!(body, serde_json::json!({ "theme": "dark" }));
}
