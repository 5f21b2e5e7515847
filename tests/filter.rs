use chrono::Utc;
use taskdeck::filter::{PriorityFilter, StatusFilter, TaskFilter};
use taskdeck::task::{Priority, Status, Task};
use uuid::Uuid;

fn task(title: &str, priority: Priority, status: Status) -> Task {
    Task {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: String::new(),
        priority,
        status,
        created_at: Utc::now(),
        user_id: Uuid::new_v4(),
    }
}

fn sample() -> Vec<Task> {
    vec![
        task("Complete project proposal", Priority::High, Status::Todo),
        task("Design user interface", Priority::Medium, Status::InProgress),
        task("Schedule team meeting", Priority::Low, Status::Completed),
        task("Review design notes", Priority::Medium, Status::Todo),
    ]
}

#[test]
fn unfiltered_returns_everything_in_order() {
    let tasks = sample();
    let filter = TaskFilter::default();

    let visible = filter.apply(&tasks);
    assert_eq!(visible.len(), tasks.len());
    for (kept, original) in visible.iter().zip(tasks.iter()) {
        assert_eq!(kept.id, original.id);
    }
}

#[test]
fn search_matches_title_substring_case_insensitively() {
    let tasks = sample();
    let filter = TaskFilter {
        search: "DESIGN".to_string(),
        ..TaskFilter::default()
    };

    let visible = filter.apply(&tasks);
    let titles: Vec<&str> = visible.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["Design user interface", "Review design notes"]);

    // Inclusion is exactly "search is a substring of the title".
    for task in &tasks {
        let included = visible.iter().any(|kept| kept.id == task.id);
        let expected = task.title.to_lowercase().contains("design");
        assert_eq!(included, expected, "title: {}", task.title);
    }
}

#[test]
fn search_never_matches_description() {
    let mut tasks = sample();
    tasks[0].description = "design review follow-up".to_string();
    let filter = TaskFilter {
        search: "design".to_string(),
        ..TaskFilter::default()
    };

    let visible = filter.apply(&tasks);
    assert!(visible.iter().all(|task| task.title.to_lowercase().contains("design")));
}

#[test]
fn predicates_combine_with_and() {
    let tasks = sample();
    let filter = TaskFilter {
        status: StatusFilter::Only(Status::Todo),
        priority: PriorityFilter::Only(Priority::Medium),
        search: String::new(),
    };

    let visible = filter.apply(&tasks);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].title, "Review design notes");
}

#[test]
fn status_and_priority_selectors_filter_alone() {
    let tasks = sample();

    let by_status = TaskFilter {
        status: StatusFilter::Only(Status::Completed),
        ..TaskFilter::default()
    };
    assert_eq!(by_status.apply(&tasks).len(), 1);

    let by_priority = TaskFilter {
        priority: PriorityFilter::Only(Priority::Medium),
        ..TaskFilter::default()
    };
    assert_eq!(by_priority.apply(&tasks).len(), 2);
}

#[test]
fn filtering_never_mutates_the_collection() {
    let tasks = sample();
    let before = tasks.clone();
    let filter = TaskFilter {
        status: StatusFilter::Only(Status::Todo),
        priority: PriorityFilter::Only(Priority::High),
        search: "proposal".to_string(),
    };

    let first = filter.apply(&tasks).len();
    let second = filter.apply(&tasks).len();
    assert_eq!(first, second);
    assert_eq!(tasks, before);
}

#[test]
fn selector_strings_parse() {
    assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
    assert_eq!(
        "in-progress".parse::<StatusFilter>().unwrap(),
        StatusFilter::Only(Status::InProgress)
    );
    assert_eq!(
        "high".parse::<PriorityFilter>().unwrap(),
        PriorityFilter::Only(Priority::High)
    );
    assert!("urgent".parse::<PriorityFilter>().is_err());
}
