//! td task command implementations.

use std::path::PathBuf;

use uuid::Uuid;

use crate::app::App;
use crate::cli::session::compose_app;
use crate::error::{Error, Result};
use crate::filter::TaskFilter;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{NewTask, Task, TaskPatch};

pub struct AddOptions {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct LsOptions {
    pub status: String,
    pub priority: String,
    pub search: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct CountOptions {
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: String,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct CycleOptions {
    pub id: String,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct DoneOptions {
    pub id: String,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct RmOptions {
    pub id: String,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// Compose, restore the session, and load the collection.
async fn open_collection(options_config: Option<&std::path::Path>, notify: bool) -> Result<App> {
    let app = compose_app(options_config, notify)?;
    app.session.restore().await?;
    if !app.session.is_authenticated() {
        return Err(Error::NotAuthenticated);
    }
    app.tasks.refresh().await?;
    Ok(app)
}

/// Resolve a full uuid or a unique id prefix against the loaded collection.
fn resolve_task_id(app: &App, raw: &str) -> Result<Uuid> {
    if let Ok(id) = raw.parse::<Uuid>() {
        return Ok(id);
    }

    let needle = raw.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
    }

    let tasks = app.tasks.tasks();
    let matches: Vec<Uuid> = tasks
        .iter()
        .filter(|task| task.id.simple().to_string().starts_with(&needle))
        .map(|task| task.id)
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(Error::InvalidArgument(format!("no task id matches '{raw}'"))),
        _ => Err(Error::InvalidArgument(format!(
            "task id prefix '{raw}' is ambiguous ({} matches)",
            matches.len()
        ))),
    }
}

fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

fn task_line(task: &Task) -> String {
    format!(
        "{}  [{}] [{}] {}",
        short_id(task.id),
        task.status,
        task.priority,
        task.title
    )
}

fn task_human(header: &str, task: &Task) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("id", task.id.to_string());
    human.push_summary("title", task.title.clone());
    human.push_summary("status", task.status.to_string());
    human.push_summary("priority", task.priority.to_string());
    human.push_summary("created", task.created_at.to_rfc3339());
    if !task.description.is_empty() {
        human.push_detail(task.description.clone());
    }
    human
}

pub async fn run_add(options: AddOptions) -> Result<()> {
    let new = NewTask {
        title: options.title,
        description: options.description,
        priority: options.priority.parse()?,
    };
    new.validate()?;

    let app = compose_app(options.config.as_deref(), !options.json && !options.quiet)?;
    app.session.restore().await?;
    let task = app.tasks.add(new).await?;

    let human = task_human("td task add: task created", &task);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task add",
        &task,
        Some(&human),
    )
}

pub async fn run_ls(options: LsOptions) -> Result<()> {
    let filter = TaskFilter {
        status: options.status.parse()?,
        priority: options.priority.parse()?,
        search: options.search.unwrap_or_default(),
    };

    let app = open_collection(options.config.as_deref(), false).await?;

    let tasks = app.tasks.tasks();
    let visible: Vec<Task> = filter.apply(&tasks).into_iter().cloned().collect();

    let header = if filter.is_unfiltered() {
        format!("td task ls: {} tasks", tasks.len())
    } else {
        format!("td task ls: {} of {} tasks", visible.len(), tasks.len())
    };
    let mut human = HumanOutput::new(header);
    for task in &visible {
        human.push_detail(task_line(task));
    }
    if visible.is_empty() && !tasks.is_empty() {
        human.push_warning("no tasks match the current filters".to_string());
    }
    if tasks.is_empty() {
        human.push_next_step("td task add <title>".to_string());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task ls",
        &visible,
        Some(&human),
    )
}

pub async fn run_count(options: CountOptions) -> Result<()> {
    let app = open_collection(options.config.as_deref(), false).await?;

    let counts = app.tasks.counts();

    let mut human = HumanOutput::new(format!("td task count: {} tasks", counts.total()));
    human.push_summary("todo", counts.todo.to_string());
    human.push_summary("in-progress", counts.in_progress.to_string());
    human.push_summary("completed", counts.completed.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task count",
        &counts,
        Some(&human),
    )
}

pub async fn run_show(options: ShowOptions) -> Result<()> {
    let app = open_collection(options.config.as_deref(), false).await?;

    let id = resolve_task_id(&app, &options.id)?;
    let task = app.tasks.get(id).ok_or(Error::TaskNotFound(id))?;

    let human = task_human("td task show", &task);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task show",
        &task,
        Some(&human),
    )
}

pub async fn run_edit(options: EditOptions) -> Result<()> {
    let patch = TaskPatch {
        title: options.title,
        description: options.description,
        priority: options.priority.as_deref().map(str::parse).transpose()?,
        status: options.status.as_deref().map(str::parse).transpose()?,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to update; pass --title, --description, --priority, or --status".to_string(),
        ));
    }

    let app = open_collection(options.config.as_deref(), !options.json && !options.quiet).await?;

    let id = resolve_task_id(&app, &options.id)?;
    let task = app.tasks.update(id, patch).await?;

    let human = task_human("td task edit: task updated", &task);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task edit",
        &task,
        Some(&human),
    )
}

pub async fn run_cycle(options: CycleOptions) -> Result<()> {
    let app = open_collection(options.config.as_deref(), !options.json && !options.quiet).await?;

    let id = resolve_task_id(&app, &options.id)?;
    let current = app.tasks.get(id).ok_or(Error::TaskNotFound(id))?;

    // The cycle is a view-side convenience: compute the next status here and
    // send a plain update.
    let patch = TaskPatch {
        status: Some(current.status.next()),
        ..TaskPatch::default()
    };
    let task = app.tasks.update(id, patch).await?;

    let mut human = task_human("td task cycle: status advanced", &task);
    human.push_detail(format!("{} -> {}", current.status, task.status));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task cycle",
        &task,
        Some(&human),
    )
}

pub async fn run_done(options: DoneOptions) -> Result<()> {
    let app = open_collection(options.config.as_deref(), !options.json && !options.quiet).await?;

    let id = resolve_task_id(&app, &options.id)?;
    let patch = TaskPatch {
        status: Some(crate::task::Status::Completed),
        ..TaskPatch::default()
    };
    let task = app.tasks.update(id, patch).await?;

    let human = task_human("td task done: task completed", &task);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task done",
        &task,
        Some(&human),
    )
}

pub async fn run_rm(options: RmOptions) -> Result<()> {
    let app = open_collection(options.config.as_deref(), !options.json && !options.quiet).await?;

    let id = resolve_task_id(&app, &options.id)?;
    app.tasks.delete(id).await?;

    #[derive(serde::Serialize)]
    struct DeleteReport {
        id: Uuid,
        deleted: bool,
    }

    let report = DeleteReport { id, deleted: true };

    let mut human = HumanOutput::new("td task rm: task deleted");
    human.push_summary("id", id.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task rm",
        &report,
        Some(&human),
    )
}
