//! Dashboard event loop.
//!
//! The terminal thread owns the derived view state and never blocks on the
//! backend: container operations run on a worker thread that receives
//! requests over a channel and reports back when each one has settled. The
//! containers themselves are the source of truth; after every settled
//! operation the view re-reads their snapshots.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Handle;
use uuid::Uuid;

use crate::app::App;
use crate::collection::TaskCollection;
use crate::error::{Error, Result};
use crate::filter::{PriorityFilter, StatusFilter, TaskFilter};
use crate::notify::{Level, MemorySink};
use crate::profile::ProfilePatch;
use crate::session::SessionState;
use crate::task::{NewTask, Priority, Status, StatusCounts, Task, TaskPatch};
use crate::theme::ThemeFlag;

use super::model;
use super::view;

const EVENT_POLL_MS: u64 = 120;

/// Container operations requested by the view.
enum Op {
    Refresh,
    Cycle(Uuid),
    Delete(Uuid),
    QuickAdd(String),
    ToggleTheme,
}

/// Worker-to-view message: an operation settled, re-read the containers.
enum UiMsg {
    Settled,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Search,
    QuickAdd,
}

pub(crate) struct DashState {
    session: Arc<SessionState>,
    collection: Arc<TaskCollection>,
    pub(crate) theme: ThemeFlag,
    sink: Arc<MemorySink>,
    pub(crate) tasks: Vec<Task>,
    pub(crate) filtered: Vec<usize>,
    pub(crate) selected: Option<usize>,
    pub(crate) filter: TaskFilter,
    pub(crate) input: InputMode,
    pub(crate) quick_add: String,
    pub(crate) delete_confirm: Option<(Uuid, String)>,
    pub(crate) status_line: Option<(Level, String)>,
}

impl DashState {
    fn new(
        session: Arc<SessionState>,
        collection: Arc<TaskCollection>,
        theme: ThemeFlag,
        sink: Arc<MemorySink>,
    ) -> Self {
        Self {
            session,
            collection,
            theme,
            sink,
            tasks: Vec::new(),
            filtered: Vec::new(),
            selected: None,
            filter: TaskFilter::default(),
            input: InputMode::Normal,
            quick_add: String::new(),
            delete_confirm: None,
            status_line: None,
        }
    }

    /// Pull fresh snapshots out of the containers and re-derive the view.
    fn sync(&mut self) {
        let previous = self.selected_task().map(|task| task.id);
        self.tasks = self.collection.tasks();
        self.apply_filter(previous);
    }

    fn apply_filter(&mut self, previous: Option<Uuid>) {
        self.filtered = model::filter_task_indices(&self.tasks, &self.filter);
        self.selected = model::select_by_id(&self.tasks, &self.filtered, previous);
    }

    fn drain_notifications(&mut self) -> bool {
        let mut changed = false;
        for notification in self.sink.drain() {
            self.status_line = Some((notification.level, notification.message));
            changed = true;
        }
        changed
    }

    pub(crate) fn selected_task(&self) -> Option<&Task> {
        self.selected.and_then(|idx| self.tasks.get(idx))
    }

    pub(crate) fn counts(&self) -> StatusCounts {
        StatusCounts::tally(&self.tasks)
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.collection.is_loading() || self.session.is_loading()
    }

    pub(crate) fn retained_error(&self) -> Option<String> {
        self.collection.error().or_else(|| self.session.error())
    }

    pub(crate) fn username(&self) -> String {
        self.session
            .profile()
            .map(|profile| profile.username)
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.delete_confirm.is_some() {
            return "y confirm delete  esc cancel".to_string();
        }
        match self.input {
            InputMode::Search => {
                "type to search  backspace delete  enter done  esc clear".to_string()
            }
            InputMode::QuickAdd => "type title  enter add  esc cancel".to_string(),
            InputMode::Normal => {
                "j/k move  a add  c cycle  d delete  / search  s status  p priority  x clear  t theme  r refresh  q quit"
                    .to_string()
            }
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.filtered.is_empty() {
            self.selected = None;
            return;
        }
        let current = self
            .selected
            .and_then(|idx| self.filtered.iter().position(|candidate| *candidate == idx))
            .unwrap_or(0);
        let max = self.filtered.len().saturating_sub(1);
        let next = (current as isize + delta).clamp(0, max as isize) as usize;
        self.selected = Some(self.filtered[next]);
    }

    fn cycle_status_filter(&mut self) {
        self.filter.status = match self.filter.status {
            StatusFilter::All => StatusFilter::Only(Status::Todo),
            StatusFilter::Only(Status::Todo) => StatusFilter::Only(Status::InProgress),
            StatusFilter::Only(Status::InProgress) => StatusFilter::Only(Status::Completed),
            StatusFilter::Only(Status::Completed) => StatusFilter::All,
        };
        self.apply_filter(self.selected_task().map(|task| task.id));
    }

    fn cycle_priority_filter(&mut self) {
        self.filter.priority = match self.filter.priority {
            PriorityFilter::All => PriorityFilter::Only(Priority::Low),
            PriorityFilter::Only(Priority::Low) => PriorityFilter::Only(Priority::Medium),
            PriorityFilter::Only(Priority::Medium) => PriorityFilter::Only(Priority::High),
            PriorityFilter::Only(Priority::High) => PriorityFilter::All,
        };
        self.apply_filter(self.selected_task().map(|task| task.id));
    }

    fn clear_filters(&mut self) {
        self.filter = TaskFilter::default();
        self.apply_filter(self.selected_task().map(|task| task.id));
    }
}

/// Run the dashboard until the user quits. Requires an authenticated
/// session; the caller restores it first.
pub fn run(app: App, handle: Handle) -> Result<()> {
    if !app.session.is_authenticated() {
        return Err(Error::NotAuthenticated);
    }

    let sink = Arc::new(MemorySink::new());
    app.notifier.subscribe(sink.clone());

    let (op_tx, op_rx) = mpsc::channel();
    let (ui_tx, ui_rx) = mpsc::channel();
    spawn_worker(
        handle,
        app.session.clone(),
        app.tasks.clone(),
        op_rx,
        ui_tx,
    );

    if op_tx.send(Op::Refresh).is_err() {
        return Err(Error::Service("failed to start dashboard worker".to_string()));
    }

    let mut state = DashState::new(app.session, app.tasks, app.theme, sink);
    run_terminal(&mut state, ui_rx, op_tx)
}

fn spawn_worker(
    handle: Handle,
    session: Arc<SessionState>,
    collection: Arc<TaskCollection>,
    op_rx: Receiver<Op>,
    ui_tx: Sender<UiMsg>,
) {
    thread::spawn(move || {
        while let Ok(op) = op_rx.recv() {
            // Failures are already captured by the containers (retained
            // error + notification); the view only needs a wake-up.
            match op {
                Op::Refresh => {
                    let _ = handle.block_on(collection.refresh());
                }
                Op::Cycle(id) => {
                    if let Some(task) = collection.get(id) {
                        let patch = TaskPatch {
                            status: Some(task.status.next()),
                            ..TaskPatch::default()
                        };
                        let _ = handle.block_on(collection.update(id, patch));
                    }
                }
                Op::Delete(id) => {
                    let _ = handle.block_on(collection.delete(id));
                }
                Op::QuickAdd(title) => {
                    let _ = handle.block_on(collection.add(NewTask {
                        title,
                        description: String::new(),
                        priority: Priority::Medium,
                    }));
                }
                Op::ToggleTheme => {
                    if let Some(profile) = session.profile() {
                        let patch = ProfilePatch {
                            theme: Some(profile.theme.toggled()),
                            ..ProfilePatch::default()
                        };
                        let _ = handle.block_on(session.update_profile(&patch));
                    }
                }
            }
            if ui_tx.send(UiMsg::Settled).is_err() {
                break;
            }
        }
    });
}

fn run_terminal(state: &mut DashState, ui_rx: Receiver<UiMsg>, op_tx: Sender<Op>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, state, ui_rx, op_tx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut DashState,
    ui_rx: Receiver<UiMsg>,
    op_tx: Sender<Op>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(UiMsg::Settled) = ui_rx.try_recv() {
            state.sync();
            dirty = true;
        }

        if state.drain_notifications() {
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, state))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(state, key, &op_tx) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => {
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Returns true when the dashboard should exit.
fn handle_key(state: &mut DashState, key: KeyEvent, op_tx: &Sender<Op>) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if let Some((id, _)) = state.delete_confirm.clone() {
        match key.code {
            KeyCode::Char('y') => {
                state.delete_confirm = None;
                let _ = op_tx.send(Op::Delete(id));
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                state.delete_confirm = None;
            }
            _ => {}
        }
        return false;
    }

    match state.input {
        InputMode::Search => handle_search_key(state, key),
        InputMode::QuickAdd => handle_quick_add_key(state, key, op_tx),
        InputMode::Normal => return handle_normal_key(state, key, op_tx),
    }
    false
}

fn handle_search_key(state: &mut DashState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            state.filter.search.clear();
            state.input = InputMode::Normal;
            state.apply_filter(state.selected_task().map(|task| task.id));
        }
        KeyCode::Enter => {
            state.input = InputMode::Normal;
        }
        KeyCode::Backspace => {
            state.filter.search.pop();
            state.apply_filter(state.selected_task().map(|task| task.id));
        }
        KeyCode::Char(c) => {
            state.filter.search.push(c);
            state.apply_filter(state.selected_task().map(|task| task.id));
        }
        _ => {}
    }
}

fn handle_quick_add_key(state: &mut DashState, key: KeyEvent, op_tx: &Sender<Op>) {
    match key.code {
        KeyCode::Esc => {
            state.quick_add.clear();
            state.input = InputMode::Normal;
        }
        KeyCode::Enter => {
            let title = state.quick_add.trim().to_string();
            state.quick_add.clear();
            state.input = InputMode::Normal;
            if !title.is_empty() {
                let _ = op_tx.send(Op::QuickAdd(title));
            }
        }
        KeyCode::Backspace => {
            state.quick_add.pop();
        }
        KeyCode::Char(c) => {
            state.quick_add.push(c);
        }
        _ => {}
    }
}

fn handle_normal_key(state: &mut DashState, key: KeyEvent, op_tx: &Sender<Op>) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('j') | KeyCode::Down => state.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => state.move_selection(-1),
        KeyCode::Char('r') => {
            let _ = op_tx.send(Op::Refresh);
        }
        KeyCode::Char('c') | KeyCode::Char(' ') => {
            if let Some(task) = state.selected_task() {
                let _ = op_tx.send(Op::Cycle(task.id));
            }
        }
        KeyCode::Char('d') => {
            let target = state
                .selected_task()
                .map(|task| (task.id, task.title.clone()));
            if let Some(target) = target {
                state.delete_confirm = Some(target);
            }
        }
        KeyCode::Char('a') => {
            state.input = InputMode::QuickAdd;
        }
        KeyCode::Char('/') => {
            state.input = InputMode::Search;
        }
        KeyCode::Char('s') => state.cycle_status_filter(),
        KeyCode::Char('p') => state.cycle_priority_filter(),
        KeyCode::Char('x') => state.clear_filters(),
        KeyCode::Char('t') => {
            let _ = op_tx.send(Op::ToggleTheme);
        }
        _ => {}
    }
    false
}
