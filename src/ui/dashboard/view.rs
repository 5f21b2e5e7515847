//! Dashboard rendering: summary cards, filter bar, task list, status line.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::filter::{PriorityFilter, StatusFilter};
use crate::notify::Level;
use crate::task::{Priority, Status, Task};
use crate::theme::Theme;

use super::app::{DashState, InputMode};

const COLOR_TODO: Color = Color::Blue;
const COLOR_IN_PROGRESS: Color = Color::Yellow;
const COLOR_COMPLETED: Color = Color::Green;
const COLOR_HIGH: Color = Color::Red;
const COLOR_MEDIUM: Color = Color::Yellow;
const COLOR_LOW: Color = Color::Green;

struct Palette {
    text: Color,
    muted: Color,
    accent: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            text: Color::White,
            muted: Color::DarkGray,
            accent: Color::Cyan,
        },
        Theme::Light => Palette {
            text: Color::Black,
            muted: Color::Gray,
            accent: Color::Blue,
        },
    }
}

pub(crate) fn render(frame: &mut Frame, state: &DashState) {
    let colors = palette(state.theme.current());
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    render_header(frame, state, &colors, chunks[0]);
    render_counts(frame, state, &colors, chunks[1]);
    render_filter_bar(frame, state, &colors, chunks[2]);
    render_list(frame, state, &colors, chunks[3]);
    render_status_line(frame, state, &colors, chunks[4]);
    render_footer(frame, state, &colors, chunks[5]);
}

fn render_header(frame: &mut Frame, state: &DashState, colors: &Palette, area: Rect) {
    let loading = if state.is_loading() { "  loading..." } else { "" };
    let line = Line::from(vec![
        Span::styled(
            " taskdeck ",
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} · {}{loading}", state.username(), state.theme.current()),
            Style::default().fg(colors.muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_counts(frame: &mut Frame, state: &DashState, colors: &Palette, area: Rect) {
    let counts = state.counts();
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(33),
                Constraint::Percentage(33),
                Constraint::Percentage(34),
            ]
            .as_ref(),
        )
        .split(area);

    let entries = [
        ("To Do", counts.todo, COLOR_TODO),
        ("In Progress", counts.in_progress, COLOR_IN_PROGRESS),
        ("Completed", counts.completed, COLOR_COMPLETED),
    ];
    for (idx, (title, count, color)) in entries.into_iter().enumerate() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.muted))
            .title(Span::styled(title, Style::default().fg(color)));
        let body = Paragraph::new(Span::styled(
            format!(" {count}"),
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD),
        ))
        .block(block);
        frame.render_widget(body, cards[idx]);
    }
}

fn status_filter_label(filter: StatusFilter) -> String {
    match filter {
        StatusFilter::All => "all".to_string(),
        StatusFilter::Only(status) => status.to_string(),
    }
}

fn priority_filter_label(filter: PriorityFilter) -> String {
    match filter {
        PriorityFilter::All => "all".to_string(),
        PriorityFilter::Only(priority) => priority.to_string(),
    }
}

fn render_filter_bar(frame: &mut Frame, state: &DashState, colors: &Palette, area: Rect) {
    let mut spans = vec![
        Span::styled("search: ", Style::default().fg(colors.muted)),
        Span::styled(
            if state.filter.search.is_empty() && state.input != InputMode::Search {
                "-".to_string()
            } else {
                state.filter.search.clone()
            },
            Style::default().fg(colors.text),
        ),
    ];
    if state.input == InputMode::Search {
        spans.push(Span::styled("_", Style::default().fg(colors.accent)));
    }
    spans.extend([
        Span::styled("   status: ", Style::default().fg(colors.muted)),
        Span::styled(
            status_filter_label(state.filter.status),
            Style::default().fg(colors.text),
        ),
        Span::styled("   priority: ", Style::default().fg(colors.muted)),
        Span::styled(
            priority_filter_label(state.filter.priority),
            Style::default().fg(colors.text),
        ),
    ]);

    if state.input == InputMode::QuickAdd {
        spans.extend([
            Span::styled("   new task: ", Style::default().fg(colors.accent)),
            Span::styled(state.quick_add.clone(), Style::default().fg(colors.text)),
            Span::styled("_", Style::default().fg(colors.accent)),
        ]);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.muted))
        .title("Filters");
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Todo => COLOR_TODO,
        Status::InProgress => COLOR_IN_PROGRESS,
        Status::Completed => COLOR_COMPLETED,
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => COLOR_HIGH,
        Priority::Medium => COLOR_MEDIUM,
        Priority::Low => COLOR_LOW,
    }
}

fn task_item<'a>(task: &'a Task, colors: &Palette) -> ListItem<'a> {
    let line = Line::from(vec![
        Span::styled(
            format!("{:<12}", task.status.to_string()),
            Style::default().fg(status_color(task.status)),
        ),
        Span::styled(
            format!("{:<7}", task.priority.to_string()),
            Style::default().fg(priority_color(task.priority)),
        ),
        Span::styled(task.title.as_str(), Style::default().fg(colors.text)),
    ]);
    ListItem::new(line)
}

fn render_list(frame: &mut Frame, state: &DashState, colors: &Palette, area: Rect) {
    let title = if state.filter.is_unfiltered() {
        format!("Tasks ({})", state.tasks.len())
    } else {
        format!("Tasks ({} of {})", state.filtered.len(), state.tasks.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.accent))
        .title(title);

    if state.filtered.is_empty() {
        let message = if state.tasks.is_empty() {
            "no tasks yet; press a to add one"
        } else {
            "no tasks match the current filters; press x to clear"
        };
        let body = Paragraph::new(Span::styled(message, Style::default().fg(colors.muted)))
            .block(block);
        frame.render_widget(body, area);
        return;
    }

    let items: Vec<ListItem> = state
        .filtered
        .iter()
        .filter_map(|idx| state.tasks.get(*idx))
        .map(|task| task_item(task, colors))
        .collect();

    let mut list_state = ListState::default();
    list_state.select(
        state
            .selected
            .and_then(|idx| state.filtered.iter().position(|candidate| *candidate == idx)),
    );

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_status_line(frame: &mut Frame, state: &DashState, colors: &Palette, area: Rect) {
    if let Some((_, title)) = &state.delete_confirm {
        let line = Line::from(Span::styled(
            format!(" delete '{title}'? y to confirm, esc to cancel"),
            Style::default().fg(COLOR_HIGH),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    // Transient notification first, retained error as a fallback.
    if let Some((level, message)) = &state.status_line {
        let color = match level {
            Level::Success => COLOR_COMPLETED,
            Level::Error => COLOR_HIGH,
            Level::Info => colors.accent,
        };
        let line = Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(color),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    if let Some(error) = state.retained_error() {
        let line = Line::from(Span::styled(
            format!(" {error}"),
            Style::default().fg(COLOR_HIGH),
        ));
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn render_footer(frame: &mut Frame, state: &DashState, colors: &Palette, area: Rect) {
    let line = Line::from(Span::styled(
        format!(" {}", state.footer_hint()),
        Style::default().fg(colors.muted),
    ));
    frame.render_widget(Paragraph::new(line), area);
}
