//! UI rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use tasklist_core::{Filter, Task};

use super::app::App;
use crate::output::{items_left, task_label};

const KEY_HINTS: &str =
    "Enter:add  Tab:filter  ↑/↓:select  ^D:delete  ^X:clear completed  Esc:dismiss  ^C:quit";

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let notices = &app.view.notices;
    let notice_height = if notices.visible && !notices.messages.is_empty() {
        notices.messages.len() as u16 + 2
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(notice_height),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0]);
    draw_input(frame, app, chunks[1]);
    draw_list(frame, app, chunks[2]);
    draw_footer(frame, app, chunks[3]);
    if notice_height > 0 {
        draw_notices(frame, app, chunks[4]);
    }
    draw_status_bar(frame, app, chunks[5]);
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(Span::styled(
        "todos",
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(header, area);
}

/// Draw the entry field
fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let disabled = app.view.input_disabled;
    let focused = !app.list_focused && !disabled;

    let title = if disabled {
        " Saving... "
    } else {
        " What needs to be done? "
    };
    let border_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let text_style = if disabled {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    let paragraph = Paragraph::new(Span::styled(app.view.draft.as_str(), text_style)).block(block);
    frame.render_widget(paragraph, area);

    if focused {
        let cursor_x = area.x + 1 + app.view.draft.chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Draw the todo list for the current filter
fn draw_list(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app.rows();
    let block = Block::default()
        .title(format!(" {} ({}) ", app.filter.label(), rows.len()))
        .borders(Borders::ALL);

    if app.view.loading && rows.is_empty() {
        let loading = Paragraph::new(Span::styled(
            "Loading...",
            Style::default().add_modifier(Modifier::DIM),
        ))
        .block(block);
        frame.render_widget(loading, area);
        return;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .map(|task| {
            let style = match task {
                Task::Pending(_) => Style::default()
                    .add_modifier(Modifier::DIM)
                    .add_modifier(Modifier::ITALIC),
                Task::Persisted(todo) if todo.completed => Style::default()
                    .add_modifier(Modifier::DIM)
                    .add_modifier(Modifier::CROSSED_OUT),
                Task::Persisted(_) => Style::default(),
            };
            ListItem::new(Span::styled(task_label(task), style))
        })
        .collect();

    let highlight_style = if app.list_focused {
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let list = List::new(items).block(block).highlight_style(highlight_style);

    let mut state = ListState::default();
    if !rows.is_empty() {
        state.select(Some(app.selected));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

/// Counter, filter tabs and clear-completed hint; hidden while there are no todos
fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    if app.view.todos().is_empty() {
        return;
    }

    let mut spans = vec![Span::raw(items_left(app.view.active_count())), Span::raw("   ")];

    for filter in Filter::ALL {
        let style = if filter == app.filter {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!(" {} ", filter.label()), style));
        spans.push(Span::raw(" "));
    }

    let clear_style = if app.view.clear_completed_disabled() || app.view.delete_disabled {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default().fg(Color::Yellow)
    };
    spans.push(Span::raw("  "));
    spans.push(Span::styled("Clear completed (^X)", clear_style));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the notification region
fn draw_notices(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .view
        .notices
        .messages
        .iter()
        .map(|notice| Line::from(notice.message()))
        .collect();

    let block = Block::default()
        .title(" Error (Esc to dismiss) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(Color::Red));
    frame.render_widget(paragraph, area);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.as_str()
    } else {
        KEY_HINTS
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}
