use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use bookclub_core::navigation::Page;

use crate::app::{App, AppState};

use super::pages::{admin, auth, home, profile, register};
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Page tabs
            Constraint::Min(10),   // Page content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_page(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::ConfirmingDelete(id) => render_delete_overlay(frame, app, id),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Book Club";
    let user = match app.session.display_name() {
        Some(name) => format!("Signed in as {}", name),
        None if app.is_signed_in() => "Signed in".to_string(),
        None => "Guest".to_string(),
    };
    let right = format!("{}  [?] Help", user);

    let padding = (area.width as usize).saturating_sub(title.len() + right.chars().count() + 2);
    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

/// Page links, adjusted to the session the way a site header would be
fn page_links(app: &App) -> Vec<(&'static str, Page)> {
    let mut links = vec![("[1] Home", Page::Home)];
    if app.is_signed_in() {
        links.push(("[4] Profile", Page::Profile));
        if app.session.is_admin() {
            links.push(("[5] Admin", Page::Admin));
        }
    } else {
        links.push(("[2] Sign in", Page::SignIn));
        links.push(("[3] Join the club", Page::Register));
    }
    links
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.page();
    let mut spans = vec![Span::raw(" ")];
    for (i, (label, page)) in page_links(app).into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        if page == current {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    if app.is_signed_in() {
        let hint = "[o] Sign out";
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let padding = (area.width as usize).saturating_sub(used + hint.len() + 2);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(hint, styles::muted_style()));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_page(frame: &mut Frame, app: &App, area: Rect) {
    match app.page() {
        Page::Home => home::render(frame, app, area),
        Page::SignIn => auth::render(frame, app, area),
        Page::Register => register::render(frame, app, area),
        Page::Profile => profile::render(frame, app, area),
        Page::Admin => admin::render(frame, app, area),
    }
}

fn shortcuts(app: &App) -> &'static str {
    match app.state {
        AppState::Editing => return "[Tab] next field | [Enter] submit | [Esc] stop editing",
        AppState::Rating => return "[1-5] stars | [Esc] cancel",
        _ => {}
    }
    match app.page() {
        Page::Home => "[r]egister | [c]ancel | [f]avourite | re[v]iews | ra[t]e | [/] search | [q]uit",
        Page::SignIn => "[e]dit | [s]end again | [b]ack | [q]uit",
        Page::Register => "[e]dit | [q]uit",
        Page::Profile => "[e]dit | [Tab] section | [d]elete | [q]uit",
        Page::Admin => "[Tab] books/users | [a]dd | [e]dit | [d]elete | [q]uit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let right_text = format!(" {} ", shortcuts(app));

    let (left_text, left_style) = match app.notice {
        Some(ref notice) => (format!(" {} ", notice.text), styles::notice_style(notice.kind)),
        None => (format!(" {} ", app.route), styles::muted_style()),
    };

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(description, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(54, 28, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  Book Club", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-5", "Home / Sign in / Join / Profile / Admin"),
        help_line("↑/↓", "Move through a list"),
        help_line("←/→", "Previous/next page of results"),
        help_line("u", "Reload the current page"),
        help_line("o", "Sign out"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Forms", styles::highlight_style())),
        help_line("e", "Start editing"),
        help_line("Tab", "Next field (Shift+Tab: previous)"),
        help_line("Enter", "Submit"),
        help_line("Esc", "Stop editing"),
        Line::from(""),
        Line::from(Span::styled(" Home", styles::highlight_style())),
        help_line("r / c", "Register for / cancel the meeting"),
        help_line("f", "Add the selected event to favourites"),
        help_line("v", "Show reviews of the selected event"),
        help_line("t, 1-5", "Rate the selected event"),
        help_line("/", "Search events"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_confirm(frame: &mut Frame, question: String, action: &'static str) {
    let area = centered_rect_fixed(50, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("   {}", question), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(format!(" to {}, ", action), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    render_confirm(frame, "Are you sure you want to quit?".to_string(), "quit");
}

fn render_delete_overlay(frame: &mut Frame, app: &App, id: i64) {
    let title = app
        .admin
        .books
        .iter()
        .find(|b| b.id == id)
        .map(|b| bookclub_core::utils::truncate(&b.title, 24))
        .unwrap_or_else(|| format!("book #{}", id));
    render_confirm(frame, format!("Delete \"{}\"?", title), "delete");
}
