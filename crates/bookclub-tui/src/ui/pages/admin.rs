use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use bookclub_core::models::MeetingParticipants;
use bookclub_core::utils::{format_date, format_optional};

use crate::app::{AdminView, App, AppState};
use crate::ui::styles;

use super::{placeholder, render_form};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.admin.denied {
        placeholder(frame, "This page is only available to administrators", "Admin", area);
        return;
    }
    if !app.session.is_admin() {
        placeholder(frame, "Checking access...", "Admin", area);
        return;
    }

    match app.admin.view {
        AdminView::Books => render_books_view(frame, app, area),
        AdminView::Users => render_users(frame, app, area),
    }
}

fn selectable(row: Row<'_>, selected: bool) -> Row<'_> {
    if selected {
        row.style(styles::selected_style())
    } else {
        row.style(styles::list_item_style())
    }
}

fn render_books_view(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_books(frame, app, columns[0]);

    if let Some(ref editor) = app.admin.editor {
        let title = if editor.id.is_some() { "Edit book" } else { "New book" };
        render_form(frame, &editor.form, app.state == AppState::Editing, title, columns[1]);
    } else if let Some(ref participants) = app.admin.participants {
        render_participants(frame, participants, columns[1]);
    } else {
        let hint = "[a]dd  [e]dit  [d]elete  [m] book of the month  [p]articipants";
        placeholder(frame, hint, "Actions", columns[1]);
    }
}

fn render_books(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([Cell::from("Title"), Cell::from("Author"), Cell::from("Date")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .admin
        .books
        .iter()
        .enumerate()
        .map(|(i, book)| {
            let row = Row::new(vec![
                Cell::from(book.title.as_str()),
                Cell::from(book.author.as_str()),
                Cell::from(format_date(&book.date)),
            ]);
            selectable(row, i == app.admin.book_selection)
        })
        .collect();

    let widths = [
        Constraint::Percentage(45),
        Constraint::Fill(1),
        Constraint::Length(14),
    ];

    let title = format!(
        " Books - {} [←/→] | [Tab] users ",
        app.admin.books_cursor.label()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(app.admin.editor.is_none())),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !app.admin.books.is_empty() {
        state.select(Some(app.admin.book_selection));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_participants(frame: &mut Frame, participants: &MeetingParticipants, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(participants.book_title.clone(), styles::title_style())),
        Line::from(vec![
            Span::styled("When:  ", styles::muted_style()),
            Span::raw(participants.book_date.as_deref().map(format_date).unwrap_or_default()),
        ]),
        Line::from(vec![
            Span::styled("Where: ", styles::muted_style()),
            Span::raw(format_optional(participants.book_location.as_deref(), "-")),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} registered", participants.total_participants),
            styles::highlight_style(),
        )),
    ];
    for participant in &participants.participants {
        lines.push(Line::from(vec![
            Span::raw(format!("  {} ", participant.user_name)),
            Span::styled(participant.user_email.clone(), styles::muted_style()),
            Span::styled(
                participant
                    .user_phone
                    .as_deref()
                    .map(|p| format!("  {}", p))
                    .unwrap_or_default(),
                styles::muted_style(),
            ),
        ]));
    }

    let block = Block::default()
        .title(" Participants - [Esc] close ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_users(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("Name"),
        Cell::from("Email"),
        Cell::from("Phone"),
        Cell::from("Role"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .admin
        .users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let row = Row::new(vec![
                Cell::from(user.full_name()),
                Cell::from(user.email.as_str()),
                Cell::from(format_optional(user.phone.as_deref(), "-")),
                Cell::from(user.role.as_str()),
            ]);
            selectable(row, i == app.admin.user_selection)
        })
        .collect();

    let widths = [
        Constraint::Percentage(30),
        Constraint::Fill(1),
        Constraint::Length(16),
        Constraint::Length(6),
    ];

    let title = format!(
        " Users - {} [←/→] | [x] toggle admin | [Tab] books ",
        app.admin.users_cursor.label()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !app.admin.users.is_empty() {
        state.select(Some(app.admin.user_selection));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
