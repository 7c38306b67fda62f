use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use bookclub_core::utils::{format_date, format_list, format_optional};

use crate::app::{App, AppState, ProfileSection};
use crate::ui::styles;

use super::{placeholder, render_form};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    match app.profile.form {
        Some(ref form) => render_form(
            frame,
            form,
            app.state == AppState::Editing,
            "Edit profile - comma-separated lists, dates as YYYY-MM-DD",
            columns[0],
        ),
        None => render_details(frame, app, columns[0]),
    }
    render_lists(frame, app, columns[1]);
}

fn render_details(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref user) = app.session.current_user else {
        placeholder(frame, "Loading...", "Profile", area);
        return;
    };

    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<18}", label), styles::muted_style()),
            Span::raw(value),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(user.full_name(), styles::title_style())),
        Line::from(""),
        row("Email", user.email.clone()),
        row("Phone", format_optional(user.phone.as_deref(), "-")),
        row("Birth date", format_optional(user.birth_date.as_deref(), "-")),
        row("Role", user.role.to_string()),
        Line::from(""),
        row("Favourite authors", format_list(&user.fav_authors, "-")),
        row("Favourite genres", format_list(&user.fav_genres, "-")),
        row("Favourite books", format_list(&user.fav_books, "-")),
        row("To discuss", format_list(&user.discuss_books, "-")),
        Line::from(""),
        Line::from(Span::styled("[e] Edit profile", styles::highlight_style())),
    ];

    let title = if app.profile.busy { " Profile (updating...) " } else { " Profile " };
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_lists(frame: &mut Frame, app: &App, area: Rect) {
    let section = app.profile.section;
    let (title, header, rows): (String, Row, Vec<Row>) = match section {
        ProfileSection::Meetings => (
            format!(" My meetings ({}) - [d] cancel ", app.profile.meetings.len()),
            Row::new([Cell::from("Book"), Cell::from("Date"), Cell::from("Location")]),
            app.profile
                .meetings
                .iter()
                .map(|m| {
                    Row::new(vec![
                        Cell::from(m.book_title.as_str()),
                        Cell::from(m.book_date.as_deref().map(format_date).unwrap_or_default()),
                        Cell::from(format_optional(m.book_location.as_deref(), "-")),
                    ])
                })
                .collect(),
        ),
        ProfileSection::Favorites => (
            format!(" Favourites ({}) - [d] remove ", app.profile.favorites.len()),
            Row::new([Cell::from("Book"), Cell::from("Author"), Cell::from("Date")]),
            app.profile
                .favorites
                .iter()
                .map(|f| match f.book {
                    Some(ref book) => Row::new(vec![
                        Cell::from(book.title.as_str()),
                        Cell::from(book.author.as_str()),
                        Cell::from(format_date(&book.date)),
                    ]),
                    None => Row::new(vec![Cell::from("(removed book)")]),
                })
                .collect(),
        ),
    };

    let rows: Vec<Row> = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            if i == app.profile.selection {
                row.style(styles::selected_style())
            } else {
                row.style(styles::list_item_style())
            }
        })
        .collect();
    let is_empty = rows.is_empty();

    let widths = [
        Constraint::Percentage(45),
        Constraint::Fill(1),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header.style(styles::title_style()).height(1))
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .title_bottom(Line::from(Span::styled(" [Tab] switch list ", styles::muted_style())))
                .borders(Borders::ALL)
                .border_style(styles::border_style(app.profile.form.is_none())),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !is_empty {
        state.select(Some(app.profile.selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
