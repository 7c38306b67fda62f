use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use bookclub_core::models::Book;
use bookclub_core::utils::{format_date, format_optional, truncate};

use crate::app::{App, AppState};
use crate::ui::styles;

use super::{input_line, placeholder};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(6)])
        .split(area);

    render_book_of_the_month(frame, app, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    render_events(frame, app, columns[0]);
    render_event_detail(frame, app, columns[1]);
}

fn detail_line<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, styles::muted_style()),
        Span::raw(value),
    ])
}

fn render_book_of_the_month(frame: &mut Frame, app: &App, area: Rect) {
    let title = " Book of the month ";
    let book = match app.home.current_book {
        Some(ref book) => book,
        None => {
            let text = if app.home.current_loaded {
                "No book has been chosen yet"
            } else {
                "Loading..."
            };
            placeholder(frame, text, title.trim(), area);
            return;
        }
    };

    let mut lines = vec![
        Line::from(Span::styled(book.headline(), styles::title_style())),
        detail_line("When:     ", format_date(&book.date)),
        detail_line("Where:    ", book.location.clone()),
        detail_line("Rating:   ", book.rating_display()),
    ];
    if let Some(ref description) = book.description {
        lines.push(Line::from(Span::raw(truncate(description, 200))));
    }

    let status = if !app.is_signed_in() {
        Span::styled("Sign in to register for the meeting", styles::muted_style())
    } else if app.home.registered {
        Span::styled("✓ You are registered  [c] cancel", styles::success_style())
    } else {
        Span::styled("[r] Register for the meeting", styles::highlight_style())
    };
    lines.push(Line::from(status));

    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_events(frame: &mut Frame, app: &App, area: Rect) {
    let searching = app.state == AppState::Editing;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    frame.render_widget(
        Paragraph::new(input_line("Search", &app.home.search, searching)),
        chunks[0],
    );

    let header = Row::new([Cell::from("Title"), Cell::from("Author"), Cell::from("Date")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .home
        .events
        .iter()
        .enumerate()
        .map(|(i, book)| {
            let style = if i == app.home.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(book.title.as_str()),
                Cell::from(book.author.as_str()),
                Cell::from(format_date(&book.date)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(45),
        Constraint::Fill(1),
        Constraint::Length(14),
    ];

    let status = if app.home.loading {
        "loading".to_string()
    } else {
        app.home.cursor.label()
    };
    let title = format!(" Events ({}) - {} [←/→] ", app.home.events.len(), status);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(!searching)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !app.home.events.is_empty() {
        state.select(Some(app.home.selection));
    }

    frame.render_stateful_widget(table, chunks[1], &mut state);
}

fn render_event_detail(frame: &mut Frame, app: &App, area: Rect) {
    let Some(book) = app.selected_event() else {
        let text = if app.home.loading { "Loading..." } else { "No events found" };
        placeholder(frame, text, "Details", area);
        return;
    };

    let mut lines = event_lines(book);

    match app.home.reviews {
        Some((book_id, ref reviews)) if book_id == book.id => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Reviews ({})", reviews.total),
                styles::highlight_style(),
            )));
            if reviews.items.is_empty() {
                lines.push(Line::from(Span::styled("No reviews yet", styles::muted_style())));
            }
            for review in &reviews.items {
                lines.push(Line::from(vec![
                    Span::styled(review.stars(), styles::highlight_style()),
                    Span::raw(" "),
                    Span::raw(format_optional(review.comment.as_deref(), "")),
                ]));
            }
        }
        _ => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "[v] reviews  [t] rate  [f] favourite",
                styles::muted_style(),
            )));
        }
    }

    if app.state == AppState::Rating {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press 1-5 to rate this book",
            styles::highlight_style(),
        )));
    }

    let block = Block::default()
        .title(" Details ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn event_lines(book: &Book) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(book.title.clone(), styles::title_style())),
        detail_line("Author:   ", book.author.clone()),
        detail_line("Date:     ", format_date(&book.date)),
        detail_line("Location: ", book.location.clone()),
        detail_line("Rating:   ", book.rating_display()),
    ];
    if let Some(ref description) = book.description {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::raw(description.clone())));
    }
    lines
}
