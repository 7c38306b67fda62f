use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, AppState};
use crate::ui::styles;

use super::render_form;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(6)])
        .split(area);

    let intro = Line::from(Span::styled(
        " Tell us about yourself: three genres, three authors, three books you love and three you want to discuss.",
        styles::muted_style(),
    ));
    frame.render_widget(Paragraph::new(intro), chunks[0]);

    let title = if app.register.busy {
        "Membership application (sending...)"
    } else {
        "Membership application"
    };
    render_form(
        frame,
        &app.register.form,
        app.state == AppState::Editing,
        title,
        chunks[1],
    );
}
