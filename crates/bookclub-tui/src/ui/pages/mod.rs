//! Page renderers, one module per route.

pub mod admin;
pub mod auth;
pub mod home;
pub mod profile;
pub mod register;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::forms::FormState;
use crate::ui::styles;

/// Width reserved for input labels
const LABEL_WIDTH: usize = 14;

/// One labelled input line, with a cursor when focused
pub fn input_line<'a>(label: &str, value: &'a str, focused: bool) -> Line<'a> {
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::styled(format!(" {:<width$}", label, width = LABEL_WIDTH), styles::muted_style()),
        Span::styled("[", styles::muted_style()),
        Span::styled(format!("{}{}", value, cursor), styles::input_style(focused)),
        Span::styled("]", styles::muted_style()),
    ])
}

/// Render a form inside a bordered block, scrolled so the focused input stays visible.
pub fn render_form(frame: &mut Frame, form: &FormState, editing: bool, title: &str, area: Rect) {
    let mut lines = Vec::new();
    let mut focus_line = 0;

    for (i, input) in form.inputs.iter().enumerate() {
        let focused = editing && i == form.focus;
        if focused {
            focus_line = lines.len();
        }
        lines.push(input_line(input.label, &input.value, focused));
        if let Some(error) = form.error_after(i) {
            lines.push(Line::from(Span::styled(
                format!(" {:<width$}{}", "", error, width = LABEL_WIDTH),
                styles::error_style(),
            )));
        }
    }

    let visible = area.height.saturating_sub(2) as usize;
    let scroll = (focus_line + 1).saturating_sub(visible) as u16;

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Centered placeholder text for empty or loading panels
pub fn placeholder(frame: &mut Frame, text: &str, title: &str, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    let paragraph = Paragraph::new(Line::from(Span::styled(text.to_string(), styles::muted_style())))
        .block(block)
        .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(paragraph, area);
}
