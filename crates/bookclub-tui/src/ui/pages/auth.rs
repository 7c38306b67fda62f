use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, SignInStep};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

use super::input_line;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.state == AppState::Editing;
    let sign_in = &app.sign_in;
    let mut lines = vec![Line::from("")];

    match sign_in.step {
        SignInStep::Identifier => {
            lines.push(Line::from(Span::styled(
                " Enter your email or phone number to receive a code",
                styles::muted_style(),
            )));
            lines.push(Line::from(""));
            lines.push(input_line("Email/phone", &sign_in.identifier, editing));
        }
        SignInStep::Code => {
            let sent_to = app
                .session
                .pending_identifier
                .as_ref()
                .map(|i| i.to_string())
                .unwrap_or_default();
            lines.push(Line::from(vec![
                Span::styled(" Code sent to ", styles::muted_style()),
                Span::styled(sent_to, styles::highlight_style()),
            ]));
            lines.push(Line::from(""));
            lines.push(input_line("Code", &sign_in.code, editing));
            if let Some(ref code) = sign_in.dev_code {
                lines.push(Line::from(Span::styled(
                    format!(" Development code: {}", code),
                    styles::muted_style(),
                )));
            }
            lines.push(Line::from(""));
            let remaining = app.session.cooldown.remaining();
            let resend = if remaining > 0 {
                Span::styled(format!(" Send again in {}s", remaining), styles::muted_style())
            } else {
                Span::styled(" [s] Send a new code", styles::highlight_style())
            };
            lines.push(Line::from(vec![
                resend,
                Span::styled("   [b] Use a different email or phone", styles::muted_style()),
            ]));
        }
    }

    if sign_in.busy {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Please wait...", styles::muted_style())));
    }

    if let Some(page) = app.route.redirect {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" You will return to {} after signing in", page.title()),
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .title(" Sign in ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing));

    let dialog = centered_rect_fixed(64, 14, area);
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, dialog);
}
