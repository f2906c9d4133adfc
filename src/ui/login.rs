use super::titled_block;
use crate::app::{App, LoginField};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

const BOX_W: u16 = 52;
const BOX_H: u16 = 11;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let [row] = Layout::vertical([Constraint::Length(BOX_H)]).flex(Flex::Center).areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(BOX_W)]).flex(Flex::Center).areas(row);

    let form = &app.login;
    let focus_style = Style::default().fg(Color::Black).bg(Color::Cyan);
    let field = |label: &str, value: String, which: LoginField| {
        let style = if form.focus == which {
            focus_style
        } else {
            Style::default().fg(Color::White)
        };
        Line::from(vec![
            Span::styled(format!("{label:<10}"), Style::default().fg(Color::Gray)),
            Span::styled(format!("[{value:<30}]"), style),
        ])
    };
    let button = |label: &str, which: LoginField| {
        let style = if form.focus == which {
            focus_style.add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        Span::styled(format!(" {label} "), style)
    };

    let message = match &form.message {
        Some(msg) if msg.ends_with('!') => Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Green))),
        Some(msg) => Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Red))),
        None => Line::from(""),
    };

    let lines = vec![
        Line::from(""),
        field("Email", form.email.clone(), LoginField::Email),
        field("Password", "*".repeat(form.password.chars().count()), LoginField::Password),
        Line::from(""),
        Line::from(vec![
            Span::raw("          "),
            button("Login", LoginField::LoginButton),
            Span::raw("  "),
            button("Signup", LoginField::SignupButton),
        ]),
        Line::from(""),
        message,
        Line::from(Span::styled(
            "tab:next field  enter:submit  esc:quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(titled_block("Weather Dashboard - Login / Signup")),
        rect,
    );
}

#[cfg(test)]
mod tests {
    use crate::app::App;
    use crate::config::Settings;
    use crate::data::tests::sample_table;
    use crate::map::MapRenderer;
    use crate::ui::render_to_buffer;
    use crate::export::snapshot_text;

    #[test]
    fn test_login_view_masks_password() {
        let mut app = App::new(Settings::default(), sample_table(), None, MapRenderer::new());
        app.resize(80, 24);
        app.login.email = "a@x.com".into();
        app.login.password = "secret".into();
        let text = snapshot_text(&render_to_buffer(&app).unwrap());
        assert!(text.contains("a@x.com"));
        assert!(text.contains("******"));
        assert!(!text.contains("secret"));
        assert!(text.contains("Login / Signup"));
    }
}
