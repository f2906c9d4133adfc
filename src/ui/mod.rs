mod charts;
mod login;
pub mod map;
pub mod treemap;

use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::routes::Route;
use anyhow::Result;
use ratatui::{
    backend::TestBackend,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};

const BRAND: &str = " Weather Dashboard ";

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    if !app.is_logged_in() {
        login::render(frame, app, area);
        return;
    }

    let [nav, body, status] = split_screen(area);
    render_navbar(frame, app, nav);
    match app.route() {
        Route::Home | Route::Logout => render_home(frame, app, body),
        Route::Treemaps => treemap::render(frame, app, body),
        Route::Map => map::render(frame, app, body),
        Route::BarCharts => charts::render_bar(frame, app, body),
        Route::PieChart => charts::render_pie(frame, app, body),
        Route::Surface3d => charts::render_surface(frame, app, body),
    }
    render_status_bar(frame, app, status);
}

/// Draw into an off-screen buffer the size of the app's screen
pub fn render_to_buffer(app: &App) -> Result<Buffer> {
    let screen = app.screen();
    let (width, height) = if screen.area() == 0 {
        (120, 40)
    } else {
        (screen.width, screen.height)
    };
    let mut terminal = Terminal::new(TestBackend::new(width, height))?;
    terminal.draw(|frame| render(frame, app))?;
    Ok(terminal.backend().buffer().clone())
}

fn split_screen(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Navbar
            Constraint::Min(3),    // Page
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Page area between the navbar and the status bar
pub fn body_area(screen: Rect) -> Rect {
    split_screen(screen)[1]
}

fn nav_tabs() -> impl Iterator<Item = (Route, String)> {
    Route::NAV
        .into_iter()
        .enumerate()
        .map(|(i, route)| (route, format!(" {}:{} ", i + 1, route.title())))
}

/// Navbar tab under a screen cell
pub fn nav_hit(screen: Rect, col: u16, row: u16) -> Option<Route> {
    if screen.height == 0 || row != screen.y {
        return None;
    }
    let mut x = screen.x + BRAND.len() as u16 + 1;
    for (route, label) in nav_tabs() {
        let w = label.chars().count() as u16;
        if col >= x && col < x + w {
            return Some(route);
        }
        x += w;
    }
    None
}

fn render_navbar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            BRAND,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    for (route, label) in nav_tabs() {
        let style = if route == app.route() {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(label, style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn page_hints(route: Route) -> &'static str {
    match route {
        Route::Treemaps => " arrows:focus enter:open backspace:back e:export",
        Route::Map => " space:play \u{2190}\u{2192}:month []:year c:city tab:details hjkl:pan +/-:zoom e:export",
        Route::BarCharts | Route::PieChart => " tab:pane \u{2191}\u{2193}:move space:toggle e:export p:pdf",
        Route::Surface3d => " tab:pane \u{2191}\u{2193}:move space:toggle v:view hjkl:rotate e:export",
        Route::Home | Route::Logout => " 1-7:pages q:quit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = match &app.status {
        Some(msg) => vec![Span::styled(format!(" {msg} "), Style::default().fg(Color::Yellow))],
        None => Vec::new(),
    };
    spans.push(Span::styled(page_hints(app.route()), Style::default().fg(Color::DarkGray)));
    if let Some(email) = app.user_email() {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(email.to_string(), Style::default().fg(Color::Cyan)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    let table = app.table();
    let years = app.settings().years.iter().map(|y| y.to_string()).collect::<Vec<_>>().join(", ");
    let lines = vec![
        Line::from(Span::styled(
            "Welcome to Weather Dashboard",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from("Select a tab to visualize weather data."),
        Line::from(""),
        Line::from(format!("Loaded rows: {}", table.records().len())),
        Line::from(format!("Years: {years}")),
        Line::from(format!("Cities: {}", table.cities().len())),
        Line::from(format!("Disaster types: {}", table.disasters().join(", "))),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Home ");
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

/// Bordered block with a bold title, the common chrome of every page
fn titled_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

/// Copy a braille canvas layer into the buffer with a specific color
fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
    for (cx, cy, ch) in canvas.glyphs() {
        if cx >= area.width as usize || cy >= area.height as usize {
            continue;
        }
        let x = area.x + cx as u16;
        let y = area.y + cy as u16;
        buf[(x, y)].set_char(ch).set_fg(color);
    }
}

/// Write text clipped to the area's right edge
fn put_str(buf: &mut Buffer, area: Rect, x: u16, y: u16, text: &str, style: Style) {
    if y < area.y || y >= area.bottom() || x >= area.right() {
        return;
    }
    let max = (area.right() - x) as usize;
    let clipped: String = text.chars().take(max).collect();
    buf.set_string(x, y, clipped, style);
}
