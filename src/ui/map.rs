use super::{put_str, render_layer, titled_block};
use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::map::controller::{month_name, DIM_OPACITY, MONTH_NAMES};
use crate::map::{CameraSource, CityMarker, MapFrame, MapViewState, PlacedMarker, Viewport};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Widget},
    Frame,
};

const CONTROLS_H: u16 = 4;
const HOVER_W: u16 = 30;

fn split(body: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(CONTROLS_H)])
        .split(body);
    (chunks[0], chunks[1])
}

/// Cells the braille map is drawn in
pub fn canvas_area(body: Rect) -> Rect {
    titled_block("").inner(split(body).0)
}

pub fn render(frame: &mut Frame, app: &App, body: Rect) {
    let (map_area, controls) = split(body);
    let (Some(page), Some(map_frame)) = (app.map.as_ref(), app.map_frame()) else {
        return;
    };

    let years = &app.settings().years;
    let title = match (years.first(), years.last()) {
        (Some(first), Some(last)) => format!("Global Disaster Map ({first}-{last})"),
        _ => "Global Disaster Map".to_string(),
    };
    let block = titled_block(&title);
    let inner = block.inner(map_area);
    frame.render_widget(block, map_area);

    // Braille gives 2x4 resolution per character
    let viewport = Viewport::new(map_frame.camera, inner.width as usize * 2, inner.height as usize * 4);
    let mut coastlines = BrailleCanvas::new(inner.width as usize, inner.height as usize);
    app.map_renderer.render_coastlines(&mut coastlines, &viewport);
    let mut halos = BrailleCanvas::new(inner.width as usize, inner.height as usize);
    let placed = app.map_renderer.render_markers(&mut halos, &map_frame.markers, &viewport);

    frame.render_widget(
        MapWidget {
            coastlines,
            halos,
            placed,
            markers: &map_frame.markers,
            hover: page.hover,
        },
        inner,
    );

    if let Some(marker) = page
        .hover
        .and_then(|name| map_frame.markers.iter().find(|m| m.city.name == name))
    {
        render_hover(frame, marker, inner);
    }

    render_controls(frame, &map_frame, &page.view, controls);
}

/// Braille map with disaster markers overlaid
struct MapWidget<'a> {
    coastlines: BrailleCanvas,
    halos: BrailleCanvas,
    placed: Vec<PlacedMarker>,
    markers: &'a [CityMarker],
    hover: Option<&'static str>,
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Coastlines at the back, halos over them
        render_layer(&self.coastlines, Color::Cyan, area, buf);
        render_layer(&self.halos, Color::LightRed, area, buf);

        for placed in &self.placed {
            let Some(marker) = self.markers.get(placed.index) else {
                continue;
            };
            let x = area.x + placed.col;
            let y = area.y + placed.row;
            if x >= area.right() || y >= area.bottom() {
                continue;
            }
            let color = if marker.opacity <= DIM_OPACITY { Color::DarkGray } else { Color::Red };
            let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
            if self.hover == Some(marker.city.name) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            buf[(x, y)].set_char('\u{25cf}').set_style(style);
            put_str(buf, area, x + 2, y, marker.city.name, Style::default().fg(Color::White));
        }
    }
}

fn render_hover(frame: &mut Frame, marker: &CityMarker, area: Rect) {
    let height = (marker.hover.len() as u16 + 2).min(area.height);
    let width = HOVER_W.min(area.width);
    let rect = Rect::new(area.right().saturating_sub(width), area.y, width, height);
    let lines: Vec<Line> = marker.hover.iter().map(|h| Line::from(h.as_str())).collect();
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(titled_block(marker.city.name)), rect);
}

fn render_controls(frame: &mut Frame, map_frame: &MapFrame, view: &MapViewState, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Yellow);
    let camera_label = match map_frame.camera_source {
        CameraSource::CityFocus => "city focus",
        CameraSource::User => "user",
        CameraSource::World => "world",
    };
    let header = Line::from(vec![
        Span::styled(" Year: ", dim),
        Span::styled(format!("< {} >", map_frame.year), value),
        Span::styled("  City: ", dim),
        Span::styled(view.city_filter.to_string(), value),
        Span::styled("  Month: ", dim),
        Span::styled(month_name(map_frame.month), value),
        Span::styled("  Markers: ", dim),
        Span::styled(map_frame.markers.len().to_string(), value),
        Span::styled("  View: ", dim),
        Span::styled(
            format!(
                "{camera_label} z{:.1} ({:.1}, {:.1})",
                map_frame.camera.zoom, map_frame.camera.center.lat, map_frame.camera.center.lon
            ),
            value,
        ),
    ]);

    let mut slider = vec![Span::raw(" ")];
    for (i, name) in MONTH_NAMES.iter().enumerate() {
        let style = if i + 1 == map_frame.month as usize {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            dim
        };
        slider.push(Span::styled(format!(" {name} "), style));
    }

    let footer = Line::from(Span::styled(
        format!(" [{}] ", view.play_label()),
        Style::default().fg(Color::Black).bg(Color::Cyan),
    ));

    frame.render_widget(Paragraph::new(vec![header, Line::from(slider), footer]), area);
}
