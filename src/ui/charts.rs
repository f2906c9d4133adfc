use super::{put_str, render_layer, titled_block};
use crate::app::{App, SurfaceView};
use crate::braille::BrailleCanvas;
use crate::charts::bar::BarChart;
use crate::charts::pie::PieChart;
use crate::charts::scatter3d::{Orbit, Scatter3d, AXES};
use crate::charts::{series_color, severity_color, Figure};
use crate::controls::{Checklist, Dropdown};
use crate::data::{format_number, Severity};
use crate::map::draw_line;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart as BarWidget, BarGroup, Paragraph, Widget, Wrap},
    Frame,
};
use std::f64::consts::TAU;
use std::fmt::Display;

const PANEL_W: u16 = 30;

fn split(body: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(PANEL_W), Constraint::Min(10)])
        .split(body);
    (chunks[0], chunks[1])
}

fn header(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(Span::styled(label.to_string(), style))
}

fn dropdown_lines<T: Clone + PartialEq + Display>(label: &str, dd: &Dropdown<T>, focused: bool) -> Vec<Line<'static>> {
    let value = dd.selected().map_or_else(|| "-".to_string(), |v| v.to_string());
    vec![
        header(label, focused),
        Line::from(Span::styled(format!("  < {value} >"), Style::default().fg(Color::Yellow))),
        Line::from(""),
    ]
}

fn checklist_lines(label: &str, list: &Checklist, focused: bool) -> Vec<Line<'static>> {
    let mut lines = vec![header(label, focused)];
    for (i, (item, on)) in list.items().iter().enumerate() {
        let mark = if *on { "[x]" } else { "[ ]" };
        let mut style = Style::default().fg(if *on { Color::White } else { Color::DarkGray });
        if focused && i == list.cursor() {
            style = style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(Span::styled(format!("  {mark} {item}"), style)));
    }
    lines.push(Line::from(""));
    lines
}

fn render_panel(frame: &mut Frame, lines: Vec<Line<'static>>, area: Rect) {
    frame.render_widget(Paragraph::new(lines).block(titled_block("Filters")), area);
}

fn render_placeholder(frame: &mut Frame, title: &str, area: Rect) {
    let block = titled_block(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let mid = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, inner.height.min(1));
    frame.render_widget(
        Paragraph::new(Span::styled(title.to_string(), Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Center),
        mid,
    );
}

pub fn render_bar(frame: &mut Frame, app: &App, body: Rect) {
    let (panel, chart_area) = split(body);
    let page = &app.bar;
    let mut lines = checklist_lines("Cities (first 2 used)", &page.cities, page.focus == 0);
    lines.extend(dropdown_lines("Year", &page.year, page.focus == 1));
    lines.extend(checklist_lines("Disasters", &page.disasters, page.focus == 2));
    render_panel(frame, lines, panel);

    match app.bar_figure() {
        Figure::Empty { title } => render_placeholder(frame, &title, chart_area),
        Figure::Ready(chart) => draw_bar_chart(frame, &chart, chart_area),
    }
}

fn draw_bar_chart(frame: &mut Frame, chart: &BarChart, area: Rect) {
    let block = titled_block(&chart.title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut disasters: Vec<&str> = chart
        .panels
        .iter()
        .flat_map(|p| p.series.iter().map(|s| s.disaster.as_str()))
        .collect();
    disasters.sort_unstable();
    disasters.dedup();
    let color_of = |name: &str| series_color(disasters.iter().position(|d| *d == name).unwrap_or(0));

    let mut constraints: Vec<Constraint> = chart.panels.iter().map(|_| Constraint::Min(5)).collect();
    constraints.push(Constraint::Length(3));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (panel, area) in chart.panels.iter().zip(rows.iter()) {
        let groups: Vec<Vec<Bar>> = panel
            .months
            .iter()
            .enumerate()
            .map(|(m, _)| {
                panel
                    .series
                    .iter()
                    .filter_map(|s| {
                        s.values[m].map(|v| {
                            Bar::default()
                                .value(v.round().max(0.0) as u64)
                                .text_value(format_number(v))
                                .style(Style::default().fg(color_of(&s.disaster)))
                        })
                    })
                    .collect()
            })
            .collect();

        let mut widget = BarWidget::default()
            .block(titled_block(&panel.city))
            .bar_width(3)
            .bar_gap(0)
            .group_gap(2);
        for (month, bars) in panel.months.iter().zip(&groups) {
            widget = widget.data(BarGroup::default().label(Line::from(month.as_str())).bars(bars));
        }
        frame.render_widget(widget, *area);
    }

    let legend: Vec<Span> = disasters
        .iter()
        .flat_map(|d| {
            [
                Span::styled("\u{25a0} ", Style::default().fg(color_of(d))),
                Span::raw(format!("{d}  ")),
            ]
        })
        .collect();
    if let Some(footer) = rows.last() {
        frame.render_widget(
            Paragraph::new(vec![Line::from(legend), Line::from(chart.writeup.as_str())]).wrap(Wrap { trim: true }),
            *footer,
        );
    }
}

pub fn render_pie(frame: &mut Frame, app: &App, body: Rect) {
    let (panel, chart_area) = split(body);
    let page = &app.pie;
    let mut lines = dropdown_lines("City", &page.city, page.focus == 0);
    lines.extend(dropdown_lines("Year", &page.year, page.focus == 1));
    lines.extend(checklist_lines("Disasters", &page.disasters, page.focus == 2));
    render_panel(frame, lines, panel);

    match app.pie_figure() {
        Figure::Empty { title } => render_placeholder(frame, &title, chart_area),
        Figure::Ready(chart) => draw_pie_chart(frame, &chart, chart_area),
    }
}

/// One braille layer per slice, slices clockwise from 12 o'clock
fn pie_layers(chart: &PieChart, width: usize, height: usize) -> Vec<BrailleCanvas> {
    let mut layers: Vec<BrailleCanvas> = chart.slices.iter().map(|_| BrailleCanvas::new(width, height)).collect();
    let (pw, ph) = (width * 2, height * 4);
    let (cx, cy) = (pw as f64 / 2.0, ph as f64 / 2.0);
    let r = (pw.min(ph) as f64 / 2.0 - 1.0).max(0.0);

    let mut bounds = Vec::with_capacity(chart.slices.len());
    let mut acc = 0.0;
    for slice in &chart.slices {
        acc += slice.share;
        bounds.push(acc);
    }

    for y in 0..ph {
        for x in 0..pw {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let t = dx.atan2(-dy).rem_euclid(TAU) / TAU;
            let idx = bounds.iter().position(|b| t < *b).unwrap_or(bounds.len().saturating_sub(1));
            if let Some(layer) = layers.get_mut(idx) {
                layer.set_pixel(x, y);
            }
        }
    }
    layers
}

fn draw_pie_chart(frame: &mut Frame, chart: &PieChart, area: Rect) {
    let block = titled_block(&chart.title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(28)])
        .split(inner);
    let (pie_area, legend_area) = (chunks[0], chunks[1]);

    let layers = pie_layers(chart, pie_area.width as usize, pie_area.height as usize);
    frame.render_widget(LayerWidget { layers: &layers }, pie_area);

    let legend: Vec<Line> = chart
        .slices
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Line::from(vec![
                Span::styled("\u{25a0} ", Style::default().fg(series_color(i))),
                Span::raw(format!("{} ({})", s.label(), s.count)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(legend), legend_area);
}

/// Stack of braille layers coloured by series order
struct LayerWidget<'a> {
    layers: &'a [BrailleCanvas],
}

impl Widget for LayerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (i, layer) in self.layers.iter().enumerate() {
            render_layer(layer, series_color(i), area, buf);
        }
    }
}

pub fn render_surface(frame: &mut Frame, app: &App, body: Rect) {
    let (panel, chart_area) = split(body);
    let page = &app.surface;
    let mut lines = match page.view {
        SurfaceView::ByCities => {
            let mut lines = vec![header("View: cities (v to switch)", false), Line::from("")];
            lines.extend(checklist_lines("Cities", &page.cities, page.focus == 0));
            lines.extend(dropdown_lines("Disaster", &page.disaster, page.focus == 1));
            lines
        }
        SurfaceView::ByDisaster => {
            let mut lines = vec![header("View: disasters (v to switch)", false), Line::from("")];
            lines.extend(dropdown_lines("City", &page.city, page.focus == 0));
            lines
        }
    };
    lines.push(Line::from(Span::styled(
        format!("yaw {:.2} pitch {:.2}", page.orbit.yaw, page.orbit.pitch),
        Style::default().fg(Color::DarkGray),
    )));
    render_panel(frame, lines, panel);

    match app.surface_figure() {
        Figure::Empty { title } => render_placeholder(frame, &title, chart_area),
        Figure::Ready(chart) => {
            let block = titled_block(&chart.title);
            let inner = block.inner(chart_area);
            frame.render_widget(block, chart_area);
            frame.render_widget(ScatterWidget { chart: &chart, orbit: page.orbit }, inner);
        }
    }
}

/// Rotated 3D scatter: braille axes, points drawn far to near
struct ScatterWidget<'a> {
    chart: &'a Scatter3d,
    orbit: Orbit,
}

impl Widget for ScatterWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chart = self.chart;
        let mut axes = BrailleCanvas::new(area.width as usize, area.height as usize);
        let (pw, ph) = axes.pixel_size();
        let names = [chart.x_axis, chart.y_axis, chart.z_axis];
        let mut ends = Vec::with_capacity(AXES.len());
        for (from, to) in AXES {
            let (x0, y0, _) = self.orbit.project(from, pw, ph);
            let (x1, y1, _) = self.orbit.project(to, pw, ph);
            draw_line(&mut axes, x0, y0, x1, y1);
            ends.push((x1, y1));
        }
        render_layer(&axes, Color::DarkGray, area, buf);

        let label_style = Style::default().fg(Color::Gray);
        for ((px, py), name) in ends.into_iter().zip(names) {
            if px >= 0 && py >= 0 {
                put_str(buf, area, area.x + (px / 2) as u16, area.y + (py / 4) as u16, name, label_style);
            }
        }

        // y categories are not colour coded, so list them
        let mut row = area.y;
        for (i, label) in chart.y_labels.iter().enumerate() {
            let key = chart.y_axis.chars().next().unwrap_or('y');
            put_str(buf, area, area.x, row, &format!("{key}{}: {label}", i + 1), label_style);
            row += 1;
        }
        let range = format!(
            "{} {}..{}",
            chart.z_axis,
            format_number(chart.z_range.0),
            format_number(chart.z_range.1)
        );
        put_str(buf, area, area.x, area.bottom().saturating_sub(1), &range, label_style);

        let mut projected: Vec<(i32, i32, f64, Severity)> = chart
            .points
            .iter()
            .map(|p| {
                let (x, y, depth) = self.orbit.project(chart.cube_position(p), pw, ph);
                (x, y, depth, p.severity)
            })
            .collect();
        projected.sort_by(|a, b| a.2.total_cmp(&b.2));

        for (x, y, _, severity) in projected {
            if x < 0 || y < 0 {
                continue;
            }
            let (col, row) = (area.x + (x / 2) as u16, area.y + (y / 4) as u16);
            if col < area.right() && row < area.bottom() {
                buf[(col, row)]
                    .set_char('\u{25cf}')
                    .set_style(Style::default().fg(severity_color(severity)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::pie::PieSlice;
    use crate::charts::scatter3d;
    use crate::data::tests::sample_table;

    fn chart(shares: &[f64]) -> PieChart {
        PieChart {
            title: "t".into(),
            slices: shares
                .iter()
                .enumerate()
                .map(|(i, s)| PieSlice {
                    disaster: format!("d{i}"),
                    count: 1,
                    share: *s,
                })
                .collect(),
        }
    }

    fn dots(canvas: &BrailleCanvas) -> u32 {
        canvas.glyphs().map(|(_, _, ch)| (ch as u32 - 0x2800).count_ones()).sum()
    }

    #[test]
    fn test_pie_layers_split_by_share() {
        let layers = pie_layers(&chart(&[0.75, 0.25]), 20, 10);
        let (a, b) = (dots(&layers[0]), dots(&layers[1]));
        assert!(a > 0 && b > 0);
        let ratio = a as f64 / (a + b) as f64;
        assert!((ratio - 0.75).abs() < 0.05, "ratio {ratio}");
    }

    #[test]
    fn test_full_pie_single_layer() {
        let layers = pie_layers(&chart(&[1.0]), 10, 5);
        assert_eq!(layers.len(), 1);
        assert!(dots(&layers[0]) > 0);
    }

    #[test]
    fn test_scatter_widget_colours_points() {
        let table = sample_table();
        let fig = scatter3d::by_disaster(&table, Some("Tokyo"));
        let chart = fig.ready().unwrap();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        ScatterWidget {
            chart,
            orbit: Orbit::default(),
        }
        .render(area, &mut buf);

        let colours: Vec<Color> = buf
            .content()
            .iter()
            .filter(|c| c.symbol() == "\u{25cf}")
            .map(|c| c.fg)
            .collect();
        assert!(!colours.is_empty());
        assert!(colours.contains(&severity_color(Severity::VeryHigh)));
    }
}
