use super::{put_str, titled_block};
use crate::app::App;
use crate::charts::series_color;
use crate::treemap::{Tile, TreemapFigure, ROOT_COLOR};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Paragraph, Widget},
    Frame,
};

const DETAILS_H: u16 = 7;

fn split(body: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(DETAILS_H)])
        .split(body);
    (chunks[0], chunks[1])
}

/// Cells the treemap tiles are laid out in
pub fn chart_area(body: Rect) -> Rect {
    titled_block("").inner(split(body).0)
}

pub fn render(frame: &mut Frame, app: &App, body: Rect) {
    let (chart, details) = split(body);
    let nav = &app.treemap.nav;
    let figure = nav.visible_figure();

    let block = titled_block(&figure.title);
    let inner = block.inner(chart);
    frame.render_widget(block, chart);

    let tiles = figure.layout(inner);
    frame.render_widget(
        TreemapWidget {
            figure,
            tiles: &tiles,
            focus: app.treemap.focus,
        },
        inner,
    );

    let state = nav.state();
    let trail: Vec<&str> = [
        state.selected_year.as_deref(),
        state.selected_month.as_deref(),
        state.selected_city.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    let mut lines = vec![Line::from(format!("Level: {}  {}", nav.level(), trail.join(" > ")))];

    match tiles.get(app.treemap.focus) {
        Some(Tile { leaf: Some(i), .. }) => {
            let leaf = &figure.leaves[*i];
            if leaf.hover.is_empty() {
                lines.push(Line::from(leaf.label.clone()));
            } else {
                lines.extend(leaf.hover.iter().map(|h| Line::from(h.clone())));
            }
        }
        Some(Tile { label, leaf: None, .. }) => lines.push(Line::from(format!("Back from {label}"))),
        None => {}
    }
    if figure.root.is_some() && figure.leaves.is_empty() {
        lines.push(Line::from("No records here; use the header to go back"));
    }

    frame.render_widget(Paragraph::new(lines).block(titled_block("Details")), details);
}

/// Filled treemap tiles with their labels
struct TreemapWidget<'a> {
    figure: &'a TreemapFigure,
    tiles: &'a [Tile],
    focus: usize,
}

impl TreemapWidget<'_> {
    fn tile_color(&self, tile: &Tile) -> Color {
        match tile.leaf {
            Some(i) => self.figure.leaves[i].color.unwrap_or_else(|| series_color(i)),
            None => self
                .figure
                .root
                .as_ref()
                .and_then(|r| r.color)
                .unwrap_or(ROOT_COLOR),
        }
    }
}

impl Widget for TreemapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (idx, tile) in self.tiles.iter().enumerate() {
            let rect = tile.rect.intersection(area);
            if rect.is_empty() {
                continue;
            }
            let mut style = Style::default().bg(self.tile_color(tile)).fg(Color::Black);
            if idx == self.focus {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
            buf.set_style(rect, style);

            // One-cell gutter on the right and bottom keeps neighbours apart
            if rect.width > 2 && rect.height > 1 && tile.leaf.is_some() {
                let right = Rect::new(rect.right() - 1, rect.y, 1, rect.height);
                let bottom = Rect::new(rect.x, rect.bottom() - 1, rect.width, 1);
                buf.set_style(right, Style::default().bg(Color::Reset));
                buf.set_style(bottom, Style::default().bg(Color::Reset));
            }
            let label = match tile.leaf {
                None => format!("\u{2191} {}", tile.label),
                Some(_) => tile.label.clone(),
            };
            put_str(buf, rect, rect.x, rect.y, &label, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::sample_table;
    use crate::treemap::TreemapNavigator;
    use crate::treemap::Level;

    #[test]
    fn test_widget_draws_every_leaf_label() {
        let table = sample_table();
        let mut nav = TreemapNavigator::new(vec!["2026".into()], &table);
        nav.click(Level::Year, "2026", &table);
        let figure = nav.visible_figure();
        let area = Rect::new(0, 0, 80, 20);
        let tiles = figure.layout(area);
        let mut buf = Buffer::empty(area);
        TreemapWidget {
            figure,
            tiles: &tiles,
            focus: 0,
        }
        .render(area, &mut buf);

        let text = crate::export::snapshot_text(&buf);
        assert!(text.contains("\u{2191} 2026"));
        assert!(text.contains("2026-01"));
        assert!(text.contains("2026-12"));
    }

    #[test]
    fn test_chart_area_inside_border() {
        let body = Rect::new(0, 1, 80, 30);
        let area = chart_area(body);
        assert_eq!(area.x, 1);
        assert_eq!(area.y, 2);
        assert_eq!(area.height, 30 - DETAILS_H - 2);
    }
}
