use crate::charts::severity_color;
use crate::data::{format_number, DisasterTable};
use crate::treemap::squarify::{squarify, LayoutRect};
use ratatui::layout::Rect;
use ratatui::style::Color;

/// Colour of the root segment on the disaster level
pub const ROOT_COLOR: Color = Color::Gray;

#[derive(Debug, Clone, PartialEq)]
pub struct TreemapNode {
    pub label: String,
    pub color: Option<Color>,
    /// Hover lines; empty means no hover detail
    pub hover: Vec<String>,
}

impl TreemapNode {
    fn plain(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: None,
            hover: Vec::new(),
        }
    }
}

/// Declarative treemap: an optional root (the "back" segment) with equally weighted leaves.
/// The default value is the empty placeholder used for hidden levels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreemapFigure {
    pub title: String,
    pub root: Option<TreemapNode>,
    pub leaves: Vec<TreemapNode>,
}

/// A laid-out segment of a figure
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub label: String,
    pub rect: Rect,
    /// `None` for the root header
    pub leaf: Option<usize>,
}

impl TreemapFigure {
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.title.is_empty() && self.root.is_none() && self.leaves.is_empty()
    }

    /// Top level: one leaf per year
    pub fn years(years: &[String]) -> Self {
        Self {
            title: "Select Year".to_string(),
            root: None,
            leaves: years.iter().map(|y| TreemapNode::plain(y.as_str())).collect(),
        }
    }

    /// Twelve "YYYY-MM" leaves under the year
    pub fn months(year: &str) -> Self {
        Self {
            title: format!("Select Month in {year}"),
            root: Some(TreemapNode::plain(year)),
            leaves: (1..=12).map(|m| TreemapNode::plain(format!("{year}-{m:02}"))).collect(),
        }
    }

    /// Cities with rows in the month
    pub fn cities(table: &DisasterTable, year: i32, month: &str) -> Self {
        Self {
            title: format!("Select City in {month}"),
            root: Some(TreemapNode::plain(month)),
            leaves: table
                .cities_in_month(year, month)
                .into_iter()
                .map(TreemapNode::plain)
                .collect(),
        }
    }

    /// One leaf per disaster row of the city in the month, coloured by severity
    pub fn disasters(table: &DisasterTable, year: i32, month: &str, city: &str) -> Self {
        let leaves = table
            .city_month_rows(year, month, city)
            .into_iter()
            .map(|r| TreemapNode {
                label: r.disaster.clone(),
                color: Some(severity_color(r.severity)),
                hover: vec![
                    r.disaster.clone(),
                    format!("Value: {} {}", format_number(r.value), r.unit),
                    format!("Severity: {}", r.severity),
                    format!("Scale: {}", format_number(r.scale)),
                ],
            })
            .collect();

        Self {
            title: format!("Disasters in {city} ({month})"),
            root: Some(TreemapNode {
                label: city.to_string(),
                color: Some(ROOT_COLOR),
                hover: Vec::new(),
            }),
            leaves,
        }
    }

    /// Lay the figure out in `area`: root as a one-row header, leaves squarified below
    pub fn layout(&self, area: Rect) -> Vec<Tile> {
        let mut tiles = Vec::with_capacity(self.leaves.len() + 1);
        let mut body = area;

        if let Some(root) = &self.root {
            if body.height == 0 {
                return tiles;
            }
            tiles.push(Tile {
                label: root.label.clone(),
                rect: Rect::new(body.x, body.y, body.width, 1),
                leaf: None,
            });
            body = Rect::new(body.x, body.y + 1, body.width, body.height - 1);
        }

        let weights = vec![1.0; self.leaves.len()];
        let mut rects: Vec<Rect> = squarify(&weights, LayoutRect::from_rect(body))
            .into_iter()
            .map(LayoutRect::to_cells)
            .collect();
        if rects.iter().any(|r| r.width == 0 || r.height == 0) {
            rects = grid_cells(body, self.leaves.len());
        }
        for (i, (leaf, rect)) in self.leaves.iter().zip(rects).enumerate() {
            tiles.push(Tile {
                label: leaf.label.clone(),
                rect,
                leaf: Some(i),
            });
        }
        tiles
    }
}

/// Row-major grid with one slot per leaf, for areas too small to squarify.
/// Slots run out only when `area` has fewer cells than `n`.
fn grid_cells(area: Rect, n: usize) -> Vec<Rect> {
    if n == 0 || area.width == 0 || area.height == 0 {
        return Vec::new();
    }
    let rows = n.min(area.height as usize);
    let cols = n.div_ceil(rows).min(area.width as usize);
    let edge = |start: u16, len: u16, parts: usize, i: usize| start + (len as usize * i / parts) as u16;

    (0..n.min(rows * cols))
        .map(|i| {
            let (r, c) = (i / cols, i % cols);
            let x = edge(area.x, area.width, cols, c);
            let y = edge(area.y, area.height, rows, r);
            Rect::new(
                x,
                y,
                edge(area.x, area.width, cols, c + 1) - x,
                edge(area.y, area.height, rows, r + 1) - y,
            )
        })
        .collect()
}

/// Label under a terminal cell, leaves checked before the root header
pub fn hit_test(tiles: &[Tile], col: u16, row: u16) -> Option<&Tile> {
    let contains = |r: &Rect| col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height;
    tiles
        .iter()
        .filter(|t| t.leaf.is_some())
        .find(|t| contains(&t.rect))
        .or_else(|| tiles.iter().find(|t| t.leaf.is_none() && contains(&t.rect)))
}
