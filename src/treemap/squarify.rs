use ratatui::layout::Rect;

/// A rectangle in fractional cell units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl LayoutRect {
    pub fn from_rect(r: Rect) -> Self {
        Self {
            x: r.x as f64,
            y: r.y as f64,
            w: r.width as f64,
            h: r.height as f64,
        }
    }

    /// Snap to whole cells; neighbouring rects share edges so tiles never overlap
    pub fn to_cells(self) -> Rect {
        let x0 = self.x.round().max(0.0);
        let y0 = self.y.round().max(0.0);
        let x1 = (self.x + self.w).round().max(x0);
        let y1 = (self.y + self.h).round().max(y0);
        Rect::new(x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16)
    }
}

/// Worst aspect ratio of a row of areas laid along a side of length `side`
fn worst_ratio(row: &[f64], side: f64) -> f64 {
    let sum: f64 = row.iter().sum();
    if sum <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let max = row.iter().cloned().fold(f64::MIN, f64::max);
    let min = row.iter().cloned().fold(f64::MAX, f64::min);
    let side2 = side * side;
    let sum2 = sum * sum;
    (side2 * max / sum2).max(sum2 / (side2 * min))
}

/// Place one finished row along the shorter side of `free`, shrinking it
fn layout_row(row: &[f64], free: &mut LayoutRect, out: &mut Vec<LayoutRect>) {
    let sum: f64 = row.iter().sum();
    if free.w >= free.h {
        // Column on the left
        let width = if free.h > 0.0 { sum / free.h } else { 0.0 };
        let mut y = free.y;
        for &area in row {
            let h = if width > 0.0 { area / width } else { 0.0 };
            out.push(LayoutRect { x: free.x, y, w: width, h });
            y += h;
        }
        free.x += width;
        free.w = (free.w - width).max(0.0);
    } else {
        // Row along the top
        let height = if free.w > 0.0 { sum / free.w } else { 0.0 };
        let mut x = free.x;
        for &area in row {
            let w = if height > 0.0 { area / height } else { 0.0 };
            out.push(LayoutRect { x, y: free.y, w, h: height });
            x += w;
        }
        free.y += height;
        free.h = (free.h - height).max(0.0);
    }
}

/// Squarified treemap layout (Bruls, Huizing, van Wijk). Returns one rect per
/// weight, in input order. Non-positive weights get empty rects.
pub fn squarify(weights: &[f64], area: LayoutRect) -> Vec<LayoutRect> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if weights.is_empty() || total <= 0.0 || area.w <= 0.0 || area.h <= 0.0 {
        return weights
            .iter()
            .map(|_| LayoutRect { x: area.x, y: area.y, w: 0.0, h: 0.0 })
            .collect();
    }

    let scale = area.w * area.h / total;
    let areas: Vec<f64> = weights.iter().map(|w| w.max(0.0) * scale).collect();

    let mut free = area;
    let mut out = Vec::with_capacity(areas.len());
    let mut row: Vec<f64> = Vec::new();

    for &a in &areas {
        let side = free.w.min(free.h);
        if row.is_empty() {
            row.push(a);
            continue;
        }
        let current = worst_ratio(&row, side);
        row.push(a);
        if worst_ratio(&row, side) > current {
            row.pop();
            layout_row(&row, &mut free, &mut out);
            row.clear();
            row.push(a);
        }
    }
    if !row.is_empty() {
        layout_row(&row, &mut free, &mut out);
    }

    out
}
