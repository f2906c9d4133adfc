use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draw a circle outline, used for marker halos
pub fn draw_ring(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    let inner = (radius - 1) * (radius - 1);
    let outer = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d = dx * dx + dy * dy;
            if d <= outer && d > inner {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(canvas.glyphs().count(), 5);
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.glyph(0, 0), Some('⡇'));
        assert_eq!(canvas.glyph(0, 1), Some('⡇'));
    }

    #[test]
    fn test_ring_leaves_center_empty() {
        let mut canvas = BrailleCanvas::new(4, 2);
        draw_ring(&mut canvas, 4, 4, 3);
        assert!(canvas.glyphs().count() > 0);
        // cell (2,1) holds the center dot at bit 0x01
        let mut only_center = BrailleCanvas::new(4, 2);
        only_center.set_pixel(4, 4);
        assert_ne!(canvas.glyph(2, 1), only_center.glyph(2, 1));
    }
}
