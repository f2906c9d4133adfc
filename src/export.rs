//! Files written by the export keys: plain-text snapshots and PDF reports.

use anyhow::{anyhow, Context, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use ratatui::buffer::Buffer;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 15.0;
const LINE_MM: f32 = 6.0;
const TITLE_PT: f32 = 16.0;
const BODY_PT: f32 = 10.0;

/// Buffer contents as lines of text, trailing blanks trimmed
pub fn snapshot_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            line.push_str(buf[(x, y)].symbol());
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Write `<dir>/<stem>.txt`
pub fn write_snapshot(dir: &Path, stem: &str, buf: &Buffer) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("{stem}.txt"));
    fs::write(&path, snapshot_text(buf)).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "snapshot exported");
    Ok(path)
}

/// Title plus one text line per entry, paginated on A4
pub fn write_pdf(dir: &Path, file_name: &str, title: &str, lines: &[String]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(file_name);

    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Report");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("loading builtin font: {e:?}"))?;

    let mut current = doc.get_page(page).get_layer(layer);
    current.use_text(title, TITLE_PT, Mm(MARGIN), Mm(PAGE_H - MARGIN), &font);
    let mut y = PAGE_H - MARGIN - LINE_MM * 2.0;

    for line in lines {
        if y < MARGIN {
            let (page, layer) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Report");
            current = doc.get_page(page).get_layer(layer);
            y = PAGE_H - MARGIN;
        }
        current.use_text(line.as_str(), BODY_PT, Mm(MARGIN), Mm(y), &font);
        y -= LINE_MM;
    }

    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| anyhow!("writing {}: {e:?}", path.display()))?;
    tracing::info!(path = %path.display(), lines = lines.len(), "pdf exported");
    Ok(path)
}
