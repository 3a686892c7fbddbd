//! Manuscript transcript: the rendered text of every page, grouped by
//! page and written as markdown or plain text.

use crate::Result;
use crate::document::ManuscriptEntry;
use book_compose::ManuscriptFormat;
use std::path::Path;

/// Regions print in reading order: top, then everything else, then
/// bottom. Ties break alphabetically.
pub fn region_rank(name: &str) -> u8 {
    match name {
        "top" => 0,
        "bottom" => 2,
        _ => 1,
    }
}

pub fn sorted_entries(entries: &[ManuscriptEntry]) -> Vec<ManuscriptEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        (a.page_number, a.side, region_rank(&a.region), a.region.as_str()).cmp(&(
            b.page_number,
            b.side,
            region_rank(&b.region),
            b.region.as_str(),
        ))
    });
    sorted
}

pub fn write_manuscript(
    path: &Path,
    format: ManuscriptFormat,
    title: &str,
    entries: &[ManuscriptEntry],
) -> Result<()> {
    let sorted = sorted_entries(entries);
    let body = match format {
        ManuscriptFormat::Md => render_markdown(title, &sorted),
        ManuscriptFormat::Txt => render_plain(title, &sorted),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body)?;
    Ok(())
}

fn page_heading(entry: &ManuscriptEntry) -> String {
    match entry.side {
        Some(side) => format!(
            "Page {}: {} ({})",
            entry.page_number,
            entry.slug,
            side.as_str()
        ),
        None => format!("Page {}: {}", entry.page_number, entry.slug),
    }
}

fn render_markdown(title: &str, entries: &[ManuscriptEntry]) -> String {
    let mut out = format!("# {title}\n");
    let mut last_page = 0;
    for entry in entries {
        if entry.page_number != last_page {
            out.push_str(&format!("\n## {}\n\n", page_heading(entry)));
            last_page = entry.page_number;
        }
        out.push_str(&format!("**{}:** {}\n\n", entry.region, entry.content));
    }
    out
}

fn render_plain(title: &str, entries: &[ManuscriptEntry]) -> String {
    let mut out = format!("{title}\n");
    let mut last_page = 0;
    for entry in entries {
        if entry.page_number != last_page {
            out.push_str(&format!("\n{}\n", page_heading(entry)));
            last_page = entry.page_number;
        }
        out.push_str(&format!("  {}: {}\n", entry.region, entry.content));
    }
    out
}
