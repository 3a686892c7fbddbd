use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Missing resource: {0}")]
    MissingResource(String),
}

pub type Result<T> = std::result::Result<T, ComposeError>;

pub const POINTS_PER_INCH: f32 = 72.0;

/// Convert a length in inches to points.
pub fn in_to_pt(inches: f32) -> f32 {
    inches * POINTS_PER_INCH
}

/// Tolerant conversion: an absent value resolves to zero points.
pub fn opt_in_to_pt(inches: Option<f32>) -> f32 {
    inches.map(in_to_pt).unwrap_or(0.0)
}

/// How a page block expands into output pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageKind {
    /// A single page
    #[default]
    Page,
    /// A two-page visual unit whose image spans the gutter
    Spread,
}

impl PageKind {
    /// Parse the `kind` field of a page block. Anything that is not
    /// "spread" is treated as an ordinary page.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("spread") {
            PageKind::Spread
        } else {
            PageKind::Page
        }
    }

    /// Number of sub-pages a block of this kind expands to when no
    /// explicit span is given.
    pub fn default_span(self) -> usize {
        match self {
            PageKind::Page => 1,
            PageKind::Spread => 2,
        }
    }
}

/// Which half of a spread a sub-page renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpreadSide {
    /// Verso half (even page number)
    Left,
    /// Recto half (odd page number)
    Right,
}

impl SpreadSide {
    pub fn as_str(self) -> &'static str {
        match self {
            SpreadSide::Left => "left",
            SpreadSide::Right => "right",
        }
    }
}

/// A fully resolved leaf text value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    /// Literal paragraph content
    Inline(String),
    /// File name to read from the region's configured folder
    File(String),
}

/// One concrete output page, produced by the expander and consumed
/// exactly once by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSpec {
    pub slug: String,
    /// Zero-based index within the source block (drives left/right selection)
    pub sequence_index: usize,
    /// 1-indexed, strictly sequential across the whole book
    pub page_number: usize,
    pub kind: PageKind,
    pub side: Option<SpreadSide>,
    pub image_path: PathBuf,
    pub image_scale: f32,
    /// Final offset in points (x, y)
    pub image_offset: (f32, f32),
    /// Region name to resolved text source; regions that resolved to
    /// "no text" are simply absent.
    pub text: BTreeMap<String, TextSource>,
}

impl PageSpec {
    /// Odd page numbers sit on the right-hand side of the open book.
    pub fn is_recto(&self) -> bool {
        self.page_number % 2 == 1
    }
}
