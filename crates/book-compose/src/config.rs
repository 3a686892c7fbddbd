//! Book configuration: the serde model for the YAML config file and the
//! one-shot resolution into an immutable [`Book`].

use crate::expand::PageBlock;
use crate::library::TextLibrary;
use crate::types::{ComposeError, Result, in_to_pt, opt_in_to_pt};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The whole config file: the `book` section plus the inline page list.
#[derive(Debug, Deserialize)]
pub struct BookFile {
    pub book: BookSection,
    #[serde(default)]
    pub pages: Vec<PageBlock>,
}

#[derive(Debug, Deserialize)]
pub struct BookSection {
    #[serde(default)]
    pub trim_size_in: TrimSize,
    #[serde(default)]
    pub bleed_in: f32,
    #[serde(default = "default_output_pdf")]
    pub output_pdf: String,
    pub image_folder: Option<String>,
    #[serde(default)]
    pub font: FontSection,
    #[serde(default)]
    pub text_library: Option<String>,
    #[serde(default)]
    pub text_layout: BTreeMap<String, RegionSection>,
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub image_output: Toggle<ImageOutputSection>,
    #[serde(default)]
    pub manuscript: Toggle<ManuscriptSection>,
    #[serde(default)]
    pub title: Option<String>,
}

fn default_output_pdf() -> String {
    "book.pdf".to_string()
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TrimSize {
    pub width: f32,
    pub height: f32,
}

impl Default for TrimSize {
    fn default() -> Self {
        Self {
            width: 6.0,
            height: 9.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FontSection {
    pub name: Option<String>,
    pub path: Option<String>,
}

/// An optional feature section that may be written as `false` to turn
/// the feature off entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Toggle<T> {
    Enabled(T),
    Disabled(bool),
}

impl<T> Default for Toggle<T> {
    fn default() -> Self {
        Toggle::Disabled(false)
    }
}

impl<T> Toggle<T> {
    pub fn as_enabled(&self) -> Option<&T> {
        match self {
            Toggle::Enabled(value) => Some(value),
            Toggle::Disabled(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegionSection {
    pub folder: Option<String>,
    pub font_size_pt: f32,
    pub leading_pt: Option<f32>,
    pub color: String,
    pub align: Align,
    pub box_height_in: f32,
    pub inset_in: InsetSection,
    pub origin: Anchor,
}

impl Default for RegionSection {
    fn default() -> Self {
        Self {
            folder: None,
            font_size_pt: 26.0,
            leading_pt: None,
            color: "#111111".to_string(),
            align: Align::Center,
            box_height_in: 1.5,
            inset_in: InsetSection::default(),
            origin: Anchor::Bottom,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct InsetSection {
    pub left: Option<f32>,
    pub right: Option<f32>,
    pub top: Option<f32>,
    pub bottom: Option<f32>,
    pub inner: Option<f32>,
    pub outer: Option<f32>,
    pub center: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    #[default]
    Bottom,
    Center,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DefaultsSection {
    pub image_scale: Option<f32>,
    pub image_offset_in: OffsetSection,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct OffsetSection {
    pub x: Option<f32>,
    pub y: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageOutputSection {
    pub folder: String,
    #[serde(default)]
    pub format: ImageFormat,
    #[serde(default = "default_dpi")]
    pub dpi: f32,
}

fn default_dpi() -> f32 {
    300.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManuscriptSection {
    pub path: String,
    #[serde(default)]
    pub format: ManuscriptFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManuscriptFormat {
    #[default]
    Md,
    Txt,
}

/// An sRGB color parsed from a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn from_hex(value: &str) -> Result<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ComposeError::Config(format!(
                "invalid hex color '{value}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).unwrap_or(0);
        Ok(Self {
            r: channel(0..2),
            g: channel(2..4),
            b: channel(4..6),
        })
    }
}

/// Resolved per-region text layout, all lengths in points.
#[derive(Debug, Clone)]
pub struct RegionLayout {
    pub name: String,
    /// Backing folder for file-mode text sources. When unset, file-mode
    /// references against this region are a configuration error.
    pub folder: Option<PathBuf>,
    pub font_size: f32,
    pub leading: f32,
    pub color: Color,
    pub align: Align,
    pub box_height: f32,
    pub insets: Insets,
    pub anchor: Anchor,
}

/// Text box insets in points. `inner`/`outer` are spine-relative and
/// override left/right based on page parity; `center` nudges a
/// center-anchored box vertically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insets {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub inner: Option<f32>,
    pub outer: Option<f32>,
    pub center: f32,
}

const DEFAULT_INSET_IN: f32 = 0.5;

impl From<InsetSection> for Insets {
    fn from(raw: InsetSection) -> Self {
        let edge = |v: Option<f32>| in_to_pt(v.unwrap_or(DEFAULT_INSET_IN));
        Insets {
            left: edge(raw.left),
            right: edge(raw.right),
            top: edge(raw.top),
            bottom: edge(raw.bottom),
            inner: raw.inner.map(in_to_pt),
            outer: raw.outer.map(in_to_pt),
            center: opt_in_to_pt(raw.center),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FontSpec {
    pub name: String,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ImageOutput {
    pub folder: PathBuf,
    pub format: ImageFormat,
    pub dpi: f32,
}

#[derive(Debug, Clone)]
pub struct ManuscriptOutput {
    pub path: PathBuf,
    pub format: ManuscriptFormat,
}

/// The resolved, immutable book configuration for one run.
#[derive(Debug)]
pub struct Book {
    pub base_dir: PathBuf,
    pub title: String,
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub bleed_pt: f32,
    pub output_pdf: PathBuf,
    pub image_folder: PathBuf,
    pub font: FontSpec,
    pub regions: BTreeMap<String, RegionLayout>,
    pub default_scale: f32,
    pub default_offset: (f32, f32),
    pub image_output: Option<ImageOutput>,
    pub manuscript: Option<ManuscriptOutput>,
    pub pages: Vec<PageBlock>,
    pub library: TextLibrary,
}

impl Book {
    /// Load and resolve a book config from disk. The text library (when
    /// configured) is loaded as part of this step so the rest of the run
    /// sees a single immutable value.
    pub fn load(config_path: &Path) -> Result<Book> {
        if !config_path.exists() {
            return Err(ComposeError::MissingResource(format!(
                "config file not found: {}",
                config_path.display()
            )));
        }
        let raw = std::fs::read_to_string(config_path)?;
        let file: BookFile = serde_yaml::from_str(&raw)?;
        let base_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Book::from_file(file, base_dir)
    }

    pub fn from_file(file: BookFile, base_dir: PathBuf) -> Result<Book> {
        let cfg = file.book;

        let page_width_pt = in_to_pt(cfg.trim_size_in.width + cfg.bleed_in * 2.0);
        let page_height_pt = in_to_pt(cfg.trim_size_in.height + cfg.bleed_in * 2.0);

        let output_pdf = resolve_path(&base_dir, &cfg.output_pdf);
        if let Some(parent) = output_pdf.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let image_folder = cfg
            .image_folder
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ComposeError::Config("'book.image_folder' is required".to_string()))?;
        let image_folder = resolve_path(&base_dir, image_folder);

        let font = {
            let path = cfg.font.path.as_deref().map(|p| resolve_path(&base_dir, p));
            if let Some(path) = &path {
                if !path.exists() {
                    return Err(ComposeError::MissingResource(format!(
                        "font file not found: {}",
                        path.display()
                    )));
                }
            }
            FontSpec {
                name: cfg.font.name.unwrap_or_else(|| "Lexend".to_string()),
                path,
            }
        };

        let library = match cfg.text_library.as_deref().filter(|s| !s.is_empty()) {
            Some(rel) => {
                let path = resolve_path(&base_dir, rel);
                if !path.exists() {
                    return Err(ComposeError::MissingResource(format!(
                        "text library file not found: {}",
                        path.display()
                    )));
                }
                TextLibrary::load(&path)?
            }
            None => TextLibrary::default(),
        };

        let mut regions = BTreeMap::new();
        for (name, section) in cfg.text_layout {
            regions.insert(name.clone(), resolve_region(&base_dir, name, section)?);
        }

        let default_scale = cfg.defaults.image_scale.unwrap_or(1.0);
        let default_offset = (
            opt_in_to_pt(cfg.defaults.image_offset_in.x),
            opt_in_to_pt(cfg.defaults.image_offset_in.y),
        );

        let image_output = cfg.image_output.as_enabled().map(|out| ImageOutput {
            folder: resolve_path(&base_dir, &out.folder),
            format: out.format,
            dpi: out.dpi,
        });

        let manuscript = cfg.manuscript.as_enabled().map(|ms| ManuscriptOutput {
            path: resolve_path(&base_dir, &ms.path),
            format: ms.format,
        });

        Ok(Book {
            base_dir,
            title: cfg.title.unwrap_or_else(|| "Untitled Book".to_string()),
            page_width_pt,
            page_height_pt,
            bleed_pt: in_to_pt(cfg.bleed_in),
            output_pdf,
            image_folder,
            font,
            regions,
            default_scale,
            default_offset,
            image_output,
            manuscript,
            pages: file.pages,
            library,
        })
    }
}

fn resolve_region(base_dir: &Path, name: String, section: RegionSection) -> Result<RegionLayout> {
    let folder = match section.folder.as_deref().filter(|s| !s.is_empty()) {
        Some(rel) => {
            let path = resolve_path(base_dir, rel);
            std::fs::create_dir_all(&path)?;
            Some(path)
        }
        None => None,
    };
    let font_size = section.font_size_pt;
    Ok(RegionLayout {
        folder,
        font_size,
        leading: section.leading_pt.unwrap_or(font_size * 1.2),
        color: Color::from_hex(&section.color)?,
        align: section.align,
        box_height: in_to_pt(section.box_height_in),
        insets: section.inset_in.into(),
        anchor: section.origin,
        name,
    })
}

/// Resolve a possibly-relative path against the config file's directory.
pub fn resolve_path(base_dir: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
