//! Book font: either a TTF parsed and embedded into the document, or a
//! builtin PDF font when no font path is configured.

use crate::{RenderError, Result};
use book_compose::{FontSpec, GlyphMetrics};
use printpdf::{BuiltinFont, FontId, Op, ParsedFont, PdfDocument, Pt, TextItem};

/// Advance units in a parsed font are thousandths of the em square.
const UNITS_PER_EM: f32 = 1000.0;

/// Approximate advance for glyphs we cannot measure (builtin fonts, or
/// codepoints missing from the embedded font).
const FALLBACK_CHAR_WIDTH_EM: f32 = 0.6;

pub enum BookFont {
    Embedded { id: FontId, font: ParsedFont },
    Builtin(BuiltinFont),
}

impl BookFont {
    /// Load the configured font into the document. The config loader has
    /// already verified that a configured path exists.
    pub fn load(doc: &mut PdfDocument, spec: &FontSpec) -> Result<BookFont> {
        match &spec.path {
            Some(path) => {
                let bytes = std::fs::read(path)?;
                let mut warnings = Vec::new();
                let font = ParsedFont::from_bytes(&bytes, 0, &mut warnings).ok_or_else(|| {
                    RenderError::Pdf(format!(
                        "failed to parse font '{}' from {}",
                        spec.name,
                        path.display()
                    ))
                })?;
                let id = doc.add_font(&font);
                Ok(BookFont::Embedded { id, font })
            }
            None => Ok(BookFont::Builtin(BuiltinFont::Helvetica)),
        }
    }

    pub fn set_size_ops(&self, ops: &mut Vec<Op>, size: f32) {
        match self {
            BookFont::Embedded { id, .. } => ops.push(Op::SetFontSize {
                font: id.clone(),
                size: Pt(size),
            }),
            BookFont::Builtin(font) => ops.push(Op::SetFontSizeBuiltinFont {
                font: font.clone(),
                size: Pt(size),
            }),
        }
    }

    pub fn write_line_ops(&self, ops: &mut Vec<Op>, line: &str) {
        match self {
            BookFont::Embedded { id, .. } => ops.push(Op::WriteText {
                items: vec![TextItem::Text(line.to_string())],
                font: id.clone(),
            }),
            BookFont::Builtin(font) => ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(line.to_string())],
                font: font.clone(),
            }),
        }
    }
}

impl GlyphMetrics for BookFont {
    fn char_width(&self, c: char, font_size: f32) -> f32 {
        match self {
            BookFont::Embedded { font, .. } => match font.lookup_glyph_index(c as u32) {
                Some(glyph_id) => {
                    let advance = font.get_horizontal_advance(glyph_id);
                    (advance as f32 / UNITS_PER_EM) * font_size
                }
                None => font_size * FALLBACK_CHAR_WIDTH_EM,
            },
            BookFont::Builtin(_) => font_size * FALLBACK_CHAR_WIDTH_EM,
        }
    }
}
