//! Document assembly: one PDF page per resolved page record, plus the
//! run report (summary counters, missing art, manuscript entries).

use crate::font::BookFont;
use crate::{RenderError, Result};
use book_compose::{
    Align, Book, GlyphMetrics, PageSpec, Rect, RegionLayout, SpreadSide, TextSource,
    background_placement, layout_text_box,
};
use printpdf::graphics::{LinePoint, PaintMode, Point, Polygon, PolygonRing, WindingOrder};
use printpdf::image::RawImage;
use printpdf::ops::Op;
use printpdf::xobject::{XObject, XObjectTransform};
use printpdf::{PdfDocument, PdfPage, PdfSaveOptions, Pt, Rgb, TextMatrix, XObjectId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Baseline offset from the top of a line, as a fraction of font size.
const ASCENT_RATIO: f32 = 0.8;

const PLACEHOLDER_FILL_GRAY: f32 = 0.92;
const PLACEHOLDER_LINE_GRAY: f32 = 0.65;

/// One rendered text region, recorded for the manuscript transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct ManuscriptEntry {
    pub page_number: usize,
    pub slug: String,
    pub side: Option<SpreadSide>,
    pub region: String,
    pub content: String,
}

/// A page rendered with a placeholder because its image was absent.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingImage {
    pub page_number: usize,
    pub slug: String,
    pub path: PathBuf,
}

/// Accumulated results of one assembly pass.
#[derive(Debug, Default)]
pub struct RunReport {
    pub total_pages: usize,
    pub pages_with_art: usize,
    pub word_count: usize,
    pub missing_images: Vec<MissingImage>,
    pub manuscript: Vec<ManuscriptEntry>,
}

/// Render every page record into a finished PDF, returning the document
/// bytes and the run report.
pub fn render_document(book: &Book, pages: &[PageSpec]) -> Result<(Vec<u8>, RunReport)> {
    let mut doc = PdfDocument::new(&book.title);
    let font = BookFont::load(&mut doc, &book.font)?;
    let mut builder = DocumentBuilder {
        book,
        doc,
        font,
        images: HashMap::new(),
        report: RunReport::default(),
    };
    for page in pages {
        builder.render_page(page)?;
    }
    log::info!("assembled {} pages", builder.report.total_pages);
    let mut warnings = Vec::new();
    let bytes = builder.doc.save(&PdfSaveOptions::default(), &mut warnings);
    Ok((bytes, builder.report))
}

struct DocumentBuilder<'a> {
    book: &'a Book,
    doc: PdfDocument,
    font: BookFont,
    /// Decoded image XObjects keyed by path; both halves of a spread
    /// reuse the same object.
    images: HashMap<PathBuf, (XObjectId, (u32, u32))>,
    report: RunReport,
}

impl DocumentBuilder<'_> {
    fn render_page(&mut self, page: &PageSpec) -> Result<()> {
        let (width, height) = (self.book.page_width_pt, self.book.page_height_pt);
        let mut ops = Vec::new();
        self.background_ops(page, &mut ops)?;
        for (name, region) in &self.book.regions {
            if let Some(source) = page.text.get(name) {
                self.text_ops(page, region, source, &mut ops)?;
            }
        }
        let bleed = self.book.bleed_pt;
        self.doc.pages.push(PdfPage {
            media_box: printpdf::Rect {
                x: Pt(0.0),
                y: Pt(0.0),
                width: Pt(width),
                height: Pt(height),
            },
            trim_box: printpdf::Rect {
                x: Pt(bleed),
                y: Pt(bleed),
                width: Pt(width - bleed * 2.0),
                height: Pt(height - bleed * 2.0),
            },
            crop_box: printpdf::Rect {
                x: Pt(0.0),
                y: Pt(0.0),
                width: Pt(width),
                height: Pt(height),
            },
            ops,
        });
        self.report.total_pages += 1;
        Ok(())
    }

    fn background_ops(&mut self, page: &PageSpec, ops: &mut Vec<Op>) -> Result<()> {
        let (width, height) = (self.book.page_width_pt, self.book.page_height_pt);
        if !page.image_path.exists() {
            log::warn!(
                "missing image for page '{}' ({}), rendering placeholder",
                page.slug,
                page.image_path.display()
            );
            self.report.missing_images.push(MissingImage {
                page_number: page.page_number,
                slug: page.slug.clone(),
                path: page.image_path.clone(),
            });
            placeholder_ops(ops, width, height);
            return Ok(());
        }

        let (xobj_id, (img_w, img_h)) = self.image_xobject(&page.image_path)?;
        let placement = background_placement(
            width,
            height,
            img_w as f32,
            img_h as f32,
            page.image_scale,
            page.image_offset,
            page.side,
        );
        // Spread halves draw the double-wide image shifted into place;
        // the clip keeps it from spilling past the current page.
        ops.push(Op::SaveGraphicsState);
        ops.push(Op::DrawPolygon {
            polygon: rect_polygon(placement.clip, PaintMode::Clip),
        });
        ops.push(Op::UseXobject {
            id: xobj_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(placement.rect.x)),
                translate_y: Some(Pt(placement.rect.y)),
                scale_x: Some(placement.rect.width / img_w as f32),
                scale_y: Some(placement.rect.height / img_h as f32),
                rotate: None,
                dpi: Some(72.0),
            },
        });
        ops.push(Op::RestoreGraphicsState);
        self.report.pages_with_art += 1;
        Ok(())
    }

    fn image_xobject(&mut self, path: &Path) -> Result<(XObjectId, (u32, u32))> {
        if let Some((id, dims)) = self.images.get(path) {
            return Ok((id.clone(), *dims));
        }
        let bytes = std::fs::read(path)?;
        let mut warnings = Vec::new();
        let raw = RawImage::decode_from_bytes(&bytes, &mut warnings).map_err(|e| {
            RenderError::Pdf(format!("failed to decode image {}: {}", path.display(), e))
        })?;
        let dims = (raw.width as u32, raw.height as u32);
        let id = XObjectId::new();
        self.doc
            .resources
            .xobjects
            .map
            .insert(id.clone(), XObject::Image(raw));
        self.images.insert(path.to_path_buf(), (id.clone(), dims));
        Ok((id, dims))
    }

    fn text_ops(
        &mut self,
        page: &PageSpec,
        region: &RegionLayout,
        source: &TextSource,
        ops: &mut Vec<Op>,
    ) -> Result<()> {
        let content = self.load_text(region, source)?;
        if content.is_empty() {
            return Ok(());
        }
        let text_box = layout_text_box(
            region,
            &content,
            page.page_number,
            self.book.page_width_pt,
            self.book.page_height_pt,
            &self.font,
        );

        ops.push(Op::StartTextSection);
        ops.push(Op::SetFillColor {
            col: printpdf::color::Color::Rgb(Rgb::new(
                region.color.r as f32 / 255.0,
                region.color.g as f32 / 255.0,
                region.color.b as f32 / 255.0,
                None,
            )),
        });
        self.font.set_size_ops(ops, region.font_size);
        let mut baseline = text_box.rect.top() - region.font_size * ASCENT_RATIO;
        for line in &text_box.lines {
            if !line.is_empty() {
                let line_width = self.font.text_width(line, region.font_size);
                let x = match region.align {
                    Align::Center => text_box.rect.x + (text_box.rect.width - line_width) / 2.0,
                    Align::Right => text_box.rect.x + text_box.rect.width - line_width,
                    // Justified paragraphs render flush left.
                    Align::Left | Align::Justify => text_box.rect.x,
                };
                ops.push(Op::SetTextMatrix {
                    matrix: TextMatrix::Translate(Pt(x), Pt(baseline)),
                });
                self.font.write_line_ops(ops, line);
            }
            baseline -= region.leading;
        }
        ops.push(Op::EndTextSection);

        self.report.word_count += content.split_whitespace().count();
        self.report.manuscript.push(ManuscriptEntry {
            page_number: page.page_number,
            slug: page.slug.clone(),
            side: page.side,
            region: region.name.clone(),
            content,
        });
        Ok(())
    }

    fn load_text(&self, region: &RegionLayout, source: &TextSource) -> Result<String> {
        let content = match source {
            TextSource::Inline(value) => value.clone(),
            TextSource::File(name) => {
                let folder = region.folder.as_ref().ok_or_else(|| {
                    RenderError::Config(format!(
                        "region '{}' is not configured with a folder, \
                         so file-based text source '{}' is unavailable",
                        region.name, name
                    ))
                })?;
                let path = folder.join(name);
                if !path.exists() {
                    return Err(RenderError::MissingResource(format!(
                        "text file '{}' not found in {}",
                        name,
                        folder.display()
                    )));
                }
                std::fs::read_to_string(&path)?
            }
        };
        Ok(content.trim().to_string())
    }
}

fn rect_polygon(rect: Rect, mode: PaintMode) -> Polygon {
    Polygon {
        rings: vec![PolygonRing {
            points: vec![
                corner(rect.x, rect.y),
                corner(rect.right(), rect.y),
                corner(rect.right(), rect.top()),
                corner(rect.x, rect.top()),
            ],
        }],
        mode,
        winding_order: WindingOrder::EvenOdd,
    }
}

fn corner(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

/// Flat background plus a diagonal marker, drawn when a page's image
/// file does not exist.
fn placeholder_ops(ops: &mut Vec<Op>, width: f32, height: f32) {
    ops.push(Op::SetFillColor {
        col: gray(PLACEHOLDER_FILL_GRAY),
    });
    ops.push(Op::DrawPolygon {
        polygon: rect_polygon(Rect::new(0.0, 0.0, width, height), PaintMode::Fill),
    });
    ops.push(Op::SetOutlineColor {
        col: gray(PLACEHOLDER_LINE_GRAY),
    });
    ops.push(Op::SetOutlineThickness { pt: Pt(2.0) });
    ops.push(Op::DrawPolygon {
        polygon: Polygon {
            rings: vec![PolygonRing {
                points: vec![corner(0.0, 0.0), corner(width, height)],
            }],
            mode: PaintMode::Stroke,
            winding_order: WindingOrder::EvenOdd,
        },
    });
}

fn gray(level: f32) -> printpdf::color::Color {
    printpdf::color::Color::Rgb(Rgb::new(level, level, level, None))
}
