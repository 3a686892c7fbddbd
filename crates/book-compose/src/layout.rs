//! Layout composition: absolute geometry for backgrounds and text boxes.
//!
//! Everything here is pure math over page and image dimensions so it can
//! be unit tested without touching fonts or files. The renderer supplies
//! real glyph advances through [`GlyphMetrics`].

use crate::config::{Anchor, Insets, RegionLayout};
use crate::types::SpreadSide;

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// Where the background image lands, and the page area it must be
/// clipped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundPlacement {
    /// Scaled draw rectangle; may extend past the page on spreads
    pub rect: Rect,
    /// The current page rectangle
    pub clip: Rect,
    /// Final scale applied to the source image
    pub scale: f32,
}

/// Cover-fit a source image over the page (or over both pages of a
/// spread), centered plus the configured offset.
///
/// For a spread the target is twice the page width; the right half draws
/// the same placement shifted left by one page width, so the image runs
/// seamlessly across the gutter.
pub fn background_placement(
    page_width: f32,
    page_height: f32,
    image_width: f32,
    image_height: f32,
    page_scale: f32,
    offset: (f32, f32),
    side: Option<SpreadSide>,
) -> BackgroundPlacement {
    let target_width = if side.is_some() {
        page_width * 2.0
    } else {
        page_width
    };
    let cover = (target_width / image_width).max(page_height / image_height);
    let scale = cover * page_scale;
    let draw_width = image_width * scale;
    let draw_height = image_height * scale;
    let mut x = (target_width - draw_width) / 2.0 + offset.0;
    let y = (page_height - draw_height) / 2.0 + offset.1;
    if side == Some(SpreadSide::Right) {
        x -= page_width;
    }
    BackgroundPlacement {
        rect: Rect::new(x, y, draw_width, draw_height),
        clip: Rect::new(0.0, 0.0, page_width, page_height),
        scale,
    }
}

/// Glyph advance source for wrapping and alignment. Implemented by the
/// renderer over the loaded font.
pub trait GlyphMetrics {
    fn char_width(&self, c: char, font_size: f32) -> f32;

    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|c| self.char_width(c, font_size)).sum()
    }
}

/// Greedy word wrap. Explicit newlines always break; blank source lines
/// survive as empty output lines.
pub fn wrap_text(
    text: &str,
    metrics: &dyn GlyphMetrics,
    font_size: f32,
    max_width: f32,
) -> Vec<String> {
    if max_width <= 0.0 {
        return text.lines().map(str::to_string).collect();
    }
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if metrics.text_width(&candidate, font_size) > max_width && !current.is_empty() {
                lines.push(current);
                current = word.to_string();
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Horizontal insets for a page, with `inner`/`outer` overriding
/// left/right by parity: odd page numbers are recto (right-hand), so
/// their spine is the left edge.
pub fn resolve_horizontal_insets(insets: &Insets, page_number: usize) -> (f32, f32) {
    let mut left = insets.left;
    let mut right = insets.right;
    let is_recto = page_number % 2 == 1;
    if let Some(inner) = insets.inner {
        if is_recto {
            left = inner;
        } else {
            right = inner;
        }
    }
    if let Some(outer) = insets.outer {
        if is_recto {
            right = outer;
        } else {
            left = outer;
        }
    }
    (left, right)
}

/// A positioned, wrapped paragraph ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub rect: Rect,
    pub lines: Vec<String>,
}

/// Wrap `content` into the region's box on the given page and anchor it
/// vertically. The measured height is clipped to the box height in whole
/// lines; empty content still claims one leading of height.
pub fn layout_text_box(
    region: &RegionLayout,
    content: &str,
    page_number: usize,
    page_width: f32,
    page_height: f32,
    metrics: &dyn GlyphMetrics,
) -> TextBox {
    let (left, right) = resolve_horizontal_insets(&region.insets, page_number);
    let width = page_width - (left + right);
    let mut lines = wrap_text(content, metrics, region.font_size, width);
    let max_lines = (region.box_height / region.leading).floor().max(1.0) as usize;
    if lines.len() > max_lines {
        lines.truncate(max_lines);
    }
    let mut height = lines.len() as f32 * region.leading;
    if height <= 0.0 {
        height = region.leading;
    }
    let y = match region.anchor {
        Anchor::Top => page_height - region.insets.top - height,
        Anchor::Center => (page_height - height) / 2.0 + region.insets.center,
        Anchor::Bottom => region.insets.bottom,
    };
    TextBox {
        rect: Rect::new(left, y, width, height),
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Align, Color};

    /// Fixed-advance metrics: every glyph is 0.5 em wide.
    struct FixedMetrics;

    impl GlyphMetrics for FixedMetrics {
        fn char_width(&self, _c: char, font_size: f32) -> f32 {
            font_size * 0.5
        }
    }

    fn region(anchor: Anchor, insets: Insets) -> RegionLayout {
        RegionLayout {
            name: "bottom".to_string(),
            folder: None,
            font_size: 10.0,
            leading: 12.0,
            color: Color { r: 0, g: 0, b: 0 },
            align: Align::Center,
            box_height: 36.0,
            insets,
            anchor,
        }
    }

    fn plain_insets() -> Insets {
        Insets {
            left: 20.0,
            right: 30.0,
            top: 15.0,
            bottom: 25.0,
            inner: None,
            outer: None,
            center: 0.0,
        }
    }

    #[test]
    fn test_cover_scale_single_page() {
        // Page 400x600, image 200x200: height ratio dominates (3.0).
        let placement =
            background_placement(400.0, 600.0, 200.0, 200.0, 1.0, (0.0, 0.0), None);
        assert!((placement.scale - 3.0).abs() < 1e-6);
        assert!((placement.rect.width - 600.0).abs() < 1e-6);
        assert!((placement.rect.height - 600.0).abs() < 1e-6);
        // Centered horizontally: (400 - 600) / 2 = -100.
        assert!((placement.rect.x + 100.0).abs() < 1e-6);
        assert!((placement.rect.y - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_page_scale_multiplies_cover_scale() {
        let base = background_placement(400.0, 600.0, 200.0, 200.0, 1.0, (0.0, 0.0), None);
        let zoomed = background_placement(400.0, 600.0, 200.0, 200.0, 1.5, (0.0, 0.0), None);
        assert!((zoomed.scale - base.scale * 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_spread_right_half_shifts_by_page_width() {
        let left = background_placement(
            400.0,
            600.0,
            800.0,
            600.0,
            1.0,
            (0.0, 0.0),
            Some(SpreadSide::Left),
        );
        let right = background_placement(
            400.0,
            600.0,
            800.0,
            600.0,
            1.0,
            (0.0, 0.0),
            Some(SpreadSide::Right),
        );
        assert!((left.rect.x - right.rect.x - 400.0).abs() < 1e-6);
        assert_eq!(left.rect.width, right.rect.width);
        // Both halves clip to the single-page rectangle.
        assert_eq!(left.clip, Rect::new(0.0, 0.0, 400.0, 600.0));
        assert_eq!(right.clip, Rect::new(0.0, 0.0, 400.0, 600.0));
    }

    #[test]
    fn test_inner_outer_parity_swap() {
        let insets = Insets {
            inner: Some(70.0),
            outer: Some(40.0),
            ..plain_insets()
        };
        // Recto (odd): spine on the left.
        assert_eq!(resolve_horizontal_insets(&insets, 3), (70.0, 40.0));
        // Verso (even): flipped.
        assert_eq!(resolve_horizontal_insets(&insets, 4), (40.0, 70.0));
    }

    #[test]
    fn test_plain_insets_ignore_parity() {
        let insets = plain_insets();
        assert_eq!(resolve_horizontal_insets(&insets, 1), (20.0, 30.0));
        assert_eq!(resolve_horizontal_insets(&insets, 2), (20.0, 30.0));
    }

    #[test]
    fn test_wrap_breaks_on_width() {
        // 0.5 em * 10pt = 5pt per char; 30pt fits six characters.
        let lines = wrap_text("one two three", &FixedMetrics, 10.0, 33.0);
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_wrap_keeps_blank_lines() {
        let lines = wrap_text("a\n\nb", &FixedMetrics, 10.0, 100.0);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn test_text_box_bottom_anchor() {
        let region = region(Anchor::Bottom, plain_insets());
        let text_box = layout_text_box(&region, "hi", 1, 400.0, 600.0, &FixedMetrics);
        assert_eq!(text_box.rect.y, 25.0);
        assert_eq!(text_box.rect.x, 20.0);
        assert_eq!(text_box.rect.width, 400.0 - 50.0);
        assert_eq!(text_box.lines.len(), 1);
        assert_eq!(text_box.rect.height, 12.0);
    }

    #[test]
    fn test_text_box_top_anchor_uses_measured_height() {
        let region = region(Anchor::Top, plain_insets());
        let text_box = layout_text_box(&region, "hi", 1, 400.0, 600.0, &FixedMetrics);
        // 600 - top inset 15 - one line of leading 12.
        assert_eq!(text_box.rect.y, 600.0 - 15.0 - 12.0);
    }

    #[test]
    fn test_text_box_clips_to_box_height() {
        // box_height 36 / leading 12 = 3 lines maximum.
        let region = region(Anchor::Bottom, plain_insets());
        let long = "word word word word word word word word word word";
        let text_box = layout_text_box(&region, long, 1, 120.0, 600.0, &FixedMetrics);
        assert_eq!(text_box.lines.len(), 3);
        assert_eq!(text_box.rect.height, 36.0);
    }

    #[test]
    fn test_empty_content_falls_back_to_one_leading() {
        let region = region(Anchor::Bottom, plain_insets());
        let text_box = layout_text_box(&region, "", 1, 400.0, 600.0, &FixedMetrics);
        assert!(text_box.lines.is_empty());
        assert_eq!(text_box.rect.height, 12.0);
    }
}
