use crate::colour::Colour;
use crate::document::Document;
use crate::font::{Font, Measure};
use crate::image::Image;
use crate::layout::Margins;
use crate::page::{ImageLayout, LineLayout, Page, RectLayout, SpanFont, SpanLayout};
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::units::Pt;
use id_arena::Id;
use log::debug;

/// Which of the two configured faces a piece of text is set in
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// How a run of text is set: face, size and fill colour
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub weight: Weight,
    pub size: Pt,
    pub colour: Colour,
}

impl TextStyle {
    pub const fn new(weight: Weight, size: Pt, colour: Colour) -> TextStyle {
        TextStyle {
            weight,
            size,
            colour,
        }
    }

    pub const fn regular(size: Pt, colour: Colour) -> TextStyle {
        TextStyle::new(Weight::Regular, size, colour)
    }

    pub const fn bold(size: Pt, colour: Colour) -> TextStyle {
        TextStyle::new(Weight::Bold, size, colour)
    }
}

/// Horizontal placement of a continuation header line
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Placement {
    /// Left edge of the text at this x
    At(Pt),
    /// Centered on the page
    Centered,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderLine {
    pub text: String,
    pub style: TextStyle,
    pub x: Placement,
    /// Baseline, measured down from the top edge of the page
    pub from_top: Pt,
}

/// What every continuation page starts with, and where content resumes on it
#[derive(Clone, Debug, PartialEq)]
pub struct Continuation {
    pub lines: Vec<HeaderLine>,
    /// Cursor position on a fresh continuation page, measured down from the
    /// top edge of the page
    pub content_top: Pt,
}

/// The page cursor and pagination controller.
///
/// Owns the document while it is being composed, the page currently being
/// drawn on, and a cursor that walks down that page. Coordinates are PDF
/// native (y grows upwards), so the cursor decreases as content is placed.
///
/// A draw of vertical extent `e` fits while `cursor - e >= bottom`; landing
/// exactly on the bottom limit is not an overflow. When something does not
/// fit, [`LayoutState::break_page`] moves the finished page into the document,
/// opens a fresh one, stamps the continuation header and resets the cursor.
pub struct LayoutState {
    document: Document,
    page: Page,
    size: PageSize,
    margins: Option<Margins>,
    cursor: Pt,
    bottom: Pt,
    continuation: Continuation,
    page_count: usize,
    regular: Id<Font>,
    bold: Id<Font>,
}

impl LayoutState {
    /// Start a composition run on a fresh first page with the cursor at `start`
    pub fn new(
        size: PageSize,
        regular: Font,
        bold: Font,
        start: Pt,
        bottom: Pt,
        continuation: Continuation,
    ) -> LayoutState {
        let mut document = Document::default();
        let regular = document.add_font(regular);
        let bold = document.add_font(bold);
        LayoutState {
            document,
            page: Page::new(size, None),
            size,
            margins: None,
            cursor: start,
            bottom,
            continuation,
            page_count: 1,
            regular,
            bold,
        }
    }

    /// Record `margins` as the content box of every page, including the one
    /// already open
    pub fn with_margins(mut self, margins: Margins) -> LayoutState {
        self.margins = Some(margins);
        self.page = Page::new(self.size, self.margins);
        self
    }

    pub fn cursor(&self) -> Pt {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Pt) {
        self.cursor = cursor;
    }

    /// Move the cursor down the page
    pub fn advance(&mut self, by: Pt) {
        self.cursor -= by;
    }

    pub fn bottom(&self) -> Pt {
        self.bottom
    }

    pub fn page_width(&self) -> Pt {
        self.size.0
    }

    pub fn page_height(&self) -> Pt {
        self.size.1
    }

    /// Number of pages opened so far, including the current one
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// The page currently being drawn on
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn fits(&self, extent: Pt) -> bool {
        self.cursor - extent >= self.bottom
    }

    /// Break to a new page if `extent` does not fit below the cursor.
    /// Returns whether a break happened.
    pub fn ensure(&mut self, extent: Pt) -> bool {
        if self.fits(extent) {
            false
        } else {
            self.break_page();
            true
        }
    }

    /// Finish the current page and continue on a new one
    pub fn break_page(&mut self) {
        let finished = std::mem::replace(&mut self.page, Page::new(self.size, self.margins));
        self.document.add_page(finished);
        self.page_count += 1;
        debug!(
            "overflow at {:.2}pt (limit {:.2}pt), opened page {}",
            *self.cursor, *self.bottom, self.page_count
        );

        let lines = std::mem::take(&mut self.continuation.lines);
        for line in lines.iter() {
            let baseline = self.page_height() - line.from_top;
            match line.x {
                Placement::At(x) => self.text(x, baseline, &line.text, line.style),
                Placement::Centered => {
                    let centre = self.page_width() / 2.0;
                    self.text_centered(centre, baseline, &line.text, line.style)
                }
            }
        }
        self.continuation.lines = lines;
        self.cursor = self.page_height() - self.continuation.content_top;
    }

    fn font_id(&self, weight: Weight) -> Id<Font> {
        match weight {
            Weight::Regular => self.regular,
            Weight::Bold => self.bold,
        }
    }

    pub fn font(&self, weight: Weight) -> &Font {
        &self.document.fonts[self.font_id(weight)]
    }

    /// Rendered width of `text` in the given style
    pub fn measure(&self, text: &str, style: TextStyle) -> Pt {
        self.font(style.weight).width_of(text, style.size)
    }

    /// Draw text with its left edge at `x`. Empty strings are skipped.
    pub fn text(&mut self, x: Pt, baseline: Pt, text: &str, style: TextStyle) {
        if text.is_empty() {
            return;
        }
        self.page.add_span(SpanLayout {
            text: text.to_string(),
            font: SpanFont {
                id: self.font_id(style.weight),
                size: style.size,
            },
            colour: style.colour,
            coords: (x, baseline),
        });
    }

    /// Draw text so that it ends at `right`
    pub fn text_right(&mut self, right: Pt, baseline: Pt, text: &str, style: TextStyle) {
        let width = self.measure(text, style);
        self.text(right - width, baseline, text, style);
    }

    /// Draw text centered on `centre`
    pub fn text_centered(&mut self, centre: Pt, baseline: Pt, text: &str, style: TextStyle) {
        let width = self.measure(text, style);
        self.text(centre - width / 2.0, baseline, text, style);
    }

    pub fn fill_rect(&mut self, rect: Rect, fill: Colour) {
        self.page.add_rect(RectLayout {
            rect,
            fill: Some(fill),
            stroke: None,
        });
    }

    pub fn stroke_rect(&mut self, rect: Rect, stroke: Colour, width: Pt) {
        self.page.add_rect(RectLayout {
            rect,
            fill: None,
            stroke: Some((stroke, width)),
        });
    }

    pub fn fill_stroke_rect(&mut self, rect: Rect, fill: Colour, stroke: Colour, width: Pt) {
        self.page.add_rect(RectLayout {
            rect,
            fill: Some(fill),
            stroke: Some((stroke, width)),
        });
    }

    pub fn line(&mut self, from: (Pt, Pt), to: (Pt, Pt), colour: Colour, width: Pt) {
        self.page.add_line(LineLayout {
            from,
            to,
            colour,
            width,
        });
    }

    pub fn add_image(&mut self, image: Image) -> Id<Image> {
        self.document.add_image(image)
    }

    pub fn draw_image(&mut self, image_id: Id<Image>, position: Rect) {
        self.page.add_image(ImageLayout { image_id, position });
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// End the run, moving the current page into the document
    pub fn finish(self) -> Document {
        let LayoutState {
            mut document, page, ..
        } = self;
        document.add_page(page);
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colours;
    use crate::font::StandardFont;
    use crate::pagesize::A4;

    fn state(start: f32, bottom: f32) -> LayoutState {
        LayoutState::new(
            A4,
            Font::standard(StandardFont::Helvetica),
            Font::standard(StandardFont::HelveticaBold),
            Pt(start),
            Pt(bottom),
            Continuation {
                lines: vec![HeaderLine {
                    text: "Continued".to_string(),
                    style: TextStyle::bold(Pt(12.0), colours::BLACK),
                    x: Placement::Centered,
                    from_top: Pt(50.0),
                }],
                content_top: Pt(100.0),
            },
        )
    }

    #[test]
    fn landing_on_the_bottom_is_not_an_overflow() {
        let mut s = state(300.0, 100.0);
        assert!(s.fits(Pt(200.0)));
        assert!(!s.fits(Pt(200.5)));
        assert!(!s.ensure(Pt(200.0)));
        assert_eq!(s.page_count(), 1);
    }

    #[test]
    fn overflow_opens_a_continuation_page() {
        let mut s = state(300.0, 100.0);
        s.text(Pt(10.0), Pt(290.0), "first page", TextStyle::regular(Pt(10.0), colours::BLACK));
        assert!(s.ensure(Pt(250.0)));
        assert_eq!(s.page_count(), 2);
        assert_eq!(s.cursor(), A4.1 - Pt(100.0));
        assert!(s.page().contains_text("Continued"));
        assert!(!s.page().contains_text("first page"));

        // the header is stamped again on every break
        s.break_page();
        assert!(s.page().contains_text("Continued"));

        let doc = s.finish();
        assert_eq!(doc.page_count(), 3);
        assert!(doc.page(0).is_some_and(|p| p.contains_text("first page")));
    }

    #[test]
    fn right_aligned_text_ends_at_the_edge() {
        let mut s = state(300.0, 100.0);
        let style = TextStyle::regular(Pt(10.0), colours::BLACK);
        let width = s.measure("INR 720.00", style);
        s.text_right(Pt(500.0), Pt(200.0), "INR 720.00", style);
        let span = s.page().spans().next().cloned().unwrap();
        assert!((*span.coords.0 + *width - 500.0).abs() < 1e-3);
    }

    #[test]
    fn empty_text_is_not_drawn() {
        let mut s = state(300.0, 100.0);
        s.text(Pt(0.0), Pt(0.0), "", TextStyle::regular(Pt(10.0), colours::BLACK));
        assert_eq!(s.page().spans().count(), 0);
    }
}
