use crate::colour::Colour;
use crate::content::render_contents;
use crate::font::Font;
use crate::image::Image;
use crate::layout::Margins;
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::units::Pt;
use crate::DocError;
use id_arena::{Arena, Id};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Filter, Finish, Name, Pdf};

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpanFont {
    pub id: Id<Font>,
    pub size: Pt,
}

/// A single run of text drawn at a baseline position
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub font: SpanFont,
    pub colour: Colour,
    pub coords: (Pt, Pt),
}

#[derive(Clone, PartialEq, Debug)]
pub struct ImageLayout {
    pub image_id: Id<Image>,
    pub position: Rect,
}

/// A rectangle that is filled, stroked, or both
#[derive(Clone, PartialEq, Debug)]
pub struct RectLayout {
    pub rect: Rect,
    pub fill: Option<Colour>,
    pub stroke: Option<(Colour, Pt)>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct LineLayout {
    pub from: (Pt, Pt),
    pub to: (Pt, Pt),
    pub colour: Colour,
    pub width: Pt,
}

/// Everything that can be placed on a page, drawn in insertion order
#[derive(Clone, PartialEq, Debug)]
pub enum PageContents {
    Text(Vec<SpanLayout>),
    Image(ImageLayout),
    Rect(RectLayout),
    Line(LineLayout),
}

/// A single A4 canvas. Coordinates are PDF-native: the origin is the
/// bottom-left corner and y grows upwards.
pub struct Page {
    /// The size of the page
    pub media_box: Rect,
    /// Where content can live, i.e. within the margins
    pub content_box: Rect,
    /// The laid out content
    pub contents: Vec<PageContents>,
}

impl Page {
    pub fn new(size: PageSize, margins: Option<Margins>) -> Page {
        let margins = margins.unwrap_or_default();
        let (width, height) = size;
        Page {
            media_box: Rect {
                x1: Pt(0.0),
                y1: Pt(0.0),
                x2: width,
                y2: height,
            },
            content_box: Rect {
                x1: margins.left,
                y1: margins.bottom,
                x2: width - margins.right,
                y2: height - margins.top,
            },
            contents: Vec::default(),
        }
    }

    pub fn width(&self) -> Pt {
        self.media_box.width()
    }

    pub fn height(&self) -> Pt {
        self.media_box.height()
    }

    /// Add a span of text. Consecutive spans are grouped into one text block
    /// so the font and colour state is shared between them.
    pub fn add_span(&mut self, span: SpanLayout) {
        if let Some(PageContents::Text(spans)) = self.contents.last_mut() {
            spans.push(span);
        } else {
            self.contents.push(PageContents::Text(vec![span]));
        }
    }

    pub fn add_image(&mut self, image: ImageLayout) {
        self.contents.push(PageContents::Image(image));
    }

    pub fn add_rect(&mut self, rect: RectLayout) {
        self.contents.push(PageContents::Rect(rect));
    }

    pub fn add_line(&mut self, line: LineLayout) {
        self.contents.push(PageContents::Line(line));
    }

    /// Every span on the page, in drawing order
    pub fn spans(&self) -> impl Iterator<Item = &SpanLayout> {
        self.contents.iter().flat_map(|c| match c {
            PageContents::Text(spans) => spans.as_slice(),
            _ => &[],
        })
    }

    /// True when any span on the page reads exactly `text`
    pub fn contains_text(&self, text: &str) -> bool {
        self.spans().any(|span| span.text == text)
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        fonts: &Arena<Font>,
        images: &Arena<Image>,
        writer: &mut Pdf,
    ) -> Result<(), DocError> {
        let id = refs.get(RefType::Page(page_index)).ok_or(DocError::PageMissing)?;
        let parent = refs.get(RefType::PageTree).ok_or(DocError::PageMissing)?;
        let content_id = refs.gen(RefType::ContentForPage(page_index));

        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.art_box(self.content_box.into());
        page.parent(parent);

        let mut resources = page.resources();
        let mut resource_fonts = resources.fonts();
        for (font_id, _) in fonts.iter() {
            if let Some(font_ref) = refs.get(RefType::Font(font_id.index())) {
                resource_fonts.pair(Name(format!("F{}", font_id.index()).as_bytes()), font_ref);
            }
        }
        resource_fonts.finish();

        let mut resource_xobjects = resources.x_objects();
        for (image_id, _) in images.iter() {
            if let Some(image_ref) = refs.get(RefType::Image(image_id.index())) {
                resource_xobjects.pair(
                    Name(format!("I{}", image_id.index()).as_bytes()),
                    image_ref,
                );
            }
        }
        resource_xobjects.finish();
        resources.finish();

        page.contents(content_id);
        page.finish();

        let rendered = render_contents(&self.contents, fonts)?;
        let compressed = compress_to_vec_zlib(&rendered, CompressionLevel::DefaultLevel as u8);
        writer
            .stream(content_id, compressed.as_slice())
            .filter(Filter::FlateDecode);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colours;
    use crate::font::StandardFont;
    use crate::pagesize::A4;

    #[test]
    fn content_box_is_inset_by_margins() {
        let page = Page::new(A4, Some(Margins::all(Pt(20.0))));
        assert_eq!(page.content_box.x1, Pt(20.0));
        assert_eq!(page.content_box.y2, A4.1 - Pt(20.0));
        assert_eq!(page.width(), A4.0);
    }

    #[test]
    fn consecutive_spans_share_a_text_block() {
        let mut fonts: Arena<Font> = Arena::new();
        let id = fonts.alloc(Font::standard(StandardFont::Helvetica));
        let font = SpanFont { id, size: Pt(12.0) };
        let span = |text: &str| SpanLayout {
            text: text.to_string(),
            font,
            colour: colours::BLACK,
            coords: (Pt(10.0), Pt(10.0)),
        };

        let mut page = Page::new(A4, None);
        page.add_span(span("one"));
        page.add_span(span("two"));
        page.add_line(LineLayout {
            from: (Pt(0.0), Pt(0.0)),
            to: (Pt(1.0), Pt(0.0)),
            colour: colours::RULE,
            width: Pt(0.5),
        });
        page.add_span(span("three"));

        assert_eq!(page.contents.len(), 3);
        assert_eq!(page.spans().count(), 3);
        assert!(page.contains_text("two"));
        assert!(!page.contains_text("tw"));
    }
}
