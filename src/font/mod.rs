//! Fonts: measuring text and embedding faces in the output.
//!
//! Two kinds of face are supported. The PDF standard Helvetica faces need no
//! resources at all: every viewer ships them, and their advance widths are
//! compiled into the crate. TrueType/OpenType faces are loaded from bytes and
//! embedded in full as CID fonts.
//!
//! All measurement goes through the [`Measure`] trait so that layout code can
//! be exercised with synthetic metrics.

mod standard;
mod truetype;

pub use standard::StandardFont;
use truetype::TrueType;

use crate::refs::ObjectReferences;
use crate::{DocError, Pt};
use id_arena::Id;
use pdf_writer::Pdf;
use std::sync::Arc;

/// Measurement provider: the rendered width of a string at a given size.
/// Implementations must be pure, the same input always measures the same.
pub trait Measure {
    fn width_of(&self, text: &str, size: Pt) -> Pt;
}

#[derive(Clone)]
enum FontKind {
    Standard(StandardFont),
    TrueType(Arc<TrueType>),
}

/// A font that can be measured and drawn with. Cloning is cheap: embedded
/// faces are shared, so fonts loaded once at start-up can be handed to every
/// document.
///
/// Fonts are referred to from page content by their [`Id`] within the
/// [`Document`](crate::Document) they were added to.
#[derive(Clone)]
pub struct Font {
    kind: FontKind,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Font").field(&self.name()).finish()
    }
}

impl Font {
    /// One of the PDF standard faces
    pub fn standard(face: StandardFont) -> Font {
        Font {
            kind: FontKind::Standard(face),
        }
    }

    /// Load a font from raw bytes, parsing the font and returning an error if the font
    /// could not be parsed or has no usable character map
    pub fn load(bytes: Vec<u8>) -> Result<Font, DocError> {
        let face = TrueType::load(bytes)?;
        Ok(Font {
            kind: FontKind::TrueType(Arc::new(face)),
        })
    }

    /// Load a font file from disk
    pub fn load_from_disk<P: AsRef<std::path::Path>>(path: P) -> Result<Font, DocError> {
        Font::load(std::fs::read(path)?)
    }

    /// The font's full name, used for diagnostics
    pub fn name(&self) -> String {
        match &self.kind {
            FontKind::Standard(face) => face.base_name().to_string(),
            FontKind::TrueType(face) => face.name(),
        }
    }

    /// Encode text as the hex body of a `<...> Tj` string operand
    pub(crate) fn encode_hex(&self, text: &str) -> String {
        let mut hex = String::with_capacity(text.len() * 4);
        match &self.kind {
            FontKind::Standard(_) => {
                for ch in text.chars() {
                    hex.push_str(&format!("{:02x}", StandardFont::encode(ch)));
                }
            }
            FontKind::TrueType(face) => {
                for ch in text.chars() {
                    hex.push_str(&format!("{:04x}", face.glyph_for(ch)));
                }
            }
        }
        hex
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        id: Id<Font>,
        writer: &mut Pdf,
    ) -> Result<(), DocError> {
        match &self.kind {
            FontKind::Standard(face) => {
                face.write(refs, id.index(), writer);
                Ok(())
            }
            FontKind::TrueType(face) => face.write(refs, id.index(), writer),
        }
    }
}

impl Measure for Font {
    fn width_of(&self, text: &str, size: Pt) -> Pt {
        match &self.kind {
            FontKind::Standard(face) => {
                let units: u32 = text.chars().map(|ch| face.advance(ch) as u32).sum();
                size * (units as f32 / 1000.0)
            }
            FontKind::TrueType(face) => face.width_of(text, size),
        }
    }
}
