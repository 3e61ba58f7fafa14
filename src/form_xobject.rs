//! Pages of an existing PDF, reused as Form XObjects.
//!
//! A clinic's letterhead pad usually exists as a PDF. Its first page is
//! imported whole: the page's content stream becomes the body of a Form
//! XObject, and every object its resources reach (fonts, images, nested
//! forms) is copied into the output under fresh ids.
//!
//! # Coordinate system
//!
//! The form's matrix maps the page's media box onto the unit square, the same
//! space an image XObject occupies, so a template page is placed exactly like
//! an image: scaled by the rectangle it is drawn into.

use crate::rect::Rect;
use crate::refs::ObjectReferences;
use crate::units::Pt;
use crate::DocError;
use log::warn;
use lopdf::{Document as Source, Object, ObjectId};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Filter, Finish, Name, Null, Obj, Pdf, Ref, Str};
use std::collections::HashMap;
use std::sync::Arc;

/// Attribute lookups stop climbing the page tree after this many parents
const MAX_TREE_DEPTH: usize = 32;

/// The first page of a PDF document, validated on load and copied into each
/// output document that draws it
#[derive(Clone)]
pub struct PdfPage {
    data: Arc<[u8]>,
    media_box: Rect,
}

impl PdfPage {
    pub fn from_bytes(data: Vec<u8>) -> Result<PdfPage, DocError> {
        let source = Source::load_mem(&data)?;
        let page = first_page(&source)?;
        let media_box = media_box(&source, page)?;
        // fail on unreadable content now rather than at render time
        page_content(&source, page)?;
        Ok(PdfPage {
            data: data.into(),
            media_box,
        })
    }

    pub fn width(&self) -> Pt {
        self.media_box.width()
    }

    pub fn height(&self) -> Pt {
        self.media_box.height()
    }

    /// Write the page as a Form XObject with the given id
    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        id: Ref,
        writer: &mut Pdf,
    ) -> Result<(), DocError> {
        let source = Source::load_mem(&self.data)?;
        let page = first_page(&source)?;
        let content = page_content(&source, page)?;
        let compressed = compress_to_vec_zlib(&content, CompressionLevel::DefaultLevel as u8);

        let bbox = self.media_box;
        let (width, height) = (*bbox.width(), *bbox.height());
        let mut copier = Copier {
            source: &source,
            refs,
            ids: HashMap::new(),
            pending: Vec::new(),
        };

        let mut xobj = writer.form_xobject(id, &compressed);
        xobj.filter(Filter::FlateDecode);
        xobj.bbox(bbox.into());
        xobj.matrix([
            1.0 / width,
            0.0,
            0.0,
            1.0 / height,
            -*bbox.x1 / width,
            -*bbox.y1 / height,
        ]);
        if let Some(resources) = inherited(&source, page, b"Resources")? {
            copier.copy(xobj.insert(Name(b"Resources")), resources);
        }
        xobj.finish();

        copier.flush(writer);
        Ok(())
    }
}

/// Copies objects out of the source document, handing every indirect object
/// it meets a fresh id in the output
struct Copier<'a> {
    source: &'a Source,
    refs: &'a mut ObjectReferences,
    ids: HashMap<ObjectId, Ref>,
    pending: Vec<(ObjectId, Ref)>,
}

impl Copier<'_> {
    fn id_for(&mut self, original: ObjectId) -> Ref {
        if let Some(&id) = self.ids.get(&original) {
            return id;
        }
        let id = self.refs.bump();
        self.ids.insert(original, id);
        self.pending.push((original, id));
        id
    }

    fn copy(&mut self, obj: Obj<'_>, value: &Object) {
        match value {
            Object::Null => obj.primitive(Null),
            Object::Boolean(b) => obj.primitive(*b),
            Object::Integer(i) => obj.primitive(*i as i32),
            Object::Real(r) => obj.primitive(*r as f32),
            Object::Name(name) => obj.primitive(Name(name)),
            Object::String(bytes, _) => obj.primitive(Str(bytes)),
            Object::Array(items) => {
                let mut array = obj.array();
                for item in items.iter() {
                    self.copy(array.push(), item);
                }
            }
            Object::Dictionary(dict) => {
                let mut out = obj.dict();
                for (key, item) in dict.iter() {
                    self.copy(out.insert(Name(key)), item);
                }
            }
            Object::Reference(original) => {
                let id = self.id_for(*original);
                obj.primitive(id);
            }
            Object::Stream(_) => {
                warn!("direct stream in template resources, writing null");
                obj.primitive(Null);
            }
        }
    }

    /// Write every object referenced so far, and everything those reference
    fn flush(mut self, writer: &mut Pdf) {
        let source = self.source;
        while let Some((original, id)) = self.pending.pop() {
            match source.get_object(original) {
                Ok(Object::Stream(stream)) => {
                    // the raw bytes are copied as-is, so the filters still apply
                    let mut out = writer.stream(id, &stream.content);
                    for (key, item) in stream.dict.iter() {
                        if key.as_slice() != b"Length" {
                            self.copy(out.insert(Name(key)), item);
                        }
                    }
                }
                Ok(object) => self.copy(writer.indirect(id), object),
                Err(err) => {
                    warn!("template object {original:?} is unreadable ({err}), writing null");
                    writer.indirect(id).primitive(Null);
                }
            }
        }
    }
}

fn first_page(source: &Source) -> Result<ObjectId, DocError> {
    source
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| DocError::PdfTemplate("the document has no pages".to_string()))
}

fn resolve<'a>(source: &'a Source, value: &'a Object) -> Result<&'a Object, DocError> {
    match value {
        Object::Reference(id) => Ok(source.get_object(*id)?),
        other => Ok(other),
    }
}

/// A page attribute, looked up through the page tree for inherited ones
fn inherited<'a>(
    source: &'a Source,
    page: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, DocError> {
    let mut node = source.get_dictionary(page)?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(value));
        }
        match node.get(b"Parent") {
            Ok(Object::Reference(parent)) => node = source.get_dictionary(*parent)?,
            _ => return Ok(None),
        }
    }
    Ok(None)
}

fn media_box(source: &Source, page: ObjectId) -> Result<Rect, DocError> {
    let value = inherited(source, page, b"MediaBox")?
        .ok_or_else(|| DocError::PdfTemplate("the page has no media box".to_string()))?;
    let corners = resolve(source, value)?.as_array()?;
    let numbers = corners
        .iter()
        .map(|corner| Ok(resolve(source, corner)?.as_float()?))
        .collect::<Result<Vec<f32>, DocError>>()?;
    let [a, b, c, d] = numbers[..] else {
        return Err(DocError::PdfTemplate(format!(
            "media box has {} numbers, expected 4",
            numbers.len()
        )));
    };

    let rect = Rect {
        x1: Pt(a.min(c)),
        y1: Pt(b.min(d)),
        x2: Pt(a.max(c)),
        y2: Pt(b.max(d)),
    };
    if *rect.width() <= 0.0 || *rect.height() <= 0.0 {
        return Err(DocError::PdfTemplate("the page is empty".to_string()));
    }
    Ok(rect)
}

/// The page's content streams, decoded and joined
fn page_content(source: &Source, page: ObjectId) -> Result<Vec<u8>, DocError> {
    let Ok(contents) = source.get_dictionary(page)?.get(b"Contents") else {
        return Ok(Vec::new());
    };
    let parts: Vec<&Object> = match resolve(source, contents)? {
        Object::Array(items) => items.iter().collect(),
        single => vec![single],
    };

    let mut content = Vec::new();
    for part in parts {
        match resolve(source, part)? {
            Object::Stream(stream) => {
                if stream.dict.get(b"Filter").is_ok() {
                    content.extend_from_slice(&stream.decompressed_content()?);
                } else {
                    content.extend_from_slice(&stream.content);
                }
                content.push(b'\n');
            }
            _ => {
                return Err(DocError::PdfTemplate(
                    "page content is not a stream".to_string(),
                ))
            }
        }
    }
    Ok(content)
}

/// A one-page A4 letterhead with a single line of Helvetica
#[cfg(test)]
pub(crate) fn sample_letterhead() -> Vec<u8> {
    let catalog = Ref::new(1);
    let tree = Ref::new(2);
    let page = Ref::new(3);
    let font = Ref::new(4);
    let content = Ref::new(5);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog).pages(tree);
    pdf.pages(tree).kids([page]).count(1);

    let mut leaf = pdf.page(page);
    leaf.parent(tree);
    leaf.media_box(pdf_writer::Rect::new(0.0, 0.0, 595.28, 841.89));
    leaf.contents(content);
    leaf.resources().fonts().pair(Name(b"F1"), font);
    leaf.finish();

    pdf.type1_font(font).base_font(Name(b"Helvetica"));

    let mut text = pdf_writer::Content::new();
    text.begin_text();
    text.set_font(Name(b"F1"), 18.0);
    text.next_line(180.0, 790.0);
    text.show(Str(b"DANTSRI DENTAL HOSPITAL"));
    text.end_text();
    pdf.stream(content, &text.finish());

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_comes_from_the_media_box() {
        let page = PdfPage::from_bytes(sample_letterhead()).unwrap();
        assert!((*page.width() - 595.28).abs() < 1e-3);
        assert!((*page.height() - 841.89).abs() < 1e-3);
    }

    #[test]
    fn resources_are_copied_under_fresh_ids() {
        let page = PdfPage::from_bytes(sample_letterhead()).unwrap();
        let mut refs = ObjectReferences::new();
        let mut writer = Pdf::new();
        let form = refs.bump();
        page.write(&mut refs, form, &mut writer).unwrap();

        // the font object followed the form
        assert_eq!(refs.bump().get(), form.get() + 2);
        let bytes = writer.finish();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Form"));
        assert!(text.contains("/Helvetica"));
        assert!(text.contains("/F1"));
    }

    #[test]
    fn broken_documents_are_rejected() {
        assert!(PdfPage::from_bytes(b"%PDF-1.7\nnot really".to_vec()).is_err());
    }
}
