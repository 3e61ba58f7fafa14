use crate::form_xobject::PdfPage;
use crate::refs::{ObjectReferences, RefType};
use crate::DocError;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Chunk, Filter, Finish, Pdf, Ref};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
enum ImageKind {
    /// Baseline RGB JPEG, embedded as-is with the DCT filter
    Jpeg(Arc<[u8]>),
    Raster(Arc<DynamicImage>),
    /// SVG source, validated on load and converted when the document is written
    Svg(Arc<[u8]>),
    /// First page of a PDF, copied in as a Form XObject
    Page(PdfPage),
}

/// A raster, vector or PDF image, such as a prescription template. Cloning
/// is cheap, the pixel or source data is shared.
#[derive(Clone)]
pub struct Image {
    kind: ImageKind,
    pub width: f32,
    pub height: f32,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            ImageKind::Jpeg(_) => "jpeg",
            ImageKind::Raster(_) => "raster",
            ImageKind::Svg(_) => "svg",
            ImageKind::Page(_) => "pdf",
        };
        f.debug_struct("Image")
            .field("kind", &kind)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

struct EncodeOutput {
    filter: Filter,
    bytes: Vec<u8>,
    mask: Option<Vec<u8>>,
}

fn parse_svg(data: &[u8]) -> Result<usvg::Tree, DocError> {
    Ok(usvg::Tree::from_data(data, &usvg::Options::default())?)
}

fn looks_like_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF-")
}

fn looks_like_svg(data: &[u8]) -> bool {
    let head = &data[..data.len().min(512)];
    String::from_utf8_lossy(head).contains("<svg")
}

impl Image {
    /// Load an image from disk. `.svg` files are treated as vector images and
    /// `.pdf` files as PDF pages, everything else is sniffed.
    pub fn from_disk<P: AsRef<Path>>(path: P) -> Result<Image, DocError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

        match extension.as_deref() {
            Some("svg") => Image::svg(data),
            Some("pdf") => Image::pdf(data),
            _ => Image::from_bytes(data),
        }
    }

    /// Load an image from raw bytes, guessing its format
    pub fn from_bytes(data: Vec<u8>) -> Result<Image, DocError> {
        if looks_like_pdf(&data) {
            return Image::pdf(data);
        }
        if looks_like_svg(&data) {
            return Image::svg(data);
        }

        let format = image::guess_format(&data)?;
        let image = image::load_from_memory_with_format(&data, format)?;

        match (format, image.color()) {
            (ImageFormat::Jpeg, ColorType::Rgb8) => Ok(Image {
                width: image.width() as f32,
                height: image.height() as f32,
                kind: ImageKind::Jpeg(data.into()),
            }),
            _ => Ok(Image::raster(image)),
        }
    }

    pub fn raster(image: DynamicImage) -> Image {
        Image {
            width: image.width() as f32,
            height: image.height() as f32,
            kind: ImageKind::Raster(Arc::new(image)),
        }
    }

    pub fn svg(data: Vec<u8>) -> Result<Image, DocError> {
        let tree = parse_svg(&data)?;
        let size = tree.size();
        Ok(Image {
            width: size.width(),
            height: size.height(),
            kind: ImageKind::Svg(data.into()),
        })
    }

    /// The first page of a PDF document
    pub fn pdf(data: Vec<u8>) -> Result<Image, DocError> {
        let page = PdfPage::from_bytes(data)?;
        Ok(Image {
            width: *page.width(),
            height: *page.height(),
            kind: ImageKind::Page(page),
        })
    }

    pub fn is_vector(&self) -> bool {
        matches!(self.kind, ImageKind::Svg(_) | ImageKind::Page(_))
    }

    fn encode_raster(image: &DynamicImage) -> EncodeOutput {
        let level = CompressionLevel::DefaultLevel as u8;

        let mask = image.color().has_alpha().then(|| {
            let alphas: Vec<u8> = image.pixels().map(|p| (p.2).0[3]).collect();
            compress_to_vec_zlib(&alphas, level)
        });

        let bytes = compress_to_vec_zlib(image.to_rgb8().as_raw(), level);

        EncodeOutput {
            filter: Filter::FlateDecode,
            bytes,
            mask,
        }
    }

    fn write_raster(
        &self,
        refs: &mut ObjectReferences,
        image_index: usize,
        encoded: EncodeOutput,
        writer: &mut Pdf,
    ) {
        let id = refs.gen(RefType::Image(image_index));
        let mask_id = encoded
            .mask
            .as_ref()
            .map(|_| refs.gen(RefType::ImageMask(image_index)));

        let mut image = writer.image_xobject(id, encoded.bytes.as_slice());
        image.filter(encoded.filter);
        image.width(self.width as i32);
        image.height(self.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }
        image.finish();

        // add a transparency mask if we have one
        if let (Some(mask_id), Some(mask)) = (mask_id, encoded.mask.as_ref()) {
            let mut s_mask = writer.image_xobject(mask_id, mask.as_slice());
            s_mask.filter(Filter::FlateDecode);
            s_mask.width(self.width as i32);
            s_mask.height(self.height as i32);
            s_mask.color_space().device_gray();
            s_mask.bits_per_component(8);
        }
    }

    fn write_svg(
        refs: &mut ObjectReferences,
        image_index: usize,
        data: &[u8],
        writer: &mut Pdf,
    ) -> Result<(), DocError> {
        let tree = parse_svg(data)?;
        let (chunk, root) = svg2pdf::to_chunk(&tree, svg2pdf::ConversionOptions::default())
            .map_err(|e| DocError::SvgConversion(e.to_string()))?;

        // move the converted objects into our own id space
        let mut mapping: HashMap<Ref, Ref> = HashMap::new();
        let chunk: Chunk = chunk.renumber(|old| *mapping.entry(old).or_insert_with(|| refs.bump()));
        let root = mapping
            .get(&root)
            .copied()
            .ok_or_else(|| DocError::SvgConversion("converted root object missing".to_string()))?;

        writer.extend(&chunk);
        refs.alias(RefType::Image(image_index), root);
        Ok(())
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        image_index: usize,
        writer: &mut Pdf,
    ) -> Result<(), DocError> {
        match &self.kind {
            ImageKind::Jpeg(bytes) => {
                let encoded = EncodeOutput {
                    filter: Filter::DctDecode,
                    bytes: bytes.to_vec(),
                    mask: None,
                };
                self.write_raster(refs, image_index, encoded, writer);
            }
            ImageKind::Raster(image) => {
                let encoded = Image::encode_raster(image);
                self.write_raster(refs, image_index, encoded, writer);
            }
            ImageKind::Svg(data) => Image::write_svg(refs, image_index, data, writer)?,
            ImageKind::Page(page) => {
                let id = refs.bump();
                page.write(refs, id, writer)?;
                refs.alias(RefType::Image(image_index), id);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20" viewBox="0 0 40 20"><rect width="40" height="20" fill="#1a56db"/></svg>"##;

    #[test]
    fn svg_size_comes_from_the_document() {
        let image = Image::from_bytes(SQUARE.as_bytes().to_vec()).unwrap();
        assert!(image.is_vector());
        assert_eq!(image.width, 40.0);
        assert_eq!(image.height, 20.0);
    }

    #[test]
    fn raster_with_alpha_gets_a_mask() {
        let pixels = RgbaImage::from_pixel(2, 3, Rgba([10, 20, 30, 128]));
        let image = Image::raster(DynamicImage::ImageRgba8(pixels));
        assert_eq!((image.width, image.height), (2.0, 3.0));

        let mut refs = ObjectReferences::new();
        let mut writer = Pdf::new();
        image.write(&mut refs, 0, &mut writer).unwrap();
        assert!(refs.get(RefType::Image(0)).is_some());
        assert!(refs.get(RefType::ImageMask(0)).is_some());
    }

    #[test]
    fn pdf_bytes_become_a_page_template() {
        let image = Image::from_bytes(crate::form_xobject::sample_letterhead()).unwrap();
        assert!(image.is_vector());
        assert!((image.width - 595.28).abs() < 1e-3);

        let mut refs = ObjectReferences::new();
        let mut writer = Pdf::new();
        image.write(&mut refs, 0, &mut writer).unwrap();
        assert!(refs.get(RefType::Image(0)).is_some());
        assert!(refs.get(RefType::ImageMask(0)).is_none());
    }

    #[test]
    fn unknown_bytes_are_rejected() {
        assert!(matches!(
            Image::from_bytes(vec![0, 1, 2, 3, 4, 5, 6, 7]),
            Err(DocError::Image(_))
        ));
    }
}
