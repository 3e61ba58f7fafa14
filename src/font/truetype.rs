use crate::{
    refs::{ObjectReferences, RefType},
    DocError, Pt,
};
use owned_ttf_parser::{AsFaceRef, GlyphId, OwnedFace};
use pdf_writer::{
    types::{CidFontType, FontFlags, SystemInfo},
    Filter, Finish, Name, Pdf, Ref, Str,
};
use std::collections::HashMap;

/// A parsed TrueType/OpenType face. The face is embedded in its entirety in
/// the generated PDF, so large fonts dramatically increase output size.
pub(crate) struct TrueType {
    face: OwnedFace,
}

impl TrueType {
    pub(crate) fn load(bytes: Vec<u8>) -> Result<TrueType, DocError> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        let font = TrueType { face };
        if font.glyph_ids().is_empty() {
            return Err(DocError::FontUnusable(font.name()));
        }
        Ok(font)
    }

    fn scaling(&self, size: Pt) -> f32 {
        *size / self.face.as_face_ref().units_per_em() as f32
    }

    pub(crate) fn name(&self) -> String {
        self.lookup_name(owned_ttf_parser::name_id::FULL_NAME)
            .unwrap_or_else(|| "Embedded".to_string())
    }

    fn family(&self) -> String {
        self.lookup_name(owned_ttf_parser::name_id::FAMILY)
            .unwrap_or_else(|| self.name())
    }

    fn lookup_name(&self, id: u16) -> Option<String> {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == id && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    /// The glyph a character is drawn with, falling back to the replacement
    /// character, then '?', then `.notdef`
    pub(crate) fn glyph_for(&self, ch: char) -> u16 {
        let face = self.face.as_face_ref();
        face.glyph_index(ch)
            .or_else(|| face.glyph_index('\u{FFFD}'))
            .or_else(|| face.glyph_index('?'))
            .map(|g| g.0)
            .unwrap_or(0)
    }

    pub(crate) fn width_of(&self, text: &str, size: Pt) -> Pt {
        let scaling = self.scaling(size);
        let face = self.face.as_face_ref();
        text.chars()
            .map(|ch| {
                let gid = GlyphId(self.glyph_for(ch));
                Pt(scaling * face.glyph_hor_advance(gid).unwrap_or_default() as f32)
            })
            .sum()
    }

    fn write_cid(&self, refs: &mut ObjectReferences, font_index: usize, writer: &mut Pdf) -> Ref {
        let font_descriptor_id = self.write_descriptor(refs, font_index, writer);

        let id = refs.gen(RefType::CidFont(font_index));

        let mut cid_font = writer.cid_font(id);
        cid_font.subtype(CidFontType::Type2);
        cid_font.base_font(Name(format!("F{font_index}").as_bytes()));
        cid_font.system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid_font.font_descriptor(font_descriptor_id);

        let sizing = self.glyphs_sizing(&self.glyph_ids());
        let scaling = 1000.0 / self.face.as_face_ref().units_per_em() as f32;

        // the most popular advance becomes the default width
        let mut widths_counts: HashMap<u16, usize> = HashMap::new();
        for &(width, _) in sizing.values() {
            *widths_counts.entry(width).or_insert(0) += 1;
        }
        let most_common_width = widths_counts
            .iter()
            .max_by_key(|&(&width, &count)| (count, width))
            .map(|(&width, _)| width as f32 * scaling)
            .unwrap_or(1000.0);

        let mut id_widths: Vec<(u16, f32)> = sizing
            .iter()
            .map(|(&cid, &(width, _))| (cid, width as f32 * scaling))
            .collect();
        id_widths.sort_by_key(|(id, _)| *id);

        let mut widths = cid_font.widths();
        let mut runs = id_widths.into_iter();
        if let Some((first_cid, first_width)) = runs.next() {
            let mut start_cid = first_cid;
            let mut current: Vec<f32> = vec![first_width];
            for (cid, width) in runs {
                if (cid - start_cid) as usize != current.len() {
                    widths.consecutive(start_cid, current.drain(..));
                    start_cid = cid;
                }
                current.push(width);
            }
            widths.consecutive(start_cid, current);
        }
        widths.finish();

        cid_font.default_width(most_common_width);
        cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

        id
    }

    fn write_font_data(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::FontData(font_index));

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            self.face.as_slice(),
            miniz_oxide::deflate::CompressionLevel::DefaultLevel as u8,
        );
        writer
            .stream(id, compressed.as_slice())
            .filter(Filter::FlateDecode)
            .pair(Name(b"Length1"), self.face.as_slice().len() as i32);

        id
    }

    fn write_descriptor(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let font_data_stream_id = self.write_font_data(refs, font_index, writer);
        let face = self.face.as_face_ref();

        let sizing = self.glyphs_sizing(&self.glyph_ids());
        let max_width = sizing.values().map(|&(w, _)| w).max().unwrap_or_default();
        let max_height = sizing.values().map(|&(_, h)| h).max().unwrap_or_default();
        let sum_width: usize = sizing.values().map(|&(w, _)| w as usize).sum();
        let avg_width = sum_width as f32 / sizing.len().max(1) as f32;

        let id = refs.gen(RefType::FontDescriptor(font_index));
        let scaling = 1000.0 / face.units_per_em() as f32;

        let mut descriptor = writer.font_descriptor(id);
        descriptor.name(Name(self.name().as_bytes()));
        descriptor.family(Str(self.family().as_bytes()));
        descriptor.weight(face.weight().to_number());

        let mut flags = FontFlags::NON_SYMBOLIC;
        if face.is_monospaced() {
            flags.insert(FontFlags::FIXED_PITCH);
        }
        if face.is_italic() {
            flags.insert(FontFlags::ITALIC);
        }
        descriptor.flags(flags);

        descriptor.bbox(pdf_writer::Rect {
            x1: 0.0,
            y1: face.descender() as f32 * scaling,
            x2: max_width as f32 * scaling,
            y2: max_height as f32 * scaling,
        });
        descriptor.italic_angle(if face.is_italic() { -12.0 } else { 0.0 });
        descriptor.ascent(face.ascender() as f32 * scaling);
        descriptor.descent(face.descender() as f32 * scaling);
        descriptor.leading(face.line_gap() as f32 * scaling);
        descriptor.cap_height(
            face.capital_height()
                .map(|h| h as f32 * scaling)
                .unwrap_or(1000.0),
        );
        descriptor.x_height(
            face.x_height()
                .unwrap_or_else(|| face.capital_height().unwrap_or_default()) as f32
                * scaling,
        );
        // TODO: derive the dominant stem width from the 'l' glyph outline instead of guessing
        descriptor.stem_v(80.0);
        descriptor.avg_width(avg_width * scaling);
        descriptor.max_width(max_width as f32 * scaling);
        descriptor.missing_width(max_width as f32 * scaling);

        descriptor.font_file2(font_data_stream_id);

        id
    }

    /// Every glyph reachable through a unicode cmap subtable, mapped back to
    /// the first character that selects it
    fn glyph_ids(&self) -> HashMap<u16, char> {
        let mut map: HashMap<u16, char> = HashMap::new();

        let Some(cmap) = self.face.as_face_ref().tables().cmap else {
            return map;
        };

        for subtable in cmap.subtables.into_iter().filter(|table| table.is_unicode()) {
            subtable.codepoints(|codepoint: u32| {
                if let Ok(ch) = char::try_from(codepoint) {
                    if let Some(index) = subtable.glyph_index(codepoint).filter(|index| index.0 > 0)
                    {
                        map.entry(index.0).or_insert(ch);
                    }
                }
            });
        }

        map
    }

    /// Advance and height for every glyph in `ids`
    fn glyphs_sizing(&self, ids: &HashMap<u16, char>) -> HashMap<u16, (u16, i16)> {
        let face = self.face.as_face_ref();
        ids.keys()
            .filter_map(|&id| {
                let gid = GlyphId(id);
                let advance = face.glyph_hor_advance(gid)?;
                let height = face
                    .glyph_bounding_box(gid)
                    .map(|bbox| bbox.y_max)
                    .unwrap_or(face.ascender());
                Some((id, (advance, height)))
            })
            .collect()
    }

    fn write_to_unicode(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::ToUnicode(font_index));

        let mut map = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo\n\
             << /Registry (Adobe)\n\
             /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n",
        );

        let mut ids: Vec<(u16, char)> = self.glyph_ids().into_iter().collect();
        ids.sort_by_key(|&(id, _)| id);

        // bfchar blocks hold at most 100 entries sharing a high byte
        let mut blocks: Vec<Vec<(u16, char)>> = Vec::new();
        let mut current: Vec<(u16, char)> = Vec::new();
        let mut high_byte: u8 = 0;
        for (id, ch) in ids {
            if (id >> 8) as u8 != high_byte || current.len() >= 100 {
                if !current.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
                high_byte = (id >> 8) as u8;
            }
            current.push((id, ch));
        }
        if !current.is_empty() {
            blocks.push(current);
        }

        for block in blocks {
            map.push_str(&format!("{} beginbfchar\n", block.len()));
            for (id, ch) in block {
                let mut utf16 = [0u16; 2];
                let units: String = ch
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|unit| format!("{unit:04x}"))
                    .collect();
                map.push_str(&format!("<{id:04x}> <{units}>\n"));
            }
            map.push_str("endbfchar\n");
        }

        map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            map.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultLevel as u8,
        );
        writer
            .stream(id, compressed.as_slice())
            .filter(Filter::FlateDecode);

        id
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Result<(), DocError> {
        if self.glyph_ids().is_empty() {
            return Err(DocError::FontUnusable(self.name()));
        }

        let font_id = refs.gen(RefType::Font(font_index));
        let cid_font_id = self.write_cid(refs, font_index, writer);
        let to_unicode_id = self.write_to_unicode(refs, font_index, writer);

        let mut font = writer.type0_font(font_id);
        font.base_font(Name(format!("F{font_index}").as_bytes()));
        font.encoding_predefined(Name(b"Identity-H"));
        font.descendant_font(cid_font_id);
        font.to_unicode(to_unicode_id);
        Ok(())
    }
}
