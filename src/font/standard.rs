use crate::refs::{ObjectReferences, RefType};
use pdf_writer::{Name, Pdf};

/// The PDF standard faces the engine draws with when no font file is configured
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

// advance widths from the Adobe AFM files, in 1/1000 em, for WinAnsi bytes
// 0x20..=0xFF. Codes WinAnsi leaves unassigned carry the width of '?'.
#[rustfmt::skip]
const HELVETICA: [u16; 224] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 556,
    556, 556, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 556, 611, 556,
    556, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 556, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 224] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 611,
    556, 611, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 611, 611, 611,
    611, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 611, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

// characters WinAnsi places in 0x80..=0x9F instead of the C1 controls
#[rustfmt::skip]
const WIN_ANSI_EXTRAS: [(char, u8); 27] = [
    ('\u{20AC}', 0x80), ('\u{201A}', 0x82), ('\u{0192}', 0x83), ('\u{201E}', 0x84),
    ('\u{2026}', 0x85), ('\u{2020}', 0x86), ('\u{2021}', 0x87), ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89), ('\u{0160}', 0x8A), ('\u{2039}', 0x8B), ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E), ('\u{2018}', 0x91), ('\u{2019}', 0x92), ('\u{201C}', 0x93),
    ('\u{201D}', 0x94), ('\u{2022}', 0x95), ('\u{2013}', 0x96), ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98), ('\u{2122}', 0x99), ('\u{0161}', 0x9A), ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C), ('\u{017E}', 0x9E), ('\u{0178}', 0x9F),
];

impl StandardFont {
    pub fn base_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn widths(self) -> &'static [u16; 224] {
        match self {
            StandardFont::Helvetica => &HELVETICA,
            StandardFont::HelveticaBold => &HELVETICA_BOLD,
        }
    }

    /// The WinAnsi byte a character is drawn as: printable ASCII and Latin-1
    /// map to themselves, typographic punctuation and a few letters to the
    /// 0x80..=0x9F block. Anything else is shown as '?'.
    pub(crate) fn encode(ch: char) -> u8 {
        match ch {
            ' '..='~' | '\u{A0}'..='\u{FF}' => ch as u8,
            _ => WIN_ANSI_EXTRAS
                .iter()
                .find(|(extra, _)| *extra == ch)
                .map(|&(_, byte)| byte)
                .unwrap_or(b'?'),
        }
    }

    /// Advance width of a character in 1/1000 em
    pub(crate) fn advance(self, ch: char) -> u16 {
        self.widths()[(Self::encode(ch) - b' ') as usize]
    }

    pub(crate) fn write(self, refs: &mut ObjectReferences, font_index: usize, writer: &mut Pdf) {
        let id = refs.gen(RefType::Font(font_index));
        writer
            .type1_font(id)
            .base_font(Name(self.base_name().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_tabular() {
        for face in [StandardFont::Helvetica, StandardFont::HelveticaBold] {
            for d in '0'..='9' {
                assert_eq!(face.advance(d), 556);
            }
        }
    }

    #[test]
    fn latin1_and_punctuation_have_their_own_widths() {
        assert_eq!(StandardFont::Helvetica.advance('é'), 556);
        assert_eq!(StandardFont::Helvetica.advance('½'), 834);
        assert_eq!(StandardFont::Helvetica.advance('\u{2014}'), 1000);
        assert_eq!(StandardFont::HelveticaBold.advance('ö'), 611);
        assert_eq!(StandardFont::HelveticaBold.advance('µ'), 611);
    }

    #[test]
    fn win_ansi_extras_land_in_the_high_block() {
        assert_eq!(StandardFont::encode('€'), 0x80);
        assert_eq!(StandardFont::encode('\u{2019}'), 0x92);
        assert_eq!(StandardFont::encode('\u{0178}'), 0x9F);
        assert_eq!(StandardFont::encode('°'), 0xB0);
    }

    #[test]
    fn characters_outside_win_ansi_measure_as_question_marks() {
        assert_eq!(StandardFont::encode('₹'), b'?');
        assert_eq!(
            StandardFont::Helvetica.advance('₹'),
            StandardFont::Helvetica.advance('?')
        );
    }
}
