//! Turns laid-out page contents into a PDF content stream.

use crate::colour::Colour;
use crate::font::Font;
use crate::page::{LineLayout, PageContents, RectLayout, SpanFont, SpanLayout};
use id_arena::Arena;
use std::io::Write;

#[allow(clippy::write_with_newline)]
pub(crate) fn render_contents(
    contents: &[PageContents],
    fonts: &Arena<Font>,
) -> Result<Vec<u8>, std::io::Error> {
    let mut content: Vec<u8> = Vec::default();

    for page_content in contents.iter() {
        match page_content {
            PageContents::Text(spans) => {
                render_text_spans(&mut content, spans, fonts)?;
            }
            PageContents::Image(image) => {
                write!(&mut content, "q\n")?;
                write!(
                    &mut content,
                    "{} 0 0 {} {} {} cm\n",
                    image.position.width(),
                    image.position.height(),
                    image.position.x1,
                    image.position.y1
                )?;
                write!(&mut content, "/I{} Do\n", image.image_id.index())?;
                write!(&mut content, "Q\n")?;
            }
            PageContents::Rect(rect) => render_rect(&mut content, rect)?,
            PageContents::Line(line) => render_line(&mut content, line)?,
        }
    }

    Ok(content)
}

#[allow(clippy::write_with_newline)]
fn render_text_spans(
    content: &mut Vec<u8>,
    spans: &[SpanLayout],
    fonts: &Arena<Font>,
) -> Result<(), std::io::Error> {
    let Some(first) = spans.first() else {
        return Ok(());
    };

    write!(content, "q\n")?;

    let mut current_font: SpanFont = first.font;
    let mut current_colour: Colour = first.colour;

    write!(
        content,
        "/F{} {} Tf\n",
        current_font.id.index(),
        current_font.size
    )?;
    write_fill_colour(content, current_colour)?;

    for span in spans.iter() {
        if span.font != current_font {
            current_font = span.font;
            write!(
                content,
                "/F{} {} Tf\n",
                current_font.id.index(),
                current_font.size
            )?;
        }
        if span.colour != current_colour {
            current_colour = span.colour;
            write_fill_colour(content, current_colour)?;
        }

        let encoded = match fonts.get(current_font.id) {
            Some(font) => font.encode_hex(&span.text),
            None => continue,
        };

        write!(content, "BT\n")?;
        write!(content, "{} {} Td\n", span.coords.0, span.coords.1)?;
        write!(content, "<{encoded}> Tj\n")?;
        write!(content, "ET\n")?;
    }

    write!(content, "Q\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn render_rect(content: &mut Vec<u8>, layout: &RectLayout) -> Result<(), std::io::Error> {
    let paint = match (layout.fill, layout.stroke) {
        (None, None) => return Ok(()),
        (Some(_), None) => "f",
        (None, Some(_)) => "S",
        (Some(_), Some(_)) => "B",
    };

    write!(content, "q\n")?;
    if let Some(fill) = layout.fill {
        write_fill_colour(content, fill)?;
    }
    if let Some((stroke, width)) = layout.stroke {
        write_stroke_colour(content, stroke)?;
        write!(content, "{width} w\n")?;
    }
    let r = &layout.rect;
    write!(
        content,
        "{} {} {} {} re {paint}\n",
        r.x1,
        r.y1,
        r.width(),
        r.height()
    )?;
    write!(content, "Q\n")
}

#[allow(clippy::write_with_newline)]
fn render_line(content: &mut Vec<u8>, line: &LineLayout) -> Result<(), std::io::Error> {
    write!(content, "q\n")?;
    write_stroke_colour(content, line.colour)?;
    write!(content, "{} w\n", line.width)?;
    write!(content, "{} {} m\n", line.from.0, line.from.1)?;
    write!(content, "{} {} l S\n", line.to.0, line.to.1)?;
    write!(content, "Q\n")
}

#[allow(clippy::write_with_newline)]
fn write_fill_colour(content: &mut Vec<u8>, colour: Colour) -> Result<(), std::io::Error> {
    match colour {
        Colour::RGB { r, g, b } => write!(content, "{r} {g} {b} rg\n"),
        Colour::CMYK { c, m, y, k } => write!(content, "{c} {m} {y} {k} k\n"),
        Colour::Grey { g } => write!(content, "{g} g\n"),
    }
}

#[allow(clippy::write_with_newline)]
fn write_stroke_colour(content: &mut Vec<u8>, colour: Colour) -> Result<(), std::io::Error> {
    match colour {
        Colour::RGB { r, g, b } => write!(content, "{r} {g} {b} RG\n"),
        Colour::CMYK { c, m, y, k } => write!(content, "{c} {m} {y} {k} K\n"),
        Colour::Grey { g } => write!(content, "{g} G\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colours;
    use crate::font::StandardFont;
    use crate::rect::Rect;
    use crate::units::Pt;

    fn render(contents: &[PageContents], fonts: &Arena<Font>) -> String {
        String::from_utf8(render_contents(contents, fonts).unwrap()).unwrap()
    }

    #[test]
    fn text_is_drawn_as_hex_strings() {
        let mut fonts: Arena<Font> = Arena::new();
        let id = fonts.alloc(Font::standard(StandardFont::Helvetica));
        let contents = vec![PageContents::Text(vec![SpanLayout {
            text: "Rx".to_string(),
            font: SpanFont { id, size: Pt(12.0) },
            colour: colours::BLACK,
            coords: (Pt(72.0), Pt(700.0)),
        }])];

        let out = render(&contents, &fonts);
        assert!(out.contains("/F0 12 Tf\n"));
        assert!(out.contains("0 g\n"));
        assert!(out.contains("72 700 Td\n<5278> Tj\n"));
    }

    #[test]
    fn rects_pick_the_paint_operator() {
        let fonts: Arena<Font> = Arena::new();
        let rect = Rect::from_top_left(Pt(10.0), Pt(100.0), Pt(50.0), Pt(20.0));
        let contents = vec![
            PageContents::Rect(RectLayout {
                rect,
                fill: Some(colours::STRIPE),
                stroke: None,
            }),
            PageContents::Rect(RectLayout {
                rect,
                fill: Some(colours::TOTAL_FILL),
                stroke: Some((colours::TOTAL_STROKE, Pt(1.0))),
            }),
            PageContents::Rect(RectLayout {
                rect,
                fill: None,
                stroke: None,
            }),
        ];

        let out = render(&contents, &fonts);
        assert!(out.contains("10 80 50 20 re f\n"));
        assert!(out.contains("10 80 50 20 re B\n"));
        assert_eq!(out.matches(" re ").count(), 2);
    }

    #[test]
    fn lines_are_stroked() {
        let fonts: Arena<Font> = Arena::new();
        let contents = vec![PageContents::Line(LineLayout {
            from: (Pt(0.0), Pt(5.0)),
            to: (Pt(100.0), Pt(5.0)),
            colour: colours::BLACK,
            width: Pt(0.5),
        })];
        let out = render(&contents, &fonts);
        assert!(out.contains("0 G\n0.5 w\n0 5 m\n100 5 l S\n"));
    }
}
