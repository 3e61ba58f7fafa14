//! Tabular content: fractional column widths, a filled header row and
//! striped body rows.
//!
//! Tables are drawn straight onto a [`LayoutState`], walking the cursor down
//! one row at a time. When a row would cross the bottom limit the current
//! segment is closed off (column separators and border), a new page is
//! opened and the header is repeated before drawing continues.

use crate::colour::{colours, Colour};
use crate::layout::cursor::{LayoutState, TextStyle};
use crate::layout::text::truncate_chars;
use crate::rect::Rect;
use crate::units::{Mm, Pt};
use crate::DocError;
use serde::{Deserialize, Serialize};

const FRACTION_TOLERANCE: f32 = 1e-3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Share of the table width, in (0, 1]
    pub fraction: f32,
    pub align: Align,
    pub header: String,
}

impl Column {
    pub fn new<S: ToString>(fraction: f32, align: Align, header: S) -> Column {
        Column {
            fraction,
            align,
            header: header.to_string(),
        }
    }
}

/// A validated set of columns whose fractions cover the whole table width
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSpec {
    columns: Vec<Column>,
}

impl ColumnSpec {
    pub fn new(columns: Vec<Column>) -> Result<ColumnSpec, DocError> {
        let sum: f32 = columns.iter().map(|c| c.fraction).sum();
        let valid = !columns.is_empty()
            && columns
                .iter()
                .all(|c| c.fraction.is_finite() && c.fraction > 0.0)
            && (sum - 1.0).abs() <= FRACTION_TOLERANCE;
        if !valid {
            return Err(DocError::ColumnSpec { sum });
        }
        Ok(ColumnSpec { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Left edge of every column followed by the right edge of the last one,
    /// so there is always one more offset than there are columns
    pub fn offsets(&self, x: Pt, width: Pt) -> Vec<Pt> {
        let mut offsets = Vec::with_capacity(self.columns.len() + 1);
        let mut edge = x;
        offsets.push(edge);
        for column in self.columns.iter() {
            edge += width * column.fraction;
            offsets.push(edge);
        }
        offsets
    }
}

/// How a body row is shaded
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RowTone {
    /// Follows the alternating stripes
    Plain,
    /// Uses the highlight fill regardless of parity
    Highlight,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub cells: Vec<String>,
    pub tone: RowTone,
}

impl Row {
    pub fn new(cells: Vec<String>, tone: RowTone) -> Row {
        Row { cells, tone }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableStyle {
    pub header_fill: Colour,
    pub header_text: TextStyle,
    pub body_text: TextStyle,
    /// Fills for even and odd rows; `None` leaves the row unshaded
    pub stripes: [Option<Colour>; 2],
    pub highlight: Colour,
    pub rule: Colour,
    pub rule_width: Pt,
    pub border: Colour,
    pub border_width: Pt,
    /// Gap between cell text and the column edge for left and right aligned cells
    pub padding: Pt,
    /// Distance from the top of a row down to its text baseline
    pub baseline: Pt,
    /// Left aligned cells longer than this many characters are cut with "..."
    pub truncate_at: usize,
}

impl Default for TableStyle {
    fn default() -> Self {
        TableStyle {
            header_fill: colours::PRIMARY,
            header_text: TextStyle::bold(Pt(9.0), colours::WHITE),
            body_text: TextStyle::regular(Pt(9.0), colours::BLACK),
            stripes: [Some(colours::STRIPE), None],
            highlight: colours::HIGHLIGHT,
            rule: colours::RULE,
            rule_width: Mm(0.2).into(),
            border: colours::PRIMARY,
            border_width: Mm(0.5).into(),
            padding: Mm(3.0).into(),
            baseline: Mm(5.5).into(),
            truncate_at: 40,
        }
    }
}

pub struct Table {
    spec: ColumnSpec,
    style: TableStyle,
}

impl Table {
    pub fn new(spec: ColumnSpec, style: TableStyle) -> Table {
        Table { spec, style }
    }

    pub fn spec(&self) -> &ColumnSpec {
        &self.spec
    }

    /// Draw the header and every row with the table's top-left corner at
    /// (`x`, cursor). When everything fits on the current page the cursor
    /// ends `(rows.len() + 1) * row_height` lower.
    pub fn render(
        &self,
        state: &mut LayoutState,
        rows: &[Row],
        x: Pt,
        width: Pt,
        row_height: Pt,
    ) -> Result<(), DocError> {
        let columns = self.spec.len();
        if let Some(row) = rows.iter().find(|row| row.cells.len() > columns) {
            return Err(DocError::RowWidth {
                cells: row.cells.len(),
                columns,
            });
        }

        let offsets = self.spec.offsets(x, width);

        // never strand a header at the bottom of a page
        let lead = if rows.is_empty() { 1.0 } else { 2.0 };
        state.ensure(row_height * lead);

        let mut segment_top = state.cursor();
        self.draw_header(state, &offsets, row_height);

        for (index, row) in rows.iter().enumerate() {
            if !state.fits(row_height) {
                self.close_segment(state, &offsets, segment_top);
                state.break_page();
                segment_top = state.cursor();
                self.draw_header(state, &offsets, row_height);
            }
            self.draw_row(state, &offsets, index, row, row_height);
        }

        self.close_segment(state, &offsets, segment_top);
        Ok(())
    }

    fn draw_header(&self, state: &mut LayoutState, offsets: &[Pt], row_height: Pt) {
        let top = state.cursor();
        let width = offsets[offsets.len() - 1] - offsets[0];
        state.fill_rect(
            Rect::from_top_left(offsets[0], top, width, row_height),
            self.style.header_fill,
        );

        let baseline = top - self.style.baseline;
        for (i, column) in self.spec.columns().iter().enumerate() {
            let centre = (offsets[i] + offsets[i + 1]) / 2.0;
            state.text_centered(centre, baseline, &column.header, self.style.header_text);
        }
        state.advance(row_height);
    }

    fn draw_row(
        &self,
        state: &mut LayoutState,
        offsets: &[Pt],
        index: usize,
        row: &Row,
        row_height: Pt,
    ) {
        let top = state.cursor();
        let left = offsets[0];
        let right = offsets[offsets.len() - 1];

        let fill = match row.tone {
            RowTone::Highlight => Some(self.style.highlight),
            RowTone::Plain => self.style.stripes[index % 2],
        };
        if let Some(fill) = fill {
            state.fill_rect(Rect::from_top_left(left, top, right - left, row_height), fill);
        }

        let baseline = top - self.style.baseline;
        let text = self.style.body_text;
        for (i, (cell, column)) in row.cells.iter().zip(self.spec.columns()).enumerate() {
            match column.align {
                Align::Left => {
                    let cell = truncate_chars(cell, self.style.truncate_at);
                    state.text(offsets[i] + self.style.padding, baseline, &cell, text);
                }
                Align::Center => {
                    let centre = (offsets[i] + offsets[i + 1]) / 2.0;
                    state.text_centered(centre, baseline, cell, text);
                }
                Align::Right => {
                    state.text_right(offsets[i + 1] - self.style.padding, baseline, cell, text);
                }
            }
        }

        let bottom = top - row_height;
        state.line(
            (left, bottom),
            (right, bottom),
            self.style.rule,
            self.style.rule_width,
        );
        state.advance(row_height);
    }

    /// Column separators and the outer border from `top` down to the cursor
    fn close_segment(&self, state: &mut LayoutState, offsets: &[Pt], top: Pt) {
        let bottom = state.cursor();
        for &edge in offsets.iter().skip(1).take(offsets.len().saturating_sub(2)) {
            state.line(
                (edge, top),
                (edge, bottom),
                self.style.rule,
                self.style.rule_width,
            );
        }

        let left = offsets[0];
        let right = offsets[offsets.len() - 1];
        state.stroke_rect(
            Rect {
                x1: left,
                y1: bottom,
                x2: right,
                y2: top,
            },
            self.style.border,
            self.style.border_width,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{Font, StandardFont};
    use crate::layout::cursor::Continuation;
    use crate::page::PageContents;
    use crate::pagesize::A4;

    fn spec() -> ColumnSpec {
        ColumnSpec::new(vec![
            Column::new(0.08, Align::Center, "S.No"),
            Column::new(0.42, Align::Left, "Description"),
            Column::new(0.10, Align::Center, "Qty"),
            Column::new(0.20, Align::Right, "Unit Price"),
            Column::new(0.20, Align::Right, "Total"),
        ])
        .unwrap()
    }

    fn state(start: f32, bottom: f32) -> LayoutState {
        LayoutState::new(
            A4,
            Font::standard(StandardFont::Helvetica),
            Font::standard(StandardFont::HelveticaBold),
            Pt(start),
            Pt(bottom),
            Continuation {
                lines: vec![],
                content_top: Pt(100.0),
            },
        )
    }

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                Row::new(
                    vec![(i + 1).to_string(), format!("Item {i}")],
                    RowTone::Plain,
                )
            })
            .collect()
    }

    #[test]
    fn fractions_must_cover_the_width() {
        assert!(matches!(
            ColumnSpec::new(vec![
                Column::new(0.5, Align::Left, "a"),
                Column::new(0.4, Align::Left, "b"),
            ]),
            Err(DocError::ColumnSpec { .. })
        ));
        assert!(ColumnSpec::new(vec![
            Column::new(1.2, Align::Left, "a"),
            Column::new(-0.2, Align::Left, "b"),
        ])
        .is_err());
        assert!(ColumnSpec::new(vec![Column::new(f32::NAN, Align::Left, "a")]).is_err());
        assert!(ColumnSpec::new(vec![]).is_err());
        assert!(ColumnSpec::new(vec![
            Column::new(0.3334, Align::Left, "a"),
            Column::new(0.3333, Align::Left, "b"),
            Column::new(0.3333, Align::Left, "c"),
        ])
        .is_ok());
    }

    #[test]
    fn offsets_are_monotonic_and_span_the_width() {
        let offsets = spec().offsets(Pt(56.0), Pt(483.0));
        assert_eq!(offsets.len(), 6);
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        assert!((*offsets[5] - (56.0 + 483.0)).abs() < 1e-3);
    }

    #[test]
    fn cursor_moves_by_one_row_per_row_plus_header() {
        let mut s = state(700.0, 100.0);
        Table::new(spec(), TableStyle::default())
            .render(&mut s, &rows(3), Pt(50.0), Pt(400.0), Pt(20.0))
            .unwrap();
        assert_eq!(s.cursor(), Pt(620.0));
        assert_eq!(s.page_count(), 1);
    }

    #[test]
    fn highlight_beats_stripes() {
        let mut s = state(700.0, 100.0);
        let style = TableStyle::default();
        let rows = vec![Row::new(vec!["1".into()], RowTone::Highlight)];
        Table::new(spec(), style.clone())
            .render(&mut s, &rows, Pt(50.0), Pt(400.0), Pt(20.0))
            .unwrap();
        assert_eq!(fills(s.page()), vec![style.header_fill, style.highlight]);
    }

    fn fills(page: &crate::page::Page) -> Vec<Colour> {
        page.contents
            .iter()
            .filter_map(|c| match c {
                PageContents::Rect(r) => r.fill,
                _ => None,
            })
            .collect()
    }

    #[test]
    fn stripes_alternate_from_the_first_body_row() {
        let even = Colour::new_rgb_bytes(1, 1, 1);
        let odd = Colour::new_rgb_bytes(2, 2, 2);
        let style = TableStyle {
            stripes: [Some(even), Some(odd)],
            ..TableStyle::default()
        };
        let mut body = rows(4);
        body.push(Row::new(vec!["5".into()], RowTone::Highlight));

        let mut s = state(700.0, 100.0);
        Table::new(spec(), style.clone())
            .render(&mut s, &body, Pt(50.0), Pt(400.0), Pt(20.0))
            .unwrap();
        assert_eq!(
            fills(s.page()),
            vec![style.header_fill, even, odd, even, odd, style.highlight]
        );
    }

    #[test]
    fn unshaded_rows_leave_gaps_at_odd_positions() {
        let style = TableStyle::default();
        let mut s = state(700.0, 100.0);
        Table::new(spec(), style.clone())
            .render(&mut s, &rows(4), Pt(50.0), Pt(400.0), Pt(20.0))
            .unwrap();
        // header from 700 down to 680, then rows 0 and 2 start at 680 and 640
        let tops: Vec<Pt> = s
            .page()
            .contents
            .iter()
            .filter_map(|c| match c {
                PageContents::Rect(r) if r.fill == style.stripes[0] => Some(r.rect.y2),
                _ => None,
            })
            .collect();
        assert_eq!(tops, vec![Pt(680.0), Pt(640.0)]);
    }

    #[test]
    fn parity_carries_across_page_breaks() {
        let even = Colour::new_rgb_bytes(1, 1, 1);
        let odd = Colour::new_rgb_bytes(2, 2, 2);
        let style = TableStyle {
            stripes: [Some(even), Some(odd)],
            ..TableStyle::default()
        };
        // header and three rows on the first page, the rest on the second
        let mut s = state(180.0, 100.0);
        Table::new(spec(), style.clone())
            .render(&mut s, &rows(5), Pt(50.0), Pt(400.0), Pt(20.0))
            .unwrap();
        assert_eq!(s.page_count(), 2);
        assert!(s.page().contains_text("Item 3"));
        assert!(!s.page().contains_text("Item 2"));
        assert_eq!(fills(s.page()), vec![style.header_fill, odd, even]);
    }

    #[test]
    fn overflowing_rows_continue_under_a_repeated_header() {
        // room for the header and four rows on the first page
        let mut s = state(200.0, 100.0);
        Table::new(spec(), TableStyle::default())
            .render(&mut s, &rows(6), Pt(50.0), Pt(400.0), Pt(20.0))
            .unwrap();
        assert_eq!(s.page_count(), 2);
        assert!(s.page().contains_text("Item 4"));
        assert!(s.page().contains_text("Description"));
        // header plus the two remaining rows below the continuation top
        assert!((*s.cursor() - (*A4.1 - 160.0)).abs() < 1e-3);
    }

    #[test]
    fn too_many_cells_is_a_caller_bug() {
        let mut s = state(700.0, 100.0);
        let wide = vec![Row::new(vec![String::new(); 6], RowTone::Plain)];
        let err = Table::new(spec(), TableStyle::default())
            .render(&mut s, &wide, Pt(50.0), Pt(400.0), Pt(20.0))
            .unwrap_err();
        assert!(matches!(err, DocError::RowWidth { cells: 6, columns: 5 }));
    }
}
