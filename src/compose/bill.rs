use crate::colour::Colour;
use crate::compose::Composer;
use crate::config::Resources;
use crate::document::Document;
use crate::finance::Summary;
use crate::format::{
    document_date, format_currency, format_date_in, format_number, NOT_AVAILABLE,
};
use crate::info::Info;
use crate::layout::{
    wrap, Align, Column, ColumnSpec, Continuation, HeaderLine, LayoutState, Margins, Placement,
    Row, Table, TextStyle,
};
use crate::model::BillRequest;
use crate::pagesize::A4;
use crate::rect::Rect;
use crate::style::Style;
use crate::units::{Mm, Pt};
use crate::DocError;
use log::debug;

fn mm(v: f32) -> Pt {
    Mm(v).into()
}

const MARGIN: f32 = 20.0;
const ROW_HEIGHT: f32 = 8.0;
const TOTALS_WIDTH: f32 = 70.0;
/// Flowing content stays above this line so the terms block has room
const CONTENT_FLOOR: f32 = 40.0;
const TERMS_FROM_BOTTOM: f32 = 35.0;

/// The invoice's item table: serial number, description, quantity, unit
/// price and line total
pub fn bill_columns() -> Result<ColumnSpec, DocError> {
    ColumnSpec::new(vec![
        Column::new(0.08, Align::Center, "S.No"),
        Column::new(0.42, Align::Left, "Description"),
        Column::new(0.10, Align::Center, "Qty"),
        Column::new(0.20, Align::Right, "Unit Price (in INR)"),
        Column::new(0.20, Align::Right, "Total (in INR)"),
    ])
}

/// A flowing, millimetre-based A4 invoice: letterhead, invoice and patient
/// details, optional treatment information, the item table, the payment
/// summary, a thank-you note, and terms pinned near the bottom of the last
/// page.
pub struct BillComposer;

struct Bill<'a> {
    state: LayoutState,
    style: &'a Style,
    left: Pt,
    right: Pt,
}

impl<'a> Bill<'a> {
    fn width(&self) -> Pt {
        self.right - self.left
    }

    fn centre(&self) -> Pt {
        self.state.page_width() / 2.0
    }

    fn centred(&mut self, text: &str, style: TextStyle, advance: f32) {
        let baseline = self.state.cursor();
        let centre = self.centre();
        self.state.text_centered(centre, baseline, text, style);
        self.state.advance(mm(advance));
    }

    fn letterhead(&mut self, clinic: &str) {
        let style: &'a Style = self.style;
        let letterhead = &style.letterhead;
        let muted = self.style.muted;
        self.centred(clinic, TextStyle::regular(Pt(18.0), self.style.primary), 7.0);
        self.centred(&letterhead.tagline, TextStyle::regular(Pt(10.0), muted), 5.0);
        for line in letterhead.address.iter() {
            self.centred(line, TextStyle::regular(Pt(8.0), muted), 4.0);
        }
        self.centred(&letterhead.contact, TextStyle::regular(Pt(8.0), muted), 8.0);

        let y = self.state.cursor();
        self.state.line((self.left, y), (self.right, y), self.style.primary, mm(0.2));
        self.state.advance(mm(8.0));

        self.centred("INVOICE", TextStyle::regular(Pt(14.0), self.style.secondary), 10.0);
    }

    /// Label at `label_x`, value right-aligned against `value_right`, one
    /// row every 7mm
    fn label_block(&mut self, top: Pt, label_x: Pt, value_right: Pt, pairs: &[(&str, String)]) {
        let style = TextStyle::regular(Pt(10.0), self.style.text);
        for (i, (label, value)) in pairs.iter().enumerate() {
            let baseline = top - mm(7.0) * i as f32;
            self.state.text(label_x, baseline, label, style);
            self.state.text_right(value_right, baseline, value, style);
        }
    }

    fn details(&mut self, request: &BillRequest) {
        let column = self.width() / 2.0;
        let top = self.state.cursor();

        let invoice = &request.invoice;
        let number = if invoice.number.trim().is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            invoice.number.clone()
        };
        let method = if invoice.payment_method.trim().is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            invoice.payment_method.clone()
        };
        self.label_block(
            top,
            self.left,
            self.left + column - mm(5.0),
            &[
                ("Invoice No:", number),
                ("Date:", format_date_in(&invoice.date)),
                ("Payment Method:", method),
                ("Payment Status:", invoice.payment_status.to_string()),
            ],
        );

        // the patient block starts one row lower
        let patient = &request.patient;
        let or_na = |s: &str| {
            if s.trim().is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                s.to_string()
            }
        };
        self.label_block(
            top - mm(7.0),
            self.left + column,
            self.right,
            &[
                ("Patient Name:", or_na(&patient.name)),
                ("Age/Sex:", format!("{} / {}", or_na(&patient.age), or_na(&patient.sex))),
                ("Patient ID:", or_na(patient.id.as_deref().unwrap_or_default())),
            ],
        );

        self.state.advance(mm(7.0 + 25.0));
    }

    fn heading(&mut self, text: &str, underline: bool) {
        let baseline = self.state.cursor();
        let style = TextStyle::regular(Pt(12.0), self.style.secondary);
        self.state.text(self.left, baseline, text, style);
        if underline {
            let y = baseline - mm(1.0);
            let end = (self.left + mm(40.0), y);
            self.state.line((self.left, y), end, self.style.secondary, mm(0.1));
        }
        self.state.advance(mm(7.0));
    }

    fn treatment(&mut self, request: &BillRequest) {
        let present = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let diagnosis = present(&request.diagnosis);
        let teeth = present(&request.teeth);
        if diagnosis.is_none() && teeth.is_none() {
            return;
        }

        self.state.ensure(mm(7.0 + 5.0));
        self.heading("Treatment Information", true);

        let style = TextStyle::regular(Pt(9.0), self.style.text);
        let entries = [
            diagnosis.map(|d| format!("Diagnosis: {d}")),
            teeth.map(|t| format!("Teeth Treated: {t}")),
        ];
        for entry in entries.into_iter().flatten() {
            let lines = wrap(&entry, self.state.font(style.weight), style.size, self.width());
            for line in lines {
                self.state.ensure(mm(5.0));
                let baseline = self.state.cursor();
                self.state.text(self.left, baseline, &line, style);
                self.state.advance(mm(5.0));
            }
        }
        self.state.advance(mm(5.0));
    }

    fn items(&mut self, request: &BillRequest) -> Result<(), DocError> {
        // keep the heading with the table header and first row
        self.state.ensure(mm(7.0 + 2.0 * ROW_HEIGHT));
        self.heading("Bill Items", false);

        let rows: Vec<Row> = request
            .items
            .iter()
            .cloned()
            .chain(std::iter::once(request.consultation_item()))
            .enumerate()
            .map(|(i, item)| {
                Row::new(
                    vec![
                        (i + 1).to_string(),
                        item.description.clone(),
                        format_number(item.quantity),
                        format_currency(item.unit_price),
                        format_currency(item.total),
                    ],
                    item.item_type.row_tone(),
                )
            })
            .collect();

        let table = Table::new(bill_columns()?, self.style.table.clone());
        let width = self.width();
        table.render(&mut self.state, &rows, self.left, width, mm(ROW_HEIGHT))?;
        self.state.advance(mm(10.0));
        Ok(())
    }

    fn summary_row(&mut self, label: &str, value: f64, style: TextStyle) {
        let totals_x = self.right - mm(TOTALS_WIDTH);
        let baseline = self.state.cursor();
        self.state.text(totals_x, baseline, label, style);
        self.state.text_right(self.right, baseline, &format_currency(value), style);
    }

    fn boxed_row(&mut self, label: &str, value: f64, fill: Colour, stroke: Colour, text: TextStyle) {
        let totals_x = self.right - mm(TOTALS_WIDTH);
        let baseline = self.state.cursor();
        let rect = Rect::from_top_left(
            totals_x - mm(3.0),
            baseline + mm(5.0),
            self.right - totals_x + mm(5.0),
            mm(10.0),
        );
        self.state.fill_stroke_rect(rect, fill, stroke, mm(0.2));
        self.summary_row(label, value, text);
    }

    fn summary(&mut self, summary: &Summary) {
        let extent = if summary.shows_balance() {
            7.0 + 10.0 + 6.0 + 10.0 + 9.0 + 5.0
        } else {
            7.0 + 10.0 + 5.0
        };
        self.state.ensure(mm(extent));

        let body = TextStyle::regular(Pt(10.0), self.style.text);
        self.summary_row("Subtotal:", summary.subtotal, body);
        self.state.advance(mm(7.0));
        let discount_label = format!("Discount ({}%):", format_number(summary.discount_percent));
        self.summary_row(&discount_label, summary.discount, body);
        self.state.advance(mm(10.0));

        self.boxed_row(
            "Total Amount:",
            summary.total,
            self.style.total_fill,
            self.style.total_stroke,
            TextStyle::bold(Pt(11.0), self.style.text),
        );
        self.state.advance(mm(6.0));

        if summary.shows_balance() {
            self.state.advance(mm(10.0));
            self.summary_row("Amount Paid:", summary.amount_paid, body);
            self.state.advance(mm(9.0));
            self.boxed_row(
                "Balance Due:",
                summary.balance_due,
                self.style.balance_fill,
                self.style.balance_stroke,
                TextStyle::bold(Pt(10.0), self.style.balance_text),
            );
        }
        self.state.advance(mm(15.0));
    }

    fn footer(&mut self) {
        let style: &'a Style = self.style;
        let lines = &style.letterhead.thank_you;
        self.state.ensure(mm(5.0) * lines.len() as f32);
        let text = TextStyle::regular(Pt(9.0), style.muted);
        for line in lines.iter() {
            self.centred(line, text, 5.0);
        }
    }

    /// Pinned to the bottom of whichever page is current
    fn terms(&mut self) {
        let palette: &'a Style = self.style;
        let letterhead = &palette.letterhead;
        let style = TextStyle::regular(Pt(8.0), palette.faint);
        let top = mm(TERMS_FROM_BOTTOM);
        self.state.text(self.left, top, &letterhead.terms_title, style);
        for (i, line) in letterhead.terms.iter().enumerate() {
            let baseline = top - mm(5.0) * (i + 1) as f32;
            self.state.text(self.left, baseline, line, style);
        }
    }
}

impl BillComposer {
    fn continuation(style: &Style, clinic: &str) -> Continuation {
        Continuation {
            lines: vec![
                HeaderLine {
                    text: clinic.to_string(),
                    style: TextStyle::bold(Pt(14.0), style.primary),
                    x: Placement::Centered,
                    from_top: mm(MARGIN),
                },
                HeaderLine {
                    text: "Invoice Continued".to_string(),
                    style: TextStyle::regular(Pt(10.0), style.muted),
                    x: Placement::Centered,
                    from_top: mm(MARGIN + 8.0),
                },
            ],
            content_top: mm(MARGIN + 18.0),
        }
    }
}

impl Composer for BillComposer {
    type Request = BillRequest;

    fn compose(&self, request: &BillRequest, resources: &Resources) -> Result<Document, DocError> {
        let style = &resources.style;
        let clinic = if request.clinic.name.trim().is_empty() {
            style.letterhead.clinic_name.clone()
        } else {
            request.clinic.name.clone()
        };

        let margins = Margins::trbl(mm(MARGIN), mm(MARGIN), mm(CONTENT_FLOOR), mm(MARGIN));
        let state = LayoutState::new(
            A4,
            resources.regular.clone(),
            resources.bold.clone(),
            A4.1 - margins.top,
            margins.bottom,
            BillComposer::continuation(style, &clinic),
        )
        .with_margins(margins);
        let mut bill = Bill {
            state,
            style,
            left: margins.left,
            right: A4.0 - margins.right,
        };

        let mut info = Info::new();
        info.title(format!("Dental Bill - {}", request.patient.name))
            .author(&clinic)
            .subject("Dental Bill")
            .keywords("dental, invoice, bill");
        if let Some(date) = document_date(&request.invoice.date) {
            info.created_at(date);
        }
        bill.state.document_mut().set_info(info);

        let summary = Summary::compute(
            &request.items,
            request.financials.consultation_fee,
            request.financials.discount_percent,
            request.invoice.payment_status,
            request.financials.amount_paid,
        );

        bill.letterhead(&clinic);
        bill.details(request);
        bill.treatment(request);
        bill.items(request)?;
        bill.summary(&summary);
        bill.footer();
        bill.terms();

        debug!(
            "invoice {:?} laid out on {} page(s), total {}",
            request.invoice.number,
            bill.state.page_count(),
            format_currency(summary.total)
        );
        Ok(bill.state.finish())
    }
}
