use crate::compose::Composer;
use crate::config::Resources;
use crate::dental::oral_exam_text;
use crate::document::Document;
use crate::format::{document_date, format_date_us, NOT_AVAILABLE};
use crate::info::Info;
use crate::layout::{
    truncate_to_width, wrap, Continuation, HeaderLine, LayoutState, Placement, TextStyle,
};
use crate::model::PrescriptionRequest;
use crate::pagesize::A4;
use crate::rect::Rect;
use crate::units::Pt;
use crate::DocError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
}

/// Where a field is printed on the template: a text baseline at `x`, `y`
/// points from the given page edge
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
    pub edge: Edge,
    pub size: f32,
}

impl Anchor {
    pub const fn top(x: f32, y: f32, size: f32) -> Anchor {
        Anchor {
            x,
            y,
            edge: Edge::Top,
            size,
        }
    }

    pub const fn bottom(x: f32, y: f32, size: f32) -> Anchor {
        Anchor {
            x,
            y,
            edge: Edge::Bottom,
            size,
        }
    }

    pub fn baseline(&self, page_height: Pt) -> Pt {
        match self.edge {
            Edge::Top => page_height - Pt(self.y),
            Edge::Bottom => Pt(self.y),
        }
    }

    /// Distance of the baseline below the top of the page
    pub fn from_top(&self, page_height: Pt) -> Pt {
        page_height - self.baseline(page_height)
    }
}

/// How a prescription request maps onto the printed template. The default
/// matches the clinic's A4 prescription pad; a different pad only needs a
/// different binding in the engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Binding {
    pub name: Anchor,
    pub date: Anchor,
    pub age: Anchor,
    pub sex: Anchor,
    pub chief_complaint: Anchor,
    pub history: Anchor,
    pub oral_exam: Anchor,
    pub advice: Anchor,
    pub followup: Anchor,
    /// Width free-text sections are wrapped to
    pub wrap_width: f32,
    /// Distance between wrapped lines
    pub line_spacing: f32,
    /// Minimum gap between the end of one section and the start of the next
    pub section_gap: f32,
    /// Gap between the oral examination and the first medicine row
    pub medicine_gap: f32,
    /// Left edges of the name, dosage and duration columns
    pub medicine_columns: [f32; 3],
    pub medicine_spacing: f32,
    pub medicine_size: f32,
    /// Medicine rows never cross this line, measured from the bottom
    pub medicine_floor: f32,
    pub continuation_title: HeaderAnchor,
    pub continuation_marker: HeaderAnchor,
    /// Where medicine rows resume on a continuation page, from the top
    pub continuation_top: f32,
}

/// A continuation header line, offset from the horizontal centre of the page
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderAnchor {
    pub text: Option<String>,
    pub centre_offset: f32,
    pub from_top: f32,
    pub size: f32,
}

impl Default for Binding {
    fn default() -> Self {
        Binding {
            name: Anchor::top(260.0, 173.0, 12.0),
            date: Anchor::top(507.0, 173.0, 12.0),
            age: Anchor::top(197.0, 208.0, 12.0),
            sex: Anchor::top(335.0, 208.0, 12.0),
            chief_complaint: Anchor::top(197.0, 242.0, 12.0),
            history: Anchor::top(197.0, 281.0, 12.0),
            oral_exam: Anchor::top(197.0, 311.0, 12.0),
            advice: Anchor::bottom(240.0, 180.0, 12.0),
            followup: Anchor::bottom(225.0, 126.0, 12.0),
            wrap_width: 340.0,
            line_spacing: 20.0,
            section_gap: 10.0,
            medicine_gap: 60.0,
            medicine_columns: [160.0, 357.0, 492.0],
            medicine_spacing: 25.0,
            medicine_size: 12.0,
            medicine_floor: 180.0,
            continuation_title: HeaderAnchor {
                text: None,
                centre_offset: -100.0,
                from_top: 50.0,
                size: 14.0,
            },
            continuation_marker: HeaderAnchor {
                text: Some("Prescription Continued".to_string()),
                centre_offset: -80.0,
                from_top: 70.0,
                size: 12.0,
            },
            continuation_top: 100.0,
        }
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        debug!("missing field, printing {placeholder:?}");
        placeholder
    } else {
        value
    }
}

/// Lays a prescription out over the clinic's template.
///
/// Identity fields sit at fixed anchors. The free-text sections flow
/// downwards, each starting at its anchor or just below the previous section,
/// whichever is lower. Medicine rows follow the examination and spill onto
/// continuation pages; advice and follow-up are printed at their anchors on
/// whichever page is current at the end.
pub struct PrescriptionComposer;

impl PrescriptionComposer {
    fn continuation(binding: &Binding, title: &str, style: TextStyle) -> Continuation {
        let centre = A4.0 / 2.0;
        let line = |anchor: &HeaderAnchor, fallback: &str| HeaderLine {
            text: anchor.text.clone().unwrap_or_else(|| fallback.to_string()),
            style: TextStyle {
                size: Pt(anchor.size),
                ..style
            },
            x: Placement::At(centre + Pt(anchor.centre_offset)),
            from_top: Pt(anchor.from_top),
        };
        Continuation {
            lines: vec![
                line(&binding.continuation_title, title),
                line(&binding.continuation_marker, "Prescription Continued"),
            ],
            content_top: Pt(binding.continuation_top),
        }
    }

    /// Draw `text` wrapped from `top` (measured down from the page top) and
    /// return where the section ends on whichever page it finished on. Lines
    /// that would cross the floor continue on a new page.
    fn section(
        state: &mut LayoutState,
        binding: &Binding,
        anchor: &Anchor,
        top: Pt,
        text: &str,
        style: TextStyle,
    ) -> Pt {
        let height = state.page_height();
        let lines = wrap(text, state.font(style.weight), style.size, Pt(binding.wrap_width));
        let spacing = Pt(binding.line_spacing);
        state.set_cursor(height - top);
        for line in lines.iter() {
            state.ensure(spacing);
            let baseline = state.cursor();
            state.text(Pt(anchor.x), baseline, line, style);
            state.advance(spacing);
        }
        height - state.cursor()
    }

    fn field(state: &mut LayoutState, anchor: &Anchor, text: &str, style: TextStyle) {
        let baseline = anchor.baseline(state.page_height());
        state.text(
            Pt(anchor.x),
            baseline,
            text,
            TextStyle {
                size: Pt(anchor.size),
                ..style
            },
        );
    }
}

impl Composer for PrescriptionComposer {
    type Request = PrescriptionRequest;

    fn compose(
        &self,
        request: &PrescriptionRequest,
        resources: &Resources,
    ) -> Result<Document, DocError> {
        let binding = &resources.binding;
        let style = TextStyle::regular(Pt(12.0), resources.style.text);
        let height = A4.1;

        let mut state = LayoutState::new(
            A4,
            resources.regular.clone(),
            resources.bold.clone(),
            height,
            Pt(binding.medicine_floor),
            PrescriptionComposer::continuation(
                binding,
                &resources.style.letterhead.hospital_title,
                style,
            ),
        );

        let mut info = Info::new();
        info.title(format!("Prescription - {}", request.patient_name))
            .author(&resources.style.letterhead.clinic_name)
            .subject("Dental Prescription");
        if let Some(date) = document_date(&request.date) {
            info.created_at(date);
        }
        state.document_mut().set_info(info);

        match &resources.prescription_template {
            Some(template) => {
                let id = state.add_image(template.clone());
                let page = Rect {
                    x1: Pt(0.0),
                    y1: Pt(0.0),
                    x2: A4.0,
                    y2: A4.1,
                };
                state.draw_image(id, page);
            }
            None => warn!("no prescription template configured, printing fields on a blank page"),
        }

        // identity
        let date = format_date_us(&request.date);
        Self::field(&mut state, &binding.name, or_placeholder(&request.patient_name, NOT_AVAILABLE), style);
        Self::field(&mut state, &binding.date, &date, style);
        Self::field(&mut state, &binding.age, or_placeholder(&request.age, NOT_AVAILABLE), style);
        Self::field(&mut state, &binding.sex, or_placeholder(&request.sex, NOT_AVAILABLE), style);

        // free-text sections
        let gap = Pt(binding.section_gap);
        let sections = [
            (&binding.chief_complaint, or_placeholder(&request.chief_complaint, NOT_AVAILABLE).to_string()),
            (&binding.history, or_placeholder(&request.history, NOT_AVAILABLE).to_string()),
            (
                &binding.oral_exam,
                oral_exam_text(
                    &request.selected_teeth,
                    &request.dental_notation,
                    &request.clinical_notes,
                ),
            ),
        ];
        let mut end: Option<Pt> = None;
        for (anchor, text) in sections.iter() {
            let anchored = anchor.from_top(height);
            // anchors belong to the template, which is only on the first page
            let top = match end {
                Some(end) if state.page_count() > 1 => end + gap,
                Some(end) => anchored.max(end + gap),
                None => anchored,
            };
            let section_style = TextStyle {
                size: Pt(anchor.size),
                ..style
            };
            end = Some(Self::section(&mut state, binding, anchor, top, text, section_style));
        }

        // medicines
        let medicines_top = end.unwrap_or(height) + Pt(binding.medicine_gap);
        state.set_cursor(height - medicines_top);
        let medicine_style = TextStyle {
            size: Pt(binding.medicine_size),
            ..style
        };
        let [name_x, dosage_x, duration_x] = binding.medicine_columns.map(Pt);
        let column_gap = Pt(8.0);
        let widths = [
            dosage_x - name_x - column_gap,
            duration_x - dosage_x - column_gap,
            A4.0 - duration_x - Pt(20.0),
        ];
        let spacing = Pt(binding.medicine_spacing);
        for medicine in request.medicines.iter() {
            state.ensure(spacing);
            let baseline = state.cursor();
            let cells = [&medicine.name, &medicine.dosage, &medicine.duration];
            for ((x, width), cell) in [name_x, dosage_x, duration_x]
                .into_iter()
                .zip(widths)
                .zip(cells)
            {
                let font = state.font(medicine_style.weight);
                let text = truncate_to_width(cell, font, medicine_style.size, width);
                state.text(x, baseline, &text, medicine_style);
            }
            state.advance(spacing);
        }

        // pinned to the current page
        let advice = or_placeholder(&request.advice, "No specific advice");
        Self::field(&mut state, &binding.advice, advice, style);
        let followup = if request.followup_date.trim().is_empty() {
            "No follow-up scheduled".to_string()
        } else {
            format_date_us(&request.followup_date)
        };
        Self::field(&mut state, &binding.followup, &followup, style);

        debug!(
            "prescription for {:?} laid out on {} page(s)",
            request.patient_name,
            state.page_count()
        );
        Ok(state.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::Font;
    use crate::model::Medicine;

    fn medicine(i: usize) -> Medicine {
        Medicine {
            name: format!("Medicine {i}"),
            dosage: "1-0-1".to_string(),
            duration: "5 days".to_string(),
        }
    }

    fn compose(request: &PrescriptionRequest) -> Document {
        PrescriptionComposer
            .compose(request, &Resources::builtin())
            .unwrap()
    }

    #[test]
    fn anchors_measure_from_their_edge() {
        let height = Pt(800.0);
        assert_eq!(Anchor::top(0.0, 173.0, 12.0).baseline(height), Pt(627.0));
        assert_eq!(Anchor::bottom(0.0, 180.0, 12.0).baseline(height), Pt(180.0));
        assert_eq!(Anchor::bottom(0.0, 180.0, 12.0).from_top(height), Pt(620.0));
    }

    #[test]
    fn empty_request_prints_placeholders() {
        let doc = compose(&PrescriptionRequest::default());
        assert_eq!(doc.page_count(), 1);
        let page = doc.page(0).unwrap();
        assert!(page.contains_text("N/A"));
        assert!(page.contains_text("None"));
        assert!(page.contains_text("No specific advice"));
        assert!(page.contains_text("No follow-up scheduled"));
    }

    #[test]
    fn identity_fields_sit_on_their_anchors() {
        let request = PrescriptionRequest {
            patient_name: "Asha Rao".to_string(),
            date: "2024-03-07".to_string(),
            ..PrescriptionRequest::default()
        };
        let doc = compose(&request);
        let page = doc.page(0).unwrap();
        let name = page.spans().find(|s| s.text == "Asha Rao").unwrap();
        assert_eq!(name.coords, (Pt(260.0), A4.1 - Pt(173.0)));
        let date = page.spans().find(|s| s.text == "03/07/2024").unwrap();
        assert_eq!(date.coords.0, Pt(507.0));
    }

    #[test]
    fn long_sections_push_the_next_one_down() {
        let request = PrescriptionRequest {
            chief_complaint: "Intermittent throbbing pain in the lower left quadrant for the past \
                              two weeks, worse at night and when chewing on hard food"
                .to_string(),
            history: "Hypertensive".to_string(),
            ..PrescriptionRequest::default()
        };
        let doc = compose(&request);
        let history = doc
            .page(0)
            .unwrap()
            .spans()
            .find(|s| s.text == "Hypertensive")
            .cloned()
            .unwrap();
        // below its own anchor at 281pt from the top
        assert!(history.coords.1 < A4.1 - Pt(281.0));
    }

    #[test]
    fn many_medicines_continue_on_new_pages() {
        let request = PrescriptionRequest {
            medicines: (0..30).map(medicine).collect(),
            advice: "Warm saline rinses".to_string(),
            ..PrescriptionRequest::default()
        };
        let doc = compose(&request);
        assert!(doc.page_count() > 1);

        let last = doc.page(doc.page_count() - 1).unwrap();
        assert!(last.contains_text("Prescription Continued"));
        assert!(last.contains_text("DANTSRI DENTAL HOSPITAL"));
        assert!(last.contains_text("Warm saline rinses"));
        assert!(!doc.page(0).unwrap().contains_text("Warm saline rinses"));

        // every medicine row stays clear of the advice line
        for i in 0..doc.page_count() {
            for span in doc.page(i).unwrap().spans() {
                if span.text.starts_with("Medicine ") {
                    assert!(span.coords.1 >= Pt(180.0 + 25.0));
                }
            }
        }
        let printed = (0..doc.page_count())
            .flat_map(|i| doc.page(i).unwrap().spans().cloned().collect::<Vec<_>>())
            .filter(|s| s.text.starts_with("Medicine "))
            .count();
        assert_eq!(printed, 30);
    }

    #[test]
    fn long_examination_notes_continue_on_new_pages() {
        let request = PrescriptionRequest {
            clinical_notes: "Generalised gingival recession with calculus deposits noted ".repeat(40),
            medicines: (0..3).map(medicine).collect(),
            ..PrescriptionRequest::default()
        };
        let doc = compose(&request);
        assert!(doc.page_count() > 1);

        let text = oral_exam_text(&[], "", &request.clinical_notes);
        let font = Font::standard(crate::StandardFont::Helvetica);
        let expected = wrap(&text, &font, Pt(12.0), Pt(340.0));
        assert!(expected.len() > 30);

        let spans: Vec<_> = (0..doc.page_count())
            .flat_map(|i| doc.page(i).unwrap().spans().cloned().collect::<Vec<_>>())
            .collect();
        let printed: Vec<_> = spans
            .iter()
            .filter(|s| expected.contains(&s.text))
            .collect();
        assert_eq!(printed.len(), expected.len());
        for span in printed {
            assert!(span.coords.1 >= Pt(180.0), "{} at {:?}", span.text, span.coords);
        }

        // medicines follow the notes on the last page, clear of the advice line
        let last = doc.page(doc.page_count() - 1).unwrap();
        assert!(last.contains_text("Medicine 2"));
        for span in spans.iter().filter(|s| s.text.starts_with("Medicine ")) {
            assert!(span.coords.1 >= Pt(180.0 + 25.0));
        }
    }
}
