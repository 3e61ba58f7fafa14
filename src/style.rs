//! The clinic's visual identity: palette, letterhead text and the fixed
//! wording printed on every invoice.

use crate::colour::{colours, Colour};
use crate::layout::TableStyle;
use log::warn;
use serde::{Deserialize, Serialize};

/// Clinic details printed at the top and bottom of documents. Loaded from the
/// engine configuration; every field falls back to the clinic's own details.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Letterhead {
    /// Used when a bill request does not name the clinic
    pub clinic_name: String,
    /// Title stamped on prescription continuation pages
    pub hospital_title: String,
    pub tagline: String,
    pub address: Vec<String>,
    pub contact: String,
    pub thank_you: Vec<String>,
    pub terms_title: String,
    pub terms: Vec<String>,
    /// `#rrggbb` overrides for the primary and secondary colours
    pub primary_colour: Option<String>,
    pub secondary_colour: Option<String>,
}

impl Default for Letterhead {
    fn default() -> Self {
        Letterhead {
            clinic_name: "Dantsri Dental Clinic".to_string(),
            hospital_title: "DANTSRI DENTAL HOSPITAL".to_string(),
            tagline: "Professional Dental Care Services".to_string(),
            address: vec![
                "123 Dental Avenue, Medical District".to_string(),
                "Mumbai, Maharashtra - 400001".to_string(),
            ],
            contact: "Phone: +91 98765 43210 | Email: info@dantsridental.com".to_string(),
            thank_you: vec![
                "Thank you for choosing Dantsri Dental Clinic for your dental care needs."
                    .to_string(),
                "We wish you a speedy recovery and the best of health.".to_string(),
            ],
            terms_title: "Terms & Conditions:".to_string(),
            terms: vec![
                "1. This is a computer-generated invoice and does not require a signature."
                    .to_string(),
                "2. Please bring this invoice for any future reference or in case of follow-up visits."
                    .to_string(),
                "3. Payment is due at the time of service.".to_string(),
            ],
            primary_colour: None,
            secondary_colour: None,
        }
    }
}

/// Everything a composer needs to know about how a document looks. Built once
/// with the rest of the [`Resources`](crate::Resources) and never changed.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    pub primary: Colour,
    pub secondary: Colour,
    pub text: Colour,
    pub muted: Colour,
    pub faint: Colour,
    pub total_fill: Colour,
    pub total_stroke: Colour,
    pub balance_fill: Colour,
    pub balance_stroke: Colour,
    pub balance_text: Colour,
    pub table: TableStyle,
    pub letterhead: Letterhead,
}

impl Default for Style {
    fn default() -> Self {
        Style::from_letterhead(Letterhead::default())
    }
}

fn colour_override(name: &str, value: Option<&str>, fallback: Colour) -> Colour {
    match value {
        None => fallback,
        Some(hex) => Colour::from_hex(hex).unwrap_or_else(|| {
            warn!("ignoring {name} colour {hex:?}, expected #rrggbb");
            fallback
        }),
    }
}

impl Style {
    pub fn from_letterhead(letterhead: Letterhead) -> Style {
        let primary = colour_override("primary", letterhead.primary_colour.as_deref(), colours::PRIMARY);
        let secondary = colour_override(
            "secondary",
            letterhead.secondary_colour.as_deref(),
            colours::SECONDARY,
        );
        let table = TableStyle {
            header_fill: primary,
            border: primary,
            ..TableStyle::default()
        };
        Style {
            primary,
            secondary,
            text: colours::BLACK,
            muted: colours::MUTED,
            faint: colours::FAINT,
            total_fill: colours::TOTAL_FILL,
            total_stroke: colours::TOTAL_STROKE,
            balance_fill: colours::BALANCE_FILL,
            balance_stroke: colours::BALANCE_STROKE,
            balance_text: colours::BALANCE_TEXT,
            table,
            letterhead,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterhead_colours_flow_into_the_table() {
        let letterhead = Letterhead {
            primary_colour: Some("#000000".to_string()),
            ..Letterhead::default()
        };
        let style = Style::from_letterhead(letterhead);
        assert_eq!(style.primary, Colour::new_rgb(0.0, 0.0, 0.0));
        assert_eq!(style.table.header_fill, style.primary);
        assert_eq!(style.secondary, colours::SECONDARY);
    }

    #[test]
    fn bad_colours_fall_back() {
        let letterhead = Letterhead {
            secondary_colour: Some("teal".to_string()),
            ..Letterhead::default()
        };
        assert_eq!(Style::from_letterhead(letterhead).secondary, colours::SECONDARY);
    }

    #[test]
    fn partial_letterhead_json_keeps_defaults() {
        let letterhead: Letterhead = serde_json::from_str(r#"{"tagline": "Smiles first"}"#).unwrap();
        assert_eq!(letterhead.tagline, "Smiles first");
        assert_eq!(letterhead.terms.len(), 3);
    }
}
