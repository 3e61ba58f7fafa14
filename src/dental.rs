//! Tooth identifiers and the notation printed for them.
//!
//! Teeth arrive as two-part numbers: the first digit is the quadrant, the rest
//! the position within it. Deciduous positions 9 to 13 are printed as the
//! letters A to E, so tooth `511` reads `5C`.

use serde::{Deserialize, Serialize};

/// Shown when a selected tooth carries no recorded condition
pub const NOT_RECORDED: &str = "Not recorded";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToothCategory {
    #[default]
    Permanent,
    Deciduous,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tooth {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: ToothCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease: Option<String>,
}

impl Tooth {
    /// The identifier as printed on a prescription
    pub fn display_id(&self) -> String {
        display_id(self.id)
    }

    fn condition(&self) -> &str {
        match self.disease.as_deref().map(str::trim) {
            Some(disease) if !disease.is_empty() => disease,
            _ => NOT_RECORDED,
        }
    }
}

pub fn display_id(id: u32) -> String {
    let digits = id.to_string();
    if digits.len() < 2 {
        return digits;
    }
    let (quadrant, position) = digits.split_at(1);
    match position.parse::<u32>() {
        Ok(n @ 9..=13) => {
            let letter = char::from(b'A' + (n - 9) as u8);
            format!("{quadrant}{letter}")
        }
        _ => digits,
    }
}

/// `#<id> (<condition>)` for every tooth, joined with "; "
pub fn notation(teeth: &[Tooth]) -> String {
    teeth
        .iter()
        .map(|tooth| format!("#{} ({})", tooth.display_id(), tooth.condition()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// The oral examination line of a prescription. Selected teeth take
/// precedence over a pre-formatted notation; the teeth part and the clinical
/// notes are joined with "; ", and "None" stands in when both are empty.
pub fn oral_exam_text(teeth: &[Tooth], dental_notation: &str, clinical_notes: &str) -> String {
    let notation = if teeth.is_empty() {
        dental_notation.trim().to_string()
    } else {
        notation(teeth)
    };
    let notes = clinical_notes.trim();

    let teeth_part = (!notation.is_empty()).then(|| format!("Teeth involved: {notation}"));
    let notes_part = (!notes.is_empty()).then(|| notes.to_string());

    match (teeth_part, notes_part) {
        (Some(t), Some(n)) => format!("{t}; {n}"),
        (Some(t), None) => t,
        (None, Some(n)) => n,
        (None, None) => "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tooth(id: u32, disease: Option<&str>) -> Tooth {
        Tooth {
            id,
            kind: "Molar".to_string(),
            category: ToothCategory::Permanent,
            disease: disease.map(str::to_string),
        }
    }

    #[test]
    fn deciduous_positions_become_letters() {
        assert_eq!(display_id(18), "18");
        assert_eq!(display_id(59), "5A");
        assert_eq!(display_id(511), "5C");
        assert_eq!(display_id(813), "8E");
        assert_eq!(display_id(814), "814");
        assert_eq!(display_id(7), "7");
    }

    #[test]
    fn notation_lists_every_tooth() {
        let teeth = [tooth(36, Some("Caries")), tooth(510, None)];
        assert_eq!(notation(&teeth), "#36 (Caries); #5B (Not recorded)");
    }

    #[test]
    fn oral_exam_combines_teeth_and_notes() {
        let teeth = [tooth(11, Some("Fracture"))];
        assert_eq!(
            oral_exam_text(&teeth, "ignored", "Mobility grade I"),
            "Teeth involved: #11 (Fracture); Mobility grade I"
        );
        assert_eq!(oral_exam_text(&[], "#21 (Caries)", ""), "Teeth involved: #21 (Caries)");
        assert_eq!(oral_exam_text(&[], "", "Plaque"), "Plaque");
        assert_eq!(oral_exam_text(&[], "  ", ""), "None");
    }

    #[test]
    fn teeth_deserialize_from_the_form_shape() {
        let t: Tooth =
            serde_json::from_str(r#"{"id":46,"type":"Molar","category":"Permanent","disease":"RCT"}"#)
                .unwrap();
        assert_eq!(t.kind, "Molar");
        assert_eq!(t.category, ToothCategory::Permanent);
        assert_eq!(notation(&[t]), "#46 (RCT)");
    }
}
