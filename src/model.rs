//! Render requests, as posted by the clinic's forms.
//!
//! Every field is optional on the wire: anything missing or null deserializes
//! to an empty value and is printed as a placeholder rather than failing the
//! render.
//! Derived figures the form may send along (subtotal, discount amount, total,
//! balance) are ignored, the bill composer computes its own.

use crate::dental::Tooth;
use crate::layout::RowTone;
use crate::DocError;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

/// Accept `"34"`, `34` and `null` for free-text fields
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Nothing(()),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
        Raw::Nothing(()) => String::new(),
    })
}

fn dashed(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("-")
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medicine {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub dosage: String,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrescriptionRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub patient_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub age: String,
    #[serde(deserialize_with = "lenient_string")]
    pub sex: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    /// Chief complaint
    #[serde(rename = "cc", deserialize_with = "lenient_string")]
    pub chief_complaint: String,
    /// Medical and dental history
    #[serde(rename = "mh", deserialize_with = "lenient_string")]
    pub history: String,
    /// Recorded with the prescription but not printed; the template's
    /// examination box carries the oral examination instead
    #[serde(rename = "de", deserialize_with = "lenient_string")]
    pub diagnosis: String,
    #[serde(deserialize_with = "lenient_string")]
    pub advice: String,
    #[serde(deserialize_with = "lenient_string")]
    pub followup_date: String,
    pub medicines: Vec<Medicine>,
    #[serde(deserialize_with = "lenient_string")]
    pub dental_notation: String,
    #[serde(deserialize_with = "lenient_string")]
    pub clinical_notes: String,
    pub selected_teeth: Vec<Tooth>,
    /// Only used to file the prescription against a patient record
    #[serde(deserialize_with = "lenient_string")]
    pub phone_number: String,
}

impl PrescriptionRequest {
    pub fn suggested_filename(&self) -> String {
        format!("prescription-{}.pdf", dashed(&self.patient_name))
    }
}

/// What a bill line is for; decides how its table row is shaded
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Medicine,
    Procedure,
    Consultation,
    #[default]
    Other,
}

impl ItemKind {
    pub fn row_tone(self) -> RowTone {
        match self {
            ItemKind::Consultation => RowTone::Highlight,
            ItemKind::Medicine | ItemKind::Procedure | ItemKind::Other => RowTone::Plain,
        }
    }
}

/// How much of a bill has been settled. Missing or blank values read as a
/// full payment, as the billing form defaults to; an unrecognised value reads
/// as pending so that nothing is shown as paid on a guess.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "Full Payment")]
    Full,
    #[serde(rename = "Partial Payment")]
    Partial,
    #[serde(rename = "Payment Pending")]
    Pending,
}

impl PaymentStatus {
    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Full => "Full Payment",
            PaymentStatus::Partial => "Partial Payment",
            PaymentStatus::Pending => "Payment Pending",
        }
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient_string(deserializer)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(PaymentStatus::default());
        }
        let status = [
            PaymentStatus::Full,
            PaymentStatus::Partial,
            PaymentStatus::Pending,
        ]
        .into_iter()
        .find(|status| status.label().eq_ignore_ascii_case(raw));
        Ok(status.unwrap_or_else(|| {
            warn!("unknown payment status {raw:?}, treating the bill as pending");
            PaymentStatus::Pending
        }))
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BillItem {
    pub id: u32,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Displayed as given; keeping it equal to `quantity * unit_price` is up
    /// to the caller
    pub total: f64,
    pub item_type: ItemKind,
}

impl BillItem {
    pub fn with_recomputed_total(mut self) -> BillItem {
        self.total = self.quantity * self.unit_price;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Clinic {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Patient {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub age: String,
    #[serde(deserialize_with = "lenient_string")]
    pub sex: String,
    pub date: Option<String>,
    pub id: Option<String>,
    pub contact_details: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Invoice {
    #[serde(deserialize_with = "lenient_string")]
    pub number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub payment_method: String,
    pub payment_status: PaymentStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Financials {
    pub consultation_fee: f64,
    pub discount_percent: f64,
    pub amount_paid: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillRequest {
    pub clinic: Clinic,
    pub patient: Patient,
    pub invoice: Invoice,
    pub items: Vec<BillItem>,
    pub financials: Financials,
    pub teeth: Option<String>,
    pub diagnosis: Option<String>,
}

impl BillRequest {
    /// The synthetic row appended after the caller's items
    pub fn consultation_item(&self) -> BillItem {
        BillItem {
            id: self.items.len() as u32 + 1,
            description: "Consultation Fee".to_string(),
            quantity: 1.0,
            unit_price: self.financials.consultation_fee,
            total: self.financials.consultation_fee,
            item_type: ItemKind::Consultation,
        }
    }

    pub fn suggested_filename(&self) -> String {
        format!(
            "bill-{}-{}.pdf",
            dashed(&self.patient.name),
            self.invoice.date.trim()
        )
    }
}

pub fn prescription_from_json(json: &str) -> Result<PrescriptionRequest, DocError> {
    Ok(serde_json::from_str(json)?)
}

pub fn bill_from_json(json: &str) -> Result<BillRequest, DocError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prescription_fields_use_form_names() {
        let req = prescription_from_json(
            r#"{
                "patientName": "Asha  Rao",
                "age": 34,
                "cc": "Pain in lower left tooth",
                "mh": "Diabetic",
                "medicines": [{"name": "Amoxicillin 500mg", "dosage": "1-0-1", "duration": "5 days"}],
                "selectedTeeth": [{"id": 36, "type": "Molar", "category": "Permanent"}]
            }"#,
        )
        .unwrap();
        assert_eq!(req.age, "34");
        assert_eq!(req.chief_complaint, "Pain in lower left tooth");
        assert_eq!(req.history, "Diabetic");
        assert_eq!(req.medicines.len(), 1);
        assert_eq!(req.selected_teeth[0].id, 36);
        assert!(req.advice.is_empty());
        assert_eq!(req.suggested_filename(), "prescription-Asha-Rao.pdf");
    }

    #[test]
    fn bill_ignores_derived_financials() {
        let req = bill_from_json(
            r#"{
                "clinic": {"name": "Dantsri Dental Clinic"},
                "patient": {"name": "Ravi Kumar", "age": "41", "sex": "M"},
                "invoice": {"number": "INV-7", "date": "2024-03-07", "paymentMethod": "UPI", "paymentStatus": "Payment Pending"},
                "items": [{"id": 1, "description": "Ibuprofen", "quantity": 2, "unitPrice": 15, "total": 30, "itemType": "medicine"}],
                "financials": {"consultationFee": 500, "subtotal": 1, "discountPercent": 0, "discountAmount": 2, "total": 3, "amountPaid": 0, "balanceDue": 4}
            }"#,
        )
        .unwrap();
        assert_eq!(req.invoice.payment_status, PaymentStatus::Pending);
        assert_eq!(req.items[0].item_type, ItemKind::Medicine);
        assert_eq!(req.financials.consultation_fee, 500.0);
        assert_eq!(req.suggested_filename(), "bill-Ravi-Kumar-2024-03-07.pdf");

        let fee = req.consultation_item();
        assert_eq!(fee.id, 2);
        assert_eq!(fee.item_type.row_tone(), RowTone::Highlight);
    }

    #[test]
    fn unknown_payment_status_reads_as_pending() {
        let req = bill_from_json(r#"{"invoice": {"paymentStatus": "IOU"}}"#).unwrap();
        assert_eq!(req.invoice.payment_status, PaymentStatus::Pending);

        let req = bill_from_json(r#"{"invoice": {"paymentStatus": "partial payment"}}"#).unwrap();
        assert_eq!(req.invoice.payment_status, PaymentStatus::Partial);

        for missing in [r#"{"invoice": {"paymentStatus": null}}"#, r#"{"invoice": {}}"#] {
            let req = bill_from_json(missing).unwrap();
            assert_eq!(req.invoice.payment_status, PaymentStatus::Full);
        }
    }

    #[test]
    fn null_and_numeric_text_fields_are_accepted() {
        let req = prescription_from_json(
            r#"{"patientName": "Asha Rao", "sex": null, "date": null, "advice": null,
                "medicines": [{"name": "Paracetamol", "dosage": 1, "duration": null}]}"#,
        )
        .unwrap();
        assert!(req.sex.is_empty());
        assert!(req.date.is_empty());
        assert_eq!(req.medicines[0].dosage, "1");

        let req = bill_from_json(
            r#"{"patient": {"name": "Ravi", "sex": null},
                "invoice": {"number": 42, "date": null, "paymentMethod": null}}"#,
        )
        .unwrap();
        assert_eq!(req.invoice.number, "42");
        assert!(req.invoice.payment_method.is_empty());
        assert!(req.patient.sex.is_empty());
    }

    #[test]
    fn totals_can_be_recomputed() {
        let item = BillItem {
            quantity: 3.0,
            unit_price: 120.0,
            ..BillItem::default()
        }
        .with_recomputed_total();
        assert_eq!(item.total, 360.0);
    }
}
