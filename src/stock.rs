//! The medicine stock gate in front of invoice generation.
//!
//! Before an invoice is rendered, every medicine on it is deducted from the
//! clinic's stock through a [`StockLedger`]. Outcomes are judged unevenly on
//! purpose: a medicine that cannot be found blocks the invoice outright,
//! while a medicine that is merely short leaves stock untouched and asks the
//! operator whether to continue.

use crate::compose::{BillComposer, Composer};
use crate::config::Resources;
use crate::model::{BillRequest, ItemKind};
use crate::DocError;
use log::{info, warn};

#[derive(Clone, Debug, PartialEq)]
pub struct StockRequest {
    pub name: String,
    pub quantity: u32,
}

impl StockRequest {
    /// One request per medicine line of the bill
    pub fn from_bill(request: &BillRequest) -> Vec<StockRequest> {
        request
            .items
            .iter()
            .filter(|item| item.item_type == ItemKind::Medicine)
            .map(|item| StockRequest {
                name: item.description.clone(),
                quantity: item.quantity.max(0.0).ceil() as u32,
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StockStatus {
    /// Deducted; carries what is left
    Success { remaining: u32 },
    /// Not enough on hand, nothing was deducted
    Warning { available: u32, needed: u32 },
    /// No such medicine
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StockOutcome {
    pub name: String,
    pub status: StockStatus,
}

impl StockOutcome {
    pub fn message(&self) -> String {
        match &self.status {
            StockStatus::Success { remaining } => format!("Stock updated. Remaining: {remaining}"),
            StockStatus::Warning { available, needed } => {
                format!("Insufficient stock ({available} available, {needed} needed)")
            }
            StockStatus::Error => "Medicine not found in database".to_string(),
        }
    }
}

pub trait StockLedger {
    /// Deduct each request in turn, reporting one outcome per request
    fn deduct(&mut self, requests: &[StockRequest]) -> Vec<StockOutcome>;
}

/// A stock ledger kept in memory
#[derive(Clone, Debug, Default)]
pub struct InMemoryStock {
    medicines: Vec<(String, u32)>,
}

impl InMemoryStock {
    pub fn new() -> InMemoryStock {
        InMemoryStock::default()
    }

    pub fn with_medicine<S: ToString>(mut self, name: S, quantity: u32) -> InMemoryStock {
        self.medicines.push((name.to_string(), quantity));
        self
    }

    /// The first medicine whose name contains `name`, ignoring case
    fn find(&mut self, name: &str) -> Option<&mut (String, u32)> {
        let needle = name.to_lowercase();
        self.medicines
            .iter_mut()
            .find(|(stocked, _)| stocked.to_lowercase().contains(&needle))
    }

    pub fn medicines(&self) -> impl Iterator<Item = (&str, u32)> {
        self.medicines.iter().map(|(name, quantity)| (name.as_str(), *quantity))
    }

    pub fn quantity_of(&self, name: &str) -> Option<u32> {
        self.medicines
            .iter()
            .find(|(stocked, _)| stocked.eq_ignore_ascii_case(name))
            .map(|(_, quantity)| *quantity)
    }
}

impl StockLedger for InMemoryStock {
    fn deduct(&mut self, requests: &[StockRequest]) -> Vec<StockOutcome> {
        requests
            .iter()
            .map(|request| {
                let status = match self.find(&request.name) {
                    None => StockStatus::Error,
                    Some((_, available)) if *available < request.quantity => StockStatus::Warning {
                        available: *available,
                        needed: request.quantity,
                    },
                    Some((_, available)) => {
                        *available -= request.quantity;
                        StockStatus::Success {
                            remaining: *available,
                        }
                    }
                };
                StockOutcome {
                    name: request.name.clone(),
                    status,
                }
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StockReview {
    Clear,
    /// Some medicines are short; the operator decides
    Shortfall(Vec<StockOutcome>),
    /// Some medicines are unknown; the invoice cannot be issued
    Blocked(Vec<String>),
}

pub fn review(outcomes: &[StockOutcome]) -> StockReview {
    let missing: Vec<String> = outcomes
        .iter()
        .filter(|o| o.status == StockStatus::Error)
        .map(|o| o.name.clone())
        .collect();
    if !missing.is_empty() {
        return StockReview::Blocked(missing);
    }

    let short: Vec<StockOutcome> = outcomes
        .iter()
        .filter(|o| matches!(o.status, StockStatus::Warning { .. }))
        .cloned()
        .collect();
    if short.is_empty() {
        StockReview::Clear
    } else {
        StockReview::Shortfall(short)
    }
}

/// Deduct the bill's medicines, then render it.
///
/// Returns `Ok(None)` when stock ran short and `confirm` declined to go on,
/// and [`DocError::StockUnavailable`] when a medicine is unknown.
pub fn issue_bill<L, F>(
    request: &BillRequest,
    ledger: &mut L,
    resources: &Resources,
    confirm: F,
) -> Result<Option<Vec<u8>>, DocError>
where
    L: StockLedger + ?Sized,
    F: FnOnce(&[StockOutcome]) -> bool,
{
    let requests = StockRequest::from_bill(request);
    if !requests.is_empty() {
        let outcomes = ledger.deduct(&requests);
        for outcome in outcomes.iter() {
            info!("stock for {}: {}", outcome.name, outcome.message());
        }
        match review(&outcomes) {
            StockReview::Clear => {}
            StockReview::Blocked(missing) => return Err(DocError::StockUnavailable(missing)),
            StockReview::Shortfall(short) => {
                if !confirm(&short) {
                    warn!("invoice {} held back over stock shortfall", request.invoice.number);
                    return Ok(None);
                }
            }
        }
    }

    BillComposer.render(request, resources).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BillItem;

    fn bill(names: &[(&str, f64)]) -> BillRequest {
        let mut req = BillRequest::default();
        req.items = names
            .iter()
            .map(|(name, qty)| BillItem {
                description: name.to_string(),
                quantity: *qty,
                item_type: ItemKind::Medicine,
                ..BillItem::default()
            })
            .collect();
        req.items.push(BillItem {
            description: "Scaling".to_string(),
            quantity: 1.0,
            item_type: ItemKind::Procedure,
            ..BillItem::default()
        });
        req
    }

    fn stock() -> InMemoryStock {
        InMemoryStock::new()
            .with_medicine("Amoxicillin 500mg", 10)
            .with_medicine("Ibuprofen 400mg", 1)
    }

    #[test]
    fn only_medicines_are_deducted() {
        let requests = StockRequest::from_bill(&bill(&[("Amoxicillin", 2.0)]));
        assert_eq!(
            requests,
            vec![StockRequest {
                name: "Amoxicillin".to_string(),
                quantity: 2
            }]
        );
    }

    #[test]
    fn names_match_by_substring_ignoring_case() {
        let mut ledger = stock();
        let outcomes = ledger.deduct(&[StockRequest {
            name: "amoxicillin".to_string(),
            quantity: 3,
        }]);
        assert_eq!(outcomes[0].status, StockStatus::Success { remaining: 7 });
        assert_eq!(ledger.quantity_of("Amoxicillin 500mg"), Some(7));
    }

    #[test]
    fn unknown_medicine_blocks_the_bill() {
        let mut ledger = stock();
        let result = issue_bill(
            &bill(&[("Paracetamol", 1.0)]),
            &mut ledger,
            &Resources::builtin(),
            |_| true,
        );
        assert!(matches!(result, Err(DocError::StockUnavailable(names)) if names == vec!["Paracetamol".to_string()]));
    }

    #[test]
    fn shortfall_asks_the_operator() {
        let request = bill(&[("Ibuprofen", 3.0)]);

        let mut ledger = stock();
        let declined = issue_bill(&request, &mut ledger, &Resources::builtin(), |short| {
            assert_eq!(short.len(), 1);
            false
        })
        .unwrap();
        assert!(declined.is_none());
        // a shortfall never touches stock
        assert_eq!(ledger.quantity_of("Ibuprofen 400mg"), Some(1));

        let accepted = issue_bill(&request, &mut ledger, &Resources::builtin(), |_| true).unwrap();
        assert!(accepted.is_some_and(|bytes| bytes.starts_with(b"%PDF-")));
    }

    #[test]
    fn review_prefers_blocking() {
        let outcomes = vec![
            StockOutcome {
                name: "a".to_string(),
                status: StockStatus::Warning {
                    available: 0,
                    needed: 1,
                },
            },
            StockOutcome {
                name: "b".to_string(),
                status: StockStatus::Error,
            },
        ];
        assert_eq!(review(&outcomes), StockReview::Blocked(vec!["b".to_string()]));
        assert_eq!(review(&[]), StockReview::Clear);
    }
}
