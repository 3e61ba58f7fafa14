use crate::model::{BillItem, PaymentStatus};

/// The derived figures printed under an invoice's item table
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Summary {
    pub subtotal: f64,
    /// Discount percentage after clamping to 0..=100
    pub discount_percent: f64,
    pub discount: f64,
    pub total: f64,
    pub amount_paid: f64,
    pub balance_due: f64,
    pub status: PaymentStatus,
}

impl Summary {
    /// Subtotal is the sum of the item totals plus the consultation fee, the
    /// discount is taken off the subtotal, and what was paid depends on the
    /// payment status: a full payment always covers the total, a pending one
    /// never counts anything as paid, and a partial one is kept between
    /// nothing and the total.
    pub fn compute(
        items: &[BillItem],
        consultation_fee: f64,
        discount_percent: f64,
        status: PaymentStatus,
        amount_paid: f64,
    ) -> Summary {
        let subtotal: f64 = items.iter().map(|item| item.total).sum::<f64>() + consultation_fee;
        let discount_percent = if discount_percent.is_finite() {
            discount_percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let discount = subtotal * discount_percent / 100.0;
        let total = subtotal - discount;

        let amount_paid = match status {
            PaymentStatus::Full => total,
            PaymentStatus::Pending => 0.0,
            PaymentStatus::Partial if amount_paid.is_finite() => amount_paid.clamp(0.0, total.max(0.0)),
            PaymentStatus::Partial => 0.0,
        };

        Summary {
            subtotal,
            discount_percent,
            discount,
            total,
            amount_paid,
            balance_due: total - amount_paid,
            status,
        }
    }

    /// Whether amount paid and balance due are printed
    pub fn shows_balance(&self) -> bool {
        self.status != PaymentStatus::Full
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKind;

    fn items() -> Vec<BillItem> {
        [100.0, 200.0]
            .into_iter()
            .enumerate()
            .map(|(i, price)| BillItem {
                id: i as u32 + 1,
                description: format!("Medicine {i}"),
                quantity: 1.0,
                unit_price: price,
                total: price,
                item_type: ItemKind::Medicine,
            })
            .collect()
    }

    #[test]
    fn partial_payment_leaves_a_balance() {
        let s = Summary::compute(&items(), 500.0, 10.0, PaymentStatus::Partial, 500.0);
        assert_eq!(s.subtotal, 800.0);
        assert_eq!(s.discount, 80.0);
        assert_eq!(s.total, 720.0);
        assert_eq!(s.balance_due, 220.0);
        assert!(s.shows_balance());
    }

    #[test]
    fn full_payment_covers_the_total() {
        let s = Summary::compute(&items(), 500.0, 10.0, PaymentStatus::Full, 3.0);
        assert_eq!(s.amount_paid, s.total);
        assert_eq!(s.balance_due, 0.0);
        assert!(!s.shows_balance());
    }

    #[test]
    fn pending_payment_counts_nothing_as_paid() {
        let s = Summary::compute(&items(), 0.0, 0.0, PaymentStatus::Pending, 250.0);
        assert_eq!(s.amount_paid, 0.0);
        assert_eq!(s.balance_due, 300.0);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        let s = Summary::compute(&items(), 0.0, 150.0, PaymentStatus::Partial, 1e9);
        assert_eq!(s.discount_percent, 100.0);
        assert_eq!(s.total, 0.0);
        assert_eq!(s.amount_paid, 0.0);

        let s = Summary::compute(&items(), 0.0, -5.0, PaymentStatus::Partial, -10.0);
        assert_eq!(s.discount, 0.0);
        assert_eq!(s.amount_paid, 0.0);
        assert_eq!(s.total, s.subtotal - s.discount);
    }
}
