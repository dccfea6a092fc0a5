//! Server-authoritative checkout arithmetic. All amounts are integer cents.
//!
//! The client never supplies totals the server trusts; everything an order
//! persists is recomputed here from cart contents.

pub const TAX_PERCENT: i64 = 5;
pub const DELIVERY_FEE: i64 = 5_000;
pub const FREE_DELIVERY_THRESHOLD: i64 = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: i64,
    pub tax: i64,
    pub delivery_charge: i64,
    pub total_amount: i64,
}

/// Unit price after the seller discount, floored to whole cents.
pub fn discounted_unit_price(per_unit_price: i64, discount_percent: i32) -> i64 {
    let discount = i64::from(discount_percent.clamp(0, 100));
    per_unit_price * (100 - discount) / 100
}

/// 5% tax; delivery is free above the threshold, a flat fee otherwise.
pub fn order_totals(subtotal: i64) -> OrderTotals {
    let tax = subtotal * TAX_PERCENT / 100;
    let delivery_charge = if subtotal > FREE_DELIVERY_THRESHOLD {
        0
    } else {
        DELIVERY_FEE
    };
    OrderTotals {
        subtotal,
        tax,
        delivery_charge,
        total_amount: subtotal + tax + delivery_charge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_below_free_delivery_threshold() {
        let t = order_totals(40_000);
        assert_eq!(t.tax, 2_000);
        assert_eq!(t.delivery_charge, 5_000);
        assert_eq!(t.total_amount, 47_000);
    }

    #[test]
    fn totals_above_free_delivery_threshold() {
        let t = order_totals(60_000);
        assert_eq!(t.tax, 3_000);
        assert_eq!(t.delivery_charge, 0);
        assert_eq!(t.total_amount, 63_000);
    }

    #[test]
    fn total_is_sum_of_parts() {
        for subtotal in [0, 1, 49_999, 50_000, 50_001, 123_456] {
            let t = order_totals(subtotal);
            assert_eq!(t.total_amount, t.subtotal + t.tax + t.delivery_charge);
        }
    }

    #[test]
    fn discount_is_floored() {
        assert_eq!(discounted_unit_price(1_000, 0), 1_000);
        assert_eq!(discounted_unit_price(1_000, 15), 850);
        assert_eq!(discounted_unit_price(999, 10), 899);
        assert_eq!(discounted_unit_price(1_000, 100), 0);
    }

    #[test]
    fn discount_out_of_range_is_clamped() {
        assert_eq!(discounted_unit_price(1_000, -5), 1_000);
        assert_eq!(discounted_unit_price(1_000, 120), 0);
    }
}
