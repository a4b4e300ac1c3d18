//! Core pricing calculation functions.
//!
//! Pure functions for quotation math - no database access. The preview
//! endpoint, the stored aggregate and the document view all go through
//! these, so totals never differ between an interactive edit and a
//! finalized quotation.

use rust_decimal::prelude::*;
use serde::Serialize;

use super::amount::{Amount, LineTotal};

/// Tax applied to every location subtotal (18%).
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Label printed next to the tax row.
pub const TAX_LABEL: &str = "GST @ 18%";

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use quotation_builder::quotation::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Round to cents and pin the scale at two places, so `to_string` always
/// yields `x.yy`.
pub fn to_money(amount: Decimal) -> Decimal {
    let mut rounded = round_money(amount, 2);
    rounded.rescale(2);
    rounded
}

/// Format an amount with exactly two decimal places and no symbol.
pub fn format_money(amount: Decimal) -> String {
    to_money(amount).to_string()
}

/// Presentation form: rupee symbol and thousands separators (`₹ 1,234.50`).
pub fn display_money(amount: Decimal) -> String {
    let formatted = format_money(amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !to_money(amount).is_zero() {
        "-"
    } else {
        ""
    };
    format!("₹ {}{}.{}", sign, grouped, cents)
}

/// Total of a single line.
///
/// Only a concrete cost times a concrete quantity produces a number; any
/// "at actual" side makes the line not applicable. Parsed input is capped in
/// size, so saturation only applies to values built directly in code.
pub fn line_total(unit_cost: &Amount, quantity: &Amount) -> LineTotal {
    match (unit_cost, quantity) {
        (Amount::Concrete(cost), Amount::Concrete(qty)) => {
            LineTotal::Amount(to_money(cost.saturating_mul(*qty)))
        }
        _ => LineTotal::NotApplicable,
    }
}

/// Rollup of one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocationTotals {
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub grand_total: Decimal,
}

impl Default for LocationTotals {
    fn default() -> Self {
        Self {
            subtotal: to_money(Decimal::ZERO),
            tax_amount: to_money(Decimal::ZERO),
            grand_total: to_money(Decimal::ZERO),
        }
    }
}

/// Calculate subtotal, tax and grand total from line totals.
///
/// Not-applicable lines are skipped, never treated as an error.
pub fn location_totals<'a, I>(line_totals: I) -> LocationTotals
where
    I: IntoIterator<Item = &'a LineTotal>,
{
    let subtotal = line_totals
        .into_iter()
        .filter_map(LineTotal::amount)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let subtotal = to_money(subtotal);
    let tax_amount = to_money(subtotal.saturating_mul(TAX_RATE));

    LocationTotals {
        subtotal,
        tax_amount,
        grand_total: to_money(subtotal.saturating_add(tax_amount)),
    }
}

/// Rollup across every location of a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotationTotals {
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub grand_total: Decimal,
}

impl Default for QuotationTotals {
    fn default() -> Self {
        Self {
            subtotal: to_money(Decimal::ZERO),
            tax_amount: to_money(Decimal::ZERO),
            grand_total: to_money(Decimal::ZERO),
        }
    }
}

/// Sum location rollups into the quotation rollup.
pub fn quotation_totals<'a, I>(locations: I) -> QuotationTotals
where
    I: IntoIterator<Item = &'a LocationTotals>,
{
    let mut totals = QuotationTotals::default();
    for location in locations {
        totals.subtotal = totals.subtotal.saturating_add(location.subtotal);
        totals.tax_amount = totals.tax_amount.saturating_add(location.tax_amount);
        totals.grand_total = totals.grand_total.saturating_add(location.grand_total);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_bankers_rounding_to_even() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(2));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(2.125), 2), dec!(2.12));
        assert_eq!(round_money(dec!(2.135), 2), dec!(2.14));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
    }

    #[test]
    fn test_format_money_always_two_places() {
        assert_eq!(format_money(dec!(200)), "200.00");
        assert_eq!(format_money(dec!(0)), "0.00");
        assert_eq!(format_money(dec!(12.5)), "12.50");
        assert_eq!(format_money(dec!(1.005)), "1.00");
    }

    #[test]
    fn test_display_money_groups_thousands() {
        assert_eq!(display_money(dec!(0)), "₹ 0.00");
        assert_eq!(display_money(dec!(999.5)), "₹ 999.50");
        assert_eq!(display_money(dec!(1234.5)), "₹ 1,234.50");
        assert_eq!(display_money(dec!(1234567)), "₹ 1,234,567.00");
        assert_eq!(display_money(dec!(-1500)), "₹ -1,500.00");
    }

    // ==================== line_total tests ====================

    #[test]
    fn test_line_total_concrete() {
        let total = line_total(&Amount::Concrete(dec!(100)), &Amount::Concrete(dec!(2)));
        assert_eq!(total, LineTotal::Amount(dec!(200.00)));
        assert_eq!(total.to_string(), "200.00");
    }

    #[test]
    fn test_line_total_rounds_to_cents() {
        let total = line_total(&Amount::Concrete(dec!(0.333)), &Amount::Concrete(dec!(3)));
        assert_eq!(total, LineTotal::Amount(dec!(1.00)));
        let total = line_total(&Amount::Concrete(dec!(10.125)), &Amount::Concrete(dec!(1)));
        assert_eq!(total, LineTotal::Amount(dec!(10.12)));
    }

    #[test]
    fn test_line_total_at_actual_either_side() {
        let cost = Amount::Concrete(dec!(100));
        let qty = Amount::Concrete(dec!(2));
        assert_eq!(line_total(&Amount::AtActual, &qty), LineTotal::NotApplicable);
        assert_eq!(line_total(&cost, &Amount::AtActual), LineTotal::NotApplicable);
        assert_eq!(line_total(&Amount::AtActual, &Amount::AtActual), LineTotal::NotApplicable);
    }

    #[test]
    fn test_line_total_zero_cost_is_concrete_zero() {
        let total = line_total(&Amount::Concrete(dec!(0)), &Amount::Concrete(dec!(4)));
        assert_eq!(total, LineTotal::Amount(dec!(0)));
    }

    #[test]
    fn test_line_total_saturates_instead_of_overflowing() {
        let total = line_total(&Amount::Concrete(Decimal::MAX), &Amount::Concrete(dec!(2)));
        assert_eq!(total, LineTotal::Amount(Decimal::MAX));
    }

    #[test]
    fn test_line_total_largest_accepted_input() {
        let cost = Amount::parse_cost("999999999999.99").unwrap();
        let qty = Amount::parse_quantity("999999999999.99").unwrap();
        let total = line_total(&cost, &qty);
        assert_eq!(total, LineTotal::Amount(dec!(999999999999980000000000.00)));
    }

    // ==================== location_totals tests ====================

    #[test]
    fn test_location_totals_skip_not_applicable() {
        let lines = vec![
            line_total(&Amount::Concrete(dec!(100)), &Amount::Concrete(dec!(2))),
            line_total(&Amount::AtActual, &Amount::Concrete(dec!(3))),
            line_total(&Amount::Concrete(dec!(50)), &Amount::Concrete(dec!(1))),
        ];

        let totals = location_totals(&lines);

        assert_eq!(totals.subtotal, dec!(250.00));
        assert_eq!(totals.tax_amount, dec!(45.00));
        assert_eq!(totals.grand_total, dec!(295.00));
    }

    #[test]
    fn test_location_totals_empty() {
        let totals = location_totals(&[]);
        assert_eq!(totals, LocationTotals::default());
        assert_eq!(totals.grand_total.to_string(), "0.00");
    }

    #[test]
    fn test_location_tax_rounded_half_even() {
        // 0.25 * 0.18 = 0.045 -> 0.04
        let lines = vec![LineTotal::Amount(dec!(0.25))];
        let totals = location_totals(&lines);
        assert_eq!(totals.tax_amount, dec!(0.04));
        assert_eq!(totals.grand_total, dec!(0.29));
    }

    #[test]
    fn test_location_totals_serialize_two_places() {
        let totals = location_totals(&[LineTotal::Amount(dec!(100))]);
        let json = serde_json::to_value(totals).unwrap();
        assert_eq!(json["subtotal"], "100.00");
        assert_eq!(json["tax_amount"], "18.00");
        assert_eq!(json["grand_total"], "118.00");
    }

    #[test]
    fn test_location_totals_saturate_on_huge_lines() {
        let lines = vec![LineTotal::Amount(Decimal::MAX), LineTotal::Amount(Decimal::MAX)];
        let totals = location_totals(&lines);
        assert_eq!(totals.subtotal, Decimal::MAX);
        assert_eq!(totals.grand_total, Decimal::MAX);
        assert!(totals.tax_amount > Decimal::ZERO);
    }

    // ==================== quotation_totals tests ====================

    #[test]
    fn test_quotation_totals_sum_locations() {
        let first = location_totals(&[LineTotal::Amount(dec!(250))]);
        let second = location_totals(&[LineTotal::Amount(dec!(100))]);

        let totals = quotation_totals(&[first, second]);

        assert_eq!(first.grand_total, dec!(295.00));
        assert_eq!(second.grand_total, dec!(118.00));
        assert_eq!(totals.subtotal, dec!(350.00));
        assert_eq!(totals.tax_amount, dec!(63.00));
        assert_eq!(totals.grand_total, dec!(413.00));
    }

    #[test]
    fn test_quotation_totals_saturate() {
        let huge = location_totals(&[LineTotal::Amount(Decimal::MAX)]);
        let totals = quotation_totals(&[huge, huge]);
        assert_eq!(totals.grand_total, Decimal::MAX);
    }

    #[test]
    fn test_quotation_totals_no_locations() {
        assert_eq!(quotation_totals(&[]), QuotationTotals::default());
    }
}
