//! Display arithmetic for cart rows.

use rust_decimal::{Decimal, RoundingStrategy};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "£";

pub const UNAVAILABLE_AMOUNT: &str = "n/a";

/// `price × quantity` rounded to pennies, half away from zero.
/// `None` when the product does not fit in a `Decimal`.
pub fn line_total(price: Decimal, quantity: Decimal) -> Option<Decimal> {
    price
        .checked_mul(quantity)
        .map(|total| total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Unit price as the storefront sends it, without padding (`£2.5`, `£3`).
pub fn format_unit_price(symbol: &str, price: Decimal) -> String {
    format!("{symbol}{}", price.normalize())
}

/// Fixed two-decimal amount (`£8.99`, `£3.00`).
pub fn format_amount(symbol: &str, amount: Decimal) -> String {
    let mut fixed = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    fixed.rescale(2);
    format!("{symbol}{fixed}")
}

/// Line total for a table cell; overflowed totals show as [`UNAVAILABLE_AMOUNT`].
pub fn format_line_total(symbol: &str, total: Option<Decimal>) -> String {
    match total {
        Some(amount) => format_amount(symbol, amount),
        None => UNAVAILABLE_AMOUNT.to_string(),
    }
}

pub fn format_quantity(quantity: Decimal, unit: &str) -> String {
    let unit = unit.trim();
    if unit.is_empty() {
        quantity.normalize().to_string()
    } else {
        format!("{} {unit}", quantity.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(text: &str) -> Decimal {
        Decimal::from_str(text).expect("decimal")
    }

    #[test]
    fn line_total_rounds_midpoint_away_from_zero() {
        assert_eq!(line_total(dec("2.995"), dec("3")), Some(dec("8.99")));
        assert_eq!(line_total(dec("0.125"), dec("1")), Some(dec("0.13")));
        assert_eq!(line_total(dec("1.20"), dec("0.5")), Some(dec("0.60")));
    }

    #[test]
    fn oversized_line_total_is_unavailable_instead_of_panicking() {
        let total = line_total(dec("100000000000000000000"), dec("10000000000"));
        assert_eq!(total, None);
        assert_eq!(format_line_total("£", total), UNAVAILABLE_AMOUNT);
        assert_eq!(format_line_total("£", Some(dec("3"))), "£3.00");
    }

    #[test]
    fn amounts_always_show_two_decimals() {
        assert_eq!(format_amount("£", dec("3")), "£3.00");
        assert_eq!(format_line_total("£", line_total(dec("2.995"), dec("3"))), "£8.99");
        assert_eq!(format_amount("$", dec("12.5")), "$12.50");
    }

    #[test]
    fn unit_prices_keep_their_shortest_form() {
        assert_eq!(format_unit_price("£", dec("2.50")), "£2.5");
        assert_eq!(format_unit_price("£", dec("4")), "£4");
    }

    #[test]
    fn quantity_carries_unit_label() {
        assert_eq!(format_quantity(dec("1.50"), "kg"), "1.5 kg");
        assert_eq!(format_quantity(dec("2"), ""), "2");
    }
}
