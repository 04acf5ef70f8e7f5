//! Amount-in-words conversion using the Indian numbering system.
//!
//! Printed GST invoices state the payable amount in words, grouped as
//! crore / lakh / thousand / hundred rather than million / billion.

use rust_decimal::Decimal;

use crate::types::Money;

const ONES: [&str; 20] = [
    "Zero",
    "One",
    "Two",
    "Three",
    "Four",
    "Five",
    "Six",
    "Seven",
    "Eight",
    "Nine",
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u128 = 1_00_00_000;
const LAKH: u128 = 1_00_000;
const THOUSAND: u128 = 1_000;

/// Words for 1..=99.
fn two_digits(n: u128, out: &mut Vec<&'static str>) {
    debug_assert!(n < 100);
    if n < 20 {
        if let Some(word) = usize::try_from(n).ok().and_then(|i| ONES.get(i)) {
            out.push(word);
        }
        return;
    }
    if let Some(word) = usize::try_from(n / 10).ok().and_then(|i| TENS.get(i)) {
        out.push(word);
    }
    if n % 10 != 0 {
        two_digits(n % 10, out);
    }
}

/// Words for 1..=999.
fn three_digits(n: u128, out: &mut Vec<&'static str>) {
    let hundreds = n / 100;
    if hundreds > 0 {
        two_digits(hundreds, out);
        out.push("Hundred");
    }
    let rest = n % 100;
    if rest > 0 {
        two_digits(rest, out);
    }
}

fn push_words(n: u128, out: &mut Vec<&'static str>) {
    let crores = n / CRORE;
    if crores > 0 {
        // Anything above 99 crore is itself spelled out ("One Hundred Twenty Crore").
        push_words(crores, out);
        out.push("Crore");
    }
    let lakhs = (n % CRORE) / LAKH;
    if lakhs > 0 {
        two_digits(lakhs, out);
        out.push("Lakh");
    }
    let thousands = (n % LAKH) / THOUSAND;
    if thousands > 0 {
        two_digits(thousands, out);
        out.push("Thousand");
    }
    let rest = n % THOUSAND;
    if rest > 0 {
        three_digits(rest, out);
    }
}

/// Spell out a non-negative integer in Indian numbering.
///
/// ```
/// use ayucan_core::invoice::integer_to_words;
///
/// assert_eq!(integer_to_words(0), "Zero");
/// assert_eq!(integer_to_words(2_50_000), "Two Lakh Fifty Thousand");
/// ```
#[must_use]
pub fn integer_to_words(n: u64) -> String {
    spell(u128::from(n))
}

fn spell(n: u128) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }
    let mut words = Vec::new();
    push_words(n, &mut words);
    words.join(" ")
}

/// Integer part of a non-negative decimal.
fn whole_part(value: Decimal) -> u128 {
    let mut whole = value.trunc();
    whole.rescale(0);
    whole.mantissa().unsigned_abs()
}

/// Spell out a rupee amount the way it is printed on invoices.
///
/// The amount is first rounded to paise. Whole-rupee amounts end in
/// `"Only"`; fractional amounts add `"and … Paise"`.
///
/// ```
/// use ayucan_core::{Money, invoice::amount_in_words};
///
/// assert_eq!(
///     amount_in_words(Money::from_paise(125_050)),
///     "Rupees One Thousand Two Hundred Fifty and Fifty Paise Only"
/// );
/// ```
#[must_use]
pub fn amount_in_words(amount: Money) -> String {
    let rounded = amount.round_to_paise();
    let sign = if rounded.is_negative() { "Minus " } else { "" };
    let magnitude = rounded.amount().abs();

    let rupees = magnitude.trunc();
    let paise = whole_part((magnitude - rupees) * Decimal::ONE_HUNDRED);

    let mut text = format!("{sign}Rupees {}", spell(whole_part(rupees)));
    if paise > 0 {
        text.push_str(" and ");
        text.push_str(&spell(paise));
        text.push_str(" Paise");
    }
    text.push_str(" Only");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_numbers() {
        assert_eq!(integer_to_words(1), "One");
        assert_eq!(integer_to_words(13), "Thirteen");
        assert_eq!(integer_to_words(20), "Twenty");
        assert_eq!(integer_to_words(45), "Forty Five");
        assert_eq!(integer_to_words(100), "One Hundred");
        assert_eq!(integer_to_words(101), "One Hundred One");
        assert_eq!(integer_to_words(999), "Nine Hundred Ninety Nine");
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(integer_to_words(1_000), "One Thousand");
        assert_eq!(integer_to_words(10_000), "Ten Thousand");
        assert_eq!(integer_to_words(1_00_000), "One Lakh");
        assert_eq!(integer_to_words(1_00_001), "One Lakh One");
        assert_eq!(
            integer_to_words(1_23_45_678),
            "One Crore Twenty Three Lakh Forty Five Thousand Six Hundred Seventy Eight"
        );
        assert_eq!(
            integer_to_words(99_99_99_999),
            "Ninety Nine Crore Ninety Nine Lakh Ninety Nine Thousand Nine Hundred Ninety Nine"
        );
    }

    #[test]
    fn test_large_crores_recurse() {
        assert_eq!(integer_to_words(u64::try_from(120 * CRORE).unwrap()), "One Hundred Twenty Crore");
        assert_eq!(
            integer_to_words(u64::try_from(1_50_000 * CRORE + 5).unwrap()),
            "One Lakh Fifty Thousand Crore Five"
        );
    }

    #[test]
    fn test_amount_in_words() {
        assert_eq!(amount_in_words(Money::ZERO), "Rupees Zero Only");
        assert_eq!(
            amount_in_words(Money::from_rupees(1_180)),
            "Rupees One Thousand One Hundred Eighty Only"
        );
        assert_eq!(
            amount_in_words(Money::from_paise(5)),
            "Rupees Zero and Five Paise Only"
        );
        assert_eq!(
            amount_in_words(Money::from_paise(-99_99)),
            "Minus Rupees Ninety Nine and Ninety Nine Paise Only"
        );
    }

    #[test]
    fn test_amount_beyond_u64_is_spelled_exactly() {
        // 10^20 rupees is 10^13 crore
        let amount = Money::new(Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0));
        assert_eq!(amount_in_words(amount), "Rupees Ten Lakh Crore Crore Only");
    }

    #[test]
    fn test_amount_rounds_to_paise_first() {
        let amount = Money::new(Decimal::new(10_995, 3)); // 10.995
        assert_eq!(amount_in_words(amount), "Rupees Eleven Only");
    }
}
