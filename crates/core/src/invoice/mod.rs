//! Offline (walk-in) GST invoice arithmetic.
//!
//! The dashboard previews and prints offline invoices before the backend
//! stores them, so the totals shown on screen are computed here:
//!
//! - each line is taxed on `quantity × unit_price` (prices exclude tax),
//! - line amounts are rounded to paise, half away from zero,
//! - intra-state supply splits tax into CGST and SGST, inter-state books IGST,
//! - a flat invoice discount comes off the taxed total,
//! - the payable amount is rounded to the rupee and the difference is shown
//!   as the round-off line.

mod words;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, SupplyType};

pub use words::{amount_in_words, integer_to_words};

/// Largest unit price, discount or payable amount an invoice accepts (₹100 crore).
pub const MAX_AMOUNT_RUPEES: i64 = 1_000_000_000;

/// [`MAX_AMOUNT_RUPEES`] as an amount.
#[must_use]
pub fn max_amount() -> Money {
    Money::from_rupees(MAX_AMOUNT_RUPEES)
}

/// Errors that make an invoice draft impossible to total.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvoiceError {
    #[error("invoice must have at least one line")]
    NoLines,
    #[error("line {line}: quantity must be greater than zero")]
    ZeroQuantity { line: usize },
    #[error("line {line}: unit price cannot be negative")]
    NegativePrice { line: usize },
    #[error("line {line}: unit price exceeds the ₹100 crore limit")]
    PriceTooLarge { line: usize },
    #[error("line {line}: tax rate must be between 0 and 100")]
    InvalidTaxRate { line: usize },
    #[error("line {line}: description is required")]
    MissingDescription { line: usize },
    #[error("discount cannot be negative")]
    NegativeDiscount,
    #[error("invoice amount exceeds the ₹100 crore limit")]
    AmountTooLarge,
    #[error("discount of {discount} exceeds the invoice total of {total}")]
    DiscountExceedsTotal { discount: String, total: String },
}

/// One billed line on an offline invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// What was sold.
    pub description: String,
    /// HSN classification code, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsn: Option<String>,
    pub quantity: u32,
    /// Price per unit, excluding tax.
    pub unit_price: Money,
    /// GST rate in percent (e.g., `18` for 18 %).
    pub tax_rate: Decimal,
}

/// A not-yet-saved invoice as entered in the form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvoiceDraft {
    pub lines: Vec<InvoiceLine>,
    /// Flat discount on the whole invoice.
    pub discount: Money,
    pub supply_type: SupplyType,
}

/// Computed amounts for a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTotals {
    pub taxable: Money,
    pub tax: Money,
    pub total: Money,
}

/// Taxable value and tax collected at one GST rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxBucket {
    pub taxable: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub igst: Money,
}

impl TaxBucket {
    /// Total tax in this bucket.
    #[must_use]
    pub fn tax(&self) -> Money {
        self.cgst + self.sgst + self.igst
    }
}

/// Every amount printed on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Per-line amounts, in the same order as the draft lines.
    pub lines: Vec<LineTotals>,
    /// Tax summary keyed by rate.
    pub by_rate: BTreeMap<Decimal, TaxBucket>,
    /// Sum of taxable values.
    pub subtotal: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub igst: Money,
    pub tax_total: Money,
    pub discount: Money,
    /// `subtotal + tax_total - discount`, before rounding.
    pub gross: Money,
    /// `payable - gross`; between -0.50 and +0.50.
    pub round_off: Money,
    /// Whole-rupee amount due.
    pub payable: Money,
    /// `payable` spelled out for the printed invoice.
    pub amount_in_words: String,
}

impl InvoiceLine {
    /// Taxable value, tax and total for this line.
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceError::AmountTooLarge`] if an amount overflows.
    pub fn totals(&self) -> Result<LineTotals, InvoiceError> {
        let taxable = self
            .unit_price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(InvoiceError::AmountTooLarge)?
            .round_to_paise();
        let tax = taxable
            .checked_mul(self.tax_rate / Decimal::ONE_HUNDRED)
            .ok_or(InvoiceError::AmountTooLarge)?
            .round_to_paise();
        let total = taxable
            .checked_add(tax)
            .ok_or(InvoiceError::AmountTooLarge)?;
        Ok(LineTotals {
            taxable,
            tax,
            total,
        })
    }

    fn validate(&self, line: usize) -> Result<(), InvoiceError> {
        if self.description.trim().is_empty() {
            return Err(InvoiceError::MissingDescription { line });
        }
        if self.quantity == 0 {
            return Err(InvoiceError::ZeroQuantity { line });
        }
        if self.unit_price.is_negative() {
            return Err(InvoiceError::NegativePrice { line });
        }
        if self.unit_price > max_amount() {
            return Err(InvoiceError::PriceTooLarge { line });
        }
        if self.tax_rate.is_sign_negative() || self.tax_rate > Decimal::ONE_HUNDRED {
            return Err(InvoiceError::InvalidTaxRate { line });
        }
        Ok(())
    }
}

impl InvoiceDraft {
    /// Validate the draft and compute every printed amount.
    ///
    /// Line numbers in errors are 1-based, matching the form rows.
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceError`] for an empty invoice, an invalid line, a
    /// discount that is negative or larger than the taxed total, or a payable
    /// amount above [`MAX_AMOUNT_RUPEES`].
    pub fn compute_totals(&self) -> Result<InvoiceTotals, InvoiceError> {
        if self.lines.is_empty() {
            return Err(InvoiceError::NoLines);
        }
        for (index, line) in self.lines.iter().enumerate() {
            line.validate(index + 1)?;
        }
        if self.discount.is_negative() {
            return Err(InvoiceError::NegativeDiscount);
        }
        if self.discount > max_amount() {
            return Err(InvoiceError::AmountTooLarge);
        }

        let lines = self
            .lines
            .iter()
            .map(InvoiceLine::totals)
            .collect::<Result<Vec<_>, _>>()?;

        let mut by_rate: BTreeMap<Decimal, (Money, Money)> = BTreeMap::new();
        for (line, totals) in self.lines.iter().zip(&lines) {
            let entry = by_rate
                .entry(line.tax_rate.normalize())
                .or_insert((Money::ZERO, Money::ZERO));
            entry.0 = checked_sum([entry.0, totals.taxable])?;
            entry.1 = checked_sum([entry.1, totals.tax])?;
        }

        let by_rate: BTreeMap<Decimal, TaxBucket> = by_rate
            .into_iter()
            .map(|(rate, (taxable, tax))| (rate, split_tax(taxable, tax, self.supply_type)))
            .collect();

        let subtotal = checked_sum(lines.iter().map(|l| l.taxable))?;
        let cgst = checked_sum(by_rate.values().map(|b| b.cgst))?;
        let sgst = checked_sum(by_rate.values().map(|b| b.sgst))?;
        let igst = checked_sum(by_rate.values().map(|b| b.igst))?;
        let tax_total = checked_sum([cgst, sgst, igst])?;

        let discount = self.discount.round_to_paise();
        let before_discount = checked_sum([subtotal, tax_total])?;
        if discount > before_discount {
            return Err(InvoiceError::DiscountExceedsTotal {
                discount: discount.display(),
                total: before_discount.display(),
            });
        }

        let gross = before_discount - discount;
        let payable = gross.round_to_rupee();
        if payable > max_amount() {
            return Err(InvoiceError::AmountTooLarge);
        }
        let round_off = payable - gross;

        Ok(InvoiceTotals {
            lines,
            by_rate,
            subtotal,
            cgst,
            sgst,
            igst,
            tax_total,
            discount,
            gross,
            round_off,
            payable,
            amount_in_words: amount_in_words(payable),
        })
    }
}

fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Result<Money, InvoiceError> {
    amounts.into_iter().try_fold(Money::ZERO, |total, amount| {
        total
            .checked_add(amount)
            .ok_or(InvoiceError::AmountTooLarge)
    })
}

/// Split the tax at one rate according to the place of supply.
///
/// CGST takes the rounded half and SGST the remainder, so the two always add
/// back up to the bucket's tax.
fn split_tax(taxable: Money, tax: Money, supply_type: SupplyType) -> TaxBucket {
    match supply_type {
        SupplyType::IntraState => {
            let cgst = (tax * Decimal::new(5, 1)).round_to_paise();
            TaxBucket {
                taxable,
                cgst,
                sgst: tax - cgst,
                igst: Money::ZERO,
            }
        }
        SupplyType::InterState => TaxBucket {
            taxable,
            cgst: Money::ZERO,
            sgst: Money::ZERO,
            igst: tax,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn line(description: &str, quantity: u32, price_paise: i64, rate: i64) -> InvoiceLine {
        InvoiceLine {
            description: description.to_string(),
            hsn: None,
            quantity,
            unit_price: Money::from_paise(price_paise),
            tax_rate: Decimal::from(rate),
        }
    }

    fn draft(lines: Vec<InvoiceLine>) -> InvoiceDraft {
        InvoiceDraft {
            lines,
            ..InvoiceDraft::default()
        }
    }

    #[test]
    fn test_single_line_intra_state() {
        let totals = draft(vec![line("Ashwagandha Churna", 2, 50_000, 18)])
            .compute_totals()
            .unwrap();

        assert_eq!(totals.subtotal, Money::from_rupees(1000));
        assert_eq!(totals.tax_total, Money::from_rupees(180));
        assert_eq!(totals.cgst, Money::from_rupees(90));
        assert_eq!(totals.sgst, Money::from_rupees(90));
        assert_eq!(totals.igst, Money::ZERO);
        assert_eq!(totals.payable, Money::from_rupees(1180));
        assert_eq!(totals.round_off, Money::ZERO);
        assert_eq!(
            totals.amount_in_words,
            "Rupees One Thousand One Hundred Eighty Only"
        );
    }

    #[test]
    fn test_inter_state_books_igst() {
        let mut invoice = draft(vec![line("Triphala", 1, 24_900, 12)]);
        invoice.supply_type = SupplyType::InterState;
        let totals = invoice.compute_totals().unwrap();

        assert_eq!(totals.igst, totals.tax_total);
        assert_eq!(totals.cgst, Money::ZERO);
        assert_eq!(totals.tax_total, Money::from_paise(2988));
    }

    #[test]
    fn test_odd_paise_split_keeps_sum() {
        // 1.11 tax splits into 0.56 + 0.55
        let totals = draft(vec![line("Sample", 1, 2_220, 5)])
            .compute_totals()
            .unwrap();
        assert_eq!(totals.tax_total, Money::from_paise(111));
        assert_eq!(totals.cgst, Money::from_paise(56));
        assert_eq!(totals.sgst, Money::from_paise(55));
        assert_eq!(totals.cgst + totals.sgst, totals.tax_total);
    }

    #[test]
    fn test_rate_buckets_and_round_off() {
        let mut invoice = draft(vec![
            line("Oil", 3, 19_999, 18),
            line("Tablets", 1, 33_333, 12),
            line("Oil refill", 1, 10_000, 18),
        ]);
        invoice.discount = Money::from_rupees(50);
        let totals = invoice.compute_totals().unwrap();

        assert_eq!(totals.by_rate.len(), 2);
        let eighteen = totals.by_rate[&Decimal::from(18)];
        assert_eq!(eighteen.taxable, Money::from_paise(69_997));
        // 107.99 on the oil plus 18.00 on the refill
        assert_eq!(eighteen.tax(), Money::from_paise(12_599));
        assert_eq!(totals.payable, Money::from_rupees(1149));
        assert_eq!(totals.round_off, Money::from_paise(-29));

        // subtotal + tax - discount + round_off == payable, payable is whole
        assert_eq!(
            totals.subtotal + totals.tax_total - totals.discount + totals.round_off,
            totals.payable
        );
        assert_eq!(totals.payable, totals.payable.round_to_rupee());
        assert!(totals.round_off.amount().abs() <= Decimal::new(5, 1));
    }

    #[test]
    fn test_zero_rated_line() {
        let totals = draft(vec![line("Fresh herbs", 4, 2_500, 0)])
            .compute_totals()
            .unwrap();
        assert_eq!(totals.tax_total, Money::ZERO);
        assert_eq!(totals.payable, Money::from_rupees(100));
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(draft(vec![]).compute_totals(), Err(InvoiceError::NoLines));
        assert_eq!(
            draft(vec![line("A", 1, 100, 5), line("B", 0, 100, 5)]).compute_totals(),
            Err(InvoiceError::ZeroQuantity { line: 2 })
        );
        assert_eq!(
            draft(vec![line("A", 1, -100, 5)]).compute_totals(),
            Err(InvoiceError::NegativePrice { line: 1 })
        );
        assert_eq!(
            draft(vec![line("A", 1, 100, 101)]).compute_totals(),
            Err(InvoiceError::InvalidTaxRate { line: 1 })
        );
        assert_eq!(
            draft(vec![line("  ", 1, 100, 5)]).compute_totals(),
            Err(InvoiceError::MissingDescription { line: 1 })
        );
    }

    #[test]
    fn test_oversized_amounts_are_rejected() {
        // Largest quantity at the largest decimal price would overflow.
        let mut huge = line("Bulk", u32::MAX, 0, 18);
        huge.unit_price = Money::new(Decimal::MAX);
        assert_eq!(
            draft(vec![huge]).compute_totals(),
            Err(InvoiceError::PriceTooLarge { line: 1 })
        );

        // Each price is within the limit but the bill is not.
        let mut bulk = line("Bulk", u32::MAX, 0, 18);
        bulk.unit_price = max_amount();
        assert_eq!(
            draft(vec![bulk]).compute_totals(),
            Err(InvoiceError::AmountTooLarge)
        );

        let mut invoice = draft(vec![line("A", 1, 10_000, 0)]);
        invoice.discount = Money::new(Decimal::MAX);
        assert_eq!(invoice.compute_totals(), Err(InvoiceError::AmountTooLarge));
    }

    #[test]
    fn test_line_totals_overflow_is_an_error() {
        let mut huge = line("Bulk", u32::MAX, 0, 18);
        huge.unit_price = Money::new(Decimal::MAX);
        assert_eq!(huge.totals(), Err(InvoiceError::AmountTooLarge));
    }

    #[test]
    fn test_discount_limits() {
        let mut invoice = draft(vec![line("A", 1, 10_000, 0)]);
        invoice.discount = Money::from_rupees(-1);
        assert_eq!(invoice.compute_totals(), Err(InvoiceError::NegativeDiscount));

        invoice.discount = Money::from_rupees(101);
        assert!(matches!(
            invoice.compute_totals(),
            Err(InvoiceError::DiscountExceedsTotal { .. })
        ));

        invoice.discount = Money::from_rupees(100);
        let totals = invoice.compute_totals().unwrap();
        assert_eq!(totals.payable, Money::ZERO);
        assert_eq!(totals.amount_in_words, "Rupees Zero Only");
    }
}
