//! Invoice document views shared by the detail and print pages.
//!
//! Totals are recomputed from the stored lines with the same arithmetic the
//! form used, so the printed tax table always adds up.

use rust_decimal::Decimal;

use ayucan_core::invoice::{InvoiceDraft, InvoiceTotals, TaxBucket};
use ayucan_core::{Phone, SupplyType};

use crate::api::OfflineInvoice;
use crate::config::SellerConfig;
use crate::routes::format_datetime;

/// Seller letterhead.
#[derive(Debug, Clone)]
pub struct SellerView {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub gstin: String,
    pub state: String,
}

impl From<&SellerConfig> for SellerView {
    fn from(seller: &SellerConfig) -> Self {
        Self {
            name: seller.name.clone(),
            address: seller.address.clone(),
            phone: seller.phone.clone(),
            gstin: seller.gstin.clone(),
            state: seller.state.clone(),
        }
    }
}

/// One printed line.
#[derive(Debug, Clone)]
pub struct DocumentLineView {
    pub number: usize,
    pub description: String,
    pub hsn: String,
    pub quantity: u32,
    pub unit_price: String,
    pub tax_rate: String,
    pub taxable: String,
    pub tax: String,
    pub total: String,
}

/// One row of the per-rate GST table.
#[derive(Debug, Clone)]
pub struct TaxRowView {
    pub rate: String,
    pub half_rate: String,
    pub taxable: String,
    pub cgst: String,
    pub sgst: String,
    pub igst: String,
    pub tax: String,
}

impl TaxRowView {
    fn new(rate: Decimal, bucket: &TaxBucket) -> Self {
        Self {
            rate: percent(rate),
            half_rate: percent(rate / Decimal::TWO),
            taxable: bucket.taxable.display(),
            cgst: bucket.cgst.display(),
            sgst: bucket.sgst.display(),
            igst: bucket.igst.display(),
            tax: bucket.tax().display(),
        }
    }
}

/// Everything printed on an offline invoice.
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    pub id: String,
    pub number: String,
    pub issued_at: String,
    pub seller: SellerView,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_gstin: String,
    pub place_of_supply: String,
    pub intra_state: bool,
    pub supply_label: &'static str,
    pub payment_mode: &'static str,
    pub notes: String,
    pub lines: Vec<DocumentLineView>,
    pub tax_rows: Vec<TaxRowView>,
    pub subtotal: String,
    pub cgst: String,
    pub sgst: String,
    pub igst: String,
    pub tax_total: String,
    pub discount: Option<String>,
    pub round_off: String,
    pub payable: String,
    pub amount_in_words: String,
    /// Set when the stored total disagrees with the recomputed one.
    pub stored_total: Option<String>,
}

impl InvoiceDocument {
    /// Build the document, or `None` when the stored lines no longer total
    /// (e.g. an invoice saved by an older backend with an empty line list).
    #[must_use]
    pub fn new(invoice: &OfflineInvoice, seller: &SellerConfig) -> Option<Self> {
        let draft = InvoiceDraft {
            lines: invoice.lines.clone(),
            discount: invoice.discount,
            supply_type: invoice.supply_type,
        };
        let totals = match draft.compute_totals() {
            Ok(totals) => totals,
            Err(e) => {
                tracing::warn!(invoice_id = %invoice.id, error = %e, "Stored invoice does not total");
                return None;
            }
        };
        Some(Self::with_totals(invoice, seller, &totals))
    }

    fn with_totals(invoice: &OfflineInvoice, seller: &SellerConfig, totals: &InvoiceTotals) -> Self {
        let customer = &invoice.customer;
        let intra_state = invoice.supply_type == SupplyType::IntraState;

        let lines = invoice
            .lines
            .iter()
            .zip(&totals.lines)
            .enumerate()
            .map(|(i, (line, amounts))| DocumentLineView {
                number: i + 1,
                description: line.description.clone(),
                hsn: line.hsn.clone().unwrap_or_default(),
                quantity: line.quantity,
                unit_price: line.unit_price.display(),
                tax_rate: percent(line.tax_rate),
                taxable: amounts.taxable.display(),
                tax: amounts.tax.display(),
                total: amounts.total.display(),
            })
            .collect();

        Self {
            id: invoice.id.to_string(),
            number: invoice.invoice_number.clone(),
            issued_at: format_datetime(&invoice.created_at),
            seller: SellerView::from(seller),
            customer_name: customer.name.clone(),
            customer_phone: customer
                .phone
                .as_deref()
                .map(|p| Phone::parse(p).map_or_else(|_| p.to_string(), |p| p.display()))
                .unwrap_or_default(),
            customer_address: customer.address.clone().unwrap_or_default(),
            customer_gstin: customer.gstin.clone().unwrap_or_default(),
            place_of_supply: if intra_state {
                seller.state.clone()
            } else {
                "Outside ".to_string() + &seller.state
            },
            intra_state,
            supply_label: invoice.supply_type.label(),
            payment_mode: invoice.payment_mode.label(),
            notes: invoice.notes.clone().unwrap_or_default(),
            lines,
            tax_rows: totals
                .by_rate
                .iter()
                .map(|(rate, bucket)| TaxRowView::new(*rate, bucket))
                .collect(),
            subtotal: totals.subtotal.display(),
            cgst: totals.cgst.display(),
            sgst: totals.sgst.display(),
            igst: totals.igst.display(),
            tax_total: totals.tax_total.display(),
            discount: (!totals.discount.is_zero()).then(|| totals.discount.display()),
            round_off: totals.round_off.display(),
            payable: totals.payable.display(),
            amount_in_words: totals.amount_in_words.clone(),
            stored_total: (invoice.total != totals.payable).then(|| invoice.total.display()),
        }
    }
}

/// Rate without trailing zeros (`18%`, `2.5%`).
fn percent(rate: Decimal) -> String {
    format!("{}%", rate.normalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn invoice(supply_type: &str) -> OfflineInvoice {
        serde_json::from_value(serde_json::json!({
            "id": "inv1",
            "invoice_number": "AYO-0042",
            "customer": {"name": "Asha Menon", "phone": "9876543210"},
            "lines": [
                {"description": "Neem Oil", "hsn": "3304", "quantity": 2, "unit_price": 249, "tax_rate": "18"},
                {"description": "Tulsi Tea", "quantity": 1, "unit_price": 150, "tax_rate": "5"}
            ],
            "discount": 0,
            "supply_type": supply_type,
            "payment_mode": "cash",
            "total": 745,
            "created_at": "2026-03-14T09:30:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_intra_state_document() {
        let doc = InvoiceDocument::new(&invoice("intra_state"), &SellerConfig::default()).unwrap();
        // 498 + 89.64 + 150 + 7.50 = 745.14, payable 745
        assert_eq!(doc.payable, "₹745.00");
        assert_eq!(doc.round_off, "-₹0.14");
        assert_eq!(doc.stored_total, None);
        assert_eq!(doc.tax_rows.len(), 2);
        assert_eq!(doc.tax_rows[0].rate, "5%");
        assert_eq!(doc.tax_rows[0].half_rate, "2.5%");
        assert_eq!(doc.tax_rows[1].cgst, "₹44.82");
        assert_eq!(doc.customer_phone, "+91 98765 43210");
        assert_eq!(doc.place_of_supply, "Kerala");
        assert_eq!(
            doc.amount_in_words,
            "Rupees Seven Hundred Forty Five Only"
        );
    }

    #[test]
    fn test_inter_state_document() {
        let doc = InvoiceDocument::new(&invoice("inter_state"), &SellerConfig::default()).unwrap();
        assert!(!doc.intra_state);
        assert_eq!(doc.igst, doc.tax_total);
        assert_eq!(doc.place_of_supply, "Outside Kerala");
    }

    #[test]
    fn test_empty_invoice_has_no_document() {
        let mut stored = invoice("intra_state");
        stored.lines.clear();
        assert!(InvoiceDocument::new(&stored, &SellerConfig::default()).is_none());
    }
}
