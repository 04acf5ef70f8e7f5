//! Offline invoice form parsing.
//!
//! Lines arrive as indexed fields (`line-0-description`, `line-0-quantity`,
//! ...) because the form adds and removes rows in the browser. Indices may
//! have gaps after a row is removed; rows are kept in index order.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use ayucan_core::invoice::{InvoiceDraft, InvoiceLine, InvoiceTotals, max_amount};
use ayucan_core::{Money, OfflineCustomerId, PaymentMode, Phone, SupplyType};

use crate::api::{InvoiceCustomer, InvoiceInput, OfflineCustomer};
use crate::routes::{non_empty, optional_gstin};

/// Most rows one invoice may carry.
pub const MAX_LINES: usize = 100;

/// One invoice row, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineForm {
    pub description: String,
    pub hsn: String,
    pub quantity: String,
    pub unit_price: String,
    pub tax_rate: String,
}

impl LineForm {
    /// A fresh row with quantity 1 at the given rate.
    #[must_use]
    pub fn blank(tax_rate: &str) -> Self {
        Self {
            quantity: "1".to_string(),
            tax_rate: tax_rate.to_string(),
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.description.trim().is_empty()
            && self.hsn.trim().is_empty()
            && self.unit_price.trim().is_empty()
    }

    fn set(&mut self, field: &str, value: String) {
        match field {
            "description" => self.description = value,
            "hsn" => self.hsn = value,
            "quantity" => self.quantity = value,
            "unit_price" => self.unit_price = value,
            "tax_rate" => self.tax_rate = value,
            _ => {}
        }
    }

    fn to_line(&self, number: usize, errors: &mut Vec<String>) -> Option<InvoiceLine> {
        let before = errors.len();

        let description = self.description.trim().to_string();
        if description.is_empty() {
            errors.push(format!("Line {number}: description is required."));
        }
        let quantity = match self.quantity.trim().parse::<u32>() {
            Ok(q) if q > 0 => q,
            _ => {
                errors.push(format!("Line {number}: quantity must be a whole number above zero."));
                0
            }
        };
        let unit_price = match Money::parse(&self.unit_price) {
            Ok(p) if p > max_amount() => {
                errors.push(format!(
                    "Line {number}: unit price cannot exceed {}.",
                    max_amount().display()
                ));
                Money::ZERO
            }
            Ok(p) if !p.is_negative() => p,
            _ => {
                errors.push(format!("Line {number}: enter a valid unit price."));
                Money::ZERO
            }
        };
        let tax_rate = match non_empty(&self.tax_rate).map_or(Ok(Decimal::ZERO), |r| {
            Decimal::from_str(&r)
        }) {
            Ok(rate) if rate >= Decimal::ZERO && rate <= Decimal::ONE_HUNDRED => rate,
            _ => {
                errors.push(format!("Line {number}: GST rate must be between 0 and 100."));
                Decimal::ZERO
            }
        };

        (errors.len() == before).then(|| InvoiceLine {
            description,
            hsn: non_empty(&self.hsn),
            quantity,
            unit_price,
            tax_rate,
        })
    }
}

/// Offline invoice form values, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceForm {
    pub offline_customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_gstin: String,
    pub discount: String,
    pub supply_type: String,
    pub payment_mode: String,
    pub notes: String,
    pub lines: Vec<LineForm>,
}

impl InvoiceForm {
    /// Collect the submitted fields. Rows left completely blank are dropped.
    ///
    /// Every row is kept here so that [`Self::to_draft`] can report a form
    /// with more than [`MAX_LINES`] rows instead of losing the extra ones.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        let mut lines: BTreeMap<usize, LineForm> = BTreeMap::new();

        for (name, value) in pairs {
            if let Some((index, field)) = line_field(&name) {
                lines.entry(index).or_default().set(field, value);
                continue;
            }
            match name.as_str() {
                "offline_customer_id" => form.offline_customer_id = value,
                "customer_name" => form.customer_name = value,
                "customer_phone" => form.customer_phone = value,
                "customer_address" => form.customer_address = value,
                "customer_gstin" => form.customer_gstin = value,
                "discount" => form.discount = value,
                "supply_type" => form.supply_type = value,
                "payment_mode" => form.payment_mode = value,
                "notes" => form.notes = value,
                _ => {}
            }
        }

        form.lines = lines.into_values().filter(|l| !l.is_empty()).collect();
        form
    }

    /// Fill blank buyer fields from a saved walk-in customer.
    pub fn fill_customer(&mut self, customer: &OfflineCustomer) {
        fn fill(field: &mut String, value: Option<&str>) {
            if field.trim().is_empty() {
                if let Some(value) = value {
                    *field = value.to_string();
                }
            }
        }
        fill(&mut self.customer_name, Some(customer.name.as_str()));
        fill(&mut self.customer_phone, Some(customer.phone.as_str()));
        fill(&mut self.customer_address, customer.address.as_deref());
        fill(&mut self.customer_gstin, customer.gstin.as_deref());
    }

    fn supply(&self) -> SupplyType {
        SupplyType::from_str(self.supply_type.trim()).unwrap_or_default()
    }

    /// Parse the rows and compute the totals shown on screen.
    ///
    /// # Errors
    ///
    /// Returns every row problem found, or the first totalling problem.
    pub fn to_draft(&self) -> Result<(InvoiceDraft, InvoiceTotals), Vec<String>> {
        let mut errors = Vec::new();
        if self.lines.is_empty() {
            errors.push("Add at least one line.".to_string());
        }
        if self.lines.len() > MAX_LINES {
            errors.push(format!(
                "An invoice can have at most {MAX_LINES} lines; this one has {}.",
                self.lines.len()
            ));
            return Err(errors);
        }
        let lines: Vec<InvoiceLine> = self
            .lines
            .iter()
            .enumerate()
            .filter_map(|(i, l)| l.to_line(i + 1, &mut errors))
            .collect();

        let discount = match non_empty(&self.discount).map(|d| Money::parse(&d)) {
            None => Money::ZERO,
            Some(Ok(d)) if d > max_amount() => {
                errors.push(format!("Discount cannot exceed {}.", max_amount().display()));
                Money::ZERO
            }
            Some(Ok(d)) => d,
            Some(Err(_)) => {
                errors.push("Discount must be an amount.".to_string());
                Money::ZERO
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let draft = InvoiceDraft {
            lines,
            discount,
            supply_type: self.supply(),
        };
        let totals = draft.compute_totals().map_err(|e| vec![sentence(&e.to_string())])?;
        Ok((draft, totals))
    }

    /// Validate the whole form into the backend body.
    ///
    /// # Errors
    ///
    /// Returns every problem found.
    pub fn to_input(&self) -> Result<InvoiceInput, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.customer_name.trim().to_string();
        if name.is_empty() {
            errors.push("Customer name is required.".to_string());
        }
        let phone = match non_empty(&self.customer_phone).map(|p| Phone::parse(&p)) {
            None => None,
            Some(Ok(phone)) => Some(phone.as_str().to_string()),
            Some(Err(e)) => {
                errors.push(format!("Phone: {e}."));
                None
            }
        };
        let gstin = optional_gstin(&self.customer_gstin, &mut errors);
        let payment_mode = PaymentMode::from_str(self.payment_mode.trim()).ok();
        if payment_mode.is_none() {
            errors.push("Choose a payment mode.".to_string());
        }

        let draft = match self.to_draft() {
            Ok(draft) => Some(draft),
            Err(mut more) => {
                errors.append(&mut more);
                None
            }
        };

        match (draft, payment_mode) {
            (Some((draft, totals)), Some(payment_mode)) if errors.is_empty() => Ok(InvoiceInput {
                customer: InvoiceCustomer {
                    name,
                    phone,
                    address: non_empty(&self.customer_address),
                    gstin,
                },
                offline_customer_id: non_empty(&self.offline_customer_id)
                    .map(OfflineCustomerId::new),
                lines: draft.lines,
                discount: totals.discount,
                supply_type: draft.supply_type,
                payment_mode,
                notes: non_empty(&self.notes),
                subtotal: totals.subtotal,
                tax_total: totals.tax_total,
                round_off: totals.round_off,
                total: totals.payable,
            }),
            _ => Err(errors),
        }
    }
}

/// Split `line-3-unit_price` into `(3, "unit_price")`.
fn line_field(name: &str) -> Option<(usize, &str)> {
    let rest = name.strip_prefix("line-")?;
    let (index, field) = rest.split_once('-')?;
    Some((index.parse().ok()?, field))
}

/// Capitalize an error message and end it with a full stop.
fn sentence(message: &str) -> String {
    let mut chars = message.chars();
    let mut out: String = chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default();
    if !out.ends_with('.') {
        out.push('.');
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn pairs(raw: &str) -> Vec<(String, String)> {
        serde_urlencoded::from_str(raw).unwrap()
    }

    #[test]
    fn test_lines_kept_in_index_order_with_gaps() {
        let form = InvoiceForm::from_pairs(pairs(
            "customer_name=Asha&payment_mode=cash\
             &line-3-description=Tulsi+Tea&line-3-quantity=1&line-3-unit_price=150&line-3-tax_rate=5\
             &line-0-description=Neem+Oil&line-0-quantity=2&line-0-unit_price=249&line-0-tax_rate=18\
             &line-1-description=&line-1-quantity=1&line-1-unit_price=&line-1-tax_rate=18",
        ));
        assert_eq!(form.lines.len(), 2);
        assert_eq!(form.lines[0].description, "Neem Oil");
        assert_eq!(form.lines[1].description, "Tulsi Tea");
    }

    #[test]
    fn test_to_input_carries_computed_totals() {
        let form = InvoiceForm::from_pairs(pairs(
            "customer_name=Asha+Menon&customer_phone=098765+43210&payment_mode=upi\
             &supply_type=intra_state&discount=&notes=\
             &line-0-description=Neem+Oil&line-0-hsn=3304&line-0-quantity=2\
             &line-0-unit_price=249&line-0-tax_rate=18",
        ));
        let input = form.to_input().unwrap();
        assert_eq!(input.customer.phone.as_deref(), Some("9876543210"));
        assert_eq!(input.lines[0].hsn.as_deref(), Some("3304"));
        // 498.00 + 89.64 GST = 587.64, payable 588
        assert_eq!(input.subtotal, Money::from_rupees(498));
        assert_eq!(input.tax_total, Money::from_paise(8964));
        assert_eq!(input.total, Money::from_rupees(588));
        assert_eq!(input.round_off, Money::from_paise(36));
        assert_eq!(input.payment_mode, PaymentMode::Upi);
        assert_eq!(input.notes, None);
    }

    #[test]
    fn test_line_errors_are_numbered() {
        let form = InvoiceForm::from_pairs(pairs(
            "customer_name=Asha&payment_mode=cash\
             &line-0-description=Oil&line-0-quantity=0&line-0-unit_price=10\
             &line-1-description=&line-1-quantity=1&line-1-unit_price=abc",
        ));
        let errors = form.to_input().unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Line 1: quantity must be a whole number above zero.",
                "Line 2: description is required.",
                "Line 2: enter a valid unit price.",
            ]
        );
    }

    #[test]
    fn test_discount_over_total_reported() {
        let form = InvoiceForm::from_pairs(pairs(
            "customer_name=Asha&payment_mode=card&discount=500\
             &line-0-description=Soap&line-0-quantity=1&line-0-unit_price=100&line-0-tax_rate=0",
        ));
        let errors = form.to_input().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Discount of ₹500.00 exceeds"));
    }

    #[test]
    fn test_oversized_amounts_are_form_errors() {
        let form = InvoiceForm::from_pairs(pairs(
            "customer_name=Asha&payment_mode=cash\
             &line-0-description=Bulk&line-0-quantity=4000000000\
             &line-0-unit_price=79228162514264337593543950&line-0-tax_rate=18",
        ));
        assert_eq!(
            form.to_draft().unwrap_err(),
            vec!["Line 1: unit price cannot exceed ₹1,00,00,00,000.00."]
        );

        let form = InvoiceForm::from_pairs(pairs(
            "customer_name=Asha&payment_mode=cash\
             &line-0-description=Bulk&line-0-quantity=4000000000\
             &line-0-unit_price=1000000000&line-0-tax_rate=18",
        ));
        assert_eq!(
            form.to_draft().unwrap_err(),
            vec!["Invoice amount exceeds the ₹100 crore limit."]
        );

        let form = InvoiceForm::from_pairs(pairs(
            "customer_name=Asha&payment_mode=cash&discount=99999999999\
             &line-0-description=Soap&line-0-quantity=1&line-0-unit_price=100",
        ));
        assert_eq!(
            form.to_draft().unwrap_err(),
            vec!["Discount cannot exceed ₹1,00,00,00,000.00."]
        );
    }

    #[test]
    fn test_invalid_gstin_rejected() {
        let form = InvoiceForm::from_pairs(pairs(
            "customer_name=Asha&payment_mode=cash&customer_gstin=abc\
             &line-0-description=Soap&line-0-quantity=1&line-0-unit_price=100",
        ));
        assert_eq!(
            form.to_input().unwrap_err(),
            vec!["GSTIN must be 15 letters and digits."]
        );

        let form = InvoiceForm::from_pairs(pairs(
            "customer_name=Asha&payment_mode=cash&customer_gstin=29abcde1234f1z5\
             &line-0-description=Soap&line-0-quantity=1&line-0-unit_price=100",
        ));
        assert_eq!(
            form.to_input().unwrap().customer.gstin.as_deref(),
            Some("29ABCDE1234F1Z5")
        );
    }

    #[test]
    fn test_rows_beyond_limit_are_an_error() {
        let rows: String = (0..=MAX_LINES)
            .map(|i| format!("&line-{i}-description=Item+{i}&line-{i}-quantity=1&line-{i}-unit_price=10"))
            .collect();
        let form = InvoiceForm::from_pairs(pairs(&format!("customer_name=Asha&payment_mode=cash{rows}")));
        assert_eq!(form.lines.len(), MAX_LINES + 1);
        assert_eq!(
            form.to_input().unwrap_err(),
            vec!["An invoice can have at most 100 lines; this one has 101."]
        );
    }

    #[test]
    fn test_fill_customer_keeps_typed_values() {
        let customer: OfflineCustomer = serde_json::from_value(serde_json::json!({
            "id": "oc1",
            "name": "Ravi Kumar",
            "phone": "9876543210",
            "gstin": "29ABCDE1234F1Z5"
        }))
        .unwrap();
        let mut form = InvoiceForm {
            customer_name: "Ravi K (shop)".to_string(),
            ..InvoiceForm::default()
        };
        form.fill_customer(&customer);
        assert_eq!(form.customer_name, "Ravi K (shop)");
        assert_eq!(form.customer_phone, "9876543210");
        assert_eq!(form.customer_gstin, "29ABCDE1234F1Z5");
        assert_eq!(form.customer_address, "");
    }

    #[test]
    fn test_line_field() {
        assert_eq!(line_field("line-12-unit_price"), Some((12, "unit_price")));
        assert_eq!(line_field("line-x-unit_price"), None);
        assert_eq!(line_field("customer_name"), None);
    }
}
