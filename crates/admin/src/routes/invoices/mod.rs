//! Offline (walk-in) invoice route handlers.
//!
//! The form computes GST totals locally; the backend stores the invoice and
//! assigns its number. Printing uses the browser's print dialog with a
//! print stylesheet, so "Save as PDF" doubles as the PDF download.

mod form;
mod print;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ayucan_core::invoice::InvoiceTotals;
use ayucan_core::{InvoiceId, PaymentMode, SupplyType};

use crate::{
    api::{ApiError, ListQuery, OfflineInvoice, Page},
    components::{DataTableConfig, FilterOption, Pagination, data_table::invoices_table_config},
    error::AppError,
    filters,
    middleware::{AdminSession, RequireAdminAuth},
    services::{Flash, set_flash, take_flash},
    state::AppState,
};

use super::{
    AdminUserView, deny_delete, finish_action, format_date, or_toast, products::GST_RATES,
    render, select_options,
};

pub use form::{InvoiceForm, LineForm};
pub use print::InvoiceDocument;

/// GST rate preselected on new rows.
const DEFAULT_TAX_RATE: &str = "18";

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct InvoicesQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub payment_mode: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl InvoicesQuery {
    /// Backend list query for these parameters.
    #[must_use]
    pub fn to_list_query(&self, limit: u32) -> ListQuery {
        ListQuery::new(self.page.unwrap_or(1), limit)
            .search(self.search.as_deref())
            .filter("payment_mode", self.payment_mode.as_deref())
            .filter("from", self.from.as_deref())
            .filter("to", self.to.as_deref())
    }
}

/// Invoice row for the list table.
#[derive(Debug, Clone)]
pub struct InvoiceRowView {
    pub id: String,
    pub number: String,
    pub date: String,
    pub customer_name: String,
    pub payment_mode: &'static str,
    pub payment_class: &'static str,
    pub total: String,
}

impl From<&OfflineInvoice> for InvoiceRowView {
    fn from(invoice: &OfflineInvoice) -> Self {
        Self {
            id: invoice.id.to_string(),
            number: invoice.invoice_number.clone(),
            date: format_date(&invoice.created_at),
            customer_name: invoice.customer.name.clone(),
            payment_mode: invoice.payment_mode.label(),
            payment_class: invoice.payment_mode.badge_class(),
            total: invoice.total.display(),
        }
    }
}

/// Invoices list page template.
#[derive(Template)]
#[template(path = "invoices/index.html")]
pub struct InvoicesIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub table: DataTableConfig,
    pub invoices: Vec<InvoiceRowView>,
    pub pagination: Pagination,
    pub export_href: String,
}

/// One editable row on the invoice form.
#[derive(Debug, Clone)]
pub struct LineRowView {
    pub index: usize,
    pub line: LineForm,
    pub tax_options: Vec<FilterOption>,
}

/// Totals shown under the lines after "Preview totals".
#[derive(Debug, Clone)]
pub struct TotalsView {
    pub intra_state: bool,
    pub subtotal: String,
    pub cgst: String,
    pub sgst: String,
    pub igst: String,
    pub tax_total: String,
    pub discount: String,
    pub round_off: String,
    pub payable: String,
    pub amount_in_words: String,
}

impl TotalsView {
    fn new(totals: &InvoiceTotals, supply_type: SupplyType) -> Self {
        Self {
            intra_state: supply_type == SupplyType::IntraState,
            subtotal: totals.subtotal.display(),
            cgst: totals.cgst.display(),
            sgst: totals.sgst.display(),
            igst: totals.igst.display(),
            tax_total: totals.tax_total.display(),
            discount: totals.discount.display(),
            round_off: totals.round_off.display(),
            payable: totals.payable.display(),
            amount_in_words: totals.amount_in_words.clone(),
        }
    }
}

/// New invoice page template.
#[derive(Template)]
#[template(path = "invoices/new.html")]
pub struct InvoiceFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub form: InvoiceForm,
    pub lines: Vec<LineRowView>,
    /// Index the browser uses for the next added row.
    pub next_index: usize,
    pub errors: Vec<String>,
    pub customers: Vec<FilterOption>,
    pub supply_types: Vec<FilterOption>,
    pub payment_modes: Vec<FilterOption>,
    pub tax_rates: Vec<FilterOption>,
    pub totals: Option<TotalsView>,
}

/// Invoice detail page template.
#[derive(Template)]
#[template(path = "invoices/show.html")]
pub struct InvoiceShowTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub invoice: InvoiceRowView,
    pub document: Option<InvoiceDocument>,
}

/// Printable invoice, rendered without the dashboard chrome.
#[derive(Template, WebTemplate)]
#[template(path = "invoices/print.html")]
pub struct InvoicePrintTemplate {
    pub document: InvoiceDocument,
}

/// New invoice query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct NewInvoiceQuery {
    pub offline_customer_id: Option<String>,
}

/// Build the invoices router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(index).post(create))
        .route("/invoices/new", get(new))
        .route("/invoices/{id}", get(show))
        .route("/invoices/{id}/print", get(print))
        .route("/invoices/{id}/delete", post(delete))
}

/// Invoices list page handler.
#[instrument(skip(auth, state, session))]
pub async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<InvoicesQuery>,
) -> Result<Html<String>, AppError> {
    let limit = state.config().page_size;
    let list_query = query.to_list_query(limit);
    let result = auth.api(state.api()).list_invoices(&list_query).await;

    let mut toast = take_flash(&session).await;
    let invoices = or_toast(result, "invoices", &mut toast, || Page::empty(limit))?;

    let table = invoices_table_config().with_values(query.search.as_deref(), |key| match key {
        "payment_mode" => query.payment_mode.as_deref(),
        "from" => query.from.as_deref(),
        "to" => query.to.as_deref(),
        _ => None,
    });

    let mut export_query = list_query.clone();
    export_query.page = 1;

    let template = InvoicesIndexTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/invoices".to_string(),
        toast,
        table,
        pagination: Pagination::new("/invoices", &list_query, &invoices),
        invoices: invoices.data.iter().map(InvoiceRowView::from).collect(),
        export_href: format!("/export/invoices.csv?{}", export_query.to_query_string()),
    };
    Ok(render(&template))
}

/// New invoice page.
#[instrument(skip(auth, state, session))]
pub async fn new(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NewInvoiceQuery>,
) -> Result<Html<String>, AppError> {
    let mut form = InvoiceForm {
        offline_customer_id: query.offline_customer_id.unwrap_or_default(),
        supply_type: SupplyType::IntraState.as_str().to_string(),
        payment_mode: PaymentMode::Cash.as_str().to_string(),
        lines: vec![LineForm::blank(DEFAULT_TAX_RATE)],
        ..InvoiceForm::default()
    };
    let toast = take_flash(&session).await;
    form_page(&state, &auth, &mut form, vec![], None, toast).await
}

/// Create (or preview) an invoice.
///
/// The "Preview totals" button submits `intent=preview`, which re-renders
/// the form with computed totals instead of saving.
#[instrument(skip(auth, state, session, pairs))]
pub async fn create(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let preview = pairs.iter().any(|(k, v)| k == "intent" && v == "preview");
    let mut form = InvoiceForm::from_pairs(pairs);

    if preview {
        let (totals, errors) = match form.to_draft() {
            Ok((draft, totals)) => (Some(TotalsView::new(&totals, draft.supply_type)), vec![]),
            Err(errors) => (None, errors),
        };
        return Ok(form_page(&state, &auth, &mut form, errors, totals, None)
            .await?
            .into_response());
    }

    if !form.offline_customer_id.trim().is_empty() {
        let customers = auth.api(state.api()).all_offline_customers().await;
        match customers {
            Ok(customers) => {
                if let Some(customer) = customers
                    .iter()
                    .find(|c| c.id.as_str() == form.offline_customer_id.trim())
                {
                    form.fill_customer(customer);
                }
            }
            Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
            Err(e) => tracing::warn!(error = %e, "Could not load walk-in customer for invoice"),
        }
    }

    let input = match form.to_input() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(form_page(&state, &auth, &mut form, errors, None, None)
                .await?
                .into_response());
        }
    };

    match auth.api(state.api()).create_invoice(&input).await {
        Ok(invoice) => {
            tracing::info!(
                invoice_id = %invoice.id,
                number = %invoice.invoice_number,
                total = %invoice.total,
                "Offline invoice created"
            );
            set_flash(
                &session,
                Flash::success(format!("Invoice {} saved.", invoice.invoice_number)),
            )
            .await;
            Ok(Redirect::to(&format!("/invoices/{}", invoice.id)).into_response())
        }
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            let errors = vec![e.user_message()];
            Ok(form_page(&state, &auth, &mut form, errors, None, None)
                .await?
                .into_response())
        }
    }
}

/// Invoice detail page handler.
#[instrument(skip(auth, state, session))]
pub async fn show(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<InvoiceId>,
) -> Result<Html<String>, AppError> {
    let invoice = auth.api(state.api()).get_invoice(&id).await?;
    let mut toast = take_flash(&session).await;
    let document = InvoiceDocument::new(&invoice, &state.config().seller);
    if document.is_none() {
        toast.get_or_insert_with(|| {
            Flash::error("This invoice's lines could not be totalled; showing stored values.")
        });
    }

    let template = InvoiceShowTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/invoices".to_string(),
        toast,
        invoice: InvoiceRowView::from(&invoice),
        document,
    };
    Ok(render(&template))
}

/// Printable invoice.
#[instrument(skip(auth, state))]
pub async fn print(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
) -> Result<Response, AppError> {
    let invoice = auth.api(state.api()).get_invoice(&id).await?;
    let Some(document) = InvoiceDocument::new(&invoice, &state.config().seller) else {
        return Ok(Redirect::to(&format!("/invoices/{id}")).into_response());
    };
    Ok(InvoicePrintTemplate { document }.into_response())
}

/// Delete invoice handler.
#[instrument(skip(auth, state, session))]
pub async fn delete(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<InvoiceId>,
) -> Result<Redirect, AppError> {
    let back = format!("/invoices/{id}");
    if let Some(denied) = deny_delete(&session, &auth.admin, &back).await {
        return Ok(denied);
    }
    let result = auth.api(state.api()).delete_invoice(&id).await;
    finish_action(&session, result, "Invoice deleted.", "/invoices", &back).await
}

async fn form_page(
    state: &AppState,
    auth: &AdminSession,
    form: &mut InvoiceForm,
    errors: Vec<String>,
    totals: Option<TotalsView>,
    toast: Option<Flash>,
) -> Result<Html<String>, AppError> {
    let mut toast = toast;
    let customers = or_toast(
        auth.api(state.api()).all_offline_customers().await,
        "walk-in customers",
        &mut toast,
        Default::default,
    )?;

    if form.lines.is_empty() {
        form.lines.push(LineForm::blank(DEFAULT_TAX_RATE));
    }
    let tax_rates = |current: &str| {
        select_options(GST_RATES.iter().map(|r| (*r, format!("{r}%"))), current)
    };
    let lines: Vec<LineRowView> = form
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| LineRowView {
            index,
            line: line.clone(),
            tax_options: tax_rates(line.tax_rate.trim()),
        })
        .collect();

    let template = InvoiceFormTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/invoices".to_string(),
        toast,
        next_index: lines.len(),
        lines,
        errors,
        customers: select_options(
            customers
                .iter()
                .map(|c| (c.id.as_str(), format!("{} ({})", c.name, c.phone))),
            form.offline_customer_id.trim(),
        ),
        supply_types: select_options(
            SupplyType::ALL.iter().map(|s| (s.as_str(), s.label())),
            form.supply_type.trim(),
        ),
        payment_modes: select_options(
            PaymentMode::ALL.iter().map(|m| (m.as_str(), m.label())),
            form.payment_mode.trim(),
        ),
        tax_rates: tax_rates(DEFAULT_TAX_RATE),
        totals,
        form: form.clone(),
    };
    Ok(render(&template))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invoices_query_to_list_query() {
        let query: InvoicesQuery =
            serde_urlencoded::from_str("search=AYO&payment_mode=upi&from=&to=2026-03-31").unwrap();
        assert_eq!(
            query.to_list_query(20).to_query_string(),
            "page=1&limit=20&search=AYO&payment_mode=upi&to=2026-03-31"
        );
    }

    #[test]
    fn test_row_view() {
        let invoice: OfflineInvoice = serde_json::from_value(serde_json::json!({
            "id": "inv1",
            "invoice_number": "AYO-0042",
            "customer": {"name": "Asha Menon"},
            "lines": [],
            "payment_mode": "upi",
            "total": "1249.50",
            "created_at": "2026-03-14T20:00:00Z"
        }))
        .unwrap();
        let row = InvoiceRowView::from(&invoice);
        assert_eq!(row.payment_mode, "UPI");
        assert_eq!(row.total, "₹1,249.50");
        // 20:00 UTC is the next morning in IST
        assert_eq!(row.date, "15 Mar 2026");
    }
}
