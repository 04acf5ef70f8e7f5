//! Offline invoice endpoints.

use tracing::instrument;

use ayucan_core::InvoiceId;

use super::{ApiError, AuthedApi, InvoiceInput, ListQuery, OfflineInvoice, Page};

impl AuthedApi<'_> {
    /// List invoices. Filters: `payment_mode`, `from`, `to`.
    #[instrument(skip(self))]
    pub async fn list_invoices(&self, query: &ListQuery) -> Result<Page<OfflineInvoice>, ApiError> {
        self.get_page("offline-invoices", query).await
    }

    /// Every invoice matching the filters, across all pages.
    #[instrument(skip(self))]
    pub async fn all_invoices(&self, query: ListQuery) -> Result<Vec<OfflineInvoice>, ApiError> {
        self.fetch_all("offline-invoices", query).await
    }

    #[instrument(skip(self))]
    pub async fn get_invoice(&self, id: &InvoiceId) -> Result<OfflineInvoice, ApiError> {
        self.get(&format!("offline-invoices/{id}"), None).await
    }

    /// Store an invoice. The backend assigns the invoice number.
    #[instrument(skip(self, input), fields(lines = input.lines.len(), total = %input.total))]
    pub async fn create_invoice(&self, input: &InvoiceInput) -> Result<OfflineInvoice, ApiError> {
        self.post("offline-invoices", input).await
    }

    #[instrument(skip(self))]
    pub async fn delete_invoice(&self, id: &InvoiceId) -> Result<(), ApiError> {
        self.delete(&format!("offline-invoices/{id}")).await
    }
}
