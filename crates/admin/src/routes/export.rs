//! CSV export route handler.
//!
//! Exports walk every page of the filtered listing, so the file matches what
//! the list page shows without its paging.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    api::{ApiError, ListQuery},
    error::AppError,
    middleware::RequireAdminAuth,
    services::{CsvRow, ExportError, Flash, csv_download, set_flash, to_csv},
    state::AppState,
};

/// Exportable datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Products,
    Orders,
    Customers,
    OfflineCustomers,
    Invoices,
}

impl ExportKind {
    /// Match a requested file name (`orders.csv`).
    #[must_use]
    pub fn from_file_name(file: &str) -> Option<Self> {
        match file.strip_suffix(".csv")? {
            "products" => Some(Self::Products),
            "orders" => Some(Self::Orders),
            "customers" => Some(Self::Customers),
            "offline-customers" => Some(Self::OfflineCustomers),
            "invoices" => Some(Self::Invoices),
            _ => None,
        }
    }

    const fn stem(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Customers => "customers",
            Self::OfflineCustomers => "offline-customers",
            Self::Invoices => "invoices",
        }
    }

    /// List page to return to when an export fails.
    const fn list_path(self) -> &'static str {
        match self {
            Self::Products => "/products",
            Self::Orders => "/orders",
            Self::Customers => "/customers",
            Self::OfflineCustomers => "/offline-customers",
            Self::Invoices => "/invoices",
        }
    }
}

/// Rebuild the list filters from the export link, ignoring paging.
#[must_use]
pub fn export_query(params: &[(String, String)]) -> ListQuery {
    params
        .iter()
        .fold(ListQuery::new(1, 0), |query, (key, value)| match key.as_str() {
            "page" | "limit" => query,
            "search" => query.search(Some(value)),
            _ => query.filter(key, Some(value)),
        })
}

/// Build the export router.
pub fn router() -> Router<AppState> {
    Router::new().route("/export/{file}", get(export))
}

/// Download a dataset as CSV.
#[instrument(skip(auth, state, session, params))]
pub async fn export(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(file): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let kind = ExportKind::from_file_name(&file)
        .ok_or_else(|| AppError::NotFound(format!("export {file}")))?;
    let query = export_query(&params);
    let api = auth.api(state.api());

    let body = match kind {
        ExportKind::Products => rows_to_csv(api.all_products(query).await),
        ExportKind::Orders => rows_to_csv(api.all_orders(query).await),
        ExportKind::Customers => rows_to_csv(api.all_customers(query).await),
        ExportKind::OfflineCustomers => rows_to_csv(
            api.all_offline_customers()
                .await
                .map(|customers| customers.to_vec()),
        ),
        ExportKind::Invoices => rows_to_csv(api.all_invoices(query).await),
    };

    match body {
        Ok(Ok(body)) => {
            let file_name = format!(
                "{}-{}.csv",
                kind.stem(),
                chrono::Utc::now().format("%Y-%m-%d")
            );
            tracing::info!(file = %file_name, bytes = body.len(), "CSV exported");
            Ok(csv_download(&file_name, body))
        }
        Ok(Err(e)) => Err(e.into()),
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, export = kind.stem(), "Export failed");
            set_flash(
                &session,
                Flash::error(format!("Export failed. {}", e.user_message())),
            )
            .await;
            Ok(Redirect::to(kind.list_path()).into_response())
        }
    }
}

fn rows_to_csv<R: CsvRow>(
    rows: Result<Vec<R>, ApiError>,
) -> Result<Result<Vec<u8>, ExportError>, ApiError> {
    rows.map(|rows| to_csv(&rows))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_name() {
        assert_eq!(
            ExportKind::from_file_name("offline-customers.csv"),
            Some(ExportKind::OfflineCustomers)
        );
        assert_eq!(ExportKind::from_file_name("orders.json"), None);
        assert_eq!(ExportKind::from_file_name("coupons.csv"), None);
    }

    #[test]
    fn test_export_query_drops_paging() {
        let params: Vec<(String, String)> =
            serde_urlencoded::from_str("page=3&limit=20&search=neem&status=active&category_id=")
                .unwrap();
        let query = export_query(&params);
        assert_eq!(query.page, 1);
        assert_eq!(query.search.as_deref(), Some("neem"));
        assert_eq!(query.filters, vec![("status".to_string(), "active".to_string())]);
    }
}
