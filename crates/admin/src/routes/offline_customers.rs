//! Walk-in customer route handlers.
//!
//! Walk-in customers are billed at the counter and picked on the invoice
//! form; they never sign in to the storefront.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ayucan_core::{Email, OfflineCustomerId, Phone};

use crate::{
    api::{ApiError, ListQuery, OfflineCustomer, OfflineCustomerInput, Page},
    components::{DataTableConfig, Pagination, data_table::offline_customers_table_config},
    error::AppError,
    filters,
    middleware::{AdminSession, RequireAdminAuth},
    services::{Flash, set_flash, take_flash},
    state::AppState,
};

use super::{
    AdminUserView, deny_delete, finish_action, non_empty, optional_gstin, or_toast, render,
};

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct OfflineCustomersQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
}

/// Walk-in customer row.
#[derive(Debug, Clone)]
pub struct OfflineCustomerRowView {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub gstin: String,
}

impl From<&OfflineCustomer> for OfflineCustomerRowView {
    fn from(customer: &OfflineCustomer) -> Self {
        Self {
            id: customer.id.to_string(),
            name: customer.name.clone(),
            phone: Phone::parse(&customer.phone)
                .map_or_else(|_| customer.phone.clone(), |p| p.display()),
            email: customer.email.clone().unwrap_or_default(),
            gstin: customer.gstin.clone().unwrap_or_default(),
        }
    }
}

/// Walk-in customers list page template.
#[derive(Template)]
#[template(path = "offline_customers/index.html")]
pub struct OfflineCustomersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub table: DataTableConfig,
    pub customers: Vec<OfflineCustomerRowView>,
    pub pagination: Pagination,
}

/// Walk-in customer form values, as typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfflineCustomerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub gstin: String,
}

impl OfflineCustomerForm {
    fn from_customer(customer: &OfflineCustomer) -> Self {
        Self {
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone().unwrap_or_default(),
            address: customer.address.clone().unwrap_or_default(),
            gstin: customer.gstin.clone().unwrap_or_default(),
        }
    }

    /// Validate and convert into the backend body.
    ///
    /// # Errors
    ///
    /// Returns every problem found.
    pub fn to_input(&self) -> Result<OfflineCustomerInput, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.push("Name is required.".to_string());
        }

        let phone = match Phone::parse(&self.phone) {
            Ok(phone) => Some(phone),
            Err(e) => {
                errors.push(format!("Phone: {e}."));
                None
            }
        };

        let email = match non_empty(&self.email).map(|e| Email::parse(&e)).transpose() {
            Ok(email) => email,
            Err(e) => {
                errors.push(format!("Email: {e}."));
                None
            }
        };

        let gstin = optional_gstin(&self.gstin, &mut errors);

        match phone {
            Some(phone) if errors.is_empty() => Ok(OfflineCustomerInput {
                name,
                phone: phone.as_str().to_string(),
                email: email.map(|e| e.as_str().to_string()),
                address: non_empty(&self.address),
                gstin,
            }),
            _ => Err(errors),
        }
    }
}

/// Walk-in customer create/edit page template.
#[derive(Template)]
#[template(path = "offline_customers/form.html")]
pub struct OfflineCustomerFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub customer_id: Option<String>,
    pub form: OfflineCustomerForm,
    pub errors: Vec<String>,
}

/// Build the walk-in customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/offline-customers", get(index).post(create))
        .route("/offline-customers/new", get(new))
        .route("/offline-customers/{id}", post(update))
        .route("/offline-customers/{id}/edit", get(edit))
        .route("/offline-customers/{id}/delete", post(delete))
}

/// Walk-in customers list page handler.
#[instrument(skip(auth, state, session))]
pub async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OfflineCustomersQuery>,
) -> Result<Html<String>, AppError> {
    let limit = state.config().page_size;
    let list_query =
        ListQuery::new(query.page.unwrap_or(1), limit).search(query.search.as_deref());
    let result = auth
        .api(state.api())
        .list_offline_customers(&list_query)
        .await;

    let mut toast = take_flash(&session).await;
    let customers = or_toast(result, "walk-in customers", &mut toast, || {
        Page::empty(limit)
    })?;

    let template = OfflineCustomersIndexTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/offline-customers".to_string(),
        toast,
        table: offline_customers_table_config().with_values(query.search.as_deref(), |_| None),
        pagination: Pagination::new("/offline-customers", &list_query, &customers),
        customers: customers
            .data
            .iter()
            .map(OfflineCustomerRowView::from)
            .collect(),
    };
    Ok(render(&template))
}

/// New walk-in customer page.
#[instrument(skip(auth, session))]
pub async fn new(
    RequireAdminAuth(auth): RequireAdminAuth,
    session: Session,
) -> Html<String> {
    let toast = take_flash(&session).await;
    form_page(&auth, None, OfflineCustomerForm::default(), vec![], toast)
}

/// Edit walk-in customer page.
#[instrument(skip(auth, state, session))]
pub async fn edit(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OfflineCustomerId>,
) -> Result<Html<String>, AppError> {
    let customer = auth.api(state.api()).get_offline_customer(&id).await?;
    let toast = take_flash(&session).await;
    Ok(form_page(
        &auth,
        Some(&id),
        OfflineCustomerForm::from_customer(&customer),
        vec![],
        toast,
    ))
}

/// Create walk-in customer handler.
#[instrument(skip(auth, state, session, form))]
pub async fn create(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<OfflineCustomerForm>,
) -> Result<Response, AppError> {
    let input = match form.to_input() {
        Ok(input) => input,
        Err(errors) => return Ok(form_page(&auth, None, form, errors, None).into_response()),
    };
    match auth.api(state.api()).create_offline_customer(&input).await {
        Ok(customer) => {
            tracing::info!(offline_customer_id = %customer.id, "Walk-in customer created");
            set_flash(&session, Flash::success(format!("Added {}.", customer.name))).await;
            Ok(Redirect::to("/offline-customers").into_response())
        }
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            let errors = vec![e.user_message()];
            Ok(form_page(&auth, None, form, errors, None).into_response())
        }
    }
}

/// Update walk-in customer handler.
#[instrument(skip(auth, state, session, form))]
pub async fn update(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OfflineCustomerId>,
    Form(form): Form<OfflineCustomerForm>,
) -> Result<Response, AppError> {
    let input = match form.to_input() {
        Ok(input) => input,
        Err(errors) => return Ok(form_page(&auth, Some(&id), form, errors, None).into_response()),
    };
    match auth
        .api(state.api())
        .update_offline_customer(&id, &input)
        .await
    {
        Ok(_) => {
            tracing::info!(offline_customer_id = %id, "Walk-in customer updated");
            set_flash(&session, Flash::success("Customer saved.")).await;
            Ok(Redirect::to("/offline-customers").into_response())
        }
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            let errors = vec![e.user_message()];
            Ok(form_page(&auth, Some(&id), form, errors, None).into_response())
        }
    }
}

/// Delete walk-in customer handler.
#[instrument(skip(auth, state, session))]
pub async fn delete(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OfflineCustomerId>,
) -> Result<Redirect, AppError> {
    if let Some(denied) = deny_delete(&session, &auth.admin, "/offline-customers").await {
        return Ok(denied);
    }
    let result = auth.api(state.api()).delete_offline_customer(&id).await;
    finish_action(
        &session,
        result,
        "Customer deleted.",
        "/offline-customers",
        "/offline-customers",
    )
    .await
}

fn form_page(
    auth: &AdminSession,
    customer_id: Option<&OfflineCustomerId>,
    form: OfflineCustomerForm,
    errors: Vec<String>,
    toast: Option<Flash>,
) -> Html<String> {
    render(&OfflineCustomerFormTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/offline-customers".to_string(),
        toast,
        customer_id: customer_id.map(ToString::to_string),
        form,
        errors,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(phone: &str, email: &str, gstin: &str) -> OfflineCustomerForm {
        OfflineCustomerForm {
            name: "Ravi Kumar".to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
            address: "  ".to_string(),
            gstin: gstin.to_string(),
        }
    }

    #[test]
    fn test_phone_is_normalized() {
        let input = form("+91 98765-43210", "", "").to_input().unwrap();
        assert_eq!(input.phone, "9876543210");
        assert_eq!(input.email, None);
        assert_eq!(input.address, None);
    }

    #[test]
    fn test_gstin_uppercased() {
        let input = form("9876543210", "Ravi@Example.com", "29abcde1234f1z5")
            .to_input()
            .unwrap();
        assert_eq!(input.gstin.as_deref(), Some("29ABCDE1234F1Z5"));
        assert_eq!(input.email.as_deref(), Some("ravi@example.com"));
    }

    #[test]
    fn test_collects_every_error() {
        let mut bad = form("12345", "not-an-email", "29ABC");
        bad.name = String::new();
        let errors = bad.to_input().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0], "Name is required.");
    }
}
