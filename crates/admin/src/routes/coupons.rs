//! Coupon management route handlers.

use std::str::FromStr;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ayucan_core::{CouponId, DiscountType, Money};

use crate::{
    api::{ApiError, Coupon, CouponInput, ListQuery, Page},
    components::{DataTableConfig, FilterOption, Pagination, data_table::coupons_table_config},
    error::AppError,
    filters,
    middleware::{AdminSession, RequireAdminAuth},
    services::{Flash, set_flash, take_flash},
    state::AppState,
};

use super::{AdminUserView, deny_delete, finish_action, non_empty, or_toast, render, select_options};

/// Date format of `<input type="date">`.
const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CouponsQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub is_active: Option<String>,
}

/// Coupon row for the list table.
#[derive(Debug, Clone)]
pub struct CouponRowView {
    pub id: String,
    pub code: String,
    pub description: String,
    pub discount: String,
    pub validity: String,
    pub usage: String,
    pub is_active: bool,
}

impl From<&Coupon> for CouponRowView {
    fn from(coupon: &Coupon) -> Self {
        Self {
            id: coupon.id.to_string(),
            code: coupon.code.clone(),
            description: coupon.description.clone().unwrap_or_default(),
            discount: discount_label(coupon),
            validity: validity_label(coupon.valid_from, coupon.valid_until),
            usage: coupon.usage_limit.map_or_else(
                || coupon.used_count.to_string(),
                |limit| format!("{} / {limit}", coupon.used_count),
            ),
            is_active: coupon.is_active,
        }
    }
}

/// Human summary of a coupon's value (`10% off, up to ₹200.00`).
#[must_use]
pub fn discount_label(coupon: &Coupon) -> String {
    let mut label = match coupon.discount_type {
        DiscountType::Percentage => format!("{}% off", coupon.value.normalize()),
        DiscountType::Flat => format!("{} off", Money::new(coupon.value).display()),
    };
    if let Some(max) = coupon.max_discount {
        label.push_str(&format!(", up to {}", max.display()));
    }
    if !coupon.min_order_amount.is_zero() {
        label.push_str(&format!(" on {}+", coupon.min_order_amount.display()));
    }
    label
}

fn validity_label(from: Option<NaiveDate>, until: Option<NaiveDate>) -> String {
    let fmt = |d: NaiveDate| d.format("%d %b %Y").to_string();
    match (from, until) {
        (None, None) => "Always".to_string(),
        (Some(from), None) => format!("From {}", fmt(from)),
        (None, Some(until)) => format!("Until {}", fmt(until)),
        (Some(from), Some(until)) => format!("{} – {}", fmt(from), fmt(until)),
    }
}

/// Coupons list page template.
#[derive(Template)]
#[template(path = "coupons/index.html")]
pub struct CouponsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub table: DataTableConfig,
    pub coupons: Vec<CouponRowView>,
    pub pagination: Pagination,
}

/// Coupon form values, as typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CouponForm {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount_type: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub min_order_amount: String,
    #[serde(default)]
    pub max_discount: String,
    #[serde(default)]
    pub usage_limit: String,
    #[serde(default)]
    pub valid_from: String,
    #[serde(default)]
    pub valid_until: String,
    /// Checkbox; present only when ticked.
    #[serde(default)]
    pub is_active: Option<String>,
}

impl CouponForm {
    fn from_coupon(coupon: &Coupon) -> Self {
        let date = |d: Option<NaiveDate>| {
            d.map(|d| d.format(DATE_INPUT_FORMAT).to_string())
                .unwrap_or_default()
        };
        Self {
            code: coupon.code.clone(),
            description: coupon.description.clone().unwrap_or_default(),
            discount_type: coupon.discount_type.as_str().to_string(),
            value: coupon.value.normalize().to_string(),
            min_order_amount: if coupon.min_order_amount.is_zero() {
                String::new()
            } else {
                coupon.min_order_amount.to_plain_string()
            },
            max_discount: coupon
                .max_discount
                .map(|m| m.to_plain_string())
                .unwrap_or_default(),
            usage_limit: coupon
                .usage_limit
                .map(|l| l.to_string())
                .unwrap_or_default(),
            valid_from: date(coupon.valid_from),
            valid_until: date(coupon.valid_until),
            is_active: coupon.is_active.then(|| "on".to_string()),
        }
    }

    #[must_use]
    pub const fn active(&self) -> bool {
        self.is_active.is_some()
    }

    /// Validate and convert into the backend body.
    ///
    /// # Errors
    ///
    /// Returns every problem found, in field order.
    pub fn to_input(&self) -> Result<CouponInput, Vec<String>> {
        let mut errors = Vec::new();

        let code = self.code.trim().to_ascii_uppercase();
        if code.is_empty() {
            errors.push("Code is required.".to_string());
        } else if code.chars().any(char::is_whitespace) {
            errors.push("Code cannot contain spaces.".to_string());
        }

        let discount_type = DiscountType::from_str(self.discount_type.trim()).unwrap_or_else(|_| {
            errors.push("Choose a discount type.".to_string());
            DiscountType::Percentage
        });

        let value = match Decimal::from_str(self.value.trim()) {
            Ok(v) if v <= Decimal::ZERO => {
                errors.push("Value must be greater than zero.".to_string());
                v
            }
            Ok(v) if discount_type == DiscountType::Percentage && v > Decimal::ONE_HUNDRED => {
                errors.push("A percentage cannot exceed 100.".to_string());
                v
            }
            Ok(v) => v,
            Err(_) => {
                errors.push("Value must be a number.".to_string());
                Decimal::ZERO
            }
        };

        let min_order_amount = optional_amount(&self.min_order_amount, "Minimum order", &mut errors)
            .unwrap_or(Money::ZERO);
        let max_discount = optional_amount(&self.max_discount, "Maximum discount", &mut errors);

        let usage_limit = match non_empty(&self.usage_limit).map(|s| s.parse::<u32>()) {
            None => None,
            Some(Ok(limit)) if limit > 0 => Some(limit),
            Some(_) => {
                errors.push("Usage limit must be a positive whole number.".to_string());
                None
            }
        };

        let valid_from = optional_date(&self.valid_from, "Valid from", &mut errors);
        let valid_until = optional_date(&self.valid_until, "Valid until", &mut errors);
        if let (Some(from), Some(until)) = (valid_from, valid_until) {
            if until < from {
                errors.push("Valid until must not be before valid from.".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CouponInput {
            code,
            description: non_empty(&self.description),
            discount_type,
            value,
            min_order_amount,
            max_discount,
            usage_limit,
            valid_from,
            valid_until,
            is_active: self.active(),
        })
    }
}

fn optional_amount(value: &str, field: &str, errors: &mut Vec<String>) -> Option<Money> {
    match non_empty(value).map(|s| Money::parse(&s)) {
        None => None,
        Some(Ok(amount)) if !amount.is_negative() => Some(amount),
        Some(_) => {
            errors.push(format!("{field} must be a positive amount."));
            None
        }
    }
}

fn optional_date(value: &str, field: &str, errors: &mut Vec<String>) -> Option<NaiveDate> {
    match non_empty(value).map(|s| NaiveDate::parse_from_str(&s, DATE_INPUT_FORMAT)) {
        None => None,
        Some(Ok(date)) => Some(date),
        Some(Err(_)) => {
            errors.push(format!("{field} must be a date."));
            None
        }
    }
}

/// Coupon create/edit page template.
#[derive(Template)]
#[template(path = "coupons/form.html")]
pub struct CouponFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub coupon_id: Option<String>,
    pub form: CouponForm,
    pub errors: Vec<String>,
    pub discount_types: Vec<FilterOption>,
}

/// Activate / deactivate form input.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub active: bool,
}

/// Build the coupons router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/coupons", get(index).post(create))
        .route("/coupons/new", get(new))
        .route("/coupons/{id}", post(update))
        .route("/coupons/{id}/edit", get(edit))
        .route("/coupons/{id}/toggle", post(toggle))
        .route("/coupons/{id}/delete", post(delete))
}

/// Coupons list page handler.
#[instrument(skip(auth, state, session))]
pub async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CouponsQuery>,
) -> Result<Html<String>, AppError> {
    let limit = state.config().page_size;
    let list_query = ListQuery::new(query.page.unwrap_or(1), limit)
        .search(query.search.as_deref())
        .filter("is_active", query.is_active.as_deref());
    let result = auth.api(state.api()).list_coupons(&list_query).await;

    let mut toast = take_flash(&session).await;
    let coupons = or_toast(result, "coupons", &mut toast, || Page::empty(limit))?;

    let table = coupons_table_config().with_values(query.search.as_deref(), |key| match key {
        "is_active" => query.is_active.as_deref(),
        _ => None,
    });

    let template = CouponsIndexTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/coupons".to_string(),
        toast,
        table,
        pagination: Pagination::new("/coupons", &list_query, &coupons),
        coupons: coupons.data.iter().map(CouponRowView::from).collect(),
    };
    Ok(render(&template))
}

/// New coupon page.
#[instrument(skip(auth, session))]
pub async fn new(RequireAdminAuth(auth): RequireAdminAuth, session: Session) -> Html<String> {
    let form = CouponForm {
        discount_type: DiscountType::Percentage.as_str().to_string(),
        is_active: Some("on".to_string()),
        ..CouponForm::default()
    };
    let toast = take_flash(&session).await;
    form_page(&auth, None, form, vec![], toast)
}

/// Edit coupon page.
#[instrument(skip(auth, state, session))]
pub async fn edit(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CouponId>,
) -> Result<Html<String>, AppError> {
    let coupon = auth.api(state.api()).get_coupon(&id).await?;
    let toast = take_flash(&session).await;
    Ok(form_page(
        &auth,
        Some(&id),
        CouponForm::from_coupon(&coupon),
        vec![],
        toast,
    ))
}

/// Create coupon handler.
#[instrument(skip(auth, state, session, form))]
pub async fn create(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CouponForm>,
) -> Result<Response, AppError> {
    let input = match form.to_input() {
        Ok(input) => input,
        Err(errors) => return Ok(form_page(&auth, None, form, errors, None).into_response()),
    };
    match auth.api(state.api()).create_coupon(&input).await {
        Ok(coupon) => {
            tracing::info!(coupon_id = %coupon.id, code = %coupon.code, "Coupon created");
            set_flash(&session, Flash::success(format!("Created coupon {}.", coupon.code))).await;
            Ok(Redirect::to("/coupons").into_response())
        }
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            let errors = vec![e.user_message()];
            Ok(form_page(&auth, None, form, errors, None).into_response())
        }
    }
}

/// Update coupon handler.
#[instrument(skip(auth, state, session, form))]
pub async fn update(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CouponId>,
    Form(form): Form<CouponForm>,
) -> Result<Response, AppError> {
    let input = match form.to_input() {
        Ok(input) => input,
        Err(errors) => return Ok(form_page(&auth, Some(&id), form, errors, None).into_response()),
    };
    match auth.api(state.api()).update_coupon(&id, &input).await {
        Ok(_) => {
            tracing::info!(coupon_id = %id, "Coupon updated");
            set_flash(&session, Flash::success("Coupon saved.")).await;
            Ok(Redirect::to("/coupons").into_response())
        }
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            let errors = vec![e.user_message()];
            Ok(form_page(&auth, Some(&id), form, errors, None).into_response())
        }
    }
}

/// Activate or deactivate a coupon from the list.
#[instrument(skip(auth, state, session))]
pub async fn toggle(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CouponId>,
    Form(form): Form<ToggleForm>,
) -> Result<Redirect, AppError> {
    let result = auth
        .api(state.api())
        .set_coupon_active(&id, form.active)
        .await;
    let message = if form.active {
        "Coupon activated."
    } else {
        "Coupon deactivated."
    };
    finish_action(&session, result, message, "/coupons", "/coupons").await
}

/// Delete coupon handler.
#[instrument(skip(auth, state, session))]
pub async fn delete(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CouponId>,
) -> Result<Redirect, AppError> {
    if let Some(denied) = deny_delete(&session, &auth.admin, "/coupons").await {
        return Ok(denied);
    }
    let result = auth.api(state.api()).delete_coupon(&id).await;
    finish_action(&session, result, "Coupon deleted.", "/coupons", "/coupons").await
}

fn form_page(
    auth: &AdminSession,
    coupon_id: Option<&CouponId>,
    form: CouponForm,
    errors: Vec<String>,
    toast: Option<Flash>,
) -> Html<String> {
    let discount_types = select_options(
        DiscountType::ALL.iter().map(|t| (t.as_str(), t.label())),
        &form.discount_type,
    );
    render(&CouponFormTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/coupons".to_string(),
        toast,
        coupon_id: coupon_id.map(ToString::to_string),
        form,
        errors,
        discount_types,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_coupon_form_to_input() {
        let form: CouponForm = serde_urlencoded::from_str(
            "code=diwali25&discount_type=percentage&value=25&min_order_amount=999\
             &max_discount=500&usage_limit=100&valid_from=2026-10-20&valid_until=2026-11-05\
             &is_active=on",
        )
        .unwrap();
        let input = form.to_input().unwrap();
        assert_eq!(input.code, "DIWALI25");
        assert_eq!(input.value, Decimal::from(25));
        assert_eq!(input.min_order_amount, Money::from_rupees(999));
        assert_eq!(input.max_discount, Some(Money::from_rupees(500)));
        assert_eq!(input.usage_limit, Some(100));
        assert_eq!(input.valid_from, NaiveDate::from_ymd_opt(2026, 10, 20));
        assert!(input.is_active);
    }

    #[test]
    fn test_percentage_over_100_rejected() {
        let form: CouponForm =
            serde_urlencoded::from_str("code=BIG&discount_type=percentage&value=150").unwrap();
        assert_eq!(
            form.to_input().unwrap_err(),
            vec!["A percentage cannot exceed 100."]
        );

        let flat: CouponForm =
            serde_urlencoded::from_str("code=BIG&discount_type=flat&value=150").unwrap();
        assert!(flat.to_input().is_ok());
    }

    #[test]
    fn test_dates_must_be_ordered() {
        let form: CouponForm = serde_urlencoded::from_str(
            "code=X&discount_type=flat&value=50&valid_from=2026-11-05&valid_until=2026-10-20",
        )
        .unwrap();
        assert_eq!(
            form.to_input().unwrap_err(),
            vec!["Valid until must not be before valid from."]
        );
    }

    #[test]
    fn test_discount_label() {
        let coupon: Coupon = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "code": "WELCOME10",
            "discount_type": "percentage",
            "value": "10.00",
            "max_discount": 200,
            "min_order_amount": 0,
            "is_active": true
        }))
        .unwrap();
        assert_eq!(discount_label(&coupon), "10% off, up to ₹200.00");
        let row = CouponRowView::from(&coupon);
        assert_eq!(row.validity, "Always");
        assert_eq!(row.usage, "0");
    }
}
