//! Product management route handlers.

use std::str::FromStr;

use askama::Template;
use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ayucan_core::{CategoryId, Money, ProductId, ProductImageId, ProductStatus};

use crate::{
    api::{ApiClient, ApiError, ImageUpload, ListQuery, Page, Product, ProductInput},
    components::{DataTableConfig, FilterOption, Pagination, data_table::products_table_config},
    error::AppError,
    filters,
    middleware::{AdminSession, RequireAdminAuth},
    services::{Flash, set_flash, take_flash},
    state::AppState,
};

use super::{
    AdminUserView, deny_delete, finish_action, non_empty, or_toast, render, select_options,
    slugify,
};

/// GST slabs offered in rate selects.
pub const GST_RATES: [&str; 5] = ["0", "5", "12", "18", "28"];

/// Products with this many units or fewer are flagged in the list.
const LOW_STOCK_THRESHOLD: i64 = 5;

/// Largest accepted product form, images included.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Largest accepted single image.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Most images accepted per submission.
const MAX_IMAGES: usize = 8;

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub status: Option<String>,
}

/// Product row for the list table.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub price: String,
    /// MRP shown struck through when a sale price applies.
    pub mrp: Option<String>,
    pub stock: i64,
    pub low_stock: bool,
    pub status: &'static str,
    pub status_class: &'static str,
    pub thumbnail: Option<String>,
}

impl ProductRowView {
    fn new(product: &Product, api: &ApiClient) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            sku: product.sku.clone().unwrap_or_default(),
            category: product
                .category
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            price: product.selling_price().display(),
            mrp: product.sale_price.map(|_| product.price.display()),
            stock: product.stock,
            low_stock: product.stock <= LOW_STOCK_THRESHOLD,
            status: product.status.label(),
            status_class: product.status.badge_class(),
            thumbnail: product.images.first().map(|i| api.asset_url(&i.url)),
        }
    }
}

/// Existing image on the edit page.
#[derive(Debug, Clone)]
pub struct ImageView {
    pub id: String,
    pub url: String,
}

/// Products list page template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub table: DataTableConfig,
    pub products: Vec<ProductRowView>,
    pub pagination: Pagination,
}

/// Product create/edit form values, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category_id: String,
    pub price: String,
    pub sale_price: String,
    pub stock: String,
    pub sku: String,
    pub status: String,
    pub tax_rate: String,
    pub hsn_code: String,
}

impl ProductForm {
    fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            category_id: product
                .category
                .as_ref()
                .map(|c| c.id.to_string())
                .unwrap_or_default(),
            price: product.price.to_plain_string(),
            sale_price: product
                .sale_price
                .map(|p| p.to_plain_string())
                .unwrap_or_default(),
            stock: product.stock.to_string(),
            sku: product.sku.clone().unwrap_or_default(),
            status: product.status.as_str().to_string(),
            tax_rate: product.tax_rate.normalize().to_string(),
            hsn_code: product.hsn_code.clone().unwrap_or_default(),
        }
    }

    fn set(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = value,
            "slug" => self.slug = value,
            "description" => self.description = value,
            "category_id" => self.category_id = value,
            "price" => self.price = value,
            "sale_price" => self.sale_price = value,
            "stock" => self.stock = value,
            "sku" => self.sku = value,
            "status" => self.status = value,
            "tax_rate" => self.tax_rate = value,
            "hsn_code" => self.hsn_code = value,
            _ => {}
        }
    }

    /// Validate and convert into the backend body.
    ///
    /// # Errors
    ///
    /// Returns every problem found, in field order.
    pub fn to_input(&self) -> Result<ProductInput, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.push("Name is required.".to_string());
        }

        let price = match Money::parse(&self.price) {
            Ok(price) if price.is_negative() => {
                errors.push("Price cannot be negative.".to_string());
                None
            }
            Ok(price) => Some(price),
            Err(_) => {
                errors.push("Price must be a number.".to_string());
                None
            }
        };

        let sale_price = match non_empty(&self.sale_price).map(|s| Money::parse(&s)) {
            None => None,
            Some(Ok(sale)) if sale.is_negative() => {
                errors.push("Sale price cannot be negative.".to_string());
                None
            }
            Some(Ok(sale)) => {
                if price.is_some_and(|p| sale > p) {
                    errors.push("Sale price cannot exceed the MRP.".to_string());
                }
                Some(sale)
            }
            Some(Err(_)) => {
                errors.push("Sale price must be a number.".to_string());
                None
            }
        };

        let stock = match non_empty(&self.stock).map_or(Ok(0), |s| s.parse::<i64>()) {
            Ok(stock) if stock >= 0 => stock,
            _ => {
                errors.push("Stock must be a whole number of units.".to_string());
                0
            }
        };

        let status = ProductStatus::from_str(self.status.trim()).unwrap_or(ProductStatus::Active);

        let tax_rate = match non_empty(&self.tax_rate).map_or(Ok(Decimal::ZERO), |s| {
            Decimal::from_str(&s)
        }) {
            Ok(rate) if rate >= Decimal::ZERO && rate <= Decimal::ONE_HUNDRED => rate,
            _ => {
                errors.push("GST rate must be between 0 and 100.".to_string());
                Decimal::ZERO
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let slug = non_empty(&self.slug).unwrap_or_else(|| slugify(&name));
        Ok(ProductInput {
            name,
            slug,
            description: self.description.trim().to_string(),
            category_id: non_empty(&self.category_id).map(CategoryId::new),
            price: price.unwrap_or(Money::ZERO),
            sale_price,
            stock,
            sku: non_empty(&self.sku),
            status,
            tax_rate,
            hsn_code: non_empty(&self.hsn_code),
        })
    }
}

/// Product create/edit page template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub product_id: Option<String>,
    pub form: ProductForm,
    pub errors: Vec<String>,
    pub categories: Vec<FilterOption>,
    pub statuses: Vec<FilterOption>,
    pub tax_rates: Vec<FilterOption>,
    pub images: Vec<ImageView>,
}

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/new", get(new))
        .route("/products/{id}", post(update))
        .route("/products/{id}/edit", get(edit))
        .route("/products/{id}/delete", post(delete))
        .route(
            "/products/{id}/images/{image_id}/delete",
            post(delete_image),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Products list page handler.
#[instrument(skip(auth, state, session))]
pub async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ProductsQuery>,
) -> Result<Html<String>, AppError> {
    let limit = state.config().page_size;
    let list_query = ListQuery::new(query.page.unwrap_or(1), limit)
        .search(query.search.as_deref())
        .filter("category_id", query.category_id.as_deref())
        .filter("status", query.status.as_deref());

    let api = auth.api(state.api());
    let (products, categories) = tokio::join!(api.list_products(&list_query), api.all_categories());

    let mut toast = take_flash(&session).await;
    let products = or_toast(products, "products", &mut toast, || Page::empty(limit))?;
    let categories = or_toast(categories, "categories", &mut toast, Default::default)?;

    let table = products_table_config(&categories).with_values(query.search.as_deref(), |key| {
        match key {
            "category_id" => query.category_id.as_deref(),
            "status" => query.status.as_deref(),
            _ => None,
        }
    });

    let template = ProductsIndexTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/products".to_string(),
        toast,
        table,
        pagination: Pagination::new("/products", &list_query, &products),
        products: products
            .data
            .iter()
            .map(|p| ProductRowView::new(p, state.api()))
            .collect(),
    };

    Ok(render(&template))
}

/// New product page.
#[instrument(skip(auth, state, session))]
pub async fn new(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let form = ProductForm {
        status: ProductStatus::Active.as_str().to_string(),
        stock: "0".to_string(),
        tax_rate: "18".to_string(),
        ..ProductForm::default()
    };
    let toast = take_flash(&session).await;
    form_page(&state, &auth, None, form, vec![], vec![], toast).await
}

/// Edit product page.
#[instrument(skip(auth, state, session))]
pub async fn edit(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Html<String>, AppError> {
    let product = auth.api(state.api()).get_product(&id).await?;
    let images = image_views(&product, state.api());
    let toast = take_flash(&session).await;
    form_page(
        &state,
        &auth,
        Some(id.to_string()),
        ProductForm::from_product(&product),
        vec![],
        images,
        toast,
    )
    .await
}

/// Create product handler.
#[instrument(skip(auth, state, session, multipart))]
pub async fn create(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let submission = read_product_form(multipart).await?;
    let input = match submission.to_input() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(form_page(&state, &auth, None, submission.form, errors, vec![], None)
                .await?
                .into_response());
        }
    };

    let ProductSubmission { form, uploads, .. } = submission;
    let api = auth.api(state.api());
    let product = match api.create_product(&input).await {
        Ok(product) => product,
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Backend rejected new product");
            let errors = vec![e.user_message()];
            return Ok(form_page(&state, &auth, None, form, errors, vec![], None)
                .await?
                .into_response());
        }
    };
    tracing::info!(product_id = %product.id, "Product created");

    if !uploads.is_empty() {
        if let Err(e) = api.upload_product_images(&product.id, uploads).await {
            tracing::warn!(error = %e, product_id = %product.id, "Image upload failed");
            set_flash(
                &session,
                Flash::error(format!(
                    "Product created, but the images were not uploaded. {}",
                    e.user_message()
                )),
            )
            .await;
            return Ok(Redirect::to(&format!("/products/{}/edit", product.id)).into_response());
        }
    }

    set_flash(&session, Flash::success(format!("Created {}.", product.name))).await;
    Ok(Redirect::to("/products").into_response())
}

/// Update product handler.
#[instrument(skip(auth, state, session, multipart))]
pub async fn update(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let submission = read_product_form(multipart).await?;
    let input = match submission.to_input() {
        Ok(input) => input,
        Err(errors) => return rerender_edit(&state, &auth, &id, submission.form, errors).await,
    };
    let ProductSubmission { form, uploads, .. } = submission;

    let api = auth.api(state.api());
    match api.update_product(&id, &input).await {
        Ok(_) => {}
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::warn!(error = %e, product_id = %id, "Backend rejected product update");
            return rerender_edit(&state, &auth, &id, form, vec![e.user_message()]).await;
        }
    }
    tracing::info!(product_id = %id, "Product updated");

    let edit_path = format!("/products/{id}/edit");
    if !uploads.is_empty() {
        let count = uploads.len();
        let uploaded = api.upload_product_images(&id, uploads).await;
        return Ok(finish_action(
            &session,
            uploaded,
            &format!("Product saved with {count} new image(s)."),
            &edit_path,
            &edit_path,
        )
        .await?
        .into_response());
    }

    set_flash(&session, Flash::success("Product saved.")).await;
    Ok(Redirect::to(&edit_path).into_response())
}

/// Delete product handler.
#[instrument(skip(auth, state, session))]
pub async fn delete(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    if let Some(denied) = deny_delete(&session, &auth.admin, "/products").await {
        return Ok(denied);
    }
    let result = auth.api(state.api()).delete_product(&id).await;
    finish_action(&session, result, "Product deleted.", "/products", "/products").await
}

/// Delete one product image.
#[instrument(skip(auth, state, session))]
pub async fn delete_image(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path((id, image_id)): Path<(ProductId, ProductImageId)>,
) -> Result<Redirect, AppError> {
    let edit_path = format!("/products/{id}/edit");
    let result = auth
        .api(state.api())
        .delete_product_image(&id, &image_id)
        .await;
    finish_action(&session, result, "Image removed.", &edit_path, &edit_path).await
}

fn image_views(product: &Product, api: &ApiClient) -> Vec<ImageView> {
    product
        .images
        .iter()
        .map(|i| ImageView {
            id: i.id.to_string(),
            url: api.asset_url(&i.url),
        })
        .collect()
}

/// Re-render the edit form with errors, keeping the typed values.
async fn rerender_edit(
    state: &AppState,
    auth: &AdminSession,
    id: &ProductId,
    form: ProductForm,
    errors: Vec<String>,
) -> Result<Response, AppError> {
    let images = match auth.api(state.api()).get_product(id).await {
        Ok(product) => image_views(&product, state.api()),
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(_) => vec![],
    };
    let page = form_page(state, auth, Some(id.to_string()), form, errors, images, None).await?;
    Ok(page.into_response())
}

async fn form_page(
    state: &AppState,
    auth: &AdminSession,
    product_id: Option<String>,
    form: ProductForm,
    errors: Vec<String>,
    images: Vec<ImageView>,
    toast: Option<Flash>,
) -> Result<Html<String>, AppError> {
    let mut toast = toast;
    let categories = or_toast(
        auth.api(state.api()).all_categories().await,
        "categories",
        &mut toast,
        Default::default,
    )?;

    let template = ProductFormTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/products".to_string(),
        toast,
        product_id,
        categories: select_options(
            categories.iter().map(|c| (c.id.as_str(), c.name.as_str())),
            &form.category_id,
        ),
        statuses: select_options(
            ProductStatus::ALL.iter().map(|s| (s.as_str(), s.label())),
            &form.status,
        ),
        tax_rates: select_options(
            GST_RATES.iter().map(|r| (*r, format!("{r}%"))),
            &form.tax_rate,
        ),
        form,
        errors,
        images,
    };
    Ok(render(&template))
}

/// A multipart product form split into text fields and image files.
#[derive(Debug, Default)]
struct ProductSubmission {
    form: ProductForm,
    uploads: Vec<ImageUpload>,
    /// Rejected files, shown after the field errors.
    image_errors: Vec<String>,
}

impl ProductSubmission {
    fn to_input(&self) -> Result<ProductInput, Vec<String>> {
        match self.form.to_input() {
            Ok(input) if self.image_errors.is_empty() => Ok(input),
            Ok(_) => Err(self.image_errors.clone()),
            Err(mut errors) => {
                errors.extend(self.image_errors.iter().cloned());
                Err(errors)
            }
        }
    }

    fn add_image(&mut self, file_name: String, content_type: String, bytes: Vec<u8>) {
        if self.uploads.len() == MAX_IMAGES {
            let message = format!("Upload at most {MAX_IMAGES} images at a time.");
            if !self.image_errors.contains(&message) {
                self.image_errors.push(message);
            }
            return;
        }
        match validate_image(file_name, content_type, bytes) {
            Ok(upload) => self.uploads.push(upload),
            Err(message) => self.image_errors.push(message),
        }
    }
}

/// Read the multipart product form.
///
/// Malformed bodies are a bad request; files that are not acceptable images
/// are collected as form errors.
async fn read_product_form(mut multipart: Multipart) -> Result<ProductSubmission, AppError> {
    let mut submission = ProductSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "images" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = match field.bytes().await {
                Ok(bytes) => bytes,
                Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                    // The rest of the body is unreadable once the limit is hit
                    submission
                        .image_errors
                        .push("Images must add up to 20 MB or less.".to_string());
                    break;
                }
                Err(e) => return Err(AppError::BadRequest(format!("Invalid image upload: {e}"))),
            };
            if bytes.is_empty() {
                // The browser sends an empty part when no file was chosen
                continue;
            }
            submission.add_image(file_name, content_type, bytes.to_vec());
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid form field: {e}")))?;
            submission.form.set(&name, value);
        }
    }

    Ok(submission)
}

fn validate_image(
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
) -> Result<ImageUpload, String> {
    if !content_type.starts_with("image/") {
        return Err(format!("{file_name} is not an image."));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(format!("{file_name} is larger than 5 MB."));
    }
    Ok(ImageUpload {
        file_name,
        content_type,
        bytes,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> ProductForm {
        ProductForm {
            name: "Neem & Tulsi Oil".to_string(),
            price: "₹ 1,249.00".to_string(),
            sale_price: "999".to_string(),
            stock: "12".to_string(),
            status: "inactive".to_string(),
            tax_rate: "18".to_string(),
            category_id: "c1".to_string(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_form_to_input() {
        let input = valid_form().to_input().unwrap();
        assert_eq!(input.slug, "neem-tulsi-oil");
        assert_eq!(input.price, Money::from_rupees(1249));
        assert_eq!(input.sale_price, Some(Money::from_rupees(999)));
        assert_eq!(input.stock, 12);
        assert_eq!(input.status, ProductStatus::Inactive);
        assert_eq!(input.tax_rate, Decimal::from(18));
        assert_eq!(input.category_id, Some(CategoryId::new("c1")));
        assert_eq!(input.sku, None);
    }

    #[test]
    fn test_form_collects_errors() {
        let form = ProductForm {
            name: "  ".to_string(),
            price: "abc".to_string(),
            stock: "-3".to_string(),
            tax_rate: "140".to_string(),
            ..ProductForm::default()
        };
        let errors = form.to_input().unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Name is required.",
                "Price must be a number.",
                "Stock must be a whole number of units.",
                "GST rate must be between 0 and 100.",
            ]
        );
    }

    #[test]
    fn test_sale_price_above_mrp_rejected() {
        let form = ProductForm {
            sale_price: "1500".to_string(),
            ..valid_form()
        };
        assert_eq!(
            form.to_input().unwrap_err(),
            vec!["Sale price cannot exceed the MRP."]
        );
    }

    #[test]
    fn test_validate_image() {
        assert!(validate_image("a.png".into(), "image/png".into(), vec![1, 2]).is_ok());
        assert_eq!(
            validate_image("a.pdf".into(), "application/pdf".into(), vec![1]).unwrap_err(),
            "a.pdf is not an image."
        );
        assert_eq!(
            validate_image("big.jpg".into(), "image/jpeg".into(), vec![0; MAX_IMAGE_BYTES + 1])
                .unwrap_err(),
            "big.jpg is larger than 5 MB."
        );
    }

    #[test]
    fn test_image_problems_join_field_errors() {
        let mut submission = ProductSubmission {
            form: valid_form(),
            ..ProductSubmission::default()
        };
        for i in 0..=MAX_IMAGES {
            submission.add_image(format!("{i}.png"), "image/png".into(), vec![1]);
        }
        submission.add_image("notes.txt".into(), "text/plain".into(), vec![1]);
        submission.add_image("extra.png".into(), "image/png".into(), vec![1]);

        assert_eq!(submission.uploads.len(), MAX_IMAGES);
        assert_eq!(
            submission.to_input().unwrap_err(),
            vec!["Upload at most 8 images at a time."]
        );

        submission.form.name = String::new();
        assert_eq!(
            submission.to_input().unwrap_err(),
            vec!["Name is required.", "Upload at most 8 images at a time."]
        );
    }
}
