//! Category management route handlers.

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

use ayucan_core::CategoryId;

use crate::{
    api::{ApiError, Category, CategoryInput, ListQuery, Page},
    components::{DataTableConfig, FilterOption, Pagination, data_table::categories_table_config},
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

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CategoriesQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
}

/// Category row for the list table.
#[derive(Debug, Clone)]
pub struct CategoryRowView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub parent: Option<String>,
    pub product_count: u64,
    pub is_active: bool,
}

/// Categories list page template.
#[derive(Template)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub table: DataTableConfig,
    pub categories: Vec<CategoryRowView>,
    pub pagination: Pagination,
}

/// Category form values, as typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub image_url: String,
    /// Checkbox; present only when ticked.
    #[serde(default)]
    pub is_active: Option<String>,
}

impl CategoryForm {
    fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            parent_id: category
                .parent_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            image_url: category.image_url.clone().unwrap_or_default(),
            is_active: category.is_active.then(|| "on".to_string()),
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
    /// Returns every problem found.
    pub fn to_input(&self, own_id: Option<&CategoryId>) -> Result<CategoryInput, Vec<String>> {
        let mut errors = Vec::new();
        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.push("Name is required.".to_string());
        }
        let parent_id = non_empty(&self.parent_id).map(CategoryId::new);
        if parent_id.is_some() && parent_id.as_ref() == own_id {
            errors.push("A category cannot be its own parent.".to_string());
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CategoryInput {
            slug: non_empty(&self.slug).unwrap_or_else(|| slugify(&name)),
            name,
            parent_id,
            image_url: non_empty(&self.image_url),
            is_active: self.active(),
        })
    }
}

/// Category create/edit page template.
#[derive(Template)]
#[template(path = "categories/form.html")]
pub struct CategoryFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub category_id: Option<String>,
    pub form: CategoryForm,
    pub errors: Vec<String>,
    pub parents: Vec<FilterOption>,
}

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(index).post(create))
        .route("/categories/new", get(new))
        .route("/categories/{id}", post(update))
        .route("/categories/{id}/edit", get(edit))
        .route("/categories/{id}/delete", post(delete))
}

/// Categories list page handler.
#[instrument(skip(auth, state, session))]
pub async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CategoriesQuery>,
) -> Result<Html<String>, AppError> {
    let limit = state.config().page_size;
    let list_query =
        ListQuery::new(query.page.unwrap_or(1), limit).search(query.search.as_deref());

    let api = auth.api(state.api());
    let (page, all) = tokio::join!(api.list_categories(&list_query), api.all_categories());

    let mut toast = take_flash(&session).await;
    let page = or_toast(page, "categories", &mut toast, || Page::empty(limit))?;
    let all = or_toast(all, "parent categories", &mut toast, Default::default)?;

    let parent_name = |id: &CategoryId| all.iter().find(|c| &c.id == id).map(|c| c.name.clone());
    let categories = page
        .data
        .iter()
        .map(|c| CategoryRowView {
            id: c.id.to_string(),
            name: c.name.clone(),
            slug: c.slug.clone(),
            parent: c.parent_id.as_ref().and_then(parent_name),
            product_count: c.product_count,
            is_active: c.is_active,
        })
        .collect();

    let template = CategoriesIndexTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/categories".to_string(),
        toast,
        table: categories_table_config().with_values(query.search.as_deref(), |_| None),
        categories,
        pagination: Pagination::new("/categories", &list_query, &page),
    };
    Ok(render(&template))
}

/// New category page.
#[instrument(skip(auth, state, session))]
pub async fn new(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let form = CategoryForm {
        is_active: Some("on".to_string()),
        ..CategoryForm::default()
    };
    let toast = take_flash(&session).await;
    form_page(&state, &auth, None, form, vec![], toast).await
}

/// Edit category page.
#[instrument(skip(auth, state, session))]
pub async fn edit(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CategoryId>,
) -> Result<Html<String>, AppError> {
    let category = auth.api(state.api()).get_category(&id).await?;
    let toast = take_flash(&session).await;
    form_page(
        &state,
        &auth,
        Some(&id),
        CategoryForm::from_category(&category),
        vec![],
        toast,
    )
    .await
}

/// Create category handler.
#[instrument(skip(auth, state, session, form))]
pub async fn create(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CategoryForm>,
) -> Result<Response, AppError> {
    let input = match form.to_input(None) {
        Ok(input) => input,
        Err(errors) => {
            return Ok(form_page(&state, &auth, None, form, errors, None)
                .await?
                .into_response());
        }
    };
    match auth.api(state.api()).create_category(&input).await {
        Ok(category) => {
            tracing::info!(category_id = %category.id, "Category created");
            set_flash(&session, Flash::success(format!("Created {}.", category.name))).await;
            Ok(Redirect::to("/categories").into_response())
        }
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            let errors = vec![e.user_message()];
            Ok(form_page(&state, &auth, None, form, errors, None)
                .await?
                .into_response())
        }
    }
}

/// Update category handler.
#[instrument(skip(auth, state, session, form))]
pub async fn update(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Result<Response, AppError> {
    let input = match form.to_input(Some(&id)) {
        Ok(input) => input,
        Err(errors) => {
            return Ok(form_page(&state, &auth, Some(&id), form, errors, None)
                .await?
                .into_response());
        }
    };
    match auth.api(state.api()).update_category(&id, &input).await {
        Ok(_) => {
            tracing::info!(category_id = %id, "Category updated");
            set_flash(&session, Flash::success("Category saved.")).await;
            Ok(Redirect::to("/categories").into_response())
        }
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            let errors = vec![e.user_message()];
            Ok(form_page(&state, &auth, Some(&id), form, errors, None)
                .await?
                .into_response())
        }
    }
}

/// Delete category handler.
#[instrument(skip(auth, state, session))]
pub async fn delete(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CategoryId>,
) -> Result<Redirect, AppError> {
    if let Some(denied) = deny_delete(&session, &auth.admin, "/categories").await {
        return Ok(denied);
    }
    let result = auth.api(state.api()).delete_category(&id).await;
    finish_action(&session, result, "Category deleted.", "/categories", "/categories").await
}

async fn form_page(
    state: &AppState,
    auth: &AdminSession,
    category_id: Option<&CategoryId>,
    form: CategoryForm,
    errors: Vec<String>,
    toast: Option<Flash>,
) -> Result<Html<String>, AppError> {
    let mut toast = toast;
    let all = or_toast(
        auth.api(state.api()).all_categories().await,
        "parent categories",
        &mut toast,
        Default::default,
    )?;
    let parents = select_options(
        all.iter()
            .filter(|c| Some(&c.id) != category_id)
            .map(|c| (c.id.as_str(), c.name.as_str())),
        &form.parent_id,
    );

    let template = CategoryFormTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/categories".to_string(),
        toast,
        category_id: category_id.map(ToString::to_string),
        form,
        errors,
        parents,
    };
    Ok(render(&template))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unticked_checkbox_means_inactive() {
        let form: CategoryForm =
            serde_urlencoded::from_str("name=Herbal+Teas&slug=&parent_id=&image_url=").unwrap();
        let input = form.to_input(None).unwrap();
        assert_eq!(input.slug, "herbal-teas");
        assert!(!input.is_active);
        assert_eq!(input.parent_id, None);
    }

    #[test]
    fn test_own_parent_rejected() {
        let form: CategoryForm =
            serde_urlencoded::from_str("name=Oils&parent_id=c1&is_active=on").unwrap();
        let id = CategoryId::new("c1");
        assert_eq!(
            form.to_input(Some(&id)).unwrap_err(),
            vec!["A category cannot be its own parent."]
        );
        assert!(form.to_input(None).unwrap().is_active);
    }
}
