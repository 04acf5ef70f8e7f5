//! Product and category endpoints.

use std::sync::Arc;

use tracing::instrument;

use ayucan_core::{CategoryId, ProductId, ProductImageId};

use super::{
    ApiError, AuthedApi, Category, CategoryInput, ListQuery, Page, Product, ProductImage,
    ProductInput,
};

/// An image file forwarded from the product form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AuthedApi<'_> {
    // =========================================================================
    // Products
    // =========================================================================

    /// List products. Filters: `category_id`, `status`.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ListQuery) -> Result<Page<Product>, ApiError> {
        self.get_page("products", query).await
    }

    /// Every product matching the filters, across all pages.
    #[instrument(skip(self))]
    pub async fn all_products(&self, query: ListQuery) -> Result<Vec<Product>, ApiError> {
        self.fetch_all("products", query).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.get(&format!("products/{id}"), None).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        self.post("products", input).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        self.put(&format!("products/{id}"), input).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        self.delete(&format!("products/{id}")).await
    }

    /// Attach images to a product. Each file is sent as an `images` part.
    #[instrument(skip(self, uploads), fields(count = uploads.len()))]
    pub async fn upload_product_images(
        &self,
        id: &ProductId,
        uploads: Vec<ImageUpload>,
    ) -> Result<Vec<ProductImage>, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for upload in uploads {
            let part = reqwest::multipart::Part::bytes(upload.bytes)
                .file_name(upload.file_name)
                .mime_str(&upload.content_type)?;
            form = form.part("images", part);
        }
        self.post_multipart(&format!("products/{id}/images"), form)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_product_image(
        &self,
        id: &ProductId,
        image_id: &ProductImageId,
    ) -> Result<(), ApiError> {
        self.delete(&format!("products/{id}/images/{image_id}"))
            .await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list_categories(&self, query: &ListQuery) -> Result<Page<Category>, ApiError> {
        self.get_page("categories", query).await
    }

    /// Every category, for select boxes. Cached briefly and dropped on writes.
    #[instrument(skip(self))]
    pub async fn all_categories(&self) -> Result<Arc<Vec<Category>>, ApiError> {
        let cache = &self.client.inner.category_options;
        if let Some(categories) = cache.get(&()).await {
            return Ok(categories);
        }
        let categories = Arc::new(
            self.fetch_all("categories", ListQuery::new(1, 0))
                .await?,
        );
        cache.insert((), Arc::clone(&categories)).await;
        Ok(categories)
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        self.get(&format!("categories/{id}"), None).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let created = self.post("categories", input).await;
        self.client.inner.category_options.invalidate_all();
        created
    }

    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let updated = self.put(&format!("categories/{id}"), input).await;
        self.client.inner.category_options.invalidate_all();
        updated
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), ApiError> {
        let deleted = self.delete(&format!("categories/{id}")).await;
        self.client.inner.category_options.invalidate_all();
        deleted
    }
}
