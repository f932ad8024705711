//! `/api/products` and `/api/products/:id`.
//!
//! The same handler serves both routes. Item requests carry the product id
//! in segment 3 of the path.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Method;

use crate::auth::SubjectId;
use crate::error::{ApiError, HandlerResult};
use crate::handlers::{ProtectedHandler, RESOURCE_NOT_FOUND};
use crate::http::{ApiRequest, ApiResponse};
use crate::store::{NewProduct, ProductPatch, ProductStore};

pub const PRODUCTS_PATH: &str = "/api/products";

const PRODUCT_NOT_FOUND: &str = "Product not found";
const INVALID_PRODUCT: &str = "Invalid product data";

pub struct ProductsHandler {
    products: Arc<dyn ProductStore>,
}

impl ProductsHandler {
    pub fn new(products: Arc<dyn ProductStore>) -> Self {
        Self { products }
    }

    async fn list(&self) -> HandlerResult {
        ApiResponse::success(self.products.find_all().await?)
    }

    async fn create(&self, req: &ApiRequest) -> HandlerResult {
        let new: NewProduct = req.json().map_err(|_| ApiError::bad_request(INVALID_PRODUCT))?;
        let product = self.products.insert(new).await?;

        tracing::info!(product_id = %product.id, "Product created");
        Ok(ApiResponse::success(product)?.with_message("Product created successfully"))
    }

    async fn get(&self, id: &str) -> HandlerResult {
        let product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(PRODUCT_NOT_FOUND))?;
        ApiResponse::success(product)
    }

    async fn update(&self, id: &str, req: &ApiRequest) -> HandlerResult {
        let patch: ProductPatch = req.json().map_err(|_| ApiError::bad_request(INVALID_PRODUCT))?;
        let product = self
            .products
            .update(id, patch)
            .await?
            .ok_or_else(|| ApiError::not_found(PRODUCT_NOT_FOUND))?;
        Ok(ApiResponse::success(product)?.with_message("Product updated successfully"))
    }

    async fn delete(&self, id: &str) -> HandlerResult {
        if !self.products.delete(id).await? {
            return Err(ApiError::not_found(PRODUCT_NOT_FOUND));
        }
        Ok(ApiResponse::empty().with_message("Product deleted successfully"))
    }
}

#[async_trait]
impl ProtectedHandler for ProductsHandler {
    async fn handle(&self, req: ApiRequest, _subject: SubjectId) -> HandlerResult {
        if req.path() == PRODUCTS_PATH {
            return match *req.method() {
                Method::GET => self.list().await,
                Method::POST => self.create(&req).await,
                _ => Err(ApiError::MethodNotAllowed),
            };
        }

        // Exactly /api/products/<id>, nothing deeper.
        let id = match req.segment(3) {
            Some(id) if req.path() == format!("{}/{}", PRODUCTS_PATH, id) => id.to_string(),
            _ => return Err(ApiError::not_found(RESOURCE_NOT_FOUND)),
        };

        match *req.method() {
            Method::GET => self.get(&id).await,
            Method::PUT => self.update(&id, &req).await,
            Method::DELETE => self.delete(&id).await,
            _ => Err(ApiError::MethodNotAllowed),
        }
    }
}
