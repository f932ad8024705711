//! Document storage backends.
//!
//! Two logical collections: `users` keyed by `uid`, and `products` keyed by
//! a generated opaque id. Handlers only see the traits below.

pub mod memory;
pub mod model;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::{InMemoryProductStore, InMemoryUserStore};
pub use model::{NewProduct, Product, ProductPatch, User, UserPatch};

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key in {collection}: {key}")]
    Duplicate { collection: &'static str, key: String },

    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for user profiles.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new profile; fails if the uid is taken.
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    /// Apply `patch`; `None` if no such user.
    async fn update(&self, uid: &str, patch: UserPatch) -> Result<Option<User>, StoreError>;

    /// Stamp the logout time; `false` if no such user.
    async fn record_logout(&self, uid: &str, at: DateTime<Utc>) -> Result<bool, StoreError>;

    async fn delete(&self, uid: &str) -> Result<bool, StoreError>;
}

/// Storage for products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products in insertion order.
    async fn find_all(&self) -> Result<Vec<Product>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, StoreError>;

    /// Assign an id and timestamps, then store.
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError>;

    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>, StoreError>;

    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}
