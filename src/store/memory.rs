//! In-memory document stores.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use super::model::{NewProduct, Product, ProductPatch, User, UserPatch};
use super::{ProductStore, StoreError, UserStore};

/// `users` collection backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: DashMap<String, User>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(uid).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, user: User) -> Result<User, StoreError> {
        match self.users.entry(user.uid.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                collection: "users",
                key: user.uid,
            }),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn update(&self, uid: &str, patch: UserPatch) -> Result<Option<User>, StoreError> {
        Ok(self.users.get_mut(uid).map(|mut entry| {
            entry.apply(patch);
            entry.value().clone()
        }))
    }

    async fn record_logout(&self, uid: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        Ok(match self.users.get_mut(uid) {
            Some(mut user) => {
                user.last_logout = Some(at);
                user.updated_at = at;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, uid: &str) -> Result<bool, StoreError> {
        Ok(self.users.remove(uid).is_some())
    }
}

/// `products` collection backed by a concurrent map.
///
/// A monotonically increasing sequence number keeps `find_all` in
/// insertion order.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: DashMap<String, (u64, Product)>,
    next_seq: AtomicU64,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        let mut rows: Vec<(u64, Product)> = self
            .products
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, product)| product).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, StoreError> {
        Ok(self.products.get(id).map(|entry| entry.value().1.clone()))
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let product = product.into_product(Uuid::new_v4().to_string());
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.products.insert(product.id.clone(), (seq, product.clone()));
        Ok(product)
    }

    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>, StoreError> {
        Ok(self.products.get_mut(id).map(|mut entry| {
            entry.1.apply(patch);
            entry.1.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.products.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp(name: &str) -> NewProduct {
        NewProduct {
            name: name.into(),
            description: String::new(),
            price: 10.0,
            category: "home".into(),
            stock: 1,
        }
    }

    #[tokio::test]
    async fn test_user_crud() {
        let store = InMemoryUserStore::new();
        store.insert(User::new("u1", "Ada", "ada@example.com")).await.unwrap();

        let dup = store.insert(User::new("u1", "Other", "o@example.com")).await.unwrap_err();
        assert!(matches!(dup, StoreError::Duplicate { collection: "users", .. }));

        let updated = store
            .update("u1", UserPatch { bio: Some("engineer".into()), ..Default::default() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("engineer"));
        assert_eq!(updated.name, "Ada");

        assert!(store.update("u2", UserPatch::default()).await.unwrap().is_none());

        let at = Utc::now();
        assert!(store.record_logout("u1", at).await.unwrap());
        assert_eq!(store.find_by_uid("u1").await.unwrap().unwrap().last_logout, Some(at));

        assert!(store.delete("u1").await.unwrap());
        assert!(!store.delete("u1").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_products_keep_insertion_order() {
        let store = InMemoryProductStore::new();
        for name in ["a", "b", "c", "d"] {
            store.insert(lamp(name)).await.unwrap();
        }

        let names: Vec<String> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_product_update_and_delete() {
        let store = InMemoryProductStore::new();
        let product = store.insert(lamp("Lamp")).await.unwrap();
        assert!(Uuid::parse_str(&product.id).is_ok());

        let updated = store
            .update(&product.id, ProductPatch { stock: Some(9), ..Default::default() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.stock, 9);

        assert!(store.delete(&product.id).await.unwrap());
        assert!(store.find_by_id(&product.id).await.unwrap().is_none());
        assert!(store.update(&product.id, ProductPatch::default()).await.unwrap().is_none());
    }
}
