//! Documents kept in the `users` and `products` collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile record keyed by the identity provider's subject id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_logout: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(uid: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            uid: uid.into(),
            name: name.into(),
            email: email.into(),
            bio: None,
            created_at: now,
            updated_at: now,
            last_logout: None,
        }
    }

    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(bio) = patch.bio {
            self.bio = Some(bio);
        }
        self.updated_at = Utc::now();
    }
}

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a product creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: u32,
}

impl NewProduct {
    pub fn into_product(self, id: impl Into<String>) -> Product {
        let now = Utc::now();
        Product {
            id: id.into(),
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            stock: self.stock,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of a product update request; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: Option<u32>,
}

impl Product {
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        self.updated_at = Utc::now();
    }
}
