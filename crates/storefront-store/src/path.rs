//! # Resource Paths
//!
//! Addresses of records in the item store, REST style.
//!
//! ```text
//! products                  Collection("products")
//! orders/3                  Item { collection: "orders", id: 3 }
//! orders/3/orderItems       Nested { parent: "orders", parent_id: 3,
//!                                    child: "orderItems" }
//!                           = orderItems where orderId == 3
//!
//! ?_expand=product          embed products/{productId} as "product"
//! ?_limit=6                 at most 6 records
//! ```

use std::fmt;

/// Collection names used by the storefront.
pub mod collections {
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
    pub const ORDERS: &str = "orders";
    pub const ORDER_ITEMS: &str = "orderItems";
    pub const CARTS: &str = "carts";
    pub const CART_ITEMS: &str = "cartItems";
}

// =============================================================================
// Path
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourcePath {
    /// Every record of a collection.
    Collection(String),
    /// One record by id.
    Item { collection: String, id: i64 },
    /// Records of `child` whose `<singular(parent)>Id` equals `parent_id`.
    Nested {
        parent: String,
        parent_id: i64,
        child: String,
    },
}

impl ResourcePath {
    pub fn collection(name: impl Into<String>) -> Self {
        ResourcePath::Collection(name.into())
    }

    pub fn item(collection: impl Into<String>, id: i64) -> Self {
        ResourcePath::Item {
            collection: collection.into(),
            id,
        }
    }

    pub fn nested(parent: impl Into<String>, parent_id: i64, child: impl Into<String>) -> Self {
        ResourcePath::Nested {
            parent: parent.into(),
            parent_id,
            child: child.into(),
        }
    }

    /// The collection whose records this path returns.
    pub fn target(&self) -> &str {
        match self {
            ResourcePath::Collection(name) => name,
            ResourcePath::Item { collection, .. } => collection,
            ResourcePath::Nested { child, .. } => child,
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourcePath::Collection(name) => write!(f, "{}", name),
            ResourcePath::Item { collection, id } => write!(f, "{}/{}", collection, id),
            ResourcePath::Nested {
                parent,
                parent_id,
                child,
            } => write!(f, "{}/{}/{}", parent, parent_id, child),
        }
    }
}

// =============================================================================
// Query
// =============================================================================

/// `_expand` / `_limit` query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub expand: Vec<String>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embeds the related `entity` (singular name, e.g. `product`).
    pub fn expand(mut self, entity: impl Into<String>) -> Self {
        self.expand.push(entity.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.expand.is_empty() && self.limit.is_none()
    }

    /// Query string pairs in REST form.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> =
            self.expand.iter().map(|e| ("_expand", e.clone())).collect();
        if let Some(limit) = self.limit {
            pairs.push(("_limit", limit.to_string()));
        }
        pairs
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .to_pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        if pairs.is_empty() {
            Ok(())
        } else {
            write!(f, "?{}", pairs.join("&"))
        }
    }
}

// =============================================================================
// Naming
// =============================================================================

/// `orders` → `order`, `categories` → `category`.
pub fn singular(collection: &str) -> String {
    if let Some(stem) = collection.strip_suffix("ies") {
        format!("{}y", stem)
    } else if let Some(stem) = collection.strip_suffix('s') {
        stem.to_string()
    } else {
        collection.to_string()
    }
}

/// `product` → `products`, `category` → `categories`.
pub fn plural(entity: &str) -> String {
    if let Some(stem) = entity.strip_suffix('y') {
        format!("{}ies", stem)
    } else {
        format!("{}s", entity)
    }
}

/// Foreign key field a child record carries for `parent_collection`.
pub fn foreign_key(parent_collection: &str) -> String {
    format!("{}Id", singular(parent_collection))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ResourcePath::collection("products").to_string(), "products");
        assert_eq!(ResourcePath::item("orders", 3).to_string(), "orders/3");
        assert_eq!(
            ResourcePath::nested("orders", 3, "orderItems").to_string(),
            "orders/3/orderItems"
        );
    }

    #[test]
    fn test_target_collection() {
        assert_eq!(
            ResourcePath::nested("orders", 1, "orderItems").target(),
            "orderItems"
        );
        assert_eq!(ResourcePath::item("orders", 1).target(), "orders");
    }

    #[test]
    fn test_query_string() {
        assert_eq!(Query::new().to_string(), "");
        assert_eq!(
            Query::new().expand("product").limit(6).to_string(),
            "?_expand=product&_limit=6"
        );
    }

    #[test]
    fn test_naming() {
        assert_eq!(singular("orders"), "order");
        assert_eq!(singular("categories"), "category");
        assert_eq!(plural("category"), "categories");
        assert_eq!(plural("product"), "products");
        assert_eq!(foreign_key("carts"), "cartId");
        assert_eq!(foreign_key("orders"), "orderId");
    }
}
