use std::collections::BTreeMap;

use async_trait::async_trait;
use shared::Result;

use crate::auth::models::User;
use crate::domain::{Category, Order, Product};

// Ports are the pluggable extension points for the underlying document store.
// Every method may suspend at an I/O boundary.

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Active categories, sorted by name.
    async fn list_active(&self) -> Result<Vec<Category>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Category>>;

    /// Create a category. Fails with a validation error when the name is
    /// already taken by an active category.
    async fn create(&self, category: Category) -> Result<Category>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>>;

    async fn list_all(&self) -> Result<Vec<Product>>;

    async fn create(&self, product: Product) -> Result<Product>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn username_exists(&self, username: &str) -> Result<bool>;
}

/// Cart persistence, separated from user account management so the cart
/// service depends only on what it writes. Entries are sparse: quantity zero
/// is never stored.
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn get_cart(&self, user_id: &str) -> Result<BTreeMap<String, u32>>;

    /// Replace the stored cart map for one user. Last write wins; concurrent
    /// writers to the same user are not serialized here.
    async fn put_cart(&self, user_id: &str, cart: BTreeMap<String, u32>) -> Result<()>;

    /// Strip `product_id` from every user's cart in one sweep. Returns how
    /// many carts changed.
    async fn strip_cart_key(&self, product_id: &str) -> Result<u64>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: Order) -> Result<Order>;

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Order>>;

    async fn list_all(&self) -> Result<Vec<Order>>;
}
