use std::collections::BTreeMap;
use std::sync::Arc;

use shared::{Error, Result};
use tracing::info;

use crate::identity::EntityRef;
use crate::ports::CartRepository;

/// Per-user cart operations over the sparse product-id → quantity map. Keys
/// are canonicalized before storage so a wrapped reference and a bare string
/// land on the same entry. Last write wins per user; two tabs racing on the
/// same cart overwrite each other's update.
pub struct CartService {
    carts: Arc<dyn CartRepository>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartRepository>) -> Self {
        Self { carts }
    }

    pub async fn get(&self, user_id: &str) -> Result<BTreeMap<String, u32>> {
        self.carts.get_cart(user_id).await
    }

    /// Absolute set. Quantity zero removes the entry; negative input is
    /// rejected before anything is persisted.
    pub async fn set_quantity(
        &self,
        user_id: &str,
        product: &EntityRef,
        quantity: i64,
    ) -> Result<BTreeMap<String, u32>> {
        if quantity < 0 {
            return Err(Error::Validation(
                "quantity must be a non-negative integer".to_string(),
            ));
        }

        let key = product.canonical();
        let mut cart = self.carts.get_cart(user_id).await?;
        if quantity == 0 {
            cart.remove(&key);
        } else {
            cart.insert(key, quantity as u32);
        }
        self.carts.put_cart(user_id, cart.clone()).await?;
        Ok(cart)
    }

    /// Increment by `delta`, clamped at zero on the low end.
    pub async fn add(
        &self,
        user_id: &str,
        product: &EntityRef,
        delta: i64,
    ) -> Result<BTreeMap<String, u32>> {
        let key = product.canonical();
        let current = self
            .carts
            .get_cart(user_id)
            .await?
            .get(&key)
            .copied()
            .unwrap_or(0) as i64;
        self.set_quantity(user_id, product, (current + delta).max(0))
            .await
    }

    pub async fn remove(&self, user_id: &str, product: &EntityRef) -> Result<BTreeMap<String, u32>> {
        self.set_quantity(user_id, product, 0).await
    }

    /// Empty the cart wholesale. Called by the checkout route after an order
    /// is persisted, never by the order assembler itself.
    pub async fn clear(&self, user_id: &str) -> Result<()> {
        self.carts.put_cart(user_id, BTreeMap::new()).await
    }

    /// Sum of all quantities; derived on read, no stored counter.
    pub async fn count(&self, user_id: &str) -> Result<u64> {
        let cart = self.carts.get_cart(user_id).await?;
        Ok(cart.values().map(|&q| q as u64).sum())
    }

    /// Strip a deleted product from every user's cart in one bulk sweep.
    pub async fn remove_product_everywhere(&self, product: &EntityRef) -> Result<u64> {
        let key = product.canonical();
        let modified = self.carts.strip_cart_key(&key).await?;
        info!(product_id = %key, modified, "purged deleted product from carts");
        Ok(modified)
    }
}
