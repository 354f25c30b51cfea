use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use uuid::Uuid;

use crate::identity::EntityRef;

/// Order status assigned at checkout. Later transitions belong to seller and
/// admin tooling, which writes whatever label its workflow defines.
pub const ORDER_STATUS_PLACED: &str = "placed";

/// The only payment type recorded by this core: cash-on-delivery intent.
pub const PAYMENT_TYPE_COD: &str = "cod";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Price in minor currency units.
    pub price: i64,
    /// Discounted price, never above `price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_price: Option<i64>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Owning category. Arrives in more than one wire shape; compare only
    /// through `identity::same_entity`.
    pub category: EntityRef,
    pub seller_id: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The price a buyer pays right now.
    pub fn unit_price(&self) -> i64 {
        self.offer_price.unwrap_or(self.price)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("product name must not be empty".into()));
        }
        if self.price < 0 {
            return Err(Error::Validation("price must not be negative".into()));
        }
        if let Some(offer) = self.offer_price {
            if offer < 0 || offer > self.price {
                return Err(Error::Validation(
                    "offer price must be between 0 and the list price".into(),
                ));
            }
        }
        Ok(())
    }
}

/// One entry in an order: a product reference, the requested quantity, and
/// the unit price charged when the total was computed. Unresolved items keep
/// the raw identifier and carry no price, so a discrepancy stays visible to
/// order-review tooling instead of being defaulted to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product: EntityRef,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<i64>,
    #[serde(default)]
    pub unresolved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub items: Vec<LineItem>,
    pub address_id: String,
    /// Line subtotals plus tax, floored to minor units.
    pub amount: i64,
    pub status: String,
    pub payment_type: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, offer_price: Option<i64>) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Keyboard".to_string(),
            description: "Mechanical keyboard".to_string(),
            price,
            offer_price,
            images: vec![],
            category: EntityRef::Id("c1".to_string()),
            seller_id: "s1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unit_price_prefers_offer() {
        assert_eq!(product(1000, None).unit_price(), 1000);
        assert_eq!(product(1000, Some(800)).unit_price(), 800);
    }

    #[test]
    fn test_offer_price_above_list_price_rejected() {
        assert!(product(1000, Some(1200)).validate().is_err());
        assert!(product(1000, Some(1000)).validate().is_ok());
    }

    #[test]
    fn test_round_trip_keeps_wire_field_names() {
        let json = serde_json::to_value(product(1000, Some(800))).unwrap();
        assert!(json.get("offerPrice").is_some());
        assert!(json.get("sellerId").is_some());

        let category = Category::new("Electronics");
        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json.get("isActive"), Some(&serde_json::Value::Bool(true)));
    }
}
