use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{Error, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::models::Role;
use crate::domain::{LineItem, Order, ORDER_STATUS_PLACED, PAYMENT_TYPE_COD};
use crate::identity::EntityRef;
use crate::ports::{OrderRepository, ProductRepository};

/// Flat tax applied to every order total, in percent.
pub const TAX_RATE_PERCENT: i64 = 2;

/// One requested item at checkout, before price resolution.
pub struct OrderItemRequest {
    pub product: EntityRef,
    pub quantity: i64,
}

/// Who is asking for an order listing. Customers see their own orders;
/// sellers and admins see everything.
pub struct Requester {
    pub user_id: String,
    pub role: Role,
}

/// Display view of a line item's product, rebuilt from the live catalog at
/// read time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub name: String,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub available: bool,
}

impl ProductView {
    fn unavailable() -> Self {
        Self {
            name: "Product unavailable".to_string(),
            price: 0,
            offer_price: None,
            image: None,
            available: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemView {
    pub product_id: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<i64>,
    pub unresolved: bool,
    pub product: ProductView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub items: Vec<LineItemView>,
    pub address_id: String,
    pub amount: i64,
    pub status: String,
    pub payment_type: String,
    pub created_at: DateTime<Utc>,
}

/// Turns a cart snapshot plus shipping address into a persisted, priced
/// order. Pricing always uses the current catalog price, not a price
/// captured earlier in the session. The assembler never touches the cart;
/// clearing it after a successful order is the caller's separate,
/// independently retryable step.
pub struct OrderAssembler {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl OrderAssembler {
    pub fn new(products: Arc<dyn ProductRepository>, orders: Arc<dyn OrderRepository>) -> Self {
        Self { products, orders }
    }

    /// Assemble and persist an order. A product that cannot be resolved does
    /// not abort the checkout: its line item is recorded unresolved with the
    /// raw identifier so a human can reconcile it later. The discrepancy is
    /// never priced at zero into the total.
    pub async fn create_order(
        &self,
        user_id: &str,
        address_id: &str,
        items: &[OrderItemRequest],
    ) -> Result<Order> {
        if items.is_empty() {
            return Err(Error::Validation("order must contain at least one item".into()));
        }
        if address_id.trim().is_empty() {
            return Err(Error::Validation("shipping address is required".into()));
        }
        for item in items {
            if item.quantity <= 0 {
                return Err(Error::Validation(
                    "item quantity must be a positive integer".into(),
                ));
            }
        }

        let mut line_items = Vec::with_capacity(items.len());
        let mut subtotal: i64 = 0;

        for item in items {
            let product_id = item.product.canonical();
            let quantity = item.quantity as u32;

            match self.products.find_by_id(&product_id).await? {
                Some(product) => {
                    let unit_price = product.unit_price();
                    subtotal += unit_price * item.quantity;
                    line_items.push(LineItem {
                        product: EntityRef::Id(product_id),
                        quantity,
                        unit_price: Some(unit_price),
                        unresolved: false,
                    });
                }
                None => {
                    warn!(%product_id, "checkout references a missing product; recording unresolved line item");
                    line_items.push(LineItem {
                        product: EntityRef::Id(product_id),
                        quantity,
                        unit_price: None,
                        unresolved: true,
                    });
                }
            }
        }

        // Integer arithmetic on minor units; division floors the tax.
        let tax = subtotal * TAX_RATE_PERCENT / 100;

        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number: format!("ORD-{:08}", rand::random::<u32>() % 100_000_000),
            user_id: user_id.to_string(),
            items: line_items,
            address_id: address_id.to_string(),
            amount: subtotal + tax,
            status: ORDER_STATUS_PLACED.to_string(),
            payment_type: PAYMENT_TYPE_COD.to_string(),
            created_at: Utc::now(),
        };

        let persisted = self.orders.insert(order).await?;
        info!(order_id = %persisted.id, amount = persisted.amount, "order placed");
        Ok(persisted)
    }

    /// Role-shaped order listing, hydrated against the live catalog. A
    /// product deleted since the order was placed renders as a "product
    /// unavailable" placeholder instead of failing the listing.
    pub async fn list_orders(&self, requester: &Requester) -> Result<Vec<OrderView>> {
        let orders = match requester.role {
            Role::Customer => self.orders.find_by_user(&requester.user_id).await?,
            Role::Seller | Role::Admin => self.orders.list_all().await?,
        };

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            views.push(self.hydrate(order).await?);
        }
        Ok(views)
    }

    async fn hydrate(&self, order: Order) -> Result<OrderView> {
        let mut items = Vec::with_capacity(order.items.len());
        for item in order.items {
            let product_id = item.product.canonical();
            let product = match self.products.find_by_id(&product_id).await? {
                Some(p) => ProductView {
                    name: p.name,
                    price: p.price,
                    offer_price: p.offer_price,
                    image: p.images.into_iter().next(),
                    available: true,
                },
                None => ProductView::unavailable(),
            };
            items.push(LineItemView {
                product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                unresolved: item.unresolved,
                product,
            });
        }

        Ok(OrderView {
            id: order.id,
            order_number: order.order_number,
            user_id: order.user_id,
            items,
            address_id: order.address_id,
            amount: order.amount,
            status: order.status,
            payment_type: order.payment_type,
            created_at: order.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Product;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryProducts {
        products: Mutex<HashMap<String, Product>>,
    }

    impl MemoryProducts {
        fn with(products: Vec<Product>) -> Arc<Self> {
            let repo = Self::default();
            {
                let mut map = repo.products.lock().unwrap();
                for p in products {
                    map.insert(p.id.clone(), p);
                }
            }
            Arc::new(repo)
        }
    }

    #[async_trait]
    impl ProductRepository for MemoryProducts {
        async fn find_by_id(&self, id: &str) -> shared::Result<Option<Product>> {
            Ok(self.products.lock().unwrap().get(id).cloned())
        }

        async fn list_all(&self) -> shared::Result<Vec<Product>> {
            Ok(self.products.lock().unwrap().values().cloned().collect())
        }

        async fn create(&self, product: Product) -> shared::Result<Product> {
            self.products
                .lock()
                .unwrap()
                .insert(product.id.clone(), product.clone());
            Ok(product)
        }
    }

    #[derive(Default)]
    struct MemoryOrders {
        orders: Mutex<Vec<Order>>,
    }

    #[async_trait]
    impl OrderRepository for MemoryOrders {
        async fn insert(&self, order: Order) -> shared::Result<Order> {
            self.orders.lock().unwrap().push(order.clone());
            Ok(order)
        }

        async fn find_by_user(&self, user_id: &str) -> shared::Result<Vec<Order>> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn list_all(&self) -> shared::Result<Vec<Order>> {
            Ok(self.orders.lock().unwrap().clone())
        }
    }

    fn product(id: &str, price: i64, offer_price: Option<i64>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            description: String::new(),
            price,
            offer_price,
            images: vec![format!("https://img.example/{id}.jpg")],
            category: EntityRef::Id("c1".to_string()),
            seller_id: "s1".to_string(),
            created_at: Utc::now(),
        }
    }

    fn assembler(products: Vec<Product>) -> (OrderAssembler, Arc<MemoryOrders>) {
        let orders = Arc::new(MemoryOrders::default());
        (
            OrderAssembler::new(MemoryProducts::with(products), orders.clone()),
            orders,
        )
    }

    #[tokio::test]
    async fn test_total_is_subtotal_plus_two_percent_tax() {
        let (assembler, _) = assembler(vec![product("p1", 1000, None), product("p2", 500, None)]);

        let order = assembler
            .create_order(
                "u1",
                "addr1",
                &[
                    OrderItemRequest {
                        product: EntityRef::Id("p1".to_string()),
                        quantity: 2,
                    },
                    OrderItemRequest {
                        product: EntityRef::Id("p2".to_string()),
                        quantity: 1,
                    },
                ],
            )
            .await
            .unwrap();

        // subtotal 2500, tax 50, total 2550
        assert_eq!(order.amount, 2550);
        assert_eq!(order.status, "placed");
        assert_eq!(order.payment_type, "cod");
        assert_eq!(order.items.len(), 2);
    }

    #[tokio::test]
    async fn test_offer_price_used_when_present() {
        let (assembler, _) = assembler(vec![product("p1", 1000, Some(800))]);

        let order = assembler
            .create_order(
                "u1",
                "addr1",
                &[OrderItemRequest {
                    product: EntityRef::Id("p1".to_string()),
                    quantity: 1,
                }],
            )
            .await
            .unwrap();

        assert_eq!(order.items[0].unit_price, Some(800));
        assert_eq!(order.amount, 816); // 800 + 2%
    }

    #[tokio::test]
    async fn test_tax_floors_to_minor_units() {
        let (assembler, _) = assembler(vec![product("p1", 99, None)]);

        let order = assembler
            .create_order(
                "u1",
                "addr1",
                &[OrderItemRequest {
                    product: EntityRef::Id("p1".to_string()),
                    quantity: 1,
                }],
            )
            .await
            .unwrap();

        // 99 * 2 / 100 = 1.98, floored to 1
        assert_eq!(order.amount, 100);
    }

    #[tokio::test]
    async fn test_missing_product_becomes_unresolved_line_item() {
        let (assembler, persisted) = assembler(vec![product("p1", 1000, None)]);

        let order = assembler
            .create_order(
                "u1",
                "addr1",
                &[
                    OrderItemRequest {
                        product: EntityRef::Id("p1".to_string()),
                        quantity: 1,
                    },
                    OrderItemRequest {
                        product: EntityRef::Id("deleted".to_string()),
                        quantity: 3,
                    },
                ],
            )
            .await
            .unwrap();

        assert_eq!(persisted.orders.lock().unwrap().len(), 1);
        assert_eq!(order.items.len(), 2);

        let resolved = &order.items[0];
        assert!(!resolved.unresolved);
        assert_eq!(resolved.unit_price, Some(1000));

        let placeholder = &order.items[1];
        assert!(placeholder.unresolved);
        assert_eq!(placeholder.unit_price, None);
        assert_eq!(placeholder.product.canonical(), "deleted");
        assert_eq!(placeholder.quantity, 3);

        // Only the resolved line contributes to the total.
        assert_eq!(order.amount, 1020);
    }

    #[tokio::test]
    async fn test_empty_items_and_bad_quantities_rejected_before_persistence() {
        let (assembler, persisted) = assembler(vec![product("p1", 1000, None)]);

        assert!(matches!(
            assembler.create_order("u1", "addr1", &[]).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            assembler
                .create_order(
                    "u1",
                    "addr1",
                    &[OrderItemRequest {
                        product: EntityRef::Id("p1".to_string()),
                        quantity: 0,
                    }],
                )
                .await,
            Err(Error::Validation(_))
        ));
        assert!(persisted.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrapped_reference_resolves_product_at_checkout() {
        let (assembler, _) = assembler(vec![product("p1", 500, None)]);

        let order = assembler
            .create_order(
                "u1",
                "addr1",
                &[OrderItemRequest {
                    product: EntityRef::Oid {
                        oid: "p1".to_string(),
                    },
                    quantity: 1,
                }],
            )
            .await
            .unwrap();

        assert!(!order.items[0].unresolved);
        assert_eq!(order.items[0].product.canonical(), "p1");
    }

    #[tokio::test]
    async fn test_listing_is_role_filtered() {
        let (assembler, _) = assembler(vec![product("p1", 1000, None)]);
        let item = || {
            vec![OrderItemRequest {
                product: EntityRef::Id("p1".to_string()),
                quantity: 1,
            }]
        };

        assembler.create_order("u1", "a1", &item()).await.unwrap();
        assembler.create_order("u2", "a2", &item()).await.unwrap();
        assembler.create_order("u3", "a3", &item()).await.unwrap();

        let own = assembler
            .list_orders(&Requester {
                user_id: "u1".to_string(),
                role: Role::Customer,
            })
            .await
            .unwrap();
        assert_eq!(own.len(), 1);
        assert!(own.iter().all(|o| o.user_id == "u1"));

        let all = assembler
            .list_orders(&Requester {
                user_id: "u1".to_string(),
                role: Role::Admin,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let seller = assembler
            .list_orders(&Requester {
                user_id: "seller".to_string(),
                role: Role::Seller,
            })
            .await
            .unwrap();
        assert_eq!(seller.len(), 3);
    }

    #[tokio::test]
    async fn test_listing_substitutes_placeholder_for_deleted_product() {
        let products = MemoryProducts::with(vec![product("p1", 1000, None)]);
        let orders = Arc::new(MemoryOrders::default());
        let assembler = OrderAssembler::new(products.clone(), orders.clone());

        assembler
            .create_order(
                "u1",
                "a1",
                &[OrderItemRequest {
                    product: EntityRef::Id("p1".to_string()),
                    quantity: 1,
                }],
            )
            .await
            .unwrap();

        // Product deleted after the order was placed.
        products.products.lock().unwrap().clear();

        let views = assembler
            .list_orders(&Requester {
                user_id: "u1".to_string(),
                role: Role::Customer,
            })
            .await
            .unwrap();

        let item = &views[0].items[0];
        assert!(!item.product.available);
        assert_eq!(item.product.name, "Product unavailable");
        // The price charged at checkout is still on the stored line.
        assert_eq!(item.unit_price, Some(1000));
    }
}
