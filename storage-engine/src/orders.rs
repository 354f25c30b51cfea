use async_trait::async_trait;
use bazaar::domain::Order;
use bazaar::ports::OrderRepository;
use shared::Result;
use sled::Db;

const ORDERS_TREE: &str = "orders";

#[derive(Clone)]
pub struct SledOrders {
    db: Db,
}

impl SledOrders {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    fn orders_tree(&self) -> Result<sled::Tree> {
        Ok(self.db.open_tree(ORDERS_TREE)?)
    }

    fn scan(&self) -> Result<Vec<Order>> {
        let tree = self.orders_tree()?;
        let mut orders = Vec::new();

        for item in tree.iter() {
            let (_, data) = item?;
            orders.push(serde_json::from_slice::<Order>(&data)?);
        }

        // Newest first for every listing surface.
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

#[async_trait]
impl OrderRepository for SledOrders {
    async fn insert(&self, order: Order) -> Result<Order> {
        let tree = self.orders_tree()?;
        let json = serde_json::to_vec(&order)?;
        tree.insert(order.id.as_bytes(), json)?;
        Ok(order)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Order>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|o| o.user_id == user_id)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Order>> {
        self.scan()
    }
}
