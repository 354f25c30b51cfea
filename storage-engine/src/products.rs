use async_trait::async_trait;
use bazaar::domain::Product;
use bazaar::ports::ProductRepository;
use shared::Result;
use sled::Db;

const PRODUCTS_TREE: &str = "products";

#[derive(Clone)]
pub struct SledProducts {
    db: Db,
}

impl SledProducts {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    fn products_tree(&self) -> Result<sled::Tree> {
        Ok(self.db.open_tree(PRODUCTS_TREE)?)
    }
}

#[async_trait]
impl ProductRepository for SledProducts {
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>> {
        let tree = self.products_tree()?;

        if let Some(data) = tree.get(id.as_bytes())? {
            let product: Product = serde_json::from_slice(&data)?;
            return Ok(Some(product));
        }

        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<Product>> {
        let tree = self.products_tree()?;
        let mut products = Vec::new();

        for item in tree.iter() {
            let (_, data) = item?;
            products.push(serde_json::from_slice::<Product>(&data)?);
        }

        // Newest first, the order the storefront lists them in.
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn create(&self, product: Product) -> Result<Product> {
        product.validate()?;

        let tree = self.products_tree()?;
        let json = serde_json::to_vec(&product)?;
        tree.insert(product.id.as_bytes(), json)?;

        Ok(product)
    }
}
