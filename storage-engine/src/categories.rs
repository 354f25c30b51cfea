use async_trait::async_trait;
use bazaar::domain::Category;
use bazaar::ports::CategoryRepository;
use shared::{Error, Result};
use sled::Db;

const CATEGORIES_TREE: &str = "categories";
const CATEGORIES_BY_NAME_TREE: &str = "categories_by_name";

#[derive(Clone)]
pub struct SledCategories {
    db: Db,
}

impl SledCategories {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    fn categories_tree(&self) -> Result<sled::Tree> {
        Ok(self.db.open_tree(CATEGORIES_TREE)?)
    }

    fn by_name_tree(&self) -> Result<sled::Tree> {
        Ok(self.db.open_tree(CATEGORIES_BY_NAME_TREE)?)
    }
}

#[async_trait]
impl CategoryRepository for SledCategories {
    async fn list_active(&self) -> Result<Vec<Category>> {
        let tree = self.categories_tree()?;
        let mut categories = Vec::new();

        for item in tree.iter() {
            let (_, data) = item?;
            let category: Category = serde_json::from_slice(&data)?;
            if category.is_active {
                categories.push(category);
            }
        }

        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Category>> {
        let tree = self.categories_tree()?;

        if let Some(data) = tree.get(id.as_bytes())? {
            let category: Category = serde_json::from_slice(&data)?;
            return Ok(Some(category));
        }

        Ok(None)
    }

    async fn create(&self, category: Category) -> Result<Category> {
        let tree = self.categories_tree()?;
        let by_name = self.by_name_tree()?;

        // Names are unique within the active set only; a name released by a
        // deactivated category may be reused.
        if let Some(existing_id) = by_name.get(category.name.as_bytes())? {
            if let Some(data) = tree.get(&existing_id)? {
                let existing: Category = serde_json::from_slice(&data)?;
                if existing.is_active {
                    return Err(Error::Validation(format!(
                        "category '{}' already exists",
                        category.name
                    )));
                }
            }
        }

        let json = serde_json::to_vec(&category)?;
        tree.insert(category.id.as_bytes(), json)?;
        by_name.insert(category.name.as_bytes(), category.id.as_bytes())?;

        Ok(category)
    }
}
