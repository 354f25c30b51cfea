use std::collections::BTreeMap;

use async_trait::async_trait;
use bazaar::auth::models::User;
use bazaar::ports::{CartRepository, UserRepository};
use chrono::Utc;
use shared::{Error, Result};
use sled::Db;

const USERS_TREE: &str = "users";
const USERS_BY_USERNAME_TREE: &str = "users_by_username";

#[derive(Clone)]
pub struct SledUsers {
    db: Db,
}

impl SledUsers {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    fn users_tree(&self) -> Result<sled::Tree> {
        Ok(self.db.open_tree(USERS_TREE)?)
    }

    fn by_username_tree(&self) -> Result<sled::Tree> {
        Ok(self.db.open_tree(USERS_BY_USERNAME_TREE)?)
    }

    fn load(&self, id: &str) -> Result<Option<User>> {
        let tree = self.users_tree()?;
        if let Some(data) = tree.get(id.as_bytes())? {
            return Ok(Some(serde_json::from_slice(&data)?));
        }
        Ok(None)
    }

    fn store(&self, user: &User) -> Result<()> {
        let tree = self.users_tree()?;
        let json = serde_json::to_vec(user)?;
        tree.insert(user.id.as_bytes(), json)?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for SledUsers {
    async fn create(&self, user: User) -> Result<User> {
        if self.username_exists(&user.username).await? {
            return Err(Error::Validation(format!(
                "username '{}' is already taken",
                user.username
            )));
        }

        self.store(&user)?;
        self.by_username_tree()?
            .insert(user.username.as_bytes(), user.id.as_bytes())?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        self.load(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let by_username = self.by_username_tree()?;

        if let Some(user_id) = by_username.get(username.as_bytes())? {
            let id = String::from_utf8_lossy(&user_id).to_string();
            return self.load(&id);
        }

        Ok(None)
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        Ok(self.by_username_tree()?.contains_key(username.as_bytes())?)
    }
}

#[async_trait]
impl CartRepository for SledUsers {
    async fn get_cart(&self, user_id: &str) -> Result<BTreeMap<String, u32>> {
        let user = self
            .load(user_id)?
            .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;
        Ok(user.cart_items)
    }

    async fn put_cart(&self, user_id: &str, cart: BTreeMap<String, u32>) -> Result<()> {
        let mut user = self
            .load(user_id)?
            .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;

        user.cart_items = cart;
        user.updated_at = Utc::now();
        self.store(&user)
    }

    async fn strip_cart_key(&self, product_id: &str) -> Result<u64> {
        let tree = self.users_tree()?;
        let mut modified = 0;

        for item in tree.iter() {
            let (key, data) = item?;
            let mut user: User = serde_json::from_slice(&data)?;

            if user.cart_items.remove(product_id).is_some() {
                user.updated_at = Utc::now();
                tree.insert(key, serde_json::to_vec(&user)?)?;
                modified += 1;
            }
        }

        Ok(modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar::auth::models::Role;
    use tempfile::TempDir;

    fn repo() -> (SledUsers, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = sled::open(dir.path().join("db")).unwrap();
        (SledUsers::new(db), dir)
    }

    fn user(username: &str) -> User {
        User::new(username.to_string(), "hash".to_string(), Role::Customer)
    }

    #[tokio::test]
    async fn test_create_and_lookup_by_username() {
        let (repo, _dir) = repo();

        let created = repo.create(user("ada")).await.unwrap();
        let found = repo.find_by_username("ada").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.find_by_username("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let (repo, _dir) = repo();

        repo.create(user("ada")).await.unwrap();
        assert!(matches!(
            repo.create(user("ada")).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_cart_round_trips_through_user_document() {
        let (repo, _dir) = repo();
        let created = repo.create(user("ada")).await.unwrap();

        let mut cart = BTreeMap::new();
        cart.insert("p1".to_string(), 3u32);
        repo.put_cart(&created.id, cart).await.unwrap();

        let stored = repo.get_cart(&created.id).await.unwrap();
        assert_eq!(stored.get("p1"), Some(&3));

        // The map lives on the user document itself.
        let doc = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(doc.cart_items.get("p1"), Some(&3));
    }

    #[tokio::test]
    async fn test_cart_access_for_unknown_user_is_not_found() {
        let (repo, _dir) = repo();
        assert!(matches!(
            repo.get_cart("ghost").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_strip_cart_key_sweeps_every_user() {
        let (repo, _dir) = repo();

        let a = repo.create(user("ada")).await.unwrap();
        let b = repo.create(user("brian")).await.unwrap();
        let c = repo.create(user("carol")).await.unwrap();

        let mut cart = BTreeMap::new();
        cart.insert("p1".to_string(), 2u32);
        cart.insert("p2".to_string(), 1u32);
        repo.put_cart(&a.id, cart.clone()).await.unwrap();
        repo.put_cart(&b.id, cart).await.unwrap();

        let modified = repo.strip_cart_key("p1").await.unwrap();
        assert_eq!(modified, 2);

        assert!(!repo.get_cart(&a.id).await.unwrap().contains_key("p1"));
        assert_eq!(repo.get_cart(&a.id).await.unwrap().get("p2"), Some(&1));
        assert!(!repo.get_cart(&b.id).await.unwrap().contains_key("p1"));
        assert!(repo.get_cart(&c.id).await.unwrap().is_empty());
    }
}
