use std::sync::Arc;
use std::time::Duration;

use bazaar::auth::{AuthService, SessionStore};
use bazaar::cart::CartService;
use bazaar::catalog::CategoryCache;
use bazaar::connection::ConnectionManager;
use bazaar::orders::OrderAssembler;
use bazaar::ports::{
    CartRepository, CategoryRepository, OrderRepository, ProductRepository, UserRepository,
};
use shared::config::Config;

const SESSION_TTL: Duration = Duration::from_secs(3600); // 1 hour
const MAX_SESSIONS: u64 = 10_000;

/// Server state shared across handlers. The composition root: every cache
/// and service is constructed here and injected, nothing lives in module
/// globals.
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<CategoryCache>,
    pub category_store: Arc<dyn CategoryRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub cart: Arc<CartService>,
    pub orders: Arc<OrderAssembler>,
    pub auth: Arc<AuthService>,
    pub sessions: Arc<SessionStore>,
    pub connection: Arc<ConnectionManager>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &Config,
        connection: Arc<ConnectionManager>,
        category_store: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
        users: Arc<dyn UserRepository>,
        carts: Arc<dyn CartRepository>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        let categories = Arc::new(CategoryCache::new(
            category_store.clone(),
            Duration::from_secs(config.category_cache_ttl_secs),
        ));
        let cart = Arc::new(CartService::new(carts));
        let order_assembler = Arc::new(OrderAssembler::new(products.clone(), orders));
        let auth = Arc::new(AuthService::new(users));
        let sessions = Arc::new(SessionStore::new(MAX_SESSIONS, SESSION_TTL));

        Self {
            categories,
            category_store,
            products,
            cart,
            orders: order_assembler,
            auth,
            sessions,
            connection,
        }
    }
}
