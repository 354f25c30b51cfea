pub mod auth;
pub mod cart;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;

pub use auth::login;
pub use cart::{add_to_cart, get_cart, remove_deleted_product, update_cart};
pub use categories::{category_action, create_category, get_category, list_categories};
pub use health::health_check;
pub use orders::{create_order, get_orders, seller_orders};
pub use products::{create_product, list_products};
