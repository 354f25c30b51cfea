//! Sled-backed implementations of the bazaar repository ports. Documents are
//! stored as JSON values in per-collection trees, with secondary-index trees
//! for the lookups the core performs by something other than the primary id.

mod categories;
mod orders;
mod products;
mod users;

pub use categories::SledCategories;
pub use orders::SledOrders;
pub use products::SledProducts;
pub use users::SledUsers;
