use std::collections::BTreeMap;

use bazaar::auth::models::{Role, User};
use bazaar::connection::ConnectionStatus;
use bazaar::domain::{Category, Order, Product};
use bazaar::orders::OrderView;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
    pub connection: ConnectionStatus,
}

/// Failure/notice body for the category surfaces.
#[derive(Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Failure body for the cart and order surfaces.
#[derive(Serialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Serialize)]
pub struct CategoryListResponse {
    pub success: bool,
    pub data: Vec<Category>,
    pub cached: bool,
}

#[derive(Serialize)]
pub struct CategoryResponse {
    pub success: bool,
    pub data: Category,
}

#[derive(Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub data: Vec<Product>,
}

#[derive(Serialize)]
pub struct ProductCreateResponse {
    pub success: bool,
    pub data: Product,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub success: bool,
    pub cart_items: BTreeMap<String, u32>,
    pub count: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPurgeResponse {
    pub success: bool,
    pub modified_count: u64,
}

#[derive(Serialize)]
pub struct OrderCreateResponse {
    pub success: bool,
    pub order: Order,
}

#[derive(Serialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub orders: Vec<OrderView>,
}
