use bazaar::identity::EntityRef;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryActionRequest {
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    #[serde(default)]
    pub offer_price: Option<i64>,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: EntityRef,
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
}

// Cart bodies accept any of the reference wire shapes for the product.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAddRequest {
    pub product_id: EntityRef,
    #[serde(default)]
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdateRequest {
    pub product_id: EntityRef,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveDeletedProductRequest {
    pub product_id: EntityRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub product_id: EntityRef,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub address_id: String,
    pub items: Vec<OrderItemDto>,
}
