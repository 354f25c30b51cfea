use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use bazaar::catalog::products_in_category;
use bazaar::domain::Product;
use bazaar::identity::EntityRef;
use chrono::Utc;
use shared::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::api::requests::{CreateProductRequest, ProductListQuery};
use crate::api::responses::{ApiError, ProductCreateResponse, ProductListResponse};
use crate::middleware::{require_staff, CurrentUser};
use crate::state::AppState;

/// GET /product/list
///
/// Optionally filtered by `?category=`; the filter matches stored category
/// references of every wire shape.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ProductListResponse>, (StatusCode, Json<ApiError>)> {
    let products = state.products.list_all().await.map_err(|err| {
        error!(%err, "product listing failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new("Failed to load products")),
        )
    })?;

    let data = match query.category {
        Some(category_id) => products_in_category(products, &EntityRef::Id(category_id)),
        None => products,
    };

    Ok(Json(ProductListResponse {
        success: true,
        data,
    }))
}

/// POST /product/create
pub async fn create_product(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateProductRequest>,
) -> Response {
    let user = match require_staff(&current) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        description: req.description,
        price: req.price,
        offer_price: req.offer_price,
        images: req.images,
        category: req.category,
        seller_id: user.id.clone(),
        created_at: Utc::now(),
    };

    match state.products.create(product).await {
        Ok(product) => {
            info!(product_id = %product.id, seller = %user.username, "product created");
            Json(ProductCreateResponse {
                success: true,
                data: product,
            })
            .into_response()
        }
        Err(Error::Validation(msg)) => {
            (StatusCode::BAD_REQUEST, Json(ApiError::new(msg))).into_response()
        }
        Err(err) => {
            error!(%err, "product creation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("Failed to create product")),
            )
                .into_response()
        }
    }
}
