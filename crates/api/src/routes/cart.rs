//! Cart endpoints for signed-in shoppers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use domain::{Cart, CartError, CartItem, CartItemSnapshot, FieldError, VariantInfo};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::identity::RequireIdentity;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
    pub variant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantQuery {
    pub variant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub items: Vec<CartItemSnapshot>,
}

// -- Response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartLineResponse>,
    pub item_count: u64,
    /// Items total in cents.
    pub total: i64,
    pub updated_at: DateTime<Utc>,
}

/// A cart line, in the same shape the client submits as a snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineResponse {
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_info: Option<VariantInfo>,
    pub creator_slug: String,
}

impl From<&CartItem> for CartLineResponse {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id().as_str().to_string(),
            variant_id: item.variant_id().map(str::to_string),
            name: item.name().to_string(),
            price: item.unit_price().cents(),
            quantity: item.quantity(),
            image: item.image().map(str::to_string),
            variant_info: item.variant_info().cloned(),
            creator_slug: item.creator_slug().to_string(),
        }
    }
}

impl TryFrom<&Cart> for CartResponse {
    type Error = CartError;

    fn try_from(cart: &Cart) -> Result<Self, Self::Error> {
        Ok(Self {
            items: cart.items().iter().map(CartLineResponse::from).collect(),
            item_count: cart.item_count(),
            total: cart.total()?.cents(),
            updated_at: cart.updated_at(),
        })
    }
}

// -- Handlers --

/// GET /cart
#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    RequireIdentity(identity): RequireIdentity,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.carts.get_cart(&identity.user_id).await?;
    Ok(Json(CartResponse::try_from(&cart)?))
}

/// POST /cart/items: add one item, incrementing an existing line.
#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    RequireIdentity(identity): RequireIdentity,
    Json(snapshot): Json<CartItemSnapshot>,
) -> Result<Json<CartResponse>, ApiError> {
    let item = snapshot.to_cart_item()?;
    let cart = state.carts.add_item(&identity.user_id, item).await?;
    Ok(Json(CartResponse::try_from(&cart)?))
}

/// PUT /cart/items/{productId}: overwrite a line's quantity; 0 removes it.
#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, %product_id))]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    RequireIdentity(identity): RequireIdentity,
    Path(product_id): Path<String>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state
        .carts
        .update_quantity(
            &identity.user_id,
            &product_id,
            req.quantity,
            req.variant_id.as_deref(),
        )
        .await?;
    Ok(Json(CartResponse::try_from(&cart)?))
}

/// DELETE /cart/items/{productId}?variantId=
#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, %product_id))]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    RequireIdentity(identity): RequireIdentity,
    Path(product_id): Path<String>,
    Query(query): Query<VariantQuery>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state
        .carts
        .remove_item(&identity.user_id, &product_id, query.variant_id.as_deref())
        .await?;
    Ok(Json(CartResponse::try_from(&cart)?))
}

/// DELETE /cart
#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn clear(
    State(state): State<Arc<AppState>>,
    RequireIdentity(identity): RequireIdentity,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.carts.clear(&identity.user_id).await?;
    Ok(Json(CartResponse::try_from(&cart)?))
}

/// POST /cart/merge: fold the guest cart held by the client into the
/// user's cart after sign-in.
#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn merge(
    State(state): State<Arc<AppState>>,
    RequireIdentity(identity): RequireIdentity,
    Json(req): Json<MergeRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let mut guest = Cart::new();
    let mut details = Vec::new();
    for (index, snapshot) in req.items.iter().enumerate() {
        match snapshot.to_cart_item() {
            Ok(item) => guest.add_item(item),
            Err(e) => details.push(FieldError {
                field: format!("items[{index}]"),
                message: e.to_string(),
            }),
        }
    }
    if !details.is_empty() {
        return Err(ApiError::BadRequest {
            message: "Invalid guest cart items".to_string(),
            details,
        });
    }

    let cart = state.carts.merge_guest_cart(&identity.user_id, guest).await?;
    Ok(Json(CartResponse::try_from(&cart)?))
}
