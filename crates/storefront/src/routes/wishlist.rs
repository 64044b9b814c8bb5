//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::Redirect,
};
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{ProductId, WishlistItem, WishlistItemId};

use crate::filters;
use crate::flash::{self, Flash};
use crate::layout::{Layout, Page};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Wishlist entry display data for templates.
#[derive(Debug, Clone)]
pub struct WishlistEntryView {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Option<String>,
}

impl From<&WishlistItem> for WishlistEntryView {
    fn from(item: &WishlistItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            name: item
                .product
                .as_ref()
                .map_or_else(|| format!("Product #{}", item.product_id), |p| p.name.clone()),
            price: item
                .product
                .as_ref()
                .map(|p| p.unit_price().to_string()),
        }
    }
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistTemplate {
    pub layout: Layout,
    pub entries: Vec<WishlistEntryView>,
    pub error: Option<String>,
}

/// Display the wishlist.
#[instrument(skip(state, page, user))]
pub async fn show(
    State(state): State<AppState>,
    page: Page,
    RequireAuth(user): RequireAuth,
) -> WishlistTemplate {
    let api = state.api();
    let token = user.token();
    let (layout, wishlist) = tokio::join!(page.layout(api), api.wishlist(&token));

    match wishlist {
        Ok(wishlist) => WishlistTemplate {
            layout,
            entries: wishlist.items.iter().map(WishlistEntryView::from).collect(),
            error: None,
        },
        Err(e) => {
            tracing::warn!("Failed to load wishlist: {e}");
            WishlistTemplate {
                layout,
                entries: Vec::new(),
                error: Some(format!("Failed to load wishlist: {}", e.detail())),
            }
        }
    }
}

/// Save a product to the wishlist.
#[instrument(skip(state, session, user), fields(product_id = %product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Redirect {
    match state.api().add_to_wishlist(&user.token(), product_id).await {
        Ok(_) => flash::push(&session, Flash::success("Added to wishlist")).await,
        Err(e) => {
            tracing::error!("Failed to add to wishlist: {e}");
            flash::push(
                &session,
                Flash::error(format!("Failed to add to wishlist: {}", e.detail())),
            )
            .await;
        }
    }
    Redirect::to(&format!("/products/{product_id}"))
}

/// Remove an entry from the wishlist.
#[instrument(skip(state, session, user), fields(item_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<WishlistItemId>,
) -> Redirect {
    if let Err(e) = state.api().remove_from_wishlist(&user.token(), id).await {
        tracing::error!("Failed to remove wishlist entry: {e}");
        flash::push(&session, Flash::error("Failed to remove item")).await;
    }
    Redirect::to("/wishlist")
}
