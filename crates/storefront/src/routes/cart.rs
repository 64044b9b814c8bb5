//! Cart route handlers.
//!
//! Mutations are plain form POSTs that redirect back with a toast; the cart
//! page itself always re-reads the cart from the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{AddCartItem, Cart, CartItem, CartItemId, Price, ProductId};

use crate::api::ApiError;
use crate::chart::{self, CartChart};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::flash::{self, Flash};
use crate::layout::{Layout, Page};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Where to send the shopper when `return_to` is missing or not local.
const DEFAULT_RETURN: &str = "/catalog";

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: CartItemId,
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id,
            name: item.display_name().to_string(),
            price: Price::shop(item.unit_price()).to_string(),
            quantity: item.quantity(),
            line_total: Price::shop(item.line_total()).to_string(),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub chart: Option<CartChart>,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.items.iter().map(CartLineView::from).collect(),
            total: Price::shop(cart.total()).to_string(),
            chart: CartChart::for_cart(cart),
        }
    }
}

/// Message shown when the cart can't be loaded.
#[must_use]
pub fn load_error_message(error: &ApiError) -> String {
    let status = error
        .status()
        .map_or_else(|| "no response".to_string(), |s| s.to_string());
    format!("Failed to load cart ({status}): {}", error.detail())
}

/// Accept only same-site relative paths as redirect targets.
#[must_use]
pub fn local_return_path(return_to: Option<&str>) -> &str {
    match return_to {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => DEFAULT_RETURN,
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    pub return_to: Option<String>,
}

/// Quantity change form data (`delta` is usually +1 or -1).
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub delta: i32,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub signed_in: bool,
    pub error: Option<String>,
    pub reauth: bool,
    pub cart: CartView,
    pub chart_title: &'static str,
    pub quantity_series: &'static str,
    pub sum_series: &'static str,
}

impl CartShowTemplate {
    fn new(layout: Layout) -> Self {
        Self {
            signed_in: layout.is_signed_in(),
            layout,
            error: None,
            reauth: false,
            cart: CartView::from(&Cart::default()),
            chart_title: chart::TITLE,
            quantity_series: chart::QUANTITY_SERIES,
            sum_series: chart::SUM_SERIES,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, page))]
pub async fn show(State(state): State<AppState>, page: Page) -> CartShowTemplate {
    let api = state.api();

    let Some(token) = page.token() else {
        return CartShowTemplate::new(page.layout(api).await);
    };

    let (layout, cart) = tokio::join!(page.layout(api), api.cart(&token));
    let mut template = CartShowTemplate::new(layout);

    match cart {
        Ok(cart) => template.cart = CartView::from(&cart),
        Err(e) => {
            tracing::warn!("Failed to load cart: {e}");
            template.reauth = e.is_unauthorized();
            template.error = Some(load_error_message(&e));
        }
    }

    template
}

/// Add a product to the cart and go back where the shopper was.
///
/// A 404 from the backend drops the cached catalog.
#[instrument(skip(state, session, user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Redirect {
    let item = AddCartItem {
        product_id: form.product_id,
        quantity: form.quantity.unwrap_or(1).max(1),
    };

    match state.api().add_to_cart(&user.token(), &item).await {
        Ok(_) => {
            let product_id = form.product_id.to_string();
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("product_id", product_id.as_str())]),
            );
            flash::push(&session, Flash::success("Added to cart!")).await;
        }
        Err(e) => {
            tracing::error!("Failed to add item to cart: {e}");
            // The page offered a product the backend no longer has
            if matches!(e, ApiError::NotFound(_)) {
                state.api().invalidate_catalog();
            }
            flash::push(&session, Flash::error("Failed to add to cart")).await;
        }
    }

    Redirect::to(local_return_path(form.return_to.as_deref()))
}

/// Remove a line from the cart.
#[instrument(skip(state, session, user), fields(item_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartItemId>,
) -> Redirect {
    if let Err(e) = state.api().remove_cart_item(&user.token(), id).await {
        tracing::error!("Failed to remove cart item: {e}");
        flash::push(&session, Flash::error("Failed to remove item")).await;
    }
    Redirect::to("/cart")
}

/// Change a line's quantity by a delta.
#[instrument(skip(state, session, user), fields(item_id = %id))]
pub async fn change_quantity(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartItemId>,
    Form(form): Form<QuantityForm>,
) -> Redirect {
    if form.delta != 0
        && let Err(e) = state
            .api()
            .change_cart_item_quantity(&user.token(), id, form.delta)
            .await
    {
        tracing::error!("Failed to change quantity: {e}");
        flash::push(
            &session,
            Flash::error(format!("Failed to update quantity: {}", e.detail())),
        )
        .await;
    }
    Redirect::to("/cart")
}

/// Remove every line from the cart.
#[instrument(skip(state, session, user))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Redirect {
    match state.api().clear_cart(&user.token()).await {
        Ok(()) => flash::push(&session, Flash::success("Cart cleared")).await,
        Err(e) => {
            tracing::error!("Failed to clear cart: {e}");
            flash::push(&session, Flash::error("Failed to clear cart")).await;
        }
    }
    Redirect::to("/cart")
}
