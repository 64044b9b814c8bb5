//! Order route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::Redirect,
};
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{Order, OrderId, OrderItem, OrderStatus, Price};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::flash::{self, Flash};
use crate::layout::{Layout, Page};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Order line display data for templates.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
}

impl From<&OrderItem> for OrderLineView {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.display_name().to_string(),
            quantity: item.quantity,
            price: Price::shop(item.unit_price()).to_string(),
        }
    }
}

/// Order display data for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total: String,
    pub lines: Vec<OrderLineView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            status: order.status,
            total: order.total().to_string(),
            lines: order.items.iter().map(OrderLineView::from).collect(),
        }
    }
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    pub orders: Vec<OrderView>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub layout: Layout,
    pub order: OrderView,
}

/// Place an order from the current cart contents.
///
/// The cart is re-read first so the order reflects what the backend holds,
/// and an empty cart never reaches the order endpoint.
#[instrument(skip(state, session, user))]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Redirect {
    let token = user.token();
    let api = state.api();

    let cart = match api.cart(&token).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::error!("Failed to read cart before ordering: {e}");
            flash::push(&session, Flash::error("Failed to place order")).await;
            return Redirect::to("/cart");
        }
    };

    let request = cart.order_request();
    if cart.is_empty() || request.is_empty() {
        flash::push(&session, Flash::error("Your cart is empty")).await;
        return Redirect::to("/cart");
    }

    match api.place_order(&token, &request).await {
        Ok(order) => {
            let order_id = order.id.to_string();
            add_breadcrumb("order", "Order placed", Some(&[("order_id", order_id.as_str())]));
            tracing::info!(order_id = %order.id, "Order placed");
            flash::push(&session, Flash::success("Order placed!")).await;
            Redirect::to("/orders")
        }
        Err(e) => {
            tracing::error!("Failed to place order: {e}");
            flash::push(&session, Flash::error("Failed to place order")).await;
            Redirect::to("/cart")
        }
    }
}

/// Order history.
///
/// A failed load renders the same "No orders yet" state as an empty history.
#[instrument(skip(state, page, user))]
pub async fn index(
    State(state): State<AppState>,
    page: Page,
    RequireAuth(user): RequireAuth,
) -> OrdersTemplate {
    let api = state.api();
    let token = user.token();
    let (layout, orders) = tokio::join!(page.layout(api), api.orders(&token));

    let orders = orders.unwrap_or_else(|e| {
        tracing::warn!("Failed to load orders: {e}");
        Vec::new()
    });

    OrdersTemplate {
        layout,
        orders: orders.iter().map(OrderView::from).collect(),
    }
}

/// Order detail.
#[instrument(skip(state, page, user), fields(order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    page: Page,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<OrderShowTemplate> {
    let api = state.api();
    let token = user.token();
    let (layout, order) = tokio::join!(page.layout(api), api.order(&token, id));

    let order = order.map_err(|e| match e {
        crate::api::ApiError::NotFound(_) => AppError::NotFound(format!("order {id}")),
        other => AppError::Api(other),
    })?;

    Ok(OrderShowTemplate {
        layout,
        order: OrderView::from(&order),
    })
}
