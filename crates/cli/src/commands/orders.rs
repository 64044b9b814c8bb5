//! Order commands.

use std::io::Write;

use shopfront_core::{Order, OrderId, Price};

use super::Context;
use crate::error::CliError;

/// Place an order from the current cart.
///
/// The cart is read first; an empty cart is reported without contacting
/// the order endpoint.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the cart is empty, or a
/// backend request fails.
pub async fn place(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    let token = ctx.token()?;
    let cart = ctx.api.cart(&token).await.map_err(CliError::from_authed)?;

    let request = cart.order_request();
    if cart.is_empty() || request.is_empty() {
        return Err(CliError::Nothing("Your cart is empty".to_string()));
    }

    let order = ctx
        .api
        .place_order(&token, &request)
        .await
        .map_err(CliError::from_authed)?;
    writeln!(out, "Order placed! Order #{} ({})", order.id, order.total())?;
    Ok(())
}

/// List orders, or show one.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the backend request fails.
pub async fn list(ctx: &Context, out: &mut impl Write, id: Option<OrderId>) -> Result<(), CliError> {
    let token = ctx.token()?;

    if let Some(id) = id {
        let order = ctx.api.order(&token, id).await.map_err(CliError::from_authed)?;
        return write_order(out, &order);
    }

    let orders = ctx.api.orders(&token).await.map_err(CliError::from_authed)?;
    if orders.is_empty() {
        writeln!(out, "No orders yet")?;
    }
    for order in &orders {
        write_order(out, order)?;
    }
    Ok(())
}

fn write_order(out: &mut impl Write, order: &Order) -> Result<(), CliError> {
    writeln!(
        out,
        "Order #{}  {}  {}",
        order.id,
        order.status.label(),
        order.total()
    )?;
    for item in &order.items {
        writeln!(
            out,
            "    {} ×{}  {}",
            item.display_name(),
            item.quantity,
            Price::shop(item.unit_price())
        )?;
    }
    Ok(())
}
