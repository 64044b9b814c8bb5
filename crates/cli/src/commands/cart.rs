//! Cart commands.

use std::io::Write;

use shopfront_core::{AddCartItem, CartItemId, Price, ProductId};

use super::Context;
use crate::error::CliError;

/// Print the cart.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the backend request fails.
pub async fn show(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    let cart = ctx
        .api
        .cart(&ctx.token()?)
        .await
        .map_err(CliError::from_authed)?;

    if cart.is_empty() {
        writeln!(out, "Your cart is empty")?;
        return Ok(());
    }

    for item in &cart.items {
        writeln!(
            out,
            "{:>5}  {:<32} {:>12} x{:<3} {:>14}",
            item.id,
            item.display_name(),
            Price::shop(item.unit_price()).to_string(),
            item.quantity(),
            Price::shop(item.line_total()).to_string(),
        )?;
    }
    writeln!(
        out,
        "{} items, total {}",
        cart.item_count(),
        Price::shop(cart.total())
    )?;
    Ok(())
}

/// Add a product to the cart.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the backend request fails.
pub async fn add(
    ctx: &Context,
    out: &mut impl Write,
    product_id: ProductId,
    quantity: u32,
) -> Result<(), CliError> {
    let item = AddCartItem {
        product_id,
        quantity: quantity.max(1),
    };
    ctx.api
        .add_to_cart(&ctx.token()?, &item)
        .await
        .map_err(CliError::from_authed)?;
    writeln!(out, "Added to cart!")?;
    Ok(())
}

/// Remove a cart line.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the backend request fails.
pub async fn remove(ctx: &Context, out: &mut impl Write, id: CartItemId) -> Result<(), CliError> {
    ctx.api
        .remove_cart_item(&ctx.token()?, id)
        .await
        .map_err(CliError::from_authed)?;
    writeln!(out, "Removed item {id}")?;
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the backend request fails.
pub async fn clear(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    ctx.api
        .clear_cart(&ctx.token()?)
        .await
        .map_err(CliError::from_authed)?;
    writeln!(out, "Cart cleared")?;
    Ok(())
}
