//! Wishlist commands.

use std::io::Write;

use shopfront_core::{ProductId, WishlistItemId};

use super::Context;
use crate::error::CliError;

/// Print the wishlist.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the backend request fails.
pub async fn show(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    let wishlist = ctx
        .api
        .wishlist(&ctx.token()?)
        .await
        .map_err(CliError::from_authed)?;

    if wishlist.items.is_empty() {
        writeln!(out, "Your wishlist is empty")?;
    }
    for item in &wishlist.items {
        match &item.product {
            Some(product) => writeln!(
                out,
                "{:>5}  {:<40} {:>14}",
                item.id,
                product.name,
                product.unit_price().to_string()
            )?,
            None => writeln!(out, "{:>5}  Product #{}", item.id, item.product_id)?,
        }
    }
    Ok(())
}

/// Save a product to the wishlist.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the backend request fails.
pub async fn add(ctx: &Context, out: &mut impl Write, product_id: ProductId) -> Result<(), CliError> {
    ctx.api
        .add_to_wishlist(&ctx.token()?, product_id)
        .await
        .map_err(CliError::from_authed)?;
    writeln!(out, "Added to wishlist")?;
    Ok(())
}

/// Remove a wishlist entry.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the backend request fails.
pub async fn remove(
    ctx: &Context,
    out: &mut impl Write,
    id: WishlistItemId,
) -> Result<(), CliError> {
    ctx.api
        .remove_from_wishlist(&ctx.token()?, id)
        .await
        .map_err(CliError::from_authed)?;
    writeln!(out, "Removed entry {id}")?;
    Ok(())
}
