//! Catalog browsing commands.

use std::io::Write;

use shopfront_core::{CategoryId, ProductId, average_grade};

use super::Context;
use crate::error::CliError;

/// List categories.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn categories(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    let categories = ctx.api.categories().await?;
    if categories.is_empty() {
        writeln!(out, "No categories")?;
    }
    for category in categories {
        writeln!(out, "{:>5}  {}", category.id, category.name)?;
    }
    Ok(())
}

/// List products, optionally of one category.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn products(
    ctx: &Context,
    out: &mut impl Write,
    category: Option<CategoryId>,
) -> Result<(), CliError> {
    let products = ctx.api.products(category).await?;
    if products.is_empty() {
        writeln!(out, "No products")?;
    }
    for product in products {
        writeln!(
            out,
            "{:>5}  {:<40} {:>14}",
            product.id,
            product.name,
            product.unit_price().to_string()
        )?;
    }
    Ok(())
}

/// Show one product and its reviews.
///
/// # Errors
///
/// Returns an error if the product can't be loaded. Missing reviews are
/// not an error.
pub async fn product(ctx: &Context, out: &mut impl Write, id: ProductId) -> Result<(), CliError> {
    let (product, reviews) = tokio::join!(ctx.api.product(id), ctx.api.product_reviews(id));
    let product = product?;
    let reviews = reviews.unwrap_or_default();

    writeln!(out, "{} (#{})", product.name, product.id)?;
    writeln!(out, "Price: {}", product.unit_price())?;
    if !product.description.is_empty() {
        writeln!(out, "\n{}", product.description)?;
    }

    writeln!(out)?;
    match average_grade(&reviews) {
        Some(average) => writeln!(out, "Reviews ({}, average {average} / 5):", reviews.len())?,
        None => writeln!(out, "No reviews yet")?,
    }
    for review in &reviews {
        let comment = review.comment.as_deref().unwrap_or_default();
        writeln!(out, "  {}  {comment}", review.stars())?;
    }
    Ok(())
}
