//! Product detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use shopfront_core::{ProductId, Review, average_grade};

use crate::error::{AppError, Result};
use crate::filters;
use crate::layout::{Layout, Page};
use crate::routes::catalog::ProductCard;
use crate::state::AppState;

/// Review display data for templates.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub stars: String,
    pub grade: u8,
    pub comment: Option<String>,
    pub date: Option<String>,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            stars: review.stars(),
            grade: review.grade,
            comment: review.comment.clone().filter(|c| !c.trim().is_empty()),
            date: review
                .comment_date
                .map(|d| d.format("%d.%m.%Y").to_string()),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: ProductCard,
    pub reviews: Vec<ReviewView>,
    pub average_grade: Option<String>,
    pub in_wishlist: bool,
    pub return_to: String,
}

/// Display a product and its reviews.
///
/// Reviews are optional: if they fail to load the page renders without them.
/// Signed-in shoppers also get their wishlist checked for this product.
#[instrument(skip(state, page), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    page: Page,
    Path(id): Path<ProductId>,
) -> Result<ProductShowTemplate> {
    let api = state.api();
    let wishlist = async {
        match page.token() {
            Some(token) => api.wishlist(&token).await.ok(),
            None => None,
        }
    };
    let (layout, product, reviews, wishlist) = tokio::join!(
        page.layout(api),
        api.product(id),
        api.product_reviews(id),
        wishlist
    );

    let product = product.map_err(|e| match e {
        crate::api::ApiError::NotFound(_) => AppError::NotFound(format!("product {id}")),
        other => AppError::Api(other),
    })?;

    let reviews = reviews.unwrap_or_else(|e| {
        tracing::warn!("Failed to load reviews: {e}");
        Vec::new()
    });

    Ok(ProductShowTemplate {
        layout,
        product: ProductCard::from(&product),
        average_grade: average_grade(&reviews).map(|g| g.to_string()),
        reviews: reviews.iter().map(ReviewView::from).collect(),
        in_wishlist: wishlist.is_some_and(|w| w.contains(id)),
        return_to: format!("/products/{id}"),
    })
}
