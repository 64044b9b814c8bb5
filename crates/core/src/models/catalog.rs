//! Catalog records: categories, products and reviews.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId, ReviewId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A product offered in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl Product {
    /// Unit price in the shop currency.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::shop(self.price)
    }
}

/// A customer review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    #[serde(default)]
    pub comment: Option<String>,
    pub grade: u8,
    #[serde(default)]
    pub comment_date: Option<NaiveDateTime>,
}

impl Review {
    /// Highest grade a review can carry.
    pub const MAX_GRADE: u8 = 5;

    /// Grade rendered as filled and empty stars, e.g. `★★★☆☆`.
    #[must_use]
    pub fn stars(&self) -> String {
        let filled = usize::from(self.grade.min(Self::MAX_GRADE));
        let empty = usize::from(Self::MAX_GRADE) - filled;
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

/// Average grade of a set of reviews, rounded to one decimal place.
#[must_use]
pub fn average_grade(reviews: &[Review]) -> Option<Decimal> {
    if reviews.is_empty() {
        return None;
    }
    let sum: u32 = reviews.iter().map(|r| u32::from(r.grade)).sum();
    let count = u32::try_from(reviews.len()).ok()?;
    Some((Decimal::from(sum) / Decimal::from(count)).round_dp(1))
}
