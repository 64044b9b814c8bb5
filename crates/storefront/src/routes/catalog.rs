//! Landing page and catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::{Category, CategoryId, Product, ProductId};

use crate::filters;
use crate::layout::{Layout, Page};
use crate::state::AppState;

/// Category bar entry.
#[derive(Debug, Clone)]
pub struct CategoryLink {
    pub name: String,
    pub href: String,
    pub active: bool,
}

impl CategoryLink {
    fn all(selected: Option<CategoryId>) -> Self {
        Self {
            name: "All".to_string(),
            href: "/catalog".to_string(),
            active: selected.is_none(),
        }
    }

    fn for_category(category: &Category, selected: Option<CategoryId>) -> Self {
        Self {
            name: category.name.clone(),
            href: catalog_href(Some(category.id)),
            active: selected == Some(category.id),
        }
    }
}

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.unit_price().to_string(),
        }
    }
}

fn catalog_href(category: Option<CategoryId>) -> String {
    category.map_or_else(|| "/catalog".to_string(), |id| format!("/catalog?category={id}"))
}

/// Catalog query parameters.
///
/// `category` is taken leniently: anything that isn't an id shows all products.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

impl CatalogQuery {
    fn category_id(&self) -> Option<CategoryId> {
        self.category.as_deref().and_then(|s| s.parse().ok())
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Landing page for guests.
#[derive(Template, WebTemplate)]
#[template(path = "landing.html")]
pub struct LandingTemplate {
    pub layout: Layout,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogTemplate {
    pub layout: Layout,
    pub categories: Vec<CategoryLink>,
    pub categories_error: Option<String>,
    pub products: Vec<ProductCard>,
    pub products_error: Option<String>,
    pub return_to: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Home: landing screen for guests, catalog for signed-in users.
#[instrument(skip(state, page))]
pub async fn home(State(state): State<AppState>, page: Page) -> Response {
    if page.user().is_none() {
        let layout = page.layout(state.api()).await;
        return LandingTemplate { layout }.into_response();
    }

    render_catalog(&state, &page, None).await.into_response()
}

/// Catalog page with optional category filter.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    page: Page,
    Query(query): Query<CatalogQuery>,
) -> CatalogTemplate {
    render_catalog(&state, &page, query.category_id()).await
}

/// Fetch categories and products concurrently and build the catalog page.
async fn render_catalog(
    state: &AppState,
    page: &Page,
    selected: Option<CategoryId>,
) -> CatalogTemplate {
    let api = state.api();
    let (layout, categories, products) = tokio::join!(
        page.layout(api),
        api.categories(),
        api.products(selected)
    );

    let (categories, categories_error) = match categories {
        Ok(categories) => (
            std::iter::once(CategoryLink::all(selected))
                .chain(
                    categories
                        .iter()
                        .map(|c| CategoryLink::for_category(c, selected)),
                )
                .collect(),
            None,
        ),
        Err(e) => {
            tracing::warn!("Failed to load categories: {e}");
            (Vec::new(), Some("Failed to load categories".to_string()))
        }
    };

    let (products, products_error) = match products {
        Ok(products) => (products.iter().map(ProductCard::from).collect(), None),
        Err(e) => {
            tracing::warn!("Failed to load products: {e}");
            (Vec::new(), Some("Failed to load products".to_string()))
        }
    };

    CatalogTemplate {
        layout,
        categories,
        categories_error,
        products,
        products_error,
        return_to: catalog_href(selected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_query_is_lenient() {
        let query = |s: Option<&str>| CatalogQuery {
            category: s.map(String::from),
        };
        assert_eq!(query(Some("3")).category_id(), Some(CategoryId::new(3)));
        assert_eq!(query(Some("")).category_id(), None);
        assert_eq!(query(Some("abc")).category_id(), None);
        assert_eq!(query(None).category_id(), None);
    }

    #[test]
    fn test_category_links() {
        let category = Category {
            id: CategoryId::new(2),
            name: "Tea".to_string(),
        };
        let link = CategoryLink::for_category(&category, Some(CategoryId::new(2)));
        assert!(link.active);
        assert_eq!(link.href, "/catalog?category=2");
        assert!(!CategoryLink::all(Some(CategoryId::new(2))).active);
        assert!(CategoryLink::all(None).active);
    }
}
