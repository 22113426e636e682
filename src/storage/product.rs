//! Product catalogue storage.
//!
//! Redis key patterns:
//! - `product:{id}` - product record (JSON)
//! - `products` - SET of product ids
//! - `seq:product` - id sequence

use crate::models::{Product, ProductCategory, ProductInput};
use redis::AsyncCommands;

const INDEX_KEY: &str = "products";
const KEY_PREFIX: &str = "product";
const SEQ_KEY: &str = "seq:product";

/// Filters for [`list_products`].
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category: Option<ProductCategory>,
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    pub active_only: bool,
    pub best_sellers_only: bool,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if self.active_only && !product.is_active {
            return false;
        }
        if self.best_sellers_only && !product.is_best_seller {
            return false;
        }
        if self.category.is_some_and(|c| c != product.category) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}

pub async fn create_product<C>(con: &mut C, input: ProductInput) -> Result<Product, redis::RedisError>
where
    C: AsyncCommands,
{
    let id = super::next_id(con, SEQ_KEY).await?;
    let product = input.into_product(id);
    super::insert_indexed(con, INDEX_KEY, KEY_PREFIX, id, &product).await?;
    Ok(product)
}

pub async fn get_product<C>(con: &mut C, id: u64) -> Result<Option<Product>, redis::RedisError>
where
    C: AsyncCommands,
{
    super::get_json(con, &format!("{}:{}", KEY_PREFIX, id)).await
}

/// Replace a product. Returns `None` if the id is unknown.
pub async fn update_product<C>(
    con: &mut C,
    id: u64,
    input: ProductInput,
) -> Result<Option<Product>, redis::RedisError>
where
    C: AsyncCommands,
{
    let product = input.into_product(id);
    if !super::replace_indexed(con, INDEX_KEY, KEY_PREFIX, id, &product).await? {
        return Ok(None);
    }
    Ok(Some(product))
}

pub async fn delete_product<C>(con: &mut C, id: u64) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    super::delete_indexed(con, INDEX_KEY, KEY_PREFIX, id).await
}

/// Products matching `filter`, ordered by (display_order, id).
pub async fn list_products<C>(
    con: &mut C,
    filter: &ProductFilter,
) -> Result<Vec<Product>, redis::RedisError>
where
    C: AsyncCommands,
{
    let mut products: Vec<Product> = super::load_indexed(con, INDEX_KEY, KEY_PREFIX).await?;
    products.retain(|p| filter.matches(p));
    products.sort_by_key(|p| (p.display_order, p.id));
    Ok(products)
}

pub async fn count_products<C>(con: &mut C) -> Result<usize, redis::RedisError>
where
    C: AsyncCommands,
{
    con.scard(INDEX_KEY).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support;

    fn product(name: &str, category: ProductCategory) -> Product {
        Product {
            id: 1,
            name: name.to_string(),
            category,
            price: 4.0,
            image_filename: None,
            description: None,
            is_active: true,
            is_best_seller: false,
            display_order: 0,
        }
    }

    fn input(name: &str, category: ProductCategory, display_order: i32) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            category,
            price: 5.5,
            image_filename: None,
            description: None,
            is_active: true,
            is_best_seller: false,
            display_order,
        }
    }

    #[test]
    fn test_filter_search_is_case_insensitive() {
        let crepe = product("Crêpe Nutella", ProductCategory::CrepesSucrees);
        let filter = ProductFilter {
            search: Some("nutella".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&crepe));

        let filter = ProductFilter {
            search: Some("jambon".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&crepe));
    }

    #[test]
    fn test_filter_flags_and_category() {
        let mut gaufre = product("Gaufre", ProductCategory::Gaufres);
        let filter = ProductFilter {
            category: Some(ProductCategory::Gaufres),
            active_only: true,
            best_sellers_only: true,
            search: Some("  ".to_string()),
        };
        assert!(!filter.matches(&gaufre));

        gaufre.is_best_seller = true;
        assert!(filter.matches(&gaufre));

        gaufre.is_active = false;
        assert!(!filter.matches(&gaufre));

        let box_filter = ProductFilter {
            category: Some(ProductCategory::Box),
            ..Default::default()
        };
        assert!(!box_filter.matches(&product("Gaufre", ProductCategory::Gaufres)));
    }

    #[tokio::test]
    async fn test_product_crud_and_ordering() {
        let Some((mut con, _guard)) = test_support::redis().await else {
            return;
        };

        let late = create_product(&mut con, input("Box Kids", ProductCategory::Box, 5))
            .await
            .unwrap();
        let early = create_product(&mut con, input("Gaufre", ProductCategory::Gaufres, 1))
            .await
            .unwrap();
        assert_ne!(late.id, early.id);

        let all = list_products(&mut con, &ProductFilter::default()).await.unwrap();
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Gaufre", "Box Kids"]);

        let mut changed = input("Gaufre sucre", ProductCategory::Gaufres, 1);
        changed.is_active = false;
        let updated = update_product(&mut con, early.id, changed).await.unwrap().unwrap();
        assert_eq!(updated.name, "Gaufre sucre");

        let active = ProductFilter {
            active_only: true,
            ..Default::default()
        };
        assert_eq!(list_products(&mut con, &active).await.unwrap().len(), 1);

        assert!(delete_product(&mut con, late.id).await.unwrap());
        assert!(!delete_product(&mut con, late.id).await.unwrap());
        assert!(get_product(&mut con, late.id).await.unwrap().is_none());
        assert_eq!(count_products(&mut con).await.unwrap(), 1);

        assert!(update_product(&mut con, 999, input("x", ProductCategory::Box, 0))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_after_delete_does_not_resurrect() {
        let Some((mut con, _guard)) = test_support::redis().await else {
            return;
        };

        let crepe = create_product(&mut con, input("Crêpe sucre", ProductCategory::CrepesSucrees, 0))
            .await
            .unwrap();
        assert!(delete_product(&mut con, crepe.id).await.unwrap());

        let updated = update_product(&mut con, crepe.id, input("Crêpe miel", ProductCategory::CrepesSucrees, 0))
            .await
            .unwrap();
        assert!(updated.is_none());
        assert!(get_product(&mut con, crepe.id).await.unwrap().is_none());
        assert!(list_products(&mut con, &ProductFilter::default())
            .await
            .unwrap()
            .is_empty());
    }
}
