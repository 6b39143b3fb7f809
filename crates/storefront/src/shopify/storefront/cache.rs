//! Cache types for Storefront API responses.

use crate::shopify::types::{
    Article, ArticleConnection, Collection, CollectionConnection, Menu, Product, ProductConnection,
};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductConnection),
    Collection(Box<Collection>),
    Collections(CollectionConnection),
    Menu(Box<Menu>),
    Article(Box<Article>),
    Articles(ArticleConnection),
}
