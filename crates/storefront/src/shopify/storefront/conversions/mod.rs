//! Type conversion functions for Shopify Storefront API responses.
//!
//! Every conversion is total: missing optional upstream fields become `None`,
//! empty collections or empty strings.

pub mod cart;
pub mod collections;
pub mod content;
pub mod customer;
pub mod products;

pub use cart::convert_cart;
pub use collections::{convert_collection, convert_collection_connection};
pub use content::{convert_article, convert_article_connection, convert_menu};
pub use customer::{convert_access_token, convert_customer};
pub use products::{convert_product, convert_product_connection};

use crate::shopify::types::{Image, Money, PageInfo, Seo};

use super::queries::{ImageNode, MoneyV2, PageInfoNode, SeoNode};

pub(crate) fn convert_money(m: MoneyV2) -> Money {
    Money {
        amount: m.amount,
        currency_code: m.currency_code,
    }
}

pub(crate) fn convert_image(i: ImageNode) -> Image {
    Image {
        url: i.url,
        alt_text: i.alt_text,
        width: i.width,
        height: i.height,
    }
}

pub(crate) fn convert_seo(seo: Option<SeoNode>) -> Seo {
    seo.map(|s| Seo {
        title: s.title,
        description: s.description,
    })
    .unwrap_or_default()
}

pub(crate) fn convert_page_info(p: PageInfoNode) -> PageInfo {
    PageInfo {
        has_next_page: p.has_next_page,
        has_previous_page: p.has_previous_page,
        start_cursor: p.start_cursor,
        end_cursor: p.end_cursor,
    }
}
