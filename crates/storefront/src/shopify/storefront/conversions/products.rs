//! Product type conversion functions.

use crate::shopify::types::{
    PriceRange, Product, ProductConnection, ProductVariant, SelectedOption,
};

use super::super::queries::{Connection, ProductNode, VariantNode};
use super::{convert_image, convert_money, convert_page_info, convert_seo};

pub fn convert_product(product: ProductNode) -> Product {
    Product {
        id: product.id,
        handle: product.handle,
        title: product.title,
        description: product.description,
        description_html: product.description_html,
        available_for_sale: product.available_for_sale,
        kind: product.product_type,
        vendor: product.vendor,
        tags: product.tags,
        updated_at: product.updated_at,
        seo: convert_seo(product.seo),
        price_range: PriceRange {
            min_variant_price: convert_money(product.price_range.min_variant_price),
            max_variant_price: convert_money(product.price_range.max_variant_price),
        },
        featured_image: product.featured_image.map(convert_image),
        images: product.images.nodes.into_iter().map(convert_image).collect(),
        variants: product
            .variants
            .nodes
            .into_iter()
            .map(convert_variant)
            .collect(),
    }
}

fn convert_variant(v: VariantNode) -> ProductVariant {
    ProductVariant {
        id: v.id,
        title: v.title,
        available_for_sale: v.available_for_sale,
        quantity_available: v.quantity_available,
        sku: v.sku.filter(|s| !s.is_empty()),
        price: convert_money(v.price),
        compare_at_price: v.compare_at_price.map(convert_money),
        selected_options: v
            .selected_options
            .into_iter()
            .map(|o| SelectedOption {
                name: o.name,
                value: o.value,
            })
            .collect(),
        image: v.image.map(convert_image),
    }
}

pub fn convert_product_connection(connection: Connection<ProductNode>) -> ProductConnection {
    ProductConnection {
        products: connection
            .nodes
            .into_iter()
            .map(convert_product)
            .collect(),
        page_info: convert_page_info(connection.page_info),
    }
}
