//! Collection type conversion functions.

use crate::shopify::types::{Collection, CollectionConnection};

use super::super::queries::{CollectionNode, Connection};
use super::{convert_image, convert_page_info, convert_product, convert_seo};

pub fn convert_collection(collection: CollectionNode) -> Collection {
    Collection {
        id: collection.id,
        handle: collection.handle,
        title: collection.title,
        description: collection.description,
        updated_at: collection.updated_at,
        seo: convert_seo(collection.seo),
        image: collection.image.map(convert_image),
        products: collection
            .products
            .nodes
            .into_iter()
            .map(convert_product)
            .collect(),
        products_page_info: convert_page_info(collection.products.page_info),
    }
}

pub fn convert_collection_connection(
    connection: Connection<CollectionNode>,
) -> CollectionConnection {
    CollectionConnection {
        collections: connection
            .nodes
            .into_iter()
            .map(convert_collection)
            .collect(),
        page_info: convert_page_info(connection.page_info),
    }
}
