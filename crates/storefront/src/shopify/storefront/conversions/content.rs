//! Menu and blog article conversions.

use crate::shopify::types::{Article, ArticleConnection, Menu, MenuItem};

use super::super::queries::{ArticleNode, Connection, MenuItemNode, MenuNode};
use super::{convert_image, convert_page_info, convert_seo};

pub fn convert_menu(menu: MenuNode) -> Menu {
    Menu {
        handle: menu.handle,
        title: menu.title,
        items: menu.items.into_iter().map(convert_menu_item).collect(),
    }
}

fn convert_menu_item(item: MenuItemNode) -> MenuItem {
    MenuItem {
        title: item.title,
        url: item.url,
        kind: item.kind,
        items: item.items.into_iter().map(convert_menu_item).collect(),
    }
}

pub fn convert_article(article: ArticleNode) -> Article {
    Article {
        id: article.id,
        handle: article.handle,
        blog_handle: article.blog.map(|b| b.handle).unwrap_or_default(),
        title: article.title,
        excerpt: article.excerpt.filter(|e| !e.trim().is_empty()),
        content_html: article.content_html,
        published_at: article.published_at,
        author_name: article.author.and_then(|a| a.name),
        tags: article.tags,
        image: article.image.map(convert_image),
        seo: convert_seo(article.seo),
    }
}

pub fn convert_article_connection(connection: Connection<ArticleNode>) -> ArticleConnection {
    ArticleConnection {
        articles: connection
            .nodes
            .into_iter()
            .map(convert_article)
            .collect(),
        page_info: convert_page_info(connection.page_info),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_menu() {
        let node: MenuNode = serde_json::from_value(serde_json::json!({
            "handle": "main-menu",
            "title": "Main",
            "items": [{
                "title": "Shop",
                "url": "https://shop.example/collections/all",
                "type": "COLLECTION",
                "items": [{"title": "Candles", "type": "COLLECTION"}]
            }]
        }))
        .unwrap();

        let menu = convert_menu(node);
        assert_eq!(menu.items[0].kind, "COLLECTION");
        assert_eq!(menu.items[0].items[0].title, "Candles");
        assert!(menu.items[0].items[0].url.is_none());
        assert!(menu.items[0].items[0].items.is_empty());
    }

    #[test]
    fn test_article_defaults() {
        let node: ArticleNode = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Article/3",
            "handle": "gifting-guide",
            "excerpt": "  "
        }))
        .unwrap();

        let article = convert_article(node);
        assert!(article.blog_handle.is_empty());
        assert!(article.excerpt.is_none());
        assert!(article.author_name.is_none());
    }
}
