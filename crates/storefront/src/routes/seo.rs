//! `robots.txt` and `sitemap.xml`.
//!
//! The sitemap lists the static pages plus the first page of products,
//! collections and blog articles. A failed Shopify lookup drops that section
//! and is logged; the sitemap itself always renders.

use askama::Template;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{instrument, warn};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Pages that exist regardless of catalog contents.
const STATIC_PAGES: [&str; 6] = ["", "/products", "/collections", "/blog", "/gift-builder", "/track"];

/// Paths crawlers should skip.
const DISALLOW: [&str; 3] = ["/api/", "/checkout", "/account"];

/// Items per section.
const SECTION_SIZE: i64 = 250;

#[derive(Template)]
#[template(path = "robots.txt")]
struct RobotsTemplate<'a> {
    base_url: &'a str,
    disallow: &'a [&'a str],
}

/// One `<url>` element.
#[derive(Debug, Clone)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<String>,
    pub changefreq: &'static str,
}

#[derive(Template)]
#[template(path = "sitemap.xml")]
struct SitemapTemplate {
    entries: Vec<SitemapEntry>,
}

fn render(template: &impl Template, content_type: &'static str) -> Result<Response> {
    let body = template
        .render()
        .map_err(|e| AppError::Internal(format!("template render failed: {e}")))?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        body,
    )
        .into_response())
}

/// Keep only the date part of an ISO 8601 timestamp.
fn lastmod(timestamp: Option<&str>) -> Option<String> {
    timestamp
        .and_then(|t| t.get(..10))
        .filter(|d| d.len() == 10)
        .map(String::from)
}

/// GET /robots.txt
pub async fn robots(State(state): State<AppState>) -> Result<Response> {
    render(
        &RobotsTemplate {
            base_url: &state.config().base_url,
            disallow: &DISALLOW,
        },
        "text/plain; charset=utf-8",
    )
}

/// GET /sitemap.xml
#[instrument(skip(state))]
pub async fn sitemap(State(state): State<AppState>) -> Result<Response> {
    let base = state.config().base_url.as_str();
    let shopify = state.shopify();

    let (products, collections, articles) = tokio::join!(
        shopify.get_products(Some(SECTION_SIZE), None, None, None, None),
        shopify.get_collections(Some(SECTION_SIZE), None, None),
        shopify.get_articles(Some(SECTION_SIZE), None),
    );

    let mut entries: Vec<SitemapEntry> = STATIC_PAGES
        .iter()
        .map(|path| SitemapEntry {
            loc: format!("{base}{path}"),
            lastmod: None,
            changefreq: "daily",
        })
        .collect();

    match products {
        Ok(products) => entries.extend(products.products.iter().map(|p| SitemapEntry {
            loc: format!("{base}/products/{}", p.handle),
            lastmod: lastmod(p.updated_at.as_deref()),
            changefreq: "weekly",
        })),
        Err(e) => warn!(error = %e, "Sitemap: products unavailable"),
    }

    match collections {
        Ok(collections) => {
            entries.extend(collections.collections.iter().map(|c| SitemapEntry {
                loc: format!("{base}/collections/{}", c.handle),
                lastmod: lastmod(c.updated_at.as_deref()),
                changefreq: "weekly",
            }));
        }
        Err(e) => warn!(error = %e, "Sitemap: collections unavailable"),
    }

    match articles {
        Ok(articles) => entries.extend(articles.articles.iter().map(|a| SitemapEntry {
            loc: format!("{base}/blog/{}/{}", a.blog_handle, a.handle),
            lastmod: lastmod(a.published_at.as_deref()),
            changefreq: "monthly",
        })),
        Err(e) => warn!(error = %e, "Sitemap: articles unavailable"),
    }

    render(&SitemapTemplate { entries }, "application/xml; charset=utf-8")
}
