//! Domain types for the Shopify Storefront API.
//!
//! These types provide a clean, ergonomic API separate from the raw
//! GraphQL response shapes in `storefront::queries`.

use boxcraft_core::{FulfillmentStatus, LoyaltyStatus, Price};
use serde::{Deserialize, Serialize};

// =============================================================================
// Money Types
// =============================================================================

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Parse into a typed price. `None` for unsupported currencies or
    /// malformed amounts.
    #[must_use]
    pub fn to_price(&self) -> Option<Price> {
        Price::from_shopify(&self.amount, &self.currency_code).ok()
    }

    /// Display string, e.g. `$12.50`. Falls back to `12.50 XYZ` for
    /// currencies the store does not support.
    #[must_use]
    pub fn display(&self) -> String {
        self.to_price().map_or_else(
            || format!("{} {}", self.amount, self.currency_code),
            |price| price.display(),
        )
    }
}

/// Price range for a product.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Money,
    /// Maximum price among all variants.
    pub max_variant_price: Money,
}

// =============================================================================
// Image and SEO Types
// =============================================================================

/// Product, collection or article image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
    /// Image width in pixels.
    pub width: Option<i64>,
    /// Image height in pixels.
    pub height: Option<i64>,
}

/// SEO metadata.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Seo {
    /// Page title for search engines.
    pub title: Option<String>,
    /// Meta description.
    pub description: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// Selected option on a product variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Scent").
    pub name: String,
    /// Selected value (e.g., "Large", "Lavender").
    pub value: String,
}

/// A product variant (specific combination of options).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID.
    pub id: String,
    /// Variant title (combination of option values).
    pub title: String,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Quantity available (if inventory tracking enabled).
    pub quantity_available: Option<i64>,
    /// SKU code.
    pub sku: Option<String>,
    /// Current price.
    pub price: Money,
    /// Compare-at price (original price if on sale).
    pub compare_at_price: Option<Money>,
    /// Selected options for this variant.
    pub selected_options: Vec<SelectedOption>,
    /// Variant image.
    pub image: Option<Image>,
}

/// A product in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: String,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// HTML description.
    pub description_html: String,
    /// Whether any variant is available.
    pub available_for_sale: bool,
    /// Product type/category.
    #[serde(rename = "product_type")]
    pub kind: String,
    /// Vendor name.
    pub vendor: String,
    /// Product tags.
    pub tags: Vec<String>,
    /// Last update timestamp.
    pub updated_at: Option<String>,
    /// SEO metadata.
    pub seo: Seo,
    /// Price range across variants.
    pub price_range: PriceRange,
    /// Featured image.
    pub featured_image: Option<Image>,
    /// All product images.
    pub images: Vec<Image>,
    /// Product variants.
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// First variant that can be bought, falling back to the first variant.
    #[must_use]
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|v| v.available_for_sale)
            .or_else(|| self.variants.first())
    }
}

// =============================================================================
// Collection Types
// =============================================================================

/// A collection of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Collection ID.
    pub id: String,
    /// URL handle.
    pub handle: String,
    /// Collection title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// Last update timestamp.
    pub updated_at: Option<String>,
    /// SEO metadata.
    pub seo: Seo,
    /// Collection image.
    pub image: Option<Image>,
    /// Products in this collection (first page).
    pub products: Vec<Product>,
    /// Pagination info for `products`.
    pub products_page_info: PageInfo,
}

// =============================================================================
// Pagination Types
// =============================================================================

/// Pagination information.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Whether there are items before this page.
    pub has_previous_page: bool,
    /// Cursor for the first item.
    pub start_cursor: Option<String>,
    /// Cursor for the last item.
    pub end_cursor: Option<String>,
}

/// Paginated list of products.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProductConnection {
    /// Products in this page.
    pub products: Vec<Product>,
    /// Pagination info.
    pub page_info: PageInfo,
}

/// Paginated list of collections.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CollectionConnection {
    /// Collections in this page.
    pub collections: Vec<Collection>,
    /// Pagination info.
    pub page_info: PageInfo,
}

/// Sort keys for product queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSortKey {
    Title,
    UpdatedAt,
    CreatedAt,
    BestSelling,
    Price,
    Relevance,
}

impl ProductSortKey {
    /// Parse a query-string value such as `price` or `best-selling`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "title" => Some(Self::Title),
            "updated_at" | "updated" => Some(Self::UpdatedAt),
            "created_at" | "newest" => Some(Self::CreatedAt),
            "best_selling" => Some(Self::BestSelling),
            "price" => Some(Self::Price),
            "relevance" => Some(Self::Relevance),
            _ => None,
        }
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// Custom attribute (key-value pair).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute key.
    pub key: String,
    /// Attribute value.
    pub value: Option<String>,
}

/// Input for custom attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeInput {
    /// Attribute key.
    pub key: String,
    /// Attribute value.
    pub value: String,
}

/// Merchandise in a cart line (simplified product variant info).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartMerchandise {
    /// Variant ID.
    pub id: String,
    /// Variant title.
    pub title: String,
    /// Current price.
    pub price: Money,
    /// Variant image.
    pub image: Option<Image>,
    /// Parent product info.
    pub product: CartMerchandiseProduct,
}

/// Simplified product info for cart merchandise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartMerchandiseProduct {
    /// Product ID.
    pub id: String,
    /// Product handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Vendor.
    pub vendor: String,
}

/// Cost for a cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineCost {
    /// Price per unit.
    pub amount_per_quantity: Money,
    /// Subtotal (before discounts).
    pub subtotal_amount: Money,
    /// Total (after discounts).
    pub total_amount: Money,
}

/// A line item in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart line ID.
    pub id: String,
    /// Quantity.
    pub quantity: i64,
    /// Custom attributes.
    pub attributes: Vec<Attribute>,
    /// Line cost.
    pub cost: CartLineCost,
    /// Product variant.
    pub merchandise: CartMerchandise,
}

#[cfg(test)]
impl CartLine {
    /// Value of a line attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .and_then(|a| a.value.as_deref())
    }
}

/// Cart cost summary.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CartCost {
    /// Subtotal before tax/shipping.
    #[serde(rename = "subtotal_amount")]
    pub subtotal: Money,
    /// Total amount.
    #[serde(rename = "total_amount")]
    pub total: Money,
    /// Total tax amount.
    #[serde(rename = "total_tax_amount")]
    pub total_tax: Option<Money>,
}

/// Discount code applied to cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartDiscountCode {
    /// The discount code.
    pub code: String,
    /// Whether the code is applicable.
    pub applicable: bool,
}

/// A shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id: String,
    /// Checkout URL.
    pub checkout_url: String,
    /// Cart note.
    pub note: Option<String>,
    /// Total item quantity.
    pub total_quantity: i64,
    /// Cart cost summary.
    pub cost: CartCost,
    /// Applied discount codes.
    pub discount_codes: Vec<CartDiscountCode>,
    /// Cart lines.
    pub lines: Vec<CartLine>,
}

/// Input for adding a line to cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: String,
    /// Quantity to add.
    pub quantity: i64,
    /// Custom attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeInput>,
}

/// Input for updating a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineUpdateInput {
    /// Cart line ID.
    pub id: String,
    /// New quantity.
    pub quantity: i64,
}

// =============================================================================
// Navigation and Content Types
// =============================================================================

/// A navigation menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Menu {
    /// Menu handle (e.g., `main-menu`).
    pub handle: String,
    /// Menu title.
    pub title: String,
    /// Top-level items.
    pub items: Vec<MenuItem>,
}

/// A navigation menu entry, possibly nested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    /// Display title.
    pub title: String,
    /// Target URL.
    pub url: Option<String>,
    /// Target kind (`COLLECTION`, `PRODUCT`, `HTTP`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Child items.
    pub items: Vec<MenuItem>,
}

/// A blog article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Article ID.
    pub id: String,
    /// URL handle.
    pub handle: String,
    /// Handle of the blog the article belongs to.
    pub blog_handle: String,
    /// Article title.
    pub title: String,
    /// Plain text excerpt.
    pub excerpt: Option<String>,
    /// Rendered body.
    pub content_html: String,
    /// Publication timestamp.
    pub published_at: Option<String>,
    /// Author display name.
    pub author_name: Option<String>,
    /// Article tags.
    pub tags: Vec<String>,
    /// Hero image.
    pub image: Option<Image>,
    /// SEO metadata.
    pub seo: Seo,
}

/// Paginated list of articles.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArticleConnection {
    /// Articles in this page.
    pub articles: Vec<Article>,
    /// Pagination info.
    pub page_info: PageInfo,
}

// =============================================================================
// Customer Types
// =============================================================================

/// Customer access token issued by `customerAccessTokenCreate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerAccessToken {
    /// Token value, sent back as `customerAccessToken`.
    pub access_token: String,
    /// Expiry timestamp.
    pub expires_at: String,
}

/// Input for `customerCreate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreateInput {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub accepts_marketing: bool,
}

/// Tracking details for a fulfillment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderTracking {
    /// Carrier tracking number.
    pub number: String,
    /// Carrier name.
    pub company: Option<String>,
    /// Carrier tracking page.
    pub url: Option<String>,
}

/// An order in the customer's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerOrder {
    /// Order ID.
    pub id: String,
    /// Display name (e.g., `#1001`).
    pub name: String,
    /// Sequential order number.
    pub order_number: i64,
    /// When the order was placed.
    pub processed_at: String,
    /// Payment status.
    pub financial_status: Option<String>,
    /// Fulfillment status.
    pub fulfillment_status: FulfillmentStatus,
    /// Order total.
    pub total_price: Money,
    /// Tracking numbers across successful fulfillments.
    pub tracking: Vec<OrderTracking>,
}

/// A logged-in customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID.
    pub id: String,
    /// Email address.
    pub email: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Marketing consent.
    pub accepts_marketing: bool,
    /// Loyalty standing from the `loyalty.*` metafields.
    pub loyalty: LoyaltyStatus,
    /// Most recent orders, newest first.
    pub orders: Vec<CustomerOrder>,
}

impl Customer {
    /// Full name, or email when no name is set.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone().unwrap_or_default()
        } else {
            name
        }
    }
}
