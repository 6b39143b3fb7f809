//! GraphQL operations for the Shopify Storefront API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] with its
//! document, variables and response shape. Shared selections are built with
//! `macro_rules!` so every document stays a `&'static str`.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

use crate::shopify::types::{CartLineInput, CartLineUpdateInput, CustomerCreateInput, ProductSortKey};

macro_rules! graphql_operation {
    ($name:ident, $op:literal, $vars:ty, $data:ty, $doc:expr) => {
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $vars;
            type ResponseData = $data;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $doc,
                    operation_name: $op,
                }
            }
        }
    };
}

// =============================================================================
// Selections
// =============================================================================

macro_rules! money {
    () => {
        "{ amount currencyCode }"
    };
}

macro_rules! image {
    () => {
        "{ url altText width height }"
    };
}

macro_rules! page_info {
    () => {
        "pageInfo { hasNextPage hasPreviousPage startCursor endCursor }"
    };
}

macro_rules! product_fields {
    () => {
        concat!(
            "id handle title description descriptionHtml availableForSale productType vendor tags updatedAt ",
            "seo { title description } ",
            "priceRange { minVariantPrice ", money!(), " maxVariantPrice ", money!(), " } ",
            "featuredImage ", image!(), " ",
            "images(first: 10) { nodes ", image!(), " } ",
            "variants(first: 50) { nodes { id title availableForSale quantityAvailable sku ",
            "price ", money!(), " compareAtPrice ", money!(), " ",
            "selectedOptions { name value } image ", image!(), " } }"
        )
    };
}

macro_rules! collection_fields {
    () => {
        concat!(
            "id handle title description updatedAt seo { title description } image ",
            image!()
        )
    };
}

macro_rules! cart_fields {
    () => {
        concat!(
            "id checkoutUrl note totalQuantity ",
            "cost { subtotalAmount ", money!(), " totalAmount ", money!(),
            " totalTaxAmount ", money!(), " } ",
            "discountCodes { code applicable } ",
            "lines(first: 100) { nodes { id quantity attributes { key value } ",
            "cost { amountPerQuantity ", money!(), " subtotalAmount ", money!(),
            " totalAmount ", money!(), " } ",
            "merchandise { ... on ProductVariant { id title price ", money!(),
            " image ", image!(), " product { id handle title vendor } } } } }"
        )
    };
}

macro_rules! cart_payload {
    () => {
        concat!("{ cart { ", cart_fields!(), " } userErrors { field message code } }")
    };
}

macro_rules! article_fields {
    () => {
        concat!(
            "id handle title excerpt contentHtml publishedAt tags ",
            "authorV2 { name } image ", image!(), " seo { title description } blog { handle }"
        )
    };
}

macro_rules! menu_item_fields {
    () => {
        "title url type"
    };
}

// =============================================================================
// Shared response nodes
// =============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MoneyV2 {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageNode {
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SeoNode {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageInfoNode {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub has_previous_page: bool,
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// A connection selected with `nodes` (and optionally `pageInfo`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
    #[serde(default)]
    pub page_info: PageInfoNode,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            page_info: PageInfoNode::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeNode {
    #[serde(default)]
    pub min_variant_price: MoneyV2,
    #[serde(default)]
    pub max_variant_price: MoneyV2,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOptionNode {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub available_for_sale: bool,
    #[serde(default)]
    pub quantity_available: Option<i64>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: MoneyV2,
    #[serde(default)]
    pub compare_at_price: Option<MoneyV2>,
    #[serde(default)]
    pub selected_options: Vec<SelectedOptionNode>,
    #[serde(default)]
    pub image: Option<ImageNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    pub id: String,
    pub handle: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_html: String,
    #[serde(default)]
    pub available_for_sale: bool,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub seo: Option<SeoNode>,
    #[serde(default)]
    pub price_range: PriceRangeNode,
    #[serde(default)]
    pub featured_image: Option<ImageNode>,
    #[serde(default)]
    pub images: Connection<ImageNode>,
    #[serde(default)]
    pub variants: Connection<VariantNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionNode {
    pub id: String,
    pub handle: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub seo: Option<SeoNode>,
    #[serde(default)]
    pub image: Option<ImageNode>,
    #[serde(default)]
    pub products: Connection<ProductNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeNode {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartCostNode {
    #[serde(default)]
    pub subtotal_amount: MoneyV2,
    #[serde(default)]
    pub total_amount: MoneyV2,
    #[serde(default)]
    pub total_tax_amount: Option<MoneyV2>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartLineCostNode {
    #[serde(default)]
    pub amount_per_quantity: MoneyV2,
    #[serde(default)]
    pub subtotal_amount: MoneyV2,
    #[serde(default)]
    pub total_amount: MoneyV2,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MerchandiseProductNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub vendor: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MerchandiseNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: MoneyV2,
    #[serde(default)]
    pub image: Option<ImageNode>,
    #[serde(default)]
    pub product: MerchandiseProductNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartLineNode {
    pub id: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub attributes: Vec<AttributeNode>,
    #[serde(default)]
    pub cost: CartLineCostNode,
    #[serde(default)]
    pub merchandise: MerchandiseNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscountCodeNode {
    pub code: String,
    #[serde(default)]
    pub applicable: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartNode {
    pub id: String,
    #[serde(default)]
    pub checkout_url: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub total_quantity: i64,
    #[serde(default)]
    pub cost: CartCostNode,
    #[serde(default)]
    pub discount_codes: Vec<DiscountCodeNode>,
    #[serde(default)]
    pub lines: Connection<CartLineNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserErrorNode {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Payload shared by every cart mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    #[serde(default)]
    pub cart: Option<CartNode>,
    #[serde(default)]
    pub user_errors: Vec<UserErrorNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemNode {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub items: Vec<MenuItemNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuNode {
    pub handle: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<MenuItemNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorNode {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogRefNode {
    #[serde(default)]
    pub handle: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleNode {
    pub id: String,
    pub handle: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content_html: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "authorV2")]
    pub author: Option<AuthorNode>,
    #[serde(default)]
    pub image: Option<ImageNode>,
    #[serde(default)]
    pub seo: Option<SeoNode>,
    #[serde(default)]
    pub blog: Option<BlogRefNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetafieldNode {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingInfoNode {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentNode {
    #[serde(default)]
    pub tracking_company: Option<String>,
    #[serde(default)]
    pub tracking_info: Vec<TrackingInfoNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub order_number: i64,
    #[serde(default)]
    pub processed_at: String,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub fulfillment_status: String,
    #[serde(default)]
    pub total_price: MoneyV2,
    #[serde(default)]
    pub successful_fulfillments: Option<Vec<FulfillmentNode>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerNode {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub accepts_marketing: bool,
    #[serde(default)]
    pub points: Option<MetafieldNode>,
    #[serde(default)]
    pub tier: Option<MetafieldNode>,
    #[serde(default)]
    pub orders: Connection<OrderNode>,
}

// =============================================================================
// Product queries
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HandleVariables {
    pub handle: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductByHandleData {
    pub product: Option<ProductNode>,
}

graphql_operation!(
    GetProductByHandle,
    "GetProductByHandle",
    HandleVariables,
    ProductByHandleData,
    concat!(
        "query GetProductByHandle($handle: String!) { product(handle: $handle) { ",
        product_fields!(),
        " } }"
    )
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsVariables {
    pub first: i64,
    pub after: Option<String>,
    pub query: Option<String>,
    pub sort_key: Option<ProductSortKey>,
    pub reverse: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductsData {
    pub products: Connection<ProductNode>,
}

graphql_operation!(
    GetProducts,
    "GetProducts",
    ProductsVariables,
    ProductsData,
    concat!(
        "query GetProducts($first: Int!, $after: String, $query: String, ",
        "$sortKey: ProductSortKeys, $reverse: Boolean) { ",
        "products(first: $first, after: $after, query: $query, sortKey: $sortKey, reverse: $reverse) { nodes { ",
        product_fields!(),
        " } ",
        page_info!(),
        " } }"
    )
);

// =============================================================================
// Collection queries
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionByHandleVariables {
    pub handle: String,
    pub product_count: i64,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionByHandleData {
    pub collection: Option<CollectionNode>,
}

graphql_operation!(
    GetCollectionByHandle,
    "GetCollectionByHandle",
    CollectionByHandleVariables,
    CollectionByHandleData,
    concat!(
        "query GetCollectionByHandle($handle: String!, $productCount: Int!, $after: String) { ",
        "collection(handle: $handle) { ",
        collection_fields!(),
        " products(first: $productCount, after: $after) { nodes { ",
        product_fields!(),
        " } ",
        page_info!(),
        " } } }"
    )
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionsVariables {
    pub first: i64,
    pub after: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionsData {
    pub collections: Connection<CollectionNode>,
}

graphql_operation!(
    GetCollections,
    "GetCollections",
    CollectionsVariables,
    CollectionsData,
    concat!(
        "query GetCollections($first: Int!, $after: String, $query: String) { ",
        "collections(first: $first, after: $after, query: $query) { nodes { ",
        collection_fields!(),
        " } ",
        page_info!(),
        " } }"
    )
);

// =============================================================================
// Navigation and blog queries
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct MenuData {
    pub menu: Option<MenuNode>,
}

graphql_operation!(
    GetMenu,
    "GetMenu",
    HandleVariables,
    MenuData,
    concat!(
        "query GetMenu($handle: String!) { menu(handle: $handle) { handle title items { ",
        menu_item_fields!(),
        " items { ",
        menu_item_fields!(),
        " items { ",
        menu_item_fields!(),
        " } } } } }"
    )
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesVariables {
    pub first: i64,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticlesData {
    pub articles: Connection<ArticleNode>,
}

graphql_operation!(
    GetArticles,
    "GetArticles",
    ArticlesVariables,
    ArticlesData,
    concat!(
        "query GetArticles($first: Int!, $after: String) { ",
        "articles(first: $first, after: $after, sortKey: PUBLISHED_AT, reverse: true) { nodes { ",
        article_fields!(),
        " } ",
        page_info!(),
        " } }"
    )
);

#[derive(Debug, Clone, Serialize)]
pub struct ArticleVariables {
    pub blog: String,
    pub handle: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogWithArticle {
    #[serde(default)]
    pub article_by_handle: Option<ArticleNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleData {
    pub blog: Option<BlogWithArticle>,
}

graphql_operation!(
    GetArticle,
    "GetArticle",
    ArticleVariables,
    ArticleData,
    concat!(
        "query GetArticle($blog: String!, $handle: String!) { blog(handle: $blog) { ",
        "articleByHandle(handle: $handle) { ",
        article_fields!(),
        " } } }"
    )
);

#[derive(Debug, Clone, Serialize)]
pub struct NoVariables {}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopNode {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopData {
    pub shop: ShopNode,
}

graphql_operation!(
    GetShop,
    "GetShop",
    NoVariables,
    ShopData,
    "query GetShop { shop { name } }"
);

// =============================================================================
// Cart operations
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CartInput {
    pub lines: Vec<CartLineInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCartVariables {
    pub input: CartInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartData {
    pub cart_create: Option<CartPayload>,
}

graphql_operation!(
    CreateCart,
    "CreateCart",
    CreateCartVariables,
    CreateCartData,
    concat!(
        "mutation CreateCart($input: CartInput!) { cartCreate(input: $input) ",
        cart_payload!(),
        " }"
    )
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartIdVariables {
    pub cart_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartData {
    pub cart: Option<CartNode>,
}

graphql_operation!(
    GetCart,
    "GetCart",
    CartIdVariables,
    CartData,
    concat!(
        "query GetCart($cartId: ID!) { cart(id: $cartId) { ",
        cart_fields!(),
        " } }"
    )
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartVariables {
    pub cart_id: String,
    pub lines: Vec<CartLineInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartData {
    pub cart_lines_add: Option<CartPayload>,
}

graphql_operation!(
    AddToCart,
    "AddToCart",
    AddToCartVariables,
    AddToCartData,
    concat!(
        "mutation AddToCart($cartId: ID!, $lines: [CartLineInput!]!) { ",
        "cartLinesAdd(cartId: $cartId, lines: $lines) ",
        cart_payload!(),
        " }"
    )
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartLinesVariables {
    pub cart_id: String,
    pub lines: Vec<CartLineUpdateInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartLinesData {
    pub cart_lines_update: Option<CartPayload>,
}

graphql_operation!(
    UpdateCartLines,
    "UpdateCartLines",
    UpdateCartLinesVariables,
    UpdateCartLinesData,
    concat!(
        "mutation UpdateCartLines($cartId: ID!, $lines: [CartLineUpdateInput!]!) { ",
        "cartLinesUpdate(cartId: $cartId, lines: $lines) ",
        cart_payload!(),
        " }"
    )
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartVariables {
    pub cart_id: String,
    pub line_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartData {
    pub cart_lines_remove: Option<CartPayload>,
}

graphql_operation!(
    RemoveFromCart,
    "RemoveFromCart",
    RemoveFromCartVariables,
    RemoveFromCartData,
    concat!(
        "mutation RemoveFromCart($cartId: ID!, $lineIds: [ID!]!) { ",
        "cartLinesRemove(cartId: $cartId, lineIds: $lineIds) ",
        cart_payload!(),
        " }"
    )
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCodesVariables {
    pub cart_id: String,
    pub discount_codes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCodesData {
    pub cart_discount_codes_update: Option<CartPayload>,
}

graphql_operation!(
    UpdateCartDiscountCodes,
    "UpdateCartDiscountCodes",
    DiscountCodesVariables,
    DiscountCodesData,
    concat!(
        "mutation UpdateCartDiscountCodes($cartId: ID!, $discountCodes: [String!]) { ",
        "cartDiscountCodesUpdate(cartId: $cartId, discountCodes: $discountCodes) ",
        cart_payload!(),
        " }"
    )
);

// =============================================================================
// Customer operations
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CustomerAccessTokenCreateInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenCreateVariables {
    pub input: CustomerAccessTokenCreateInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenNode {
    pub access_token: String,
    #[serde(default)]
    pub expires_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenCreatePayload {
    #[serde(default)]
    pub customer_access_token: Option<AccessTokenNode>,
    #[serde(default)]
    pub customer_user_errors: Vec<UserErrorNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenCreateData {
    pub customer_access_token_create: Option<AccessTokenCreatePayload>,
}

graphql_operation!(
    CustomerAccessTokenCreate,
    "CustomerAccessTokenCreate",
    AccessTokenCreateVariables,
    AccessTokenCreateData,
    concat!(
        "mutation CustomerAccessTokenCreate($input: CustomerAccessTokenCreateInput!) { ",
        "customerAccessTokenCreate(input: $input) { ",
        "customerAccessToken { accessToken expiresAt } ",
        "customerUserErrors { field message code } } }"
    )
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenVariables {
    pub customer_access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenDeletePayload {
    #[serde(default)]
    pub deleted_access_token: Option<String>,
    #[serde(default)]
    pub user_errors: Vec<UserErrorNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenDeleteData {
    pub customer_access_token_delete: Option<AccessTokenDeletePayload>,
}

graphql_operation!(
    CustomerAccessTokenDelete,
    "CustomerAccessTokenDelete",
    AccessTokenVariables,
    AccessTokenDeleteData,
    concat!(
        "mutation CustomerAccessTokenDelete($customerAccessToken: String!) { ",
        "customerAccessTokenDelete(customerAccessToken: $customerAccessToken) { ",
        "deletedAccessToken userErrors { field message } } }"
    )
);

#[derive(Debug, Clone, Serialize)]
pub struct CustomerCreateVariables {
    pub input: CustomerCreateInput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedCustomerNode {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreatePayload {
    #[serde(default)]
    pub customer: Option<CreatedCustomerNode>,
    #[serde(default)]
    pub customer_user_errors: Vec<UserErrorNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreateData {
    pub customer_create: Option<CustomerCreatePayload>,
}

graphql_operation!(
    CustomerCreate,
    "CustomerCreate",
    CustomerCreateVariables,
    CustomerCreateData,
    concat!(
        "mutation CustomerCreate($input: CustomerCreateInput!) { customerCreate(input: $input) { ",
        "customer { id email } customerUserErrors { field message code } } }"
    )
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerVariables {
    pub customer_access_token: String,
    pub order_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerData {
    pub customer: Option<CustomerNode>,
}

graphql_operation!(
    GetCustomer,
    "GetCustomer",
    CustomerVariables,
    CustomerData,
    concat!(
        "query GetCustomer($customerAccessToken: String!, $orderCount: Int!) { ",
        "customer(customerAccessToken: $customerAccessToken) { ",
        "id email firstName lastName phone acceptsMarketing ",
        "points: metafield(namespace: \"loyalty\", key: \"points\") { value } ",
        "tier: metafield(namespace: \"loyalty\", key: \"tier\") { value } ",
        "orders(first: $orderCount, sortKey: PROCESSED_AT, reverse: true) { nodes { ",
        "id name orderNumber processedAt financialStatus fulfillmentStatus totalPrice ",
        money!(),
        " successfulFulfillments(first: 5) { trackingCompany trackingInfo(first: 5) { number url } } ",
        "} } } }"
    )
);
