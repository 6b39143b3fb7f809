//! Gift box builder.
//!
//! A linear wizard: choose a box, fill it with products, write a message,
//! review. The wizard state is a plain serializable value kept in the
//! visitor's session; this module owns the transitions and the composition
//! of the finished box into cart lines.

use std::collections::BTreeMap;
use std::fmt;

use boxcraft_core::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::GiftBuilderConfig;
use crate::shopify::{
    AttributeInput, CartLineInput, Image, Money, Product, ShopifyError, StorefrontClient,
};

/// Maximum gift message length in characters.
pub const MAX_MESSAGE_LEN: usize = 250;

/// Products loaded per gift collection.
const COLLECTION_PAGE: i64 = 100;

/// Cart line attribute grouping the lines of one box.
pub const BUNDLE_ID_ATTR: &str = "_bundle_id";
/// Cart line attribute marking a line as the box or an item.
pub const BUNDLE_ROLE_ATTR: &str = "_bundle_role";
/// Cart line attribute carrying the gift message.
pub const GIFT_MESSAGE_ATTR: &str = "Gift message";

/// Errors raised by wizard transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GiftBuilderError {
    #[error("Choose a box first")]
    NoBoxSelected,
    #[error("This box holds at most {capacity} items")]
    BoxFull { capacity: u32 },
    #[error("This box holds {capacity} items but {selected} are selected")]
    CapacityExceeded { capacity: u32, selected: usize },
    #[error("{0} is not available")]
    Unavailable(String),
    #[error("{0} is not in the box")]
    ProductNotSelected(String),
    #[error("Gift message is limited to {max} characters")]
    MessageTooLong { max: usize },
    #[error("Finish the {0} step first")]
    IncompleteStep(GiftStep),
    #[error("Already at the last step")]
    AlreadyAtLastStep,
    #[error("Add at least one product to the box")]
    EmptyBox,
    #[error("Unknown gift box: {0}")]
    UnknownBox(String),
    #[error("Unknown gift product: {0}")]
    UnknownProduct(String),
}

/// Wizard step, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GiftStep {
    #[default]
    ChooseBox,
    ChooseProducts,
    Message,
    Review,
}

impl GiftStep {
    const fn next(self) -> Option<Self> {
        match self {
            Self::ChooseBox => Some(Self::ChooseProducts),
            Self::ChooseProducts => Some(Self::Message),
            Self::Message => Some(Self::Review),
            Self::Review => None,
        }
    }

    const fn previous(self) -> Self {
        match self {
            Self::ChooseBox | Self::ChooseProducts => Self::ChooseBox,
            Self::Message => Self::ChooseProducts,
            Self::Review => Self::Message,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChooseBox => "choose box",
            Self::ChooseProducts => "choose products",
            Self::Message => "message",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for GiftStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A box that can be filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftBox {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub variant_id: Option<String>,
    pub price: Money,
    pub image: Option<Image>,
    pub capacity: u32,
    pub available: bool,
}

impl GiftBox {
    /// Build from a product in the boxes collection. Capacity comes from a
    /// `capacity:N` tag, else `default_capacity`.
    #[must_use]
    pub fn from_product(product: &Product, default_capacity: u32) -> Self {
        let capacity = product
            .tags
            .iter()
            .find_map(|tag| {
                tag.trim()
                    .strip_prefix("capacity:")
                    .and_then(|n| n.trim().parse::<u32>().ok())
            })
            .filter(|n| *n > 0)
            .unwrap_or(default_capacity);
        let variant = product.default_variant();

        Self {
            id: product.id.clone(),
            handle: product.handle.clone(),
            title: product.title.clone(),
            variant_id: variant.map(|v| v.id.clone()),
            price: variant.map_or_else(
                || product.price_range.min_variant_price.clone(),
                |v| v.price.clone(),
            ),
            image: product
                .featured_image
                .clone()
                .or_else(|| variant.and_then(|v| v.image.clone())),
            capacity,
            available: product.available_for_sale && variant.is_some(),
        }
    }
}

/// A product that can go in a box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftProduct {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub variant_id: Option<String>,
    pub price: Money,
    pub image: Option<Image>,
    pub available: bool,
}

impl GiftProduct {
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        let variant = product.default_variant();

        Self {
            id: product.id.clone(),
            handle: product.handle.clone(),
            title: product.title.clone(),
            variant_id: variant.map(|v| v.id.clone()),
            price: variant.map_or_else(
                || product.price_range.min_variant_price.clone(),
                |v| v.price.clone(),
            ),
            image: product
                .featured_image
                .clone()
                .or_else(|| variant.and_then(|v| v.image.clone())),
            available: product.available_for_sale
                && variant.is_some_and(|v| v.available_for_sale),
        }
    }
}

/// Wizard state for one visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GiftBuilderState {
    pub step: GiftStep,
    pub selected_box: Option<GiftBox>,
    pub products: Vec<GiftProduct>,
    pub message: Option<String>,
}

impl GiftBuilderState {
    /// Choose (or change) the box.
    ///
    /// # Errors
    ///
    /// Fails if the box cannot be bought or is too small for the products
    /// already selected.
    pub fn select_box(&mut self, gift_box: GiftBox) -> Result<(), GiftBuilderError> {
        if !gift_box.available || gift_box.variant_id.is_none() {
            return Err(GiftBuilderError::Unavailable(gift_box.title));
        }
        if self.products.len() > gift_box.capacity as usize {
            return Err(GiftBuilderError::CapacityExceeded {
                capacity: gift_box.capacity,
                selected: self.products.len(),
            });
        }
        self.selected_box = Some(gift_box);
        Ok(())
    }

    /// Put a product in the box. The same product may be added more than once.
    ///
    /// # Errors
    ///
    /// Fails without a box, when the box is full, or when the product cannot
    /// be bought.
    pub fn add_product(&mut self, product: GiftProduct) -> Result<(), GiftBuilderError> {
        let capacity = self
            .selected_box
            .as_ref()
            .map(|b| b.capacity)
            .ok_or(GiftBuilderError::NoBoxSelected)?;
        if !product.available || product.variant_id.is_none() {
            return Err(GiftBuilderError::Unavailable(product.title));
        }
        if self.products.len() >= capacity as usize {
            return Err(GiftBuilderError::BoxFull { capacity });
        }
        self.products.push(product);
        Ok(())
    }

    /// Take one unit of a product out of the box.
    ///
    /// # Errors
    ///
    /// Fails if no product with that handle is in the box.
    pub fn remove_product(&mut self, handle: &str) -> Result<(), GiftBuilderError> {
        let index = self
            .products
            .iter()
            .rposition(|p| p.handle == handle)
            .ok_or_else(|| GiftBuilderError::ProductNotSelected(handle.to_string()))?;
        self.products.remove(index);
        Ok(())
    }

    /// Set or clear the gift message.
    ///
    /// # Errors
    ///
    /// Fails if the trimmed message is longer than [`MAX_MESSAGE_LEN`].
    pub fn set_message(&mut self, message: &str) -> Result<(), GiftBuilderError> {
        let trimmed = message.trim();
        if trimmed.chars().count() > MAX_MESSAGE_LEN {
            return Err(GiftBuilderError::MessageTooLong {
                max: MAX_MESSAGE_LEN,
            });
        }
        self.message = (!trimmed.is_empty()).then(|| trimmed.to_string());
        Ok(())
    }

    /// Whether the current step has what it needs to move on.
    #[must_use]
    pub fn step_complete(&self) -> bool {
        match self.step {
            GiftStep::ChooseBox => self.selected_box.is_some(),
            GiftStep::ChooseProducts => self
                .selected_box
                .as_ref()
                .is_some_and(|b| !self.products.is_empty() && self.products.len() <= b.capacity as usize),
            GiftStep::Message | GiftStep::Review => true,
        }
    }

    /// Advance one step.
    ///
    /// # Errors
    ///
    /// Fails if the current step is incomplete or this is the last step.
    pub fn next(&mut self) -> Result<GiftStep, GiftBuilderError> {
        let next = self.step.next().ok_or(GiftBuilderError::AlreadyAtLastStep)?;
        if !self.step_complete() {
            return Err(GiftBuilderError::IncompleteStep(self.step));
        }
        self.step = next;
        Ok(next)
    }

    /// Go back one step; stays on the first step.
    pub const fn back(&mut self) -> GiftStep {
        self.step = self.step.previous();
        self.step
    }

    /// Start over.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Box price plus product prices, less the bundle discount, never below
    /// zero. `None` without a box or when prices cannot be combined.
    #[must_use]
    pub fn total_price(&self, bundle_discount: Decimal) -> Option<Price> {
        let box_price = self.selected_box.as_ref()?.price.to_price()?;
        let mut total = box_price.amount;
        for product in &self.products {
            let price = product.price.to_price()?;
            if price.currency_code != box_price.currency_code {
                return None;
            }
            total += price.amount;
        }
        let discounted = (total - bundle_discount).max(Decimal::ZERO);
        Some(Price::new(
            box_price.currency_code.round(discounted),
            box_price.currency_code,
        ))
    }

    /// Cart lines for the finished box: the box line (carrying the message)
    /// followed by one line per distinct product, all tagged with the same
    /// bundle id.
    ///
    /// # Errors
    ///
    /// Fails without a box or with an empty box.
    pub fn cart_lines(&self, bundle_id: &str) -> Result<Vec<CartLineInput>, GiftBuilderError> {
        let gift_box = self
            .selected_box
            .as_ref()
            .ok_or(GiftBuilderError::NoBoxSelected)?;
        let box_variant = gift_box
            .variant_id
            .clone()
            .ok_or_else(|| GiftBuilderError::Unavailable(gift_box.title.clone()))?;
        if self.products.is_empty() {
            return Err(GiftBuilderError::EmptyBox);
        }

        let bundle_attrs = |role: &str| {
            vec![
                AttributeInput {
                    key: BUNDLE_ID_ATTR.to_string(),
                    value: bundle_id.to_string(),
                },
                AttributeInput {
                    key: BUNDLE_ROLE_ATTR.to_string(),
                    value: role.to_string(),
                },
            ]
        };

        let mut box_attrs = bundle_attrs("box");
        if let Some(message) = &self.message {
            box_attrs.push(AttributeInput {
                key: GIFT_MESSAGE_ATTR.to_string(),
                value: message.clone(),
            });
        }

        let mut lines = vec![CartLineInput {
            merchandise_id: box_variant,
            quantity: 1,
            attributes: box_attrs,
        }];

        // Group repeated products, keeping first-selection order
        let mut quantities: BTreeMap<usize, (String, i64)> = BTreeMap::new();
        for (i, product) in self.products.iter().enumerate() {
            let Some(variant) = &product.variant_id else {
                return Err(GiftBuilderError::Unavailable(product.title.clone()));
            };
            match quantities.values_mut().find(|(v, _)| v == variant) {
                Some((_, qty)) => *qty += 1,
                None => {
                    quantities.insert(i, (variant.clone(), 1));
                }
            }
        }

        lines.extend(quantities.into_values().map(|(variant, quantity)| CartLineInput {
            merchandise_id: variant,
            quantity,
            attributes: bundle_attrs("item"),
        }));

        Ok(lines)
    }
}

/// Loads boxes and box contents from their Shopify collections.
#[derive(Clone)]
pub struct GiftBuilderService {
    shopify: StorefrontClient,
    config: GiftBuilderConfig,
}

impl GiftBuilderService {
    #[must_use]
    pub const fn new(shopify: StorefrontClient, config: GiftBuilderConfig) -> Self {
        Self { shopify, config }
    }

    /// Flat discount applied to every finished box.
    #[must_use]
    pub const fn bundle_discount(&self) -> Decimal {
        self.config.bundle_discount
    }

    /// All boxes, in collection order.
    ///
    /// # Errors
    ///
    /// Returns error if the collection cannot be loaded.
    #[instrument(skip(self))]
    pub async fn boxes(&self) -> Result<Vec<GiftBox>, ShopifyError> {
        let collection = self
            .shopify
            .get_collection_by_handle(&self.config.box_collection, Some(COLLECTION_PAGE), None)
            .await?;

        Ok(collection
            .products
            .iter()
            .map(|p| GiftBox::from_product(p, self.config.default_capacity))
            .collect())
    }

    /// All products that can go in a box, in collection order.
    ///
    /// # Errors
    ///
    /// Returns error if the collection cannot be loaded.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<GiftProduct>, ShopifyError> {
        let collection = self
            .shopify
            .get_collection_by_handle(
                &self.config.products_collection,
                Some(COLLECTION_PAGE),
                None,
            )
            .await?;

        Ok(collection
            .products
            .iter()
            .map(GiftProduct::from_product)
            .collect())
    }

    /// Find a box by handle.
    ///
    /// # Errors
    ///
    /// Returns `UnknownBox` if the handle is not in the boxes collection.
    pub async fn find_box(&self, handle: &str) -> Result<GiftBox, crate::error::AppError> {
        self.boxes()
            .await?
            .into_iter()
            .find(|b| b.handle == handle)
            .ok_or_else(|| GiftBuilderError::UnknownBox(handle.to_string()).into())
    }

    /// Find a box product by handle.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProduct` if the handle is not in the products collection.
    pub async fn find_product(&self, handle: &str) -> Result<GiftProduct, crate::error::AppError> {
        self.products()
            .await?
            .into_iter()
            .find(|p| p.handle == handle)
            .ok_or_else(|| GiftBuilderError::UnknownProduct(handle.to_string()).into())
    }
}
