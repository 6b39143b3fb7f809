//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (canonical links, sitemap)
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_STOREFRONT_PRIVATE_TOKEN` - Storefront API private access token
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_RATE_LIMIT` - Enable `/api` rate limiting (default: true)
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01)
//! - `SHOPIFY_API_BASE` - Override for `https://{SHOPIFY_STORE}`
//! - `SHOPIFY_ADMIN_TOKEN` - Admin API token (enables account deletion)
//! - `CURRENCY_API_KEY` - currencyapi.com key (fallback rates without it)
//! - `CURRENCY_API_URL` - Rate endpoint (default: <https://api.currencyapi.com/v3/latest>)
//! - `CURRENCY_CACHE_SECONDS` - Rate cache lifetime (default: 3600)
//! - `SHIP24_API_KEY` - ship24 bearer token (tracking disabled without it)
//! - `SHIP24_API_URL` - ship24 base URL (default: <https://api.ship24.com>)
//! - `TRACKING_POLL_DELAY_MS` - Wait between tracker creation and results (default: 2000)
//! - `INVOICE_TAX_RATE` - Fraction between 0 and 1 (default: 0.18)
//! - `INVOICE_SELLER_NAME` - Seller name on invoices (default: Boxcraft)
//! - `INVOICE_SELLER_ADDRESS` - Seller address on invoices
//! - `GIFT_BOX_COLLECTION` - Collection handle for boxes (default: gift-boxes)
//! - `GIFT_PRODUCTS_COLLECTION` - Collection handle for box contents (default: gift-products)
//! - `GIFT_BUNDLE_DISCOUNT` - Flat discount on a built box (default: 0)
//! - `GIFT_BOX_DEFAULT_CAPACITY` - Items per box without a `capacity:N` tag (default: 6)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use boxcraft_core::CurrencyCode;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront, without trailing slash
    pub base_url: String,
    /// Whether `/api` routes are rate limited
    pub rate_limit: bool,
    /// Shopify API configuration
    pub shopify: ShopifyConfig,
    /// Currency rate provider configuration
    pub currency: CurrencyConfig,
    /// Shipment tracking provider configuration
    pub tracking: TrackingConfig,
    /// Invoice configuration
    pub invoice: InvoiceConfig,
    /// Gift builder configuration
    pub gift_builder: GiftBuilderConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry performance traces sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Storefront and Admin API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Scheme and host the API paths are appended to
    pub api_base: String,
    /// Shopify API version (e.g., 2026-01)
    pub api_version: String,
    /// Storefront API private access token (server-side only)
    pub storefront_token: SecretString,
    /// Admin API access token
    pub admin_token: Option<SecretString>,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store", &self.store)
            .field("api_base", &self.api_base)
            .field("api_version", &self.api_version)
            .field("storefront_token", &"[REDACTED]")
            .field(
                "admin_token",
                &self.admin_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Currency rate provider configuration.
#[derive(Clone)]
pub struct CurrencyConfig {
    /// currencyapi.com API key
    pub api_key: Option<SecretString>,
    /// Latest-rates endpoint
    pub api_url: String,
    /// Store currency the rates are quoted against
    pub base_currency: CurrencyCode,
    /// How long fetched rates are reused
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for CurrencyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("base_currency", &self.base_currency)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

/// Shipment tracking provider configuration.
#[derive(Clone)]
pub struct TrackingConfig {
    /// ship24 API key
    pub api_key: Option<SecretString>,
    /// ship24 base URL
    pub api_url: String,
    /// Wait between creating a tracker and reading its results
    pub poll_delay: Duration,
}

impl std::fmt::Debug for TrackingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("poll_delay", &self.poll_delay)
            .finish()
    }
}

/// Invoice configuration.
#[derive(Debug, Clone)]
pub struct InvoiceConfig {
    /// Fixed tax rate applied to every invoice
    pub tax_rate: Decimal,
    /// Seller name printed on invoices
    pub seller_name: String,
    /// Seller address printed on invoices
    pub seller_address: Option<String>,
}

/// Gift builder configuration.
#[derive(Debug, Clone)]
pub struct GiftBuilderConfig {
    /// Collection holding the box products
    pub box_collection: String,
    /// Collection holding the products that can go in a box
    pub products_collection: String,
    /// Flat discount applied to a completed box
    pub bundle_discount: Decimal,
    /// Capacity for boxes without a `capacity:N` tag
    pub default_capacity: u32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_parsed_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = get_parsed_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;
        let rate_limit = get_parsed_or_default::<bool>("STOREFRONT_RATE_LIMIT", "true")?;

        Ok(Self {
            host,
            port,
            base_url,
            rate_limit,
            shopify: ShopifyConfig::from_env()?,
            currency: CurrencyConfig::from_env()?,
            tracking: TrackingConfig::from_env()?,
            invoice: InvoiceConfig::from_env()?,
            gift_builder: GiftBuilderConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_parsed_or_default::<f32>("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: get_parsed_or_default::<f32>(
                "SENTRY_TRACES_SAMPLE_RATE",
                "0.1",
            )?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let store = get_required_env("SHOPIFY_STORE")?;
        let api_base = get_optional_env("SHOPIFY_API_BASE")
            .unwrap_or_else(|| format!("https://{store}"))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            store,
            api_base,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2026-01"),
            storefront_token: get_validated_secret("SHOPIFY_STOREFRONT_PRIVATE_TOKEN")?,
            admin_token: get_optional_validated_secret("SHOPIFY_ADMIN_TOKEN")?,
        })
    }
}

impl CurrencyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_optional_validated_secret("CURRENCY_API_KEY")?,
            api_url: get_env_or_default(
                "CURRENCY_API_URL",
                "https://api.currencyapi.com/v3/latest",
            ),
            base_currency: CurrencyCode::USD,
            cache_ttl: Duration::from_secs(get_parsed_or_default::<u64>(
                "CURRENCY_CACHE_SECONDS",
                "3600",
            )?),
        })
    }
}

impl TrackingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_optional_validated_secret("SHIP24_API_KEY")?,
            api_url: get_env_or_default("SHIP24_API_URL", "https://api.ship24.com")
                .trim_end_matches('/')
                .to_string(),
            poll_delay: Duration::from_millis(get_parsed_or_default::<u64>(
                "TRACKING_POLL_DELAY_MS",
                "2000",
            )?),
        })
    }
}

impl InvoiceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let tax_rate = get_parsed_or_default::<Decimal>("INVOICE_TAX_RATE", "0.18")?;
        if tax_rate.is_sign_negative() || tax_rate > Decimal::ONE {
            return Err(ConfigError::InvalidEnvVar(
                "INVOICE_TAX_RATE".to_string(),
                "must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            tax_rate,
            seller_name: get_env_or_default("INVOICE_SELLER_NAME", "Boxcraft"),
            seller_address: get_optional_env("INVOICE_SELLER_ADDRESS"),
        })
    }
}

impl GiftBuilderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let bundle_discount = get_parsed_or_default::<Decimal>("GIFT_BUNDLE_DISCOUNT", "0")?;
        if bundle_discount.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "GIFT_BUNDLE_DISCOUNT".to_string(),
                "cannot be negative".to_string(),
            ));
        }

        Ok(Self {
            box_collection: get_env_or_default("GIFT_BOX_COLLECTION", "gift-boxes"),
            products_collection: get_env_or_default("GIFT_PRODUCTS_COLLECTION", "gift-products"),
            bundle_discount,
            default_capacity: get_parsed_or_default::<u32>("GIFT_BOX_DEFAULT_CAPACITY", "6")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default literal.
fn get_parsed_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real API tokens are random; low entropy means someone typed it in
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued by the provider."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a required secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Load and validate an optional secret from environment.
fn get_optional_validated_secret(key: &str) -> Result<Option<SecretString>, ConfigError> {
    get_optional_env(key)
        .map(|value| {
            validate_secret_strength(&value, key)?;
            Ok(SecretString::from(value))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = crate::test_support::config("http://127.0.0.1:9");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = crate::test_support::config("http://127.0.0.1:9");
        let debug_output = format!("{:?}", config.shopify);

        assert!(debug_output.contains("test.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(crate::test_support::STOREFRONT_TOKEN));
        assert!(!debug_output.contains(crate::test_support::ADMIN_TOKEN));
    }
}
