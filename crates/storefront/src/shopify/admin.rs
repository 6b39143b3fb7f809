//! Shopify Admin API client.
//!
//! Only used for operations the Storefront API cannot perform, currently
//! customer deletion. Requires `SHOPIFY_ADMIN_TOKEN`.

use std::sync::Arc;

use graphql_client::{GraphQLQuery, QueryBody};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::ShopifyConfig;

use super::{GraphQLError, ShopifyError, send_graphql, user_errors};

struct CustomerDelete;

#[derive(Debug, Clone, Serialize)]
struct CustomerDeleteVariables {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AdminUserError {
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerDeletePayload {
    #[serde(default)]
    deleted_customer_id: Option<String>,
    #[serde(default)]
    user_errors: Vec<AdminUserError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerDeleteData {
    customer_delete: Option<CustomerDeletePayload>,
}

impl GraphQLQuery for CustomerDelete {
    type Variables = CustomerDeleteVariables;
    type ResponseData = CustomerDeleteData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: "mutation CustomerDelete($id: ID!) { customerDelete(input: { id: $id }) { deletedCustomerId userErrors { field message } } }",
            operation_name: "CustomerDelete",
        }
    }
}

/// Client for the Shopify Admin GraphQL API.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
}

impl AdminClient {
    /// Create an Admin API client. Returns `None` when no admin token is
    /// configured.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Option<Self> {
        let access_token = config.admin_token.clone()?;
        let endpoint = format!(
            "{}/admin/api/{}/graphql.json",
            config.api_base, config.api_version
        );

        Some(Self {
            inner: Arc::new(AdminClientInner {
                client: reqwest::Client::new(),
                endpoint,
                access_token,
            }),
        })
    }

    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request = self.inner.client.post(&self.inner.endpoint).header(
            "X-Shopify-Access-Token",
            self.inner.access_token.expose_secret(),
        );

        send_graphql::<Q>(request, variables).await
    }

    /// Permanently delete a customer.
    ///
    /// # Errors
    ///
    /// Returns `UserError` when Shopify refuses (e.g. the customer has orders
    /// that block deletion), or an error if the request fails.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn delete_customer(&self, customer_id: &str) -> Result<String, ShopifyError> {
        let data = self
            .execute::<CustomerDelete>(CustomerDeleteVariables {
                id: customer_id.to_string(),
            })
            .await?;

        let payload = data.customer_delete.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError::message("Failed to delete customer")])
        })?;

        if let Some(err) = user_errors(payload.user_errors.into_iter().map(|e| e.message)) {
            return Err(err);
        }

        payload
            .deleted_customer_id
            .ok_or_else(|| ShopifyError::NotFound(format!("Customer not found: {customer_id}")))
    }
}
