//! Catalog endpoints: thin wrappers over the API client.

use crate::api::Api;
use crate::error::ApiError;
use crate::types::{unwrap_envelope, Product};
use reqwest::Method;

/// List the storefront catalog.
pub async fn list(api: &dyn Api) -> Result<Vec<Product>, ApiError> {
    let value = api.request(Method::GET, "products", None).await?;
    serde_json::from_value(unwrap_envelope(value))
        .map_err(|e| ApiError::InvalidResponse(format!("product list payload: {e}")))
}

/// Fetch one product by id.
pub async fn show(api: &dyn Api, id: u64) -> Result<Product, ApiError> {
    let value = api
        .request(Method::GET, &format!("products/{id}"), None)
        .await?;
    serde_json::from_value(unwrap_envelope(value))
        .map_err(|e| ApiError::InvalidResponse(format!("product payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testsupport::MockApi;
    use serde_json::json;

    #[tokio::test]
    async fn list_decodes_data_envelope() {
        let api = MockApi::returning(json!({"data": [
            {"id": 1, "name": "Aged account"},
            {"id": 2, "name": "Fresh account", "price": 4.0}
        ]}));
        let products = list(&api).await.expect("list");
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].price, Some(4.0));
    }

    #[tokio::test]
    async fn show_builds_the_id_path() {
        let api = MockApi::returning(json!({"id": 42, "name": "Aged account"}));
        let product = show(&api, 42).await.expect("show");
        assert_eq!(product.id, 42);
        assert_eq!(api.calls()[0].1, "products/42");
    }
}
