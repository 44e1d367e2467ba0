//! Payload types shared by the service wrappers.
//!
//! The backend's contracts are external; only the shapes the services touch
//! are modeled here, everything else stays `serde_json::Value`.

use serde::Deserialize;
use serde_json::Value;

/// Unwrap the backend's success envelope.
///
/// Responses arrive as `{user: ...}`, `{data: ...}`, or as the bare payload;
/// the first present wins, in that order.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            if let Some(user) = map.remove("user") {
                return user;
            }
            if let Some(data) = map.remove("data") {
                return data;
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// Authenticated account.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email_verified_at: Option<String>,
}

/// Storefront catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_prefers_user_then_data_then_bare() {
        let v = unwrap_envelope(json!({"user": {"id": 1}, "data": {"id": 2}}));
        assert_eq!(v, json!({"id": 1}));

        let v = unwrap_envelope(json!({"data": {"id": 2}}));
        assert_eq!(v, json!({"id": 2}));

        let v = unwrap_envelope(json!({"id": 3}));
        assert_eq!(v, json!({"id": 3}));

        let v = unwrap_envelope(json!([1, 2]));
        assert_eq!(v, json!([1, 2]));
    }

    #[test]
    fn user_decodes_with_missing_optionals() {
        let user: User =
            serde_json::from_value(json!({"id": 7, "name": "An", "email": "an@example.com"}))
                .unwrap();
        assert_eq!(user.id, 7);
        assert!(user.role.is_none());
    }

    #[test]
    fn product_decodes_partial_payload() {
        let product: Product =
            serde_json::from_value(json!({"id": 1, "name": "Aged account", "price": 9.5}))
                .unwrap();
        assert_eq!(product.price, Some(9.5));
        assert!(product.stock.is_none());
    }
}
