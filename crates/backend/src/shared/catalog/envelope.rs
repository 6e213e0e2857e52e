use serde::de::DeserializeOwned;
use serde_json::Value;

use super::CatalogError;

/// Разобрать ответ вида `{ "success": true, "<key>": ... }`.
///
/// Отсутствующий ключ или `null` дают `Ok(None)`.
pub(super) fn unwrap_envelope<T: DeserializeOwned>(
    resource: &str,
    key: &str,
    body: Value,
) -> Result<Option<T>, CatalogError> {
    let Value::Object(mut map) = body else {
        return Err(CatalogError::Malformed {
            resource: resource.to_string(),
            message: "expected a JSON object".to_string(),
        });
    };

    match map.get("success").and_then(Value::as_bool) {
        Some(true) => {}
        Some(false) => {
            let message = ["error", "message"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
                .unwrap_or("success = false")
                .to_string();
            return Err(CatalogError::Rejected {
                resource: resource.to_string(),
                message,
            });
        }
        None => {
            return Err(CatalogError::Malformed {
                resource: resource.to_string(),
                message: "missing 'success' flag".to_string(),
            })
        }
    }

    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| CatalogError::Malformed {
                resource: resource.to_string(),
                message: format!("'{}': {}", key, e),
            }),
    }
}

/// То же, но ключ обязателен
pub(super) fn require_envelope<T: DeserializeOwned>(
    resource: &str,
    key: &str,
    body: Value,
) -> Result<T, CatalogError> {
    unwrap_envelope(resource, key, body)?.ok_or_else(|| CatalogError::Malformed {
        resource: resource.to_string(),
        message: format!("missing '{}'", key),
    })
}
