use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BlockId, FetchError};

/// Request/response envelope for a single block fetch.
///
/// Serialized as `{"ok": true, "data": ...}` or `{"ok": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockResponse {
    /// Whether `data` holds a payload.
    pub ok: bool,
    /// Block payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Error message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BlockResponse {
    /// Wraps a successful payload.
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Wraps a failure message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Converts the envelope back into a result.
    ///
    /// # Errors
    ///
    /// Returns the carried error message (or a generic one) when `ok` is false or no data is
    /// present.
    pub fn into_result(self) -> Result<Value, String> {
        match (self.ok, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self
                .error
                .unwrap_or_else(|| "block response carried no data".to_string())),
        }
    }
}

impl From<Result<Value, FetchError>> for BlockResponse {
    fn from(result: Result<Value, FetchError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

/// Push-channel message broadcast whenever a block refresh completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockUpdate {
    /// Block whose payload changed.
    pub block: BlockId,
    /// New payload.
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn success_envelope_matches_wire_shape() {
        let response = BlockResponse::success(json!({"time": "12:00:00"}));
        assert_eq!(
            serde_json::to_value(&response).expect("serialize"),
            json!({"ok": true, "data": {"time": "12:00:00"}})
        );
    }

    #[test]
    fn failure_envelope_round_trips_into_error() {
        let response: BlockResponse =
            Err::<Value, _>(FetchError::Http("status 500".to_string())).into();
        assert_eq!(
            serde_json::to_value(&response).expect("serialize"),
            json!({"ok": false, "error": "request failed: status 500"})
        );
        assert_eq!(
            response.into_result().expect_err("failure"),
            "request failed: status 500"
        );
    }

    #[test]
    fn update_message_uses_block_key() {
        let update: BlockUpdate =
            serde_json::from_value(json!({"block": "clock", "data": {"time": "09:15:00"}}))
                .expect("deserialize update");
        assert_eq!(update.block, BlockId::trusted("clock"));
        assert_eq!(update.data["time"], "09:15:00");
    }
}
