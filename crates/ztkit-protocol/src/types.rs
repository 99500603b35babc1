//! Application command and response bodies.
//!
//! Application traffic is JSON on the wire. A command carries a method
//! name, a params object, and a correlation id; the matching response
//! echoes the id and carries exactly one of `result` or `error`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An application command addressed to the board firmware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppCommand {
    /// Method name, e.g. `"init"` or `"genCsr"`.
    pub method: String,
    /// Method parameters; an empty object when the method takes none.
    pub params: Value,
    /// Correlation id assigned by the channel.
    pub id: u64,
}

/// Error object carried by a failed application response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppError {
    /// Application-level error code.
    pub error_code: u32,
    /// Human-readable error message.
    pub error_msg: String,
}

/// An application response correlated back to a command id.
///
/// Both `result` and `error` are always present on the wire; exactly one
/// of them is non-null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppResponse {
    /// Id of the command this response answers.
    pub id: u64,
    /// Successful result object, or null.
    pub result: Option<Value>,
    /// Error object, or null.
    pub error: Option<AppError>,
}

/// Result of the `init` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitInfo {
    /// Secure element serial number as hex.
    pub device_sn: String,
    /// Device public key as hex.
    pub device_public_key: String,
}

/// Result of the `genCsr` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrInfo {
    /// DER-encoded certification request as hex.
    pub csr: String,
}

/// Result of the `getStatus` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitStatusInfo {
    /// Secure element serial number as hex.
    pub device_sn: String,
    /// Whether all credential fields have been stored.
    pub provisioned: bool,
    /// Whether Wi-Fi credentials have been stored.
    pub wifi_configured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_wire_shape() {
        let cmd = AppCommand {
            method: "init".to_string(),
            params: json!({ "version": "2.0.0" }),
            id: 3,
        };
        let text = serde_json::to_string(&cmd).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["method"], "init");
        assert_eq!(value["params"]["version"], "2.0.0");
        assert_eq!(value["id"], 3);
    }

    #[test]
    fn test_response_serializes_null_fields() {
        let resp = AppResponse {
            id: 0,
            result: Some(json!({})),
            error: None,
        };
        let value: Value = serde_json::to_value(&resp).unwrap();
        // The error key must be present as an explicit null.
        assert!(value.as_object().unwrap().contains_key("error"));
        assert!(value["error"].is_null());
    }

    #[test]
    fn test_error_response_round_trip() {
        let text = r#"{"id":7,"result":null,"error":{"error_code":2,"error_msg":"Unknown command"}}"#;
        let resp: AppResponse = serde_json::from_str(text).unwrap();
        assert_eq!(resp.id, 7);
        assert!(resp.result.is_none());
        let err = resp.error.expect("error object");
        assert_eq!(err.error_code, 2);
        assert_eq!(err.error_msg, "Unknown command");
    }

    #[test]
    fn test_init_info_field_names() {
        let text = r#"{"deviceSn":"0123","devicePublicKey":"abcd"}"#;
        let info: InitInfo = serde_json::from_str(text).unwrap();
        assert_eq!(info.device_sn, "0123");
        assert_eq!(info.device_public_key, "abcd");
    }
}
