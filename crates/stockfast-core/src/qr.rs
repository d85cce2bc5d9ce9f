//! # QR Payload
//!
//! What a product label encodes, and how scanned content is read back.
//!
//! ## Payload Format
//! ```text
//! {"productId":"9b2f…","hardwareId":"123456789012345",
//!  "url":"/products/9b2f…","created":"2026-10-19T08:30:00.000Z"}
//! ```
//! Older printed labels carry a plain-text block instead:
//! ```text
//! Produit: iPhone 15
//! IMEI: 123456789012345
//! ID: 9b2f…
//! ```
//! Both are accepted by [`parse_qr_content`].
//!
//! Rendering the payload to an image is I/O-free but heavy, so it lives
//! behind the [`QrEncoder`] trait and is implemented by the application.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::HARDWARE_ID_LEN;

/// Content of a product QR label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub product_id: String,
    #[serde(alias = "imei")]
    pub hardware_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl QrPayload {
    /// Payload for a product, linking to `{base_url}/{product_id}`.
    pub fn for_product(
        product_id: &str,
        hardware_id: &str,
        base_url: &str,
        now: DateTime<Utc>,
    ) -> Self {
        QrPayload {
            product_id: product_id.to_string(),
            hardware_id: hardware_id.to_string(),
            url: Some(format!("{}/{}", base_url.trim_end_matches('/'), product_id)),
            created: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    /// The string that is encoded into the image.
    pub fn to_content(&self) -> String {
        // A struct of strings always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Non-empty product id and a 15-character hardware id.
    pub fn is_valid(&self) -> bool {
        !self.product_id.is_empty() && self.hardware_id.chars().count() == HARDWARE_ID_LEN
    }
}

/// Reads scanned QR content, JSON first, then the legacy text block.
pub fn parse_qr_content(content: &str) -> Option<QrPayload> {
    if let Ok(payload) = serde_json::from_str::<QrPayload>(content) {
        if payload.is_valid() {
            return Some(payload);
        }
    }

    let mut product_id = "";
    let mut hardware_id = "";
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("IMEI:") {
            hardware_id = rest.trim();
        } else if let Some(rest) = line.strip_prefix("ID:") {
            product_id = rest.trim();
        }
    }

    let payload = QrPayload {
        product_id: product_id.to_string(),
        hardware_id: hardware_id.to_string(),
        url: None,
        created: None,
    };
    payload.is_valid().then_some(payload)
}

/// The opaque code string stored on a QR record: `PROD_<productId>_<millis>`.
pub fn qr_code_string(product_id: &str, now: DateTime<Utc>) -> String {
    format!("PROD_{}_{}", product_id, now.timestamp_millis())
}

// =============================================================================
// Encoder seam
// =============================================================================

#[derive(Debug, Error)]
pub enum QrEncodeError {
    #[error("QR content does not fit in a QR code: {0}")]
    Capacity(String),

    #[error("QR image rendering failed: {0}")]
    Render(String),
}

/// Renders QR content to a `data:image/png;base64,…` URL.
pub trait QrEncoder: Send + Sync {
    fn encode(&self, content: &str) -> Result<String, QrEncodeError>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_payload_content() {
        let payload = QrPayload::for_product("p-1", "123456789012345", "/products/", at());
        assert_eq!(payload.url.as_deref(), Some("/products/p-1"));
        assert_eq!(payload.created.as_deref(), Some("2026-10-19T08:30:00.000Z"));

        let json: serde_json::Value = serde_json::from_str(&payload.to_content()).unwrap();
        assert_eq!(json["productId"], "p-1");
        assert_eq!(json["hardwareId"], "123456789012345");
    }

    #[test]
    fn test_parse_json_content() {
        let payload = QrPayload::for_product("p-1", "123456789012345", "/products", at());
        assert_eq!(parse_qr_content(&payload.to_content()), Some(payload));
    }

    #[test]
    fn test_parse_legacy_imei_key() {
        let parsed = parse_qr_content(r#"{"productId":"p-9","imei":"356938035643809"}"#).unwrap();
        assert_eq!(parsed.hardware_id, "356938035643809");
        assert_eq!(parsed.url, None);
    }

    #[test]
    fn test_parse_text_block() {
        let parsed =
            parse_qr_content("Produit: iPhone 15\nIMEI: 123456789012345\nID: p-1").unwrap();
        assert_eq!(parsed.product_id, "p-1");
        assert_eq!(parsed.hardware_id, "123456789012345");
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert_eq!(parse_qr_content("hello"), None);
        assert_eq!(parse_qr_content(r#"{"productId":"p","hardwareId":"123"}"#), None);
        assert_eq!(parse_qr_content("IMEI: 123456789012345"), None);
    }

    #[test]
    fn test_code_string() {
        assert_eq!(
            qr_code_string("p-1", at()),
            format!("PROD_p-1_{}", at().timestamp_millis())
        );
    }
}
