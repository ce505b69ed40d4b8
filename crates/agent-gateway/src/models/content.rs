use crate::errors::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TEXT_CONTENT_TYPE: &str = "text";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Value>,
}

/// One block of a message's content.
///
/// Every field is optional so that a block with an unexpected shape still
/// deserializes, and is reported as malformed when it is read instead of
/// failing the whole message listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextValue>,
}

impl ContentBlock {
    pub fn text<S: Into<String>>(value: S) -> Self {
        ContentBlock {
            kind: Some(TEXT_CONTENT_TYPE.to_string()),
            text: Some(TextValue {
                value: Some(value.into()),
                annotations: Vec::new(),
            }),
        }
    }

    /// Get the text value of this block.
    ///
    /// Returns `Ok(None)` for a well-formed block that carries no usable text
    /// (another content type, or an empty value), and an error when the block
    /// is missing the fields a text block needs.
    pub fn text_value(&self) -> GatewayResult<Option<&str>> {
        let kind = self
            .kind
            .as_deref()
            .ok_or_else(|| GatewayError::MalformedContent("content block has no type".into()))?;

        if kind != TEXT_CONTENT_TYPE {
            return Ok(None);
        }

        let value = self
            .text
            .as_ref()
            .and_then(|text| text.value.as_deref())
            .ok_or_else(|| {
                GatewayError::MalformedContent("text content block has no value".into())
            })?;

        Ok(Some(value).filter(|v| !v.is_empty()))
    }
}
