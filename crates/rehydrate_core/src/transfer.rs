//! The transfer record carried from the server-rendered page to the browser.
//!
//! A [`TransferState`] is a flat map from string keys to JSON values. The
//! server fills it while rendering, encodes it into a `<script>` element of
//! the page, and the browser decodes it back during bootstrap.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RehydrateCoreError, Result, MAX_TRANSFER_PAYLOAD_SIZE};
use crate::keys::transfer_script_id;

/// A transport key tagged with the type of the value stored under it.
pub struct StateKey<T> {
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StateKey<T> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl<T> Clone for StateKey<T> {
    fn clone(&self) -> Self {
        Self::new(self.key.clone())
    }
}

impl<T> PartialEq for StateKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for StateKey<T> {}

impl<T> fmt::Debug for StateKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateKey").field(&self.key).finish()
    }
}

/// Key-value record shared between the server render and the browser.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferState {
    entries: BTreeMap<String, Value>,
}

impl TransferState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the value under `key`.
    ///
    /// A value whose shape does not match `T` reads as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &StateKey<T>) -> Option<T> {
        self.entries
            .get(key.as_str())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Writes `value` under `key`, replacing whatever was there.
    pub fn set<T: Serialize>(&mut self, key: &StateKey<T>, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| RehydrateCoreError::Serialization(e.to_string()))?;
        self.entries.insert(key.as_str().to_string(), value);
        Ok(())
    }

    /// Writes the `true` marker under `key`, replacing whatever was there.
    pub fn mark(&mut self, key: &str) {
        self.entries.insert(key.to_string(), Value::Bool(true));
    }

    pub fn has_key<T>(&self, key: &StateKey<T>) -> bool {
        self.entries.contains_key(key.as_str())
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove<T>(&mut self, key: &StateKey<T>) -> bool {
        self.entries.remove(key.as_str()).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the record to a JSON object string.
    ///
    /// Fails with `PayloadTooLarge` above [`MAX_TRANSFER_PAYLOAD_SIZE`].
    pub fn to_json(&self) -> Result<String> {
        let json = serde_json::to_string(&self.entries)
            .map_err(|e| RehydrateCoreError::Serialization(e.to_string()))?;

        if json.len() > MAX_TRANSFER_PAYLOAD_SIZE {
            return Err(RehydrateCoreError::PayloadTooLarge {
                size: json.len(),
                max: MAX_TRANSFER_PAYLOAD_SIZE,
            });
        }

        Ok(json)
    }

    /// Parse a record from a JSON object string.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: BTreeMap<String, Value> = serde_json::from_str(json)
            .map_err(|e| RehydrateCoreError::InvalidPayload(e.to_string()))?;
        Ok(Self { entries })
    }

    /// Encode the record as the `<script>` element embedded in the page.
    ///
    /// Characters that could close the element early are emitted as JSON
    /// unicode escapes, so the body still parses to the same record.
    pub fn to_script(&self, app_id: &str) -> Result<String> {
        let json = self.to_json()?;
        Ok(format!(
            r#"<script id="{}" type="application/json">{}</script>"#,
            transfer_script_id(app_id),
            escape_script_json(&json)
        ))
    }

    /// Locate the transfer `<script>` element for `app_id` in `html` and
    /// decode its body.
    pub fn from_html(html: &str, app_id: &str) -> Result<Self> {
        let script_id = transfer_script_id(app_id);
        let id_attr = format!("id=\"{}\"", script_id);

        let id_pos = html
            .find(&id_attr)
            .ok_or_else(|| RehydrateCoreError::MissingPayload(script_id.clone()))?;

        let body_start = html[id_pos..]
            .find('>')
            .map(|offset| id_pos + offset + 1)
            .ok_or_else(|| RehydrateCoreError::InvalidPayload("unterminated script tag".into()))?;

        let body_end = html[body_start..]
            .find("</script>")
            .map(|offset| body_start + offset)
            .ok_or_else(|| RehydrateCoreError::InvalidPayload("missing </script>".into()))?;

        Self::from_json(html[body_start..body_end].trim())
    }
}

/// Size of `value` once serialized, failing with `PayloadTooLarge` above
/// [`MAX_TRANSFER_PAYLOAD_SIZE`].
pub fn check_payload_size<T: Serialize>(value: &T) -> Result<usize> {
    let size = serde_json::to_string(value)
        .map(|s| s.len())
        .map_err(|e| RehydrateCoreError::Serialization(e.to_string()))?;

    if size > MAX_TRANSFER_PAYLOAD_SIZE {
        return Err(RehydrateCoreError::PayloadTooLarge {
            size,
            max: MAX_TRANSFER_PAYLOAD_SIZE,
        });
    }

    Ok(size)
}

/// Escape characters that are significant to the HTML parser inside a
/// `<script>` element.
fn escape_script_json(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            _ => escaped.push(c),
        }
    }
    escaped
}
