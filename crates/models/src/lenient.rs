//! Tolerant field decoding shared by the dataset schemas.
//!
//! The dashboard and the collectors do not agree on value types: a `skip`
//! flag may arrive as `"Yes"`, `true` or `1`. Stored values are kept exactly
//! as found so rewriting a file never alters records nobody touched; the
//! text coercion happens when a view is built or a patch is decoded.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Text form of a JSON scalar; `None` for null, arrays and objects.
pub fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Stored field, kept verbatim. A present `null` stays `Some(Value::Null)`
/// so it is written back; only an absent key is `None`.
pub fn stored<'de, D>(de: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(de).map(Some)
}

/// View text of a stored field: scalars as text, anything else `""`.
pub fn text(slot: &Option<Value>) -> String {
    slot.clone().and_then(scalar_text).unwrap_or_default()
}

/// Record key: scalar text with surrounding whitespace removed; blank reads as missing.
pub fn trimmed_key<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(value
        .and_then(scalar_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Patch field. Outer `None` leaves the stored value alone, `Some(None)`
/// clears it, `Some(Some(v))` overwrites it. Only called for present keys,
/// so pair it with `#[serde(default)]`.
pub fn field_update<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(de)?;
    Ok(match value {
        Value::Null => Some(None),
        Value::Array(_) | Value::Object(_) => None,
        scalar => Some(scalar_text(scalar)),
    })
}

/// Apply one patch field onto its stored slot.
pub fn apply(slot: &mut Option<Value>, update: Option<Option<String>>) {
    if let Some(value) = update {
        *slot = value.map(Value::String);
    }
}
