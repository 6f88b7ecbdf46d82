use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reduce a raw identifier to its canonical string form.
///
/// Integers render as plain decimal, UUIDs as lowercase hyphenated, anything
/// else is only trimmed. Two identifiers are equal iff their canonical forms
/// are equal.
pub fn canonical_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return n.to_string();
    }
    if let Ok(uuid) = Uuid::parse_str(trimmed) {
        return uuid.hyphenated().to_string();
    }
    trimmed.to_string()
}

/// Identifier of a story, always held in canonical form.
///
/// The backend may hand out numeric or UUID keys and older ledgers stored
/// them as raw JSON numbers, so the deserializer accepts both strings and
/// integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(canonical_id(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StoryId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for StoryId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StoryId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<i64> for StoryId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl From<u64> for StoryId {
    fn from(n: u64) -> Self {
        Self::new(n.to_string())
    }
}

impl From<Uuid> for StoryId {
    fn from(id: Uuid) -> Self {
        Self(id.hyphenated().to_string())
    }
}

impl<'de> Deserialize<'de> for StoryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_canonical(deserializer).map(StoryId)
    }
}

struct CanonicalIdVisitor;

impl<'de> Visitor<'de> for CanonicalIdVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer identifier")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(canonical_id(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(canonical_id(&v.to_string()))
    }
}

/// Serde helper for id columns that may arrive as strings or integers.
pub fn deserialize_canonical<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    d.deserialize_any(CanonicalIdVisitor)
}

/// Anonymous per-device identity used to attribute likes.
///
/// This is not an authenticated user, just a token stored on the device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_agree() {
        assert_eq!(StoryId::from(42i64), StoryId::from("42"));
        assert_eq!(StoryId::from(" 42 "), StoryId::from(42u64));
    }

    #[test]
    fn uuid_ids_are_lowercased() {
        let raw = "9F1C2D3E-4B5A-4C6D-8E7F-0123456789AB";
        let id = StoryId::new(raw);
        assert_eq!(id.as_str(), "9f1c2d3e-4b5a-4c6d-8e7f-0123456789ab");
        assert_eq!(id, StoryId::from(Uuid::parse_str(raw).unwrap()));
    }

    #[test]
    fn deserializes_mixed_json_array() {
        let ids: Vec<StoryId> = serde_json::from_str(r#"[7, "7", "abc", " 8 "]"#).unwrap();
        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[2].as_str(), "abc");
        assert_eq!(ids[3].as_str(), "8");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&vec![StoryId::from(5i64)]).unwrap();
        assert_eq!(json, r#"["5"]"#);
    }
}
