use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names referenced by the catalog. Records may carry others.
pub mod field {
    pub const COMMON_NAME: &str = "Common Name";
    pub const KINGDOM: &str = "Kingdom";
    pub const PHYLUM: &str = "Phylum";
    pub const CLASS: &str = "Class";
    pub const ORDER: &str = "Order";
    pub const FAMILY: &str = "Family";
    pub const GENUS: &str = "Genus";
    pub const SPECIES: &str = "Species";
    pub const HABITAT: &str = "Habitat";
    pub const DIET: &str = "Diet";
    pub const IMAGE: &str = "image";
}

/// Shown in place of any missing or empty field.
pub const NOT_AVAILABLE: &str = "N/A";

/// One animal as it appears in the remote dataset.
///
/// The mapping is kept verbatim; accessors only ever read it. A field is
/// present when it holds a JSON string.
///
/// ```
/// use zoolight_catalog::AnimalRecord;
///
/// let lion: AnimalRecord =
///     serde_json::from_str(r#"{"Common Name": "Lion", "Habitat": ""}"#).unwrap();
/// assert_eq!(lion.common_name(), Some("Lion"));
/// assert_eq!(lion.text_or_na("Habitat"), "N/A");
/// assert_eq!(lion.text_or_na("Diet"), "N/A");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimalRecord(Map<String, Value>);

impl AnimalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by fixtures and tests.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), Value::String(value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The field's text, or `N/A` when it is absent or empty.
    pub fn text_or_na(&self, key: &str) -> &str {
        self.non_empty(key).unwrap_or(NOT_AVAILABLE)
    }

    pub fn common_name(&self) -> Option<&str> {
        self.get(field::COMMON_NAME)
    }

    /// Image URL, if the record carries a non-blank one.
    pub fn image(&self) -> Option<&str> {
        self.get(field::IMAGE)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|s| !s.is_empty())
    }
}

impl From<Map<String, Value>> for AnimalRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
