use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::Value;
use crate::error::DescriptorError;

/// A schema-free key/value document describing one primitive.
///
/// The hydration pipeline reads the keys it needs through the typed
/// accessors (`require_*`, `optional_*`), which report a
/// [`DescriptorError`] naming the offending key. Nested maps are
/// descriptors themselves.
///
/// Descriptors can be built by hand, parsed from TOML, or converted from
/// any `Serialize` type:
///
/// ```ignore
/// let descriptor = Descriptor::new()
///     .with("Effects", vec!["basic"])
///     .with("RenderListId", 2);
///
/// let from_dto = Descriptor::from_serialize(&mesh_dto)?;
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor {
    entries: BTreeMap<String, Value>,
}

impl Descriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    // -----------------------------------------------------------------------
    // Typed access
    // -----------------------------------------------------------------------

    pub fn require(&self, key: &str) -> Result<&Value, DescriptorError> {
        self.get(key).ok_or_else(|| DescriptorError::missing(key))
    }

    pub fn require_str(&self, key: &str) -> Result<&str, DescriptorError> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| DescriptorError::mismatch(key, "a string"))
    }

    pub fn require_integer(&self, key: &str) -> Result<i64, DescriptorError> {
        self.require(key)?
            .as_integer()
            .ok_or_else(|| DescriptorError::mismatch(key, "an integer"))
    }

    /// A non-negative integer that fits in `u32`.
    pub fn require_u32(&self, key: &str) -> Result<u32, DescriptorError> {
        let value = self.require_integer(key)?;
        u32::try_from(value)
            .map_err(|_| DescriptorError::invalid(key, format!("{value} is out of range")))
    }

    pub fn require_list(&self, key: &str) -> Result<&[Value], DescriptorError> {
        self.require(key)?
            .as_list()
            .ok_or_else(|| DescriptorError::mismatch(key, "a list"))
    }

    pub fn require_map(&self, key: &str) -> Result<&Descriptor, DescriptorError> {
        self.require(key)?
            .as_map()
            .ok_or_else(|| DescriptorError::mismatch(key, "a map"))
    }

    pub fn optional_str(&self, key: &str) -> Result<Option<&str>, DescriptorError> {
        self.optional(key, |v| v.as_str(), "a string")
    }

    pub fn optional_integer(&self, key: &str) -> Result<Option<i64>, DescriptorError> {
        self.optional(key, |v| v.as_integer(), "an integer")
    }

    pub fn optional_list(&self, key: &str) -> Result<Option<&[Value]>, DescriptorError> {
        self.optional(key, |v| v.as_list(), "a list")
    }

    pub fn optional_map(&self, key: &str) -> Result<Option<&Descriptor>, DescriptorError> {
        self.optional(key, |v| v.as_map(), "a map")
    }

    fn optional<'a, T>(
        &'a self,
        key: &str,
        convert: impl FnOnce(&'a Value) -> Option<T>,
        expected: &'static str,
    ) -> Result<Option<T>, DescriptorError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => convert(value)
                .map(Some)
                .ok_or_else(|| DescriptorError::mismatch(key, expected)),
        }
    }

    // -----------------------------------------------------------------------
    // serde bridge
    // -----------------------------------------------------------------------

    /// Converts any `Serialize` type whose serialized form is a map.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, DescriptorError> {
        toml::Value::try_from(value)
            .map_err(|e| DescriptorError::Conversion(e.to_string()))?
            .try_into()
            .map_err(|e: toml::de::Error| DescriptorError::Conversion(e.to_string()))
    }

    /// Converts this descriptor into any `DeserializeOwned` type.
    pub fn to_deserialize<T: DeserializeOwned>(&self) -> Result<T, DescriptorError> {
        toml::Value::try_from(self)
            .map_err(|e| DescriptorError::Conversion(e.to_string()))?
            .try_into()
            .map_err(|e: toml::de::Error| DescriptorError::Conversion(e.to_string()))
    }

    /// Parses a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, DescriptorError> {
        toml::from_str(source).map_err(|e| DescriptorError::Conversion(e.to_string()))
    }
}

impl FromIterator<(String, Value)> for Descriptor {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct GeometryDto {
        name: String,
        vertex_size: u32,
    }

    fn sample() -> Descriptor {
        Descriptor::new()
            .with("Name", "cube")
            .with("Size", 32)
            .with("Tags", vec!["a", "b"])
            .with("Geometry", Descriptor::new().with("Name", "cube"))
    }

    #[test]
    fn typed_getters() {
        let d = sample();
        assert_eq!(d.require_str("Name"), Ok("cube"));
        assert_eq!(d.require_integer("Size"), Ok(32));
        assert_eq!(d.require_u32("Size"), Ok(32));
        assert_eq!(d.require_list("Tags").map(<[Value]>::len), Ok(2));
        assert!(d.require_map("Geometry").is_ok());
        assert_eq!(d.optional_str("Missing"), Ok(None));
    }

    #[test]
    fn getters_report_the_key() {
        let d = sample();
        assert_eq!(
            d.require_str("Absent"),
            Err(DescriptorError::MissingField {
                field: "Absent".into()
            })
        );
        assert_eq!(
            d.require_integer("Name"),
            Err(DescriptorError::TypeMismatch {
                field: "Name".into(),
                expected: "an integer"
            })
        );
        assert!(matches!(
            d.optional_map("Size"),
            Err(DescriptorError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn negative_u32_is_invalid() {
        let d = Descriptor::new().with("Count", -1);
        assert!(matches!(
            d.require_u32("Count"),
            Err(DescriptorError::InvalidValue { .. })
        ));
    }

    #[test]
    fn serde_bridge() {
        let dto = GeometryDto {
            name: "quad".into(),
            vertex_size: 20,
        };
        let d = Descriptor::from_serialize(&dto).unwrap();
        assert_eq!(d.require_str("Name"), Ok("quad"));
        assert_eq!(d.require_integer("VertexSize"), Ok(20));
        assert_eq!(d.to_deserialize::<GeometryDto>().unwrap(), dto);
    }

    #[test]
    fn parses_toml() {
        let d = Descriptor::from_toml_str("Effects = [\"basic\"]\n[Geometry]\nName = \"cube\"\n")
            .unwrap();
        assert_eq!(
            d.require_map("Geometry").and_then(|g| g.require_str("Name")),
            Ok("cube")
        );
    }
}
