use bytes::Bytes;

use super::value::{BinaryValue, PropertyType, Value};
use crate::error::{MountError, Result};
use crate::tree::path::{name_of, parent_of};
use crate::tree::{Attribute, DeferredBinary};

/// A materialized, read-only property.
///
/// Holds one or more values of a single type. Scalar accessors read the
/// first value. Cloning a property shares the download buffer of binary
/// values.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedProperty {
    path: String,
    values: Vec<Value>,
    multiple: bool,
    property_type: PropertyType,
}

impl ProjectedProperty {
    /// A single-valued property
    pub fn single(path: impl Into<String>, value: Value) -> Self {
        ProjectedProperty {
            path: path.into(),
            property_type: value.property_type(),
            values: vec![value],
            multiple: false,
        }
    }

    /// A multi-valued property typed after its first value; `None` when empty
    pub fn multiple(path: impl Into<String>, values: Vec<Value>) -> Option<Self> {
        let property_type = values.first()?.property_type();
        Some(ProjectedProperty {
            path: path.into(),
            values,
            multiple: true,
            property_type,
        })
    }

    pub fn string(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::single(path, Value::String(value.into()))
    }

    pub fn binary(path: impl Into<String>, data: DeferredBinary) -> Self {
        Self::single(path, Value::Binary(BinaryValue::deferred(data)))
    }

    /// Convert a descriptor attribute at `path`
    pub(crate) fn from_attribute(path: String, attribute: &Attribute) -> Self {
        match attribute {
            Attribute::String(s) => Self::string(path, s.clone()),
            Attribute::Binary(data) => Self::binary(path, data.clone()),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        name_of(&self.path)
    }

    /// Path of the node owning this property
    pub fn parent_path(&self) -> String {
        parent_of(&self.path)
    }

    pub fn depth(&self) -> usize {
        self.path.split('/').filter(|s| !s.is_empty()).count()
    }

    pub fn value(&self) -> &Value {
        &self.values[0]
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn property_type(&self) -> PropertyType {
        self.property_type
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub fn is_node(&self) -> bool {
        false
    }

    pub fn get_string(&self) -> Result<String> {
        self.value().string()
    }

    /// Payload bytes; the first read of a binary value downloads it
    pub async fn get_stream(&self) -> Result<Bytes> {
        self.value().stream().await
    }

    pub fn get_binary(&self) -> BinaryValue {
        self.value().binary()
    }

    /// Size of the binary payload, fetching it if needed
    pub async fn binary_size(&self) -> Result<u64> {
        self.get_binary().size().await
    }

    pub fn get_long(&self) -> Result<i64> {
        self.value().long()
    }

    pub fn get_double(&self) -> Result<f64> {
        self.value().double()
    }

    pub fn get_boolean(&self) -> Result<bool> {
        self.value().boolean()
    }

    /// Length of the first value: byte size for binaries, character count
    /// for strings
    pub async fn length(&self) -> Result<u64> {
        Self::value_length(self.value()).await
    }

    pub async fn lengths(&self) -> Result<Vec<u64>> {
        let mut lengths = Vec::with_capacity(self.values.len());
        for value in &self.values {
            lengths.push(Self::value_length(value).await?);
        }
        Ok(lengths)
    }

    async fn value_length(value: &Value) -> Result<u64> {
        match value {
            Value::Binary(b) => b.size().await,
            Value::String(s) => Ok(s.chars().count() as u64),
        }
    }

    pub fn is_new(&self) -> bool {
        false
    }

    pub fn is_modified(&self) -> bool {
        false
    }

    pub fn set_value(&self, _value: Value) -> Result<()> {
        Err(MountError::constraint("set_value", &self.path))
    }

    pub fn set_values(&self, _values: Vec<Value>) -> Result<()> {
        Err(MountError::constraint("set_value", &self.path))
    }

    pub fn remove(&self) -> Result<()> {
        Err(MountError::constraint("remove", &self.path))
    }

    /// Accepted; there is never anything to persist
    pub fn save(&self) -> Result<()> {
        Ok(())
    }

    pub fn refresh(&self, _keep_changes: bool) -> Result<()> {
        Ok(())
    }
}
