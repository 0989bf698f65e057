//! Report source and sink descriptors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A report to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSource {
    /// Selects the source handler.
    pub r#type: String,
    /// The file to read.
    pub filename: String,
}

/// A report to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSink {
    /// Selects the sink handler.
    pub r#type: String,
    /// The file to write.
    pub filename: String,
}

/// Common view over configured sources and sinks.
pub trait ReportEndpoint {
    /// The handler type name.
    fn report_type(&self) -> &str;

    /// The backing file.
    fn filename(&self) -> &str;
}

impl ReportEndpoint for ReportSource {
    fn report_type(&self) -> &str {
        &self.r#type
    }

    fn filename(&self) -> &str {
        &self.filename
    }
}

impl ReportEndpoint for ReportSink {
    fn report_type(&self) -> &str {
        &self.r#type
    }

    fn filename(&self) -> &str {
        &self.filename
    }
}

impl ReportSource {
    /// Creates a new source descriptor.
    pub fn new(r#type: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            r#type: r#type.into(),
            filename: filename.into(),
        }
    }

    /// Returns true if the JSON value has the shape of a source descriptor.
    pub fn is_valid(value: &Value) -> bool {
        has_endpoint_shape(value)
    }
}

impl ReportSink {
    /// Creates a new sink descriptor.
    pub fn new(r#type: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            r#type: r#type.into(),
            filename: filename.into(),
        }
    }

    /// Returns true if the JSON value has the shape of a sink descriptor.
    pub fn is_valid(value: &Value) -> bool {
        has_endpoint_shape(value)
    }
}

fn has_endpoint_shape(value: &Value) -> bool {
    value.as_object().is_some_and(|object| {
        object.get("type").is_some_and(Value::is_string)
            && object.get("filename").is_some_and(Value::is_string)
    })
}

/// A single handler option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    String(String),
    Number(f64),
}

/// Options passed to every handler invocation.
pub type HandlerOptions = BTreeMap<String, OptionValue>;
