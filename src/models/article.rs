//! Article rows and upstream payload shapes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single upstream news row.
///
/// Rows are kept as raw JSON objects so unknown upstream fields pass
/// through to storage and responses untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleRow(Map<String, Value>);

impl ArticleRow {
    /// Stable article identity. Accepts integral numbers and numeric strings.
    pub fn id(&self) -> Option<i64> {
        match self.0.get("id")? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Upstream content type (e.g., "notice", "activity").
    pub fn news_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.0.get("thumbnail").and_then(Value::as_str)
    }

    pub fn set_thumbnail(&mut self, url: impl Into<String>) {
        self.0.insert("thumbnail".to_string(), Value::String(url.into()));
    }

    /// Raw field access for pass-through values.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

impl From<Value> for ArticleRow {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// Upstream sends `null` for fields it has no value for; treat it like an
/// absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Full article as returned by the detail endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsDetail {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub news_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub type_label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub publish_time: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub thumbnail: String,
    /// Article body as HTML
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
}

/// Common upstream envelope: `{code, message, data}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct UpstreamEnvelope<T: Default> {
    #[serde(deserialize_with = "null_as_default")]
    pub code: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub data: T,
}

/// `data` of the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListData {
    #[serde(deserialize_with = "null_as_default")]
    pub count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub rows: Vec<ArticleRow>,
}

/// `data` of the detail endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetailData {
    #[serde(deserialize_with = "null_as_default")]
    pub news: NewsDetail,
}
