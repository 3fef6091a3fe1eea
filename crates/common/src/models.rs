use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::{Map, Value};
use tabled::Tabled;

use crate::error::LookupError;

/// Product attributes returned by the lookup service for a scanned code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct ProductDetails {
    #[serde(rename = "SkuSizeName", deserialize_with = "scalar_string")]
    #[tabled(rename = "SKU Size Name")]
    pub sku_size_name: String,
    #[serde(rename = "SkuUniqueId", deserialize_with = "scalar_string")]
    #[tabled(rename = "SKU ID")]
    pub sku_unique_id: String,
    #[serde(rename = "ProductCode", deserialize_with = "scalar_string")]
    #[tabled(rename = "Code")]
    pub product_code: String,
    /// Every other attribute the service sent along.
    #[serde(flatten)]
    #[tabled(skip)]
    pub extra: Map<String, Value>,
}

impl ProductDetails {
    pub fn new(
        sku_size_name: impl Into<String>,
        sku_unique_id: impl Into<String>,
        product_code: impl Into<String>,
    ) -> Self {
        Self {
            sku_size_name: sku_size_name.into(),
            sku_unique_id: sku_unique_id.into(),
            product_code: product_code.into(),
            extra: Map::new(),
        }
    }

    /// All attributes as display pairs, the three known ones first.
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("SKU Size Name".to_string(), self.sku_size_name.clone()),
            ("SKU ID".to_string(), self.sku_unique_id.clone()),
            ("Code".to_string(), self.product_code.clone()),
        ];
        out.extend(self.extra.iter().map(|(k, v)| {
            let rendered = match v {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k.clone(), rendered)
        }));
        out
    }
}

/// Attributes arrive as strings, but ids are sometimes plain numbers.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!("expected a scalar, got {other}"))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Only read when `success` is true; rejections may carry anything here.
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(ProductDetails),
    /// The service answered but refused the code, with its message if any.
    Rejected(Option<String>),
}

impl TryFrom<LookupResponse> for LookupOutcome {
    type Error = LookupError;

    fn try_from(value: LookupResponse) -> Result<Self, Self::Error> {
        match (value.success, value.data) {
            (true, None | Some(Value::Null)) => Err(LookupError::MissingData),
            (true, Some(data)) => serde_json::from_value(data)
                .map(LookupOutcome::Found)
                .map_err(LookupError::InvalidData),
            (false, _) => Ok(LookupOutcome::Rejected(value.message)),
        }
    }
}

#[cfg(test)]
#[path = "tests/models_tests.rs"]
mod tests;
