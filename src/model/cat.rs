use serde::{Deserialize, Serialize};

use crate::store::Document;

/// A cat and the number of beds it has claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cat {
    pub name: String,
    #[serde(default)]
    pub beds_owned: i64,
}

impl Cat {
    pub fn new(name: impl Into<String>, beds_owned: i64) -> Self {
        Self {
            name: name.into(),
            beds_owned,
        }
    }

    /// The record the last-added slot holds before any cat is created.
    pub fn placeholder() -> Self {
        Self::new("unknown", 0)
    }
}

impl Document for Cat {
    const COLLECTION: &'static str = "cats";

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_mapper_field_names() {
        let cat = Cat::new("Tom", 2);
        assert_eq!(
            serde_json::to_value(&cat).unwrap(),
            json!({"name": "Tom", "bedsOwned": 2})
        );
    }

    #[test]
    fn beds_default_to_zero() {
        let cat: Cat = serde_json::from_value(json!({"name": "Felix"})).unwrap();
        assert_eq!(cat.beds_owned, 0);
    }
}
