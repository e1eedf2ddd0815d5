use serde::{Deserialize, Serialize};

use crate::store::Document;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
    pub name: String,
    pub breed: String,
    pub age: i64,
}

impl Dog {
    pub fn new(name: impl Into<String>, breed: impl Into<String>, age: i64) -> Self {
        Self {
            name: name.into(),
            breed: breed.into(),
            age,
        }
    }
}

impl Document for Dog {
    const COLLECTION: &'static str = "dogs";

    fn name(&self) -> &str {
        &self.name
    }
}
