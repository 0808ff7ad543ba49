use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::{Brain, Result};

/// Brain held entirely in process memory.
#[derive(Default)]
pub struct MemoryBrain {
    data: RwLock<HashMap<String, Value>>,
}

impl MemoryBrain {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Brain for MemoryBrain {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.data.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.data.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_remove() {
        let brain = MemoryBrain::new();
        assert!(brain.get("respond").await.unwrap().is_none());

        brain.set("respond", json!({"foo": "bar"})).await.unwrap();
        assert_eq!(
            brain.get("respond").await.unwrap(),
            Some(json!({"foo": "bar"}))
        );

        assert!(brain.remove("respond").await.unwrap());
        assert!(!brain.remove("respond").await.unwrap());
        assert!(brain.get("respond").await.unwrap().is_none());
    }
}
