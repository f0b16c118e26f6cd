use anyhow::Result;
use serde_json::Value;

/// Key→value persistence for small out-of-band records. The sidecar's
/// failure mode is independent of the controller's; callers decide
/// whether a read failure is fatal.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn put(&self, key: &str, value: Value) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}
