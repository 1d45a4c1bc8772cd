//! AWS client construction and the process-wide shared client.
//!
//! Two paths exist on purpose: [`create_client`] builds an explicit,
//! injectable client for callers that manage their own lifetimes, and
//! [`shared_client`] keeps the one lazily initialized instance that
//! short-lived serverless handlers reuse across sequential invocations.

use aws_sdk_dynamodb::Client;
use tokio::sync::OnceCell;

/// Client configuration read from the environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
    /// AWS region.
    pub region: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: std::env::var("AWS_ENDPOINT_URL").ok(),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        }
    }
}

impl ClientConfig {
    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({url})"),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

/// Creates a DynamoDB client with the given configuration.
///
/// Credential and region resolution follow the SDK default chain;
/// failures surface from the SDK on first use, not here.
pub async fn create_client(config: &ClientConfig) -> Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    Client::new(&sdk_config)
}

static SHARED: OnceCell<Client> = OnceCell::const_new();

/// Returns the process-wide client, initializing it from the environment
/// exactly once. Every subsequent call returns the same instance.
pub async fn shared_client() -> &'static Client {
    SHARED
        .get_or_init(|| async { create_client(&ClientConfig::default()).await })
        .await
}

/// Table name from `DYNAMODB_TABLE_NAME` (defaults to "monotable").
pub fn table_name_from_env() -> String {
    std::env::var("DYNAMODB_TABLE_NAME").unwrap_or_else(|_| "monotable".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_display() {
        let config = ClientConfig {
            endpoint_url: Some("http://localhost:8000".to_string()),
            region: "us-east-1".to_string(),
        };
        assert_eq!(
            config.target_display(),
            "Local DynamoDB (http://localhost:8000)"
        );

        let config = ClientConfig {
            endpoint_url: None,
            region: "eu-west-1".to_string(),
        };
        assert_eq!(config.target_display(), "AWS DynamoDB (region: eu-west-1)");
    }

    #[tokio::test]
    async fn test_shared_client_returns_identical_instance() {
        let first = shared_client().await;
        let second = shared_client().await;
        assert!(std::ptr::eq(first, second));
    }
}
