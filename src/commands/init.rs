use crate::args::InitArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::anyhow;
use std::path::Path;
use std::time::Duration;

/// Writes a config file at `path` for the wallet service at `api_url`, along with the settings in
/// `args`.
///
/// # Errors
/// - Returns an `ErrorType::Config` error if `api_url` is missing or invalid, or if the file
///   cannot be written.
pub async fn init(path: &Path, api_url: Option<&str>, args: &InitArgs) -> Result<Out<()>> {
    let api_url = api_url
        .ok_or_else(|| anyhow!("The --api-url argument or WALLET_API_URL is required for init"))
        .pub_result(ErrorType::Config)?;
    let mut config = Config::new(api_url)?.with_load_ordering(args.load_ordering());
    if let Some(secs) = args.request_timeout_secs() {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }
    config.save(path).await?;
    Ok(format!("Successfully wrote the wallet config to {}", path.display()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::LoadOrdering;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallet").join("config.json");
        let args = InitArgs::new(Some(15), LoadOrdering::LatestStarted);

        let out = init(&path, Some("https://wallet.example.com/api"), &args)
            .await
            .unwrap();
        assert!(out.message().contains("config.json"));

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.api_url().as_str(), "https://wallet.example.com/api");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.load_ordering(), LoadOrdering::LatestStarted);
    }

    #[tokio::test]
    async fn test_init_requires_url() {
        let dir = TempDir::new().unwrap();
        let args = InitArgs::new(None, LoadOrdering::default());
        let err = init(&dir.path().join("config.json"), None, &args)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
