//! # Service account credentials
//!
//! Turns a service-account key file into an authenticated [`SheetsClient`].
//!
//! Every call to [`CredentialProvider::service_handle`] re-reads the key file,
//! builds a new authenticator and fetches an access token with it. Nothing is
//! cached between calls.

use crate::config::{Config, KEY_PATH_VAR};
use crate::error::{Result, SheetOrmError};
use crate::store::{ServiceProvider, SheetsClient};
use async_trait::async_trait;
use std::path::PathBuf;
use yup_oauth2::{ServiceAccountAuthenticator, ServiceAccountKey};

/// Full read/write access to spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Builds authenticated Sheets handles from a key file path.
#[derive(Debug, Clone)]
pub struct CredentialProvider {
    key_path: Option<PathBuf>,
    http: reqwest::Client,
}

impl CredentialProvider {
    pub fn new(key_path: Option<PathBuf>) -> Self {
        CredentialProvider {
            key_path,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.key_path.clone())
    }

    /// Read and parse the key file. Relative paths resolve against the
    /// current working directory.
    pub fn load_key(&self) -> Result<ServiceAccountKey> {
        let key_path = self
            .key_path
            .as_ref()
            .ok_or_else(|| SheetOrmError::Configuration(format!("{KEY_PATH_VAR} not found")))?;

        let full_path = std::env::current_dir()?.join(key_path);
        log::debug!("Loading service account key from {}", full_path.display());

        let content = std::fs::read_to_string(&full_path)?;
        let key: ServiceAccountKey = serde_json::from_str(&content)?;
        Ok(key)
    }

    /// Exchange `key` for an access token carrying the spreadsheets scope.
    async fn fetch_access_token(&self, key: ServiceAccountKey) -> Result<String> {
        let authenticator = ServiceAccountAuthenticator::builder(key).build().await?;
        let token = authenticator.token(&[SPREADSHEETS_SCOPE]).await?;
        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| SheetOrmError::Configuration("Token response had no access token".into()))
    }

    /// A freshly authenticated Sheets client.
    pub async fn service_handle(&self) -> Result<SheetsClient> {
        let key = self.load_key()?;
        let client_email = key.client_email.clone();
        let access_token = self.fetch_access_token(key).await?;
        log::debug!("Obtained access token for {client_email}");
        Ok(SheetsClient::new(self.http.clone(), access_token))
    }
}

#[async_trait]
impl ServiceProvider for CredentialProvider {
    type Handle = SheetsClient;

    async fn service_handle(&self) -> Result<SheetsClient> {
        CredentialProvider::service_handle(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_key(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("service-account.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    const KEY_WITH_BAD_PEM: &str = r#"{
        "type": "service_account",
        "client_email": "orm@example.iam.gserviceaccount.com",
        "private_key": "not a pem",
        "token_uri": "http://127.0.0.1:9/token"
    }"#;

    #[test]
    fn test_missing_key_path_is_configuration_error() {
        let provider = CredentialProvider::new(None);
        match provider.load_key().unwrap_err() {
            SheetOrmError::Configuration(msg) => assert!(msg.contains(KEY_PATH_VAR)),
            other => panic!("Expected Configuration error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn test_service_handle_without_key_path_fails() {
        let provider = CredentialProvider::new(None);
        let err = ServiceProvider::service_handle(&provider).await.unwrap_err();
        assert!(matches!(err, SheetOrmError::Configuration(_)));
    }

    #[test]
    fn test_missing_key_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let provider = CredentialProvider::new(Some(tmp.path().join("nope.json")));
        assert!(matches!(provider.load_key().unwrap_err(), SheetOrmError::Io(_)));
    }

    #[test]
    fn test_malformed_key_file_is_json_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_key(&tmp, "not json at all");
        let provider = CredentialProvider::new(Some(path));
        assert!(matches!(provider.load_key().unwrap_err(), SheetOrmError::Json(_)));
    }

    #[test]
    fn test_load_key_reads_service_account_fields() {
        let tmp = TempDir::new().unwrap();
        let path = write_key(&tmp, KEY_WITH_BAD_PEM);

        let key = CredentialProvider::new(Some(path)).load_key().unwrap();
        assert_eq!(key.client_email, "orm@example.iam.gserviceaccount.com");
        assert_eq!(key.token_uri, "http://127.0.0.1:9/token");
        assert_eq!(key.private_key_id, None);
    }

    #[tokio::test]
    async fn test_service_handle_with_invalid_private_key_fails() {
        let tmp = TempDir::new().unwrap();
        let path = write_key(&tmp, KEY_WITH_BAD_PEM);
        let provider = CredentialProvider::new(Some(path));

        let err = provider.service_handle().await.unwrap_err();
        assert!(
            matches!(err, SheetOrmError::Io(_) | SheetOrmError::Auth(_)),
            "unexpected error: {err}"
        );
    }
}
