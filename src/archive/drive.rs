//! Google Drive archive backend
//!
//! Authentication uses a service-account key: an RS256-signed JWT assertion
//! is exchanged at the key's `token_uri` for a bearer token. Uploads use the
//! Drive v3 `multipart` upload, which carries the JSON metadata and the file
//! bytes in one `multipart/related` request.

use crate::archive::Archiver;
use crate::config::ArchiveConfig;
use crate::error::{InterviewError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use zeroize::{Zeroize, Zeroizing};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Service-account key file as downloaded from the Google Cloud console
///
/// Only the fields needed for the JWT bearer flow are read.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account identity, used as the JWT issuer
    pub client_email: String,
    /// PEM-encoded RSA private key
    pub private_key: String,
    /// Key id placed in the JWT header when present
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// OAuth token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl Drop for ServiceAccountKey {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct CreatedFile {
    id: String,
}

impl ServiceAccountKey {
    /// Reads a key file
    ///
    /// # Errors
    ///
    /// Returns [`InterviewError::CredentialsMissing`] when the file does not
    /// exist, and a serialization error when it is not a key file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => Zeroizing::new(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(InterviewError::CredentialsMissing(path.display().to_string()).into())
            }
            Err(e) => return Err(InterviewError::Io(e).into()),
        };
        let key: ServiceAccountKey =
            serde_json::from_str(&contents).map_err(InterviewError::Serialization)?;
        Ok(key)
    }

    /// Builds the signed JWT assertion for the token exchange
    ///
    /// # Errors
    ///
    /// Returns [`InterviewError::Token`] when the private key cannot be
    /// parsed or signing fails.
    pub fn sign_assertion(&self, scopes: &[String], now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: scopes.join(" "),
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(InterviewError::Token)?;
        let assertion = jsonwebtoken::encode(&header, &claims, &key).map_err(InterviewError::Token)?;
        Ok(assertion)
    }
}

fn build_http_client(config: &ArchiveConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(concat!("interview-keeper/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| InterviewError::Config(format!("Failed to create HTTP client: {}", e)).into())
}

/// Authenticates with the configured service account
///
/// # Errors
///
/// Returns [`InterviewError::CredentialsMissing`] if the key file is absent
/// and [`InterviewError::UploadFailed`] if the token exchange fails. No
/// retry is attempted.
pub async fn authenticate(config: &ArchiveConfig) -> Result<DriveClient> {
    let key = ServiceAccountKey::from_file(&config.credentials_path)?;
    tracing::debug!(client_email = %key.client_email, "Loaded service account key");

    let http = build_http_client(config)?;
    let assertion = Zeroizing::new(key.sign_assertion(&config.scopes, Utc::now())?);

    let token_failed = |cause: &dyn fmt::Display| InterviewError::upload_failed("access token", cause);
    let resp = http
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|e| token_failed(&e))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(token_failed(&format!("HTTP {}: {}", status, body)).into());
    }

    let token: TokenResponse = resp.json().await.map_err(|e| token_failed(&e))?;
    tracing::info!("Authenticated with Google Drive");

    Ok(DriveClient {
        http,
        api_base: config.api_base.clone(),
        folder_id: config.folder_id.clone(),
        access_token: Zeroizing::new(token.access_token),
    })
}

/// Authenticated Drive client bound to one destination folder
pub struct DriveClient {
    http: Client,
    api_base: String,
    folder_id: String,
    access_token: Zeroizing<String>,
}

impl fmt::Debug for DriveClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveClient")
            .field("api_base", &self.api_base)
            .field("folder_id", &self.folder_id)
            .finish_non_exhaustive()
    }
}

impl DriveClient {
    /// Builds a client from an access token obtained elsewhere
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn with_access_token(config: &ArchiveConfig, access_token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: build_http_client(config)?,
            api_base: config.api_base.clone(),
            folder_id: config.folder_id.clone(),
            access_token: Zeroizing::new(access_token.into()),
        })
    }

    /// Destination folder id
    pub fn folder_id(&self) -> &str {
        &self.folder_id
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/upload/drive/v3/files?uploadType=multipart&fields=id",
            self.api_base.trim_end_matches('/')
        )
    }
}

/// Assembles a `multipart/related` body: JSON metadata part, then media part
fn multipart_related_body(
    boundary: &str,
    metadata: &serde_json::Value,
    content_type: &str,
    media: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(media.len() + 512);
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{}\r\n",
            boundary, metadata
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!("--{}\r\nContent-Type: {}\r\n\r\n", boundary, content_type).as_bytes(),
    );
    body.extend_from_slice(media);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

#[async_trait]
impl Archiver for DriveClient {
    async fn upload(
        &self,
        local_path: &Path,
        display_name: &str,
        content_type: &str,
    ) -> Result<String> {
        let media = tokio::fs::read(local_path).await.map_err(|e| {
            InterviewError::upload_failed(
                display_name,
                format!("cannot read {}: {}", local_path.display(), e),
            )
        })?;

        let boundary = format!("interview-keeper-{}", uuid::Uuid::new_v4().simple());
        let metadata = json!({
            "name": display_name,
            "parents": [self.folder_id],
        });
        let body = multipart_related_body(&boundary, &metadata, content_type, &media);

        tracing::debug!(
            name = %display_name,
            bytes = media.len(),
            folder_id = %self.folder_id,
            "Uploading to Drive"
        );

        let resp = self
            .http
            .post(self.upload_url())
            .bearer_auth(self.access_token.as_str())
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| InterviewError::upload_failed(display_name, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(InterviewError::upload_failed(
                display_name,
                format!("HTTP {}: {}", status, text),
            )
            .into());
        }

        let created: CreatedFile = resp
            .json()
            .await
            .map_err(|e| InterviewError::upload_failed(display_name, e))?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation};
    use tempfile::TempDir;

    const TEST_PRIVATE_KEY: &str = include_str!("../../tests/fixtures/test_rsa_key.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("../../tests/fixtures/test_rsa_key.pub.pem");

    fn test_key() -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "uploader@project.iam.gserviceaccount.com".to_string(),
            private_key: TEST_PRIVATE_KEY.to_string(),
            private_key_id: Some("key-1".to_string()),
            token_uri: "https://oauth2.example.test/token".to_string(),
        }
    }

    #[derive(Debug, Deserialize)]
    struct DecodedClaims {
        iss: String,
        scope: String,
        aud: String,
        iat: i64,
        exp: i64,
    }

    #[test]
    fn test_sign_assertion_claims() {
        let key = test_key();
        let scopes = vec![
            "https://www.googleapis.com/auth/drive.file".to_string(),
            "openid".to_string(),
        ];
        let assertion = key.sign_assertion(&scopes, Utc::now()).unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["https://oauth2.example.test/token"]);
        let decoded = jsonwebtoken::decode::<DecodedClaims>(
            &assertion,
            &DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap();

        assert_eq!(decoded.header.kid.as_deref(), Some("key-1"));
        assert_eq!(decoded.claims.iss, "uploader@project.iam.gserviceaccount.com");
        assert_eq!(
            decoded.claims.scope,
            "https://www.googleapis.com/auth/drive.file openid"
        );
        assert_eq!(decoded.claims.aud, "https://oauth2.example.test/token");
        assert_eq!(decoded.claims.exp - decoded.claims.iat, 3600);
    }

    #[test]
    fn test_sign_assertion_rejects_bad_key() {
        let mut key = test_key();
        key.private_key = "not a pem".to_string();
        let err = key.sign_assertion(&[], Utc::now()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InterviewError>(),
            Some(InterviewError::Token(_))
        ));
    }

    #[test]
    fn test_from_file_missing_is_credentials_missing() {
        let temp_dir = TempDir::new().unwrap();
        let err = ServiceAccountKey::from_file(&temp_dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InterviewError>(),
            Some(InterviewError::CredentialsMissing(_))
        ));
    }

    #[test]
    fn test_from_file_defaults_token_uri() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("key.json");
        std::fs::write(
            &path,
            r#"{"type":"service_account","client_email":"a@b.c","private_key":"pem"}"#,
        )
        .unwrap();
        let key = ServiceAccountKey::from_file(&path).unwrap();
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
        assert!(key.private_key_id.is_none());
    }

    #[test]
    fn test_from_file_rejects_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("key.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = ServiceAccountKey::from_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InterviewError>(),
            Some(InterviewError::Serialization(_))
        ));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let debug = format!("{:?}", test_key());
        assert!(debug.contains("uploader@project"));
        assert!(!debug.contains("BEGIN PRIVATE KEY"));
    }

    #[test]
    fn test_multipart_related_body_layout() {
        let metadata = json!({"name": "alice.txt", "parents": ["folder"]});
        let body = multipart_related_body("XYZ", &metadata, "text/plain", b"User: Hi\n");
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("--XYZ\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{"));
        assert!(text.contains("\"parents\":[\"folder\"]"));
        assert!(text.contains("--XYZ\r\nContent-Type: text/plain\r\n\r\nUser: Hi\n\r\n--XYZ--\r\n"));
    }

    #[test]
    fn test_upload_url_trims_trailing_slash() {
        let config = ArchiveConfig {
            api_base: "http://localhost:1234/".to_string(),
            folder_id: "f".to_string(),
            ..Default::default()
        };
        let client = DriveClient::with_access_token(&config, "tok").unwrap();
        assert_eq!(
            client.upload_url(),
            "http://localhost:1234/upload/drive/v3/files?uploadType=multipart&fields=id"
        );
        assert_eq!(client.folder_id(), "f");
    }
}
