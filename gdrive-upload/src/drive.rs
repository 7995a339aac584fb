//! # Google Drive client
//!
//! Concrete implementations of the core [`Authenticator`] and [`DriveClient`]
//! traits on top of the Drive v3 REST API.
//!
//! - [`ServiceAccountAuthenticator`] signs an RS256 JWT with the service
//!   account's private key and exchanges it for an access token at the key's
//!   `token_uri` (OAuth 2.0 JWT bearer grant).
//! - [`DriveHttpClient`] carries that token and performs the three calls the
//!   upload flow needs. Uploads use a resumable session so the file is
//!   streamed from disk instead of buffered in memory.
//!
//! The API base URL is configurable so the client can be pointed at a local
//! test server.

use async_trait::async_trait;
use gdrive_upload_core::contract::{
    Authenticator, ClientError, DriveClient, DriveFile, FileMetadata,
};
use gdrive_upload_core::credentials::ServiceCredentials;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::header::{CONTENT_LENGTH, LOCATION};
use reqwest::{Body, Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

pub const DEFAULT_API_URL: &str = "https://www.googleapis.com";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// A non-success response from Google.
#[derive(Debug, Error)]
#[error("Google API returned {status}: {body}")]
pub struct DriveApiError {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// refer to https://developers.google.com/drive/api/reference/rest/v3/files/list
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// Turns non-2xx responses into a [`DriveApiError`] carrying the body.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(Box::new(DriveApiError { status, body }))
}

fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

pub struct ServiceAccountAuthenticator {
    http: Client,
    api_url: String,
}

impl ServiceAccountAuthenticator {
    pub fn new(api_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: http_client()?,
            api_url: api_url.into(),
        })
    }

    /// Signed JWT asserting the service account's identity for `scope`.
    fn assertion(credentials: &ServiceCredentials) -> Result<String, ClientError> {
        let iat = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            iss: credentials.client_email(),
            scope: credentials.scope(),
            aud: credentials.token_uri(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = credentials.private_key_id().map(str::to_string);

        let key = EncodingKey::from_rsa_pem(credentials.private_key().as_bytes())?;
        Ok(jsonwebtoken::encode(&header, &claims, &key)?)
    }
}

#[async_trait]
impl Authenticator for ServiceAccountAuthenticator {
    async fn authenticate(
        &self,
        credentials: &ServiceCredentials,
    ) -> Result<Box<dyn DriveClient>, ClientError> {
        tracing::info!(
            client_email = credentials.client_email(),
            token_uri = credentials.token_uri(),
            "Requesting access token"
        );
        let assertion = Self::assertion(credentials)?;

        let response = self
            .http
            .post(credentials.token_uri())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let token: TokenResponse = check(response).await?.json().await?;
        tracing::info!(expires_in = ?token.expires_in, "Access token granted");

        let client = DriveHttpClient::new(self.http.clone(), &self.api_url, token.access_token)?;
        Ok(Box::new(client))
    }
}

/// Drive v3 client authenticated with a bearer token.
pub struct DriveHttpClient {
    http: Client,
    api_url: Url,
    access_token: String,
}

impl DriveHttpClient {
    pub fn new(http: Client, api_url: &str, access_token: String) -> Result<Self, ClientError> {
        let api_url = Url::parse(api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(format!("{api_url} cannot be used as an API base URL").into());
        }
        Ok(Self {
            http,
            api_url,
            access_token,
        })
    }

    /// `api_url` with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl DriveClient for DriveHttpClient {
    async fn list_files(&self) -> Result<Vec<DriveFile>, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&["drive", "v3", "files"]))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let list: FileList = check(response).await?.json().await?;
        if list.next_page_token.is_some() {
            tracing::warn!(
                count = list.files.len(),
                "More files exist beyond the first page; only the first page is considered"
            );
        }
        tracing::info!(count = list.files.len(), "Fetched file listing");
        Ok(list.files)
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), ClientError> {
        tracing::info!(file_id, "Deleting file");
        let response = self
            .http
            .delete(self.endpoint(&["drive", "v3", "files", file_id]))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn create_file(
        &self,
        metadata: FileMetadata,
        content: File,
    ) -> Result<DriveFile, ClientError> {
        let size = content.metadata().await?.len();

        let mut session_url = self.endpoint(&["upload", "drive", "v3", "files"]);
        session_url
            .query_pairs_mut()
            .append_pair("uploadType", "resumable");
        tracing::info!(name = %metadata.name, size, "Starting resumable upload session");
        let session = self
            .http
            .post(session_url)
            .bearer_auth(&self.access_token)
            .header("X-Upload-Content-Length", size)
            .json(&metadata)
            .send()
            .await?;
        let session = check(session).await?;
        let location = session
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or("upload session response has no Location header")?
            .to_string();

        let response = self
            .http
            .put(location)
            .bearer_auth(&self.access_token)
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(ReaderStream::new(content)))
            .send()
            .await?;
        let created: DriveFile = check(response).await?.json().await?;
        tracing::info!(file_id = %created.id, "Upload completed");
        Ok(created)
    }
}
