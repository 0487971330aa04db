//! Concrete [`CredentialSource`] implementations.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{CredentialSource, Credentials};
use crate::error::SearchError;
use crate::http::build_metadata_client;

const ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY_ID";
const SECRET_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
const SESSION_TOKEN_ENV: &str = "AWS_SESSION_TOKEN";
const CREDENTIALS_FILE_ENV: &str = "AWS_SHARED_CREDENTIALS_FILE";
const PROFILE_ENV: &str = "AWS_PROFILE";
const CONTAINER_FULL_URI_ENV: &str = "AWS_CONTAINER_CREDENTIALS_FULL_URI";
const CONTAINER_RELATIVE_URI_ENV: &str = "AWS_CONTAINER_CREDENTIALS_RELATIVE_URI";
const CONTAINER_TOKEN_ENV: &str = "AWS_CONTAINER_AUTHORIZATION_TOKEN";
const CONTAINER_TOKEN_FILE_ENV: &str = "AWS_CONTAINER_AUTHORIZATION_TOKEN_FILE";
const CONTAINER_HOST: &str = "http://169.254.170.2";
const IMDS_ENDPOINT_ENV: &str = "AWS_EC2_METADATA_SERVICE_ENDPOINT";
const IMDS_DISABLED_ENV: &str = "AWS_EC2_METADATA_DISABLED";
const IMDS_DEFAULT_ENDPOINT: &str = "http://169.254.169.254";
const IMDS_TOKEN_PATH: &str = "/latest/api/token";
const IMDS_ROLES_PATH: &str = "/latest/meta-data/iam/security-credentials/";
const IMDS_TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
const IMDS_TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
const IMDS_TOKEN_TTL_SECONDS: &str = "21600";

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

fn process_env() -> EnvLookup {
    Arc::new(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
}

// ── Static ────────────────────────────────────────────────────

/// Fixed credentials, typically from configuration or tests.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    /// Long-lived key pair.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(access_key_id, secret_access_key),
        }
    }
}

impl From<Credentials> for StaticCredentials {
    fn from(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialSource for StaticCredentials {
    fn name(&self) -> &str {
        "static"
    }

    async fn resolve(&self) -> Result<Credentials, SearchError> {
        Ok(self.credentials.clone())
    }
}

// ── Environment ───────────────────────────────────────────────

/// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN`.
#[derive(Clone)]
pub struct EnvironmentCredentials {
    lookup: EnvLookup,
}

impl EnvironmentCredentials {
    /// Reads the process environment.
    pub fn new() -> Self {
        Self {
            lookup: process_env(),
        }
    }

    /// Reads variables through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Arc::new(lookup),
        }
    }
}

impl Default for EnvironmentCredentials {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialSource for EnvironmentCredentials {
    fn name(&self) -> &str {
        "environment"
    }

    async fn resolve(&self) -> Result<Credentials, SearchError> {
        let access_key = (self.lookup)(ACCESS_KEY_ENV)
            .ok_or_else(|| SearchError::Credential(format!("{ACCESS_KEY_ENV} not set")))?;
        let secret_key = (self.lookup)(SECRET_KEY_ENV)
            .ok_or_else(|| SearchError::Credential(format!("{SECRET_KEY_ENV} not set")))?;

        let mut creds = Credentials::new(access_key, secret_key);
        creds.session_token = (self.lookup)(SESSION_TOKEN_ENV);
        Ok(creds)
    }
}

// ── Shared credentials file ───────────────────────────────────

/// A profile in the shared credentials file (`~/.aws/credentials`).
#[derive(Debug, Clone)]
pub struct ProfileCredentials {
    path: Option<PathBuf>,
    profile: String,
}

impl ProfileCredentials {
    /// Reads `profile` from the file at `path`.
    pub fn new(path: impl Into<PathBuf>, profile: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            profile: profile.into(),
        }
    }

    /// Uses `AWS_SHARED_CREDENTIALS_FILE` (or `~/.aws/credentials`) and
    /// `AWS_PROFILE` (or `default`).
    pub fn from_env() -> Self {
        let env = process_env();
        let path = env(CREDENTIALS_FILE_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".aws").join("credentials")));
        Self {
            path,
            profile: env(PROFILE_ENV).unwrap_or_else(|| "default".to_owned()),
        }
    }
}

#[async_trait]
impl CredentialSource for ProfileCredentials {
    fn name(&self) -> &str {
        "profile"
    }

    async fn resolve(&self) -> Result<Credentials, SearchError> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| {
                SearchError::Credential("no home directory for credentials file".into())
            })?;
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            SearchError::Credential(format!("cannot read {}: {e}", path.display()))
        })?;
        parse_profile(&content, &self.profile).ok_or_else(|| {
            SearchError::Credential(format!(
                "profile [{}] in {} has no access key pair",
                self.profile,
                path.display()
            ))
        })
    }
}

/// Extracts `profile` from INI-style credentials file content.
fn parse_profile(content: &str, profile: &str) -> Option<Credentials> {
    let mut in_profile = false;
    let mut access_key = None;
    let mut secret_key = None;
    let mut session_token = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_profile = section.trim() == profile;
            continue;
        }
        if !in_profile {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().to_owned();
        match key.trim() {
            "aws_access_key_id" => access_key = Some(value),
            "aws_secret_access_key" => secret_key = Some(value),
            "aws_session_token" => session_token = Some(value),
            _ => {}
        }
    }

    let mut creds = Credentials::new(access_key?, secret_key?);
    creds.session_token = session_token;
    Some(creds)
}

// ── Container endpoint ────────────────────────────────────────

/// ECS task / Lambda-style container credentials endpoint.
#[derive(Debug, Clone)]
pub struct ContainerCredentials {
    client: Option<reqwest::Client>,
    uri: Option<String>,
    auth_token: Option<String>,
    auth_token_file: Option<PathBuf>,
}

/// Temporary credentials as served by the container and instance
/// metadata endpoints.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TemporaryCredentialsBody {
    #[serde(default)]
    code: Option<String>,
    access_key_id: String,
    secret_access_key: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    expiration: Option<String>,
}

impl TemporaryCredentialsBody {
    fn into_credentials(self) -> Result<Credentials, SearchError> {
        if let Some(code) = self.code.as_deref().filter(|c| *c != "Success") {
            return Err(SearchError::Credential(format!(
                "credentials endpoint reported {code}"
            )));
        }
        let mut creds = Credentials::new(self.access_key_id, self.secret_access_key);
        creds.session_token = self.token;
        if let Some(raw) = self.expiration {
            let expires = DateTime::parse_from_rfc3339(&raw).map_err(|e| {
                SearchError::Credential(format!("invalid credentials expiration {raw:?}: {e}"))
            })?;
            creds.expires_at = Some(expires.with_timezone(&Utc));
        }
        Ok(creds)
    }
}

fn metadata_client() -> Option<reqwest::Client> {
    build_metadata_client()
        .inspect_err(|e| tracing::warn!(error = %e, "credential endpoint client unavailable"))
        .ok()
}

fn require_client(client: &Option<reqwest::Client>) -> Result<&reqwest::Client, SearchError> {
    client
        .as_ref()
        .ok_or_else(|| SearchError::Credential("no HTTP client for credential endpoint".into()))
}

impl ContainerCredentials {
    /// Fetches credentials from `uri`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            client: metadata_client(),
            uri: Some(uri.into()),
            auth_token: None,
            auth_token_file: None,
        }
    }

    /// Sends `token` in the `Authorization` header.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Reads the `Authorization` token from `path` on every call. Takes
    /// precedence over [`with_auth_token`](Self::with_auth_token).
    pub fn with_auth_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.auth_token_file = Some(path.into());
        self
    }

    /// Uses `AWS_CONTAINER_CREDENTIALS_FULL_URI`, or
    /// `AWS_CONTAINER_CREDENTIALS_RELATIVE_URI` under the link-local host,
    /// authorized by `AWS_CONTAINER_AUTHORIZATION_TOKEN_FILE` or
    /// `AWS_CONTAINER_AUTHORIZATION_TOKEN`.
    pub fn from_env() -> Self {
        let env = process_env();
        let uri = env(CONTAINER_FULL_URI_ENV).or_else(|| {
            env(CONTAINER_RELATIVE_URI_ENV).map(|relative| format!("{CONTAINER_HOST}{relative}"))
        });
        Self {
            client: metadata_client(),
            uri,
            auth_token: env(CONTAINER_TOKEN_ENV),
            auth_token_file: env(CONTAINER_TOKEN_FILE_ENV).map(PathBuf::from),
        }
    }

    async fn authorization(&self) -> Result<Option<String>, SearchError> {
        let Some(path) = &self.auth_token_file else {
            return Ok(self.auth_token.clone());
        };
        let token = tokio::fs::read_to_string(path).await.map_err(|e| {
            SearchError::Credential(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(Some(token.trim().to_owned()))
    }
}

#[async_trait]
impl CredentialSource for ContainerCredentials {
    fn name(&self) -> &str {
        "container"
    }

    async fn resolve(&self) -> Result<Credentials, SearchError> {
        let uri = self
            .uri
            .as_deref()
            .ok_or_else(|| SearchError::Credential("container credentials URI not set".into()))?;
        let client = require_client(&self.client)?;

        let mut request = client.get(uri);
        if let Some(token) = self.authorization().await? {
            request = request.header(reqwest::header::AUTHORIZATION, token);
        }

        let response = request.send().await.map_err(|e| {
            SearchError::Credential(format!("container credentials request failed: {e}"))
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Credential(format!(
                "container credentials endpoint returned {status}"
            )));
        }

        let body: TemporaryCredentialsBody = response.json().await.map_err(|e| {
            SearchError::Credential(format!("invalid container credentials body: {e}"))
        })?;
        body.into_credentials()
    }
}

// ── Instance metadata (IMDSv2) ────────────────────────────────

/// Instance-role credentials from the EC2 instance metadata service.
///
/// Uses the session-token flow: `PUT /latest/api/token`, then the role
/// listing under `/latest/meta-data/iam/security-credentials/`, then the
/// first role's credential document.
#[derive(Debug, Clone)]
pub struct InstanceMetadataCredentials {
    client: Option<reqwest::Client>,
    endpoint: String,
    disabled: bool,
}

impl InstanceMetadataCredentials {
    /// Queries the metadata service at `endpoint` (scheme and host only).
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: metadata_client(),
            endpoint: endpoint.into().trim_end_matches('/').to_owned(),
            disabled: false,
        }
    }

    /// Uses `AWS_EC2_METADATA_SERVICE_ENDPOINT` (or the link-local address)
    /// and honours `AWS_EC2_METADATA_DISABLED=true`.
    pub fn from_env() -> Self {
        let env = process_env();
        let mut source = Self::new(
            env(IMDS_ENDPOINT_ENV).unwrap_or_else(|| IMDS_DEFAULT_ENDPOINT.to_owned()),
        );
        source.disabled = env(IMDS_DISABLED_ENV).is_some_and(|v| v.eq_ignore_ascii_case("true"));
        source
    }

    async fn fetch_text(
        &self,
        request: reqwest::RequestBuilder,
        step: &str,
    ) -> Result<String, SearchError> {
        let response = request.send().await.map_err(|e| {
            SearchError::Credential(format!("instance metadata {step} request failed: {e}"))
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Credential(format!(
                "instance metadata {step} returned {status}"
            )));
        }
        response.text().await.map_err(|e| {
            SearchError::Credential(format!("failed to read instance metadata {step}: {e}"))
        })
    }
}

#[async_trait]
impl CredentialSource for InstanceMetadataCredentials {
    fn name(&self) -> &str {
        "instance-metadata"
    }

    async fn resolve(&self) -> Result<Credentials, SearchError> {
        if self.disabled {
            return Err(SearchError::Credential(format!(
                "instance metadata disabled by {IMDS_DISABLED_ENV}"
            )));
        }
        let client = require_client(&self.client)?;

        let token = self
            .fetch_text(
                client
                    .put(format!("{}{IMDS_TOKEN_PATH}", self.endpoint))
                    .header(IMDS_TOKEN_TTL_HEADER, IMDS_TOKEN_TTL_SECONDS),
                "token",
            )
            .await?;

        let roles_url = format!("{}{IMDS_ROLES_PATH}", self.endpoint);
        let roles = self
            .fetch_text(
                client.get(&roles_url).header(IMDS_TOKEN_HEADER, &token),
                "role listing",
            )
            .await?;
        let role = roles
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| SearchError::Credential("no instance role attached".into()))?;

        let document = self
            .fetch_text(
                client
                    .get(format!("{roles_url}{role}"))
                    .header(IMDS_TOKEN_HEADER, &token),
                "credentials",
            )
            .await?;
        let body: TemporaryCredentialsBody = serde_json::from_str(&document).map_err(|e| {
            SearchError::Credential(format!("invalid instance credentials body: {e}"))
        })?;
        tracing::debug!(role, "resolved instance role credentials");
        body.into_credentials()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use crate::http::METADATA_TIMEOUT;
    use std::io::Write;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn env_from(pairs: &[(&str, &str)]) -> EnvironmentCredentials {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        EnvironmentCredentials::from_lookup(move |key| map.get(key).cloned())
    }

    #[tokio::test]
    async fn static_source_returns_its_credentials() {
        let creds = StaticCredentials::new("AKID", "secret")
            .resolve()
            .await
            .expect("static resolves");
        assert_eq!(creds.access_key_id, "AKID");
        assert_eq!(creds.secret_access_key, "secret");
        assert!(creds.session_token.is_none());
    }

    #[tokio::test]
    async fn environment_reads_key_pair_and_token() {
        let source = env_from(&[
            (ACCESS_KEY_ENV, "AKID"),
            (SECRET_KEY_ENV, "secret"),
            (SESSION_TOKEN_ENV, "token"),
        ]);
        let creds = source.resolve().await.expect("env resolves");
        assert_eq!(creds.access_key_id, "AKID");
        assert_eq!(creds.session_token.as_deref(), Some("token"));
    }

    #[tokio::test]
    async fn environment_without_secret_fails() {
        let source = env_from(&[(ACCESS_KEY_ENV, "AKID")]);
        let err = source.resolve().await.unwrap_err();
        assert!(err.to_string().contains(SECRET_KEY_ENV));
    }

    #[test]
    fn parse_profile_selects_named_section() {
        let content = "\
[default]
aws_access_key_id = DEFAULTKEY
aws_secret_access_key = defaultsecret

# staging account
[staging]
aws_access_key_id=STAGINGKEY
aws_secret_access_key=stagingsecret
aws_session_token = stagingtoken
";
        let default = parse_profile(content, "default").expect("default profile");
        assert_eq!(default.access_key_id, "DEFAULTKEY");
        assert!(default.session_token.is_none());

        let staging = parse_profile(content, "staging").expect("staging profile");
        assert_eq!(staging.access_key_id, "STAGINGKEY");
        assert_eq!(staging.secret_access_key, "stagingsecret");
        assert_eq!(staging.session_token.as_deref(), Some("stagingtoken"));
    }

    #[test]
    fn parse_profile_missing_section_or_secret() {
        let content = "[default]\naws_access_key_id = ONLYKEY\n";
        assert!(parse_profile(content, "default").is_none());
        assert!(parse_profile(content, "other").is_none());
    }

    #[tokio::test]
    async fn profile_source_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[ci]\naws_access_key_id = CIKEY\naws_secret_access_key = cisecret")
            .expect("write");

        let source = ProfileCredentials::new(file.path(), "ci");
        let creds = source.resolve().await.expect("profile resolves");
        assert_eq!(creds.access_key_id, "CIKEY");
    }

    #[tokio::test]
    async fn profile_source_missing_file_fails() {
        let source = ProfileCredentials::new("/nonexistent/sigproxy/credentials", "default");
        let err = source.resolve().await.unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[tokio::test]
    async fn container_source_fetches_temporary_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/credentials/task"))
            .and(header("authorization", "container-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "AccessKeyId": "ASIATEMP",
                "SecretAccessKey": "tempsecret",
                "Token": "session",
                "Expiration": "2099-01-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let source = ContainerCredentials::new(format!("{}/v2/credentials/task", server.uri()))
            .with_auth_token("container-token");
        let creds = source.resolve().await.expect("container resolves");
        assert_eq!(creds.access_key_id, "ASIATEMP");
        assert_eq!(creds.session_token.as_deref(), Some("session"));
        assert_eq!(
            creds.expires_at.map(|e| e.to_rfc3339()),
            Some("2099-01-01T00:00:00+00:00".to_owned())
        );
    }

    #[tokio::test]
    async fn container_source_error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let source = ContainerCredentials::new(server.uri());
        let err = source.resolve().await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn container_source_without_uri_fails() {
        let source = ContainerCredentials {
            uri: None,
            ..ContainerCredentials::new("unused")
        };
        let err = source.resolve().await.unwrap_err();
        assert!(err.to_string().contains("URI not set"));
    }

    #[tokio::test]
    async fn container_token_file_takes_precedence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "rotated-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "AccessKeyId": "ASIAFILE",
                "SecretAccessKey": "filesecret"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "rotated-token").expect("write");

        let source = ContainerCredentials::new(server.uri())
            .with_auth_token("stale-token")
            .with_auth_token_file(file.path());
        let creds = source.resolve().await.expect("container resolves");
        assert_eq!(creds.access_key_id, "ASIAFILE");
    }

    #[tokio::test]
    async fn container_source_stalled_endpoint_times_out() {
        let stall = METADATA_TIMEOUT + Duration::from_secs(2);
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(stall))
            .mount(&server)
            .await;

        let started = Instant::now();
        let err = ContainerCredentials::new(server.uri())
            .resolve()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("request failed"));
        assert!(started.elapsed() < stall);
    }

    async fn mount_imds(server: &MockServer, role_listing: &str) {
        Mock::given(method("PUT"))
            .and(path("/latest/api/token"))
            .and(header("x-aws-ec2-metadata-token-ttl-seconds", "21600"))
            .respond_with(ResponseTemplate::new(200).set_body_string("imds-session"))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/latest/meta-data/iam/security-credentials/"))
            .and(header("x-aws-ec2-metadata-token", "imds-session"))
            .respond_with(ResponseTemplate::new(200).set_body_string(role_listing))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn instance_metadata_follows_token_flow() {
        let server = MockServer::start().await;
        mount_imds(&server, "search-proxy-role\n").await;
        Mock::given(method("GET"))
            .and(path("/latest/meta-data/iam/security-credentials/search-proxy-role"))
            .and(header("x-aws-ec2-metadata-token", "imds-session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Code": "Success",
                "Type": "AWS-HMAC",
                "AccessKeyId": "ASIAINSTANCE",
                "SecretAccessKey": "instancesecret",
                "Token": "instance-session",
                "Expiration": "2099-01-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let creds = InstanceMetadataCredentials::new(format!("{}/", server.uri()))
            .resolve()
            .await
            .expect("instance metadata resolves");
        assert_eq!(creds.access_key_id, "ASIAINSTANCE");
        assert_eq!(creds.session_token.as_deref(), Some("instance-session"));
        assert!(creds.expires_at.is_some());
    }

    #[tokio::test]
    async fn instance_metadata_without_role_fails() {
        let server = MockServer::start().await;
        mount_imds(&server, "").await;

        let err = InstanceMetadataCredentials::new(server.uri())
            .resolve()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no instance role attached"));
    }

    #[tokio::test]
    async fn instance_metadata_non_success_code_fails() {
        let server = MockServer::start().await;
        mount_imds(&server, "role").await;
        Mock::given(method("GET"))
            .and(path("/latest/meta-data/iam/security-credentials/role"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Code": "AssumeRoleUnauthorizedAccess",
                "AccessKeyId": "",
                "SecretAccessKey": ""
            })))
            .mount(&server)
            .await;

        let err = InstanceMetadataCredentials::new(server.uri())
            .resolve()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("AssumeRoleUnauthorizedAccess"));
    }

    #[tokio::test]
    async fn instance_metadata_token_rejection_fails() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = InstanceMetadataCredentials::new(server.uri())
            .resolve()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("token returned 403"));
    }

    #[tokio::test]
    async fn disabled_instance_metadata_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let source = InstanceMetadataCredentials {
            disabled: true,
            ..InstanceMetadataCredentials::new(server.uri())
        };
        let err = source.resolve().await.unwrap_err();
        assert!(err.to_string().contains(IMDS_DISABLED_ENV));
    }
}
