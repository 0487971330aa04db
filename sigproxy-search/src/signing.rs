//! AWS Signature Version 4 request signing.
//!
//! An [`HttpEnvelope`] is assembled completely (method, URL, headers, body)
//! and then consumed by [`sign`], which returns a [`SignedHttpEnvelope`].
//! The signed envelope exposes no mutators: the signature covers the exact
//! header and body bytes, so anything that changes them must build and sign
//! a new envelope.
//!
//! ```text
//! canonical request = METHOD \n URI \n QUERY \n HEADERS \n SIGNED-HEADERS \n sha256(body)
//! string to sign    = AWS4-HMAC-SHA256 \n amz-date \n scope \n sha256(canonical request)
//! signing key       = HMAC chain: "AWS4"+secret → date → region → service → "aws4_request"
//! ```

use bytes::Bytes;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, HOST};
use reqwest::Method;
use sha2::{Digest, Sha256};
use url::Url;

use crate::credentials::Credentials;
use crate::error::SearchError;

/// Signature algorithm identifier.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

const AMZ_DATE: &str = "x-amz-date";
const AMZ_CONTENT_SHA256: &str = "x-amz-content-sha256";
const AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

type HmacSha256 = Hmac<Sha256>;

/// An outbound request that has not been signed yet.
#[derive(Debug, Clone)]
pub struct HttpEnvelope {
    /// HTTP method.
    pub method: Method,
    /// Target URL. Path and query take part in the signature.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Bytes,
}

impl HttpEnvelope {
    /// A `POST` to `url` with `body` and no headers.
    pub fn post(url: Url, body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::POST,
            url,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Adds or replaces a header.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Signing`] if the name or value is not a valid
    /// HTTP header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, SearchError> {
        set_header(&mut self.headers, name, value)?;
        Ok(self)
    }
}

/// A request carrying SigV4 authentication headers. Read-only.
#[derive(Debug, Clone)]
pub struct SignedHttpEnvelope {
    inner: HttpEnvelope,
    signature: String,
}

impl SignedHttpEnvelope {
    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// Target URL.
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// All headers, including the signature headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    /// Request body exactly as signed.
    pub fn body(&self) -> &Bytes {
        &self.inner.body
    }

    /// Hex-encoded signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Consumes the envelope, returning headers and body for sending.
    pub fn into_parts(self) -> (Method, Url, HeaderMap, Bytes) {
        let HttpEnvelope {
            method,
            url,
            headers,
            body,
        } = self.inner;
        (method, url, headers, body)
    }
}

/// Scope and clock for one signature.
#[derive(Debug, Clone)]
pub struct SigningParams<'a> {
    /// Region in the credential scope.
    pub region: &'a str,
    /// Service in the credential scope.
    pub service: &'a str,
    /// Signing time; also written to `x-amz-date`.
    pub time: DateTime<Utc>,
    /// Whether to send and sign `x-amz-content-sha256`.
    pub sign_payload: bool,
}

impl<'a> SigningParams<'a> {
    /// Params for signing now, with the payload hash header enabled.
    pub fn now(region: &'a str, service: &'a str) -> Self {
        Self {
            region,
            service,
            time: Utc::now(),
            sign_payload: true,
        }
    }
}

/// Signs `envelope` with `credentials`.
///
/// Adds `x-amz-date`, optionally `x-amz-content-sha256`, `x-amz-security-token`
/// when the credentials carry a session token, a `host` header if none is
/// present, and exactly one `authorization` header (any existing one is
/// replaced).
///
/// # Errors
///
/// Returns [`SearchError::Signing`] if the URL has no host or a header value
/// is not valid visible ASCII.
pub fn sign(
    mut envelope: HttpEnvelope,
    credentials: &Credentials,
    params: &SigningParams<'_>,
) -> Result<SignedHttpEnvelope, SearchError> {
    let amz_date = params.time.format("%Y%m%dT%H%M%SZ").to_string();
    let date = params.time.format("%Y%m%d").to_string();
    let payload_hash = sha256_hex(&envelope.body);

    let headers = &mut envelope.headers;
    headers.remove(AUTHORIZATION);
    if !headers.contains_key(HOST) {
        let host = host_header_value(&envelope.url)?;
        set_header(headers, HOST.as_str(), &host)?;
    }
    set_header(headers, AMZ_DATE, &amz_date)?;
    if params.sign_payload {
        set_header(headers, AMZ_CONTENT_SHA256, &payload_hash)?;
    }
    match &credentials.session_token {
        Some(token) => set_header(headers, AMZ_SECURITY_TOKEN, token)?,
        None => {
            headers.remove(AMZ_SECURITY_TOKEN);
        }
    }

    let (canonical_headers, signed_headers) = canonical_headers(headers)?;
    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        envelope.method.as_str(),
        canonical_uri(&envelope.url),
        canonical_query(&envelope.url),
        canonical_headers,
        signed_headers,
        payload_hash,
    );
    tracing::trace!(%canonical_request, "sigv4 canonical request");

    let scope = format!("{date}/{}/{}/aws4_request", params.region, params.service);
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );

    let key = derive_signing_key(
        &credentials.secret_access_key,
        &date,
        params.region,
        params.service,
    )?;
    let signature = hex(&hmac_sha256(&key, string_to_sign.as_bytes())?);

    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        credentials.access_key_id
    );
    set_header(headers, AUTHORIZATION.as_str(), &authorization)?;

    Ok(SignedHttpEnvelope {
        inner: envelope,
        signature,
    })
}

/// Derives the per-day, per-scope signing key.
pub fn derive_signing_key(
    secret_access_key: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, SearchError> {
    let k_date = hmac_sha256(
        format!("AWS4{secret_access_key}").as_bytes(),
        date.as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

/// Lower-case hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    format!("{digest:x}")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SearchError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| SearchError::Signing(format!("invalid HMAC key: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn set_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<(), SearchError> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| SearchError::Signing(format!("invalid header name {name:?}: {e}")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| SearchError::Signing(format!("invalid value for header {name}: {e}")))?;
    headers.insert(name, value);
    Ok(())
}

fn host_header_value(url: &Url) -> Result<String, SearchError> {
    let host = url
        .host_str()
        .ok_or_else(|| SearchError::Signing(format!("URL {url} has no host")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    })
}

/// Each path segment URI-encoded again (non-S3 double-encoding rule).
fn canonical_uri(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            (
                urlencoding::encode(&k).into_owned(),
                urlencoding::encode(&v).into_owned(),
            )
        })
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Returns the canonical header block (each entry newline-terminated) and
/// the `;`-joined signed header list.
fn canonical_headers(headers: &HeaderMap) -> Result<(String, String), SearchError> {
    let mut names: Vec<&HeaderName> = headers.keys().collect();
    names.sort_by(|a, b| a.as_str().cmp(b.as_str()));

    let mut block = String::new();
    for name in &names {
        let values = headers
            .get_all(*name)
            .iter()
            .map(|v| {
                v.to_str()
                    .map(normalize_header_value)
                    .map_err(|e| SearchError::Signing(format!("header {name} is not ASCII: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        block.push_str(name.as_str());
        block.push(':');
        block.push_str(&values.join(","));
        block.push('\n');
    }

    let signed = names
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(";");
    Ok((block, signed))
}

fn normalize_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
