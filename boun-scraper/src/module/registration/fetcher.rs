///! Registration site client
///!
///! Downloads one department listing page per request. Callers are
///! responsible for spacing requests (see `RequestThrottle`).

use anyhow::Context;
use async_trait::async_trait;
use boun_common::SemesterCode;
use encoding_rs::Encoding;
use reqwest::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::config::ScraperConfig;
use crate::error::FetchError;

/// Bodies shorter than this are most likely an error stub
const SUSPICIOUS_BODY_LEN: usize = 1000;

/// Anything that can produce the listing HTML of a department page
#[async_trait]
pub trait CourseSource {
    async fn fetch(&self, semester: &SemesterCode, code: &str, page_name: &str) -> Result<String, FetchError>;
}

/// `{base}?donem=2024/2025-1&kisaadi=CMPE&bolum=COMPUTER%20ENGINEERING`
pub fn page_url(base_url: &str, semester: &SemesterCode, code: &str, page_name: &str) -> String {
    format!(
        "{}?donem={}&kisaadi={}&bolum={}",
        base_url,
        semester.donem(),
        code,
        urlencoding::encode(page_name)
    )
}

/// `charset` parameter of a Content-Type value, if any
fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
            .filter(|v| !v.is_empty())
    })
}

/// Decode a response body with the charset named in `content_type`, or
/// `default_charset` when none is given. Malformed input is an error rather
/// than being replaced.
pub fn decode_body(url: &str, bytes: &[u8], content_type: &str, default_charset: &str) -> Result<String, FetchError> {
    let label = charset_param(content_type).unwrap_or(default_charset);
    let encoding = Encoding::for_label(label.as_bytes()).ok_or_else(|| FetchError::Charset {
        url: url.to_string(),
        charset: label.to_string(),
    })?;

    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(FetchError::Decode {
            url: url.to_string(),
            charset: encoding.name().to_string(),
        });
    }
    Ok(text.into_owned())
}

pub struct RegistrationClient {
    client: Client,
    base_url: String,
    default_charset: String,
}

impl RegistrationClient {
    pub fn new(config: &ScraperConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9,tr;q=0.8"),
        );

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            default_charset: config.default_charset.clone(),
        })
    }
}

#[async_trait]
impl CourseSource for RegistrationClient {
    async fn fetch(&self, semester: &SemesterCode, code: &str, page_name: &str) -> Result<String, FetchError> {
        let url = page_url(&self.base_url, semester, code, page_name);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Request { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        // a missing header is tolerated; the site does not always send one
        if !content_type.is_empty() && !content_type.to_ascii_lowercase().contains("text/html") {
            return Err(FetchError::ContentType { url, content_type });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| FetchError::Body { url: url.clone(), source })?;
        let body = decode_body(&url, &bytes, &content_type, &self.default_charset)?;

        if body.len() < SUSPICIOUS_BODY_LEN {
            tracing::warn!("Suspiciously short response ({} bytes) for {} ({})", body.len(), code, page_name);
        }

        Ok(body)
    }
}
