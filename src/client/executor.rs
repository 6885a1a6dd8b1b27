//! Request executor: URL building, headers, compression and classification.

use std::io::{Read, Write};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use mime::Mime;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_ENCODING,
    CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT,
};
use url::Url;

use super::query::QueryParameters;
use super::request::{encode_path, path_error, RequestBody};
use crate::config::MaileonConfig;
use crate::errors::{classify, MaileonError, MaileonResult};
use crate::observability::{log_request, log_response, MAX_LOGGED_ENTITY_BYTES};
use crate::response::ResponseWrapper;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

const GZIP: &str = "gzip";

/// Executes requests against the Maileon API.
///
/// Every call is sent exactly once. The response is buffered, decompressed if
/// needed and classified before it is returned.
pub struct RequestExecutor {
    config: MaileonConfig,
    transport: Arc<dyn HttpTransport>,
    authorization: HeaderValue,
}

impl RequestExecutor {
    /// Creates a new request executor.
    pub fn new(config: MaileonConfig, transport: Arc<dyn HttpTransport>) -> MaileonResult<Self> {
        let authorization = basic_authorization(config.api_key())?;

        Ok(Self {
            config,
            transport,
            authorization,
        })
    }

    /// Client configuration.
    pub fn config(&self) -> &MaileonConfig {
        &self.config
    }

    /// Builds, sends and classifies one request.
    pub fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<&QueryParameters>,
        media_type: &Mime,
        body: Option<RequestBody>,
    ) -> MaileonResult<ResponseWrapper> {
        let url = self.build_url(path, query)?;

        let body = match body {
            Some(body) => Some(body.into_bytes()?),
            None if method.requires_body() => Some(Bytes::new()),
            None => None,
        };

        let mut request = HttpRequest::new(method, url);
        request.headers = self.build_headers(media_type, body.is_some())?;
        request.body = body;

        if self.config.request_compression_active() {
            if let Some(body) = request.body.take() {
                if body.is_empty() {
                    request.body = Some(body);
                } else {
                    request.body = Some(gzip(&body)?);
                    request
                        .headers
                        .insert(CONTENT_ENCODING, HeaderValue::from_static(GZIP));
                }
            }
        }

        tracing::debug!(target: "maileon", method = %method, url = %request.url, "Executing request");

        if self.config.is_debug() {
            log_request(&request, MAX_LOGGED_ENTITY_BYTES);
        }

        let response = self.transport.send(request)?;
        let response = self.decode_response(response)?;
        let response = ResponseWrapper::from(response);

        if self.config.is_debug() {
            log_response(&response, MAX_LOGGED_ENTITY_BYTES);
        }

        classify(response)
    }

    /// Resolves a resource path and query against the base URL.
    pub fn build_url(&self, path: &str, query: Option<&QueryParameters>) -> MaileonResult<Url> {
        let base = self.config.base_url().as_str().trim_end_matches('/');
        let encoded = encode_path(path)?;

        let mut url = Url::parse(&format!("{}/{}", base, encoded)).map_err(|_| path_error(path))?;

        if let Some(query) = query.filter(|query| !query.is_empty()) {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        Ok(url)
    }

    fn build_headers(&self, media_type: &Mime, has_body: bool) -> MaileonResult<HeaderMap> {
        let media_type = HeaderValue::from_str(media_type.as_ref())
            .map_err(|e| MaileonError::client_with_source("Invalid media type", e))?;
        let user_agent = HeaderValue::from_str(self.config.user_agent())
            .map_err(|e| MaileonError::client_with_source("Invalid user agent", e))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers.insert(ACCEPT, media_type.clone());
        headers.insert(USER_AGENT, user_agent);
        if has_body {
            headers.insert(CONTENT_TYPE, media_type);
        }
        if self.config.response_compression_active() {
            headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(GZIP));
        }

        Ok(headers)
    }

    fn decode_response(&self, mut response: HttpResponse) -> MaileonResult<HttpResponse> {
        if !self.config.response_compression_active() || !is_gzip_encoded(&response.headers) {
            return Ok(response);
        }

        response.body = gunzip(&response.body)?;
        response.headers.remove(CONTENT_ENCODING);
        response.headers.remove(CONTENT_LENGTH);
        Ok(response)
    }
}

fn basic_authorization(api_key: &str) -> MaileonResult<HeaderValue> {
    let credentials = STANDARD.encode(format!("{}:", api_key));
    let mut value = HeaderValue::from_str(&format!("Basic {}", credentials))
        .map_err(|e| MaileonError::client_with_source("Invalid API key", e))?;
    value.set_sensitive(true);
    Ok(value)
}

fn is_gzip_encoded(headers: &HeaderMap) -> bool {
    headers
        .get_all(CONTENT_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|coding| coding.trim().eq_ignore_ascii_case(GZIP))
}

fn gzip(body: &[u8]) -> MaileonResult<Bytes> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(body)
        .and_then(|_| encoder.finish())
        .map(Bytes::from)
        .map_err(|e| MaileonError::client_with_source("Failed to compress request body", e))
}

fn gunzip(body: &[u8]) -> MaileonResult<Bytes> {
    let mut decoded = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut decoded)
        .map_err(|e| MaileonError::client_with_source("Failed to decompress response body", e))?;
    Ok(Bytes::from(decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockTransport;

    fn executor(base_url: &str) -> RequestExecutor {
        let config = MaileonConfig::builder()
            .api_key("key")
            .base_url(base_url)
            .build()
            .unwrap();
        RequestExecutor::new(config, Arc::new(MockTransport::new())).unwrap()
    }

    #[test]
    fn test_build_url_joins_base_path() {
        let executor = executor("https://api.maileon.com/1.0/");

        let url = executor.build_url("/contacts/count", None).unwrap();
        assert_eq!(url.as_str(), "https://api.maileon.com/1.0/contacts/count");
    }

    #[test]
    fn test_build_url_appends_query_in_order() {
        let executor = executor("https://api.maileon.com/1.0");
        let query = QueryParameters::new()
            .add("page_index", 1)
            .add("email", "a+b@x.com")
            .add("page_index", 2);

        let url = executor.build_url("contacts", Some(&query)).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.maileon.com/1.0/contacts?page_index=1&email=a%2Bb%40x.com&page_index=2"
        );
    }

    #[test]
    fn test_build_url_without_query_has_no_question_mark() {
        let executor = executor("https://api.maileon.com/1.0");

        let url = executor
            .build_url("ping", Some(&QueryParameters::new()))
            .unwrap();
        assert_eq!(url.as_str(), "https://api.maileon.com/1.0/ping");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_build_url_segment_survives_reparse() {
        let executor = executor("https://api.maileon.com/1.0");

        let url = executor.build_url("contacts/email/a b&c@x.com", None).unwrap();
        let reparsed = Url::parse(url.as_str()).unwrap();
        let last = reparsed.path_segments().unwrap().last().unwrap();

        assert_eq!(last, "a%20b%26c@x.com");
        assert_eq!(
            percent_encoding::percent_decode_str(last).decode_utf8().unwrap(),
            "a b&c@x.com"
        );
    }

    #[test]
    fn test_basic_authorization() {
        let value = basic_authorization("secret").unwrap();

        assert_eq!(value.to_str().unwrap(), "Basic c2VjcmV0Og==");
        assert!(value.is_sensitive());
    }

    #[test]
    fn test_gzip_round_trip() {
        let compressed = gzip(b"<ping/>").unwrap();

        assert_ne!(&compressed[..], b"<ping/>");
        assert_eq!(&gunzip(&compressed).unwrap()[..], b"<ping/>");
        assert!(gunzip(b"not gzip").is_err());
    }

    #[test]
    fn test_gzip_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_gzip_encoded(&headers));

        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("identity, GZIP"));
        assert!(is_gzip_encoded(&headers));
    }
}
