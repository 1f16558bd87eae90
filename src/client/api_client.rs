use std::sync::Arc;

use http::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::normalizer::{normalize, RawFailure};
use super::options::RequestOptions;
use crate::config::ApiConfig;
use crate::error::{ClientError, NormalizedError, Result};
use crate::navigation::Navigator;
use crate::session::SessionHandle;

/// HTTP client for the Insignia backend.
///
/// Attaches the session's bearer token, normalizes every failure, and
/// invalidates the session when any call comes back 401. Each call is a
/// single attempt: no retries, no queuing, no timeout beyond the transport's.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionHandle,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl ApiClient {
    /// Fails with [`ClientError::Configuration`] when no usable base URL is configured.
    pub fn new(
        config: &ApiConfig,
        session: SessionHandle,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Result<Self> {
        let base_url = parse_base_url(config.base_url.as_deref())?;
        let http = reqwest::Client::builder().build().map_err(|e| {
            ClientError::Configuration(format!("could not build HTTP client: {}", e))
        })?;
        info!("API client targeting {}", base_url);
        Ok(ApiClient {
            http,
            base_url,
            session,
            navigator,
            login_path: login_path.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Send one request to `path` (relative to the base URL) and decode the body as `T`.
    ///
    /// An empty success body decodes as JSON `null`, so `()` works for 204 responses.
    pub async fn request<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T> {
        let url = self.url_for(path)?;
        let headers = self.build_headers(&options)?;
        let method = options.method.clone();

        debug!(
            event_name = "client.request",
            method = %method,
            path,
            authorized = headers.contains_key(AUTHORIZATION),
            "sending API request"
        );

        let mut builder = self.http.request(method.clone(), url.clone()).headers(headers);
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(RawFailure::from_transport(&e), &method, path).await),
        };
        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail(RawFailure::from_transport(&e), &method, path).await),
        };

        if !status.is_success() {
            let failure = RawFailure::from_response(&method, url.as_str(), status, error_body(&bytes));
            return Err(self.fail(failure, &method, path).await);
        }

        let decoded = if bytes.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_value(Value::Null)
        } else {
            serde_json::from_slice(&bytes)
        };
        match decoded {
            Ok(value) => Ok(value),
            Err(e) => {
                let failure = RawFailure {
                    message: Some(format!("could not decode response from {}: {}", path, e)),
                    ..Default::default()
                };
                Err(self.fail(failure, &method, path).await)
            }
        }
    }

    /// `Accept: application/json`, then caller headers, then the bearer token.
    pub(crate) fn build_headers(&self, options: &RequestOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        for name in options.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in options.headers.iter() {
            headers.append(name.clone(), value.clone());
        }

        if options.with_auth {
            if let Some(token) = self.session.access_token() {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                    ClientError::InvalidRequest(
                        "session token contains characters not allowed in a header".into(),
                    )
                })?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }
        Ok(headers)
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        let path = path.trim();
        if path.trim_matches('/').is_empty() {
            return Err(ClientError::InvalidRequest(
                "request path must not be empty".into(),
            ));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Configuration(format!(
                    "api.base_url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    async fn fail(&self, failure: RawFailure, method: &Method, path: &str) -> ClientError {
        let normalized = normalize(&failure);

        if normalized.status_code == StatusCode::UNAUTHORIZED.as_u16() {
            warn!(
                event_name = "client.session.invalidated",
                method = %method,
                path,
                "authorization failure, clearing session"
            );
            if let Err(e) = self.session.invalidate() {
                warn!("Could not clear the persisted token: {}", e);
            }
            self.navigator.redirect_to(&self.login_path).await;

            let message = if normalized.message.trim().is_empty() {
                "Unauthorized".to_string()
            } else {
                normalized.message
            };
            return ClientError::Unauthorized(NormalizedError::new(
                StatusCode::UNAUTHORIZED.as_u16(),
                message,
            ));
        }

        warn!(
            event_name = "client.request.failed",
            method = %method,
            path,
            status = normalized.status_code,
            message = normalized.message.as_str(),
            "API request failed"
        );
        ClientError::Request(normalized)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session)
            .field("login_path", &self.login_path)
            .finish()
    }
}

fn parse_base_url(raw: Option<&str>) -> Result<Url> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ClientError::Configuration("missing api.base_url".into()))?;
    let url = Url::parse(raw).map_err(|e| {
        ClientError::Configuration(format!("invalid api.base_url '{}': {}", raw, e))
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::Configuration(format!(
            "api.base_url '{}' must be an http(s) URL",
            raw
        )));
    }
    Ok(url)
}

/// JSON when the body parses, otherwise the raw text, otherwise nothing.
fn error_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(bytes).ok().or_else(|| {
        let text = String::from_utf8_lossy(bytes).trim().to_string();
        Some(Value::String(text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::RecordingNavigator;
    use crate::session::{CookieAttributes, MemoryTokenStorage, TokenStorage};
    use http::header::HeaderName;
    use mockito::{Matcher, Server};
    use serde_json::json;

    struct Fixture {
        client: ApiClient,
        storage: Arc<MemoryTokenStorage>,
        navigator: Arc<RecordingNavigator>,
    }

    fn fixture(base_url: &str, token: Option<&str>) -> Fixture {
        let storage = Arc::new(match token {
            Some(token) => MemoryTokenStorage::with_token(CookieAttributes::default(), token),
            None => MemoryTokenStorage::default(),
        });
        let session = SessionHandle::hydrate(storage.clone()).unwrap();
        let navigator = Arc::new(RecordingNavigator::new());
        let config = ApiConfig {
            base_url: Some(base_url.to_string()),
        };
        let client = ApiClient::new(&config, session, navigator.clone(), "/auth/login").unwrap();
        Fixture {
            client,
            storage,
            navigator,
        }
    }

    #[test]
    fn missing_base_url_is_a_configuration_error() {
        let session = SessionHandle::hydrate(Arc::new(MemoryTokenStorage::default())).unwrap();
        for base_url in [None, Some("  "), Some("not a url"), Some("mailto:me@x.io")] {
            let config = ApiConfig {
                base_url: base_url.map(str::to_string),
            };
            let result = ApiClient::new(&config, session.clone(), Arc::new(RecordingNavigator::new()), "/auth/login");
            assert!(
                matches!(result, Err(ClientError::Configuration(_))),
                "{:?} should be rejected",
                base_url
            );
        }
    }

    #[test]
    fn joins_paths_onto_base_path() {
        let f = fixture("https://api.insignia.test/v1/", None);
        let url = f.client.url_for("/cards/public/ada lovelace").unwrap();
        assert_eq!(url.as_str(), "https://api.insignia.test/v1/cards/public/ada%20lovelace");
        assert!(matches!(
            f.client.url_for(" / "),
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[test]
    fn caller_headers_override_defaults() {
        let f = fixture("https://api.insignia.test", Some("abc"));
        let options = RequestOptions::get().header(ACCEPT, HeaderValue::from_static("text/csv"));
        let headers = f.client.build_headers(&options).unwrap();
        assert_eq!(headers.get(ACCEPT).unwrap(), "text/csv");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn without_auth_never_sets_authorization() {
        let f = fixture("https://api.insignia.test", Some("abc"));
        let headers = f.client.build_headers(&RequestOptions::get().without_auth()).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn sends_bearer_token_and_decodes_body() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/cards/7")
            .match_header("authorization", "Bearer abc")
            .match_header("accept", "application/json")
            .match_header("x-trace", "t-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 7}"#)
            .create_async()
            .await;

        let f = fixture(&server.url(), Some("abc"));
        let options = RequestOptions::get().header(
            HeaderName::from_static("x-trace"),
            HeaderValue::from_static("t-1"),
        );
        let body: Value = f.client.request("/cards/7", options).await.unwrap();
        m.assert_async().await;
        assert_eq!(body, json!({"id": 7}));
    }

    #[tokio::test]
    async fn anonymous_requests_carry_no_token() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/cards/public/ada")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let f = fixture(&server.url(), Some("abc"));
        let _: Value = f
            .client
            .request("/cards/public/ada", RequestOptions::get().without_auth())
            .await
            .unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_redirects() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/cards")
            .with_status(401)
            .with_body(r#"{"statusCode": 401, "message": "Token expired"}"#)
            .create_async()
            .await;

        let f = fixture(&server.url(), Some("abc"));
        let err = f
            .client
            .request::<Value>("/cards", RequestOptions::get())
            .await
            .unwrap_err();
        m.assert_async().await;

        assert!(matches!(
            &err,
            ClientError::Unauthorized(e) if e.status_code == 401 && e.message == "Token expired"
        ));
        assert!(!f.client.session().is_authenticated());
        assert_eq!(f.storage.load().unwrap(), None);
        assert_eq!(f.navigator.history(), vec!["/auth/login"]);
    }

    #[tokio::test]
    async fn other_failures_keep_the_session() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("DELETE", "/cards/3")
            .with_status(404)
            .with_body(r#"{"message": "Card not found"}"#)
            .create_async()
            .await;

        let f = fixture(&server.url(), Some("abc"));
        let err = f
            .client
            .request::<()>("/cards/3", RequestOptions::delete())
            .await
            .unwrap_err();
        m.assert_async().await;

        assert_eq!(err.normalized(), Some(&NormalizedError::new(404, "Card not found")));
        assert!(f.client.session().is_authenticated());
        assert!(f.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn plain_text_error_body_falls_back_to_request_description() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/cards")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let f = fixture(&server.url(), None);
        let err = f
            .client
            .request::<Value>("/cards", RequestOptions::get())
            .await
            .unwrap_err();
        m.assert_async().await;

        let normalized = err.normalized().unwrap();
        assert_eq!(normalized.status_code, 502);
        assert!(normalized.message.contains("502 Bad Gateway"));
    }

    #[tokio::test]
    async fn empty_success_body_decodes_as_unit() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("DELETE", "/cards/3/links/9")
            .with_status(204)
            .create_async()
            .await;

        let f = fixture(&server.url(), Some("abc"));
        f.client
            .request::<()>("/cards/3/links/9", RequestOptions::delete())
            .await
            .unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn undecodable_success_body_is_a_request_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/auth/me")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let f = fixture(&server.url(), Some("abc"));
        let err = f
            .client
            .request::<Value>("/auth/me", RequestOptions::get())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert!(err.normalized().unwrap().message.contains("could not decode"));
    }

    #[tokio::test]
    async fn transport_failure_defaults_to_500() {
        // nothing listens on port 1
        let f = fixture("http://127.0.0.1:1", Some("abc"));
        let err = f
            .client
            .request::<Value>("/cards", RequestOptions::get())
            .await
            .unwrap_err();
        assert!(matches!(&err, ClientError::Request(e) if e.status_code == 500 && !e.message.is_empty()));
        assert!(f.client.session().is_authenticated());
    }

    #[tokio::test]
    async fn sends_json_body_and_query() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/cards")
            .match_query(Matcher::UrlEncoded("draft".into(), "true".into()))
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"slug": "ada"})))
            .with_status(201)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let f = fixture(&server.url(), Some("abc"));
        let options = RequestOptions::post(&json!({"slug": "ada"}))
            .unwrap()
            .query(vec![("draft".into(), "true".into())]);
        let body: Value = f.client.request("cards", options).await.unwrap();
        m.assert_async().await;
        assert_eq!(body, json!({"ok": true}));
    }
}
