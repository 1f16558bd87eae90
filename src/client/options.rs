use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde::Serialize;
use serde_json::Value;

/// Per-call settings for [`ApiClient::request`](super::ApiClient::request).
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Attach the bearer token when the session has one.
    pub with_auth: bool,
    pub method: Method,
    /// Merged over the defaults; these win on conflict.
    pub headers: HeaderMap,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            with_auth: true,
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            query: Vec::new(),
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self::default().method(Method::DELETE)
    }

    pub fn post<B: Serialize + ?Sized>(body: &B) -> Result<Self, serde_json::Error> {
        Self::default().method(Method::POST).json(body)
    }

    pub fn put<B: Serialize + ?Sized>(body: &B) -> Result<Self, serde_json::Error> {
        Self::default().method(Method::PUT).json(body)
    }

    pub fn patch<B: Serialize + ?Sized>(body: &B) -> Result<Self, serde_json::Error> {
        Self::default().method(Method::PATCH).json(body)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn without_auth(mut self) -> Self {
        self.with_auth = false;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_to_authenticated_get() {
        let options = RequestOptions::default();
        assert!(options.with_auth);
        assert_eq!(options.method, Method::GET);
        assert!(options.body.is_none());
    }

    #[test]
    fn builders_set_method_and_body() {
        let options = RequestOptions::patch(&json!({"slug": "ada"}))
            .unwrap()
            .without_auth()
            .query(vec![("search".into(), "x".into())]);
        assert_eq!(options.method, Method::PATCH);
        assert_eq!(options.body, Some(json!({"slug": "ada"})));
        assert!(!options.with_auth);
        assert_eq!(options.query.len(), 1);
    }
}
