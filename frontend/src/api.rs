//! REST client for the admin API.
//!
//! `AdminApi` turns an [`ApiRequest`] into an [`HttpRequest`], sends it
//! through an [`HttpTransport`] and decodes the reply. The browser transport
//! is [`crate::web::GlooTransport`]; tests plug in a scripted one.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use shopdesk_shared::protocol::{ApiRequest, HttpMethod};
use shopdesk_shared::{HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, LoginRequest, SessionGrant, bearer};
use thiserror::Error;

use crate::session::{AuthBackend, AuthError, AuthSession, TokenStore};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Authentication token not found")]
    MissingToken,
    /// 401: the session is no longer valid.
    #[error("Session expired, please sign in again")]
    Unauthorized,
    #[error("Failed to fetch data from {endpoint} (HTTP {status})")]
    Status { endpoint: String, status: u16 },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Shared failure policy for data views: a 401 ends the session, anything
/// else is logged. Returns the text to show.
pub fn report_failure<S, B>(session: &AuthSession<S, B>, context: &str, err: &ApiError) -> String
where
    S: TokenStore,
    B: AuthBackend,
{
    if err.is_unauthorized() {
        log::warn!("[Session] {} answered 401, logging out", context);
        session.logout();
    } else {
        log::error!("[Api] {}: {}", context, err);
    }
    err.to_string()
}

// =========================================================
// Transport seam
// =========================================================

/// File picked in the browser.
pub type Upload = web_sys::File;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(String),
    /// `multipart/form-data`; the transport sets the boundary header.
    Multipart {
        fields: Vec<(String, String)>,
        file_field: &'static str,
        file: Option<Upload>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(&'static str, String)>,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Sends a fully built request. Only transport failures are errors; any
/// HTTP status is a response.
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

// =========================================================
// Client
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AdminApi<T> {
    base_url: String,
    token: Option<String>,
    transport: T,
}

impl<T: HttpTransport> AdminApi<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: None,
            transport,
        }
    }

    /// Client that sends `Authorization: Bearer <token>` on protected calls.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub fn build<R: ApiRequest>(&self, request: &R) -> Result<HttpRequest, ApiError> {
        let mut headers = Vec::new();
        if R::AUTHENTICATED {
            let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;
            headers.push((HEADER_AUTHORIZATION, bearer(token)));
        }

        let body = match request.form() {
            Some(form) => Some(RequestBody::Multipart {
                fields: form.fields,
                file_field: form.file_field,
                file: None,
            }),
            None => request
                .body()
                .map_err(|e| ApiError::Encode(e.to_string()))?
                .map(RequestBody::Json),
        };
        if matches!(body, Some(RequestBody::Json(_))) {
            headers.push((HEADER_CONTENT_TYPE, "application/json".to_string()));
        }

        Ok(HttpRequest {
            method: R::METHOD,
            url: self.url(&request.path()),
            query: request.query(),
            headers,
            body,
        })
    }

    pub async fn call<R: ApiRequest>(&self, request: &R) -> Result<R::Response, ApiError> {
        let http = self.build(request)?;
        self.send(http, request.path()).await
    }

    /// Like [`AdminApi::call`], attaching `file` to a multipart request.
    /// Without a file, or for a JSON endpoint, this is a plain call.
    pub async fn call_with_file<R: ApiRequest>(
        &self,
        request: &R,
        file: Option<Upload>,
    ) -> Result<R::Response, ApiError> {
        let mut http = self.build(request)?;
        if let Some(RequestBody::Multipart { file: slot, .. }) = http.body.as_mut() {
            *slot = file;
        }
        self.send(http, request.path()).await
    }

    async fn send<D: DeserializeOwned>(&self, http: HttpRequest, endpoint: String) -> Result<D, ApiError> {
        log::debug!("[Api] {} {}", http.method.as_str(), http.url);

        let response = self.transport.send(http).await.inspect_err(|e| {
            log::error!("[Api] {} failed: {}", endpoint, e);
        })?;

        check_status(response.status, &endpoint)?;
        decode_body(&response.body, &endpoint)
    }
}

fn check_status(status: u16, endpoint: &str) -> Result<(), ApiError> {
    match status {
        200..=299 => Ok(()),
        401 => {
            log::warn!("[Api] {} answered 401", endpoint);
            Err(ApiError::Unauthorized)
        }
        status => Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status,
        }),
    }
}

/// An empty body (204, bare DELETE) decodes as JSON `null`, so `()` and
/// `Option<_>` responses work.
fn decode_body<D: DeserializeOwned>(body: &str, endpoint: &str) -> Result<D, ApiError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

// =========================================================
// Auth API
// =========================================================

/// [`AuthBackend`] over the login endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpAuthBackend<T> {
    api: AdminApi<T>,
}

impl<T: HttpTransport> HttpAuthBackend<T> {
    pub fn new(api: AdminApi<T>) -> Self {
        Self {
            api: api.with_token(None),
        }
    }
}

#[async_trait(?Send)]
impl<T: HttpTransport> AuthBackend for HttpAuthBackend<T> {
    async fn exchange(&self, request: &LoginRequest) -> Result<Option<SessionGrant>, AuthError> {
        match self.api.call(request).await {
            Ok(response) => Ok(response.into_grant()),
            // any non-2xx is a refusal
            Err(ApiError::Unauthorized) | Err(ApiError::Status { .. }) => Ok(None),
            Err(ApiError::Network(msg)) => Err(AuthError::Transport(msg)),
            Err(other) => Err(AuthError::Decode(other.to_string())),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;
    use shopdesk_shared::protocol::{
        DeleteOrderRequest, ListOrdersRequest, UpdateOrderStatusRequest, UpdateProductRequest,
    };
    use shopdesk_shared::{OrderStatus, Record, STORAGE_ACCESS_KEY, STORAGE_USER_KEY, UserType};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Transport answering from a path → response table and recording every
    /// request it sees.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        routes: RefCell<HashMap<String, Result<HttpResponse, ApiError>>>,
        pub(crate) sent: RefCell<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn on(self, url: &str, status: u16, body: &str) -> Self {
            self.routes.borrow_mut().insert(
                url.to_string(),
                Ok(HttpResponse {
                    status,
                    body: body.to_string(),
                }),
            );
            self
        }

        pub(crate) fn failing(self, url: &str, error: ApiError) -> Self {
            self.routes.borrow_mut().insert(url.to_string(), Err(error));
            self
        }
    }

    #[async_trait(?Send)]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            let reply = self
                .routes
                .borrow()
                .get(&request.url)
                .cloned()
                .unwrap_or(Ok(HttpResponse {
                    status: 404,
                    body: String::new(),
                }));
            self.sent.borrow_mut().push(request);
            reply
        }
    }

    fn login(email: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: "pw".into(),
        }
    }

    #[tokio::test]
    async fn test_bearer_header_on_protected_calls() {
        let transport = ScriptedTransport::default().on("/api/orders/orders/", 200, r#"[{"id":1}]"#);
        let api = AdminApi::new("", transport).with_token(Some("tok".into()));

        let orders: Vec<Record> = api.call(&ListOrdersRequest).await.unwrap();

        assert_eq!(orders.len(), 1);
        let sent = api.transport.sent.borrow();
        assert_eq!(sent[0].header("authorization"), Some("Bearer tok"));
        assert_eq!(sent[0].method, HttpMethod::Get);
        assert!(sent[0].body.is_none());
    }

    #[tokio::test]
    async fn test_missing_token_short_circuits() {
        let api = AdminApi::new("https://api.shop.test/", ScriptedTransport::default());
        let err = api.call(&ListOrdersRequest).await.unwrap_err();
        assert_eq!(err, ApiError::MissingToken);
        assert!(api.transport.sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let transport = ScriptedTransport::default()
            .on("/api/orders/orders/", 401, "")
            .on("/api/orders/orders/9/delete/", 204, "")
            .on("/api/orders/orders/9/status/", 500, "boom");
        let api = AdminApi::new("", transport).with_token(Some("tok".into()));

        let err = api.call(&ListOrdersRequest).await.unwrap_err();
        assert!(err.is_unauthorized());

        api.call(&DeleteOrderRequest { id: "9".into() }).await.unwrap();

        let err = api
            .call(&UpdateOrderStatusRequest {
                id: "9".into(),
                status: OrderStatus::Delivered,
            })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                endpoint: "/api/orders/orders/9/status/".into(),
                status: 500
            }
        );
        let sent = api.transport.sent.borrow();
        assert_eq!(sent[2].header("content-type"), Some("application/json"));
        assert_eq!(
            sent[2].body,
            Some(RequestBody::Json(r#"{"status":"DELIVERED"}"#.to_string()))
        );
    }

    #[tokio::test]
    async fn test_product_update_is_multipart_without_image_url() {
        let transport = ScriptedTransport::default().on("/api/products/products/4/", 200, r#"{"id":4}"#);
        let api = AdminApi::new("", transport).with_token(Some("tok".into()));
        let listed = Record::new()
            .with("id", 4)
            .with("name", "Chair")
            .with("price", "10.00")
            .with("image", "https://cdn.shop/chair.jpg");

        api.call_with_file(
            &UpdateProductRequest {
                id: "4".into(),
                product: listed,
            },
            None,
        )
        .await
        .unwrap();

        let sent = api.transport.sent.borrow();
        assert_eq!(sent[0].method, HttpMethod::Put);
        // the browser picks the multipart boundary
        assert_eq!(sent[0].header("content-type"), None);
        let Some(RequestBody::Multipart { fields, file_field, file }) = &sent[0].body else {
            panic!("expected a multipart body, got {:?}", sent[0].body);
        };
        assert!(fields.iter().all(|(name, _)| name != "image" && name != "id"));
        assert!(fields.contains(&("name".to_string(), "Chair".to_string())));
        assert_eq!(*file_field, "image");
        assert!(file.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_failure_ends_session() {
        let store = MemoryTokenStore::new();
        store.set(STORAGE_ACCESS_KEY, "expired");
        store.set(STORAGE_USER_KEY, r#"{"email":"admin@shop.test","user_type":"ADMIN"}"#);
        let session = AuthSession::new(
            store.clone(),
            HttpAuthBackend::new(AdminApi::new("", ScriptedTransport::default())),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        session.subscribe(move |snap| sink.lock().unwrap().push(snap.is_authenticated()));

        let api = AdminApi::new("", ScriptedTransport::default().on("/api/orders/orders/", 401, ""))
            .with_token(session.access_token());
        let err = api.call(&ListOrdersRequest).await.unwrap_err();
        let message = report_failure(&session, "Orders", &err);

        assert_eq!(message, "Session expired, please sign in again");
        assert!(store.is_empty());
        assert!(!session.is_authenticated());
        assert_eq!(*seen.lock().unwrap(), vec![false]);
    }

    #[tokio::test]
    async fn test_other_failures_keep_session() {
        let store = MemoryTokenStore::new();
        store.set(STORAGE_ACCESS_KEY, "live");
        let session = AuthSession::new(
            store.clone(),
            HttpAuthBackend::new(AdminApi::new("", ScriptedTransport::default())),
        );

        let api = AdminApi::new("", ScriptedTransport::default().on("/api/orders/orders/", 500, ""))
            .with_token(session.access_token());
        let err = api.call(&ListOrdersRequest).await.unwrap_err();
        report_failure(&session, "Orders", &err);

        assert!(session.is_authenticated());
        assert_eq!(store.get(STORAGE_ACCESS_KEY).as_deref(), Some("live"));
    }

    #[tokio::test]
    async fn test_decode_error() {
        let transport = ScriptedTransport::default().on("/api/orders/orders/", 200, "<html>");
        let api = AdminApi::new("", transport).with_token(Some("tok".into()));
        let err = api.call(&ListOrdersRequest).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_login_exchange() {
        let body = r#"{"access":"a","refresh":"r","user":{"email":"admin@shop.test","user_type":"ADMIN"}}"#;
        let transport = ScriptedTransport::default().on("https://api.shop.test/api/auth/login/", 200, body);
        let backend = HttpAuthBackend::new(
            AdminApi::new("https://api.shop.test", transport).with_token(Some("stale".into())),
        );

        let grant = backend.exchange(&login("admin@shop.test")).await.unwrap().unwrap();

        assert_eq!(grant.access, "a");
        assert_eq!(grant.user.unwrap().user_type, UserType::Admin);
        let sent = backend.api.transport.sent.borrow();
        assert_eq!(sent[0].header("authorization"), None);
        assert_eq!(sent[0].method, HttpMethod::Post);
    }

    #[tokio::test]
    async fn test_login_refusals() {
        let transport = ScriptedTransport::default()
            .on("/api/auth/login/", 400, r#"{"detail":"bad"}"#);
        let backend = HttpAuthBackend::new(AdminApi::new("", transport));
        assert_eq!(backend.exchange(&login("x@y.z")).await.unwrap(), None);

        let transport = ScriptedTransport::default()
            .on("/api/auth/login/", 200, r#"{"success":false}"#);
        let backend = HttpAuthBackend::new(AdminApi::new("", transport));
        assert_eq!(backend.exchange(&login("x@y.z")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_network_failure() {
        let transport = ScriptedTransport::default()
            .failing("/api/auth/login/", ApiError::Network("offline".into()));
        let backend = HttpAuthBackend::new(AdminApi::new("", transport));
        assert_eq!(
            backend.exchange(&login("x@y.z")).await.unwrap_err(),
            AuthError::Transport("offline".into())
        );
    }
}
