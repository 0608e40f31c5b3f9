//! HttpChatTransport -- concrete [`ChatTransport`] over the backend's REST API.
//!
//! Endpoints (relative to the configured base URL):
//!
//! | Call            | Request                                  | Success body            |
//! |-----------------|------------------------------------------|-------------------------|
//! | `fetch_persona` | `GET  /v1/personas/latest`               | persona JSON            |
//! | `init_session`  | `GET  /v1/chat/init/{persona_id}`        | `{"session_id": "..."}` |
//! | `open_stream`   | `POST /v1/chat/stream/{session_id}`      | chunked plain text      |
//!
//! Every request carries the `X-API-Key` header. The key is wrapped in
//! [`SecretString`] and only exposed while building headers.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use askme_core::transport::{ChatTransport, TextStream};
use askme_types::chat::{ChatInitResponse, ChatInvokeRequest, SessionId};
use askme_types::config::ClientConfig;
use askme_types::error::{ChatError, ConfigError};
use askme_types::persona::{Persona, PersonaId};

use super::streaming::create_reply_stream;

/// HTTP client for the Ask-Me-Anything backend.
///
/// Deliberately has no `Debug` impl; see [`SecretString`].
pub struct HttpChatTransport {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: Url,
    request_timeout: Duration,
    stream_idle_timeout: Duration,
}

impl HttpChatTransport {
    const API_KEY_HEADER: &'static str = "X-API-Key";

    /// Build a transport from resolved client settings.
    ///
    /// # Errors
    ///
    /// Fails when the API key is missing, the base URL cannot carry path
    /// segments, a timeout is zero, or the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        if config.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout {
                field: "request_timeout_secs",
            });
        }
        if config.stream_idle_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout {
                field: "stream_idle_timeout_secs",
            });
        }

        Self::new(
            &config.base_url,
            SecretString::from(api_key.to_string()),
            config.request_timeout(),
            config.stream_idle_timeout(),
        )
    }

    /// Create a transport with explicit settings.
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        request_timeout: Duration,
        stream_idle_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)?;

        // No overall timeout on the client: it would also cap how long a
        // reply may keep streaming. Each call bounds its own wait instead.
        let client = reqwest::Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url,
            request_timeout,
            stream_idle_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `segments` to the base URL. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ChatError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ChatError::Transport(format!("base URL {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request_error(&self, e: reqwest::Error) -> ChatError {
        if e.is_timeout() {
            ChatError::Timeout(self.request_timeout)
        } else {
            ChatError::Transport(format!("HTTP request failed: {e}"))
        }
    }

    /// GET `url` and decode a JSON body of type `T`.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ChatError> {
        let response = self
            .client
            .get(url.clone())
            .header(Self::API_KEY_HEADER, self.api_key.expose_secret())
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let response = ensure_success(response).await?;
        let body = response.bytes().await.map_err(|e| self.request_error(e))?;

        serde_json::from_slice(&body)
            .map_err(|e| ChatError::Decode(format!("unexpected response from {}: {e}", url.path())))
    }
}

impl ChatTransport for HttpChatTransport {
    async fn fetch_persona(&self) -> Result<Persona, ChatError> {
        let url = self.endpoint(&["v1", "personas", "latest"])?;
        let persona: Persona = self.get_json(url).await?;
        tracing::debug!(persona_id = %persona.id, name = %persona.public_name, "persona fetched");
        Ok(persona)
    }

    async fn init_session(&self, persona_id: &PersonaId) -> Result<SessionId, ChatError> {
        let url = self.endpoint(&["v1", "chat", "init", persona_id.as_str()])?;
        let init: ChatInitResponse = self.get_json(url).await?;
        tracing::debug!(session = %init.session_id.short(), "session opened");
        Ok(init.session_id)
    }

    async fn open_stream(&self, session_id: &SessionId, text: &str) -> Result<TextStream, ChatError> {
        let url = self.endpoint(&["v1", "chat", "stream", session_id.as_str()])?;
        let body = ChatInvokeRequest {
            input_message: text.to_string(),
        };

        let send = self
            .client
            .post(url)
            .header(Self::API_KEY_HEADER, self.api_key.expose_secret())
            .json(&body)
            .send();

        // The head and any error body are bounded here; a successful body
        // is governed by the idle timeout in the reply stream.
        let response = tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| ChatError::Timeout(self.request_timeout))?
            .map_err(|e| self.request_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!(session = %session_id.short(), "backend no longer knows the session");
            return Err(ChatError::SessionNotFound);
        }

        let response = tokio::time::timeout(self.request_timeout, ensure_success(response))
            .await
            .map_err(|_| ChatError::Timeout(self.request_timeout))??;
        Ok(create_reply_stream(response, self.stream_idle_timeout))
    }
}

/// Parse and validate the configured backend root.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".to_string()));
    }
    Ok(url)
}

/// Map a non-2xx response to [`ChatError::Status`], keeping the body text.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ChatError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = %status, body = %body, "backend error response");
    Err(ChatError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Json;
    use axum::Router;
    use axum::body::Body;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use futures_util::StreamExt;

    const TEST_KEY: &str = "test-key-not-real";

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == TEST_KEY)
    }

    async fn latest_persona(headers: HeaderMap) -> Response {
        if !authorized(&headers) {
            return (AxumStatus::UNAUTHORIZED, "bad key").into_response();
        }
        Json(serde_json::json!({
            "id": "p-1",
            "public_name": "Luna",
            "welcome_message": "Hi, ask me anything!",
            "profile_image_url": null
        }))
        .into_response()
    }

    async fn init(headers: HeaderMap, Path(persona_id): Path<String>) -> Response {
        if !authorized(&headers) {
            return (AxumStatus::UNAUTHORIZED, "bad key").into_response();
        }
        Json(serde_json::json!({ "session_id": format!("session-for-{persona_id}") }))
            .into_response()
    }

    async fn stream(
        headers: HeaderMap,
        Path(session_id): Path<String>,
        Json(request): Json<ChatInvokeRequest>,
    ) -> Response {
        if !authorized(&headers) {
            return (AxumStatus::UNAUTHORIZED, "bad key").into_response();
        }
        match session_id.as_str() {
            "gone" => (AxumStatus::NOT_FOUND, "Session not found").into_response(),
            "broken" => (AxumStatus::INTERNAL_SERVER_ERROR, "kaboom").into_response(),
            "stalled" => {
                let body = async_stream::stream! {
                    yield Ok::<_, std::io::Error>(b"first".to_vec());
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    yield Ok(b"never".to_vec());
                };
                (AxumStatus::CREATED, Body::from_stream(body)).into_response()
            }
            "stalled-error" => {
                let body = async_stream::stream! {
                    yield Ok::<_, std::io::Error>(b"partial error".to_vec());
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    yield Ok(b"never".to_vec());
                };
                (AxumStatus::INTERNAL_SERVER_ERROR, Body::from_stream(body)).into_response()
            }
            _ => {
                // Split the reply inside the two-byte "é" on purpose.
                let reply = format!("echo: {} é", request.input_message).into_bytes();
                let cut = reply.len() - 1;
                let chunks = vec![
                    Ok::<_, std::io::Error>(reply[..cut].to_vec()),
                    Ok(reply[cut..].to_vec()),
                ];
                (AxumStatus::CREATED, Body::from_stream(futures_util::stream::iter(chunks)))
                    .into_response()
            }
        }
    }

    async fn slow_persona() -> Response {
        tokio::time::sleep(Duration::from_secs(30)).await;
        AxumStatus::OK.into_response()
    }

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn backend_router() -> Router {
        Router::new()
            .route("/v1/personas/latest", get(latest_persona))
            .route("/v1/chat/init/{persona_id}", get(init))
            .route("/v1/chat/stream/{session_id}", post(stream))
    }

    fn transport(base_url: &str, key: &str) -> HttpChatTransport {
        HttpChatTransport::new(
            base_url,
            SecretString::from(key.to_string()),
            Duration::from_secs(5),
            Duration::from_millis(300),
        )
        .unwrap()
    }

    async fn collect_text(stream: TextStream) -> Result<String, ChatError> {
        let fragments: Vec<Result<String, ChatError>> = stream.collect().await;
        fragments.into_iter().collect::<Result<Vec<_>, _>>().map(|v| v.concat())
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let t = transport("http://localhost:8000", TEST_KEY);
        let url = t.endpoint(&["v1", "chat", "init", "p 1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/v1/chat/init/p%201");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let t = transport("https://ama.example.com/api/", TEST_KEY);
        let url = t.endpoint(&["v1", "personas", "latest"]).unwrap();
        assert_eq!(url.as_str(), "https://ama.example.com/api/v1/personas/latest");
    }

    #[test]
    fn test_rejects_bad_base_urls() {
        for bad in ["not a url", "ftp://example.com", "mailto:someone@example.com"] {
            let result = HttpChatTransport::new(
                bad,
                SecretString::from(TEST_KEY.to_string()),
                Duration::from_secs(1),
                Duration::from_secs(1),
            );
            assert!(
                matches!(result, Err(ConfigError::InvalidBaseUrl { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let config = ClientConfig::default();
        assert!(matches!(
            HttpChatTransport::from_config(&config),
            Err(ConfigError::MissingApiKey)
        ));

        let blank = ClientConfig {
            api_key: Some("   ".to_string()),
            ..ClientConfig::default()
        };
        assert!(matches!(
            HttpChatTransport::from_config(&blank),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_from_config_rejects_zero_timeouts() {
        let config = ClientConfig {
            api_key: Some(TEST_KEY.to_string()),
            stream_idle_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(matches!(
            HttpChatTransport::from_config(&config),
            Err(ConfigError::ZeroTimeout {
                field: "stream_idle_timeout_secs"
            })
        ));
    }

    #[tokio::test]
    async fn test_fetch_persona_and_init_session() {
        let base = spawn_backend(backend_router()).await;
        let t = transport(&base, TEST_KEY);

        let persona = t.fetch_persona().await.unwrap();
        assert_eq!(persona.id.as_str(), "p-1");
        assert_eq!(persona.public_name, "Luna");
        assert_eq!(persona.welcome(), Some("Hi, ask me anything!"));

        let session = t.init_session(&persona.id).await.unwrap();
        assert_eq!(session.as_str(), "session-for-p-1");
    }

    #[tokio::test]
    async fn test_wrong_key_is_status_error() {
        let base = spawn_backend(backend_router()).await;
        let t = transport(&base, "wrong");

        let err = t.fetch_persona().await.unwrap_err();
        match err {
            ChatError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stream_reassembles_split_utf8() {
        let base = spawn_backend(backend_router()).await;
        let t = transport(&base, TEST_KEY);

        let stream = t
            .open_stream(&SessionId::from("session-1"), "hello")
            .await
            .unwrap();
        assert_eq!(collect_text(stream).await.unwrap(), "echo: hello é");
    }

    #[tokio::test]
    async fn test_stream_404_is_session_not_found() {
        let base = spawn_backend(backend_router()).await;
        let t = transport(&base, TEST_KEY);

        let err = t
            .open_stream(&SessionId::from("gone"), "hello")
            .await
            .err()
            .unwrap();
        assert!(err.is_session_not_found());
    }

    #[tokio::test]
    async fn test_stream_500_is_status_error() {
        let base = spawn_backend(backend_router()).await;
        let t = transport(&base, TEST_KEY);

        let err = t
            .open_stream(&SessionId::from("broken"), "hello")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ChatError::Status { status: 500, .. }));
        assert!(!err.is_session_not_found());
    }

    #[tokio::test]
    async fn test_stalled_stream_times_out() {
        let base = spawn_backend(backend_router()).await;
        let t = transport(&base, TEST_KEY);

        let mut stream = t
            .open_stream(&SessionId::from("stalled"), "hello")
            .await
            .unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), "first");
        assert!(matches!(
            stream.next().await,
            Some(Err(ChatError::Timeout(_)))
        ));
    }

    #[tokio::test]
    async fn test_stalled_error_body_times_out() {
        let base = spawn_backend(backend_router()).await;
        let t = HttpChatTransport::new(
            &base,
            SecretString::from(TEST_KEY.to_string()),
            Duration::from_millis(200),
            Duration::from_secs(1),
        )
        .unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            t.open_stream(&SessionId::from("stalled-error"), "hello"),
        )
        .await
        .expect("open_stream should give up on a stalled error body");
        assert!(matches!(result, Err(ChatError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let base = spawn_backend(Router::new().route("/v1/personas/latest", get(slow_persona))).await;
        let t = HttpChatTransport::new(
            &base,
            SecretString::from(TEST_KEY.to_string()),
            Duration::from_millis(200),
            Duration::from_secs(1),
        )
        .unwrap();

        assert!(matches!(
            t.fetch_persona().await,
            Err(ChatError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let t = transport(&format!("http://{addr}"), TEST_KEY);
        assert!(matches!(
            t.fetch_persona().await,
            Err(ChatError::Transport(_))
        ));
    }
}
