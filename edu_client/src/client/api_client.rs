//! The configured request sender every resource API goes through.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::config::ClientConfig;
use super::error::{ClientError, ClientResult, RequestContext};
use super::path::ApiPath;
use super::session::Session;
use super::upload::{ProgressFn, UploadFile};

/// HTTP client for the platform API.
///
/// Cheap to clone; clones share the connection pool and the session.
///
/// Before each request the session token, if any, is attached as
/// `Authorization: Bearer <token>`. Any 401 response clears the token and
/// runs the session's unauthorized hook before the error is returned.
#[derive(Clone, Debug)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
    session: Session,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Session) -> ClientResult<Self> {
        let base_url = config.parsed_base_url()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                config,
                session,
            }),
        })
    }

    /// Client configured from `EDU_API_URL` / `EDU_API_TIMEOUT_MS`.
    pub fn from_env(session: Session) -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?, session)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Absolute URL for a resource path.
    pub fn url_for(&self, path: &ApiPath) -> ClientResult<Url> {
        path.to_url(&self.inner.base_url)
    }

    pub async fn get<T>(&self, path: impl Into<ApiPath>) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let (context, builder) = self.request(Method::GET, path.into())?;
        self.execute(context, builder).await
    }

    /// GET with query parameters. Fields serialized as absent are left out
    /// of the URL entirely.
    pub async fn get_with<T, Q>(&self, path: impl Into<ApiPath>, params: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let (context, builder) = self.request(Method::GET, path.into())?;
        self.execute(context, builder.query(params)).await
    }

    pub async fn post<T, B>(&self, path: impl Into<ApiPath>, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (context, builder) = self.request(Method::POST, path.into())?;
        self.execute(context, builder.json(body)).await
    }

    /// POST without a request body.
    pub async fn post_empty<T>(&self, path: impl Into<ApiPath>) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let (context, builder) = self.request(Method::POST, path.into())?;
        self.execute(context, builder).await
    }

    pub async fn put<T, B>(&self, path: impl Into<ApiPath>, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (context, builder) = self.request(Method::PUT, path.into())?;
        self.execute(context, builder.json(body)).await
    }

    pub async fn delete<T>(&self, path: impl Into<ApiPath>) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let (context, builder) = self.request(Method::DELETE, path.into())?;
        self.execute(context, builder).await
    }

    /// Multipart POST of a single file under the `file` field.
    ///
    /// `on_progress` receives `round(loaded * 100 / total)` after each chunk
    /// when the file size is known, and is never called otherwise.
    pub async fn upload_file<T>(
        &self,
        path: impl Into<ApiPath>,
        file: UploadFile,
        on_progress: Option<ProgressFn>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let (context, builder) = self.request(Method::POST, path.into())?;
        let form = file.into_form(on_progress)?;
        // `multipart` sets its own Content-Type, overriding the JSON default.
        self.execute(context, builder.multipart(form)).await
    }

    /// Build a request and run the request interceptor on it.
    fn request(&self, method: Method, path: ApiPath) -> ClientResult<(RequestContext, RequestBuilder)> {
        let url = self.url_for(&path)?;
        let context = RequestContext::new(method.clone(), path.to_string());
        let builder = self.inner.http.request(method, url);
        Ok((context, self.authorize(builder)))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.inner.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute<T>(&self, context: RequestContext, builder: RequestBuilder) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        debug!(method = %context.method, path = %context.path, "Sending API request");

        let response = builder
            .send()
            .await
            .map_err(|e| self.transport_error(&context, e))?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(&context);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&context, e))?;

        if !status.is_success() {
            debug!(method = %context.method, path = %context.path, %status, "API request failed");
            let body = String::from_utf8_lossy(&body).into_owned();
            return Err(ClientError::Status {
                context,
                status,
                body: Some(body).filter(|b| !b.trim().is_empty()),
            });
        }

        decode_body(context, &body)
    }

    /// Response interceptor for 401: tear the session down, then let the
    /// caller see the original failure.
    fn handle_unauthorized(&self, context: &RequestContext) {
        warn!(
            method = %context.method,
            path = %context.path,
            login_path = %self.inner.config.login_path,
            "Unauthorized response, clearing session"
        );
        self.inner.session.invalidate(&self.inner.config.login_path);
    }

    fn transport_error(&self, context: &RequestContext, source: reqwest::Error) -> ClientError {
        if source.is_timeout() {
            ClientError::Timeout {
                context: context.clone(),
                timeout: self.inner.config.timeout,
            }
        } else {
            ClientError::Transport {
                context: context.clone(),
                source,
            }
        }
    }
}

/// Parse a success body. An empty body reads as JSON `null`.
fn decode_body<T>(context: RequestContext, body: &[u8]) -> ClientResult<T>
where
    T: DeserializeOwned,
{
    let is_empty = body.iter().all(u8::is_ascii_whitespace);
    let parsed = if is_empty {
        serde_json::from_slice(b"null")
    } else {
        serde_json::from_slice(body)
    };
    parsed.map_err(|source| ClientError::Decode {
        context,
        source,
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Acknowledgement;

    fn context() -> RequestContext {
        RequestContext::new(Method::DELETE, "/subjects/1")
    }

    #[test]
    fn test_empty_body_reads_as_null() {
        let ack: Option<Acknowledgement> = decode_body(context(), b"").unwrap();
        assert_eq!(ack, None);
        assert!(decode_body::<()>(context(), b"  \n").is_ok());
    }

    #[test]
    fn test_body_is_parsed() {
        let ack: Option<Acknowledgement> =
            decode_body(context(), br#"{"message":"Subject deleted"}"#).unwrap();
        assert_eq!(ack.unwrap().message, "Subject deleted");
    }

    #[test]
    fn test_shape_mismatch_is_a_decode_error() {
        let result: ClientResult<Acknowledgement> = decode_body(context(), br#"{"msg":1}"#);
        match result {
            Err(ClientError::Decode { body, context, .. }) => {
                assert_eq!(body, r#"{"msg":1}"#);
                assert_eq!(context.path, "/subjects/1");
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        let result = ApiClient::new(ClientConfig::new("::nope::"), Session::in_memory());
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_for_joins_base() {
        let client = ApiClient::new(ClientConfig::default(), Session::in_memory()).unwrap();
        let url = client.url_for(&ApiPath::from("/game/leaderboard")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/game/leaderboard");
    }
}
