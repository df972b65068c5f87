//! HTTP transport for the agency REST API.
//!
//! Every resource client funnels through [`RestClient::perform_request`], which
//! attaches the bearer token, encodes the JSON body and maps the response
//! status:
//!
//! - `204 No Content` becomes [`Reply::NoContent`]
//! - `301`, `303`, `307` and `308` become [`Reply::Redirect`] with the
//!   `Location` target (redirects are never followed)
//! - any other `2xx` body is decoded as `T` (an empty body counts as no
//!   content)
//! - anything else becomes [`Error::Api`], with the message taken from the
//!   error body when it has one

use reqwest::{header::LOCATION, Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::{ClientConfig, API_PATH},
    error::{Error, Result},
};

/// Outcome of a successful request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    /// `204 No Content`.
    NoContent,
    /// A redirect, carrying the `Location` target.
    Redirect(String),
    /// A decoded response body.
    Content(T),
}

impl<T> Reply<T> {
    /// Returns the decoded body.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedResponse` for a redirect or an empty reply.
    pub fn into_content(self) -> Result<T> {
        match self {
            Self::Content(content) => Ok(content),
            Self::NoContent => Err(Error::UnexpectedResponse("no content".into())),
            Self::Redirect(location) => Err(Error::UnexpectedResponse(format!(
                "redirected to {location}"
            ))),
        }
    }
}

/// HTTP client bound to one agency.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

impl RestClient {
    /// Creates a client for the agency at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_http_client(base_url, config.build_http_client()?))
    }

    /// Creates a client around an existing HTTP client.
    pub fn with_http_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The agency base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying HTTP client.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The URL of an agency resource, e.g. `endpoint("credentials")`.
    #[must_use]
    pub fn endpoint(&self, resource: &str) -> String {
        format!("{}/{API_PATH}/{resource}", self.base_url)
    }

    /// The URL of one record of `resource`.
    ///
    /// `id` is appended as a single percent-encoded path segment, so ids
    /// containing `/`, `?` or `#` cannot address another resource.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the base URL cannot carry path segments.
    pub fn item_endpoint(&self, resource: &str, id: &str) -> Result<String> {
        let mut url =
            Url::parse(&self.endpoint(resource)).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidConfig(format!("{} is not a base URL", self.base_url)))?
            .push(id);
        Ok(url.into())
    }

    /// Performs a request and maps the response.
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP method
    /// * `url` - The absolute URL
    /// * `token` - Bearer token, if the call is authenticated
    /// * `body` - JSON body, if any
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request cannot be sent (`Http`)
    /// - The agency answers with an error status (`Api`)
    /// - A redirect carries no `Location` header
    /// - A success body cannot be decoded as `T`
    pub async fn perform_request<T, B>(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<Reply<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(%method, url, "Sending agency request");

        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%method, url, status = status.as_u16(), "Received agency response");

        match status {
            StatusCode::NO_CONTENT => Ok(Reply::NoContent),
            StatusCode::MOVED_PERMANENTLY
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT => {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| {
                        Error::UnexpectedResponse(format!("{status} without a Location header"))
                    })?;
                Ok(Reply::Redirect(location.to_string()))
            }
            status if status.is_success() => {
                let bytes = response.bytes().await?;
                if bytes.is_empty() {
                    return Ok(Reply::NoContent);
                }
                Ok(Reply::Content(serde_json::from_slice(&bytes)?))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = api_error(status, body);
                warn!(%method, url, %error, "Agency request failed");
                Err(error)
            }
        }
    }

    /// `GET url`, requiring a body.
    ///
    /// # Errors
    ///
    /// See [`RestClient::perform_request`].
    pub async fn get<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T> {
        self.perform_request::<T, Value>(Method::GET, url, Some(token), None)
            .await?
            .into_content()
    }

    /// `PATCH url` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`RestClient::perform_request`].
    pub async fn patch<T, B>(&self, url: &str, token: &str, body: &B) -> Result<Reply<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.perform_request(Method::PATCH, url, Some(token), Some(body))
            .await
    }

    /// `POST url` with a JSON body, requiring a body in reply.
    ///
    /// # Errors
    ///
    /// See [`RestClient::perform_request`].
    pub async fn post<T, B>(&self, url: &str, token: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.perform_request(Method::POST, url, Some(token), Some(body))
            .await?
            .into_content()
    }

    /// `DELETE url`. Any success status is accepted.
    ///
    /// # Errors
    ///
    /// See [`RestClient::perform_request`].
    pub async fn delete(&self, url: &str, token: &str) -> Result<()> {
        self.perform_request::<Value, Value>(Method::DELETE, url, Some(token), None)
            .await
            .map(|_| ())
    }
}

/// Builds an `Api` error from an error response.
fn api_error(status: StatusCode, body: String) -> Error {
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| {
            ["error_description", "message", "messageDescription", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| format!("request failed with status code {}", status.as_u16()));

    Error::Api {
        status: status.as_u16(),
        message,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{bearer_token, body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    async fn client(server: &MockServer) -> RestClient {
        RestClient::new(server.uri(), &ClientConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_content_reply() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/diagency/v1.0/diagency/agents/me"))
            .and(bearer_token("token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "holder"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client(&mock_server).await;
        let value: Value = client
            .get(&client.endpoint("agents/me"), "token-1")
            .await
            .unwrap();
        assert_eq!(value["name"], "holder");
    }

    #[tokio::test]
    async fn test_no_content_reply() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/diagency/v1.0/diagency/verifications/v1"))
            .and(body_json(json!({"state": "failed"})))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server).await;
        let reply: Reply<Value> = client
            .patch(
                &client.endpoint("verifications/v1"),
                "token",
                &json!({"state": "failed"}),
            )
            .await
            .unwrap();
        assert_eq!(reply, Reply::NoContent);
        assert!(reply.into_content().is_err());
    }

    #[tokio::test]
    async fn test_redirect_reply() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/diagency/v1.0/diagency/invitations/short"))
            .respond_with(
                ResponseTemplate::new(303).insert_header("Location", "https://agency.example/inv/1"),
            )
            .mount(&mock_server)
            .await;

        let client = client(&mock_server).await;
        let reply = client
            .perform_request::<Value, Value>(
                Method::GET,
                &client.endpoint("invitations/short"),
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(reply, Reply::Redirect("https://agency.example/inv/1".into()));
    }

    #[tokio::test]
    async fn test_every_redirect_status() {
        let mock_server = MockServer::start().await;

        for status in [301_u16, 307, 308] {
            Mock::given(method("GET"))
                .and(path(format!("/diagency/v1.0/diagency/invitations/r{status}")))
                .respond_with(
                    ResponseTemplate::new(status)
                        .insert_header("Location", format!("https://agency.example/{status}").as_str()),
                )
                .mount(&mock_server)
                .await;
        }

        let client = client(&mock_server).await;
        for status in [301_u16, 307, 308] {
            let reply = client
                .perform_request::<Value, Value>(
                    Method::GET,
                    &client.endpoint(&format!("invitations/r{status}")),
                    None,
                    None,
                )
                .await
                .unwrap();
            assert_eq!(reply, Reply::Redirect(format!("https://agency.example/{status}")));
        }
    }

    #[tokio::test]
    async fn test_redirect_without_location() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(307))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server).await;
        let err = client
            .perform_request::<Value, Value>(
                Method::GET,
                &client.endpoint("invitations/short"),
                None,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_error_body_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "credential not found"})),
            )
            .mount(&mock_server)
            .await;

        let client = client(&mock_server).await;
        let err = client
            .get::<Value>(&client.endpoint("credentials/x"), "token")
            .await
            .unwrap_err();
        match err {
            Error::Api { status, message, body } => {
                assert_eq!(status, 404);
                assert_eq!(message, "credential not found");
                assert!(body.contains("credential not found"));
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_without_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server).await;
        let err = client
            .delete(&client.endpoint("connections/c1"), "token")
            .await
            .unwrap_err();
        match err {
            Error::Api { status, message, .. } => {
                assert_eq!(status, 502);
                assert_eq!(message, "request failed with status code 502");
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server).await;
        let err = client
            .get::<Value>(&client.endpoint("agents/me"), "token")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_endpoint_layout() {
        let client = RestClient::with_http_client("https://agency.example/", reqwest::Client::new());
        assert_eq!(
            client.endpoint("credentials"),
            "https://agency.example/diagency/v1.0/diagency/credentials"
        );
    }

    #[test]
    fn test_item_endpoint_encodes_id() {
        let client = RestClient::with_http_client("https://agency.example", reqwest::Client::new());
        assert_eq!(
            client.item_endpoint("credentials", "cred-1").unwrap(),
            "https://agency.example/diagency/v1.0/diagency/credentials/cred-1"
        );
        assert_eq!(
            client.item_endpoint("credentials", "a/b?x=1#f").unwrap(),
            "https://agency.example/diagency/v1.0/diagency/credentials/a%2Fb%3Fx=1%23f"
        );
    }
}
