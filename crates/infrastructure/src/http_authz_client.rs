use async_trait::async_trait;
use tessera_application::{AuthzCheckRequest, AuthzCheckResponse, AuthzTransport};
use tessera_core::{AppError, AppResult};

/// HTTP client for a remote `/authz/check` endpoint.
#[derive(Clone)]
pub struct HttpAuthzClient {
    http_client: reqwest::Client,
    check_url: String,
}

impl HttpAuthzClient {
    /// Creates a client posting to `{base_url}/authz/check`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            check_url: format!("{}/authz/check", base_url.trim_end_matches('/')),
        }
    }

    /// Returns the endpoint this client posts to.
    #[must_use]
    pub fn check_url(&self) -> &str {
        self.check_url.as_str()
    }
}

#[async_trait]
impl AuthzTransport for HttpAuthzClient {
    async fn check(&self, request: &AuthzCheckRequest) -> AppResult<bool> {
        let response = self
            .http_client
            .post(self.check_url.as_str())
            .json(request)
            .send()
            .await
            .map_err(|error| AppError::Transport(format!("authz check request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!(
                "authz check returned status {}",
                status.as_u16()
            )));
        }

        let body = response
            .json::<AuthzCheckResponse>()
            .await
            .map_err(|error| {
                AppError::Transport(format!("authz check returned a malformed body: {error}"))
            })?;

        Ok(body.allowed)
    }
}
