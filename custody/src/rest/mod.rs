pub mod endpoints;

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::CustodyConfig;
use crate::error::{ApiError, CustodyError, Result};
use crate::router::{Navigator, Route};
use crate::store::SessionStore;

/// HTTP client for the custody backend.
///
/// Every request carries the bearer token currently in storage. A 401 tears
/// the session down and sends the application back to the login route.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
}

impl ApiClient {
    pub fn new(
        config: &CustodyConfig,
        session: Arc<SessionStore>,
        navigator: Arc<Navigator>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(config.api_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
            navigator,
        })
    }

    /// GET a JSON resource.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let req = self.request(Method::GET, path).query(query);
        self.execute(Method::GET, path, req).await
    }

    /// POST a JSON body.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let req = self.request(Method::POST, path).json(body);
        self.execute(Method::POST, path, req).await
    }

    /// PATCH a JSON body.
    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let req = self.request(Method::PATCH, path).json(body);
        self.execute(Method::PATCH, path, req).await
    }

    /// DELETE with a JSON body.
    pub async fn delete<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let req = self.request(Method::DELETE, path).json(body);
        self.execute(Method::DELETE, path, req).await
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let req = self.client.request(method, url);
        match self.session.stored_token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// `prefix/segment`, with `segment` percent-encoded so it cannot add
    /// path components or a query.
    fn path_with_segment(prefix: &str, segment: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(segment.as_bytes()).collect();
        // byte_serialize writes spaces as '+'; a literal '+' is already %2B.
        format!("{prefix}/{}", encoded.replace('+', "%20"))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        req: RequestBuilder,
    ) -> Result<T> {
        debug!(%method, path, "api request");
        let resp = req.send().await?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            self.on_unauthorized(path);
            return Err(CustodyError::Unauthorized);
        }

        let body = resp.text().await?;
        if !status.is_success() {
            let err = ApiError::from_body(status.as_u16(), &body);
            debug!(%method, path, error = %err, "api error");
            return Err(CustodyError::Api(err));
        }

        serde_json::from_str(&body).map_err(CustodyError::Json)
    }

    fn on_unauthorized(&self, path: &str) {
        if self.session.invalidate() {
            warn!(path, "unauthorized; session cleared");
            self.navigator.hard_redirect(Route::Login);
        } else {
            debug!(path, "unauthorized with no stored session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segment_is_escaped() {
        assert_eq!(
            ApiClient::path_with_segment("/admin/withdrawals", "tx-42"),
            "/admin/withdrawals/tx-42"
        );
        assert_eq!(
            ApiClient::path_with_segment("/admin/withdrawals", "../users?x=1 +"),
            "/admin/withdrawals/..%2Fusers%3Fx%3D1%20%2B"
        );
    }
}
