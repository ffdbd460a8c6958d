//! API client for the issuedeck issue-tracking service.
//!
//! Every outbound call goes through `ApiClient`. A pre-dispatch stage
//! attaches the session's bearer token; a post-response stage classifies
//! failures and drops the session the moment the server rejects the
//! credential. Call sites never re-implement either stage.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::{Credential, SavedLogin, SessionHandle};
use crate::config::Config;
use crate::models::{AnalyticsSummary, Issue, IssueDraft, IssueStatus, UserEntry, UserProfile};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
/// 3 retries with exponential backoff usually succeeds without excessive delay.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Hook invoked after a forced logout, so the host can navigate to its
/// login view without this crate knowing about routers.
pub type AuthFailureHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    user: UserProfile,
}

/// Client for the issuedeck REST API.
/// Clone is cheap - reqwest::Client pools connections behind an Arc, and
/// the session handle is shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionHandle,
    on_auth_failure: Option<AuthFailureHook>,
}

impl ApiClient {
    /// Create a new API client bound to a session
    pub fn new(config: &Config, session: SessionHandle) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
            on_auth_failure: None,
        })
    }

    /// Inject the navigation side effect for forced logouts. The hook runs
    /// after the session has been dropped, once per rejected response.
    pub fn with_auth_failure_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_auth_failure = Some(Arc::new(hook));
        self
    }

    /// The session this client reads its credential from.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    // ===== Authentication =====

    /// Authenticate and establish a session. On success the credential is
    /// persisted and the session becomes authenticated; bad credentials
    /// come back as a validation error carrying the server's message.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        let credential = self.authenticate("/auth/login", &body).await?;
        self.session.login(credential.clone())?;
        Ok(credential)
    }

    /// Create an account and establish a session (the service logs new
    /// users straight in).
    pub async fn register(
        &self,
        username: &str,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Credential> {
        let body = serde_json::json!({
            "username": username,
            "fullName": full_name,
            "email": email,
            "password": password,
        });
        let credential = self.authenticate("/auth/register", &body).await?;
        self.session.login(credential.clone())?;
        Ok(credential)
    }

    /// Log in with a password remembered in the OS keychain.
    pub async fn login_saved(&self, username: &str) -> Result<Credential> {
        let password = SavedLogin::password(username)?;
        self.login(username, &password).await
    }

    async fn authenticate(&self, path: &str, body: &serde_json::Value) -> Result<Credential> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::Network)?;

        // Auth endpoints are public: a rejection here is bad input, not an
        // invalid session, so it must not trip the forced-logout path.
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let error = match ApiError::from_status(status, &text) {
                ApiError::Unauthorized | ApiError::AccessDenied(_) => {
                    ApiError::Validation("Invalid username or password".to_string())
                }
                other => other,
            };
            return Err(error.into());
        }

        let auth: AuthResponse = response
            .json()
            .await
            .context("Failed to parse auth response")?;
        debug!(username = %auth.user.username, "Authenticated");

        Ok(Credential {
            token: auth.token,
            user: auth.user,
        })
    }

    // ===== Request pipeline =====

    /// Pre-dispatch stage: attach the session credential when one is
    /// present. Reads the in-memory session snapshot, never the store -
    /// once initialized, the session is the single source of truth.
    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.session.token() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Post-response stage: pass successes through, classify failures, and
    /// drop the session when the server rejects the credential. The error
    /// is still returned to the caller - the logout is a side effect, not
    /// a substitute for normal error handling.
    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);

        if error.is_auth_failure() {
            warn!("Server rejected the session credential, logging out");
            self.session.force_logout();
            if let Some(hook) = &self.on_auth_failure {
                hook();
            }
        }

        Err(error)
    }

    /// Send a request through the authenticated chokepoint, retrying rate
    /// limits with exponential backoff. Network failures pass through
    /// untouched - they say nothing about the session.
    async fn dispatch<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn(&Client) -> reqwest::RequestBuilder,
    {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build(&self.client)
                .headers(self.auth_headers()?)
                .send()
                .await
                .map_err(ApiError::Network)?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                retries += 1;
                if retries > MAX_RATE_LIMIT_RETRIES {
                    return Err(ApiError::RateLimited.into());
                }
                warn!(retry = retries, backoff_ms, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
                continue;
            }

            return Ok(self.check_response(response).await?);
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self.dispatch(|client: &Client| client.get(&url)).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .dispatch(|client: &Client| client.post(&url).json(body))
            .await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .dispatch(|client: &Client| client.put(&url).json(body))
            .await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        self.dispatch(|client: &Client| client.delete(&url)).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Issues =====

    /// Fetch all issues, optionally filtered by status
    pub async fn issues(&self, status: Option<IssueStatus>) -> Result<Vec<Issue>> {
        match status {
            Some(status) => self.get(&format!("/issues?status={}", status.as_str())).await,
            None => self.get("/issues").await,
        }
    }

    /// Fetch a single issue by id
    pub async fn issue(&self, id: i64) -> Result<Issue> {
        self.get(&format!("/issues/{}", id)).await
    }

    /// Issues reported by the current user
    pub async fn my_issues(&self) -> Result<Vec<Issue>> {
        self.get("/issues/my-issues").await
    }

    /// Issues assigned to the current user
    pub async fn assigned_issues(&self) -> Result<Vec<Issue>> {
        self.get("/issues/assigned-to-me").await
    }

    pub async fn create_issue(&self, draft: &IssueDraft) -> Result<Issue> {
        self.post("/issues", draft).await
    }

    pub async fn update_issue(&self, id: i64, draft: &IssueDraft) -> Result<Issue> {
        self.put(&format!("/issues/{}", id), draft).await
    }

    pub async fn delete_issue(&self, id: i64) -> Result<()> {
        self.delete(&format!("/issues/{}", id)).await
    }

    // ===== Analytics and users =====

    /// Fetch the aggregate issue statistics
    pub async fn analytics(&self) -> Result<AnalyticsSummary> {
        self.get("/analytics").await
    }

    /// Fetch all users (for assignee selection)
    pub async fn users(&self) -> Result<Vec<UserEntry>> {
        self.get("/users").await
    }

    /// Fetch the dashboard data set: analytics summary and issue list,
    /// concurrently.
    pub async fn fetch_dashboard(&self) -> Result<(AnalyticsSummary, Vec<Issue>)> {
        futures::future::try_join(self.analytics(), self.issues(None)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionStore;
    use crate::models::UserProfile;
    use crate::routes::{decide, RouteDecision, View};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn credential(token: &str) -> Credential {
        Credential {
            token: token.to_string(),
            user: UserProfile {
                id: 1,
                username: "bob".to_string(),
                full_name: "Bob Example".to_string(),
                email: "bob@example.com".to_string(),
                roles: vec![],
            },
        }
    }

    fn client_in(dir: &TempDir, api_url: &str) -> (ApiClient, SessionHandle) {
        let session = SessionHandle::new(SessionStore::new(dir.path().to_path_buf()));
        session.initialize();
        let config = Config {
            api_url: api_url.to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config, session.clone()).unwrap();
        (client, session)
    }

    fn response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[test]
    fn attaches_bearer_token_when_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        let (client, session) = client_in(&dir, "http://localhost:8080/api");
        session.login(credential("t1")).unwrap();

        let headers = client.auth_headers().unwrap();
        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer t1"
        );
    }

    #[test]
    fn no_authorization_header_when_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let (client, _session) = client_in(&dir, "http://localhost:8080/api");

        let headers = client.auth_headers().unwrap();
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let (client, _session) = client_in(&dir, "http://localhost:8080/api/");
        assert_eq!(client.url("/issues"), "http://localhost:8080/api/issues");
    }

    #[tokio::test]
    async fn unauthorized_response_drops_session_and_fires_hook() {
        let dir = tempfile::tempdir().unwrap();
        let (client, session) = client_in(&dir, "http://localhost:8080/api");
        session.login(credential("t1")).unwrap();

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let client = client.with_auth_failure_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let error = client
            .check_response(response(401, "unauthorized"))
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::Unauthorized));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!session.is_authenticated());
        // The durable half is gone too
        assert_eq!(SessionStore::new(dir.path().to_path_buf()).load(), None);
        // And the guard now routes protected views back to login
        assert_eq!(
            decide(&session.state(), View::Issues),
            RouteDecision::Redirect(View::Login)
        );
    }

    #[tokio::test]
    async fn server_error_leaves_session_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let (client, session) = client_in(&dir, "http://localhost:8080/api");
        session.login(credential("t1")).unwrap();

        let error = client
            .check_response(response(500, "boom"))
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::ServerError(_)));
        assert!(session.is_authenticated());
        assert!(SessionStore::new(dir.path().to_path_buf()).load().is_some());
    }

    #[tokio::test]
    async fn forbidden_response_leaves_session_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let (client, session) = client_in(&dir, "http://localhost:8080/api");
        session.login(credential("t1")).unwrap();

        let error = client
            .check_response(response(403, "not yours"))
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::AccessDenied(_)));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn success_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let (client, session) = client_in(&dir, "http://localhost:8080/api");
        session.login(credential("t1")).unwrap();

        let passed = client.check_response(response(200, "[]")).await.unwrap();
        assert_eq!(passed.status(), StatusCode::OK);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn network_failure_leaves_session_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // Nothing listens here; the connection is refused immediately
        let (client, session) = client_in(&dir, "http://127.0.0.1:9/api");
        session.login(credential("t1")).unwrap();

        let result = client.issues(None).await;
        assert!(result.is_err());
        assert!(session.is_authenticated());
        assert_eq!(
            SessionStore::new(dir.path().to_path_buf())
                .load()
                .unwrap()
                .token,
            "t1"
        );
    }
}
