use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::dto::{
    BroadcastMessageRequest, BroadcastMessageResponse, BusLocation, BusStop, BusStopRequest,
    LocationValidationRequest, LocationValidationResponse, Notification, RouteGroup,
    RouteGroupRequest, RouteResponse, Schedule, UserProfile,
};
use crate::error::Error;
use crate::token::Credential;

/// BUSMATE REST API configuration.
///
/// ```rust,ignore
/// use busmate_session::ApiConfig;
///
/// let config = ApiConfig::new("https://api.busmate.lk/".parse()?);
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ApiConfig {
    pub(crate) base_url: Url,
}

impl ApiConfig {
    /// Endpoint paths are resolved below `base_url`, so a path prefix such as
    /// `https://gateway.example/busmate` is preserved.
    #[must_use]
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { base_url }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `BUSMATE_API_URL`: Base URL of the BUSMATE REST API
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the variable is missing or not a URL.
    pub fn from_env() -> Result<Self, Error> {
        let url = std::env::var("BUSMATE_API_URL")
            .map_err(|_| Error::Config("BUSMATE_API_URL is required".into()))?;
        let url: Url = url
            .parse()
            .map_err(|e| Error::Config(format!("BUSMATE_API_URL: {e}")))?;
        Ok(Self::new(url))
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Typed client for the BUSMATE REST API.
///
/// Every call attaches the caller's credential as a bearer token. Failures are
/// returned as-is; there is no retry.
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or timeouts).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    // ── Bus stops ──────────────────────────────────────────────────

    pub async fn list_bus_stops(&self, credential: &Credential) -> Result<Vec<BusStop>, Error> {
        self.get(credential, "api/bus-stops", "list bus stops").await
    }

    pub async fn create_bus_stop(
        &self,
        credential: &Credential,
        request: &BusStopRequest,
    ) -> Result<BusStop, Error> {
        request.location.validate()?;
        self.post(credential, "api/bus-stops", request, "create bus stop")
            .await
    }

    // ── Routes ─────────────────────────────────────────────────────

    pub async fn list_routes(&self, credential: &Credential) -> Result<Vec<RouteResponse>, Error> {
        self.get(credential, "api/routes", "list routes").await
    }

    pub async fn list_route_groups(&self, credential: &Credential) -> Result<Vec<RouteGroup>, Error> {
        self.get(credential, "api/route-groups", "list route groups")
            .await
    }

    pub async fn create_route_group(
        &self,
        credential: &Credential,
        request: &RouteGroupRequest,
    ) -> Result<RouteGroup, Error> {
        self.post(credential, "api/route-groups", request, "create route group")
            .await
    }

    // ── Schedules ──────────────────────────────────────────────────

    pub async fn list_schedules(&self, credential: &Credential) -> Result<Vec<Schedule>, Error> {
        self.get(credential, "api/schedules", "list schedules").await
    }

    // ── Location tracking ──────────────────────────────────────────

    pub async fn validate_location(
        &self,
        credential: &Credential,
        request: &LocationValidationRequest,
    ) -> Result<LocationValidationResponse, Error> {
        request.validate()?;
        self.post(
            credential,
            "api/location-tracking/validate",
            request,
            "location validation",
        )
        .await
    }

    pub async fn bus_locations(&self, credential: &Credential) -> Result<Vec<BusLocation>, Error> {
        self.get(credential, "api/location-tracking/buses", "bus locations")
            .await
    }

    // ── Notifications ──────────────────────────────────────────────

    pub async fn send_broadcast(
        &self,
        credential: &Credential,
        request: &BroadcastMessageRequest,
    ) -> Result<BroadcastMessageResponse, Error> {
        request.validate()?;
        self.post(
            credential,
            "api/notifications/broadcast",
            request,
            "broadcast message",
        )
        .await
    }

    pub async fn list_notifications(
        &self,
        credential: &Credential,
    ) -> Result<Vec<Notification>, Error> {
        self.get(credential, "api/notifications", "list notifications")
            .await
    }

    // ── Users ──────────────────────────────────────────────────────

    pub async fn user_profile(&self, credential: &Credential) -> Result<UserProfile, Error> {
        self.get(credential, "api/user/profile", "user profile").await
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.config
            .base_url
            .join(path)
            .map_err(|e| Error::Config(format!("endpoint {path}: {e}")))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        path: &str,
        operation: &'static str,
    ) -> Result<T, Error> {
        let response = self
            .http
            .get(self.endpoint(path)?)
            .bearer_auth(credential.token().as_str())
            .send()
            .await?;

        let response = Self::ensure_success(response, operation).await?;
        response.json::<T>().await.map_err(Into::into)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        credential: &Credential,
        path: &str,
        body: &B,
        operation: &'static str,
    ) -> Result<T, Error> {
        let response = self
            .http
            .post(self.endpoint(path)?)
            .bearer_auth(credential.token().as_str())
            .json(body)
            .send()
            .await?;

        let response = Self::ensure_success(response, operation).await?;
        response.json::<T>().await.map_err(Into::into)
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(operation, status, "BUSMATE API request failed");
        Err(Error::Api {
            operation,
            status: Some(status),
            detail: body,
        })
    }
}
