//! HTTP client for the Smart Inventory REST API.
//!
//! The client is deliberately thin: it attaches the JSON content type and
//! the optional bearer credential to every request, turns non-success
//! statuses into [`Error::Remote`], and decodes JSON bodies. It performs no
//! retries and sets no timeout of its own.
//!
//! # Example
//!
//! ```no_run
//! use smartinv_core::InventoryClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = InventoryClient::new("http://localhost:8000", Some("secret"))?;
//!
//! let items = client.list_items().await?;
//! println!("{} items", items.len());
//!
//! for alert in client.active_alerts().await? {
//!     client.acknowledge_alert(alert.id).await?;
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use smartinv_types::{
    Alert, AlertId, AlertsResponse, Device, DevicesResponse, HistoryRange, HistoryResponse, Item,
    ItemsResponse, Reading, Sensor, SensorsResponse,
};

use crate::error::{Error, Result};

/// Path prefix of every versioned endpoint.
const API_PREFIX: [&str; 2] = ["api", "v1"];

/// HTTP client for the inventory service.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl InventoryClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Service root (e.g., "http://localhost:8000")
    /// * `token` - Static bearer credential; `None` or empty disables auth
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let client = Client::builder().build().map_err(|e| Error::Transport {
            url: base_url.to_string(),
            source: e,
        })?;
        Self::with_client(base_url, token, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, token: Option<&str>, client: Client) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }
        Url::parse(&base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let token = token.filter(|t| !t.is_empty()).map(String::from);

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a bearer credential is attached to requests.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // ======================================================================
    // Generic verbs
    // ======================================================================

    /// `GET {base}{path}` and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        self.get_url(&url).await
    }

    /// `POST {base}{path}`. A 204 response yields `None`.
    ///
    /// Without a body an empty JSON object is sent.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<T>> {
        let url = self.endpoint(path);
        self.send_with_body(Method::POST, &url, body).await
    }

    /// `PUT {base}{path}`. A 204 response yields `None`.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<T>> {
        let url = self.endpoint(path);
        self.send_with_body(Method::PUT, &url, body).await
    }

    // ======================================================================
    // Endpoints
    // ======================================================================

    /// List all items.
    pub async fn list_items(&self) -> Result<Vec<Item>> {
        let url = self.api_url(&["items"])?;
        let response: ItemsResponse = self.get_url(url.as_str()).await?;
        Ok(response.items)
    }

    /// Get a single item, including its latest reading.
    pub async fn get_item(&self, item_id: &str) -> Result<Item> {
        let url = self.api_url(&["items", item_id])?;
        self.get_url(url.as_str()).await
    }

    /// Readings of an item within `range`, oldest first.
    pub async fn item_history(&self, item_id: &str, range: HistoryRange) -> Result<Vec<Reading>> {
        let mut url = self.api_url(&["items", item_id, "history"])?;
        url.query_pairs_mut()
            .append_pair("range", &range.to_string());
        let response: HistoryResponse = self.get_url(url.as_str()).await?;
        Ok(response.readings)
    }

    /// Alerts that have not been acknowledged.
    pub async fn active_alerts(&self) -> Result<Vec<Alert>> {
        let mut url = self.api_url(&["alerts"])?;
        url.query_pairs_mut().append_pair("status", "active");
        let response: AlertsResponse = self.get_url(url.as_str()).await?;
        Ok(response.alerts)
    }

    /// Acknowledge an active alert.
    pub async fn acknowledge_alert(&self, alert_id: AlertId) -> Result<()> {
        let id = alert_id.to_string();
        let url = self.api_url(&["alerts", &id, "ack"])?;
        let _: Option<Value> = self.send_with_body(Method::POST, url.as_str(), None).await?;
        Ok(())
    }

    /// List reporting devices.
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        let url = self.api_url(&["devices"])?;
        let response: DevicesResponse = self.get_url(url.as_str()).await?;
        Ok(response.devices)
    }

    /// List sensors.
    pub async fn list_sensors(&self) -> Result<Vec<Sensor>> {
        let url = self.api_url(&["sensors"])?;
        let response: SensorsResponse = self.get_url(url.as_str()).await?;
        Ok(response.sensors)
    }

    /// URL of the server-sent event stream.
    ///
    /// `token` and `last_event_id` query parameters are only added when
    /// present, since EventSource cannot send an Authorization header.
    pub fn stream_url(&self, last_event_id: Option<&str>) -> Result<String> {
        let mut url = self.api_url(&["stream"])?;
        let last_event_id = last_event_id.filter(|id| !id.is_empty());

        if self.token.is_some() || last_event_id.is_some() {
            let mut pairs = url.query_pairs_mut();
            if let Some(token) = &self.token {
                pairs.append_pair("token", token);
            }
            if let Some(id) = last_event_id {
                pairs.append_pair("last_event_id", id);
            }
        }

        Ok(url.into())
    }

    // ======================================================================
    // Internal HTTP helpers
    // ======================================================================

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(API_PREFIX.iter().chain(segments.iter()));
        Ok(url)
    }

    async fn get_url<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.send(Method::GET, url, None).await?;
        decode(url, body.as_deref().unwrap_or("null"))
    }

    async fn send_with_body<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Option<T>> {
        let payload = body.map_or_else(|| "{}".to_string(), Value::to_string);
        match self.send(method, url, Some(payload)).await? {
            Some(text) => decode(url, &text).map(Some),
            None => Ok(None),
        }
    }

    /// Issue a request; `Ok(None)` means the service answered 204.
    async fn send(&self, method: Method, url: &str, body: Option<String>) -> Result<Option<String>> {
        debug!(%method, url, "Sending request");

        let mut request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| Error::Transport {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(None);
            }
            let text = response.text().await.map_err(|e| Error::Transport {
                url: url.to_string(),
                source: e,
            })?;
            Ok(Some(text))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Remote {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            })
        }
    }
}

fn decode<T: DeserializeOwned>(url: &str, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| Error::InvalidBody {
        url: url.to_string(),
        source: e,
    })
}
