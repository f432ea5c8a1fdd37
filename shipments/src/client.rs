//! Shipment API client implementation

use crate::config::ApiClientConfig;
use crate::dto::{
    CreateShipmentDto, ShipmentDetailDto, ShipmentListItemDto, ShipmentTrackingDto,
    TrackingUpdateDto,
};
use crate::error::{ApiError, Result};
use crate::token::TokenSource;
use crate::view::TrackingView;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Shipment backend client
///
/// Every request carries `Authorization: Bearer <identity token>` when the
/// token source has one.
#[derive(Clone, Debug)]
pub struct ShipmentClient<T> {
    client: Client,
    api_url: String,
    tokens: T,
}

impl<T: TokenSource> ShipmentClient<T> {
    /// Create a client
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built
    pub fn new(config: &ApiClientConfig, tokens: T) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Create a shipment
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, API errors, or parsing failures
    #[tracing::instrument(skip(self, shipment), fields(receiver = %shipment.receiver))]
    pub async fn create(&self, shipment: &CreateShipmentDto) -> Result<ShipmentDetailDto> {
        let request = self.client.post(self.url("/shipment/create")).json(shipment);
        let created: ShipmentDetailDto = self.send(request).await?;
        tracing::info!(id = %created.id, tracking_id = %created.tracking_id, "Shipment created");
        Ok(created)
    }

    /// List the caller's shipments
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, API errors, or parsing failures
    pub async fn list_mine(&self) -> Result<Vec<ShipmentListItemDto>> {
        self.send(self.client.get(self.url("/shipment"))).await
    }

    /// Fetch one shipment with its timeline
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, API errors, or parsing failures
    pub async fn get(&self, id: Uuid) -> Result<ShipmentDetailDto> {
        self.send(self.client.get(self.url(&format!("/shipment/{id}"))))
            .await
    }

    /// Look a shipment up by its public tracking id
    ///
    /// Works without a signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidTrackingId` for a blank id without calling
    /// the backend, otherwise errors for network failures, API errors, or
    /// parsing failures
    #[tracing::instrument(skip(self))]
    pub async fn track_public(&self, tracking_id: &str) -> Result<TrackingView> {
        let tracking_id = tracking_id.trim();
        if tracking_id.is_empty() {
            return Err(ApiError::InvalidTrackingId);
        }

        let url = self
            .url_with_segments(&["shipment", "track", tracking_id])
            .ok_or_else(|| ApiError::Transport(format!("Invalid base URL: {}", self.api_url)))?;
        let dto: ShipmentTrackingDto = self.send(self.client.get(url)).await?;
        Ok(TrackingView::from_dto(dto))
    }

    /// Post a station checkpoint
    ///
    /// # Errors
    ///
    /// Returns errors for network failures or API errors
    #[tracing::instrument(skip(self, update), fields(shipment_id = %update.shipment_id, status = %update.status))]
    pub async fn send_update(&self, update: &TrackingUpdateDto) -> Result<()> {
        let request = self.client.post(self.url("/tracking/update")).json(update);
        let response = self.execute(request).await?;
        // The body is a plain acknowledgement string; the status already decided success
        match response.text().await {
            Ok(ack) => tracing::info!(ack = %ack.trim(), "Tracking update sent"),
            Err(e) => tracing::warn!(error = %e, "Tracking update sent, acknowledgement unreadable"),
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    /// Append percent-encoded path segments to the base URL.
    fn url_with_segments(&self, segments: &[&str]) -> Option<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.api_url).ok()?;
        url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
        Some(url)
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R> {
        self.execute(request)
            .await?
            .json::<R>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let request = match self.tokens.bearer_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Shipment API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response)
    }
}
