//! HTTP client for the geotrace server API.

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use geotrace_core::TrackedKind;

use super::paths::RoutePoints;

#[derive(Debug, Serialize)]
struct AddObjectRequest<'a> {
    id: &'a str,
    kind: TrackedKind,
    lon: f64,
    lat: f64,
    alt: f64,
}

#[derive(Debug, Serialize)]
struct PositionRequest {
    lon: f64,
    lat: f64,
    alt: f64,
    flight_path_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    scalar: Option<f64>,
}

#[derive(Debug, Serialize)]
struct FollowRequest<'a> {
    id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    waypoints: usize,
}

/// Summary of an object as listed by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectSummary {
    pub id: String,
    pub kind: TrackedKind,
    #[serde(default)]
    pub live_path_len: usize,
    #[serde(default)]
    pub route_len: usize,
}

pub struct GeotraceClient {
    client: Client,
    base_url: String,
}

impl GeotraceClient {
    /// Create a client for the server at `base_url` (e.g. "http://localhost:3000").
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register a tracked object. Returns `false` when the id already exists.
    pub async fn add_object(&self, id: &str, kind: TrackedKind, lon: f64, lat: f64, alt: f64) -> Result<bool> {
        let url = format!("{}/v1/objects", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&AddObjectRequest { id, kind, lon, lat, alt })
            .send()
            .await
            .context("Failed to add object")?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            return Ok(false);
        }
        check(response, "add object").await?;
        Ok(true)
    }

    pub async fn update_position(
        &self,
        id: &str,
        lon: f64,
        lat: f64,
        alt: f64,
        flight_path_enabled: bool,
        scalar: Option<f64>,
    ) -> Result<()> {
        let url = format!("{}/v1/objects/{}/position", self.base_url, id);
        let request = PositionRequest {
            lon,
            lat,
            alt,
            flight_path_enabled,
            scalar,
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send position")?;
        check(response, "update position").await?;
        Ok(())
    }

    /// Replace the planned route. Returns the number of accepted waypoints.
    pub async fn set_route(&self, id: &str, route: &RoutePoints) -> Result<usize> {
        let url = format!("{}/v1/objects/{}/route", self.base_url, id);
        let response = self
            .client
            .put(&url)
            .json(route)
            .send()
            .await
            .context("Failed to send route")?;
        let body: RouteResponse = check(response, "set route").await?.json().await?;
        Ok(body.waypoints)
    }

    pub async fn remove_object(&self, id: &str) -> Result<()> {
        let url = format!("{}/v1/objects/{}", self.base_url, id);
        let response = self.client.delete(&url).send().await?;
        check(response, "remove object").await?;
        Ok(())
    }

    pub async fn follow(&self, id: Option<&str>) -> Result<()> {
        let url = format!("{}/v1/follow", self.base_url);
        let response = self.client.post(&url).json(&FollowRequest { id }).send().await?;
        check(response, "follow").await?;
        Ok(())
    }

    pub async fn list_objects(&self) -> Result<Vec<ObjectSummary>> {
        let url = format!("{}/v1/objects", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(check(response, "list objects").await?.json().await?)
    }
}

async fn check(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("Failed to {}: {} {}", action, status, body)
}
