use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    IncidentSource,
    error::FetchError,
    filter::NameFilter,
    model::{Incident, IncidentId},
    retry::retry_op,
};

/// Upper bound on followed pagination links, so a misbehaving provider can
/// never keep a run alive past the next tick.
pub const MAX_PAGES: usize = 20;

/// One page of `GET /api/v2/incidents`.
#[derive(Debug, Deserialize)]
struct IncidentPage {
    data: Vec<IncidentResource>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IncidentResource {
    id: String,
    attributes: IncidentAttributes,
}

#[derive(Debug, Deserialize)]
struct IncidentAttributes {
    name: Option<String>,
    started_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
    acknowledged_at: Option<DateTime<Utc>>,
}

impl From<IncidentResource> for Incident {
    fn from(res: IncidentResource) -> Self {
        let IncidentAttributes { name, started_at, resolved_at, acknowledged_at } = res.attributes;
        let name = name.unwrap_or_default();
        let incident = match resolved_at {
            Some(at) => Self::resolved(res.id, name, started_at, at),
            None => Self::open(res.id, name, started_at),
        };
        match acknowledged_at {
            Some(at) => incident.with_acknowledged_at(at),
            None => incident,
        }
    }
}

/// Client for interacting with the Better Uptime API.
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    token: String,
    base_url: Url,
    lookback: ChronoDuration,
}

impl Client {
    /// Create a new Better Uptime API client for the API host at `base_url`.
    /// Every request is bounded by `timeout`.
    pub fn with_base_url(token: String, base_url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http, token, base_url, lookback: ChronoDuration::hours(24) })
    }

    /// Set how far back incidents are requested.
    pub fn with_lookback(mut self, lookback: ChronoDuration) -> Self {
        self.lookback = lookback;
        self
    }

    /// Authenticate the request.
    fn auth(&self, rb: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        rb.bearer_auth(&self.token)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v2/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// First page URL covering the lookback window ending now.
    fn incidents_url(&self, now: DateTime<Utc>) -> String {
        let from = (now - self.lookback).format("%Y-%m-%d");
        format!("{}?from={}&to=now", self.endpoint("incidents"), from)
    }

    /// Map 401/403 to [`FetchError::Auth`] and other failures to transport errors.
    fn check_status(resp: Response) -> Result<Response, FetchError> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Auth { status });
        }
        Ok(resp.error_for_status()?)
    }

    async fn fetch_page(&self, url: &str) -> Result<IncidentPage, FetchError> {
        let resp = self.auth(self.http.get(url)).send().await?;
        let body = Self::check_status(resp)?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Return every incident in the lookback window, following pagination.
    pub async fn incidents(&self) -> Result<Vec<Incident>, FetchError> {
        let mut url = self.incidents_url(Utc::now());
        let mut incidents = Vec::new();

        for page_no in 1..=MAX_PAGES {
            debug!(page = page_no, %url, "Fetching incidents page");
            let page = retry_op(|| async { self.fetch_page(&url).await }).await?;
            incidents.extend(page.data.into_iter().map(Incident::from));

            match page.pagination.and_then(|p| p.next) {
                Some(next) => {
                    Url::parse(&next)
                        .map_err(|source| FetchError::Pagination { link: next.clone(), source })?;
                    url = next;
                }
                None => return Ok(incidents),
            }
        }

        warn!(max_pages = MAX_PAGES, "Incident pagination limit reached, aborting fetch");
        Err(FetchError::Truncated { pages: MAX_PAGES })
    }

    /// Acknowledge an incident on Better Uptime.
    pub async fn acknowledge_incident(&self, id: &IncidentId) -> Result<(), FetchError> {
        let url = self.endpoint(&format!("incidents/{}/acknowledge", id));
        retry_op(|| async {
            let resp = self.auth(self.http.post(&url)).send().await?;
            Self::check_status(resp)?;
            Ok(())
        })
        .await?;
        info!(incident_id = %id, "Acknowledged incident");
        Ok(())
    }
}

#[async_trait]
impl IncidentSource for Client {
    async fn fetch_incidents(&self, filter: &NameFilter) -> Result<Vec<Incident>, FetchError> {
        let all = self.incidents().await?;
        let total = all.len();
        let matching: Vec<_> = all.into_iter().filter(|i| filter.matches(&i.name)).collect();
        debug!(total, matching = matching.len(), filter = filter.as_str(), "Fetched incidents");
        Ok(matching)
    }

    async fn acknowledge(&self, id: &IncidentId) -> Result<(), FetchError> {
        self.acknowledge_incident(id).await
    }
}
