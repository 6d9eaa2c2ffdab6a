//! Encyclopedia-backed geocoder.
//!
//! Issues one blocking `GET <base>/wiki/<title>` per call. The request has no
//! timeout unless one is configured, so a hung fetch blocks the caller.

use super::scrape::CoordinateScraper;
use super::{Geocoder, LookupError, LookupResult};
use crate::model::geo::Coordinates;
use log::{info, warn};
use reqwest::blocking::Client;
use std::time::{Duration, Instant};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://pl.wikipedia.org";
pub const DEFAULT_USER_AGENT: &str = concat!("friendmap/", env!("CARGO_PKG_VERSION"));

/// Geocoder that scrapes coordinates from encyclopedia articles.
pub struct WikipediaGeocoder {
    client: Client,
    base_url: Url,
    scraper: CoordinateScraper,
}

impl WikipediaGeocoder {
    /// Builds a geocoder for `base_url` (scheme + host, e.g. the default).
    ///
    /// # Errors
    /// - `InvalidUrl` when `base_url` cannot serve as a path base.
    /// - `Transport` when the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> LookupResult<Self> {
        let base_url =
            Url::parse(base_url).map_err(|err| LookupError::InvalidUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(LookupError::InvalidUrl(format!(
                "`{base_url}` cannot be used as a base url"
            )));
        }

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            scraper: CoordinateScraper::new()?,
        })
    }

    /// Article URL for a place name; the title is percent-encoded as one
    /// path segment.
    pub fn article_url(&self, location: &str) -> LookupResult<Url> {
        article_url(&self.base_url, location)
    }

    fn fetch_article(&self, url: Url) -> LookupResult<String> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::HttpStatus(status.as_u16()));
        }
        Ok(response.text()?)
    }
}

impl Geocoder for WikipediaGeocoder {
    fn resolve(&self, location: &str) -> LookupResult<Coordinates> {
        let started_at = Instant::now();
        let url = self.article_url(location)?;
        info!(
            "event=geocode module=geocode status=start host={}",
            url.host_str().unwrap_or("unknown")
        );

        match self
            .fetch_article(url)
            .and_then(|html| self.scraper.extract(&html))
        {
            Ok(coords) => {
                info!(
                    "event=geocode module=geocode status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(coords)
            }
            Err(err) => {
                warn!(
                    "event=geocode module=geocode status=error duration_ms={} error_code={}",
                    started_at.elapsed().as_millis(),
                    err.code()
                );
                Err(err)
            }
        }
    }
}

fn article_url(base_url: &Url, location: &str) -> LookupResult<Url> {
    let title = location.trim();
    if title.is_empty() {
        return Err(LookupError::EmptyLocation);
    }

    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| LookupError::InvalidUrl(format!("`{base_url}` cannot be a base")))?
        .pop_if_empty()
        .push("wiki")
        .push(title);
    Ok(url)
}
