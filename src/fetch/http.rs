//! Paginated HTTP fetching
//!
//! Each page is a JSON object `{ "results": [...], "next": <url or null> }`.
//! Pages are followed until `next` is null and their results concatenated.

use crate::fetch::ResourceSource;
use crate::record::EntityRecord;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    next: Option<String>,
}

/// Pass-through source that hits the API on every call
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| Error::Fetch {
                url: String::new(),
                reason: format!("cannot build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    fn fetch_page(&self, url: &str) -> Result<Page> {
        let fail = |e: reqwest::Error| Error::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        };

        self.client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(fail)?
            .json::<Page>()
            .map_err(fail)
    }
}

impl ResourceSource for HttpSource {
    fn fetch_collection(&self, url: &str) -> Result<Vec<EntityRecord>> {
        let records = walk_pages(url, |page_url| self.fetch_page(page_url))?;
        tracing::debug!("Fetched {} records from {}", records.len(), url);
        Ok(records)
    }
}

/// Follow `next` links from `first` and concatenate every page's results.
///
/// Any page error aborts the walk; nothing fetched so far is returned.
fn walk_pages<F>(first: &str, mut fetch_page: F) -> Result<Vec<EntityRecord>>
where
    F: FnMut(&str) -> Result<Page>,
{
    let mut records = Vec::new();
    let mut next = Some(first.to_string());

    while let Some(page_url) = next {
        tracing::info!("{}", page_url);
        let page = fetch_page(&page_url)?;

        for item in page.results {
            records.push(EntityRecord::from_value(item)?);
        }

        next = page.next;
        if next.as_deref() == Some(page_url.as_str()) {
            return Err(Error::Fetch {
                url: page_url,
                reason: "page links to itself as next".to_string(),
            });
        }
    }

    Ok(records)
}
