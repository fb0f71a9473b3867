use futures::future::join_all;
use log::warn;
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use thiserror::Error;
use url::Url;

/// A resolvable URL for one image, already sized for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {0} from image provider")]
    Status(u16),
    #[error("unreadable provider response: {0}")]
    Parse(String),
    #[error("provider response carried neither url nor id")]
    MissingReference,
    #[error("invalid image url: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    #[cfg(target_arch = "wasm32")]
    fn network<E: fmt::Display>(err: E) -> Self {
        Self::Network(err.to_string())
    }

    #[cfg(target_arch = "wasm32")]
    fn parse<E: fmt::Display>(err: E) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Metadata returned by the provider for a single random image.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatRecord {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
}

/// Turns provider metadata into a display-sized reference.
///
/// `url` wins over `id`; relative references resolve against `provider`.
pub fn resolve_reference(
    record: &CatRecord,
    provider: &str,
    width: u32,
    height: u32,
) -> Result<ImageRef, FetchError> {
    let raw = match (non_empty(&record.url), non_empty(&record.id)) {
        (Some(url), _) => url.to_string(),
        (None, Some(id)) => format!("/cat/{}", id),
        (None, None) => return Err(FetchError::MissingReference),
    };

    normalize_reference(&raw, provider, width, height)
}

pub fn normalize_reference(
    raw: &str,
    provider: &str,
    width: u32,
    height: u32,
) -> Result<ImageRef, FetchError> {
    let base = Url::parse(provider).map_err(|err| FetchError::InvalidUrl(err.to_string()))?;
    let mut url = base
        .join(raw)
        .map_err(|err| FetchError::InvalidUrl(format!("{}: {}", raw, err)))?;

    url.query_pairs_mut()
        .append_pair("width", &width.to_string())
        .append_pair("height", &height.to_string());

    Ok(ImageRef(url.into()))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Starts `count` independent fetches at once and waits for all of them.
///
/// Failed slots are logged and dropped; successful ones keep their request order.
pub async fn fetch_batch<F, Fut>(count: usize, fetch_one: F) -> Vec<ImageRef>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<ImageRef, FetchError>>,
{
    let results = join_all((0..count).map(&fetch_one)).await;

    results
        .into_iter()
        .enumerate()
        .filter_map(|(slot, result)| match result {
            Ok(reference) => Some(reference),
            Err(err) => {
                warn!("Error fetching image {}: {}", slot, err);
                None
            }
        })
        .collect()
}

#[cfg(target_arch = "wasm32")]
pub async fn fetch_cat(config: &crate::config::SwipeConfig) -> Result<ImageRef, FetchError> {
    use gloo_net::http::Request;
    use web_sys::RequestCache;

    let response = Request::get(&config.provider_url)
        .cache(RequestCache::NoStore)
        .send()
        .await
        .map_err(FetchError::network)?;

    if !response.ok() {
        return Err(FetchError::Status(response.status()));
    }

    let record: CatRecord = response.json().await.map_err(FetchError::parse)?;

    resolve_reference(
        &record,
        &config.provider_url,
        config.render_width,
        config.render_height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    const PROVIDER: &str = "https://cataas.com/cat?json=true";

    #[test]
    fn absolute_url_gets_size_params() {
        let reference =
            normalize_reference("https://cataas.com/cat/abc", PROVIDER, 500, 600).unwrap();
        assert_eq!(
            reference.as_str(),
            "https://cataas.com/cat/abc?width=500&height=600"
        );
    }

    #[test]
    fn existing_query_is_preserved() {
        let reference =
            normalize_reference("https://cataas.com/cat/abc?type=square", PROVIDER, 500, 600)
                .unwrap();
        assert_eq!(
            reference.as_str(),
            "https://cataas.com/cat/abc?type=square&width=500&height=600"
        );
    }

    #[test]
    fn id_only_record_resolves_against_provider() {
        let record = CatRecord {
            url: None,
            id: Some("xyz".to_string()),
        };
        let reference = resolve_reference(&record, PROVIDER, 320, 240).unwrap();
        assert_eq!(
            reference.as_str(),
            "https://cataas.com/cat/xyz?width=320&height=240"
        );
    }

    #[test]
    fn url_wins_over_id() {
        let record: CatRecord =
            serde_json::from_str(r#"{ "_id": "ignored", "url": "/cat/kept" }"#).unwrap();
        let reference = resolve_reference(&record, PROVIDER, 500, 600).unwrap();
        assert!(reference.as_str().starts_with("https://cataas.com/cat/kept?"));
    }

    #[test]
    fn empty_record_is_rejected() {
        let record = CatRecord {
            url: Some("  ".to_string()),
            id: None,
        };
        assert!(matches!(
            resolve_reference(&record, PROVIDER, 500, 600),
            Err(FetchError::MissingReference)
        ));
    }

    #[test]
    fn batch_drops_failures_without_reordering() {
        let failing = [1, 4, 7];
        let batch = block_on(fetch_batch(12, |slot| async move {
            if failing.contains(&slot) {
                Err(FetchError::Status(503))
            } else {
                Ok(ImageRef(format!("https://img/{}", slot)))
            }
        }));

        let expected: Vec<ImageRef> = (0..12)
            .filter(|slot| !failing.contains(slot))
            .map(|slot| ImageRef(format!("https://img/{}", slot)))
            .collect();
        assert_eq!(batch.len(), 9);
        assert_eq!(batch, expected);
    }

    #[test]
    fn batch_with_no_successes_is_empty() {
        let batch = block_on(fetch_batch(10, |_| async {
            Err(FetchError::Network("offline".to_string()))
        }));
        assert!(batch.is_empty());
    }
}
