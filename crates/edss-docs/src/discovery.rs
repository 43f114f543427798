//! Documentation link discovery
//!
//! Scans the documentation index page for version links of the form
//! `docs/<product>/<release>/documentation/v{3,4}/` and builds a
//! [`LinkRegistry`]. Results are held in an owned TTL cache. A failed index
//! fetch degrades to the built-in legacy table; an index page without
//! matching links yields an empty registry.

use crate::client::DocsClient;
use crate::types::{version_key, ApiVersion, LinkRegistry, RegistrySource, VersionDescriptor};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use url::Url;

/// Default registry lifetime
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Query appended to a page URL to download its ZIP
pub const ZIP_SUFFIX: &str = "get_doc.php?t=zip";

/// Release paths used when discovery is unavailable
const LEGACY_LINKS: &[(&str, &str)] = &[
    ("latest", "docs/EDSS/latest/documentation/v4/"),
    ("trunk", "docs/EDSS/trunk/documentation/v4/"),
];

const TRUNK: &str = "trunk";
const LATEST: &str = "latest";

static DOC_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']*?docs/[^/"']+/([^/"']+)/documentation/(v[34])/[^"']*)["'][^>]*>(.*?)</a>"#,
    )
    .unwrap()
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Registry cache with an explicit time-to-live
#[derive(Debug)]
pub struct LinkCache {
    registry: Option<LinkRegistry>,
    populated_at: Option<Instant>,
    ttl: Duration,
}

impl LinkCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            registry: None,
            populated_at: None,
            ttl,
        }
    }

    /// Cached registry if younger than the TTL
    pub fn fresh(&self) -> Option<&LinkRegistry> {
        match (&self.registry, self.populated_at) {
            (Some(registry), Some(at)) if at.elapsed() < self.ttl => Some(registry),
            _ => None,
        }
    }

    pub fn store(&mut self, registry: LinkRegistry) {
        self.registry = Some(registry);
        self.populated_at = Some(Instant::now());
    }

    pub fn invalidate(&mut self) {
        self.registry = None;
        self.populated_at = None;
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Discovers version links and owns the registry cache
#[derive(Debug)]
pub struct LinkDiscovery {
    client: DocsClient,
    base_url: Url,
    cache: Mutex<LinkCache>,
}

impl LinkDiscovery {
    pub fn new(client: DocsClient, base_url: Url, ttl: Duration) -> Self {
        Self {
            client,
            base_url,
            cache: Mutex::new(LinkCache::new(ttl)),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the registry, re-scanning the index when stale or forced
    ///
    /// Never fails: fetch errors produce the legacy registry, which is not
    /// cached so the next call retries discovery.
    pub async fn discover(&self, force_refresh: bool) -> LinkRegistry {
        if !force_refresh {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(registry) = cache.fresh() {
                debug!(entries = registry.len(), "Using cached link registry");
                return registry.clone();
            }
        }

        match self.client.fetch_page(self.base_url.as_str()).await {
            Ok(html) => {
                let registry = parse_index(&html, &self.base_url);
                let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
                info!(
                    entries = registry.len(),
                    url = %self.base_url,
                    ttl_secs = cache.ttl().as_secs(),
                    "Discovered documentation links"
                );
                cache.store(registry.clone());
                registry
            }
            Err(e) => {
                warn!(error = %e, url = %self.base_url, "Link discovery failed, using legacy links");
                legacy_registry(&self.base_url)
            }
        }
    }
}

/// Parse index page markup into a registry
///
/// Later anchors overwrite earlier ones with the same key. Every non-trunk
/// release also rewrites the `latest_<api>` alias, so the alias follows
/// the last such anchor in document order.
pub fn parse_index(html: &str, base_url: &Url) -> LinkRegistry {
    let mut entries = BTreeMap::new();

    for caps in DOC_ANCHOR.captures_iter(html) {
        let href = &caps[1];
        let release = &caps[2];
        let api_version = match caps[3].parse::<ApiVersion>() {
            Ok(v) => v,
            Err(_) => continue,
        };

        let (page_url, zip_url) = match base_url
            .join(href)
            .and_then(|page| Ok((page.to_string(), zip_url_for(&page)?)))
        {
            Ok(urls) => urls,
            Err(e) => {
                debug!(href = %href, error = %e, "Skipping unresolvable link");
                continue;
            }
        };

        let link_text = TAG.replace_all(&caps[4], "").trim().to_string();
        let descriptor = VersionDescriptor {
            release: release.to_string(),
            api_version,
            zip_url,
            page_url,
            link_text,
            discovered: true,
        };

        if !release.eq_ignore_ascii_case(TRUNK) {
            entries.insert(version_key(LATEST, api_version), descriptor.clone());
        }
        entries.insert(version_key(release, api_version), descriptor);
    }

    LinkRegistry {
        entries,
        discovered_at: unix_now(),
        source: RegistrySource::Discovered,
    }
}

/// Built-in registry used when the index page cannot be fetched
pub fn legacy_registry(base_url: &Url) -> LinkRegistry {
    let entries = LEGACY_LINKS
        .iter()
        .filter_map(|(release, path)| {
            let page = base_url.join(path).ok()?;
            let descriptor = VersionDescriptor {
                release: release.to_string(),
                api_version: ApiVersion::V4,
                zip_url: zip_url_for(&page).ok()?,
                page_url: page.to_string(),
                link_text: format!("{} v4", release),
                discovered: false,
            };
            Some((version_key(release, ApiVersion::V4), descriptor))
        })
        .collect();

    LinkRegistry {
        entries,
        discovered_at: unix_now(),
        source: RegistrySource::Legacy,
    }
}

/// Derive the archive URL of a documentation page
///
/// The suffix is resolved against the page's directory, so a page URL
/// naming a file is replaced rather than extended.
pub fn zip_url_for(page_url: &Url) -> Result<String, url::ParseError> {
    page_url.join(ZIP_SUFFIX).map(String::from)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
