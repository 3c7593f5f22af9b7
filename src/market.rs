//! Market prices for reagents.
//!
//! - [`MarketDataProvider`] is the seam to whatever serves auction data.
//! - [`NexusHubClient`] is the blocking HTTP implementation used by the CLI.
//! - [`PriceCache`] is a read-through cache persisted as one JSON file per
//!   server and faction.
//!
//! Cached entries never expire. The file is rewritten wholesale after every
//! miss without any locking, so two processes sharing a cache file can lose
//! each other's updates.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::currency::CurrencyAmount;
use crate::error::Result;
use crate::models::{Faction, ItemId, Reagent};

const DEFAULT_BASE_URL: &str = "https://api.nexushub.co/wow-classic/v1/";
const USER_AGENT: &str = concat!("craftpath/", env!("CARGO_PKG_VERSION"));
const SERVERS_FILENAME: &str = "servers.json";

/// Latest market data for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketItem {
    pub name: String,
    /// Market value in copper of the most recent scan, `None` when there
    /// are no recent listings.
    pub market_value: Option<u64>,
}

/// Source of market data for a server and faction.
pub trait MarketDataProvider {
    fn fetch_item(&self, server: &str, faction: Faction, item: ItemId) -> Result<MarketItem>;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for &P {
    fn fetch_item(&self, server: &str, faction: Faction, item: ItemId) -> Result<MarketItem> {
        (**self).fetch_item(server, faction, item)
    }
}

// ============================================================================
// NexusHub HTTP client
// ============================================================================

#[derive(Debug, Deserialize)]
struct PricesResponse {
    name: String,
    #[serde(default)]
    data: Vec<PriceScan>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceScan {
    market_value: u64,
}

/// A server as listed by the NexusHub server endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// Blocking client for the NexusHub WoW Classic API.
///
/// Requests are not retried; any transport or status error is returned
/// to the caller as is.
#[derive(Debug, Clone)]
pub struct NexusHubClient {
    http: Client,
    base_url: String,
}

impl NexusHubClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        let base_url = format!("{}/", base.trim_end_matches('/'));
        Ok(Self { http, base_url })
    }

    /// Slugs of every known server.
    ///
    /// The list is read from `servers.json` in `cache_dir` when present,
    /// otherwise downloaded once and stored there.
    pub fn servers(&self, cache_dir: &Path) -> Result<Vec<String>> {
        let path = cache_dir.join(SERVERS_FILENAME);
        let servers: Vec<ServerInfo> = if path.exists() {
            debug!(path = %path.display(), "loading server list");
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            let servers: Vec<ServerInfo> = self.get_json("servers/full")?;
            fs::create_dir_all(cache_dir)?;
            fs::write(&path, serde_json::to_string(&servers)?)?;
            info!(count = servers.len(), path = %path.display(), "saved server list");
            servers
        };
        Ok(servers.into_iter().map(|s| s.slug).collect())
    }

    /// Downloads an arbitrary page as text.
    pub fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "requesting");
        let response = self.http.get(&url).send()?.error_for_status()?;
        Ok(response.json()?)
    }
}

impl MarketDataProvider for NexusHubClient {
    fn fetch_item(&self, server: &str, faction: Faction, item: ItemId) -> Result<MarketItem> {
        let response: PricesResponse =
            self.get_json(&format!("items/{server}-{faction}/{item}/prices"))?;
        Ok(MarketItem {
            name: response.name,
            market_value: response.data.first().map(|scan| scan.market_value),
        })
    }
}

// ============================================================================
// Price cache
// ============================================================================

/// One persisted cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedItem {
    pub name: String,
    #[serde(rename = "marketValue")]
    pub market_value: u64,
}

/// Location of the cache file for a server and faction.
pub fn cache_file_path(cache_dir: &Path, server: &str, faction: Faction) -> PathBuf {
    cache_dir.join(format!("item_cache_{}_{}.json", server.to_lowercase(), faction))
}

/// Read-through price cache backed by a JSON file.
///
/// Keys are item ids rendered as strings, matching the file format.
pub struct PriceCache<P> {
    server: String,
    faction: Faction,
    path: PathBuf,
    entries: BTreeMap<String, CachedItem>,
    provider: P,
}

impl<P: MarketDataProvider> PriceCache<P> {
    /// Opens the cache for `server`/`faction`, loading any existing file.
    pub fn open(cache_dir: &Path, server: &str, faction: Faction, provider: P) -> Result<Self> {
        let server = server.to_lowercase();
        let path = cache_file_path(cache_dir, &server, faction);
        let entries = if path.exists() {
            let entries: BTreeMap<String, CachedItem> =
                serde_json::from_str(&fs::read_to_string(&path)?)?;
            debug!(count = entries.len(), path = %path.display(), "loaded price cache");
            entries
        } else {
            debug!(path = %path.display(), "no price cache found");
            BTreeMap::new()
        };

        Ok(Self {
            server,
            faction,
            path,
            entries,
            provider,
        })
    }

    pub fn get_price(&mut self, item: ItemId) -> Result<CurrencyAmount> {
        Ok(CurrencyAmount::from_copper(self.item_data(item)?.market_value))
    }

    pub fn get_name(&mut self, item: ItemId) -> Result<String> {
        Ok(self.item_data(item)?.name.clone())
    }

    /// The item as a priced [`Reagent`].
    pub fn get_item(&mut self, item: ItemId) -> Result<Reagent> {
        let data = self.item_data(item)?;
        Ok(Reagent::new(
            item,
            data.name.clone(),
            CurrencyAmount::from_copper(data.market_value),
        ))
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn item_data(&mut self, item: ItemId) -> Result<&CachedItem> {
        let key = item.to_string();
        if self.entries.contains_key(&key) {
            debug!(%item, "price cache hit");
        } else {
            let fetched = self.provider.fetch_item(&self.server, self.faction, item)?;
            let data = CachedItem {
                name: fetched.name,
                market_value: fetched.market_value.unwrap_or(0),
            };
            info!(
                %item,
                name = %data.name,
                server = %self.server,
                faction = %self.faction,
                "fetched market data"
            );
            self.entries.insert(key.clone(), data);
            self.save()?;
        }
        Ok(&self.entries[&key])
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(&self.entries)?)?;
        debug!(count = self.entries.len(), path = %self.path.display(), "saved price cache");
        Ok(())
    }
}
