//! Tests for the persistent price cache.

use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use craftpath::market::{cache_file_path, MarketDataProvider, MarketItem, PriceCache};
use craftpath::models::{Faction, ItemId};
use craftpath::{Error, Result};

/// Serves canned items and counts how often it is asked.
struct FakeMarket {
    items: HashMap<u32, MarketItem>,
    calls: Cell<usize>,
}

impl FakeMarket {
    fn new() -> Self {
        let mut items = HashMap::new();
        items.insert(
            34052,
            MarketItem {
                name: "Dream Shard".to_string(),
                market_value: Some(154_358),
            },
        );
        items.insert(
            10940,
            MarketItem {
                name: "Strange Dust".to_string(),
                market_value: None,
            },
        );
        Self {
            items,
            calls: Cell::new(0),
        }
    }
}

impl MarketDataProvider for FakeMarket {
    fn fetch_item(&self, _server: &str, _faction: Faction, item: ItemId) -> Result<MarketItem> {
        self.calls.set(self.calls.get() + 1);
        self.items
            .get(&item.0)
            .cloned()
            .ok_or_else(|| Error::Io(io::Error::new(io::ErrorKind::NotFound, "no such item")))
    }
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("craftpath-market-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn test_second_lookup_is_served_from_cache() {
    let dir = temp_dir("idempotent");
    let market = FakeMarket::new();
    let mut cache = PriceCache::open(&dir, "sulfuras", Faction::Horde, &market).unwrap();

    let first = cache.get_price(ItemId(34052)).unwrap();
    assert_eq!(market.calls.get(), 1);

    let second = cache.get_price(ItemId(34052)).unwrap();
    assert_eq!(second, first);
    assert_eq!(market.calls.get(), 1);

    assert_eq!(cache.get_name(ItemId(34052)).unwrap(), "Dream Shard");
    assert_eq!(market.calls.get(), 1);
    assert_eq!(first.to_copper(), 154_358);
}

#[test]
fn test_no_listings_is_price_zero() {
    let dir = temp_dir("no-listings");
    let market = FakeMarket::new();
    let mut cache = PriceCache::open(&dir, "sulfuras", Faction::Horde, &market).unwrap();

    let reagent = cache.get_item(ItemId(10940)).unwrap();
    assert_eq!(reagent.id, ItemId(10940));
    assert_eq!(reagent.name, "Strange Dust");
    assert_eq!(reagent.price.to_copper(), 0);
}

#[test]
fn test_miss_persists_whole_cache() {
    let dir = temp_dir("persist");
    let market = FakeMarket::new();
    let mut cache = PriceCache::open(&dir, "Sulfuras", Faction::Horde, &market).unwrap();
    assert!(cache.is_empty());

    cache.get_price(ItemId(34052)).unwrap();
    cache.get_price(ItemId(10940)).unwrap();
    assert_eq!(cache.len(), 2);

    let path = dir.join("item_cache_sulfuras_horde.json");
    assert_eq!(cache.path(), path.as_path());
    assert_eq!(cache.server(), "sulfuras");

    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        stored,
        serde_json::json!({
            "34052": {"name": "Dream Shard", "marketValue": 154358},
            "10940": {"name": "Strange Dust", "marketValue": 0}
        })
    );
}

#[test]
fn test_reopened_cache_needs_no_provider() {
    let dir = temp_dir("reopen");
    let market = FakeMarket::new();
    {
        let mut cache = PriceCache::open(&dir, "sulfuras", Faction::Alliance, &market).unwrap();
        cache.get_price(ItemId(34052)).unwrap();
    }

    let fresh = FakeMarket::new();
    let mut cache = PriceCache::open(&dir, "sulfuras", Faction::Alliance, &fresh).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get_price(ItemId(34052)).unwrap().to_copper(), 154_358);
    assert_eq!(fresh.calls.get(), 0);
}

#[test]
fn test_factions_have_separate_files() {
    let dir = temp_dir("factions");
    let horde = cache_file_path(&dir, "Faerlina", Faction::Horde);
    let alliance = cache_file_path(&dir, "faerlina", Faction::Alliance);

    assert_eq!(horde, dir.join("item_cache_faerlina_horde.json"));
    assert_eq!(alliance, dir.join("item_cache_faerlina_alliance.json"));
}

#[test]
fn test_reads_existing_cache_file() {
    let dir = temp_dir("existing");
    fs::write(
        dir.join("item_cache_faerlina_horde.json"),
        r#"{"22448": {"name": "Small Prismatic Shard", "marketValue": 1999}}"#,
    )
    .unwrap();

    let market = FakeMarket::new();
    let mut cache = PriceCache::open(&dir, "faerlina", Faction::Horde, &market).unwrap();
    let shard = cache.get_item(ItemId(22448)).unwrap();

    assert_eq!(shard.name, "Small Prismatic Shard");
    assert_eq!(shard.price.to_string(), "19s99cu");
    assert_eq!(market.calls.get(), 0);
}

#[test]
fn test_provider_failure_propagates() {
    let dir = temp_dir("failure");
    let market = FakeMarket::new();
    let mut cache = PriceCache::open(&dir, "sulfuras", Faction::Horde, &market).unwrap();

    assert!(cache.get_price(ItemId(1)).is_err());
    assert!(cache.is_empty());
    assert!(!dir.join("item_cache_sulfuras_horde.json").exists());

    // Not remembered as a failure either
    assert!(cache.get_price(ItemId(1)).is_err());
    assert_eq!(market.calls.get(), 2);
}
