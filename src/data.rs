//! Data loading functionality for Craftpath.
//!
//! This module reads recipe catalogs from JSON files in the data directory,
//! resolves reagent prices through the [`PriceCache`], and holds the
//! built-in profession presets. It can also import a catalog from a spell
//! list page that embeds a `listviewspells` array.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::market::{MarketDataProvider, NexusHubClient, PriceCache};
use crate::models::{CatalogEntry, DifficultyBand, ItemId, Reagent, Recipe, RecipeId};
use crate::optimizer::{Profession, ProfessionConfig};

/// Professions with a built-in preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfessionKind {
    Enchanting,
    Engineering,
}

impl ProfessionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProfessionKind::Enchanting => "enchanting",
            ProfessionKind::Engineering => "engineering",
        }
    }

    /// File name of the catalog inside the data directory.
    pub fn catalog_file(&self) -> String {
        format!("{}.json", self.name())
    }

    /// Excluded recipes and level overrides for this profession.
    ///
    /// Enchanting forces each runed rod at the level where it becomes
    /// required, including the copper rod that is otherwise excluded.
    ///
    /// ```
    /// use craftpath::data::ProfessionKind;
    /// use craftpath::models::RecipeId;
    ///
    /// let config = ProfessionKind::Enchanting.config();
    /// assert_eq!(config.overrides.get(&1), Some(&RecipeId(7421)));
    /// assert!(config.excluded.contains(&RecipeId(7421)));
    /// assert!(ProfessionKind::Engineering.config().overrides.is_empty());
    /// ```
    pub fn config(&self) -> ProfessionConfig {
        match self {
            ProfessionKind::Enchanting => ProfessionConfig::new(self.name())
                .with_excluded([42613, 28022, 45765, 7421].map(RecipeId))
                .with_overrides([
                    (1, RecipeId(7421)),     // Runed Copper Rod
                    (100, RecipeId(7795)),   // Runed Silver Rod
                    (155, RecipeId(13628)),  // Runed Golden Rod
                    (200, RecipeId(13702)),  // Runed Truesilver Rod
                    (299, RecipeId(20051)),  // Runed Arcanite Rod
                    (300, RecipeId(32664)),  // Runed Fel Iron Rod
                    (350, RecipeId(32665)),  // Runed Adamantite Rod
                ]),
            ProfessionKind::Engineering => ProfessionConfig::new(self.name()),
        }
    }
}

/// Loads catalog entries from a JSON file.
///
/// # Format
///
/// A JSON array of `{ "id", "name", "colors": [4 ints], "reagents": [[item, qty], ...] }`.
/// Extra fields are ignored.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(&fs::read_to_string(path)?)?;
    debug!(count = entries.len(), path = %path.display(), "loaded catalog");
    Ok(entries)
}

/// Turns catalog entries into priced recipes.
///
/// Entries without reagents are skipped. Every reagent is resolved through
/// `cache`, which may hit the market provider for unknown items.
///
/// # Returns
///
/// The recipes in catalog order and a lookup table of every reagent they use.
pub fn build_recipes<P: MarketDataProvider>(
    entries: &[CatalogEntry],
    cache: &mut PriceCache<P>,
) -> Result<(Vec<Recipe>, BTreeMap<ItemId, Reagent>)> {
    let mut recipes = Vec::new();
    let mut reagents: BTreeMap<ItemId, Reagent> = BTreeMap::new();

    for entry in entries {
        let Some(ref lines) = entry.reagents else {
            continue;
        };

        for &(item, _) in lines {
            let item = ItemId(item);
            if !reagents.contains_key(&item) {
                reagents.insert(item, cache.get_item(item)?);
            }
        }

        let resolved: Vec<(&Reagent, u32)> = lines
            .iter()
            .map(|&(item, quantity)| (&reagents[&ItemId(item)], quantity))
            .collect();
        recipes.push(Recipe::new(
            RecipeId(entry.id),
            entry.name.clone(),
            DifficultyBand::from_colors(entry.colors),
            &resolved,
        )?);
    }

    Ok((recipes, reagents))
}

/// Loads the catalog for `kind` from `data_dir` and computes its leveling path.
pub fn load_profession<P: MarketDataProvider>(
    kind: ProfessionKind,
    data_dir: &Path,
    cache: &mut PriceCache<P>,
    max_level: u32,
) -> Result<Profession> {
    let entries = load_catalog(&catalog_path(data_dir, kind))?;
    let (recipes, reagents) = build_recipes(&entries, cache)?;
    info!(
        profession = kind.name(),
        recipes = recipes.len(),
        reagents = reagents.len(),
        "built recipes"
    );
    Profession::new(kind.config().with_max_level(max_level), recipes, reagents)
}

/// Extracts the `listviewspells` array embedded in a spell list page.
///
/// Only the first JSON value after the assignment is parsed; the rest of
/// the script is ignored.
///
/// ```
/// use craftpath::data::extract_listview_spells;
///
/// let html = r#"<script>var listviewspells = [{"id": 1, "name": "Rod", "colors": [1, 5, 7, 10]}];
/// new Listview({});</script>"#;
/// let entries = extract_listview_spells(html).unwrap();
/// assert_eq!(entries.len(), 1);
/// assert!(entries[0].reagents.is_none());
/// ```
pub fn extract_listview_spells(html: &str) -> Result<Vec<CatalogEntry>> {
    let (_, after_name) = html.split_once("listviewspells").ok_or(Error::MissingListview)?;
    let (_, value) = after_name.split_once('=').ok_or(Error::MissingListview)?;
    let mut stream = serde_json::Deserializer::from_str(value).into_iter::<Vec<CatalogEntry>>();
    match stream.next() {
        Some(entries) => Ok(entries?),
        None => Err(Error::MissingListview),
    }
}

/// Downloads a spell list page and writes its recipes as a catalog file.
///
/// # Returns
///
/// The number of entries written.
pub fn import_catalog(client: &NexusHubClient, url: &str, dest: &Path) -> Result<usize> {
    let html = client.fetch_page(url)?;
    let entries = extract_listview_spells(&html)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, serde_json::to_string_pretty(&entries)?)?;
    info!(count = entries.len(), path = %dest.display(), "imported catalog");
    Ok(entries.len())
}

/// Default spell list page for a profession.
pub fn catalog_url(kind: ProfessionKind) -> String {
    format!("https://www.wowhead.com/wotlk/spells/professions/{}", kind.name())
}

/// Path of the catalog file for `kind` in `data_dir`.
pub fn catalog_path(data_dir: &Path, kind: ProfessionKind) -> PathBuf {
    data_dir.join(kind.catalog_file())
}
