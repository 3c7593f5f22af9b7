//! Data models and structures for Craftpath.
//!
//! This module contains the identifiers, items and recipes used throughout
//! the crate, together with the per-recipe skill-up cost model and the raw
//! catalog rows read from disk.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::currency::CurrencyAmount;
use crate::error::{Error, Result};

/// A profession skill level.
pub type SkillLevel = u32;

/// Cost reported for a recipe that can no longer grant a skill-up.
///
/// Large but finite so such recipes still sort after every real option.
pub const UNREACHABLE_COST: u64 = (1 << 31) - 1;

/// Identifier of a tradeable item, as assigned by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a recipe (the spell id of the craft).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub u32);

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Auction house faction. Each faction has its own market on a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Horde,
    Alliance,
}

impl Faction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Horde => "horde",
            Faction::Alliance => "alliance",
        }
    }
}

impl FromStr for Faction {
    type Err = Error;

    /// Parses a faction name, ignoring case.
    ///
    /// ```
    /// use craftpath::models::Faction;
    ///
    /// assert_eq!("Horde".parse::<Faction>().unwrap(), Faction::Horde);
    /// assert!("scourge".parse::<Faction>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "horde" => Ok(Faction::Horde),
            "alliance" => Ok(Faction::Alliance),
            _ => Err(Error::InvalidFaction(s.to_string())),
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A priced item consumed by recipes.
///
/// Reagents are compared and keyed by [`ItemId`] only; the name and price
/// travel alongside in lookup tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Reagent {
    pub id: ItemId,
    pub name: String,
    pub price: CurrencyAmount,
}

impl Reagent {
    pub fn new(id: ItemId, name: impl Into<String>, price: CurrencyAmount) -> Self {
        Self {
            id,
            name: name.into(),
            price,
        }
    }

    /// Plain record with the price expressed in copper.
    ///
    /// ```
    /// use craftpath::currency::CurrencyAmount;
    /// use craftpath::models::{ItemId, Reagent};
    ///
    /// let reagent = Reagent::new(ItemId(7421), "foo", CurrencyAmount::from_copper(1234));
    /// let json = serde_json::to_value(reagent.to_record()).unwrap();
    /// assert_eq!(json, serde_json::json!({"id": 7421, "name": "foo", "price": 1234}));
    /// ```
    pub fn to_record(&self) -> ReagentRecord {
        ReagentRecord {
            id: self.id,
            name: self.name.clone(),
            price: self.price.to_copper(),
        }
    }
}

/// Serializable view of a [`Reagent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReagentRecord {
    pub id: ItemId,
    pub name: String,
    pub price: u64,
}

/// Serializable view of a reagent line inside a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeReagentRecord {
    pub id: ItemId,
    pub name: String,
    pub price: u64,
    pub quantity: u32,
}

/// Serializable view of a [`Recipe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeRecord {
    pub id: RecipeId,
    pub name: String,
    pub reagents: Vec<RecipeReagentRecord>,
}

/// The four skill thresholds that color a recipe in the profession window.
///
/// - at or below `orange` the recipe cannot be attempted for skill
/// - between `yellow` and `gray` the skill-up chance falls linearly to zero
/// - at or above `gray` the recipe is trivial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyBand {
    pub orange: SkillLevel,
    pub yellow: SkillLevel,
    pub green: SkillLevel,
    pub gray: SkillLevel,
}

impl DifficultyBand {
    pub fn new(orange: SkillLevel, yellow: SkillLevel, green: SkillLevel, gray: SkillLevel) -> Self {
        Self {
            orange,
            yellow,
            green,
            gray,
        }
    }

    pub fn from_colors(colors: [SkillLevel; 4]) -> Self {
        Self::new(colors[0], colors[1], colors[2], colors[3])
    }

    pub fn colors(&self) -> [SkillLevel; 4] {
        [self.orange, self.yellow, self.green, self.gray]
    }

    /// `true` when the thresholds never decrease.
    pub fn is_ordered(&self) -> bool {
        self.orange <= self.yellow && self.yellow <= self.green && self.green <= self.gray
    }
}

/// A craftable recipe with its reagent quantities and derived price.
///
/// # Example
///
/// ```
/// use craftpath::currency::CurrencyAmount;
/// use craftpath::models::{DifficultyBand, ItemId, Reagent, Recipe, RecipeId};
///
/// let dust = Reagent::new(ItemId(10940), "Strange Dust", CurrencyAmount::from_copper(150));
/// let recipe = Recipe::new(
///     RecipeId(7418),
///     "Enchant Bracer - Minor Health",
///     DifficultyBand::new(1, 70, 90, 110),
///     &[(&dust, 1)],
/// )
/// .unwrap();
///
/// assert_eq!(recipe.price.to_copper(), 150);
/// assert_eq!(recipe.quantity(ItemId(10940)), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    /// Quantity required per craft, keyed by reagent.
    pub reagents: BTreeMap<ItemId, u32>,
    pub band: DifficultyBand,
    /// Sum of reagent price times quantity.
    pub price: CurrencyAmount,
}

impl Recipe {
    /// Builds a recipe from resolved reagents, summing their prices.
    ///
    /// A reagent listed twice keeps the last quantity.
    pub fn new(
        id: RecipeId,
        name: impl Into<String>,
        band: DifficultyBand,
        reagents: &[(&Reagent, u32)],
    ) -> Result<Self> {
        let name = name.into();
        if !band.is_ordered() {
            return Err(Error::InvalidBand {
                id,
                name,
                colors: band.colors(),
            });
        }

        let mut lines: BTreeMap<ItemId, (CurrencyAmount, u32)> = BTreeMap::new();
        for (reagent, quantity) in reagents {
            lines.insert(reagent.id, (reagent.price, *quantity));
        }
        let price: CurrencyAmount = lines
            .values()
            .map(|(price, quantity)| *price * u64::from(*quantity))
            .sum();

        Ok(Self {
            id,
            name,
            reagents: lines.into_iter().map(|(id, (_, quantity))| (id, quantity)).collect(),
            band,
            price,
        })
    }

    pub fn quantity(&self, item: ItemId) -> Option<u32> {
        self.reagents.get(&item).copied()
    }

    pub fn reagent_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.reagents.keys().copied()
    }

    /// The recipe only counts for skill strictly above its orange threshold.
    pub fn can_attempt(&self, level: SkillLevel) -> bool {
        level > self.band.orange
    }

    pub fn can_receive_skillup(&self, level: SkillLevel) -> bool {
        level < self.band.gray
    }

    /// Chance that one craft at `level` grants a skill point.
    ///
    /// Guaranteed at the orange threshold, otherwise
    /// `(gray - level) / (gray - yellow)`. The value is not clamped: it
    /// exceeds 1 below yellow and turns negative above gray.
    ///
    /// ```
    /// use craftpath::models::{DifficultyBand, Recipe, RecipeId};
    ///
    /// let rod = Recipe::new(RecipeId(7421), "Runed Copper Rod", DifficultyBand::new(1, 5, 7, 10), &[]).unwrap();
    /// assert_eq!(rod.levelup_probability(1).unwrap(), 1.0);
    /// assert_eq!(rod.levelup_probability(6).unwrap(), 0.8);
    /// ```
    pub fn levelup_probability(&self, level: SkillLevel) -> Result<f64> {
        let band = &self.band;
        if level == band.orange {
            return Ok(1.0);
        }
        if band.gray == band.yellow {
            return Err(Error::DegenerateBand {
                id: self.id,
                name: self.name.clone(),
                threshold: band.gray,
            });
        }
        Ok((f64::from(band.gray) - f64::from(level)) / (f64::from(band.gray) - f64::from(band.yellow)))
    }

    /// Average crafts needed for one skill point at `level`, rounded half to even.
    ///
    /// `None` when the recipe cannot grant a skill point at all (zero or
    /// negative probability).
    pub fn expected_attempts_per_skillup(&self, level: SkillLevel) -> Result<Option<u64>> {
        let probability = self.levelup_probability(level)?;
        if probability <= 0.0 {
            return Ok(None);
        }
        Ok(Some((1.0 / probability).round_ties_even() as u64))
    }

    /// Expected spend for one skill point at `level`.
    ///
    /// Returns [`UNREACHABLE_COST`] when the probability is not positive.
    pub fn cost_for_skillup(&self, level: SkillLevel) -> Result<CurrencyAmount> {
        let probability = self.levelup_probability(level)?;
        if probability <= 0.0 {
            return Ok(CurrencyAmount::from_copper(UNREACHABLE_COST));
        }
        Ok(self.price.div_f64(probability))
    }

    /// Plain record with reagent names and prices looked up in `reagents`.
    ///
    /// Reagents missing from the table are left out.
    pub fn to_record(&self, reagents: &BTreeMap<ItemId, Reagent>) -> RecipeRecord {
        RecipeRecord {
            id: self.id,
            name: self.name.clone(),
            reagents: self
                .reagents
                .iter()
                .filter_map(|(id, quantity)| {
                    reagents.get(id).map(|reagent| RecipeReagentRecord {
                        id: *id,
                        name: reagent.name.clone(),
                        price: reagent.price.to_copper(),
                        quantity: *quantity,
                    })
                })
                .collect(),
        }
    }
}

// ============================================================================
// Catalog Row Structures
// ============================================================================

/// One entry of a recipe catalog file.
///
/// Entries without `reagents` describe crafts that cannot be made from
/// bought materials and are skipped when recipes are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Spell id of the recipe
    pub id: u32,
    /// Display name
    pub name: String,
    /// Orange, yellow, green and gray thresholds
    pub colors: [SkillLevel; 4],
    /// `[item id, quantity]` pairs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reagents: Option<Vec<(u32, u32)>>,
    /// Level the recipe is learned at (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learnedat: Option<i64>,
}
