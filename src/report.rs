//! Reports derived from a computed leveling path.
//!
//! All reports look at the crafts made below a target level: the recipe
//! chosen at level `L` is what gets crafted to reach `L + 1`. Attempt counts
//! for that craft are taken at `L + 1`, and gaps in the path are skipped.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::currency::CurrencyAmount;
use crate::error::Result;
use crate::models::{ItemId, Recipe, RecipeId, SkillLevel};
use crate::optimizer::{LevelingPath, Profession};

/// A run of consecutive levels that craft the same recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment {
    /// First level of the run
    pub start: SkillLevel,
    /// Last level of the run (inclusive)
    pub end: SkillLevel,
    pub recipe: RecipeId,
    /// Number of levels in the run
    pub count: u32,
}

impl PathSegment {
    /// Recipe price times the number of levels in the run.
    pub fn cost(&self, recipe: &Recipe) -> CurrencyAmount {
        recipe.price * u64::from(self.count)
    }

    pub fn to_record(&self, recipe: &Recipe) -> SegmentRecord {
        SegmentRecord {
            start: self.start,
            end: self.end,
            recipe_id: self.recipe,
            recipe_name: recipe.name.clone(),
            count: self.count,
            cost: self.cost(recipe).to_copper(),
        }
    }
}

/// Serializable view of a [`PathSegment`]; `cost` is in copper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentRecord {
    pub start: SkillLevel,
    pub end: SkillLevel,
    pub recipe_id: RecipeId,
    pub recipe_name: String,
    pub count: u32,
    pub cost: u64,
}

/// Total quantity of one reagent needed to reach a target.
#[derive(Debug, Clone, PartialEq)]
pub struct ReagentTotal {
    pub id: ItemId,
    pub name: String,
    pub price: CurrencyAmount,
    pub quantity: u64,
}

impl ReagentTotal {
    pub fn to_record(&self) -> ReagentTotalRecord {
        ReagentTotalRecord {
            id: self.id,
            price: self.price.to_copper(),
            name: self.name.clone(),
            quantity: self.quantity,
        }
    }
}

/// Serializable view of a [`ReagentTotal`]; `price` is in copper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReagentTotalRecord {
    pub id: ItemId,
    pub price: u64,
    pub name: String,
    pub quantity: u64,
}

/// Serializable total cost, in copper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TotalCostRecord {
    pub total_cost: u64,
}

/// Run-length encodes the path below `target`.
///
/// A gap ends the current run.
///
/// # Example
///
/// ```
/// use craftpath::models::RecipeId;
/// use craftpath::optimizer::LevelingPath;
/// use craftpath::report::segments;
///
/// let (a, b) = (Some(RecipeId(1)), Some(RecipeId(2)));
/// let path = LevelingPath::from_steps(vec![a, a, b, b, b]);
/// let runs = segments(&path, 6);
///
/// assert_eq!(runs.len(), 2);
/// assert_eq!((runs[0].start, runs[0].end, runs[0].count), (1, 2, 2));
/// assert_eq!((runs[1].start, runs[1].end, runs[1].count), (3, 5, 3));
/// ```
pub fn segments(path: &LevelingPath, target: SkillLevel) -> Vec<PathSegment> {
    let mut runs: Vec<PathSegment> = Vec::new();
    let mut previous: Option<RecipeId> = None;

    for (level, step) in path.up_to(target) {
        let Some(id) = step else {
            previous = None;
            continue;
        };
        match runs.last_mut() {
            Some(run) if previous == Some(id) => {
                run.end = level;
                run.count += 1;
            }
            _ => runs.push(PathSegment {
                start: level,
                end: level,
                recipe: id,
                count: 1,
            }),
        }
        previous = Some(id);
    }

    runs
}

/// Crafts of `recipe` expected for the skill point earned at `level`.
///
/// Uses the attempt count at `level + 1`. If the recipe cannot grant a
/// point there, falls back to the count at `level`, then to one craft.
pub fn transition_attempts(recipe: &Recipe, level: SkillLevel) -> Result<u64> {
    if let Some(attempts) = recipe.expected_attempts_per_skillup(level + 1)? {
        return Ok(attempts);
    }
    Ok(recipe.expected_attempts_per_skillup(level)?.unwrap_or(1))
}

/// Expected spend to go from level 1 to `target`.
pub fn total_cost(profession: &Profession, target: SkillLevel) -> Result<CurrencyAmount> {
    let mut total = CurrencyAmount::ZERO;
    for (level, recipe) in profession.cheapest_way_to(target) {
        total += recipe.price * transition_attempts(recipe, level)?;
    }
    Ok(total)
}

/// Adds two reagent quantity maps key by key.
///
/// ```
/// use std::collections::BTreeMap;
/// use craftpath::models::ItemId;
/// use craftpath::report::merge_quantities;
///
/// let a = BTreeMap::from([(ItemId(1), 2)]);
/// let b = BTreeMap::from([(ItemId(1), 1), (ItemId(2), 3)]);
/// assert_eq!(merge_quantities(&a, &b), BTreeMap::from([(ItemId(1), 3), (ItemId(2), 3)]));
/// ```
pub fn merge_quantities(
    a: &BTreeMap<ItemId, u64>,
    b: &BTreeMap<ItemId, u64>,
) -> BTreeMap<ItemId, u64> {
    let mut merged = a.clone();
    for (id, quantity) in b {
        *merged.entry(*id).or_insert(0) += quantity;
    }
    merged
}

/// Reagent quantities needed to go from level 1 to `target`, keyed by item.
pub fn reagent_quantities(
    profession: &Profession,
    target: SkillLevel,
) -> Result<BTreeMap<ItemId, u64>> {
    let mut totals = BTreeMap::new();
    for (level, recipe) in profession.cheapest_way_to(target) {
        let attempts = transition_attempts(recipe, level)?;
        let needed: BTreeMap<ItemId, u64> = recipe
            .reagents
            .iter()
            .map(|(id, quantity)| (*id, u64::from(*quantity) * attempts))
            .collect();
        totals = merge_quantities(&totals, &needed);
    }
    Ok(totals)
}

/// Reagent totals with names and prices, ordered by item id.
pub fn reagent_totals(profession: &Profession, target: SkillLevel) -> Result<Vec<ReagentTotal>> {
    Ok(reagent_quantities(profession, target)?
        .into_iter()
        .filter_map(|(id, quantity)| {
            profession.reagent(id).map(|reagent| ReagentTotal {
                id,
                name: reagent.name.clone(),
                price: reagent.price,
                quantity,
            })
        })
        .collect())
}
