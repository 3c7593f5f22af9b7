//! Leveling path optimization for Craftpath.
//!
//! For every skill level the optimizer picks the recipe with the lowest
//! expected cost per skill point, unless an override forces a specific
//! recipe. The path is computed once when a [`Profession`] is built.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::currency::CurrencyAmount;
use crate::error::Result;
use crate::models::{ItemId, Reagent, Recipe, RecipeId, SkillLevel};

/// Skill cap used when none is configured.
pub const DEFAULT_MAX_LEVEL: SkillLevel = 450;

/// Static settings of a profession.
///
/// # Example
///
/// ```
/// use craftpath::models::RecipeId;
/// use craftpath::optimizer::ProfessionConfig;
///
/// let config = ProfessionConfig::new("tailoring")
///     .with_max_level(300)
///     .with_excluded([RecipeId(3915)])
///     .with_overrides([(75, RecipeId(3914))]);
///
/// assert_eq!(config.max_level, 300);
/// assert!(config.excluded.contains(&RecipeId(3915)));
/// assert_eq!(config.overrides[&75], RecipeId(3914));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProfessionConfig {
    pub name: String,
    /// Skill cap; recipes are chosen for levels `1..max_level`.
    pub max_level: SkillLevel,
    /// Recipes that are never chosen by cost.
    pub excluded: HashSet<RecipeId>,
    /// Recipes forced at given levels, bypassing cost and eligibility.
    pub overrides: BTreeMap<SkillLevel, RecipeId>,
}

impl ProfessionConfig {
    /// A config with the default cap, no exclusions and no overrides.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_level: DEFAULT_MAX_LEVEL,
            excluded: HashSet::new(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_max_level(mut self, max_level: SkillLevel) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_excluded(mut self, excluded: impl IntoIterator<Item = RecipeId>) -> Self {
        self.excluded.extend(excluded);
        self
    }

    pub fn with_overrides(
        mut self,
        overrides: impl IntoIterator<Item = (SkillLevel, RecipeId)>,
    ) -> Self {
        self.overrides.extend(overrides);
        self
    }
}

/// The recipe chosen at each skill level, starting at level 1.
///
/// A level with no usable recipe is kept as a gap so later levels keep
/// their position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelingPath {
    steps: Vec<Option<RecipeId>>,
}

impl LevelingPath {
    /// Builds a path from per-level choices, the first entry being level 1.
    pub fn from_steps(steps: Vec<Option<RecipeId>>) -> Self {
        Self { steps }
    }

    /// Number of levels covered, gaps included.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn recipe_at(&self, level: SkillLevel) -> Option<RecipeId> {
        let index = (level as usize).checked_sub(1)?;
        self.steps.get(index).copied().flatten()
    }

    /// Every covered level with its choice, gaps as `None`.
    pub fn levels(&self) -> impl Iterator<Item = (SkillLevel, Option<RecipeId>)> + '_ {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| (i as SkillLevel + 1, *step))
    }

    /// Levels below `target`, i.e. the crafts needed to reach `target`.
    pub fn up_to(&self, target: SkillLevel) -> impl Iterator<Item = (SkillLevel, Option<RecipeId>)> + '_ {
        self.levels().take_while(move |(level, _)| *level < target)
    }

    /// Levels that have a recipe.
    pub fn iter(&self) -> impl Iterator<Item = (SkillLevel, RecipeId)> + '_ {
        self.levels().filter_map(|(level, step)| step.map(|id| (level, id)))
    }

    /// Levels for which no recipe could be chosen.
    pub fn gaps(&self) -> Vec<SkillLevel> {
        self.levels()
            .filter(|(_, step)| step.is_none())
            .map(|(level, _)| level)
            .collect()
    }
}

/// Recipes that can be crafted for a skill point at `level`.
///
/// A recipe qualifies when `level` is above its orange threshold, below its
/// gray threshold, and it is not excluded.
pub fn eligible_recipes<'a, 'b>(
    recipes: &'a [Recipe],
    level: SkillLevel,
    excluded: &'b HashSet<RecipeId>,
) -> impl Iterator<Item = &'a Recipe> + 'b
where
    'a: 'b,
{
    recipes.iter().filter(move |recipe| {
        recipe.can_attempt(level) && recipe.can_receive_skillup(level) && !excluded.contains(&recipe.id)
    })
}

/// Finds the eligible recipe with the lowest expected cost per skill point.
///
/// Ties keep the recipe that comes first in `recipes`.
///
/// # Returns
///
/// `Ok(None)` when no recipe is eligible at `level`.
pub fn cheapest_recipe_at<'a>(
    recipes: &'a [Recipe],
    level: SkillLevel,
    excluded: &HashSet<RecipeId>,
) -> Result<Option<&'a Recipe>> {
    let mut best: Option<(CurrencyAmount, &Recipe)> = None;
    for recipe in eligible_recipes(recipes, level, excluded) {
        let cost = recipe.cost_for_skillup(level)?;
        match best {
            Some((best_cost, _)) if best_cost <= cost => {}
            _ => best = Some((cost, recipe)),
        }
    }
    Ok(best.map(|(_, recipe)| recipe))
}

/// Chooses a recipe for every level from 1 up to (excluding) the cap.
///
/// Overrides win outright. Levels without an eligible recipe, or whose
/// override names a recipe that is not in `recipes`, become gaps.
pub fn compute_leveling_path(recipes: &[Recipe], config: &ProfessionConfig) -> Result<LevelingPath> {
    let mut steps = Vec::with_capacity(config.max_level.saturating_sub(1) as usize);

    for level in 1..config.max_level {
        let step = match config.overrides.get(&level) {
            Some(&id) => {
                if recipes.iter().any(|recipe| recipe.id == id) {
                    Some(id)
                } else {
                    warn!(level, recipe = %id, "override names a recipe missing from the catalog");
                    None
                }
            }
            None => match cheapest_recipe_at(recipes, level, &config.excluded)? {
                Some(recipe) => Some(recipe.id),
                None => {
                    warn!(level, "failed to find a suitable recipe");
                    None
                }
            },
        };
        debug!(level, recipe = ?step, "selected");
        steps.push(step);
    }

    Ok(LevelingPath::from_steps(steps))
}

/// A profession with its recipes and the cheapest leveling path through them.
#[derive(Debug, Clone)]
pub struct Profession {
    config: ProfessionConfig,
    recipes: Vec<Recipe>,
    index: HashMap<RecipeId, usize>,
    reagents: BTreeMap<ItemId, Reagent>,
    path: LevelingPath,
}

impl Profession {
    /// Stores the recipes and computes the leveling path.
    ///
    /// Fails when a recipe evaluated along the way has a degenerate band.
    pub fn new(
        config: ProfessionConfig,
        recipes: Vec<Recipe>,
        reagents: BTreeMap<ItemId, Reagent>,
    ) -> Result<Self> {
        let path = compute_leveling_path(&recipes, &config)?;
        let mut index = HashMap::with_capacity(recipes.len());
        for (i, recipe) in recipes.iter().enumerate() {
            index.entry(recipe.id).or_insert(i);
        }

        Ok(Self {
            config,
            recipes,
            index,
            reagents,
            path,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ProfessionConfig {
        &self.config
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn reagents(&self) -> &BTreeMap<ItemId, Reagent> {
        &self.reagents
    }

    pub fn path(&self) -> &LevelingPath {
        &self.path
    }

    /// Looks a recipe up by id. With duplicate ids the first one wins.
    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.index.get(&id).map(|&i| &self.recipes[i])
    }

    pub fn reagent(&self, id: ItemId) -> Option<&Reagent> {
        self.reagents.get(&id)
    }

    /// The recipe crafted at each level below `target`, skipping gaps.
    pub fn cheapest_way_to(&self, target: SkillLevel) -> Vec<(SkillLevel, &Recipe)> {
        self.path
            .up_to(target)
            .filter_map(|(level, step)| Some((level, self.recipe(step?)?)))
            .collect()
    }
}
