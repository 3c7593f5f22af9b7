//! Tests for path segments, total cost and reagent totals.

use std::collections::BTreeMap;

use craftpath::currency::CurrencyAmount;
use craftpath::models::{DifficultyBand, ItemId, Reagent, Recipe, RecipeId};
use craftpath::optimizer::{LevelingPath, Profession, ProfessionConfig};
use craftpath::report::{
    merge_quantities, reagent_quantities, reagent_totals, segments, total_cost,
    transition_attempts,
};
use proptest::prelude::*;

/// One recipe usable from level 1 up to its gray threshold at 11.
///
/// Crafts one Mote (5, 50cu) and two Dusts (10, 25cu) for a price of 1s.
fn single_recipe_profession(max_level: u32) -> Profession {
    let mote = Reagent::new(ItemId(5), "Mote", CurrencyAmount::from_copper(50));
    let dust = Reagent::new(ItemId(10), "Dust", CurrencyAmount::from_copper(25));
    let recipe = Recipe::new(
        RecipeId(7421),
        "Runed Copper Rod",
        DifficultyBand::new(0, 1, 5, 11),
        &[(&dust, 2), (&mote, 1)],
    )
    .unwrap();
    let reagents = BTreeMap::from([(mote.id, mote), (dust.id, dust)]);
    let config = ProfessionConfig::new("enchanting").with_max_level(max_level);
    Profession::new(config, vec![recipe], reagents).unwrap()
}

#[test]
fn test_segments_group_consecutive_levels() {
    let (a, b) = (Some(RecipeId(1)), Some(RecipeId(2)));
    let path = LevelingPath::from_steps(vec![a, a, b, a]);
    let runs = segments(&path, 10);

    let shape: Vec<_> = runs.iter().map(|r| (r.start, r.end, r.recipe, r.count)).collect();
    assert_eq!(
        shape,
        vec![(1, 2, RecipeId(1), 2), (3, 3, RecipeId(2), 1), (4, 4, RecipeId(1), 1)]
    );
}

#[test]
fn test_gap_breaks_run() {
    let a = Some(RecipeId(1));
    let path = LevelingPath::from_steps(vec![a, a, None, a, a]);
    let runs = segments(&path, 6);

    assert_eq!(runs.len(), 2);
    assert_eq!((runs[0].start, runs[0].end, runs[0].count), (1, 2, 2));
    assert_eq!((runs[1].start, runs[1].end, runs[1].count), (4, 5, 2));
}

#[test]
fn test_segments_stop_below_target() {
    let a = Some(RecipeId(1));
    let path = LevelingPath::from_steps(vec![a; 10]);

    let runs = segments(&path, 4);
    assert_eq!(runs.len(), 1);
    assert_eq!((runs[0].start, runs[0].end, runs[0].count), (1, 3, 3));

    assert!(segments(&path, 1).is_empty());
    assert!(segments(&LevelingPath::default(), 450).is_empty());
}

#[test]
fn test_segment_cost_and_record() {
    let profession = single_recipe_profession(11);
    let runs = segments(profession.path(), 11);
    assert_eq!(runs.len(), 1);

    let recipe = profession.recipe(runs[0].recipe).unwrap();
    assert_eq!(runs[0].cost(recipe).to_copper(), 1_000);

    let json = serde_json::to_value(runs[0].to_record(recipe)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "start": 1,
            "end": 10,
            "recipe_id": 7421,
            "recipe_name": "Runed Copper Rod",
            "count": 10,
            "cost": 1000
        })
    );
}

#[test]
fn test_transition_attempts() {
    let profession = single_recipe_profession(11);
    let recipe = profession.recipe(RecipeId(7421)).unwrap();

    // Skill-up chance at the next level is 0.9
    assert_eq!(transition_attempts(recipe, 1).unwrap(), 1);
    // 0.4 gives 2.5, rounded half to even
    assert_eq!(transition_attempts(recipe, 6).unwrap(), 2);
    // Gray at 11, so the count at 10 is used
    assert_eq!(transition_attempts(recipe, 10).unwrap(), 10);
    // Gray at both levels
    assert_eq!(transition_attempts(recipe, 20).unwrap(), 1);
}

#[test]
fn test_total_cost() {
    let profession = single_recipe_profession(11);

    // 1 + 1 + 1 + 2 + 2 + 2 + 3 + 5 + 10 + 10 crafts at 1s each
    assert_eq!(total_cost(&profession, 11).unwrap().to_copper(), 3_700);
    assert_eq!(total_cost(&profession, 5).unwrap().to_copper(), 500);
    assert_eq!(total_cost(&profession, 1).unwrap(), CurrencyAmount::ZERO);
}

#[test]
fn test_total_cost_skips_gaps() {
    let profession = {
        let mote = Reagent::new(ItemId(5), "Mote", CurrencyAmount::from_copper(100));
        let recipe = Recipe::new(
            RecipeId(7421),
            "Runed Copper Rod",
            DifficultyBand::new(0, 1, 5, 11),
            &[(&mote, 1)],
        )
        .unwrap();
        let config = ProfessionConfig::new("enchanting")
            .with_max_level(11)
            .with_overrides([(2, RecipeId(404))]);
        Profession::new(config, vec![recipe], BTreeMap::from([(mote.id, mote)])).unwrap()
    };

    // Level 2 contributes nothing
    assert_eq!(total_cost(&profession, 5).unwrap().to_copper(), 400);
}

#[test]
fn test_reagent_totals() {
    let profession = single_recipe_profession(11);

    let quantities = reagent_quantities(&profession, 5).unwrap();
    assert_eq!(quantities, BTreeMap::from([(ItemId(5), 5), (ItemId(10), 10)]));

    let totals = reagent_totals(&profession, 5).unwrap();
    let summary: Vec<_> = totals
        .iter()
        .map(|t| (t.id, t.name.as_str(), t.price.to_copper(), t.quantity))
        .collect();
    assert_eq!(summary, vec![(ItemId(5), "Mote", 50, 5), (ItemId(10), "Dust", 25, 10)]);

    let json = serde_json::to_value(totals[0].to_record()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"id": 5, "price": 50, "name": "Mote", "quantity": 5})
    );
}

#[test]
fn test_reagent_totals_to_cap() {
    let profession = single_recipe_profession(11);
    let totals = reagent_totals(&profession, 11).unwrap();

    assert_eq!(totals[0].quantity, 37);
    assert_eq!(totals[1].quantity, 74);
    let spent: CurrencyAmount = totals.iter().map(|t| t.price * t.quantity).sum();
    assert_eq!(spent, total_cost(&profession, 11).unwrap());
}

fn quantities() -> impl Strategy<Value = BTreeMap<ItemId, u64>> {
    prop::collection::btree_map(0u32..8, 0u64..1_000, 0..6)
        .prop_map(|map| map.into_iter().map(|(id, qty)| (ItemId(id), qty)).collect())
}

proptest! {
    #[test]
    fn merge_is_commutative(a in quantities(), b in quantities()) {
        prop_assert_eq!(merge_quantities(&a, &b), merge_quantities(&b, &a));
    }

    #[test]
    fn merge_is_associative(a in quantities(), b in quantities(), c in quantities()) {
        prop_assert_eq!(
            merge_quantities(&merge_quantities(&a, &b), &c),
            merge_quantities(&a, &merge_quantities(&b, &c))
        );
    }

    #[test]
    fn merge_preserves_totals(a in quantities(), b in quantities()) {
        let merged = merge_quantities(&a, &b);
        let sum = |m: &BTreeMap<ItemId, u64>| m.values().sum::<u64>();
        prop_assert_eq!(sum(&merged), sum(&a) + sum(&b));
    }
}
