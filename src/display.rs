//! Display and formatting utilities for Craftpath.
//!
//! Each report can be written as human-readable lines, as JSON, or as CSV.
//! The structured forms carry the same fields as the text form, with
//! amounts in copper.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use crate::currency::CurrencyAmount;
use crate::error::Result;
use crate::models::{Recipe, SkillLevel};
use crate::optimizer::Profession;
use crate::report::{PathSegment, ReagentTotal, TotalCostRecord};

const NAME_WIDTH: usize = 35;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    HumanReadable,
    Json,
    Csv,
}

/// Formats one path segment as a fixed-width line.
///
/// The level range shows the skill reached after the last craft, and the
/// cost is the recipe price times the number of levels in the run.
///
/// # Example
///
/// ```
/// use craftpath::currency::CurrencyAmount;
/// use craftpath::display::format_segment;
/// use craftpath::models::{DifficultyBand, ItemId, Reagent, Recipe, RecipeId};
/// use craftpath::report::PathSegment;
///
/// let rod = Reagent::new(ItemId(6217), "Copper Rod", CurrencyAmount::from_copper(124));
/// let recipe = Recipe::new(RecipeId(7421), "Runed Copper Rod", DifficultyBand::new(1, 5, 7, 10), &[(&rod, 1)]).unwrap();
/// let segment = PathSegment { start: 1, end: 4, recipe: recipe.id, count: 4 };
///
/// assert_eq!(
///     format_segment(&segment, &recipe),
///     "[  1-  5] Runed Copper Rod                    (x 4). Cost = 4s96cu"
/// );
/// ```
pub fn format_segment(segment: &PathSegment, recipe: &Recipe) -> String {
    let name: String = recipe.name.chars().take(NAME_WIDTH).collect();
    format!(
        "[{:3}-{:3}] {:width$} (x{:2}). Cost = {}",
        segment.start,
        segment.end + 1,
        name,
        segment.count,
        segment.cost(recipe),
        width = NAME_WIDTH
    )
}

/// Writes the reagent shopping list.
pub fn write_reagents<W: Write>(
    out: &mut W,
    totals: &[ReagentTotal],
    target: SkillLevel,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::HumanReadable => {
            writeln!(out, "Reagents required from 1-{}", target)?;
            for total in totals {
                writeln!(out, "{} x{}", total.name, total.quantity)?;
            }
        }
        OutputFormat::Json => {
            let records: Vec<_> = totals.iter().map(ReagentTotal::to_record).collect();
            write_json(out, &records)?;
        }
        OutputFormat::Csv => {
            write_csv(out, totals.iter().map(ReagentTotal::to_record))?;
        }
    }
    Ok(())
}

/// Writes the leveling path as runs of the same recipe.
///
/// Levels below `target` that have no recipe are reported in the
/// human-readable form only.
pub fn write_path<W: Write>(
    out: &mut W,
    profession: &Profession,
    segments: &[PathSegment],
    target: SkillLevel,
    format: OutputFormat,
) -> Result<()> {
    let resolved: Vec<(&PathSegment, &Recipe)> = segments
        .iter()
        .filter_map(|segment| profession.recipe(segment.recipe).map(|recipe| (segment, recipe)))
        .collect();

    match format {
        OutputFormat::HumanReadable => {
            let mut total = CurrencyAmount::ZERO;
            for (segment, recipe) in &resolved {
                writeln!(out, "{}", format_segment(segment, recipe))?;
                total += segment.cost(recipe);
            }
            let gaps: Vec<String> = profession
                .path()
                .gaps()
                .into_iter()
                .filter(|level| *level < target)
                .map(|level| level.to_string())
                .collect();
            if !gaps.is_empty() {
                writeln!(out, "[WARNING] No recipe found for levels: {}", gaps.join(", "))?;
            }
            writeln!(out, "{}", "=".repeat(10))?;
            writeln!(out, "Total cost = {}", total)?;
        }
        OutputFormat::Json => {
            let records: Vec<_> = resolved
                .iter()
                .map(|(segment, recipe)| segment.to_record(recipe))
                .collect();
            write_json(out, &records)?;
        }
        OutputFormat::Csv => {
            write_csv(
                out,
                resolved.iter().map(|(segment, recipe)| segment.to_record(recipe)),
            )?;
        }
    }
    Ok(())
}

/// Writes the total expected spend.
pub fn write_total_cost<W: Write>(
    out: &mut W,
    total: CurrencyAmount,
    target: SkillLevel,
    format: OutputFormat,
) -> Result<()> {
    let record = TotalCostRecord {
        total_cost: total.to_copper(),
    };
    match format {
        OutputFormat::HumanReadable => {
            writeln!(out, "It costs {} to go from 1-{}", total, target)?;
        }
        OutputFormat::Json => write_json(out, &record)?,
        OutputFormat::Csv => write_csv(out, [record])?,
    }
    Ok(())
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn write_csv<W: Write, T: Serialize>(out: &mut W, records: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
