//! # Craftpath
//!
//! A command-line tool and library for finding the cheapest way to level a
//! crafting profession with live auction house prices.
//!
//! For every skill level the optimizer picks the recipe with the lowest
//! expected cost per skill point, based on:
//!
//! - Reagent prices from the auction house (cached on disk)
//! - Each recipe's difficulty thresholds and the resulting skill-up chance
//! - Recipes that must be crafted at given levels (overrides)
//! - Recipes that must never be used (exclusions)
//!
//! ## Modules
//!
//! - [`currency`] - Gold/silver/copper amounts
//! - [`models`] - Items, recipes and the skill-up cost model
//! - [`market`] - Market data provider and the persistent price cache
//! - [`data`] - Catalog loading and profession presets
//! - [`optimizer`] - Per-level recipe selection
//! - [`report`] - Path segments, total cost and reagent totals
//! - [`display`] - Human-readable, JSON and CSV output
//!
//! ## Example Usage
//!
//! ```no_run
//! use craftpath::{
//!     data::{load_profession, ProfessionKind},
//!     market::{NexusHubClient, PriceCache},
//!     models::Faction,
//!     report::total_cost,
//! };
//! use std::path::Path;
//!
//! let client = NexusHubClient::new().unwrap();
//! let mut cache = PriceCache::open(Path::new("."), "faerlina", Faction::Horde, client).unwrap();
//!
//! // Load the enchanting catalog and compute the cheapest path to 450
//! let profession =
//!     load_profession(ProfessionKind::Enchanting, Path::new("data"), &mut cache, 450).unwrap();
//!
//! println!("It costs {} to reach 300", total_cost(&profession, 300).unwrap());
//! ```
//!
//! ## Skill-up Model
//!
//! A recipe can be crafted for skill strictly above its orange threshold and
//! below its gray threshold. The chance of a skill point at level `L` is
//! `(gray - L) / (gray - yellow)`, so a recipe's expected cost per point is
//! its reagent price divided by that chance.

pub mod currency;
pub mod data;
pub mod display;
pub mod error;
pub mod market;
pub mod models;
pub mod optimizer;
pub mod report;

pub use error::{Error, Result};
