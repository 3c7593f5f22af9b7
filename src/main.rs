//! Craftpath - Command Line Interface
//!
//! This is the main entry point for the profession leveling optimizer.
//! Run with `--help` to see all available options.

use clap::{Parser, ValueEnum};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use craftpath::{
    data::{catalog_path, catalog_url, import_catalog, load_profession, ProfessionKind},
    display::{write_path, write_reagents, write_total_cost, OutputFormat},
    market::{NexusHubClient, PriceCache},
    models::Faction,
    optimizer::DEFAULT_MAX_LEVEL,
    report::{reagent_totals, segments, total_cost},
};

/// What to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Command {
    /// Reagents to buy to reach the target level
    Reagents,
    /// Recipes to craft, grouped into runs
    Path,
    /// Expected spend to reach the target level
    TotalCost,
    /// Download the recipe catalog for the profession
    ImportCatalog,
}

/// Command-line arguments for Craftpath.
#[derive(Parser, Debug)]
#[command(name = "craftpath")]
#[command(author, version, about = "Find the cheapest way to level a crafting profession", long_about = None)]
struct Args {
    /// Server slug (e.g. faerlina)
    #[arg(long, default_value = "faerlina")]
    server: String,

    /// Faction whose auction house to price against (horde or alliance)
    #[arg(long, default_value = "horde")]
    faction: String,

    /// Profession to level
    #[arg(long, value_enum, default_value_t = ProfessionKind::Enchanting)]
    profession: ProfessionKind,

    /// Skill level to reach
    #[arg(long, default_value_t = DEFAULT_MAX_LEVEL)]
    target_level: u32,

    /// Report to print
    #[arg(long, value_enum, default_value_t = Command::Reagents)]
    command: Command,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    format: OutputFormat,

    /// Directory holding the recipe catalogs
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory holding the price caches and the server list
    #[arg(long, default_value = ".")]
    cache_dir: PathBuf,

    /// Skill cap of the profession
    #[arg(long, default_value_t = DEFAULT_MAX_LEVEL)]
    max_level: u32,

    /// Spell list page to import the catalog from
    #[arg(long)]
    catalog_url: Option<String>,

    /// Do not check the server against the server list
    #[arg(long, default_value = "false")]
    skip_server_check: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Logging goes to stderr so reports can be piped
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let faction: Faction = args.faction.parse()?;
    let client = NexusHubClient::new()?;

    match args.command {
        Command::ImportCatalog => import(&args, &client),
        _ => report(&args, client, faction),
    }
}

fn import(args: &Args, client: &NexusHubClient) -> Result<(), Box<dyn Error>> {
    let url = args
        .catalog_url
        .clone()
        .unwrap_or_else(|| catalog_url(args.profession));
    let dest = catalog_path(&args.data_dir, args.profession);
    let count = import_catalog(client, &url, &dest)?;
    println!("Imported {} recipes into {}", count, dest.display());
    Ok(())
}

fn report(args: &Args, client: NexusHubClient, faction: Faction) -> Result<(), Box<dyn Error>> {
    if !args.skip_server_check {
        let server = args.server.to_lowercase();
        let servers = client.servers(&args.cache_dir)?;
        if !servers.contains(&server) {
            return Err(craftpath::Error::UnknownServer(args.server.clone()).into());
        }
    }

    let catalog = catalog_path(&args.data_dir, args.profession);
    if !catalog.exists() {
        eprintln!(
            "Error: catalog '{}' not found. Run with `--command import-catalog` first.",
            catalog.display()
        );
        std::process::exit(1);
    }

    let mut cache = PriceCache::open(&args.cache_dir, &args.server, faction, client)?;
    let profession = load_profession(args.profession, &args.data_dir, &mut cache, args.max_level)?;
    info!(
        profession = profession.name(),
        levels = profession.path().len(),
        gaps = profession.path().gaps().len(),
        cached_items = cache.len(),
        "computed leveling path"
    );

    let target = args.target_level;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.command {
        Command::Reagents => {
            let totals = reagent_totals(&profession, target)?;
            write_reagents(&mut out, &totals, target, args.format)?;
        }
        Command::Path => {
            let runs = segments(profession.path(), target);
            write_path(&mut out, &profession, &runs, target, args.format)?;
        }
        Command::TotalCost => {
            let total = total_cost(&profession, target)?;
            write_total_cost(&mut out, total, target, args.format)?;
        }
        Command::ImportCatalog => {}
    }

    Ok(())
}
