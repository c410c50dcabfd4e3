//! evac: nearest low-risk evacuation routes for a named area.
//!
//! Loads a road graph (osmnx-style node/edge CSV tables) and a flood-risk
//! region table, resolves the area given on the command line, and prints up
//! to `--routes` routes to the nearest distinct low-risk regions.
//!
//! ```text
//! evac --nodes nodes.csv --edges edges.csv --regions mumbai.csv "andheri east"
//! ```
//!
//! Exit status: 0 routes found, 1 area not recognised, 2 area recognised but
//! no low-risk region is reachable.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use evac_core::RoutingConfig;
use evac_region::load_regions_csv;
use evac_route::{RouteEngine, RouteOutcome, RouteSummary};
use evac_spatial::{RoadNetwork, load_graph_csv};

// ── Exit codes ────────────────────────────────────────────────────────────────

const EXIT_NO_MATCH:  u8 = 1;
const EXIT_NO_ROUTES: u8 = 2;

// ── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "evac", version, about = "Nearest low-risk evacuation routes for an area")]
struct Cli {
    /// Node table: id (osmid), x/lon, y/lat.
    #[arg(long, value_name = "CSV")]
    nodes: Option<PathBuf>,

    /// Edge table: u, v, length (metres).
    #[arg(long, value_name = "CSV")]
    edges: Option<PathBuf>,

    /// Read the road network from an OSM PBF extract instead of CSV.
    #[cfg(feature = "osm")]
    #[arg(long, value_name = "PBF", conflicts_with_all = ["nodes", "edges"])]
    pbf: Option<PathBuf>,

    /// Region table: areas, latitude, longitude, flood_risk_level.
    #[arg(long, value_name = "CSV")]
    regions: PathBuf,

    /// Number of routes to return.
    #[arg(short = 'k', long = "routes", default_value_t = RoutingConfig::DEFAULT_ROUTE_COUNT)]
    routes: usize,

    /// Average travel speed for ETA estimates, km/h.
    #[arg(long, default_value_t = RoutingConfig::DEFAULT_SPEED_KMPH)]
    speed_kmph: f64,

    /// Lowest match score (0-100) accepted for the area name.
    #[arg(long, default_value_t = RoutingConfig::DEFAULT_MIN_CONFIDENCE)]
    min_confidence: u8,

    /// Print the outcome as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Print every known region name and exit.
    #[arg(long)]
    list_regions: bool,

    /// Area to evacuate from (free text; typos are tolerated).
    #[arg(required_unless_present = "list_regions")]
    area: Option<String>,
}

impl Cli {
    fn config(&self) -> RoutingConfig {
        RoutingConfig {
            assumed_speed_kmph: self.speed_kmph,
            min_confidence:     self.min_confidence,
            route_count:        self.routes,
        }
    }

    fn load_network(&self) -> Result<RoadNetwork> {
        #[cfg(feature = "osm")]
        if let Some(pbf) = &self.pbf {
            return evac_spatial::osm::load_from_pbf(pbf)
                .with_context(|| format!("loading road network from {}", pbf.display()));
        }

        let (Some(nodes), Some(edges)) = (&self.nodes, &self.edges) else {
            bail!("both --nodes and --edges are required to load the road network");
        };
        load_graph_csv(nodes, edges).with_context(|| {
            format!("loading road network from {} and {}", nodes.display(), edges.display())
        })
    }
}

// ── JSON report ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    outcome: &'a RouteOutcome,
    summary: RouteSummary,
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("installing log subscriber")?;

    let cli = Cli::parse();
    let config = cli.config();
    config.validate().context("invalid routing options")?;

    let t0 = Instant::now();
    let network = cli.load_network()?;
    let catalog = load_regions_csv(&cli.regions)
        .with_context(|| format!("loading regions from {}", cli.regions.display()))?;
    let engine = RouteEngine::new(network, catalog, config)?;

    let status = engine.status();
    info!(
        nodes = status.node_count,
        edges = status.edge_count,
        regions = status.unique_region_count,
        low_risk = status.low_risk_count,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "inputs loaded"
    );

    if cli.list_regions {
        for name in engine.region_names() {
            println!("{}", title_case(name));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(area) = cli.area.as_deref() else {
        bail!("an area name is required");
    };
    let outcome = engine.find_routes(area, cli.routes)?;

    if cli.json {
        let report = Report { outcome: &outcome, summary: outcome.summary() };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&outcome);
    }

    Ok(match &outcome {
        RouteOutcome::NoMatch { .. } => ExitCode::from(EXIT_NO_MATCH),
        RouteOutcome::Matched { routes, .. } if routes.is_empty() => ExitCode::from(EXIT_NO_ROUTES),
        RouteOutcome::Matched { .. } => ExitCode::SUCCESS,
    })
}

fn print_text(outcome: &RouteOutcome) {
    let RouteOutcome::Matched { region, confidence, routes, .. } = outcome else {
        println!(
            "Area not recognised (best match score {}%). Try --list-regions.",
            outcome.confidence()
        );
        return;
    };

    println!("Using region: {} (match score {confidence}%)", title_case(region));
    if routes.is_empty() {
        println!("No low-risk region is reachable by road.");
        return;
    }

    println!();
    for (i, route) in routes.iter().enumerate() {
        println!(
            "Route {}: to {} — {:.2} km, {:.0} min",
            i + 1,
            title_case(&route.destination),
            route.distance_km,
            route.eta_min,
        );
    }

    let summary = outcome.summary();
    println!();
    println!("Evacuation summary");
    println!("  Routes:         {}", summary.route_count);
    println!("  Total distance: {:.2} km", summary.total_distance_km);
    println!("  Combined ETA:   {:.0} min", summary.combined_eta_min);
}

/// `"andheri east"` → `"Andheri East"`.
fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
