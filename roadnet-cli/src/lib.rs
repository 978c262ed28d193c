//! Command-line interface for the roadnet map store.
//!
//! Two concerns: converting a vendor JSON export into the text dump
//! format, and running the store's spatial queries against a dump for
//! inspection.

#![forbid(unsafe_code)]

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use geo::{Coord, Rect};

use roadnet_data::{convert_vendor_file, load_dump};

mod error;
mod output;

pub use error::CliError;

/// Default query radius in metres, matching the store's reference
/// vehicle-side usage.
const DEFAULT_RADIUS_M: f64 = 2000.0;

/// Run the roadnet CLI with the current process arguments.
///
/// # Errors
/// Argument, load, and conversion failures; the binary prints the error
/// chain and exits non-zero.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse()?;
    match cli.command {
        Command::Convert(args) => run_convert(&args),
        Command::Query(args) => run_query(&args),
    }
}

fn run_convert(args: &ConvertArgs) -> Result<(), CliError> {
    let map = convert_vendor_file(&args.input, &args.output)?;
    output::report_conversion(&map, &args.output);
    Ok(())
}

fn run_query(args: &QueryArgs) -> Result<(), CliError> {
    let map = load_dump(&args.dump)?;
    match &args.operation {
        QueryOperation::Nearest { at } => output::report_nearest(&map, *at),
        QueryOperation::Rect { bounds } => output::report_rectangle(&map, bounds),
        QueryOperation::Radius { at, radius } => output::report_radius(&map, *at, *radius),
        QueryOperation::Network { at, radius } => output::report_network(&map, *at, *radius),
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "roadnet",
    about = "Convert and query road-network map dumps",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a vendor JSON export into a text dump.
    Convert(ConvertArgs),
    /// Load a text dump and run a spatial query against it.
    Query(QueryArgs),
}

/// CLI arguments for the `convert` subcommand.
#[derive(Debug, Clone, Args)]
struct ConvertArgs {
    /// Path to the vendor JSON export.
    #[arg(value_name = "input")]
    input: Utf8PathBuf,
    /// Destination path for the text dump.
    #[arg(value_name = "output")]
    output: Utf8PathBuf,
}

/// CLI arguments for the `query` subcommand.
#[derive(Debug, Clone, Args)]
struct QueryArgs {
    /// Path to the text dump to load.
    #[arg(value_name = "dump")]
    dump: Utf8PathBuf,
    #[command(subcommand)]
    operation: QueryOperation,
}

#[derive(Debug, Clone, Subcommand)]
enum QueryOperation {
    /// Find the node nearest to a point.
    Nearest {
        /// Query point as `X,Y`.
        #[arg(long, value_name = "X,Y", value_parser = parse_coord)]
        at: Coord<f64>,
    },
    /// List the nodes and links within an axis-aligned rectangle.
    Rect {
        /// Rectangle as `MINX,MINY,MAXX,MAXY` (boundary-inclusive).
        #[arg(long, value_name = "MINX,MINY,MAXX,MAXY", value_parser = parse_bounds)]
        bounds: Rect<f64>,
    },
    /// List the nodes, links, and relations within a radius.
    Radius {
        /// Centre point as `X,Y`.
        #[arg(long, value_name = "X,Y", value_parser = parse_coord)]
        at: Coord<f64>,
        /// Radius in approximate metres.
        #[arg(long, value_name = "metres", default_value_t = DEFAULT_RADIUS_M)]
        radius: f64,
    },
    /// Expand the one-hop road network around a point.
    Network {
        /// Centre point as `X,Y`.
        #[arg(long, value_name = "X,Y", value_parser = parse_coord)]
        at: Coord<f64>,
        /// Radius in approximate metres.
        #[arg(long, value_name = "metres", default_value_t = DEFAULT_RADIUS_M)]
        radius: f64,
    },
}

fn parse_coord(value: &str) -> Result<Coord<f64>, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but found {value:?}"))?;
    let x = x
        .trim()
        .parse()
        .map_err(|_| format!("{x:?} is not a coordinate"))?;
    let y = y
        .trim()
        .parse()
        .map_err(|_| format!("{y:?} is not a coordinate"))?;
    Ok(Coord { x, y })
}

fn parse_bounds(value: &str) -> Result<Rect<f64>, String> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 4 {
        return Err(format!("expected MINX,MINY,MAXX,MAXY but found {value:?}"));
    }
    let mut numbers = [0.0_f64; 4];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|_| format!("{part:?} is not a coordinate"))?;
    }
    let [min_x, min_y, max_x, max_y] = numbers;
    Ok(Rect::new(
        Coord { x: min_x, y: min_y },
        Coord { x: max_x, y: max_y },
    ))
}
