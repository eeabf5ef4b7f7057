mod report;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pcb_common::db::board::Board;
use pcb_common::geom::coord::GridCoord;
use pcb_common::util::config::Config;
use pcb_common::util::profiler::ScopedTimer;
use pcb_common::util::generator::{self, BoardSpec};
use pcb_common::util::{logger, visualization};
use pcb_router::grid::dump;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Route every net of a board description.
    Route {
        /// Overrides `input.board_file` from the config.
        #[arg(long, value_name = "FILE")]
        board: Option<PathBuf>,
    },
    /// Write a random board description for benchmarking.
    Generate {
        #[arg(long, default_value_t = 200)]
        width: i32,
        #[arg(long, default_value_t = 200)]
        height: i32,
        #[arg(long, default_value_t = 2)]
        layers: i32,
        #[arg(long, default_value_t = 50)]
        nets: usize,
        #[arg(long, default_value_t = 3)]
        pins: usize,
        #[arg(long, default_value = "inputs/random.toml")]
        output: String,
    },
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();

    let config = if args.config.exists() {
        log::info!("Loading configuration from {:?}", args.config);
        let config_str = std::fs::read_to_string(&args.config)
            .with_context(|| format!("Failed to read config file {:?}", args.config))?;
        toml::from_str(&config_str).context("Failed to parse config TOML")?
    } else {
        log::warn!(
            "Configuration file {:?} not found. Using internal defaults.",
            args.config
        );
        Config::default()
    };

    let command = args.command.unwrap_or(Commands::Route { board: None });

    match command {
        Commands::Generate {
            width,
            height,
            layers,
            nets,
            pins,
            output,
        } => {
            prepare_output_dir(&output)?;
            log::info!(
                "Generating random board ({}x{}x{}, Nets: {}, Pins/net: {})...",
                width,
                height,
                layers,
                nets,
                pins
            );
            let board = generator::generate_random_board(&BoardSpec {
                width,
                height,
                layers,
                nets,
                pins_per_net: pins,
            });
            let text = toml::to_string(&board).context("Failed to serialize board")?;
            std::fs::write(&output, text).with_context(|| format!("Failed to write {}", output))?;
            log::info!("Generated: {} ({} nets, {} pads)", output, board.num_nets(), board.pads.len());
        }
        Commands::Route { board } => {
            let board_path = board.unwrap_or_else(|| PathBuf::from(&config.input.board_file));
            run_routing(&config, &board_path)?;
        }
    }

    Ok(())
}

fn prepare_output_dir(path_str: &str) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(path_str).parent()
        && !parent.exists()
        && !parent.as_os_str().is_empty()
    {
        log::info!("Creating output directory: {:?}", parent);
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn load_board(path: &Path) -> anyhow::Result<Board> {
    log::info!("Reading board: {:?}", path);
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Input board file missing: {:?}", path))?;
    toml::from_str(&text).with_context(|| format!("Invalid board description in {:?}", path))
}

fn run_routing(config: &Config, board_path: &Path) -> anyhow::Result<()> {
    let _timer = ScopedTimer::new("Total run");
    let board = load_board(board_path)?;
    log::info!(
        "Board {}x{}x{}: {} nets, {} pads, {} netclasses",
        board.width,
        board.height,
        board.layers,
        board.num_nets(),
        board.pads.len(),
        board.netclasses.len()
    );

    let (router, report) = pcb_router::route_board(&board, &config.routing)
        .context("Failed to initialize the routing grid")?;

    prepare_output_dir(&config.output.report_file)?;
    log::info!("Writing route report to {}", config.output.report_file);
    report::save_report(&board, &report, &config.output.report_file)
        .with_context(|| format!("Failed to write {}", config.output.report_file))?;

    let base_cost = router.grid().planes().base_cost();

    if let Some(png) = &config.output.cost_map_png {
        prepare_output_dir(png)?;
        log::info!("Generating cost map visualization: {}", png);
        let dims = base_cost.dims();
        let view = visualization::PlaneView {
            values: base_cost.as_slice(),
            width: dims.width as u32,
            height: dims.height as u32,
            layers: dims.layers as u32,
        };
        let paths: Vec<&[GridCoord]> = report.routed.iter().flat_map(|r| r.paths()).collect();
        visualization::draw_cost_map(&view, &paths, png, 4)?;
    }

    if let Some(gnuplot) = &config.output.gnuplot_file {
        prepare_output_dir(gnuplot)?;
        log::info!("Dumping base cost to {}", gnuplot);
        dump::save_gnuplot(&base_cost, gnuplot)
            .with_context(|| format!("Failed to write {}", gnuplot))?;
    }

    if !report.failed.is_empty() {
        log::warn!("{} nets could not be routed", report.failed.len());
    }
    Ok(())
}
