//! British Square analyser
//!
//! Prints the analysis table of a position: the score of every legal move
//! and the score of the position, using either the plain exhaustive search
//! or the memoized solver. With `--play`, runs an interactive game from the
//! position instead, reading cells from stdin.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use british_core::{parse_moves, Board, Negamax};
use british_solver::checkpoint::Checkpoint;
use british_solver::play::play_game;
use british_solver::render::analysis_table;
use british_solver::solver::{Solver, DEFAULT_LOG_INTERVAL_SECS};
use clap::Parser;
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "british", about = "Exhaustive analysis of British Square positions")]
struct Args {
    /// Cells played from the empty board, e.g. "5 10 0"
    #[arg(long, default_value = "")]
    moves: String,

    /// Play interactively from the position, reading cells from stdin
    #[arg(long, conflicts_with = "memo")]
    play: bool,

    /// Use the memoized solver instead of the plain search
    #[arg(long)]
    memo: bool,

    /// Solver table checkpoint (memo mode only)
    #[arg(long, default_value = "data/british.bin")]
    checkpoint: PathBuf,

    /// Seconds between progress lines (memo mode only)
    #[arg(long, default_value_t = DEFAULT_LOG_INTERVAL_SECS)]
    log_interval: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let cells = parse_moves(&args.moves)?;
    let mut board = Board::play(&cells).with_context(|| format!("playing {:?}", args.moves))?;

    if args.play {
        let outcome = play_game(&mut board, std::io::stdin().lock(), std::io::stdout().lock())
            .context("interactive play")?;
        info!("session ended: {:?} at {:#x}", outcome, board.to_u64());
        return Ok(());
    }

    let start = Instant::now();
    if args.memo {
        run_memo(&args, &mut board)?;
    } else {
        let mut search = Negamax::new();
        let analysis = search.analyse(&mut board);
        print!("{}", analysis_table(&board, &analysis));
        info!(
            "nodes={} passes={} max_ply={}",
            search.nodes, search.passes, search.max_ply
        );
    }
    println!("{:.6} seconds to execute", start.elapsed().as_secs_f64());
    Ok(())
}

fn run_memo(args: &Args, board: &mut Board) -> Result<()> {
    // Set up SIGINT handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        warn!("Interrupt received, saving checkpoint...");
        r.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl-C handler")?;

    let mut solver = Solver::with_log_interval(args.log_interval);

    if args.checkpoint.exists() {
        let start = Instant::now();
        match Checkpoint::load(&args.checkpoint) {
            Ok(checkpoint) => {
                let count = checkpoint.entries.len();
                solver.load_entries(checkpoint.entries);
                info!(
                    "Loaded {} positions from {:?} in {:.2}s",
                    count,
                    args.checkpoint,
                    start.elapsed().as_secs_f64()
                );
            }
            Err(e) => warn!("Failed to load checkpoint {:?}: {}. Starting fresh.", args.checkpoint, e),
        }
    }

    let outcome = solver.analyse(board, &running);

    if let Some(parent) = args.checkpoint.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {:?}", parent))?;
    }
    let count = Checkpoint::save(&args.checkpoint, &solver.table)
        .with_context(|| format!("saving checkpoint {:?}", args.checkpoint))?;
    info!("Saved {} positions to {:?}", count, args.checkpoint);

    let Some(analysis) = outcome else {
        bail!("solve was interrupted before completion");
    };
    print!("{}", analysis_table(board, &analysis));
    println!();
    solver.stats.print_summary();
    Ok(())
}
