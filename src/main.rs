//! Strata CLI - Hierarchical Self-Organizing Map Engine
//!
//! Command-line interface for training, resuming, and inspecting engines.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;
use strata::{Control, Engine, EngineConfig, Progress, Result, RunStatus, TrainingSample};

#[derive(Parser)]
#[command(name = "strata")]
#[command(version)]
#[command(about = "Hierarchical self-organizing map engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new engine from a sample file
    Train {
        /// Input sample file (JSON array of training samples)
        #[arg(short, long)]
        input: PathBuf,

        /// Output state file
        #[arg(short, long)]
        output: PathBuf,

        /// Number of map layers
        #[arg(short, long, default_value = "3")]
        layers: usize,

        /// Base grid width
        #[arg(long, default_value = "16")]
        width: usize,

        /// Base grid height
        #[arg(long, default_value = "16")]
        height: usize,

        /// Feature vector dimensionality
        #[arg(short, long, default_value = "8")]
        features: usize,

        /// Training iteration budget
        #[arg(short = 'n', long, default_value = "2000")]
        iterations: u64,

        /// Grid shrink factor between levels
        #[arg(long, default_value = "0.65")]
        shrink: f64,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Resume a saved session up to its iteration budget
    Resume {
        /// State file to resume
        #[arg(short, long)]
        state: PathBuf,

        /// Output state file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show configuration, status, and per-layer stats of a state file
    Info {
        /// State file to inspect
        state: PathBuf,
    },

    /// Export a visualization snapshot as JSON
    Export {
        /// State file to export
        #[arg(short, long)]
        state: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let result = match cli.command {
        Commands::Train {
            input,
            output,
            layers,
            width,
            height,
            features,
            iterations,
            shrink,
            seed,
        } => train_engine(
            input, output, layers, width, height, features, iterations, shrink, seed,
        ),

        Commands::Resume { state, output } => resume_engine(state, output),

        Commands::Info { state } => show_info(state),

        Commands::Export { state, output } => export_snapshot(state, output),
    };

    if let Err(e) = result {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn train_engine(
    input: PathBuf,
    output: PathBuf,
    layers: usize,
    width: usize,
    height: usize,
    features: usize,
    iterations: u64,
    shrink: f64,
    seed: Option<u64>,
) -> Result<()> {
    let start_time = Instant::now();

    let samples = TrainingSample::load_json(&input)?;
    println!("Loaded {} samples from {}", samples.len(), input.display());

    let config = EngineConfig {
        layers,
        base_width: width,
        base_height: height,
        feature_count: features,
        max_iterations: iterations,
        hierarchy_factor: shrink,
        seed,
        ..Default::default()
    };

    let mut engine = Engine::new(config)?;
    engine.load_samples(samples);

    for layer in engine.layers() {
        println!(
            "  layer {} ({}): {}x{} grid",
            layer.level, layer.name, layer.width, layer.height
        );
    }

    let progress = run_with_bar(&mut engine, iterations)?;
    println!(
        "Trained {} iterations in {:.1?}",
        progress.iteration,
        start_time.elapsed()
    );

    print_stats(&engine);
    engine.save(&output)?;
    println!("Saved state to {}", output.display());
    Ok(())
}

fn resume_engine(state: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let mut engine = Engine::load(&state)?;
    let remaining = engine.config().max_iterations - engine.iteration();

    if engine.is_complete() {
        println!("Session already completed its {} iterations", engine.iteration());
        return Ok(());
    }
    println!(
        "Resuming at iteration {} ({} remaining)",
        engine.iteration(),
        remaining
    );

    let total = engine.config().max_iterations;
    run_with_bar(&mut engine, total)?;
    print_stats(&engine);

    let output = output.unwrap_or(state);
    engine.save(&output)?;
    println!("Saved state to {}", output.display());
    Ok(())
}

fn run_with_bar(engine: &mut Engine, total: u64) -> Result<Progress> {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA: {eta}")
            .unwrap()
            .progress_chars("█▓▒░  "),
    );
    bar.set_position(engine.iteration());

    let mut sink = |p: Progress| {
        bar.set_position(p.iteration);
        Control::Continue
    };
    let progress = engine.train(&mut sink)?;
    bar.finish_and_clear();
    Ok(progress)
}

fn show_info(state: PathBuf) -> Result<()> {
    let engine = Engine::load(&state)?;
    let config = engine.config();

    println!("Strata engine state: {}", state.display());
    println!("  status:      {:?}", engine.status());
    println!(
        "  iterations:  {}/{}",
        engine.iteration(),
        config.max_iterations
    );
    println!("  samples:     {}", engine.samples().len());
    println!("  features:    {}", config.feature_count);
    println!("  seed:        {:?}", config.seed);
    println!();

    for layer in engine.layers() {
        println!(
            "  layer {} ({}): {}x{} grid, {} feature dims",
            layer.level,
            layer.name,
            layer.width,
            layer.height,
            layer.feature_dims()
        );
    }

    if engine.status() == RunStatus::Completed {
        print_stats(&engine);
    }
    Ok(())
}

fn export_snapshot(state: PathBuf, output: PathBuf) -> Result<()> {
    let engine = Engine::load(&state)?;
    let snapshot = engine.snapshot();

    let file = File::create(&output)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &snapshot)
        .map_err(|e| strata::StrataError::Serialization(e.to_string()))?;

    println!(
        "Exported {} layers to {}",
        snapshot.layers.len(),
        output.display()
    );
    Ok(())
}

fn print_stats(engine: &Engine) {
    let Some(stats) = engine.stats() else {
        return;
    };

    println!();
    println!("  level  quant-err  topo-err  convergence  abstraction");
    for s in stats {
        println!(
            "  {:<5}  {:<9.4}  {:<8.4}  {:<11.4}  {:.4}",
            s.level,
            s.quantization_error,
            s.topographic_error,
            s.convergence_rate,
            s.abstraction_quality
        );
    }
}
