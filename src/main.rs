use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::PathBuf;

use resonance_recall::codec::image::{decode_grid, load_image, save_png};
use resonance_recall::codec::text::decode_str;
use resonance_recall::display::ascii;
use resonance_recall::recall::{Completion, LoopExit, RecallController, Request, TickLoop};
use resonance_recall::verify::FreeRecallCheck;
use resonance_recall::{
    generate, HarnessConfig, Modality, PatternKind, PhaseEngine, ResonanceNetwork, StateLayout,
};

// --- CLI Arguments ---
#[derive(Parser, Debug)]
#[command(version, about = "Oscillator associative-memory harness", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to the harness config (defaults are used when missing)
    #[arg(short, long, default_value = "resonance.toml", global = true)]
    config: PathBuf,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a generated pattern as ASCII
    Generate {
        #[arg(value_enum)]
        pattern: Pattern,
    },
    /// Store every generated pattern, scramble the network, recall each one
    Demo,
    /// Imprint two random patterns and let a corrupted cue settle with no drive
    Verify {
        /// Oscillator count
        #[arg(long, default_value_t = 4096)]
        nodes: usize,

        /// Corrupt every n-th node of the cue
        #[arg(long, default_value_t = 10)]
        noise_every: usize,

        /// Free-running steps after cueing
        #[arg(long, default_value_t = 50)]
        steps: usize,
    },
    /// Store one cue, scramble the network and recall it
    Recall {
        #[arg(value_enum, default_value_t = Pattern::Circle)]
        pattern: Pattern,

        /// Use this image instead of the generated pattern
        #[arg(long)]
        image: Option<PathBuf>,

        /// Caption stored in the text region
        #[arg(long)]
        text: Option<String>,

        /// Write the recalled image region as PNG
        #[arg(long)]
        png: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Pattern {
    Checkerboard,
    Diagonal,
    Circle,
    Cross,
    LetterA,
}

impl From<Pattern> for PatternKind {
    fn from(pattern: Pattern) -> Self {
        match pattern {
            Pattern::Checkerboard => PatternKind::Checkerboard,
            Pattern::Diagonal => PatternKind::Diagonal,
            Pattern::Circle => PatternKind::Circle,
            Pattern::Cross => PatternKind::Cross,
            Pattern::LetterA => PatternKind::LetterA,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for ASCII and JSON
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let config = HarnessConfig::load(&args.config)?;
    let layout = config.layout.build()?;

    match args.command {
        Commands::Generate { pattern } => {
            let kind = PatternKind::from(pattern);
            let rows = config.layout.grid_rows;
            let cols = config.layout.grid_cols;
            println!("{}", kind);
            print!("{}", ascii(&decode_grid(&generate(kind, rows, cols)), cols));
        }
        Commands::Demo => run_demo(&config, &layout)?,
        Commands::Verify {
            nodes,
            noise_every,
            steps,
        } => {
            let check = FreeRecallCheck {
                size: nodes,
                seed: config.engine.seed,
                noise_stride: noise_every,
                steps,
                ..Default::default()
            };
            let report = check.run()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Recall {
            pattern,
            image,
            text,
            png,
        } => {
            let kind = PatternKind::from(pattern);
            let rows = config.layout.grid_rows;
            let cols = config.layout.grid_cols;

            let (name, image_phases) = match image {
                Some(path) => {
                    let phases = load_image(&path, rows, cols).await?;
                    (path.display().to_string(), phases)
                }
                None => (kind.name().to_string(), generate(kind, rows, cols)),
            };
            let caption = text.unwrap_or_else(|| name.to_uppercase());
            let cue = layout.compose_cue(&image_phases, &caption)?;

            run_recall(&config, &layout, &name, &cue, png).await?;
        }
    }

    Ok(())
}

fn build_controller(config: &HarnessConfig) -> RecallController<ResonanceNetwork> {
    let engine = ResonanceNetwork::with_seed(
        config.engine_size(),
        config.engine.history_len,
        config.engine.seed,
    );
    RecallController::new(engine, config)
}

fn run_demo(config: &HarnessConfig, layout: &StateLayout) -> Result<()> {
    let mut controller = build_controller(config);
    let rows = config.layout.grid_rows;
    let cols = config.layout.grid_cols;

    let mut stores: Vec<Completion> = Vec::new();
    for kind in PatternKind::ALL {
        let cue = layout.compose_cue(&generate(kind, rows, cols), kind.name())?;
        expect_accepted(controller.begin_store(kind.name(), &cue), kind.name())?;
        if let Some(done) = controller.run_to_completion() {
            stores.push(done);
        }
    }

    let mut report: Vec<Completion> = Vec::new();
    for index in 0..controller.library().len() {
        controller.shake();
        let name = controller
            .library()
            .get(index)
            .map(|p| p.name().to_string())
            .unwrap_or_default();
        expect_accepted(controller.begin_recall(index), &name)?;
        if let Some(done) = controller.run_to_completion() {
            report.push(done);
        }
    }

    let recalled = report.iter().filter(|c| c.converged).count();
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "patterns": controller.library().len(),
            "recalled": recalled,
            "stores": stores,
            "completions": report,
            "status": controller.status(),
        }))?
    );
    Ok(())
}

async fn run_recall(
    config: &HarnessConfig,
    layout: &StateLayout,
    name: &str,
    cue: &[f64],
    png: Option<PathBuf>,
) -> Result<()> {
    let mut controller = build_controller(config);
    let ticker = TickLoop::from_config(config);

    expect_accepted(controller.begin_store(name, cue), name)?;
    ticker.start(&mut controller, |_| {}).await;

    controller.shake();
    expect_accepted(controller.recall_by_name(name), name)?;
    let exit = ticker
        .start(&mut controller, |frame| {
            tracing::debug!(
                "step {:>3}  similarity {:.3}",
                frame.steps,
                frame.similarity.unwrap_or(0.0)
            );
        })
        .await;
    let LoopExit::Completed(done) = exit else {
        bail!("Recall of '{}' did not run", name);
    };

    let phases = controller.engine().phases();
    let image = layout.disassemble(phases, Modality::Image)?;
    let cols = config.layout.grid_cols;
    print!("{}", ascii(&decode_grid(image), cols));
    if layout.region(Modality::Text).is_some() {
        let text = layout.disassemble(phases, Modality::Text)?;
        println!("text: {}", decode_str(text));
    }
    println!("{}", serde_json::to_string_pretty(&done)?);

    if let Some(path) = png {
        save_png(&path, image, config.layout.grid_rows, cols)
            .with_context(|| format!("Failed to save recall result to {}", path.display()))?;
        tracing::info!("Wrote {}", path.display());
    }
    Ok(())
}

fn expect_accepted(request: Request, name: &str) -> Result<()> {
    match request {
        Request::Accepted => Ok(()),
        other => bail!("Request for '{}' was not accepted: {:?}", name, other),
    }
}
