//! Walkergen - Entry Point
//!
//! Generates a level either headless (printing the map) or inside a
//! terminal viewer that shows the walkers carving it step by step.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};

use walkergen::config::{self, GenerationConfig};
use walkergen::entities::EcsSpawner;
use walkergen::render::TileCanvas;
use walkergen::ui::{Viewer, ViewerAction};
use walkergen::world::GridGraph;
use walkergen::{generate_level, CancelToken, GenerationError, GenerationStats, LevelGenerator};

/// Redraw interval while paused or showing a finished map
const FRAME_TIME: Duration = Duration::from_millis(1000 / 30);

type Term = Terminal<CrosstermBackend<io::Stdout>>;

struct Args {
    config: Option<PathBuf>,
    seed: Option<u64>,
    headless: bool,
    report: bool,
    write_config: Option<PathBuf>,
}

/// How a single viewer run ended
enum Outcome {
    Quit(Option<GenerationStats>),
    Regenerate,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        config: None,
        seed: None,
        headless: false,
        report: false,
        write_config: None,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "-s" | "--seed" => {
                let value = args.next().context("--seed needs a number")?;
                let seed = value.parse().with_context(|| format!("invalid seed {:?}", value))?;
                parsed.seed = Some(seed);
            }
            "--headless" => parsed.headless = true,
            "--report" => parsed.report = true,
            "--write-config" => {
                let path = args.next().context("--write-config needs a path")?;
                parsed.write_config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => bail!("unknown argument {:?} (see --help)", other),
        }
    }

    Ok(parsed)
}

fn print_help() {
    println!("Walkergen - walker-carved level generator");
    println!();
    println!("Usage: walkergen [OPTIONS]");
    println!();
    println!("Options:");
    println!(
        "  -c, --config <PATH>       Config file (default: {})",
        config::config_path().display()
    );
    println!("  -s, --seed <N>            Random seed (default: config seed, else random)");
    println!("  --headless                Generate once and print the map");
    println!("  --report                  Print generation stats as JSON");
    println!("  --write-config <PATH>     Write the default config and exit");
    println!();
    println!("Viewer keys: q quit, r regenerate, space pause, m toggle glyphs");
}

fn init_logging() {
    // Log to file so the viewer's screen stays clean
    let target = match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("walkergen.log")
    {
        Ok(file) => env_logger::Target::Pipe(Box::new(file)),
        Err(_) => env_logger::Target::Pipe(Box::new(io::sink())),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(target)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    log::info!("Starting Walkergen v{}", env!("CARGO_PKG_VERSION"));

    let args = parse_args()?;

    if let Some(path) = &args.write_config {
        config::export_default_config(path)?;
        println!("Default config written to {}", path.display());
        return Ok(());
    }

    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let config = config::load_or_default(&config_path);
    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);

    if args.headless {
        return run_headless(config, seed, args.report);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_viewer(&mut terminal, &config, seed);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match result {
        Ok(stats) => {
            if let (true, Some(stats)) = (args.report, stats) {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            log::info!("Walkergen shut down cleanly");
            Ok(())
        }
        Err(e) => {
            log::error!("Viewer exited with error: {}", e);
            Err(e)
        }
    }
}

fn run_headless(config: GenerationConfig, seed: u64, report: bool) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut canvas = TileCanvas::new(config.width, config.height);
    let mut graph = GridGraph::new();
    let mut spawner = EcsSpawner::new();

    let map = generate_level(config, &mut rng, &mut canvas, &mut graph, &mut spawner)
        .with_context(|| format!("generation failed for seed {}", seed))?;

    println!("seed {}", seed);
    print!("{}", map.grid().to_ascii());
    if report {
        println!("{}", serde_json::to_string_pretty(map.stats())?);
    }
    Ok(())
}

/// Collaborators reused across regenerations
struct Session {
    canvas: TileCanvas,
    graph: GridGraph,
    spawner: EcsSpawner,
}

/// Keep generating until the user quits. Returns stats of the last
/// completed level, if any.
fn run_viewer(
    terminal: &mut Term,
    config: &GenerationConfig,
    seed: u64,
) -> Result<Option<GenerationStats>> {
    let mut viewer = Viewer::new(seed);
    let mut session = Session {
        canvas: TileCanvas::new(config.width, config.height),
        graph: GridGraph::new(),
        spawner: EcsSpawner::new(),
    };
    let mut seed = seed;

    loop {
        viewer.set_seed(seed);
        log::info!("Viewer generating with seed {}", seed);
        match run_once(terminal, &mut viewer, &mut session, config, seed)? {
            Outcome::Quit(stats) => return Ok(stats),
            Outcome::Regenerate => {
                seed = rand::random();
                session.canvas.clear();
                session.spawner.reset();
            }
        }
    }
}

/// Wait up to `timeout` for a key press and let the viewer interpret it
fn poll_action(viewer: &mut Viewer, timeout: Duration) -> Result<ViewerAction> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            // Only handle key press events, not releases
            if key.kind == KeyEventKind::Press {
                return Ok(viewer.handle_input(key));
            }
        }
    }
    Ok(ViewerAction::None)
}

fn run_once(
    terminal: &mut Term,
    viewer: &mut Viewer,
    session: &mut Session,
    config: &GenerationConfig,
    seed: u64,
) -> Result<Outcome> {
    let mut rng = StdRng::seed_from_u64(seed);
    let cancel = CancelToken::new();
    let step_delay = Duration::from_millis(config.step_delay_ms);

    let mut generator = LevelGenerator::builder(config.clone())
        .random(&mut rng)
        .renderer(&mut session.canvas)
        .graph(&mut session.graph)
        .entities(&mut session.spawner)
        .cancel_token(cancel.clone())
        .build()?;

    let mut requested = None;
    let mut failed = false;

    while !generator.is_complete() {
        let wait = if viewer.is_paused() || failed { FRAME_TIME } else { step_delay };
        match poll_action(viewer, wait)? {
            ViewerAction::Quit if failed => return Ok(Outcome::Quit(None)),
            ViewerAction::Regenerate if failed => return Ok(Outcome::Regenerate),
            ViewerAction::Quit => {
                cancel.cancel();
                requested = Some(Outcome::Quit(None));
            }
            ViewerAction::Regenerate => {
                cancel.cancel();
                requested = Some(Outcome::Regenerate);
            }
            ViewerAction::None => {}
        }

        if !failed && (!viewer.is_paused() || cancel.is_cancelled()) {
            match generator.step() {
                Ok(_) => {}
                Err(GenerationError::Cancelled) => {
                    return Ok(requested.unwrap_or(Outcome::Quit(None)));
                }
                Err(e) => {
                    log::error!("Generation failed for seed {}: {}", seed, e);
                    viewer.set_message(e.to_string());
                    failed = true;
                }
            }
        }

        terminal.draw(|frame| viewer.render_progress(frame, &generator))?;
    }

    let map = generator.finish();
    let drawables = session.spawner.drawables();

    loop {
        terminal.draw(|frame| viewer.render_finished(frame, &map, &session.canvas, &drawables))?;
        match poll_action(viewer, FRAME_TIME)? {
            ViewerAction::Quit => return Ok(Outcome::Quit(Some(map.stats().clone()))),
            ViewerAction::Regenerate => return Ok(Outcome::Regenerate),
            ViewerAction::None => {}
        }
    }
}
