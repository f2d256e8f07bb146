//! # Lifeboard Server Binary
//!
//! Seeds the board, spawns the actor and tick source, and runs the accept
//! loop on the main thread.
//!
//! ## Usage
//!
//! ```bash
//! lifeboard --port 3333 --size-x 20 --size-y 20 --tick-ms 1000
//! ```
//!
//! `RUST_LOG` controls log verbosity (e.g. `RUST_LOG=lifeboard_server=debug`).

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{cursor, execute, terminal};

use lifeboard_core::{pattern, Grid};
use lifeboard_server::{BoardHandle, GenerationHook, Server, ServerConfig, TickSource};

/// Flag overrides collected before the config file is resolved.
#[derive(Default)]
struct Overrides {
    config: Option<PathBuf>,
    port: Option<u16>,
    size_x: Option<usize>,
    size_y: Option<usize>,
    tick_ms: Option<u64>,
    render: bool,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        tracing::error!("fatal: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(overrides) = parse_args()? else {
        return Ok(()); // --help
    };

    let mut config = match &overrides.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if let Some(size_x) = overrides.size_x {
        config.size_x = size_x;
    }
    if let Some(size_y) = overrides.size_y {
        config.size_y = size_y;
    }
    if let Some(tick_ms) = overrides.tick_ms {
        config.tick_interval_ms = tick_ms;
    }
    config.validate()?;

    let mut grid = Grid::new(config.size_x, config.size_y);
    pattern::apply(&mut grid, &pattern::STARTER)?;

    tracing::info!(
        "starting lifeboard: {}x{} grid, {}ms tick, port {}",
        config.size_x,
        config.size_y,
        config.tick_interval_ms,
        config.port
    );

    let hook: Option<GenerationHook> = overrides.render.then(|| {
        Box::new(|grid: &Grid| display(grid)) as GenerationHook
    });

    let board = BoardHandle::spawn(
        grid,
        TickSource::periodic(Duration::from_millis(config.tick_interval_ms)),
        hook,
    );

    // Bind failure is fatal by design: no socket, no service.
    let server = Server::bind(&config, board)?;
    server.run();
    Ok(())
}

/// Parses command line flags. Returns `None` after printing help.
fn parse_args() -> Result<Option<Overrides>, Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let mut overrides = Overrides::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                overrides.config = Some(PathBuf::from(take_value(&args, &mut i)?));
            }
            "--port" | "-p" => {
                overrides.port = Some(take_value(&args, &mut i)?.parse()?);
            }
            "--size-x" => {
                overrides.size_x = Some(take_value(&args, &mut i)?.parse()?);
            }
            "--size-y" => {
                overrides.size_y = Some(take_value(&args, &mut i)?.parse()?);
            }
            "--tick-ms" | "-t" => {
                overrides.tick_ms = Some(take_value(&args, &mut i)?.parse()?);
            }
            "--render" | "-r" => {
                overrides.render = true;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(None);
            }
            other => {
                return Err(format!("unknown flag: {other} (try --help)").into());
            }
        }
        i += 1;
    }

    Ok(Some(overrides))
}

/// Returns the value following a flag, advancing the cursor.
fn take_value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", args[*i - 1]))
}

fn print_help() {
    println!("Usage: lifeboard [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>    TOML config file (flags override it)");
    println!("  -p, --port <PORT>      TCP port to bind (default: 3333)");
    println!("      --size-x <N>       Grid width (default: 20)");
    println!("      --size-y <N>       Grid height (default: 20)");
    println!("  -t, --tick-ms <MS>     Tick interval in ms (default: 1000)");
    println!("  -r, --render           Draw the board in the terminal each tick");
    println!("  -h, --help             Show this help");
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// The incidental display hook: clear the terminal and draw the board.
///
/// Display failures are ignored; the simulation does not care whether
/// anyone is watching.
fn display(grid: &Grid) {
    let mut out = std::io::stdout();
    let _ = execute!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    );
    let mut frame = String::with_capacity((grid.size_y() + 1) * grid.size_x());
    for x in 0..grid.size_x() {
        for y in 0..grid.size_y() {
            let alive = grid.get(x, y).map_or(false, |c| c.alive);
            frame.push(if alive { 'X' } else { ' ' });
        }
        frame.push('\n');
    }
    let _ = out.write_all(frame.as_bytes());
    let _ = out.flush();
}
