//! latte_sense - live sensor readings from an Arduino-class board
//!
//! A standalone binary that samples the board, shows the readings in the
//! terminal and optionally in a browser, and appends summaries to a log file.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use latte_sense::{
    report, Board, ConsoleDisplay, ConsoleLog, DashboardState, FieldDisplay, FieldTable, FileLog,
    LogSink, LoopConfig, PinSpec, Sampler, SamplerState, SensorLayout, SimulatedBoard, WebConfig,
    WebDisplay, DEFAULT_LOG_FILE, DEFAULT_PORT, DEFAULT_TITLE, DEFAULT_WEB_PORT,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "latte_sense")]
#[command(about = "🌡️ latte_sense - live Arduino sensor readings")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Samples thermistors, light sensors and a PIR sensor over Firmata")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Serial port of the board
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// Use a simulated board instead of real hardware
    #[arg(long, global = true)]
    simulate: bool,

    /// Left light sensor for the horizontal position, e.g. a:3:i
    #[arg(long, global = true)]
    ldr_left: Option<PinSpec>,

    /// Right light sensor for the horizontal position, e.g. a:4:i
    #[arg(long, global = true)]
    ldr_right: Option<PinSpec>,

    /// Motion indicator LED, e.g. d:13:o
    #[arg(long, global = true)]
    led: Option<PinSpec>,

    #[command(flatten)]
    run: RunArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a single sample and exit
    Snapshot(SnapshotArgs),

    /// Show the pin layout
    Pins,
}

#[derive(Args)]
struct RunArgs {
    /// Log file, appended to
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Field table file (`key<TAB>label` per line)
    #[arg(long)]
    fields: Option<PathBuf>,

    /// Pause between sampling cycles in milliseconds
    #[arg(short, long, default_value_t = 91, value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,

    /// Seconds between summary lines in the log
    #[arg(long, default_value_t = 600)]
    report_interval: u64,

    /// Stop after this many cycles
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Serve the browser dashboard
    #[arg(long)]
    web: bool,

    /// Dashboard bind address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Dashboard port
    #[arg(long, default_value_t = DEFAULT_WEB_PORT)]
    web_port: u16,

    /// Do not draw the terminal table
    #[arg(long)]
    no_console: bool,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

impl Cli {
    fn layout(&self) -> SensorLayout {
        let mut layout = SensorLayout::default();
        layout.ldr_left = self.ldr_left;
        layout.ldr_right = self.ldr_right;
        layout.led = self.led;
        layout
    }

    fn log_level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    let layout = cli.layout();
    layout.validate()?;

    match &cli.command {
        Some(Commands::Snapshot(args)) => snapshot_command(&cli, layout, args).await?,
        Some(Commands::Pins) => pins_command(&cli, &layout),
        None => run_command(&cli, layout).await?,
    }

    Ok(())
}

fn console_level(cli: &Cli) -> Level {
    if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    }
}

fn console_filter(level: Level) -> EnvFilter {
    // RUST_LOG wins over the flags when set
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let filter = console_filter(console_level(cli));

    // stdout belongs to the field table
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

#[cfg(feature = "firmata")]
async fn open_board(port: Option<String>) -> anyhow::Result<latte_sense::FirmataBoard> {
    let name = port.clone().unwrap_or_else(|| DEFAULT_PORT.to_string());
    let board = latte_sense::FirmataBoard::open(port.as_deref())
        .await
        .with_context(|| format!("Could not connect to board on {}", name))?;
    Ok(board)
}

#[cfg(not(feature = "firmata"))]
async fn open_board(port: Option<String>) -> anyhow::Result<SimulatedBoard> {
    anyhow::bail!(
        "Built without board support, cannot open {}; use --simulate",
        port.as_deref().unwrap_or(DEFAULT_PORT)
    )
}

async fn run_command(cli: &Cli, layout: SensorLayout) -> anyhow::Result<()> {
    let mut log = FileLog::open(&cli.run.log_file, cli.log_level())
        .with_context(|| format!("Failed to open log file {}", cli.run.log_file.display()))?;

    log.record(Level::INFO, "Connecting with board ...");
    if cli.simulate {
        run_with(SimulatedBoard::new(), cli, layout, &mut log).await
    } else {
        let board = open_board(cli.port.clone()).await?;
        run_with(board, cli, layout, &mut log).await
    }
}

async fn run_with<B: Board>(
    board: B,
    cli: &Cli,
    layout: SensorLayout,
    log: &mut FileLog,
) -> anyhow::Result<()> {
    let mut sampler = Sampler::initialize(board, layout, log).context("Failed to configure sensors")?;
    log.record(Level::INFO, "Connected!");

    let table = match &cli.run.fields {
        Some(path) => FieldTable::load(path, sampler.layout())
            .with_context(|| format!("Failed to load field table {}", path.display()))?,
        None => FieldTable::for_layout(sampler.layout()),
    };

    let mut displays: Vec<Box<dyn FieldDisplay>> = Vec::new();
    if !cli.run.no_console {
        displays.push(Box::new(ConsoleDisplay::new(
            std::io::stdout(),
            DEFAULT_TITLE,
            &table,
        )));
    }

    if cli.run.web {
        let state = DashboardState::new(&table, DEFAULT_TITLE);
        displays.push(Box::new(WebDisplay::new(state.clone())));
        let config = WebConfig::new(&cli.run.host, cli.run.web_port).with_title(DEFAULT_TITLE);
        tokio::spawn(async move {
            if let Err(e) = latte_sense::start_web_server(config, state).await {
                error!("Dashboard server stopped: {}", e);
            }
        });
    }

    let config = LoopConfig::default()
        .with_cycle_interval(Duration::from_millis(cli.run.interval_ms))
        .with_report_interval(Duration::from_secs(cli.run.report_interval))
        .with_max_cycles(cli.run.max_cycles);

    info!(
        "Sampling {} every {}ms, summary every {}s",
        sampler.port_name(),
        cli.run.interval_ms,
        cli.run.report_interval
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let summary = report::run(&mut sampler, &table, &mut displays, log, &config, shutdown).await?;
    info!(
        "Stopped after {} cycles ({} failed)",
        summary.cycles, summary.failed_cycles
    );

    Ok(())
}

async fn snapshot_command(cli: &Cli, layout: SensorLayout, args: &SnapshotArgs) -> anyhow::Result<()> {
    let mut log = ConsoleLog;
    if cli.simulate {
        snapshot_with(SimulatedBoard::new(), layout, args, &mut log)
    } else {
        let board = open_board(cli.port.clone()).await?;
        snapshot_with(board, layout, args, &mut log)
    }
}

fn snapshot_with<B: Board>(
    board: B,
    layout: SensorLayout,
    args: &SnapshotArgs,
    log: &mut dyn LogSink,
) -> anyhow::Result<()> {
    let sampler = Sampler::initialize(board, layout, log).context("Failed to configure sensors")?;

    match args.format.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(sampler.state())?;
            println!("{}", json);
        }
        "pretty" => {
            print_pretty_state(sampler.port_name(), sampler.layout(), sampler.state())?;
        }
        _ => {
            anyhow::bail!("Unsupported format: {}. Use 'json' or 'pretty'", args.format);
        }
    }

    Ok(())
}

fn pins_command(cli: &Cli, layout: &SensorLayout) {
    let port = if cli.simulate {
        "simulated".to_string()
    } else {
        cli.port.clone().unwrap_or_else(|| DEFAULT_PORT.to_string())
    };

    println!("Board: {}", port);
    for (index, spec) in layout.thermistors.iter().enumerate() {
        println!("  T{:<11} {}", index, spec);
    }
    for (index, spec) in layout.light_sensors.iter().enumerate() {
        let key = if index == 0 {
            "LDR".to_string()
        } else {
            format!("LDR{}", index)
        };
        println!("  {:<12} {}", key, spec);
    }
    println!("  {:<12} {}", "PIR", layout.motion);
    if let (Some(left), Some(right)) = (layout.ldr_left, layout.ldr_right) {
        println!("  {:<12} {}", "LDR left", left);
        println!("  {:<12} {}", "LDR right", right);
    }
    if let Some(led) = layout.led {
        println!("  {:<12} {}", "LED", led);
    }
}

fn print_pretty_state(
    port: &str,
    layout: &SensorLayout,
    state: &SamplerState,
) -> anyhow::Result<()> {
    println!(
        "🌡️  Sensor Snapshot from {} ({})",
        port,
        state.sampled_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("==========================================");

    let table = FieldTable::for_layout(layout);
    for field in table.fields() {
        let text = field.id.value(state, Duration::ZERO).render()?;
        println!("  {:<26} {}", field.label, text);
    }

    Ok(())
}
