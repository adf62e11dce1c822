//! # Etiketka CLI
//!
//! Command-line interface for the label printing station.
//!
//! ## Usage
//!
//! ```bash
//! # Print a label (PDF through the platform print pipeline)
//! etiketka print --product LF --weight 15.5
//!
//! # Print straight to a ZD-series printer over Bluetooth
//! etiketka print --product SF --weight 4.2 --mode direct-markup
//!
//! # Save a preview / the raw ZPL
//! etiketka preview --weight 15.5 --png label.png
//! etiketka zpl --weight 15.5 --size 100x100
//!
//! # Look for printers, remember one
//! etiketka scan
//! etiketka config set-device "ZD421-1234"
//!
//! # HTTP API with an in-memory printer
//! etiketka --simulate serve
//! ```

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use etiketka::{
    coordinator::{OutputCoordinator, PrintMode, PrintOutcome},
    document::{DocumentOutput, PrintDispatch},
    error::{LabelError, OutputError},
    label::{LabelForm, ProductCode, Weight},
    printer::LabelSize,
    protocol::markup,
    render::{LabelFont, RasterConfig, render_label, to_png},
    server::{self, ServerConfig},
    settings::Settings,
    transport::{
        BtleAdapter, DiscoveryRequest, MockAdapter, PeripheralAdapter, PeripheralSession,
    },
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Etiketka - Hemp product label printing station
#[derive(Parser, Debug)]
#[command(name = "etiketka")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Use an in-memory printer instead of Bluetooth
    #[arg(long, global = true)]
    simulate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct LabelArgs {
    /// Product code (LF, SF, CS, NS, DS)
    #[arg(long, default_value = "LF")]
    product: ProductCode,

    /// Net weight in kg, as typed on the keypad
    #[arg(long)]
    weight: Option<String>,

    /// Batch sequence number (defaults to the one after the last print)
    #[arg(long)]
    sequence: Option<u32>,

    /// Label size: 58x30 or 100x100
    #[arg(long)]
    size: Option<LabelSize>,

    /// Production date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum DispatchKind {
    /// Submit to the system spooler (lp)
    System,
    /// Open in the PDF viewer
    Viewer,
    /// Only save the file
    Save,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a label
    Print {
        #[command(flatten)]
        label: LabelArgs,

        /// Output path: document or direct-markup
        #[arg(long)]
        mode: Option<PrintMode>,

        /// Directory for PDFs and ZPL downloads
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// How the PDF reaches the printer
        #[arg(long, value_enum)]
        dispatch: Option<DispatchKind>,

        /// Spooler queue for --dispatch system
        #[arg(long)]
        printer: Option<String>,

        /// Exact Bluetooth name of the printer to prefer
        #[arg(long)]
        device_name: Option<String>,

        /// Give up connecting after this many seconds
        #[arg(long, value_name = "SECS")]
        connect_timeout: Option<u64>,

        /// Give up on a single chunk write after this many seconds
        #[arg(long, value_name = "SECS")]
        write_timeout: Option<u64>,

        /// Save the ZPL file without asking when no printer is connected
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Render the label to a PNG file
    Preview {
        #[command(flatten)]
        label: LabelArgs,

        /// Output file
        #[arg(long, value_name = "FILE")]
        png: PathBuf,

        /// Resolution in pixels per millimetre
        #[arg(long)]
        px_per_mm: Option<f32>,
    },

    /// Write the label's ZPL markup
    Zpl {
        #[command(flatten)]
        label: LabelArgs,

        /// Output file (stdout when omitted)
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List nearby printers
    Scan {
        /// Scan duration in seconds
        #[arg(long, default_value = "5")]
        seconds: u64,
    },

    /// Start the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,
    },

    /// Show or change persisted settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the settings file
    Show,
    /// Remember the preferred printer name (omit to clear)
    SetDevice { name: Option<String> },
}

/// Log to stderr so `zpl` output on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,etiketka=debug,btleplug=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> CliResult {
    let cli = Cli::parse();
    let settings_path = cli.settings.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load(&settings_path);

    match cli.command {
        Commands::Print {
            label,
            mode,
            output_dir,
            dispatch,
            printer,
            device_name,
            connect_timeout,
            write_timeout,
            yes,
        } => {
            let mut run_settings = settings.clone();
            if let Some(mode) = mode {
                run_settings.print_mode = mode;
            }
            if output_dir.is_some() {
                run_settings.output_dir = output_dir;
            }
            match dispatch {
                Some(DispatchKind::System) => {
                    run_settings.dispatch = PrintDispatch::SystemPrint { printer }
                }
                Some(DispatchKind::Viewer) => run_settings.dispatch = PrintDispatch::OpenViewer,
                Some(DispatchKind::Save) => run_settings.dispatch = PrintDispatch::SaveOnly,
                None => {}
            }
            if device_name.is_some() {
                run_settings.preferred_device_name = device_name;
            }
            if connect_timeout.is_some() {
                run_settings.connect_timeout_secs = connect_timeout;
            }
            if write_timeout.is_some() {
                run_settings.write_timeout_secs = write_timeout;
            }

            let mut form = build_form(&label, &settings)?;
            if !form.ready_to_print() {
                return Err("A weight is required to print (--weight)".into());
            }
            let printed = form.sequence();

            let outcome = if cli.simulate {
                print_label(MockAdapter::simulated(), &run_settings, &mut form, yes).await?
            } else {
                print_label(BtleAdapter::new(), &run_settings, &mut form, yes).await?
            };

            if outcome != PrintOutcome::Declined {
                settings.last_sequence = printed;
                settings.save(&settings_path)?;
            }
        }

        Commands::Preview {
            label,
            png,
            px_per_mm,
        } => {
            let form = build_form(&label, &settings)?;
            let font = LabelFont::load(&settings.font)?;
            let config = px_per_mm
                .map(|px_per_mm| RasterConfig { px_per_mm })
                .unwrap_or_default();
            let image = render_label(&form.snapshot(), &font, &config)?;
            std::fs::write(&png, to_png(&image)?)?;
            println!(
                "Saved {}x{} preview to {}",
                image.width(),
                image.height(),
                png.display()
            );
        }

        Commands::Zpl { label, output } => {
            let data = build_form(&label, &settings)?.snapshot();
            let zpl = markup::encode(&data);
            match output {
                Some(path) => {
                    std::fs::write(&path, &zpl)?;
                    println!("Saved {} to {}", markup::artifact_name(&data), path.display());
                }
                None => println!("{}", zpl),
            }
        }

        Commands::Scan { seconds } => {
            let duration = Duration::from_secs(seconds);
            if cli.simulate {
                scan(MockAdapter::simulated(), &settings, duration).await?;
            } else {
                scan(BtleAdapter::new(), &settings, duration).await?;
            }
        }

        Commands::Serve { listen } => {
            let config = ServerConfig {
                listen_addr: listen,
                simulate: cli.simulate,
            };
            if cli.simulate {
                server::serve(config, MockAdapter::simulated(), settings, Some(settings_path))
                    .await?;
            } else {
                server::serve(config, BtleAdapter::new(), settings, Some(settings_path)).await?;
            }
        }

        Commands::Config { command } => match command {
            ConfigCommand::Show => {
                println!("# {}", settings_path.display());
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }
            ConfigCommand::SetDevice { name } => {
                settings.preferred_device_name = name.filter(|n| !n.trim().is_empty());
                settings.save(&settings_path)?;
                match &settings.preferred_device_name {
                    Some(name) => println!("Preferred printer: {}", name),
                    None => println!("Preferred printer cleared"),
                }
            }
        },
    }

    Ok(())
}

fn build_form(args: &LabelArgs, settings: &Settings) -> Result<LabelForm, LabelError> {
    let mut form = match args.date {
        Some(date) => LabelForm::new(date),
        None => LabelForm::today(),
    }
    .with_sequence(settings.next_sequence());

    if let Some(sequence) = args.sequence {
        form.set_sequence(&sequence.to_string())?;
    }
    form.product = args.product;
    form.size = args.size.unwrap_or(settings.label_size);
    if let Some(weight) = &args.weight {
        form.set_weight(Weight::parse(weight)?);
    }
    Ok(form)
}

async fn print_label<A: PeripheralAdapter>(
    adapter: A,
    settings: &Settings,
    form: &mut LabelForm,
    assume_yes: bool,
) -> Result<PrintOutcome, Box<dyn std::error::Error>> {
    let session = Arc::new(PeripheralSession::with_config(
        adapter,
        settings.session_config(),
    ));
    let document = DocumentOutput::from_settings(settings)?;
    let mut coordinator =
        OutputCoordinator::new(Arc::clone(&session), document).with_mode(settings.print_mode);

    if settings.print_mode == PrintMode::DirectMarkup {
        match session
            .connect(settings.preferred_device_name.as_deref())
            .await
        {
            Ok(name) => println!("Connected to {}", name),
            Err(e) => eprintln!("{} ({})", e.operator_message(), e),
        }
    }

    let mut prompt = |name: &str| assume_yes || confirm(name);
    let result = coordinator.print(form, &mut prompt).await;
    session.disconnect().await;

    let outcome = result.map_err(|e: OutputError| {
        eprintln!("{}", e.operator_message());
        e
    })?;

    match &outcome {
        PrintOutcome::Printed { path } => println!("Label document: {}", path.display()),
        PrintOutcome::Transmitted { bytes, chunks } => {
            println!("Sent {} bytes to the printer in {} chunks", bytes, chunks)
        }
        PrintOutcome::Downloaded { path } => println!("Saved {}", path.display()),
        PrintOutcome::Declined => println!("Nothing printed"),
    }
    Ok(outcome)
}

/// Ask on the terminal whether to save the markup file.
fn confirm(file_name: &str) -> bool {
    print!(
        "Принтер не підключено. Завантажити файл {} для ручного друку? [y/N] ",
        file_name
    );
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "т" | "так")
}

async fn scan<A: PeripheralAdapter>(
    adapter: A,
    settings: &Settings,
    duration: Duration,
) -> CliResult {
    adapter.probe().await?;

    let mut request = DiscoveryRequest::printer(settings.preferred_device_name.as_deref());
    request.scan_duration = duration;
    println!("Scanning for {}s...", duration.as_secs());

    let mut found: Vec<_> = adapter
        .discover(&request)
        .await?
        .into_iter()
        .filter_map(|c| request.rank(&c).map(|rank| (rank, c)))
        .collect();
    found.sort_by_key(|(rank, _)| *rank);

    if found.is_empty() {
        println!("No printers found");
        return Ok(());
    }
    println!("Printers (best match first):");
    for (rank, candidate) in found {
        let name = candidate.name.as_deref().unwrap_or("(unnamed)");
        let marker = if rank == 0 { " [preferred]" } else { "" };
        println!("  {}{}", name, marker);
    }
    Ok(())
}
