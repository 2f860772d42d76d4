//! MobilSheets Conversion CLI
//!
//! Command-line front end for converting sheet music to MIDI: check files
//! against the allow-list, convert a file from disk, capture one from the
//! camera, or drive the client interactively.

use clap::{Parser, Subcommand};
use mobilsheets_client::{
    capture::{CaptureSessionManager, FacingMode},
    config::{ClientConfig, ConfigError},
    delivery::DirectorySink,
    media::CandidateFile,
    upload::{HttpConverter, UploadMode},
    workflow::{ClientOptions, Command, ConsoleNotifier, ConvertClient, Outcome},
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[cfg(feature = "camera")]
type DeviceProvider = mobilsheets_client::capture::NokhwaCameraProvider;
#[cfg(not(feature = "camera"))]
type DeviceProvider = mobilsheets_client::capture::MockCameraProvider;

type Client = ConvertClient<DeviceProvider, HttpConverter, DirectorySink, ConsoleNotifier>;

const EXIT_FAILURE: i32 = 1;
const EXIT_REJECTED: i32 = 2;
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Parser)]
#[command(name = "mobilsheets", version, about = "Convert sheet music images and PDFs to MIDI")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Conversion endpoint URL.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Multipart field name carrying the file.
    #[arg(long, global = true)]
    field: Option<String>,

    /// Response protocol: sync or task.
    #[arg(long, global = true)]
    mode: Option<UploadMode>,

    /// File name the artifact is saved under.
    #[arg(long, global = true)]
    download_name: Option<String>,

    /// Directory downloads are saved to.
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Replace an existing download.
    #[arg(long, global = true)]
    overwrite: bool,

    /// Accepted media type (repeatable; replaces the configured list).
    #[arg(long = "allow", global = true)]
    allow: Vec<String>,

    /// Print Prometheus metrics before exiting.
    #[arg(long, global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Validate files against the allow-list without uploading.
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Upload a file and save the converted result.
    Convert { file: PathBuf },
    /// Capture a frame from the camera and convert it.
    Capture {
        #[command(flatten)]
        camera: CameraArgs,
        /// Time the camera runs before the frame is taken.
        #[arg(long, default_value_t = 500)]
        warmup_ms: u64,
    },
    /// Read commands (file <path>, open, switch, capture, close) from stdin.
    Session {
        #[command(flatten)]
        camera: CameraArgs,
    },
}

#[derive(Debug, clap::Args)]
struct CameraArgs {
    /// Camera to use: front or back.
    #[arg(long)]
    facing: Option<FacingMode>,
    /// User-agent string used to pick the default camera.
    #[arg(long)]
    user_agent: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("MobilSheets client v{}", mobilsheets_client::VERSION);

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!("Failed to install interrupt handler: {}", e);
    }

    let code = run(cli, config, &interrupted).await;
    std::process::exit(code);
}

fn load_config(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };

    if let Some(endpoint) = &cli.endpoint {
        config.upload.endpoint = endpoint.clone();
    }
    if let Some(field) = &cli.field {
        config.upload.field_name = field.clone();
    }
    if let Some(mode) = cli.mode {
        config.upload.mode = mode;
    }
    if let Some(name) = &cli.download_name {
        config.output.download_name = name.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.clone();
    }
    if cli.overwrite {
        config.output.overwrite = true;
    }
    if !cli.allow.is_empty() {
        config.validation.allowed_types = cli.allow.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Client-backed work left once the action's camera arguments are taken.
enum Job {
    Convert(PathBuf),
    Capture { warmup_ms: u64 },
    Session,
}

async fn run(cli: Cli, config: ClientConfig, interrupted: &AtomicBool) -> i32 {
    let (camera, job) = match cli.action {
        Action::Check { files } => return check(&files, &config),
        Action::Convert { file } => (None, Job::Convert(file)),
        Action::Capture { camera, warmup_ms } => (Some(camera), Job::Capture { warmup_ms }),
        Action::Session { camera } => (Some(camera), Job::Session),
    };
    let facing = pick_facing(camera.as_ref(), &config);

    let mut client = match build_client(&config, facing) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to start client: {}", e);
            return EXIT_FAILURE;
        }
    };

    let code = match job {
        Job::Convert(file) => {
            match dispatch_or_interrupt(&mut client, Command::SelectFile(file), interrupted).await
            {
                Some(outcome) => exit_code(&outcome),
                None => EXIT_INTERRUPTED,
            }
        }
        Job::Capture { warmup_ms } => capture(&mut client, warmup_ms, interrupted).await,
        Job::Session => session(&mut client, interrupted).await,
    };

    if cli.print_metrics {
        match client.metrics().encode() {
            Ok(text) => print!("{}", text),
            Err(e) => warn!("Failed to encode metrics: {}", e),
        }
    }
    code
}

/// Runs `command` unless Ctrl-C arrives first.
///
/// An interrupted command is dropped mid-flight and the camera released;
/// `None` signals the interrupt.
async fn dispatch_or_interrupt(
    client: &mut Client,
    command: Command,
    interrupted: &AtomicBool,
) -> Option<Outcome> {
    let outcome = tokio::select! {
        outcome = client.dispatch(command) => Some(outcome),
        _ = wait_for(interrupted) => None,
    };
    if outcome.is_none() {
        warn!("Interrupted; abandoning in-flight command");
        client.dispatch(Command::CloseCamera).await;
    }
    outcome
}

fn pick_facing(camera: Option<&CameraArgs>, config: &ClientConfig) -> FacingMode {
    camera
        .and_then(|c| c.facing)
        .or(config.capture.facing)
        .or_else(|| {
            camera
                .and_then(|c| c.user_agent.as_deref())
                .map(FacingMode::from_user_agent)
        })
        .unwrap_or_else(FacingMode::for_host)
}

fn build_client(
    config: &ClientConfig,
    facing: FacingMode,
) -> Result<Client, Box<dyn std::error::Error>> {
    if cfg!(not(feature = "camera")) {
        warn!("Built without camera support; capture uses synthetic frames");
    }

    let sessions =
        CaptureSessionManager::new(DeviceProvider::default(), config.capture.clone(), facing);
    let converter = HttpConverter::new(config.upload.clone())?;
    let sink = DirectorySink::new(&config.output.dir, config.output.overwrite);
    let options = ClientOptions::from(config);

    info!(
        endpoint = %converter.endpoint(),
        mode = %config.upload.mode,
        %facing,
        "Client ready"
    );
    Ok(ConvertClient::new(sessions, converter, sink, ConsoleNotifier, options)?)
}

fn check(files: &[PathBuf], config: &ClientConfig) -> i32 {
    let allow_list = config.validation.allow_list();
    let mut code = 0;

    for path in files {
        match CandidateFile::from_path(path) {
            Ok(file) => match allow_list.check(&file) {
                Ok(()) => println!("{}: ok ({})", path.display(), file.media_type()),
                Err(e) => {
                    println!("{}: {}", path.display(), e);
                    code = code.max(EXIT_REJECTED);
                }
            },
            Err(e) => {
                eprintln!("{}", e);
                code = code.max(EXIT_FAILURE);
            }
        }
    }
    code
}

async fn capture(client: &mut Client, warmup_ms: u64, interrupted: &AtomicBool) -> i32 {
    let opened = client.dispatch(Command::OpenCamera).await;
    if !matches!(opened, Outcome::CameraStarted(_)) {
        return exit_code(&opened);
    }

    let deadline = tokio::time::Instant::now() + Duration::from_millis(warmup_ms);
    while tokio::time::Instant::now() < deadline {
        if interrupted.load(Ordering::SeqCst) {
            client.dispatch(Command::CloseCamera).await;
            return EXIT_INTERRUPTED;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    match dispatch_or_interrupt(client, Command::Capture, interrupted).await {
        Some(outcome) => exit_code(&outcome),
        None => EXIT_INTERRUPTED,
    }
}

async fn session(client: &mut Client, interrupted: &AtomicBool) -> i32 {
    println!("Commands: file <path>, open, switch, capture, close, quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last = 0;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = wait_for(interrupted) => {
                client.dispatch(Command::CloseCamera).await;
                return EXIT_INTERRUPTED;
            }
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read command: {}", e);
                break;
            }
        };
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => match dispatch_or_interrupt(client, command, interrupted).await {
                Some(outcome) => {
                    println!("{:?} [{}]", outcome, client.label());
                    last = exit_code(&outcome);
                }
                None => return EXIT_INTERRUPTED,
            },
            Err(e) => eprintln!("{}", e),
        }
    }

    client.dispatch(Command::CloseCamera).await;
    last
}

async fn wait_for(flag: &AtomicBool) {
    while !flag.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

fn exit_code(outcome: &Outcome) -> i32 {
    match outcome {
        Outcome::Delivered(_)
        | Outcome::CameraStarted(_)
        | Outcome::FacingChanged(_)
        | Outcome::CameraClosed => 0,
        Outcome::Rejected => EXIT_REJECTED,
        Outcome::Failed | Outcome::Superseded | Outcome::CameraUnavailable => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobilsheets_client::media::MediaType;

    #[tokio::test]
    async fn test_interrupt_abandons_stalled_upload() {
        // Accepts connections but never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let out = tempfile::tempdir().unwrap();

        let mut config = ClientConfig::default();
        config.upload.endpoint = format!("http://{addr}/convert-sync");
        config.output.dir = out.path().to_path_buf();
        let mut client = build_client(&config, FacingMode::Front).unwrap();

        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&interrupted);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            flag.store(true, Ordering::SeqCst);
        });

        let photo = CandidateFile::new("photo.png", MediaType::PNG, vec![1, 2, 3]);
        let outcome = tokio::time::timeout(
            Duration::from_secs(10),
            dispatch_or_interrupt(&mut client, Command::Submit(photo), &interrupted),
        )
        .await
        .expect("interrupt was not honoured");

        assert_eq!(outcome, None);
        assert!(!client.sessions().is_active());
        assert!(std::fs::read_dir(out.path()).unwrap().next().is_none());
        drop(listener);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&Outcome::Delivered(PathBuf::from("converted.mid"))), 0);
        assert_eq!(exit_code(&Outcome::Rejected), EXIT_REJECTED);
        assert_eq!(exit_code(&Outcome::Failed), EXIT_FAILURE);
        assert_eq!(exit_code(&Outcome::CameraUnavailable), EXIT_FAILURE);
    }
}
