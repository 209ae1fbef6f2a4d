use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use imglib_asset::AssetPath;
use imglib_core::{generate_registry, RegistryConfig, SyncReport, TracingLogger};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code for a clean run
const EXIT_OK: u8 = 0;

/// Exit code for a pass that completed but needs attention
const EXIT_PROBLEMS: u8 = 2;

fn location_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("assets")
                .long("assets")
                .value_parser(value_parser!(PathBuf))
                .help("Assets root (default ./src/assets/library)"),
        )
        .arg(
            Arg::new("registry")
                .long("registry")
                .value_parser(value_parser!(PathBuf))
                .help("Registry root (default ./src/content/library)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with assets_dir / registry_dir / concurrency / dry_run"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the report as JSON"),
        )
}

fn cli() -> Command {
    Command::new("imglib")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Keep asset metadata records in sync with an asset tree")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log per-record detail"),
        )
        .subcommand(
            location_args(Command::new("sync").about("Run one reconciliation pass"))
                .arg(
                    Arg::new("concurrency")
                        .long("concurrency")
                        .value_parser(value_parser!(usize))
                        .help("Assets processed at once"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Report without writing records"),
                ),
        )
        .subcommand(
            location_args(Command::new("orphans").about("List records with no matching asset")),
        )
        .subcommand(
            Command::new("id")
                .about("Print the identifier derived from asset paths")
                .arg(
                    Arg::new("paths")
                        .required(true)
                        .num_args(1..)
                        .help("Paths relative to the assets root"),
                ),
        )
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the pass configuration: file (or defaults), then flag overrides
fn config_from(args: &ArgMatches, cwd: &Path) -> anyhow::Result<RegistryConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(file) => {
            let file = cwd.join(file);
            RegistryConfig::load(&file)
                .with_context(|| format!("loading {}", file.display()))?
        }
        None => RegistryConfig::default().resolve_against(cwd),
    };

    if let Some(assets) = args.get_one::<PathBuf>("assets") {
        config.assets_dir = cwd.join(assets);
    }
    if let Some(registry) = args.get_one::<PathBuf>("registry") {
        config.registry_dir = cwd.join(registry);
    }
    if let Ok(Some(concurrency)) = args.try_get_one::<usize>("concurrency") {
        config.concurrency = *concurrency;
    }
    if args.try_get_one::<bool>("dry-run").ok().flatten() == Some(&true) {
        config.dry_run = true;
    }

    config.validate()?;
    Ok(config)
}

fn print_report(report: &SyncReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

async fn run_sync(args: &ArgMatches, cwd: &Path) -> anyhow::Result<u8> {
    let config = config_from(args, cwd)?;
    tracing::info!(
        assets = %config.assets_dir.display(),
        registry = %config.registry_dir.display(),
        dry_run = config.dry_run,
        "starting registry sync"
    );

    let report = generate_registry(&config, &TracingLogger)
        .await
        .context("registry sync failed")?;
    print_report(&report, args.get_flag("json"))?;

    Ok(if report.has_problems() {
        EXIT_PROBLEMS
    } else {
        EXIT_OK
    })
}

async fn run_orphans(args: &ArgMatches, cwd: &Path) -> anyhow::Result<u8> {
    let config = config_from(args, cwd)?.with_dry_run(true);
    let report = generate_registry(&config, &TracingLogger)
        .await
        .context("orphan scan failed")?;

    if report.orphans_skipped {
        tracing::warn!("asset scan was incomplete; orphans cannot be listed");
        return Ok(EXIT_PROBLEMS);
    }
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report.orphaned)?);
    } else {
        for id in &report.orphaned {
            println!("{id}");
        }
    }
    Ok(EXIT_OK)
}

fn run_id(args: &ArgMatches) -> u8 {
    for path in args.get_many::<String>("paths").into_iter().flatten() {
        let asset = AssetPath::new(path);
        println!("{}\t{}", asset.id(), asset);
    }
    EXIT_OK
}

async fn run(matches: ArgMatches) -> anyhow::Result<u8> {
    let cwd = std::env::current_dir().context("resolving working directory")?;
    match matches.subcommand() {
        Some(("sync", args)) => run_sync(args, &cwd).await,
        Some(("orphans", args)) => run_orphans(args, &cwd).await,
        Some(("id", args)) => Ok(run_id(args)),
        _ => Ok(EXIT_OK),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match run(matches).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
