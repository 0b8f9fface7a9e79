use std::process;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use washroom::{Simulation, SimulationConfig, VersionInfo};

const USAGE: &str = "Usage: washroom [--seed <u64>] [--json]";

#[derive(Debug, PartialEq, Eq)]
struct Args {
    seed: Option<u64>,
    json: bool,
    version: bool,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let args = match parse_args(&args) {
        Ok(v) => v,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {msg}");
                eprintln!();
            }
            eprintln!("{USAGE}");
            eprintln!();
            eprintln!("Options:");
            eprintln!("  --seed <u64>     Seed for class assignment [default: 1]");
            eprintln!("  --json           Print the report as JSON");
            eprintln!("  --version        Print version and exit");
            eprintln!();
            eprintln!("Environment:");
            eprintln!("  WASHROOM_LOG     Log level: debug, info, warn, error [default: info]");
            eprintln!("  LOG_FORMAT       Set to 'json' for JSON logs");
            process::exit(2);
        }
    };

    if args.version {
        println!("{}", VersionInfo::new().with_binary("washroom".to_string()));
        return;
    }

    init_tracing();

    if let Err(e) = run(&args) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args {
        seed: None,
        json: false,
        version: false,
    };

    let mut i = 1; // skip argv[0]
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                let raw = args.get(i).ok_or("--seed requires a value")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|e| format!("invalid seed '{raw}': {e}"))?;
                parsed.seed = Some(seed);
            }
            "--json" => parsed.json = true,
            "--version" | "-V" => parsed.version = true,
            "--help" | "-h" => return Err(String::new()),
            arg if arg.starts_with('-') => return Err(format!("unknown flag: {arg}")),
            arg => return Err(format!("unexpected argument: {arg}")),
        }
        i += 1;
    }

    Ok(parsed)
}

/// Initialize tracing with WASHROOM_LOG and LOG_FORMAT support.
fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match std::env::var("WASHROOM_LOG").as_deref() {
            Ok("trace") => "trace",
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("washroom={level}"))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let mut config = SimulationConfig::default();
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let report = Simulation::run(config)
        .context("simulation failed")?
        .with_version(VersionInfo::new().with_binary("washroom".to_string()));

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
    } else {
        println!("{report}");
    }

    Ok(())
}
