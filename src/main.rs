use std::env;
use std::path::PathBuf;
use std::process;

use precache_worker::{
    Cache, CacheStorage, DiskCacheStorage, HttpFetcher, InstallOutcome, Request,
    ServiceWorker, StorageConfig, WorkerConfig,
};

fn print_usage() {
    eprintln!("Usage: precache [OPTIONS] <COMMAND>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  install             Open the cache and pre-cache every configured asset");
    eprintln!("  fetch <path>...     Serve paths through the worker (cache first, then network)");
    eprintln!("  list                List caches and their entries");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <FILE>     Worker config (TOML); compiled-in defaults otherwise");
    eprintln!("  --dir <DIR>         Cache storage root (default: platform cache dir)");
    eprintln!("  -h, --help          Show this help");
    eprintln!();
    eprintln!("Set RUST_LOG to change log verbosity (default: info).");
}

struct Args {
    command: String,
    paths: Vec<String>,
    config: Option<PathBuf>,
    dir: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut command = None;
    let mut paths = Vec::new();
    let mut config = None;
    let mut dir = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            flag @ ("--config" | "--dir") => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Error: {} requires a value", flag);
                    process::exit(1);
                };
                if flag == "--config" {
                    config = Some(PathBuf::from(value));
                } else {
                    dir = Some(PathBuf::from(value));
                }
            }
            arg if command.is_none() => command = Some(arg.to_string()),
            arg => paths.push(arg.to_string()),
        }
        i += 1;
    }

    let Some(command) = command else {
        print_usage();
        process::exit(1);
    };

    Args {
        command,
        paths,
        config,
        dir,
    }
}

#[tokio::main]
async fn main() -> precache_worker::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let config = match &args.config {
        Some(path) => WorkerConfig::load(path)?,
        None => WorkerConfig::default(),
    };
    let root = StorageConfig { root: args.dir }.root()?;
    let storage = DiskCacheStorage::new(root);

    match args.command.as_str() {
        "install" => {
            let worker = ServiceWorker::new(config, storage, HttpFetcher::new()?);
            match worker.on_install().await {
                InstallOutcome::Populated { assets } => {
                    println!("Cached {} assets in {}", assets, worker.cache_name());
                }
                outcome => {
                    if let Some(err) = outcome.error() {
                        println!("Install completed without caching: {}", err);
                    }
                }
            }
        }
        "fetch" => {
            if args.paths.is_empty() {
                eprintln!("Error: fetch requires at least one path");
                process::exit(1);
            }
            let worker = ServiceWorker::new(config, storage, HttpFetcher::new()?);
            for path in &args.paths {
                let url = worker.config().resolve(path)?;
                let request = Request::get(url.as_str());
                match worker.on_fetch(&request).await {
                    Ok(outcome) => println!(
                        "{} {} ({:?}, {} bytes)",
                        outcome.response.status,
                        request.url,
                        outcome.source,
                        outcome.response.body.len()
                    ),
                    Err(err) => println!("failed {}: {}", request.url, err),
                }
            }
        }
        "list" => {
            for name in storage.keys().await? {
                println!("{}", name);
                let cache = storage.open(&name).await?;
                for request in cache.keys().await? {
                    println!("  {} {}", request.method, request.url);
                }
            }
        }
        other => {
            eprintln!("Error: unknown command '{}'", other);
            print_usage();
            process::exit(1);
        }
    }

    Ok(())
}
