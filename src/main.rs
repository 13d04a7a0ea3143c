use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use tokio::net::TcpListener;

use olympics_ical::cache::{self, Cache};
use olympics_ical::cli::{self, Args, Mode};
use olympics_ical::pipeline::build_calendar;
use olympics_ical::server::{self, AppState};
use olympics_ical::source::HttpSource;
use olympics_parser::Registry;

fn setup_logging() {
    if env::var("LOG").is_err() {
        env::set_var("LOG", "olympics_ical=info,olympics_parser=info");
    }

    pretty_env_logger::init_custom_env("LOG");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse(env::args().skip(1).collect());
    setup_logging();

    let registry = args.registry()?;

    match args.mode {
        Mode::List => {
            for sport in registry.sports() {
                println!("{}", sport.name());
            }
            Ok(())
        }
        Mode::Export => export(&args, &registry).await,
        Mode::Serve => serve(&args, registry).await,
    }
}

async fn export(args: &Args, registry: &Registry) -> Result<()> {
    let sports = args.selected_sports(registry);
    let calendar = build_calendar(&HttpSource::new(), registry, &sports, args.policy).await?;
    let ics = calendar.to_ics().to_string();

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(calendar.file_name()));

    if path.as_os_str() == "-" {
        io::stdout().write_all(ics.as_bytes())?;
        return Ok(());
    }

    fs::write(&path, ics).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(
        "Wrote {} calendar entries to {}",
        calendar.entries.len(),
        path.display()
    );

    Ok(())
}

async fn serve(args: &Args, registry: Registry) -> Result<()> {
    let cache = Cache::new(cache::Config {
        enabled: args.enable_cache,
        ttl: args.cache_ttl,
    });

    if cache.is_enabled() {
        info!("Caching parsed schedules for {}s", args.cache_ttl.as_secs());
    }

    let router = server::router(AppState {
        registry,
        source: HttpSource::new(),
        cache,
    });

    let listener = TcpListener::bind(args.address).await?;
    info!("Listening at http://{}", args.address);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
