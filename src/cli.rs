use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::{env, process};

use anyhow::{Context, Result};
use getopts::Options;
use olympics_parser::Registry;
use tokio::time::Duration;

use crate::pipeline::FailurePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Write the calendar of the selected sports to a file.
    Export,
    List,
    Serve,
}

#[derive(Debug)]
pub struct Args {
    pub mode: Mode,
    pub sports: Vec<String>,
    pub all: bool,
    pub output: Option<PathBuf>,
    pub year: Option<i32>,
    pub taxonomy: Option<PathBuf>,
    pub policy: FailurePolicy,
    pub address: SocketAddr,
    pub enable_cache: bool,
    pub cache_ttl: Duration,
}

#[derive(Debug)]
pub enum Parsed {
    Help(String),
    Run(Args),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optflag("l", "list", "List the known sports and exit");
    opts.optflag("A", "all", "Select every known sport");
    opts.optopt(
        "o",
        "output",
        "File to write the calendar to, `-` for stdout [Default: <calendar name>.ics]",
        "FILE",
    );
    opts.optopt(
        "y",
        "year",
        "Year the schedule dates belong to [Default: from taxonomy]",
        "YEAR",
    );
    opts.optopt(
        "t",
        "taxonomy",
        "TOML file with games, sports and categories [Default: built-in Tokyo 2020]",
        "FILE",
    );
    opts.optflag(
        "k",
        "keep-going",
        "Leave out sports whose schedule cannot be fetched instead of failing",
    );
    opts.optflag("s", "serve", "Serve calendars over HTTP instead of writing a file");
    opts.optopt(
        "a",
        "address",
        "Socket address (IP and port) to listen on [Default: 127.0.0.1:8080]",
        "SOCKET_ADDRESS",
    );
    opts.optflag(
        "c",
        "enable-cache",
        "Enable caching of parsed schedules when serving [Default: false]",
    );
    opts.optopt(
        "",
        "cache-ttl",
        "Time-to-live for cached schedules [Default: 3600]",
        "SECONDS",
    );
    opts
}

pub fn usage() -> String {
    let opts = opts();
    opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME")))
}

/// Parses arguments, program name excluded.
pub fn try_parse(args: Vec<String>) -> Result<Parsed, String> {
    let matches = opts().parse(args).map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        return Ok(Parsed::Help(usage()));
    }

    let mode = if matches.opt_present("list") {
        Mode::List
    } else if matches.opt_present("serve") {
        Mode::Serve
    } else {
        Mode::Export
    };

    let all = matches.opt_present("all");
    let sports = matches.free.clone();

    if mode == Mode::Export && !all && sports.is_empty() {
        return Err("No sports selected, pass sport names or --all".to_string());
    }

    let address = matches
        .opt_get_default("address", SocketAddr::from(([127, 0, 0, 1], 8080)))
        .map_err(|err| format!("Provided value for option 'address' is invalid: {err}"))?;

    let year = matches
        .opt_get::<i32>("year")
        .map_err(|err| format!("Provided value for option 'year' is invalid: {err}"))?;

    let cache_ttl = matches
        .opt_get_default("cache-ttl", 3600)
        .map(Duration::from_secs)
        .map_err(|err| format!("Provided value for option 'cache-ttl' is invalid: {err}"))?;

    let policy = if matches.opt_present("keep-going") {
        FailurePolicy::Skip
    } else {
        FailurePolicy::Abort
    };

    Ok(Parsed::Run(Args {
        mode,
        sports,
        all,
        output: matches.opt_str("output").map(PathBuf::from),
        year,
        taxonomy: matches.opt_str("taxonomy").map(PathBuf::from),
        policy,
        address,
        enable_cache: matches.opt_present("enable-cache"),
        cache_ttl,
    }))
}

/// Like [`try_parse`], but prints help or errors and exits.
pub fn parse(args: Vec<String>) -> Args {
    match try_parse(args) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help(usage)) => {
            println!("{usage}");
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

impl Args {
    /// Loads the taxonomy and applies the year override.
    pub fn registry(&self) -> Result<Registry> {
        let registry = match &self.taxonomy {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Registry::from_toml(text)
                    .with_context(|| format!("Failed to load {}", path.display()))?
            }
            None => Registry::tokyo_2020()?,
        };

        Ok(match self.year {
            Some(year) => registry.with_year(year),
            None => registry,
        })
    }

    /// Sports to export, in the order given.
    pub fn selected_sports(&self, registry: &Registry) -> Vec<String> {
        if self.all {
            return registry
                .sports()
                .iter()
                .map(|sport| sport.name().to_string())
                .collect();
        }

        self.sports.clone()
    }
}
