//! Team chess tournament desk.
//!
//! Runs a single command against the configured store and prints the
//! outcome.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Error;
use log::info;
use pico_args::Arguments;
use tc_desk::{Command, ConfigOverrides, DeskConfig, Session, logging, report};

const HELP: &str = "\
Record results, keep the schedule in line and publish standings for a team chess event

USAGE:
  tc_desk [OPTIONS] <COMMAND>

COMMANDS:
  schedule                                   Ensure the full round-robin schedule
  verify-round N                             Diff round N against the expected schedule
  cleanup-rounds                             Remove duplicate round rows
  record [--a-color C] PAIRING DESK A B RESULT
                                             Save one board (RESULT: 1-0, 0.5-0.5, 0-1, pending)
  commit-round --draft FILE N                Save round N from a JSON draft
  standings [--live] [--max-age SECS]        Show standings, from the snapshot unless --live
  publish                                    Recompute and publish the live snapshot
  desks                                      Per-desk tables

OPTIONS:
  --data       FILE        JSON data file              [default: env TC_DATA_FILE or db.json]
  --db-url     URL         PostgreSQL connection       [default: env DATABASE_URL]
  --tournament ID          Tournament id for round ids [default: env TOURNAMENT_ID or default]
  --json                   Print JSON instead of text

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  DESK_WEIGHT_SCALE        Extra weight of desk 1 in tb_desk      [default: 0.5]
  BLACK_BONUS              Bonus for points scored with black     [default: 0.10]
  TEAM_SCORING             boards or matches                      [default: boards]
  SNAPSHOT_MAX_AGE_SECS    Oldest snapshot `standings` accepts
  DB_MAX_CONNECTIONS       PostgreSQL pool size                   [default: 5]
  DB_MIN_CONNECTIONS       PostgreSQL idle pool size              [default: 1]
  RUST_LOG                 Log filter                             [default: info,sqlx=warn]
";

struct Args {
    overrides: ConfigOverrides,
    json: bool,
    command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = match parse_args(&mut pargs) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n\n{HELP}", e.client_message());
            std::process::exit(2);
        }
    };

    let config = DeskConfig::from_env(args.overrides)?;
    config.validate()?;

    logging::init();
    info!(
        "Tournament '{}', team scoring: {}",
        config.tournament_id, config.scoring.team_scoring
    );

    let session = match Session::open(&config).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("error: {}", e.client_message());
            std::process::exit(1);
        }
    };

    let name = args.command.name();
    let started = Instant::now();
    let result = session.run(args.command).await;
    logging::log_command(name, started.elapsed(), result.is_ok());

    match result {
        Ok(outcome) => {
            print!("{}", report::render(&outcome, args.json)?);
            if args.json {
                println!();
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("error: {}", e.client_message());
            std::process::exit(1);
        }
    }
}

fn parse_args(pargs: &mut Arguments) -> Result<Args, tc_desk::DeskError> {
    let usage = |e: pico_args::Error| tc_desk::DeskError::Usage(e.to_string());
    let overrides = ConfigOverrides {
        data_file: pargs.opt_value_from_str::<_, PathBuf>("--data").map_err(usage)?,
        database_url: pargs.opt_value_from_str("--db-url").map_err(usage)?,
        tournament_id: pargs.opt_value_from_str("--tournament").map_err(usage)?,
    };
    let json = pargs.contains("--json");
    let command = Command::parse(pargs)?;
    Ok(Args {
        overrides,
        json,
        command,
    })
}
