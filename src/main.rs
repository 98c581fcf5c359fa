//! Lookout - application watchdog
//!
//! Probes declared applications through trigger expressions (HTTP fetch,
//! file read, ICMP ping) and runs repair actions for the ones that fail.

mod cli;
mod error;
mod mail;
mod manifest;
mod probe;
mod repair;
mod trigger;
mod watcher;

use cli::{Cli, Commands};
use error::Result;
use watcher::Watcher;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Completion { shell } => {
            cli::Cli::generate_completion(shell);
        }

        Commands::Check => {
            let config = manifest::load(&cli.config)?;

            let mut invalid = 0;
            for app in &config.applications {
                if let Err(e) = trigger::Trigger::parse(&app.trigger) {
                    eprintln!("{}: {}", app.name, e);
                    invalid += 1;
                }
            }

            if invalid > 0 {
                eprintln!("Configuration has {} invalid trigger(s)", invalid);
                std::process::exit(1);
            }
            println!(
                "Configuration OK: {} application(s)",
                config.applications.len()
            );
        }

        Commands::List { json } => {
            let config = manifest::load(&cli.config)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&config.applications)?);
            } else {
                for app in &config.applications {
                    println!("{:<24} {}", app.name, app.trigger);
                }
            }
        }

        Commands::Run { no_repair, json } => {
            let config = manifest::load(&cli.config)?;

            let mut watcher = Watcher::new(config).verbose(cli.verbose);
            watcher.run(!no_repair);

            let failures = watcher.failures();
            if json {
                println!("{}", serde_json::to_string_pretty(failures)?);
            } else if failures.is_empty() {
                println!("All applications healthy");
            } else {
                println!("{} application(s) failing:", failures.len());
                for app in failures {
                    println!("  {}", app.name);
                }
            }
        }
    }

    Ok(())
}
