//! Terminal scan station for a dispatch-bay workstation.
//!
//! A keyboard-wedge scanner types each label followed by Enter. Lines that
//! start with `:` are operator commands:
//!
//! ```text
//! :order <id>     select a dispatch order
//! :reset          drop the selected order
//! :remove <n|id>  remove the n-th listed roll (or by unit id)
//! :next           move to the next lot once the active one is full
//! :submit         persist the scanned rolls
//! :status         show lots and scanned rolls
//! :history        show rolls already loaded against the order
//! :quit           leave the station
//! ```

use std::io::{self, Read};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use dotenvy::dotenv;

use pushkind_dispatch::db::{establish_connection_pool, run_migrations};
use pushkind_dispatch::domain::scan_buffer::{Key, KeyDecoder, KeyStroke, KeyTarget, ScanBuffer};
use pushkind_dispatch::domain::types::UnitId;
use pushkind_dispatch::domain::variant::WorkflowVariant;
use pushkind_dispatch::dto::workflow::{SessionSummary, SubmitReport};
use pushkind_dispatch::models::config::ServerConfig;
use pushkind_dispatch::repository::DieselRepository;
use pushkind_dispatch::services::registry::{SessionRegistry, WorkstationKey};
use pushkind_dispatch::services::{WorkflowResult, dispatch_history, workflow};

#[derive(Parser)]
#[command(name = "scan_station", version, about = "Dispatch bay scan station")]
struct Args {
    /// Workflow to run: pick, load or pick-load
    #[arg(long, short)]
    variant: WorkflowVariant,

    /// Dispatch order to select on start-up
    #[arg(long, short)]
    order: Option<String>,

    /// Name recorded in the logs for this station
    #[arg(long, default_value = "scan-station")]
    operator: String,

    /// Overrides the configured database URL
    #[arg(long)]
    database_url: Option<String>,
}

struct Station {
    repo: DieselRepository,
    registry: SessionRegistry,
    key: WorkstationKey,
    advance_notice: Duration,
}

enum Flow {
    Continue,
    Quit,
}

impl Station {
    fn select_order(&self, order: &str) {
        match workflow::validate_dispatch_order(&self.repo, &self.registry, &self.key, order) {
            Ok(summary) => {
                println!("Dispatch order {order} selected.");
                print_summary(&summary);
            }
            Err(err) => println!("! {err}"),
        }
    }

    fn scan(&self, label: &str) {
        match workflow::scan_roll(&self.repo, &self.registry, &self.key, label) {
            Ok(outcome) => {
                println!(
                    "+ roll {} lot {} ({} to go)",
                    outcome.unit.fg_roll_no, outcome.unit.lot_no, outcome.remaining
                );
                if let Some(completion) = outcome.completion {
                    match completion.next_lot_no {
                        Some(next) => {
                            println!("Lot {} complete. Next lot: {next}", completion.lot_no);
                            // Keep the notice on screen before the next lot is shown.
                            thread::sleep(self.advance_notice);
                            print_summary(&outcome.summary);
                        }
                        None => println!(
                            "Lot {} complete. All lots scanned, ready to submit.",
                            completion.lot_no
                        ),
                    }
                }
            }
            Err(err) => println!("! {err}"),
        }
    }

    fn command(&self, line: &str) -> Flow {
        let mut parts = line.trim_start_matches(':').split_whitespace();
        let name = parts.next().unwrap_or_default();
        let argument = parts.next();

        let result: WorkflowResult<()> = match (name, argument) {
            ("quit" | "q", _) => return Flow::Quit,
            ("order", Some(order)) => {
                self.select_order(order);
                Ok(())
            }
            ("reset", _) => workflow::reset_dispatch_order(&self.registry, &self.key),
            ("remove", Some(target)) => self.remove(target),
            ("next", _) => workflow::advance_lot(&self.registry, &self.key).map(|summary| {
                print_summary(&summary);
            }),
            ("submit", _) => workflow::submit_scans(&self.repo, &self.registry, &self.key)
                .map(|report| print_report(&report)),
            ("status", _) => {
                print_summary(&workflow::load_session_summary(&self.registry, &self.key));
                Ok(())
            }
            ("history", _) => self.history(),
            _ => {
                println!("? unknown command `{line}`");
                Ok(())
            }
        };

        if let Err(err) = result {
            println!("! {err}");
        }
        Flow::Continue
    }

    fn remove(&self, target: &str) -> WorkflowResult<()> {
        let summary = workflow::load_session_summary(&self.registry, &self.key);
        let unit_id = match target.parse::<usize>() {
            Ok(position) => summary
                .units
                .get(position.wrapping_sub(1))
                .map(|unit| unit.id),
            Err(_) => target.parse::<UnitId>().ok(),
        };

        match unit_id {
            Some(unit_id) => match workflow::remove_unit(&self.registry, &self.key, unit_id) {
                Some(unit) => println!("- roll {} lot {}", unit.fg_roll_no, unit.lot_no),
                None => println!("? roll {target} is not in the list"),
            },
            None => println!("? roll {target} is not in the list"),
        }
        Ok(())
    }

    fn history(&self) -> WorkflowResult<()> {
        let summary = workflow::load_session_summary(&self.registry, &self.key);
        let Some(order) = summary.dispatch_order_id else {
            println!("No dispatch order selected.");
            return Ok(());
        };

        let history = dispatch_history::load_dispatch_history(&self.repo, order.as_str())?;
        println!(
            "Dispatch order {}: {} rolls, gross {} net {}",
            history.dispatch_order_id, history.total_rolls, history.gross_weight, history.net_weight
        );
        for lot in &history.lots {
            println!(
                "  lot {}: {} rolls, gross {} net {}",
                lot.lot_no,
                lot.rolls.len(),
                lot.gross_weight,
                lot.net_weight
            );
        }
        Ok(())
    }
}

fn print_summary(summary: &SessionSummary) {
    let Some(order) = &summary.dispatch_order_id else {
        println!("No dispatch order selected.");
        return;
    };

    println!("Dispatch order {order} ({})", summary.variant.title());
    for lot in &summary.lots {
        let marker = if lot.is_active { '>' } else { ' ' };
        println!(
            "{marker} lot {} [{}] {}/{} gross {} net {}",
            lot.lot_no, lot.tape, lot.scanned, lot.target, lot.gross_weight, lot.net_weight
        );
    }
    for (position, unit) in summary.units.iter().enumerate() {
        println!(
            "  {:>3}. {} {} {} ({})",
            position + 1,
            unit.lot_no,
            unit.machine_name,
            unit.fg_roll_no,
            unit.gross_weight
        );
    }
}

fn print_report(report: &SubmitReport) {
    println!(
        "Submitted {} rolls for dispatch order {}.",
        report.submitted, report.dispatch_order_id
    );
    for failure in &report.failures {
        match &failure.fg_roll_no {
            Some(roll_no) => println!("! roll {roll_no} lot {}: {}", failure.lot_no, failure.message),
            None => println!("! weights of lot {}: {}", failure.lot_no, failure.message),
        }
    }
}

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args = Args::parse();

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let database_url = args
        .database_url
        .clone()
        .unwrap_or_else(|| server_config.database_url.clone());

    let pool = match establish_connection_pool(&database_url) {
        Ok(pool) => pool,
        Err(err) => {
            log::error!("Failed to establish database connection: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run_migrations(&pool) {
        log::error!("Failed to run migrations: {err}");
        std::process::exit(1);
    }

    let station = Station {
        repo: DieselRepository::new(pool),
        registry: SessionRegistry::new(),
        key: WorkstationKey::new(args.operator.clone(), args.variant),
        advance_notice: server_config.lot_advance_notice(),
    };

    println!("{} ready. Type :quit to leave.", args.variant.title());
    if let Some(order) = &args.order {
        station.select_order(order);
    }

    let mut decoder = KeyDecoder::default();
    let mut buffer = ScanBuffer::new(server_config.scan_key_gap());
    let mut line = String::new();

    'input: for byte in io::stdin().lock().bytes() {
        let byte = match byte {
            Ok(byte) => byte,
            Err(err) => {
                log::error!("Failed to read from the scanner: {err}");
                std::process::exit(1);
            }
        };

        for key in decoder.feed(byte) {
            if let Key::Char(c) = key {
                line.push(c);
            }
            // Command lines are typed by the operator and never reach the scan buffer.
            let target = if line.starts_with(':') {
                KeyTarget::TextInput
            } else {
                KeyTarget::Document
            };

            if key == Key::Enter {
                let finished = std::mem::take(&mut line);
                if finished.starts_with(':') {
                    if let Flow::Quit = station.command(&finished) {
                        break 'input;
                    }
                    continue;
                }
            }

            if let Some(label) = buffer.push(KeyStroke {
                key,
                target,
                at: Instant::now(),
            }) {
                station.scan(&label);
            }
        }
    }

    log::info!("Scan station for {} closed", args.variant);
}
