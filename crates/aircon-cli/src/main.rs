//! aircon - air-conditioner decision engine CLI
//!
//! ## Commands
//!
//! - `decide`: recommend setpoint, mode, fan and flap for the given conditions
//! - `plan`: the goal planner's independent recommendation
//! - `compare`: decide, then show stored history, the new output and the plan
//! - `history`: list stored cases

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Timelike;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, Level};

use aircon_core::metrics::METRICS;
use aircon_core::{
    plan, AcType, CaseEntry, CaseMemory, CaseMemoryConfig, CompressorType,
    ConditionSource, Conditions, DecisionOutcome, DecisionSource, DecisionTrace, FixedConditions,
    InputRecord, Movement, OutputRecord, PlanInput, PlanRecord, Position, SimulatedConditions,
    TimeOfDay,
};
use aircon_state::fakes::MemoryCaseStore;
use aircon_state::{CaseStore, JsonlCaseStore, SurrealCaseStore};

#[derive(Parser)]
#[command(name = "aircon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Air-conditioner decision engine with case memory", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// How results are printed on stdout
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Case store backend
    #[arg(long, global = true, value_enum, env = "AIRCON_BACKEND", default_value_t = Backend::File)]
    backend: Backend,

    /// Case log path for the file backend
    #[arg(long, global = true, env = "AIRCON_STORE", default_value = ".aircon/cases.jsonl")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// JSON-lines file at --store
    File,
    /// SurrealDB from SURREALDB_* environment variables
    Surreal,
    /// Process-local, discarded on exit
    Memory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend AC settings, reusing a stored decision when one matches
    Decide {
        #[command(flatten)]
        conditions: ConditionArgs,

        #[command(flatten)]
        unit: UnitArgs,

        /// Also print the engine's intermediate values
        #[arg(long)]
        explain: bool,
    },

    /// Goal planner recommendation from temperature and humidity only
    Plan {
        #[command(flatten)]
        conditions: ConditionArgs,
    },

    /// Decide, then show previous data beside the new output and the plan
    Compare {
        #[command(flatten)]
        conditions: ConditionArgs,

        #[command(flatten)]
        unit: UnitArgs,
    },

    /// List stored cases, oldest first
    History {
        /// Show only the most recent N cases
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Args, Clone, Debug)]
struct ConditionArgs {
    /// Room temperature (°C); simulated when omitted
    #[arg(long)]
    room_temp: Option<f64>,

    /// Relative humidity (%); simulated when omitted
    #[arg(long)]
    humidity: Option<f64>,

    /// Seed for simulated conditions
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Clone, Debug)]
struct UnitArgs {
    /// Number of occupants
    #[arg(long)]
    num_people: u32,

    /// Occupant movement detected (Yes/No)
    #[arg(long)]
    movement: Movement,

    /// Time of day, 24h HH:MM; local time when omitted
    #[arg(long)]
    timing: Option<TimeOfDay>,

    /// Occupant positions as clock hours, e.g. 11o or 11o,2o
    #[arg(long)]
    position: Position,

    /// Window AC, Split AC, Cassette AC or Portable AC
    #[arg(long)]
    ac_type: AcType,

    /// Reciprocating, Inverter Rotary, Fixed Speed Rotary or Scroll
    #[arg(long)]
    compressor: CompressorType,

    /// Rated capacity (tons)
    #[arg(long)]
    tonnage: f64,

    /// Seasonal efficiency rating
    #[arg(long)]
    iseer: f64,

    /// Other heat sources in the room (W)
    #[arg(long, default_value_t = 0.0)]
    external_heat: f64,

    /// Floor area (sq ft)
    #[arg(long)]
    room_size: f64,

    /// Daily energy budget (kWh)
    #[arg(long)]
    affordable_units: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    aircon_core::init_tracing(cli.json, level);

    let result = match cli.command {
        Commands::Plan { conditions } => cmd_plan(&conditions, cli.output),
        Commands::Decide {
            conditions,
            unit,
            explain,
        } => {
            let memory = open_memory(cli.backend, &cli.store).await?;
            cmd_decide(&memory, &conditions, &unit, explain, cli.output).await
        }
        Commands::Compare { conditions, unit } => {
            let memory = open_memory(cli.backend, &cli.store).await?;
            cmd_compare(&memory, &conditions, &unit, cli.output).await
        }
        Commands::History { limit } => {
            let memory = open_memory(cli.backend, &cli.store).await?;
            cmd_history(&memory, limit, cli.output).await
        }
    };

    METRICS.flush();
    result
}

async fn open_store(backend: Backend, path: &Path) -> Result<Arc<dyn CaseStore>> {
    let store: Arc<dyn CaseStore> = match backend {
        Backend::File => Arc::new(
            JsonlCaseStore::open(path)
                .with_context(|| format!("Failed to open case log {}", path.display()))?,
        ),
        Backend::Surreal => Arc::new(
            SurrealCaseStore::from_env()
                .await
                .context("Failed to connect to case database")?,
        ),
        Backend::Memory => Arc::new(MemoryCaseStore::new()),
    };
    info!(backend = ?backend, "case store ready");
    Ok(store)
}

async fn open_memory(backend: Backend, path: &Path) -> Result<CaseMemory> {
    let store = open_store(backend, path).await?;
    Ok(CaseMemory::new(store, CaseMemoryConfig::from_env()))
}

/// Fill in whichever of temperature and humidity the user left out.
fn read_conditions(args: &ConditionArgs) -> Conditions {
    let mut source: Box<dyn ConditionSource> = match (args.room_temp, args.humidity) {
        (Some(room_temp), Some(humidity)) => Box::new(FixedConditions(Conditions {
            room_temp,
            humidity,
        })),
        _ => Box::new(
            args.seed
                .map_or_else(SimulatedConditions::new, SimulatedConditions::seeded),
        ),
    };
    let sampled = source.read();
    if args.room_temp.is_none() || args.humidity.is_none() {
        info!(
            room_temp = sampled.room_temp,
            humidity = sampled.humidity,
            "using simulated conditions"
        );
    }
    Conditions {
        room_temp: args.room_temp.unwrap_or(sampled.room_temp),
        humidity: args.humidity.unwrap_or(sampled.humidity),
    }
}

fn local_time_of_day() -> Result<TimeOfDay> {
    let now = chrono::Local::now();
    // hour() < 24 and minute() < 60 always hold
    TimeOfDay::new(now.hour() as u8, now.minute() as u8).context("Failed to read local time")
}

fn build_input(conditions: Conditions, unit: &UnitArgs) -> Result<InputRecord> {
    let timing = match unit.timing {
        Some(t) => t,
        None => local_time_of_day()?,
    };
    Ok(InputRecord {
        room_temp: conditions.room_temp,
        humidity: conditions.humidity,
        num_people: unit.num_people,
        movement: unit.movement,
        timing,
        position: unit.position.clone(),
        ac_type: unit.ac_type,
        compressor_options: unit.compressor,
        tonnage: unit.tonnage,
        iseer: unit.iseer,
        external_heat: unit.external_heat,
        room_size: unit.room_size,
        affordable_units: unit.affordable_units,
    })
}

fn render_output(output: &OutputRecord) -> String {
    format!(
        "Room Temp: {} °C\n\
         Humidity: {}%\n\
         Suggested AC Temp: {} °C\n\
         Mode: {}\n\
         Fan Speed: {}\n\
         Flap Direction: {}\n\
         Estimated Units/day: {} kWh",
        output.room_temp,
        output.humidity,
        output.suggested_ac_temp,
        output.mode,
        output.fan_speed,
        output.flap_direction,
        output.estimated_units_per_day,
    )
}

fn render_source(source: &DecisionSource) -> String {
    match source {
        DecisionSource::Cache { case_id } => format!("Source: stored case {case_id}"),
        DecisionSource::Computed {
            case_id,
            persisted: true,
        } => format!("Source: computed, saved as case {case_id}"),
        DecisionSource::Computed {
            persisted: false, ..
        } => "Source: computed (not saved)".to_string(),
    }
}

fn render_trace(trace: &DecisionTrace) -> String {
    format!(
        "Base setpoint: {} °C\n\
         Rules: {}\n\
         Standard estimate: {} kWh/day ({} kWh/h)\n\
         Unit/compressor reference: {} kWh/day\n\
         Total daily units: {} kWh\n\
         Budget adjustments: {}{}",
        trace.base_temp,
        trace.rules_applied.join(" > "),
        trace.standard_daily_units,
        trace.total_hourly_units,
        trace.combo_base_units,
        trace.total_daily_units,
        trace.budget_adjustments,
        if trace.final_bump {
            " (+ final bump)"
        } else {
            ""
        },
    )
}

fn render_plan(plan: &PlanRecord) -> String {
    format!(
        "Goal: {}\n\
         Planned AC Temp: {} °C\n\
         Mode: {}",
        plan.goal, plan.planned_ac_temp, plan.mode
    )
}

fn render_case(entry: &CaseEntry) -> String {
    format!(
        "case {}\nRecorded: {}\nInput: {} °C, {}%, {} people, movement {}, {}\n{}",
        entry.id,
        entry.recorded_at.format("%Y-%m-%d %H:%M:%S UTC"),
        entry.key.room_temp,
        entry.key.humidity,
        entry.key.num_people,
        entry.key.movement,
        entry.key.timing,
        render_output(&entry.output),
    )
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to encode output")?
    );
    Ok(())
}

/// Text form of a decision. With `explain`, a computed decision shows its
/// trace and a replayed one says no rules ran.
fn render_decision(outcome: &DecisionOutcome, explain: bool) -> String {
    let mut text = format!(
        "{}\n{}",
        render_output(&outcome.output),
        render_source(&outcome.source)
    );
    if explain {
        text.push_str("\n\n");
        match (&outcome.trace, &outcome.source) {
            (Some(trace), _) => text.push_str(&render_trace(trace)),
            (None, DecisionSource::Cache { case_id }) => text.push_str(&format!(
                "Replayed from stored case {case_id}; no rules ran for this request"
            )),
            (None, DecisionSource::Computed { .. }) => text.push_str("No trace recorded"),
        }
    }
    text
}

async fn cmd_decide(
    memory: &CaseMemory,
    conditions: &ConditionArgs,
    unit: &UnitArgs,
    explain: bool,
    format: OutputFormat,
) -> Result<()> {
    let input = build_input(read_conditions(conditions), unit)?;
    let mut outcome = memory
        .decide_with_outcome(&input)
        .await
        .context("Decision failed")?;
    if !explain {
        outcome.trace = None;
    }

    match format {
        OutputFormat::Json => print_json(&outcome),
        OutputFormat::Text => {
            println!("{}", render_decision(&outcome, explain));
            Ok(())
        }
    }
}

fn cmd_plan(conditions: &ConditionArgs, format: OutputFormat) -> Result<()> {
    let c = read_conditions(conditions);
    let record = plan(&PlanInput {
        room_temp: c.room_temp,
        humidity: c.humidity,
    });
    match format {
        OutputFormat::Json => print_json(&record),
        OutputFormat::Text => {
            println!("Room Temp: {} °C", record.room_temp);
            println!("Humidity: {}%", record.humidity);
            println!("{}", render_plan(&record));
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct CompareReport {
    previous: Vec<CaseEntry>,
    new_output: DecisionOutcome,
    plan: PlanRecord,
}

/// History without the entry this request appended. Entries from other
/// writers stay.
fn previous_cases(history: Vec<CaseEntry>, outcome: &DecisionOutcome) -> Vec<CaseEntry> {
    match &outcome.source {
        DecisionSource::Computed {
            case_id,
            persisted: true,
        } => history.into_iter().filter(|e| &e.id != case_id).collect(),
        _ => history,
    }
}

async fn cmd_compare(
    memory: &CaseMemory,
    conditions: &ConditionArgs,
    unit: &UnitArgs,
    format: OutputFormat,
) -> Result<()> {
    let input = build_input(read_conditions(conditions), unit)?;
    let mut outcome = memory
        .decide_with_outcome(&input)
        .await
        .context("Decision failed")?;
    outcome.trace = None;
    let previous = match memory.history().await {
        Ok(history) => previous_cases(history, &outcome),
        Err(e) => {
            tracing::warn!(error = %e, "previous data unavailable");
            Vec::new()
        }
    };
    let report = CompareReport {
        previous,
        plan: plan(&PlanInput::from(&input)),
        new_output: outcome,
    };

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            println!("--- PREVIOUS DATA ---\n");
            if report.previous.is_empty() {
                println!("(none)\n");
            }
            for entry in &report.previous {
                println!("{}\n", render_case(entry));
            }
            println!("--- NEW OUTPUT ---\n");
            println!("{}", render_output(&report.new_output.output));
            println!("{}\n", render_source(&report.new_output.source));
            println!("--- GOAL PLAN ---\n");
            println!("{}", render_plan(&report.plan));
            Ok(())
        }
    }
}

async fn cmd_history(memory: &CaseMemory, limit: Option<usize>, format: OutputFormat) -> Result<()> {
    let mut history = memory
        .history()
        .await
        .context("Failed to read case log")?;
    if let Some(limit) = limit {
        let skip = history.len().saturating_sub(limit);
        history.drain(..skip);
    }

    match format {
        OutputFormat::Json => print_json(&history),
        OutputFormat::Text => {
            if history.is_empty() {
                println!("No stored cases");
                return Ok(());
            }
            for entry in &history {
                println!("{}\n", render_case(entry));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aircon_core::{compute_with_trace, Mode};
    use clap::CommandFactory;

    fn unit() -> UnitArgs {
        UnitArgs {
            num_people: 0,
            movement: Movement::No,
            timing: Some("23:00".parse().unwrap()),
            position: "12o".parse().unwrap(),
            ac_type: AcType::Split,
            compressor: CompressorType::InverterRotary,
            tonnage: 1.5,
            iseer: 3.9,
            external_heat: 100.0,
            room_size: 150.0,
            affordable_units: 20.0,
        }
    }

    fn fixed(room_temp: f64, humidity: f64) -> ConditionArgs {
        ConditionArgs {
            room_temp: Some(room_temp),
            humidity: Some(humidity),
            seed: None,
        }
    }

    fn file_memory(dir: &tempfile::TempDir) -> CaseMemory {
        let store = Arc::new(JsonlCaseStore::open(dir.path().join("cases.jsonl")).unwrap());
        CaseMemory::with_default_config(store)
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn decide_flags_parse_into_domain_types() {
        let cli = Cli::try_parse_from([
            "aircon",
            "--backend",
            "memory",
            "decide",
            "--room-temp",
            "40",
            "--humidity",
            "70",
            "--num-people",
            "0",
            "--movement",
            "no",
            "--timing",
            "23:00",
            "--position",
            "11o,2o",
            "--ac-type",
            "split ac",
            "--compressor",
            "Inverter Rotary Compressor",
            "--tonnage",
            "1.5",
            "--iseer",
            "3.9",
            "--room-size",
            "150",
            "--affordable-units",
            "20",
        ])
        .unwrap();

        assert_eq!(cli.backend, Backend::Memory);
        match cli.command {
            Commands::Decide { unit, explain, .. } => {
                assert!(!explain);
                assert_eq!(unit.movement, Movement::No);
                assert_eq!(unit.position.hours(), &[11, 2]);
                assert_eq!(unit.ac_type, AcType::Split);
                assert_eq!(unit.external_heat, 0.0);
            }
            _ => panic!("expected decide"),
        }
    }

    #[test]
    fn non_numeric_seed_is_a_usage_error() {
        let res = Cli::try_parse_from([
            "aircon", "plan", "--room-temp", "30", "--humidity", "50", "--seed", "x",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn read_conditions_keeps_given_values() {
        let c = read_conditions(&ConditionArgs {
            room_temp: Some(31.0),
            humidity: None,
            seed: Some(3),
        });
        assert_eq!(c.room_temp, 31.0);
        assert!((30.0..=70.0).contains(&c.humidity));

        let seeded = ConditionArgs {
            room_temp: None,
            humidity: None,
            seed: Some(3),
        };
        assert_eq!(read_conditions(&seeded), read_conditions(&seeded));
    }

    #[test]
    fn render_output_lists_every_field() {
        let input = build_input(
            Conditions {
                room_temp: 40.0,
                humidity: 70.0,
            },
            &unit(),
        )
        .unwrap();
        let (out, trace) = compute_with_trace(&input).unwrap();
        let text = render_output(&out);
        assert!(text.contains("Suggested AC Temp: 23 °C"));
        assert!(text.contains("Mode: Eco Mode"));
        assert!(text.contains("Flap Direction: Middle"));
        assert!(text.contains("Estimated Units/day: 22.36 kWh"));
        assert!(render_trace(&trace).contains("(+ final bump)"));
    }

    #[test]
    fn previous_cases_drops_the_fresh_entry_only() {
        let input = build_input(
            Conditions {
                room_temp: 40.0,
                humidity: 70.0,
            },
            &unit(),
        )
        .unwrap();
        let (out, _) = compute_with_trace(&input).unwrap();
        let ours = CaseEntry::new(input.case_key(), out.clone());
        // Appended by another writer after ours
        let theirs = CaseEntry::new(input.case_key(), out.clone());
        let older = CaseEntry::new(input.case_key(), out.clone());

        let computed = DecisionOutcome {
            output: out.clone(),
            source: DecisionSource::Computed {
                case_id: ours.id.clone(),
                persisted: true,
            },
            trace: None,
        };
        let left = previous_cases(
            vec![older.clone(), ours.clone(), theirs.clone()],
            &computed,
        );
        let ids: Vec<&str> = left.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, [older.id.as_str(), theirs.id.as_str()]);

        let unsaved = DecisionOutcome {
            source: DecisionSource::Computed {
                case_id: "never-written".to_string(),
                persisted: false,
            },
            ..computed
        };
        assert_eq!(previous_cases(vec![older.clone()], &unsaved).len(), 1);

        let hit = DecisionOutcome {
            output: out,
            source: DecisionSource::Cache {
                case_id: older.id.clone(),
            },
            trace: None,
        };
        assert_eq!(previous_cases(vec![older], &hit).len(), 1);
    }

    #[tokio::test]
    async fn explain_on_a_replay_does_not_invent_a_trace() {
        let dir = tempfile::tempdir().unwrap();
        let memory = file_memory(&dir);
        let roomy = UnitArgs {
            affordable_units: 50.0,
            ..unit()
        };
        let first = memory
            .decide_with_outcome(
                &build_input(
                    Conditions {
                        room_temp: 40.0,
                        humidity: 70.0,
                    },
                    &roomy,
                )
                .unwrap(),
            )
            .await
            .unwrap();
        let miss_text = render_decision(&first, true);
        assert!(miss_text.contains("Rules: temperature_band"));
        assert!(!miss_text.contains("(+ final bump)"));

        // Computed fresh, this budget would end in Eco Mode with a final bump.
        let tight = build_input(
            Conditions {
                room_temp: 40.5,
                humidity: 70.0,
            },
            &unit(),
        )
        .unwrap();
        let hit = memory.decide_with_outcome(&tight).await.unwrap();
        assert!(hit.is_cache_hit());
        assert_eq!(hit.output.mode, Mode::Sleep);

        let text = render_decision(&hit, true);
        assert!(text.contains("Mode: Sleep Mode"));
        assert!(text.contains("no rules ran for this request"));
        assert!(!text.contains("final bump"));
        assert!(!text.contains("Rules:"));

        cmd_decide(&memory, &fixed(40.5, 70.0), &unit(), true, OutputFormat::Json)
            .await
            .unwrap();
        assert_eq!(memory.history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_decide_then_history_on_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let memory = file_memory(&dir);

        cmd_decide(&memory, &fixed(40.0, 70.0), &unit(), true, OutputFormat::Text)
            .await
            .unwrap();
        cmd_decide(&memory, &fixed(40.5, 68.0), &unit(), false, OutputFormat::Json)
            .await
            .unwrap();
        assert_eq!(memory.history().await.unwrap().len(), 1);

        cmd_history(&memory, Some(5), OutputFormat::Text)
            .await
            .unwrap();
        cmd_compare(&memory, &fixed(30.0, 40.0), &unit(), OutputFormat::Text)
            .await
            .unwrap();
        assert_eq!(memory.history().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_decide_rejects_invalid_unit() {
        let dir = tempfile::tempdir().unwrap();
        let memory = file_memory(&dir);
        let bad = UnitArgs {
            iseer: 0.0,
            ..unit()
        };

        let res = cmd_decide(&memory, &fixed(30.0, 50.0), &bad, false, OutputFormat::Text).await;
        assert!(res.is_err());
        assert!(memory.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_memory_backends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cases.jsonl");
        open_memory(Backend::File, &path).await.unwrap();
        assert!(path.parent().unwrap().is_dir());
        open_memory(Backend::Memory, &path).await.unwrap();
    }

    #[test]
    fn test_plan_command() {
        cmd_plan(&fixed(35.0, 65.0), OutputFormat::Json).unwrap();
    }
}
