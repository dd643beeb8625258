//! CareCrew command-line entry point.
//!
//! # Responsibility
//! - Drive the household use cases against the local durable store.
//! - Keep output plain and line-oriented for quick inspection.

use carecrew_core::{
    household_roster, init_logging, ActingMember, CareRepository, CoreConfig, Extractor,
    GeminiClient, HouseholdService, MemberId, ShiftId, ShiftPatch, SqliteStore, TaskId,
    TaskPatch, TaskType,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const SAMPLE_EVENTS: [&str; 2] = [
    "טיסת אל על LY315 ללונדון יוצאת ב-14:00 ב-25/10/2024",
    "חזרה מפריז AF123 נחיתה ב-22:00 ב-28/10/2024",
];

type Service = HouseholdService<SqliteStore>;

#[derive(Debug, Parser)]
#[command(name = "carecrew", version, about = "Household child-care planner for flight shifts")]
struct Cli {
    /// Directory holding the local store (overrides CARECREW_DATA_DIR).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Directory for rolling log files; defaults to `<data-dir>/logs`.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show every shift with its tasks
    Board,
    /// Extract shifts from calendar event text and add them to the board
    Sync {
        /// Event descriptions; the two sample events are used when omitted
        #[arg(value_name = "EVENT")]
        events: Vec<String>,
    },
    /// Claim a task for a family member
    Claim {
        task: String,
        #[command(flatten)]
        acting: ActingArg,
    },
    /// Release a claimed task
    Cancel { task: String },
    /// Delete a shift together with all of its tasks
    DeleteShift {
        shift: String,
        #[command(flatten)]
        acting: ActingArg,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Edit shift fields
    EditShift(EditShiftArgs),
    /// Edit task fields
    EditTask(EditTaskArgs),
    /// List tasks claimed by a family member
    Mine {
        #[command(flatten)]
        acting: ActingArg,
    },
    /// Show coverage statistics
    Stats,
    /// List the household roster
    Roster,
}

#[derive(Debug, Args, Clone)]
struct ActingArg {
    /// Acting family member id (m1, f1, g1, g2)
    #[arg(long = "as", value_name = "MEMBER")]
    member: Option<String>,
}

impl ActingArg {
    fn resolve(&self) -> Result<MemberId, String> {
        match &self.member {
            None => Ok(ActingMember::default().current().id.clone()),
            Some(raw) => {
                let id = MemberId::new(raw.trim());
                ActingMember::for_member(&id)
                    .map(|acting| acting.current().id.clone())
                    .ok_or_else(|| format!("unknown family member `{raw}`"))
            }
        }
    }
}

#[derive(Debug, Args, Clone)]
struct EditShiftArgs {
    shift: String,
    #[command(flatten)]
    acting: ActingArg,
    #[arg(long)]
    flight_number: Option<String>,
    #[arg(long)]
    origin: Option<String>,
    #[arg(long)]
    destination: Option<String>,
    #[arg(long)]
    departure_time: Option<String>,
    #[arg(long)]
    arrival_time: Option<String>,
    #[arg(long)]
    date_label: Option<String>,
    #[arg(long)]
    care_start: Option<String>,
    #[arg(long)]
    care_end: Option<String>,
}

#[derive(Debug, Args, Clone)]
struct EditTaskArgs {
    task: String,
    #[command(flatten)]
    acting: ActingArg,
    /// pickup | meal | bath-and-bed | overnight | general-help
    #[arg(long = "type", value_parser = parse_task_type)]
    task_type: Option<TaskType>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    time: Option<String>,
    #[arg(long)]
    date_label: Option<String>,
}

fn parse_task_type(value: &str) -> Result<TaskType, String> {
    TaskType::parse(value).ok_or_else(|| format!("unknown task type `{value}`"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = CoreConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    std::fs::create_dir_all(&config.data_dir)?;
    let log_dir = absolute(&cli.log_dir.unwrap_or_else(|| config.data_dir.join("logs")))?;
    init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    info!("event=cli_start module=cli status=ok");

    let store = SqliteStore::open(config.store_path())?;
    let mut service = HouseholdService::open(CareRepository::new(store))?;

    match cli.command {
        Command::Board => print_board(&service),
        Command::Sync { events } => {
            let events = if events.is_empty() {
                SAMPLE_EVENTS.iter().map(|event| event.to_string()).collect()
            } else {
                events
            };
            let extractor = Extractor::new(GeminiClient::new(config.gemini.clone())?);
            let report = service.sync(&extractor, events.as_slice())?;
            match report.failure {
                None => println!(
                    "added {} shift(s) and {} task(s)",
                    report.added_shifts, report.added_tasks
                ),
                Some(failure) => println!("no new shifts: {failure:?}"),
            }
        }
        Command::Claim { task, acting } => {
            let member = acting.resolve()?;
            report_change(service.claim(&TaskId::new(task), &member), "task claimed");
        }
        Command::Cancel { task } => {
            report_change(service.cancel_claim(&TaskId::new(task)), "claim released");
        }
        Command::DeleteShift { shift, acting, yes } => {
            if !yes {
                return Err("deleting a shift removes all of its tasks; pass --yes to confirm".into());
            }
            let member = acting.resolve()?;
            match service.delete_shift(&member, &ShiftId::new(shift))? {
                Some(report) => println!(
                    "deleted {} with {} task(s)",
                    report.shift.flight_number, report.removed_tasks
                ),
                None => println!("no matching record"),
            }
        }
        Command::EditShift(args) => {
            let member = args.acting.resolve()?;
            let patch = ShiftPatch {
                flight_number: args.flight_number,
                origin: args.origin,
                destination: args.destination,
                departure_time: args.departure_time,
                arrival_time: args.arrival_time,
                date_label: args.date_label,
                care_start: args.care_start,
                care_end: args.care_end,
                status: None,
            };
            let changed = service.edit_shift(&member, &ShiftId::new(args.shift), &patch)?;
            report_change(changed, "shift updated");
        }
        Command::EditTask(args) => {
            let member = args.acting.resolve()?;
            let patch = TaskPatch {
                task_type: args.task_type,
                description: args.description,
                time: args.time,
                date_label: args.date_label,
            };
            let changed = service.edit_task(&member, &TaskId::new(args.task), &patch)?;
            report_change(changed, "task updated");
        }
        Command::Mine { acting } => {
            let member = acting.resolve()?;
            let board = service.board();
            println!("{} task(s) claimed by {member}", board.claimed_count(&member));
            for task in board.tasks_claimed_by(&member) {
                println!(
                    "  {}  {} {}  {}",
                    task.id, task.date_label, task.time, task.description
                );
            }
        }
        Command::Stats => {
            let stats = service.coverage();
            println!("shifts: {}", stats.shift_count);
            println!(
                "tasks: {} ({} claimed, {}% coverage)",
                stats.task_count, stats.claimed_count, stats.percent
            );
        }
        Command::Roster => {
            for member in household_roster() {
                let admin = if member.is_admin { " (admin)" } else { "" };
                println!(
                    "{}  {} [{}]{admin}",
                    member.id,
                    member.name,
                    member.role.label_he()
                );
            }
        }
    }

    Ok(())
}

fn print_board(service: &Service) {
    let board = service.board();
    if board.shifts().is_empty() {
        println!("no shifts scheduled");
        return;
    }
    for shift in board.shifts() {
        println!(
            "{}  {} {} -> {}  {} {}-{}  care {}-{}",
            shift.id,
            shift.flight_number,
            shift.origin,
            shift.destination,
            shift.date_label,
            shift.departure_time,
            shift.arrival_time,
            shift.care_start,
            shift.care_end
        );
        for task in board.tasks_for_shift(&shift.id) {
            let holder = task
                .assigned_to
                .as_ref()
                .map_or_else(|| "open".to_string(), |member| member.to_string());
            println!(
                "    {}  [{}] {} {}  {}",
                task.id,
                task.task_type.label_he(),
                task.time,
                task.description,
                holder
            );
        }
    }
}

fn report_change(changed: bool, message: &str) {
    if changed {
        println!("{message}");
    } else {
        println!("no matching record");
    }
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_task_type, ActingArg, Cli};
    use carecrew_core::TaskType;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn acting_member_defaults_to_roster_start_and_rejects_unknown_ids() {
        let default = ActingArg { member: None };
        assert_eq!(default.resolve().unwrap().as_str(), "g1");

        let unknown = ActingArg {
            member: Some("zz".to_string()),
        };
        assert!(unknown.resolve().is_err());
    }

    #[test]
    fn task_type_flag_accepts_hebrew_labels() {
        assert_eq!(parse_task_type("ארוחה").unwrap(), TaskType::Meal);
        assert!(parse_task_type("laundry").is_err());
    }
}
