//! `roombook` CLI: slot availability, conflict checks, and reservations from
//! the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Today's grid for a room (defaults: 09:00-17:00, 30-minute slots, UTC)
//! roombook slots --room r1 --reservations reservations.json
//!
//! # Same, as JSON, for a Berlin office with 15-minute slots
//! roombook --timezone Europe/Berlin --slot-width 15 slots --date 2026-03-16 --json
//!
//! # Does an interval collide with an existing reservation? (exit 1 if so)
//! roombook check --room r1 --start 2026-03-16T10:00 --end 2026-03-16T11:00 \
//!   --reservations reservations.json
//!
//! # Free windows of a room, at least 60 minutes long
//! roombook free --room r1 --date 2026-03-16 --min-minutes 60 --reservations reservations.json
//!
//! # Which rooms are free for an interval?
//! roombook rooms --rooms rooms.json --start 2026-03-16T10:00 --end 2026-03-16T11:00
//!
//! # Book two contiguous slots (exit 2 if the selection is rejected)
//! roombook book --room r1 --date 2026-03-16 --slots 10:00-10:30,10:30-11:00 --owner alice
//! ```
//!
//! Timestamps accept RFC 3339 (`2026-03-16T10:00:00Z`) or a facility-local
//! `YYYY-MM-DDTHH:MM[:SS]`, which is anchored in the configured timezone.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use booking_engine::config::parse_timezone;
use booking_engine::slot::hhmm;
use booking_engine::{
    find_conflicts, occupancy, tz, AttemptState, BookingAttempt, BookingService, DaySelection,
    EngineConfig, InMemoryReservationStore, Interval, OwnerId, Reservation, ReservationDraft,
    Resource, ResourceId, TimeSlot,
};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "roombook",
    version,
    about = "Meeting-room availability and booking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    grid: GridArgs,

    /// Log engine decisions to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Engine configuration. Flags override values loaded from `--config`.
#[derive(Args)]
struct GridArgs {
    /// JSON configuration file (workStart, workEnd, slotWidthMinutes, ...)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Start of the working window (HH:MM) [default: 09:00]
    #[arg(long, global = true)]
    work_start: Option<String>,
    /// End of the working window (HH:MM) [default: 17:00]
    #[arg(long, global = true)]
    work_end: Option<String>,
    /// Slot width in minutes [default: 30]
    #[arg(long, global = true)]
    slot_width: Option<u32>,
    /// Required daily presence in hours [default: 8]
    #[arg(long, global = true)]
    required_daily_hours: Option<f64>,
    /// Facility IANA timezone [default: UTC]
    #[arg(long, global = true)]
    timezone: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the slot grid of one day as past, booked, or available
    Slots {
        /// Facility-local date (YYYY-MM-DD); today if omitted
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Room to check reservations for; without it nothing is booked
        #[arg(long)]
        room: Option<String>,
        /// JSON array of existing reservations
        #[arg(long)]
        reservations: Option<PathBuf>,
        /// Reference instant; the current time if omitted
        #[arg(long)]
        now: Option<String>,
        /// Print the classified day as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check an interval against a room's reservations
    Check {
        #[arg(long)]
        room: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        reservations: Option<PathBuf>,
    },
    /// List the free windows of a room inside the working window
    Free {
        #[arg(long)]
        room: String,
        /// Facility-local date (YYYY-MM-DD); today if omitted
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        reservations: Option<PathBuf>,
        /// Only report windows at least this long
        #[arg(long)]
        min_minutes: Option<i64>,
    },
    /// Show which rooms are free for an interval
    Rooms {
        /// JSON array of `{id, name}` rooms
        #[arg(long)]
        rooms: PathBuf,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        reservations: Option<PathBuf>,
        /// Print per-room occupancy as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a slot selection and commit it as one reservation
    Book {
        #[arg(long)]
        room: String,
        /// Facility-local date (YYYY-MM-DD); today if omitted
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Comma-separated slots, e.g. 10:00-10:30,10:30-11:00
        #[arg(long)]
        slots: String,
        #[arg(long)]
        owner: String,
        #[arg(long, default_value = "Meeting")]
        title: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        reservations: Option<PathBuf>,
        #[arg(long)]
        now: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli.grid)?;
    tracing::debug!(
        work_start = %config.work_start,
        work_end = %config.work_end,
        slot_width = config.slot_width_minutes,
        timezone = %config.timezone,
        "configuration resolved"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match cli.command {
        Commands::Slots {
            date,
            room,
            reservations,
            now,
            json,
        } => {
            let now = resolve_now(now.as_deref(), &config)?;
            let date = date.unwrap_or_else(|| tz::local_date(now, config.timezone));
            let service = build_service(config, reservations.as_deref())?;
            let day = DaySelection::new(date, room.map(ResourceId::new));

            let availability = runtime
                .block_on(service.day_availability(&day, now))
                .context("Failed to load reservations")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&availability)?);
            } else {
                for classified in &availability.slots {
                    println!("{}  {}", classified.slot, classified.state);
                }
                let summary = availability.summary();
                println!(
                    "{} available, {} booked, {} past",
                    summary.available, summary.booked, summary.past
                );
            }
        }
        Commands::Check {
            room,
            start,
            end,
            reservations,
        } => {
            let interval = parse_interval(&start, &end, &config)?;
            let reservations = load_reservations(reservations.as_deref())?;
            let conflicts = find_conflicts(&interval, &ResourceId::new(&room), &reservations);

            if conflicts.is_empty() {
                println!("No conflict: {} is free for {}", room, interval);
            } else {
                for conflict in &conflicts {
                    println!(
                        "Conflict: {} \"{}\" {} ({} min overlap)",
                        conflict.reservation.id,
                        conflict.reservation.title,
                        conflict.reservation.interval(),
                        conflict.overlap_minutes
                    );
                }
                process::exit(1);
            }
        }
        Commands::Free {
            room,
            date,
            reservations,
            min_minutes,
        } => {
            let date = date.unwrap_or_else(|| tz::local_date(Utc::now(), config.timezone));
            let service = build_service(config, reservations.as_deref())?;

            let windows = runtime
                .block_on(service.free_windows(&ResourceId::new(&room), date))
                .context("Failed to compute free windows")?;

            let min = min_minutes.unwrap_or(0);
            for window in windows.iter().filter(|w| w.duration_minutes >= min) {
                println!(
                    "{} .. {}  ({} min)",
                    window.start.to_rfc3339(),
                    window.end.to_rfc3339(),
                    window.duration_minutes
                );
            }
        }
        Commands::Rooms {
            rooms,
            start,
            end,
            reservations,
            json,
        } => {
            let interval = parse_interval(&start, &end, &config)?;
            let rooms: Vec<Resource> = read_json(&rooms)?;
            let reservations = load_reservations(reservations.as_deref())?;
            let report = occupancy(&rooms, &interval, &reservations);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for room in &report {
                    if room.is_free() {
                        println!("{} ({})  free", room.resource.name, room.resource.id);
                    } else {
                        println!(
                            "{} ({})  busy {} min, {} reservation(s)",
                            room.resource.name,
                            room.resource.id,
                            room.busy_minutes,
                            room.reservation_count
                        );
                    }
                }
            }
        }
        Commands::Book {
            room,
            date,
            slots,
            owner,
            title,
            notes,
            reservations,
            now,
        } => {
            let now = resolve_now(now.as_deref(), &config)?;
            let date = date.unwrap_or_else(|| tz::local_date(now, config.timezone));
            let selection = parse_selection(&slots)?;
            let service = build_service(config, reservations.as_deref())?;

            let mut attempt = BookingAttempt::new();
            for slot in selection {
                attempt.select(slot);
            }
            let draft = ReservationDraft {
                resource_id: ResourceId::new(room),
                owner_id: OwnerId::new(owner),
                title,
                notes,
            };

            let outcome = runtime
                .block_on(service.submit(&mut attempt, &draft, date, now))
                .context("Failed to submit reservation")?;

            match outcome {
                AttemptState::Accepted(reservation) => {
                    println!("{}", serde_json::to_string_pretty(&reservation)?);
                }
                AttemptState::Rejected(reason) => {
                    eprintln!("Rejected: {}", reason);
                    process::exit(2);
                }
                AttemptState::Selecting | AttemptState::Validating => {
                    bail!("Reservation attempt did not complete");
                }
            }
        }
    }

    Ok(())
}

/// Install a stderr subscriber. `-v` overrides `RUST_LOG`; otherwise the
/// environment wins and the fallback is `warn`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_config() -> Result<EngineConfig> {
    Ok(EngineConfig {
        work_start: hhmm::parse("09:00").map_err(anyhow::Error::msg)?,
        work_end: hhmm::parse("17:00").map_err(anyhow::Error::msg)?,
        slot_width_minutes: 30,
        required_daily_hours: 8.0,
        timezone: chrono_tz::UTC,
    })
}

/// Defaults, then the `--config` file, then individual flags; validated last.
fn resolve_config(args: &GridArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => read_json::<EngineConfig>(path)?,
        None => default_config()?,
    };

    if let Some(start) = &args.work_start {
        config.work_start = hhmm::parse(start).map_err(anyhow::Error::msg)?;
    }
    if let Some(end) = &args.work_end {
        config.work_end = hhmm::parse(end).map_err(anyhow::Error::msg)?;
    }
    if let Some(width) = args.slot_width {
        config.slot_width_minutes = width;
    }
    if let Some(hours) = args.required_daily_hours {
        config.required_daily_hours = hours;
    }
    if let Some(name) = &args.timezone {
        config.timezone = parse_timezone(name)?;
    }

    config.validate().context("Invalid engine configuration")?;
    Ok(config)
}

fn build_service(
    config: EngineConfig,
    reservations: Option<&Path>,
) -> Result<BookingService<InMemoryReservationStore>> {
    let store = InMemoryReservationStore::with_reservations(load_reservations(reservations)?);
    BookingService::new(config, Arc::new(store)).context("Invalid engine configuration")
}

fn load_reservations(path: Option<&Path>) -> Result<Vec<Reservation>> {
    match path {
        Some(path) => read_json(path),
        None => Ok(Vec::new()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn resolve_now(now: Option<&str>, config: &EngineConfig) -> Result<DateTime<Utc>> {
    match now {
        Some(raw) => parse_instant(raw, config),
        None => Ok(Utc::now()),
    }
}

/// RFC 3339, or a facility-local datetime anchored in the configured timezone.
fn parse_instant(raw: &str, config: &EngineConfig) -> Result<DateTime<Utc>> {
    tz::parse_instant(raw, config.timezone)
        .with_context(|| format!("Invalid datetime: '{}'", raw))
}

fn parse_interval(start: &str, end: &str, config: &EngineConfig) -> Result<Interval> {
    let start = parse_instant(start, config)?;
    let end = parse_instant(end, config)?;
    Interval::new(start, end)
        .with_context(|| format!("Interval must start before it ends: {} .. {}", start, end))
}

fn parse_selection(raw: &str) -> Result<Vec<TimeSlot>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<TimeSlot>().map_err(anyhow::Error::msg))
        .collect()
}

