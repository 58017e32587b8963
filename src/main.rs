use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand};

use drone_booking::domain::clock::SystemClock;
use drone_booking::domain::utils::date::{format_date, parse_date};
use drone_booking::loader::csv_export::export_csv;
use drone_booking::loader::reservation_file::JsonFileRepository;
use drone_booking::{Applicant, BookingConfig, BookingRequest, BookingService, EquipmentId, Error, Reservation, SlotSelection, TimeSlot, logger};

#[derive(Debug, Parser)]
#[command(name = "drone_booking", version, about = "Reserve drones and shared batteries by date and time slot")]
struct Cli {
    /// Reservation list (JSON). Created on the first booking.
    #[arg(long, default_value = "bookings.json")]
    data: PathBuf,

    /// Booking configuration (JSON). Built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level, overriding RUST_LOG.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a request and commit it.
    Book(RequestArgs),

    /// Validate a request without committing it.
    Check(RequestArgs),

    /// List reservations.
    List {
        /// Only this date (YYYY-MM-DD).
        #[arg(long, conflicts_with = "month")]
        date: Option<String>,

        /// Only this month (YYYY-MM).
        #[arg(long)]
        month: Option<String>,

        /// Write CSV to stdout instead of a table.
        #[arg(long)]
        csv: bool,
    },

    /// Show which drones and how many pool batteries are free.
    Availability {
        #[arg(long)]
        date: String,

        #[arg(long, default_value = "full-day")]
        slot: String,
    },

    /// Show the drone catalog.
    Drones,
}

#[derive(Debug, Args)]
struct RequestArgs {
    #[arg(long)]
    unit: String,

    #[arg(long)]
    applicant: String,

    #[arg(long)]
    phone: String,

    /// Drone id, e.g. m490.
    #[arg(long)]
    drone: EquipmentId,

    /// DATE:SLOT, e.g. 2024-06-10:morning. Repeatable.
    #[arg(long = "slot", required = true)]
    slots: Vec<SlotSelection>,

    /// Batteries to borrow (shared-pool drones only).
    #[arg(long)]
    batteries: Option<u32>,
}

impl RequestArgs {
    fn to_request(&self) -> BookingRequest {
        BookingRequest {
            applicant: Applicant::new(self.unit.as_str(), self.applicant.as_str(), self.phone.as_str()),
            equipment_id: self.drone,
            slots: self.slots.clone(),
            battery_count: self.batteries,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        logger::init_with_level(Some(log::LevelFilter::Debug));
    } else {
        logger::init();
    }

    let config = match &cli.config {
        Some(path) => BookingConfig::load(path).with_context(|| format!("loading configuration '{}'", path.display()))?,
        None => BookingConfig::default(),
    };

    let repository = Arc::new(JsonFileRepository::new(cli.data.clone()));
    let service = BookingService::open(config, repository, Arc::new(SystemClock)).with_context(|| format!("loading reservations from '{}'", cli.data.display()))?;

    match &cli.command {
        Command::Book(args) => book(&service, args),
        Command::Check(args) => check(&service, args),
        Command::List { date, month, csv } => list(&service, date.as_deref(), month.as_deref(), *csv),
        Command::Availability { date, slot } => availability(&service, date, slot),
        Command::Drones => {
            drones(service.config());
            Ok(())
        }
    }
}

fn book(service: &BookingService, args: &RequestArgs) -> anyhow::Result<()> {
    let request = args.to_request();

    match service.book(&request) {
        Ok(batch) => {
            println!("Booked {} slot(s):", batch.reservations.len());
            for reservation in &batch.reservations {
                print_reservation(reservation);
            }
            Ok(())
        }
        Err(Error::Rejected(rejection)) => bail!("booking rejected: {}", rejection),
        Err(e) => Err(e).context("committing the booking"),
    }
}

fn check(service: &BookingService, args: &RequestArgs) -> anyhow::Result<()> {
    let request = args.to_request();

    if service.config().is_shared_pool(request.equipment_id) {
        println!("Batteries available for the selected slots: {}", service.battery_ceiling(&request.slots));
    }

    match service.check(&request) {
        Ok(_) => println!("OK: the request can be booked ({} slot(s)).", request.slots.len()),
        Err(rejection) => println!("Rejected: {}", rejection),
    }

    Ok(())
}

fn list(service: &BookingService, date: Option<&str>, month: Option<&str>, csv: bool) -> anyhow::Result<()> {
    let reservations = match (date, month) {
        (Some(date), _) => service.store().reservations_on(parse_date(date)?),
        (None, Some(month)) => {
            let (first, last) = month_bounds(month)?;
            service.store().reservations_between(first, last)
        }
        (None, None) => service.store().reservations_between(NaiveDate::MIN, NaiveDate::MAX),
    };

    if csv {
        export_csv(std::io::stdout().lock(), &reservations, service.config())?;
        return Ok(());
    }

    if reservations.is_empty() {
        println!("No reservations.");
    }

    for reservation in &reservations {
        print_reservation(reservation);
    }

    Ok(())
}

fn availability(service: &BookingService, date: &str, slot: &str) -> anyhow::Result<()> {
    let date = parse_date(date)?;
    let time_slot: TimeSlot = slot.parse()?;
    let availability = service.availability(date, time_slot);

    println!("{} {}", format_date(date), time_slot.display_name());
    for entry in &availability.equipment {
        let name = service.config().equipment(entry.equipment_id).map(|e| e.name.as_str()).unwrap_or("");
        match &entry.booked_by {
            Some(id) => println!("  {:<6} {:<12} booked ({})", entry.equipment_id, name, id),
            None => println!("  {:<6} {:<12} free", entry.equipment_id, name),
        }
    }
    println!("  Shared batteries left: {} / {}", availability.available_batteries, service.config().total_shared_batteries);

    Ok(())
}

fn drones(config: &BookingConfig) {
    for equipment in config.catalog() {
        let pool = if equipment.shared_battery_pool { "shared battery pool" } else { "dedicated batteries" };
        println!("{:<6} {:<12} {:<18} {:<20} {}", equipment.id, equipment.name, equipment.model, pool, equipment.description);
    }
}

fn print_reservation(r: &Reservation) {
    let batteries = r.battery_count.map(|n| format!(" batteries={}", n)).unwrap_or_default();
    println!(
        "  {} {:<20} {:<5} {} / {} / {}{}  [{}]",
        format_date(r.date),
        r.time_slot.display_name(),
        r.equipment_id,
        r.applicant.unit,
        r.applicant.name,
        r.applicant.phone,
        batteries,
        r.id
    );
}

/// First and last day of a `YYYY-MM` month.
fn month_bounds(month: &str) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    let first = parse_date(&format!("{}-01", month.trim())).with_context(|| format!("invalid month '{}', expected YYYY-MM", month))?;
    let next = if first.month() == 12 { NaiveDate::from_ymd_opt(first.year() + 1, 1, 1) } else { NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1) };

    match next.and_then(|n| n.pred_opt()) {
        Some(last) => Ok((first, last)),
        None => bail!("month '{}' is out of range", month),
    }
}
