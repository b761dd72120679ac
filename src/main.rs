mod display;
mod form;
mod parser;
mod remap;
mod web;

use display::{print_plan, print_teesheet, write_teesheet_to_file};
use parser::{load_teesheet, parse_time};
use remap::store::PlanExecutor;
use remap::{plan_remap, RemapOptions, Strategy, Teesheet, DEFAULT_SLOT_CAPACITY};

const SAMPLE_SHEET: &str = "data/teesheet.csv";

fn usage() {
    println!("Usage:");
    println!("  teesheet-remap web [port]");
    println!("      Start the admin portal (password from ADMIN_PASSWORD).");
    println!("  teesheet-remap <sheet.csv>");
    println!("      Print the teesheet snapshot.");
    println!("  teesheet-remap <sheet.csv> <from> <to> <start> <end> <interval> [interval2] [earliest]");
    println!("      Remap the slot range <from>..<to> onto a new cadence and");
    println!("      write the result to teesheet_remapped.txt.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args.get(2).and_then(|p| p.parse::<u16>().ok()).unwrap_or(8080);
        let password = std::env::var("ADMIN_PASSWORD")
            .unwrap_or_else(|_| "admin123".to_string()); // Default password, change this!

        // Preload the sample sheet when one is checked out next to the binary
        let sheet = if std::path::Path::new(SAMPLE_SHEET).exists() {
            Teesheet::from_slots(load_teesheet(SAMPLE_SHEET)?)
        } else {
            Teesheet::new()
        };

        println!("Starting web server on port {}...", port);
        println!("Admin password: {}", password);
        println!("Access the API at http://localhost:{}", port);

        web::start_server(port, password, sheet).await?;
        return Ok(());
    }

    // CLI mode
    let csv_path = match args.get(1) {
        Some(path) => path.as_str(),
        None if std::path::Path::new(SAMPLE_SHEET).exists() => SAMPLE_SHEET,
        None => {
            usage();
            return Ok(());
        }
    };

    println!("Loading teesheet from CSV...");
    let slots = load_teesheet(csv_path)?;
    println!("Loaded {} slots", slots.len());
    print_teesheet("Current Teesheet", &slots);

    if args.len() >= 7 {
        let from = args[2].parse()?;
        let to = args[3].parse()?;
        let start_minutes = parse_time(&args[4])?;
        let end_minutes = parse_time(&args[5])?;
        let interval_a = args[6].parse()?;
        let interval_b = args.get(7).and_then(|v| v.parse().ok());
        let strategy = if args.iter().any(|a| a == "earliest") {
            Strategy::EarliestAvailable
        } else {
            Strategy::ForwardOnly
        };

        let opts = RemapOptions {
            from,
            to,
            start_minutes,
            end_minutes,
            interval_a,
            interval_b,
            capacity: DEFAULT_SLOT_CAPACITY,
            manual_slots: Vec::new(),
            removed_times: Vec::new(),
            strategy,
            keep_together: true,
        };

        let (plan, validation) = plan_remap(&slots, &opts)?;
        print_plan(&plan, &validation);

        if validation.overflow {
            println!("\nNot committing: demand exceeds target capacity.");
            return Ok(());
        }
        if !plan.unassigned_groups.is_empty() {
            let stranded: usize = plan.unassigned_groups.iter().map(|g| g.size()).sum();
            println!("\nNot committing: {} occupants could not be placed.", stranded);
            return Ok(());
        }

        let mut sheet = Teesheet::from_slots(slots);
        sheet.apply(&plan.source_range_slot_ids, &plan.target_slots)?;
        write_teesheet_to_file("Remapped Teesheet", sheet.slots(), "teesheet_remapped.txt")?;
        form::export_teesheet_to_csv(sheet.slots(), std::path::Path::new("teesheet_remapped.csv"))?;
        println!("\nRemapped sheet saved to:");
        println!("  - teesheet_remapped.txt");
        println!("  - teesheet_remapped.csv");
    }

    Ok(())
}
