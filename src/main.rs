// Entry point and CLI flow.
//
// - `--entity` given: load once, print every report for the selection and
//   optionally export JSON / CSV, then exit.
// - otherwise: menu loop. [1] loads the CSV, [2] prompts for entity and
//   year and prints the reports, [3] prints the overview table.
use clap::Parser;
use drink_ledger::config::{DashboardConfig, RowPolicy, DEFAULT_DATA_PATH};
use drink_ledger::output;
use drink_ledger::types::LoadReport;
use drink_ledger::util::format_int;
use drink_ledger::{insights, load_dataset, overview, Dataset, Result};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "drink_ledger")]
#[command(about = "Daily drink ledger statistics")]
struct Cli {
    /// CSV file with a `date,<entity..>` header
    #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Comma-separated entity ids, in column order
    #[arg(long, value_delimiter = ',')]
    entities: Option<Vec<String>>,

    /// Fail on the first malformed row instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Entity to report on; runs once without the menu
    #[arg(short, long)]
    entity: Option<String>,

    /// Year to report on (defaults to 2025 or the latest year present)
    #[arg(short, long)]
    year: Option<i32>,

    /// Write every report for the selection as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the per-year overview table as CSV
    #[arg(long)]
    overview_csv: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> DashboardConfig {
        let mut cfg = DashboardConfig {
            data_path: self.data.clone(),
            default_year: self.year,
            ..DashboardConfig::default()
        };
        if let Some(entities) = &self.entities {
            cfg = cfg.with_entities(entities);
        }
        if self.strict {
            cfg = cfg.with_row_policy(RowPolicy::Abort);
        }
        cfg
    }
}

/// Session state: the last successfully loaded dataset.
struct AppState {
    config: DashboardConfig,
    dataset: Option<Dataset>,
}

/// Interpret one `read_line` result: `None` once input is exhausted.
fn accept_input(read: io::Result<usize>, buf: &str) -> io::Result<Option<String>> {
    match read? {
        0 => Ok(None),
        _ => Ok(Some(buf.trim().to_string())),
    }
}

/// `Some(true)` for `Y`, `Some(false)` for `N`, case-insensitive.
fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_uppercase().as_str() {
        "Y" => Some(true),
        "N" => Some(false),
        _ => None,
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    if let Err(e) = io::stdout().flush() {
        error!("failed to flush stdout: {}", e);
    }
    let mut buf = String::new();
    match accept_input(io::stdin().read_line(&mut buf), &buf) {
        Ok(Some(line)) => line,
        // End of input ends the session.
        Ok(None) => {
            println!();
            std::process::exit(0);
        }
        Err(e) => {
            error!("failed to read input: {}", e);
            eprintln!("Error reading input: {}", e);
            std::process::exit(1);
        }
    }
}

fn read_choice() -> String {
    read_line("Enter choice: ")
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match parse_yes_no(&read_line("Back to Report Selection (Y/N): ")) {
            Some(choice) => return choice,
            None => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_load_report(ds: &Dataset, report: &LoadReport) {
    let years: Vec<String> = ds.available_years().iter().map(|y| y.to_string()).collect();
    println!(
        "Processing dataset... ({} rows read, {} loaded, years: {})",
        format_int(report.total_rows),
        format_int(report.loaded_rows),
        if years.is_empty() { "none".to_string() } else { years.join(", ") }
    );
    if report.skipped_rows > 0 {
        println!(
            "Note: {} rows skipped due to parse/validation errors.",
            format_int(report.skipped_rows)
        );
        for s in &report.skipped {
            println!("  line {}: {}", s.line, s.reason);
        }
    }
    println!();
}

/// Option [1]. A failed load keeps the previously loaded dataset.
fn handle_load(state: &mut AppState) {
    match load_dataset(&state.config) {
        Ok((ds, report)) => {
            print_load_report(&ds, &report);
            state.dataset = Some(ds);
        }
        Err(e) => {
            error!("failed to load {}: {}", state.config.data_path.display(), e);
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Option [2]. Prompts for entity and year, then prints every report.
fn handle_generate_reports(state: &AppState) {
    let Some(ds) = state.dataset.as_ref() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };

    println!("Entities: {}", ds.entities().join(", "));
    let entity = read_line("Entity: ");

    let years = ds.available_years();
    let default_year = state.config.initial_year(&years);
    let shown = default_year.map(|y| y.to_string()).unwrap_or_default();
    let answer = read_line(&format!("Year [{}]: ", shown));
    let year = if answer.is_empty() {
        default_year
    } else {
        match answer.parse::<i32>() {
            Ok(y) => Some(y),
            Err(_) => {
                println!("Invalid year '{}'.\n", answer);
                return;
            }
        }
    };
    let Some(year) = year else {
        println!("Error: the dataset has no years to report on.\n");
        return;
    };

    println!();
    if let Err(e) = print_insights(ds, &entity, year, None) {
        eprintln!("Could not generate reports: {}\n", e);
    }
}

fn print_insights(ds: &Dataset, entity: &str, year: i32, json: Option<&PathBuf>) -> Result<()> {
    let all = insights(ds, entity, year)?;
    output::preview_insights(&all);
    if let Some(path) = json {
        output::write_json(path, &all)?;
        println!("(Full reports exported to {})\n", path.display());
    }
    Ok(())
}

fn handle_overview(state: &AppState, csv: Option<&PathBuf>) -> Result<()> {
    let Some(ds) = state.dataset.as_ref() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return Ok(());
    };
    let o = overview(ds);
    output::preview_overview(&o);
    if let Some(path) = csv {
        output::write_overview_csv(path, &o)?;
        println!("(Overview exported to {})\n", path.display());
    }
    Ok(())
}

fn run_once(cli: &Cli, state: &mut AppState, entity: &str) -> Result<()> {
    let (ds, report) = load_dataset(&state.config)?;
    print_load_report(&ds, &report);
    let year = match cli.year {
        Some(y) => y,
        None => state
            .config
            .initial_year(&ds.available_years())
            .ok_or_else(|| drink_ledger::Error::Config("dataset has no records".to_string()))?,
    };
    print_insights(&ds, entity, year, cli.json.as_ref())?;
    state.dataset = Some(ds);
    handle_overview(state, cli.overview_csv.as_ref())
}

fn run_menu(state: &mut AppState) {
    loop {
        println!("Select an option:");
        println!("[1] Load the file");
        println!("[2] Generate Reports");
        println!("[3] Overview\n");
        match read_choice().as_str() {
            "1" => handle_load(state),
            "2" => {
                println!();
                handle_generate_reports(state);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                println!();
                if let Err(e) = handle_overview(state, None) {
                    eprintln!("Could not build overview: {}\n", e);
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        std::process::exit(2);
    }
    let mut state = AppState { config, dataset: None };

    match cli.entity.clone() {
        Some(entity) => {
            if let Err(e) = run_once(&cli, &mut state, &entity) {
                error!("{}", e);
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        None => run_menu(&mut state),
    }
}
