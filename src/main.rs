// Entry point and high-level CLI flow.
//
// - With a CSV path argument the pipeline runs once and the process exits
//   non-zero on failure.
// - Without arguments an interactive menu lets the user load a file, look at
//   its KPIs, and generate the PDF report from it (or from the sample data).
use insight_report::config::{ReportConfig, DEFAULT_SAMPLE_CSV};
use insight_report::kpi;
use insight_report::loader;
use insight_report::output::preview_table_rows;
use insight_report::util::format_int;
use insight_report::{Dataset, Pipeline, ReportOutcome};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

// Loaded dataset, kept so reports can be regenerated without re-reading
// the CSV.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        source: None,
        data: None,
    })
});

struct AppState {
    source: Option<PathBuf>,
    data: Option<Dataset>,
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Read a single trimmed line after printing `prompt`. `None` once stdin is
/// closed.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to menu (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_outcome(outcome: &ReportOutcome) {
    println!();
    preview_table_rows(&kpi::kpi_rows(&outcome.kpis));
    println!("Trend: {} | Insight source: {}", outcome.trend, outcome.insight.source);
    println!("\nExecutive Summary:\n{}\n", outcome.insight.text);
    println!("Report saved to {}", outcome.report_path.display());
    println!("Chart saved to {}", outcome.chart_path.display());
    println!("Summary saved to {}\n", outcome.summary_path.display());
}

/// Handle option [1]: load and clean a CSV file into `APP_STATE`.
fn handle_load() {
    let Some(input) = read_line(&format!("CSV path (Enter for {}): ", DEFAULT_SAMPLE_CSV)) else {
        return;
    };
    let path = if input.is_empty() {
        PathBuf::from(DEFAULT_SAMPLE_CSV)
    } else {
        PathBuf::from(input)
    };
    match loader::load(&path) {
        Ok(data) => {
            println!(
                "Processing dataset... ({} rows loaded from {})\n",
                format_int(data.len() as u64),
                path.display()
            );
            preview_table_rows(&kpi::kpi_rows(&kpi::compute(&data)));
            let mut state = APP_STATE.lock().unwrap();
            state.source = Some(path);
            state.data = Some(data);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: generate the report from the loaded dataset.
fn handle_generate(pipeline: &Pipeline) {
    let (source, data) = {
        let state = APP_STATE.lock().unwrap();
        (state.source.clone(), state.data.clone())
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load a CSV file first (option 1).\n");
        return;
    };
    if let Some(source) = source {
        println!("Generating report for {}...", source.display());
    }
    match pipeline.run_dataset(&data) {
        Ok(outcome) => print_outcome(&outcome),
        Err(e) => eprintln!("Error generating report: {}\n", e),
    }
}

/// Handle option [3]: run the whole pipeline on the bundled sample data.
fn handle_sample(pipeline: &Pipeline) {
    match pipeline.run_detailed(Path::new(DEFAULT_SAMPLE_CSV)) {
        Ok(outcome) => print_outcome(&outcome),
        Err(e) => eprintln!("Error generating sample report: {}\n", e),
    }
}

fn run_once(pipeline: &Pipeline, source: &Path) -> ExitCode {
    match pipeline.run_detailed(source) {
        Ok(outcome) => {
            print_outcome(&outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error generating report: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_logging();

    let pipeline = Pipeline::new(ReportConfig::from_env());

    if let Some(source) = std::env::args().nth(1) {
        return run_once(&pipeline, Path::new(&source));
    }

    loop {
        println!("Automated Insight Report:");
        println!("[1] Load the file");
        println!("[2] Generate Report");
        println!("[3] Generate Sample Report\n");
        let Some(choice) = read_line("Enter choice: ") else {
            return ExitCode::SUCCESS;
        };
        let report_ran = match choice.as_str() {
            "1" => {
                handle_load();
                false
            }
            "2" => {
                println!();
                handle_generate(&pipeline);
                true
            }
            "3" => {
                println!();
                handle_sample(&pipeline);
                true
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
                false
            }
        };
        if report_ran && !prompt_back_to_menu() {
            println!("Exiting the program.");
            return ExitCode::SUCCESS;
        }
    }
}
