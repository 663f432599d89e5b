//! CLI entry point for the course rater.
//!
//! Joins grade distributions with course evaluation results, writes the
//! processed data, and reports statistics over filtered slices of it.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use course_rater::config::{SourceConfig, SourceOverrides};
use course_rater::fetch::{BasicClient, load_sources};
use course_rater::filter::{CourseFilter, filter};
use course_rater::loader::load_or_process;
use course_rater::output::{export_csv, print_json, print_pretty, write_processed};
use course_rater::pipeline::process;
use course_rater::stats::compute_stats;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "course_rater")]
#[command(about = "Join course grade distributions with evaluation results", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and join the three source tables, then write the processed data
    Process {
        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Report statistics over the (optionally filtered) joined courses
    Stats {
        #[command(flatten)]
        sources: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Log the statistics as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Export the (optionally filtered) joined courses as CSV
    Export {
        #[command(flatten)]
        sources: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// CSV file to write
        #[arg(short, long, default_value = "courses.csv")]
        out: PathBuf,
    },
    /// List the departments, academic years, and instructors available to filter on
    Options {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// JSON file with source locations
    #[arg(long)]
    config: Option<String>,

    /// Grades CSV (path or URL)
    #[arg(long)]
    grades: Option<String>,

    /// Evaluation parameters CSV (path or URL)
    #[arg(long)]
    eval_params: Option<String>,

    /// Evaluation medians CSV (path or URL)
    #[arg(long)]
    eval_medians: Option<String>,

    /// Directory for processed JSON output
    #[arg(short = 'd', long)]
    output_dir: Option<String>,
}

impl SourceArgs {
    fn resolve(self) -> Result<SourceConfig> {
        SourceConfig::resolve(
            self.config.as_deref(),
            SourceOverrides {
                grades: self.grades,
                eval_params: self.eval_params,
                eval_medians: self.eval_medians,
                output_dir: self.output_dir,
            },
        )
    }
}

#[derive(Args)]
struct FilterArgs {
    /// Exact department, e.g. "CSE"
    #[arg(long)]
    department: Option<String>,

    /// Exact academic year, e.g. "2021-2022"
    #[arg(long)]
    year: Option<String>,

    /// Exact instructor as shown in the grade data, e.g. "STEPP, MARTY"
    #[arg(long)]
    instructor: Option<String>,

    /// Case-insensitive text to find in the course title or number
    #[arg(short, long)]
    search: Option<String>,
}

impl From<FilterArgs> for CourseFilter {
    fn from(args: FilterArgs) -> Self {
        CourseFilter {
            department: args.department,
            year: args.year,
            instructor: args.instructor,
            search: args.search,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/course_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("course_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let client = BasicClient::new()?;

    match cli.command {
        Commands::Process { sources } => {
            let config = sources.resolve()?;
            run_process(&client, &config).await?;
        }
        Commands::Stats {
            sources,
            filter: filter_args,
            json,
        } => {
            let config = sources.resolve()?;
            let loaded = load_or_process(&client, &config).await?;
            let course_filter = CourseFilter::from(filter_args);
            let selected = filter(&loaded.courses, &course_filter);
            let stats = compute_stats(selected.iter().copied());

            if json {
                print_json(&stats)?;
            } else {
                print_pretty(&stats);
                info!(
                    total_courses = stats.total_courses,
                    avg_gpa = %format!("{:.2}", stats.avg_gpa),
                    avg_rating = %format!("{:.2}", stats.avg_rating),
                    total_students = stats.total_students,
                    filtered = !course_filter.is_empty(),
                    "Course statistics"
                );
            }
        }
        Commands::Export {
            sources,
            filter: filter_args,
            out,
        } => {
            let config = sources.resolve()?;
            let loaded = load_or_process(&client, &config).await?;
            let selected = filter(&loaded.courses, &CourseFilter::from(filter_args));
            let written = export_csv(&out, selected.iter().copied())?;
            info!(written, out = %out.display(), "Courses exported");
        }
        Commands::Options { sources } => {
            let config = sources.resolve()?;
            let loaded = load_or_process(&client, &config).await?;
            print_json(&loaded.filter_options)?;
        }
    }

    Ok(())
}

/// Loads the raw sources, runs the join, and writes the processed artifacts.
#[tracing::instrument(skip_all, fields(output_dir = %config.output_dir))]
async fn run_process(client: &BasicClient, config: &SourceConfig) -> Result<()> {
    let texts = load_sources(client, config).await?;
    let data = process(&texts)?;

    if data.report.with_rating == 0 {
        warn!("No grade record matched an evaluation with a rating");
    }
    for (level, count) in &data.report.by_level {
        info!(level = ?level, count, "Matches by key level");
    }

    write_processed(Path::new(&config.output_dir), &data)?;
    info!(
        records = data.courses.len(),
        departments = data.filter_options.departments.len(),
        years = data.filter_options.years.len(),
        instructors = data.filter_options.instructors.len(),
        "Processing finished"
    );
    Ok(())
}
