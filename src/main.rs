// Command-line entry point for httpreturncheck.

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use httpreturncheck::application::CheckUsecase;
use httpreturncheck::domain::analyzer::Analyzer;
use httpreturncheck::infrastructure::concurrency::init_thread_pool;
use httpreturncheck::infrastructure::project_loader::ProjectLoader;
use httpreturncheck::infrastructure::GoSourceParser;
use httpreturncheck::ports::report_exporter::{JsonExporter, TextExporter};
use httpreturncheck::ports::ReportExporter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// file:line:col: message
    Text,
    /// go vet -json layout
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Go files or directories to check
    paths: Vec<PathBuf>,

    /// Input source file path (can specify multiple)
    #[arg(short, long)]
    input: Vec<PathBuf>,

    /// Input source folder(s), searched recursively for .go files
    #[arg(short = 'd', long)]
    folder: Vec<PathBuf>,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<u8> {
    let paths: Vec<PathBuf> = cli
        .paths
        .iter()
        .chain(&cli.input)
        .chain(&cli.folder)
        .cloned()
        .collect();

    init_thread_pool(cli.jobs)?;

    let loaded = ProjectLoader::load(&paths);
    let analyzer = Analyzer::default();
    let usecase = CheckUsecase {
        parser: &GoSourceParser,
        analyzer: &analyzer,
    };
    let mut report = usecase.run(&loaded.units);
    let mut failures = loaded.failures;
    failures.append(&mut report.failures);
    report.failures = failures;

    for failure in &report.failures {
        eprintln!("{}", failure);
    }

    let exporter: &dyn ReportExporter = match cli.format {
        Format::Text => &TextExporter,
        Format::Json => &JsonExporter,
    };
    match &cli.output {
        Some(path) => exporter.export(&report, path)?,
        None => print!("{}", exporter.render(&report)?),
    }

    Ok(report.exit_code() as u8)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if cli.paths.is_empty() && cli.input.is_empty() && cli.folder.is_empty() {
        Cli::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "provide at least one path, --input <FILE> or --folder <DIR>",
            )
            .exit();
    }

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
