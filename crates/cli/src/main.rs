//! `texmark`: converts markdown files to standalone LaTeX documents.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use texmark_core::TexmarkError;
use texmark_latex::{
    BatchJob, BatchOptions, ConvertOptions, Workspace, convert_batch, convert_str,
};

#[derive(Debug, Parser)]
#[command(name = "texmark", version, about = "Convert markdown documents to LaTeX")]
struct Args {
    /// Directory that input and output paths are resolved against.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// JSON file with conversion options.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output path for a single input; `-` writes to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overrides the `\author{..}` line.
    #[arg(long)]
    author: Option<String>,

    /// Worker threads for batch conversion.
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Prints the effective options as JSON and exits.
    #[arg(long)]
    print_config: bool,

    /// Enables debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Markdown files to convert.
    #[arg(required_unless_present = "print_config")]
    inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env).try_init();

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("texmark: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_options(args: &Args) -> Result<ConvertOptions, TexmarkError> {
    let mut options = match &args.config {
        Some(path) => ConvertOptions::from_json_file(path)?,
        None => ConvertOptions::default(),
    };
    if let Some(author) = &args.author {
        options.author = author.clone();
    }
    Ok(options)
}

fn run(args: Args) -> Result<ExitCode, TexmarkError> {
    let options = load_options(&args)?;

    if args.print_config {
        let json = serde_json::to_string_pretty(&options)
            .map_err(|e| TexmarkError::Config(e.to_string()))?;
        println!("{json}");
        return Ok(ExitCode::SUCCESS);
    }

    let workspace = Workspace::new(&args.root).with_options(options);

    match args.inputs.as_slice() {
        [input] => convert_single(&workspace, input, args.output.as_deref()),
        inputs => {
            if args.output.is_some() {
                return Err(TexmarkError::Config(
                    "--output can only be used with a single input".to_string(),
                ));
            }
            let jobs = inputs.iter().cloned().map(BatchJob::beside).collect();
            let outcome = convert_batch(
                &workspace,
                jobs,
                &BatchOptions {
                    max_threads: args.jobs,
                    ..BatchOptions::default()
                },
            );
            for result in &outcome.results {
                match &result.output {
                    Ok(path) => log::info!("wrote {}", path.display()),
                    Err(err) => eprintln!("texmark: {}: {err}", result.job.input.display()),
                }
            }
            log::info!(
                "{} of {} documents converted in {:.1}ms",
                outcome.stats.succeeded,
                outcome.stats.total,
                outcome.stats.processing_time_ms
            );
            Ok(if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn convert_single(
    workspace: &Workspace,
    input: &Path,
    output: Option<&Path>,
) -> Result<ExitCode, TexmarkError> {
    match output {
        Some(path) if path == Path::new("-") => {
            let source = workspace.read_source(input)?;
            print!("{}", convert_str(&source, workspace.options())?);
        }
        Some(path) => {
            workspace.convert_file(input, path)?;
        }
        None => {
            workspace.convert_file(input, input.with_extension("tex"))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
