use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use codeprep_text::{extract_blocks, BlockFormat, ExtractedBlock, Extraction};
use codeprep_workspace::{
    compose, format_tree, prepare_writes, write_all, CommandHost, DocumentHost, NoopHost,
    WorkspaceError,
};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod render;
mod state;

use state::AppState;

#[derive(Parser)]
#[command(name = "codeprep")]
#[command(about = "Curate source files into an LLM prompt and write the reply back", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base directory for relative paths (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Session file (defaults to <root>/.codeprep/session.json)
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Track files; directories are added recursively
    Add(AddArgs),

    /// Stop tracking a file
    Remove(RemoveArgs),

    /// Stop tracking every file
    Clear,

    /// Enable/disable a file, or every file under a folder
    Toggle(ToggleArgs),

    /// Show the tracked files as a tree
    Tree(TreeArgs),

    /// Compose the enabled files into a prompt
    Prompt(PromptArgs),

    /// Parse a reply and print the blocks found as JSON
    Extract(ExtractArgs),

    /// Parse a reply and write its blocks to disk
    Apply(ApplyArgs),

    /// Show or change the line appended to every prompt
    Trailer(TrailerArgs),
}

#[derive(Args)]
struct AddArgs {
    /// Files or directories (relative to the root or absolute)
    #[arg(required = true)]
    paths: Vec<String>,

    /// Include dot-files when walking directories
    #[arg(long)]
    include_hidden: bool,

    /// Do not apply .gitignore rules when walking directories
    #[arg(long)]
    no_gitignore: bool,
}

#[derive(Args)]
struct RemoveArgs {
    /// Tracked path, as shown by `tree`
    path: String,
}

#[derive(Args)]
struct ToggleArgs {
    /// Tracked file or folder path
    path: String,
}

#[derive(Args)]
struct TreeArgs {
    /// Plain sorted listing without checkboxes
    #[arg(long)]
    plain: bool,
}

#[derive(Args)]
struct PromptArgs {
    /// Write the prompt to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Leave out the trailer line
    #[arg(long)]
    no_trailer: bool,
}

#[derive(Args)]
struct ExtractArgs {
    /// Read the reply from a file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Args)]
struct ApplyArgs {
    /// Read the reply from a file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Target path when the reply does not name one
    #[arg(long)]
    path: Option<String>,

    /// Formatter to run on each written file (overrides config)
    #[arg(long)]
    format_cmd: Option<String>,

    /// Do not add written files to the tracked list
    #[arg(long)]
    no_track: bool,
}

#[derive(Args)]
struct TrailerArgs {
    #[command(subcommand)]
    action: TrailerAction,
}

#[derive(Subcommand)]
enum TrailerAction {
    /// Print the current trailer
    Show,
    /// Set the trailer
    Set {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Remove the trailer
    Clear,
}

#[derive(Serialize)]
struct ExtractOutput<'a> {
    format: BlockFormat,
    ambiguous: bool,
    blocks: &'a [ExtractedBlock],
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    // `extract` is pure text work and needs no session.
    if let Commands::Extract(args) = &cli.command {
        return run_extract(args);
    }

    let mut state = AppState::open(cli.root.as_deref(), cli.session.as_deref()).await?;
    match cli.command {
        Commands::Add(args) => run_add(&mut state, args).await?,
        Commands::Remove(args) => run_remove(&mut state, &args.path).await?,
        Commands::Clear => {
            let count = state.store.len();
            state.store.clear_files();
            state.save().await?;
            println!("Cleared {count} files");
        }
        Commands::Toggle(args) => run_toggle(&mut state, &args.path).await?,
        Commands::Tree(args) => {
            if args.plain {
                print!("{}", format_tree(state.store.records()));
            } else {
                print!("{}", render::render_tree(&state.store.build_tree()));
            }
        }
        Commands::Prompt(args) => run_prompt(&state, args).await?,
        Commands::Extract(args) => run_extract(&args)?,
        Commands::Apply(args) => run_apply(&mut state, args).await?,
        Commands::Trailer(args) => run_trailer(&mut state, args.action).await?,
    }

    Ok(())
}

async fn run_add(state: &mut AppState, args: AddArgs) -> Result<()> {
    let mut scan = state.config.scan;
    if args.include_hidden {
        scan.include_hidden = true;
    }
    if args.no_gitignore {
        scan.respect_gitignore = false;
    }
    state.store.set_scan_options(scan);

    let report = state.store.add_files(&args.paths)?;
    state.save().await?;

    for failure in &report.failed {
        eprintln!("could not add {}: {}", failure.path, failure.message);
    }
    println!(
        "Added {} files ({} already tracked)",
        report.added.len(),
        report.skipped.len()
    );
    Ok(())
}

async fn run_remove(state: &mut AppState, path: &str) -> Result<()> {
    match state.store.remove_file(path) {
        Ok(record) => {
            state.save().await?;
            println!("Removed {}", record.path);
        }
        Err(err @ WorkspaceError::NotFound(_)) => log::warn!("{err}"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

async fn run_toggle(state: &mut AppState, path: &str) -> Result<()> {
    match state.store.toggle_path(path) {
        Ok(()) => {
            state.save().await?;
            let enabled = state.store.enabled_files().len();
            println!("{enabled} of {} files enabled", state.store.len());
        }
        Err(err @ WorkspaceError::NotFound(_)) => log::warn!("{err}"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

async fn run_prompt(state: &AppState, args: PromptArgs) -> Result<()> {
    let trailer = if args.no_trailer {
        None
    } else {
        state.preferences.append_line()
    };
    let prompt = compose(&state.store.enabled_files(), trailer).await?;
    for failure in &prompt.failures {
        eprintln!("skipped {}: {}", failure.path, failure.message);
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &prompt.text)
                .with_context(|| format!("Failed to write prompt to {}", path.display()))?;
            log::info!(
                "Wrote prompt with {} files to {}",
                prompt.included.len(),
                path.display()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(prompt.text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn run_extract(args: &ExtractArgs) -> Result<()> {
    let reply = read_input(args.input.as_deref())?;
    let extraction = extract_blocks(&reply);
    log::info!(
        "Found {} blocks ({})",
        extraction.blocks.len(),
        extraction.format.as_str()
    );
    let output = ExtractOutput {
        format: extraction.format,
        ambiguous: extraction.is_ambiguous(),
        blocks: &extraction.blocks,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_apply(state: &mut AppState, args: ApplyArgs) -> Result<()> {
    let reply = read_input(args.input.as_deref())?;
    let mut extraction = extract_blocks(&reply);
    log::info!(
        "Found {} blocks ({})",
        extraction.blocks.len(),
        extraction.format.as_str()
    );
    assign_explicit_path(&mut extraction, args.path.as_deref());

    let prepared = prepare_writes(&extraction.blocks, Some(&state.root))?;
    let host: Arc<dyn DocumentHost> = match args
        .format_cmd
        .as_deref()
        .or(state.config.format_command.as_deref())
    {
        Some(command) => Arc::new(CommandHost::parse(command)?),
        None => Arc::new(NoopHost),
    };

    let report = write_all(prepared, host, state.config.retry_policy()).await;
    print!("{}", render::render_write_report(&report));

    if !args.no_track {
        let written: Vec<String> = report
            .succeeded()
            .iter()
            .map(|o| o.path.to_string_lossy().into_owned())
            .collect();
        if !written.is_empty() {
            state.store.add_files(&written)?;
            state.save().await?;
        }
    }

    let failed = report.failed().len();
    if failed > 0 {
        bail!("{failed} of {} files could not be written", report.outcomes.len());
    }
    Ok(())
}

/// `--path` names the target of an undecorated reply; a reply that already
/// names its files keeps them.
fn assign_explicit_path(extraction: &mut Extraction, path: Option<&str>) {
    let Some(path) = path else {
        return;
    };
    if extraction.is_ambiguous() {
        extraction.blocks[0].file_path = Some(path.to_string());
    } else {
        log::warn!("Ignoring --path {path}: the reply already names its files");
    }
}

async fn run_trailer(state: &mut AppState, action: TrailerAction) -> Result<()> {
    match action {
        TrailerAction::Show => {
            if let Some(line) = state.preferences.append_line() {
                println!("{line}");
            }
        }
        TrailerAction::Set { text } => {
            state.preferences.set_append_line(&text.join(" "));
            state.save().await?;
        }
        TrailerAction::Clear => {
            state.preferences.set_append_line("");
            state.save().await?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}
