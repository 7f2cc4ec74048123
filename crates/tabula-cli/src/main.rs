//! Tabula CLI - load, edit and export spreadsheet data

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tabula::prelude::*;
use tabula::{chunk, TabulaConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(author, version, about = "Load, edit and export spreadsheet data")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Sheet selection shared by the commands that load rows
#[derive(clap::Args)]
struct SheetArgs {
    /// Sheet name (default: first sheet)
    #[arg(short, long, default_value = "")]
    sheet: String,

    /// Header row, 1-based (0 = first row)
    #[arg(long, default_value = "1")]
    header_row: u32,

    /// Rows to read after the header (0 = all)
    #[arg(short, long, default_value = "0")]
    limit: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sheets in a workbook
    Sheets {
        /// Input workbook
        input: PathBuf,
    },

    /// Print a sheet as delimited text with normalized column keys
    Dump {
        /// Input workbook
        input: PathBuf,

        #[command(flatten)]
        sheet: SheetArgs,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split a sheet's rows into numbered delimited files
    Export {
        /// Input workbook
        input: PathBuf,

        #[command(flatten)]
        sheet: SheetArgs,

        /// Folder the files are written to
        #[arg(long)]
        root: PathBuf,

        /// File name pattern with one `{}` offset placeholder
        #[arg(long)]
        pattern: String,

        /// Rows per file
        #[arg(long)]
        chunk_size: usize,

        /// Offset of the first file
        #[arg(long, default_value = "0")]
        base_offset: u32,

        /// Explicit offsets, one per file
        #[arg(long, value_delimiter = ',')]
        offsets: Vec<u32>,
    },

    /// Set one cell and save the workbook
    Set {
        /// Input workbook
        input: PathBuf,

        /// Sheet name
        #[arg(short, long)]
        sheet: String,

        /// Row, 0-based
        #[arg(long)]
        row: u32,

        /// Column, 0-based
        #[arg(long)]
        column: u16,

        /// New cell text
        #[arg(long)]
        value: String,

        /// Save to this file instead of the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => TabulaConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => TabulaConfig::default(),
    };

    match cli.command {
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Dump {
            input,
            sheet,
            delimiter,
            output,
        } => dump(&input, &sheet, &config, delimiter, output.as_deref()),
        Commands::Export {
            input,
            sheet,
            root,
            pattern,
            chunk_size,
            base_offset,
            offsets,
        } => {
            let pattern = FilePattern::parse(&pattern).context("Invalid --pattern")?;
            let mut plan = PartitionPlan::new(root, pattern, base_offset).with_offsets(offsets);
            plan.max_writers = config.max_workers;
            export(&input, &sheet, &config, &plan, chunk_size)
        }
        Commands::Set {
            input,
            sheet,
            row,
            column,
            value,
            output,
        } => set_cell(&input, &sheet, row, column, &value, output.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_options(args: &SheetArgs, config: &TabulaConfig) -> LoadOptions {
    LoadOptions {
        header_row: args.header_row,
        row_limit: args.limit,
        worksheet: args.sheet.clone(),
        ..config.load_options()
    }
}

fn open(input: &Path, options: &LoadOptions) -> Result<WorkbookStore> {
    tracing::debug!(path = %input.display(), ?options, "opening workbook");
    WorkbookStore::open(input, options).with_context(|| format!("Failed to open '{}'", input.display()))
}

fn selected_view<'a>(store: &'a WorkbookStore, args: &SheetArgs) -> Result<&'a SheetView> {
    let view = if args.sheet.is_empty() {
        store.first_sheet()
    } else {
        store.sheet(&args.sheet)
    };
    Ok(view?)
}

/// Rows in sheet order, one field per column key
fn records(view: &SheetView) -> Vec<Vec<Option<String>>> {
    let keys = view.column_keys();
    view.rows_in_sheet_order()
        .into_iter()
        .map(|row| {
            row.values_for(&keys[..])
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect()
        })
        .collect()
}

fn list_sheets(input: &Path) -> Result<()> {
    let options = LoadOptions {
        row_limit: 1,
        ..LoadOptions::default()
    };
    let store = open(input, &options)?;

    for (i, name) in store.worksheet_names()?.iter().enumerate() {
        println!("{}: {}", i, name);
    }
    Ok(())
}

fn dump(
    input: &Path,
    args: &SheetArgs,
    config: &TabulaConfig,
    delimiter: char,
    output: Option<&Path>,
) -> Result<()> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }

    let store = open(input, &load_options(args, config))?;
    let view = selected_view(&store, args)?;
    let records = records(view);

    let writer = TabularWriter::new(CsvWriteOptions {
        delimiter: delimiter as u8,
        ..CsvWriteOptions::with_header(view.column_keys())
    });

    match output {
        Some(path) => {
            writer
                .write(&records, path)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            eprintln!("Wrote {} rows to '{}'", records.len(), path.display());
        }
        None => writer
            .write_to(&records, io::stdout().lock())
            .context("Failed to write to stdout")?,
    }
    Ok(())
}

fn export(
    input: &Path,
    args: &SheetArgs,
    config: &TabulaConfig,
    plan: &PartitionPlan,
    chunk_size: usize,
) -> Result<()> {
    if chunk_size == 0 {
        bail!("--chunk-size must be at least 1");
    }

    let store = open(input, &load_options(args, config))?;
    let view = selected_view(&store, args)?;
    let groups = chunk(&records(view), chunk_size);

    let writer = TabularWriter::new(CsvWriteOptions::with_header(view.column_keys()));
    let outcomes = writer.write_partitioned(&groups, plan);

    let mut failed = 0;
    for outcome in &outcomes {
        match (&outcome.result, &outcome.path) {
            (Ok(()), Some(path)) => eprintln!("  [{}] {}", outcome.index, path.display()),
            (Ok(()), None) => {}
            (Err(e), _) => {
                failed += 1;
                eprintln!("  [{}] FAILED: {}", outcome.index, e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} partitions failed", failed, outcomes.len());
    }
    eprintln!("Exported {} rows in {} files", view.len(), outcomes.len());
    Ok(())
}

fn set_cell(
    input: &Path,
    sheet: &str,
    row: u32,
    column: u16,
    value: &str,
    output: Option<&Path>,
) -> Result<()> {
    let options = LoadOptions {
        row_limit: 1,
        ..LoadOptions::worksheet(sheet)
    };
    let mut store = open(input, &options)?;

    store
        .update_cell(sheet, column, row, value)
        .with_context(|| format!("Failed to update {}!R{}C{}", sheet, row, column))?;

    let target = output.unwrap_or(input);
    store
        .save_workbook(target)
        .with_context(|| format!("Failed to save '{}'", target.display()))?;
    eprintln!("Saved '{}'", target.display());
    Ok(())
}
