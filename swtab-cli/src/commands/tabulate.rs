//! Tabulate command implementation - ssearch36 alignments to a delimited table

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use swtab_core::io::{open_input, open_output, parse_extras, parse_fieldnames, read_rle_files, write_table, TableOptions};
use swtab_core::pipeline::{annotate, select};
use swtab_core::{GroupMode, PipelineOptions, RunPadding, SsearchReader};

use crate::config::{parse_delimiter, Config};
use crate::error::{CliError, CliResult};
use crate::TabulateArgs;

pub fn execute(config: &Config, args: TabulateArgs) -> Result<()> {
    let input_label = describe(args.alignments.as_deref(), "standard input");
    log::info!("Tabulating alignments from {}", input_label);

    if let Some(path) = args.alignments.as_deref() {
        check_exists(path)?;
    }
    for path in &args.rlefiles {
        check_exists(path)?;
    }

    let options = pipeline_options(config, &args)?;
    let table_options = table_options(config, &args)?;

    let reader = open_input(args.alignments.as_deref())
        .with_context(|| format!("Failed to open alignments: {}", input_label))?;
    let records = SsearchReader::new(reader);
    let mut stream = select(records, &options);

    if args.print_one {
        return print_first(&mut stream);
    }

    let stream = annotate(stream, options.with_diff);
    let output_label = describe(args.out.as_deref(), "standard output");
    let mut out = open_output(args.out.as_deref())
        .with_context(|| format!("Failed to create output: {}", output_label))?;

    let rows = write_table(&mut out, stream, &table_options)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to tabulate alignments from {}", input_label))?;
    out.finish()
        .map_err(|e| CliError::io(e.to_string()))
        .with_context(|| format!("Failed to finish writing {}", output_label))?;

    log::info!("Wrote {} rows to {}", rows, output_label);
    Ok(())
}

fn describe(path: Option<&Path>, stdio: &str) -> String {
    match path {
        Some(p) if p.as_os_str() != "-" => p.display().to_string(),
        _ => stdio.to_string(),
    }
}

fn check_exists(path: &Path) -> CliResult<()> {
    if path.as_os_str() != "-" && !path.exists() {
        return Err(CliError::file_not_found(PathBuf::from(path)));
    }
    Ok(())
}

/// Combine command-line flags with the `[selection]` configuration; flags win.
fn pipeline_options(config: &Config, args: &TabulateArgs) -> Result<PipelineOptions> {
    let selection = &config.selection;

    let rle = if args.rlefiles.is_empty() {
        None
    } else {
        let tables = read_rle_files(&args.rlefiles)
            .map_err(CliError::from)
            .context("Failed to read run-length tables")?;
        log::info!("Decoding homopolymers with {} run-length tables", tables.len());
        Some(tables)
    };

    let group_mode = if args.top_alignment || selection.top_alignment {
        GroupMode::Top
    } else {
        GroupMode::All
    };

    let padding = if args.pad_runs {
        RunPadding::Synchronize
    } else {
        RunPadding::None
    };

    Ok(PipelineOptions {
        limit: args.limit.or(selection.limit),
        min_zscore: args.min_zscore.or(selection.min_zscore),
        group_mode,
        rle,
        padding,
        with_diff: args.with_diff,
    })
}

/// Combine command-line flags with the `[output]` configuration; flags win.
fn table_options(config: &Config, args: &TabulateArgs) -> CliResult<TableOptions> {
    let fieldnames = args.fieldnames.as_deref().map(parse_fieldnames);
    let extras = match args.extra_fields.as_deref() {
        Some(list) => parse_extras(list)?,
        None => Vec::new(),
    };
    let delimiter = match args.delimiter.as_deref() {
        Some(value) => parse_delimiter(value)?,
        None => config.output.delimiter_byte()?,
    };

    Ok(TableOptions {
        fieldnames,
        extras,
        header: config.output.header && !args.no_header,
        delimiter,
    })
}

fn print_first<I>(stream: &mut I) -> Result<()>
where
    I: Iterator<Item = swtab_core::Result<swtab_core::AlignmentRecord>>,
{
    match stream.next() {
        Some(record) => {
            let record = record.map_err(CliError::from)?;
            let json = serde_json::to_string_pretty(&record).context("Failed to serialize alignment")?;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", json).context("Failed to write to standard output")?;
        }
        None => log::warn!("No alignments to print"),
    }
    Ok(())
}
