//! Rle-encode command implementation - homopolymer-compressed FASTA plus run-length tables

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use swtab_core::io::{encode_fastx_file, encode_fastx_reader, open_output, RleWriter};

use crate::error::{CliError, CliResult};
use crate::RleEncodeArgs;

pub fn execute(args: RleEncodeArgs) -> Result<()> {
    let from_stdin = args.seqs.as_os_str() == "-";
    if !from_stdin && !args.seqs.exists() {
        return Err(CliError::file_not_found(args.seqs.clone()).into());
    }

    let rle_path = rle_output_path(&args.seqs, args.rle.as_deref())?;
    log::info!("Compressing homopolymers of {}", args.seqs.display());
    log::info!("Run-length tables: {}", rle_path.display());

    let mut fasta = open_output(args.out.as_deref()).context("Failed to create compressed FASTA output")?;
    let rle_file = File::create(&rle_path)
        .with_context(|| format!("Failed to create run-length table file: {}", rle_path.display()))?;
    let mut rle = RleWriter::new(BufWriter::new(rle_file));

    let summary = if from_stdin {
        encode_fastx_reader(std::io::stdin(), &mut fasta, &mut rle)
    } else {
        encode_fastx_file(&args.seqs, &mut fasta, &mut rle)
    }
    .map_err(CliError::from)
    .with_context(|| format!("Failed to compress sequences from {}", args.seqs.display()))?;
    fasta
        .finish()
        .map_err(|e| CliError::io(e.to_string()))
        .context("Failed to finish writing compressed FASTA output")?;

    log::info!(
        "Compressed {} sequences: {} residues to {} ({:.1}%)",
        summary.sequences,
        summary.residues,
        summary.compressed_residues,
        summary.ratio() * 100.0
    );
    Ok(())
}

/// Without an explicit path the tables go next to the input as `<SEQS>.rle.csv`.
fn rle_output_path(seqs: &Path, explicit: Option<&Path>) -> CliResult<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None if seqs.as_os_str() == "-" => Err(CliError::invalid_argument(
            "--rle is required when reading sequences from standard input",
        )),
        None => {
            let mut name = seqs.as_os_str().to_owned();
            name.push(".rle.csv");
            Ok(PathBuf::from(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use swtab_core::io::read_rle_file;
    use tempfile::tempdir;

    #[test]
    fn test_default_rle_path() {
        let path = rle_output_path(Path::new("data/reads.fa"), None).unwrap();
        assert_eq!(path, PathBuf::from("data/reads.fa.rle.csv"));

        let path = rle_output_path(Path::new("reads.fa"), Some(Path::new("runs.csv"))).unwrap();
        assert_eq!(path, PathBuf::from("runs.csv"));

        assert!(rle_output_path(Path::new("-"), None).is_err());
    }

    #[test]
    fn test_execute() {
        let dir = tempdir().unwrap();
        let seqs = dir.path().join("reads.fa");
        let out = dir.path().join("reads.hpc.fa");
        fs::write(&seqs, ">r1 sample read\nTTTGCCA\n>r2\nAC\n").unwrap();

        execute(RleEncodeArgs {
            seqs: seqs.clone(),
            out: Some(out.clone()),
            rle: None,
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), ">r1 sample read\nTGCA\n>r2\nAC\n");
        let tables = read_rle_file(dir.path().join("reads.fa.rle.csv")).unwrap();
        assert_eq!(tables.get("r1").unwrap().runs(), &[3, 1, 2, 1]);
        assert_eq!(tables.get("r2").unwrap().runs(), &[1, 1]);
    }

    #[test]
    fn test_execute_missing_input() {
        let err = execute(RleEncodeArgs {
            seqs: PathBuf::from("/nonexistent/reads.fa"),
            out: None,
            rle: None,
        })
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::FileNotFound { .. })));
    }
}
