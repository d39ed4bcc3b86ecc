//! Run-length table files
//!
//! Headerless CSV with two columns, the sequence name and its run-length
//! code (see [`crate::rle`]). Codes may contain `,` and `"`, so fields are
//! read and written with full CSV quoting rules.

use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::{Result, SwtabError};
use crate::io::open_input;
use crate::rle::{RunLengthTable, RunLengthTables};

/// Read run-length tables from any CSV source.
pub fn read_rle_tables<R: Read>(reader: R) -> Result<RunLengthTables> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut tables = RunLengthTables::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        let line = row.position().map(|p| p.line() as usize).unwrap_or(index + 1);

        if row.len() != 2 {
            return Err(SwtabError::Parse {
                line,
                message: format!("expected 2 fields (name, rle), got {}", row.len()),
            });
        }
        // Tolerate an explicit header row
        if index == 0 && &row[0] == "name" && &row[1] == "rle" {
            continue;
        }

        let table = RunLengthTable::from_ascii(&row[1]).map_err(|e| SwtabError::Parse {
            line,
            message: e.to_string(),
        })?;
        if tables.insert(&row[0], table).is_some() {
            log::warn!("Run-length table for '{}' defined more than once; keeping the last", &row[0]);
        }
    }

    Ok(tables)
}

/// Read one run-length table file (gzip allowed).
pub fn read_rle_file<P: AsRef<Path>>(path: P) -> Result<RunLengthTables> {
    let reader = open_input(Some(path.as_ref()))?;
    read_rle_tables(reader)
}

/// Read and merge several run-length table files; later files win.
pub fn read_rle_files<P: AsRef<Path>>(paths: &[P]) -> Result<RunLengthTables> {
    let mut tables = RunLengthTables::new();
    for path in paths {
        let loaded = read_rle_file(path)?;
        log::info!(
            "Loaded {} run-length tables from {}",
            loaded.len(),
            path.as_ref().display()
        );
        tables.extend(loaded);
    }
    Ok(tables)
}

/// Streaming writer for `name,rle` rows.
pub struct RleWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RleWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: WriterBuilder::new().has_headers(false).from_writer(writer),
        }
    }

    pub fn write(&mut self, name: &str, table: &RunLengthTable) -> Result<()> {
        write_rle_table(&mut self.writer, name, table)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Write one `name,rle` row.
pub fn write_rle_table<W: Write>(writer: &mut csv::Writer<W>, name: &str, table: &RunLengthTable) -> Result<()> {
    let code = table.to_ascii()?;
    writer.write_record([name, code.as_str()])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_tables() {
        let data = "s1,$#%\ns2,\"\"\"\"\"\"\n";
        let tables = read_rle_tables(data.as_bytes()).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables.get("s1").unwrap().runs(), &[3, 2, 4]);
        // A quoted code made of two '"' bytes
        assert_eq!(tables.get("s2").unwrap().runs(), &[1, 1]);
    }

    #[test]
    fn test_header_row_is_skipped() {
        let tables = read_rle_tables("name,rle\ns1,#\n".as_bytes()).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables.get("s1").unwrap().runs(), &[2]);
    }

    #[test]
    fn test_bad_row() {
        let err = read_rle_tables("s1,#,extra\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SwtabError::Parse { line: 1, .. }));

        let err = read_rle_tables("s1,#\ns2, \n".as_bytes()).unwrap_err();
        assert!(matches!(err, SwtabError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_write_then_read() {
        let mut buffer = Vec::new();
        {
            let mut writer = RleWriter::new(&mut buffer);
            writer.write("a", &RunLengthTable::new(vec![1, 11, 1])).unwrap();
            writer.write("b", &RunLengthTable::new(vec![93])).unwrap();
            writer.flush().unwrap();
        }
        // 11 encodes as ',' which forces quoting
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("a,\""));

        let tables = read_rle_tables(buffer.as_slice()).unwrap();
        assert_eq!(tables.get("a").unwrap().runs(), &[1, 11, 1]);
        assert_eq!(tables.get("b").unwrap().runs(), &[93]);
    }

    #[test]
    fn test_later_files_win() {
        let mut first = NamedTempFile::new().unwrap();
        writeln!(first, "s1,#").unwrap();
        let mut second = NamedTempFile::new().unwrap();
        writeln!(second, "s1,$").unwrap();
        writeln!(second, "s2,\"\"\"\"").unwrap();

        let tables = read_rle_files(&[first.path(), second.path()]).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables.get("s1").unwrap().runs(), &[3]);
    }
}
