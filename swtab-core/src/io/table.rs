//! Delimited tabular output
//!
//! The column set is fixed before the first row is written: either the
//! caller's field list, or the fields of the first record, which is pulled
//! from the stream and pushed back so it is still written. Constant extra
//! fields are appended to the columns and set on every record. Every cell is
//! quoted.

use std::io::Write;

use csv::{QuoteStyle, WriterBuilder};

use crate::error::{Result, SwtabError};
use crate::pipeline::Pushback;
use crate::types::AlignmentRecord;

/// Parse a comma-separated list of field names.
pub fn parse_fieldnames(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Parse constant extra fields given as `name1:val1,name2:val2`.
pub fn parse_extras(list: &str) -> Result<Vec<(String, String)>> {
    list.split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| {
            pair.split_once(':')
                .map(|(name, value)| (name.trim().to_string(), value.to_string()))
                .filter(|(name, _)| !name.is_empty())
                .ok_or_else(|| {
                    SwtabError::InvalidArgument(format!(
                        "extra field '{}' is not of the form name:value",
                        pair
                    ))
                })
        })
        .collect()
}

/// Work out the output columns.
///
/// Without an explicit list this consumes the first item of `records` to
/// read its field names and pushes it back, so the stream still starts with
/// it. An error in that first item is returned immediately.
pub fn resolve_columns<I>(
    explicit: Option<&[String]>,
    extras: &[(String, String)],
    records: &mut Pushback<I>,
) -> Result<Vec<String>>
where
    I: Iterator<Item = Result<AlignmentRecord>>,
{
    let mut columns: Vec<String> = match explicit {
        Some(names) => names.to_vec(),
        None => match records.next() {
            Some(Ok(first)) => {
                let names = first.keys().map(String::from).collect();
                records.push_back(Ok(first));
                names
            }
            Some(Err(e)) => return Err(e),
            None => Vec::new(),
        },
    };

    for (name, _) in extras {
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }

    Ok(columns)
}

/// Writes records as rows over a fixed column set.
pub struct TableWriter<W: Write> {
    writer: csv::Writer<W>,
    columns: Vec<String>,
    rows: usize,
}

impl<W: Write> TableWriter<W> {
    pub fn new(writer: W, columns: Vec<String>, delimiter: u8) -> Self {
        let writer = WriterBuilder::new()
            .delimiter(delimiter)
            .quote_style(QuoteStyle::Always)
            .has_headers(false)
            .from_writer(writer);
        Self {
            writer,
            columns,
            rows: 0,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn write_header(&mut self) -> Result<()> {
        if self.columns.is_empty() {
            return Ok(());
        }
        self.writer.write_record(&self.columns)?;
        Ok(())
    }

    /// Write one row. Fields outside the column set are ignored; columns the
    /// record lacks are left empty.
    pub fn write_record(&mut self, record: &AlignmentRecord) -> Result<()> {
        if self.columns.is_empty() {
            return Ok(());
        }
        let row = self.columns.iter().map(|column| record.get(column).unwrap_or(""));
        self.writer.write_record(row)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Explicit output columns; `None` takes them from the first record
    pub fieldnames: Option<Vec<String>>,
    /// Constant `name, value` fields added to every row
    pub extras: Vec<(String, String)>,
    pub header: bool,
    pub delimiter: u8,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            fieldnames: None,
            extras: Vec::new(),
            header: true,
            delimiter: b',',
        }
    }
}

/// Resolve the columns and write a header plus one row per record.
/// Returns the number of rows written.
pub fn write_table<W, I>(out: W, records: I, options: &TableOptions) -> Result<usize>
where
    W: Write,
    I: Iterator<Item = Result<AlignmentRecord>>,
{
    let mut records = Pushback::new(records);
    let columns = resolve_columns(options.fieldnames.as_deref(), &options.extras, &mut records)?;
    if columns.is_empty() {
        log::warn!("No alignments and no field names given; writing an empty table");
    } else {
        log::debug!("Output columns: {}", columns.join(","));
    }

    let mut writer = TableWriter::new(out, columns, options.delimiter);
    if options.header {
        writer.write_header()?;
    }

    for record in records {
        let mut record = record?;
        for (name, value) in &options.extras {
            record.insert(name.as_str(), value.as_str());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(writer.rows())
}
