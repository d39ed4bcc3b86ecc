//! ssearch36 `-m 10` output parser
//!
//! The `-m 10` format is block structured. A query starts with a `>>>name`
//! line followed by `; key: value` program metadata. Each hit starts with a
//! `>>name` line and its score fields, then a `>query` section and a
//! `>target` section, each with coordinate fields and the aligned sequence
//! lines, optionally followed by an `; al_cons:` consensus section. `>>><<<`
//! closes the query.
//!
//! Every hit becomes one [`AlignmentRecord`]. Query and target section fields
//! are prefixed with `q_` and `t_`; the sequences become `q_seq` and `t_seq`.
//! The parser is tolerant: it records whatever fields a block supplies and
//! never checks that the fields a later stage needs are present.

use std::io::{self, BufRead};

use crate::error::{Result, SwtabError};
use crate::types::AlignmentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// Before the first query header
    Preamble,
    QueryHeader,
    HitHeader,
    Query,
    Target,
    Consensus,
    /// After `>>><<<`, until the next query header
    Closed,
}

/// Normalize an ssearch field name: lowercase, `-` dropped, blanks to `_`.
///
/// `sw_z-score` becomes `sw_zscore` and `sw_s-w opt` becomes `sw_sw_opt`.
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .replace('-', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

// First whitespace-delimited token, without the trailing comma ssearch
// appends to query names.
fn first_token(text: &str) -> &str {
    text.split_whitespace()
        .next()
        .unwrap_or("")
        .trim_end_matches(',')
}

/// Line-at-a-time block state machine.
#[derive(Debug)]
struct BlockParser {
    section: Section,
    query_name: Option<String>,
    query_fields: AlignmentRecord,
    current: Option<AlignmentRecord>,
}

impl BlockParser {
    fn new() -> Self {
        Self {
            section: Section::Preamble,
            query_name: None,
            query_fields: AlignmentRecord::new(),
            current: None,
        }
    }

    /// Feed one line; returns a record when the line completes one.
    fn push_line(&mut self, raw: &str) -> Option<AlignmentRecord> {
        let line = raw.trim();
        if line.is_empty() {
            // A consensus segment without identities is all blanks
            let blanks = raw.trim_end_matches(&['\r', '\n'][..]);
            if self.section == Section::Consensus && !blanks.is_empty() {
                self.push_sequence(line, raw);
            }
            return None;
        }

        if line.starts_with(">>><<<") {
            self.section = Section::Closed;
            return self.current.take();
        }

        // Some ssearch versions number the query header ("  1>>>name")
        let unnumbered = line.trim_start_matches(|c: char| c.is_ascii_digit());
        if let Some(rest) = unnumbered.strip_prefix(">>>") {
            let finished = self.current.take();
            self.query_name = Some(first_token(rest).to_string());
            self.query_fields = AlignmentRecord::new();
            self.section = Section::QueryHeader;
            return finished;
        }

        if let Some(rest) = line.strip_prefix(">>") {
            let finished = self.current.take();
            self.current = Some(self.start_hit(first_token(rest)));
            self.section = Section::HitHeader;
            return finished;
        }

        if line.starts_with('>') {
            self.section = match self.section {
                Section::HitHeader => Section::Query,
                Section::Query => Section::Target,
                other => other,
            };
            return None;
        }

        if let Some(body) = line.strip_prefix(';') {
            self.push_field(body);
            return None;
        }

        self.push_sequence(line, raw);
        None
    }

    /// End of input: hand out the last pending hit.
    fn finish(&mut self) -> Option<AlignmentRecord> {
        self.section = Section::Closed;
        self.current.take()
    }

    fn start_hit(&self, target_name: &str) -> AlignmentRecord {
        let mut record = AlignmentRecord::new();
        if let Some(query_name) = &self.query_name {
            record.insert("q_name", query_name.as_str());
        }
        record.insert("t_name", target_name);
        for (key, value) in self.query_fields.iter() {
            record.insert(key, value);
        }
        record
    }

    fn push_field(&mut self, body: &str) {
        let Some((key, value)) = body.split_once(':') else {
            return;
        };
        let key = normalize_key(key);
        let value = value.trim();

        if key == "al_cons" {
            if let Some(record) = self.current.as_mut() {
                record.insert("al_cons", "");
                self.section = Section::Consensus;
            }
            return;
        }

        match (self.section, self.current.as_mut()) {
            (Section::QueryHeader, _) => self.query_fields.insert(key, value),
            (Section::HitHeader, Some(record)) => record.insert(key, value),
            (Section::Query, Some(record)) => record.insert(format!("q_{}", key), value),
            (Section::Target, Some(record)) => record.insert(format!("t_{}", key), value),
            _ => {}
        }
    }

    fn push_sequence(&mut self, line: &str, raw: &str) {
        let Some(record) = self.current.as_mut() else {
            return;
        };
        match self.section {
            Section::Query => record.append("q_seq", line),
            Section::Target => record.append("t_seq", line),
            // Blanks in the consensus line are positional
            Section::Consensus => record.append("al_cons", raw.trim_end_matches(&['\r', '\n'][..])),
            _ => {}
        }
    }
}

/// Lazy iterator over the alignment records of ssearch36 `-m 10` output.
pub struct SsearchReader<R: BufRead> {
    reader: R,
    line_buffer: String,
    line_number: usize,
    parser: BlockParser,
    finished: bool,
}

impl<R: BufRead> SsearchReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_buffer: String::new(),
            line_number: 0,
            parser: BlockParser::new(),
            finished: false,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> Iterator for SsearchReader<R> {
    type Item = Result<AlignmentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            self.line_buffer.clear();

            match self.reader.read_line(&mut self.line_buffer) {
                Ok(0) => {
                    self.finished = true;
                    log::debug!("Reached end of alignment input after {} lines", self.line_number);
                    return self.parser.finish().map(Ok);
                }
                Ok(_) => {
                    self.line_number += 1;
                    if let Some(record) = self.parser.push_line(&self.line_buffer) {
                        return Some(Ok(record));
                    }
                }
                Err(e) => {
                    self.finished = true;
                    let line = self.line_number + 1;
                    return Some(Err(match e.kind() {
                        io::ErrorKind::InvalidData => SwtabError::Parse {
                            line,
                            message: e.to_string(),
                        },
                        _ => SwtabError::Io(e),
                    }));
                }
            }
        }
    }
}
