use crate::error::GraphError;
use crate::prelude::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ParseOptions {
    /// Upper-case the header tokens so that `pid` and `PID` name the same column
    pub normalize_headers: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            normalize_headers: true,
        }
    }
}

/// One data line of a columnar log, keyed by header column name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecord {
    fields: HashMap<String, String>,
}

impl ParsedRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParsedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// The parsed content of a whole log file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogTable {
    /// Header columns, in file order
    pub columns: Vec<String>,
    pub records: Vec<ParsedRecord>,
    /// Number of data lines discarded for having too few tokens
    pub skipped_lines: usize,
}

impl LogTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read and parse a log file. Failing to read the file is fatal, malformed lines are not.
pub fn parse_file<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<LogTable, GraphError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // Traced arguments are raw bytes, invalid sequences become U+FFFD
    let content = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = content {
        warn!("{} is not valid UTF-8, invalid bytes were replaced", path.display());
    }

    let table = parse_str(&content, options);
    if table.skipped_lines > 0 {
        warn!(
            "Skipped {} malformed line(s) in {}",
            table.skipped_lines,
            path.display()
        );
    }
    debug!(
        "Parsed {} record(s) with columns {:?} from {}",
        table.len(),
        table.columns,
        path.display()
    );

    Ok(table)
}

pub fn parse_str(content: &str, options: ParseOptions) -> LogTable {
    let mut lines = content.lines().enumerate();

    let Some(columns) = lines.by_ref().find_map(|(_, line)| {
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        (!tokens.is_empty()).then(|| parse_header(&tokens, options))
    }) else {
        return LogTable::default();
    };

    let mut table = LogTable {
        columns,
        ..Default::default()
    };

    for (line_index, line) in lines {
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        match parse_data_line(&table.columns, &tokens) {
            Some(record) => table.records.push(record),
            None => {
                debug!(
                    "Skipping line {}: expected {} columns, got {} token(s)",
                    line_index + 1,
                    table.columns.len(),
                    tokens.len()
                );
                table.skipped_lines += 1;
            }
        }
    }

    table
}

fn parse_header(tokens: &[&str], options: ParseOptions) -> Vec<String> {
    tokens
        .iter()
        .map(|token| {
            if options.normalize_headers {
                token.to_ascii_uppercase()
            } else {
                token.to_string()
            }
        })
        .collect()
}

fn parse_data_line(columns: &[String], tokens: &[&str]) -> Option<ParsedRecord> {
    if tokens.len() < columns.len() {
        return None;
    }

    let last = columns.len() - 1;
    let record = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let value = if index == last && tokens.len() > columns.len() {
                // The catch-all column keeps a leading space ahead of the joined tokens
                format!(" {}", tokens[index..].iter().join(" "))
            } else {
                tokens[index].to_string()
            };
            (column.clone(), value)
        })
        .collect();

    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE_LOG: &str = "\
PCOMM            PID     PPID    RET ARGS
bash             42      1         0 [[ -x ]]
ls               43      42        0 /usr/bin/ls
truncated        44
";

    #[test]
    fn test_parse_header_and_columns() {
        let table = parse_str(TRACE_LOG, ParseOptions::default());

        assert_eq!(table.columns, vec!["PCOMM", "PID", "PPID", "RET", "ARGS"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.skipped_lines, 1);
    }

    #[test]
    fn test_parse_exact_column_count() {
        let table = parse_str(TRACE_LOG, ParseOptions::default());
        let ls = &table.records[1];

        assert_eq!(ls.get("PCOMM"), Some("ls"));
        assert_eq!(ls.get("PID"), Some("43"));
        assert_eq!(ls.get("PPID"), Some("42"));
        assert_eq!(ls.get("RET"), Some("0"));
        assert_eq!(ls.get("ARGS"), Some("/usr/bin/ls"));
    }

    #[test]
    fn test_parse_overflow_keeps_leading_space() {
        let table = parse_str(TRACE_LOG, ParseOptions::default());
        let bash = &table.records[0];

        assert_eq!(bash.get("PID"), Some("42"));
        assert_eq!(bash.get("ARGS"), Some(" [[ -x ]]"));
    }

    #[test]
    fn test_parse_overflow_three_columns() {
        let table = parse_str("A B C\nt0 t1 t2 t3 t4\n", ParseOptions::default());
        assert_eq!(table.len(), 1);

        let record = &table.records[0];
        assert_eq!(record.get("A"), Some("t0"));
        assert_eq!(record.get("B"), Some("t1"));
        assert_eq!(record.get("C"), Some(" t2 t3 t4"));
    }

    #[test]
    fn test_parse_short_lines_are_skipped() {
        let table = parse_str("A B C\nx y\n\nx y z\n", ParseOptions::default());

        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped_lines, 2);
        assert_eq!(table.records[0].get("C"), Some("z"));
    }

    #[test]
    fn test_parse_leading_blank_lines_before_header() {
        let table = parse_str("\n   \nPID PPID\n1 0\n", ParseOptions::default());

        assert_eq!(table.columns, vec!["PID", "PPID"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_parse_header_only_and_empty() {
        let table = parse_str("PID PPID COMMAND\n", ParseOptions::default());
        assert_eq!(table.columns.len(), 3);
        assert!(table.is_empty());

        let table = parse_str("", ParseOptions::default());
        assert!(table.columns.is_empty());
        assert!(table.is_empty());
        assert_eq!(table.skipped_lines, 0);
    }

    #[test]
    fn test_parse_header_normalization() {
        let table = parse_str("pid Ppid\n1 0\n", ParseOptions::default());
        assert_eq!(table.records[0].get("PID"), Some("1"));
        assert_eq!(table.records[0].get("PPID"), Some("0"));

        let options = ParseOptions {
            normalize_headers: false,
        };
        let table = parse_str("pid Ppid\n1 0\n", options);
        assert_eq!(table.columns, vec!["pid", "Ppid"]);
        assert_eq!(table.records[0].get("PID"), None);
        assert_eq!(table.records[0].get("pid"), Some("1"));
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_file("/nonexistent/process_trace.log", ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, GraphError::Io { .. }));
        assert_eq!(
            err.to_string(),
            "Failed to read log file /nonexistent/process_trace.log"
        );
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("process_trace.log");
        std::fs::write(&path, TRACE_LOG).unwrap();

        let table = parse_file(&path, ParseOptions::default()).unwrap();
        assert_eq!(table, parse_str(TRACE_LOG, ParseOptions::default()));
    }

    #[test]
    fn test_parse_file_with_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("process_trace.log");
        let mut content = b"PCOMM PID PPID RET ARGS\nbash 42 1 0 [[ -x ]]\n".to_vec();
        content.extend_from_slice(b"touch 43 42 0 ['/tmp/\xff\xfe']\n");
        content.extend_from_slice(b"ls 44 42 0 /usr/bin/ls\n");
        std::fs::write(&path, content).unwrap();

        let table = parse_file(&path, ParseOptions::default()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.skipped_lines, 0);
        assert_eq!(table.records[0].get("ARGS"), Some(" [[ -x ]]"));
        assert_eq!(table.records[1].get("PID"), Some("43"));
        assert_eq!(table.records[1].get("ARGS"), Some("['/tmp/\u{FFFD}\u{FFFD}']"));
        assert_eq!(table.records[2].get("ARGS"), Some("/usr/bin/ls"));
    }
}
