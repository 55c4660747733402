use crate::error::{GraphError, LogSource};
use crate::parser::ParsedRecord;
use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// Header names of the columns the reconciler reads from each log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ColumnNames {
    pub pid: String,
    pub ppid: String,
    pub init_command: String,
    pub trace_command: String,
    pub trace_args: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            pid: "PID".to_string(),
            ppid: "PPID".to_string(),
            init_command: "COMMAND".to_string(),
            trace_command: "PCOMM".to_string(),
            trace_args: "ARGS".to_string(),
        }
    }
}

/// A process record in the schema shared by both logs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnifiedRecord {
    pub pid: String,
    pub ppid: String,
    pub command: String,
}

/// Merge the init snapshot and the trace log into one record sequence, init records first.
pub fn reconcile(
    init_records: &[ParsedRecord],
    trace_records: &[ParsedRecord],
    columns: &ColumnNames,
) -> Result<Vec<UnifiedRecord>, GraphError> {
    let mut unified = Vec::with_capacity(init_records.len() + trace_records.len());

    for (index, record) in init_records.iter().enumerate() {
        let fields = RecordFields {
            record,
            source: LogSource::Init,
            index,
        };
        let command = strip_overflow_artifact(fields.get(&columns.init_command)?);
        unified.push(fields.unified(columns, command.to_string())?);
    }

    for (index, record) in trace_records.iter().enumerate() {
        let fields = RecordFields {
            record,
            source: LogSource::Trace,
            index,
        };
        let command = strip_overflow_artifact(fields.get(&columns.trace_command)?);
        let args = fields.get(&columns.trace_args)?;
        let command = trace_command(command, args);
        unified.push(fields.unified(columns, command)?);
    }

    debug!(
        "Reconciled {} init and {} trace record(s)",
        init_records.len(),
        trace_records.len()
    );

    Ok(unified)
}

/// `"<command> <args>"` with the two enclosing characters on each side of `args` dropped
pub fn trace_command(command: &str, args: &str) -> String {
    let args = strip_overflow_artifact(args);
    let char_count = args.chars().count();
    let inner = if char_count < 4 {
        String::new()
    } else {
        args.chars().skip(2).take(char_count - 4).collect()
    };

    format!("{command} {inner}")
}

/// Drop the single leading space the parser puts in front of a multi-token catch-all value
fn strip_overflow_artifact(value: &str) -> &str {
    value.strip_prefix(' ').unwrap_or(value)
}

struct RecordFields<'a> {
    record: &'a ParsedRecord,
    source: LogSource,
    index: usize,
}

impl<'a> RecordFields<'a> {
    fn get(&self, column: &str) -> Result<&'a str, GraphError> {
        self.record
            .get(column)
            .ok_or_else(|| GraphError::MissingColumn {
                column: column.to_string(),
                source_log: self.source,
                index: self.index,
            })
    }

    fn identifier(&self, column: &str) -> Result<String, GraphError> {
        let value = self.get(column)?.trim();
        if value.is_empty() {
            return Err(GraphError::EmptyIdentifier {
                column: column.to_string(),
                source_log: self.source,
                index: self.index,
            });
        }
        Ok(value.to_string())
    }

    fn unified(&self, columns: &ColumnNames, command: String) -> Result<UnifiedRecord, GraphError> {
        Ok(UnifiedRecord {
            pid: self.identifier(&columns.pid)?,
            ppid: self.identifier(&columns.ppid)?,
            command,
        })
    }
}
