use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::{TallyError, TallyResult};
use crate::results::ResultTable;

/// Serialization format for a [`ResultTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `<pattern>\t<count>` line per entry
    #[default]
    Tsv,
    /// A single JSON object mapping pattern to count
    Json,
}

/// Writes `table` to `writer` in the given format.
///
/// Entries are written sorted by raw pattern so repeated runs produce
/// byte-identical output.
pub fn write_table<W: Write>(
    writer: &mut W,
    table: &ResultTable,
    format: OutputFormat,
) -> TallyResult<()> {
    match format {
        OutputFormat::Tsv => {
            for (pattern, count) in table.sorted_entries() {
                writeln!(writer, "{}\t{}", pattern, count)?;
            }
        }
        OutputFormat::Json => {
            let sorted: BTreeMap<&str, usize> = table.iter().collect();
            serde_json::to_writer_pretty(&mut *writer, &sorted)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes `table` to `path`, replacing any existing file atomically.
pub fn write_table_to_file(
    path: &Path,
    table: &ResultTable,
    format: OutputFormat,
) -> TallyResult<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir).map_err(|e| TallyError::from_io(parent_dir, e))?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        write_table(&mut writer, table, format)?;
    }
    temp_file
        .persist(path)
        .map_err(|e| TallyError::from_io(path, e.error))?;

    debug!("Wrote {} entries to {}", table.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_table() -> ResultTable {
        let mut table = ResultTable::new();
        table.insert("c1a1t1", 3);
        table.insert("\"cat\"", 1);
        table
    }

    #[test]
    fn test_write_tsv() {
        let mut buffer = Vec::new();
        write_table(&mut buffer, &sample_table(), OutputFormat::Tsv).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "\"cat\"\t1\nc1a1t1\t3\n"
        );
    }

    #[test]
    fn test_write_empty_table() {
        let mut buffer = Vec::new();
        write_table(&mut buffer, &ResultTable::new(), OutputFormat::Tsv).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_write_json() {
        let mut buffer = Vec::new();
        write_table(&mut buffer, &sample_table(), OutputFormat::Json).unwrap();

        let parsed: std::collections::HashMap<String, usize> =
            serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["\"cat\""], 1);
        assert_eq!(parsed["c1a1t1"], 3);
    }

    #[test]
    fn test_write_to_file_creates_dirs_and_replaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("output.txt");

        write_table_to_file(&path, &sample_table(), OutputFormat::Tsv).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "\"cat\"\t1\nc1a1t1\t3\n"
        );

        let mut table = ResultTable::new();
        table.insert("x1", 0);
        write_table_to_file(&path, &table, OutputFormat::Tsv).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "x1\t0\n");
    }
}
