//! Scored results as a table, and saving that table as CSV.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::QuizError;
use crate::question::QuestionKind;

/// Column order of the exported table.
pub const COLUMNS: [&str; 6] = [
    "question_number",
    "question",
    "question_type",
    "user_answer",
    "correct_answer",
    "is_correct",
];

/// Outcome of one answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    /// 1-based
    pub question_number: usize,
    pub question: String,
    pub question_type: QuestionKind,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    rows: Vec<QuizResult>,
}

impl ResultTable {
    pub fn new(rows: Vec<QuizResult>) -> Self {
        Self { rows }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn rows(&self) -> &[QuizResult] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header row first, then one row per result. An empty table still gets its header.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        writer.write_record(COLUMNS)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Where and under what name results are saved:
/// `<dir>/<prefix><YYYYMMDD_HHMMSS>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub dir: PathBuf,
    pub prefix: String,
    pub extension: String,
}

impl Default for ExportTarget {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
            prefix: "quiz_results_".to_string(),
            extension: "csv".to_string(),
        }
    }
}

impl ExportTarget {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn file_name_at(&self, timestamp: DateTime<Local>) -> String {
        format!(
            "{}{}.{}",
            self.prefix,
            timestamp.format("%Y%m%d_%H%M%S"),
            self.extension
        )
    }

    pub fn path_at(&self, timestamp: DateTime<Local>) -> PathBuf {
        self.dir.join(self.file_name_at(timestamp))
    }
}

/// Write `table` under `target`, creating the directory if needed. Returns the file path.
#[instrument(target = "quiz_forge::export", skip(table), fields(rows = table.len()))]
pub async fn persist_table(table: &ResultTable, target: &ExportTarget) -> Result<PathBuf, QuizError> {
    let contents = {
        let mut buf = Vec::new();
        table.write_csv(&mut buf)?;
        buf
    };

    let path = target.path_at(Local::now());
    fs::create_dir_all(&target.dir)
        .await
        .map_err(|source| persistence_error(&target.dir, source))?;
    fs::write(&path, contents)
        .await
        .map_err(|source| persistence_error(&path, source))?;

    info!(path = %path.display(), "Results saved");
    Ok(path)
}

fn persistence_error(path: &Path, source: io::Error) -> QuizError {
    QuizError::Persistence {
        path: path.to_path_buf(),
        source,
    }
}
