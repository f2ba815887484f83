// src/clean.rs
use std::{
    fs,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::error::{PipelineError, Result};
use crate::table::Table;

/// Personal-rating column that is empty for anonymous sessions.
pub const RATING_COLUMN: &str = "Your Rating";
/// Label fragment of columns that had no header text on the page.
pub const UNNAMED_MARKER: &str = "unnamed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    ContainsIgnoreCase,
}

/// What to do when a rule matches no column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMissing {
    Fail,
    Skip,
}

/// Selects columns to drop from the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRule {
    pub label: String,
    pub mode: MatchMode,
    pub on_missing: OnMissing,
}

impl ColumnRule {
    /// Drop the column named exactly `label`; fail if there is none.
    pub fn exact(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            mode: MatchMode::Exact,
            on_missing: OnMissing::Fail,
        }
    }

    /// Drop every column whose label contains `fragment`, any case.
    pub fn containing(fragment: impl Into<String>) -> Self {
        Self {
            label: fragment.into(),
            mode: MatchMode::ContainsIgnoreCase,
            on_missing: OnMissing::Skip,
        }
    }

    pub fn skip_if_missing(mut self) -> Self {
        self.on_missing = OnMissing::Skip;
        self
    }

    pub fn matches(&self, header: &str) -> bool {
        match self.mode {
            MatchMode::Exact => header == self.label,
            MatchMode::ContainsIgnoreCase => header
                .to_lowercase()
                .contains(&self.label.to_lowercase()),
        }
    }

    /// `Your Rating` (required) and every `unnamed` column.
    pub fn defaults() -> Vec<Self> {
        vec![Self::exact(RATING_COLUMN), Self::containing(UNNAMED_MARKER)]
    }
}

/// Serialize `table` and strip the columns `rules` select, replacing `path`
/// only once both steps succeed.
#[instrument(level = "info", skip(table, path, rules), fields(path = %path.display()))]
pub fn write_clean(table: &Table, path: &Path, rules: &[ColumnRule]) -> Result<PathBuf> {
    let dir = output_dir(path)?;
    let staged = stage_table(table, dir)?;
    let kept = rewrite_columns(staged.path(), path, rules)?;
    info!(columns = ?kept, rows = table.len(), "output written");
    Ok(path.to_path_buf())
}

/// Write `table` as CSV to `path`, creating the parent directory if needed.
///
/// Short rows are padded with empty cells. A row wider than the header has no
/// column to go to and is rejected before anything is written.
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    let dir = output_dir(path)?;
    let staged = stage_table(table, dir)?;
    staged
        .persist(path)
        .map_err(|e| PipelineError::io(path, e.error))?;
    Ok(())
}

/// Re-read the CSV at `path`, drop the columns `rules` select, and replace
/// the file. Returns the surviving header.
///
/// Blank header labels are read back as `Unnamed: <index>`.
pub fn drop_columns(path: &Path, rules: &[ColumnRule]) -> Result<Vec<String>> {
    rewrite_columns(path, path, rules)
}

/// Parent of `path`, created if missing. `.` for a bare file name.
fn output_dir(path: &Path) -> Result<&Path> {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => {
            fs::create_dir_all(p).map_err(|e| PipelineError::io(p, e))?;
            Ok(p)
        }
        _ => Ok(Path::new(".")),
    }
}

fn check_width(table: &Table) -> Result<()> {
    let width = table.width();
    match table.rows.iter().position(|r| r.len() > width) {
        Some(idx) => Err(PipelineError::Schema(format!(
            "row {} has {} cells but the header has {} columns",
            idx,
            table.rows[idx].len(),
            width
        ))),
        None => Ok(()),
    }
}

/// Serialize `table` into a temp file in `dir`. Dropping the handle removes it.
fn stage_table(table: &Table, dir: &Path) -> Result<NamedTempFile> {
    check_width(table)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PipelineError::io(dir, e))?;
    let staged = tmp.path().to_path_buf();

    let width = table.width();
    let mut padded = 0usize;
    {
        let mut wtr = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(tmp.as_file_mut());
        wtr.write_record(&table.headers)
            .map_err(|e| PipelineError::csv(&staged, e))?;
        for row in &table.rows {
            let written = if row.len() < width {
                padded += 1;
                let mut full = row.clone();
                full.resize(width, String::new());
                wtr.write_record(&full)
            } else {
                wtr.write_record(row)
            };
            written.map_err(|e| PipelineError::csv(&staged, e))?;
        }
        wtr.flush().map_err(|e| PipelineError::io(&staged, e))?;
    }

    if padded > 0 {
        warn!(padded, width, "short rows padded with empty cells");
    }
    debug!(rows = table.len(), "table serialized");
    Ok(tmp)
}

/// Copy the CSV at `src` to `dest` without the columns `rules` select.
/// `dest` is replaced atomically and left alone on any error.
fn rewrite_columns(src: &Path, dest: &Path, rules: &[ColumnRule]) -> Result<Vec<String>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(src)
        .map_err(|e| PipelineError::csv(src, e))?;
    let headers = read_headers(rdr.headers().map_err(|e| PipelineError::csv(src, e))?);

    let mut dropped = vec![false; headers.len()];
    for rule in rules {
        let mut hit = false;
        for (i, h) in headers.iter().enumerate() {
            if rule.matches(h) {
                dropped[i] = true;
                hit = true;
            }
        }
        if !hit {
            match rule.on_missing {
                OnMissing::Fail => {
                    return Err(PipelineError::Schema(format!(
                        "column {:?} not found in {:?}",
                        rule.label, headers
                    )))
                }
                OnMissing::Skip => debug!(label = %rule.label, "no column matched; skipping"),
            }
        }
    }
    let keep: Vec<usize> = (0..headers.len()).filter(|&i| !dropped[i]).collect();

    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PipelineError::io(dir, e))?;
    {
        let mut wtr = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(tmp.as_file_mut());
        wtr.write_record(keep.iter().map(|&i| headers[i].as_str()))
            .map_err(|e| PipelineError::csv(dest, e))?;
        for record in rdr.records() {
            let record = record.map_err(|e| PipelineError::csv(src, e))?;
            wtr.write_record(keep.iter().map(|&i| record.get(i).unwrap_or("")))
                .map_err(|e| PipelineError::csv(dest, e))?;
        }
        wtr.flush().map_err(|e| PipelineError::io(dest, e))?;
    }
    drop(rdr);
    tmp.persist(dest)
        .map_err(|e| PipelineError::io(dest, e.error))?;

    let kept: Vec<String> = keep.into_iter().map(|i| headers[i].clone()).collect();
    debug!(dropped = headers.len() - kept.len(), "columns dropped");
    Ok(kept)
}

fn read_headers(record: &StringRecord) -> Vec<String> {
    record
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {}", i)
            } else {
                h.to_string()
            }
        })
        .collect()
}
