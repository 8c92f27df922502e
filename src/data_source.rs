use crate::config::AppConfig;
use crate::notice::Notices;
use calamine::{Data, Reader, open_workbook_auto};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("data file not found: {}", .0.display())]
    FileMissing(PathBuf),
    #[error(transparent)]
    Workbook(#[from] calamine::Error),
    #[error("workbook contains no worksheets")]
    NoWorksheet,
    #[error("missing column '{0}'")]
    MissingColumn(String),
    #[error("row {row}: invalid count '{value}'")]
    InvalidCount { row: usize, value: String },
}

/// Vehicle counts keyed by label, kept in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleCounts {
    entries: Vec<(String, u64)>,
}

impl VehicleCounts {
    /// Inserts or overwrites a count. An existing label keeps its position.
    pub fn insert(&mut self, label: impl Into<String>, count: u64) {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = count,
            None => self.entries.push((label, count)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(l, c)| (l.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_count(&self) -> u64 {
        self.entries.iter().map(|(_, c)| *c).max().unwrap_or(0)
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for VehicleCounts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = Self::default();
        for (label, count) in iter {
            counts.insert(label, count);
        }
        counts
    }
}

/// Anything that can hand out the current vehicle counts.
///
/// Failures are reported through `notices` and degrade to an empty set.
pub trait CountSource {
    fn read(&self, notices: &mut Notices) -> VehicleCounts;
}

/// Reads vehicle counts from the first worksheet of a spreadsheet.
#[derive(Debug, Clone)]
pub struct DataSource {
    path: PathBuf,
    label_column: String,
    count_column: String,
}

impl DataSource {
    pub fn new(
        path: impl Into<PathBuf>,
        label_column: impl Into<String>,
        count_column: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            label_column: label_column.into(),
            count_column: count_column.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.data_file.clone(),
            config.label_column,
            config.count_column,
        )
    }

    /// Loads the counts, returning the first failure encountered.
    pub fn load(&self) -> Result<VehicleCounts, DataError> {
        if !self.path.is_file() {
            return Err(DataError::FileMissing(self.path.clone()));
        }

        let mut workbook = open_workbook_auto(&self.path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(DataError::NoWorksheet)??;

        let mut rows = range.rows();
        let header = rows.next().unwrap_or(&[]);
        let label_idx = column_index(header, &self.label_column)?;
        let count_idx = column_index(header, &self.count_column)?;

        // 1-based sheet row of the first data row.
        let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0) + 2;

        let mut counts = VehicleCounts::default();
        for (i, row) in rows.enumerate() {
            let label = row.get(label_idx).map(Data::to_string).unwrap_or_default();
            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            let cell = row.get(count_idx).unwrap_or(&Data::Empty);
            let count = parse_count(cell).ok_or_else(|| DataError::InvalidCount {
                row: first_row + i,
                value: cell.to_string(),
            })?;
            counts.insert(label, count);
        }
        Ok(counts)
    }
}

impl CountSource for DataSource {
    fn read(&self, notices: &mut Notices) -> VehicleCounts {
        match self.load() {
            Ok(counts) => {
                tracing::debug!(path = %self.path.display(), rows = counts.len(), "loaded vehicle counts");
                counts
            }
            Err(err @ DataError::FileMissing(_)) => {
                tracing::warn!(%err, "vehicle data unavailable");
                notices.error("Data file not found.");
                VehicleCounts::default()
            }
            Err(err) => {
                tracing::warn!(%err, path = %self.path.display(), "failed to read vehicle data");
                notices.error(format!("An error occurred: {err}"));
                VehicleCounts::default()
            }
        }
    }
}

fn column_index(header: &[Data], name: &str) -> Result<usize, DataError> {
    header
        .iter()
        .position(|cell| matches!(cell, Data::String(s) if s.trim() == name))
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))
}

fn parse_count(cell: &Data) -> Option<u64> {
    match cell {
        Data::Int(v) => u64::try_from(*v).ok(),
        Data::Float(v) if *v >= 0.0 && v.fract() == 0.0 && *v < u64::MAX as f64 => {
            Some(*v as u64)
        }
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
