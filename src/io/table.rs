//! Semicolon-separated pattern tables
//!
//! Two input layouts are understood. Measured tables carry a `p` column and an
//! optional `Pattern` column; without it the row index is the pattern code.
//! Estimated tables come from a top-k sketch: their second line is a comment
//! header `#TotalIterations;SpaceFilter;TimeFilter;PoolSize;DimMultiLevel;`
//! and their rows carry `Pattern`, `Sum_level` and `Count_level`.
//!
//! Lines starting with `#` are comments everywhere.

use crate::analysis::catalog::PatternCatalog;
use crate::io::configuration::{TABLE_COMMENT, TABLE_SEPARATOR};
use crate::io::error::{
    PatternError, Result, configuration_error, file_system_error, invalid_source,
};
use crate::math::codec::{PatternCode, WindowShape, encode};
use crate::math::probability::estimate_probability;
use ndarray::Array3;
use std::path::{Path, PathBuf};

/// Column holding the pattern code
pub const PATTERN_COLUMN: &str = "Pattern";
/// Column holding pattern codes in exported value lists
pub const PATTERN_VALUE_COLUMN: &str = "PatternValue";
/// Column holding measured probabilities
pub const PROBABILITY_COLUMN: &str = "p";
/// Column holding the summed level of an estimated pattern
pub const SUM_LEVEL_COLUMN: &str = "Sum_level";
/// Column holding the level count of an estimated pattern
pub const COUNT_LEVEL_COLUMN: &str = "Count_level";

/// Global parameters of an estimated table
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimatorHeader {
    /// Iterations run by the sketch
    pub total_iterations: f64,
    /// Spatial side of the windows
    pub space_filter: usize,
    /// Temporal depth of the windows
    pub time_filter: usize,
    /// Pool size of the sketch
    pub pool_size: f64,
    /// Number of levels in the sketch
    pub dim_multi_level: f64,
}

impl EstimatorHeader {
    /// Parse a `#a;b;c;d;e;` header line
    ///
    /// Returns `None` unless the line is a comment with five numeric fields.
    pub fn parse(line: &str) -> Option<Self> {
        let body = line.trim().strip_prefix(TABLE_COMMENT)?;
        let values: Vec<f64> = body
            .split(TABLE_SEPARATOR)
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .ok()?;

        let [total_iterations, space, time, pool_size, dim_multi_level] = values.as_slice() else {
            return None;
        };
        if *space < 1.0 || *time < 1.0 || space.fract() != 0.0 || time.fract() != 0.0 {
            return None;
        }

        Some(Self {
            total_iterations: *total_iterations,
            space_filter: *space as usize,
            time_filter: *time as usize,
            pool_size: *pool_size,
            dim_multi_level: *dim_multi_level,
        })
    }
}

struct Row {
    line: usize,
    cells: Vec<String>,
}

struct DelimitedTable {
    path: PathBuf,
    header_line: usize,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl DelimitedTable {
    fn parse(path: &Path, content: &str) -> Result<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(index, text)| (index + 1, text.trim()))
            .filter(|(_, text)| !text.is_empty() && !text.starts_with(TABLE_COMMENT));

        let Some((header_line, header)) = lines.next() else {
            return Err(PatternError::TableParse {
                path: path.to_path_buf(),
                line: 0,
                reason: "missing column header".to_string(),
            });
        };

        let columns = split_cells(header);
        let rows = lines
            .map(|(line, text)| Row {
                line,
                cells: split_cells(text),
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            header_line,
            columns,
            rows,
        })
    }

    fn error(&self, line: usize, reason: impl Into<String>) -> PatternError {
        PatternError::TableParse {
            path: self.path.clone(),
            line,
            reason: reason.into(),
        }
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.column(name)
            .ok_or_else(|| self.error(self.header_line, format!("missing column '{name}'")))
    }

    fn cell<'a>(&self, row: &'a Row, column: usize) -> Result<&'a str> {
        row.cells
            .get(column)
            .map(String::as_str)
            .ok_or_else(|| self.error(row.line, format!("missing cell in column {}", column + 1)))
    }

    fn float(&self, row: &Row, column: usize) -> Result<f64> {
        let cell = self.cell(row, column)?;
        cell.parse().map_err(|error: std::num::ParseFloatError| {
            self.error(row.line, format!("'{cell}' is not a number: {error}"))
        })
    }

    fn code(&self, row: &Row, column: usize, shape: Option<WindowShape>) -> Result<PatternCode> {
        let cell = self.cell(row, column)?;
        parse_code(cell, shape)
            .ok_or_else(|| self.error(row.line, format!("'{cell}' is not a pattern code")))
    }
}

fn split_cells(line: &str) -> Vec<String> {
    let mut cells: Vec<String> = line
        .split(TABLE_SEPARATOR)
        .map(|cell| cell.trim().to_string())
        .collect();
    // A trailing separator leaves one empty cell behind
    if cells.len() > 1 && cells.last().is_some_and(String::is_empty) {
        cells.pop();
    }
    cells
}

// Integer codes, integral floats, or explicit bit lists such as "[0,1,...]"
fn parse_code(cell: &str, shape: Option<WindowShape>) -> Option<PatternCode> {
    if let Ok(code) = cell.parse::<PatternCode>() {
        return Some(code);
    }

    if let Some(list) = cell.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        let shape = shape?;
        let bits: Vec<u8> = list
            .split(',')
            .map(|bit| bit.trim().parse::<u8>().ok().filter(|&value| value <= 1))
            .collect::<Option<_>>()?;
        let window = Array3::from_shape_vec(shape.dim(), bits).ok()?;
        return encode(&window.view()).ok();
    }

    let value: f64 = cell.parse().ok()?;
    (value >= 0.0 && value.fract() == 0.0 && value < u64::MAX as f64).then_some(value as PatternCode)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(file_system_error(path, "read file"))
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(file_system_error(parent, "create directory"))?;
    }
    std::fs::write(path, content).map_err(file_system_error(path, "write file"))
}

/// Load a table of measured probabilities
///
/// # Errors
///
/// Returns `TableParse` for a missing `p` column, an unreadable cell or a
/// negative probability, and `InvalidSourceData` when the probabilities sum to
/// zero or a code appears twice.
pub fn import_measured(path: &Path, shape: WindowShape) -> Result<PatternCatalog> {
    let content = read_text(path)?;
    let table = DelimitedTable::parse(path, &content)?;

    let probability_column = table.require(PROBABILITY_COLUMN)?;
    let pattern_column = table.column(PATTERN_COLUMN);

    let mut entries = Vec::with_capacity(table.rows.len());
    for (index, row) in table.rows.iter().enumerate() {
        let code = match pattern_column {
            Some(column) => table.code(row, column, Some(shape))?,
            None => index as PatternCode,
        };
        let probability = table.float(row, probability_column)?;
        if probability < 0.0 {
            return Err(table.error(row.line, format!("negative probability {probability}")));
        }
        entries.push((code, probability));
    }

    let total: f64 = entries.iter().map(|&(_, probability)| probability).sum();
    if total <= 0.0 {
        return Err(invalid_source(&format!(
            "{}: probabilities sum to {total}",
            path.display()
        )));
    }

    let catalog = PatternCatalog::from_probabilities(shape, entries)?;
    tracing::info!(
        path = %path.display(),
        patterns = catalog.len(),
        "measured catalog imported"
    );
    Ok(catalog)
}

/// Load a top-k sketch table, estimating each probability from its levels
///
/// The window geometry is read from the header; when `expected` is given it
/// must agree.
///
/// # Errors
///
/// Returns `Configuration` for an estimator parameter outside `[0, 1]` or a
/// geometry mismatch, `TableParse` for a malformed header or cell, and
/// `InvalidSourceData` for estimates outside `[0, 1]`.
pub fn import_estimated(
    path: &Path,
    p: f64,
    expected: Option<WindowShape>,
) -> Result<PatternCatalog> {
    if !(0.0..=1.0).contains(&p) {
        return Err(configuration_error("p", &p, &"must lie in [0, 1]"));
    }

    let content = read_text(path)?;
    let header = content
        .lines()
        .nth(1)
        .and_then(EstimatorHeader::parse)
        .ok_or_else(|| PatternError::TableParse {
            path: path.to_path_buf(),
            line: 2,
            reason: "expected '#TotalIterations;SpaceFilter;TimeFilter;PoolSize;DimMultiLevel;'"
                .to_string(),
        })?;

    let shape = WindowShape::new(header.time_filter, header.space_filter)?;
    if let Some(expected) = expected.filter(|&expected| expected != shape) {
        return Err(configuration_error(
            "window_shape",
            &format!("{}x{}", expected.time(), expected.space()),
            &format!(
                "table header declares TimeFilter={} SpaceFilter={}",
                shape.time(),
                shape.space()
            ),
        ));
    }

    let table = DelimitedTable::parse(path, &content)?;
    let pattern_column = table.require(PATTERN_COLUMN)?;
    let sum_column = table.require(SUM_LEVEL_COLUMN)?;
    let count_column = table.require(COUNT_LEVEL_COLUMN)?;

    let mut entries = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let code = table.code(row, pattern_column, Some(shape))?;
        let sum_level = table.float(row, sum_column)?;
        let count_level = table.float(row, count_column)?;
        let probability = estimate_probability(
            sum_level,
            count_level,
            p,
            header.pool_size,
            header.total_iterations,
        );
        entries.push((code, probability));
    }

    let catalog = PatternCatalog::from_probabilities(shape, entries)?
        .with_total_iterations(header.total_iterations);
    tracing::info!(
        path = %path.display(),
        patterns = catalog.len(),
        total_iterations = header.total_iterations,
        "estimated catalog imported"
    );
    Ok(catalog)
}

/// Read a list of pattern codes written by [`export_pattern_values`]
///
/// # Errors
///
/// Returns `TableParse` if neither a `PatternValue` nor a `Pattern` column is
/// present or a cell is not a code.
pub fn import_pattern_values(path: &Path) -> Result<Vec<PatternCode>> {
    let content = read_text(path)?;
    let table = DelimitedTable::parse(path, &content)?;

    let column = match table.column(PATTERN_VALUE_COLUMN) {
        Some(column) => column,
        None => table.require(PATTERN_COLUMN)?,
    };

    table
        .rows
        .iter()
        .map(|row| table.code(row, column, None))
        .collect()
}

/// Write the pattern codes in scope, one per line
///
/// # Errors
///
/// Returns `FileSystem` if the file cannot be written.
pub fn export_pattern_values(catalog: &PatternCatalog, masked: bool, path: &Path) -> Result<()> {
    let mut content = format!("{PATTERN_VALUE_COLUMN}\n");
    for code in catalog.pattern_values(masked) {
        content.push_str(&format!("{code}\n"));
    }
    write_text(path, &content)
}

/// Write every row of a catalog, selection included
///
/// The output can be read back with [`import_measured`].
///
/// # Errors
///
/// Returns `FileSystem` if the file cannot be written.
pub fn export_catalog(catalog: &PatternCatalog, path: &Path) -> Result<()> {
    let sep = TABLE_SEPARATOR;
    let mut content = format!(
        "{PATTERN_COLUMN}{sep}{PROBABILITY_COLUMN}{sep}Entropy{sep}EntropyRatio{sep}TimeFilter{sep}SpaceFilter{sep}Mask{sep}Velocity\n"
    );

    for row in catalog.rows() {
        let velocity = row.velocity.map(|v| v.to_string()).unwrap_or_default();
        content.push_str(&format!(
            "{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{velocity}\n",
            row.pattern_value,
            row.probability,
            row.entropy,
            row.entropy_ratio,
            row.time_filter,
            row.space_filter,
            row.mask,
        ));
    }

    write_text(path, &content)
}
