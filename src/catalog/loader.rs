//! Catalog CSV reading and writing

use crate::catalog::record::{Catalog, FeatureRecord};
use crate::io::error::{MosaicError, Result, invalid_parameter};
use std::fmt::Write as _;
use std::path::Path;

/// Load a catalog CSV whose vectors have length `dimension`
///
/// # Errors
///
/// Returns an error if the file cannot be read, a row is malformed, a row has
/// the wrong number of values, or the file holds no records
pub fn load_catalog(path: &Path, dimension: usize) -> Result<Catalog> {
    let text = std::fs::read_to_string(path).map_err(|e| MosaicError::FileSystem {
        path: path.to_path_buf(),
        operation: "read catalog",
        source: e,
    })?;
    let catalog = parse_catalog(&text, path, dimension)?;
    tracing::info!(
        records = catalog.len(),
        dimension,
        path = %path.display(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Parse catalog CSV text; `path` is used for error messages only
///
/// Blank lines are skipped and whitespace around fields is ignored.
///
/// # Errors
///
/// Returns `CatalogParse` for malformed rows, `DimensionMismatch` for rows with
/// the wrong number of values and `EmptyCatalog` when no rows remain
pub fn parse_catalog(text: &str, path: &Path, dimension: usize) -> Result<Catalog> {
    let records = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_row(line, index + 1, path, dimension))
        .collect::<Result<Vec<_>>>()?;
    Catalog::new(records, dimension)
}

fn parse_row(line: &str, line_number: usize, path: &Path, dimension: usize) -> Result<FeatureRecord> {
    let malformed = |reason: String| MosaicError::CatalogParse {
        path: path.to_path_buf(),
        line: line_number,
        reason,
    };

    let mut fields = line.split(',').map(str::trim);

    let id_field = fields.next().unwrap_or_default();
    let id = id_field
        .parse::<usize>()
        .map_err(|e| malformed(format!("invalid id '{id_field}': {e}")))?;

    let source_path = fields
        .next()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| malformed("missing tile path".to_string()))?;

    let vector = fields
        .enumerate()
        .map(|(i, field)| {
            field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| malformed(format!("value {} is not a finite number: '{field}'", i + 1)))
        })
        .collect::<Result<Vec<f64>>>()?;

    if vector.len() != dimension {
        return Err(MosaicError::DimensionMismatch {
            expected: dimension,
            actual: vector.len(),
        });
    }

    Ok(FeatureRecord::new(id, source_path, vector))
}

/// Check that `path` can be stored in a catalog row
///
/// Rows are split on commas and line breaks with no quoting, so a path holding
/// either would not load back as the same record.
///
/// # Errors
///
/// Returns `InvalidParameter` if the path contains a comma or a line break
pub fn check_row_path(path: &Path) -> Result<()> {
    let text = path.to_string_lossy();
    if text.contains([',', '\n', '\r']) {
        return Err(invalid_parameter(
            "path",
            &path.display(),
            &"contains a comma or line break, which a catalog row cannot hold",
        ));
    }
    Ok(())
}

/// Write records as catalog CSV, one row per record
///
/// # Errors
///
/// Returns `InvalidParameter` if a record path cannot be stored in a row (see
/// [`check_row_path`]), or an error if the parent directory or the file cannot
/// be written
pub fn write_catalog(path: &Path, records: &[FeatureRecord]) -> Result<()> {
    let mut text = String::new();
    for record in records {
        check_row_path(record.path())?;
        // Writing to a String cannot fail
        let _ = writeln!(text, "{}", record.to_csv_row());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MosaicError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    std::fs::write(path, text).map_err(|e| MosaicError::FileSystem {
        path: path.to_path_buf(),
        operation: "write catalog",
        source: e,
    })
}
