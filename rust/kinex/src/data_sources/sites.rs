use super::{
    TableFormat,
    csv_reader,
    open_table,
    parse_cell,
};
use crate::errors::ResourceError;
use crate::models::InputSite;
use std::io::Read;
use std::path::Path;
use tracing::{
    debug,
    info,
    instrument,
};

/// Reads experiment sites: sequence in the first column, log2 fold change
/// in the second. Header names are not checked and extra columns are
/// ignored.
///
/// A fold change that does not parse is kept as NaN, so the row is later
/// reported as a failed site instead of aborting the whole file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_input_sites(path: &Path) -> Result<Vec<InputSite>, ResourceError> {
    let (reader, format) = open_table(path)?;
    let sites = read_input_sites_from(reader, format)?;
    info!("Loaded {} input sites", sites.len());
    Ok(sites)
}

pub fn read_input_sites_from<R: Read>(
    reader: R,
    format: TableFormat,
) -> Result<Vec<InputSite>, ResourceError> {
    let mut rdr = csv_reader(reader, format);
    let num_columns = rdr
        .headers()
        .map_err(|e| ResourceError::Csv {
            source: e,
            context: "input sites header".to_string(),
        })?
        .len();
    if num_columns < 2 {
        return Err(ResourceError::MalformedInput {
            msg: format!(
                "expected at least 2 columns (sequence, log2 fold change), found {}",
                num_columns
            ),
        });
    }

    let mut sites = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| ResourceError::Csv {
            source: e,
            context: format!("input sites row {}", i + 1),
        })?;
        let sequence = record.get(0).unwrap_or_default();
        let raw_fc = record.get(1).unwrap_or_default();
        let log2_fold_change = parse_cell(raw_fc).unwrap_or_else(|| {
            debug!("Row {}: unparsable fold change '{}'", i + 1, raw_fc);
            f64::NAN
        });
        sites.push(InputSite::new(sequence, log2_fold_change));
    }
    Ok(sites)
}
