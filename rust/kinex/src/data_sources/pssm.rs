use super::{
    TableFormat,
    csv_reader,
    open_table,
    parse_cell,
};
use crate::errors::ResourceError;
use crate::matrices::PssmTable;
use crate::models::{
    SequenceType,
    Token,
};
use std::io::Read;
use std::path::Path;
use tracing::{
    info,
    instrument,
};

/// Reads a PSSM table: one row per kinase, kinase name in the first column
/// and one column per position token (`-5P`, `2s`, `0S`, ...).
#[instrument(skip_all, fields(path = %path.display(), family = %family))]
pub fn read_pssm_table(path: &Path, family: SequenceType) -> Result<PssmTable, ResourceError> {
    let (reader, format) = open_table(path)?;
    let table = read_pssm_table_from(reader, format, family)?;
    info!(
        "Loaded {} PSSM with {} kinases and {} columns",
        family,
        table.num_kinases(),
        table.columns().len()
    );
    Ok(table)
}

pub fn read_pssm_table_from<R: Read>(
    reader: R,
    format: TableFormat,
    family: SequenceType,
) -> Result<PssmTable, ResourceError> {
    let mut rdr = csv_reader(reader, format);
    let headers = rdr.headers().map_err(|e| ResourceError::Csv {
        source: e,
        context: "PSSM header".to_string(),
    })?;

    let columns = headers
        .iter()
        .skip(1)
        .map(|h| {
            h.parse::<Token>().map_err(|e| ResourceError::MalformedPssm {
                msg: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if columns.is_empty() {
        return Err(ResourceError::MalformedPssm {
            msg: "no position columns".to_string(),
        });
    }

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| ResourceError::Csv {
            source: e,
            context: format!("PSSM row {}", i + 1),
        })?;
        let mut fields = record.iter();
        let kinase = fields.next().unwrap_or_default().to_string();
        if kinase.is_empty() {
            return Err(ResourceError::MalformedPssm {
                msg: format!("row {} has no kinase name", i + 1),
            });
        }
        let weights = fields
            .map(|x| {
                parse_cell(x).ok_or_else(|| ResourceError::MalformedPssm {
                    msg: format!("kinase {} has a non-numeric weight '{}'", kinase, x),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push((kinase, weights));
    }

    PssmTable::new(family, columns, rows)
}
