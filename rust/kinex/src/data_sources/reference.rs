use super::{
    Compression,
    TableFormat,
    csv_reader,
    open_table,
    parse_cell,
};
use crate::errors::ResourceError;
use crate::matrices::ReferenceDistribution;
use crate::models::SequenceType;
use std::io::{
    Read,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use tracing::{
    info,
    instrument,
};

/// Reads a reference scoring matrix: one column per kinase, one row per
/// reference phosphosite.
///
/// A leading column with an empty header, or with non-numeric values, is
/// taken as a row label and skipped. Empty cells are ignored, so columns
/// may differ in length.
#[instrument(skip_all, fields(path = %path.display(), family = %family))]
pub fn read_reference_matrix(
    path: &Path,
    family: SequenceType,
) -> Result<ReferenceDistribution, ResourceError> {
    let (reader, format) = open_table(path)?;
    let dist = read_reference_matrix_from(reader, format, family)?;
    info!(
        "Loaded {} reference matrix with {} kinases",
        family,
        dist.kinases().len()
    );
    Ok(dist)
}

pub fn read_reference_matrix_from<R: Read>(
    reader: R,
    format: TableFormat,
    family: SequenceType,
) -> Result<ReferenceDistribution, ResourceError> {
    let mut rdr = csv_reader(reader, format);
    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| ResourceError::Csv {
            source: e,
            context: "reference matrix header".to_string(),
        })?
        .iter()
        .map(|x| x.to_string())
        .collect();

    let records = rdr
        .records()
        .enumerate()
        .map(|(i, record)| {
            record.map_err(|e| ResourceError::Csv {
                source: e,
                context: format!("reference matrix row {}", i + 1),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let has_label_column = headers.first().is_some_and(|x| x.is_empty())
        || records
            .iter()
            .any(|r| r.get(0).is_some_and(|x| !x.is_empty() && parse_cell(x).is_none()));
    let skip = usize::from(has_label_column);

    let mut columns: Vec<(String, Vec<f64>)> = headers
        .into_iter()
        .skip(skip)
        .map(|name| (name, Vec::with_capacity(records.len())))
        .collect();

    for (i, record) in records.iter().enumerate() {
        for ((name, values), cell) in columns.iter_mut().zip(record.iter().skip(skip)) {
            if cell.is_empty() {
                continue;
            }
            let value = parse_cell(cell).ok_or_else(|| ResourceError::MalformedReference {
                msg: format!(
                    "non-numeric score '{}' for kinase {} at row {}",
                    cell,
                    name,
                    i + 1
                ),
            })?;
            values.push(value);
        }
    }

    ReferenceDistribution::new(family, columns)
}

/// Writes the reference distribution, one column per kinase.
///
/// Every column is written in ascending order, so rows do not correspond to
/// individual reference sites. Columns of different lengths are padded with
/// empty cells.
pub fn write_reference_matrix(
    path: &Path,
    reference: &ReferenceDistribution,
) -> Result<(), ResourceError> {
    let io_err = |e: std::io::Error| ResourceError::Io {
        source: e,
        path: PathBuf::from(path),
    };
    let file = std::fs::File::create(path).map_err(io_err)?;
    let writer: Box<dyn Write> = match Compression::from_suffix(path) {
        Compression::Zstd => Box::new(
            zstd::Encoder::new(file, 3)
                .map_err(io_err)?
                .auto_finish(),
        ),
        Compression::Gzip => Box::new(flate2::write::GzEncoder::new(
            std::io::BufWriter::new(file),
            flate2::Compression::default(),
        )),
        Compression::None => Box::new(std::io::BufWriter::new(file)),
    };

    let csv_err = |e: csv::Error| ResourceError::Csv {
        source: e,
        context: format!("writing {}", path.display()),
    };
    let mut wtr = csv::Writer::from_writer(writer);
    let columns: Vec<_> = reference.columns().collect();
    wtr.write_record(columns.iter().map(|(k, _)| k.as_bytes()))
        .map_err(csv_err)?;

    let num_rows = columns.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
    for i in 0..num_rows {
        wtr.write_record(
            columns
                .iter()
                .map(|(_, v)| v.get(i).map(|x| x.to_string()).unwrap_or_default()),
        )
        .map_err(csv_err)?;
    }
    wtr.flush().map_err(io_err)?;
    Ok(())
}
