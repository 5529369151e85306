//! Tabular resources: PSSM tables, reference matrices and input sites.
//!
//! Tables are comma or tab separated text, optionally zstd or gzip
//! compressed.

mod pssm;
mod reference;
mod sites;

pub use pssm::{
    read_pssm_table,
    read_pssm_table_from,
};
pub use reference::{
    read_reference_matrix,
    read_reference_matrix_from,
    write_reference_matrix,
};
pub use sites::{
    read_input_sites,
    read_input_sites_from,
};

use crate::errors::ResourceError;
use std::io::{
    BufReader,
    Read,
};
use std::path::{
    Path,
    PathBuf,
};

const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    None,
    Zstd,
    Gzip,
}

impl Compression {
    /// Compression implied by a `.zst` or `.gz` suffix.
    pub fn from_suffix(path: &Path) -> Self {
        let path_str = path.to_string_lossy().to_lowercase();
        if path_str.ends_with(".zst") {
            Self::Zstd
        } else if path_str.ends_with(".gz") {
            Self::Gzip
        } else {
            Self::None
        }
    }

    fn from_magic(path: &Path) -> Result<Self, ResourceError> {
        let mut buffer = Vec::with_capacity(ZSTD_MAGIC.len());
        open_file(path)?
            .take(ZSTD_MAGIC.len() as u64)
            .read_to_end(&mut buffer)
            .map_err(|e| ResourceError::Io {
                source: e,
                path: PathBuf::from(path),
            })?;
        if buffer.starts_with(&ZSTD_MAGIC) {
            Ok(Self::Zstd)
        } else if buffer.starts_with(&GZIP_MAGIC) {
            Ok(Self::Gzip)
        } else {
            Ok(Self::None)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFormat {
    pub delimiter: u8,
    pub compression: Compression,
}

impl TableFormat {
    pub const CSV: Self = Self {
        delimiter: b',',
        compression: Compression::None,
    };

    pub const TSV: Self = Self {
        delimiter: b'\t',
        compression: Compression::None,
    };

    /// Delimiter from the extension (`.tsv`/`.txt` are tab separated),
    /// compression from a `.zst`/`.gz` suffix or, failing that, the file magic.
    pub fn detect_from_path(path: &Path) -> Result<Self, ResourceError> {
        let path_str = path.to_string_lossy().to_lowercase();
        let stem = path_str
            .strip_suffix(".zst")
            .or_else(|| path_str.strip_suffix(".gz"))
            .unwrap_or(&path_str);
        let delimiter = if stem.ends_with(".tsv") || stem.ends_with(".txt") {
            b'\t'
        } else {
            b','
        };
        let compression = match Compression::from_suffix(path) {
            Compression::None => Compression::from_magic(path)?,
            x => x,
        };
        Ok(Self {
            delimiter,
            compression,
        })
    }
}

fn open_file(path: &Path) -> Result<std::fs::File, ResourceError> {
    std::fs::File::open(path).map_err(|e| ResourceError::Io {
        source: e,
        path: PathBuf::from(path),
    })
}

/// Opens a table for reading, decompressing it if needed.
pub(crate) fn open_table(
    path: &Path,
) -> Result<(Box<dyn Read + Send>, TableFormat), ResourceError> {
    let format = TableFormat::detect_from_path(path)?;
    let file = open_file(path)?;
    let reader: Box<dyn Read + Send> = match format.compression {
        Compression::Zstd => {
            let decoder = zstd::Decoder::new(file).map_err(|e| ResourceError::Io {
                source: e,
                path: PathBuf::from(path),
            })?;
            Box::new(BufReader::new(decoder))
        }
        Compression::Gzip => Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file))),
        Compression::None => Box::new(BufReader::new(file)),
    };
    Ok((reader, format))
}

pub(crate) fn csv_reader<R: Read>(reader: R, format: TableFormat) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(format.delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

pub(crate) fn parse_cell(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}
