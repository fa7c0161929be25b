use super::MunicipalRecord;
use crate::error::DataError;
use csv::{ErrorKind, ReaderBuilder, Trim};
use std::io::Read;

const REQUIRED_COLUMNS: [&str; 5] = [
    "departamento",
    "municipio",
    "homicidios",
    "poblacion",
    "tasa_homicidios",
];

/// Parse every row of the municipal CSV. Any malformed row fails the whole load.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<MunicipalRecord>, DataError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);
    let headers = rdr.headers()?.clone();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DataError::MissingColumn(column));
        }
    }

    let mut records = Vec::new();
    for (idx, result) in rdr.deserialize::<MunicipalRecord>().enumerate() {
        // Header occupies line 1
        let fallback_line = idx as u64 + 2;

        let record = result.map_err(|e| malformed(&e, fallback_line))?;

        if !record.rate.is_finite() || record.rate < 0.0 {
            return Err(DataError::MalformedRow {
                line: fallback_line,
                message: format!("invalid tasa_homicidios {}", record.rate),
            });
        }

        records.push(record);
    }

    Ok(records)
}

fn malformed(err: &csv::Error, fallback_line: u64) -> DataError {
    let line = err.position().map(|p| p.line()).unwrap_or(fallback_line);
    let message = match err.kind() {
        ErrorKind::Deserialize { err, .. } => err.to_string(),
        ErrorKind::UnequalLengths { expected_len, len, .. } => {
            format!("expected {} fields, found {}", expected_len, len)
        }
        _ => err.to_string(),
    };
    DataError::MalformedRow { line, message }
}
