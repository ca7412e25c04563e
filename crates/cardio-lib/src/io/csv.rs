use crate::error::{CardioError, Result};
use crate::wave::{WaveRecord, WaveType};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a headerless `type,onset_ms,offset_ms,tag` recording from disk.
pub fn read_waves(path: &Path) -> Result<Vec<WaveRecord>> {
    let file = File::open(path)?;
    read_waves_from(file)
}

/// Parse a recording held in memory.
pub fn parse_waves(text: &str) -> Result<Vec<WaveRecord>> {
    read_waves_from(text.as_bytes())
}

/// Parse a recording from any reader. Rows keep their input order; the first
/// malformed row aborts the whole read.
pub fn read_waves_from<R: Read>(source: R) -> Result<Vec<WaveRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    let mut waves = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(waves.len() + 1);
        waves.push(wave_from_record(&record, line)?);
    }
    log::debug!("parsed {} wave rows", waves.len());
    Ok(waves)
}

fn wave_from_record(record: &StringRecord, line: usize) -> Result<WaveRecord> {
    if record.len() < 3 {
        return Err(CardioError::parse(
            line,
            format!("expected at least 3 fields, found {}", record.len()),
        ));
    }
    if record.len() > 4 {
        return Err(CardioError::parse(
            line,
            format!("expected at most 4 fields, found {}", record.len()),
        ));
    }
    let wave_type: WaveType = record[0].to_string().into();
    let onset_ms = parse_number(&record[1], "onset", line)?;
    let offset_ms = parse_number(&record[2], "offset", line)?;
    let wave = WaveRecord::new(wave_type, onset_ms, offset_ms, record.get(3));
    wave.validate(line)?;
    Ok(wave)
}

fn parse_number(field: &str, name: &str, line: usize) -> Result<f64> {
    field
        .parse()
        .map_err(|_| CardioError::parse(line, format!("{name} is not numeric: {field:?}")))
}
