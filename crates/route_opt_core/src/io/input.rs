use std::{fs::File, io::Read};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{Error, GeoPoint, Result, options::OptimizerOptions};

const ERR_NO_STOPS: &str = "No valid stops provided";

/// One named stop read from the input file.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub name: String,
    pub point: GeoPoint,
    /// 1-based data row in the source file, header excluded.
    pub row: usize,
}

/// Stops in file order. Indices into `stops` are what the optimizer works on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteInput {
    pub stops: Vec<Stop>,
}

impl RouteInput {
    /// Reads `--input` (or stdin) and parses it with the column options.
    pub fn from_options(options: &OptimizerOptions) -> Result<Self> {
        match options.input_path() {
            Some(path) => {
                let file = File::open(path).map_err(|e| {
                    Error::other(format!("failed to read input file {}: {e}", path.display()))
                })?;
                Self::from_reader(file, options)
            }
            None => Self::from_reader(std::io::stdin().lock(), options),
        }
    }

    pub fn parse(text: &str, options: &OptimizerOptions) -> Result<Self> {
        Self::from_reader(text.as_bytes(), options)
    }

    /// Delimited records from `reader`. Rows without usable coordinates are
    /// dropped; coordinates outside the WGS84 range are an error.
    pub fn from_reader<R: Read>(reader: R, options: &OptimizerOptions) -> Result<Self> {
        if !options.delimiter.is_ascii() {
            return Err(Error::invalid_input(format!(
                "delimiter {:?} must be a single-byte character",
                options.delimiter
            )));
        }
        let delimiter = options.delimiter as u8;
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(options.header)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        if options.header {
            log::debug!("input.header: fields={:?}", csv_reader.headers()?);
        }

        let mut stops = Vec::new();
        let mut dropped = 0_usize;
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            let row = row + 1;
            let line = record.position().map_or(0, |pos| pos.line());

            let lat = parse_coord(&record, options.lat_column);
            let lng = parse_coord(&record, options.lng_column);
            let (Some(lat), Some(lng)) = (lat, lng) else {
                dropped += 1;
                log::warn!(
                    "input.row: dropped row={row} line={line} reason=missing_coordinates fields={}",
                    record.len()
                );
                continue;
            };

            let point = GeoPoint::new(lat, lng);
            if !point.is_valid() {
                return Err(Error::invalid_input(format!(
                    "row {row} (line {line}): coordinates out of range: {point}"
                )));
            }

            let name = match record.get(options.name_column) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => format!("#{row}"),
            };
            stops.push(Stop { name, point, row });
        }

        if stops.is_empty() {
            return Err(Error::invalid_input(ERR_NO_STOPS));
        }
        log::info!("input: stops={} dropped={dropped}", stops.len());

        Ok(Self { stops })
    }

    pub fn points(&self) -> Vec<GeoPoint> {
        self.stops.iter().map(|stop| stop.point).collect()
    }
}

fn parse_coord(record: &StringRecord, column: usize) -> Option<f64> {
    let raw = record.get(column)?;
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| !v.is_nan())
}
