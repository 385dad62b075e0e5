//! CSV writers for the optimized route and the per-start comparison table.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::{Error, Result, RoutePlan, Stop};

pub const ROUTE_HEADER: [&str; 5] = ["sequence", "name", "original_row", "longitude", "latitude"];
pub const CANDIDATES_HEADER: [&str; 4] = ["original_row", "name", "length_km", "gap_km"];

/// Buffered writer for `path`, or stdout when there is none.
pub fn open_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                Error::other(format!("failed to create output file {}: {e}", path.display()))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// One record per stop in visiting order, 1-based sequence.
pub fn write_route<W: Write>(writer: &mut W, stops: &[Stop], plan: &RoutePlan) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(ROUTE_HEADER)?;
    for (seq, &idx) in plan.order.iter().enumerate() {
        let stop = stop_at(stops, idx)?;
        csv_writer.write_record([
            (seq + 1).to_string(),
            stop.name.clone(),
            stop.row.to_string(),
            format!("{:.6}", stop.point.lng),
            format!("{:.6}", stop.point.lat),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Every tried start, shortest first, with its gap to the best tour.
pub fn write_candidates<W: Write>(
    writer: &mut W,
    stops: &[Stop],
    plan: &RoutePlan,
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CANDIDATES_HEADER)?;
    for (candidate, gap_km) in plan.comparison() {
        let stop = stop_at(stops, candidate.start)?;
        csv_writer.write_record([
            stop.row.to_string(),
            stop.name.clone(),
            format!("{:.2}", candidate.length_km),
            format!("{gap_km:.2}"),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn stop_at(stops: &[Stop], idx: usize) -> Result<&Stop> {
    stops.get(idx).ok_or_else(|| {
        Error::invalid_data(format!(
            "route references stop {idx} but only {} stops were read",
            stops.len()
        ))
    })
}
