//! Parser týdenních dat: na řádku `<unix_sekundy>;<teplota>;<vlhkost>`.

use log::debug;

use crate::model::{Measurement, MeasurementSeries};

/// Rozparsuje data týdne. Řádky s méně než třemi poli nebo s nečíselnými
/// hodnotami se zahodí, pořadí ostatních zůstává.
pub fn parse_payload(text: &str) -> MeasurementSeries {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut series = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => { debug!("Řádek {} nelze přečíst: {}", line + 1, e); continue; }
        };
        if record.len() < 3 { debug!("Řádek {} má jen {} polí, přeskakuji.", line + 1, record.len()); continue; }
        match (record[0].parse::<i64>(), record[1].parse::<f64>(), record[2].parse::<f64>()) {
            (Ok(ts), Ok(temp), Ok(hum)) => series.push(Measurement { ts, temp, hum }),
            _ => debug!("Řádek {} není číselný, přeskakuji: {:?}", line + 1, record),
        }
    }
    series
}
