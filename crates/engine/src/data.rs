use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use common::{Bar, Error, Result};

/// One CSV row. Header names are matched case-insensitively through aliases
/// so both `timestamp,open,...` and Yahoo-style `Date,Open,...` files load.
#[derive(Debug, Deserialize)]
struct OhlcvRecord {
    #[serde(alias = "Date", alias = "date", alias = "Timestamp", alias = "timestamp_utc")]
    timestamp: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: f64,
}

/// Load bars for `pair` from an OHLCV CSV file, sorted oldest first.
pub fn load_bars(path: impl AsRef<Path>, pair: &str) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        Error::Data(format!("failed to open OHLCV CSV {}: {e}", path.display()))
    })?;
    let bars = parse_bars(file, pair)?;
    info!(path = %path.display(), bars = bars.len(), "Loaded market data");
    Ok(bars)
}

/// Parse OHLCV CSV from any reader. Rows with a non-positive or non-finite
/// close are skipped with a warning.
pub fn parse_bars<R: Read>(reader: R, pair: &str) -> Result<Vec<Bar>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut bars = Vec::new();

    for record in reader.deserialize::<OhlcvRecord>() {
        let record = record?;
        let timestamp = parse_timestamp(&record.timestamp)?;
        if !record.close.is_finite() || record.close <= 0.0 {
            warn!(timestamp = %timestamp, close = record.close, "Skipping row with invalid close");
            continue;
        }
        bars.push(Bar {
            pair: pair.to_string(),
            timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Some(naive) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    Err(Error::Data(format!("unsupported timestamp format: {value}")))
}

/// Send `bars` down `tx` in order. Stops early if the receiver is dropped.
pub async fn replay(bars: Vec<Bar>, tx: mpsc::Sender<Bar>) {
    let total = bars.len();
    for (sent, bar) in bars.into_iter().enumerate() {
        if tx.send(bar).await.is_err() {
            warn!(sent, total, "Bar channel closed — stopping replay");
            return;
        }
    }
    info!(total, "Replay finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yahoo_style_csv_and_sorts() {
        let csv = "Date,Open,High,Low,Close,Adj Close,Volume\n\
                   2024-01-03,11,12,10,11.5,11.5,900\n\
                   2024-01-02,10,11,9,10.5,10.5,1000\n";
        let bars = parse_bars(csv.as_bytes(), "QQQ").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[1].close, 11.5);
        assert_eq!(bars[0].pair, "QQQ");
        assert_eq!(bars[0].volume, 1000.0);
    }

    #[test]
    fn parses_rfc3339_and_skips_bad_close() {
        let csv = "timestamp,open,high,low,close,volume\n\
                   2024-01-02T14:30:00Z,10,11,9,10.5,1\n\
                   2024-01-02T14:31:00Z,10,11,9,0,1\n";
        let bars = parse_bars(csv.as_bytes(), "QQQ").unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].timestamp.to_rfc3339(), "2024-01-02T14:30:00+00:00");
    }

    #[test]
    fn rejects_unknown_timestamp_format() {
        let csv = "timestamp,open,high,low,close,volume\n02/01/2024,10,11,9,10.5,1\n";
        assert!(matches!(parse_bars(csv.as_bytes(), "QQQ"), Err(Error::Data(_))));
    }

    #[tokio::test]
    async fn replay_preserves_order() {
        let csv = "timestamp,open,high,low,close,volume\n\
                   2024-01-02 00:00:00,1,1,1,1,1\n\
                   2024-01-03 00:00:00,2,2,2,2,1\n";
        let bars = parse_bars(csv.as_bytes(), "QQQ").unwrap();
        let (tx, mut rx) = mpsc::channel(1);
        tokio::spawn(replay(bars, tx));

        let mut closes = Vec::new();
        while let Some(bar) = rx.recv().await {
            closes.push(bar.close);
        }
        assert_eq!(closes, vec![1.0, 2.0]);
    }
}
