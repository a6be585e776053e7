use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::error::{PmaError, Result, SourceKind};
use crate::movement::PriceRecord;

pub const TICKER_COLUMN: &str = "Ticker";
pub const CLOSE_COLUMN: &str = "Close";
pub const ONE_DAY_AGO_COLUMN: &str = "One_Day_Ago_Close";
pub const ONE_MONTH_AGO_COLUMN: &str = "One_Month_Ago_Close";
pub const ONE_YEAR_AGO_COLUMN: &str = "One_Year_Ago_Close";

fn open_reader(kind: SourceKind, path: &Path) -> Result<csv::Reader<std::fs::File>> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| PmaError::from_csv(kind, path, e))
}

/// Position of `column` in the header row, ignoring case.
fn column_index(headers: &StringRecord, kind: SourceKind, path: &Path, column: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(column))
        .ok_or_else(|| PmaError::missing_column(kind, path, column))
}

/// Reads a close price. Blank cells become NaN; anything else must parse.
fn parse_close(
    record: &StringRecord,
    idx: usize,
    column: &str,
    kind: SourceKind,
    path: &Path,
) -> Result<f64> {
    let raw = record.get(idx).unwrap_or("");
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| {
        let line = record.position().map_or(0, |p| p.line());
        PmaError::MalformedSource {
            kind,
            path: path.to_path_buf(),
            detail: format!("line {}: `{}` value `{}` is not a number", line, column, raw),
        }
    })
}

/// The row's symbol. A blank one is kept as an empty string so the row still
/// takes part in ranking.
fn read_symbol(record: &StringRecord, idx: usize, kind: SourceKind, path: &Path) -> String {
    let symbol = record.get(idx).unwrap_or("");
    if symbol.is_empty() {
        let line = record.position().map_or(0, |p| p.line());
        tracing::warn!(path = %path.display(), %kind, line, "row has a blank `{}`", TICKER_COLUMN);
    }
    symbol.to_string()
}

/// Reads the `Ticker` column of any table, in file order.
pub fn load_symbols(kind: SourceKind, path: &Path) -> Result<Vec<String>> {
    let mut rdr = open_reader(kind, path)?;
    let headers = rdr.headers().map_err(|e| PmaError::from_csv(kind, path, e))?.clone();
    let ticker_idx = column_index(&headers, kind, path, TICKER_COLUMN)?;

    let mut symbols = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| PmaError::from_csv(kind, path, e))?;
        symbols.push(read_symbol(&record, ticker_idx, kind, path));
    }
    Ok(symbols)
}

/// Loads the watchlist symbols. Extra columns are ignored.
pub fn load_watchlist(path: &Path) -> Result<Vec<String>> {
    let symbols = load_symbols(SourceKind::Watchlist, path)?;
    tracing::info!(path = %path.display(), rows = symbols.len(), "loaded watchlist");
    Ok(symbols)
}

/// Loads the full price universe, requiring all five price columns.
pub fn load_price_universe(path: &Path) -> Result<Vec<PriceRecord>> {
    let kind = SourceKind::Prices;
    let mut rdr = open_reader(kind, path)?;
    let headers = rdr.headers().map_err(|e| PmaError::from_csv(kind, path, e))?.clone();

    let ticker_idx = column_index(&headers, kind, path, TICKER_COLUMN)?;
    let close_cols = [
        CLOSE_COLUMN,
        ONE_DAY_AGO_COLUMN,
        ONE_MONTH_AGO_COLUMN,
        ONE_YEAR_AGO_COLUMN,
    ];
    let mut close_idx = [0usize; 4];
    for (slot, column) in close_idx.iter_mut().zip(close_cols) {
        *slot = column_index(&headers, kind, path, column)?;
    }

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| PmaError::from_csv(kind, path, e))?;
        let symbol = read_symbol(&record, ticker_idx, kind, path);

        let mut closes = [0.0f64; 4];
        for ((value, idx), column) in closes.iter_mut().zip(close_idx).zip(close_cols) {
            *value = parse_close(&record, idx, column, kind, path)?;
        }
        let [close, close_1d_ago, close_1mo_ago, close_1yr_ago] = closes;

        records.push(PriceRecord {
            symbol,
            close,
            close_1d_ago,
            close_1mo_ago,
            close_1yr_ago,
        });
    }

    tracing::info!(path = %path.display(), rows = records.len(), "loaded price universe");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn reads_watchlist_and_ignores_placeholder_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "list.csv", "Ticker,Type_Id\nMSFT,1\nAAPL,1\n");

        assert_eq!(load_watchlist(&path).unwrap(), ["MSFT", "AAPL"]);
    }

    #[test]
    fn watchlist_without_ticker_column_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "list.csv", "Symbol\nMSFT\n");

        let err = load_watchlist(&path).unwrap_err();
        assert!(matches!(
            err,
            PmaError::MalformedSource {
                kind: SourceKind::Watchlist,
                ..
            }
        ));
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_price_universe(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(
            err,
            PmaError::SourceNotFound {
                kind: SourceKind::Prices,
                ..
            }
        ));
    }

    #[test]
    fn reads_price_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "prices.csv",
            "Ticker,Close,One_Day_Ago_Close,One_Month_Ago_Close,One_Year_Ago_Close\n\
             A,110,100,120,130\n\
             B, 90 ,95,80,70\n",
        );

        let rows = load_price_universe(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "A");
        assert_eq!(rows[1].close, 90.0);
        assert_eq!(rows[1].close_1yr_ago, 70.0);
    }

    #[test]
    fn columns_may_appear_in_any_order_and_case() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "prices.csv",
            "one_year_ago_close,Name,ticker,close,One_Month_Ago_Close,One_Day_Ago_Close\n\
             130,Alpha,A,110,120,100\n",
        );

        let rows = load_price_universe(&path).unwrap();
        assert_eq!(rows[0].symbol, "A");
        assert_eq!(rows[0].close, 110.0);
        assert_eq!(rows[0].close_1d_ago, 100.0);
        assert_eq!(rows[0].close_1mo_ago, 120.0);
        assert_eq!(rows[0].close_1yr_ago, 130.0);
    }

    #[test]
    fn missing_close_column_names_it() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "prices.csv",
            "Ticker,Close,One_Day_Ago_Close,One_Month_Ago_Close\nA,1,1,1\n",
        );

        let err = load_price_universe(&path).unwrap_err();
        assert!(err.to_string().contains(ONE_YEAR_AGO_COLUMN));
    }

    #[test]
    fn blank_close_reads_as_nan_and_garbage_is_rejected() {
        let dir = TempDir::new().unwrap();
        let blank = write(
            &dir,
            "blank.csv",
            "Ticker,Close,One_Day_Ago_Close,One_Month_Ago_Close,One_Year_Ago_Close\nA,1,,1,1\n",
        );
        assert!(load_price_universe(&blank).unwrap()[0].close_1d_ago.is_nan());

        let garbage = write(
            &dir,
            "garbage.csv",
            "Ticker,Close,One_Day_Ago_Close,One_Month_Ago_Close,One_Year_Ago_Close\nA,1,abc,1,1\n",
        );
        let err = load_price_universe(&garbage).unwrap_err();
        assert!(matches!(err, PmaError::MalformedSource { .. }));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn blank_ticker_rows_are_kept() {
        let dir = TempDir::new().unwrap();
        let prices = write(
            &dir,
            "prices.csv",
            "Ticker,Close,One_Day_Ago_Close,One_Month_Ago_Close,One_Year_Ago_Close\n\
             ,200,100,100,100\n\
             A,110,100,120,130\n",
        );
        let rows = load_price_universe(&prices).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "");
        assert_eq!(rows[0].close, 200.0);

        let list = write(&dir, "list.csv", "Ticker,Type_Id\n,1\nMSFT,1\n");
        assert_eq!(load_watchlist(&list).unwrap(), ["", "MSFT"]);
    }

    #[test]
    fn invalid_utf8_is_malformed_with_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.csv");
        fs::write(&path, b"Ticker\nMSFT\nAB\xff\n").unwrap();

        let err = load_watchlist(&path).unwrap_err();
        assert!(matches!(
            err,
            PmaError::MalformedSource {
                kind: SourceKind::Watchlist,
                ..
            }
        ));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn header_only_table_is_empty_not_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "list.csv", "Ticker,Type_Id\n");
        assert!(load_watchlist(&path).unwrap().is_empty());
    }
}
