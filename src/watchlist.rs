//! Watchlist editing: list, add and delete symbols in the watchlist CSV.

use csv::StringRecord;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{PmaError, Result, SourceKind};
use crate::loader::{TICKER_COLUMN, load_symbols, load_watchlist};
use crate::storage::write_atomic;

/// Placeholder written in the second column of every added row.
pub const TYPE_ID_COLUMN: &str = "Type_Id";
pub const DEFAULT_TYPE_ID: &str = "1";

static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._^=\-]+$").expect("symbol pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyListed,
    NotInUniverse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Number of rows removed.
    Deleted(usize),
    NotListed,
}

/// Trims user input and rejects anything that cannot be a single CSV cell symbol.
pub fn normalize_symbol(input: &str) -> Result<String> {
    let symbol = input.trim();
    if !SYMBOL_RE.is_match(symbol) {
        return Err(PmaError::InvalidParameter {
            name: "symbol",
            reason: format!("`{}` is not a valid ticker symbol", symbol),
        });
    }
    Ok(symbol.to_string())
}

/// Watchlist symbols in alphabetical order.
pub fn list_symbols(watchlist: &Path) -> Result<Vec<String>> {
    let mut symbols = load_watchlist(watchlist)?;
    symbols.sort();
    Ok(symbols)
}

/// Appends `symbol` to the watchlist if the price universe knows it.
pub fn add_symbol(watchlist: &Path, prices: &Path, symbol: &str) -> Result<AddOutcome> {
    let symbol = normalize_symbol(symbol)?;

    let universe = load_symbols(SourceKind::Prices, prices)?;
    if !universe.iter().any(|s| *s == symbol) {
        return Ok(AddOutcome::NotInUniverse);
    }

    let kind = SourceKind::Watchlist;
    if watchlist.exists() {
        if load_watchlist(watchlist)?.contains(&symbol) {
            return Ok(AddOutcome::AlreadyListed);
        }
    } else {
        fs::write(watchlist, format!("{},{}\n", TICKER_COLUMN, TYPE_ID_COLUMN))
            .map_err(|e| PmaError::from_io(kind, watchlist, e))?;
        tracing::info!(path = %watchlist.display(), "created watchlist");
    }

    append_row(watchlist, &[symbol.as_str(), DEFAULT_TYPE_ID]).map_err(|e| PmaError::from_io(kind, watchlist, e))?;

    tracing::info!(path = %watchlist.display(), %symbol, "added symbol to watchlist");
    Ok(AddOutcome::Added)
}

fn append_row(path: &Path, fields: &[&str]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().read(true).append(true).open(path)?;

    // Keep the new row off the end of an unterminated last line.
    let len = file.metadata()?.len();
    if len > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::Start(len - 1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            file.write_all(b"\n")?;
        }
    }

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(fields)?;
    writer.flush()?;
    Ok(())
}

fn to_csv_bytes(headers: &StringRecord, rows: &[StringRecord]) -> csv::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::new(e.error().kind(), e.to_string())))
}

/// Rewrites the watchlist without any row for `symbol`.
pub fn delete_symbol(watchlist: &Path, symbol: &str) -> Result<DeleteOutcome> {
    let kind = SourceKind::Watchlist;
    let symbol = symbol.trim();

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(watchlist)
        .map_err(|e| PmaError::from_csv(kind, watchlist, e))?;
    let headers = rdr
        .headers()
        .map_err(|e| PmaError::from_csv(kind, watchlist, e))?
        .clone();
    let ticker_idx = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(TICKER_COLUMN))
        .ok_or_else(|| PmaError::missing_column(kind, watchlist, TICKER_COLUMN))?;

    let mut kept = Vec::new();
    let mut removed = 0;
    for result in rdr.records() {
        let record = result.map_err(|e| PmaError::from_csv(kind, watchlist, e))?;
        if record.get(ticker_idx).map(str::trim) == Some(symbol) {
            removed += 1;
        } else {
            kept.push(record);
        }
    }

    if removed == 0 {
        return Ok(DeleteOutcome::NotListed);
    }

    let bytes = to_csv_bytes(&headers, &kept).map_err(|e| PmaError::from_csv(kind, watchlist, e))?;
    write_atomic(watchlist, &bytes).map_err(|e| PmaError::from_io(kind, watchlist, e))?;

    tracing::info!(path = %watchlist.display(), %symbol, removed, "deleted symbol from watchlist");
    Ok(DeleteOutcome::Deleted(removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const PRICES: &str = "Ticker,Close,One_Day_Ago_Close,One_Month_Ago_Close,One_Year_Ago_Close\n\
        MSFT,1,1,1,1\nAAPL,1,1,1,1\nBRK.B,1,1,1,1\n";

    fn fixture(list: &str) -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let list_path = dir.path().join("ticker_list.csv");
        let prices_path = dir.path().join("ticker_prices.csv");
        fs::write(&list_path, list).unwrap();
        fs::write(&prices_path, PRICES).unwrap();
        (dir, list_path, prices_path)
    }

    #[test]
    fn lists_symbols_sorted() {
        let (_dir, list, _) = fixture("Ticker,Type_Id\nMSFT,1\nAAPL,1\n");
        assert_eq!(list_symbols(&list).unwrap(), ["AAPL", "MSFT"]);
    }

    #[test]
    fn adds_known_symbol_with_placeholder() {
        let (_dir, list, prices) = fixture("Ticker,Type_Id\nMSFT,1\n");

        assert_eq!(add_symbol(&list, &prices, " BRK.B ").unwrap(), AddOutcome::Added);
        assert_eq!(fs::read_to_string(&list).unwrap(), "Ticker,Type_Id\nMSFT,1\nBRK.B,1\n");
    }

    #[test]
    fn add_fixes_missing_trailing_newline() {
        let (_dir, list, prices) = fixture("Ticker,Type_Id\nMSFT,1");

        add_symbol(&list, &prices, "AAPL").unwrap();
        assert_eq!(load_watchlist(&list).unwrap(), ["MSFT", "AAPL"]);
    }

    #[test]
    fn add_rejects_unknown_and_duplicate_symbols() {
        let (_dir, list, prices) = fixture("Ticker,Type_Id\nMSFT,1\n");

        assert_eq!(add_symbol(&list, &prices, "TSLA").unwrap(), AddOutcome::NotInUniverse);
        assert_eq!(add_symbol(&list, &prices, "MSFT").unwrap(), AddOutcome::AlreadyListed);
        assert_eq!(fs::read_to_string(&list).unwrap(), "Ticker,Type_Id\nMSFT,1\n");
    }

    #[test]
    fn add_creates_missing_watchlist_with_header() {
        let (dir, _, prices) = fixture("");
        let list = dir.path().join("fresh.csv");

        assert_eq!(add_symbol(&list, &prices, "AAPL").unwrap(), AddOutcome::Added);
        assert_eq!(fs::read_to_string(&list).unwrap(), "Ticker,Type_Id\nAAPL,1\n");
    }

    #[test]
    fn invalid_symbol_input_is_rejected() {
        let (_dir, list, prices) = fixture("Ticker\n");
        for bad in ["", "   ", "A,B", "two words"] {
            let err = add_symbol(&list, &prices, bad).unwrap_err();
            assert!(matches!(err, PmaError::InvalidParameter { name: "symbol", .. }));
        }
    }

    #[test]
    fn delete_removes_every_matching_row() {
        let (_dir, list, _) = fixture("Ticker,Type_Id\nMSFT,1\nAAPL,1\nMSFT,1\n");

        assert_eq!(delete_symbol(&list, "MSFT").unwrap(), DeleteOutcome::Deleted(2));
        assert_eq!(fs::read_to_string(&list).unwrap(), "Ticker,Type_Id\nAAPL,1\n");
    }

    #[test]
    fn delete_of_unlisted_symbol_leaves_file_alone() {
        let body = "Ticker,Type_Id\nMSFT,1\n";
        let (_dir, list, _) = fixture(body);

        assert_eq!(delete_symbol(&list, "AAPL").unwrap(), DeleteOutcome::NotListed);
        assert_eq!(fs::read_to_string(&list).unwrap(), body);
    }

    #[test]
    fn delete_on_missing_file_is_source_not_found() {
        let dir = TempDir::new().unwrap();
        let err = delete_symbol(&dir.path().join("gone.csv"), "MSFT").unwrap_err();
        assert!(matches!(err, PmaError::SourceNotFound { .. }));
    }
}
