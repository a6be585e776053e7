use std::collections::HashSet;

use crate::movement::PriceRecord;

/// Keeps the price rows whose symbol is on the watchlist, in price-table order.
///
/// Duplicate rows pass through untouched; watchlist symbols with no price row
/// are simply absent from the result.
pub fn filter_by_watchlist(prices: &[PriceRecord], watchlist: &[String]) -> Vec<PriceRecord> {
    let wanted: HashSet<&str> = watchlist.iter().map(String::as_str).collect();

    let kept: Vec<PriceRecord> = prices
        .iter()
        .filter(|p| wanted.contains(p.symbol.as_str()))
        .cloned()
        .collect();

    tracing::debug!(
        universe = prices.len(),
        watchlist = watchlist.len(),
        kept = kept.len(),
        "filtered price universe by watchlist"
    );
    kept
}
