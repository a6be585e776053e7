//! This module contains the core analysis pipeline logic.

use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::filter::filter_by_watchlist;
use crate::loader::{load_price_universe, load_watchlist};
use crate::movement::{PriceRecord, compute_movements};
use crate::ranking::{RankedMovement, rank_by_daily_move, select_all_negative, select_top_n, validate_top_n};

/// The three result tables of one analysis run.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub top_n: usize,
    /// Watchlist rows ranked by 1-day move.
    pub filtered_ranked: Vec<RankedMovement>,
    /// Watchlist rows that are down over all three horizons.
    pub negative_movers: Vec<RankedMovement>,
    /// Best 1-day movers across the whole price universe.
    pub top_movers: Vec<RankedMovement>,
}

/// Derive, then rank. Shared by the watchlist and universe branches.
fn rank_prices(prices: Vec<PriceRecord>) -> Vec<RankedMovement> {
    rank_by_daily_move(compute_movements(prices))
}

/// Runs both branches over already-loaded tables.
pub fn analyze(watchlist: &[String], universe: Vec<PriceRecord>, top_n: usize) -> Result<AnalysisReport> {
    let filtered_ranked = rank_prices(filter_by_watchlist(&universe, watchlist));
    let negative_movers = select_all_negative(&filtered_ranked);

    let universe_ranked = rank_prices(universe);
    let top_movers = select_top_n(&universe_ranked, top_n)?;

    tracing::info!(
        watchlist_rows = filtered_ranked.len(),
        negative = negative_movers.len(),
        universe_rows = universe_ranked.len(),
        top = top_movers.len(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        top_n,
        filtered_ranked,
        negative_movers,
        top_movers,
    })
}

/// Runs the full analysis pipeline:
/// 1. Loads the watchlist and the price universe.
/// 2. Ranks the watchlist rows and picks out the all-negative ones.
/// 3. Ranks the whole universe and keeps the top `top_n`.
///
/// Any failure aborts the run; no partial report is returned.
pub fn run_analysis(watchlist_path: &Path, prices_path: &Path, top_n: usize) -> Result<AnalysisReport> {
    validate_top_n(top_n)?;

    let watchlist = load_watchlist(watchlist_path)?;
    let universe = load_price_universe(prices_path)?;

    analyze(&watchlist, universe, top_n)
}
