use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pma")]
#[command(about = "Price Movement Analyzer: rank watchlist movers against the full price universe", long_about = None)]
pub struct Cli {
    /// Watchlist CSV (needs a `Ticker` column) [default: ticker_list.csv]
    pub watchlist: Option<PathBuf>,

    /// Price CSV (Ticker, Close, One_Day_Ago_Close, One_Month_Ago_Close, One_Year_Ago_Close) [default: ticker_prices.csv]
    pub prices: Option<PathBuf>,

    /// Number of top movers to list from the whole price universe [default: 5]
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,

    /// Directory holding config.json and exported results [default: storage/ next to the binary]
    #[arg(long)]
    pub storage: Option<PathBuf>,

    /// Run a single analysis, print it and exit instead of opening the menu
    #[arg(long)]
    pub once: bool,

    /// Save every analysis as results.json in the storage directory
    #[arg(long)]
    pub export: bool,
}
