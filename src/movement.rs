use serde::Serialize;

// --- Data Structures ---

/// The three fixed comparison periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    OneDay,
    OneMonth,
    OneYear,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::OneDay, Horizon::OneMonth, Horizon::OneYear];

    pub fn label(self) -> &'static str {
        match self {
            Horizon::OneDay => "1 Day %",
            Horizon::OneMonth => "1 Month %",
            Horizon::OneYear => "1 Year %",
        }
    }
}

/// One row of the price universe.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub symbol: String,
    pub close: f64,
    pub close_1d_ago: f64,
    pub close_1mo_ago: f64,
    pub close_1yr_ago: f64,
}

impl PriceRecord {
    pub fn reference_close(&self, horizon: Horizon) -> f64 {
        match horizon {
            Horizon::OneDay => self.close_1d_ago,
            Horizon::OneMonth => self.close_1mo_ago,
            Horizon::OneYear => self.close_1yr_ago,
        }
    }
}

/// A price record with its derived percentage moves.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MovementRecord {
    #[serde(flatten)]
    pub price: PriceRecord,
    pub pct_1d: f64,
    pub pct_1mo: f64,
    pub pct_1yr: f64,
}

impl MovementRecord {
    pub fn symbol(&self) -> &str {
        &self.price.symbol
    }

    pub fn pct(&self, horizon: Horizon) -> f64 {
        match horizon {
            Horizon::OneDay => self.pct_1d,
            Horizon::OneMonth => self.pct_1mo,
            Horizon::OneYear => self.pct_1yr,
        }
    }
}

// --- Domain Logic ---

/// Percentage change from `reference` to `close`.
///
/// A zero reference has no meaningful move and yields NaN, as does any NaN
/// input (blank cells are read as NaN).
pub fn percentage_change(close: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return f64::NAN;
    }
    (close - reference) / reference * 100.0
}

fn derive(price: PriceRecord) -> MovementRecord {
    let pct = |h: Horizon| percentage_change(price.close, price.reference_close(h));
    let pct_1d = pct(Horizon::OneDay);
    let pct_1mo = pct(Horizon::OneMonth);
    let pct_1yr = pct(Horizon::OneYear);

    MovementRecord {
        price,
        pct_1d,
        pct_1mo,
        pct_1yr,
    }
}

/// Derives the three percentage columns for every record, keeping input order.
pub fn compute_movements(records: Vec<PriceRecord>) -> Vec<MovementRecord> {
    records.into_iter().map(derive).collect()
}

#[cfg(test)]
pub(crate) fn price(symbol: &str, close: f64, d: f64, m: f64, y: f64) -> PriceRecord {
    PriceRecord {
        symbol: symbol.to_string(),
        close,
        close_1d_ago: d,
        close_1mo_ago: m,
        close_1yr_ago: y,
    }
}
