//! Symbol catalogue: sector-organized reference list of tradable symbols.
//!
//! Static data only. Lookups are linear scans; the list is small enough that
//! an index would cost more than it saves.

use serde::Serialize;

/// Maximum number of hits returned by [`search`].
pub const SEARCH_LIMIT: usize = 20;

/// One catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SymbolInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    pub sector: &'static str,
}

/// Sector name with its member count, as listed by [`sectors`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorSummary {
    pub name: &'static str,
    pub count: usize,
}

const fn entry(symbol: &'static str, name: &'static str, sector: &'static str) -> SymbolInfo {
    SymbolInfo {
        symbol,
        name,
        sector,
    }
}

static CATALOGUE: &[SymbolInfo] = &[
    entry("AAPL", "Apple Inc.", "Technology"),
    entry("MSFT", "Microsoft Corporation", "Technology"),
    entry("GOOGL", "Alphabet Inc.", "Technology"),
    entry("AMZN", "Amazon.com Inc.", "Technology"),
    entry("META", "Meta Platforms Inc.", "Technology"),
    entry("NVDA", "NVIDIA Corporation", "Technology"),
    entry("TSLA", "Tesla Inc.", "Technology"),
    entry("AMD", "Advanced Micro Devices", "Technology"),
    entry("INTC", "Intel Corporation", "Technology"),
    entry("CRM", "Salesforce Inc.", "Technology"),
    entry("ORCL", "Oracle Corporation", "Technology"),
    entry("ADBE", "Adobe Inc.", "Technology"),
    entry("CSCO", "Cisco Systems", "Technology"),
    entry("IBM", "IBM Corporation", "Technology"),
    entry("NFLX", "Netflix Inc.", "Technology"),
    entry("JPM", "JPMorgan Chase", "Finance"),
    entry("BAC", "Bank of America", "Finance"),
    entry("WFC", "Wells Fargo", "Finance"),
    entry("GS", "Goldman Sachs", "Finance"),
    entry("MS", "Morgan Stanley", "Finance"),
    entry("V", "Visa Inc.", "Finance"),
    entry("MA", "Mastercard Inc.", "Finance"),
    entry("AXP", "American Express", "Finance"),
    entry("C", "Citigroup Inc.", "Finance"),
    entry("BLK", "BlackRock Inc.", "Finance"),
    entry("JNJ", "Johnson & Johnson", "Healthcare"),
    entry("UNH", "UnitedHealth Group", "Healthcare"),
    entry("PFE", "Pfizer Inc.", "Healthcare"),
    entry("MRK", "Merck & Co.", "Healthcare"),
    entry("ABBV", "AbbVie Inc.", "Healthcare"),
    entry("LLY", "Eli Lilly", "Healthcare"),
    entry("TMO", "Thermo Fisher", "Healthcare"),
    entry("ABT", "Abbott Laboratories", "Healthcare"),
    entry("BMY", "Bristol-Myers Squibb", "Healthcare"),
    entry("AMGN", "Amgen Inc.", "Healthcare"),
    entry("WMT", "Walmart Inc.", "Consumer"),
    entry("PG", "Procter & Gamble", "Consumer"),
    entry("KO", "Coca-Cola Company", "Consumer"),
    entry("PEP", "PepsiCo Inc.", "Consumer"),
    entry("COST", "Costco Wholesale", "Consumer"),
    entry("HD", "Home Depot", "Consumer"),
    entry("MCD", "McDonald's Corp.", "Consumer"),
    entry("NKE", "Nike Inc.", "Consumer"),
    entry("SBUX", "Starbucks Corp.", "Consumer"),
    entry("TGT", "Target Corporation", "Consumer"),
    entry("XOM", "Exxon Mobil", "Energy"),
    entry("CVX", "Chevron Corporation", "Energy"),
    entry("COP", "ConocoPhillips", "Energy"),
    entry("SLB", "Schlumberger", "Energy"),
    entry("EOG", "EOG Resources", "Energy"),
    entry("^GSPC", "S&P 500", "Indices"),
    entry("^DJI", "Dow Jones", "Indices"),
    entry("^IXIC", "NASDAQ", "Indices"),
    entry("^RUT", "Russell 2000", "Indices"),
    entry("RELIANCE.NS", "Reliance Industries", "Indian"),
    entry("TCS.NS", "Tata Consultancy Services", "Indian"),
    entry("INFY.NS", "Infosys Limited", "Indian"),
    entry("HDFCBANK.NS", "HDFC Bank", "Indian"),
    entry("ICICIBANK.NS", "ICICI Bank", "Indian"),
    entry("WIPRO.NS", "Wipro Limited", "Indian"),
    entry("BHARTIARTL.NS", "Bharti Airtel", "Indian"),
    entry("ITC.NS", "ITC Limited", "Indian"),
    entry("SBIN.NS", "State Bank of India", "Indian"),
    entry("TATAMOTORS.NS", "Tata Motors", "Indian"),
];

/// Every catalogue entry, in catalogue order.
pub fn all() -> &'static [SymbolInfo] {
    CATALOGUE
}

/// Entries of one sector (case-insensitive sector name).
pub fn by_sector(sector: &str) -> Vec<SymbolInfo> {
    CATALOGUE
        .iter()
        .filter(|info| info.sector.eq_ignore_ascii_case(sector.trim()))
        .copied()
        .collect()
}

/// Sector names with member counts, in catalogue order.
pub fn sectors() -> Vec<SectorSummary> {
    let mut out: Vec<SectorSummary> = Vec::new();
    for info in CATALOGUE {
        match out.iter_mut().find(|s| s.name == info.sector) {
            Some(summary) => summary.count += 1,
            None => out.push(SectorSummary {
                name: info.sector,
                count: 1,
            }),
        }
    }
    out
}

/// Case-insensitive substring search over symbol and name.
///
/// Returns at most [`SEARCH_LIMIT`] hits. A blank query matches nothing.
pub fn search(query: &str) -> Vec<SymbolInfo> {
    let needle = query.trim().to_uppercase();
    if needle.is_empty() {
        return Vec::new();
    }
    CATALOGUE
        .iter()
        .filter(|info| {
            info.symbol.to_uppercase().contains(&needle)
                || info.name.to_uppercase().contains(&needle)
        })
        .take(SEARCH_LIMIT)
        .copied()
        .collect()
}

/// Exact (case-insensitive) symbol lookup.
pub fn lookup(symbol: &str) -> Option<SymbolInfo> {
    CATALOGUE
        .iter()
        .find(|info| info.symbol.eq_ignore_ascii_case(symbol.trim()))
        .copied()
}
