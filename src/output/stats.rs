//! Statistics over the page store
//!
//! Reports how many records each site's store holds, for `--stats`.

use crate::storage::{PageStore, StoreResult};

/// Record counts per site store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    /// `(site, record count)` sorted by site name
    pub sites: Vec<(String, usize)>,

    /// Sum of all record counts
    pub total_records: usize,

    /// Records whose content is empty
    pub empty_pages: usize,
}

/// Loads statistics from a page store
pub async fn load_statistics(store: &dyn PageStore) -> StoreResult<StoreStatistics> {
    let mut stats = StoreStatistics::default();

    for site in store.list_sites().await? {
        let records = store.read_site(&site).await?;
        stats.total_records += records.len();
        stats.empty_pages += records.iter().filter(|r| r.content.is_empty()).count();
        stats.sites.push((site, records.len()));
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    if stats.sites.is_empty() {
        println!("No sites stored yet.");
        return;
    }

    println!("Sites ({}):", stats.sites.len());
    let width = stats.sites.iter().map(|(s, _)| s.len()).max().unwrap_or(0);
    for (site, count) in &stats.sites {
        println!("  {:<width$}  {}", site, count, width = width);
    }
    println!();
    println!("Total records: {}", stats.total_records);
    if stats.empty_pages > 0 {
        println!("Records with no text: {}", stats.empty_pages);
    }
}
