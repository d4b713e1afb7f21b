use media_sync_models::WatchlistEntry;

/// A sorted watchlist split at the capacity bound
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Oldest entries beyond the bound; archived then removed
    pub overflow: Vec<WatchlistEntry>,
    /// Newest `capacity` entries; left untouched
    pub retained: Vec<WatchlistEntry>,
}

/// Split an already sorted watchlist. Order is preserved within both halves.
pub fn partition(mut entries: Vec<WatchlistEntry>, capacity: usize) -> Partition {
    if entries.len() <= capacity {
        return Partition {
            overflow: Vec::new(),
            retained: entries,
        };
    }

    let retained = entries.split_off(entries.len() - capacity);
    Partition {
        overflow: entries,
        retained,
    }
}
