//! Incremental key-space enumeration

use std::collections::HashSet;

use crate::client::{KvClient, ScanCursor};
use crate::error::Result;

/// Collect every key matching `pattern` with cursor-based `SCAN`.
///
/// Pages of at most `page_size` keys are requested until the store returns a
/// terminal cursor. `SCAN` may return a key more than once, so results are
/// deduplicated; order is not meaningful. Keys written or removed while the
/// scan runs may or may not be reported. The first failing page aborts the
/// whole enumeration.
pub async fn all_keys<C>(client: &C, pattern: &str, page_size: usize) -> Result<Vec<String>>
where
    C: KvClient + ?Sized,
{
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    let mut cursor = ScanCursor::start();
    let mut pages = 0usize;

    loop {
        let page = client.scan(&cursor, pattern, page_size).await?;
        pages += 1;

        for key in page.keys {
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }

        if page.cursor.is_terminal() {
            break;
        }
        cursor = page.cursor;
    }

    tracing::debug!(pattern, pages, keys = keys.len(), "scan complete");
    Ok(keys)
}
