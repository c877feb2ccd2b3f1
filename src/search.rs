use tracing::{info, warn};

use crate::domain::{EntryId, ExperimentalMethod};
use crate::rcsb::RcsbClient;

pub const DEFAULT_PAGE_SIZE: usize = 100;

pub struct IdentifierLister<'a, C: RcsbClient + ?Sized> {
    client: &'a C,
    methods: &'a [ExperimentalMethod],
    page_size: usize,
}

impl<'a, C: RcsbClient + ?Sized> IdentifierLister<'a, C> {
    pub fn new(client: &'a C, methods: &'a [ExperimentalMethod], page_size: usize) -> Self {
        Self {
            client,
            methods,
            page_size: page_size.max(1),
        }
    }

    /// Pages through the search results until `target_count` identifiers are
    /// collected or the service runs dry. A failed page ends pagination; whatever
    /// was collected before it is returned.
    pub fn list_identifiers(&self, target_count: usize) -> Vec<EntryId> {
        let mut ids = Vec::new();
        let mut start = 0usize;

        while ids.len() < target_count {
            let rows = self.page_size.min(target_count - start);
            let page = start / self.page_size + 1;
            info!(page, start, rows, "fetching entry id page");

            let batch = match self.client.search_entry_ids(self.methods, start, rows) {
                Ok(batch) => batch,
                Err(err) => {
                    warn!(page, error = %err, "search page failed; stopping pagination");
                    break;
                }
            };
            if batch.is_empty() {
                info!(page, "no more results available");
                break;
            }

            info!(page, received = batch.len(), "received entry ids");
            ids.extend(batch);
            start += self.page_size;
            if start >= target_count {
                break;
            }
        }

        ids.truncate(target_count);
        ids
    }
}
