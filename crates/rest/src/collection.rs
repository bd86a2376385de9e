//! Paginated result sets.

use crate::client::Client;
use crate::error::Result;
use crate::record::Record;

/// One page of query or search results, with opaque cursors to its
/// neighbors.
///
/// A collection keeps a clone of the client that produced it, so cursor
/// URLs are always replayed through their originating engine and inherit
/// its session and token renewal. Cursor URLs are never parsed or
/// validated locally.
#[derive(Debug, Clone)]
pub struct Collection {
    total_size: u64,
    records: Vec<Record>,
    next_url: Option<String>,
    previous_url: Option<String>,
    current_url: Option<String>,
    client: Client,
}

impl Collection {
    pub(crate) fn new(
        client: Client,
        total_size: u64,
        records: Vec<Record>,
        next_url: Option<String>,
        previous_url: Option<String>,
        current_url: Option<String>,
    ) -> Self {
        Self {
            total_size,
            records,
            next_url,
            previous_url,
            current_url,
            client,
        }
    }

    /// An empty terminal collection: no records, no cursors.
    pub(crate) fn empty(client: Client) -> Self {
        Self::new(client, 0, vec![], None, None, None)
    }

    /// Total number of records matching the originating request, across
    /// all pages.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// The records on this page.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the page, yielding its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Number of records on this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when this page holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true when a following page exists.
    pub fn has_next(&self) -> bool {
        self.next_url.is_some()
    }

    /// Returns true when a preceding page exists.
    pub fn has_previous(&self) -> bool {
        self.previous_url.is_some()
    }

    /// The opaque cursor to the following page, if any.
    pub fn next_url(&self) -> Option<&str> {
        self.next_url.as_deref()
    }

    /// The opaque cursor to the preceding page, if any.
    pub fn previous_url(&self) -> Option<&str> {
        self.previous_url.as_deref()
    }

    /// The cursor this page was fetched from, if it came from one.
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Fetch the following page. Without a cursor this returns an empty
    /// terminal collection and performs no network call.
    pub async fn next(&self) -> Result<Collection> {
        match &self.next_url {
            Some(url) => self.client.next_page(url).await,
            None => Ok(Collection::empty(self.client.clone())),
        }
    }

    /// Fetch the preceding page. Without a cursor this returns an empty
    /// terminal collection and performs no network call.
    pub async fn previous(&self) -> Result<Collection> {
        match &self.previous_url {
            Some(url) => self.client.previous_page(url).await,
            None => Ok(Collection::empty(self.client.clone())),
        }
    }
}
