use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Maximum number of chunks returned by [`ChunkStore::latest`](crate::ChunkStore::latest).
pub const LATEST_LIMIT: usize = 10;

/// A stored text entry with a bounded visibility window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Store-assigned identifier, unique and never reused.
    pub id: i64,
    /// Short title shown in listings.
    pub title: String,
    /// Body text. May contain newlines.
    pub content: String,
    /// When the chunk was inserted (UTC).
    pub created: DateTime<Utc>,
    /// End of the visibility window (exclusive).
    pub expires: DateTime<Utc>,
}

impl Chunk {
    /// Whether the chunk is readable at `now`, i.e. `now < expires`.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires
    }
}

/// Input for [`ChunkStore::insert`](crate::ChunkStore::insert).
///
/// Timestamps are not part of the input: the store stamps `created` itself
/// and derives `expires` from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChunk {
    pub title: String,
    pub content: String,
    /// Length of the visibility window in days. Must be `>= 0`.
    pub expires_days: i64,
}

impl NewChunk {
    pub fn new(title: impl Into<String>, content: impl Into<String>, expires_days: i64) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            expires_days,
        }
    }

    /// Reject input the store will not persist.
    ///
    /// Empty titles or contents, negative day counts, and day counts whose
    /// expiry would fall outside the representable timestamp range all
    /// produce [`StoreError::InvalidArgument`]. Whitespace is not trimmed here.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.title.is_empty() {
            return Err(StoreError::InvalidArgument("title must not be empty".into()));
        }
        if self.content.is_empty() {
            return Err(StoreError::InvalidArgument(
                "content must not be empty".into(),
            ));
        }
        self.expiry_from(Utc::now()).map(|_| ())
    }

    /// Compute `created + expires_days` days.
    pub fn expiry_from(&self, created: DateTime<Utc>) -> Result<DateTime<Utc>, StoreError> {
        if self.expires_days < 0 {
            return Err(StoreError::InvalidArgument(format!(
                "expires must be a non-negative number of days, got {}",
                self.expires_days
            )));
        }
        Duration::try_days(self.expires_days)
            .and_then(|window| created.checked_add_signed(window))
            .ok_or_else(|| {
                StoreError::InvalidArgument(format!(
                    "expires of {} days is out of range",
                    self.expires_days
                ))
            })
    }
}
