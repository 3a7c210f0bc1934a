//! Sequential document numbering.
//!
//! Numbers look like `Q-0001` / `INV-0001`: an uppercase prefix, a dash and a
//! zero-padded numeric suffix that widens past four digits (`Q-10000`).
//!
//! The generator derives the next number from the most recently created
//! document of the same kind. It is a pure function; the caller is expected
//! to fetch the latest document inside the same transaction that inserts the
//! new one. The read-compute-insert sequence is not atomic across
//! transactions, so the storage layer's uniqueness constraint is the real
//! guard: a losing writer sees `DuplicateKey` and may retry.

use serde::{Deserialize, Serialize};

/// The two document families that carry sequential numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Quotation,
    Invoice,
}

impl DocumentKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Quotation => "Q",
            DocumentKind::Invoice => "INV",
        }
    }

    /// First number handed out when no prior document exists.
    pub fn seed(&self) -> String {
        format!("{}-0001", self.prefix())
    }
}

impl core::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DocumentKind::Quotation => f.write_str("quotation"),
            DocumentKind::Invoice => f.write_str("invoice"),
        }
    }
}

/// Derive the next document number from the latest existing one.
///
/// `latest` is the number of the most recently *created* document of this
/// kind (creation-time order, not numeric order). With no prior document the
/// kind's seed is returned. A latest number whose suffix after the last `-`
/// is not numeric (or cannot be incremented without overflowing) resets to
/// the seed instead of failing; this mirrors the
/// behavior the rest of the system is pinned to and can hand out a number
/// that already exists, which the storage uniqueness constraint then
/// rejects.
pub fn next_number(kind: DocumentKind, latest: Option<&str>) -> String {
    let Some(latest) = latest else {
        return kind.seed();
    };

    match parse_suffix(latest).and_then(|n| n.checked_add(1)) {
        Some(next) => format!("{}-{next:04}", kind.prefix()),
        None => kind.seed(),
    }
}

fn parse_suffix(number: &str) -> Option<u64> {
    let (_, suffix) = number.rsplit_once('-')?;
    suffix.parse::<u64>().ok()
}
