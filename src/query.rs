//! Item classification.
//!
//! Turns one raw input line ("Bohemian Rhapsody", "album:Dark Side of the Moon",
//! "spotify:track:4u7EnebtmKWzUH433cf5Qv") into an [`ItemKind`] and the text
//! that should be searched for.  Classification never fails.

use std::fmt;

/// URI scheme handled as a direct reference instead of a search.
pub const URI_SCHEME: &str = "spotify:";

const ALBUM_PREFIX: &str = "album:";
const SINGLE_PREFIX: &str = "single:";
const TRACK_PREFIX: &str = "track:";

/// How an item should be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Direct `spotify:` URI
    Uri,
    /// Explicit `track:` request
    Track,
    /// Explicit `album:` or `single:` request
    Album,
    /// No prefix: try tracks first, then albums
    Auto,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemKind::Uri => "uri",
            ItemKind::Track => "track",
            ItemKind::Album => "album",
            ItemKind::Auto => "auto",
        };
        f.write_str(s)
    }
}

/// A classified input item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    pub kind: ItemKind,
    /// Residual search text, or the full URI for [`ItemKind::Uri`]
    pub text: String,
}

/// Classify a raw item string.
///
/// Leading/trailing whitespace is ignored.  At most one prefix is stripped, so
/// `"track:album:X"` is a track search for `"album:X"`.
pub fn classify(raw: &str) -> ParsedItem {
    let trimmed = raw.trim();

    if trimmed.starts_with(URI_SCHEME) {
        return ParsedItem { kind: ItemKind::Uri, text: trimmed.to_string() };
    }

    // single: is treated exactly like album:
    let prefixes = [
        (ALBUM_PREFIX, ItemKind::Album),
        (SINGLE_PREFIX, ItemKind::Album),
        (TRACK_PREFIX, ItemKind::Track),
    ];
    for (prefix, kind) in prefixes {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return ParsedItem { kind, text: rest.trim().to_string() };
        }
    }

    ParsedItem { kind: ItemKind::Auto, text: trimmed.to_string() }
}

/// Sub-type of a `spotify:` URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriKind {
    Track,
    Album,
}

/// A URI that can be resolved directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriRef<'a> {
    pub kind: UriKind,
    pub id: &'a str,
}

/// Split a `spotify:<type>:<id>` URI.
///
/// The type is the second segment and the id is the last one.  Returns `None`
/// for unsupported types (playlists, artists, users, …) and for ids that are
/// empty or not base62.
pub fn parse_uri(uri: &str) -> Option<UriRef<'_>> {
    let mut segments = uri.split(':');
    if segments.next()? != URI_SCHEME.trim_end_matches(':') {
        return None;
    }
    let kind = match segments.next()? {
        "track" => UriKind::Track,
        "album" => UriKind::Album,
        _ => return None,
    };
    let id = uri.rsplit(':').next()?.trim();
    // Ids end up in request paths
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(UriRef { kind, id })
}
