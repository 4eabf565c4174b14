//! Search provider interface.
//!
//! The resolver only needs five operations from the streaming service.  They
//! are expressed as the [`SearchProvider`] trait so the same resolution logic
//! runs against the HTTP client ([`crate::spotify::SpotifyClient`]), a cache,
//! or an in-memory fake in tests.
//!
//! An empty candidate list is a normal `Ok` outcome.  Errors are split into
//! [`ProviderError::NotFound`] and [`ProviderError::Transient`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The requested id does not exist (or is not accessible)
    #[error("not found: {0}")]
    NotFound(String),

    /// Network failure, unexpected status, malformed response, …
    #[error("{0}")]
    Transient(String),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}

/// A playable track as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: String,
    /// e.g. `spotify:track:4u7EnebtmKWzUH433cf5Qv`
    pub uri: String,
    pub name: String,
    /// Artist display names, in credit order
    pub artists: Vec<String>,
}

/// An album (or single/EP) as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub artists: Vec<String>,
    /// Track count reported by the service, when known
    #[serde(default)]
    pub total_tracks: Option<u32>,
}

/// Join artist names the way they are displayed everywhere: `"Queen, David Bowie"`.
pub fn format_artists(artists: &[String]) -> String {
    artists.join(", ")
}

impl TrackRecord {
    pub fn artists_display(&self) -> String {
        format_artists(&self.artists)
    }
}

impl AlbumRecord {
    pub fn artists_display(&self) -> String {
        format_artists(&self.artists)
    }
}

/// The streaming-service operations the resolver depends on.
///
/// All calls are blocking.  Timeouts, retries and rate limiting are the
/// implementation's business.
pub trait SearchProvider {
    /// Search tracks; returns at most `limit` candidates, best first.
    fn search_tracks(&mut self, query: &str, limit: u32) -> Result<Vec<TrackRecord>, ProviderError>;

    /// Search albums (including singles and EPs); at most `limit` candidates.
    fn search_albums(&mut self, query: &str, limit: u32) -> Result<Vec<AlbumRecord>, ProviderError>;

    /// Fetch one track by id.
    fn get_track(&mut self, id: &str) -> Result<TrackRecord, ProviderError>;

    /// Fetch one album by id.
    fn get_album(&mut self, id: &str) -> Result<AlbumRecord, ProviderError>;

    /// Every track of an album, in album order.
    fn list_album_tracks(&mut self, album_id: &str) -> Result<Vec<TrackRecord>, ProviderError>;
}
