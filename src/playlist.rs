//! Playlist building from resolution results.
//!
//! Consumes the ordered [`SearchResult`]s produced by [`crate::resolver`]:
//! flattens their tracks, collects skipped items, filters good matches for the
//! dry-run command suggestion, and creates the playlist through a
//! [`PlaylistWriter`] in batches the service accepts.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Local};
use log::{debug, info, warn};

use crate::provider::ProviderError;
use crate::resolver::{ResolvedTrack, SearchResult, Thresholds};

/// Maximum number of URIs per "add items" request.
pub const ADD_BATCH_SIZE: usize = 100;

/// Description attached to every playlist this tool creates.
pub const PLAYLIST_DESCRIPTION: &str = "Created with spotify-tools";

/// Playlist-side operations of the streaming service.
pub trait PlaylistWriter {
    /// Id of the account playlists are created for.
    fn current_user_id(&mut self) -> Result<String, ProviderError>;

    /// Create an empty playlist, returning its id.
    fn create_playlist(
        &mut self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<String, ProviderError>;

    /// Append tracks.  Callers never pass more than [`ADD_BATCH_SIZE`] URIs.
    fn add_items(&mut self, playlist_id: &str, uris: &[String]) -> Result<(), ProviderError>;
}

/// All resolved tracks in result order, plus the queries that yielded none.
pub fn extract_tracks(results: &[SearchResult]) -> (Vec<ResolvedTrack>, Vec<String>) {
    let mut tracks = Vec::new();
    let mut skipped = Vec::new();

    for result in results {
        if result.is_skipped() {
            skipped.push(result.query.clone());
        } else {
            tracks.extend(result.resolved_tracks.iter().cloned());
        }
    }

    (tracks, skipped)
}

/// Tracks of results whose quality meets the good-match threshold.
pub fn good_match_tracks(results: &[SearchResult], thresholds: &Thresholds) -> Vec<ResolvedTrack> {
    results.iter()
        .filter(|r| thresholds.is_good_match(r.match_quality))
        .flat_map(|r| r.resolved_tracks.iter().cloned())
        .collect()
}

/// Results that should be flagged for review.
pub fn poor_matches<'a>(results: &'a [SearchResult], thresholds: &Thresholds) -> Vec<&'a SearchResult> {
    results.iter()
        .filter(|r| thresholds.is_poor_match(r.match_quality))
        .collect()
}

/// `"Playlist 2024-01-15 14:30"`
pub fn default_playlist_name(now: DateTime<Local>) -> String {
    format!("Playlist {}", now.format("%Y-%m-%d %H:%M"))
}

/// Create a private playlist holding `tracks`, in order.  Returns its id.
///
/// Uses [`default_playlist_name`] when `name` is `None` or empty.
pub fn create_playlist_from_tracks<W: PlaylistWriter + ?Sized>(
    writer: &mut W,
    tracks: &[ResolvedTrack],
    name: Option<&str>,
) -> Result<String, ProviderError> {
    let name = match name {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => default_playlist_name(Local::now()),
    };

    let user_id = writer.current_user_id()?;
    let playlist_id = writer.create_playlist(&user_id, &name, false, PLAYLIST_DESCRIPTION)?;
    info!("Created playlist \"{}\" ({})", name, playlist_id);

    let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();
    for (i, batch) in uris.chunks(ADD_BATCH_SIZE).enumerate() {
        debug!("Adding batch {} ({} tracks) to {}", i + 1, batch.len(), playlist_id);
        writer.add_items(&playlist_id, batch)?;
    }

    Ok(playlist_id)
}

/// What [`create_from_results`] did.
#[derive(Debug)]
pub struct CreateOutcome {
    pub playlist_id: String,
    /// Tracks added, in order
    pub tracks: Vec<ResolvedTrack>,
    /// Queries that produced no tracks
    pub skipped: Vec<String>,
    /// Outcome of writing the URI file, when one was requested
    pub uri_file: Option<io::Result<()>>,
}

/// Create the playlist from every resolved track, then optionally write the
/// same URIs to `output`.
///
/// A playlist is created even when nothing resolved.  A failed file write is
/// reported in the outcome, not as an error; the playlist already exists.
pub fn create_from_results<W: PlaylistWriter + ?Sized>(
    writer: &mut W,
    results: &[SearchResult],
    name: Option<&str>,
    output: Option<&Path>,
) -> Result<CreateOutcome, ProviderError> {
    let (tracks, skipped) = extract_tracks(results);
    if tracks.is_empty() {
        warn!("No tracks resolved, the playlist will be empty");
    }

    let playlist_id = create_playlist_from_tracks(writer, &tracks, name)?;
    let uri_file = output.map(|path| write_uris_to_file(path, &tracks));

    Ok(CreateOutcome { playlist_id, tracks, skipped, uri_file })
}

/// Write one track URI per line.
pub fn write_uris_to_file(path: &Path, tracks: &[ResolvedTrack]) -> io::Result<()> {
    let mut file = io::BufWriter::new(fs::File::create(path)?);
    for track in tracks {
        writeln!(file, "{}", track.uri)?;
    }
    file.flush()
}

/// Read items from a file: one per line, trimmed, blank lines dropped.
pub fn read_items_file(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
