//! Item resolution: free-text queries and URIs → playable tracks.
//!
//! Each input item is classified ([`crate::query::classify`]) and resolved
//! independently, in input order:
//!
//! * **URI** – fetched directly; quality is 1.0 on success
//! * **track:** – best track hit, kept when its quality clears the inclusion
//!   threshold
//! * **album:** / **single:** – best album hit, all of its tracks kept when the
//!   album clears the inclusion threshold
//! * **auto** – track search first; the album search only runs when the track
//!   hit is not clearly good enough
//!
//! Provider failures never escape: they end up as a zero-quality
//! [`SearchResult`] with an explanatory reason, so one bad item cannot fail
//! the batch.

use std::fmt;

use log::{debug, warn};

use crate::match_quality;
use crate::provider::{format_artists, AlbumRecord, ProviderError, SearchProvider, TrackRecord};
use crate::query::{self, ItemKind, UriKind};

/// Candidates requested per search call.
pub const SEARCH_LIMIT: u32 = 1;

// ── Policy constants ─────────────────────────────────────────────────────────

/// A search hit contributes tracks only when quality is strictly above this.
pub const INCLUDE_THRESHOLD: f64 = 0.2;
/// Tracks of results at or above this go into the "good matches" playlist.
pub const GOOD_MATCH_THRESHOLD: f64 = 0.3;
/// Auto mode accepts a hit without trying the other strategy above this.
pub const AUTO_ACCEPT_THRESHOLD: f64 = 0.4;
/// Results below this are flagged for review in dry-run output.
pub const POOR_MATCH_THRESHOLD: f64 = 0.4;

/// The quality cut-offs used by resolution and playlist building.
///
/// The four values are independent; the comparison operators are fixed:
/// inclusion and auto-accept are strict (`>`), good-match is inclusive (`>=`),
/// the poor-match flag is strict (`<`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub include: f64,
    pub good_match: f64,
    pub auto_accept: f64,
    pub poor_match: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            include: INCLUDE_THRESHOLD,
            good_match: GOOD_MATCH_THRESHOLD,
            auto_accept: AUTO_ACCEPT_THRESHOLD,
            poor_match: POOR_MATCH_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn includes(&self, quality: f64) -> bool {
        quality > self.include
    }

    pub fn is_good_match(&self, quality: f64) -> bool {
        quality >= self.good_match
    }

    pub fn auto_accepts(&self, quality: f64) -> bool {
        quality > self.auto_accept
    }

    pub fn is_poor_match(&self, quality: f64) -> bool {
        quality < self.poor_match
    }
}

// ── Result types ─────────────────────────────────────────────────────────────

/// One playable track attributed to the item that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub uri: String,
    pub name: String,
    /// Comma-joined artist names
    pub artists: String,
    /// `"track:<text>"`, `"album:<text>"` or the URI itself
    pub source_query: String,
}

impl ResolvedTrack {
    fn from_record(track: &TrackRecord, source_query: &str) -> Self {
        ResolvedTrack {
            uri: track.uri.clone(),
            name: track.name.clone(),
            artists: format_artists(&track.artists),
            source_query: source_query.to_string(),
        }
    }
}

/// What a search or URI lookup actually hit.
#[derive(Debug, Clone, PartialEq)]
pub enum FoundItem {
    Track(TrackRecord),
    Album(AlbumRecord),
    /// Direct URI reference
    Uri(String),
}

impl FoundItem {
    /// Display name of the hit (the URI for direct references).
    pub fn name(&self) -> &str {
        match self {
            FoundItem::Track(t) => &t.name,
            FoundItem::Album(a) => &a.name,
            FoundItem::Uri(uri) => uri,
        }
    }

    /// Comma-joined artists; empty for direct references.
    pub fn artists(&self) -> String {
        match self {
            FoundItem::Track(t) => t.artists_display(),
            FoundItem::Album(a) => a.artists_display(),
            FoundItem::Uri(_) => String::new(),
        }
    }
}

/// Which strategy won in auto mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoOutcome {
    FoundTrack,
    FoundAlbum,
    WeakTrack,
    WeakAlbum,
}

/// How a result was obtained.  Displays as `"uri"`, `"track"`, `"album"` or
/// `"auto (found track)"` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Uri,
    Track,
    Album,
    Auto(AutoOutcome),
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SearchKind::Uri => "uri",
            SearchKind::Track => "track",
            SearchKind::Album => "album",
            SearchKind::Auto(AutoOutcome::FoundTrack) => "auto (found track)",
            SearchKind::Auto(AutoOutcome::FoundAlbum) => "auto (found album)",
            SearchKind::Auto(AutoOutcome::WeakTrack) => "auto (weak track match)",
            SearchKind::Auto(AutoOutcome::WeakAlbum) => "auto (weak album match)",
        };
        f.write_str(s)
    }
}

/// Outcome of resolving one input item.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Search text after prefix stripping, or the full URI
    pub query: String,
    pub search_kind: SearchKind,
    /// Present whenever the provider returned a hit, even a rejected one
    pub found_item: Option<FoundItem>,
    /// `[0, 1]`
    pub match_quality: f64,
    pub quality_reason: String,
    /// Empty for skipped items
    pub resolved_tracks: Vec<ResolvedTrack>,
}

impl SearchResult {
    fn failed(query: &str, search_kind: SearchKind, reason: String) -> Self {
        SearchResult {
            query: query.to_string(),
            search_kind,
            found_item: None,
            match_quality: 0.0,
            quality_reason: reason,
            resolved_tracks: Vec::new(),
        }
    }

    fn no_results(query: &str, search_kind: SearchKind) -> Self {
        Self::failed(query, search_kind, "No results found".to_string())
    }

    fn search_error(query: &str, search_kind: SearchKind, err: &ProviderError) -> Self {
        Self::failed(query, search_kind, format!("Search error: {}", err))
    }

    fn with_kind(self, search_kind: SearchKind) -> Self {
        SearchResult { search_kind, ..self }
    }

    /// No tracks were resolved for this item.
    pub fn is_skipped(&self) -> bool {
        self.resolved_tracks.is_empty()
    }
}

// ── Resolver ─────────────────────────────────────────────────────────────────

/// Resolves items against a [`SearchProvider`].  Holds no per-call state, so
/// resolving the same items twice against a stable provider gives identical
/// results.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    thresholds: Thresholds,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Resolver { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Resolve every item, one result per item, in input order.
    pub fn resolve_items<P, S>(&self, provider: &mut P, items: &[S]) -> Vec<SearchResult>
    where
        P: SearchProvider + ?Sized,
        S: AsRef<str>,
    {
        items.iter()
            .map(|item| self.resolve_item(provider, item.as_ref()))
            .collect()
    }

    /// Classify and resolve a single raw item.
    pub fn resolve_item<P: SearchProvider + ?Sized>(&self, provider: &mut P, raw: &str) -> SearchResult {
        let parsed = query::classify(raw);
        debug!("Resolving {:?} as {} search for \"{}\"", raw, parsed.kind, parsed.text);

        let result = match parsed.kind {
            ItemKind::Uri => self.resolve_uri(provider, &parsed.text),
            ItemKind::Track => self.search_track(provider, &parsed.text),
            ItemKind::Album => self.search_album(provider, &parsed.text),
            ItemKind::Auto => self.search_auto(provider, &parsed.text),
        };

        debug!(
            "  -> {} {:.2} \"{}\" ({} tracks)",
            result.search_kind,
            result.match_quality,
            result.quality_reason,
            result.resolved_tracks.len()
        );
        result
    }

    /// Resolve a `spotify:track:` or `spotify:album:` URI.
    pub fn resolve_uri<P: SearchProvider + ?Sized>(&self, provider: &mut P, uri: &str) -> SearchResult {
        match uri_tracks(provider, uri) {
            Ok(tracks) if !tracks.is_empty() => SearchResult {
                query: uri.to_string(),
                search_kind: SearchKind::Uri,
                found_item: Some(FoundItem::Uri(uri.to_string())),
                match_quality: 1.0,
                quality_reason: "Direct URI match".to_string(),
                resolved_tracks: tracks,
            },
            Ok(_) => {
                warn!("URI {} resolved to no tracks", uri);
                SearchResult::failed(uri, SearchKind::Uri, "Invalid or inaccessible URI".to_string())
            }
            Err(e) => {
                warn!("Could not resolve URI {}: {}", uri, e);
                SearchResult::failed(uri, SearchKind::Uri, "Invalid or inaccessible URI".to_string())
            }
        }
    }

    /// Search for the best matching track.
    pub fn search_track<P: SearchProvider + ?Sized>(&self, provider: &mut P, query: &str) -> SearchResult {
        let candidates = match provider.search_tracks(query, SEARCH_LIMIT) {
            Ok(c) => c,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => {
                warn!("Track search for \"{}\" failed: {}", query, e);
                return SearchResult::search_error(query, SearchKind::Track, &e);
            }
        };

        let track = match candidates.into_iter().next() {
            Some(t) => t,
            None => return SearchResult::no_results(query, SearchKind::Track),
        };

        let score = match_quality::score(query, &track.name, &track.artists_display());

        let resolved_tracks = if self.thresholds.includes(score.quality) {
            vec![ResolvedTrack::from_record(&track, &format!("track:{}", query))]
        } else {
            Vec::new()
        };

        SearchResult {
            query: query.to_string(),
            search_kind: SearchKind::Track,
            found_item: Some(FoundItem::Track(track)),
            match_quality: score.quality,
            quality_reason: score.reason,
            resolved_tracks,
        }
    }

    /// Search for the best matching album (or single/EP) and take all its tracks.
    pub fn search_album<P: SearchProvider + ?Sized>(&self, provider: &mut P, query: &str) -> SearchResult {
        let candidates = match provider.search_albums(query, SEARCH_LIMIT) {
            Ok(c) => c,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => {
                warn!("Album search for \"{}\" failed: {}", query, e);
                return SearchResult::search_error(query, SearchKind::Album, &e);
            }
        };

        let album = match candidates.into_iter().next() {
            Some(a) => a,
            None => return SearchResult::no_results(query, SearchKind::Album),
        };

        let score = match_quality::score(query, &album.name, &album.artists_display());

        let mut resolved_tracks = Vec::new();
        if self.thresholds.includes(score.quality) {
            let source_query = format!("album:{}", query);
            match provider.list_album_tracks(&album.id) {
                Ok(tracks) => {
                    resolved_tracks = tracks.iter()
                        .map(|t| ResolvedTrack::from_record(t, &source_query))
                        .collect();
                }
                Err(e) => {
                    // Album stays reported as found, just without tracks
                    warn!("Found album \"{}\" but could not list its tracks: {}", album.name, e);
                }
            }
        }

        SearchResult {
            query: query.to_string(),
            search_kind: SearchKind::Album,
            found_item: Some(FoundItem::Album(album)),
            match_quality: score.quality,
            quality_reason: score.reason,
            resolved_tracks,
        }
    }

    /// Track search first, album search only if the track hit is not good enough.
    pub fn search_auto<P: SearchProvider + ?Sized>(&self, provider: &mut P, query: &str) -> SearchResult {
        let track_result = self.search_track(provider, query);
        if self.thresholds.auto_accepts(track_result.match_quality) {
            return track_result.with_kind(SearchKind::Auto(AutoOutcome::FoundTrack));
        }

        let album_result = self.search_album(provider, query);
        if self.thresholds.auto_accepts(album_result.match_quality) {
            return album_result.with_kind(SearchKind::Auto(AutoOutcome::FoundAlbum));
        }

        if track_result.match_quality >= album_result.match_quality {
            track_result.with_kind(SearchKind::Auto(AutoOutcome::WeakTrack))
        } else {
            album_result.with_kind(SearchKind::Auto(AutoOutcome::WeakAlbum))
        }
    }
}

/// Tracks behind a URI.  Unsupported URI types count as not found.
fn uri_tracks<P: SearchProvider + ?Sized>(provider: &mut P, uri: &str) -> Result<Vec<ResolvedTrack>, ProviderError> {
    let uri_ref = query::parse_uri(uri)
        .ok_or_else(|| ProviderError::NotFound(format!("unsupported URI {}", uri)))?;

    match uri_ref.kind {
        UriKind::Track => {
            let track = provider.get_track(uri_ref.id)?;
            Ok(vec![ResolvedTrack::from_record(&track, uri)])
        }
        UriKind::Album => {
            let album = provider.get_album(uri_ref.id)?;
            let tracks = provider.list_album_tracks(&album.id)?;
            Ok(tracks.iter().map(|t| ResolvedTrack::from_record(t, uri)).collect())
        }
    }
}

/// Resolve items with the default [`Thresholds`].
pub fn resolve_items<P, S>(provider: &mut P, items: &[S]) -> Vec<SearchResult>
where
    P: SearchProvider + ?Sized,
    S: AsRef<str>,
{
    Resolver::new().resolve_items(provider, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn track(id: &str, name: &str, artists: &[&str]) -> TrackRecord {
        TrackRecord {
            id: id.to_string(),
            uri: format!("spotify:track:{}", id),
            name: name.to_string(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn album(id: &str, name: &str, artists: &[&str]) -> AlbumRecord {
        AlbumRecord {
            id: id.to_string(),
            uri: format!("spotify:album:{}", id),
            name: name.to_string(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            total_tracks: None,
        }
    }

    /// In-memory provider keyed by exact query / id.
    #[derive(Default)]
    struct FakeProvider {
        track_hits: HashMap<String, Vec<TrackRecord>>,
        album_hits: HashMap<String, Vec<AlbumRecord>>,
        tracks: HashMap<String, TrackRecord>,
        albums: HashMap<String, AlbumRecord>,
        album_tracks: HashMap<String, Vec<TrackRecord>>,
        failing_queries: HashSet<String>,
        failing_albums: HashSet<String>,
        calls: Vec<String>,
    }

    impl FakeProvider {
        fn with_track_hit(mut self, query: &str, t: TrackRecord) -> Self {
            self.track_hits.insert(query.to_string(), vec![t]);
            self
        }

        fn with_album_hit(mut self, query: &str, a: AlbumRecord, tracks: Vec<TrackRecord>) -> Self {
            self.album_tracks.insert(a.id.clone(), tracks);
            self.albums.insert(a.id.clone(), a.clone());
            self.album_hits.insert(query.to_string(), vec![a]);
            self
        }
    }

    impl SearchProvider for FakeProvider {
        fn search_tracks(&mut self, query: &str, limit: u32) -> Result<Vec<TrackRecord>, ProviderError> {
            assert_eq!(limit, SEARCH_LIMIT);
            self.calls.push(format!("search_tracks:{}", query));
            if self.failing_queries.contains(query) {
                return Err(ProviderError::Transient("boom".into()));
            }
            Ok(self.track_hits.get(query).cloned().unwrap_or_default())
        }

        fn search_albums(&mut self, query: &str, limit: u32) -> Result<Vec<AlbumRecord>, ProviderError> {
            assert_eq!(limit, SEARCH_LIMIT);
            self.calls.push(format!("search_albums:{}", query));
            if self.failing_queries.contains(query) {
                return Err(ProviderError::Transient("boom".into()));
            }
            Ok(self.album_hits.get(query).cloned().unwrap_or_default())
        }

        fn get_track(&mut self, id: &str) -> Result<TrackRecord, ProviderError> {
            self.calls.push(format!("get_track:{}", id));
            self.tracks.get(id).cloned().ok_or_else(|| ProviderError::NotFound(id.to_string()))
        }

        fn get_album(&mut self, id: &str) -> Result<AlbumRecord, ProviderError> {
            self.calls.push(format!("get_album:{}", id));
            self.albums.get(id).cloned().ok_or_else(|| ProviderError::NotFound(id.to_string()))
        }

        fn list_album_tracks(&mut self, album_id: &str) -> Result<Vec<TrackRecord>, ProviderError> {
            self.calls.push(format!("list_album_tracks:{}", album_id));
            if self.failing_albums.contains(album_id) {
                return Err(ProviderError::Transient("listing failed".into()));
            }
            self.album_tracks.get(album_id).cloned().ok_or_else(|| ProviderError::NotFound(album_id.to_string()))
        }
    }

    fn dark_side() -> (AlbumRecord, Vec<TrackRecord>) {
        (
            album("dsotm", "The Dark Side of the Moon", &["Pink Floyd"]),
            vec![
                track("t1", "Speak to Me", &["Pink Floyd"]),
                track("t2", "Breathe (In the Air)", &["Pink Floyd"]),
                track("t3", "Time", &["Pink Floyd"]),
            ],
        )
    }

    #[test]
    fn test_track_search_found() {
        let mut p = FakeProvider::default()
            .with_track_hit("Bohemian Rhapsody", track("bo", "Bohemian Rhapsody", &["Queen"]));

        let r = Resolver::new().search_track(&mut p, "Bohemian Rhapsody");
        assert_eq!(r.search_kind, SearchKind::Track);
        assert!(r.match_quality > 0.8);
        assert_eq!(r.resolved_tracks.len(), 1);
        assert_eq!(r.resolved_tracks[0].uri, "spotify:track:bo");
        assert_eq!(r.resolved_tracks[0].artists, "Queen");
        assert_eq!(r.resolved_tracks[0].source_query, "track:Bohemian Rhapsody");
    }

    #[test]
    fn test_track_search_not_found() {
        let mut p = FakeProvider::default();
        let results = resolve_items(&mut p, &["track:Unknown Song XYZ"]);

        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.query, "Unknown Song XYZ");
        assert_eq!(r.match_quality, 0.0);
        assert_eq!(r.quality_reason, "No results found");
        assert!(r.found_item.is_none());
        assert!(r.is_skipped());
    }

    #[test]
    fn test_track_search_error() {
        let mut p = FakeProvider::default();
        p.failing_queries.insert("Yesterday".into());

        let r = Resolver::new().search_track(&mut p, "Yesterday");
        assert_eq!(r.search_kind, SearchKind::Track);
        assert_eq!(r.match_quality, 0.0);
        assert_eq!(r.quality_reason, "Search error: boom");
        assert!(r.found_item.is_none());
        assert!(r.resolved_tracks.is_empty());
    }

    #[test]
    fn test_track_search_rejects_poor_hit() {
        let mut p = FakeProvider::default().with_track_hit("xxx", track("ab", "Abba", &["Abba"]));

        let r = Resolver::new().search_track(&mut p, "xxx");
        assert!(r.match_quality <= INCLUDE_THRESHOLD);
        assert!(r.quality_reason.starts_with("Poor match"));
        assert!(matches!(r.found_item, Some(FoundItem::Track(_))));
        assert!(r.resolved_tracks.is_empty());
    }

    #[test]
    fn test_album_search_found() {
        let (a, tracks) = dark_side();
        let mut p = FakeProvider::default().with_album_hit("Dark Side of the Moon", a, tracks);

        let results = resolve_items(&mut p, &["album:Dark Side of the Moon"]);
        let r = &results[0];
        assert_eq!(r.search_kind, SearchKind::Album);
        assert!(r.match_quality > 0.6);
        assert_eq!(r.resolved_tracks.len(), 3);
        assert!(r.resolved_tracks.iter().all(|t| t.source_query == "album:Dark Side of the Moon"));
        assert_eq!(r.resolved_tracks[1].name, "Breathe (In the Air)");
    }

    #[test]
    fn test_single_prefix_searches_albums() {
        let (a, tracks) = dark_side();
        let mut p = FakeProvider::default().with_album_hit("Dark Side of the Moon", a, tracks);

        let r = Resolver::new().resolve_item(&mut p, "single:Dark Side of the Moon");
        assert_eq!(r.search_kind, SearchKind::Album);
        assert_eq!(p.calls[0], "search_albums:Dark Side of the Moon");
    }

    #[test]
    fn test_album_found_but_tracks_unavailable() {
        let (a, tracks) = dark_side();
        let mut p = FakeProvider::default().with_album_hit("Dark Side of the Moon", a, tracks);
        p.failing_albums.insert("dsotm".into());

        let r = Resolver::new().search_album(&mut p, "Dark Side of the Moon");
        assert!(matches!(r.found_item, Some(FoundItem::Album(_))));
        assert!(r.match_quality > INCLUDE_THRESHOLD);
        assert!(!r.quality_reason.starts_with("Search error"));
        assert!(r.resolved_tracks.is_empty());
    }

    #[test]
    fn test_album_poor_hit_skips_track_listing() {
        let (_, tracks) = dark_side();
        let mut p = FakeProvider::default().with_album_hit("xxx", album("ab", "Abba", &["Abba"]), tracks);

        let r = Resolver::new().search_album(&mut p, "xxx");
        assert!(r.resolved_tracks.is_empty());
        assert!(!p.calls.iter().any(|c| c.starts_with("list_album_tracks")));
    }

    #[test]
    fn test_album_search_error() {
        let mut p = FakeProvider::default();
        p.failing_queries.insert("Abbey Road".into());

        let r = Resolver::new().resolve_item(&mut p, "album:Abbey Road");
        assert_eq!(r.search_kind, SearchKind::Album);
        assert_eq!(r.quality_reason, "Search error: boom");
        assert!(r.found_item.is_none());
    }

    #[test]
    fn test_uri_track() {
        let mut p = FakeProvider::default();
        p.tracks.insert("abc123".into(), track("abc123", "Under Pressure", &["Queen", "David Bowie"]));

        let r = Resolver::new().resolve_item(&mut p, "spotify:track:abc123");
        assert_eq!(r.search_kind, SearchKind::Uri);
        assert_eq!(r.match_quality, 1.0);
        assert_eq!(r.quality_reason, "Direct URI match");
        assert_eq!(r.found_item, Some(FoundItem::Uri("spotify:track:abc123".into())));
        assert_eq!(r.resolved_tracks.len(), 1);
        assert_eq!(r.resolved_tracks[0].artists, "Queen, David Bowie");
        assert_eq!(r.resolved_tracks[0].source_query, "spotify:track:abc123");
    }

    #[test]
    fn test_uri_album() {
        let (a, tracks) = dark_side();
        let mut p = FakeProvider::default().with_album_hit("unused", a, tracks);

        let r = Resolver::new().resolve_item(&mut p, "spotify:album:dsotm");
        assert_eq!(r.match_quality, 1.0);
        assert_eq!(r.resolved_tracks.len(), 3);
        assert!(r.resolved_tracks.iter().all(|t| t.source_query == "spotify:album:dsotm"));
        assert_eq!(p.calls, vec!["get_album:dsotm", "list_album_tracks:dsotm"]);
    }

    #[test]
    fn test_uri_failures() {
        let (a, tracks) = dark_side();
        let mut p = FakeProvider::default().with_album_hit("unused", a, tracks);
        p.failing_albums.insert("dsotm".into());

        for uri in [
            "spotify:track:missing",
            "spotify:album:dsotm",
            "spotify:playlist:37i9dQZF1DXcBWIGoYBM5M",
            "spotify:track:",
            "spotify:track:x/y?z",
        ] {
            let r = Resolver::new().resolve_item(&mut p, uri);
            assert_eq!(r.search_kind, SearchKind::Uri);
            assert_eq!(r.query, uri);
            assert_eq!(r.match_quality, 0.0);
            assert_eq!(r.quality_reason, "Invalid or inaccessible URI");
            assert!(r.found_item.is_none());
            assert!(r.resolved_tracks.is_empty());
        }
    }

    #[test]
    fn test_malformed_uri_id_never_reaches_provider() {
        let mut p = FakeProvider::default();
        let r = Resolver::new().resolve_item(&mut p, "spotify:album:../../me");
        assert_eq!(r.quality_reason, "Invalid or inaccessible URI");
        assert!(p.calls.is_empty());
    }

    #[test]
    fn test_auto_accepts_good_track_without_album_search() {
        let mut p = FakeProvider::default()
            .with_track_hit("Bohemian Rhapsody", track("bo", "Bohemian Rhapsody", &["Queen"]));

        let r = Resolver::new().resolve_item(&mut p, "Bohemian Rhapsody");
        assert_eq!(r.search_kind, SearchKind::Auto(AutoOutcome::FoundTrack));
        assert_eq!(r.search_kind.to_string(), "auto (found track)");
        assert_eq!(r.resolved_tracks.len(), 1);
        assert_eq!(p.calls, vec!["search_tracks:Bohemian Rhapsody"]);
    }

    #[test]
    fn test_auto_falls_back_to_album() {
        let (_, tracks) = dark_side();
        let mut p = FakeProvider::default()
            .with_track_hit("abcdefghij", track("t", "abc", &[]))
            .with_album_hit("abcdefghij", album("al", "abcdefghij", &[]), tracks);

        let r = Resolver::new().resolve_item(&mut p, "abcdefghij");
        assert_eq!(r.search_kind.to_string(), "auto (found album)");
        assert_eq!(r.resolved_tracks.len(), 3);
        assert_eq!(r.resolved_tracks[0].source_query, "album:abcdefghij");
    }

    #[test]
    fn test_auto_weak_matches_pick_higher_quality() {
        // track "abc" scores ~0.28, album "abcd" ~0.34, both below auto-accept
        let (_, tracks) = dark_side();
        let mut p = FakeProvider::default()
            .with_track_hit("abcdefghij", track("t", "abc", &[]))
            .with_album_hit("abcdefghij", album("al", "abcd", &[]), tracks);

        let r = Resolver::new().resolve_item(&mut p, "abcdefghij");
        assert_eq!(r.search_kind, SearchKind::Auto(AutoOutcome::WeakAlbum));
        assert_eq!(r.search_kind.to_string(), "auto (weak album match)");
        assert!(r.match_quality > INCLUDE_THRESHOLD && r.match_quality <= AUTO_ACCEPT_THRESHOLD);
        assert_eq!(r.resolved_tracks.len(), 3);
    }

    #[test]
    fn test_auto_tie_favors_track() {
        let (_, tracks) = dark_side();
        let mut p = FakeProvider::default()
            .with_track_hit("abcdefghij", track("t", "abc", &[]))
            .with_album_hit("abcdefghij", album("al", "abc", &[]), tracks);

        let r = Resolver::new().resolve_item(&mut p, "abcdefghij");
        assert_eq!(r.search_kind.to_string(), "auto (weak track match)");
        assert!(matches!(r.found_item, Some(FoundItem::Track(_))));
    }

    #[test]
    fn test_auto_nothing_found() {
        let mut p = FakeProvider::default();
        let r = Resolver::new().resolve_item(&mut p, "Nothing At All");
        assert_eq!(r.search_kind, SearchKind::Auto(AutoOutcome::WeakTrack));
        assert_eq!(r.match_quality, 0.0);
        assert_eq!(r.quality_reason, "No results found");
        assert_eq!(p.calls, vec!["search_tracks:Nothing At All", "search_albums:Nothing At All"]);
    }

    #[test]
    fn test_explicit_not_found_from_search_is_no_results() {
        struct NotFoundProvider;
        impl SearchProvider for NotFoundProvider {
            fn search_tracks(&mut self, q: &str, _: u32) -> Result<Vec<TrackRecord>, ProviderError> {
                Err(ProviderError::NotFound(q.to_string()))
            }
            fn search_albums(&mut self, q: &str, _: u32) -> Result<Vec<AlbumRecord>, ProviderError> {
                Err(ProviderError::NotFound(q.to_string()))
            }
            fn get_track(&mut self, id: &str) -> Result<TrackRecord, ProviderError> {
                Err(ProviderError::NotFound(id.to_string()))
            }
            fn get_album(&mut self, id: &str) -> Result<AlbumRecord, ProviderError> {
                Err(ProviderError::NotFound(id.to_string()))
            }
            fn list_album_tracks(&mut self, id: &str) -> Result<Vec<TrackRecord>, ProviderError> {
                Err(ProviderError::NotFound(id.to_string()))
            }
        }

        let results = resolve_items(&mut NotFoundProvider, &["track:a", "album:b"]);
        assert!(results.iter().all(|r| r.quality_reason == "No results found"));
    }

    #[test]
    fn test_order_preserved_and_failures_isolated() {
        let (a, tracks) = dark_side();
        let mut p = FakeProvider::default()
            .with_track_hit("Bohemian Rhapsody", track("bo", "Bohemian Rhapsody", &["Queen"]))
            .with_album_hit("Dark Side of the Moon", a, tracks);
        p.failing_queries.insert("Broken".into());

        let items = [
            "track:Bohemian Rhapsody",
            "track:Broken",
            "album:Dark Side of the Moon",
            "spotify:track:nope",
            "track:Bohemian Rhapsody",
        ];
        let results = resolve_items(&mut p, &items);

        let queries: Vec<&str> = results.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(
            queries,
            vec!["Bohemian Rhapsody", "Broken", "Dark Side of the Moon", "spotify:track:nope", "Bohemian Rhapsody"]
        );
        assert_eq!(results[0].resolved_tracks.len(), 1);
        assert!(results[1].quality_reason.starts_with("Search error"));
        assert_eq!(results[2].resolved_tracks.len(), 3);
        assert!(results[3].is_skipped());
        assert_eq!(results[0], results[4]);
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let (a, tracks) = dark_side();
        let mut p = FakeProvider::default()
            .with_track_hit("Bohemian Rhapsody", track("bo", "Bohemian Rhapsody", &["Queen"]))
            .with_album_hit("Dark Side of the Moon", a, tracks);

        let items = vec![
            "Bohemian Rhapsody".to_string(),
            "album:Dark Side of the Moon".to_string(),
            "track:missing".to_string(),
        ];
        let resolver = Resolver::new();
        let first = resolver.resolve_items(&mut p, &items);
        let second = resolver.resolve_items(&mut p, &items);
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_thresholds() {
        let mut p = FakeProvider::default()
            .with_track_hit("Bohemian", track("bo", "Bohemian Rhapsody", &["Queen"]));

        // ~0.71 with the default policy
        let strict = Resolver::with_thresholds(Thresholds { include: 0.9, ..Thresholds::default() });
        let r = strict.search_track(&mut p, "Bohemian");
        assert!(r.resolved_tracks.is_empty());
        assert!(r.found_item.is_some());

        let r = Resolver::new().search_track(&mut p, "Bohemian");
        assert_eq!(r.resolved_tracks.len(), 1);
    }

    #[test]
    fn test_threshold_operators() {
        let t = Thresholds::default();
        assert!(!t.includes(0.2));
        assert!(t.includes(0.21));
        assert!(t.is_good_match(0.3));
        assert!(!t.is_good_match(0.29));
        assert!(!t.auto_accepts(0.4));
        assert!(t.auto_accepts(0.41));
        assert!(t.is_poor_match(0.39));
        assert!(!t.is_poor_match(0.4));
    }

    #[test]
    fn test_search_kind_display() {
        assert_eq!(SearchKind::Uri.to_string(), "uri");
        assert_eq!(SearchKind::Track.to_string(), "track");
        assert_eq!(SearchKind::Album.to_string(), "album");
        assert_eq!(SearchKind::Auto(AutoOutcome::WeakTrack).to_string(), "auto (weak track match)");
    }
}
