pub mod config;
pub mod match_quality;
pub mod playlist;
pub mod provider;
pub mod query;
pub mod rate_limiter;
pub mod report;
pub mod resolver;
pub mod spotify;

pub use config::Config;
pub use match_quality::{score, MatchScore, QualityBand};
pub use playlist::{create_from_results, create_playlist_from_tracks, extract_tracks, good_match_tracks, PlaylistWriter};
pub use provider::{AlbumRecord, ProviderError, SearchProvider, TrackRecord};
pub use query::{classify, parse_uri, ItemKind, ParsedItem};
pub use resolver::{resolve_items, Resolver, ResolvedTrack, SearchKind, SearchResult, Thresholds};
pub use spotify::SpotifyClient;
