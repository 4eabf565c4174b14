//! Spotify Web API client.
//!
//! Blocking client implementing [`SearchProvider`] and [`PlaylistWriter`]
//! over the public REST API.  It expects an OAuth access token with the
//! `playlist-modify-private` scope; obtaining and refreshing that token is
//! left to the caller.
//!
//! Every request goes through a [`RateLimiter`].  HTTP 429 responses back the
//! limiter off (honouring `Retry-After`) and the request is sent again; only
//! when the retries run out is it reported as a transient error.

use serde::Deserialize;
use std::time::Duration;

use log::{debug, warn};

use crate::config::Config;
use crate::playlist::PlaylistWriter;
use crate::provider::{AlbumRecord, ProviderError, SearchProvider, TrackRecord};
use crate::rate_limiter::RateLimiter;

const USER_AGENT: &str = concat!("spotify-tools/", env!("CARGO_PKG_VERSION"));

/// Page size for album track listings (API maximum).
const ALBUM_TRACKS_PAGE: u32 = 50;

/// Sends per request when the service keeps answering 429.
const MAX_ATTEMPTS: u32 = 4;

// ── API response types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    id: Option<String>,
    uri: String,
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    id: String,
    uri: String,
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    total_tracks: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiPage<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSearchResponse {
    tracks: Option<ApiPage<ApiTrack>>,
    albums: Option<ApiPage<ApiAlbum>>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylist {
    id: String,
}

fn artist_names(artists: Vec<ApiArtist>) -> Vec<String> {
    artists.into_iter().map(|a| a.name).collect()
}

impl From<ApiTrack> for TrackRecord {
    fn from(t: ApiTrack) -> Self {
        // Local files have no id; the URI's last segment is the best we have
        let id = t.id.unwrap_or_else(|| t.uri.rsplit(':').next().unwrap_or_default().to_string());
        TrackRecord { id, uri: t.uri, name: t.name, artists: artist_names(t.artists) }
    }
}

impl From<ApiAlbum> for AlbumRecord {
    fn from(a: ApiAlbum) -> Self {
        AlbumRecord {
            id: a.id,
            uri: a.uri,
            name: a.name,
            artists: artist_names(a.artists),
            total_tracks: a.total_tracks,
        }
    }
}

// ── Error mapping ────────────────────────────────────────────────────────────

fn retry_after(response: &ureq::Response) -> Option<Duration> {
    response.header("Retry-After")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

// ── Client ───────────────────────────────────────────────────────────────────

pub struct SpotifyClient {
    access_token: String,
    api_base: String,
    market: Option<String>,
    rate_limiter: RateLimiter,
}

impl SpotifyClient {
    pub fn new(access_token: &str, api_base: &str, request_interval_ms: u64) -> Self {
        SpotifyClient {
            access_token: access_token.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            market: None,
            rate_limiter: RateLimiter::from_millis("Spotify", request_interval_ms),
        }
    }

    /// Build a client from the config.  Fails when no access token is available.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let token = config.access_token().ok_or_else(|| {
            ProviderError::Transient(format!(
                "no access token: set {} or spotify.access_token in the config file",
                crate::config::ACCESS_TOKEN_ENV
            ))
        })?;
        let mut client = Self::new(&token, config.api_base(), config.request_interval_ms());
        client.market = config.spotify.market.clone();
        Ok(client)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        ureq::request(method, url)
            .set("User-Agent", USER_AGENT)
            .set("Authorization", &format!("Bearer {}", self.access_token))
    }

    /// Send a request through the rate limiter and decode its JSON body.
    /// Rate-limited requests are resent up to [`MAX_ATTEMPTS`] times in total.
    fn execute<T: serde::de::DeserializeOwned>(
        &mut self,
        what: &str,
        request: ureq::Request,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ProviderError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.rate_limiter.wait_if_needed();
            debug!("Spotify request: {} (attempt {})", what, attempt);

            let sent = match body {
                Some(json) => request.clone().send_json(json),
                None => request.clone().call(),
            };

            match sent {
                Ok(response) => {
                    self.rate_limiter.report_success();
                    return serde_json::from_reader(response.into_reader())
                        .map_err(|e| ProviderError::Transient(format!("malformed response for {}: {}", what, e)));
                }
                Err(ureq::Error::Status(404, _)) => return Err(ProviderError::NotFound(what.to_string())),
                Err(ureq::Error::Status(429, response)) => {
                    self.rate_limiter.report_rate_limited(retry_after(&response));
                    if attempt >= MAX_ATTEMPTS {
                        return Err(ProviderError::Transient(format!(
                            "rate limited during {} after {} attempts",
                            what, attempt
                        )));
                    }
                    warn!("Rate limited during {}, retrying", what);
                }
                Err(ureq::Error::Status(code, response)) => {
                    return Err(ProviderError::Transient(format!(
                        "HTTP {} {} during {}",
                        code,
                        response.status_text(),
                        what
                    )));
                }
                Err(ureq::Error::Transport(t)) => return Err(ProviderError::Transient(t.to_string())),
            }
        }
    }

    fn get<T: serde::de::DeserializeOwned>(&mut self, url: &str, query: &[(&str, &str)]) -> Result<T, ProviderError> {
        let mut req = self.request("GET", url);
        for (k, v) in query {
            req = req.query(k, v);
        }
        if let Some(market) = &self.market {
            req = req.query("market", market);
        }
        let what = url.strip_prefix(&self.api_base).unwrap_or(url).to_string();
        self.execute(&what, req, None)
    }

    fn post<T: serde::de::DeserializeOwned>(&mut self, url: &str, body: serde_json::Value) -> Result<T, ProviderError> {
        let req = self.request("POST", url);
        let what = url.strip_prefix(&self.api_base).unwrap_or(url).to_string();
        self.execute(&what, req, Some(&body))
    }

    fn search(&mut self, query: &str, kind: &str, limit: u32) -> Result<ApiSearchResponse, ProviderError> {
        let url = self.url("/search");
        let limit = limit.to_string();
        self.get(&url, &[("q", query), ("type", kind), ("limit", &limit)])
    }
}

impl SearchProvider for SpotifyClient {
    fn search_tracks(&mut self, query: &str, limit: u32) -> Result<Vec<TrackRecord>, ProviderError> {
        let response = self.search(query, "track", limit)?;
        Ok(response.tracks
            .map(|page| page.items.into_iter().map(TrackRecord::from).collect())
            .unwrap_or_default())
    }

    fn search_albums(&mut self, query: &str, limit: u32) -> Result<Vec<AlbumRecord>, ProviderError> {
        let response = self.search(query, "album", limit)?;
        Ok(response.albums
            .map(|page| page.items.into_iter().map(AlbumRecord::from).collect())
            .unwrap_or_default())
    }

    fn get_track(&mut self, id: &str) -> Result<TrackRecord, ProviderError> {
        let url = self.url(&format!("/tracks/{}", id));
        let track: ApiTrack = self.get(&url, &[])?;
        Ok(track.into())
    }

    fn get_album(&mut self, id: &str) -> Result<AlbumRecord, ProviderError> {
        let url = self.url(&format!("/albums/{}", id));
        let album: ApiAlbum = self.get(&url, &[])?;
        Ok(album.into())
    }

    fn list_album_tracks(&mut self, album_id: &str) -> Result<Vec<TrackRecord>, ProviderError> {
        let url = self.url(&format!("/albums/{}/tracks", album_id));
        let limit = ALBUM_TRACKS_PAGE.to_string();
        let mut tracks = Vec::new();
        let mut offset = 0usize;

        loop {
            let offset_str = offset.to_string();
            let page: ApiPage<ApiTrack> = self.get(&url, &[("limit", &limit), ("offset", &offset_str)])?;
            let count = page.items.len();
            tracks.extend(page.items.into_iter().map(TrackRecord::from));

            if page.next.is_none() || count == 0 {
                break;
            }
            offset += count;
        }

        debug!("Album {} has {} tracks", album_id, tracks.len());
        Ok(tracks)
    }
}

impl PlaylistWriter for SpotifyClient {
    fn current_user_id(&mut self) -> Result<String, ProviderError> {
        let url = self.url("/me");
        let user: ApiUser = self.get(&url, &[])?;
        Ok(user.id)
    }

    fn create_playlist(
        &mut self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<String, ProviderError> {
        let url = self.url(&format!("/users/{}/playlists", user_id));
        let body = serde_json::json!({
            "name": name,
            "public": public,
            "description": description,
        });
        let playlist: ApiPlaylist = self.post(&url, body)?;
        Ok(playlist.id)
    }

    fn add_items(&mut self, playlist_id: &str, uris: &[String]) -> Result<(), ProviderError> {
        let url = self.url(&format!("/playlists/{}/tracks", playlist_id));
        // Response carries a snapshot id we have no use for
        let _: serde_json::Value = self.post(&url, serde_json::json!({ "uris": uris }))?;
        Ok(())
    }
}
