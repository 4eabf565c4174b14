//! Dry-run output: per-item search quality analysis and the suggested
//! command for creating a playlist from the good matches.

use std::fmt::Write;
use std::path::Path;

use crate::playlist::poor_matches;
use crate::resolver::{FoundItem, ResolvedTrack, SearchResult, Thresholds};

const RULE: &str = "----------------------------------------";

/// Command name shown in suggestions.
pub const COMMAND: &str = "spt create-playlist";

fn found_line(found: Option<&FoundItem>) -> String {
    match found {
        Some(FoundItem::Uri(uri)) => uri.clone(),
        Some(item) => format!("\"{}\" by {}", item.name(), item.artists()),
        None => "No results".to_string(),
    }
}

/// Render the numbered analysis of every result followed by a summary.
pub fn render_analysis(results: &[SearchResult], thresholds: &Thresholds) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "Search Quality Analysis");
    let _ = writeln!(out, "{}", RULE);

    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(out, "{:2}. Query: {}", i + 1, result.query);
        let _ = writeln!(out, "    Type: {}", result.search_kind);
        let _ = writeln!(out, "    Found: {}", found_line(result.found_item.as_ref()));
        let _ = writeln!(out, "    Quality: {:.2} - {}", result.match_quality, result.quality_reason);
        let _ = writeln!(out, "    Tracks: {} added", result.resolved_tracks.len());
        let _ = writeln!(out);
    }

    let poor = poor_matches(results, thresholds);
    let total_tracks: usize = results.iter().map(|r| r.resolved_tracks.len()).sum();

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "  Items processed: {}", results.len());
    let _ = writeln!(out, "  Tracks found: {}", total_tracks);
    let _ = writeln!(out, "  Poor matches: {}", poor.len());

    if !poor.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Poor quality matches:");
        for result in poor {
            let _ = writeln!(out, "  \"{}\" -> {}", result.query, result.quality_reason);
        }
    }

    out
}

fn name_arg(name: Option<&str>) -> String {
    match name {
        Some(n) if !n.is_empty() => format!(" --name \"{}\"", n),
        _ => String::new(),
    }
}

/// Command line that recreates the playlist from the given tracks' URIs.
pub fn render_create_command(tracks: &[ResolvedTrack], name: Option<&str>) -> String {
    let mut cmd = format!("{}{}", COMMAND, name_arg(name));
    for track in tracks {
        let _ = write!(cmd, " \"{}\"", track.uri);
    }
    cmd
}

/// Command line that recreates the playlist from a URI file.
pub fn render_file_command(path: &Path, name: Option<&str>) -> String {
    format!("{} --file {}{}", COMMAND, path.display(), name_arg(name))
}
