//! Create a Spotify playlist from a list of songs, albums and URIs.
//!
//! Each item is resolved to tracks: `spotify:track:…` / `spotify:album:…`
//! URIs directly, `track:NAME` / `album:NAME` / `single:NAME` by a typed
//! search, anything else by an automatic track-then-album search.
//!
//! Usage:
//!   create_playlist [OPTIONS] ITEM...
//!   create_playlist [OPTIONS] --file ITEMS.txt
//!
//! Options:
//!   --name NAME      Playlist name (default: "Playlist YYYY-MM-DD HH:MM")
//!   --file PATH      Read items from PATH, one per line
//!   --dry-run        Only show the search quality analysis
//!   --output PATH    Write resolved URIs to PATH (good matches only with --dry-run)
//!   --verbose, -v    Debug logging

use std::path::PathBuf;
use std::process;

use log::{debug, error, warn};

use spotify_tools::config::Config;
use spotify_tools::playlist::{create_from_results, good_match_tracks, read_items_file, write_uris_to_file};
use spotify_tools::report::{render_analysis, render_create_command, render_file_command};
use spotify_tools::resolver::Resolver;
use spotify_tools::spotify::SpotifyClient;

struct Options {
    items: Vec<String>,
    file: Option<PathBuf>,
    name: Option<String>,
    dry_run: bool,
    output: Option<PathBuf>,
    verbose: bool,
}

fn usage() -> ! {
    eprintln!("Usage: create_playlist [--name NAME] [--dry-run] [--output PATH] [--verbose] (ITEM... | --file PATH)");
    process::exit(2);
}

fn parse_args(args: &[String]) -> Options {
    let mut opts = Options {
        items: Vec::new(),
        file: None,
        name: None,
        dry_run: false,
        output: None,
        verbose: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--name" => opts.name = Some(iter.next().cloned().unwrap_or_else(|| usage())),
            "--file" => opts.file = Some(PathBuf::from(iter.next().unwrap_or_else(|| usage()))),
            "--output" => opts.output = Some(PathBuf::from(iter.next().unwrap_or_else(|| usage()))),
            "--dry-run" => opts.dry_run = true,
            "--verbose" | "-v" => opts.verbose = true,
            "--help" | "-h" => usage(),
            s if s.starts_with("--") => {
                eprintln!("Unknown option: {}", s);
                usage();
            }
            _ => opts.items.push(arg.clone()),
        }
    }

    opts
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut opts = parse_args(&args);

    let level = if opts.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Some(path) = &opts.file {
        match read_items_file(path) {
            Ok(items) => opts.items.extend(items),
            Err(e) => {
                error!("Cannot read {}: {}", path.display(), e);
                process::exit(1);
            }
        }
    }

    if opts.items.is_empty() {
        eprintln!("No items given");
        usage();
    }

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            process::exit(1);
        }
    };
    if opts.verbose {
        config.print("Configuration");
    }

    let mut client = match SpotifyClient::from_config(&config) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let resolver = Resolver::with_thresholds(config.thresholds());
    debug!("Resolving {} items", opts.items.len());
    let results = resolver.resolve_items(&mut client, &opts.items);

    if opts.dry_run {
        print!("{}", render_analysis(&results, resolver.thresholds()));

        let good = good_match_tracks(&results, resolver.thresholds());
        if good.is_empty() {
            println!();
            println!("No good matches to create a playlist from.");
            return;
        }

        println!();
        match &opts.output {
            Some(path) => match write_uris_to_file(path, &good) {
                Ok(()) => {
                    println!("Good match URIs written to: {}", path.display());
                    println!("Command to create playlist:");
                    println!("{}", render_file_command(path, opts.name.as_deref()));
                }
                Err(e) => {
                    error!("Error writing to file {}: {}", path.display(), e);
                    process::exit(1);
                }
            },
            None => {
                println!("Command to create playlist (good matches only):");
                println!("{}", render_create_command(&good, opts.name.as_deref()));
            }
        }
        return;
    }

    let output = opts.output.as_deref();
    let outcome = match create_from_results(&mut client, &results, opts.name.as_deref(), output) {
        Ok(o) => o,
        Err(e) => {
            error!("Error creating playlist: {}", e);
            process::exit(1);
        }
    };

    println!("Playlist created successfully!");
    println!("Playlist ID: {}", outcome.playlist_id);
    println!("Tracks added: {}", outcome.tracks.len());

    if let (Some(path), Some(written)) = (output, &outcome.uri_file) {
        match written {
            Ok(()) => println!("Resolved URIs written to: {}", path.display()),
            Err(e) => warn!("Could not write to file {}: {}", path.display(), e),
        }
    }

    if !outcome.skipped.is_empty() {
        println!("Skipped {} items (not found):", outcome.skipped.len());
        for item in &outcome.skipped {
            println!("  - {}", item);
        }
    }

    debug!("Playlist URL: https://open.spotify.com/playlist/{}", outcome.playlist_id);
}
