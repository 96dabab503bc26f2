//! Fetching feed contents over HTTP or from disk.

use std::fs;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use icalagg_core::{AggError, AggResult, Feed, FeedSource};
use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

/// Where a feed's `source` string points.
#[derive(Debug, PartialEq, Eq)]
enum Location {
    Http(Url),
    File(PathBuf),
}

impl Location {
    fn parse(source: &str) -> Result<Self, String> {
        match Url::parse(source) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Location::Http(url)),
                "file" => url
                    .to_file_path()
                    .map(Location::File)
                    .map_err(|_| format!("Invalid file URL '{source}'")),
                "webcal" => {
                    // webcal:// is plain HTTP under another name
                    let http = source.replacen("webcal://", "https://", 1);
                    Url::parse(&http)
                        .map(Location::Http)
                        .map_err(|e| e.to_string())
                }
                other => Err(format!("Unsupported URL scheme '{other}'")),
            },
            // Not a URL at all: a plain (possibly ~-prefixed) path
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(Location::File(crate::config::expand_path(Path::new(source))))
            }
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Feed source reading http(s)/webcal URLs, file:// URLs and plain paths.
///
/// Shows a spinner per feed while it is being fetched.
pub struct UrlSource {
    client: Client,
}

impl UrlSource {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("icalagg/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to set up HTTP client")?;
        Ok(UrlSource { client })
    }

    fn fetch_http(&self, url: Url) -> reqwest::Result<String> {
        self.client.get(url).send()?.error_for_status()?.text()
    }
}

impl FeedSource for UrlSource {
    fn open(&self, feed: &Feed) -> AggResult<Box<dyn BufRead + '_>> {
        let fetch_error = |message: String| AggError::Fetch {
            feed: feed.name.clone(),
            message,
        };

        let location = Location::parse(&feed.source).map_err(fetch_error)?;
        debug!(feed = %feed.name, ?location, "opening feed");

        match location {
            Location::Http(url) => {
                let spinner = fetch_spinner(&feed.name);
                let body = self.fetch_http(url);
                spinner.finish_and_clear();
                let body = body.map_err(|e| fetch_error(e.to_string()))?;
                Ok(Box::new(Cursor::new(body.into_bytes())))
            }
            Location::File(path) => {
                let file = fs::File::open(&path)
                    .map_err(|e| fetch_error(format!("{}: {e}", path.display())))?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

/// Spinner shown while a feed downloads. Hidden when stderr is not a terminal.
fn fetch_spinner(room: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/", "✓"])
        .template("{msg} {spinner}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Fetching {room}"));
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
