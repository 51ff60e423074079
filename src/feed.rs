//! Feed module.
//! Holds one long-lived GET against the upstream TV feed and turns its
//! newline-delimited JSON body into a sequence of position strings.
//! A bad line is logged and skipped; only the initial handshake can fail.
//! End of stream and mid-stream read errors both simply end the reader,
//! which drops the sender and closes the channel behind it.
//! No reconnect, no read timeout.

use crate::pipeline::PositionSender;
use futures::{Stream, StreamExt};
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use std::fmt::Display;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Upstream feed of the current top-rated game.
pub const DEFAULT_FEED_URL: &str = "http://lichess.org/api/tv/best/feed";
const NDJSON: &str = "application/x-ndjson";

// *************** Wire Types ***************

/// One line of the feed: `{"t": ..., "d": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedRecord {
    /// Message type tag (`featured`, `fen`). Not interpreted here.
    #[serde(default)]
    pub t: String,
    pub d: GameData,
}

/// Payload of a feed record. Only `fen` is consumed; the rest is carried along untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct GameData {
    pub fen: String,
    /// Last move in UCI notation.
    #[serde(default)]
    pub lm: String,
    /// White clock, seconds.
    #[serde(default)]
    pub wc: i64,
    /// Black clock, seconds.
    #[serde(default)]
    pub bc: i64,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to connect to feed {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("feed {url} answered with status {status}")]
    Status { url: String, status: StatusCode },
}

/// Counters for a finished feed session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub forwarded: usize,
    pub skipped: usize,
}

// *************** Public API ***************

/// Decodes a single feed line. A trailing `\r` is tolerated.
pub fn parse_line(line: &[u8]) -> Result<FeedRecord, serde_json::Error> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    serde_json::from_slice(line)
}

/// Builds the plain client used for the feed. No overall timeout: the body never ends on its own.
pub fn client() -> Result<Client, FeedError> {
    Client::builder().build().map_err(FeedError::Client)
}

/// Opens the streaming request. Any non-success status is an error.
#[instrument(skip(client))]
pub async fn connect(client: &Client, url: &str) -> Result<reqwest::Response, FeedError> {
    let response = client
        .get(url)
        .header(header::ACCEPT, NDJSON)
        .send()
        .await
        .map_err(|source| FeedError::Connect {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status {
            url: url.to_string(),
            status,
        });
    }

    info!(%status, "Connected to feed");
    Ok(response)
}

/// Connects to `url` and pumps its body into `tx` until the stream ends.
///
/// `tx` is consumed and dropped on return, which closes the channel for the consumer.
pub async fn run(url: &str, tx: PositionSender) -> Result<FeedStats, FeedError> {
    let client = client()?;
    run_with_client(&client, url, tx).await
}

pub async fn run_with_client(
    client: &Client,
    url: &str,
    tx: PositionSender,
) -> Result<FeedStats, FeedError> {
    let response = connect(client, url).await?;
    Ok(pump(response.bytes_stream(), tx).await)
}

/// Splits a chunked byte stream into lines and forwards each decoded position.
///
/// Lines have no length limit. A final line without a trailing newline is still processed.
/// Blank lines (keep-alives) are ignored silently.
pub async fn pump<S, B, E>(stream: S, tx: PositionSender) -> FeedStats
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut stats = FeedStats::default();
    let mut pending: Vec<u8> = Vec::new();
    // Prefix of `pending` already known to hold no newline
    let mut scanned = 0;

    'read: while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(error = %e, "Feed read failed, closing stream");
                break;
            }
        };
        pending.extend_from_slice(chunk.as_ref());

        let mut start = 0;
        while let Some(offset) = pending[scanned..].iter().position(|&b| b == b'\n') {
            let end = scanned + offset;
            if !handle_line(&pending[start..end], &tx, &mut stats).await {
                break 'read;
            }
            start = end + 1;
            scanned = start;
        }
        pending.drain(..start);
        scanned = pending.len();
    }

    if !pending.is_empty() && !tx.is_closed() {
        handle_line(&pending, &tx, &mut stats).await;
    }

    info!(
        forwarded = stats.forwarded,
        skipped = stats.skipped,
        "Feed stream ended"
    );
    stats
}

// *************** Internal Functions ***************

/// Returns false once the consumer has gone away.
async fn handle_line(line: &[u8], tx: &PositionSender, stats: &mut FeedStats) -> bool {
    if line.iter().all(u8::is_ascii_whitespace) {
        debug!("Skipping keep-alive line");
        return true;
    }

    let record = match parse_line(line) {
        Ok(record) => record,
        Err(e) => {
            warn!(
                error = %e,
                line = %String::from_utf8_lossy(line),
                "Skipping undecodable feed line"
            );
            stats.skipped += 1;
            return true;
        }
    };

    info!(
        kind = %record.t,
        fen = %record.d.fen,
        last_move = %record.d.lm,
        white_clock = record.d.wc,
        black_clock = record.d.bc,
        "Received FEN"
    );

    if tx.send(record.d.fen).await.is_err() {
        info!("Position consumer closed, stopping feed");
        return false;
    }
    stats.forwarded += 1;
    true
}

// *************** Tests ***************
