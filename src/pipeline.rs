//! Pipeline module.
//! Single-slot hand-off between the feed reader (producer) and the render loop (consumer).
//! At most one position waits in the channel; a second send blocks until the
//! consumer takes the first, so a slow renderer throttles the network reader.
//! Positions arrive in wire order. The consumer ends when the producer drops its sender.
//! Rendering is synchronous work and runs on the blocking pool, never on a runtime worker.

use crate::feed::{self, FeedError, FeedStats};
use crate::fen::{self, Board, STARTING_PLACEMENT, Validation};
use crate::render::Renderer;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::{error, info, warn};

const SLOT_CAPACITY: usize = 1;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// The renderer panicked; the consumer cannot continue without it.
    #[error("render task failed: {0}")]
    RenderTask(#[from] JoinError),
}

/// Producer half of the position channel.
#[derive(Debug, Clone)]
pub struct PositionSender(mpsc::Sender<String>);

/// Consumer half of the position channel.
#[derive(Debug)]
pub struct PositionReceiver(mpsc::Receiver<String>);

/// Creates the bounded single-slot channel carrying raw position strings.
pub fn position_channel() -> (PositionSender, PositionReceiver) {
    let (tx, rx) = mpsc::channel(SLOT_CAPACITY);
    (PositionSender(tx), PositionReceiver(rx))
}

impl PositionSender {
    /// Waits for the slot to free up. Fails only when the receiver is gone, handing the value back.
    pub async fn send(&self, fen: String) -> Result<(), mpsc::error::SendError<String>> {
        self.0.send(fen).await
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

impl PositionReceiver {
    /// Next position in wire order, or `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<String> {
        self.0.recv().await
    }
}

/// Totals for one pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub feed: FeedStats,
    pub rendered: usize,
}

/// Returns the position to render: `raw` when it validates, the starting position otherwise.
pub fn resolve_position(raw: &str, validation: Validation) -> &str {
    if raw.is_empty() {
        info!("No active game, showing starting position");
        return STARTING_PLACEMENT;
    }
    if !validation.accepts(raw) {
        warn!(fen = raw, %validation, "Invalid FEN string, showing starting position");
        return STARTING_PLACEMENT;
    }
    raw
}

/// Renders `board` on the blocking pool and hands the renderer back with the outcome.
async fn render_blocking<R>(mut renderer: R, board: Board) -> Result<(R, anyhow::Result<()>), JoinError>
where
    R: Renderer + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let result = renderer.render(&board);
        (renderer, result)
    })
    .await
}

/// Renders every position received until the channel closes. Returns how many boards were drawn.
///
/// Render failures are logged and the loop carries on with the next position.
/// A panicking renderer ends the loop with the join error.
pub async fn consume<R>(
    mut rx: PositionReceiver,
    mut renderer: R,
    validation: Validation,
) -> Result<usize, JoinError>
where
    R: Renderer + Send + 'static,
{
    let mut rendered = 0;
    while let Some(raw) = rx.recv().await {
        let board = fen::decode(resolve_position(&raw, validation));
        let (returned, result) = render_blocking(renderer, board).await.inspect_err(|e| {
            error!(error = %e, "Render task failed, stopping consumer");
        })?;
        renderer = returned;
        match result {
            Ok(()) => rendered += 1,
            Err(e) => error!(error = %format!("{:#}", e), "Failed to render board"),
        }
    }
    info!(rendered, "Position channel closed");
    Ok(rendered)
}

/// Shows the starting position, then streams `url` into `renderer` until the feed ends.
///
/// A failed connect is returned to the caller after the consumer has wound down.
pub async fn run<R>(url: &str, renderer: R, validation: Validation) -> Result<PipelineSummary, PipelineError>
where
    R: Renderer + Send + 'static,
{
    let client = feed::client()?;
    run_with_client(&client, url, renderer, validation).await
}

pub async fn run_with_client<R>(
    client: &Client,
    url: &str,
    renderer: R,
    validation: Validation,
) -> Result<PipelineSummary, PipelineError>
where
    R: Renderer + Send + 'static,
{
    let (renderer, initial) = render_blocking(renderer, fen::decode(STARTING_PLACEMENT)).await?;
    if let Err(e) = initial {
        error!(error = %format!("{:#}", e), "Failed to render starting position");
    }

    let (tx, rx) = position_channel();
    let consumer = tokio::spawn(consume(rx, renderer, validation));

    let feed = feed::run_with_client(client, url, tx).await;
    let rendered = match consumer.await {
        Ok(Ok(rendered)) => rendered,
        Ok(Err(e)) | Err(e) => return Err(PipelineError::RenderTask(e)),
    };

    Ok(PipelineSummary {
        feed: feed?,
        rendered,
    })
}

// *************** Tests ***************
