//! Run driver - one complete, interruptible capture run

use crate::capture::coordinator::Coordinator;
use crate::capture::transport::ArchiveTransport;
use crate::output::{log_failed, write_captured, ProgressCounts};
use crate::storage::ProgressStore;
use crate::CaptureError;
use std::future::Future;
use std::io::Write;
use tokio::io::AsyncBufRead;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every URL reached a final state and the results were written
    Completed(ProgressCounts),

    /// The run was interrupted and its progress saved for the next run
    Interrupted(ProgressCounts),
}

/// Runs a complete capture operation
///
/// 1. Resume progress from the store, or start empty
/// 2. Process the input and poll until every job resolves
/// 3. Write capture links to `out` and log the failed URLs
///
/// If `shutdown` completes first, the coordinator is dropped wherever it was
/// waiting (rate limiter, network call or polling loop) and the progress as it
/// stands is saved to the store. Nothing is saved after a completed run.
///
/// # Arguments
///
/// * `coordinator` - The capture coordinator
/// * `store` - Where progress is resumed from and saved to
/// * `input` - Newline-delimited URLs
/// * `shutdown` - Completes when the run should stop (e.g. Ctrl-C)
/// * `out` - Destination for capture links
pub async fn run_capture<T, S, R, F, W>(
    coordinator: &Coordinator<T>,
    store: &S,
    input: R,
    shutdown: F,
    out: &mut W,
) -> Result<RunOutcome, CaptureError>
where
    T: ArchiveTransport,
    S: ProgressStore + ?Sized,
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
    W: Write,
{
    let mut progress = store.load_or_init()?;

    let finished = tokio::select! {
        result = coordinator.run(&mut progress, input) => Some(result),
        _ = shutdown => None,
    };

    let counts = ProgressCounts::from(&progress);

    match finished {
        Some(Ok(())) => {
            log_failed(&progress);
            write_captured(&progress, coordinator.archive_base(), out)?;
            tracing::info!("Run complete: {}", counts);
            Ok(RunOutcome::Completed(counts))
        }
        Some(Err(e)) => {
            // Jobs may already be submitted; keep them for the next run
            tracing::error!("Run failed: {}", e);
            store.save(&progress)?;
            Err(e)
        }
        None => {
            tracing::warn!("Interrupted, saving progress ({})", counts);
            store.save(&progress)?;
            Ok(RunOutcome::Interrupted(counts))
        }
    }
}
