//! Concurrent sharing-status lookups for a batch of records.
//!
//! Every record gets its own task. A semaphore bounds how many of them have
//! a permission lookup in flight; an unbounded channel carries each result
//! back and acts as the completion latch, so the batch returns only once
//! every task has reported.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::error::{DriveError, RemoteContext, Result};
use crate::models::FileRecord;
use crate::service::FileService;

/// Maximum number of permission lookups in flight at once.
pub const SHARED_STATUS_CONCURRENCY: usize = 10;

/// Fills in [`FileRecord::shared`] for every record.
///
/// The first failed lookup aborts the remaining tasks and its error is
/// returned; records are then left partially annotated.
pub async fn enrich_shared_status(
    service: Arc<dyn FileService>,
    records: &mut [FileRecord],
    limit: usize,
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let gate = Arc::new(Semaphore::new(limit.max(1)));
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(usize, Result<bool>)>();

    debug!(count = records.len(), limit, "checking shared status");

    let tasks: Vec<JoinHandle<()>> = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let service = Arc::clone(&service);
            let gate = Arc::clone(&gate);
            let done = done_tx.clone();
            let file_id = record.id.clone();

            tokio::spawn(async move {
                let status = match gate.acquire().await {
                    Ok(permit) => {
                        let status = service
                            .is_shared(&file_id)
                            .await
                            .remote_context(|| format!("Failed to list permissions of {}", file_id));
                        drop(permit);
                        status
                    }
                    Err(closed) => Err(DriveError::TaskFailed(closed.to_string())),
                };
                // The receiver only goes away once the batch has failed.
                let _ = done.send((index, status));
            })
        })
        .collect();

    drop(done_tx);

    let mut remaining = records.len();
    while remaining > 0 {
        match done_rx.recv().await {
            Some((index, Ok(shared))) => {
                records[index].shared = Some(shared);
                remaining -= 1;
            }
            Some((_, Err(err))) => {
                error!(error = %err, "aborting shared status batch");
                abort_all(&tasks);
                return Err(err);
            }
            None => {
                abort_all(&tasks);
                return Err(DriveError::TaskFailed(format!(
                    "{} shared status lookups never reported back",
                    remaining
                )));
            }
        }
    }

    Ok(())
}

fn abort_all(tasks: &[JoinHandle<()>]) {
    for task in tasks {
        task.abort();
    }
}
