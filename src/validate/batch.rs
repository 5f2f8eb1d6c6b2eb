use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use serde::Deserialize;
use tracing::{debug, warn};

use super::validate;
use crate::core::*;

/// One document of a batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchItem<'a> {
    pub xml: &'a str,
    pub format: EInvoiceFormat,
}

impl<'a> BatchItem<'a> {
    pub fn new(xml: &'a str, format: EInvoiceFormat) -> Self {
        Self { xml, format }
    }
}

/// Tuning for [`validate_batch_with`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchOptions {
    /// Number of worker threads; defaults to the available parallelism.
    #[serde(default)]
    pub workers: Option<NonZeroUsize>,
}

impl BatchOptions {
    fn worker_count(&self) -> usize {
        self.workers
            .or_else(|| thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }
}

/// Validate many documents in parallel with default options.
pub fn validate_batch(items: &[BatchItem<'_>]) -> Vec<SchemaValidationResult> {
    validate_batch_with(items, &BatchOptions::default())
}

/// Validate many documents on a pool of worker threads.
///
/// Results come back in input order. Each document is validated on its
/// own; a malformed document or a failing worker never affects the
/// results of the others.
pub fn validate_batch_with(
    items: &[BatchItem<'_>],
    options: &BatchOptions,
) -> Vec<SchemaValidationResult> {
    if items.is_empty() {
        return Vec::new();
    }

    let workers = options.worker_count().min(items.len());
    let next = AtomicUsize::new(0);
    let mut slots: Vec<Option<SchemaValidationResult>> = (0..items.len()).map(|_| None).collect();

    thread::scope(|scope| {
        let next = &next;
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(item) = items.get(index) else {
                            break;
                        };
                        done.push((index, validate(item.xml, item.format)));
                    }
                    done
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(done) => {
                    for (index, result) in done {
                        slots[index] = Some(result);
                    }
                }
                Err(_) => warn!("batch validation worker panicked"),
            }
        }
    });

    debug!(documents = items.len(), workers, "batch validation finished");

    slots
        .into_iter()
        .zip(items)
        .map(|(slot, item)| {
            slot.unwrap_or_else(|| {
                SchemaValidationResult::fatal(
                    item.format,
                    ValidationError::error("validation did not complete"),
                )
            })
        })
        .collect()
}
