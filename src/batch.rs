//! Sequential batch compression.
//!
//! Applies [`compress_image`] to an ordered list of sources, one at a time.
//! Only one decoded bitmap is alive at any moment, which bounds peak memory
//! for large batches at the cost of wall-clock time.
//!
//! ## Failure handling
//!
//! A file that fails to decode or encode is recorded as a [`BatchFailure`]
//! and skipped; the batch always runs to the end. `results` holds exactly one
//! entry per successful input, in input order; failed inputs are omitted, not
//! zero-filled. Invalid settings are the only batch-level error, and they
//! are reported before any file is touched.
//!
//! ## Progress
//!
//! Callers that want live output pass a `Sender<BatchEvent>`. Events are sent
//! in processing order; a dropped receiver is ignored.

use crate::compress::{CompressError, compress_image};
use crate::imaging::{Dimensions, ImageBackend, OutputFormat, Quality};
use crate::settings::{CompressionSettings, QualityPolicy};
use crate::types::{CompressedResult, SourceImage};
use serde::Serialize;
use std::sync::mpsc::Sender;

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    ImageCompressed {
        /// 1-based position in the input list.
        index: usize,
        name: String,
        original_size: u64,
        compressed_size: u64,
        dimensions: Dimensions,
        format: OutputFormat,
        /// Qualities of each encode, in order.
        qualities: Vec<Quality>,
    },
    ImageFailed {
        index: usize,
        name: String,
        error: String,
    },
    Finished {
        summary: BatchSummary,
    },
}

/// A source that could not be compressed.
#[derive(Debug)]
pub struct BatchFailure {
    /// 1-based position in the input list.
    pub index: usize,
    pub name: String,
    pub error: CompressError,
}

/// Aggregate statistics over the successful results of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub file_count: usize,
    pub failed_count: usize,
    pub total_original: u64,
    pub total_compressed: u64,
    /// Negative when the batch grew overall.
    pub total_saved: i64,
    /// Mean of the per-file compression ratios, in percent.
    pub average_ratio: f64,
}

impl BatchSummary {
    pub fn from_results(results: &[CompressedResult], failed_count: usize) -> Self {
        let total_original: u64 = results.iter().map(|r| r.original_size()).sum();
        let total_compressed: u64 = results.iter().map(|r| r.compressed_size()).sum();
        let average_ratio = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.compression_ratio()).sum::<f64>() / results.len() as f64
        };
        Self {
            file_count: results.len(),
            failed_count,
            total_original,
            total_compressed,
            total_saved: total_original as i64 - total_compressed as i64,
            average_ratio,
        }
    }
}

/// Everything a batch produced.
#[derive(Debug)]
pub struct BatchOutcome {
    pub results: Vec<CompressedResult>,
    pub failures: Vec<BatchFailure>,
    pub summary: BatchSummary,
}

fn emit(progress: &Option<Sender<BatchEvent>>, event: BatchEvent) {
    if let Some(tx) = progress {
        tx.send(event).ok();
    }
}

/// Compress `sources` sequentially, preserving order.
pub fn compress_batch<B: ImageBackend>(
    backend: &B,
    sources: &[SourceImage],
    settings: &CompressionSettings,
    policy: &QualityPolicy,
    progress: Option<Sender<BatchEvent>>,
) -> Result<BatchOutcome, CompressError> {
    settings.validate()?;
    policy.validate()?;

    emit(
        &progress,
        BatchEvent::Started {
            total: sources.len(),
        },
    );

    let mut results = Vec::with_capacity(sources.len());
    let mut failures = Vec::new();

    for (i, source) in sources.iter().enumerate() {
        let index = i + 1;
        match compress_image(backend, source, settings, policy) {
            Ok(result) => {
                emit(
                    &progress,
                    BatchEvent::ImageCompressed {
                        index,
                        name: result.name().to_string(),
                        original_size: result.original_size(),
                        compressed_size: result.compressed_size(),
                        dimensions: result.dimensions(),
                        format: result.format(),
                        qualities: result.attempts().iter().map(|a| a.quality).collect(),
                    },
                );
                results.push(result);
            }
            Err(error) => {
                emit(
                    &progress,
                    BatchEvent::ImageFailed {
                        index,
                        name: source.name().to_string(),
                        error: error.to_string(),
                    },
                );
                failures.push(BatchFailure {
                    index,
                    name: source.name().to_string(),
                    error,
                });
            }
        }
    }

    let summary = BatchSummary::from_results(&results, failures.len());
    emit(
        &progress,
        BatchEvent::Finished {
            summary: summary.clone(),
        },
    );

    Ok(BatchOutcome {
        results,
        failures,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{CORRUPT, MockBackend};
    use crate::settings::CompressionMode;
    use crate::types::SourceFormat;

    const DIMS: Dimensions = Dimensions {
        width: 640,
        height: 480,
    };

    fn jpeg(name: &str, size: usize) -> SourceImage {
        SourceImage::new(name, SourceFormat::Jpeg, vec![1u8; size])
    }

    fn corrupt(name: &str) -> SourceImage {
        SourceImage::new(name, SourceFormat::Jpeg, CORRUPT.to_vec())
    }

    #[test]
    fn preserves_order_and_omits_failures() {
        let backend = MockBackend::with_encode_sizes(DIMS, vec![100, 300]);
        let sources = vec![jpeg("A.jpg", 1000), corrupt("B.jpg"), jpeg("C.jpg", 1000)];

        let outcome = compress_batch(
            &backend,
            &sources,
            &CompressionSettings::default(),
            &QualityPolicy::default(),
            None,
        )
        .unwrap();

        let names: Vec<&str> = outcome.results.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["A.jpg", "C.jpg"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 2);
        assert_eq!(outcome.failures[0].name, "B.jpg");
        assert!(matches!(
            outcome.failures[0].error,
            CompressError::Decode { .. }
        ));
    }

    #[test]
    fn summary_aggregates_successes() {
        let backend = MockBackend::with_encode_sizes(DIMS, vec![500, 250]);
        let sources = vec![jpeg("a.jpg", 1000), jpeg("b.jpg", 1000), corrupt("c.jpg")];

        let outcome = compress_batch(
            &backend,
            &sources,
            &CompressionSettings::default(),
            &QualityPolicy::default(),
            None,
        )
        .unwrap();

        let s = &outcome.summary;
        assert_eq!(s.file_count, 2);
        assert_eq!(s.failed_count, 1);
        assert_eq!(s.total_original, 2000);
        assert_eq!(s.total_compressed, 750);
        assert_eq!(s.total_saved, 1250);
        // (50 + 75) / 2
        assert!((s.average_ratio - 62.5).abs() < 1e-9);
    }

    #[test]
    fn empty_batch_has_zero_summary() {
        let backend = MockBackend::with_encode_sizes(DIMS, vec![]);
        let outcome = compress_batch(
            &backend,
            &[],
            &CompressionSettings::default(),
            &QualityPolicy::default(),
            None,
        )
        .unwrap();

        assert!(outcome.results.is_empty());
        assert_eq!(outcome.summary, BatchSummary::default());
    }

    #[test]
    fn all_failures_still_complete() {
        let backend = MockBackend::with_encode_sizes(DIMS, vec![]);
        let sources = vec![corrupt("x.jpg"), corrupt("y.jpg")];
        let outcome = compress_batch(
            &backend,
            &sources,
            &CompressionSettings::default(),
            &QualityPolicy::default(),
            None,
        )
        .unwrap();

        assert!(outcome.results.is_empty());
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.summary.failed_count, 2);
        assert_eq!(outcome.summary.average_ratio, 0.0);
    }

    #[test]
    fn invalid_settings_fail_whole_batch() {
        let backend = MockBackend::with_encode_sizes(DIMS, vec![100]);
        let bad = CompressionSettings {
            quality: 0,
            ..CompressionSettings::default()
        };
        let result = compress_batch(
            &backend,
            &[jpeg("a.jpg", 1000)],
            &bad,
            &QualityPolicy::default(),
            None,
        );

        assert!(matches!(result, Err(CompressError::Settings(_))));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn processes_sequentially_one_decode_per_image() {
        use crate::imaging::backend::tests::RecordedOp;
        let backend = MockBackend::with_encode_sizes(DIMS, vec![100, 100]);
        let sources = vec![jpeg("a.jpg", 1000), jpeg("b.jpg", 2000)];
        compress_batch(
            &backend,
            &sources,
            &CompressionSettings::default(),
            &QualityPolicy::default(),
            None,
        )
        .unwrap();

        let ops = backend.get_operations();
        // decode(a), encode(a), decode(b), encode(b)
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[0], RecordedOp::Decode(1000));
        assert!(matches!(ops[1], RecordedOp::Encode { .. }));
        assert_eq!(ops[2], RecordedOp::Decode(2000));
        assert!(matches!(ops[3], RecordedOp::Encode { .. }));
    }

    #[test]
    fn emits_events_in_order() {
        let backend = MockBackend::with_encode_sizes(DIMS, vec![2000, 1500]);
        let settings = CompressionSettings {
            mode: CompressionMode::High,
            ..CompressionSettings::default()
        };
        let sources = vec![jpeg("grow.jpg", 1000), corrupt("bad.png")];
        let (tx, rx) = std::sync::mpsc::channel();

        compress_batch(
            &backend,
            &sources,
            &settings,
            &QualityPolicy::default(),
            Some(tx),
        )
        .unwrap();

        let events: Vec<BatchEvent> = rx.iter().collect();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], BatchEvent::Started { total: 2 });
        match &events[1] {
            BatchEvent::ImageCompressed {
                index,
                name,
                compressed_size,
                qualities,
                ..
            } => {
                assert_eq!(*index, 1);
                assert_eq!(name, "grow.jpg");
                assert_eq!(*compressed_size, 1500);
                assert_eq!(qualities.len(), 2);
            }
            other => panic!("expected ImageCompressed, got {other:?}"),
        }
        assert!(matches!(
            &events[2],
            BatchEvent::ImageFailed { index: 2, name, .. } if name == "bad.png"
        ));
        assert!(matches!(&events[3], BatchEvent::Finished { summary } if summary.file_count == 1));
    }

    #[test]
    fn dropped_receiver_does_not_stop_batch() {
        let backend = MockBackend::with_encode_sizes(DIMS, vec![10]);
        let (tx, rx) = std::sync::mpsc::channel();
        drop(rx);
        let outcome = compress_batch(
            &backend,
            &[jpeg("a.jpg", 100)],
            &CompressionSettings::default(),
            &QualityPolicy::default(),
            Some(tx),
        )
        .unwrap();
        assert_eq!(outcome.results.len(), 1);
    }
}
