//! Image preparation backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the one operation the picker needs
//! from an imaging library: prepare. The production
//! implementation is [`RustBackend`](super::rust_backend::RustBackend);
//! tests use the recording `MockBackend` below.

use super::params::PrepareParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Font error: {0}")]
    Font(String),
}

/// Pixel size of a prepared image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Resize, annotate and encode `params.source` into `params.output`.
    /// Returns the dimensions written.
    fn prepare(&self, params: &PrepareParams) -> Result<Dimensions, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{Annotation, AnnotationStyle, Quality};
    use std::sync::Mutex;

    /// Mock backend that records operations without executing them.
    #[derive(Default)]
    pub struct MockBackend {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// When set, `prepare` fails with this message.
        pub fail_with: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Prepare {
            source: String,
            output: String,
            max_dimension: u32,
            quality: u32,
            annotation: Option<String>,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn prepare(&self, params: &PrepareParams) -> Result<Dimensions, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Prepare {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                max_dimension: params.max_dimension,
                quality: params.quality.value(),
                annotation: params.annotation.as_ref().map(|a| a.text.clone()),
            });
            if let Some(message) = &self.fail_with {
                return Err(BackendError::ProcessingFailed(message.clone()));
            }
            Ok(Dimensions {
                width: params.max_dimension,
                height: params.max_dimension,
            })
        }
    }

    #[test]
    fn mock_records_prepare() {
        let backend = MockBackend::new();

        backend
            .prepare(&PrepareParams {
                source: "/photos/2022/a.jpg".into(),
                output: "/frame/.tmp-photo.jpg".into(),
                max_dimension: 1024,
                quality: Quality::new(85),
                annotation: Some(Annotation {
                    text: "2022 a.jpg".into(),
                    style: AnnotationStyle::default(),
                }),
            })
            .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Prepare {
                max_dimension: 1024,
                quality: 85,
                annotation: Some(text),
                ..
            } if text == "2022 a.jpg"
        ));
    }

    #[test]
    fn failing_mock_still_records() {
        let backend = MockBackend::failing("decode error");
        let result = backend.prepare(&PrepareParams {
            source: "/a.jpg".into(),
            output: "/b.jpg".into(),
            max_dimension: 10,
            quality: Quality::default(),
            annotation: None,
        });

        assert!(matches!(result, Err(BackendError::ProcessingFailed(m)) if m == "decode error"));
        assert_eq!(backend.get_operations().len(), 1);
    }
}
