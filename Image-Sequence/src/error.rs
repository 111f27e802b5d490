use thiserror::Error;

use crate::types::GeneratedImage;

#[derive(Error, Debug)]
pub enum SequenceError {
    /// A step's generator call failed. Images from earlier steps are kept.
    #[error("image {} failed: {message}", .failing_index + 1)]
    StepFailed {
        failing_index: usize,
        message: String,
        completed: Vec<GeneratedImage>,
    },

    #[error("Sequence was cancelled after {} image(s)", .completed.len())]
    Cancelled { completed: Vec<GeneratedImage> },

    #[error("A sequence is already running")]
    AlreadyRunning,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SequenceError {
    /// Images generated before the run stopped. Empty for errors raised
    /// before any step ran.
    pub fn completed_images(&self) -> &[GeneratedImage] {
        match self {
            SequenceError::StepFailed { completed, .. } | SequenceError::Cancelled { completed } => {
                completed
            }
            SequenceError::AlreadyRunning | SequenceError::InvalidConfig(_) => &[],
        }
    }

    /// Take ownership of the partial results.
    pub fn into_completed_images(self) -> Vec<GeneratedImage> {
        match self {
            SequenceError::StepFailed { completed, .. } | SequenceError::Cancelled { completed } => {
                completed
            }
            SequenceError::AlreadyRunning | SequenceError::InvalidConfig(_) => Vec::new(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SequenceError>;
