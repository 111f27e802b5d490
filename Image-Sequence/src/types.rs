use gemini_image::ImageData;
use serde::{Deserialize, Serialize};

/// Lifecycle of a sequence run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunStatus {
    Idle,
    Generating,
    Success,
    Error,
    Cancelled,
}

impl RunStatus {
    /// Whether the run has stopped for good.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Cancelled)
    }
}

/// Immutable input to a run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Prompt every step is derived from.
    pub base_prompt: String,
    /// Optional image guiding every step.
    pub reference_image: Option<ImageData>,
}

impl GenerationRequest {
    pub fn new(base_prompt: impl Into<String>) -> Self {
        Self {
            base_prompt: base_prompt.into(),
            reference_image: None,
        }
    }

    pub fn with_reference(mut self, image: ImageData) -> Self {
        self.reference_image = Some(image);
        self
    }

    /// Attach a reference image given as a data URI (or bare base64).
    pub fn with_reference_data_uri(self, uri: &str) -> gemini_image::Result<Self> {
        Ok(self.with_reference(ImageData::from_data_uri(uri)?))
    }
}

/// One generation attempt within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceStep {
    /// 0-based position in the sequence.
    pub index: usize,
    pub derived_prompt: String,
}

/// An image produced by one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub source_step: usize,
    /// Serialized as a `data:` URI.
    pub image: ImageData,
}

impl GeneratedImage {
    pub fn data_uri(&self) -> String {
        self.image.to_data_uri()
    }

    /// Suggested file name, 1-based to match what users see.
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{}_{}.png", prefix, self.source_step + 1)
    }
}

/// Where and why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepError {
    pub failing_index: usize,
    pub message: String,
}

/// Snapshot of a run, handed to observers after every state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceRun {
    pub status: RunStatus,
    /// Append-only, in step order.
    pub completed_images: Vec<GeneratedImage>,
    /// 1-based number of the step in flight (0 before the first step).
    pub current_step_index: usize,
    pub total_steps: usize,
    pub last_error: Option<StepError>,
}

impl SequenceRun {
    /// A fresh, idle run for `total_steps` steps.
    pub fn new(total_steps: usize) -> Self {
        Self {
            status: RunStatus::Idle,
            completed_images: Vec::new(),
            current_step_index: 0,
            total_steps,
            last_error: None,
        }
    }

    /// Human-readable progress, e.g. "generating 3 of 7".
    pub fn progress_label(&self) -> String {
        match self.status {
            RunStatus::Idle => "idle".to_string(),
            RunStatus::Generating => format!(
                "generating {} of {}",
                self.current_step_index, self.total_steps
            ),
            RunStatus::Success => format!(
                "completed {} of {}",
                self.completed_images.len(),
                self.total_steps
            ),
            RunStatus::Error => match &self.last_error {
                Some(err) => format!("failed at {} of {}", err.failing_index + 1, self.total_steps),
                None => "failed".to_string(),
            },
            RunStatus::Cancelled => format!(
                "cancelled after {} of {}",
                self.completed_images.len(),
                self.total_steps
            ),
        }
    }

    /// Fraction of steps completed, in `0.0..=1.0`.
    pub fn fraction_complete(&self) -> f64 {
        if self.total_steps == 0 {
            0.0
        } else {
            self.completed_images.len() as f64 / self.total_steps as f64
        }
    }

    /// Most recent image, the one a viewer shows as "active".
    pub fn latest_image(&self) -> Option<&GeneratedImage> {
        self.completed_images.last()
    }
}
