//! # Image Sequence
//!
//! Generates a themed sequence of images from one prompt and an optional
//! reference image, one step at a time.
//!
//! ## Features
//!
//! - **Strictly sequential steps**: each generator call is awaited before the
//!   next step is built, so results are always in step order
//! - **Per-step prompt variation**: a pure, replaceable policy derives each
//!   step's prompt from the base prompt
//! - **Progress snapshots**: observers get an immutable [`SequenceRun`] after
//!   every state change
//! - **Partial results**: the first failure stops the run and returns the
//!   images generated so far along with the failing step
//! - **Cancellation**: interrupt between steps via `AtomicBool`
//! - **One run at a time**: a second concurrent run is refused
//!
//! ## Quick Start
//!
//! ```no_run
//! use gemini_image::GeminiClient;
//! use image_sequence::{GenerationRequest, SequenceController, SequenceError, TracingSink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GeminiClient::new(std::env::var("GEMINI_API_KEY")?);
//!
//!     let controller = SequenceController::builder(client)
//!         .add_sink(TracingSink)
//!         .build()?;
//!
//!     let request = GenerationRequest::new("A creature made entirely of water");
//!     match controller
//!         .run_with_progress(&request, |run| println!("{}", run.progress_label()))
//!         .await
//!     {
//!         Ok(images) => println!("Generated {} images", images.len()),
//!         Err(SequenceError::StepFailed { failing_index, completed, .. }) => {
//!             println!("Step {} failed, kept {} images", failing_index, completed.len())
//!         }
//!         Err(e) => return Err(e.into()),
//!     }
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use gemini_image::{GeminiClient, GeminiError, ImageData};

pub mod config;
pub mod controller;
pub mod error;
pub mod prompt;
pub mod sink;
pub mod types;

pub use config::{SequenceConfig, SequenceConfigBuilder, DEFAULT_SEQUENCE_LENGTH};
pub use controller::{SequenceController, SequenceControllerBuilder};
pub use error::{Result, SequenceError};
pub use prompt::{PromptVariation, VariationTemplate, DEFAULT_VARIATION_TEMPLATE};
pub use sink::{ProgressSink, SnapshotHistory, TracingSink};
pub use types::{
    GeneratedImage, GenerationRequest, RunStatus, SequenceRun, SequenceStep, StepError,
};

/// Produces one image per call.
///
/// This is the boundary between the controller and whatever service
/// renders images. [`GeminiClient`] implements it; tests use fakes.
///
/// # Example
///
/// ```
/// use gemini_image::ImageData;
/// use image_sequence::ImageGenerator;
///
/// struct Solid;
///
/// impl ImageGenerator for Solid {
///     type Error = std::convert::Infallible;
///
///     async fn generate_image(
///         &self,
///         _prompt: &str,
///         _reference: Option<&ImageData>,
///     ) -> Result<ImageData, Self::Error> {
///         Ok(ImageData::png(vec![0x89, b'P', b'N', b'G']))
///     }
/// }
/// ```
pub trait ImageGenerator: Send + Sync {
    /// Failure type. The controller only uses its `Display` text.
    type Error: std::fmt::Display + Send;

    /// Generate one image from `prompt`, guided by `reference` when given.
    fn generate_image(
        &self,
        prompt: &str,
        reference: Option<&ImageData>,
    ) -> impl Future<Output = std::result::Result<ImageData, Self::Error>> + Send;
}

impl ImageGenerator for GeminiClient {
    type Error = GeminiError;

    fn generate_image(
        &self,
        prompt: &str,
        reference: Option<&ImageData>,
    ) -> impl Future<Output = std::result::Result<ImageData, Self::Error>> + Send {
        GeminiClient::generate_image(self, prompt, reference)
    }
}

impl<G: ImageGenerator> ImageGenerator for Arc<G> {
    type Error = G::Error;

    fn generate_image(
        &self,
        prompt: &str,
        reference: Option<&ImageData>,
    ) -> impl Future<Output = std::result::Result<ImageData, Self::Error>> + Send {
        (**self).generate_image(prompt, reference)
    }
}
