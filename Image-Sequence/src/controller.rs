use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    config::SequenceConfig,
    error::{Result, SequenceError},
    prompt::{PromptVariation, VariationTemplate},
    sink::ProgressSink,
    types::{GeneratedImage, GenerationRequest, RunStatus, SequenceRun, SequenceStep, StepError},
    ImageGenerator,
};

/// Drives a run: one generator call per step, strictly in order.
///
/// Each step's prompt is derived from the base prompt, the generator is
/// awaited, and the result is appended before the next step begins. The
/// first failure stops the run; images from earlier steps are handed back
/// inside the error. Only one run may be active per controller.
pub struct SequenceController<G: ImageGenerator> {
    generator: G,
    prompts: Box<dyn PromptVariation>,
    config: SequenceConfig,
    sinks: Vec<Box<dyn ProgressSink>>,
    cancellation: Option<Arc<AtomicBool>>,
    running: AtomicBool,
}

impl<G: ImageGenerator> std::fmt::Debug for SequenceController<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceController")
            .field("config", &self.config)
            .field("sinks", &self.sinks.len())
            .field("has_cancellation", &self.cancellation.is_some())
            .field("running", &self.is_running())
            .finish()
    }
}

/// Clears the running flag when the run ends, including when the run's
/// future is dropped mid-step.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SequenceError::AlreadyRunning)?;
        Ok(Self(flag))
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<G: ImageGenerator> SequenceController<G> {
    /// Controller with the default seven-step config and prompt template.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            prompts: Box::new(VariationTemplate::default()),
            config: SequenceConfig::default(),
            sinks: Vec::new(),
            cancellation: None,
            running: AtomicBool::new(false),
        }
    }

    /// Create a new controller builder.
    pub fn builder(generator: G) -> SequenceControllerBuilder<G> {
        SequenceControllerBuilder::new(generator)
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// The step a run would execute at `index`.
    pub fn step(&self, base_prompt: &str, index: usize) -> SequenceStep {
        SequenceStep {
            index,
            derived_prompt: self.prompts.derive(base_prompt, index),
        }
    }

    fn check_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    fn publish<F>(&self, run: &SequenceRun, on_progress: &mut F)
    where
        F: FnMut(&SequenceRun),
    {
        for sink in &self.sinks {
            sink.on_progress(run);
        }
        on_progress(run);
    }

    /// Run the sequence, publishing snapshots to the attached sinks only.
    pub async fn run(&self, request: &GenerationRequest) -> Result<Vec<GeneratedImage>> {
        self.run_with_progress(request, |_| {}).await
    }

    /// Run the sequence, calling `on_progress` (after the attached sinks)
    /// with a snapshot after every state change.
    ///
    /// Per step, observers see one snapshot before the generator call (with
    /// `current_step_index` already advanced) and one after the image is
    /// appended. A final snapshot carries the terminal status.
    pub async fn run_with_progress<F>(
        &self,
        request: &GenerationRequest,
        mut on_progress: F,
    ) -> Result<Vec<GeneratedImage>>
    where
        F: FnMut(&SequenceRun),
    {
        let _guard = RunningGuard::acquire(&self.running)?;

        let total = self.config.sequence_length;
        let mut run = SequenceRun::new(total);
        run.status = RunStatus::Generating;

        tracing::info!(
            total,
            has_reference = request.reference_image.is_some(),
            "starting image sequence"
        );

        for index in 0..total {
            if self.check_cancelled() {
                tracing::warn!(
                    completed = run.completed_images.len(),
                    "image sequence cancelled"
                );
                run.status = RunStatus::Cancelled;
                self.publish(&run, &mut on_progress);
                return Err(SequenceError::Cancelled {
                    completed: run.completed_images,
                });
            }

            let step = self.step(&request.base_prompt, index);
            run.current_step_index = index + 1;
            self.publish(&run, &mut on_progress);

            let result = self
                .generator
                .generate_image(&step.derived_prompt, request.reference_image.as_ref())
                .await;

            match result {
                Ok(image) => {
                    run.completed_images.push(GeneratedImage {
                        source_step: step.index,
                        image,
                    });
                    self.publish(&run, &mut on_progress);
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::warn!(step = index + 1, total, error = %message, "image generation failed");
                    run.status = RunStatus::Error;
                    run.last_error = Some(StepError {
                        failing_index: index,
                        message: message.clone(),
                    });
                    self.publish(&run, &mut on_progress);
                    return Err(SequenceError::StepFailed {
                        failing_index: index,
                        message,
                        completed: run.completed_images,
                    });
                }
            }
        }

        run.status = RunStatus::Success;
        self.publish(&run, &mut on_progress);
        tracing::info!(images = run.completed_images.len(), "image sequence complete");

        Ok(run.completed_images)
    }
}

/// Builder for creating controllers.
pub struct SequenceControllerBuilder<G: ImageGenerator> {
    generator: G,
    prompts: Box<dyn PromptVariation>,
    config: SequenceConfig,
    sinks: Vec<Box<dyn ProgressSink>>,
    cancellation: Option<Arc<AtomicBool>>,
}

impl<G: ImageGenerator> SequenceControllerBuilder<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            prompts: Box::new(VariationTemplate::default()),
            config: SequenceConfig::default(),
            sinks: Vec::new(),
            cancellation: None,
        }
    }

    /// Replace the per-step prompt policy.
    pub fn with_prompt_variation(mut self, prompts: impl PromptVariation + 'static) -> Self {
        self.prompts = Box::new(prompts);
        self
    }

    pub fn with_config(mut self, config: SequenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for a config with only the length changed.
    pub fn with_sequence_length(mut self, length: usize) -> Self {
        self.config.sequence_length = length;
        self
    }

    /// Attach an observer that receives every snapshot.
    pub fn add_sink(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Set a cancellation flag, checked before each step.
    pub fn with_cancellation(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancellation = Some(cancel);
        self
    }

    /// Build the controller, validating configuration.
    pub fn build(self) -> Result<SequenceController<G>> {
        self.config.validate()?;

        Ok(SequenceController {
            generator: self.generator,
            prompts: self.prompts,
            config: self.config,
            sinks: self.sinks,
            cancellation: self.cancellation,
            running: AtomicBool::new(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SnapshotHistory;
    use gemini_image::ImageData;
    use std::sync::atomic::AtomicUsize;

    /// Returns `img{i}` for call `i`, failing on `fail_at` when set.
    struct Scripted {
        calls: AtomicUsize,
        fail_at: Option<usize>,
    }

    impl Scripted {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_at: None,
            }
        }

        fn failing_at(index: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_at: Some(index),
            }
        }
    }

    impl ImageGenerator for Scripted {
        type Error = String;

        async fn generate_image(
            &self,
            _prompt: &str,
            _reference: Option<&ImageData>,
        ) -> std::result::Result<ImageData, String> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_at == Some(i) {
                return Err("no image in response".to_string());
            }
            Ok(ImageData::png(format!("img{}", i).into_bytes()))
        }
    }

    #[test]
    fn test_builder_rejects_zero_length() {
        let result = SequenceController::builder(Scripted::ok())
            .with_sequence_length(0)
            .build();
        assert!(matches!(result, Err(SequenceError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_uses_defaults() {
        let controller = SequenceController::new(Scripted::ok());
        assert_eq!(controller.config().sequence_length, 7);
        assert!(!controller.is_running());
        assert_eq!(
            controller.step("X", 0).derived_prompt,
            "X Variation 1: focus on different lighting and water splashes."
        );
    }

    #[test]
    fn test_run_success() {
        let controller = SequenceController::new(Scripted::ok());
        let images = tokio_test::block_on(controller.run(&GenerationRequest::new("X"))).unwrap();

        let bytes: Vec<_> = images.iter().map(|i| i.image.bytes.clone()).collect();
        let expected: Vec<_> = (0..7).map(|i| format!("img{}", i).into_bytes()).collect();
        assert_eq!(bytes, expected);
        assert!(images.iter().enumerate().all(|(i, img)| img.source_step == i));
        assert!(!controller.is_running());
    }

    #[test]
    fn test_failure_keeps_partial_results() {
        let history = SnapshotHistory::new();
        let controller = SequenceController::builder(Scripted::failing_at(3))
            .add_sink(history.clone())
            .build()
            .unwrap();

        let err = tokio_test::block_on(controller.run(&GenerationRequest::new("X"))).unwrap_err();
        match &err {
            SequenceError::StepFailed {
                failing_index,
                message,
                completed,
            } => {
                assert_eq!(*failing_index, 3);
                assert_eq!(message, "no image in response");
                assert_eq!(completed.len(), 3);
            }
            other => panic!("Expected StepFailed error, got {:?}", other),
        }
        assert_eq!(err.to_string(), "image 4 failed: no image in response");
        assert_eq!(controller.generator().calls.load(Ordering::SeqCst), 4);

        let last = history.latest().unwrap();
        assert_eq!(last.status, RunStatus::Error);
        assert_eq!(last.completed_images.len(), 3);
        assert_eq!(last.last_error.unwrap().failing_index, 3);
        assert!(!controller.is_running());
    }

    #[test]
    fn test_cancel_before_first_step() {
        let cancel = Arc::new(AtomicBool::new(true));
        let controller = SequenceController::builder(Scripted::ok())
            .with_cancellation(cancel)
            .build()
            .unwrap();

        let err = tokio_test::block_on(controller.run(&GenerationRequest::new("X"))).unwrap_err();
        assert!(matches!(err, SequenceError::Cancelled { ref completed } if completed.is_empty()));
        assert_eq!(controller.generator().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_guard_blocks_while_held() {
        let flag = AtomicBool::new(false);
        let guard = RunningGuard::acquire(&flag).unwrap();
        assert!(matches!(
            RunningGuard::acquire(&flag),
            Err(SequenceError::AlreadyRunning)
        ));
        drop(guard);
        assert!(RunningGuard::acquire(&flag).is_ok());
    }
}
