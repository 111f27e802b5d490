//! Generate a seven-image sequence and save every image that completes.
//!
//! Run with:
//! `cargo run --example generate_sequence -- "<prompt>" [reference.png] [out_dir]`
//!
//! Requires `GEMINI_API_KEY` (or `API_KEY`). Set `RUST_LOG=debug` for
//! per-step logs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use gemini_image::{GeminiClient, ImageData};
use image_sequence::{GeneratedImage, GenerationRequest, SequenceController, SequenceError, TracingSink};

const DEFAULT_PROMPT: &str = "A humanoid creature made entirely of crystal-clear liquid water, \
    in a dynamic artistic pose. Internal bubbles and light refractions. Blurred mystical \
    nature background. Cinematic quality, ultra detailed.";

fn save_all(images: &[GeneratedImage], dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    for img in images {
        let path = dir.join(img.file_name("sequence"));
        img.image
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  saved {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let prompt = args.next().unwrap_or_else(|| DEFAULT_PROMPT.to_string());
    let reference = args.next();
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "sequence_out".to_string()));

    let api_key = std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("API_KEY"))
        .context("set GEMINI_API_KEY or API_KEY")?;

    let mut request = GenerationRequest::new(prompt);
    if let Some(path) = reference {
        let image = ImageData::from_file(&path).with_context(|| format!("reading {}", path))?;
        request = request.with_reference(image);
    }

    let controller = SequenceController::builder(GeminiClient::new(api_key))
        .add_sink(TracingSink)
        .build()?;

    let result = controller
        .run_with_progress(&request, |run| {
            println!(
                "[{:>3.0}%] {}",
                run.fraction_complete() * 100.0,
                run.progress_label()
            )
        })
        .await;

    match result {
        Ok(images) => {
            println!("Sequence complete: {} images", images.len());
            save_all(&images, &out_dir)?;
        }
        Err(err @ SequenceError::StepFailed { .. }) => {
            eprintln!("{}", err);
            let partial = err.into_completed_images();
            println!("Keeping {} image(s) generated before the failure", partial.len());
            save_all(&partial, &out_dir)?;
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
