//! Generate one image, optionally guided by a reference image.
//!
//! Run with: `cargo run --example single_image -- "<prompt>" [reference.png|jpg|webp]`
//!
//! Requires the `GEMINI_API_KEY` environment variable.

use gemini_image::{GeminiClient, ImageData};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let prompt = args
        .next()
        .unwrap_or_else(|| "A crystal-clear water creature in a misty forest".to_string());
    let reference = match args.next() {
        Some(path) => Some(ImageData::from_file(path)?),
        None => None,
    };

    let api_key = std::env::var("GEMINI_API_KEY")?;
    let client = GeminiClient::new(api_key);

    println!("Generating with {}...", client.model());
    let image = client.generate_image(&prompt, reference.as_ref()).await?;
    image.save("single_image.png")?;
    println!("Saved single_image.png ({} bytes)", image.len());

    Ok(())
}
