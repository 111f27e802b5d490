//! # gemini-image
//!
//! Async Rust client for Gemini image generation.
//!
//! One call in, one image out: a text prompt (optionally guided by a
//! reference image) becomes a single 9:16 image returned as in-memory bytes
//! that render straight to a data URI.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gemini_image::{GeminiClient, ImageData};
//!
//! # async fn example() -> gemini_image::Result<()> {
//! let client = GeminiClient::new("my-api-key");
//!
//! let reference = ImageData::from_data_uri("data:image/png;base64,iVBORw0KGgo=")?;
//! let image = client
//!     .generate_image("the same character, underwater", Some(&reference))
//!     .await?;
//!
//! println!("{}", &image.to_data_uri()[..40]);
//! image.save("out.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Payloads
//!
//! Request construction and response parsing are pure functions, usable
//! without a network:
//!
//! ```
//! use gemini_image::{build_request, ASPECT_RATIO};
//!
//! let req = build_request("a red fox", None);
//! assert_eq!(req.generation_config.image_config.aspect_ratio, ASPECT_RATIO);
//! ```

pub mod client;
pub mod error;
pub mod payload;
pub mod types;

pub use client::{GeminiClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use error::{GeminiError, Result};
pub use payload::{build_request, extract_image, ASPECT_RATIO};
pub use types::{GenerateContentRequest, GenerateContentResponse, ImageData, DEFAULT_MIME_TYPE};
