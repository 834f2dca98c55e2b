//! `reelforge` - narrated short-form video generation
//!
//! Turns a topic prompt into a published vertical video: script
//! generation, speech synthesis, supporting imagery, word-timed captions,
//! ffmpeg composition, and IPFS publication.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reelforge::clients::{pinata::PinataStore, venice::VeniceClient};
//! use reelforge::config::Config;
//! use reelforge::pipeline::{GenerationRequest, Pipeline};
//! use reelforge::render::FfmpegRenderer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let venice = Arc::new(VeniceClient::new(config.venice)?);
//!     let pipeline = Pipeline::new(
//!         venice.clone(),
//!         venice.clone(),
//!         venice,
//!         Arc::new(FfmpegRenderer::new(config.render)),
//!         Arc::new(PinataStore::new(config.pinata)?),
//!     );
//!     let result = pipeline
//!         .generate(GenerationRequest::new("Turtles", "Nature Documentary"))
//!         .await?;
//!     println!("published {}", result.metadata_uri);
//!     Ok(())
//! }
//! ```

pub mod artifacts;
pub mod captions;
pub mod clients;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod retry;

pub use artifacts::ArtifactLifecycle;
pub use captions::{synchronize, CaptionEvent, TranscribedWord};
pub use error::{PipelineError, Stage};
pub use pipeline::{GenerationRequest, Pipeline, PipelineResult};
pub use retry::RetryPolicy;

/// Version of reelforge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
