//! Carousel generation: parsing, acquisition, prompts, and the orchestrator.
//!
//! The pipeline for one carousel is sequential: build a format-specific
//! prompt, call the text model, parse the reply into slides, gate the hook
//! through the scorer with bounded retries, acquire one image per slide,
//! composite the slide text, and persist the artifact set. Each stage lives
//! in its own module; [`CarouselGenerator`] wires them together.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod account;
mod acquire;
mod generator;
mod history;
mod parser;
mod prompts;
mod slug;
mod storage;
mod topics;

pub use account::{
    AccountConfig, BrandIdentity, CarouselStrategy, ColorScheme, HashtagStrategy, OutputConfig,
    QualityOverrides, TopicTrackerConfig,
};
pub use acquire::{acquire_generated, acquire_stock};
pub use generator::{CarouselGenerator, GenerateRequest};
pub use history::{evict_oldest, StockPhotoHistory};
pub use parser::{parse_response, ParsedResponse};
pub use slug::slugify;
pub use storage::{create_output_dir, persist_artifact, persist_slide};
pub use topics::{determine_builtin_format, random_topic, TopicTracker};
