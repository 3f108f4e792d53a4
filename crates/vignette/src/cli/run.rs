//! Command handlers.

use std::error::Error;
use std::path::Path;

use strum::IntoEnumIterator;
use vignette_core::{BuiltinFormat, HookStrategy, OutputMode};
use vignette_generator::{AccountConfig, CarouselGenerator, GenerateRequest};
use vignette_models::{GeminiImageClient, GeminiImageModel, OpenRouterClient, PexelsClient};

use super::GenerateArgs;

/// Run the generate command, returning the number of failed items.
///
/// Batch runs keep going past individual failures; each item either
/// produces a complete artifact directory or logs the stage it failed
/// in.
pub async fn run_generate(args: GenerateArgs) -> Result<usize, Box<dyn Error>> {
    if args.topic.is_none() && !args.random {
        return Err("Either --topic or --random is required".into());
    }

    let config = AccountConfig::load(&args.account)?;

    let openrouter_key = std::env::var("OPENROUTER_API_KEY")
        .map_err(|_| "OPENROUTER_API_KEY environment variable not set")?;
    let text_model = OpenRouterClient::new(openrouter_key.clone(), &config.model);
    let embedder = OpenRouterClient::new(openrouter_key, &config.model);

    let synthesizer = std::env::var("GEMINI_API_KEY")
        .ok()
        .map(|key| GeminiImageClient::new(key, GeminiImageModel::Pro));
    let stock = std::env::var("PEXELS_API_KEY").ok().map(PexelsClient::new);

    let mut generator = CarouselGenerator::new(config, text_model, embedder, synthesizer, stock)?;

    let request = GenerateRequest {
        topic: args.topic.clone(),
        format: args.format.clone(),
        num_items: args.items,
        hook_strategy: if args.no_quality_check {
            HookStrategy::Template
        } else {
            HookStrategy::Viral
        },
    };

    let mut failures = 0;
    for item in 1..=args.count {
        tracing::info!(item, count = args.count, "Generating carousel");
        match generator.generate(&request).await {
            Ok(artifact) => {
                println!("{}", artifact.meta().output_dir().display());
            }
            Err(e) => {
                tracing::error!(item, error = %e, "Generation failed");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        tracing::warn!(failures, count = args.count, "Batch finished with failures");
    }
    Ok(failures)
}

/// List the built-in formats, plus an account's cloned formats when a
/// config path is given.
pub fn list_formats(account: Option<&Path>) -> Result<(), Box<dyn Error>> {
    println!("Built-in formats:");
    for format in BuiltinFormat::iter() {
        let mode = match format.output_mode() {
            OutputMode::Structured => "structured",
            OutputMode::Heuristic => "heuristic",
        };
        let imagery = if format.uses_stock_photos() {
            "stock photos"
        } else {
            "generated images"
        };
        println!("  {format:<14} {mode:<11} {imagery}");
    }

    if let Some(path) = account {
        let config = AccountConfig::load(path)?;
        if !config.cloned_formats.is_empty() {
            println!("\nCloned formats ({}):", config.account_name);
            for cloned in &config.cloned_formats {
                println!("  {:<14} {} slides", cloned.name, cloned.slide_count);
            }
        }
    }

    Ok(())
}
