//! The carousel generation orchestrator.
//!
//! One `generate()` call runs the whole pipeline: topic selection,
//! format resolution, the hook-quality retry loop, image prompt
//! construction, acquisition, rendering, and persistence. A request
//! either returns a complete artifact or fails naming the stage that
//! broke; nothing partial is ever reported as success.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use rand::seq::SliceRandom;
use regex::Regex;
use vignette_core::{
    ArtifactMeta, CarouselArtifact, ChatMessage, ChatRequest, ContentFormat, GenerationAttempt,
    HookStrategy, ScoreResult,
};
use vignette_core::{BuiltinFormat, ClonedFormat};
use vignette_error::{ConfigError, GenerationError, GenerationStage, VignetteResult};
use vignette_interface::{EmbeddingModel, ImageSynthesizer, StockPhotoProvider, TextModel};
use vignette_render::Compositor;
use vignette_scorer::HookScorer;

use crate::account::AccountConfig;
use crate::acquire::{acquire_generated, acquire_stock};
use crate::history::StockPhotoHistory;
use crate::parser::parse_response;
use crate::prompts;
use crate::storage::{create_output_dir, persist_artifact, persist_slide};
use crate::topics::{determine_builtin_format, random_topic, TopicTracker};

/// Interior item count ceiling applied to every built-in format.
const BUILTIN_ITEM_CAP: usize = 5;

static SCENE_ARRAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("scene array pattern"));

/// One generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Topic to write about; `None` picks a random content pillar
    pub topic: Option<String>,
    /// Format registry name; `None` resolves from config then topic
    pub format: Option<String>,
    /// Interior item count for built-in formats
    pub num_items: usize,
    /// Hook strategy
    pub hook_strategy: HookStrategy,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            topic: None,
            format: None,
            num_items: 5,
            hook_strategy: HookStrategy::Viral,
        }
    }
}

/// The generation pipeline, generic over its four service seams.
pub struct CarouselGenerator<T, E, I, S> {
    config: AccountConfig,
    text_model: T,
    scorer: HookScorer<E>,
    synthesizer: Option<I>,
    stock: Option<S>,
    compositor: Compositor,
    tracker: TopicTracker,
    stock_history_path: PathBuf,
}

impl<T, E, I, S> CarouselGenerator<T, E, I, S>
where
    T: TextModel,
    E: EmbeddingModel,
    I: ImageSynthesizer,
    S: StockPhotoProvider,
{
    /// Assemble a generator from a validated config and its services.
    ///
    /// Formats that generate imagery need `synthesizer`; formats that
    /// use stock photos need `stock`. Either may be absent when the
    /// account never touches that path.
    ///
    /// # Errors
    ///
    /// Fails if the bundled fonts cannot be loaded.
    pub fn new(
        config: AccountConfig,
        text_model: T,
        embedder: E,
        synthesizer: Option<I>,
        stock: Option<S>,
    ) -> VignetteResult<Self> {
        let compositor = Compositor::new()?;
        let scorer =
            HookScorer::new(embedder).with_custom_references(config.scoring_references.clone());
        let tracker = TopicTracker::load(
            &config.output.base_directory.join("topic_history.json"),
            &config.account_name,
            config.topic_tracker.max_history,
            config.topic_tracker.similarity_threshold,
        );
        let stock_history_path = config.output.base_directory.join("stock_photo_history.json");
        Ok(Self {
            config,
            text_model,
            scorer,
            synthesizer,
            stock,
            compositor,
            tracker,
            stock_history_path,
        })
    }

    /// Consume the generator, handing back its text model.
    pub fn into_text_model(self) -> T {
        self.text_model
    }

    /// Run one full generation.
    ///
    /// # Errors
    ///
    /// Fails with the stage that broke: prompting, scoring, acquisition,
    /// rendering, or persistence. Hook attempts that never clear the
    /// quality gate are not an error; the best-scoring attempt is used.
    #[tracing::instrument(skip(self, request), fields(account = %self.config.account_name))]
    pub async fn generate(&mut self, request: &GenerateRequest) -> VignetteResult<CarouselArtifact> {
        let topic = match &request.topic {
            Some(topic) => topic.clone(),
            None => random_topic(&self.config.content_pillars).ok_or_else(|| {
                GenerationError::new(
                    GenerationStage::Prompting,
                    "No topic given and no content pillars configured",
                )
            })?,
        };

        let format = resolve_format(&self.config, request.format.as_deref(), &topic)?;
        let num_items = resolve_num_items(&self.config, &format, request.num_items)?;
        tracing::info!(topic = %topic, format = %format.name(), num_items, "Generating carousel");

        if let Some(similar) = self.tracker.similar_recent(&topic) {
            tracing::warn!(similar = %similar, "Topic similar to a recent one, proceeding anyway");
        }

        let (attempt, stock_query) = self
            .generate_content(&format, &topic, num_items, request.hook_strategy)
            .await?;
        let slides = attempt.slides.clone();
        let total_slides = slides.len();

        let (assets, image_prompts) = if format.uses_stock_photos() {
            let provider = self.stock.as_ref().ok_or_else(|| {
                GenerationError::new(
                    GenerationStage::Acquisition,
                    "Format requires a stock photo provider but none is configured",
                )
            })?;
            let mut history = StockPhotoHistory::load(&self.stock_history_path);
            let assets = acquire_stock(
                provider,
                &mut history,
                &format,
                &topic,
                stock_query.as_deref(),
                total_slides,
            )
            .await?;
            (assets, Vec::new())
        } else {
            let synthesizer = self.synthesizer.as_ref().ok_or_else(|| {
                GenerationError::new(
                    GenerationStage::Acquisition,
                    "Format requires an image synthesizer but none is configured",
                )
            })?;
            let image_prompts = match &format {
                ContentFormat::Cloned(cloned) => {
                    cloned_image_prompts(cloned, &topic, total_slides)
                }
                ContentFormat::Builtin(_) => self.scene_prompts(&topic, &slides).await,
            };
            let assets = acquire_generated(synthesizer, &image_prompts).await?;
            (assets, image_prompts)
        };

        let output_dir = create_output_dir(&self.config.output.base_directory, &topic)?;
        let mut rendered_paths = Vec::with_capacity(total_slides);
        for (index, (asset, slide)) in assets.iter().zip(slides.iter()).enumerate() {
            let is_hook = index == 0 || index == total_slides - 1;
            let png = self
                .compositor
                .render_slide(&asset.data, &slide.text, is_hook)?;
            rendered_paths.push(persist_slide(&output_dir, index, &png)?);
        }

        let caption = self.build_caption(&format, &attempt, &topic).await;

        let meta = ArtifactMeta::new(
            self.config.account_name.clone(),
            topic.clone(),
            format.name(),
            num_items,
            request.hook_strategy.to_string(),
            output_dir.clone(),
        );
        let artifact = CarouselArtifact::new(slides, rendered_paths, caption, image_prompts, meta);
        persist_artifact(&artifact)?;
        self.tracker.add_topic(&topic, &output_dir)?;

        tracing::info!(output_dir = %output_dir.display(), slides = total_slides, "Carousel created");
        Ok(artifact)
    }

    /// The hook-quality retry loop.
    ///
    /// Runs up to the format's attempt budget, folding score feedback
    /// into the next prompt. The first passing attempt wins; once the
    /// budget is spent the best-scoring attempt is used instead. Also
    /// returns the stock query surfaced by a structured reply, if any.
    async fn generate_content(
        &self,
        format: &ContentFormat,
        topic: &str,
        num_items: usize,
        strategy: HookStrategy,
    ) -> VignetteResult<(GenerationAttempt, Option<String>)> {
        let max_attempts = format.max_attempts(strategy);
        let system = prompts::build_system_prompt(&self.config.brand_identity);
        let niche = self.config.brand_identity.value_proposition.clone();
        let min_score = self.config.quality.min_hook_score;
        let max_words = self.config.quality.max_words_per_slide;

        let mut best: Option<(GenerationAttempt, Option<String>)> = None;
        let mut feedback: Option<ScoreResult> = None;

        for attempt_number in 1..=max_attempts {
            let prompt = prompts::build_content_prompt(
                format,
                topic,
                num_items,
                strategy,
                max_words,
                feedback.as_ref().map(|score| (score, min_score)),
                &niche,
            );
            let raw = self
                .text_model
                .complete(&ChatRequest::prompted(system.clone(), prompt, 0.8, 1000))
                .await?;
            let parsed = parse_response(&raw, format, topic, num_items);
            let mut attempt = GenerationAttempt {
                attempt_number,
                raw_model_output: raw,
                slides: parsed.slides,
                caption: parsed.caption,
                score: None,
            };

            if strategy == HookStrategy::Template {
                return Ok((attempt, parsed.stock_query));
            }

            let score = self
                .scorer
                .score(&attempt.slides[0].text, min_score, max_words)
                .await?;
            let passed = score.passed;
            let total = score.total;
            attempt.score = Some(score);

            if passed {
                tracing::info!(total, attempt = attempt_number, "Hook cleared the quality gate");
                return Ok((attempt, parsed.stock_query));
            }
            tracing::warn!(
                total,
                need = min_score,
                attempt = attempt_number,
                max_attempts,
                "Hook failed the quality gate"
            );

            feedback = attempt.score.clone();
            let is_better = best
                .as_ref()
                .map(|(b, _)| attempt.total() > b.total())
                .unwrap_or(true);
            if is_better {
                best = Some((attempt, parsed.stock_query));
            }
        }

        let (best_attempt, stock_query) = best.ok_or_else(|| {
            GenerationError::new(GenerationStage::Scoring, "Attempt budget was zero")
        })?;
        tracing::warn!(
            total = best_attempt.total(),
            "Using best attempt after exhausting the retry budget"
        );
        Ok((best_attempt, stock_query))
    }

    /// Per-slide scene prompts for generated imagery.
    ///
    /// The hook scene comes from a dedicated model call; interior
    /// scenes from a JSON-array request covering every later slide.
    /// Either call failing falls back to deterministic prompts built
    /// from the slide text, never to an error.
    async fn scene_prompts(&self, topic: &str, slides: &[vignette_core::Slide]) -> Vec<String> {
        let aesthetic = {
            let mut rng = rand::thread_rng();
            prompts::AESTHETIC_STYLES
                .choose(&mut rng)
                .copied()
                .unwrap_or(prompts::AESTHETIC_STYLES[0])
        };
        let niche = &self.config.brand_identity.value_proposition;
        let hook = &slides[0].text;

        let hook_request = ChatRequest::prompted(
            prompts::hook_scene_system_prompt(niche),
            prompts::hook_scene_user_prompt(topic, hook, niche),
            0.7,
            200,
        );
        let hook_prompt = match self.text_model.complete(&hook_request).await {
            Ok(scene) => format!("{}, {aesthetic}", scene.trim()),
            Err(e) => {
                tracing::warn!(error = %e, "Hook scene call failed, using fallback prompt");
                prompts::fallback_scene_prompt(hook, topic, aesthetic)
            }
        };

        let interior: Vec<String> = slides[1..].iter().map(|s| s.text.clone()).collect();
        let list_request = ChatRequest::prompted(
            format!(
                "You are an expert at creating visual scene descriptions for {niche}."
            ),
            prompts::build_scene_list_prompt(topic, &interior, aesthetic, niche),
            0.3,
            800,
        );
        let interior_prompts = match self.text_model.complete(&list_request).await {
            Ok(reply) => extract_scene_array(&reply, interior.len())
                .map(|scenes| {
                    scenes
                        .into_iter()
                        .map(|scene| format!("{scene}, {aesthetic}"))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_else(|| {
                    tracing::warn!("Scene list reply unusable, using fallback prompts");
                    fallback_interior_prompts(&interior, topic, aesthetic)
                }),
            Err(e) => {
                tracing::warn!(error = %e, "Scene list call failed, using fallback prompts");
                fallback_interior_prompts(&interior, topic, aesthetic)
            }
        };

        let mut all = Vec::with_capacity(slides.len());
        all.push(hook_prompt);
        all.extend(interior_prompts);
        all
    }

    /// Assemble the final caption including the hashtag line.
    ///
    /// Cloned formats reuse the caption from their structured reply so
    /// the closing call-to-action matches the cloned style. Everything
    /// else gets a dedicated caption call, falling back to a fixed line
    /// when the call fails.
    async fn build_caption(
        &self,
        format: &ContentFormat,
        attempt: &GenerationAttempt,
        topic: &str,
    ) -> String {
        let hashtags = prompts::topic_hashtags(&self.config.hashtag_strategy, topic);

        if matches!(format, ContentFormat::Cloned(_)) {
            if let Some(caption) = &attempt.caption {
                return format!("{caption}\n\n{hashtags}");
            }
        }

        let hook = attempt.slides[0].text.clone();
        let interior: Vec<String> = attempt
            .slides
            .iter()
            .skip(1)
            .take(attempt.slides.len().saturating_sub(2))
            .map(|s| s.text.clone())
            .collect();
        let request = ChatRequest {
            messages: vec![ChatMessage::user(prompts::build_caption_prompt(
                topic, &hook, &interior,
            ))],
            temperature: 0.7,
            max_tokens: 150,
        };
        let caption = match self.text_model.complete(&request).await {
            Ok(reply) => reply
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Caption call failed, using fallback");
                prompts::FALLBACK_CAPTION.to_string()
            }
        };
        format!("{caption}\n\n{hashtags}")
    }
}

/// Resolve a format name through the cloned registry, then the built-ins,
/// then (with no name at all) by topic keywords.
fn resolve_format(
    config: &AccountConfig,
    requested: Option<&str>,
    topic: &str,
) -> VignetteResult<ContentFormat> {
    let name = requested.or(config.carousel_strategy.format.as_deref());
    match name {
        Some(name) => {
            if let Some(cloned) = config.cloned_format(name) {
                return Ok(ContentFormat::Cloned(cloned.clone()));
            }
            BuiltinFormat::from_str(name)
                .map(ContentFormat::Builtin)
                .map_err(|_| ConfigError::new(format!("Unknown format: {name}")).into())
        }
        None => Ok(ContentFormat::Builtin(determine_builtin_format(topic))),
    }
}

/// Resolve the interior item count.
///
/// Cloned formats dictate their own slide count. Built-in formats take
/// the requested count, must sit inside the configured range, and are
/// then capped at five to keep carousels concise.
fn resolve_num_items(
    config: &AccountConfig,
    format: &ContentFormat,
    requested: usize,
) -> VignetteResult<usize> {
    if let ContentFormat::Cloned(cloned) = format {
        return Ok(cloned.slide_count.saturating_sub(2));
    }
    let (low, high) = config.carousel_strategy.slide_count_range;
    if !(low..=high).contains(&requested) {
        return Err(ConfigError::new(format!(
            "Invalid item count: {requested}. Must be {low}-{high}."
        ))
        .into());
    }
    if requested > BUILTIN_ITEM_CAP {
        tracing::info!(requested, cap = BUILTIN_ITEM_CAP, "Capping item count");
        return Ok(BUILTIN_ITEM_CAP);
    }
    Ok(requested)
}

/// Image prompts for a cloned format: its templates with `{topic}`
/// substituted, padded with a generic scene and trimmed to the slide
/// count.
fn cloned_image_prompts(cloned: &ClonedFormat, topic: &str, total: usize) -> Vec<String> {
    let mut prompts: Vec<String> = cloned
        .image_prompt_templates
        .iter()
        .map(|template| template.replace("{topic}", topic))
        .collect();
    while prompts.len() < total {
        prompts.push(format!("Scene related to {topic}, clean composition"));
    }
    prompts.truncate(total);
    prompts
}

/// Pull a JSON string array with exactly `expected` entries out of a
/// scene-list reply.
fn extract_scene_array(reply: &str, expected: usize) -> Option<Vec<String>> {
    let matched = SCENE_ARRAY_RE.find(reply)?;
    let scenes: Vec<String> = serde_json::from_str(matched.as_str()).ok()?;
    if scenes.len() == expected {
        Some(scenes)
    } else {
        tracing::warn!(got = scenes.len(), expected, "Scene array has wrong length");
        None
    }
}

fn fallback_interior_prompts(interior: &[String], topic: &str, aesthetic: &str) -> Vec<String> {
    interior
        .iter()
        .map(|text| prompts::fallback_scene_prompt(text, topic, aesthetic))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{
        BrandIdentity, CarouselStrategy, ColorScheme, HashtagStrategy, OutputConfig,
        QualityOverrides, TopicTrackerConfig,
    };
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn config() -> AccountConfig {
        AccountConfig {
            account_name: "dreamtime".into(),
            display_name: "Dreamtime".into(),
            brand_identity: BrandIdentity {
                character_type: "faceless_expert".into(),
                personality: "Warm guide".into(),
                value_proposition: "calmer evenings".into(),
                voice_attributes: vec!["warm".into(), "direct".into()],
            },
            content_pillars: (1..=5).map(|i| format!("pillar_{i}")).collect(),
            color_schemes: (1..=3)
                .map(|i| ColorScheme {
                    bg: "#1A1A2E".into(),
                    text: "#FFFFFF".into(),
                    name: format!("scheme_{i}"),
                })
                .collect(),
            hashtag_strategy: HashtagStrategy {
                primary: vec!["gentleparenting".into()],
                secondary: vec![],
                topic_hashtags: BTreeMap::new(),
            },
            carousel_strategy: CarouselStrategy::default(),
            quality: QualityOverrides::default(),
            output: OutputConfig {
                base_directory: PathBuf::from("/tmp/vignette-test"),
            },
            topic_tracker: TopicTrackerConfig::default(),
            model: "anthropic/claude-sonnet-4.5".into(),
            cloned_formats: vec![ClonedFormat {
                name: "night_routine".into(),
                slide_count: 8,
                prompt_template: "carousel about {topic}".into(),
                image_prompt_templates: vec![
                    "Opening scene for {topic}".into(),
                    "Second scene".into(),
                ],
            }],
            scoring_references: BTreeMap::new(),
        }
    }

    #[test]
    fn named_cloned_format_outranks_builtins() {
        let format = resolve_format(&config(), Some("night_routine"), "topic").unwrap();
        assert!(matches!(format, ContentFormat::Cloned(_)));
    }

    #[test]
    fn named_builtin_format_resolves() {
        let format = resolve_format(&config(), Some("scripts"), "topic").unwrap();
        assert_eq!(format, ContentFormat::Builtin(BuiltinFormat::Scripts));
    }

    #[test]
    fn unknown_format_is_a_config_error() {
        assert!(resolve_format(&config(), Some("no_such_format"), "topic").is_err());
    }

    #[test]
    fn config_default_format_applies_when_unspecified() {
        let mut config = config();
        config.carousel_strategy.format = Some("how_to".into());
        let format = resolve_format(&config, None, "sleep habits").unwrap();
        assert_eq!(format, ContentFormat::Builtin(BuiltinFormat::HowTo));
    }

    #[test]
    fn topic_keywords_pick_the_format_as_a_last_resort() {
        let format = resolve_format(&config(), None, "how to stop night wakings").unwrap();
        assert_eq!(format, ContentFormat::Builtin(BuiltinFormat::StepGuide));
    }

    #[test]
    fn item_count_is_range_checked_then_capped() {
        let config = config();
        let format = ContentFormat::Builtin(BuiltinFormat::HabitList);
        assert_eq!(resolve_num_items(&config, &format, 5).unwrap(), 5);
        assert_eq!(resolve_num_items(&config, &format, 8).unwrap(), 5);
        assert!(resolve_num_items(&config, &format, 4).is_err());
        assert!(resolve_num_items(&config, &format, 11).is_err());
    }

    #[test]
    fn cloned_format_dictates_its_item_count() {
        let config = config();
        let format = ContentFormat::Cloned(config.cloned_formats[0].clone());
        assert_eq!(resolve_num_items(&config, &format, 5).unwrap(), 6);
    }

    #[test]
    fn cloned_image_prompts_pad_and_trim() {
        let cloned = &config().cloned_formats[0];
        let prompts = cloned_image_prompts(cloned, "bedtime", 4);
        assert_eq!(prompts.len(), 4);
        assert_eq!(prompts[0], "Opening scene for bedtime");
        assert_eq!(prompts[2], "Scene related to bedtime, clean composition");

        let trimmed = cloned_image_prompts(cloned, "bedtime", 1);
        assert_eq!(trimmed, vec!["Opening scene for bedtime".to_string()]);
    }

    #[test]
    fn scene_array_extraction_enforces_count() {
        let reply = r#"Here are the scenes:
["a quiet nursery", "a parent reading", "a cozy lamp"]"#;
        let scenes = extract_scene_array(reply, 3).unwrap();
        assert_eq!(scenes[1], "a parent reading");
        assert!(extract_scene_array(reply, 4).is_none());
        assert!(extract_scene_array("no array here", 3).is_none());
    }
}
