//! End-to-end pipeline tests with scripted services.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;
use vignette_core::{ChatRequest, HookStrategy, Role};
use vignette_error::VignetteResult;
use vignette_generator::{
    AccountConfig, BrandIdentity, CarouselGenerator, CarouselStrategy, ColorScheme,
    GenerateRequest, HashtagStrategy, OutputConfig, QualityOverrides, TopicTrackerConfig,
};
use vignette_interface::{
    EmbeddingModel, ImageSynthesizer, Orientation, StockPhoto, StockPhotoProvider, TextModel,
};

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(108, 192, image::Rgb([120u8, 120, 120]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn config(base: PathBuf) -> AccountConfig {
    let mut topic_hashtags = BTreeMap::new();
    topic_hashtags.insert(
        "sleep".to_string(),
        vec!["babysleep".to_string(), "sleeptips".to_string()],
    );
    AccountConfig {
        account_name: "dreamtime".into(),
        display_name: "Dreamtime".into(),
        brand_identity: BrandIdentity {
            character_type: "faceless_expert".into(),
            personality: "Warm, evidence-backed parenting guide".into(),
            value_proposition: "calmer evenings for exhausted parents".into(),
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
            primary: vec!["gentleparenting".into(), "toddlermom".into()],
            secondary: vec![],
            topic_hashtags,
        },
        carousel_strategy: CarouselStrategy::default(),
        quality: QualityOverrides::default(),
        output: OutputConfig {
            base_directory: base,
        },
        topic_tracker: TopicTrackerConfig::default(),
        model: "anthropic/claude-sonnet-4.5".into(),
        cloned_formats: vec![],
        scoring_references: BTreeMap::new(),
    }
}

/// Routes replies by inspecting the user prompt, the way the real
/// pipeline issues categorically different requests.
struct ScriptedModel {
    content_reply: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    fn new(content_reply: impl Into<String>) -> Self {
        Self {
            content_reply: content_reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn content_calls(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| user_text(r).contains("FORMAT:"))
            .cloned()
            .collect()
    }
}

fn user_text(request: &ChatRequest) -> String {
    request
        .messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.clone())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn complete(&self, request: &ChatRequest) -> VignetteResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        let prompt = user_text(request);
        if prompt.contains("Hook text:") {
            return Ok("a dimly lit nursery with one toy out of place".to_string());
        }
        if prompt.contains("Return ONLY a JSON array") {
            let count = prompt
                .lines()
                .filter(|l| l.trim_start().starts_with("Slide "))
                .count();
            let scenes: Vec<String> = (0..count).map(|i| format!("scene number {i}")).collect();
            return Ok(serde_json::to_string(&scenes).unwrap());
        }
        if prompt.contains("TikTok caption") {
            return Ok("\"the bedtime shift that finally worked for us\"".to_string());
        }
        Ok(self.content_reply.clone())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Embeds every text to the same vector, so every hook scores 20/20.
struct AgreeableEmbedder;

#[async_trait]
impl EmbeddingModel for AgreeableEmbedder {
    async fn embed(&self, _text: &str) -> VignetteResult<Vec<f32>> {
        Ok(vec![1.0, 0.5, 0.25, 0.125])
    }
}

struct ScriptedSynthesizer {
    decline_at: Option<usize>,
    calls: Mutex<usize>,
}

#[async_trait]
impl ImageSynthesizer for ScriptedSynthesizer {
    async fn generate(
        &self,
        _prompt: &str,
        _reference_image: Option<&[u8]>,
    ) -> VignetteResult<Option<Vec<u8>>> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if self.decline_at == Some(*calls) {
            return Ok(None);
        }
        Ok(Some(png_bytes()))
    }
}

struct ScriptedProvider;

#[async_trait]
impl StockPhotoProvider for ScriptedProvider {
    async fn search(
        &self,
        _query: &str,
        per_page: usize,
        _orientation: Orientation,
    ) -> VignetteResult<Vec<StockPhoto>> {
        Ok((1..=per_page as u64)
            .map(|id| {
                let mut sources = HashMap::new();
                sources.insert("large2x".to_string(), format!("https://example.com/{id}"));
                StockPhoto {
                    id,
                    photographer: "Someone".to_string(),
                    sources,
                }
            })
            .collect())
    }

    async fn download(&self, _photo: &StockPhoto, _size: &str) -> VignetteResult<Vec<u8>> {
        Ok(png_bytes())
    }
}

fn heuristic_reply() -> String {
    let mut reply = String::from("why your bedtime routine keeps failing (the 5 things no one talks about)\n\n");
    for i in 1..=5 {
        reply.push_str(&format!(
            "tip {i}: keep the same order every night\n\nkids thrive on predictability. honestly the order matters more than the time.\n\n"
        ));
    }
    reply.push_str("save this so you can come back to it when you need it\n");
    reply
}

#[tokio::test]
async fn generated_carousel_runs_end_to_end() {
    let base = tempfile::tempdir().unwrap();
    let model = ScriptedModel::new(heuristic_reply());
    let mut generator = CarouselGenerator::new(
        config(base.path().to_path_buf()),
        model,
        AgreeableEmbedder,
        Some(ScriptedSynthesizer {
            decline_at: None,
            calls: Mutex::new(0),
        }),
        None::<ScriptedProvider>,
    )
    .unwrap();

    let request = GenerateRequest {
        topic: Some("toddler bedtime battles".to_string()),
        format: Some("habit_list".to_string()),
        num_items: 5,
        hook_strategy: HookStrategy::Viral,
    };
    let artifact = generator.generate(&request).await.unwrap();

    assert_eq!(artifact.slides().len(), 7);
    assert!(artifact.slides()[0].text.starts_with("why your bedtime routine"));
    assert!(artifact.slides()[6].text.contains("save this"));
    assert_eq!(artifact.rendered_image_paths().len(), 7);
    for (i, path) in artifact.rendered_image_paths().iter().enumerate() {
        assert!(path.ends_with(format!("slides/slide_{:02}.png", i + 1)), "missing {path:?}");
        assert!(path.exists());
    }
    assert_eq!(artifact.image_prompts().len(), 7);
    assert!(artifact.image_prompts()[0].contains("dimly lit nursery"));

    let output_dir = artifact.meta().output_dir();
    assert!(output_dir.join("caption.txt").exists());
    assert!(output_dir.join("meta.json").exists());
    assert!(output_dir.join("carousel_data.json").exists());
    // Topic hashtags: "bedtime" matches the sleep category.
    assert!(artifact
        .caption()
        .ends_with("#gentleparenting #toddlermom #babysleep #sleeptips"));
    assert!(artifact.caption().starts_with("the bedtime shift"));

    // Topic history was recorded.
    assert!(base.path().join("topic_history.json").exists());
}

#[tokio::test]
async fn content_call_uses_the_generation_sampling_settings() {
    let base = tempfile::tempdir().unwrap();
    let model = ScriptedModel::new(heuristic_reply());
    let requests_handle;
    {
        let mut generator = CarouselGenerator::new(
            config(base.path().to_path_buf()),
            model,
            AgreeableEmbedder,
            Some(ScriptedSynthesizer {
                decline_at: None,
                calls: Mutex::new(0),
            }),
            None::<ScriptedProvider>,
        )
        .unwrap();

        let request = GenerateRequest {
            topic: Some("naps".to_string()),
            format: Some("habit_list".to_string()),
            num_items: 5,
            hook_strategy: HookStrategy::Viral,
        };
        generator.generate(&request).await.unwrap();
        requests_handle = generator.into_text_model();
    }

    let content = requests_handle.content_calls();
    assert_eq!(content.len(), 1, "passing hook needs one attempt");
    assert_eq!(content[0].temperature, 0.8);
    assert_eq!(content[0].max_tokens, 1000);
    assert!(content[0].messages[0].role == Role::System);
}

#[tokio::test]
async fn declined_synthesis_fails_naming_the_slide() {
    let base = tempfile::tempdir().unwrap();
    let model = ScriptedModel::new(heuristic_reply());
    let mut generator = CarouselGenerator::new(
        config(base.path().to_path_buf()),
        model,
        AgreeableEmbedder,
        Some(ScriptedSynthesizer {
            decline_at: Some(3),
            calls: Mutex::new(0),
        }),
        None::<ScriptedProvider>,
    )
    .unwrap();

    let request = GenerateRequest {
        topic: Some("toddler bedtime battles".to_string()),
        format: Some("habit_list".to_string()),
        num_items: 5,
        hook_strategy: HookStrategy::Viral,
    };
    let err = generator.generate(&request).await.unwrap_err();
    assert!(err.to_string().contains("slide 3"), "got: {err}");

    // Nothing was persisted: acquisition fails before the output
    // directory is created.
    let entries: Vec<_> = std::fs::read_dir(base.path()).unwrap().collect();
    assert!(entries.is_empty(), "unexpected files: {entries:?}");
}

fn structured_scripts_reply() -> String {
    let slides: Vec<serde_json::Value> = vec![
        serde_json::json!({"text": "Tantrum Scripts That Work\n(What to Say)"}),
        serde_json::json!({"text": "When They're Melting Down\n• I'm right here\n• You're safe\n• Take your time"}),
        serde_json::json!({"text": "When They're Refusing\n• You can choose\n• First this, then that\n• I'll help you start"}),
        serde_json::json!({"text": "When They're Hitting\n• I won't let you hit\n• Hands are for helping\n• Let's stomp instead"}),
        serde_json::json!({"text": "When They're Screaming\n• I hear you\n• Use your low voice\n• Show me instead"}),
        serde_json::json!({"text": "When They're Crying\n• It's okay to be sad\n• I'm staying close\n• Breathe with me"}),
        serde_json::json!({"text": "Save this for the next meltdown 💙"}),
    ];
    serde_json::json!({
        "slides": slides,
        "caption": "scripts that actually work",
        "stock_query": "parent comforting toddler"
    })
    .to_string()
}

#[tokio::test]
async fn stock_format_downloads_and_tracks_photos() {
    let base = tempfile::tempdir().unwrap();
    let model = ScriptedModel::new(structured_scripts_reply());
    let mut generator = CarouselGenerator::new(
        config(base.path().to_path_buf()),
        model,
        AgreeableEmbedder,
        None::<ScriptedSynthesizer>,
        Some(ScriptedProvider),
    )
    .unwrap();

    let request = GenerateRequest {
        topic: Some("toddler tantrums".to_string()),
        format: Some("scripts".to_string()),
        num_items: 5,
        hook_strategy: HookStrategy::Viral,
    };
    let artifact = generator.generate(&request).await.unwrap();

    assert_eq!(artifact.slides().len(), 7);
    assert_eq!(artifact.rendered_image_paths().len(), 7);
    assert!(artifact.image_prompts().is_empty(), "stock mode carries no prompts");
    assert!(artifact.meta().output_dir().join("slides/slide_07.png").exists());

    let history = std::fs::read_to_string(base.path().join("stock_photo_history.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&history).unwrap();
    assert_eq!(parsed["used_ids"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn word_ceiling_failure_exhausts_the_proven_retry_budget() {
    let base = tempfile::tempdir().unwrap();
    // 23-word hook: fails the word ceiling on every attempt without an
    // embedding call, so the run falls back to the best attempt.
    let mut reply = structured_scripts_reply();
    reply = reply.replace(
        "Tantrum Scripts That Work\\n(What to Say)",
        "this hook rambles on and on with far too many words to ever fit on a single slide and still stop anyone scrolling",
    );
    let model = ScriptedModel::new(reply);
    let mut generator = CarouselGenerator::new(
        config(base.path().to_path_buf()),
        model,
        AgreeableEmbedder,
        None::<ScriptedSynthesizer>,
        Some(ScriptedProvider),
    )
    .unwrap();

    let request = GenerateRequest {
        topic: Some("toddler tantrums".to_string()),
        format: Some("scripts".to_string()),
        num_items: 5,
        hook_strategy: HookStrategy::Viral,
    };
    let artifact = generator.generate(&request).await.unwrap();
    assert_eq!(artifact.slides().len(), 7);

    let model = generator.into_text_model();
    let content = model.content_calls();
    assert_eq!(content.len(), 3, "proven formats retry three times");
    // Later attempts carry the failure feedback.
    assert!(user_text(&content[1]).contains("PREVIOUS HOOK FAILED"));
    assert!(user_text(&content[1]).contains("word limit"));
}

#[tokio::test]
async fn template_strategy_takes_a_single_attempt() {
    let base = tempfile::tempdir().unwrap();
    let model = ScriptedModel::new(heuristic_reply());
    let mut generator = CarouselGenerator::new(
        config(base.path().to_path_buf()),
        model,
        AgreeableEmbedder,
        Some(ScriptedSynthesizer {
            decline_at: None,
            calls: Mutex::new(0),
        }),
        None::<ScriptedProvider>,
    )
    .unwrap();

    let request = GenerateRequest {
        topic: Some("morning routines".to_string()),
        format: Some("habit_list".to_string()),
        num_items: 5,
        hook_strategy: HookStrategy::Template,
    };
    let artifact = generator.generate(&request).await.unwrap();
    assert_eq!(artifact.meta().hook_strategy(), "template");

    let model = generator.into_text_model();
    assert_eq!(model.content_calls().len(), 1);
}
