//! Prompt construction for content, captions, and image scenes.
//!
//! Heuristic formats get plain-text slide prompts parsed back by the
//! state machine in [`crate::parser`]. Proven and cloned formats ask for
//! a JSON object the structured path can read directly.

use vignette_core::{BuiltinFormat, ClonedFormat, ContentFormat, HookStrategy, ScoreResult};

use crate::account::{BrandIdentity, HashtagStrategy};

/// Aesthetic suffixes appended to every image prompt so the carousel
/// holds one visual style end to end.
pub const AESTHETIC_STYLES: &[&str] = &[
    "shot on iphone, natural window light, soft warm tones, candid and unposed, shallow depth of field",
    "soft painterly illustration, muted pastel palette, gentle brushwork, warm ambient light, storybook feel",
    "clean editorial photography, bright diffused daylight, minimal styling, calm neutral palette",
];

/// System prompt derived from the account's brand identity.
pub fn build_system_prompt(brand: &BrandIdentity) -> String {
    let voice = if brand.voice_attributes.is_empty() {
        "conversational".to_string()
    } else {
        brand
            .voice_attributes
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "{}. Your voice is {voice}. Write like you're texting a friend who just asked \
         for advice - warm, personal, with asides and opinions. Include phrases like \
         'honestly,' 'yes really,' 'worth it though.' Your content is casual but \
         evidence-backed. Make it feel conversational, not clinical. Use lowercase, \
         short sentences, and avoid fluff.",
        brand.personality
    )
}

/// Warning block folded into retry prompts after a failed hook.
fn retry_warning(score: &ScoreResult, min_score: u8) -> String {
    let mut warning = format!(
        "⚠️ PREVIOUS HOOK FAILED (scored {}/20, need {min_score}+)\nFix these issues:\n",
        score.total
    );
    for issue in &score.feedback {
        warning.push_str("- ");
        warning.push_str(issue);
        warning.push('\n');
    }
    warning.push('\n');
    warning
}

/// Build the content prompt for any registered format.
pub fn build_content_prompt(
    format: &ContentFormat,
    topic: &str,
    num_items: usize,
    hook_strategy: HookStrategy,
    max_words: usize,
    feedback: Option<(&ScoreResult, u8)>,
    niche: &str,
) -> String {
    match format {
        ContentFormat::Builtin(BuiltinFormat::HabitList) => {
            build_habit_list_prompt(topic, num_items, hook_strategy, max_words, feedback, niche)
        }
        ContentFormat::Builtin(BuiltinFormat::StepGuide) => {
            build_step_guide_prompt(topic, num_items, hook_strategy, max_words, feedback, niche)
        }
        ContentFormat::Builtin(builtin) => {
            build_structured_prompt(*builtin, topic, num_items, max_words, feedback, niche)
        }
        ContentFormat::Cloned(cloned) => build_cloned_prompt(cloned, topic, niche),
    }
}

fn build_habit_list_prompt(
    topic: &str,
    num_items: usize,
    hook_strategy: HookStrategy,
    max_words: usize,
    feedback: Option<(&ScoreResult, u8)>,
    niche: &str,
) -> String {
    let hook_instruction = match hook_strategy {
        HookStrategy::Viral => {
            let warning = feedback
                .map(|(score, min)| retry_warning(score, min))
                .unwrap_or_default();
            format!(
                "{warning}SLIDE 1 (Hook) - FILL IN THE TEMPLATE:\n\n\
                 Use this exact template:\n\
                 \"why your [BLANK 1] keeps failing (the {num_items} things no one talks about)\"\n\n\
                 BLANK 1 instructions:\n\
                 - Fill with specific aspect of \"{topic}\"\n\
                 - Make it specific to {niche} situations\n\
                 - NOT generic\n\n\
                 Now fill BLANK 1 for \"{topic}\":\n\
                 Write the complete hook (≤{max_words} words, all lowercase):"
            )
        }
        HookStrategy::Template => format!(
            "SLIDE 1 (Hook):\n\
             Write: {num_items} boring {topic} habits that changed everything\n\
             - Use \"boring\" or similar downplaying words\n\
             - Promise transformation\n\
             - NO quotes or meta-text"
        ),
    };

    format!(
        "Generate a TikTok carousel about \"{topic}\" for {niche}.\n\n\
         FORMAT: Habit/Tip List with {num_items} tips + final CTA slide\n\n\
         {hook_instruction}\n\n\
         SLIDES 2-{} (Tips):\n\
         CRITICAL: Each tip MUST start with \"tip 1:\", \"tip 2:\", \"tip 3:\", etc. This is REQUIRED, not meta-text.\n\n\
         Format for each tip:\n\
         tip 1: [actionable habit - 3-5 words]\n\n\
         [explanation - 2-4 short sentences explaining WHY it works, with conversational asides like \"honestly\", \"yes really\", \"worth it though\". Make it feel like texting a friend, not a textbook. Mix short punchy statements with longer explanations.]\n\n\
         SLIDE {} (CTA):\n\
         save this so you can come back to it when you need it\n\n\
         STYLE RULES:\n\
         - REQUIRED: Start each tip with \"tip 1:\", \"tip 2:\", etc (this is NOT meta-text to skip)\n\
         - All lowercase (except \"I\")\n\
         - Conversational tone like texting a friend\n\
         - Mix short punchy statements with explanations\n\
         - Specific details (times, numbers, exact steps)\n\
         - NO quotation marks\n\
         - NO generic meta-text like \"SLIDE X:\" or \"Hook:\" (but \"tip N:\" is REQUIRED)\n\
         - Write ONLY the text that appears on screen\n\n\
         Generate {num_items} tips about \"{topic}\".",
        num_items + 1,
        num_items + 2
    )
}

fn build_step_guide_prompt(
    topic: &str,
    num_items: usize,
    hook_strategy: HookStrategy,
    max_words: usize,
    feedback: Option<(&ScoreResult, u8)>,
    niche: &str,
) -> String {
    let hook_instruction = match hook_strategy {
        HookStrategy::Viral => {
            let mut instruction = format!(
                "SLIDE 1 (Hook) - VIRAL PATTERN:\n\
                 Choose ONE proven viral hook pattern for \"{topic}\":\n\n\
                 1. \"the [topic] order that actually works (most people do this backward)\"\n\
                 2. \"why your [topic] keeps failing (the missing step no one talks about)\"\n\
                 3. \"how to [goal] by doing less (it's the opposite of what you'd think)\"\n\
                 4. \"building a [topic] that works takes [X days]. here's what actually happens\"\n\n\
                 REQUIREMENTS:\n\
                 - MUST be ≤{max_words} words\n\
                 - MUST use lowercase\n\
                 - MUST include pattern interrupt (backward, opposite, no one talks about)\n\
                 - MUST create curiosity gap\n\
                 - MUST be specific (use numbers/times)\n\
                 - NO quotes or meta-text"
            );
            if let Some((score, min)) = feedback {
                instruction.push_str("\n\nPREVIOUS ATTEMPT FEEDBACK:\n");
                instruction.push_str(&retry_warning(score, min));
            }
            instruction
        }
        HookStrategy::Template => format!(
            "SLIDE 1 (Hook):\n\
             Write: how to build a {topic} that actually works\n\
             - NO quotes or meta-text"
        ),
    };

    format!(
        "Generate a TikTok carousel about \"{topic}\" for {niche}.\n\n\
         FORMAT: Step-by-Step Guide with {num_items} steps + final CTA slide\n\n\
         {hook_instruction}\n\n\
         SLIDES 2-{} (Steps):\n\
         CRITICAL: Each step MUST start with \"step 1:\", \"step 2:\", \"step 3:\", etc. This is REQUIRED, not meta-text.\n\n\
         Format for each step:\n\
         step 1: [action phrase - 3-5 words]\n\n\
         [explanation - 2-4 short sentences explaining the step in conversational tone. Make it feel like a friend giving advice, not a manual.]\n\n\
         SLIDE {} (CTA):\n\
         save this so you can come back to it when you need it\n\n\
         STYLE RULES:\n\
         - REQUIRED: Start each step with \"step 1:\", \"step 2:\", etc (this is NOT meta-text to skip)\n\
         - All lowercase (except \"I\")\n\
         - Conversational, human tone (like texting a friend)\n\
         - Specific, actionable steps\n\
         - NO quotation marks\n\
         - NO generic meta-text like \"SLIDE X:\" or \"Hook:\" (but \"step N:\" is REQUIRED)\n\n\
         Generate {num_items} steps for \"{topic}\".",
        num_items + 1,
        num_items + 2
    )
}

/// Proven formats reply in JSON so slide boundaries survive verbatim.
fn build_structured_prompt(
    builtin: BuiltinFormat,
    topic: &str,
    num_items: usize,
    max_words: usize,
    feedback: Option<(&ScoreResult, u8)>,
    niche: &str,
) -> String {
    let total = num_items + 2;
    let (format_name, hook_shape, item_shape, cta_shape) = match builtin {
        BuiltinFormat::Scripts => (
            "Scripts That Work",
            format!("\"{{Topic}} Scripts That Work\\n(What to Say)\" adapted to \"{topic}\", max 8 words"),
            "\"When They're {Situation}\\n• Script 1\\n• Script 2\\n• Script 3\" with exact phrases to say, max 8 words per bullet".to_string(),
            "\"Save this for {context} 💙\", max 6 words",
        ),
        BuiltinFormat::BoringHabits => (
            "Boring Habits That Changed Everything",
            format!("\"{num_items} boring {topic} habits that changed everything\", max 8 words"),
            "\"{number}. {Habit name}\\n({Why it works})\" naming one simple, unglamorous habit, max 12 words".to_string(),
            "\"Try one tonight 💙\", max 6 words",
        ),
        _ => (
            "How to [Outcome]",
            format!("\"How to {{outcome}}\" stating the specific result for \"{topic}\", max 6 words"),
            "\"Step {n}: {Action}\\n({Why it works})\", max 10 words".to_string(),
            "\"Save for later 💙\", max 6 words",
        ),
    };

    let warning = feedback
        .map(|(score, min)| retry_warning(score, min))
        .unwrap_or_default();

    format!(
        "{warning}Generate a TikTok carousel about \"{topic}\" for {niche}.\n\n\
         FORMAT: {format_name} with {num_items} interior slides.\n\n\
         SLIDE 1 (Hook): {hook_shape}. Keep it under {max_words} words.\n\
         SLIDES 2-{}: {item_shape}.\n\
         SLIDE {total} (CTA): {cta_shape}.\n\n\
         Respond with ONLY a JSON object, no commentary:\n\
         {{\n\
           \"slides\": [{{\"text\": \"...\"}}, ...exactly {total} entries...],\n\
           \"caption\": \"one-line caption, no hashtags\",\n\
           \"stock_query\": \"2-4 word stock photo search phrase\"\n\
         }}\n\n\
         Every slide text must be the final on-screen copy. No placeholder \
         text, no brackets left unfilled.",
        num_items + 1
    )
}

/// Cloned formats carry their own prompt template with a `{topic}` slot.
fn build_cloned_prompt(cloned: &ClonedFormat, topic: &str, niche: &str) -> String {
    let body = cloned.prompt_template.replace("{topic}", topic);
    format!(
        "{body}\n\n\
         You are writing for {niche}.\n\
         Respond with ONLY a JSON object, no commentary:\n\
         {{\n\
           \"slides\": [{{\"text\": \"...\"}}, ...exactly {} entries...],\n\
           \"caption\": \"caption matching this format's closing style, no hashtags\",\n\
           \"stock_query\": \"2-4 word stock photo search phrase\"\n\
         }}",
        cloned.slide_count
    )
}

/// Caption prompt built from the finished slides.
pub fn build_caption_prompt(topic: &str, hook: &str, tips: &[String]) -> String {
    let tips_context = tips
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, tip)| {
            let short: String = tip.chars().take(100).collect();
            format!("{}. {short}", i + 1)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Generate a TikTok caption for this carousel about \"{topic}\".\n\n\
         CAROUSEL HOOK:\n{hook}\n\n\
         TIPS INCLUDED:\n{tips_context}\n\n\
         REQUIREMENTS:\n\
         - 200-400 characters total (this is CRITICAL for TikTok search discovery)\n\
         - Format: [Hook sentence that creates curiosity] + [1-2 sentences of context with keywords related to \"{topic}\"] + [CTA question to drive comments]\n\
         - Casual, relatable tone - like texting a friend\n\
         - Include topic-relevant keywords naturally (TikTok search reads captions)\n\
         - NO hashtags (those come separately)\n\
         - NO emojis\n\
         - Lowercase style preferred\n\n\
         Generate caption:"
    )
}

/// Caption used when the model call fails.
pub const FALLBACK_CAPTION: &str = "save-worthy tips that actually work";

/// System prompt for the hook scene description call.
pub fn hook_scene_system_prompt(niche: &str) -> String {
    format!(
        "Generate a vivid, attention-grabbing scene description for a social media hook slide about {niche}.\n\n\
         Requirements:\n\
         - Scene MUST match the topic/hook content\n\
         - Include pattern interrupt element (unexpected detail, dramatic lighting, bold composition)\n\
         - Visual drama: use dramatic lighting, interesting angles, emotional moments\n\
         - Stay authentic to the niche and topic\n\n\
         Return ONLY the scene description, no additional commentary."
    )
}

/// User prompt for the hook scene description call.
pub fn hook_scene_user_prompt(topic: &str, hook: &str, niche: &str) -> String {
    format!(
        "Topic: {topic}\n\
         Hook text: {hook}\n\
         Niche: {niche}\n\n\
         Generate a scene description that creates visual drama and matches this \
         specific topic. The scene should be scroll-stopping and contextually relevant."
    )
}

/// Prompt asking for one scene per interior slide as a JSON array.
pub fn build_scene_list_prompt(
    topic: &str,
    slides_text: &[String],
    aesthetic: &str,
    niche: &str,
) -> String {
    let summary = slides_text
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let short: String = text.chars().take(100).collect();
            if short.len() < text.len() {
                format!("Slide {}: {short}...", i + 2)
            } else {
                format!("Slide {}: {short}", i + 2)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Generate image prompts for a carousel about \"{topic}\" for {niche}.\n\n\
         For each slide, create a visual scene that DIRECTLY MATCHES the content.\n\n\
         SLIDES CONTENT:\n{summary}\n\n\
         REQUIREMENTS:\n\
         - Each scene must visually represent what the slide is about\n\
         - Keep scenes authentic, realistic, and on-brand\n\
         - Focus on the SPECIFIC action/concept in each slide\n\
         - The LAST slide is a CTA (save/share/comment) - make it a warm closing scene related to \"{topic}\"\n\n\
         CRITICAL - VISUAL CONSISTENCY:\n\
         All scenes must maintain CONSISTENT visual style:\n\
         - Same lighting quality (golden/warm vs cool/bright)\n\
         - Same time of day throughout\n\
         - Same color palette and saturation\n\
         - Same mood and atmosphere\n\n\
         CRITICAL - COMPOSITION RULES:\n\
         - ONE clear scene per image with a single focal point\n\
         - NO collages, split screens, or composite images\n\
         - Keep scenes simple and realistic\n\n\
         BASE AESTHETIC (always include at end):\n{aesthetic}\n\n\
         Return ONLY a JSON array of {} image prompts.\n\
         Format: [\"Scene description 1\", \"Scene description 2\", ...]\n\n\
         Generate {} contextual scene descriptions:",
        slides_text.len(),
        slides_text.len()
    )
}

/// Deterministic scene prompt for one slide, used when the scene model
/// call fails or returns the wrong count.
pub fn fallback_scene_prompt(slide_text: &str, topic: &str, aesthetic: &str) -> String {
    let focus: String = slide_text
        .lines()
        .next()
        .unwrap_or(topic)
        .trim_matches(|c: char| !c.is_alphanumeric())
        .chars()
        .take(60)
        .collect();
    format!("Scene illustrating {focus}, related to {topic}, clean composition, single focal point, {aesthetic}")
}

/// Topic-category keyword table for hashtag matching.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("sleep", &["sleep", "nap", "bedtime", "wake", "night", "rest"]),
    (
        "development",
        &["development", "milestone", "cognitive", "language", "motor", "growth"],
    ),
    (
        "feeding",
        &["feed", "eating", "meal", "food", "solid", "breastfeed", "bottle", "picky"],
    ),
    (
        "behavior",
        &["tantrum", "discipline", "boundary", "behavior", "emotion", "sibling"],
    ),
    (
        "activities",
        &["play", "activity", "sensory", "outdoor", "game", "craft"],
    ),
    (
        "safety",
        &["safety", "babyproof", "choking", "hazard", "car seat", "first aid"],
    ),
    (
        "gear",
        &["gear", "product", "registry", "must-have", "essential", "budget"],
    ),
];

/// Build the hashtag line: two primary tags plus up to three
/// topic-matched tags, five total, space-joined with `#` prefixes.
pub fn topic_hashtags(strategy: &HashtagStrategy, topic: &str) -> String {
    let topic_lower = topic.to_lowercase();

    let mut tags: Vec<String> = strategy.primary.iter().take(2).cloned().collect();

    let matched_category = CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| topic_lower.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or("general");

    let specific = strategy
        .topic_hashtags
        .get(matched_category)
        .or_else(|| strategy.topic_hashtags.get("general"));
    if let Some(specific) = specific {
        for tag in specific {
            if !tags.contains(tag) && tags.len() < 5 {
                tags.push(tag.clone());
            }
        }
    }

    tags.iter()
        .map(|t| format!("#{t}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use vignette_core::Dimension;

    fn brand() -> BrandIdentity {
        BrandIdentity {
            character_type: "faceless_expert".into(),
            personality: "Warm, evidence-backed parenting guide".into(),
            value_proposition: "calmer evenings for exhausted parents".into(),
            voice_attributes: vec!["warm".into(), "direct".into(), "playful".into(), "extra".into()],
        }
    }

    #[test]
    fn system_prompt_uses_first_three_voice_attributes() {
        let prompt = build_system_prompt(&brand());
        assert!(prompt.starts_with("Warm, evidence-backed parenting guide."));
        assert!(prompt.contains("warm, direct, playful"));
        assert!(!prompt.contains("extra"));
        assert!(prompt.contains("lowercase"));
    }

    #[test]
    fn habit_list_retry_prompt_carries_feedback() {
        let mut score = ScoreResult {
            total: 12,
            dimensions: BTreeMap::new(),
            grade: vignette_core::Grade::F,
            passed: false,
            feedback: vec!["Curiosity Gap could be stronger (scored 2/5)".into()],
        };
        score.dimensions.insert(Dimension::CuriosityGap, 2);
        let prompt = build_content_prompt(
            &ContentFormat::Builtin(BuiltinFormat::HabitList),
            "toddler sleep",
            5,
            HookStrategy::Viral,
            20,
            Some((&score, 16)),
            "exhausted parents",
        );
        assert!(prompt.contains("PREVIOUS HOOK FAILED (scored 12/20, need 16+)"));
        assert!(prompt.contains("- Curiosity Gap could be stronger"));
        assert!(prompt.contains("tip 1:"));
        assert!(prompt.contains("SLIDE 7 (CTA)"));
    }

    #[test]
    fn template_strategy_skips_viral_scaffolding() {
        let prompt = build_content_prompt(
            &ContentFormat::Builtin(BuiltinFormat::HabitList),
            "naps",
            5,
            HookStrategy::Template,
            20,
            None,
            "parents",
        );
        assert!(prompt.contains("5 boring naps habits that changed everything"));
        assert!(!prompt.contains("FILL IN THE TEMPLATE"));
    }

    #[test]
    fn structured_prompt_requests_exact_slide_count() {
        let prompt = build_content_prompt(
            &ContentFormat::Builtin(BuiltinFormat::Scripts),
            "toddler tantrums",
            5,
            HookStrategy::Viral,
            20,
            None,
            "parents",
        );
        assert!(prompt.contains("exactly 7 entries"));
        assert!(prompt.contains("\"stock_query\""));
        assert!(prompt.contains("Scripts That Work"));
    }

    #[test]
    fn cloned_prompt_substitutes_topic() {
        let cloned = ClonedFormat {
            name: "night_routine".into(),
            slide_count: 6,
            prompt_template: "Write a carousel about {topic} in the night-routine style".into(),
            image_prompt_templates: vec![],
        };
        let prompt = build_content_prompt(
            &ContentFormat::Cloned(cloned),
            "bedtime battles",
            5,
            HookStrategy::Viral,
            20,
            None,
            "parents",
        );
        assert!(prompt.contains("carousel about bedtime battles"));
        assert!(prompt.contains("exactly 6 entries"));
        assert!(!prompt.contains("{topic}"));
    }

    #[test]
    fn hashtags_match_topic_category() {
        let mut topic_map = BTreeMap::new();
        topic_map.insert(
            "sleep".to_string(),
            vec!["babysleep".to_string(), "sleeptips".to_string(), "naptime".to_string(), "extra".to_string()],
        );
        let strategy = HashtagStrategy {
            primary: vec!["gentleparenting".into(), "toddlermom".into(), "third".into()],
            secondary: vec![],
            topic_hashtags: topic_map,
        };
        let line = topic_hashtags(&strategy, "surviving bedtime resistance");
        assert_eq!(line, "#gentleparenting #toddlermom #babysleep #sleeptips #naptime");
    }

    #[test]
    fn hashtags_without_category_match_use_primaries_only() {
        let strategy = HashtagStrategy {
            primary: vec!["gentleparenting".into()],
            secondary: vec![],
            topic_hashtags: BTreeMap::new(),
        };
        assert_eq!(topic_hashtags(&strategy, "quantum physics"), "#gentleparenting");
    }

    #[test]
    fn fallback_scene_prompt_is_deterministic_and_grounded() {
        let a = fallback_scene_prompt("tip 1: dim the lights\n\nworks every time", "bedtime", "soft light");
        let b = fallback_scene_prompt("tip 1: dim the lights\n\nworks every time", "bedtime", "soft light");
        assert_eq!(a, b);
        assert!(a.contains("tip 1: dim the lights"));
        assert!(a.ends_with("soft light"));
    }

    #[test]
    fn caption_prompt_limits_tip_context() {
        let tips: Vec<String> = (1..=5).map(|i| format!("tip {i}: something useful")).collect();
        let prompt = build_caption_prompt("naps", "the nap hook", &tips);
        assert!(prompt.contains("1. tip 1: something useful"));
        assert!(prompt.contains("3. tip 3:"));
        assert!(!prompt.contains("tip 4:"));
    }
}
