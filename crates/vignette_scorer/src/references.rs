//! Curated reference exemplars per evaluation dimension.

use std::collections::BTreeMap;
use vignette_core::Dimension;

const CURIOSITY_GAP: &[&str] = &[
    "what actually happens when you ignore the advice everyone gives",
    "the real reason your strategy keeps failing (no one talks about this)",
    "it's not what you think - here's the truth about",
    "what really happens behind the scenes that changes everything",
    "the one thing no one tells you about",
    "why this keeps happening and what it means",
    "the hidden reason most people struggle with",
    "what top performers know that you don't",
    "the mistake everyone makes that ruins everything",
    "why your approach isn't working (and what to do instead)",
    "the secret to success that nobody shares",
];

const ACTIONABILITY: &[&str] = &[
    "how to build a system that actually works",
    "5 steps to completely transform your approach",
    "stop doing this and start doing this instead",
    "the exact method I use to achieve results",
    "how to fix this problem in 3 simple steps",
    "the framework I built to solve",
    "start using this technique immediately",
    "implement this strategy today",
    "simple routines that actually work",
    "practical techniques to improve results",
    "strategies that get real outcomes",
];

const SPECIFICITY: &[&str] = &[
    "3 morning routines that changed my bedtime struggles",
    "the exact cold calling script that closed 47 deals",
    "5 specific techniques for handling objections in enterprise sales",
    "why 2am wake-ups happen and the one thing that fixed it",
    "7 bedtime mistakes parents make between 6-8pm",
    "the precise moment in your sales call where you lose the deal",
    "4 naptime rituals that work for 18-month-olds",
    "the one prospecting method that landed 12 meetings this week",
];

const SCROLL_STOP: &[&str] = &[
    "stop trying to do it the normal way - go backward",
    "what top performers do differently that most people never notice",
    "the opposite of what everyone tells you actually works better",
    "most parents keep making this mistake and wonder why it fails",
    "why doing less actually gets you more results",
    "the counterintuitive approach that changed everything",
    "most sales reps are doing this backward",
    "everything you learned about this is wrong",
];

/// The built-in reference corpus.
///
/// Account templates may prepend niche-specific exemplars per dimension;
/// prepending (not replacing) keeps the generic exemplars as a floor while
/// letting niche phrasing win the max-similarity comparison.
pub fn default_references() -> BTreeMap<Dimension, Vec<String>> {
    let mut map = BTreeMap::new();
    map.insert(Dimension::CuriosityGap, to_owned(CURIOSITY_GAP));
    map.insert(Dimension::Actionability, to_owned(ACTIONABILITY));
    map.insert(Dimension::Specificity, to_owned(SPECIFICITY));
    map.insert(Dimension::ScrollStop, to_owned(SCROLL_STOP));
    map
}

fn to_owned(examples: &[&str]) -> Vec<String> {
    examples.iter().map(|s| s.to_string()).collect()
}
