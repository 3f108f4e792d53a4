//! Image acquisition.
//!
//! Generated imagery runs slide by slide with the first image fed back
//! as a style reference. Stock imagery works through fallback query
//! tiers until enough fresh photos are found.

use vignette_core::{ContentFormat, ImageAsset};
use vignette_error::{ImageError, ImageErrorKind, StockError, StockErrorKind, VignetteResult};
use vignette_interface::{ImageSynthesizer, Orientation, StockPhoto, StockPhotoProvider};

use crate::history::StockPhotoHistory;

/// Suffix appended to every synthesis prompt.
const PORTRAIT_SUFFIX: &str = ", vertical portrait format, 9:16 aspect ratio";

/// Continuity instruction for slides after the first.
const CONTINUITY_SUFFIX: &str = ", IMPORTANT: maintain the same visual style, color palette, \
                                 lighting, and artistic approach as the reference image";

/// Preferred download size keys, best first.
const DOWNLOAD_SIZES: &[&str] = &["large2x", "large", "medium"];

/// Topic phrases mapped to tuned stock search queries.
const TOPIC_QUERIES: &[(&str, &str)] = &[
    ("picky eating", "toddler eating table parent"),
    ("sleep", "baby sleeping peaceful nursery"),
    ("tantrum", "parent comforting upset toddler calm"),
    ("feeding", "baby eating parent gentle"),
    ("bedtime", "parent child bedtime cozy"),
    ("routine", "family morning routine peaceful"),
    ("sibling", "parent children playing together"),
];

/// Generate one image per prompt, in order.
///
/// The first image becomes the style reference for every later slide.
/// A declined synthesis is fatal for the whole carousel.
///
/// # Errors
///
/// Fails on transport errors or when the service declines a slide.
#[tracing::instrument(skip(synthesizer, prompts), fields(count = prompts.len()))]
pub async fn acquire_generated<I>(
    synthesizer: &I,
    prompts: &[String],
) -> VignetteResult<Vec<ImageAsset>>
where
    I: ImageSynthesizer + ?Sized,
{
    let mut assets: Vec<ImageAsset> = Vec::with_capacity(prompts.len());
    let mut reference: Option<Vec<u8>> = None;

    for (index, prompt) in prompts.iter().enumerate() {
        let slide = index + 1;
        let mut full_prompt = format!("{prompt}{PORTRAIT_SUFFIX}");
        if index > 0 {
            full_prompt.push_str(CONTINUITY_SUFFIX);
        }

        tracing::info!(slide, total = prompts.len(), "Generating slide image");
        let bytes = synthesizer
            .generate(&full_prompt, reference.as_deref())
            .await?
            .ok_or_else(|| ImageError::new(ImageErrorKind::Declined { slide }))?;

        if index == 0 {
            reference = Some(bytes.clone());
        }
        assets.push(ImageAsset::generated(bytes));
    }

    Ok(assets)
}

/// Build the tiered query list for a stock photo run.
///
/// Tier one is the reply's own query when the model surfaced one,
/// otherwise the tuned topic mapping. Tier two pairs the format's first
/// stock keyword with the topic. Tier three is a generic query with no
/// freshness requirement.
fn query_tiers(format: &ContentFormat, topic: &str, reply_query: Option<&str>) -> Vec<String> {
    let mut tiers = Vec::with_capacity(3);

    match reply_query {
        Some(query) if !query.trim().is_empty() => tiers.push(query.trim().to_string()),
        _ => {
            let topic_lower = topic.to_lowercase();
            if let Some((_, mapped)) = TOPIC_QUERIES
                .iter()
                .find(|(key, _)| topic_lower.contains(key))
            {
                tiers.push((*mapped).to_string());
            }
        }
    }

    let keyword = format.stock_keywords().first().copied().unwrap_or("calm lifestyle");
    tiers.push(format!("{keyword} {topic}"));
    tiers.push("calm minimal lifestyle".to_string());
    tiers
}

/// Fetch `count` portrait stock photos, preferring never-used ones.
///
/// Each tier searches for twice the needed count (clamped to the
/// provider's page maximum) and keeps photos absent from the history.
/// The final tier drops the freshness requirement rather than failing a
/// run over reuse. Downloaded ids are recorded and the history saved
/// once at the end.
///
/// # Errors
///
/// Fails on transport errors or when every tier together still yields
/// fewer than `count` photos.
#[tracing::instrument(skip(provider, history, format))]
pub async fn acquire_stock<S>(
    provider: &S,
    history: &mut StockPhotoHistory,
    format: &ContentFormat,
    topic: &str,
    reply_query: Option<&str>,
    count: usize,
) -> VignetteResult<Vec<ImageAsset>>
where
    S: StockPhotoProvider + ?Sized,
{
    let per_page = (count * 2).clamp(1, provider.max_page_size());
    let tiers = query_tiers(format, topic, reply_query);
    let last_tier = tiers.len() - 1;

    let mut selected: Vec<StockPhoto> = Vec::with_capacity(count);

    for (tier, query) in tiers.iter().enumerate() {
        if selected.len() >= count {
            break;
        }
        let photos = provider
            .search(query, per_page, Orientation::Portrait)
            .await?;
        tracing::info!(tier, query = %query, found = photos.len(), "Stock search tier");

        for photo in photos {
            if selected.len() >= count {
                break;
            }
            if selected.iter().any(|p| p.id == photo.id) {
                continue;
            }
            // Only the last tier may repeat photos from the history.
            if tier < last_tier && history.contains(photo.id) {
                continue;
            }
            selected.push(photo);
        }
    }

    if selected.len() < count {
        return Err(StockError::new(StockErrorKind::Insufficient {
            got: selected.len(),
            needed: count,
        })
        .into());
    }

    let downloads = selected.iter().map(|photo| download_best_size(provider, photo));
    let payloads = futures::future::try_join_all(downloads).await?;

    let mut assets = Vec::with_capacity(count);
    for (photo, bytes) in selected.iter().zip(payloads) {
        history.record(photo.id);
        assets.push(ImageAsset::stock(bytes, photo.id));
    }
    history.save()?;

    Ok(assets)
}

async fn download_best_size<S>(provider: &S, photo: &StockPhoto) -> VignetteResult<Vec<u8>>
where
    S: StockPhotoProvider + ?Sized,
{
    for size in DOWNLOAD_SIZES {
        if photo.sources.contains_key(*size) {
            return provider.download(photo, size).await;
        }
    }
    Err(StockError::new(StockErrorKind::MissingSize {
        id: photo.id,
        size: DOWNLOAD_SIZES[0].to_string(),
    })
    .into())
}
