//! Image asset types.

/// Where an image payload came from.
///
/// Stock photos carry the provider id used for the dedup history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ImageSource {
    /// Produced by the image-synthesis service
    #[display("generated")]
    Generated,
    /// Downloaded from the stock photo provider
    #[display("stock:{}", id)]
    Stock {
        /// Provider photo id, recorded in the dedup history
        id: u64,
    },
}

/// Raw image bytes plus provenance.
///
/// Produced once per slide by acquisition, consumed exactly once by the
/// renderer, then discarded; only the rendered PNG is persisted.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// Undecoded image bytes (PNG or JPEG)
    pub data: Vec<u8>,
    /// Provenance of the bytes
    pub source: ImageSource,
}

impl ImageAsset {
    /// A generated image.
    pub fn generated(data: Vec<u8>) -> Self {
        Self {
            data,
            source: ImageSource::Generated,
        }
    }

    /// A stock photo with its provider id.
    pub fn stock(data: Vec<u8>, id: u64) -> Self {
        Self {
            data,
            source: ImageSource::Stock { id },
        }
    }
}
