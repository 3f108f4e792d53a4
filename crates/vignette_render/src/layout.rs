//! Word-wrap and vertical placement math.

use ab_glyph::{Font, PxScale};
use imageproc::drawing::text_size;

/// Greedy word wrap against a pixel budget.
///
/// A single word wider than `max_width` becomes its own line rather than
/// being split mid-word.
pub fn wrap_words<F: Font>(font: &F, scale: PxScale, max_width: u32, text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        current.push(word);
        let candidate = current.join(" ");
        let (width, _) = text_size(scale, font, &candidate);

        if width > max_width {
            if current.len() == 1 {
                // Oversized word, emit as-is.
                lines.push(candidate);
                current.clear();
            } else {
                current.pop();
                if !current.is_empty() {
                    lines.push(current.join(" "));
                }
                current = vec![word];
            }
        }
    }

    if !current.is_empty() {
        lines.push(current.join(" "));
    }
    lines
}

/// Clamp a vertically-centered block so it falls entirely inside the safe
/// zone. `safe_bottom` is the absolute y of the zone's lower edge, not a
/// margin. When the block is taller than the zone the top margin wins.
pub fn clamp_block_y(centered_y: i32, safe_top: i32, safe_bottom: i32, block_height: i32) -> i32 {
    centered_y.min(safe_bottom - block_height).max(safe_top)
}
