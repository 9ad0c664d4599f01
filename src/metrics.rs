//! Glyph sizing data consumed by layout.
//!
//! The layout engine never parses font files or touches textures; it only
//! asks an implementation of [`GlyphMetrics`] for advances, kerning
//! adjustments, and line height. Values are unscaled font units; the
//! engine multiplies by the horizontal/vertical scale factors itself.

/// Source of per-glyph sizing data.
///
/// Implementations are typically backed by a parsed font description
/// (bitmap-font `.fnt` data, an atlas manifest, and so on). All lookups
/// must be total: an unknown character code should return a best-effort
/// default advance rather than fail.
pub trait GlyphMetrics {
    /// Horizontal advance for a character code, unscaled.
    fn advance(&self, code: u16) -> f32;

    /// Left-side bearing for a character code, unscaled.
    ///
    /// Only consulted for monospaced fonts, where the bearing is folded
    /// into the advance so every glyph consumes a full fixed cell.
    fn left_side_bearing(&self, code: u16) -> f32 {
        let _ = code;
        0.0
    }

    /// Kerning adjustment for a character pair, in unscaled units.
    ///
    /// Returns `0` for pairs without an entry (the common case).
    fn kerning(&self, prev: u16, next: u16) -> i32 {
        let _ = (prev, next);
        0
    }

    /// Whether every glyph occupies a fixed-width cell.
    fn is_monospace(&self) -> bool {
        false
    }

    /// Height of one line in this font, unscaled.
    fn cell_height(&self) -> f32;

    /// Horizontal scale multiplier applied to advances and kerning.
    fn horizontal_scale(&self) -> f32 {
        1.0
    }

    /// Vertical scale multiplier applied to line heights.
    fn vertical_scale(&self) -> f32 {
        1.0
    }
}

/// Scaled height of one laid-out line.
pub(crate) fn line_height(metrics: &dyn GlyphMetrics) -> f32 {
    metrics.cell_height() * metrics.vertical_scale()
}

/// Fixed-cell metrics with no kerning.
///
/// Handy for grid fonts and for deterministic tests; every character
/// advances by the same amount.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMetrics {
    /// Advance of every character, unscaled.
    pub advance: f32,
    /// Height of one line, unscaled.
    pub cell_height: f32,
}

impl MonospaceMetrics {
    /// Metrics for a fixed cell of `advance` x `cell_height`.
    pub fn new(advance: f32, cell_height: f32) -> Self {
        Self {
            advance,
            cell_height,
        }
    }
}

impl GlyphMetrics for MonospaceMetrics {
    fn advance(&self, _code: u16) -> f32 {
        self.advance
    }

    fn is_monospace(&self) -> bool {
        true
    }

    fn cell_height(&self) -> f32 {
        self.cell_height
    }
}
