//! Markup scanning and the top-level layout pass.
//!
//! The engine walks the input left to right, dispatching `[...]` spans to
//! the style state and routing literal characters through the case
//! transform into the line breaker. Malformed markup never aborts a pass;
//! every bad construct has a defined fallback, so untrusted text renders
//! best-effort rather than failing.

use alloc::sync::Arc;
use core::fmt;

use crate::glyph::Glyph;
use crate::layout::Layout;
use crate::metrics::{line_height, GlyphMetrics};
use crate::style::{transform_case, ColorLookup, StyleState};
use crate::wrap::LineBreaker;

/// Parses markup text into a [`Layout`] of packed glyph lines.
///
/// The engine owns the metrics provider and optional color palette; a
/// `Layout` bound to a different provider is reset before refilling, so
/// one engine can safely take over layouts produced by another.
///
/// Markup summary:
///
/// | token | effect |
/// |---|---|
/// | `[[` | literal `[` |
/// | `[]` | reset style, color, and case mode |
/// | `[*]` `[/]` `[_]` `[~]` | toggle bold / oblique / underline / strikethrough |
/// | `[^]` `[=]` `[.]` | toggle superscript / midscript / subscript (exclusive) |
/// | `[;]` `[!]` `[,]` | toggle capitalize / all-caps / all-lowercase (exclusive) |
/// | `[#RRGGBB]` `[#RRGGBBAA]` | set explicit color |
/// | `[NAME]` | set named color; unknown names render opaque white |
#[derive(Clone)]
pub struct MarkupEngine {
    metrics: Arc<dyn GlyphMetrics>,
    palette: Option<Arc<dyn ColorLookup>>,
}

impl MarkupEngine {
    /// An engine sizing glyphs with `metrics` and no named-color palette.
    pub fn new(metrics: Arc<dyn GlyphMetrics>) -> Self {
        Self {
            metrics,
            palette: None,
        }
    }

    /// Install a named-color dictionary for `[NAME]` tags.
    pub fn with_palette(mut self, palette: Arc<dyn ColorLookup>) -> Self {
        self.palette = Some(palette);
        self
    }

    /// The metrics provider glyphs are sized with.
    pub fn metrics(&self) -> &Arc<dyn GlyphMetrics> {
        &self.metrics
    }

    /// Parse `text` and append its laid-out lines into `layout`.
    ///
    /// Runs to completion synchronously. Style toggles left open at the
    /// end of `text` simply stop mattering: the style state is created
    /// fresh per call and discarded at return, with per-glyph styling
    /// captured at append time.
    pub fn markup(&self, text: &str, layout: &mut Layout) {
        layout.bind_metrics(&self.metrics);
        let metrics: &dyn GlyphMetrics = &*self.metrics;
        let palette = self.palette.as_deref();
        let height = line_height(metrics);
        layout.last_line_mut().height = height;

        let mut state = StyleState::new(layout.config().base_color);
        let mut breaker = LineBreaker::new();
        let mut previous_was_letter = false;

        let mut i = 0;
        while i < text.len() {
            let rest = &text[i..];
            let Some(ch) = rest.chars().next() else {
                break;
            };
            if ch == '[' {
                let after = &rest[1..];
                match after.chars().next() {
                    Some('[') => {
                        // Escaped literal bracket, styled like any glyph.
                        let glyph = Glyph::pack('[', state.style_bits(), state.color());
                        breaker.append(layout, metrics, glyph);
                        previous_was_letter = false;
                        i += 2;
                    }
                    Some(']') => {
                        state.reset();
                        i += 2;
                    }
                    Some(_) => {
                        // An unterminated tag swallows the rest of the
                        // string as its body.
                        let body_end = after.find(']').unwrap_or(after.len());
                        state.apply_tag(&after[..body_end], palette);
                        i += 1 + body_end + 1;
                    }
                    None => {
                        // Lone trailing bracket, nothing to interpret.
                        i += 1;
                    }
                }
            } else if ch == '\n' {
                // Line feeds are never stored as glyphs.
                layout.newline(height);
                breaker.start_new_line();
                previous_was_letter = false;
                i += 1;
            } else {
                let out = transform_case(state.case_mode(), &mut previous_was_letter, ch);
                let glyph = Glyph::pack(out, state.style_bits(), state.color());
                breaker.append(layout, metrics, glyph);
                i += ch.len_utf8();
            }
        }
    }
}

impl fmt::Debug for MarkupEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupEngine")
            .field("has_palette", &self.palette.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::MarkupEngine;
    use crate::glyph::{Glyph, ScriptPosition};
    use crate::layout::{Layout, LayoutConfig};
    use crate::metrics::MonospaceMetrics;
    use crate::style::ColorLookup;
    use alloc::string::ToString;
    use alloc::sync::Arc;

    fn engine() -> MarkupEngine {
        MarkupEngine::new(Arc::new(MonospaceMetrics::new(10.0, 16.0)))
    }

    fn glyphs_of(layout: &Layout) -> &[Glyph] {
        layout.lines()[0].glyphs()
    }

    #[test]
    fn plain_text_lays_out_verbatim_with_default_style() {
        let mut layout = Layout::default();
        engine().markup("hello", &mut layout);
        assert_eq!(layout.lines().len(), 1);
        assert_eq!(layout.to_string(), "hello");
        for glyph in glyphs_of(&layout) {
            assert_eq!(glyph.style_bits(), 0);
            assert_eq!(glyph.color(), 0xFFFF_FFFF);
        }
        assert_eq!(layout.lines()[0].height, 16.0);
    }

    #[test]
    fn doubled_bracket_emits_a_styled_literal_bracket() {
        let mut layout = Layout::default();
        engine().markup("[*][[x", &mut layout);
        let glyphs = glyphs_of(&layout);
        assert_eq!(glyphs[0].character(), '[');
        assert!(glyphs[0].has_flag(Glyph::BOLD));
        assert_eq!(glyphs[1].character(), 'x');
    }

    #[test]
    fn unterminated_tag_consumes_the_rest_of_the_string() {
        let mut layout = Layout::default();
        engine().markup("x[*abc", &mut layout);
        assert_eq!(layout.to_string(), "x");
    }

    #[test]
    fn lone_trailing_bracket_is_ignored() {
        let mut layout = Layout::default();
        engine().markup("ab[", &mut layout);
        assert_eq!(layout.to_string(), "ab");
    }

    #[test]
    fn tag_body_kind_is_selected_by_its_first_character() {
        let mut layout = Layout::default();
        engine().markup("[*ignored trailing text]b", &mut layout);
        let glyphs = glyphs_of(&layout);
        assert!(glyphs[0].has_flag(Glyph::BOLD));
    }

    #[test]
    fn script_toggles_supersede_each_other() {
        let mut layout = Layout::default();
        engine().markup("[^][.]x", &mut layout);
        let glyph = glyphs_of(&layout)[0];
        assert_eq!(glyph.script(), ScriptPosition::Subscript);
    }

    #[test]
    fn newline_starts_a_new_line_without_storing_a_glyph() {
        let mut layout = Layout::default();
        engine().markup("a\nb", &mut layout);
        assert_eq!(layout.lines().len(), 2);
        assert_eq!(layout.lines()[0].len(), 1);
        assert_eq!(layout.lines()[1].len(), 1);
        assert_eq!(layout.lines()[1].height, 16.0);
    }

    #[test]
    fn named_palette_colors_apply_to_following_glyphs() {
        struct Palette;
        impl ColorLookup for Palette {
            fn resolve(&self, name: &str) -> Option<u32> {
                (name == "RED").then_some(0xFF00_00FF)
            }
        }
        let engine = engine().with_palette(Arc::new(Palette));
        let mut layout = Layout::default();
        engine.markup("[RED]r[UNKNOWN]w", &mut layout);
        let glyphs = glyphs_of(&layout);
        assert_eq!(glyphs[0].color(), 0xFF00_00FF);
        assert_eq!(glyphs[1].color(), 0xFFFF_FFFF);
    }

    #[test]
    fn base_color_seeds_unstyled_text_and_the_reset() {
        let mut layout = Layout::new(LayoutConfig {
            base_color: 0x1020_30FF,
            ..LayoutConfig::default()
        });
        engine().markup("a[#FF0000]b[]c", &mut layout);
        let glyphs = glyphs_of(&layout);
        assert_eq!(glyphs[0].color(), 0x1020_30FF);
        assert_eq!(glyphs[1].color(), 0xFF00_00FF);
        assert_eq!(glyphs[2].color(), 0x1020_30FF);
    }

    #[test]
    fn rebinding_a_different_provider_resets_the_layout() {
        let first = engine();
        let second = MarkupEngine::new(Arc::new(MonospaceMetrics::new(7.0, 12.0)));
        let mut layout = Layout::default();
        first.markup("stale", &mut layout);
        second.markup("new", &mut layout);
        assert_eq!(layout.to_string(), "new");
        assert_eq!(layout.lines()[0].width, 21.0);
        assert_eq!(layout.lines()[0].height, 12.0);
    }

    #[test]
    fn repeated_markup_with_the_same_provider_appends() {
        let engine = engine();
        let mut layout = Layout::default();
        engine.markup("ab", &mut layout);
        engine.markup("cd", &mut layout);
        assert_eq!(layout.to_string(), "abcd");
    }
}
