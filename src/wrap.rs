//! Greedy append-and-wrap over packed glyphs.
//!
//! Appending tracks the running line width incrementally (advance plus
//! kerning against the previous emitted character). When a line exceeds
//! the target width the split procedure runs in two passes: scan backward
//! for the nearest break opportunity, then recompute the moved suffix's
//! widths forward from scratch. The second pass cannot be folded into the
//! first because kerning depends on each glyph's predecessor, which
//! changes once glyphs move to a new line.

use crate::glyph::{Glyph, ScriptPosition};
use crate::layout::Layout;
use crate::metrics::{line_height, GlyphMetrics};

/// Characters after which a line may legally wrap. Sorted, for binary
/// search membership tests.
const BREAK_CHARS: [u16; 20] = [
    0x0009, // horizontal tab
    0x0020, // space
    0x002D, // ASCII hyphen-minus
    0x00AD, // soft hyphen
    0x2000, // en quad
    0x2001, // em quad
    0x2002, // en space
    0x2003, // em space
    0x2004, // three-per-em space
    0x2005, // four-per-em space
    0x2006, // six-per-em space
    0x2008, // punctuation space
    0x2009, // thin space
    0x200A, // hair space
    0x200B, // zero-width space
    0x2010, // hyphen (not minus)
    0x2012, // figure dash
    0x2013, // en dash
    0x2014, // em dash
    0x2027, // hyphenation point
];

/// Blank separators: the subset of [`BREAK_CHARS`] that is dropped from a
/// line's tail when it splits. Sorted, for binary search.
const SPACE_CHARS: [u16; 13] = [
    0x0009, 0x0020, 0x2000, 0x2001, 0x2002, 0x2003, 0x2004, 0x2005, 0x2006, 0x2008, 0x2009,
    0x200A, 0x200B,
];

fn is_break_char(code: u16) -> bool {
    BREAK_CHARS.binary_search(&code).is_ok()
}

fn is_space_char(code: u16) -> bool {
    SPACE_CHARS.binary_search(&code).is_ok()
}

/// Scaled advance for one glyph.
///
/// Monospaced fonts fold the left-side bearing into the advance so every
/// glyph consumes its full cell; for variable-width fonts any non-normal
/// script position renders half-size and advances half as far.
pub(crate) fn x_advance(metrics: &dyn GlyphMetrics, glyph: Glyph) -> f32 {
    let code = glyph.char_code();
    let mut advance = metrics.advance(code) * metrics.horizontal_scale();
    if metrics.is_monospace() {
        advance += metrics.left_side_bearing(code) * metrics.horizontal_scale();
    } else if glyph.script() != ScriptPosition::Normal {
        advance *= 0.5;
    }
    advance
}

fn kern(metrics: &dyn GlyphMetrics, prev: Option<u16>, next: u16) -> f32 {
    match prev {
        Some(prev) => metrics.kerning(prev, next) as f32 * metrics.horizontal_scale(),
        None => 0.0,
    }
}

/// Appends glyphs to a layout's last line, wrapping on overflow.
///
/// Holds the rolling kerning predecessor: the character most recently
/// appended, against which the next glyph's kerning pair is formed.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LineBreaker {
    prev: Option<u16>,
}

impl LineBreaker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Forget the kerning predecessor; each line starts a fresh chain.
    pub(crate) fn start_new_line(&mut self) {
        self.prev = None;
    }

    /// Append one styled glyph, growing the running width by its advance
    /// plus kerning, then split the line if it overflowed the target.
    ///
    /// Glyphs arriving after the layout truncated at its line limit are
    /// dropped.
    pub(crate) fn append(&mut self, layout: &mut Layout, metrics: &dyn GlyphMetrics, glyph: Glyph) {
        if layout.is_truncated() {
            return;
        }
        let code = glyph.char_code();
        let advance = x_advance(metrics, glyph) + kern(metrics, self.prev, code);
        self.prev = Some(code);

        let target = layout.config().target_width;
        let line = layout.last_line_mut();
        line.push(glyph);
        line.width += advance;
        if target > 0.0 && line.width > target {
            split_overflowing_line(layout, metrics);
        }
    }
}

/// Split the layout's last line at the nearest break opportunity.
///
/// Scans backward from the second-to-last glyph for the rightmost
/// break-eligible character (keeping as much text as possible on the
/// first line), extends the cut leftward over contiguous space-like
/// characters that are dropped outright, then moves the remaining suffix
/// onto a fresh line. Advances and kerning for the affected glyphs are
/// recomputed from scratch on both sides of the cut. If the line holds no
/// break-eligible character it is left overflowing; words are never
/// broken mid-way.
fn split_overflowing_line(layout: &mut Layout, metrics: &dyn GlyphMetrics) {
    let break_index = {
        let glyphs = layout.last_line().glyphs();
        glyphs
            .len()
            .checked_sub(2)
            .and_then(|from| (0..=from).rev().find(|&j| is_break_char(glyphs[j].char_code())))
    };
    let Some(break_index) = break_index else {
        return;
    };

    // Count space-like glyphs to drop, extending the cut leftward.
    let (cut, leading) = {
        let glyphs = layout.last_line().glyphs();
        let mut j = break_index as isize;
        let mut leading = 0usize;
        while j >= 0 && is_space_char(glyphs[j as usize].char_code()) {
            leading += 1;
            j -= 1;
        }
        ((j + 1) as usize, leading)
    };

    let mut fresh = layout.acquire_line();
    fresh.height = line_height(metrics);

    let mut removed_width = 0.0f32;
    let mut moved_width = 0.0f32;
    {
        let line = layout.last_line_mut();
        let glyphs = line.glyphs();
        let mut prev_old = cut.checked_sub(1).map(|i| glyphs[i].char_code());
        let mut prev_new: Option<u16> = None;
        for (offset, &glyph) in glyphs[cut..].iter().enumerate() {
            let code = glyph.char_code();
            let advance = x_advance(metrics, glyph);
            removed_width += advance + kern(metrics, prev_old, code);
            prev_old = Some(code);
            if offset >= leading {
                moved_width += advance + kern(metrics, prev_new, code);
                prev_new = Some(code);
                fresh.push(glyph);
            }
        }
        line.truncate(cut);
        line.width -= removed_width;
    }
    fresh.width = moved_width;
    log::trace!(
        "wrapped line at glyph {cut}: moved {} glyphs, dropped {leading} separators",
        fresh.len()
    );
    layout.push_line(fresh);
}
