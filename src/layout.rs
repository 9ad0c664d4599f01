//! Line and layout containers filled by the markup engine.
//!
//! A [`Layout`] is designed for reuse across frames: clearing it returns
//! every owned [`Line`] to an internal free-list so steady-state layout
//! performs no allocation. It always holds at least one line.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use smallvec::SmallVec;

use crate::glyph::Glyph;
use crate::metrics::GlyphMetrics;

const LINE_INLINE_GLYPHS: usize = 16;
const INITIAL_LINE_SLOTS: usize = 8;

/// Layout configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Wrap width; `0.0` (or anything non-positive) disables wrapping.
    pub target_width: f32,
    /// Maximum number of lines to retain; content past the limit is
    /// dropped and optionally marked with [`LayoutConfig::ellipsis`].
    pub max_lines: usize,
    /// Characters written over the tail of the last retained line when
    /// the line limit is hit. `None` truncates silently.
    pub ellipsis: Option<String>,
    /// RGBA color used before any markup and restored by the `[]` reset.
    pub base_color: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            target_width: 0.0,
            max_lines: usize::MAX,
            ellipsis: None,
            base_color: crate::style::OPAQUE_WHITE,
        }
    }
}

/// One laid-out line: an ordered run of packed glyphs plus cached extents.
///
/// Width is maintained incrementally as glyphs are appended; it is only
/// recomputed from scratch for the suffix moved during a wrap split,
/// where kerning forces re-derivation.
#[derive(Clone, Debug, Default)]
pub struct Line {
    glyphs: SmallVec<[Glyph; LINE_INLINE_GLYPHS]>,
    /// Cached sum of advances and kerning adjustments.
    pub width: f32,
    /// Line height, fixed by the metrics provider at creation.
    pub height: f32,
}

impl Line {
    /// The packed glyphs of this line, in draw order.
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Number of glyphs on this line.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether the line holds no glyphs.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub(crate) fn push(&mut self, glyph: Glyph) {
        self.glyphs.push(glyph);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.glyphs.truncate(len);
    }

    pub(crate) fn replace_char(&mut self, index: usize, ch: char) {
        if let Some(slot) = self.glyphs.get_mut(index) {
            *slot = slot.with_char(ch);
        }
    }

    /// Reset for pool reuse, keeping the glyph storage allocated.
    fn recycle(&mut self) {
        self.glyphs.clear();
        self.width = 0.0;
        self.height = 0.0;
    }
}

/// Ordered collection of [`Line`]s plus the configuration and metrics
/// handle that produced them.
///
/// Invariants: there is always at least one line, and every cached width
/// was computed against the currently bound metrics provider. Binding a
/// different provider resets all lines, since their widths would be
/// stale. A `Layout` is not safe for concurrent mutation; callers
/// serialize access.
pub struct Layout {
    cfg: LayoutConfig,
    metrics: Option<Arc<dyn GlyphMetrics>>,
    lines: Vec<Line>,
    recycled: Vec<Line>,
    truncated: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl Layout {
    /// An empty layout with one blank line.
    pub fn new(cfg: LayoutConfig) -> Self {
        let mut lines = Vec::with_capacity(INITIAL_LINE_SLOTS);
        lines.push(Line::default());
        Self {
            cfg,
            metrics: None,
            lines,
            recycled: Vec::new(),
            truncated: false,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.cfg
    }

    /// Mutable access to the configuration.
    ///
    /// Takes effect on the next markup pass; already-laid-out lines are
    /// not reflowed.
    pub fn config_mut(&mut self) -> &mut LayoutConfig {
        &mut self.cfg
    }

    /// The metrics provider the current lines were sized with, if any.
    pub fn metrics(&self) -> Option<&Arc<dyn GlyphMetrics>> {
        self.metrics.as_ref()
    }

    /// The laid-out lines, oldest first. Never empty.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// A single line by index.
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Width of the widest line.
    pub fn width(&self) -> f32 {
        self.lines.iter().fold(0.0, |w, line| w.max(line.width))
    }

    /// Height of the tallest line.
    pub fn height(&self) -> f32 {
        self.lines.iter().fold(0.0, |h, line| h.max(line.height))
    }

    /// Whether content was dropped because the line limit was reached.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Release every line back to the free-list and re-seed a single
    /// blank line. Keeps the configuration and metrics binding.
    pub fn clear(&mut self) {
        for mut line in self.lines.drain(..) {
            line.recycle();
            self.recycled.push(line);
        }
        let line = self.recycled.pop().unwrap_or_default();
        self.lines.push(line);
        self.truncated = false;
    }

    /// Bind the metrics provider, resetting all lines when it differs
    /// from the one the current lines were sized with.
    pub(crate) fn bind_metrics(&mut self, metrics: &Arc<dyn GlyphMetrics>) {
        let unchanged = self
            .metrics
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, metrics));
        if unchanged {
            return;
        }
        if self.metrics.is_some() {
            log::debug!("metrics provider changed; resetting layout lines");
        }
        self.clear();
        self.metrics = Some(Arc::clone(metrics));
    }

    pub(crate) fn last_line(&self) -> &Line {
        // A layout always holds at least one line.
        match self.lines.last() {
            Some(line) => line,
            None => unreachable!("layout invariant: lines is never empty"),
        }
    }

    pub(crate) fn last_line_mut(&mut self) -> &mut Line {
        match self.lines.last_mut() {
            Some(line) => line,
            None => unreachable!("layout invariant: lines is never empty"),
        }
    }

    /// Take a blank line from the free-list, or allocate one.
    pub(crate) fn acquire_line(&mut self) -> Line {
        self.recycled.pop().unwrap_or_default()
    }

    pub(crate) fn push_line(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub(crate) fn is_line_limit_reached(&self) -> bool {
        self.lines.len() >= self.cfg.max_lines
    }

    /// Handle an explicit line feed: start a fresh line, or, at the line
    /// limit, drop it and stamp the ellipsis over the tail of the last
    /// retained line. Glyphs that arrive after truncation are dropped by
    /// the append path.
    pub(crate) fn newline(&mut self, height: f32) {
        if !self.is_line_limit_reached() {
            let mut line = self.acquire_line();
            line.height = height;
            self.lines.push(line);
            return;
        }
        if !self.truncated {
            self.truncated = true;
            if let Some(ellipsis) = self.cfg.ellipsis.clone() {
                self.stamp_ellipsis(&ellipsis);
            }
        }
    }

    /// Overwrite the tail glyphs of the last line with the ellipsis
    /// characters, one for one from the end, preserving each overwritten
    /// glyph's style and color.
    fn stamp_ellipsis(&mut self, ellipsis: &str) {
        let count = ellipsis.chars().count();
        let line = self.last_line_mut();
        let len = line.len();
        log::trace!("line limit reached; stamping {count}-char ellipsis");
        for (offset, ch) in ellipsis.chars().enumerate() {
            if let Some(slot) = (len + offset).checked_sub(count) {
                line.replace_char(slot, ch);
            }
        }
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("cfg", &self.cfg)
            .field("lines", &self.lines.len())
            .field("truncated", &self.truncated)
            .field("has_metrics", &self.metrics.is_some())
            .finish()
    }
}

/// Decodes the laid-out glyphs back to plain text, lines joined by `\n`.
impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            for glyph in line.glyphs() {
                write!(f, "{}", glyph.character())?;
            }
        }
        Ok(())
    }
}
