//! Markup parsing and line layout over packed 64-bit glyphs.
//!
//! `glyphmark` turns a string of lightweight `[...]` markup into lines of
//! packed glyphs: each glyph is one `u64` carrying a character code,
//! style flags, script position, and an RGBA color. Layout greedily wraps
//! lines at break characters against a caller-supplied [`GlyphMetrics`]
//! provider and can truncate at a line limit with an ellipsis.
//!
//! ```
//! use std::sync::Arc;
//! use glyphmark::{Layout, LayoutConfig, MarkupEngine, MonospaceMetrics};
//!
//! let engine = MarkupEngine::new(Arc::new(MonospaceMetrics::new(8.0, 16.0)));
//! let mut layout = Layout::new(LayoutConfig {
//!     target_width: 120.0,
//!     ..LayoutConfig::default()
//! });
//! engine.markup("[*]Bold[*] and [#FF0000]red[] text", &mut layout);
//! assert_eq!(layout.to_string(), "Bold and red\ntext");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

extern crate alloc;

mod glyph;
mod layout;
mod markup;
mod metrics;
mod style;
mod wrap;

pub use glyph::{Glyph, ScriptPosition};
pub use layout::{Layout, LayoutConfig, Line};
pub use markup::MarkupEngine;
pub use metrics::{GlyphMetrics, MonospaceMetrics};
pub use style::{CaseMode, ColorLookup, StyleState, OPAQUE_WHITE};
