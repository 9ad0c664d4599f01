//! Running style/color state driven by markup tags.
//!
//! A [`StyleState`] is created fresh for each markup pass, mutated by each
//! tag token, and discarded when the pass returns; per-glyph styling is
//! captured at append time, so the state itself is never retained.
//! Malformed tags never fail: truncated hex colors revert to the base
//! color mask and unknown color names resolve to opaque white.

use crate::glyph::{Glyph, ScriptPosition};

/// Opaque white, the fallback for unresolved color names.
pub const OPAQUE_WHITE: u32 = 0xFFFF_FFFF;

/// Dictionary resolving a color name to an RGBA8888 value.
///
/// Name resolution is an external service; the markup engine only asks
/// for lookups. Unknown names return `None` and render as opaque white.
pub trait ColorLookup {
    /// Resolve `name` to an RGBA8888 color.
    fn resolve(&self, name: &str) -> Option<u32>;
}

/// Letter-case rewriting applied to literal characters.
///
/// The three active modes form an exclusive group: enabling one turns the
/// others off, and re-enabling the current mode turns it off again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaseMode {
    /// Pass characters through unchanged.
    #[default]
    Plain,
    /// Upper-case the first letter of each letter run, lower-case the rest.
    Capitalize,
    /// Force every letter to upper case.
    Upper,
    /// Force every letter to lower case.
    Lower,
}

/// Accumulated style, color, and case mode for the glyphs being emitted.
#[derive(Clone, Debug)]
pub struct StyleState {
    style: u64,
    color: u32,
    base_color: u32,
    case: CaseMode,
}

impl StyleState {
    /// Fresh state: no flags, no case mode, colored `base_color`.
    pub fn new(base_color: u32) -> Self {
        Self {
            style: 0,
            color: base_color,
            base_color,
            case: CaseMode::Plain,
        }
    }

    /// Current style bits, ready to pack into a glyph.
    pub fn style_bits(&self) -> u64 {
        self.style
    }

    /// Current RGBA color.
    pub fn color(&self) -> u32 {
        self.color
    }

    /// Current case-transform mode.
    pub fn case_mode(&self) -> CaseMode {
        self.case
    }

    /// The `[]` reset: back to the base color with every flag and case
    /// mode cleared.
    pub fn reset(&mut self) {
        self.style = 0;
        self.color = self.base_color;
        self.case = CaseMode::Plain;
    }

    /// Apply one tag body (the text between `[` and `]`, brackets
    /// excluded). Only the first character selects the tag kind, so
    /// `*anything` still toggles bold; bodies that are neither a known
    /// toggle nor a hex color are looked up as color names.
    pub fn apply_tag(&mut self, body: &str, palette: Option<&dyn ColorLookup>) {
        let Some(first) = body.chars().next() else {
            return;
        };
        match first {
            '*' => self.style ^= Glyph::BOLD,
            '/' => self.style ^= Glyph::OBLIQUE,
            '_' => self.style ^= Glyph::UNDERLINE,
            '~' => self.style ^= Glyph::STRIKETHROUGH,
            '^' => self.toggle_script(ScriptPosition::Superscript),
            '.' => self.toggle_script(ScriptPosition::Subscript),
            '=' => self.toggle_script(ScriptPosition::Midscript),
            ';' => self.toggle_case(CaseMode::Capitalize),
            '!' => self.toggle_case(CaseMode::Upper),
            ',' => self.toggle_case(CaseMode::Lower),
            '#' => {
                self.color = parse_hex_color(body).unwrap_or(self.base_color);
            }
            _ => {
                self.color = palette
                    .and_then(|p| p.resolve(body))
                    .unwrap_or(OPAQUE_WHITE);
            }
        }
    }

    /// Re-entrant exclusive toggle for the script group: selecting the
    /// active position clears it, selecting another replaces it.
    fn toggle_script(&mut self, which: ScriptPosition) {
        let next = if ScriptPosition::from_bits(self.style) == which {
            0
        } else {
            which.to_bits()
        };
        self.style = (self.style & !Glyph::SCRIPT_MASK) | next;
    }

    /// Same re-entrant exclusive behavior for the case-mode group.
    fn toggle_case(&mut self, which: CaseMode) {
        self.case = if self.case == which {
            CaseMode::Plain
        } else {
            which
        };
    }
}

/// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` included in `body`).
///
/// Six or seven hex digits read as RGB with opaque alpha; eight or more
/// read as RGBA. Anything shorter, or digits that are not hex, yields
/// `None` so the caller can revert to its default color mask.
pub(crate) fn parse_hex_color(body: &str) -> Option<u32> {
    let digits = body.as_bytes().get(1..)?;
    if digits.len() >= 8 {
        parse_hex_bytes(&digits[..8])
    } else if digits.len() >= 6 {
        parse_hex_bytes(&digits[..6]).map(|rgb| (rgb << 8) | 0xFF)
    } else {
        None
    }
}

fn parse_hex_bytes(digits: &[u8]) -> Option<u32> {
    let mut value: u32 = 0;
    for &b in digits {
        value = (value << 4) | (b as char).to_digit(16)?;
    }
    Some(value)
}

/// Rewrite one literal character according to the case mode, tracking
/// whether the previous literal was alphabetic.
///
/// Word boundaries are purely "was the previous character a letter", not
/// whitespace: capitalize mode upper-cases the first letter of each
/// letter run and lower-cases the rest of the run.
pub(crate) fn transform_case(mode: CaseMode, previous_was_letter: &mut bool, ch: char) -> char {
    let mut out = ch;
    if ch.is_lowercase() {
        if (mode == CaseMode::Capitalize && !*previous_was_letter) || mode == CaseMode::Upper {
            out = ch.to_uppercase().next().unwrap_or(ch);
        }
        *previous_was_letter = true;
    } else if ch.is_uppercase() {
        if (mode == CaseMode::Capitalize && *previous_was_letter) || mode == CaseMode::Lower {
            out = ch.to_lowercase().next().unwrap_or(ch);
        }
        *previous_was_letter = true;
    } else {
        *previous_was_letter = false;
    }
    out
}
