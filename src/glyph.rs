use core::fmt;

/// Vertical placement mode encoded in a glyph's 2-bit script field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScriptPosition {
    /// Normal baseline placement.
    #[default]
    Normal,
    /// Lowered, half-size placement.
    Subscript,
    /// Mid-height, half-size placement.
    Midscript,
    /// Raised, half-size placement.
    Superscript,
}

impl ScriptPosition {
    pub(crate) fn from_bits(bits: u64) -> Self {
        match bits & Glyph::SCRIPT_MASK {
            Glyph::SUBSCRIPT => Self::Subscript,
            Glyph::MIDSCRIPT => Self::Midscript,
            Glyph::SUPERSCRIPT => Self::Superscript,
            _ => Self::Normal,
        }
    }

    pub(crate) fn to_bits(self) -> u64 {
        match self {
            Self::Normal => 0,
            Self::Subscript => Glyph::SUBSCRIPT,
            Self::Midscript => Glyph::MIDSCRIPT,
            Self::Superscript => Glyph::SUPERSCRIPT,
        }
    }
}

/// One renderable character fused with its style flags and RGBA color,
/// packed into a single `u64`.
///
/// Bit layout, from the low end:
///
/// | bits    | field                                  |
/// |---------|----------------------------------------|
/// | 0..16   | character code (BMP code unit)         |
/// | 16..25  | reserved, always zero                  |
/// | 25..27  | script position (see [`ScriptPosition`]) |
/// | 27      | strikethrough                          |
/// | 28      | underline                              |
/// | 29      | oblique                                |
/// | 30      | bold                                   |
/// | 31      | reserved, always zero                  |
/// | 32..64  | RGBA8888 color                         |
///
/// The layout is an interchange contract: rendering backends read these
/// values directly, so the bit positions are stable and masking is exact.
/// A glyph round-trips bit-identically through [`Glyph::bits`] and
/// [`Glyph::from_bits`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Glyph(u64);

impl Glyph {
    /// Bold flag.
    pub const BOLD: u64 = 1 << 30;
    /// Oblique (italic-like slant) flag.
    pub const OBLIQUE: u64 = 1 << 29;
    /// Underline flag.
    pub const UNDERLINE: u64 = 1 << 28;
    /// Strikethrough flag.
    pub const STRIKETHROUGH: u64 = 1 << 27;
    /// Subscript value of the script field.
    pub const SUBSCRIPT: u64 = 1 << 25;
    /// Midscript value of the script field.
    pub const MIDSCRIPT: u64 = 2 << 25;
    /// Superscript value of the script field; also covers the whole
    /// 2-bit field, so it doubles as the script mask.
    pub const SUPERSCRIPT: u64 = 3 << 25;
    /// Mask of the 2-bit script-position field.
    pub const SCRIPT_MASK: u64 = 3 << 25;

    /// Mask of the character-code field.
    pub const CHAR_MASK: u64 = 0xFFFF;
    /// Mask of every style bit.
    pub const STYLE_MASK: u64 = Self::BOLD
        | Self::OBLIQUE
        | Self::UNDERLINE
        | Self::STRIKETHROUGH
        | Self::SCRIPT_MASK;
    /// Mask of the RGBA color field.
    pub const COLOR_MASK: u64 = 0xFFFF_FFFF_0000_0000;

    /// Pack a character, style bits, and RGBA color into one glyph.
    ///
    /// `style` is masked to the style field; stray bits cannot leak into
    /// the character or color. Characters outside the BMP collapse to
    /// U+FFFD.
    pub fn pack(ch: char, style: u64, color: u32) -> Self {
        Self(((color as u64) << 32) | (style & Self::STYLE_MASK) | code_unit(ch) as u64)
    }

    /// Reconstruct a glyph from its raw packed bits.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw packed value.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// The stored character code.
    pub const fn char_code(self) -> u16 {
        (self.0 & Self::CHAR_MASK) as u16
    }

    /// The stored character, decoded. Unpaired surrogate codes decode
    /// to U+FFFD.
    pub fn character(self) -> char {
        char::from_u32(self.char_code() as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    /// Replace only the character field, preserving style and color.
    ///
    /// Used when substituting ellipsis characters in place.
    pub fn with_char(self, ch: char) -> Self {
        Self((self.0 & !Self::CHAR_MASK) | code_unit(ch) as u64)
    }

    /// The RGBA8888 color field.
    pub const fn color(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Replace only the color field, preserving character and style.
    pub const fn with_color(self, rgba: u32) -> Self {
        Self((self.0 & !Self::COLOR_MASK) | ((rgba as u64) << 32))
    }

    /// The style bits in isolation.
    pub const fn style_bits(self) -> u64 {
        self.0 & Self::STYLE_MASK
    }

    /// Whether every bit of `flag` is set. For the independent flags
    /// (`BOLD`, `OBLIQUE`, `UNDERLINE`, `STRIKETHROUGH`) this is a plain
    /// membership test; for script values use [`Glyph::script`].
    pub const fn has_flag(self, flag: u64) -> bool {
        self.0 & flag == flag
    }

    /// The decoded script-position field.
    pub fn script(self) -> ScriptPosition {
        ScriptPosition::from_bits(self.0)
    }
}

impl fmt::Debug for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Glyph")
            .field("char", &self.character())
            .field("style", &format_args!("{:#x}", self.style_bits()))
            .field("color", &format_args!("{:#010x}", self.color()))
            .finish()
    }
}

/// BMP code unit for a character; astral-plane characters collapse to
/// U+FFFD rather than truncating to unrelated code units.
pub(crate) fn code_unit(ch: char) -> u16 {
    let code = ch as u32;
    if code <= 0xFFFF {
        code as u16
    } else {
        0xFFFD
    }
}

#[cfg(test)]
mod tests {
    use super::{Glyph, ScriptPosition};

    #[test]
    fn pack_round_trips_each_field() {
        let g = Glyph::pack('Q', Glyph::BOLD | Glyph::UNDERLINE, 0x4080_C0FF);
        assert_eq!(g.character(), 'Q');
        assert_eq!(g.color(), 0x4080_C0FF);
        assert!(g.has_flag(Glyph::BOLD));
        assert!(g.has_flag(Glyph::UNDERLINE));
        assert!(!g.has_flag(Glyph::OBLIQUE));
        assert_eq!(Glyph::from_bits(g.bits()), g);
    }

    #[test]
    fn style_mask_never_perturbs_char_or_color() {
        let g = Glyph::pack('x', 0, 0x1122_3344);
        let styled = Glyph::from_bits(g.bits() ^ Glyph::BOLD ^ Glyph::STRIKETHROUGH);
        assert_eq!(styled.char_code(), g.char_code());
        assert_eq!(styled.color(), g.color());
    }

    #[test]
    fn pack_discards_stray_style_bits() {
        let g = Glyph::pack('x', u64::MAX, 0);
        assert_eq!(g.char_code(), 'x' as u16);
        assert_eq!(g.color(), 0);
        assert_eq!(g.style_bits(), Glyph::STYLE_MASK);
    }

    #[test]
    fn with_char_preserves_style_and_color() {
        let g = Glyph::pack('a', Glyph::OBLIQUE | Glyph::SUBSCRIPT, 0xFF00_00FF);
        let dot = g.with_char('.');
        assert_eq!(dot.character(), '.');
        assert_eq!(dot.style_bits(), g.style_bits());
        assert_eq!(dot.color(), g.color());
    }

    #[test]
    fn script_field_decodes_all_four_states() {
        for (bits, expect) in [
            (0, ScriptPosition::Normal),
            (Glyph::SUBSCRIPT, ScriptPosition::Subscript),
            (Glyph::MIDSCRIPT, ScriptPosition::Midscript),
            (Glyph::SUPERSCRIPT, ScriptPosition::Superscript),
        ] {
            assert_eq!(Glyph::pack('s', bits, 0).script(), expect);
        }
    }

    #[test]
    fn astral_characters_collapse_to_replacement() {
        let g = Glyph::pack('\u{1F600}', 0, 0);
        assert_eq!(g.character(), char::REPLACEMENT_CHARACTER);
    }
}
