//! Glyph advance tables for the four Times variants and the text measurement interface.
//!
//! Widths are the Adobe AFM advances of the PDF standard-14 Times fonts, in
//! 1/1000 em. The PDF renderer draws with exactly these fonts under
//! WinAnsiEncoding, so a string measured here is the width it is drawn at.
//! Characters outside WinAnsi are drawn as `?` and measured the same way.
//!
//! Each table covers every WinAnsi code point: ASCII 0x20..=0x7E
//! (index = byte - 32) and the upper half 0x80..=0xFF (index = byte - 0x80).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization as _;

// ────────────────────────────────────────────────────────────────────────────
// Style variants
// ────────────────────────────────────────────────────────────────────────────

/// The four style variants of the single serif family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleVariant {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl StyleVariant {
    pub const ALL: [StyleVariant; 4] = [
        StyleVariant::Regular,
        StyleVariant::Bold,
        StyleVariant::Italic,
        StyleVariant::BoldItalic,
    ];

    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => StyleVariant::Regular,
            (true, false) => StyleVariant::Bold,
            (false, true) => StyleVariant::Italic,
            (true, true) => StyleVariant::BoldItalic,
        }
    }

    /// PostScript name of the standard font drawn for this variant.
    pub fn base_font(self) -> &'static str {
        match self {
            StyleVariant::Regular => "Times-Roman",
            StyleVariant::Bold => "Times-Bold",
            StyleVariant::Italic => "Times-Italic",
            StyleVariant::BoldItalic => "Times-BoldItalic",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Measurement interface
// ────────────────────────────────────────────────────────────────────────────

/// Returns the drawn width of a string in points.
///
/// Wrapping decisions are only as good as this measurement: the production
/// implementation must report the exact advances the PDF renderer draws with.
pub trait TextMeasurer: Send + Sync {
    fn width_of_text_at_size(&self, text: &str, variant: StyleVariant, size: f32) -> f32;
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metric table for {font} has a zero advance for WinAnsi byte {byte:#04x}")]
    ZeroAdvance { font: &'static str, byte: u8 },
}

/// Measurer backed by the static Times tables below.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMeasurer {
    tables: [&'static FontMetricTable; 4],
}

impl StandardFontMeasurer {
    /// Loads and checks the four variant tables. Fails if any table is unusable;
    /// there is no fallback measurer.
    pub fn load() -> Result<Self, MetricsError> {
        let tables = StyleVariant::ALL.map(get_metrics);
        for table in &tables {
            if let Some(i) = table.widths.iter().position(|&w| w == 0) {
                return Err(MetricsError::ZeroAdvance {
                    font: table.variant.base_font(),
                    byte: i as u8 + 0x20,
                });
            }
            if let Some(i) = (0u8..0x80).find(|&i| {
                table.upper[usize::from(i)] == 0 && !UNDEFINED_WIN_ANSI.contains(&(i + 0x80))
            }) {
                return Err(MetricsError::ZeroAdvance {
                    font: table.variant.base_font(),
                    byte: i + 0x80,
                });
            }
        }
        Ok(Self { tables })
    }

    fn table(&self, variant: StyleVariant) -> &'static FontMetricTable {
        match variant {
            StyleVariant::Regular => self.tables[0],
            StyleVariant::Bold => self.tables[1],
            StyleVariant::Italic => self.tables[2],
            StyleVariant::BoldItalic => self.tables[3],
        }
    }
}

impl TextMeasurer for StandardFontMeasurer {
    fn width_of_text_at_size(&self, text: &str, variant: StyleVariant, size: f32) -> f32 {
        self.table(variant).measure_str(text) * size / 1000.0
    }
}

/// Approximate measurer (fixed average advance). Test fixtures only.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct AverageWidthMeasurer {
    /// Advance of every character in em.
    pub em_per_char: f32,
}

#[cfg(test)]
impl TextMeasurer for AverageWidthMeasurer {
    fn width_of_text_at_size(&self, text: &str, _variant: StyleVariant, size: f32) -> f32 {
        text.chars().count() as f32 * self.em_per_char * size
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WinAnsi mapping
// ────────────────────────────────────────────────────────────────────────────

/// Maps a character to its WinAnsiEncoding byte.
///
/// Accented letters outside WinAnsi fall back to their unaccented base
/// letter; anything else unencodable becomes `?`. Never returns a byte
/// from [`UNDEFINED_WIN_ANSI`].
pub fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\t' | '\u{2009}' | '\u{200A}' | '\u{202F}' => b' ',
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        _ => c
            .nfd()
            .next()
            .filter(|base| (' '..='~').contains(base))
            .map(|base| base as u8)
            .unwrap_or(b'?'),
    }
}

/// Code points WinAnsiEncoding leaves without a glyph.
pub const UNDEFINED_WIN_ANSI: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// Encodes a string as WinAnsi bytes for a PDF text operator.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static advance-width table for one variant, in 1/1000 em.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub variant: StyleVariant,
    widths: [u16; 95],
    /// WinAnsi 0x80..=0xFF. Slots WinAnsi leaves undefined hold 0.
    upper: [u16; 128],
}

impl std::fmt::Debug for FontMetricTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMetricTable")
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

impl FontMetricTable {
    fn ascii_width(&self, byte: u8) -> u16 {
        self.widths[(byte - 32) as usize]
    }

    /// Advance of one character in 1/1000 em, as drawn under WinAnsi.
    pub fn char_width(&self, c: char) -> u16 {
        match win_ansi_byte(c) {
            b @ 0x20..=0x7E => self.ascii_width(b),
            b @ 0x80..=0xFF => self.upper[usize::from(b - 0x80)],
            _ => self.ascii_width(b'?'),
        }
    }

    /// Measures a string in 1/1000 em.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| f32::from(self.char_width(c))).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII + 128 upper-half slots each)
// ────────────────────────────────────────────────────────────────────────────

static TIMES_ROMAN: FontMetricTable = FontMetricTable {
    variant: StyleVariant::Regular,
    #[rustfmt::skip]
    widths: [
        // sp  !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
        // 0-9
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        // :   ;    <    =    >    ?    @
        278, 278, 564, 564, 564, 444, 921,
        // A   B    C    D    E    F    G    H    I    J    K    L    M
        722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
        // N   O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
        // [   \    ]    ^    _    `
        333, 278, 333, 469, 500, 333,
        // a   b    c    d    e    f    g    h    i    j    k    l    m
        444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
        // n   o    p    q    r    s    t    u    v    w    x    y    z
        500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
        // {   |    }    ~
        480, 200, 480, 541,
    ],
    #[rustfmt::skip]
    upper: [
        // 0x80
        500, 0, 333, 500, 444, 1000, 500, 500, 333, 1000, 556, 333, 889, 0, 611, 0,
        // 0x90
        0, 333, 333, 444, 444, 350, 500, 1000, 333, 980, 389, 333, 722, 0, 444, 722,
        // 0xA0
        250, 333, 500, 500, 500, 500, 200, 500, 333, 760, 276, 500, 564, 333, 760, 333,
        // 0xB0
        400, 564, 300, 300, 333, 500, 453, 250, 333, 300, 310, 500, 750, 750, 750, 444,
        // 0xC0
        722, 722, 722, 722, 722, 722, 889, 667, 611, 611, 611, 611, 333, 333, 333, 333,
        // 0xD0
        722, 722, 722, 722, 722, 722, 722, 564, 722, 722, 722, 722, 722, 722, 556, 500,
        // 0xE0
        444, 444, 444, 444, 444, 444, 667, 444, 444, 444, 444, 444, 278, 278, 278, 278,
        // 0xF0
        500, 500, 500, 500, 500, 500, 500, 564, 500, 500, 500, 500, 500, 500, 500, 500,
    ],
};

static TIMES_BOLD: FontMetricTable = FontMetricTable {
    variant: StyleVariant::Bold,
    #[rustfmt::skip]
    widths: [
        // sp  !    "    #    $    %     &    '    (    )    *    +    ,    -    .    /
        250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
        // 0-9
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        // :   ;    <    =    >    ?    @
        333, 333, 570, 570, 570, 500, 930,
        // A   B    C    D    E    F    G    H    I    J    K    L    M
        722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
        // N   O    P    Q    R    S    T    U    V    W     X    Y    Z
        722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
        // [   \    ]    ^    _    `
        333, 278, 333, 581, 500, 333,
        // a   b    c    d    e    f    g    h    i    j    k    l    m
        500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
        // n   o    p    q    r    s    t    u    v    w    x    y    z
        556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
        // {   |    }    ~
        394, 220, 394, 520,
    ],
    #[rustfmt::skip]
    upper: [
        // 0x80
        500, 0, 333, 500, 500, 1000, 500, 500, 333, 1000, 556, 333, 1000, 0, 667, 0,
        // 0x90
        0, 333, 333, 500, 500, 350, 500, 1000, 333, 1000, 389, 333, 722, 0, 444, 722,
        // 0xA0
        250, 333, 500, 500, 500, 500, 220, 500, 333, 747, 300, 500, 570, 333, 747, 333,
        // 0xB0
        400, 570, 300, 300, 333, 556, 540, 250, 333, 300, 330, 500, 750, 750, 750, 500,
        // 0xC0
        722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 389, 389, 389, 389,
        // 0xD0
        722, 722, 778, 778, 778, 778, 778, 570, 778, 722, 722, 722, 722, 722, 611, 556,
        // 0xE0
        500, 500, 500, 500, 500, 500, 722, 444, 444, 444, 444, 444, 278, 278, 278, 278,
        // 0xF0
        500, 556, 500, 500, 500, 500, 500, 570, 500, 556, 556, 556, 556, 500, 556, 500,
    ],
};

static TIMES_ITALIC: FontMetricTable = FontMetricTable {
    variant: StyleVariant::Italic,
    #[rustfmt::skip]
    widths: [
        // sp  !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
        // 0-9
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        // :   ;    <    =    >    ?    @
        333, 333, 675, 675, 675, 500, 920,
        // A   B    C    D    E    F    G    H    I    J    K    L    M
        611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833,
        // N   O    P    Q    R    S    T    U    V    W    X    Y    Z
        667, 722, 611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556,
        // [   \    ]    ^    _    `
        389, 278, 389, 422, 500, 333,
        // a   b    c    d    e    f    g    h    i    j    k    l    m
        500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722,
        // n   o    p    q    r    s    t    u    v    w    x    y    z
        500, 500, 500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389,
        // {   |    }    ~
        400, 275, 400, 541,
    ],
    #[rustfmt::skip]
    upper: [
        // 0x80
        500, 0, 333, 500, 556, 889, 500, 500, 333, 1000, 500, 333, 944, 0, 556, 0,
        // 0x90
        0, 333, 333, 556, 556, 350, 500, 889, 333, 980, 389, 333, 667, 0, 389, 556,
        // 0xA0
        250, 389, 500, 500, 500, 500, 275, 500, 333, 760, 276, 500, 675, 333, 760, 333,
        // 0xB0
        400, 675, 300, 300, 333, 500, 523, 250, 333, 300, 310, 500, 750, 750, 750, 500,
        // 0xC0
        611, 611, 611, 611, 611, 611, 889, 667, 611, 611, 611, 611, 333, 333, 333, 333,
        // 0xD0
        722, 667, 722, 722, 722, 722, 722, 675, 722, 722, 722, 722, 722, 556, 611, 500,
        // 0xE0
        500, 500, 500, 500, 500, 500, 667, 444, 444, 444, 444, 444, 278, 278, 278, 278,
        // 0xF0
        500, 500, 500, 500, 500, 500, 500, 675, 500, 500, 500, 500, 500, 444, 500, 444,
    ],
};

static TIMES_BOLD_ITALIC: FontMetricTable = FontMetricTable {
    variant: StyleVariant::BoldItalic,
    #[rustfmt::skip]
    widths: [
        // sp  !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
        // 0-9
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        // :   ;    <    =    >    ?    @
        333, 333, 570, 570, 570, 500, 832,
        // A   B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889,
        // N   O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 722, 611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611,
        // [   \    ]    ^    _    `
        333, 278, 333, 570, 500, 333,
        // a   b    c    d    e    f    g    h    i    j    k    l    m
        500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778,
        // n   o    p    q    r    s    t    u    v    w    x    y    z
        556, 500, 500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389,
        // {   |    }    ~
        348, 220, 348, 570,
    ],
    #[rustfmt::skip]
    upper: [
        // 0x80
        500, 0, 333, 500, 500, 1000, 500, 500, 333, 1000, 556, 333, 944, 0, 611, 0,
        // 0x90
        0, 333, 333, 500, 500, 350, 500, 1000, 333, 1000, 389, 333, 722, 0, 389, 611,
        // 0xA0
        250, 389, 500, 500, 500, 500, 220, 500, 333, 747, 266, 500, 606, 333, 747, 333,
        // 0xB0
        400, 570, 300, 300, 333, 576, 500, 250, 333, 300, 300, 500, 750, 750, 750, 500,
        // 0xC0
        667, 667, 667, 667, 667, 667, 944, 667, 667, 667, 667, 667, 389, 389, 389, 389,
        // 0xD0
        722, 722, 722, 722, 722, 722, 722, 570, 722, 722, 722, 722, 722, 611, 611, 500,
        // 0xE0
        500, 500, 500, 500, 500, 500, 722, 444, 444, 444, 444, 444, 278, 278, 278, 278,
        // 0xF0
        500, 556, 500, 500, 500, 500, 500, 570, 500, 556, 556, 556, 556, 444, 500, 444,
    ],
};

/// Returns the static metric table for a style variant.
pub fn get_metrics(variant: StyleVariant) -> &'static FontMetricTable {
    match variant {
        StyleVariant::Regular => &TIMES_ROMAN,
        StyleVariant::Bold => &TIMES_BOLD,
        StyleVariant::Italic => &TIMES_ITALIC,
        StyleVariant::BoldItalic => &TIMES_BOLD_ITALIC,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
