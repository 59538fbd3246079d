use std::path::Path;

use ttf_parser::{Face, GlyphId};

use super::RenderError;

/// Helvetica advance widths (1/1000 em) for ASCII 0x20..=0x7E.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

const HELVETICA_FALLBACK: u16 = 556;

/// Bold faces run slightly wider; close enough for line breaking.
const BOLD_WIDTH_FACTOR: f32 = 1.06;

pub fn helvetica_width(c: char, bold: bool) -> f32 {
    let base = match c as u32 {
        cp @ 0x20..=0x7E => HELVETICA_ASCII[(cp - 0x20) as usize],
        0xA0 => 278,
        _ => HELVETICA_FALLBACK,
    } as f32
        / 1000.0;
    if bold {
        base * BOLD_WIDTH_FACTOR
    } else {
        base
    }
}

/// Single-byte WinAnsiEncoding code for `c`, if the standard fonts can show it.
pub fn winansi_byte(c: char) -> Option<u8> {
    let cp = c as u32;
    match cp {
        0x20..=0x7E | 0xA0..=0xFF => Some(cp as u8),
        _ => {
            let b = match c {
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
                _ => return None,
            };
            Some(b)
        }
    }
}

/// WinAnsi bytes for `text`; anything outside the encoding becomes `?`.
pub fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| winansi_byte(c).unwrap_or(b'?'))
        .collect()
}

/// An external TrueType face used for every glyph once configured.
#[derive(Debug, Clone)]
pub struct TrueTypeFont {
    data: Vec<u8>,
    pub base_name: String,
    pub units_per_em: f32,
    pub ascent: f32,
    pub descent: f32,
    pub cap_height: f32,
    pub bbox: [f32; 4],
}

impl TrueTypeFont {
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let data = std::fs::read(path).map_err(|e| RenderError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_bytes(data, &stem)
    }

    pub fn from_bytes(data: Vec<u8>, name_hint: &str) -> Result<Self, RenderError> {
        let face = Face::parse(&data, 0).map_err(|e| RenderError::Font(e.to_string()))?;
        let upem = face.units_per_em() as f32;
        let scale = 1000.0 / upem;
        let bb = face.global_bounding_box();
        let ascent = face.ascender() as f32 * scale;
        let descent = face.descender() as f32 * scale;
        let cap_height = face
            .capital_height()
            .map(|h| h as f32 * scale)
            .unwrap_or(ascent);
        let bbox = [
            bb.x_min as f32 * scale,
            bb.y_min as f32 * scale,
            bb.x_max as f32 * scale,
            bb.y_max as f32 * scale,
        ];
        // PDF names must stay within regular characters.
        let mut base_name: String = name_hint
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        if base_name.is_empty() {
            base_name = "EmbeddedFont".to_string();
        }
        Ok(Self {
            data,
            base_name,
            units_per_em: upem,
            ascent,
            descent,
            cap_height,
            bbox,
        })
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Glyph id and advance (in em) for `c`; unmapped characters use glyph 0.
    pub fn glyph(&self, c: char) -> (u16, f32) {
        let Some(face) = self.face() else {
            return (0, 0.5);
        };
        let gid = face.glyph_index(c).unwrap_or(GlyphId(0));
        let adv = face
            .glyph_hor_advance(gid)
            .map(|a| a as f32 / self.units_per_em)
            .unwrap_or(0.5);
        (gid.0, adv)
    }

    pub fn has_glyph(&self, c: char) -> bool {
        self.face()
            .and_then(|f| f.glyph_index(c))
            .is_some()
    }
}

/// Fonts available to one render call.
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    truetype: Option<TrueTypeFont>,
}

impl FontSet {
    pub fn builtin() -> Self {
        Self { truetype: None }
    }

    pub fn with_truetype(font: TrueTypeFont) -> Self {
        Self {
            truetype: Some(font),
        }
    }

    /// Loads the configured face; a broken file is logged and the built-in
    /// fonts are used instead.
    pub fn from_config(path: Option<&Path>) -> Self {
        match path {
            None => Self::builtin(),
            Some(p) => match TrueTypeFont::load(p) {
                Ok(font) => {
                    if !font.has_glyph('\u{0627}') {
                        tracing::warn!(path = %p.display(), "document font has no Arabic-script glyphs");
                    }
                    tracing::info!(path = %p.display(), "loaded document font");
                    Self::with_truetype(font)
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "document font unusable; falling back to Helvetica");
                    Self::builtin()
                }
            },
        }
    }

    pub fn truetype(&self) -> Option<&TrueTypeFont> {
        self.truetype.as_ref()
    }

    /// Advance of `c` in em.
    pub fn advance(&self, c: char, bold: bool) -> f32 {
        match &self.truetype {
            Some(f) => f.glyph(c).1,
            None => helvetica_width(c, bold),
        }
    }

    pub fn measure(&self, text: &str, size: f32, bold: bool) -> f32 {
        text.chars().map(|c| self.advance(c, bold)).sum::<f32>() * size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_widths_follow_afm() {
        assert_eq!(helvetica_width('W', false), 0.944);
        assert_eq!(helvetica_width('i', false), 0.222);
        assert!(helvetica_width('W', true) > helvetica_width('W', false));
        let fonts = FontSet::builtin();
        assert!((fonts.measure("ab", 10.0, false) - 11.12).abs() < 1e-3);
    }

    #[test]
    fn winansi_replaces_unencodable() {
        assert_eq!(encode_winansi("A–é"), vec![b'A', 0x96, 0xE9]);
        assert_eq!(encode_winansi("✓ ok"), b"? ok".to_vec());
    }

    #[test]
    fn garbage_font_is_rejected() {
        let err = TrueTypeFont::from_bytes(vec![0, 1, 2, 3], "x").expect_err("garbage");
        assert_eq!(err.code(), "render_failed");
        let fonts = FontSet::from_config(Some(Path::new("/nonexistent/font.ttf")));
        assert!(fonts.truetype().is_none());
    }
}
