/// Font weight classes the card uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextWeight {
    /// Body text.
    Regular,
    /// Headings and badges.
    Bold,
}

impl TextWeight {
    /// CSS numeric weight.
    pub fn css(self) -> u16 {
        match self {
            TextWeight::Regular => 400,
            TextWeight::Bold => 700,
        }
    }
}

/// Capability to measure the advance width of a single line of text.
///
/// Layout is a pure function of its inputs as long as the measurer is deterministic.
pub trait TextMeasure {
    /// Advance width in pixels of `text` set at `size_px`.
    fn measure(&mut self, text: &str, size_px: f32, weight: TextWeight) -> f64;
}

/// Deterministic width estimate from a per-character advance table (in ems).
///
/// Used when no font is available so that layout stays stable on any host.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproxMetrics;

impl ApproxMetrics {
    fn advance_em(c: char) -> f64 {
        match c {
            ' ' => 0.28,
            'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.26,
            'f' | 't' | 'r' | 'I' | '/' | '(' | ')' | '-' => 0.36,
            'm' | 'w' => 0.84,
            'M' | 'W' | '@' => 0.92,
            'a'..='z' => 0.55,
            'A'..='Z' => 0.68,
            '0'..='9' => 0.58,
            c if c.is_ascii() => 0.5,
            _ => 0.9,
        }
    }
}

impl TextMeasure for ApproxMetrics {
    fn measure(&mut self, text: &str, size_px: f32, weight: TextWeight) -> f64 {
        let bold = match weight {
            TextWeight::Regular => 1.0,
            TextWeight::Bold => 1.06,
        };
        let ems: f64 = text.chars().map(Self::advance_em).sum();
        ems * f64::from(size_px) * bold
    }
}

/// Shorten `text` with a trailing ellipsis until it fits `max_width`.
///
/// Returns the fitted string and its measured width.
pub fn fit_text(
    measure: &mut dyn TextMeasure,
    text: &str,
    size_px: f32,
    weight: TextWeight,
    max_width: f64,
) -> (String, f64) {
    let full = measure.measure(text, size_px, weight);
    if full <= max_width {
        return (text.to_string(), full);
    }

    let chars: Vec<char> = text.chars().collect();
    let (mut lo, mut hi) = (0usize, chars.len());
    // Largest prefix length whose ellipsized form fits.
    while lo < hi {
        let mid = (lo + hi).div_ceil(2);
        let candidate = ellipsized(&chars[..mid]);
        if measure.measure(&candidate, size_px, weight) <= max_width {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    let out = ellipsized(&chars[..lo]);
    let w = measure.measure(&out, size_px, weight);
    (out, w)
}

fn ellipsized(prefix: &[char]) -> String {
    let mut s: String = prefix.iter().collect();
    let trimmed = s.trim_end().len();
    s.truncate(trimmed);
    s.push('…');
    s
}
