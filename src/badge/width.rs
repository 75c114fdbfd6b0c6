//! Text width estimation
//!
//! Approximate advance widths of 11px Verdana, in tenths of a pixel. Badges
//! are laid out with these numbers and the SVG `textLength` attribute pins
//! the rendered text to the same width, so small errors only change spacing.

/// Width of one character in tenths of a pixel
const fn char_width(c: char) -> u32 {
    match c {
        ' ' => 39,
        '!' | '\'' | '|' => 43,
        '"' => 50,
        '#' | '%' | '&' | '@' => 100,
        '$' | '+' | '<' | '=' | '>' | '~' | '^' | '*' => 80,
        '(' | ')' | '[' | ']' | '{' | '}' | '-' => 45,
        ',' | '.' | ':' | ';' => 40,
        '/' | '\\' | '?' => 60,
        '_' | '0'..='9' => 70,
        'i' | 'l' | 'j' => 30,
        'f' | 'r' | 't' => 43,
        's' | 'z' | 'J' => 55,
        'm' => 107,
        'w' => 90,
        'a' | 'c' | 'k' | 'v' | 'x' | 'y' => 62,
        'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' | 'E' | 'P' => 68,
        'I' => 46,
        'F' => 63,
        'L' => 61,
        'T' | 'Y' => 67,
        'S' => 72,
        'A' | 'B' | 'K' | 'R' | 'V' | 'X' | 'Z' => 75,
        'C' => 77,
        'U' => 81,
        'H' | 'N' => 83,
        'D' | 'G' => 85,
        'O' | 'Q' => 87,
        'M' => 93,
        'W' => 109,
        // Variation selectors and zero width joiners take no space
        '\u{200d}' | '\u{fe00}'..='\u{fe0f}' => 0,
        c if c.is_ascii() => 60,
        // Glyphs outside the table (emoji included) are measured as 'm', the
        // same guess badge-maker makes
        _ => 107,
    }
}

/// Width of `text` in whole pixels, rounded up
pub fn text_width(text: &str) -> u32 {
    let tenths: u32 = text.chars().map(char_width).sum();
    tenths.div_ceil(10)
}
