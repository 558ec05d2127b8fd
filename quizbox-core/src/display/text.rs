//! LCD character set conversion
//!
//! The HD44780 ROM only has reliable glyphs for printable ASCII. Italian
//! accented vowels are written as the bare letter followed by an
//! apostrophe, the way the quiz bot spells them; anything else outside
//! ASCII becomes `?`.

use heapless::String;

/// Longest quiz text kept, in LCD characters
pub const MAX_TEXT_CHARS: usize = 96;

/// Buffer capacity: text plus the marquee separator
pub const TEXT_CAPACITY: usize = 104;

/// Bounded ASCII text ready for the LCD
pub type LcdText = String<TEXT_CAPACITY>;

/// Convert arbitrary UTF-8 into bounded LCD text
///
/// Conversion stops at [`MAX_TEXT_CHARS`]; a two-character expansion is
/// never split.
pub fn to_lcd_text(input: &str) -> LcdText {
    let mut out = LcdText::new();

    for c in input.chars() {
        let (first, second) = transliterate(c);
        let needed = if second.is_some() { 2 } else { 1 };
        if out.len() + needed > MAX_TEXT_CHARS {
            break;
        }
        // Capacity exceeds MAX_TEXT_CHARS, so these cannot fail
        let _ = out.push(first);
        if let Some(second) = second {
            let _ = out.push(second);
        }
    }

    out
}

/// Map one character to one or two ASCII characters
fn transliterate(c: char) -> (char, Option<char>) {
    match c {
        ' '..='~' => (c, None),
        'à' | 'á' => ('a', Some('\'')),
        'è' | 'é' => ('e', Some('\'')),
        'ì' | 'í' => ('i', Some('\'')),
        'ò' | 'ó' => ('o', Some('\'')),
        'ù' | 'ú' => ('u', Some('\'')),
        'À' | 'Á' => ('A', Some('\'')),
        'È' | 'É' => ('E', Some('\'')),
        'Ì' | 'Í' => ('I', Some('\'')),
        'Ò' | 'Ó' => ('O', Some('\'')),
        'Ù' | 'Ú' => ('U', Some('\'')),
        c if c.is_control() => (' ', None),
        _ => ('?', None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        assert_eq!(to_lcd_text("Roma").as_str(), "Roma");
        assert_eq!(to_lcd_text("d'Italia?").as_str(), "d'Italia?");
    }

    #[test]
    fn test_accents_are_spelled_out() {
        assert_eq!(
            to_lcd_text("Qual è la capitale").as_str(),
            "Qual e' la capitale"
        );
        assert_eq!(to_lcd_text("PERCHÉ").as_str(), "PERCHE'");
    }

    #[test]
    fn test_other_characters() {
        assert_eq!(to_lcd_text("ß€").as_str(), "??");
        assert_eq!(to_lcd_text("a\tb\nc").as_str(), "a b c");
    }

    #[test]
    fn test_truncates_at_limit() {
        let long = [b'x'; 200];
        let long = core::str::from_utf8(&long).unwrap();
        assert_eq!(to_lcd_text(long).len(), MAX_TEXT_CHARS);
    }

    #[test]
    fn test_expansion_not_split_at_limit() {
        let mut input: String<128> = String::new();
        for _ in 0..MAX_TEXT_CHARS - 1 {
            input.push('x').unwrap();
        }
        input.push('è').unwrap();
        let out = to_lcd_text(&input);
        assert_eq!(out.len(), MAX_TEXT_CHARS - 1);
        assert!(out.ends_with('x'));
    }
}
