//! Transliteration (ALA-LC style Latin) to an unvocalised Arabic-script
//! skeleton. Only used to fill Arabic-script columns when a sidecar holds
//! just the transliterated form; it is a lookup, not a grammar.

pub trait Transliterator {
    fn to_arabic(&self, latin: &str) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleArabic;

const DIGRAPHS: &[(&str, char)] = &[
    ("th", 'ث'),
    ("kh", 'خ'),
    ("dh", 'ذ'),
    ("sh", 'ش'),
    ("gh", 'غ'),
];

fn letter(c: char) -> Option<char> {
    let mapped = match c {
        'b' => 'ب',
        't' => 'ت',
        'ṯ' => 'ث',
        'ǧ' | 'j' => 'ج',
        'ḥ' => 'ح',
        'ḫ' => 'خ',
        'd' => 'د',
        'ḏ' => 'ذ',
        'r' => 'ر',
        'z' => 'ز',
        's' => 'س',
        'š' => 'ش',
        'ṣ' => 'ص',
        'ḍ' => 'ض',
        'ṭ' => 'ط',
        'ẓ' => 'ظ',
        'ʿ' | '`' => 'ع',
        'ġ' => 'غ',
        'f' => 'ف',
        'q' | 'ḳ' => 'ق',
        'k' => 'ك',
        'l' => 'ل',
        'm' => 'م',
        'n' => 'ن',
        'h' => 'ه',
        'w' | 'ū' => 'و',
        'y' | 'ī' => 'ي',
        'ā' => 'ا',
        'ʾ' | '\'' => 'ء',
        'p' => 'پ',
        'č' => 'چ',
        'ž' => 'ژ',
        'g' => 'گ',
        'v' => 'و',
        _ => return None,
    };
    Some(mapped)
}

impl SimpleArabic {
    fn word(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        if lower == "b." || lower == "ibn" {
            return "بن".to_string();
        }
        if lower == "bt." || lower == "bint" {
            return "بنت".to_string();
        }
        let mut out = String::new();
        let mut rest = lower.as_str();
        for prefix in ["al-", "wa-", "bi-", "li-"] {
            if let Some(stripped) = rest.strip_prefix(prefix) {
                out.push_str(match prefix {
                    "al-" => "ال",
                    "wa-" => "و",
                    "bi-" => "ب",
                    _ => "ل",
                });
                rest = stripped;
                if prefix != "al-" {
                    if let Some(s) = rest.strip_prefix("al-") {
                        out.push_str("ال");
                        rest = s;
                    }
                }
                break;
            }
        }
        let chars: Vec<char> = rest.chars().collect();
        // Initial short vowels are carried by an alif.
        if matches!(chars.first(), Some('a' | 'i' | 'u')) {
            out.push('ا');
        }
        let mut i = 0;
        while i < chars.len() {
            if i + 1 < chars.len() {
                let pair: String = chars[i..i + 2].iter().collect();
                if let Some((_, c)) = DIGRAPHS.iter().find(|(d, _)| *d == pair) {
                    out.push(*c);
                    i += 2;
                    continue;
                }
            }
            if chars[i] == 'a' && i + 1 == chars.len() && i > 0 && chars[i - 1] == 't' {
                // -ta at word end is a tāʾ marbūṭa
                out.pop();
                out.push('ة');
            } else if let Some(c) = letter(chars[i]) {
                out.push(c);
            }
            i += 1;
        }
        out
    }
}

impl Transliterator for SimpleArabic {
    fn to_arabic(&self, latin: &str) -> String {
        latin
            .split_whitespace()
            .map(|w| self.word(w))
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
