//! Token and character counts of the Arabic-script payload of a text.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::header::HEADER_END;
use crate::uri::Extension;
use crate::vfs::FileSystem;

/// Arabic-script letters (Arabic and Persian blocks) plus harakat and tatweel.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{0621}-\x{063A}\x{0640}-\x{0652}\x{0670}-\x{06D3}]+").expect("valid regex")
});
static LETTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{0621}-\x{063A}\x{0641}-\x{064A}\x{0671}-\x{06D3}]").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMode {
    Token,
    Char,
}

pub trait TextCounter {
    /// Count over the payload of a whole text file (header included).
    fn count(&self, text: &str, mode: CountMode) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ArabicCounter;

impl TextCounter for ArabicCounter {
    fn count(&self, text: &str, mode: CountMode) -> u64 {
        let payload = strip_header(text);
        let n = match mode {
            CountMode::Token => TOKEN_RE.find_iter(payload).count(),
            CountMode::Char => LETTER_RE.find_iter(payload).count(),
        };
        n as u64
    }
}

/// The text after the header end marker, or the whole text if there is none.
pub fn strip_header(text: &str) -> &str {
    match text.find(HEADER_END) {
        Some(pos) => {
            let rest = &text[pos + HEADER_END.len()..];
            rest.trim_start_matches('#')
        }
        None => text,
    }
}

/// The most mature existing text file for a version stem
/// (`.mARkdown`, `.completed`, `.inProgress`, bare).
pub fn find_text_file(fs: &dyn FileSystem, stem: &Path) -> Option<(PathBuf, Extension)> {
    Extension::BY_MATURITY.iter().find_map(|ext| {
        let mut name = stem.as_os_str().to_os_string();
        name.push(ext.suffix());
        let candidate = PathBuf::from(name);
        fs.is_file(&candidate).then_some((candidate, *ext))
    })
}
