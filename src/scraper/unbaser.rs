use std::collections::HashMap;

use crate::scraper::unpacker::UnpackError;

const ALPHANUMERIC: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const PRINTABLE_ASCII: &str = " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// Converts placeholder words from a packed payload back into symbol-table
/// indices. Bases 2-36 go through the native radix parser; 37-62 use the
/// digits+lower+upper alphabet packers favor; base 95 covers the printable
/// ASCII variant.
#[derive(Debug)]
pub struct Unbaser {
    base: usize,
    // only populated for bases the stdlib parser can't handle
    dictionary: Option<HashMap<char, usize>>,
}

impl Unbaser {
    pub fn new(base: usize) -> Result<Self, UnpackError> {
        let dictionary = match base {
            2..=36 => None,
            37..=62 => Some(char_values(&ALPHANUMERIC[..base])),
            95 => Some(char_values(PRINTABLE_ASCII)),
            _ => return Err(UnpackError::UnsupportedRadix(base)),
        };

        Ok(Self { base, dictionary })
    }

    /// Parses `word` as a base-`self.base` number. Any character outside the
    /// base's alphabet fails the whole word, and so does a value past
    /// `usize::MAX`; long ordinary identifiers overflow well before any
    /// plausible symbol-table index.
    pub fn unbase(&self, word: &str) -> Option<usize> {
        match &self.dictionary {
            None => usize::from_str_radix(word, self.base as u32).ok(),
            Some(dict) => word.chars().try_fold(0usize, |acc, c| {
                acc.checked_mul(self.base)?.checked_add(*dict.get(&c)?)
            }),
        }
    }
}

fn char_values(alphabet: &str) -> HashMap<char, usize> {
    alphabet.chars().enumerate().map(|(i, c)| (c, i)).collect()
}
