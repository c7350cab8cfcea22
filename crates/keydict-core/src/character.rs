// Character folding used when comparing typed keys against trie labels.
//
// A key press produces a plain letter, while the dictionary stores the word
// with its proper case and accents. Matching therefore compares each typed
// candidate against both the stored character and its "base" form: lowercase
// with the diacritic removed.

use crate::enums::QUOTE;

/// Convert a character to its simple lowercase equivalent.
///
/// For characters with multi-character lowercase expansions only the first
/// character is kept, so the mapping stays one-to-one.
pub fn simple_lower(c: char) -> char {
    let mut iter = c.to_lowercase();
    iter.next().unwrap_or(c)
}

/// Strip the diacritic from a Latin letter, keeping its case.
///
/// Covers Latin-1 Supplement and the most common Latin Extended-A letters.
/// Characters without a known base form are returned unchanged.
pub fn base_char(c: char) -> char {
    match c {
        '\u{00C0}'..='\u{00C5}' => 'A',
        '\u{00C7}' => 'C',
        '\u{00C8}'..='\u{00CB}' => 'E',
        '\u{00CC}'..='\u{00CF}' => 'I',
        '\u{00D0}' => 'D',
        '\u{00D1}' => 'N',
        '\u{00D2}'..='\u{00D6}' | '\u{00D8}' => 'O',
        '\u{00D9}'..='\u{00DC}' => 'U',
        '\u{00DD}' => 'Y',
        '\u{00E0}'..='\u{00E5}' => 'a',
        '\u{00E7}' => 'c',
        '\u{00E8}'..='\u{00EB}' => 'e',
        '\u{00EC}'..='\u{00EF}' => 'i',
        '\u{00F0}' => 'd',
        '\u{00F1}' => 'n',
        '\u{00F2}'..='\u{00F6}' | '\u{00F8}' => 'o',
        '\u{00F9}'..='\u{00FC}' => 'u',
        '\u{00FD}' | '\u{00FF}' => 'y',
        '\u{0100}' | '\u{0102}' | '\u{0104}' => 'A',
        '\u{0101}' | '\u{0103}' | '\u{0105}' => 'a',
        '\u{0106}' | '\u{0108}' | '\u{010A}' | '\u{010C}' => 'C',
        '\u{0107}' | '\u{0109}' | '\u{010B}' | '\u{010D}' => 'c',
        '\u{010E}' | '\u{0110}' => 'D',
        '\u{010F}' | '\u{0111}' => 'd',
        '\u{0112}' | '\u{0114}' | '\u{0116}' | '\u{0118}' | '\u{011A}' => 'E',
        '\u{0113}' | '\u{0115}' | '\u{0117}' | '\u{0119}' | '\u{011B}' => 'e',
        '\u{0141}' => 'L',
        '\u{0142}' => 'l',
        '\u{0143}' | '\u{0147}' => 'N',
        '\u{0144}' | '\u{0148}' => 'n',
        '\u{0158}' => 'R',
        '\u{0159}' => 'r',
        '\u{015A}' | '\u{0160}' => 'S',
        '\u{015B}' | '\u{0161}' => 's',
        '\u{0164}' => 'T',
        '\u{0165}' => 't',
        '\u{016E}' => 'U',
        '\u{016F}' => 'u',
        '\u{0179}' | '\u{017B}' | '\u{017D}' => 'Z',
        '\u{017A}' | '\u{017C}' | '\u{017E}' => 'z',
        _ => c,
    }
}

/// Lowercase base form of a character, as compared against typed keys.
#[inline]
pub fn to_base_lower(c: char) -> char {
    simple_lower(base_char(c))
}

/// Whether `c` is the apostrophe that matching treats as transparent.
#[inline]
pub fn is_quote(c: char) -> bool {
    c == QUOTE
}
