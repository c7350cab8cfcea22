// FFI functions are inherently unsafe; callers must ensure pointer validity.
// Safety contracts are documented per-function in the public API comments.
#![allow(clippy::missing_safety_doc)]

// keydict-ffi: C-compatible FFI layer for BinaryDictionary.
//
// This crate exposes the C ABI a keyboard's native layer calls into
// (JNI glue, Swift, plain C).
//
// Memory management rules:
// - Opaque `BinaryDictionary` pointer: created by `keydict_open` or
//   `keydict_open_bytes`, freed by `keydict_free`. `keydict_close` releases
//   the buffer but leaves the handle valid.
// - Returned suggestion arrays: caller must free with `keydict_free_suggestions`.
// - Returned strings: caller must free with `keydict_free_str`.
// - All input strings are UTF-8 encoded, null-terminated C strings.

use std::ffi::{CStr, CString, c_char, c_int};
use std::ptr;
use std::slice;

use keydict_core::enums::{DataType, DictionaryTypeId, MAX_ALTERNATIVES, MAX_WORD_LENGTH, NEXT_LETTERS_SIZE};
use keydict_core::input::InputCandidates;
use keydict_core::suggestion::{NextLetterFrequencies, RankedSuggestion};
use keydict_engine::{BinaryDictionary, Dictionary, DictionarySource};

// ── Handle lifecycle ─────────────────────────────────────────────

/// Open the dictionary stored in `path`, or in its byte range
/// `offset .. offset + length` when `length` is positive.
///
/// Returns an opaque pointer on success, NULL on failure.
/// On failure, if `error_out` is non-NULL, it receives a heap-allocated error string
/// that the caller must free with `keydict_free_str`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn keydict_open(
    path: *const c_char,
    offset: u64,
    length: u64,
    dict_type: c_int,
    error_out: *mut *mut c_char,
) -> *mut BinaryDictionary {
    let Some(path) = cstr_to_str(path) else {
        set_error(error_out, "path is null or not UTF-8");
        return ptr::null_mut();
    };
    let source = if length > 0 {
        DictionarySource::file_range(path, offset, length)
    } else {
        DictionarySource::file(path)
    };
    match BinaryDictionary::try_open(vec![source], DictionaryTypeId(dict_type)) {
        Ok(dict) => Box::into_raw(Box::new(dict)),
        Err(e) => {
            set_error(error_out, &e.to_string());
            ptr::null_mut()
        }
    }
}

/// Open a dictionary from a copy of `data[..len]`.
///
/// An empty region gives a dictionary that answers nothing. Returns NULL if
/// the header is invalid.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn keydict_open_bytes(
    data: *const u8,
    len: usize,
    dict_type: c_int,
    error_out: *mut *mut c_char,
) -> *mut BinaryDictionary {
    let bytes = if data.is_null() || len == 0 {
        Vec::new()
    } else {
        unsafe { slice::from_raw_parts(data, len) }.to_vec()
    };
    match BinaryDictionary::try_open(vec![DictionarySource::Bytes(bytes)], DictionaryTypeId(dict_type)) {
        Ok(dict) => Box::into_raw(Box::new(dict)),
        Err(e) => {
            set_error(error_out, &e.to_string());
            ptr::null_mut()
        }
    }
}

/// Release the dictionary buffer. Further queries answer nothing. Safe to
/// call more than once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn keydict_close(handle: *const BinaryDictionary) {
    if let Some(dict) = unsafe { handle.as_ref() } {
        dict.close();
    }
}

/// Free a handle created by `keydict_open` or `keydict_open_bytes`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn keydict_free(handle: *mut BinaryDictionary) {
    if !handle.is_null() {
        drop(unsafe { Box::from_raw(handle) });
    }
}

/// Byte size of the dictionary buffer; 0 when closed or NULL.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn keydict_size(handle: *const BinaryDictionary) -> usize {
    match unsafe { handle.as_ref() } {
        Some(dict) => dict.size(),
        None => 0,
    }
}

// ── Queries ─────────────────────────────────────────────────────

/// Check whether a word is stored.
/// Returns 1 if stored, 0 if not, -1 on error.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn keydict_is_valid_word(handle: *const BinaryDictionary, word: *const c_char) -> c_int {
    let Some(dict) = (unsafe { handle.as_ref() }) else {
        return -1;
    };
    let Some(word) = cstr_to_str(word) else {
        return -1;
    };
    if dict.is_valid_word(word) { 1 } else { 0 }
}

/// One suggestion.
#[repr(C)]
pub struct KeydictSuggestion {
    /// Heap-allocated UTF-8 word.
    pub word: *mut c_char,
    pub score: u64,
    pub dict_type: c_int,
    /// 0 for a typed-input match, 1 for a next-word prediction.
    pub data_type: c_int,
}

/// Suggestion array, best first.
#[repr(C)]
pub struct KeydictSuggestionArray {
    pub suggestions: *mut KeydictSuggestion,
    pub count: usize,
}

/// Rank suggestions for typed input.
///
/// - `codes`: `input_size * MAX_ALTERNATIVES` code points. Position `i` uses
///   `codes[i * MAX_ALTERNATIVES ..]`, primary key first; a value <= 0 ends
///   the position early.
/// - `previous_word`: NULL or the word before the cursor.
/// - `next_letters`: NULL or an array of `NEXT_LETTERS_SIZE` counters,
///   overwritten with the next-letter counts of this query.
///
/// Returns a heap-allocated array. Caller must free with `keydict_free_suggestions`.
/// Returns an empty array on error.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn keydict_get_suggestions(
    handle: *const BinaryDictionary,
    codes: *const c_int,
    input_size: c_int,
    previous_word: *const c_char,
    next_letters: *mut c_int,
) -> KeydictSuggestionArray {
    let Some(dict) = (unsafe { handle.as_ref() }) else {
        return empty_array();
    };
    let Ok(n) = usize::try_from(input_size) else {
        return empty_array();
    };
    if n >= MAX_WORD_LENGTH || (n > 0 && codes.is_null()) {
        return empty_array();
    }
    let codes = if n == 0 {
        &[][..]
    } else {
        unsafe { slice::from_raw_parts(codes, n * MAX_ALTERNATIVES) }
    };
    let Some(input) = decode_codes(codes, n) else {
        return empty_array();
    };
    let previous = cstr_to_str(previous_word);

    let mut found: Vec<RankedSuggestion> = Vec::new();
    let mut letters = NextLetterFrequencies::new();
    dict.get_suggestions(&input, previous, &mut found, Some(&mut letters));
    unsafe { write_next_letters(next_letters, &letters) };
    suggestions_to_c(found)
}

/// Predict next words for `previous_word`.
///
/// Same ownership and `next_letters` rules as `keydict_get_suggestions`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn keydict_get_bigram_suggestions(
    handle: *const BinaryDictionary,
    previous_word: *const c_char,
    next_letters: *mut c_int,
) -> KeydictSuggestionArray {
    let Some(dict) = (unsafe { handle.as_ref() }) else {
        return empty_array();
    };
    let Some(previous) = cstr_to_str(previous_word) else {
        return empty_array();
    };
    let mut found: Vec<RankedSuggestion> = Vec::new();
    let mut letters = NextLetterFrequencies::new();
    dict.get_bigram_suggestions(previous, &mut found, Some(&mut letters));
    unsafe { write_next_letters(next_letters, &letters) };
    suggestions_to_c(found)
}

/// Free an array returned by `keydict_get_suggestions` or
/// `keydict_get_bigram_suggestions`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn keydict_free_suggestions(arr: KeydictSuggestionArray) {
    if arr.suggestions.is_null() || arr.count == 0 {
        return;
    }
    let suggestions = unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(arr.suggestions, arr.count)) };
    for s in suggestions.iter() {
        free_c_str(s.word);
    }
}

// ── Memory management ───────────────────────────────────────────

/// Free a string returned by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn keydict_free_str(s: *mut c_char) {
    free_c_str(s);
}

// ── Internal helpers ────────────────────────────────────────────

fn cstr_to_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

fn str_to_c(s: &str) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

fn set_error(out: *mut *mut c_char, msg: &str) {
    if !out.is_null() {
        unsafe {
            *out = str_to_c(msg);
        }
    }
}

fn free_c_str(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Turn the flat code array into input positions. Returns `None` when a
/// position has no usable primary key.
fn decode_codes(codes: &[c_int], n: usize) -> Option<InputCandidates> {
    let mut input = InputCandidates::new();
    let mut keys: Vec<char> = Vec::with_capacity(MAX_ALTERNATIVES);
    for position in codes.chunks(MAX_ALTERNATIVES).take(n) {
        keys.clear();
        for &code in position {
            if code <= 0 {
                break;
            }
            match char::from_u32(code as u32) {
                Some(c) => keys.push(c),
                None => break,
            }
        }
        input.push(&keys).ok()?;
    }
    Some(input)
}

unsafe fn write_next_letters(out: *mut c_int, letters: &NextLetterFrequencies) {
    if out.is_null() {
        return;
    }
    let out = unsafe { slice::from_raw_parts_mut(out, NEXT_LETTERS_SIZE) };
    for (slot, &count) in out.iter_mut().zip(letters.as_slice()) {
        *slot = c_int::try_from(count).unwrap_or(c_int::MAX);
    }
}

fn empty_array() -> KeydictSuggestionArray {
    KeydictSuggestionArray {
        suggestions: ptr::null_mut(),
        count: 0,
    }
}

fn suggestions_to_c(found: Vec<RankedSuggestion>) -> KeydictSuggestionArray {
    if found.is_empty() {
        return empty_array();
    }
    let c_suggestions: Box<[KeydictSuggestion]> = found
        .iter()
        .map(|s| KeydictSuggestion {
            word: str_to_c(&s.word),
            score: s.score,
            dict_type: s.dict_type.0,
            data_type: match s.data_type {
                DataType::Unigram => 0,
                DataType::Bigram => 1,
            },
        })
        .collect();
    let count = c_suggestions.len();
    let suggestions = Box::into_raw(c_suggestions).cast::<KeydictSuggestion>();
    tracing::trace!(count, "returning suggestions over ffi");
    KeydictSuggestionArray { suggestions, count }
}
