pub const REPETITION_COUNT_OFFSET: usize = 0;
pub const REPETITION_COUNT_LEN: usize = 1;
pub const ELEMENTS_OFFSET: usize = REPETITION_COUNT_OFFSET + REPETITION_COUNT_LEN;

pub const REPETITION_COUNT_ID: &str = "REP";
pub const REPETITION_COUNT_NAME: &str = "Repetition count";

pub const MAX_NUMERIC_WIDTH: usize = 64;
pub const SIX_BIT_CHAR_WIDTH: usize = 6;
pub const OCTAL_DIGIT_WIDTH: usize = 3;

/// ICAO 6-bit character alphabet (Annex 10, Vol IV).
pub const SIX_BIT_ALPHABET: &[u8; 64] =
    b"?ABCDEFGHIJKLMNOPQRSTUVWXYZ????? ???????????????0123456789??????";
