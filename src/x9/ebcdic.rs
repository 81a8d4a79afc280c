/// EBCDIC code page 037 <-> text conversion for X9 text fields.
/// See https://www.ibm.com/docs/en/i/7.5?topic=sets-ebcdic-code-page-037
///
/// Only the characters that can legally appear in X9 text fields are mapped in both
/// directions; anything else decodes to U+FFFD and encodes to the EBCDIC `SUB` byte.

const EBCDIC_SUB: u8 = 0x3F;

/// Decode a slice of code page 037 bytes into a `String`.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| decode_byte(b)).collect()
}

pub fn decode_byte(byte: u8) -> char {
    match byte {
        0x00 => '\0',
        0x05 => '\t',
        0x15 | 0x25 => '\n',
        0x0D => '\r',
        0x40 => ' ',
        0x4A => '¢',
        0x4B => '.',
        0x4C => '<',
        0x4D => '(',
        0x4E => '+',
        0x4F => '|',
        0x50 => '&',
        0x5A => '!',
        0x5B => '$',
        0x5C => '*',
        0x5D => ')',
        0x5E => ';',
        0x5F => '¬',
        0x60 => '-',
        0x61 => '/',
        0x6A => '¦',
        0x6B => ',',
        0x6C => '%',
        0x6D => '_',
        0x6E => '>',
        0x6F => '?',
        0x79 => '`',
        0x7A => ':',
        0x7B => '#',
        0x7C => '@',
        0x7D => '\'',
        0x7E => '=',
        0x7F => '"',
        0x81..=0x89 => (b'a' + (byte - 0x81)) as char,
        0x91..=0x99 => (b'j' + (byte - 0x91)) as char,
        0xA1 => '~',
        0xA2..=0xA9 => (b's' + (byte - 0xA2)) as char,
        0xB0 => '^',
        0xBA => '[',
        0xBB => ']',
        0xC0 => '{',
        0xC1..=0xC9 => (b'A' + (byte - 0xC1)) as char,
        0xD0 => '}',
        0xD1..=0xD9 => (b'J' + (byte - 0xD1)) as char,
        0xE0 => '\\',
        0xE2..=0xE9 => (b'S' + (byte - 0xE2)) as char,
        0xF0..=0xF9 => (b'0' + (byte - 0xF0)) as char,
        _ => char::REPLACEMENT_CHARACTER,
    }
}

/// Encode text into code page 037. Used when building X9 files, mostly by tests.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

pub fn encode_char(c: char) -> u8 {
    match c {
        '\0' => 0x00,
        '\t' => 0x05,
        '\n' => 0x25,
        '\r' => 0x0D,
        ' ' => 0x40,
        '¢' => 0x4A,
        '.' => 0x4B,
        '<' => 0x4C,
        '(' => 0x4D,
        '+' => 0x4E,
        '|' => 0x4F,
        '&' => 0x50,
        '!' => 0x5A,
        '$' => 0x5B,
        '*' => 0x5C,
        ')' => 0x5D,
        ';' => 0x5E,
        '¬' => 0x5F,
        '-' => 0x60,
        '/' => 0x61,
        '¦' => 0x6A,
        ',' => 0x6B,
        '%' => 0x6C,
        '_' => 0x6D,
        '>' => 0x6E,
        '?' => 0x6F,
        '`' => 0x79,
        ':' => 0x7A,
        '#' => 0x7B,
        '@' => 0x7C,
        '\'' => 0x7D,
        '=' => 0x7E,
        '"' => 0x7F,
        'a'..='i' => 0x81 + (c as u8 - b'a'),
        'j'..='r' => 0x91 + (c as u8 - b'j'),
        '~' => 0xA1,
        's'..='z' => 0xA2 + (c as u8 - b's'),
        '^' => 0xB0,
        '[' => 0xBA,
        ']' => 0xBB,
        '{' => 0xC0,
        'A'..='I' => 0xC1 + (c as u8 - b'A'),
        '}' => 0xD0,
        'J'..='R' => 0xD1 + (c as u8 - b'J'),
        '\\' => 0xE0,
        'S'..='Z' => 0xE2 + (c as u8 - b'S'),
        '0'..='9' => 0xF0 + (c as u8 - b'0'),
        _ => EBCDIC_SUB,
    }
}
