use crate::models::job_types::Rgb;

/// Parse `#RRGGBB` or `#RGB` into a color.
///
/// Anything else falls back to white; this never fails.
pub fn parse_color(input: &str) -> Rgb {
    let s = input.trim();
    let digits = match s.strip_prefix('#') {
        Some(d) if d.bytes().all(|b| b.is_ascii_hexdigit()) => d.as_bytes(),
        _ => return Rgb::WHITE,
    };

    match digits.len() {
        3 => Rgb::new(
            hex_nibble(digits[0]) * 17,
            hex_nibble(digits[1]) * 17,
            hex_nibble(digits[2]) * 17,
        ),
        6 => Rgb::new(
            hex_nibble(digits[0]) << 4 | hex_nibble(digits[1]),
            hex_nibble(digits[2]) << 4 | hex_nibble(digits[3]),
            hex_nibble(digits[4]) << 4 | hex_nibble(digits[5]),
        ),
        _ => Rgb::WHITE,
    }
}

// Caller guarantees `b` is an ASCII hex digit.
fn hex_nibble(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}
