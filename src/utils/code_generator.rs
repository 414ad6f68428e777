//! Short code generation and validation utilities.
//!
//! Codes are [`CODE_LENGTH`] characters drawn uniformly from the 62-symbol
//! alphabet `[A-Za-z0-9]` using the operating system's CSPRNG.

use regex::Regex;
use std::sync::LazyLock;

/// Length of every short code.
pub const CODE_LENGTH: usize = 6;

/// Symbols a short code may contain.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Largest multiple of 62 that fits in a byte. Bytes at or above it are
/// rejected so that `byte % 62` stays uniform.
const REJECTION_BOUND: u8 = (256 / ALPHABET.len() * ALPHABET.len()) as u8;

/// Codes that would be shadowed by a fixed route and are never handed out.
pub const RESERVED_CODES: &[&str] = &["health"];

static CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{6}$").expect("static regex"));

/// Generates a cryptographically secure random short code.
///
/// # Errors
///
/// Returns the entropy source error if the system random number generator is
/// unavailable. This is not retryable.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code()?;
/// assert_eq!(code.len(), 6);
/// assert!(is_valid_code(&code));
/// ```
pub fn generate_code() -> Result<String, getrandom::Error> {
    draw_code(getrandom::fill)
}

/// Draws candidates from `fill` until one is not reserved.
fn draw_code<F>(mut fill: F) -> Result<String, getrandom::Error>
where
    F: FnMut(&mut [u8]) -> Result<(), getrandom::Error>,
{
    loop {
        let mut code = String::with_capacity(CODE_LENGTH);
        let mut buffer = [0u8; 16];

        while code.len() < CODE_LENGTH {
            fill(&mut buffer)?;

            for &byte in buffer.iter().filter(|&&b| b < REJECTION_BOUND) {
                code.push(ALPHABET[usize::from(byte) % ALPHABET.len()] as char);
                if code.len() == CODE_LENGTH {
                    break;
                }
            }
        }

        if !is_reserved(&code) {
            return Ok(code);
        }
    }
}

/// Returns `true` if `code` collides with a fixed route.
pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Returns `true` if `code` has the exact length and only alphabet characters.
pub fn is_valid_code(code: &str) -> bool {
    CODE_REGEX.is_match(code)
}
