use rand::distributions::{Distribution, Uniform};
use rand::rngs::OsRng;

use crate::domain::entities::SESSION_TOKEN_LENGTH;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const NUMERIC: &[u8] = b"0123456789";

/// Symbol set a credential is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alphabet {
    /// `A-Z`, `a-z`, `0-9` (62 symbols)
    Alphanumeric,
    /// `0-9`
    Numeric,
}

impl Alphabet {
    pub fn symbols(&self) -> &'static [u8] {
        match self {
            Alphabet::Alphanumeric => ALPHANUMERIC,
            Alphabet::Numeric => NUMERIC,
        }
    }
}

/// Generate `length` symbols drawn uniformly and independently from `alphabet`
///
/// Uses the operating system CSPRNG. A zero length yields an empty string.
pub fn generate(length: usize, alphabet: Alphabet) -> String {
    let symbols = alphabet.symbols();
    let index = Uniform::new(0, symbols.len());

    index
        .sample_iter(OsRng)
        .take(length)
        .map(|i| symbols[i] as char)
        .collect()
}

/// 32-character alphanumeric session token
pub fn generate_session_token() -> String {
    generate(SESSION_TOKEN_LENGTH, Alphabet::Alphanumeric)
}

/// Numeric passcode of the given length
pub fn generate_otp(length: usize) -> String {
    generate(length, Alphabet::Numeric)
}
