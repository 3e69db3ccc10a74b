//! Random generation: bytes, tokens, and generated passwords.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#$%^&*()-_=+[]{};:,.?";

/// `len` bytes from the operating system RNG.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// URL-safe token carrying `len` random bytes.
pub fn random_token(len: usize) -> String {
    URL_SAFE_NO_PAD.encode(random_bytes(len))
}

/// Generates a password of exactly `length` characters.
///
/// A strong password of length 4 or more contains at least one lowercase
/// letter, uppercase letter, digit, and special character. Weak passwords
/// are alphanumeric.
pub fn generate_password(length: usize, strong: bool) -> String {
    let mut rng = OsRng;
    let classes: &[&[u8]] = if strong {
        &[LOWER, UPPER, DIGITS, SPECIAL]
    } else {
        &[LOWER, UPPER, DIGITS]
    };
    let alphabet: Vec<u8> = classes.concat();

    let mut chars: Vec<u8> = Vec::with_capacity(length);
    if strong && length >= classes.len() {
        for class in classes {
            chars.push(pick(&mut rng, class));
        }
    }
    while chars.len() < length {
        chars.push(pick(&mut rng, &alphabet));
    }
    chars.shuffle(&mut rng);

    chars.into_iter().map(char::from).collect()
}

fn pick<R: Rng>(rng: &mut R, set: &[u8]) -> u8 {
    set[rng.gen_range(0..set.len())]
}
