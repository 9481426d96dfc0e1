//! External id generation for taxonomy nodes.
//!
//! External ids look like `AD-7Q2M9XKD`: the level prefix, a dash, and eight
//! characters drawn uniformly from `A-Z0-9`.

use rand_core::{OsRng, RngCore};

use crate::level::Level;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 8;

/// Largest multiple of 36 that fits in a byte; bytes at or above it are
/// rejected so every character is equally likely.
const REJECT_FROM: u8 = 252;

/// Generate a fresh external id for `level` from the OS RNG.
pub fn generate_external_id(level: Level) -> String {
  generate_external_id_with(level, &mut OsRng)
}

/// Generate an external id using the supplied RNG.
pub fn generate_external_id_with<R: RngCore + ?Sized>(
  level: Level,
  rng: &mut R,
) -> String {
  let prefix = level.descriptor().id_prefix;
  let mut id = String::with_capacity(prefix.len() + 1 + SUFFIX_LEN);
  id.push_str(prefix);
  id.push('-');

  let mut buf = [0u8; 16];
  let mut written = 0;
  while written < SUFFIX_LEN {
    rng.fill_bytes(&mut buf);
    for &b in buf.iter().filter(|&&b| b < REJECT_FROM) {
      id.push(ALPHABET[usize::from(b) % ALPHABET.len()] as char);
      written += 1;
      if written == SUFFIX_LEN {
        break;
      }
    }
  }
  id
}

/// Whether `id` has the shape produced by [`generate_external_id`] for
/// `level`.
pub fn is_external_id(level: Level, id: &str) -> bool {
  let Some(suffix) = id
    .strip_prefix(level.descriptor().id_prefix)
    .and_then(|rest| rest.strip_prefix('-'))
  else {
    return false;
  };
  suffix.len() == SUFFIX_LEN && suffix.bytes().all(|b| ALPHABET.contains(&b))
}
