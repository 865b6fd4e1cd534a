// stagecoach/src/kubernetes/names.rs

use rand::Rng;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

pub const NAME_LENGTH: usize = 10;

/// Random lowercase name, valid as a job or container name.
/// Used to avoid collisions in a shared namespace; carries no meaning.
pub fn random_name() -> String {
  let mut rng = rand::rng();
  (0..NAME_LENGTH)
    .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
    .collect()
}
