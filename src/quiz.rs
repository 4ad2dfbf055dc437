use std::collections::HashSet;

use rand::seq::IteratorRandom;
use rand::Rng;

use crate::db::Question;

/// Draws one of the `candidates` not yet asked in this quiz, uniformly.
pub fn pick_next_question<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    previous: &HashSet<i64>,
    rng: &mut R,
) -> Option<Question> {
    candidates
        .into_iter()
        .filter(|question| !previous.contains(&question.id))
        .choose(rng)
}
