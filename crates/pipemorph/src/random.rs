//! Randomized operations with a reproducibility contract.
//!
//! An identical seed over identical input produces identical output across
//! runs, so the exact Fisher-Yates variants below are part of the contract,
//! not an implementation detail. Unseeded operations draw from the default
//! generator owned by the current pipeline run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value as JsonValue;

/// Full Fisher-Yates: walk from the last position down, swapping each with
/// a uniformly chosen earlier-or-equal position.
fn fisher_yates<R: Rng>(items: &mut [JsonValue], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Partial Fisher-Yates: shuffle only the first `count` positions by
/// swapping each with a uniformly chosen later-or-equal position. An
/// O(n + count) selection without replacement, not a full shuffle.
fn partial_fisher_yates<R: Rng>(items: &mut [JsonValue], count: usize, rng: &mut R) {
    for i in 0..count {
        let j = rng.gen_range(i..items.len());
        items.swap(i, j);
    }
}

pub(crate) fn shuffle(
    seed: Option<u64>,
    mut input: Vec<JsonValue>,
    default_rng: &mut StdRng,
) -> Vec<JsonValue> {
    if input.len() <= 1 {
        return input;
    }
    match seed {
        Some(seed) => fisher_yates(&mut input, &mut StdRng::seed_from_u64(seed)),
        None => fisher_yates(&mut input, default_rng),
    }
    input
}

pub(crate) fn random_n(
    count: usize,
    seed: Option<u64>,
    mut input: Vec<JsonValue>,
    default_rng: &mut StdRng,
) -> Vec<JsonValue> {
    let take = count.min(input.len());
    if take == 0 {
        return Vec::new();
    }
    match seed {
        Some(seed) => partial_fisher_yates(&mut input, take, &mut StdRng::seed_from_u64(seed)),
        None => partial_fisher_yates(&mut input, take, default_rng),
    }
    input.truncate(take);
    input
}

pub(crate) fn random_one(
    seed: Option<u64>,
    mut input: Vec<JsonValue>,
    default_rng: &mut StdRng,
) -> Vec<JsonValue> {
    if input.is_empty() {
        return Vec::new();
    }
    let index = match seed {
        Some(seed) => StdRng::seed_from_u64(seed).gen_range(0..input.len()),
        None => default_rng.gen_range(0..input.len()),
    };
    vec![input.swap_remove(index)]
}
