//! Opaque id generation for rallies and recommendations.
//!
//! Ids are the only non-deterministic part of an analysis, so they come from
//! a generator passed per call.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// UUID-shaped ids from a seeded ChaCha stream; same seed, same ids.
#[derive(Debug, Clone)]
pub struct SeededIdGenerator {
    rng: ChaCha8Rng,
}

impl SeededIdGenerator {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl IdGenerator for SeededIdGenerator {
    fn next_id(&mut self) -> String {
        let bytes: [u8; 16] = self.rng.gen();
        uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
    }
}

/// `prefix-0001`, `prefix-0002`, ...
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), next: 1 }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{:04}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
