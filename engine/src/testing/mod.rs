//! Shared helpers for tests.


use crate::types::{Field, Key, KeyType, ObjectRef, Record};

/// Number of keys the scenario tests insert by default.
pub const SCENARIO_SIZE: usize = 10_000;

/// Deterministic pseudo-random key sequence.
///
/// Each step computes `key = (3141592621 * key + 2718281829) mod 1000000007`,
/// starting from 1999. Replaying a fresh sequence yields the same keys.
#[derive(Debug, Clone)]
pub struct KeySeq {
    key: i64,
}

impl KeySeq {
    /// Value the sequence starts from.
    pub const SEED: i64 = 1999;

    pub const fn new() -> Self {
        Self { key: Self::SEED }
    }
}

impl Default for KeySeq {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for KeySeq {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        self.key = (3_141_592_621 * self.key + 2_718_281_829) % 1_000_000_007;
        Some(self.key)
    }
}

/// Record used by field and compound index tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub int_key: i64,
    pub str_key: String,
    pub initial: char,
}

static SAMPLE_FIELDS: [Field<Sample>; 3] = [
    Field::sequence(
        "int_key",
        KeyType::I64,
        |s| Key::I64(s.int_key),
        |s, v| s.int_key = v,
    ),
    Field::key("str_key", KeyType::String, |s| Key::String(s.str_key.clone())),
    Field::unmapped("initial", "char"),
];

impl Record for Sample {
    const TYPE_NAME: &'static str = "Sample";

    fn fields() -> &'static [Field<Self>] {
        &SAMPLE_FIELDS
    }
}

/// Build a sample whose `initial` is the first character of `str_key`.
pub fn sample(int_key: i64, str_key: &str) -> Sample {
    Sample {
        int_key,
        str_key: str_key.to_string(),
        initial: str_key.chars().next().unwrap_or(' '),
    }
}

/// Object reference used for the `n`-th inserted key.
pub fn obj(n: usize) -> ObjectRef {
    ObjectRef(n as u64 + 1)
}

/// Object ids of a result list, for compact assertions.
pub fn oids(objs: &[ObjectRef]) -> Vec<u64> {
    objs.iter().map(|obj| obj.oid()).collect()
}
