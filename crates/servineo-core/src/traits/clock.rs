// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clock and id-generation ports.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Produces request identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self, now: DateTime<Utc>) -> String;
}

/// `SOL-<base36 millis>-<9 random base36 chars>`, uppercased.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

const RANDOM_SUFFIX_LEN: usize = 9;

impl IdGenerator for RandomIds {
    fn generate(&self, now: DateTime<Utc>) -> String {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let mut rng = rand::thread_rng();
        let suffix: String = (0..RANDOM_SUFFIX_LEN)
            .map(|_| base36_digit(rng.gen_range(0..36)))
            .collect();
        format!("SOL-{}-{}", to_base36(millis), suffix).to_uppercase()
    }
}

/// Renders `value` in lowercase base 36.
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(base36_digit((value % 36) as u32));
        value /= 36;
    }
    digits.iter().rev().collect()
}

fn base36_digit(d: u32) -> char {
    char::from_digit(d, 36).unwrap_or('0')
}
