//! Requested slot-set normalization and validation
//!
//! Clients send slot numbers either as an array (`[3, 4, 5]`) or as a
//! delimited string (`"[3,4,5]"`, `"3, 4, 5"`). Both normalize into a
//! deduplicated ascending list which must be 1..=4 strictly contiguous
//! positive numbers. Validation fails fast; no state is touched.

use crate::shared::{DomainError, DomainResult};

/// Maximum number of slots a single booking may hold
pub const MAX_SLOTS_PER_BOOKING: usize = 4;

/// A validated, normalized set of requested slot numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSelection {
    numbers: Vec<i32>,
}

impl SlotSelection {
    /// Normalize and validate a list of slot numbers.
    pub fn from_numbers(raw: Vec<i32>) -> DomainResult<Self> {
        let mut numbers: Vec<i32> = raw.into_iter().filter(|n| *n > 0).collect();
        numbers.sort_unstable();
        numbers.dedup();

        if numbers.is_empty() {
            return Err(DomainError::Validation(
                "No valid slot numbers provided".to_string(),
            ));
        }
        if numbers.len() > MAX_SLOTS_PER_BOOKING {
            return Err(DomainError::Validation(format!(
                "A booking may hold at most {} slots, got {}",
                MAX_SLOTS_PER_BOOKING,
                numbers.len()
            )));
        }
        if let Some(window) = numbers.windows(2).find(|w| w[1] - w[0] != 1) {
            return Err(DomainError::Validation(format!(
                "Slots must be contiguous: gap between {} and {}",
                window[0], window[1]
            )));
        }

        Ok(Self { numbers })
    }

    /// Parse a delimited string form, e.g. `"[3,4,5]"` or `"3, 4, 5"`.
    /// Non-numeric fragments are dropped before validation.
    pub fn parse_str(s: &str) -> DomainResult<Self> {
        let numbers = s
            .trim_matches(|c| c == '[' || c == ']' || c == ' ')
            .split(',')
            .filter_map(|part| part.trim().parse::<i32>().ok())
            .collect();
        Self::from_numbers(numbers)
    }

    pub fn numbers(&self) -> &[i32] {
        &self.numbers
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Total reserved time in hours for this selection.
    pub fn duration_hours(&self, slot_minutes: u32) -> f64 {
        self.numbers.len() as f64 * slot_minutes as f64 / 60.0
    }
}
