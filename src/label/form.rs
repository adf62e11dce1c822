//! Operator form state.
//!
//! [`LabelForm`] holds the fields the operator edits between prints and
//! produces a fresh [`LabelData`] snapshot on demand. The only automatic
//! mutation is [`LabelForm::advance`], called after a successful print.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::{LabelData, ProductCode, Weight};
use crate::error::LabelError;
use crate::printer::LabelSize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelForm {
    date: NaiveDate,
    pub product: ProductCode,
    sequence: u32,
    weight: Weight,
    pub size: LabelSize,
}

impl LabelForm {
    /// Start a session dated today.
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    /// Start a session with a fixed date.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            product: ProductCode::default(),
            sequence: 1,
            weight: Weight::new(),
            size: LabelSize::default(),
        }
    }

    /// Resume numbering at `sequence` (0 is raised to 1).
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence.max(1);
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn weight(&self) -> &Weight {
        &self.weight
    }

    pub fn set_weight(&mut self, weight: Weight) {
        self.weight = weight;
    }

    /// Apply a keypad key to the weight buffer.
    pub fn press_key(&mut self, key: char) -> bool {
        self.weight.press(key)
    }

    pub fn delete_key(&mut self) {
        self.weight.delete();
    }

    pub fn increment(&mut self) {
        self.sequence = self.sequence.saturating_add(1);
    }

    /// Decrement, clamped at 1.
    pub fn decrement(&mut self) {
        self.sequence = self.sequence.saturating_sub(1).max(1);
    }

    /// Manual sequence entry. Non-numeric or non-positive input is rejected
    /// and the current value is kept.
    pub fn set_sequence(&mut self, input: &str) -> Result<u32, LabelError> {
        let value = input
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| LabelError::InvalidSequence(input.to_string()))?;
        self.sequence = value;
        Ok(value)
    }

    /// Whether the print action should be offered (a weight was entered).
    pub fn ready_to_print(&self) -> bool {
        !self.weight.is_empty()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> LabelData {
        LabelData {
            date: self.date,
            product: self.product,
            sequence: self.sequence,
            weight: self.weight.clone(),
            size: self.size,
        }
    }

    /// Post-print transition: next sequence number, empty weight.
    pub fn advance(&mut self) {
        self.increment();
        self.weight.clear();
    }
}
