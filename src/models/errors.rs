use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Field-scoped validation failures, collected across every rule of a
/// record before the write is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("{}", summarize(.fields))]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        self.fields.iter().map(|(field, msgs)| (*field, msgs.as_slice()))
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Renders `field message` pairs, comma-separated, in field order.
fn summarize(fields: &BTreeMap<&'static str, Vec<String>>) -> String {
    fields
        .iter()
        .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{} {}", field, m)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reasons an administrator decision cannot be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("event has already been reviewed")]
    AlreadyDecided,

    #[error("event has already started")]
    AlreadyStarted,
}
