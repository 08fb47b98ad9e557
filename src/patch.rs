//! Command-line parameter overrides.
//!
//! Overrides come as `(selector, parameter, value)` triples. A selector
//! ending in a digit names one task exactly (`Read2`); any other selector
//! patches every task whose identity key contains it (`TOPSAR-Split`).
//! Patching is best effort: misses are reported and skipped, never fatal.

use crate::graph::TaskRecords;
use crate::{glog, glog_warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub selector: String,
    pub parameter: String,
    pub value: String,
}

impl Override {
    pub fn new(selector: &str, parameter: &str, value: &str) -> Self {
        Self {
            selector: selector.to_string(),
            parameter: parameter.to_string(),
            value: value.to_string(),
        }
    }

    /// Whether the selector is an exact identity key.
    pub fn is_exact(&self) -> bool {
        self.selector
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_digit())
    }
}

/// Result of applying a single override to a single task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Changed {
        task: String,
        parameter: String,
        old: String,
        new: String,
    },
    /// The task or the parameter does not exist.
    NotFound { task: String, parameter: String },
    /// A substring selector matched no task.
    NoMatch { selector: String },
    /// The override tokens did not form whole triples; nothing was applied.
    Incomplete { tokens: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub outcomes: Vec<PatchOutcome>,
}

impl PatchReport {
    pub fn changed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PatchOutcome::Changed { .. }))
            .count()
    }

    pub fn missed_count(&self) -> usize {
        self.outcomes.len() - self.changed_count()
    }

    pub fn is_clean(&self) -> bool {
        self.missed_count() == 0
    }
}

/// Group tokens into triples. Returns `None` unless the count is a multiple
/// of three.
pub fn overrides_from_tokens<S: AsRef<str>>(tokens: &[S]) -> Option<Vec<Override>> {
    if tokens.len() % 3 != 0 {
        return None;
    }
    Some(
        tokens
            .chunks(3)
            .map(|t| Override::new(t[0].as_ref(), t[1].as_ref(), t[2].as_ref()))
            .collect(),
    )
}

/// Apply overrides from a launcher argument list whose first token is the
/// graph file path.
pub fn patch_from_args<S: AsRef<str>>(records: &mut TaskRecords, args: &[S]) -> PatchReport {
    let tokens = args.get(1..).unwrap_or_default();
    match overrides_from_tokens(tokens) {
        Some(overrides) => apply_overrides(records, &overrides),
        None => {
            glog_warn!(
                "Ignoring {} override tokens: expected task, parameter, value triples",
                tokens.len()
            );
            PatchReport {
                outcomes: vec![PatchOutcome::Incomplete {
                    tokens: tokens.len(),
                }],
            }
        }
    }
}

pub fn apply_overrides(records: &mut TaskRecords, overrides: &[Override]) -> PatchReport {
    let mut report = PatchReport::default();

    for ov in overrides {
        if ov.is_exact() {
            report.outcomes.push(patch_task(records, &ov.selector, ov));
            continue;
        }

        let matches: Vec<String> = records
            .keys()
            .filter(|key| key.contains(ov.selector.as_str()))
            .collect();
        if matches.is_empty() {
            glog_warn!("No task matches '{}'", ov.selector);
            report.outcomes.push(PatchOutcome::NoMatch {
                selector: ov.selector.clone(),
            });
        }
        for key in matches {
            report.outcomes.push(patch_task(records, &key, ov));
        }
    }

    report
}

fn patch_task(records: &mut TaskRecords, key: &str, ov: &Override) -> PatchOutcome {
    let old = records
        .get_mut(key)
        .and_then(|record| record.parameters.replace(&ov.parameter, &ov.value));

    match old {
        Some(old) => {
            glog!(
                "{} - {}: {} changed to {}",
                key,
                ov.parameter,
                old,
                ov.value
            );
            PatchOutcome::Changed {
                task: key.to_string(),
                parameter: ov.parameter.clone(),
                old,
                new: ov.value.clone(),
            }
        }
        None => {
            glog_warn!("Task - Parameter not found: {} - {}", key, ov.parameter);
            PatchOutcome::NotFound {
                task: key.to_string(),
                parameter: ov.parameter.clone(),
            }
        }
    }
}
