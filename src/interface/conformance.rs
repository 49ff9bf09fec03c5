//! Conformance evaluation.

use serde::Serialize;
use tracing::trace;

use super::Interface;
use crate::host::{isinstance, ClassRef, Value};

/// Whether `candidate` conforms to `interface`.
///
/// Candidates covered by an assumption conform without any requirement
/// being evaluated. Otherwise requirements run in declaration order and
/// evaluation stops at the first failure.
pub fn conforms(interface: &Interface, candidate: &Value) -> bool {
    if let Some(assumed) = assumed_by(interface, candidate) {
        trace!(interface = interface.name(), assumed = assumed.name(), "assumed conformance");
        return true;
    }

    for (name, requirement) in interface.requirements().iter() {
        if !requirement.evaluate(candidate) {
            trace!(
                interface = interface.name(),
                requirement = name,
                check = %requirement.describe(),
                "requirement not satisfied"
            );
            return false;
        }
    }
    true
}

/// The assumed class covering `candidate`, if any.
///
/// Classes are covered by subclassing, everything else by instance-of.
pub(crate) fn assumed_by<'a>(interface: &'a Interface, candidate: &Value) -> Option<&'a ClassRef> {
    interface.assumptions().iter().find(|assumed| match candidate {
        Value::Class(cls) => cls.is_subclass_of(assumed),
        other => isinstance(other, assumed),
    })
}

/// Outcome of a single requirement in a [`ConformanceReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementOutcome {
    pub requirement: String,
    pub satisfied: bool,
}

/// Every requirement's outcome for one candidate.
///
/// Unlike [`conforms`], a report evaluates all requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConformanceReport {
    pub interface: String,
    /// Set when an assumption granted conformance; `outcomes` is then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assumed: Option<String>,
    pub outcomes: Vec<RequirementOutcome>,
}

impl ConformanceReport {
    pub(crate) fn build(interface: &Interface, candidate: &Value) -> Self {
        if let Some(assumed) = assumed_by(interface, candidate) {
            return Self {
                interface: interface.name().to_string(),
                assumed: Some(assumed.name().to_string()),
                outcomes: Vec::new(),
            };
        }

        let outcomes = interface
            .requirements()
            .iter()
            .map(|(name, requirement)| RequirementOutcome {
                requirement: name.to_string(),
                satisfied: requirement.evaluate(candidate),
            })
            .collect();

        Self {
            interface: interface.name().to_string(),
            assumed: None,
            outcomes,
        }
    }

    /// Whether the candidate conforms.
    pub fn conforms(&self) -> bool {
        self.assumed.is_some() || self.outcomes.iter().all(|o| o.satisfied)
    }

    /// Names of unsatisfied requirements.
    pub fn failures(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.satisfied)
            .map(|o| o.requirement.as_str())
            .collect()
    }
}
