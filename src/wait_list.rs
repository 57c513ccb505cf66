//! Wait-list classification
//!
//! Classifies the argument names of a `WAIT_EVT<N>(...)` invocation into
//! the awaited event(s), carried events, and carried scalars per the
//! ordering convention: events first, then scalars, no repeats.

use std::collections::HashSet;

use crate::symbols::{SymbolTable, IN_CHAIN};

/// The three groups a wait-list splits into.
#[derive(Debug, Clone)]
pub struct WaitClassification {
    /// The single awaited event (current design only supports N = 1).
    pub awaited: String,
    /// Event-typed variables carried across the suspension but not awaited.
    pub carried_events: Vec<String>,
    /// Non-event variables carried across the suspension.
    pub carried_scalars: Vec<String>,
}

/// Failure reasons for `classify`; each maps to one structural parse
/// error in the error-handling design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    WrongEventCount(usize),
    UnknownVariable(String),
    NotAnEvent(String),
    EventAfterNonEvent(String),
    DuplicateName(String),
    DuplicateInChain,
}

impl std::fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifyError::WrongEventCount(n) => {
                write!(f, "currently only one event is supported in WAIT_EVT, got {n} events")
            }
            ClassifyError::UnknownVariable(name) => {
                write!(f, "'{name}' is not a context variable")
            }
            ClassifyError::NotAnEvent(name) => {
                write!(f, "'{name}' is not an event")
            }
            ClassifyError::EventAfterNonEvent(name) => {
                write!(f, "event '{name}' listed after non-events")
            }
            ClassifyError::DuplicateName(name) => {
                write!(f, "'{name}' is listed twice")
            }
            ClassifyError::DuplicateInChain => {
                write!(f, "'{IN_CHAIN}' is listed twice in the event list")
            }
        }
    }
}

/// Outcome of a successful classification: the grouping plus whether
/// `inChain` had to be silently appended (an advisory warning upstream).
#[derive(Debug)]
pub struct ClassifyOutcome {
    pub classification: WaitClassification,
    pub in_chain_implied: bool,
}

pub fn classify(
    num_evts: usize,
    names: &[String],
    symbols: &SymbolTable,
) -> Result<ClassifyOutcome, ClassifyError> {
    if num_evts != 1 {
        return Err(ClassifyError::WrongEventCount(num_evts));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut events: Vec<String> = Vec::new();
    let mut carried_events: Vec<String> = Vec::new();
    let mut carried_scalars: Vec<String> = Vec::new();
    let mut in_chain_seen_as_event = false;
    let mut remaining_evts = num_evts;
    let mut past_events = false;

    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ClassifyError::DuplicateName(name.clone()));
        }

        if remaining_evts > 0 {
            let var = symbols.get(name).ok_or_else(|| ClassifyError::UnknownVariable(name.clone()))?;
            if !var.is_event() {
                return Err(ClassifyError::NotAnEvent(name.clone()));
            }
            remaining_evts -= 1;
            if name == IN_CHAIN {
                if in_chain_seen_as_event {
                    return Err(ClassifyError::DuplicateInChain);
                }
                in_chain_seen_as_event = true;
            }
            events.push(name.clone());
        } else {
            let var = symbols.get(name).ok_or_else(|| ClassifyError::UnknownVariable(name.clone()))?;
            if var.is_event() {
                if past_events {
                    return Err(ClassifyError::EventAfterNonEvent(name.clone()));
                }
                carried_events.push(name.clone());
            } else {
                past_events = true;
                carried_scalars.push(name.clone());
            }
        }
    }

    let mut in_chain_implied = false;
    if !in_chain_seen_as_event && !carried_events.iter().any(|n| n == IN_CHAIN) {
        carried_events.push(IN_CHAIN.to_string());
        in_chain_implied = true;
    }

    Ok(ClassifyOutcome {
        classification: WaitClassification {
            awaited: events.into_iter().next().expect("num_evts == 1 guarantees one awaited event"),
            carried_events,
            carried_scalars,
        },
        in_chain_implied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::ContextVar;

    fn symbols_with(vars: &[(&str, &str)]) -> SymbolTable {
        let mut table = SymbolTable::new(1);
        for (name, ty) in vars {
            table.declare(ContextVar::new(*name, *ty, Some(format!("{ty} {name};")), 1));
        }
        table
    }

    #[test]
    fn rejects_n_other_than_one() {
        let table = symbols_with(&[]);
        let err = classify(2, &["inChain".into()], &table).unwrap_err();
        assert_eq!(err, ClassifyError::WrongEventCount(2));
    }

    #[test]
    fn single_event_with_in_chain_present() {
        let table = symbols_with(&[]);
        let outcome = classify(1, &[IN_CHAIN.to_string()], &table).unwrap();
        assert_eq!(outcome.classification.awaited, IN_CHAIN);
        assert!(outcome.classification.carried_events.is_empty());
        assert!(!outcome.in_chain_implied);
    }

    #[test]
    fn in_chain_implied_when_absent() {
        let table = symbols_with(&[("myEvt", "pdEvent_t*")]);
        let outcome = classify(1, &["myEvt".into()], &table).unwrap();
        assert_eq!(outcome.classification.awaited, "myEvt");
        assert_eq!(outcome.classification.carried_events, vec![IN_CHAIN.to_string()]);
        assert!(outcome.in_chain_implied);
    }

    #[test]
    fn scalars_after_events_are_carried() {
        let table = symbols_with(&[("a", "int*"), ("b", "int*")]);
        let outcome = classify(1, &[IN_CHAIN.to_string(), "a".into(), "b".into()], &table).unwrap();
        assert_eq!(outcome.classification.carried_scalars, vec!["a", "b"]);
    }

    #[test]
    fn event_after_scalar_is_an_error() {
        let table = symbols_with(&[("a", "int*"), ("evt2", "pdEvent_t*")]);
        let err = classify(1, &[IN_CHAIN.to_string(), "a".into(), "evt2".into()], &table).unwrap_err();
        assert_eq!(err, ClassifyError::EventAfterNonEvent("evt2".into()));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let table = symbols_with(&[("a", "int*")]);
        let err = classify(1, &[IN_CHAIN.to_string(), "a".into(), "a".into()], &table).unwrap_err();
        assert_eq!(err, ClassifyError::DuplicateName("a".into()));
    }

    #[test]
    fn unknown_name_is_rejected() {
        let table = symbols_with(&[]);
        let err = classify(1, &["mystery".into()], &table).unwrap_err();
        assert_eq!(err, ClassifyError::UnknownVariable("mystery".into()));
    }

    #[test]
    fn non_event_as_awaited_is_rejected() {
        let table = symbols_with(&[("a", "int*")]);
        let err = classify(1, &["a".into()], &table).unwrap_err();
        assert_eq!(err, ClassifyError::NotAnEvent("a".into()));
    }
}
