use serde::Serialize;

use crate::parser::{Assignment, Expression};

/// One node of a folder availability condition. A trigger the extractor
/// does not model becomes [Condition::Unknown] rather than being dropped,
/// so callers can see exactly what was tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Condition {
    HasCountryFlag { name: String, negated: bool },
    HasDlc { name: String, negated: bool },
    MajorCountry { negated: bool },
    /// True iff every child evaluates false.
    Not(Vec<Condition>),
    /// An unmodeled trigger, kept by key name. Evaluates true.
    Unknown(String),
}

impl Condition {
    /// Build a condition node from one assignment inside an `available`
    /// or `NOT` block.
    pub fn from_assignment(assignment: &Assignment) -> Condition {
        match assignment.key.as_str() {
            "has_country_flag" => Condition::HasCountryFlag {
                name: scalar_value(&assignment.value),
                negated: false,
            },
            "has_dlc" => Condition::HasDlc {
                name: scalar_value(&assignment.value),
                negated: false,
            },
            "major_country" => Condition::MajorCountry { negated: false },
            "NOT" => match assignment.value.as_block() {
                Some(block) => Condition::Not(
                    block
                        .assignments
                        .iter()
                        .map(Condition::from_assignment)
                        .collect(),
                ),
                None => Condition::Not(Vec::new()),
            },
            other => Condition::Unknown(other.to_owned()),
        }
    }
}

fn scalar_value(value: &Expression) -> String {
    value.scalar().unwrap_or_default().to_owned()
}

/// Evaluates folder availability conditions against one country's state.
#[derive(Debug, Default)]
pub struct ConditionEvaluator {
    country_flags: Vec<String>,
    dlcs: Vec<String>,
    is_major: bool,
}

impl ConditionEvaluator {
    pub fn new(country_flags: Vec<String>) -> Self {
        ConditionEvaluator {
            country_flags,
            dlcs: Vec::new(),
            is_major: false,
        }
    }

    pub fn with_dlcs(mut self, dlcs: Vec<String>) -> Self {
        self.dlcs = dlcs;
        self
    }

    pub fn with_major(mut self, is_major: bool) -> Self {
        self.is_major = is_major;
        self
    }

    /// Evaluate a whole `available` block. No conditions at all means no
    /// constraint; multiple conditions are ANDed.
    pub fn evaluate_all(&self, conditions: Option<&[Condition]>) -> bool {
        match conditions {
            None => true,
            Some(conditions) => conditions.iter().all(|c| self.evaluate(c)),
        }
    }

    pub fn evaluate(&self, condition: &Condition) -> bool {
        match condition {
            Condition::HasCountryFlag { name, negated } => {
                self.has_flag(name) != *negated
            }
            Condition::HasDlc { name, negated } => self.has_dlc(name) != *negated,
            Condition::MajorCountry { negated } => self.is_major != *negated,
            // NOT holds only when none of its children hold
            Condition::Not(children) => children.iter().all(|c| !self.evaluate(c)),
            // fail open on triggers this evaluator does not model
            Condition::Unknown(_) => true,
        }
    }

    fn has_flag(&self, name: &str) -> bool {
        self.country_flags.iter().any(|flag| flag == name)
    }

    fn has_dlc(&self, name: &str) -> bool {
        self.dlcs.iter().any(|dlc| dlc == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn conditions(text: &str) -> Vec<Condition> {
        let (program, errors) = parse(text);
        assert!(errors.is_empty(), "{:?}", errors);
        program
            .root
            .block("available")
            .unwrap()
            .assignments
            .iter()
            .map(Condition::from_assignment)
            .collect()
    }

    fn evaluator(flags: &[&str]) -> ConditionEvaluator {
        ConditionEvaluator::new(flags.iter().map(|f| f.to_string()).collect())
    }

    #[test]
    fn test_absent_condition_is_true() {
        assert!(evaluator(&[]).evaluate_all(None));
        assert!(evaluator(&[]).evaluate_all(Some(&[])));
    }

    #[test]
    fn test_has_country_flag() {
        let parsed = conditions("available = { has_country_flag = UNLOCK:radar }");
        assert!(evaluator(&["UNLOCK:radar"]).evaluate_all(Some(&parsed)));
        assert!(!evaluator(&["other"]).evaluate_all(Some(&parsed)));
    }

    #[test]
    fn test_not_single_child() {
        let parsed = conditions("available = { NOT = { has_country_flag = banned } }");
        assert!(evaluator(&[]).evaluate_all(Some(&parsed)));
        assert!(!evaluator(&["banned"]).evaluate_all(Some(&parsed)));
    }

    #[test]
    fn test_not_requires_all_children_false() {
        let parsed = conditions(
            "available = { NOT = { has_country_flag = f1 has_country_flag = f2 } }",
        );
        assert!(evaluator(&[]).evaluate_all(Some(&parsed)));
        assert!(!evaluator(&["f1"]).evaluate_all(Some(&parsed)));
        assert!(!evaluator(&["f2"]).evaluate_all(Some(&parsed)));
        assert!(!evaluator(&["f1", "f2"]).evaluate_all(Some(&parsed)));
    }

    #[test]
    fn test_top_level_and() {
        let parsed = conditions(
            "available = { has_country_flag = f1 has_country_flag = f2 }",
        );
        assert!(evaluator(&["f1", "f2"]).evaluate_all(Some(&parsed)));
        assert!(!evaluator(&["f1"]).evaluate_all(Some(&parsed)));
    }

    #[test]
    fn test_has_dlc() {
        let parsed = conditions("available = { has_dlc = \"La Resistance\" }");
        assert!(!evaluator(&[]).evaluate_all(Some(&parsed)));
        let with_dlc = evaluator(&[]).with_dlcs(vec!["La Resistance".to_owned()]);
        assert!(with_dlc.evaluate_all(Some(&parsed)));
    }

    #[test]
    fn test_major_country() {
        let parsed = conditions("available = { major_country = yes }");
        assert!(!evaluator(&[]).evaluate_all(Some(&parsed)));
        assert!(evaluator(&[]).with_major(true).evaluate_all(Some(&parsed)));
    }

    #[test]
    fn test_unknown_condition_fails_open() {
        let parsed = conditions("available = { has_government = fascism }");
        assert_eq!(parsed[0], Condition::Unknown("has_government".to_owned()));
        assert!(evaluator(&[]).evaluate_all(Some(&parsed)));
    }

    #[test]
    fn test_unknown_inside_not() {
        // an unknown child evaluates true, which makes the NOT fail
        let parsed = conditions("available = { NOT = { has_government = fascism } }");
        assert!(!evaluator(&[]).evaluate_all(Some(&parsed)));
    }
}
