use std::collections::HashMap;

use serde::Serialize;

use super::{Focus, Position, Technology};

/// A complete national focus tree: its metadata plus focuses keyed by ID.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FocusTree {
    pub id: String,
    pub country: Option<String>,
    pub is_default: bool,
    pub reset_on_civilwar: bool,
    pub continuous_focus_position: Option<Position>,
    pub focuses: HashMap<String, Focus>,
}

impl FocusTree {
    pub fn add_focus(&mut self, focus: Focus) {
        self.focuses.insert(focus.id.clone(), focus);
    }

    pub fn get_focus(&self, id: &str) -> Option<&Focus> {
        self.focuses.get(id)
    }

    pub fn into_focuses(self) -> Vec<Focus> {
        self.focuses.into_values().collect()
    }

    /// Check the tree's referential invariants. Findings come back as
    /// human-readable text; a non-empty result is advisory, not fatal.
    pub fn validate(&self) -> Vec<String> {
        let mut findings = Vec::new();
        self.check_references(&mut findings);
        self.check_cycles(&mut findings);
        self.check_position_conflicts(&mut findings);
        findings
    }

    fn check_references(&self, findings: &mut Vec<String>) {
        for focus in self.focuses.values() {
            for group in &focus.prerequisites {
                for id in group {
                    if !self.focuses.contains_key(id) {
                        findings.push(format!(
                            "focus {} references missing prerequisite {}",
                            focus.id, id
                        ));
                    }
                }
            }
            for id in &focus.mutually_exclusive {
                if !self.focuses.contains_key(id) {
                    findings.push(format!(
                        "focus {} references missing mutually exclusive focus {}",
                        focus.id, id
                    ));
                }
            }
        }
    }

    /// Depth-first search over prerequisite edges with a recursion stack,
    /// reporting each back edge found.
    fn check_cycles(&self, findings: &mut Vec<String>) {
        let mut visited = HashMap::new();
        let mut stack = Vec::new();
        for id in self.focuses.keys() {
            if !visited.contains_key(id.as_str()) {
                self.visit(id, &mut visited, &mut stack, findings);
            }
        }
    }

    fn visit<'a>(
        &'a self,
        id: &'a str,
        visited: &mut HashMap<&'a str, bool>,
        stack: &mut Vec<&'a str>,
        findings: &mut Vec<String>,
    ) {
        visited.insert(id, true);
        stack.push(id);
        if let Some(focus) = self.focuses.get(id) {
            for group in &focus.prerequisites {
                for prereq in group {
                    if stack.contains(&prereq.as_str()) {
                        findings.push(format!(
                            "circular prerequisite chain involving {} -> {}",
                            id, prereq
                        ));
                    } else if !visited.contains_key(prereq.as_str()) {
                        self.visit(prereq, visited, stack, findings);
                    }
                }
            }
        }
        stack.pop();
    }

    fn check_position_conflicts(&self, findings: &mut Vec<String>) {
        let mut by_position: HashMap<(i32, i32), Vec<&str>> = HashMap::new();
        for focus in self.focuses.values() {
            // relative positions shift the final coordinate, so only
            // absolutely positioned focuses can be compared
            if focus.relative_position_id.is_some() {
                continue;
            }
            by_position
                .entry((focus.position.x, focus.position.y))
                .or_default()
                .push(&focus.id);
        }
        for ((x, y), ids) in by_position {
            if ids.len() > 1 {
                let mut ids = ids;
                ids.sort_unstable();
                findings.push(format!(
                    "position conflict at ({}, {}): {}",
                    x,
                    y,
                    ids.join(", ")
                ));
            }
        }
    }
}

/// A merged technology set with its folder membership index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TechnologyTree {
    pub technologies: HashMap<String, Technology>,
    /// Folder name to technology IDs, in insertion order.
    pub folders: HashMap<String, Vec<String>>,
}

impl TechnologyTree {
    pub fn add_technology(&mut self, tech: Technology) {
        self.folders
            .entry(tech.folder.clone())
            .or_default()
            .push(tech.id.clone());
        self.technologies.insert(tech.id.clone(), tech);
    }

    pub fn get_technology(&self, id: &str) -> Option<&Technology> {
        self.technologies.get(id)
    }

    /// Check for dangling path targets and XOR references.
    pub fn validate(&self) -> Vec<String> {
        let mut findings = Vec::new();
        for tech in self.technologies.values() {
            for path in &tech.paths {
                if !self.technologies.contains_key(&path.leads_to_tech) {
                    findings.push(format!(
                        "technology {} has path to missing tech {}",
                        tech.id, path.leads_to_tech
                    ));
                }
            }
            for id in &tech.xor {
                if !self.technologies.contains_key(id) {
                    findings.push(format!(
                        "technology {} is exclusive with missing tech {}",
                        tech.id, id
                    ));
                }
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::structures::{extract_focus_tree, extract_technologies};
    use crate::types::Diagnostics;

    fn tree_from(text: &str) -> FocusTree {
        let (program, _) = parse(text);
        let mut diagnostics = Diagnostics::default();
        extract_focus_tree(&program, &mut diagnostics).unwrap()
    }

    #[test]
    fn test_valid_tree() {
        let tree = tree_from(
            "focus_tree = {\n\
             focus = { id = a x = 0 y = 0 }\n\
             focus = { id = b x = 2 y = 1 prerequisite = { focus = a } }\n\
             }",
        );
        assert!(tree.validate().is_empty());
    }

    #[test]
    fn test_missing_references_reported() {
        let tree = tree_from(
            "focus_tree = {\n\
             focus = { id = a x = 0 y = 0 prerequisite = { focus = ghost } mutually_exclusive = { focus = phantom } }\n\
             }",
        );
        let findings = tree.validate();
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().any(|f| f.contains("ghost")));
        assert!(findings.iter().any(|f| f.contains("phantom")));
    }

    #[test]
    fn test_cycle_detected() {
        let tree = tree_from(
            "focus_tree = {\n\
             focus = { id = a x = 0 y = 0 prerequisite = { focus = b } }\n\
             focus = { id = b x = 2 y = 0 prerequisite = { focus = a } }\n\
             }",
        );
        let findings = tree.validate();
        assert!(findings.iter().any(|f| f.contains("circular")));
    }

    #[test]
    fn test_position_conflict() {
        let tree = tree_from(
            "focus_tree = {\n\
             focus = { id = a x = 3 y = 1 }\n\
             focus = { id = b x = 3 y = 1 }\n\
             focus = { id = c x = 3 y = 1 relative_position_id = a }\n\
             }",
        );
        let findings = tree.validate();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("(3, 1)"));
        assert!(findings[0].ends_with("a, b"));
    }

    #[test]
    fn test_technology_tree_validation() {
        let (program, _) = parse(
            "technologies = {\n\
             tech_a = { folder = { name = f position = { x = 0 y = 0 } } path = { leads_to_tech = tech_b } }\n\
             tech_b = { folder = { name = f position = { x = 0 y = 2 } } xor = { tech_vanished } }\n\
             }",
        );
        let mut diagnostics = Diagnostics::default();
        let mut tree = TechnologyTree::default();
        for tech in extract_technologies(&program, &mut diagnostics).unwrap() {
            tree.add_technology(tech);
        }
        assert_eq!(tree.folders["f"], vec!["tech_a", "tech_b"]);
        let findings = tree.validate();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("tech_vanished"));
    }
}
