use phf::{phf_set, Set};
use serde::Serialize;

use crate::parser::{Block, Program, VariableTable};
use crate::types::Diagnostics;

use super::{flat_word_list, ExtractError, Position};

/// Keys inside a `technologies` block that are known not to be technology
/// definitions, so a block value under one of them is never mistaken for one.
static NON_TECH_BLOCKS: Set<&'static str> = phf_set! {
    "path",
    "folder",
    "categories",
    "allow",
    "available",
    "ai_will_do",
    "on_research_complete",
    "enable_equipments",
    "enable_subunits",
    "enable_tactic",
    "enable_building",
    "dependencies",
    "sub_technologies",
};

/// A researchable technology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Technology {
    pub id: String,
    pub position: Position,
    pub folder: String,
    pub categories: Vec<String>,
    pub research_cost: f64,
    pub paths: Vec<TechPath>,
    pub xor: Vec<String>,
    pub xp_research_type: Option<String>,
    pub xp_boost_cost: Option<i32>,
    pub xp_research_bonus: Option<f64>,
}

/// A connection to a follow-up technology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechPath {
    pub leads_to_tech: String,
    pub research_cost_coeff: f64,
}

impl Technology {
    fn new(id: String) -> Self {
        Technology {
            id,
            position: Position::default(),
            folder: String::new(),
            categories: Vec::new(),
            research_cost: 1.0,
            paths: Vec::new(),
            xor: Vec::new(),
            xp_research_type: None,
            xp_boost_cost: None,
            xp_research_bonus: None,
        }
    }

    pub fn is_exclusive_with(&self, other_id: &str) -> bool {
        self.xor.iter().any(|id| id == other_id)
    }
}

/// Extract every technology defined under the `technologies` block.
///
/// Script variables are collected from the file top level and from inside
/// the `technologies` block before any record is converted. Block-valued
/// entries with a known non-technology key are skipped; everything else
/// with a block value is one technology keyed by its assignment name.
pub fn extract_technologies(
    program: &Program,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Technology>, ExtractError> {
    if program.is_empty() {
        return Err(ExtractError::EmptyProgram);
    }
    let assignment = program
        .root
        .get("technologies")
        .ok_or(ExtractError::MissingBlock("technologies"))?;
    let block = assignment
        .value
        .as_block()
        .ok_or(ExtractError::NotABlock("technologies"))?;
    let variables = VariableTable::collect(program, Some(block));

    let mut technologies = Vec::new();
    for entry in &block.assignments {
        if entry.key.starts_with('@') || NON_TECH_BLOCKS.contains(entry.key.as_str()) {
            continue;
        }
        let Some(tech_block) = entry.value.as_block() else {
            continue;
        };
        technologies.push(parse_technology(
            entry.key.clone(),
            tech_block,
            &variables,
            diagnostics,
        ));
    }
    Ok(technologies)
}

fn parse_technology(
    id: String,
    block: &Block,
    variables: &VariableTable,
    diagnostics: &mut Diagnostics,
) -> Technology {
    let mut tech = Technology::new(id);
    for assignment in &block.assignments {
        match assignment.key.as_str() {
            "research_cost" => {
                if let Some(cost) = assignment.value.scalar().and_then(|s| s.parse().ok()) {
                    tech.research_cost = cost;
                }
            }
            "folder" => {
                if let Some(folder_block) = assignment.value.as_block() {
                    parse_folder(&mut tech, folder_block, variables, diagnostics);
                }
            }
            "categories" => {
                if let Some(categories) = assignment.value.as_block() {
                    tech.categories = flat_word_list(categories);
                }
            }
            "path" => {
                if let Some(path_block) = assignment.value.as_block() {
                    if let Some(path) = parse_path(path_block) {
                        tech.paths.push(path);
                    } else {
                        diagnostics.warn(format!(
                            "technology {}: path block without leads_to_tech",
                            tech.id
                        ));
                    }
                }
            }
            "xor" => {
                if let Some(xor_block) = assignment.value.as_block() {
                    tech.xor = flat_word_list(xor_block);
                }
            }
            "xp_research_type" => {
                tech.xp_research_type = assignment.value.scalar().map(str::to_owned);
            }
            "xp_boost_cost" => {
                tech.xp_boost_cost = assignment.value.scalar().and_then(|s| s.parse().ok());
            }
            "xp_research_bonus" => {
                tech.xp_research_bonus = assignment.value.scalar().and_then(|s| s.parse().ok());
            }
            _ => {}
        }
    }
    tech
}

fn parse_folder(
    tech: &mut Technology,
    block: &Block,
    variables: &VariableTable,
    diagnostics: &mut Diagnostics,
) {
    for assignment in &block.assignments {
        match assignment.key.as_str() {
            "name" => {
                if let Some(name) = assignment.value.scalar() {
                    tech.folder = name.to_owned();
                }
            }
            "position" => {
                if let Some(position) = assignment.value.as_block() {
                    tech.position = Position::from_block(position, variables, diagnostics);
                }
            }
            _ => {}
        }
    }
}

fn parse_path(block: &Block) -> Option<TechPath> {
    let leads_to_tech = block.scalar("leads_to_tech")?.to_owned();
    let research_cost_coeff = block
        .scalar("research_cost_coeff")
        .and_then(|s| s.parse().ok())
        .unwrap_or(1.0);
    Some(TechPath {
        leads_to_tech,
        research_cost_coeff,
    })
}
