use serde::Serialize;

use crate::parser::{Block, Program};
use crate::types::Diagnostics;

use super::{Condition, ExtractError};

const OVERLAY_SUFFIX: &str = "_overlay_folder";

/// A technology folder with its display metadata and availability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechFolder {
    pub name: String,
    /// Ledger page: army, navy, air or civilian.
    pub ledger: Option<String>,
    /// ANDed availability conditions; `None` means unconditionally shown.
    pub available: Option<Vec<Condition>>,
    pub is_overlay: bool,
}

impl TechFolder {
    fn new(name: String) -> Self {
        let is_overlay = name.ends_with(OVERLAY_SUFFIX);
        TechFolder {
            name,
            ledger: None,
            available: None,
            is_overlay,
        }
    }

    /// The folder this overlay stands in for. `None` for regular folders.
    pub fn base_name(&self) -> Option<&str> {
        self.is_overlay
            .then(|| &self.name[..self.name.len() - OVERLAY_SUFFIX.len()])
    }
}

/// Extract just the folder names from a `technology_folders` block.
pub fn extract_folder_names(program: &Program) -> Result<Vec<String>, ExtractError> {
    let block = folders_block(program)?;
    Ok(block.assignments.iter().map(|a| a.key.clone()).collect())
}

/// Extract folders with ledger, overlay flag and availability conditions.
pub fn extract_folders(
    program: &Program,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<TechFolder>, ExtractError> {
    let block = folders_block(program)?;
    let mut folders = Vec::new();
    for entry in &block.assignments {
        let mut folder = TechFolder::new(entry.key.clone());
        match entry.value.as_block() {
            Some(folder_block) => parse_folder_block(&mut folder, folder_block),
            // bare `folder_name = yes` style entries carry no metadata
            None => diagnostics.warn(format!(
                "technology folder {} has no definition block",
                folder.name
            )),
        }
        folders.push(folder);
    }
    Ok(folders)
}

fn folders_block(program: &Program) -> Result<&Block, ExtractError> {
    if program.is_empty() {
        return Err(ExtractError::EmptyProgram);
    }
    let assignment = program
        .root
        .get("technology_folders")
        .ok_or(ExtractError::MissingBlock("technology_folders"))?;
    assignment
        .value
        .as_block()
        .ok_or(ExtractError::NotABlock("technology_folders"))
}

fn parse_folder_block(folder: &mut TechFolder, block: &Block) {
    for assignment in &block.assignments {
        match assignment.key.as_str() {
            "ledger" => {
                folder.ledger = assignment.value.scalar().map(str::to_owned);
            }
            "available" => {
                if let Some(available) = assignment.value.as_block() {
                    folder.available = Some(
                        available
                            .assignments
                            .iter()
                            .map(Condition::from_assignment)
                            .collect(),
                    );
                }
            }
            _ => {}
        }
    }
}
