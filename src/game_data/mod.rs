//! Loading and merging of game and mod data directories.

mod localizer;
pub use localizer::Localizer;

mod loader;
pub use loader::{GameDataError, GameDataLoader};

mod subtree;
pub use subtree::{detect_sub_trees, SubTree, SUBTREE_GAP};

use serde::Serialize;

use super::structures::{Bookmark, TechFolder, TechnologyTree};
use super::types::Diagnostics;

/// Everything the rendering layer consumes, fully merged.
#[derive(Serialize)]
pub struct GameData {
    technologies: TechnologyTree,
    folders: Vec<TechFolder>,
    bookmarks: Vec<Bookmark>,
    localizer: Localizer,
    #[serde(skip)]
    diagnostics: Diagnostics,
}

impl GameData {
    pub(crate) fn new(
        technologies: TechnologyTree,
        folders: Vec<TechFolder>,
        bookmarks: Vec<Bookmark>,
        localizer: Localizer,
        diagnostics: Diagnostics,
    ) -> Self {
        GameData {
            technologies,
            folders,
            bookmarks,
            localizer,
            diagnostics,
        }
    }

    pub fn technologies(&self) -> &TechnologyTree {
        &self.technologies
    }

    pub fn folders(&self) -> &[TechFolder] {
        &self.folders
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The display name for a folder: its `<id>_name` localisation entry,
    /// or a readable fallback built from the identifier.
    pub fn localized_folder_name(&self, folder_id: &str) -> String {
        let key = format!("{}_name", folder_id);
        if let Some(name) = self.localizer.lookup(&key) {
            return name.to_owned();
        }
        prettify_identifier(folder_id)
    }
}

/// Turn `secret_weapons_folder` into `Secret Weapons`.
fn prettify_identifier(id: &str) -> String {
    let stripped = id.strip_suffix("_folder").unwrap_or(id);
    let mut out = String::with_capacity(stripped.len());
    for (i, word) in stripped.split('_').enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
