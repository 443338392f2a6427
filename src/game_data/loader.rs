use std::collections::HashMap;
use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::parser::{parse, Program};
use crate::structures::{
    extract_bookmarks, extract_country_flags, extract_focus_tree, extract_folders,
    extract_technologies, Bookmark, ConditionEvaluator, ExtractError, FocusTree, TechFolder,
    Technology, TechnologyTree,
};
use crate::types::Diagnostics;

use super::subtree::{detect_sub_trees, SubTree};
use super::{GameData, Localizer};

/// The error type for layered loading. Per-file problems never surface
/// here; they become diagnostics and the file is skipped. Only missing
/// required files and empty merged result sets are hard errors.
#[derive(Debug)]
pub enum GameDataError {
    Io(io::Error),
    Extract(ExtractError),
    NoTechnologies,
    NoFolders,
    NoBookmarks,
    MissingHistoryFile(String),
    MissingFocusFile(String),
}

impl From<io::Error> for GameDataError {
    fn from(err: io::Error) -> Self {
        GameDataError::Io(err)
    }
}

impl From<ExtractError> for GameDataError {
    fn from(err: ExtractError) -> Self {
        GameDataError::Extract(err)
    }
}

impl fmt::Display for GameDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameDataError::Io(err) => write!(f, "io error: {}", err),
            GameDataError::Extract(err) => write!(f, "extraction failed: {}", err),
            GameDataError::NoTechnologies => {
                write!(f, "no technologies found in mod or game files")
            }
            GameDataError::NoFolders => {
                write!(f, "no technology folders found in mod or game files")
            }
            GameDataError::NoBookmarks => write!(f, "no bookmarks found in mod or game files"),
            GameDataError::MissingHistoryFile(tag) => {
                write!(f, "no country history file found for tag {}", tag)
            }
            GameDataError::MissingFocusFile(tag) => {
                write!(f, "no national focus file found for tag {}", tag)
            }
        }
    }
}

impl error::Error for GameDataError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            GameDataError::Io(err) => Some(err),
            GameDataError::Extract(err) => Some(err),
            _ => None,
        }
    }
}

/// Loads domain records from a mod directory layered over a game
/// directory.
///
/// The merge rule is uniform: the mod is read first and the game only
/// fills identity keys the mod did not define. Bookmarks are the one
/// exception, replaced wholesale, because bookmark files redefine the
/// whole scenario list rather than individual entries.
pub struct GameDataLoader {
    mod_path: Option<PathBuf>,
    game_path: Option<PathBuf>,
    language: String,
    diagnostics: Diagnostics,
}

impl GameDataLoader {
    pub fn new<S: Into<String>>(
        mod_path: Option<PathBuf>,
        game_path: Option<PathBuf>,
        language: S,
    ) -> Self {
        GameDataLoader {
            mod_path,
            game_path,
            language: language.into(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    /// Mod layer first, then game layer.
    fn layers(&self) -> impl Iterator<Item = &Path> {
        self.mod_path
            .as_deref()
            .into_iter()
            .chain(self.game_path.as_deref())
    }

    /// Read and parse one script file. Unreadable files and files with
    /// structural errors degrade to a diagnostic; the partial program from
    /// an erroneous parse is still used.
    fn parse_file(&mut self, path: &Path) -> Option<Program> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                self.diagnostics
                    .warn(format!("skipping unreadable {}: {}", path.display(), err));
                return None;
            }
        };
        let (program, errors) = parse(&contents);
        for error in &errors {
            self.diagnostics
                .warn(format!("{}: {}", path.display(), error));
        }
        Some(program)
    }

    /// Load and merge all technologies, mod first, game filling gaps by ID.
    pub fn load_technologies(&mut self) -> Result<Vec<Technology>, GameDataError> {
        let mut merged: HashMap<String, Technology> = HashMap::new();
        let layer_dirs: Vec<PathBuf> = self
            .layers()
            .map(|layer| layer.join("common").join("technologies"))
            .collect();
        for dir in layer_dirs {
            for file in script_files(&dir) {
                let Some(program) = self.parse_file(&file) else {
                    continue;
                };
                match extract_technologies(&program, &mut self.diagnostics) {
                    Ok(technologies) => {
                        for tech in technologies {
                            merged.entry(tech.id.clone()).or_insert(tech);
                        }
                    }
                    Err(err) => self
                        .diagnostics
                        .warn(format!("skipping {}: {}", file.display(), err)),
                }
            }
        }
        if merged.is_empty() {
            return Err(GameDataError::NoTechnologies);
        }
        let mut technologies: Vec<Technology> = merged.into_values().collect();
        technologies.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(technologies)
    }

    pub fn load_technologies_for_folder(
        &mut self,
        folder_name: &str,
    ) -> Result<Vec<Technology>, GameDataError> {
        let mut technologies = self.load_technologies()?;
        technologies.retain(|tech| tech.folder == folder_name);
        Ok(technologies)
    }

    /// Partition one folder's merged technologies into sub-trees.
    pub fn sub_trees_for_folder(
        &mut self,
        folder_name: &str,
    ) -> Result<Vec<SubTree>, GameDataError> {
        let technologies = self.load_technologies_for_folder(folder_name)?;
        Ok(detect_sub_trees(folder_name, &technologies))
    }

    /// Load and merge technology folders by name, mod first.
    pub fn load_folders(&mut self) -> Result<Vec<TechFolder>, GameDataError> {
        let mut merged: HashMap<String, TechFolder> = HashMap::new();
        let layer_dirs: Vec<PathBuf> = self
            .layers()
            .map(|layer| layer.join("common").join("technology_tags"))
            .collect();
        for dir in layer_dirs {
            for file in script_files(&dir) {
                let Some(program) = self.parse_file(&file) else {
                    continue;
                };
                match extract_folders(&program, &mut self.diagnostics) {
                    Ok(folders) => {
                        for folder in folders {
                            merged.entry(folder.name.clone()).or_insert(folder);
                        }
                    }
                    Err(err) => self
                        .diagnostics
                        .warn(format!("skipping {}: {}", file.display(), err)),
                }
            }
        }
        if merged.is_empty() {
            return Err(GameDataError::NoFolders);
        }
        let mut folders: Vec<TechFolder> = merged.into_values().collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(folders)
    }

    /// The folder names a given country should see: regular folders that
    /// pass their own availability, minus any base folder whose overlay is
    /// active. An overlay is active while its condition evaluates false,
    /// meaning the base is still locked and the overlay stands in for it.
    pub fn visible_folders(
        &mut self,
        evaluator: &ConditionEvaluator,
    ) -> Result<Vec<String>, GameDataError> {
        let folders = self.load_folders()?;
        let mut hidden_bases = Vec::new();
        for folder in folders.iter().filter(|f| f.is_overlay) {
            if let (Some(base), Some(available)) = (folder.base_name(), folder.available.as_deref())
            {
                if !evaluator.evaluate_all(Some(available)) {
                    hidden_bases.push(base.to_owned());
                }
            }
        }
        Ok(folders
            .iter()
            .filter(|f| !f.is_overlay)
            .filter(|f| evaluator.evaluate_all(f.available.as_deref()))
            .filter(|f| !hidden_bases.contains(&f.name))
            .map(|f| f.name.clone())
            .collect())
    }

    /// Load bookmarks: the mod's set if it has any, otherwise the game's.
    pub fn load_bookmarks(&mut self) -> Result<Vec<Bookmark>, GameDataError> {
        let layer_dirs: Vec<PathBuf> = self
            .layers()
            .map(|layer| layer.join("common").join("bookmarks"))
            .collect();
        for dir in layer_dirs {
            let mut bookmarks = Vec::new();
            for file in script_files(&dir) {
                let Some(program) = self.parse_file(&file) else {
                    continue;
                };
                match extract_bookmarks(&program, &mut self.diagnostics) {
                    Ok(found) => bookmarks.extend(found),
                    Err(err) => self
                        .diagnostics
                        .warn(format!("skipping {}: {}", file.display(), err)),
                }
            }
            if !bookmarks.is_empty() {
                return Ok(bookmarks);
            }
        }
        Err(GameDataError::NoBookmarks)
    }

    /// Load a country's flags from its history file, mod layer first with
    /// the game as fallback. Duplicates are preserved in encounter order.
    pub fn load_country_flags(&mut self, tag: &str) -> Result<Vec<String>, GameDataError> {
        let files: Vec<Option<PathBuf>> = self
            .layers()
            .map(|layer| find_history_file(layer, tag))
            .collect();
        let mut found_any = false;
        for file in files.into_iter().flatten() {
            found_any = true;
            let Some(program) = self.parse_file(&file) else {
                continue;
            };
            let flags = extract_country_flags(&program);
            if !flags.is_empty() {
                return Ok(flags);
            }
        }
        if found_any {
            // a history file can legitimately set no flags
            return Ok(Vec::new());
        }
        Err(GameDataError::MissingHistoryFile(tag.to_owned()))
    }

    /// The union of a country's flags across both layers, de-duplicated
    /// preserving game-then-mod encounter order.
    pub fn load_all_country_flags(&mut self, tag: &str) -> Result<Vec<String>, GameDataError> {
        let mut files = Vec::new();
        if let Some(game) = self.game_path.as_deref() {
            files.push(find_history_file(game, tag));
        }
        if let Some(mod_path) = self.mod_path.as_deref() {
            files.push(find_history_file(mod_path, tag));
        }
        let mut union = Vec::new();
        let mut found_any = false;
        for file in files.into_iter().flatten() {
            found_any = true;
            let Some(program) = self.parse_file(&file) else {
                continue;
            };
            for flag in extract_country_flags(&program) {
                if !union.contains(&flag) {
                    union.push(flag);
                }
            }
        }
        if found_any {
            Ok(union)
        } else {
            Err(GameDataError::MissingHistoryFile(tag.to_owned()))
        }
    }

    /// Find the national focus file for a tag. Not every country has one,
    /// so absence is an explicit error the caller can treat as expected.
    pub fn resolve_focus_file(&self, tag: &str) -> Result<PathBuf, GameDataError> {
        for layer in self.layers() {
            let candidate = layer
                .join("common")
                .join("national_focus")
                .join(format!("{}_focus.txt", tag));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        Err(GameDataError::MissingFocusFile(tag.to_owned()))
    }

    /// Load and extract a country's focus tree.
    pub fn load_focus_tree(&mut self, tag: &str) -> Result<FocusTree, GameDataError> {
        let path = self.resolve_focus_file(tag)?;
        let contents = fs::read_to_string(&path)?;
        let (program, errors) = parse(&contents);
        for error in &errors {
            self.diagnostics
                .warn(format!("{}: {}", path.display(), error));
        }
        Ok(extract_focus_tree(&program, &mut self.diagnostics)?)
    }

    /// Build the localisation table: game files first, mod files ingested
    /// on top so their keys shadow the game's.
    pub fn load_localizer(&mut self) -> Localizer {
        let mut localizer = Localizer::new(self.language.clone());
        let mut layer_roots = Vec::new();
        if let Some(game) = self.game_path.clone() {
            layer_roots.push(game);
        }
        if let Some(mod_path) = self.mod_path.clone() {
            layer_roots.push(mod_path);
        }
        let suffix = format!("_l_{}.yml", self.language);
        for root in layer_roots {
            let by_language = root.join("localisation").join(&self.language);
            let dir = if by_language.is_dir() {
                by_language
            } else {
                // some mods keep a flat localisation directory
                root.join("localisation")
            };
            for file in localization_files(&dir, &suffix) {
                match fs::read_to_string(&file) {
                    Ok(contents) => localizer.ingest(&contents),
                    Err(err) => self
                        .diagnostics
                        .warn(format!("skipping unreadable {}: {}", file.display(), err)),
                }
            }
        }
        localizer
    }

    /// Load everything a rendering layer needs in one pass.
    pub fn finalize(mut self) -> Result<GameData, GameDataError> {
        let mut tree = TechnologyTree::default();
        for tech in self.load_technologies()? {
            tree.add_technology(tech);
        }
        let folders = self.load_folders()?;
        let bookmarks = self.load_bookmarks()?;
        let localizer = self.load_localizer();
        Ok(GameData::new(
            tree,
            folders,
            bookmarks,
            localizer,
            self.diagnostics,
        ))
    }
}

/// All `.txt` files directly inside a directory, sorted by name. A missing
/// directory is an empty list, not an error; a layer simply may not define
/// this kind of data.
fn script_files(dir: &Path) -> Vec<PathBuf> {
    files_with_suffix(dir, ".txt")
}

fn localization_files(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    files_with_suffix(dir, suffix)
}

fn files_with_suffix(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(suffix))
        })
        .collect();
    files.sort();
    files
}

/// Locate `history/countries/<TAG>.txt`, falling back to the first
/// `<TAG> - *.txt` match, the naming the game ships with.
fn find_history_file(base: &Path, tag: &str) -> Option<PathBuf> {
    let dir = base.join("history").join("countries");
    let exact = dir.join(format!("{}.txt", tag));
    if exact.is_file() {
        return Some(exact);
    }
    let prefix = format!("{} - ", tag);
    script_files(&dir).into_iter().find(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(&prefix))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    fn write_file(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn tech_file(entries: &str) -> String {
        format!("technologies = {{\n{}\n}}\n", entries)
    }

    fn tech_entry(id: &str, folder: &str, x: i32, cost: f64) -> String {
        format!(
            "{} = {{ research_cost = {} folder = {{ name = {} position = {{ x = {} y = 0 }} }} }}",
            id, cost, folder, x
        )
    }

    fn loader_for(mod_dir: &TempDir, game_dir: &TempDir) -> GameDataLoader {
        GameDataLoader::new(
            Some(mod_dir.path().to_owned()),
            Some(game_dir.path().to_owned()),
            "english",
        )
    }

    #[test]
    fn test_mod_wins_game_fills_gaps() {
        let mod_dir = tempdir().unwrap();
        let game_dir = tempdir().unwrap();
        write_file(
            mod_dir.path(),
            "common/technologies/mod.txt",
            &tech_file(&format!(
                "{}\n{}",
                tech_entry("tech_a", "f", 0, 1.0),
                tech_entry("tech_b", "f", 2, 9.0)
            )),
        );
        write_file(
            game_dir.path(),
            "common/technologies/base.txt",
            &tech_file(&format!(
                "{}\n{}",
                tech_entry("tech_b", "f", 2, 1.0),
                tech_entry("tech_c", "f", 4, 1.0)
            )),
        );
        let mut loader = loader_for(&mod_dir, &game_dir);
        let technologies = loader.load_technologies().unwrap();
        let ids: Vec<&str> = technologies.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["tech_a", "tech_b", "tech_c"]);
        // the mod's tech_b must shadow the game's
        let b = technologies.iter().find(|t| t.id == "tech_b").unwrap();
        assert_eq!(b.research_cost, 9.0);
    }

    #[test]
    fn test_no_technologies_is_hard_error() {
        let mod_dir = tempdir().unwrap();
        let game_dir = tempdir().unwrap();
        let mut loader = loader_for(&mod_dir, &game_dir);
        assert!(matches!(
            loader.load_technologies(),
            Err(GameDataError::NoTechnologies)
        ));
    }

    #[test]
    fn test_broken_file_skipped_with_diagnostic() {
        let mod_dir = tempdir().unwrap();
        let game_dir = tempdir().unwrap();
        write_file(
            mod_dir.path(),
            "common/technologies/bad.txt",
            "technologies = yes",
        );
        write_file(
            game_dir.path(),
            "common/technologies/good.txt",
            &tech_file(&tech_entry("tech_a", "f", 0, 1.0)),
        );
        let mut loader = loader_for(&mod_dir, &game_dir);
        let technologies = loader.load_technologies().unwrap();
        assert_eq!(technologies.len(), 1);
        assert!(!loader.diagnostics().is_empty());
    }

    #[test]
    fn test_folder_filter_and_sub_trees() {
        let mod_dir = tempdir().unwrap();
        let game_dir = tempdir().unwrap();
        write_file(
            game_dir.path(),
            "common/technologies/base.txt",
            &tech_file(&format!(
                "{}\n{}\n{}",
                tech_entry("tech_a", "radar_folder", 0, 1.0),
                tech_entry("tech_b", "radar_folder", 10, 1.0),
                tech_entry("tech_c", "other_folder", 1, 1.0)
            )),
        );
        let mut loader = loader_for(&mod_dir, &game_dir);
        let radar = loader.load_technologies_for_folder("radar_folder").unwrap();
        assert_eq!(radar.len(), 2);
        let sub_trees = loader.sub_trees_for_folder("radar_folder").unwrap();
        assert_eq!(sub_trees.len(), 2);
    }

    #[test]
    fn test_folders_merge_and_visibility() {
        let mod_dir = tempdir().unwrap();
        let game_dir = tempdir().unwrap();
        write_file(
            game_dir.path(),
            "common/technology_tags/tags.txt",
            "technology_folders = {\n\
             infantry_folder = { ledger = army }\n\
             secret_weapons = { ledger = civilian available = { has_country_flag = unlocked } }\n\
             secret_weapons_overlay_folder = { ledger = civilian available = { has_country_flag = unlocked } }\n\
             }",
        );
        let mut loader = loader_for(&mod_dir, &game_dir);

        // flag absent: overlay active, base hidden
        let locked = ConditionEvaluator::new(Vec::new());
        let visible = loader.visible_folders(&locked).unwrap();
        assert_eq!(visible, vec!["infantry_folder"]);

        // flag set: base shown, overlay is never listed itself
        let unlocked = ConditionEvaluator::new(vec!["unlocked".to_owned()]);
        let visible = loader.visible_folders(&unlocked).unwrap();
        assert_eq!(visible, vec!["infantry_folder", "secret_weapons"]);
    }

    #[test]
    fn test_bookmarks_replaced_wholesale() {
        let mod_dir = tempdir().unwrap();
        let game_dir = tempdir().unwrap();
        write_file(
            game_dir.path(),
            "common/bookmarks/game.txt",
            "bookmarks = { bookmark = { name = \"GAME_1936\" } bookmark = { name = \"GAME_1939\" } }",
        );
        write_file(
            mod_dir.path(),
            "common/bookmarks/mod.txt",
            "bookmarks = { bookmark = { name = \"MOD_START\" } }",
        );
        let mut loader = loader_for(&mod_dir, &game_dir);
        let bookmarks = loader.load_bookmarks().unwrap();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].name, "MOD_START");
    }

    #[test]
    fn test_bookmarks_fall_back_to_game() {
        let mod_dir = tempdir().unwrap();
        let game_dir = tempdir().unwrap();
        write_file(
            game_dir.path(),
            "common/bookmarks/game.txt",
            "bookmarks = { bookmark = { name = \"GAME_1936\" } }",
        );
        let mut loader = loader_for(&mod_dir, &game_dir);
        let bookmarks = loader.load_bookmarks().unwrap();
        assert_eq!(bookmarks[0].name, "GAME_1936");
    }

    #[test]
    fn test_country_flags_with_descriptive_filename() {
        let mod_dir = tempdir().unwrap();
        let game_dir = tempdir().unwrap();
        write_file(
            game_dir.path(),
            "history/countries/GER - Germany.txt",
            "set_country_flag = GER_air\n1939.1.1 = { set_country_flag = UNLOCK:radar }",
        );
        let mut loader = loader_for(&mod_dir, &game_dir);
        let flags = loader.load_country_flags("GER").unwrap();
        assert_eq!(flags, vec!["GER_air", "UNLOCK:radar"]);
        assert!(matches!(
            loader.load_country_flags("POL"),
            Err(GameDataError::MissingHistoryFile(tag)) if tag == "POL"
        ));
    }

    #[test]
    fn test_country_flags_mod_takes_priority() {
        let mod_dir = tempdir().unwrap();
        let game_dir = tempdir().unwrap();
        write_file(
            game_dir.path(),
            "history/countries/GER.txt",
            "set_country_flag = from_game",
        );
        write_file(
            mod_dir.path(),
            "history/countries/GER.txt",
            "set_country_flag = from_mod",
        );
        let mut loader = loader_for(&mod_dir, &game_dir);
        assert_eq!(loader.load_country_flags("GER").unwrap(), vec!["from_mod"]);
        assert_eq!(
            loader.load_all_country_flags("GER").unwrap(),
            vec!["from_game", "from_mod"]
        );
    }

    #[test]
    fn test_focus_tree_loading() {
        let mod_dir = tempdir().unwrap();
        let game_dir = tempdir().unwrap();
        write_file(
            game_dir.path(),
            "common/national_focus/GER_focus.txt",
            "focus_tree = { id = german_focus country = GER focus = { id = rhineland x = 4 y = 0 } }",
        );
        let mut loader = loader_for(&mod_dir, &game_dir);
        let tree = loader.load_focus_tree("GER").unwrap();
        assert_eq!(tree.id, "german_focus");
        assert!(tree.get_focus("rhineland").is_some());
        assert!(matches!(
            loader.load_focus_tree("POL"),
            Err(GameDataError::MissingFocusFile(tag)) if tag == "POL"
        ));
    }

    #[test]
    fn test_localization_layering() {
        let mod_dir = tempdir().unwrap();
        let game_dir = tempdir().unwrap();
        write_file(
            game_dir.path(),
            "localisation/english/folders_l_english.yml",
            "l_english:\n infantry_folder_name:0 \"Infantry\"\n game_only:0 \"Game\"\n",
        );
        // flat layout without the language subdirectory
        write_file(
            mod_dir.path(),
            "localisation/mod_l_english.yml",
            "l_english:\n infantry_folder_name:0 \"Modded Infantry\"\n",
        );
        let mut loader = loader_for(&mod_dir, &game_dir);
        let localizer = loader.load_localizer();
        assert_eq!(
            localizer.lookup("infantry_folder_name"),
            Some("Modded Infantry")
        );
        assert_eq!(localizer.lookup("game_only"), Some("Game"));
    }

    #[test]
    fn test_finalize() {
        let mod_dir = tempdir().unwrap();
        let game_dir = tempdir().unwrap();
        write_file(
            game_dir.path(),
            "common/technologies/base.txt",
            &tech_file(&tech_entry("tech_a", "infantry_folder", 0, 1.0)),
        );
        write_file(
            game_dir.path(),
            "common/technology_tags/tags.txt",
            "technology_folders = { infantry_folder = { ledger = army } }",
        );
        write_file(
            game_dir.path(),
            "common/bookmarks/b.txt",
            "bookmarks = { bookmark = { name = \"B\" GER = { ideology = fascism } } }",
        );
        write_file(
            game_dir.path(),
            "localisation/english/f_l_english.yml",
            "l_english:\n infantry_folder_name:0 \"Infantry\"\n",
        );
        let loader = loader_for(&mod_dir, &game_dir);
        let data = loader.finalize().unwrap();
        assert!(data.technologies().get_technology("tech_a").is_some());
        assert_eq!(data.folders().len(), 1);
        assert_eq!(data.bookmarks().len(), 1);
        assert_eq!(data.localized_folder_name("infantry_folder"), "Infantry");
    }
}
