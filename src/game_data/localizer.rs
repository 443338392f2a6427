use std::collections::HashMap;

use serde::{ser::SerializeMap, Serialize, Serializer};

/// Holds the localisation key-value table for one language.
///
/// The game's localisation files are YAML-shaped but not YAML: every useful
/// line is `key:version "value"` inside an `l_<language>:` block, so they
/// are read line by line rather than through a YAML parser. Lines outside
/// the language block, blank lines and `#` comments are ignored.
#[derive(Debug)]
pub struct Localizer {
    language: String,
    data: HashMap<String, String>,
}

impl Localizer {
    pub fn new<S: Into<String>>(language: S) -> Self {
        Localizer {
            language: language.into(),
            data: HashMap::new(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Read one localisation file's contents into the table. Later calls
    /// override earlier keys, which is how mod files shadow game files.
    pub fn ingest(&mut self, contents: &str) {
        let marker = format!("l_{}:", self.language);
        let mut in_language_block = false;
        for line in contents.lines() {
            let line = line.trim().trim_start_matches('\u{feff}');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with(&marker) {
                in_language_block = true;
                continue;
            }
            if !in_language_block {
                continue;
            }
            if let Some((key, value)) = parse_line(line) {
                self.data.insert(key.to_owned(), value.to_owned());
            }
        }
    }

    pub fn lookup<K: AsRef<str>>(&self, key: K) -> Option<&str> {
        self.data.get(key.as_ref()).map(String::as_str)
    }

    /// Look a key up, falling back to the key itself when no translation
    /// exists, the way the game renders missing localisation.
    pub fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.lookup(key).unwrap_or(key)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// Split a `key:version "value"` line. The version digits between the
/// colon and the opening quote are discarded.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let colon = line.find(':')?;
    let key = line[..colon].trim();
    if key.is_empty() {
        return None;
    }
    let quote_start = line.find('"')?;
    let quote_end = line.rfind('"')?;
    if quote_end <= quote_start {
        return None;
    }
    Some((key, &line[quote_start + 1..quote_end]))
}

impl Serialize for Localizer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(Some(self.data.len()))?;
        for (key, value) in &self.data {
            state.serialize_entry(key, value)?;
        }
        state.end()
    }
}
