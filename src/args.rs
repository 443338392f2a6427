use std::path::PathBuf;

use clap_derive::Parser;

/// The languages the game ships localisation for.
pub const LANGUAGES: [&str; 9] = [
    "english",
    "braz_por",
    "french",
    "german",
    "japanese",
    "polish",
    "russian",
    "spanish",
    "simp_chinese",
];

/// A function to parse the language argument.
fn parse_lang_arg(input: &str) -> Result<&'static str, &'static str> {
    LANGUAGES
        .iter()
        .find(|x| **x == input)
        .map_or(Err("Invalid language"), |e| Ok(*e))
}

/// A function to parse the path arguments.
fn parse_path_arg(input: &str) -> Result<PathBuf, &'static str> {
    let p = PathBuf::from(input);
    if p.is_dir() {
        Ok(p)
    } else {
        Err("Invalid path (not a directory)")
    }
}

/// A function to parse a country tag: 2-3 characters, uppercased.
fn parse_tag_arg(input: &str) -> Result<String, &'static str> {
    if (2..=3).contains(&input.len()) && input.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(input.to_ascii_uppercase())
    } else {
        Err("Invalid country tag (expected 2-3 characters)")
    }
}

/// The arguments to the program.
#[derive(Parser)]
#[command(about = "Extracts technology and focus trees from HOI4 mod and game files")]
pub struct Args {
    #[arg(short, long, value_parser = parse_path_arg)]
    /// The path to the mod directory.
    pub mod_path: Option<PathBuf>,
    #[arg(short, long, value_parser = parse_path_arg)]
    /// The path to the game directory.
    pub game_path: Option<PathBuf>,
    #[arg(short, long, default_value_t = LANGUAGES[0], value_parser = parse_lang_arg)]
    /// The language to use for localisation.
    pub language: &'static str,
    #[arg(short, long, value_parser = parse_tag_arg)]
    /// A country tag to inspect: prints its flags, visible folders and focus tree.
    pub country: Option<String>,
    #[arg(short, long)]
    /// A technology folder to partition into sub-trees.
    pub folder: Option<String>,
    #[arg(long, default_value = None)]
    /// A path to dump the merged game data to as json.
    pub dump: Option<PathBuf>,
    #[arg(short, long, default_value_t = false)]
    /// A flag that tells the program to print extraction warnings.
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lang_arg() {
        assert_eq!(parse_lang_arg("english"), Ok("english"));
        assert_eq!(parse_lang_arg("russian"), Ok("russian"));
        assert!(parse_lang_arg("klingon").is_err());
    }

    #[test]
    fn test_parse_tag_arg() {
        assert_eq!(parse_tag_arg("ger"), Ok("GER".to_owned()));
        assert_eq!(parse_tag_arg("US"), Ok("US".to_owned()));
        assert!(parse_tag_arg("GERMANY").is_err());
        assert!(parse_tag_arg("G").is_err());
        assert!(parse_tag_arg("G-R").is_err());
    }
}
