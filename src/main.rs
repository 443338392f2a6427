use std::error::Error;
use std::fs;

use clap::Parser;

use hoi4_tree_extractor::game_data::{detect_sub_trees, GameDataError, GameDataLoader};
use hoi4_tree_extractor::structures::ConditionEvaluator;
use hoi4_tree_extractor::types::Diagnostics;

mod args;
use args::Args;

/// Entry point: load and merge the mod and game directories, print a
/// summary, and optionally inspect one country or folder in detail.
fn main() {
    let args = Args::parse();
    if args.mod_path.is_none() && args.game_path.is_none() {
        eprintln!("Error: at least one of --mod-path and --game-path is required");
        std::process::exit(2);
    }
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        if let Some(source) = e.source() {
            eprintln!("Caused by: {}", source);
        }
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut loader = GameDataLoader::new(
        args.mod_path.clone(),
        args.game_path.clone(),
        args.language,
    );
    let mut diagnostics = Diagnostics::default();

    if let Some(tag) = &args.country {
        inspect_country(&mut loader, tag)?;
    }

    if let Some(folder) = &args.folder {
        let technologies = loader.load_technologies_for_folder(folder)?;
        println!(
            "Folder {} holds {} technologies:",
            folder,
            technologies.len()
        );
        for sub_tree in detect_sub_trees(folder, &technologies) {
            println!(
                "  {} [x {}..{}]: {} technologies",
                sub_tree.name,
                sub_tree.x_min,
                sub_tree.x_max,
                sub_tree.technologies.len()
            );
        }
        diagnostics.absorb(&mut loader.take_diagnostics());
    }

    let data = loader.finalize()?;
    println!(
        "Merged {} technologies across {} folders, {} bookmarks, {} localisation keys",
        data.technologies().technologies.len(),
        data.folders().len(),
        data.bookmarks().len(),
        data.localizer().len()
    );
    for finding in data.technologies().validate() {
        println!("Validation: {}", finding);
    }

    if let Some(dump_path) = &args.dump {
        fs::write(dump_path, serde_json::to_string_pretty(&data)?)?;
        println!("Dumped merged game data to {}", dump_path.display());
    }

    if args.verbose {
        for warning in diagnostics.iter().chain(data.diagnostics().iter()) {
            eprintln!("Warning: {}", warning);
        }
    }
    Ok(())
}

/// Print one country's flags, the folders it can see and, when it has
/// one, its focus tree with validation findings.
fn inspect_country(loader: &mut GameDataLoader, tag: &str) -> Result<(), Box<dyn Error>> {
    let flags = loader.load_country_flags(tag)?;
    println!("{} has {} country flags", tag, flags.len());

    let evaluator = ConditionEvaluator::new(flags);
    let folders = loader.visible_folders(&evaluator)?;
    println!("{} sees {} technology folders:", tag, folders.len());
    for folder in &folders {
        println!("  {}", folder);
    }

    match loader.load_focus_tree(tag) {
        Ok(tree) => {
            println!("Focus tree {}: {} focuses", tree.id, tree.focuses.len());
            for finding in tree.validate() {
                println!("Validation: {}", finding);
            }
        }
        // not every country has its own focus tree
        Err(GameDataError::MissingFocusFile(_)) => {
            println!("{} has no national focus file", tag);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
