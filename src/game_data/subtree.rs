use phf::{phf_map, Map};
use serde::Serialize;

use crate::structures::Technology;

/// Split threshold: a horizontal gap wider than this many grid units
/// separates two sub-trees.
pub const SUBTREE_GAP: i32 = 5;

/// Display names for well-known category tags. First matching category in
/// a range names the sub-tree; otherwise the folder name is used.
static SUBTREE_NAMES: Map<&'static str, &'static str> = phf_map! {
    "electronics" => "Electronic Engineering",
    "computing_tech" => "Electronic Engineering",
    "radar_tech" => "Electronic Engineering",
    "radio_tech" => "Electronic Engineering",
    "rocketry" => "Experimental Rockets",
    "mot_rockets" => "Experimental Rockets",
    "jet_technology" => "Jets & Aircraft Engines",
    "jet_engine" => "Jets & Aircraft Engines",
    "nuclear" => "Atomic Research",
    "land_doctrine" => "Land Doctrine",
    "air_doctrine" => "Air Doctrine",
    "naval_doctrine" => "Naval Doctrine",
};

/// A visually distinct cluster of technologies within one folder.
#[derive(Debug, Clone, Serialize)]
pub struct SubTree {
    pub name: String,
    pub x_min: i32,
    pub x_max: i32,
    pub technologies: Vec<Technology>,
    pub categories: Vec<String>,
}

/// Partition a folder's technologies into sub-trees by gaps in their
/// horizontal coordinate: the distinct X values are sorted and split
/// wherever two neighbours are more than [SUBTREE_GAP] apart.
pub fn detect_sub_trees(folder_name: &str, technologies: &[Technology]) -> Vec<SubTree> {
    if technologies.is_empty() {
        return Vec::new();
    }

    let mut xs: Vec<i32> = technologies.iter().map(|t| t.position.x).collect();
    xs.sort_unstable();
    xs.dedup();

    let mut sub_trees = Vec::new();
    let mut range_start = xs[0];
    let mut range_end = xs[0];
    for &x in &xs[1..] {
        if x - range_end > SUBTREE_GAP {
            sub_trees.push(build_sub_tree(range_start, range_end, technologies, folder_name));
            range_start = x;
        }
        range_end = x;
    }
    sub_trees.push(build_sub_tree(range_start, range_end, technologies, folder_name));
    sub_trees
}

fn build_sub_tree(
    x_min: i32,
    x_max: i32,
    all: &[Technology],
    folder_name: &str,
) -> SubTree {
    let technologies: Vec<Technology> = all
        .iter()
        .filter(|t| (x_min..=x_max).contains(&t.position.x))
        .cloned()
        .collect();

    let mut categories = Vec::new();
    let mut x_vars = Vec::new();
    for tech in &technologies {
        for category in &tech.categories {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
        if let Some(var) = &tech.position.x_var {
            if !x_vars.contains(var) {
                x_vars.push(var.clone());
            }
        }
    }

    let mut name = categories
        .iter()
        .find_map(|category| SUBTREE_NAMES.get(category.as_str()))
        .map(|s| (*s).to_owned())
        .unwrap_or_else(|| folder_name.to_owned());

    // a couple of variable names make the cluster traceable back to the
    // source file; more than three is noise
    if (1..=3).contains(&x_vars.len()) {
        x_vars.sort_unstable();
        name = format!("{} ({})", name, x_vars.join(", "));
    }

    SubTree {
        name,
        x_min,
        x_max,
        technologies,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::Position;

    fn tech(id: &str, x: i32, categories: &[&str]) -> Technology {
        let (program, _) = crate::parser::parse(&format!(
            "technologies = {{ {} = {{ folder = {{ name = f position = {{ x = {} y = 0 }} }} }} }}",
            id, x
        ));
        let mut diagnostics = crate::types::Diagnostics::default();
        let mut t = crate::structures::extract_technologies(&program, &mut diagnostics)
            .unwrap()
            .remove(0);
        t.categories = categories.iter().map(|c| c.to_string()).collect();
        t
    }

    fn tech_with_var(id: &str, x: i32, x_var: &str) -> Technology {
        let mut t = tech(id, x, &[]);
        t.position = Position {
            x,
            y: 0,
            x_var: Some(x_var.to_owned()),
            y_var: None,
        };
        t
    }

    #[test]
    fn test_gap_splits_into_two() {
        let techs = vec![
            tech("a", 0, &[]),
            tech("b", 1, &[]),
            tech("c", 2, &[]),
            tech("d", 10, &[]),
            tech("e", 11, &[]),
        ];
        let sub_trees = detect_sub_trees("infantry_folder", &techs);
        assert_eq!(sub_trees.len(), 2);
        assert_eq!((sub_trees[0].x_min, sub_trees[0].x_max), (0, 2));
        assert_eq!(sub_trees[0].technologies.len(), 3);
        assert_eq!((sub_trees[1].x_min, sub_trees[1].x_max), (10, 11));
        assert_eq!(sub_trees[1].technologies.len(), 2);
    }

    #[test]
    fn test_gap_of_exactly_five_does_not_split() {
        let techs = vec![tech("a", 0, &[]), tech("b", 5, &[])];
        assert_eq!(detect_sub_trees("f", &techs).len(), 1);
        let techs = vec![tech("a", 0, &[]), tech("b", 6, &[])];
        assert_eq!(detect_sub_trees("f", &techs).len(), 2);
    }

    #[test]
    fn test_category_names() {
        let techs = vec![
            tech("radar1", 0, &["radar_tech"]),
            tech("rocket1", 20, &["rocketry"]),
            tech("odd", 40, &["unknown_cat"]),
        ];
        let sub_trees = detect_sub_trees("secret_weapons", &techs);
        assert_eq!(sub_trees.len(), 3);
        assert_eq!(sub_trees[0].name, "Electronic Engineering");
        assert_eq!(sub_trees[1].name, "Experimental Rockets");
        // no known category, fall back to the folder name
        assert_eq!(sub_trees[2].name, "secret_weapons");
    }

    #[test]
    fn test_variable_names_appended_sorted() {
        let techs = vec![
            tech_with_var("a", 0, "@ROCKET"),
            tech_with_var("b", 1, "@JET"),
        ];
        let sub_trees = detect_sub_trees("secret_weapons", &techs);
        assert_eq!(sub_trees[0].name, "secret_weapons (@JET, @ROCKET)");
    }

    #[test]
    fn test_too_many_variables_omitted() {
        let techs = vec![
            tech_with_var("a", 0, "@V1"),
            tech_with_var("b", 1, "@V2"),
            tech_with_var("c", 2, "@V3"),
            tech_with_var("d", 3, "@V4"),
        ];
        let sub_trees = detect_sub_trees("folder", &techs);
        assert_eq!(sub_trees[0].name, "folder");
    }

    #[test]
    fn test_empty_input() {
        assert!(detect_sub_trees("f", &[]).is_empty());
    }

    #[test]
    fn test_duplicate_x_values_collapse() {
        let techs = vec![tech("a", 3, &[]), tech("b", 3, &[]), tech("c", 4, &[])];
        let sub_trees = detect_sub_trees("f", &techs);
        assert_eq!(sub_trees.len(), 1);
        assert_eq!(sub_trees[0].technologies.len(), 3);
    }
}
