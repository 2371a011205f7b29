use std::path::PathBuf;

use evql_compiler::FactsBuilder;
use evql_core::{FactStore, MemoryFactStore, Tag, facts_from_json};

use super::input_loader::{Input, load_input};

pub struct LoadArgs {
    pub input: PathBuf,
    pub dot: bool,
    pub names: bool,
}

pub fn run(args: LoadArgs) {
    let input = match load_input(&args.input) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    match render(&args, &input) {
        Ok(output) => print!("{}", output),
        Err(failure) => {
            eprintln!("error: {}", failure);
            std::process::exit(1);
        }
    }
}

/// Decode, store and link a fact array.
///
/// Entities are materialized from the decoded sequence so the last write
/// wins. The `facts:` section lists the distinct triples held by a
/// [`MemoryFactStore`]. A fact set without any `query` entity prints no
/// graph section.
pub fn render(args: &LoadArgs, input: &Input) -> Result<String, String> {
    let text = String::from_utf8_lossy(&input.bytes);
    let decoded = facts_from_json(&text).map_err(|e| e.to_string())?;

    let store = MemoryFactStore::from_facts(&decoded);
    let loaded = FactsBuilder::new(decoded).load();

    let has_queries = !loaded.tag_map().get(&Tag::Query).is_empty();
    let graph = if has_queries {
        Some(loaded.link().map_err(|e| e.to_string())?)
    } else {
        None
    };

    if args.dot {
        return graph
            .map(|g| g.to_tree().to_dot())
            .ok_or_else(|| "no `query` entities to draw".to_owned());
    }

    let mut out = String::new();
    out.push_str("facts:\n");
    for fact in store.snapshot() {
        out.push_str(&format!("  {fact}\n"));
    }
    out.push_str("\nentities:\n");
    for entity in loaded.entities().values() {
        out.push_str(&format!("  {entity}\n"));
    }
    out.push_str(&format!("\ntags: {}\n", loaded.tag_map()));
    if let Some(graph) = graph {
        out.push_str("\ngraph:\n");
        out.push_str(&graph.printer().with_names(args.names).dump());
    }
    Ok(out)
}
