//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("evql")
        .about("Compile query programs and inspect fact sets")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(parse_command())
        .subcommand(load_command())
}

/// Compile a program and print the selected stages.
pub fn parse_command() -> Command {
    Command::new("parse")
        .about("Compile a query program")
        .override_usage("  evql parse <FILE> [--tokens] [--lines] [--facts] [--graph]")
        .after_help(
            r#"EXAMPLES:
  evql parse people.evql              # classified parse tree
  evql parse people.evql --facts      # lowered facts
  evql parse people.evql --graph      # linked graphs
  cat people.evql | evql parse -      # from stdin"#,
        )
        .arg(input_arg("Program file (use \"-\" for stdin)"))
        .arg(tokens_arg())
        .arg(lines_arg())
        .arg(facts_arg())
        .arg(graph_arg())
        .arg(spans_arg())
        .arg(json_arg())
        .arg(names_arg())
        .arg(max_depth_arg())
        .arg(no_merge_titles_arg())
        .arg(color_arg())
}

/// Load a literal fact array and link it.
pub fn load_command() -> Command {
    Command::new("load")
        .about("Load a JSON fact array and link its query graph")
        .override_usage("  evql load <FILE> [--dot]")
        .after_help(
            r#"EXAMPLES:
  evql load facts.json                # facts, entities, tags, graph
  evql load facts.json --dot | dot -Tsvg > graph.svg"#,
        )
        .arg(input_arg("JSON fact file (use \"-\" for stdin)"))
        .arg(dot_arg())
        .arg(names_arg())
}
