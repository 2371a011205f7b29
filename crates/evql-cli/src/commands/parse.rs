use std::path::PathBuf;

use evql_compiler::parser::{ParseTreePrinter, TokenPrinter};
use evql_compiler::{CompileConfig, ProgramBuilder};
use evql_core::facts_to_json;

use super::input_loader::{Input, load_input};

/// Which pipeline stages to print, in pipeline order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stages {
    pub tokens: bool,
    pub lines: bool,
    pub tree: bool,
    pub facts: bool,
    pub graph: bool,
}

pub struct ParseArgs {
    pub input: PathBuf,
    pub config: CompileConfig,
    pub stages: Stages,
    pub spans: bool,
    pub json: bool,
    pub names: bool,
    pub color: bool,
}

/// Output of a successful compile. Warnings are rendered but do not fail.
pub struct Rendered {
    pub output: String,
    pub diagnostics: String,
}

pub fn run(args: ParseArgs) {
    let input = match load_input(&args.input) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    match render(&args, &input) {
        Ok(rendered) => {
            eprint!("{}", rendered.diagnostics);
            print!("{}", rendered.output);
        }
        Err(failure) => {
            eprint!("{}", failure);
            std::process::exit(1);
        }
    }
}

/// Compile `input` and print the selected stages. Errors come back as the
/// text to show on stderr.
pub fn render(args: &ParseArgs, input: &Input) -> Result<Rendered, String> {
    let program = ProgramBuilder::from_bytes(&input.bytes)
        .with_config(args.config)
        .with_source_kind(input.kind.clone())
        .parse()
        .map_err(|e| format!("error: {}\n", e))?;

    let diagnostics = program.render_diagnostics(args.color);
    if !program.is_valid() {
        return Err(diagnostics);
    }

    let mut sections = Vec::new();
    if args.stages.tokens {
        sections.push(TokenPrinter::new(program.tokens()).with_spans(args.spans).dump());
    }
    if args.stages.lines {
        sections.push(program.dump_lines());
    }
    if args.stages.tree {
        sections.push(
            ParseTreePrinter::new(program.source(), program.tree())
                .with_positions(args.spans)
                .dump(),
        );
    }
    if args.stages.facts {
        let facts = if args.json {
            let mut json = facts_to_json(&program.lower()).map_err(|e| format!("error: {}\n", e))?;
            json.push('\n');
            json
        } else {
            program.dump_facts()
        };
        sections.push(facts);
    }
    if args.stages.graph {
        let graphs = program.link().map_err(|e| format!("error: {}\n", e))?;
        for graph in &graphs {
            sections.push(graph.printer().with_names(args.names).dump());
        }
    }

    Ok(Rendered {
        output: sections.join("\n"),
        diagnostics,
    })
}
