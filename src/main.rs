use std::{env, fs::read_to_string, path::PathBuf, process, rc::Rc, time::Instant};

use formula_sema::{
    entity::entity::{Branch, Entity, EntityKind},
    formula::formula::{dedent, FormulaParser},
    guess::guess::guess,
    render_error,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: formula-sema <file>");
        process::exit(2);
    }

    let file_path = PathBuf::from(&args[1]);
    let file_name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| args[1].clone());

    let source = match read_to_string(&file_path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Failed to read {}: {}", file_path.display(), error);
            process::exit(2);
        }
    };

    let start = Instant::now();
    let parser = FormulaParser::default();

    let tree = match parser.parse_formula_class(&source, Some(file_name), None) {
        Ok(tree) => tree,
        Err(error) => {
            eprint!("{}", render_error(&error, &dedent(&source)));
            process::exit(1);
        }
    };

    info!(elapsed = ?start.elapsed(), "converted {}", tree.root());

    for function in tree.formulas() {
        println!("def {}:", function);
        for statement in function.body() {
            print_statement(&statement, 1);
        }
    }
}

fn describe_guess(entity: &Rc<Entity>) -> String {
    match guess(entity) {
        Some(found) => format!("{:?}", found),
        None => String::from("?"),
    }
}

fn print_statement(statement: &Rc<Entity>, depth: usize) {
    let indent = "    ".repeat(depth);

    match &statement.kind {
        EntityKind::Assignment { variables, .. } => {
            println!("{}{}", indent, statement);
            for variable in variables {
                println!("{}    {}: {}", indent, variable, describe_guess(variable));
            }
        }
        EntityKind::Conditional { branches } => {
            for (index, Branch { test, body }) in branches.iter().enumerate() {
                match (index, test) {
                    (0, Some(test)) => println!("{}if {}:", indent, test),
                    (_, Some(test)) => println!("{}elif {}:", indent, test),
                    (_, None) => println!("{}else:", indent),
                }
                for inner in body {
                    print_statement(inner, depth + 1);
                }
            }
        }
        EntityKind::Loop { body, orelse, .. } => {
            println!("{}{}:", indent, statement);
            for inner in body {
                print_statement(inner, depth + 1);
            }
            if !orelse.is_empty() {
                println!("{}else:", indent);
                for inner in orelse {
                    print_statement(inner, depth + 1);
                }
            }
        }
        _ => println!("{}{}: {}", indent, statement, describe_guess(statement)),
    }
}
