use std::fs;
use std::io;
use std::path::Path;

use super::*;

fn compile_str(text: &str) -> CompilationResult {
    Compiler::new().compile(text, "test.lingo", &CompileOptions::default())
}

fn messages(reports: &[Report]) -> Vec<String> {
    reports.iter().map(|report| report.message.to_string()).collect()
}

#[test]
fn counter_compiles() {
    let result = compile_str(
        "There is a number called count starting at 0.\n\
         Show text saying \"Count: {count}\".\n\
         When I click the button \"+\",\n\
         increase count by 1.",
    );
    assert!(result.success);
    assert!(result.errors.is_empty());
    let code = result.code.unwrap();
    assert!(code.contains("count.set(count.get() + 1);"));
    assert!(code.contains("${count.get()}"));
    assert_eq!(result.dependencies.unwrap(), [RUNTIME_PACKAGE]);
}

#[test]
fn undefined_variable_fails() {
    let result = compile_str("Show text saying \"{missingVar}\".");
    assert!(!result.success);
    assert!(result.code.is_none());
    assert!(result.dependencies.is_none());
    assert_eq!(messages(&result.errors), ["Undefined variable: 'missingVar'"]);
    assert_eq!(result.errors[0].location, source::Location::new("test.lingo", 1, 1));
}

#[test]
fn lex_errors_stop_before_parsing() {
    let result = compile_str("Show text saying \"oops.\nShow @.");
    assert!(!result.success);
    // the parser would have complained about the unterminated statement
    assert_eq!(messages(&result.errors), ["Unterminated string"]);
}

#[test]
fn parse_errors_stop_before_analysis() {
    let result = compile_str(
        "Show text saying \"{nowhere}\"\n\
         There is a number called n starting at 0.",
    );
    assert!(!result.success);
    assert_eq!(messages(&result.errors), ["Expected '.'"]);
}

#[test]
fn warnings_do_not_block_generation() {
    let result = compile_str(
        "There is text called item starting at \"\".\n\
         There is a list called items starting empty.\n\
         For each item in items,\n\
         show text saying \"{item}\".",
    );
    assert!(result.success);
    assert!(result.errors.is_empty());
    assert_eq!(
        messages(&result.warnings),
        ["Loop variable 'item' shadows a state variable of the same name"]
    );
    assert!(result.code.is_some());
}

#[test]
fn reserved_state_names_fail() {
    let result = compile_str(
        "There is text called with starting at \"\".\n\
         Show text saying \"{with}\".",
    );
    assert!(!result.success);
    assert!(result.code.is_none());
    assert_eq!(
        messages(&result.errors),
        ["'with' is reserved in the generated JavaScript and cannot be used as a name"]
    );
}

#[test]
fn compiler_reuse_is_isolated() {
    let mut compiler = Compiler::new();
    let options = CompileOptions::default();
    let failed = compiler.compile("Show text saying \"{x}\".", "a.lingo", &options);
    assert_eq!(failed.errors.len(), 1);
    let passed = compiler.compile("Show text saying \"x\".", "b.lingo", &options);
    assert!(passed.success);
    assert!(passed.errors.is_empty());
    assert!(passed.warnings.is_empty());
}

#[test]
fn compile_is_deterministic() {
    let text = "There is a list called todos starting empty.\n\
                There is text called draft starting at \"\".\n\
                Show an input called draft.\n\
                Show a button saying \"Add\".\n\
                For each todo in todos,\n\
                show text saying \"{todo}\".\n\
                When I click the button \"Add\",\n\
                add draft to todos.\n\
                set draft to \"\".";
    let first = compile_str(text);
    let second = compile_str(text);
    assert!(first.success);
    assert_eq!(first.code, second.code);
}

#[test]
fn custom_functions_option() {
    let options = CompileOptions {
        custom_functions_path: Some("./functions.js".into()),
    };
    let result = Compiler::new().compile(
        "There is a number called n starting at 0.\n\
         On page load,\n\
         fetchCount n.",
        "test.lingo",
        &options,
    );
    let code = result.code.unwrap();
    assert!(code.contains("import * as customFunctions from './functions.js';"));
    assert!(code.contains("customFunctions.fetchCount(n);"));
}

#[test]
fn check_keeps_tree_after_errors() {
    let source = Source::new(
        "test.lingo",
        "There is called x.\nShow text saying \"hi\".",
    );
    let result = check(&source);
    assert!(result.analysis.is_none());
    assert_eq!(result.program.statements.len(), 1);
    assert!(diag::has_errors(&result.reports));
}

// compiles every test-files/input/*.lingo and compares against
// test-files/expected; copy output over expected to accept changes
#[test]
fn baseline() -> io::Result<()> {
    let test_dir = Path::new("test-files");
    let input_dir = test_dir.join("input");
    let expected_dir = test_dir.join("expected");
    let output_dir = test_dir.join("output");
    fs::create_dir_all(&expected_dir)?;
    match fs::remove_dir_all(&output_dir) {
        Err(error) if error.kind() != io::ErrorKind::NotFound => return Err(error),
        _ => {}
    }
    fs::create_dir_all(&output_dir)?;

    let mut inputs = read_file_names(&input_dir)?;
    inputs.sort();
    let mut compiler = Compiler::new();
    for input in inputs {
        let input_path = input_dir.join(&input);
        let name = input_path
            .file_stem()
            .expect("missing file name?")
            .to_str()
            .expect("not unicode file name?");
        println!("testing {name}...");
        let source = Source::new(name, fs::read_to_string(&input_path)?);

        let checked = check(&source);
        fs::write(
            output_dir.join(format!("{name}.tree")),
            syntax::TreeWriter::new(&checked.program).to_string(),
        )?;

        if !checked.reports.is_empty() {
            let mut output = String::new();
            let mut f = diag::ReportFormatter::new(&mut output, &source);
            for report in &checked.reports {
                f.write(report).expect("formatting to a String");
            }
            fs::write(output_dir.join(format!("{name}.errors")), output)?;
        }

        let result = compiler.compile(&source.text, &source.name, &CompileOptions::default());
        if let Some(code) = result.code {
            fs::write(output_dir.join(format!("{name}.js")), code)?;
        }
    }

    let actual_names = read_file_names(&output_dir)?;
    let expected_names = read_file_names(&expected_dir)?;

    let (equal_names, added_names): (Vec<_>, _) = actual_names
        .iter()
        .partition(|name| expected_names.contains(name));
    let removed_names = expected_names
        .iter()
        .filter(|name| !actual_names.contains(name))
        .collect::<Vec<_>>();

    let mut result = Ok(());

    for name in equal_names {
        let actual = fs::read_to_string(output_dir.join(name))?;
        let expected = fs::read_to_string(expected_dir.join(name))?;
        if actual != expected {
            println!("changes in output {}:", name.to_string_lossy());
            for (line, diff) in diff::lines(&expected, &actual).iter().enumerate() {
                match diff {
                    diff::Result::Left(l) => {
                        println!("{line:>2}: -{l}");
                    }
                    diff::Result::Both(l, _) => {
                        println!("{line:>2}:  {l}");
                    }
                    diff::Result::Right(r) => {
                        println!("{line:>2}: +{r}");
                    }
                }
            }
            result = result.and(Err("changed output"));
        }
    }

    for name in added_names {
        println!("added output: {}", name.to_string_lossy());
        result = result.and(Err("added output"));
    }

    for name in removed_names {
        println!("removed output: {}", name.to_string_lossy());
        result = result.and(Err("removed output"));
    }

    result.map_err(io::Error::other)
}

fn read_file_names(path: &Path) -> io::Result<Vec<std::ffi::OsString>> {
    path.read_dir()?
        .map(|entry| entry.map(|entry| entry.file_name()))
        .collect()
}
