#![deny(rust_2018_idioms)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lingo::diag::{Report, ReportFormatter, ReportKind};
use lingo::source::{Location, Source};
use lingo::{CompileOptions, Compiler};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lingo")]
#[command(version, about = "Lingo UI compiler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile every .lingo file under a directory into one app
    Build {
        /// Directory to search for .lingo files
        #[arg(long, default_value = "src")]
        src: PathBuf,

        /// Directory to write app.js and index.html to
        #[arg(long, default_value = "dist")]
        out: PathBuf,

        /// Module providing custom widgets and actions
        #[arg(long)]
        functions: Option<String>,
    },

    /// Compile files without writing output
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a file and print its syntax tree
    Tree { file: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build {
            src,
            out,
            functions,
        } => build(&src, &out, functions),
        Command::Check { files, json } => check(&files, json),
        Command::Tree { file } => tree(&file),
    }
}

fn build(src: &Path, out: &Path, functions: Option<String>) -> Result<()> {
    let mut files = vec![];
    find_lingo_files(src, &mut files)
        .with_context(|| format!("Failed to search {}", src.display()))?;
    files.sort();
    let Some(first) = files.first() else {
        anyhow::bail!("No .lingo files found in {}", src.display());
    };

    println!("Compiling {} file(s)...", files.len());
    let mut sources = vec![];
    for file in &files {
        println!("  Reading {}...", file.display());
        sources.push(read(file)?);
    }
    let source = Source::new(first.display().to_string(), sources.join("\n\n"));

    let options = CompileOptions {
        custom_functions_path: functions,
    };
    let result = Compiler::new().compile(&source.text, &source.name, &options);

    fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;
    print_reports(&source, &result.warnings)?;
    if let Some(code) = &result.code {
        let path = out.join("app.js");
        fs::write(&path, code).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  Generated {}", path.display());
    } else {
        print_reports(&source, &result.errors)?;
    }

    let path = out.join("index.html");
    fs::write(&path, INDEX_HTML).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("  Generated {}", path.display());

    if !result.success {
        anyhow::bail!("Build failed with {} error(s)", result.errors.len());
    }
    println!("Build completed: {}", out.display());
    Ok(())
}

fn find_lingo_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in dir.read_dir()? {
        let path = entry?.path();
        if path.is_dir() {
            find_lingo_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "lingo") {
            files.push(path);
        }
    }
    Ok(())
}

/// One line of `check --json` output.
#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    message: String,
    location: &'a Location,
    severity: ReportKind,
}

fn check(files: &[PathBuf], json: bool) -> Result<()> {
    let mut compiler = Compiler::new();
    let mut failed = 0;
    for file in files {
        let source = Source::new(file.display().to_string(), read(file)?);
        let result = compiler.compile(&source.text, &source.name, &CompileOptions::default());
        if !result.success {
            failed += 1;
        }

        let reports = result.errors.iter().chain(&result.warnings);
        if json {
            for report in reports {
                let line = serde_json::to_string(&JsonDiagnostic {
                    message: report.message.to_string(),
                    location: &report.location,
                    severity: report.kind,
                })
                .context("Failed to serialize diagnostic")?;
                println!("{line}");
            }
        } else {
            print_reports(&source, reports)?;
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} file(s) failed to compile", files.len());
    }
    Ok(())
}

fn tree(file: &Path) -> Result<()> {
    let source = Source::new(file.display().to_string(), read(file)?);
    let result = lingo::check(&source);
    print!("{}", lingo::syntax::TreeWriter::new(&result.program));
    print_reports(&source, &result.reports)?;
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

fn print_reports<'a>(source: &Source, reports: impl IntoIterator<Item = &'a Report>) -> Result<()> {
    let mut output = String::new();
    let mut formatter = ReportFormatter::new(&mut output, source).with_color(true);
    for report in reports {
        formatter
            .write(report)
            .context("Failed to format diagnostic")?;
    }
    eprint!("{output}");
    Ok(())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>LingoUI App</title>
  <style>
    body {
      font-family: system-ui, -apple-system, sans-serif;
      margin: 0;
      padding: 20px;
    }
    #app {
      max-width: 600px;
      margin: 0 auto;
    }
    .row {
      display: flex;
      gap: 10px;
    }
    .column {
      display: flex;
      flex-direction: column;
      gap: 10px;
    }
    button {
      padding: 8px 16px;
      cursor: pointer;
    }
    input {
      padding: 8px;
      border: 1px solid #ccc;
      border-radius: 4px;
    }
  </style>
</head>
<body>
  <div id="app"></div>
  <script type="module">
    import { createApp } from './app.js';
    createApp();
  </script>
</body>
</html>
"#;
