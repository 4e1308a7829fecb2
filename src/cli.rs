//! CLI argument parsing and command handlers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use crate::analyzer::{Analyzer, AnalyzerOptions, summarize};
use crate::models::{AnalysisSummary, DeclKind};
use crate::output;
use crate::parser::parse_header;

/// typetree: structure-aware C++ type tree analysis
#[derive(Parser, Debug)]
#[command(
    name = "ttx",
    version,
    about = "A structure-aware C++ type tree analyzer",
    long_about = "typetree parses a C++ header with Tree-sitter and emits a recursive \
                  JSON analysis of a named class or struct: every member classified as \
                  fundamental, enum, pointer, container, class, or typedef, with nested \
                  types expanded and shared types deduplicated through a type-detail cache."
)]
pub struct Cli {
    /// Enable verbose logging (can be repeated for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a class/struct and emit its recursive type tree
    ///
    /// Examples:
    ///   ttx analyze types.h --class ComplexDataStructure
    ///   ttx analyze types.h --class SystemConfiguration --output result.json
    ///   ttx analyze types.h --class NetworkConfig --json --pretty
    Analyze {
        /// C++ header file to parse
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Name of the class/struct to analyze
        #[arg(short, long, value_name = "NAME")]
        class: String,

        /// Write the type tree to this file; a sibling
        /// <stem>_dependence.json receives the full type-detail cache
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sort JSON object keys in written files
        #[arg(long)]
        sort_keys: bool,

        /// Include private and protected members in the analysis
        #[arg(long)]
        all_members: bool,

        /// Output format as JSON (to stdout)
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output (only with --json)
        /// By default, JSON is minified
        #[arg(long)]
        pretty: bool,
    },

    /// List the declarations indexed from a header
    ///
    /// Examples:
    ///   ttx list types.h
    ///   ttx list types.h --kind struct
    ///   ttx list types.h --json --pretty
    List {
        /// C++ header file to parse
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Filter by declaration kind
        /// Supported: class, struct, enum, typedef
        #[arg(short, long)]
        kind: Option<String>,

        /// Output format as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output (only with --json)
        #[arg(long)]
        pretty: bool,
    },
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        // Setup logging based on verbosity
        let log_level = match self.verbose {
            0 => "warn",  // Default: only warnings and errors
            1 => "info",  // -v: show info messages
            2 => "debug", // -vv: show debug messages
            _ => "trace", // -vvv: show trace messages
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();

        match self.command {
            Command::Analyze {
                input,
                class,
                output,
                sort_keys,
                all_members,
                json,
                pretty,
            } => handle_analyze(&input, &class, output, sort_keys, all_members, json, pretty),
            Command::List {
                input,
                kind,
                json,
                pretty,
            } => handle_list(&input, kind, json, pretty),
        }
    }
}

fn handle_analyze(
    input: &Path,
    class: &str,
    output_path: Option<PathBuf>,
    sort_keys: bool,
    all_members: bool,
    json: bool,
    pretty: bool,
) -> Result<()> {
    log::info!("Analyzing '{}' in {}", class, input.display());
    let start = Instant::now();

    let source = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let index = parse_header(&source)?;

    if index.is_empty() {
        output::warn(&format!(
            "No declarations found in {}; is this a C++ header?",
            input.display()
        ));
    }

    let options = AnalyzerOptions {
        only_public: !all_members,
        ..Default::default()
    };
    let mut analyzer = Analyzer::new(&index, options);
    let node = analyzer.analyze(class);
    let duration = start.elapsed();

    if node.is_unknown {
        output::warn(&format!(
            "'{}' has no definition in {}; emitting an empty tree.",
            class,
            input.display()
        ));
    }

    let mut dependence_path = None;
    if let Some(path) = &output_path {
        let result_json = if sort_keys {
            let value = serde_json::to_value(&node).context("Failed to build result JSON")?;
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string_pretty(&node)?
        };
        std::fs::write(path, result_json)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        let dep_path = sibling_dependence_path(path);
        analyzer.cache().save(&dep_path, sort_keys)?;
        log::info!("Wrote {} and {}", path.display(), dep_path.display());
        dependence_path = Some(dep_path);
    }

    if json {
        let json_str = if pretty {
            serde_json::to_string_pretty(&node)?
        } else {
            serde_json::to_string(&node)?
        };
        println!("{}", json_str);
        return Ok(());
    }

    let summary = summarize(
        &node,
        analyzer.stats(),
        analyzer.cache().len(),
        &input.display().to_string(),
        class,
        duration,
    );
    print_summary(&summary, output_path.as_deref(), dependence_path.as_deref());

    Ok(())
}

/// `result.json` → `result_dependence.json`, next to the result file
fn sibling_dependence_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "result".to_string());
    path.with_file_name(format!("{stem}_dependence.json"))
}

fn print_summary(summary: &AnalysisSummary, output: Option<&Path>, dependence: Option<&Path>) {
    println!("Analysis complete!");
    println!("==================");
    println!("Input:            {}", summary.input);
    println!("Class:            {}", summary.class);
    println!("Duration:         {}ms", summary.duration_ms);
    println!("Generated:        {}", summary.generated_at);

    if !summary.characteristics.is_empty() {
        println!("Characteristics:  {}", summary.characteristics.join(", "));
    }

    if summary.member_total > 0 {
        println!("\nMember breakdown:");
        println!("  Total:          {}", summary.member_total);
        println!("  Fundamental:    {}", summary.fundamental_members);
        println!("  Pointers:       {}", summary.pointer_members);
        println!("  Containers:     {}", summary.container_members);
        println!("  Classes:        {}", summary.class_members);
        println!("  Enums:          {}", summary.enum_members);
    }

    println!("\nType cache:       {} entries", summary.cached_types);
    println!(
        "Lookups:          {} class ({} missed), {} typedef, {} enum",
        summary.lookups.class_lookups,
        summary.lookups.class_misses,
        summary.lookups.typedef_lookups,
        summary.lookups.enum_lookups
    );

    if let Some(path) = output {
        println!("\nResult:           {}", path.display());
    }
    if let Some(path) = dependence {
        println!("Dependence:       {}", path.display());
    }
}

fn handle_list(input: &Path, kind: Option<String>, json: bool, pretty: bool) -> Result<()> {
    log::info!("Listing declarations in {}", input.display());

    let source = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let index = parse_header(&source)?;

    let kind_filter = match kind {
        Some(s) => match DeclKind::from_str(&s) {
            Ok(k) => Some(k),
            Err(_) => {
                output::warn(&format!(
                    "Unknown declaration kind: {} (expected class, struct, enum, or typedef)",
                    s
                ));
                None
            }
        },
        None => None,
    };

    let rows: Vec<_> = index
        .declarations()
        .into_iter()
        .filter(|d| kind_filter.is_none_or(|k| d.kind == k))
        .collect();

    if json {
        let json_str = if pretty {
            serde_json::to_string_pretty(&rows)?
        } else {
            serde_json::to_string(&rows)?
        };
        println!("{}", json_str);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No declarations found.");
        return Ok(());
    }

    println!("{:<9} {:<32} {:>6} {:>8}", "KIND", "NAME", "LINE", "MEMBERS");
    for row in &rows {
        let name = if row.defined {
            row.name.clone()
        } else {
            format!("{} (forward)", row.name)
        };
        println!(
            "{:<9} {:<32} {:>6} {:>8}",
            row.kind.to_string(),
            name,
            row.span.start_line,
            row.members
        );
    }
    println!("\n{} declarations", rows.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_dependence_path() {
        assert_eq!(
            sibling_dependence_path(Path::new("/tmp/result.json")),
            PathBuf::from("/tmp/result_dependence.json")
        );
        assert_eq!(
            sibling_dependence_path(Path::new("out.json")),
            PathBuf::from("out_dependence.json")
        );
    }

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::try_parse_from([
            "ttx", "-vv", "analyze", "types.h", "--class", "Widget", "--json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Analyze { input, class, json, .. } => {
                assert_eq!(input, PathBuf::from("types.h"));
                assert_eq!(class, "Widget");
                assert!(json);
            }
            _ => panic!("expected analyze subcommand"),
        }
    }

    #[test]
    fn test_cli_parses_list() {
        let cli = Cli::try_parse_from(["ttx", "list", "types.h", "--kind", "enum"]).unwrap();
        match cli.command {
            Command::List { kind, .. } => assert_eq!(kind.as_deref(), Some("enum")),
            _ => panic!("expected list subcommand"),
        }
    }
}
