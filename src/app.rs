//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - dispatches to render / page / report / export

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ExportArgs, PageArgs, RenderArgs, ReportArgs, SourceArgs};
use crate::domain::{RenderConfig, SourceConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `sentchart` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` first, so it can carry RUST_LOG.
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.verbose);

    match cli.command {
        Command::Render(args) => handle_render(args),
        Command::Page(args) => handle_page(args),
        Command::Report(args) => handle_report(args),
        Command::Export(args) => handle_export(args),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_render(args: RenderArgs) -> Result<(), AppError> {
    let page = resolve_page(&args.source)?;
    let config = render_config_from_args(&args, page);
    let handle = pipeline::render(&config)?;
    if let Some(path) = &handle.artifact {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn handle_page(args: PageArgs) -> Result<(), AppError> {
    let records = crate::io::load_records(&args.records)?;
    let stamp = crate::io::generated_stamp();
    let html = crate::io::build_page(&records, args.title.as_deref(), Some(&stamp))?;
    crate::io::write_page(&args.out, &html)?;
    println!("Wrote {} ({} quarter(s))", args.out.display(), records.len());
    Ok(())
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let report = match &args.records {
        Some(path) => crate::report::format_records_report(&crate::io::load_records(path)?)?,
        None => {
            let page = resolve_page(&args.source)?;
            pipeline::page_report(&source_config_from_args(&args.source, page))?
        }
    };
    print!("{report}");
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let page = resolve_page(&args.source)?;
    let spec = pipeline::chart_spec(&source_config_from_args(&args.source, page))?;
    crate::io::write_series_csv(&args.out, &spec)?;
    println!("Wrote {}", args.out.display());
    Ok(())
}

/// The `--page` argument, or an interactive pick when it is missing.
fn resolve_page(args: &SourceArgs) -> Result<PathBuf, AppError> {
    match &args.page {
        Some(page) => Ok(page.clone()),
        None => crate::cli::picker::prompt_for_page_path(),
    }
}

pub fn source_config_from_args(args: &SourceArgs, page: PathBuf) -> SourceConfig {
    SourceConfig {
        page,
        layout: args.layout,
        style: args.style.clone(),
        mismatch: args.on_mismatch,
    }
}

pub fn render_config_from_args(args: &RenderArgs, page: PathBuf) -> RenderConfig {
    RenderConfig {
        source: source_config_from_args(&args.source, page),
        format: args.format,
        out: args.out.clone(),
        width: args.width,
        height: args.height,
    }
}

/// Rewrite argv so `sentchart` defaults to `sentchart render`.
///
/// Rules:
/// - `sentchart`                         -> `sentchart render`
/// - `sentchart --page x.html ...`       -> `sentchart render --page x.html ...`
/// - `sentchart -v`                      -> `sentchart render -v`
/// - `sentchart --help/--version/-h`     -> unchanged (show top-level help/version)
/// - `sentchart [-v] <subcommand> ...`   -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let first = argv
        .iter()
        .skip(1)
        .find(|a| !is_verbosity_flag(a))
        .cloned();

    let Some(first) = first else {
        argv.insert(1.min(argv.len()), "render".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        first.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    let is_subcommand = matches!(first.as_str(), "render" | "page" | "report" | "export");
    if is_top_level_help_or_version || is_subcommand {
        return argv;
    }

    // A leading flag means "render flags".
    if first.starts_with('-') {
        argv.insert(1, "render".to_string());
    }
    argv
}

fn is_verbosity_flag(arg: &str) -> bool {
    arg == "--verbose" || (arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'v'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LayoutChoice, MismatchPolicy, RenderFormat};

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_render() {
        assert_eq!(rewrite_args(argv(&["sentchart"])), argv(&["sentchart", "render"]));
        assert_eq!(rewrite_args(argv(&["sentchart", "-vv"])), argv(&["sentchart", "render", "-vv"]));
        assert_eq!(
            rewrite_args(argv(&["sentchart", "--page", "a.html"])),
            argv(&["sentchart", "render", "--page", "a.html"])
        );
    }

    #[test]
    fn subcommands_help_and_version_pass_through() {
        for args in [
            &["sentchart", "--help"][..],
            &["sentchart", "-V"],
            &["sentchart", "-v", "report", "--page", "a.html"],
            &["sentchart", "page", "--records", "r.json", "--out", "p.html"],
        ] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }

    #[test]
    fn rewritten_args_parse_into_render_config() {
        let cli = crate::cli::Cli::parse_from(rewrite_args(argv(&[
            "sentchart", "--page", "a.html", "-l", "comparison", "-f", "html", "--width", "600",
        ])));
        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        let page = args.source.page.clone().unwrap();
        let config = render_config_from_args(&args, page);
        assert_eq!(config.source.page, PathBuf::from("a.html"));
        assert_eq!(config.source.layout, LayoutChoice::Comparison);
        assert_eq!(config.source.mismatch, MismatchPolicy::Reject);
        assert_eq!(config.format, RenderFormat::Html);
        assert_eq!((config.width, config.height), (Some(600), None));
        assert_eq!(config.out, None);
    }
}
