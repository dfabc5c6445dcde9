//! Command-line parsing for `sentchart`.
//!
//! Argument parsing and dispatch stay separate from the adapter and the engines;
//! `app` maps these structs into plain config values.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{LayoutChoice, MismatchPolicy, RenderFormat};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sentchart", version, about = "Sentiment score charts from embedded page data")]
pub struct Cli {
    /// More log output (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the chart embedded in a page.
    Render(RenderArgs),
    /// Produce a chart page from quarterly sentiment records (JSON).
    Page(PageArgs),
    /// Print the quarter-over-quarter tone report for a page.
    Report(ReportArgs),
    /// Export a page's chart data to CSV.
    Export(ExportArgs),
}

/// Which page to read and how to bind it.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// HTML page with the embedded data elements. Prompts for one when omitted.
    #[arg(short = 'p', long, value_name = "HTML")]
    pub page: Option<PathBuf>,

    /// Element layout of the page (`auto` picks it from the elements present).
    #[arg(short = 'l', long, value_enum, default_value_t = LayoutChoice::Auto)]
    pub layout: LayoutChoice,

    /// JSON style file overriding series styles, axis, and title.
    #[arg(long, value_name = "JSON")]
    pub style: Option<PathBuf>,

    /// What to do when a series length differs from the label count.
    #[arg(long = "on-mismatch", value_enum, default_value_t = MismatchPolicy::Reject)]
    pub on_mismatch: MismatchPolicy,
}

/// Options for rendering.
#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output engine.
    #[arg(short = 'f', long, value_enum, default_value_t = RenderFormat::Ascii)]
    pub format: RenderFormat,

    /// Output file (required for `svg`; stdout otherwise).
    #[arg(short = 'o', long)]
    pub out: Option<PathBuf>,

    /// Plot width (columns for ascii, pixels for svg).
    #[arg(long)]
    pub width: Option<u32>,

    /// Plot height (rows for ascii, pixels for svg).
    #[arg(long)]
    pub height: Option<u32>,
}

/// Options for producing a page.
#[derive(Debug, Args, Clone)]
pub struct PageArgs {
    /// JSON array of quarter records.
    #[arg(short = 'r', long, value_name = "JSON")]
    pub records: PathBuf,

    /// Where to write the page.
    #[arg(short = 'o', long, value_name = "HTML")]
    pub out: PathBuf,

    /// Chart title (defaults to the layout's title).
    #[arg(short = 't', long)]
    pub title: Option<String>,
}

/// Options for the tone report.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Report straight from a records JSON file instead of a page.
    #[arg(long, value_name = "JSON", conflicts_with = "page")]
    pub records: Option<PathBuf>,
}

/// Options for CSV export.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// CSV file to write.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_flags_parse() {
        let cli = Cli::parse_from([
            "sentchart", "-vv", "render", "--page", "nvda.html", "--layout", "comparison",
            "--format", "svg", "--out", "chart.svg", "--on-mismatch", "truncate",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.source.layout, LayoutChoice::Comparison);
        assert_eq!(args.source.on_mismatch, MismatchPolicy::Truncate);
        assert_eq!(args.format, RenderFormat::Svg);
        assert_eq!(args.out.as_deref(), Some(std::path::Path::new("chart.svg")));
    }

    #[test]
    fn report_reads_records_or_a_page() {
        let cli = Cli::try_parse_from(["sentchart", "report", "--records", "nvda.json"]).unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.records, Some(PathBuf::from("nvda.json")));
        assert_eq!(args.source.layout, LayoutChoice::Auto);

        let both = Cli::try_parse_from(["sentchart", "report", "--records", "a.json", "--page", "b.html"]);
        assert!(both.is_err());
    }
}
