//! `sentiment-chart` library crate.
//!
//! The binary (`sentchart`) is a thin wrapper around this library so the adapter,
//! the engines, and the page tooling stay testable without spawning processes.
//!
//! Entry point for embedding: [`adapter::render_sentiment_chart`] with any
//! [`document::Document`] and [`render::RenderPort`].

pub mod adapter;
pub mod app;
pub mod cli;
pub mod document;
pub mod domain;
pub mod error;
pub mod io;
pub mod render;
pub mod report;
pub mod tui;
