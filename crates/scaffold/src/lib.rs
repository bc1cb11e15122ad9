//! Micro-site generation: identity, templated files, manifest patching and
//! the run that ties them to the external tools and the catalog.

pub mod entry;
pub mod error;
pub mod identity;
pub mod manifest;
pub mod markup;
pub mod pipeline;
pub mod run;
pub mod steps;
pub mod templates;
pub mod urls;

pub use {
    error::{Error, Result},
    identity::{ProjectIdentity, display_title, slugify},
    manifest::ManifestPatcher,
    markup::{Applied, Injection, InsertionPoint, MarkupDocument},
    pipeline::TemplatePipeline,
    run::{ScaffoldReport, ScaffoldRequest, Scaffolder},
    urls::ProjectUrls,
};
