// src/lib.rs

pub mod api;
pub mod config;
pub mod converter;
pub mod easyeda_models;
pub mod emitter;
pub mod error;
pub mod file_writer;
pub mod importer;
pub mod kicad_models;
pub mod model3d;
pub mod path;
pub mod tokenizer;
pub mod transform;

use crate::config::GenerateOptions;
use crate::easyeda_models::{ComponentRef, ComponentSource};
use crate::error::{Error, Result};
use crate::file_writer::{FootprintLibrary, LibraryStore, SymbolLibrary};
use crate::model3d::{LibraryModelResolver, ModelResolver};
use log::{info, warn};
use std::path::Path;

/// Renders the component's symbol as a library entry in the configured schema.
pub fn generate_symbol(source: &ComponentSource, options: &GenerateOptions) -> Result<String> {
    let symbol = converter::convert_symbol(source, options)?;
    Ok(emitter::render_symbol(&symbol, options.schema))
}

/// Renders the component's footprint file in the configured schema.
pub fn generate_footprint(
    source: &ComponentSource,
    options: &GenerateOptions,
    resolver: Option<&dyn ModelResolver>,
) -> Result<String> {
    options.validate()?;
    let footprint = converter::convert_footprint(source, resolver)?;
    Ok(emitter::render_footprint(&footprint, options.schema))
}

/// What happened to each artifact of one import.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub symbol: ArtifactStatus,
    pub footprint: ArtifactStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ArtifactStatus {
    /// Turned off in the options.
    #[default]
    Disabled,
    /// The component has no data for it.
    Missing,
    /// Present in the library and `overwrite` is off.
    Kept(String),
    Written(String),
}

fn store(library: &dyn LibraryStore, name: &str, content: &str, overwrite: bool) -> Result<ArtifactStatus> {
    match library.write(name, content, overwrite) {
        Ok(()) => Ok(ArtifactStatus::Written(name.to_string())),
        Err(Error::AlreadyExists(what)) => {
            warn!("{} already exists, keeping it", what);
            Ok(ArtifactStatus::Kept(name.to_string()))
        }
        Err(e) => Err(e),
    }
}

/// Generates and stores the enabled artifacts of an already loaded component.
pub fn write_component(
    source: &ComponentSource,
    output_dir: &Path,
    options: &GenerateOptions,
) -> Result<ImportReport> {
    options.validate()?;
    let mut report = ImportReport::default();

    if options.footprint {
        report.footprint = if source.footprint.is_some() {
            let resolver = LibraryModelResolver::new(
                options.model_dir.clone(),
                source.info.model_3d_name.clone(),
            );
            let resolver: Option<&dyn ModelResolver> = if options.model_3d {
                Some(&resolver)
            } else {
                None
            };
            let text = generate_footprint(source, options, resolver)?;
            let library = FootprintLibrary::new(output_dir, &options.library_name, options.schema);
            store(&library, &source.info.footprint_name, &text, options.overwrite)?
        } else {
            ArtifactStatus::Missing
        };
    }

    if options.symbol {
        report.symbol = if source.symbol.is_some() {
            let library = SymbolLibrary::new(output_dir, &options.library_name, options.schema);
            let text = generate_symbol(source, options)?;
            store(&library, &source.info.name, &text, options.overwrite)?
        } else {
            ArtifactStatus::Missing
        };
    }

    Ok(report)
}

/// Fetches `reference` from the vendor API and writes it into the libraries
/// under `output_dir`.
pub async fn import_component(
    reference: &ComponentRef,
    output_dir: &Path,
    options: &GenerateOptions,
) -> Result<ImportReport> {
    options.validate()?;
    let api = api::EasyedaApi::new()?;
    let result = api.fetch(reference).await?;
    let source = importer::import_component(&result, reference)?;

    let report = write_component(&source, output_dir, options)?;
    info!(
        "Import of {} complete. Files are located in: {}",
        reference.id(),
        output_dir.display()
    );
    Ok(report)
}
