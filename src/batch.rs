//! Batch conversion of files and folders.
//!
//! Collects `.docx` inputs from a file or a folder (optionally recursing into
//! sub folders), converts them independently and writes one `_index.md` per
//! produced document, with its attachments next to it. A failing input is
//! logged and counted; it never stops the rest of the batch.

use crate::convert::{convert_file, ConvertOptions};
use crate::detect::{has_docx_extension, DocumentKind};
use crate::error::{Error, Result};
use crate::model::DocumentSet;
use crate::render::{to_json, to_markdown, JsonFormat, RenderOptions};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of every rendered document.
pub const INDEX_FILE: &str = "_index.md";

/// File name of the optional JSON dump next to [`INDEX_FILE`].
pub const INDEX_JSON_FILE: &str = "_index.json";

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Put each input's output under a folder named after the input file
    pub create_folder: bool,

    /// Descend into sub folders
    pub recurse: bool,

    /// Convert inputs on the rayon thread pool
    pub parallel: bool,

    /// Also write the document model as JSON
    pub write_json: bool,

    /// Conversion options
    pub convert: ConvertOptions,

    /// Rendering options
    pub render: RenderOptions,
}

impl BatchOptions {
    /// Create new batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix outputs with the input file stem.
    pub fn with_create_folder(mut self, create: bool) -> Self {
        self.create_folder = create;
        self
    }

    /// Enable or disable recursion into sub folders.
    pub fn with_recurse(mut self, recurse: bool) -> Self {
        self.recurse = recurse;
        self
    }

    /// Enable or disable parallel conversion.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enable or disable the JSON dump.
    pub fn with_json(mut self, write_json: bool) -> Self {
        self.write_json = write_json;
        self
    }

    /// Set conversion options.
    pub fn with_convert_options(mut self, options: ConvertOptions) -> Self {
        self.convert = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            create_folder: false,
            recurse: false,
            parallel: true,
            write_json: false,
            convert: ConvertOptions::default(),
            render: RenderOptions::default(),
        }
    }
}

/// One input file and the folder its output goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    /// The `.docx` file
    pub file: PathBuf,

    /// Base output folder, mirroring the input's sub folder
    pub output_dir: PathBuf,
}

/// Outcome of one converted input.
#[derive(Debug, Clone)]
pub struct ConvertedInput {
    /// The input file
    pub file: PathBuf,

    /// Template family it was converted as
    pub kind: DocumentKind,

    /// Every `_index.md` written for it
    pub written: Vec<PathBuf>,

    /// Number of attachment files written
    pub attachments: usize,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Inputs converted successfully, in input order
    pub converted: Vec<ConvertedInput>,

    /// Inputs that were skipped, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    /// Number of documents written over all inputs.
    pub fn documents_written(&self) -> usize {
        self.converted.iter().map(|c| c.written.len()).sum()
    }

    /// Number of attachments written over all inputs.
    pub fn attachments_written(&self) -> usize {
        self.converted.iter().map(|c| c.attachments).sum()
    }

    /// Check if every input converted.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Collect the `.docx` inputs under `path`.
///
/// A single file yields itself with `destination` as output folder. A folder
/// yields its `.docx` files sorted by name; with `recurse` sub folders are
/// visited too and their relative path is appended to `destination`.
pub fn collect_inputs(path: &Path, destination: &Path, recurse: bool) -> Result<Vec<BatchInput>> {
    if path.is_file() {
        if has_docx_extension(path) {
            return Ok(vec![BatchInput {
                file: path.to_path_buf(),
                output_dir: destination.to_path_buf(),
            }]);
        }
        log::warn!("Skipping {}: not a .docx file", path.display());
        return Ok(Vec::new());
    }

    if !path.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let mut inputs = Vec::new();
    collect_dir(path, path, destination, recurse, &mut inputs)?;
    Ok(inputs)
}

fn collect_dir(
    root: &Path,
    dir: &Path,
    destination: &Path,
    recurse: bool,
    inputs: &mut Vec<BatchInput>,
) -> Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    let relative = dir.strip_prefix(root).unwrap_or(Path::new(""));
    let output_dir = destination.join(relative);

    let mut sub_dirs = Vec::new();
    for entry in entries {
        if entry.is_file() && has_docx_extension(&entry) && !is_lock_file(&entry) {
            inputs.push(BatchInput {
                file: entry,
                output_dir: output_dir.clone(),
            });
        } else if recurse && entry.is_dir() {
            sub_dirs.push(entry);
        }
    }
    for sub in sub_dirs {
        collect_dir(root, &sub, destination, recurse, inputs)?;
    }
    Ok(())
}

/// Word keeps `~$name.docx` owner files next to open documents.
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("~$"))
}

/// Write every document of a set below `output_dir`.
///
/// Returns the written `_index.md` paths and the number of attachments.
pub fn write_documents(
    documents: &DocumentSet,
    output_dir: &Path,
    options: &BatchOptions,
) -> Result<(Vec<PathBuf>, usize)> {
    let mut written = Vec::with_capacity(documents.len());
    let mut attachments = 0;

    for (id, doc) in documents.iter() {
        let dir = documents.output_dir(id, output_dir, options.create_folder);
        fs::create_dir_all(&dir)?;

        let index = dir.join(INDEX_FILE);
        fs::write(&index, to_markdown(doc, &options.render)?)?;
        if options.write_json {
            fs::write(dir.join(INDEX_JSON_FILE), to_json(doc, JsonFormat::Pretty)?)?;
        }

        for graphic in doc.attachments() {
            fs::write(dir.join(&graphic.name), &graphic.data)?;
            attachments += 1;
        }
        log::debug!("Wrote {}", index.display());
        written.push(index);
    }

    Ok((written, attachments))
}

fn process_input(input: &BatchInput, options: &BatchOptions) -> Result<ConvertedInput> {
    let conversion = convert_file(&input.file, &options.convert)?;
    let (written, attachments) = write_documents(&conversion.documents, &input.output_dir, options)?;
    Ok(ConvertedInput {
        file: input.file.clone(),
        kind: conversion.kind,
        written,
        attachments,
    })
}

/// Convert everything under `path` into `destination`.
pub fn run(path: &Path, destination: &Path, options: &BatchOptions) -> Result<BatchReport> {
    run_with_progress(path, destination, options, |_| {})
}

/// Like [`run`], calling `progress` after each input finishes.
pub fn run_with_progress<F>(
    path: &Path,
    destination: &Path,
    options: &BatchOptions,
    progress: F,
) -> Result<BatchReport>
where
    F: Fn(&Path) + Sync,
{
    let inputs = collect_inputs(path, destination, options.recurse)?;
    log::info!("Converting {} file(s) from {}", inputs.len(), path.display());
    Ok(run_inputs(&inputs, options, progress))
}

/// Convert an explicit list of inputs.
pub fn run_inputs<F>(inputs: &[BatchInput], options: &BatchOptions, progress: F) -> BatchReport
where
    F: Fn(&Path) + Sync,
{
    let convert_one = |input: &BatchInput| {
        let result = process_input(input, options);
        progress(&input.file);
        (input.file.clone(), result)
    };

    let results: Vec<_> = if options.parallel {
        inputs.par_iter().map(convert_one).collect()
    } else {
        inputs.iter().map(convert_one).collect()
    };

    let mut report = BatchReport::default();
    for (file, result) in results {
        match result {
            Ok(converted) => report.converted.push(converted),
            Err(e) => {
                log::error!("Could not convert {}: {}", file.display(), e);
                report.failed.push((file, e.to_string()));
            }
        }
    }
    report
}
