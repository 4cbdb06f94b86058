// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Loading of [Gherkin] `.feature` files.
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

use std::{
    io,
    path::{Path, PathBuf},
};

use crate::{
    document::{Document, Ext as _},
    error::{ConfigError, ConfigResult},
    runner::LoadDocuments,
};

/// Loader of `.feature` files from a directory (recursively) or a single
/// file.
///
/// Every file becomes a [`Document`] named by its path relative to the root,
/// with path separators replaced by `.`: `Features/Calculator.feature` under
/// the root becomes `Features.Calculator.feature`. A single file is named by
/// its file name.
///
/// As there is no async runtime-agnostic way to interact with io, loading is
/// blocking.
#[derive(Clone, Debug)]
pub struct FeatureDir {
    root: PathBuf,
}

impl FeatureDir {
    /// Creates a new [`FeatureDir`] loading from the given `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path this [`FeatureDir`] loads from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists the `.feature` files to load, in a deterministic order.
    fn paths(&self, root: &Path) -> ConfigResult<Vec<PathBuf>> {
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        let walk_err = |source| ConfigError::Walk { path: root.display().to_string(), source };
        let walker = globwalk::GlobWalkerBuilder::new(root, "*.feature")
            .case_insensitive(true)
            .build()
            .map_err(walk_err)?;

        let mut paths = walker
            .map(|entry| {
                entry.map(|e| e.into_path()).map_err(|e| ConfigError::Io {
                    path: root.display().to_string(),
                    source: io::Error::from(e),
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;
        paths.sort();
        Ok(paths)
    }
}

impl LoadDocuments for FeatureDir {
    fn load_documents(&self) -> ConfigResult<Vec<Document>> {
        let root = self.root.canonicalize().map_err(|source| ConfigError::Io {
            path: self.root.display().to_string(),
            source,
        })?;

        self.paths(&root)?
            .into_iter()
            .map(|path| {
                let name = document_name(&root, &path);
                tracing::debug!(path = %path.display(), document = %name, "parsing feature file");
                gherkin::Feature::parse_path(&path, gherkin::GherkinEnv::default())
                    .map(|f| f.into_document(name))
                    .map_err(|source| ConfigError::Parse {
                        path: path.display().to_string(),
                        source,
                    })
            })
            .collect()
    }
}

/// Names a `.feature` file by its `path` relative to the `root`.
fn document_name(root: &Path, path: &Path) -> String {
    let relative = match path.strip_prefix(root) {
        Ok(p) if !p.as_os_str().is_empty() => p,
        _ => path.file_name().map_or(path, Path::new),
    };
    relative.to_string_lossy().replace(['/', '\\'], ".")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const FEATURE: &str = "\
Feature: Calculator
  Scenario: Adds
    Given I have 1
";

    #[test]
    fn names_documents_by_relative_path() {
        let root = Path::new("/work/features");

        assert_eq!(
            document_name(root, Path::new("/work/features/Math/Calculator.feature")),
            "Math.Calculator.feature",
        );
        assert_eq!(
            document_name(Path::new("/work/one.feature"), Path::new("/work/one.feature")),
            "one.feature",
        );
    }

    #[test]
    fn loads_sorted_feature_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/b.feature"), FEATURE).unwrap();
        fs::write(dir.path().join("a.FEATURE"), FEATURE).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a feature").unwrap();

        let docs = FeatureDir::new(dir.path()).load_documents().unwrap();

        let names = docs.iter().map(|d| d.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["a.FEATURE", "nested.b.feature"]);
        assert_eq!(docs[0].feature.name, "Calculator");
    }

    #[test]
    fn parse_error_aborts_loading() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.feature"), "Scenario: Orphan\n  Given no feature\n")
            .unwrap();

        let err = FeatureDir::new(dir.path()).load_documents().unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[test]
    fn missing_root_is_io_error() {
        let err = FeatureDir::new("/definitely/not/here").load_documents().unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }), "{err}");
    }
}
