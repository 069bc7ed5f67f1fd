//! Distribution layouts and the artifacts assembled from them.

use glob::{MatchOptions, Pattern};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::common::RelativePath;
use crate::domain::{error::DomainError, value_objects::Ecosystem};

// ============================================================================
// Copy specs
// ============================================================================

/// Where a copy spec reads its files from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopySource {
    /// A single file, relative to the project root.
    File(RelativePath),
    /// A directory tree, relative to the project root.
    Tree(RelativePath),
    /// A subtree of the parser generator output directory.
    Generated(RelativePath),
    /// Explicit component files (jars). Relative entries resolve against the
    /// project root.
    Components(Vec<PathBuf>),
}

/// One `from(...) { ... }` clause of a distribution layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySpec {
    pub source: CopySource,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub into: RelativePath,
    pub rename: Option<String>,
    pub substitute: bool,
}

impl CopySpec {
    fn with_source(source: CopySource) -> Self {
        Self {
            source,
            include: Vec::new(),
            exclude: Vec::new(),
            into: RelativePath::root(),
            rename: None,
            substitute: false,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        Ok(Self::with_source(CopySource::File(RelativePath::try_new(
            path,
        )?)))
    }

    pub fn tree(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        Ok(Self::with_source(CopySource::Tree(RelativePath::try_new(
            path,
        )?)))
    }

    pub fn generated(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        Ok(Self::with_source(CopySource::Generated(
            RelativePath::try_new(path)?,
        )))
    }

    pub fn components(files: Vec<PathBuf>) -> Self {
        Self::with_source(CopySource::Components(files))
    }

    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn into_dir(mut self, dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        self.into = RelativePath::try_new(dir)?;
        Ok(self)
    }

    /// Rename the single copied file. Only meaningful for `CopySource::File`.
    #[must_use]
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }

    /// Replace placeholders in text files copied by this spec.
    #[must_use]
    pub fn substituted(mut self) -> Self {
        self.substitute = true;
        self
    }

    /// Compile include/exclude patterns.
    pub fn filter(&self) -> Result<PathFilter, DomainError> {
        PathFilter::new(&self.include, &self.exclude)
    }

    /// Destination of a file inside the staging dir, given its path
    /// relative to the source root.
    pub fn destination(&self, relative: &Path) -> Result<RelativePath, DomainError> {
        match (&self.rename, relative.file_name()) {
            (Some(name), Some(_)) => {
                let renamed = relative.with_file_name(name);
                self.into.join(renamed)
            }
            _ => self.into.join(relative),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.filter()?;
        if let Some(name) = &self.rename {
            if name.is_empty() || name.contains('/') || name.contains('\\') {
                return Err(DomainError::InvalidBaseName {
                    name: name.clone(),
                    reason: "rename target must be a plain file name".into(),
                });
            }
        }
        Ok(())
    }
}

/// Include/exclude glob filter with Gradle pattern-set semantics: no includes
/// means everything is included, and excludes always win.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl PathFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, DomainError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    pub fn matches(&self, relative: &Path) -> bool {
        let included = self.include.is_empty()
            || self
                .include
                .iter()
                .any(|p| p.matches_path_with(relative, MATCH_OPTIONS));
        included
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_path_with(relative, MATCH_OPTIONS))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, DomainError> {
    patterns
        .iter()
        .map(|raw| {
            // A bare directory pattern such as `gradle/.data/` excludes the whole subtree.
            let normalized = match raw.strip_suffix('/') {
                Some(dir) => format!("{dir}/**"),
                None => raw.clone(),
            };
            Pattern::new(&normalized).map_err(|e| DomainError::InvalidPattern {
                pattern: raw.clone(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}

// ============================================================================
// Distribution spec
// ============================================================================

/// A named, ordered set of copy specs that produces one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionSpec {
    pub ecosystem: Ecosystem,
    pub base_name: String,
    pub staging_dir: RelativePath,
    pub copies: Vec<CopySpec>,
}

impl DistributionSpec {
    pub fn new(
        ecosystem: Ecosystem,
        base_name: impl Into<String>,
        staging_dir: impl Into<PathBuf>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            ecosystem,
            base_name: base_name.into(),
            staging_dir: RelativePath::try_new(staging_dir)?,
            copies: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_copy(mut self, copy: CopySpec) -> Self {
        self.copies.push(copy);
        self
    }

    /// True when any copy spec reads from the parser generator output.
    pub fn needs_generated(&self) -> bool {
        self.copies
            .iter()
            .any(|c| matches!(c.source, CopySource::Generated(_)))
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.base_name.is_empty()
            || self
                .base_name
                .chars()
                .any(|c| c.is_whitespace() || c == '/' || c == '\\')
        {
            return Err(DomainError::InvalidBaseName {
                name: self.base_name.clone(),
                reason: "must be non-empty without whitespace or path separators".into(),
            });
        }
        if self.copies.is_empty() {
            return Err(DomainError::EmptyDistribution {
                name: self.base_name.clone(),
            });
        }
        self.copies.iter().try_for_each(CopySpec::validate)
    }
}

/// Validate a whole layout: each spec, plus unique base names and staging dirs.
pub fn validate_layout(specs: &[DistributionSpec]) -> Result<(), DomainError> {
    let mut names = HashSet::new();
    let mut staging = HashSet::new();
    for spec in specs {
        spec.validate()?;
        if !names.insert(spec.base_name.as_str()) || !staging.insert(&spec.staging_dir) {
            return Err(DomainError::DuplicateDistribution {
                name: spec.base_name.clone(),
            });
        }
    }
    Ok(())
}

// ============================================================================
// Staged output and artifacts
// ============================================================================

/// One file in a staging dir. `path` is slash-separated, as it appears in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFile {
    pub path: String,
    pub executable: bool,
    pub substituted: bool,
}

/// The staged tree of one distribution, files sorted by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedTree {
    pub root: PathBuf,
    pub files: Vec<StagedFile>,
}

impl StagedTree {
    pub fn new(root: PathBuf, mut files: Vec<StagedFile>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self { root, files }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// An archive written to the distributions directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionArtifact {
    pub ecosystem: Ecosystem,
    pub base_name: String,
    pub file_name: String,
    pub path: PathBuf,
    pub staged: StagedTree,
}

/// Every declared distribution, assembled.
///
/// Only the assembly service can build one, so holding an `AssembledSet`
/// means no distribution is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledSet {
    artifacts: Vec<DistributionArtifact>,
}

impl AssembledSet {
    pub(crate) fn new(mut artifacts: Vec<DistributionArtifact>) -> Self {
        artifacts.sort_by(|a, b| a.ecosystem.cmp(&b.ecosystem));
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &[DistributionArtifact] {
        &self.artifacts
    }

    pub fn archive_paths(&self) -> impl Iterator<Item = &Path> {
        self.artifacts.iter().map(|a| a.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(include: &[&str], exclude: &[&str]) -> PathFilter {
        let include: Vec<String> = include.iter().map(|s| s.to_string()).collect();
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        PathFilter::new(&include, &exclude).unwrap()
    }

    #[test]
    fn empty_includes_match_everything() {
        let f = filter(&[], &[]);
        assert!(f.matches(Path::new("a/b/c.sh")));
    }

    #[test]
    fn excludes_win_over_includes() {
        let f = filter(&["lib/**"], &["lib/cli-parsers/**"]);
        assert!(f.matches(Path::new("lib/util.sh")));
        assert!(f.matches(Path::new("lib/nested/x.sh")));
        assert!(!f.matches(Path::new("lib/cli-parsers/gradle/x.sh")));
        assert!(!f.matches(Path::new("README.md")));
    }

    #[test]
    fn trailing_slash_excludes_subtree() {
        let f = filter(&["**/*-cli-parser.m4"], &["gradle/.data/"]);
        assert!(f.matches(Path::new("gradle/01-cli-parser.m4")));
        assert!(f.matches(Path::new("top-cli-parser.m4")));
        assert!(!f.matches(Path::new("gradle/.data/01-cli-parser.m4")));
    }

    #[test]
    fn star_does_not_cross_directories() {
        let f = filter(&["*.md"], &[]);
        assert!(f.matches(Path::new("README.md")));
        assert!(!f.matches(Path::new("docs/README.md")));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = PathFilter::new(&["a/**b".into()], &[]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidPattern { .. }));
    }

    #[test]
    fn destination_applies_into_and_rename() {
        let spec = CopySpec::file("release/version.txt").unwrap().rename("VERSION");
        assert_eq!(
            spec.destination(Path::new("version.txt"))
                .unwrap()
                .to_slash_string(),
            "VERSION"
        );

        let spec = CopySpec::tree("components/scripts/gradle")
            .unwrap()
            .into_dir("lib")
            .unwrap();
        assert_eq!(
            spec.destination(Path::new("gradle-init-scripts/a.gradle"))
                .unwrap()
                .to_slash_string(),
            "lib/gradle-init-scripts/a.gradle"
        );
    }

    #[test]
    fn distribution_requires_copies() {
        let spec = DistributionSpec::new(Ecosystem::Gradle, "dist", "build/scripts/gradle").unwrap();
        assert!(matches!(
            spec.validate(),
            Err(DomainError::EmptyDistribution { .. })
        ));
    }

    #[test]
    fn layout_rejects_duplicate_names() {
        let spec = DistributionSpec::new(Ecosystem::Gradle, "dist", "build/scripts/gradle")
            .unwrap()
            .with_copy(CopySpec::file("LICENSE").unwrap());
        let mut other = spec.clone();
        other.ecosystem = Ecosystem::Maven;
        assert!(matches!(
            validate_layout(&[spec, other]),
            Err(DomainError::DuplicateDistribution { .. })
        ));
    }

    #[test]
    fn needs_generated_detects_parser_source() {
        let spec = DistributionSpec::new(Ecosystem::Maven, "dist", "build/scripts/maven")
            .unwrap()
            .with_copy(CopySpec::generated("lib/cli-parsers/maven").unwrap());
        assert!(spec.needs_generated());
    }
}
