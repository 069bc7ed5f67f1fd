//! Built-in distribution layouts.
//!
//! Two distributions ship: the Gradle flavor and the Maven flavor. Both take
//! the license, the version marker (as `VERSION`), the shared script files and
//! the generated CLI parsers; they differ in their ecosystem scripts and in
//! the companion jars under `lib/`.
//!
//! # Gradle flavor (`build/scripts/gradle`)
//!
//! | source                                          | destination                  | substituted |
//! |-------------------------------------------------|------------------------------|-------------|
//! | `LICENSE`                                       | `LICENSE`                    | no          |
//! | `release/version.txt`                           | `VERSION`                    | no          |
//! | `components/scripts/gradle/**` minus init scripts | `/`                        | yes         |
//! | `components/scripts/gradle/gradle-init-scripts/**` | `lib/gradle-init-scripts/` | no          |
//! | shared scripts minus `lib/cli-parsers/**`       | `/`                          | yes         |
//! | generated `lib/cli-parsers/gradle/**`           | `lib/`                       | no          |
//! | common components                               | `lib/build-scan-clients/`    | no          |
//!
//! The Maven flavor is the same without the init-script split, reading
//! `components/scripts/maven` and `lib/cli-parsers/maven`, plus Maven
//! components under `lib/maven-libs/`.

use std::path::PathBuf;

use tracing::debug;

use scriptdist_core::domain::{CopySpec, DistributionSpec, DomainError, Ecosystem};

pub const GRADLE_BASE_NAME: &str = "gradle-enterprise-gradle-build-validation";
pub const MAVEN_BASE_NAME: &str = "gradle-enterprise-maven-build-validation";

const SHARED_FILES: [&str; 4] = ["README.md", "mapping.example", "network.settings", "lib/**"];

/// Companion jars supplied as local files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentFiles {
    /// Shipped with both flavors under `lib/build-scan-clients/`.
    pub common: Vec<PathBuf>,
    /// Shipped with the Maven flavor under `lib/maven-libs/`.
    pub maven: Vec<PathBuf>,
}

pub fn base_name(ecosystem: Ecosystem) -> &'static str {
    match ecosystem {
        Ecosystem::Gradle => GRADLE_BASE_NAME,
        Ecosystem::Maven => MAVEN_BASE_NAME,
    }
}

/// Shared scripts from `components/scripts`, generated parsers excluded.
fn shared_scripts() -> Result<CopySpec, DomainError> {
    let spec = SHARED_FILES
        .iter()
        .fold(CopySpec::tree("components/scripts")?, |spec, pattern| {
            spec.include(*pattern)
        });
    Ok(spec.exclude("lib/cli-parsers/**").substituted())
}

fn preamble(ecosystem: Ecosystem) -> Result<DistributionSpec, DomainError> {
    Ok(DistributionSpec::new(
        ecosystem,
        base_name(ecosystem),
        format!("build/scripts/{ecosystem}"),
    )?
    .with_copy(CopySpec::file("LICENSE")?)
    .with_copy(CopySpec::file("release/version.txt")?.rename("VERSION")))
}

pub fn gradle_distribution(components: &ComponentFiles) -> Result<DistributionSpec, DomainError> {
    Ok(preamble(Ecosystem::Gradle)?
        .with_copy(
            CopySpec::tree("components/scripts/gradle")?
                .exclude("gradle-init-scripts/**")
                .substituted(),
        )
        .with_copy(
            CopySpec::tree("components/scripts/gradle")?
                .include("gradle-init-scripts/**")
                .into_dir("lib")?,
        )
        .with_copy(shared_scripts()?)
        .with_copy(CopySpec::generated("lib/cli-parsers/gradle")?.into_dir("lib")?)
        .with_copy(
            CopySpec::components(components.common.clone()).into_dir("lib/build-scan-clients")?,
        ))
}

pub fn maven_distribution(components: &ComponentFiles) -> Result<DistributionSpec, DomainError> {
    Ok(preamble(Ecosystem::Maven)?
        .with_copy(CopySpec::tree("components/scripts/maven")?.substituted())
        .with_copy(shared_scripts()?)
        .with_copy(CopySpec::generated("lib/cli-parsers/maven")?.into_dir("lib")?)
        .with_copy(
            CopySpec::components(components.common.clone()).into_dir("lib/build-scan-clients")?,
        )
        .with_copy(CopySpec::components(components.maven.clone()).into_dir("lib/maven-libs")?))
}

/// Layouts for the requested ecosystems, in the order given.
pub fn builtin_layout(
    ecosystems: &[Ecosystem],
    components: &ComponentFiles,
) -> Result<Vec<DistributionSpec>, DomainError> {
    let layout = ecosystems
        .iter()
        .map(|ecosystem| match ecosystem {
            Ecosystem::Gradle => gradle_distribution(components),
            Ecosystem::Maven => maven_distribution(components),
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(distributions = layout.len(), "Built-in layout loaded");
    Ok(layout)
}
