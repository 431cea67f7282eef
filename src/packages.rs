//! Package version resolution.
//!
//! Picks a consistent set of package versions for a request, the way a
//! package manager resolves an environment:
//!
//! - one boolean per registered version;
//! - at most one version per package;
//! - exactly one version of every requested package;
//! - a selected version needs exactly one version matching each of its
//!   requirements.
//!
//! Every selected version costs something, and older versions cost more,
//! so only needed packages are pulled in and the newest compatible
//! versions win.
//!
//! # Registry format
//! ```json
//! {
//!   "python": [{"version": "3.8"}],
//!   "core_context": [{"version": "1.2", "requires": ["python>=3"]}]
//! }
//! ```
//! `requires` may also be a single string. Specifiers use semver
//! comparison operators; `==` is read as `=`, and short versions such as
//! `1.2` are padded to `1.2.0`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use serde::Deserialize;

use crate::assign::SoftTerm;
use crate::cp::{CpModel, CpSolution, LinearExpr, SearchControl, SolverConfig, VarId};
use crate::error::{Error, Result};
use crate::search::{ModelDecoder, SearchOrchestrator, SolutionEvent, SolveReport};

/// Parses a version, padding missing minor/patch components.
pub fn parse_version(raw: &str) -> Result<Version> {
    let raw = raw.trim();
    let split = raw.find(['-', '+']).unwrap_or(raw.len());
    let (core, suffix) = raw.split_at(split);
    let mut parts: Vec<&str> = core.split('.').collect();
    while parts.len() < 3 {
        parts.push("0");
    }
    let padded = format!("{}{}", parts.join("."), suffix);
    Version::parse(&padded).map_err(|e| Error::Package(format!("Invalid version '{raw}': {e}")))
}

/// A dependency on another package, e.g. `core_context<2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Required package.
    pub name: String,
    /// Accepted versions.
    pub specifier: VersionReq,
    raw: String,
}

impl Requirement {
    /// Whether a version satisfies the requirement.
    pub fn matches(&self, version: &PackageVersion) -> bool {
        version.name == self.name && self.specifier.matches(&version.semver)
    }
}

impl FromStr for Requirement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let split = raw
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'))
            .unwrap_or(raw.len());
        let (name, spec) = raw.split_at(split);
        if name.is_empty() {
            return Err(Error::Package(format!("Missing package name in '{raw}'")));
        }
        let spec = spec.trim();
        if spec.contains("!=") || spec.contains("~=") {
            return Err(Error::Package(format!("Unsupported specifier in '{raw}'")));
        }
        let specifier = if spec.is_empty() {
            VersionReq::STAR
        } else {
            VersionReq::parse(&spec.replace("==", "="))
                .map_err(|e| Error::Package(format!("Invalid requirement '{raw}': {e}")))?
        };
        Ok(Self {
            name: name.to_string(),
            specifier,
            raw: raw.to_string(),
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A registered package version, e.g. `python-3.8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    /// Package name.
    pub name: String,
    /// Version as written.
    pub version: String,
    /// Dependencies.
    pub requires: Vec<Requirement>,
    semver: Version,
}

impl PackageVersion {
    /// Creates a version with no requirements.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let version = version.into();
        let semver = parse_version(&version)?;
        Ok(Self {
            name: name.into(),
            version,
            requires: Vec::new(),
            semver,
        })
    }

    /// Adds a requirement.
    pub fn with_requirement(mut self, requirement: &str) -> Result<Self> {
        self.requires.push(requirement.parse()?);
        Ok(self)
    }

    /// Parsed version.
    pub fn semver(&self) -> &Version {
        &self.semver
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

/// A package and its registered versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Package name.
    pub name: String,
    /// Versions, in registration order.
    pub versions: Vec<PackageVersion>,
}

impl Package {
    /// Creates an empty package.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            versions: Vec::new(),
        }
    }

    /// Adds a version.
    pub fn with_version(mut self, version: PackageVersion) -> Self {
        self.versions.push(version);
        self
    }

    /// Versions sorted oldest first.
    pub fn sorted_versions(&self) -> Vec<&PackageVersion> {
        let mut versions: Vec<&PackageVersion> = self.versions.iter().collect();
        versions.sort_by(|a, b| a.semver.cmp(&b.semver));
        versions
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VersionField {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequiresField {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct VersionData {
    version: VersionField,
    #[serde(default)]
    requires: Option<RequiresField>,
}

/// All known packages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageRegistry {
    packages: Vec<Package>,
}

impl PackageRegistry {
    /// Creates a registry.
    pub fn new(packages: Vec<Package>) -> Self {
        Self { packages }
    }

    /// Parses the JSON registry format.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: BTreeMap<String, Vec<VersionData>> = serde_json::from_str(json)?;
        let mut packages = Vec::with_capacity(data.len());
        for (name, versions) in data {
            let mut package = Package::new(&name);
            for entry in versions {
                let number = match entry.version {
                    VersionField::Text(text) => text,
                    VersionField::Number(number) => number.to_string(),
                };
                let mut version = PackageVersion::new(&name, number)?;
                let requires = match entry.requires {
                    None => Vec::new(),
                    Some(RequiresField::One(one)) => vec![one],
                    Some(RequiresField::Many(many)) => many,
                };
                for requirement in requires {
                    version = version.with_requirement(&requirement)?;
                }
                package = package.with_version(version);
            }
            packages.push(package);
        }
        Ok(Self { packages })
    }

    /// Packages, in registration order.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Finds a package by name.
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Builds the resolution model for a request.
pub struct PackageModelBuilder<'a> {
    registry: &'a PackageRegistry,
    request: Vec<String>,
}

impl<'a> PackageModelBuilder<'a> {
    /// Creates a builder. `request` lists package names.
    pub fn new<I, S>(registry: &'a PackageRegistry, request: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registry,
            request: request.into_iter().map(Into::into).collect(),
        }
    }

    fn package(&self, name: &str) -> Result<&'a Package> {
        self.registry
            .package(name)
            .ok_or_else(|| Error::Package(format!("Unknown package: {name}")))
    }

    /// Builds the model.
    ///
    /// # Errors
    /// [`Error::Package`] if the request or a requirement names an
    /// unknown package.
    pub fn build(self) -> Result<PackageModel> {
        let mut model = CpModel::new("packages");
        let mut vars: HashMap<(&str, &str), VarId> = HashMap::new();
        let mut selections = Vec::new();
        let mut soft_terms = Vec::new();

        for package in self.registry.packages() {
            let versions = package.sorted_versions();
            let count = versions.len() as i64;
            for (i, version) in versions.into_iter().enumerate() {
                let name = format!("{}_{}", package.name, version.version);
                let var = model.new_bool_var(name.clone())?;
                vars.insert((version.name.as_str(), version.version.as_str()), var);
                selections.push((var, version.to_string()));
                soft_terms.push(SoftTerm::new(name, var, -(count - i as i64)));
            }
        }

        let package_vars = |package: &Package| -> Vec<VarId> {
            package
                .versions
                .iter()
                .filter_map(|v| vars.get(&(v.name.as_str(), v.version.as_str())).copied())
                .collect()
        };

        for package in self.registry.packages() {
            model.add_linear(LinearExpr::sum(package_vars(package)), 0, 1);
        }

        for name in &self.request {
            let package = self.package(name)?;
            model.add_equality(LinearExpr::sum(package_vars(package)), 1);
        }

        for package in self.registry.packages() {
            for version in &package.versions {
                let Some(&var) = vars.get(&(version.name.as_str(), version.version.as_str()))
                else {
                    continue;
                };
                for requirement in &version.requires {
                    let dependency = self.package(&requirement.name)?;
                    let matching: Vec<VarId> = dependency
                        .versions
                        .iter()
                        .filter(|v| requirement.matches(v))
                        .filter_map(|v| vars.get(&(v.name.as_str(), v.version.as_str())).copied())
                        .collect();
                    tracing::debug!(
                        version = %version,
                        requirement = %requirement,
                        candidates = matching.len(),
                        "requirement"
                    );
                    model
                        .add_equality(LinearExpr::sum(matching), 1)
                        .only_enforce_if(var);
                }
            }
        }

        model.maximize(LinearExpr::weighted_sum(
            soft_terms.iter().map(|t| (t.var, t.weight)),
        ));
        tracing::info!(
            packages = self.registry.len(),
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            "package model built"
        );
        Ok(PackageModel {
            model,
            selections,
            soft_terms,
        })
    }
}

/// A built package resolution model.
#[derive(Debug, Clone)]
pub struct PackageModel {
    model: CpModel,
    selections: Vec<(VarId, String)>,
    soft_terms: Vec<SoftTerm>,
}

impl ModelDecoder for PackageModel {
    type Output = BTreeSet<String>;

    fn model(&self) -> &CpModel {
        &self.model
    }

    fn soft_terms(&self) -> &[SoftTerm] {
        &self.soft_terms
    }

    fn decode(&self, solution: &CpSolution) -> BTreeSet<String> {
        self.selections
            .iter()
            .filter(|(var, _)| solution.boolean_value(*var))
            .map(|(_, label)| label.clone())
            .collect()
    }
}

/// Resolves a request with the bundled solver.
pub fn solve_packages<I, S, F>(
    registry: &PackageRegistry,
    request: I,
    config: SolverConfig,
    on_solution: F,
) -> Result<SolveReport<BTreeSet<String>>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: FnMut(SolutionEvent<BTreeSet<String>>) -> SearchControl,
{
    let model = PackageModelBuilder::new(registry, request).build()?;
    let mut orchestrator = SearchOrchestrator::new(config);
    orchestrator.load(model)?;
    orchestrator.solve(on_solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::SolveStatus;

    const REGISTRY: &str = r#"{
        "core_context": [
            {"version": "1.1", "requires": "python"},
            {"version": "1.2", "requires": "python"},
            {"version": "2.0", "requires": "python"}
        ],
        "core_publish": [
            {"version": "1.1", "requires": "core_context<2"}
        ],
        "python": [
            {"version": 2.7},
            {"version": "3.7"},
            {"version": "3.8"}
        ]
    }"#;

    fn resolve(request: &[&str]) -> Result<BTreeSet<String>> {
        let registry = PackageRegistry::from_json(REGISTRY).unwrap();
        solve_packages(
            &registry,
            request.iter().copied(),
            SolverConfig::default(),
            |_| SearchControl::Continue,
        )
        .map(|report| report.solution)
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_with_transitive_requirement() {
        assert_eq!(
            resolve(&["core_publish"]).unwrap(),
            set(&["core_context-1.2", "core_publish-1.1", "python-3.8"])
        );
    }

    #[test]
    fn test_resolve_prefers_newest() {
        assert_eq!(
            resolve(&["core_context"]).unwrap(),
            set(&["core_context-2.0", "python-3.8"])
        );
        assert_eq!(resolve(&["python"]).unwrap(), set(&["python-3.8"]));
    }

    #[test]
    fn test_resolve_conflict_is_infeasible() {
        let registry = PackageRegistry::new(vec![
            Package::new("app").with_version(
                PackageVersion::new("app", "1.0")
                    .unwrap()
                    .with_requirement("lib==2")
                    .unwrap(),
            ),
            Package::new("lib").with_version(PackageVersion::new("lib", "1.0").unwrap()),
        ]);
        let err = solve_packages(&registry, ["app"], SolverConfig::default(), |_| {
            SearchControl::Continue
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::NoSolution {
                status: SolveStatus::Infeasible
            }
        ));
    }

    #[test]
    fn test_unknown_package() {
        assert!(matches!(resolve(&["nope"]), Err(Error::Package(_))));
    }

    #[test]
    fn test_requirement_parsing() {
        let req: Requirement = "core_context<2".parse().unwrap();
        assert_eq!(req.name, "core_context");
        assert!(req.matches(&PackageVersion::new("core_context", "1.2").unwrap()));
        assert!(!req.matches(&PackageVersion::new("core_context", "2.0").unwrap()));

        let any: Requirement = "python".parse().unwrap();
        assert_eq!(any.specifier, VersionReq::STAR);

        let exact: Requirement = "python==3.7".parse().unwrap();
        assert!(exact.matches(&PackageVersion::new("python", "3.7").unwrap()));
        assert!(!exact.matches(&PackageVersion::new("python", "3.8").unwrap()));

        assert!("python!=3.7".parse::<Requirement>().is_err());
    }

    #[test]
    fn test_version_padding_and_display() {
        assert_eq!(parse_version("3").unwrap(), Version::new(3, 0, 0));
        assert_eq!(parse_version("1.2").unwrap(), Version::new(1, 2, 0));
        let version = PackageVersion::new("python", "2.7").unwrap();
        assert_eq!(version.to_string(), "python-2.7");
        assert!(parse_version("abc").is_err());
    }

    #[test]
    fn test_scores_prefer_newest() {
        let registry = PackageRegistry::from_json(REGISTRY).unwrap();
        let model = PackageModelBuilder::new(&registry, ["python"]).build().unwrap();
        let weights: Vec<(String, i64)> = model
            .soft_terms()
            .iter()
            .filter(|t| t.name.starts_with("python_"))
            .map(|t| (t.name.clone(), t.weight))
            .collect();
        assert_eq!(
            weights,
            vec![
                ("python_2.7".to_string(), -3),
                ("python_3.7".to_string(), -2),
                ("python_3.8".to_string(), -1),
            ]
        );
    }
}
