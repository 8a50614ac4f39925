//! Output reference items and their canonical identity

use indexmap::IndexSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::coordinate::{normalize_classifier, require};
use crate::error::Result;
use crate::graph::ResolvedArtifact;

/// Namespace tag prefixed to every item spec
pub const ITEM_SPEC_PREFIX: &str = "maven$";

/// Canonical, order-stable identity of a resolved artifact.
///
/// `maven$<group>:<artifact>[:<classifier>]:<version>`; the classifier
/// segment is omitted entirely when absent or blank.
pub fn item_spec(
    group_id: &str,
    artifact_id: &str,
    classifier: Option<&str>,
    version: &str,
) -> Result<String> {
    require("groupId", group_id)?;
    require("artifactId", artifact_id)?;
    require("version", version)?;

    let mut spec = String::from(ITEM_SPEC_PREFIX);
    spec.push_str(group_id);
    spec.push(':');
    spec.push_str(artifact_id);
    if let Some(classifier) = normalize_classifier(classifier) {
        spec.push(':');
        spec.push_str(classifier);
    }
    spec.push(':');
    spec.push_str(version);
    Ok(spec)
}

fn digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+$").expect("digits regex must compile"))
}

fn parse_int(token: &str) -> Option<u32> {
    if !digits_re().is_match(token) {
        return None;
    }
    token.parse::<u32>().ok().filter(|v| *v <= i32::MAX as u32)
}

/// Tokens after the first: a leading zero makes the whole version unparseable
fn parse_component(token: &str) -> Option<u32> {
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    parse_int(token)
}

fn major_minor(version: &str) -> Option<(u32, u32)> {
    let base = version.split('-').next().unwrap_or_default();

    if !base.contains('.') && !base.starts_with('0') {
        return parse_int(base).map(|major| (major, 0));
    }

    if base.contains("..") || base.starts_with('.') || base.ends_with('.') {
        return None;
    }

    let mut tokens = base.split('.');
    let major = parse_component(tokens.next()?)?;
    let minor = match tokens.next() {
        Some(token) => parse_component(token)?,
        None => 0,
    };
    if let Some(token) = tokens.next() {
        parse_component(token)?;
    }
    // a fourth purely numeric segment is not a qualifier
    if let Some(qualifier) = tokens.next()
        && digits_re().is_match(qualifier)
    {
        return None;
    }
    Some((major, minor))
}

/// Coarse `major.minor` ordinal of a Maven version string.
///
/// Follows Maven's artifact-version parsing; versions it cannot parse
/// collapse to `0.0`.
pub fn coarse_version(version: &str) -> String {
    let (major, minor) = major_minor(version).unwrap_or((0, 0));
    format!("{}.{}", major, minor)
}

/// Per-run defaults stamped onto every item at creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDefaults {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub key_file: Option<PathBuf>,
    #[serde(default)]
    pub class_loader: Option<String>,
}

/// One reference item per distinct resolved jar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub item_spec: String,
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub version: String,

    /// Jar files backing the item
    #[serde(default)]
    pub compile: Vec<PathBuf>,
    /// Sources jar, when a best-effort lookup found one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,

    pub fallback_name: String,
    pub fallback_version: String,

    /// Must be copied into the final output
    #[serde(default)]
    pub private: bool,
    /// Visible to the compiler
    #[serde(default)]
    pub reference_output_assembly: bool,
    /// Item specs of the items this one references
    #[serde(default)]
    pub references: IndexSet<String>,

    #[serde(default)]
    pub debug: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_loader: Option<String>,
}

impl OutputItem {
    /// Build the item for a jar artifact
    pub fn from_artifact(artifact: &ResolvedArtifact, defaults: &ItemDefaults) -> Result<Self> {
        let spec = item_spec(
            &artifact.group_id,
            &artifact.artifact_id,
            artifact.classifier(),
            &artifact.version,
        )?;

        Ok(Self {
            item_spec: spec,
            group_id: artifact.group_id.clone(),
            artifact_id: artifact.artifact_id.clone(),
            classifier: artifact.classifier().map(String::from),
            version: artifact.version.clone(),
            compile: artifact.file.iter().cloned().collect(),
            source_path: None,
            fallback_name: artifact.artifact_id.clone(),
            fallback_version: coarse_version(&artifact.version),
            private: false,
            reference_output_assembly: false,
            references: IndexSet::new(),
            debug: defaults.debug,
            key_file: defaults.key_file.clone(),
            class_loader: defaults.class_loader.clone(),
        })
    }

    /// Add a reference edge. Self references and duplicates are ignored.
    pub fn add_reference(&mut self, spec: &str) -> bool {
        if spec == self.item_spec {
            return false;
        }
        self.references.insert(spec.to_string())
    }

    pub fn mark_private(&mut self) {
        self.private = true;
    }

    pub fn mark_reference_output_assembly(&mut self) {
        self.reference_output_assembly = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Coordinate;
    use crate::error::CoreError;

    #[test]
    fn test_item_spec_format() {
        assert_eq!(
            item_spec("org.slf4j", "slf4j-api", None, "2.0.9").unwrap(),
            "maven$org.slf4j:slf4j-api:2.0.9"
        );
        assert_eq!(
            item_spec("net.java", "jna", Some("jpms"), "5.13.0").unwrap(),
            "maven$net.java:jna:jpms:5.13.0"
        );
    }

    #[test]
    fn test_item_spec_blank_classifier_omitted() {
        assert_eq!(
            item_spec("g", "a", Some(" "), "1").unwrap(),
            item_spec("g", "a", None, "1").unwrap()
        );
    }

    #[test]
    fn test_item_spec_distinguishes_classifier_from_version() {
        let classified = item_spec("g", "a", Some("1.0"), "2.0").unwrap();
        let plain = item_spec("g", "a", None, "2.0").unwrap();
        assert_ne!(classified, plain);
    }

    #[test]
    fn test_item_spec_rejects_blank_identity() {
        for (g, a, v, field) in [
            ("", "a", "1", "groupId"),
            ("g", "\t", "1", "artifactId"),
            ("g", "a", "  ", "version"),
        ] {
            let err = item_spec(g, a, None, v).unwrap_err();
            match err {
                CoreError::InvalidIdentity { field: f, .. } => assert_eq!(f, field),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_coarse_version() {
        assert_eq!(coarse_version("31.1-jre"), "31.1");
        assert_eq!(coarse_version("2.0.9"), "2.0");
        assert_eq!(coarse_version("5"), "5.0");
        assert_eq!(coarse_version("1.0-SNAPSHOT"), "1.0");
        assert_eq!(coarse_version("3.12.0.Final"), "3.12");
    }

    #[test]
    fn test_coarse_version_fallbacks() {
        assert_eq!(coarse_version("RELEASE"), "0.0");
        assert_eq!(coarse_version("1.2.3.4"), "0.0");
        assert_eq!(coarse_version("1..2"), "0.0");
        assert_eq!(coarse_version("1.02"), "0.0");
        assert_eq!(coarse_version("1.2.RELEASE"), "0.0");
        assert_eq!(coarse_version(""), "0.0");
    }

    #[test]
    fn test_output_item_from_artifact() {
        let artifact = ResolvedArtifact::jar(
            &Coordinate::new("com.google.guava", "guava", "31.1-jre"),
            Some(PathBuf::from("/repo/guava-31.1-jre.jar")),
        );
        let defaults = ItemDefaults {
            debug: true,
            key_file: Some(PathBuf::from("key.snk")),
            class_loader: Some("AppDomainAssemblyClassLoader".to_string()),
        };

        let item = OutputItem::from_artifact(&artifact, &defaults).unwrap();
        assert_eq!(item.item_spec, "maven$com.google.guava:guava:31.1-jre");
        assert_eq!(item.fallback_name, "guava");
        assert_eq!(item.fallback_version, "31.1");
        assert_eq!(item.compile, vec![PathBuf::from("/repo/guava-31.1-jre.jar")]);
        assert!(item.debug);
        assert_eq!(item.class_loader.as_deref(), Some("AppDomainAssemblyClassLoader"));
        assert!(!item.private);
        assert!(!item.reference_output_assembly);
    }

    #[test]
    fn test_add_reference_skips_self_and_duplicates() {
        let artifact = ResolvedArtifact::jar(&Coordinate::new("g", "a", "1.0"), None);
        let mut item = OutputItem::from_artifact(&artifact, &ItemDefaults::default()).unwrap();

        assert!(!item.add_reference("maven$g:a:1.0"));
        assert!(item.add_reference("maven$g:b:1.0"));
        assert!(!item.add_reference("maven$g:b:1.0"));
        assert_eq!(item.references.len(), 1);
    }
}
