use super::common::{tools, FakeRegistry};
use crate::error::ScaffoldError;
use crate::manifest::Manifest;
use crate::resolver::{
    canonicalize_npm_range, max_satisfying, satisfies, split_request, NpmRange, Resolution,
    ToolVersions, VersionResolver,
};
use semver::{Version, VersionReq};
use std::str::FromStr;

#[test]
fn canonicalize_wildcards_and_bare_versions() {
    assert_eq!(canonicalize_npm_range("*"), "*");
    assert_eq!(canonicalize_npm_range(""), "*");
    assert_eq!(canonicalize_npm_range("latest"), "*");
    assert_eq!(canonicalize_npm_range("1.x"), "1.x");
    assert_eq!(canonicalize_npm_range("1.2.X"), "1.2.x");
    assert_eq!(canonicalize_npm_range("1.2.3"), "=1.2.3");
    assert_eq!(canonicalize_npm_range("v2.0.0"), "=2.0.0");
}

#[test]
fn canonicalize_hyphen_and_spaced_comparators() {
    assert_eq!(canonicalize_npm_range("1.2.3 - 2.3.4"), ">=1.2.3, <=2.3.4");
    assert_eq!(canonicalize_npm_range(">= 2.1.2 < 3.0.0"), ">=2.1.2, <3.0.0");
    assert_eq!(canonicalize_npm_range("^3.1.0 <4"), "^3.1.0, <4");
    assert_eq!(canonicalize_npm_range("^8.0.0-0"), "^8.0.0-0");
    assert!(VersionReq::parse(&canonicalize_npm_range(">=1.0.0 <2")).is_ok());
}

#[test]
fn all_wildcard_parts_mean_any_version() {
    assert_eq!(canonicalize_npm_range("x.x.x"), "*");
    assert_eq!(canonicalize_npm_range("*.*.*"), "*");
    assert_eq!(canonicalize_npm_range("X.x"), "*");
    assert_eq!(canonicalize_npm_range("v*.x"), "*");
    assert!(satisfies("6.26.3", "x.x.x"));
    assert!(satisfies("0.1.0", "*.*"));
}

#[test]
fn npm_range_handles_or_sets() {
    let range = NpmRange::from_str("^6.0.0 || ^7.0.0").unwrap();
    assert!(range.matches(&Version::parse("6.26.3").unwrap()));
    assert!(range.matches(&Version::parse("7.1.0").unwrap()));
    assert!(!range.matches(&Version::parse("8.0.0").unwrap()));
    assert!(NpmRange::from_str("not a range").is_err());
}

#[test]
fn exact_npm_version_is_not_a_caret() {
    assert!(satisfies("1.2.3", "1.2.3"));
    assert!(!satisfies("1.4.0", "1.2.3"));
    assert!(satisfies("1.2.9", "1.2"));
    assert!(!satisfies("1.3.0", "1.2"));
}

#[test]
fn satisfies_treats_prereleases_like_npm() {
    assert!(satisfies("8.0.0-beta.4", "^8.0.0-0"));
    assert!(satisfies("8.2.1", "^8.0.0-0"));
    assert!(!satisfies("9.0.0-beta.1", "^8.0.0-0"));
    assert!(!satisfies("7.0.0-bridge.0", "^6.0.0"));
    assert!(!satisfies("garbage", "^6.0.0"));
}

#[test]
fn max_satisfying_picks_highest_match() {
    let versions: Vec<Version> = ["6.25.0", "6.26.3", "7.0.0-bridge.0"]
        .iter()
        .map(|v| Version::parse(v).unwrap())
        .collect();
    let range = NpmRange::from_str("^6.0.0").unwrap();
    assert_eq!(max_satisfying(&versions, &range).map(|v| v.to_string()), Some("6.26.3".into()));
    let none = NpmRange::from_str("^5.0.0").unwrap();
    assert!(max_satisfying(&versions, &none).is_none());
}

#[test]
fn split_request_keeps_scoped_names() {
    assert_eq!(split_request("react"), ("react", None));
    assert_eq!(split_request("react@^16.0.0"), ("react", Some("^16.0.0")));
    assert_eq!(split_request("@babel/core"), ("@babel/core", None));
    assert_eq!(split_request("@babel/core@^7"), ("@babel/core", Some("^7")));
    assert_eq!(split_request("lodash@"), ("lodash", None));
}

#[test]
fn tool_versions_lookup_rules() {
    let tools = tools("5.0.0");
    assert_eq!(tools.current_version("@scaffold/cli"), Some("5.0.0"));
    assert_eq!(tools.current_version("@scaffold/react"), Some("5.0.0"));
    assert_eq!(tools.current_version("@scaffold/angular"), None);
    assert_eq!(tools.current_version("react"), None);
}

#[test]
fn tool_versions_from_manifest_and_builtin() {
    let mut own = Manifest::new("@scaffold/cli", "3.2.1");
    own.dev_dependencies.insert("@scaffold/html".into(), "3.2.1".into());
    let tools = ToolVersions::from_manifest(&own, "scaffold").unwrap();
    assert_eq!(tools.self_version, "3.2.1");
    assert_eq!(tools.current_version("@scaffold/html"), Some("3.2.1"));

    let builtin = ToolVersions::builtin().unwrap();
    assert_eq!(builtin.self_name, "@scaffold/cli");
    assert!(!builtin.pinned.is_empty());

    let nameless = Manifest::default();
    assert!(ToolVersions::from_manifest(&nameless, "scaffold").is_err());
}

#[test]
fn unknown_package_takes_latest_regardless_of_constraint() {
    let registry = FakeRegistry::new().publish("react", &["15.6.2", "16.0.0", "16.8.6"]);
    let tools = tools("5.0.0");
    let resolver = VersionResolver::new(&registry, &tools);
    assert_eq!(resolver.resolve("react", None).unwrap(), Resolution::Resolved("^16.8.6".into()));
    assert_eq!(
        resolver.resolve("react", Some("^15.0.0")).unwrap(),
        Resolution::Resolved("^15.6.2".into())
    );
}

#[test]
fn newer_current_version_wins() {
    let registry = FakeRegistry::new().publish("@scaffold/cli", &["4.0.0", "4.1.0"]);
    let tools = tools("5.0.0");
    let resolver = VersionResolver::new(&registry, &tools);
    assert_eq!(resolver.resolve("@scaffold/cli", None).unwrap().version(), "^5.0.0");
    assert_eq!(resolver.resolve("@scaffold/cli", Some(">=4.0.0")).unwrap().version(), "^5.0.0");
}

#[test]
fn current_outside_constraint_loses() {
    let registry = FakeRegistry::new().publish("@scaffold/cli", &["4.0.0", "4.1.0"]);
    let tools = tools("5.0.0");
    let resolver = VersionResolver::new(&registry, &tools);
    assert_eq!(resolver.resolve("@scaffold/cli", Some("^4.0.0")).unwrap().version(), "^4.1.0");
}

#[test]
fn latest_wins_ties_and_prerelease_current() {
    let registry = FakeRegistry::new().publish("@scaffold/react", &["5.0.0"]);
    let release = tools("5.0.0");
    let resolver = VersionResolver::new(&registry, &release);
    assert_eq!(resolver.resolve("@scaffold/react", None).unwrap().version(), "^5.0.0");

    let registry = FakeRegistry::new().publish("@scaffold/cli", &["5.0.0"]);
    let beta = tools("5.0.0-beta.1");
    let resolver = VersionResolver::new(&registry, &beta);
    assert_eq!(resolver.resolve("@scaffold/cli", None).unwrap().version(), "^5.0.0");
}

#[test]
fn pinned_range_is_compared_by_its_version() {
    let registry = FakeRegistry::new().publish("@scaffold/vue", &["5.0.2"]);
    let tools = tools("5.0.0");
    let resolver = VersionResolver::new(&registry, &tools);
    assert_eq!(resolver.resolve("@scaffold/vue", None).unwrap().version(), "^5.1.0");
}

#[test]
fn failed_lookup_falls_back_to_current_verbatim() {
    let registry = FakeRegistry::new().failing("@scaffold/vue").failing("@scaffold/cli");
    let tools = tools("5.0.0");
    let resolver = VersionResolver::new(&registry, &tools);

    match resolver.resolve("@scaffold/vue", None).unwrap() {
        Resolution::Fallback { version, cause } => {
            assert_eq!(version, "^5.1.0");
            assert!(cause.contains("registry unreachable"));
        }
        other => panic!("expected fallback, got {other:?}"),
    }
    assert_eq!(resolver.resolve_version("@scaffold/cli", None).unwrap(), "5.0.0");
}

#[test]
fn failed_lookup_without_current_is_fatal() {
    let registry = FakeRegistry::new().failing("left-pad");
    let tools = tools("5.0.0");
    let resolver = VersionResolver::new(&registry, &tools);

    let err = resolver.resolve("left-pad", None).unwrap_err();
    match err.downcast_ref::<ScaffoldError>() {
        Some(ScaffoldError::Resolution { name, .. }) => assert_eq!(name, "left-pad"),
        other => panic!("expected resolution error, got {other:?}"),
    }
    // family member without a pinned entry has no fallback either
    assert!(resolver.resolve("@scaffold/angular", None).is_err());
}

#[test]
fn resolve_many_keeps_input_order() {
    let registry = FakeRegistry::new()
        .publish("react", &["16.8.6"])
        .publish("@scaffold/cli", &["4.1.0"])
        .publish("lodash", &["4.17.21", "4.17.20"]);
    let tools = tools("5.0.0");
    let resolver = VersionResolver::new(&registry, &tools);

    let versions = resolver.resolve_many(&["react", "@scaffold/cli", "lodash"]).unwrap();
    assert_eq!(versions, vec!["^16.8.6", "^5.0.0", "^4.17.21"]);
    assert_eq!(registry.lookup_count(), 3);

    let specs = resolver.resolve_specifiers(&["lodash", "react"]).unwrap();
    assert_eq!(specs, vec!["lodash@^4.17.21", "react@^16.8.6"]);
}

#[test]
fn resolve_many_fails_when_any_lookup_is_fatal() {
    let registry = FakeRegistry::new().publish("react", &["16.8.6"]).failing("left-pad");
    let tools = tools("5.0.0");
    let resolver = VersionResolver::new(&registry, &tools);
    assert!(resolver.resolve_many(&["react", "left-pad"]).is_err());
}

#[test]
fn versioned_requests_pass_their_constraint() {
    let registry = FakeRegistry::new().publish("@babel/core", &["6.26.0", "7.4.0"]);
    let tools = tools("5.0.0");
    let resolver = VersionResolver::new(&registry, &tools);
    let specs = resolver.resolve_versioned_packages(&["@babel/core@^6", "@babel/core"]).unwrap();
    assert_eq!(specs, vec!["@babel/core@^6.26.0", "@babel/core@^7.4.0"]);
}
