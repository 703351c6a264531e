use filters::{FilterDecision, GlobOptions, PathFilter, Rule, build_filter, matches};

#[test]
fn absent_rules_match_everything() {
    assert!(matches("anything", None));
    let filter = PathFilter::default();
    assert!(filter.is_empty());
    assert_eq!(filter.decide("x/y"), FilterDecision::Allowed);
}

#[test]
fn exclude_hit_overrides_include_hit() {
    let filter = PathFilter::new(
        Some(Rule::literal(".rs").expect("literal")),
        Some(Rule::literal("generated").expect("literal")),
    );
    assert_eq!(filter.decide("src/lib.rs"), FilterDecision::Allowed);
    assert_eq!(filter.decide("src/generated/api.rs"), FilterDecision::Excluded);
    assert_eq!(filter.decide("README.md"), FilterDecision::NotIncluded);
}

#[test]
fn include_miss_is_distinct_from_exclusion() {
    let filter = PathFilter::new(Some(Rule::regex(r"\.toml$").expect("regex")), None);
    let decision = filter.decide("src");
    assert!(!decision.is_allowed());
    assert!(!decision.is_excluded());
}

#[test]
fn glob_lists_combine_with_any_semantics() {
    let filter = build_filter(
        ["**/*.rs", "**/*.toml"],
        ["target/**", "**/*.bak"],
        GlobOptions::default(),
    )
    .expect("globs");
    assert!(filter.allows("Cargo.toml"));
    assert!(filter.allows("crates/walk/src/lib.rs"));
    assert!(!filter.allows("target/debug/main.rs"));
    assert!(!filter.allows("notes.txt"));
    assert_eq!(filter.decide("Cargo.toml.bak"), FilterDecision::Excluded);
}

#[test]
fn predicate_rules_see_the_relative_path() {
    let filter = PathFilter::new(
        Some(Rule::predicate(|path| path.split('/').count() <= 2)),
        None,
    );
    assert!(filter.allows("a/b"));
    assert!(!filter.allows("a/b/c"));
}
