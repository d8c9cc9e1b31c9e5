//! Site configuration composition tests
//!
//! Each test composes a site configuration from shared defaults and an
//! override and checks the merged result.

use ifla_sites::config::{ComposeError, MergeError, SharedDefaults, MAX_MERGE_DEPTH};
use ifla_sites::{ConfigComposer, DeploymentMode, SiteDescriptor, SiteError, SiteRegistry};
use serde_json::{json, Value};

fn composer(mode: DeploymentMode) -> ConfigComposer<'static> {
    ConfigComposer::new(SiteRegistry::builtin(), mode)
}

#[test]
fn test_override_wins_for_base_url() {
    let config = composer(DeploymentMode::Local)
        .compose("isbdm", &json!({}), &json!({"baseUrl": "/custom/"}))
        .unwrap();

    assert_eq!(config.base_url(), Some("/custom/"));
    assert_eq!(config.url(), Some("http://localhost:3001"));
}

#[test]
fn test_presets_replaced_not_concatenated() {
    let shared = json!({"presets": [{"docs": {"showLastUpdateTime": true}}]});
    let overrides = json!({"presets": [{"docs": {"showLastUpdateTime": false}}]});

    let config = composer(DeploymentMode::Local)
        .compose("isbdm", &shared, &overrides)
        .unwrap();

    let presets = config.config["presets"].as_array().unwrap();
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[0]["docs"]["showLastUpdateTime"], false);
}

#[test]
fn test_computed_fields_present() {
    let config = composer(DeploymentMode::Prod)
        .compose("unimarc", &SharedDefaults::default().to_value(), &json!({}))
        .unwrap();

    assert_eq!(config.url(), Some("https://iflastandards.info"));
    assert_eq!(config.base_url(), Some("/unimarc/"));
    assert_eq!(config.get_str("customFields.siteId"), Some("unimarc"));

    let inter_site = config.inter_site().unwrap();
    assert_eq!(inter_site.len(), SiteRegistry::builtin().len());
    assert_eq!(inter_site["portal"], "https://iflastandards.info/");
    assert_eq!(inter_site["isbdm"], "https://iflastandards.info/isbdm/");
}

#[test]
fn test_shared_keys_carried_and_nested_objects_merged() {
    let shared = json!({
        "title": "IFLA Standards",
        "themeConfig": {
            "navbar": {"hideOnScroll": true, "items": [{"label": "Docs"}, {"label": "Blog"}]}
        },
        "customFields": {"vocabularyDefaults": {"prefix": "isbdm"}}
    });
    let overrides = json!({
        "themeConfig": {"navbar": {"items": [{"label": "Elements"}]}}
    });

    let config = composer(DeploymentMode::Local)
        .compose("isbdm", &shared, &overrides)
        .unwrap();

    assert_eq!(config.get_str("title"), Some("IFLA Standards"));
    assert_eq!(config.get_bool("themeConfig.navbar.hideOnScroll"), Some(true));
    assert_eq!(
        config.get("themeConfig.navbar.items"),
        Some(&json!([{"label": "Elements"}]))
    );
    // Shared custom fields survive next to the computed ones
    assert_eq!(
        config.get_str("customFields.vocabularyDefaults.prefix"),
        Some("isbdm")
    );
    assert_eq!(config.get_str("customFields.siteId"), Some("isbdm"));
}

#[test]
fn test_shared_url_replaced_by_computed() {
    let shared = json!({"url": "https://stale.example.org", "baseUrl": "/stale/"});
    let config = composer(DeploymentMode::Preview)
        .compose("fr", &shared, &json!({}))
        .unwrap();

    assert_eq!(config.url(), Some("https://iflastandards.github.io/standards-dev"));
    assert_eq!(config.base_url(), Some("/fr/"));
}

#[test]
fn test_override_can_replace_inter_site_entry() {
    let overrides = json!({
        "customFields": {"interSite": {"portal": "https://portal.example.org/"}}
    });
    let config = composer(DeploymentMode::Local)
        .compose("lrm", &json!({}), &overrides)
        .unwrap();

    let inter_site = config.inter_site().unwrap();
    assert_eq!(inter_site["portal"], "https://portal.example.org/");
    assert_eq!(inter_site["lrm"], "http://localhost:3002/lrm/");
}

#[test]
fn test_inter_site_keeps_registry_order() {
    let config = composer(DeploymentMode::Preview)
        .compose("isbd", &SharedDefaults::default().to_value(), &json!({}))
        .unwrap();

    let keys: Vec<_> = config.config["customFields"]["interSite"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, SiteRegistry::builtin().keys().collect::<Vec<_>>());
}

#[test]
fn test_shared_presets_must_be_array() {
    let shared = json!({"presets": {"docs": {"showLastUpdateTime": true}}});
    let err = composer(DeploymentMode::Local)
        .compose("isbdm", &shared, &json!({}))
        .unwrap_err();

    assert!(matches!(err, ComposeError::Validation(ref e) if e.field == "presets"));
}

#[test]
fn test_unknown_site_propagates() {
    let err = composer(DeploymentMode::Local)
        .compose("doesNotExist", &json!({}), &json!({}))
        .unwrap_err();

    assert!(matches!(
        err,
        ComposeError::Site(SiteError::UnknownSite { ref key, .. }) if key == "doesNotExist"
    ));
}

#[test]
fn test_runaway_override_fails_with_merge_error() {
    let depth = MAX_MERGE_DEPTH + 5;
    let chain = |leaf: Value| (0..depth).fold(leaf, |inner, _| json!({ "nested": inner }));

    let shared = json!({"themeConfig": chain(json!({"a": 1}))});
    let overrides = json!({"themeConfig": chain(json!({"a": 2}))});

    let err = composer(DeploymentMode::Local)
        .compose("portal", &shared, &overrides)
        .unwrap_err();

    assert!(matches!(
        err,
        ComposeError::Merge(MergeError::DepthExceeded { limit, .. }) if limit == MAX_MERGE_DEPTH
    ));
}

#[test]
fn test_every_site_composes_in_every_mode() {
    let shared = SharedDefaults::default().to_value();

    for mode in DeploymentMode::ALL {
        let site_composer = composer(mode);
        for key in SiteRegistry::builtin().keys() {
            let config = site_composer.compose(key, &shared, &json!({})).unwrap();
            assert_eq!(config.mode, mode);
            assert_eq!(config.site_id, key);
        }
    }
}

#[test]
fn test_custom_registry() {
    let registry = SiteRegistry::new(vec![
        SiteDescriptor::new("portal", "", 4000),
        SiteDescriptor::new("manual", "manual", 4001),
    ])
    .unwrap();

    let config = ConfigComposer::new(&registry, DeploymentMode::Local)
        .compose("manual", &json!({}), &json!({}))
        .unwrap();

    assert_eq!(config.url(), Some("http://localhost:4001"));
    assert_eq!(config.inter_site().unwrap().len(), 2);
}
