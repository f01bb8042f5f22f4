//! Plugin parameter resolution
//!
//! The invoking toolchain hands the plugin a single comma-separated parameter
//! string. Tokens are either bare names (boolean switches, or an explicit
//! zero value for any other recognized key), `M`-prefixed package-map
//! entries, or `name=value` assignments.
//!
//! Resolution is all-or-nothing: tokens are applied to a scratch copy of the
//! baseline configuration and only the fully-resolved copy is returned, so a
//! malformed later token can never leave earlier assignments half-applied.

use swagger_gen_common::{Config, PluginError, Result};

/// Bare names on this list mean `name=true`; every other bare name assigns
/// the key's zero value.
const BOOL_SWITCHES: [&str; 6] = [
    "allow_delete_body",
    "allow_merge",
    "allow_save",
    "wrap_code",
    "allow_repeated_fields_in_body",
    "include_package_in_tags",
];

/// Marker prefix for package-map entries: `Mpath/to.proto=go/import/path`
const PKG_MAP_MARKER: char = 'M';

/// Resolve a parameter string on top of the flag-derived baseline.
///
/// Returns the resolved configuration plus the package-map entries in the
/// order they appeared. The baseline is never mutated.
pub fn resolve(param: Option<&str>, base: &Config) -> Result<(Config, Vec<(String, String)>)> {
    let mut config = base.clone();
    let mut pkg_map = Vec::new();

    let Some(param) = param else {
        return Ok((config, pkg_map));
    };
    if param.is_empty() {
        return Ok((config, pkg_map));
    }

    for token in param.split(',') {
        match token.split_once('=') {
            None => {
                let value = if BOOL_SWITCHES.contains(&token) {
                    "true"
                } else {
                    ""
                };
                config
                    .set(token, value)
                    .map_err(|e| PluginError::Parse(format!("cannot set flag {token}: {e}")))?;
            }
            Some((name, value)) => {
                if let Some(path) = name.strip_prefix(PKG_MAP_MARKER) {
                    pkg_map.push((path.to_string(), value.to_string()));
                } else {
                    config
                        .set(name, value)
                        .map_err(|e| PluginError::Parse(format!("cannot set flag {token}: {e}")))?;
                }
            }
        }
    }

    Ok((config, pkg_map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use swagger_gen_common::MergeStrategy;

    #[test]
    fn test_missing_or_empty_param_keeps_baseline() {
        let base = Config::default();
        let (config, pkg_map) = resolve(None, &base).unwrap();
        assert_eq!(config, base);
        assert!(pkg_map.is_empty());

        let (config, _) = resolve(Some(""), &base).unwrap();
        assert_eq!(config, base);
    }

    #[test]
    fn test_bare_boolean_switches_mean_true() {
        let (config, _) = resolve(
            Some("allow_delete_body,allow_merge,allow_save,wrap_code,allow_repeated_fields_in_body,include_package_in_tags"),
            &Config::default(),
        )
        .unwrap();
        assert!(config.allow_delete_body);
        assert!(config.allow_merge);
        assert!(config.allow_save);
        assert!(config.wrap_code);
        assert!(config.allow_repeated_fields_in_body);
        assert!(config.include_package_in_tags);
    }

    #[test]
    fn test_bare_recognized_name_sets_zero_value() {
        // distinct from leaving the default untouched
        let (config, _) = resolve(Some("merge_file_name"), &Config::default()).unwrap();
        assert_eq!(config.merge_file_name, "");
    }

    #[test]
    fn test_bare_unknown_name_is_an_error() {
        let err = resolve(Some("no_such_switch"), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("no_such_switch"));
    }

    #[test]
    fn test_keyed_assignments_land_in_config() {
        let (config, pkg_map) = resolve(
            Some("import_prefix=github.com/acme,yapi_merge=merge,merge_file_name=docs"),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(config.import_prefix, "github.com/acme");
        assert_eq!(config.yapi_merge, Some(MergeStrategy::Merge));
        assert_eq!(config.merge_file_name, "docs");
        assert!(pkg_map.is_empty());
    }

    #[test]
    fn test_marker_tokens_land_only_in_pkg_map() {
        let (config, pkg_map) = resolve(
            Some("Mgoogle/api/http.proto=github.com/acme/api,allow_merge"),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(
            pkg_map,
            vec![(
                "google/api/http.proto".to_string(),
                "github.com/acme/api".to_string()
            )]
        );
        // the marker token is not re-parsed as a configuration key
        assert_eq!(config.import_prefix, "");
        assert!(config.allow_merge);
    }

    #[test]
    fn test_marker_wins_over_matching_key_prefix() {
        // "Mmerge_file_name=x" is a package-map entry, not a config key
        let (config, pkg_map) =
            resolve(Some("Mmerge_file_name=x"), &Config::default()).unwrap();
        assert_eq!(config.merge_file_name, "apidocs");
        assert_eq!(pkg_map[0].0, "merge_file_name");
    }

    #[test]
    fn test_invalid_late_token_leaves_baseline_untouched() {
        let base = Config::default();
        let err = resolve(
            Some("allow_merge,import_prefix=acme,definitely_unknown=1"),
            &base,
        )
        .unwrap_err();
        assert!(err.to_string().contains("definitely_unknown"));
        // two-phase resolution: nothing was applied to the baseline
        assert_eq!(base, Config::default());
    }

    #[test]
    fn test_value_with_equals_sign_is_preserved() {
        let (config, _) = resolve(
            Some("import_prefix=a=b"),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(config.import_prefix, "a=b");
    }
}
