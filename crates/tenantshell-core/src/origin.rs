/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Tenant identifier to web origin mapping.

use crate::tenant::TenantId;

/// Domain every tenant origin hangs off.
pub const DEFAULT_SUFFIX_DOMAIN: &str = "olympicatechnologies.co.in";

/// `https://{tenant}.{suffix}` with no path, query, or trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginTemplate {
    suffix_domain: String,
}

impl OriginTemplate {
    /// Build a template for `suffix_domain`. Surrounding whitespace and dots
    /// are stripped so `".example.org."` and `"example.org"` are equivalent.
    /// A suffix that is blank after stripping falls back to the default.
    pub fn new(suffix_domain: impl AsRef<str>) -> Self {
        let suffix = suffix_domain.as_ref().trim().trim_matches('.');
        if suffix.is_empty() {
            return Self::default();
        }
        Self {
            suffix_domain: suffix.to_string(),
        }
    }

    pub fn suffix_domain(&self) -> &str {
        &self.suffix_domain
    }

    pub fn resolve(&self, tenant: &TenantId) -> String {
        format!("https://{}.{}", tenant.as_str(), self.suffix_domain)
    }
}

impl Default for OriginTemplate {
    fn default() -> Self {
        Self {
            suffix_domain: DEFAULT_SUFFIX_DOMAIN.to_string(),
        }
    }
}

/// Resolve against [`DEFAULT_SUFFIX_DOMAIN`].
pub fn resolve(tenant: &TenantId) -> String {
    OriginTemplate::default().resolve(tenant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn resolves_scenario_tenants() {
        let myschool = TenantId::parse("myschool").unwrap();
        let district = TenantId::parse("district5").unwrap();
        assert_eq!(
            resolve(&myschool),
            "https://myschool.olympicatechnologies.co.in"
        );
        assert_eq!(
            resolve(&district),
            "https://district5.olympicatechnologies.co.in"
        );
    }

    #[test]
    fn resolve_keeps_case_and_does_not_validate_labels() {
        let tenant = TenantId::parse("My_School!").unwrap();
        assert_eq!(
            resolve(&tenant),
            "https://My_School!.olympicatechnologies.co.in"
        );
    }

    #[rstest]
    #[case("staging.example.org", "staging.example.org")]
    #[case(" .staging.example.org. ", "staging.example.org")]
    #[case("", DEFAULT_SUFFIX_DOMAIN)]
    #[case("...", DEFAULT_SUFFIX_DOMAIN)]
    fn template_normalizes_suffix(#[case] configured: &str, #[case] expected: &str) {
        assert_eq!(OriginTemplate::new(configured).suffix_domain(), expected);
    }

    #[test]
    fn custom_template_resolves_against_its_suffix() {
        let template = OriginTemplate::new("staging.example.org");
        let tenant = TenantId::parse("acme").unwrap();
        assert_eq!(template.resolve(&tenant), "https://acme.staging.example.org");
    }

    proptest! {
        #[test]
        fn proptest_resolve_is_plain_concatenation(raw in "[^\\s]{1,24}") {
            let tenant = TenantId::parse(&raw).unwrap();
            let origin = resolve(&tenant);
            prop_assert_eq!(
                &origin,
                &format!("https://{}.{}", raw, DEFAULT_SUFFIX_DOMAIN)
            );
            prop_assert!(!origin.ends_with('/'));
            let tail = origin.trim_start_matches("https://");
            prop_assert!(tail.ends_with(DEFAULT_SUFFIX_DOMAIN));
        }

        #[test]
        fn proptest_resolve_is_idempotent_over_whitespace(
            label in "[a-z0-9][a-z0-9-]{0,20}",
            left in "[ \t]{0,3}",
            right in "[ \t]{0,3}",
        ) {
            let padded = TenantId::parse(&format!("{left}{label}{right}")).unwrap();
            let bare = TenantId::parse(&label).unwrap();
            prop_assert_eq!(resolve(&padded), resolve(&bare));
        }
    }
}
