//! Persisted storage key layout
//!
//! Every key a provider owns starts with the provider's lowercase name, so a
//! key listing filtered by [`provider_prefix`] yields exactly that provider's
//! credential, pending state and cache entries.

use crate::types::{Provider, ResourceKind};

#[must_use]
pub fn provider_prefix(provider: Provider) -> &'static str {
    provider.as_str()
}

#[must_use]
pub fn token(provider: Provider) -> String {
    format!("{provider}Token")
}

/// Expiry instant in epoch milliseconds, or JSON `null` when the token
/// never expires
#[must_use]
pub fn token_expiry(provider: Provider) -> String {
    format!("{provider}TokenExpiry")
}

#[must_use]
pub fn refresh_token(provider: Provider) -> String {
    format!("{provider}RefreshToken")
}

/// Account label (GitHub login, Notion workspace name)
#[must_use]
pub fn username(provider: Provider) -> String {
    format!("{provider}Username")
}

#[must_use]
pub fn identity(provider: Provider) -> String {
    format!("{provider}Identity")
}

/// Pending authorization nonce
#[must_use]
pub fn oauth_state(provider: Provider) -> String {
    format!("{provider}OAuthState")
}

#[must_use]
pub fn collection(provider: Provider, kind: ResourceKind, scope: Option<&str>) -> String {
    match scope {
        Some(scope) => format!("{provider}{}_{scope}", kind.storage_segment()),
        None => format!("{provider}{}", kind.storage_segment()),
    }
}

/// Timestamp key of a collection
///
/// Scoped stamps put the scope last (`githubLabelsCachedAt_octo/hello`) so no
/// scope value can make a stamp key equal another scope's items key.
#[must_use]
pub fn cached_at(provider: Provider, kind: ResourceKind, scope: Option<&str>) -> String {
    match scope {
        Some(scope) => format!("{provider}{}CachedAt_{scope}", kind.storage_segment()),
        None => format!("{provider}{}CachedAt", kind.storage_segment()),
    }
}

/// Key prefixes shared by every scoped sub-cache of `kind`
#[must_use]
pub fn scoped_prefixes(provider: Provider, kind: ResourceKind) -> [String; 2] {
    [collection(provider, kind, Some("")), cached_at(provider, kind, Some(""))]
}

#[must_use]
pub fn recently_used(provider: Provider, kind: ResourceKind) -> String {
    format!("{provider}{}RecentlyUsed", kind.storage_segment())
}

/// Secondary index listing every scope with a sub-cache of `kind`
#[must_use]
pub fn scope_index(provider: Provider, kind: ResourceKind) -> String {
    format!("{provider}{}Scopes", kind.storage_segment())
}

/// Credential keys removed on sign-out
#[must_use]
pub fn credential_keys(provider: Provider) -> Vec<String> {
    vec![token(provider), token_expiry(provider), refresh_token(provider), username(provider)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_keys_match_extension_layout() {
        assert_eq!(token(Provider::GitHub), "githubToken");
        assert_eq!(token_expiry(Provider::Notion), "notionTokenExpiry");
        assert_eq!(refresh_token(Provider::GitHub), "githubRefreshToken");
        assert_eq!(username(Provider::Notion), "notionUsername");
        assert_eq!(oauth_state(Provider::GitHub), "githubOAuthState");
    }

    #[test]
    fn cache_keys_match_extension_layout() {
        assert_eq!(recently_used(Provider::GitHub, ResourceKind::Repos), "githubReposRecentlyUsed");
        assert_eq!(scope_index(Provider::GitHub, ResourceKind::Labels), "githubLabelsScopes");
        assert_eq!(
            cached_at(Provider::Notion, ResourceKind::Databases, None),
            "notionDatabasesCachedAt"
        );
        assert_eq!(
            cached_at(Provider::GitHub, ResourceKind::Labels, Some("octo/hello")),
            "githubLabelsCachedAt_octo/hello"
        );
        assert_eq!(
            scoped_prefixes(Provider::GitHub, ResourceKind::Labels),
            ["githubLabels_".to_string(), "githubLabelsCachedAt_".to_string()]
        );
    }

    #[test]
    fn scoped_stamp_never_equals_another_scopes_items() {
        let kind = ResourceKind::Labels;
        for scope in ["octo/a", "octo/aCachedAt", "octo/a_cachedAt", "CachedAt_octo/a", ""] {
            let stamp = cached_at(Provider::GitHub, kind, Some(scope));
            for other in ["octo/a", "octo/aCachedAt", "octo/a_cachedAt", "CachedAt_octo/a", ""] {
                assert_ne!(stamp, collection(Provider::GitHub, kind, Some(other)));
            }
            assert_ne!(stamp, collection(Provider::GitHub, kind, None));
            assert_ne!(stamp, scope_index(Provider::GitHub, kind));
            assert_ne!(stamp, recently_used(Provider::GitHub, kind));
        }
    }

    #[test]
    fn every_key_carries_the_provider_prefix() {
        for provider in Provider::ALL {
            let prefix = provider_prefix(provider);
            assert!(credential_keys(provider).iter().all(|k| k.starts_with(prefix)));
            assert!(identity(provider).starts_with(prefix));
            assert!(collection(provider, ResourceKind::Labels, Some("a/b")).starts_with(prefix));
        }
    }
}
