//! # Tenant Router
//!
//! Rewrites incoming requests to tenant-scoped routes based on the `Host`
//! header. The rewrite itself is a pure function of `(host, path)`; the axum
//! middleware at the bottom applies it to the request URI before routing.
//!
//! Ordered rules (first match wins):
//!
//! 1. Internal/static/asset paths pass through unchanged.
//! 2. Platform marketing domain + `/` rewrites to the shared landing page.
//! 3. `/signup` rewrites to `/{host}/signup`.
//! 4. `/thank-you-signup` rewrites to `/{host}/thank-you-signup`.
//! 5. `/` on any other host rewrites to `/{host}` (tenant directory home).
//! 6. Anything else rewrites to `/{host}{path}` (slug-based detail pages).

use std::sync::LazyLock;

use axum::{
    extract::{Request, State},
    http::{Uri, header::HOST},
    middleware::Next,
    response::Response,
};
use regex::Regex;

use crate::config::AppConfig;
use crate::server::AppState;

/// Path prefixes that are never tenant-scoped: API routes, docs, static
/// assets, and the health probe.
const PASSTHROUGH_PREFIXES: &[&str] = &["/api", "/docs", "/openapi.json", "/static", "/healthz"];

/// File-extension heuristic for static assets (`/favicon.ico`, `/logo.png`).
/// Known imprecision: an extensionless-looking path such as `/v1.2` would
/// also pass through; accepted limitation.
static FILE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[^/]+$").expect("static pattern compiles"));

/// Outcome of applying the rewrite rules to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Let the request proceed with its original path.
    Unchanged,
    /// Route the request to this internal path instead.
    To(String),
}

/// Apply the ordered rewrite rules to `(host, path)`.
///
/// A missing or malformed host yields no tenant match: the tenant-scoped
/// rules cannot fire and the path is left for downstream routing (which has
/// no `/` route, so the request 404s).
pub fn rewrite(config: &AppConfig, host: Option<&str>, path: &str) -> Rewrite {
    // Rule 1: assets and internal routes proceed untouched regardless of host.
    if PASSTHROUGH_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
        || FILE_EXTENSION.is_match(path)
    {
        return Rewrite::Unchanged;
    }

    let Some(host) = host.filter(|h| is_plausible_host(h)) else {
        return Rewrite::Unchanged;
    };

    // Rule 2: the platform's own domain gets the shared landing page.
    if config.is_platform_host(host) && path == "/" {
        return Rewrite::To("/landing".to_string());
    }

    // Rules 3-4: host-relative signup flow pages.
    if path == "/signup" || path == "/thank-you-signup" {
        return Rewrite::To(format!("/{}{}", host, path));
    }

    // Rule 5: tenant directory home.
    if path == "/" {
        return Rewrite::To(format!("/{}", host));
    }

    // Rule 6: catch-all, enables slug-based detail pages.
    Rewrite::To(format!("/{}{}", host, path))
}

/// Reject hosts that could not come from a well-formed Host header and would
/// corrupt the rewritten path.
fn is_plausible_host(host: &str) -> bool {
    !host.is_empty()
        && !host.contains('/')
        && !host.contains('\\')
        && !host.chars().any(|c| c.is_whitespace())
}

/// Axum middleware applying the tenant rewrite to the request URI.
///
/// The query string survives the rewrite. If the rewritten path fails to
/// parse back into a URI the request proceeds unrewritten; the router 404s it
/// downstream, matching the unknown-tenant failure mode.
pub async fn tenant_rewrite_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    if let Rewrite::To(new_path) = rewrite(&state.config, host.as_deref(), request.uri().path()) {
        tracing::debug!(
            host = host.as_deref().unwrap_or("<none>"),
            from = request.uri().path(),
            to = %new_path,
            "Rewrote request to tenant-scoped route"
        );

        let path_and_query = match request.uri().query() {
            Some(query) => format!("{}?{}", new_path, query),
            None => new_path,
        };

        let mut parts = request.uri().clone().into_parts();
        match path_and_query.parse() {
            Ok(pq) => {
                parts.path_and_query = Some(pq);
                if let Ok(uri) = Uri::from_parts(parts) {
                    *request.uri_mut() = uri;
                }
            }
            Err(err) => {
                tracing::warn!(%err, "Rewritten path failed to parse; leaving request untouched");
            }
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::default()
    }

    #[test]
    fn asset_paths_pass_through_on_any_host() {
        let cfg = config();
        for path in ["/favicon.ico", "/logo.png", "/static/app.css", "/api/signup"] {
            assert_eq!(rewrite(&cfg, Some("plumbers.example.com"), path), Rewrite::Unchanged);
            assert_eq!(rewrite(&cfg, Some("locallist.uk"), path), Rewrite::Unchanged);
        }
    }

    #[test]
    fn platform_root_goes_to_landing() {
        let cfg = config();
        assert_eq!(
            rewrite(&cfg, Some("locallist.uk"), "/"),
            Rewrite::To("/landing".to_string())
        );
        assert_eq!(
            rewrite(&cfg, Some("localhost:3000"), "/"),
            Rewrite::To("/landing".to_string())
        );
        assert_eq!(
            rewrite(&cfg, Some("preview.vercel.app"), "/"),
            Rewrite::To("/landing".to_string())
        );
    }

    #[test]
    fn tenant_root_goes_to_directory_home() {
        let cfg = config();
        assert_eq!(
            rewrite(&cfg, Some("plumbers.example.com"), "/"),
            Rewrite::To("/plumbers.example.com".to_string())
        );
    }

    #[test]
    fn signup_paths_are_host_scoped() {
        let cfg = config();
        assert_eq!(
            rewrite(&cfg, Some("plumbers.example.com"), "/signup"),
            Rewrite::To("/plumbers.example.com/signup".to_string())
        );
        assert_eq!(
            rewrite(&cfg, Some("plumbers.example.com"), "/thank-you-signup"),
            Rewrite::To("/plumbers.example.com/thank-you-signup".to_string())
        );
    }

    #[test]
    fn signup_rule_applies_even_on_the_platform_host() {
        // Rule 2 only claims the root path; any other path on the platform
        // domain falls through to the host-scoped rules.
        let cfg = config();
        assert_eq!(
            rewrite(&cfg, Some("locallist.uk"), "/signup"),
            Rewrite::To("/locallist.uk/signup".to_string())
        );
    }

    #[test]
    fn other_paths_are_prefixed_with_the_host() {
        let cfg = config();
        assert_eq!(
            rewrite(&cfg, Some("plumbers.example.com"), "/joes-cafe-1234"),
            Rewrite::To("/plumbers.example.com/joes-cafe-1234".to_string())
        );
    }

    #[test]
    fn missing_or_malformed_host_is_left_alone() {
        let cfg = config();
        assert_eq!(rewrite(&cfg, None, "/"), Rewrite::Unchanged);
        assert_eq!(rewrite(&cfg, Some(""), "/"), Rewrite::Unchanged);
        assert_eq!(rewrite(&cfg, Some("bad host"), "/"), Rewrite::Unchanged);
        assert_eq!(rewrite(&cfg, Some("evil/../host"), "/x"), Rewrite::Unchanged);
    }

    #[test]
    fn dotted_path_segment_passes_through() {
        // The file-extension heuristic treats `/v1.2` as an asset; accepted
        // limitation.
        let cfg = config();
        assert_eq!(
            rewrite(&cfg, Some("plumbers.example.com"), "/v1.2"),
            Rewrite::Unchanged
        );
    }
}
