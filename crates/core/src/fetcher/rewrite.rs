//! Share-link URL normalization.

use reqwest::Url;

use super::config::RewriteRule;

/// Rewrites share-link URLs into their direct-download form.
///
/// A rule applies when the URL host contains the rule's domain substring.
/// Only query segments exactly equal to `param_match` are replaced; the rest
/// of the URL is kept as is. URLs that match no rule, or that do not parse,
/// are returned unchanged.
pub fn normalize_url(url: &str, rules: &[RewriteRule]) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let Some(host) = parsed.host_str().map(str::to_ascii_lowercase) else {
        return url.to_string();
    };
    let Some(query) = parsed.query().map(str::to_string) else {
        return url.to_string();
    };

    let mut segments: Vec<String> = query.split('&').map(String::from).collect();
    let mut changed = false;

    for rule in rules {
        if !host.contains(&rule.domain.to_ascii_lowercase()) {
            continue;
        }
        for segment in segments.iter_mut() {
            if *segment == rule.param_match {
                *segment = rule.replacement.clone();
                changed = true;
            }
        }
    }

    if !changed {
        return url.to_string();
    }

    parsed.set_query(Some(&segments.join("&")));
    parsed.to_string()
}
