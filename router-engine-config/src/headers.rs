//! Which client headers a data source forwards.
//!
//! Header rules are configured per router, either for all subgraphs or for a named subgraph.
//! A data source is matched to subgraphs by URL, and the `propagate` rules that apply to it are
//! turned into a list of header names and a list of header name patterns.

use displaydoc::Display;
use regex::Regex;
use thiserror::Error;

use crate::configuration::HeaderRuleOperation;
use crate::configuration::HeaderRules;
use crate::configuration::RequestHeaderRule;
use crate::source::Subgraph;

/// Error types for header rules
#[derive(Debug, Display, Error)]
#[non_exhaustive]
pub enum HeaderRuleError {
    /// error compiling regular expression "{pattern}" in header rule: {source}
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },
    /// invalid header propagation rule, no header name nor regular expression
    MissingTarget,
}

/// Client headers forwarded to one data source.
#[derive(Debug, Clone, Default)]
pub struct ForwardedHeaders {
    pub names: Vec<String>,
    pub regexes: Vec<Regex>,
}

/// Computes the client headers forwarded to a data source.
pub trait HeaderPropagation: Send + Sync {
    fn forwarded_headers(
        &self,
        rules: &HeaderRules,
        subgraphs: &[Subgraph],
        url: &str,
    ) -> Result<ForwardedHeaders, HeaderRuleError>;
}

/// Applies the `all` rules, then the rules of every subgraph routed to the data source URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHeaderPropagation;

impl HeaderPropagation for DefaultHeaderPropagation {
    fn forwarded_headers(
        &self,
        rules: &HeaderRules,
        subgraphs: &[Subgraph],
        url: &str,
    ) -> Result<ForwardedHeaders, HeaderRuleError> {
        propagated_headers(fetch_url_rules(rules, subgraphs, url))
    }
}

/// The rules that apply to requests sent to `url`.
pub fn fetch_url_rules<'a>(
    rules: &'a HeaderRules,
    subgraphs: &[Subgraph],
    url: &str,
) -> Vec<&'a RequestHeaderRule> {
    let mut applicable: Vec<&RequestHeaderRule> = rules
        .all
        .iter()
        .flat_map(|location| location.request.iter())
        .collect();
    for subgraph in subgraphs.iter().filter(|s| s.routing_url == url) {
        if let Some(location) = rules.subgraphs.get(&subgraph.name) {
            applicable.extend(location.request.iter());
        }
    }
    applicable
}

/// Header names and name patterns of the `propagate` rules.
pub fn propagated_headers<'a>(
    rules: impl IntoIterator<Item = &'a RequestHeaderRule>,
) -> Result<ForwardedHeaders, HeaderRuleError> {
    let mut forwarded = ForwardedHeaders::default();
    for rule in rules {
        match rule.op {
            HeaderRuleOperation::Propagate => {
                match (non_empty(&rule.matching), non_empty(&rule.named)) {
                    (Some(pattern), _) => {
                        let regex =
                            Regex::new(pattern).map_err(|source| HeaderRuleError::InvalidRegex {
                                pattern: pattern.to_string(),
                                source,
                            })?;
                        forwarded.regexes.push(regex);
                    }
                    (None, Some(named)) => forwarded.names.push(named.to_string()),
                    (None, None) => return Err(HeaderRuleError::MissingTarget),
                }
            }
            HeaderRuleOperation::Set => {}
        }
    }
    Ok(forwarded)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use maplit::hashmap;

    use super::*;
    use crate::configuration::HeaderLocation;

    fn subgraph(name: &str, routing_url: &str) -> Subgraph {
        Subgraph {
            id: name.to_string(),
            name: name.to_string(),
            routing_url: routing_url.to_string(),
        }
    }

    fn rules() -> HeaderRules {
        HeaderRules {
            all: Some(HeaderLocation {
                request: vec![RequestHeaderRule::propagate_named("x-all")],
            }),
            subgraphs: hashmap! {
                "accounts".to_string() => HeaderLocation {
                    request: vec![RequestHeaderRule::propagate_matching("^x-account-.*")],
                },
                "products".to_string() => HeaderLocation {
                    request: vec![RequestHeaderRule::propagate_named("x-product")],
                },
            },
        }
    }

    #[test]
    fn rules_follow_the_subgraph_url() {
        let rules = rules();
        let subgraphs = [
            subgraph("accounts", "http://accounts/graphql"),
            subgraph("products", "http://products/graphql"),
        ];

        let applicable = fetch_url_rules(&rules, &subgraphs, "http://accounts/graphql");
        assert_eq!(
            applicable,
            [
                &RequestHeaderRule::propagate_named("x-all"),
                &RequestHeaderRule::propagate_matching("^x-account-.*"),
            ]
        );

        let applicable = fetch_url_rules(&rules, &subgraphs, "http://unknown/graphql");
        assert_eq!(applicable, [&RequestHeaderRule::propagate_named("x-all")]);
    }

    #[test]
    fn names_and_patterns() {
        let rules = rules();
        let subgraphs = [subgraph("accounts", "http://accounts/graphql")];
        let forwarded = DefaultHeaderPropagation
            .forwarded_headers(&rules, &subgraphs, "http://accounts/graphql")
            .unwrap();

        assert_eq!(forwarded.names, ["x-all"]);
        assert_eq!(forwarded.regexes.len(), 1);
        assert!(forwarded.regexes[0].is_match("x-account-id"));
    }

    #[test]
    fn set_rules_are_not_forwarded() {
        let set = RequestHeaderRule {
            op: HeaderRuleOperation::Set,
            matching: None,
            named: None,
            rename: None,
            default: None,
            name: Some("x-router".to_string()),
            value: Some("1".to_string()),
        };
        let forwarded = propagated_headers([&set]).unwrap();
        assert!(forwarded.names.is_empty());
        assert!(forwarded.regexes.is_empty());
    }

    #[test]
    fn invalid_rules() {
        let err = propagated_headers([&RequestHeaderRule::propagate_matching("x-(")]).unwrap_err();
        assert!(matches!(err, HeaderRuleError::InvalidRegex { ref pattern, .. } if pattern == "x-("));

        let empty = RequestHeaderRule::propagate_named("");
        let err = propagated_headers([&empty]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid header propagation rule, no header name nor regular expression"
        );
    }
}
