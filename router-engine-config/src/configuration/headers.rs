use std::collections::HashMap;

use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

/// Configuration for header propagation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields, default)]
pub struct HeaderRules {
    /// Rules to apply to all subgraphs
    pub all: Option<HeaderLocation>,
    /// Rules to specific subgraphs
    pub subgraphs: HashMap<String, HeaderLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields, default)]
pub struct HeaderLocation {
    /// Propagate/Set headers on subgraph requests
    pub request: Vec<RequestHeaderRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HeaderRuleOperation {
    /// Forward a client header
    Propagate,
    /// Set a header to a fixed value
    Set,
}

/// A single header rule.
///
/// Regular expressions are kept as written and only compiled once the rule applies to a data
/// source, so that an invalid pattern is reported together with that data source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct RequestHeaderRule {
    /// The operation to apply
    pub op: HeaderRuleOperation,
    /// Propagate headers whose name matches this regex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching: Option<String>,
    /// Propagate the header with this name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named: Option<String>,
    /// Name the propagated header differently on the subgraph request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    /// Value used when the client did not send the header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Name of the header to set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Value of the header to set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl RequestHeaderRule {
    pub fn propagate_named(named: impl Into<String>) -> Self {
        Self::propagate(Some(named.into()), None)
    }

    pub fn propagate_matching(matching: impl Into<String>) -> Self {
        Self::propagate(None, Some(matching.into()))
    }

    fn propagate(named: Option<String>, matching: Option<String>) -> Self {
        Self {
            op: HeaderRuleOperation::Propagate,
            matching,
            named,
            rename: None,
            default: None,
            name: None,
            value: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subgraph_config() {
        let rules = serde_yaml::from_str::<HeaderRules>(
            r#"
        subgraphs:
          products:
            request:
              - op: propagate
                named: "x-tenant"
        "#,
        )
        .unwrap();
        assert_eq!(
            rules.subgraphs["products"].request,
            [RequestHeaderRule::propagate_named("x-tenant")]
        );
    }

    #[test]
    fn test_all_config() {
        let rules = serde_yaml::from_str::<HeaderRules>(
            r#"
        all:
          request:
            - op: propagate
              matching: "^x-.*"
            - op: set
              name: "x-router"
              value: "router"
        "#,
        )
        .unwrap();
        let request = &rules.all.unwrap().request;
        assert_eq!(request[0], RequestHeaderRule::propagate_matching("^x-.*"));
        assert_eq!(request[1].op, HeaderRuleOperation::Set);
    }

    #[test]
    fn test_unknown_operation() {
        assert!(serde_yaml::from_str::<HeaderRules>(
            r#"
        all:
          request:
            - op: remove
              named: "x-tenant"
        "#,
        )
        .is_err());
    }
}
