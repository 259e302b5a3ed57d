use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::FutureExt;
use maplit::hashmap;
use pretty_assertions::assert_eq;
use router_engine_config::configuration::RouterEngineConfiguration;
use router_engine_config::factory::DefaultFactoryResolver;
use router_engine_config::factory::FactoryResolver;
use router_engine_config::factory::PubSubConnector;
use router_engine_config::factory::Transport;
use router_engine_config::factory::TransportFactory;
use router_engine_config::plan::CustomConfiguration;
use router_engine_config::plan::EventType;
use router_engine_config::plan::GraphQLConfiguration;
use router_engine_config::plan::PlanConfiguration;
use router_engine_config::plan::SourceType;
use router_engine_config::source::RouterConfig;
use router_engine_config::variables::EnvironmentVariables;
use router_engine_config::CompileError;
use router_engine_config::Loader;
use tower::BoxError;
use url::Url;

const ROUTER_CONFIG: &str = include_str!("fixtures/router_config.json");
const SETTINGS: &str = include_str!("fixtures/settings.yaml");

#[derive(Debug)]
struct Offline;

impl Transport for Offline {
    fn round_trip(
        &self,
        _request: http::Request<Bytes>,
    ) -> BoxFuture<'static, Result<http::Response<Bytes>, BoxError>> {
        async { Err("offline".into()) }.boxed()
    }
}

impl TransportFactory for Offline {
    fn round_tripper(
        &self,
        _enable_single_flight: bool,
        transport: Arc<dyn Transport>,
    ) -> Arc<dyn Transport> {
        transport
    }

    fn default_transport_timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    fn default_http_proxy_url(&self) -> Option<Url> {
        None
    }
}

impl PubSubConnector for Offline {
    fn publish(&self, _topic: &str, _data: Bytes) -> BoxFuture<'static, Result<(), BoxError>> {
        async { Err("offline".into()) }.boxed()
    }

    fn subscribe(
        &self,
        _topic: &str,
    ) -> BoxFuture<'static, Result<BoxStream<'static, Bytes>, BoxError>> {
        async { Err("offline".into()) }.boxed()
    }
}

fn loader(include_info: bool) -> Loader {
    let resolver = DefaultFactoryResolver::new(
        &Offline,
        Arc::new(Offline),
        Arc::new(Offline),
        true,
        None,
    );
    Loader::new(
        include_info,
        vec![Arc::new(resolver) as Arc<dyn FactoryResolver>],
    )
    .with_variables(Arc::new(EnvironmentVariables::default()))
}

fn router_config(json: &str) -> RouterConfig {
    json.parse().unwrap()
}

fn settings() -> RouterEngineConfiguration {
    SETTINGS.parse().unwrap()
}

fn compile(json: &str) -> Result<PlanConfiguration, CompileError> {
    loader(false).compile(&router_config(json), &RouterEngineConfiguration::default())
}

fn graphql(plan: &PlanConfiguration, id: &str) -> GraphQLConfiguration {
    match &plan
        .data_source(id)
        .unwrap_or_else(|| panic!("data source {id} is compiled"))
        .custom
    {
        CustomConfiguration::Graphql(graphql) => graphql.clone(),
        custom => panic!("expected a graphql data source, got {custom:?}"),
    }
}

#[test_log::test]
fn compiles_every_kind() {
    let settings = settings();
    let plan = loader(settings.execution.include_info)
        .compile(&router_config(ROUTER_CONFIG), &settings)
        .unwrap();

    assert!(plan.include_info);
    assert_eq!(plan.default_flush_interval_millis, 500);
    let kinds: Vec<&str> = plan
        .data_sources
        .iter()
        .map(|data_source| data_source.factory.kind())
        .collect();
    assert_eq!(kinds, ["GRAPHQL", "STATIC", "PUBSUB"]);

    let accounts = plan.data_source("0").unwrap();
    assert_eq!(accounts.root_nodes.len(), 2);
    assert_eq!(accounts.child_nodes[0].type_name, "Address");
    assert_eq!(accounts.directives[0].directive_name, "lowercase");
    assert_eq!(accounts.directives[0].rename_to, "lowercase");
    assert_eq!(accounts.federation_meta_data.keys[0].selection_set, "id");
    assert_eq!(accounts.federation_meta_data.requires[0].field_name, "email");
    assert_eq!(
        accounts.federation_meta_data.entity_interfaces[0].concrete_type_names,
        ["User"]
    );
    assert!(accounts.federation_meta_data.interface_objects.is_empty());

    let accounts = graphql(&plan, "0");
    assert_eq!(accounts.fetch.url, "http://accounts:4001/graphql");
    assert_eq!(accounts.fetch.method, http::Method::POST);
    assert_eq!(accounts.fetch.header.len(), 1);
    assert_eq!(accounts.fetch.header["x-api-key"], "secret");
    assert!(accounts.federation.enabled);
    assert!(accounts.federation.service_sdl.starts_with("type User"));
    assert!(accounts.upstream_schema.starts_with("type Query"));
    assert_eq!(accounts.custom_scalar_type_fields[0].field_name, "birthday");

    let Some(CustomConfiguration::Static(hello)) =
        plan.data_source("1").map(|data_source| &data_source.custom)
    else {
        panic!("expected a static data source");
    };
    assert_eq!(hello.data, r#"{"hello":"world"}"#);

    let Some(CustomConfiguration::PubSub(products)) =
        plan.data_source("2").map(|data_source| &data_source.custom)
    else {
        panic!("expected a pubsub data source");
    };
    let event_types: Vec<EventType> = products
        .events
        .iter()
        .map(|event| event.event_type)
        .collect();
    assert_eq!(event_types, [EventType::Publish, EventType::Subscribe]);
    assert_eq!(products.events[1].topic, "products.updated");

    assert_eq!(plan.types[0].type_name, "Account");
    assert_eq!(plan.types[0].rename_to, "User");
    let authorization: Vec<(&str, bool)> = plan
        .fields
        .iter()
        .map(|field| (field.field_name.as_str(), field.has_authorization_rule))
        .collect();
    assert_eq!(
        authorization,
        [("user", false), ("me", true), ("email", true)]
    );
    assert_eq!(
        plan.fields[0].arguments[0].source_type,
        SourceType::FieldArgument
    );
}

#[test_log::test]
fn forwards_headers_of_the_matching_subgraph() {
    let plan = loader(false)
        .compile(&router_config(ROUTER_CONFIG), &settings())
        .unwrap();
    let subscription = graphql(&plan, "0").subscription;

    assert_eq!(subscription.url, "http://accounts:4001/graphql");
    assert_eq!(subscription.forwarded_client_header_names, ["authorization"]);
    let regexes: Vec<&str> = subscription
        .forwarded_client_header_regular_expressions
        .iter()
        .map(|regex| regex.as_str())
        .collect();
    assert_eq!(regexes, ["^x-tenant-.*"]);
}

#[test_log::test]
fn invalid_header_rules_name_the_data_source() {
    let settings: RouterEngineConfiguration = r#"
headers:
  subgraphs:
    accounts:
      request:
        - op: propagate
          matching: "x-(unclosed"
"#
    .parse()
    .unwrap();
    let err = loader(false)
        .compile(&router_config(ROUTER_CONFIG), &settings)
        .unwrap_err();

    assert!(matches!(err, CompileError::HeaderRules { .. }));
    assert_eq!(err.data_source(), "0");
    assert!(err.to_string().contains("x-(unclosed"));
}

#[test_log::test]
fn compiling_twice_gives_equal_plans() {
    let loader = loader(true);
    let router_config = router_config(ROUTER_CONFIG);
    let settings = settings();

    let first = loader.compile(&router_config, &settings).unwrap();
    let second = loader.compile(&router_config, &settings).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[test_log::test]
fn compiles_concurrently() {
    let loader = loader(false);
    let router_config = router_config(ROUTER_CONFIG);
    let settings = settings();
    let expected = loader.compile(&router_config, &settings).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| loader.compile(&router_config, &settings).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test_log::test]
fn no_data_sources() {
    let plan = compile(
        r#"{
            "engineConfig": {
                "fieldConfigurations": [{"typeName": "Query", "fieldName": "me"}],
                "typeConfigurations": [{"typeName": "Account", "renameTo": "User"}]
            }
        }"#,
    )
    .unwrap();

    assert!(plan.data_sources.is_empty());
    assert_eq!(plan.fields.len(), 1);
    assert_eq!(plan.types.len(), 1);
}

#[test_log::test]
fn subscription_url_defaults_to_the_fetch_url() {
    let router_config = router_config(
        r#"{
            "engineConfig": {
                "datasourceConfigurations": [{
                    "id": "0",
                    "kind": "GRAPHQL",
                    "customGraphql": {
                        "fetch": {"url": {"kind": "ENV", "name": "ROUTER_ENGINE_CONFIG_TEST_FETCH_URL"}},
                        "subscription": {"url": {"kind": "ENV", "name": "ROUTER_ENGINE_CONFIG_TEST_SUBSCRIPTION_URL"}},
                        "upstreamSchema": {"key": "schema"}
                    }
                }],
                "stringStorage": {"schema": "type Query { me: String }"}
            }
        }"#,
    );

    for fetch_url in [
        "http://svc/graphql",
        "https://svc.internal:8443/graphql?tenant=a",
        "",
    ] {
        let variables = EnvironmentVariables::builder()
            .env_vars(hashmap! {
                "ROUTER_ENGINE_CONFIG_TEST_FETCH_URL".to_string() => fetch_url.to_string(),
            })
            .build();
        let plan = loader(false)
            .with_variables(Arc::new(variables))
            .compile(&router_config, &RouterEngineConfiguration::default())
            .unwrap();
        let graphql = graphql(&plan, "0");
        assert_eq!(graphql.fetch.url, fetch_url);
        assert_eq!(graphql.subscription.url, fetch_url);
    }
}

#[test_log::test]
fn sse_protocol_without_subscription_url() {
    let plan = compile(
        r#"{
            "engineConfig": {
                "datasourceConfigurations": [{
                    "id": "0",
                    "kind": "GRAPHQL",
                    "customGraphql": {
                        "fetch": {"url": {"kind": "STATIC", "content": "http://svc/graphql"}},
                        "subscription": {"enabled": true, "protocol": "SSE"},
                        "upstreamSchema": {"key": "schema"}
                    }
                }],
                "stringStorage": {"schema": "type Query { me: String }"}
            }
        }"#,
    )
    .unwrap();

    let subscription = graphql(&plan, "0").subscription;
    assert_eq!(subscription.url, "http://svc/graphql");
    assert!(subscription.use_sse);
    assert!(!subscription.sse_method_post);
}

#[test_log::test]
fn legacy_sse_flag() {
    let plan = compile(
        r#"{
            "engineConfig": {
                "datasourceConfigurations": [
                    {
                        "id": "legacy",
                        "kind": "GRAPHQL",
                        "customGraphql": {
                            "subscription": {"useSSE": true},
                            "upstreamSchema": {"key": "schema"}
                        }
                    },
                    {
                        "id": "protocol",
                        "kind": "GRAPHQL",
                        "customGraphql": {
                            "subscription": {"useSSE": true, "protocol": "WS"},
                            "upstreamSchema": {"key": "schema"}
                        }
                    }
                ],
                "stringStorage": {"schema": "type Query { me: String }"}
            }
        }"#,
    )
    .unwrap();

    assert!(graphql(&plan, "legacy").subscription.use_sse);
    assert!(!graphql(&plan, "protocol").subscription.use_sse);
}

#[test_log::test]
fn field_with_scopes_has_an_authorization_rule() {
    let plan = compile(
        r#"{
            "engineConfig": {
                "fieldConfigurations": [{
                    "typeName": "Query",
                    "fieldName": "me",
                    "authorizationConfiguration": {
                        "requiresAuthentication": false,
                        "requiredOrScopes": [{"requiredAndScopes": ["read:profile"]}]
                    }
                }]
            }
        }"#,
    )
    .unwrap();

    assert!(plan.fields[0].has_authorization_rule);
}

#[test_log::test]
fn missing_upstream_schema() {
    let err = compile(
        r#"{
            "engineConfig": {
                "datasourceConfigurations": [{
                    "id": "accounts",
                    "kind": "GRAPHQL",
                    "customGraphql": {"upstreamSchema": {"key": "schema-1"}}
                }],
                "stringStorage": {"schema-0": "type Query { me: String }"}
            }
        }"#,
    )
    .unwrap_err();

    assert!(matches!(err, CompileError::UpstreamSchema { .. }));
    insta::assert_snapshot!(err.to_string(), @r#"could not load GraphQL schema for data source accounts: no string found for key "schema-1""#);
}

#[test_log::test]
fn unknown_event_type() {
    let err = compile(
        r#"{
            "engineConfig": {
                "datasourceConfigurations": [{
                    "id": "products-events",
                    "kind": "PUBSUB",
                    "customEvents": {
                        "events": [{"type": "BOGUS", "typeName": "Subscription", "fieldName": "productUpdated", "topic": "products"}]
                    }
                }]
            }
        }"#,
    )
    .unwrap_err();

    assert_eq!(err.data_source(), "products-events");
    insta::assert_snapshot!(err.to_string(), @r#"invalid event type "BOGUS" for data source "products-events": invalid event type: "BOGUS""#);
}

#[test_log::test]
fn unknown_kind_aborts_the_compilation() {
    let err = compile(
        r#"{
            "engineConfig": {
                "datasourceConfigurations": [
                    {
                        "id": "hello",
                        "kind": "STATIC",
                        "customStatic": {"data": {"kind": "STATIC", "content": "{}"}}
                    },
                    {"id": "grpc", "kind": "GRPC"}
                ]
            }
        }"#,
    )
    .unwrap_err();

    assert_eq!(err.data_source(), "grpc");
    insta::assert_snapshot!(err.to_string(), @r#"could not resolve a planner factory for data source grpc: invalid datasource kind "GRPC""#);
}
