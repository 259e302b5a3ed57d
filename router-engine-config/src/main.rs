//! Main entry point for CLI command to compile a router configuration.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use bytes::Bytes;
use clap::Parser;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::FutureExt;
use router_engine_config::configuration::generate_config_schema;
use router_engine_config::configuration::RouterEngineConfiguration;
use router_engine_config::factory::DefaultFactoryResolver;
use router_engine_config::factory::FactoryResolver;
use router_engine_config::factory::PubSubConnector;
use router_engine_config::factory::Transport;
use router_engine_config::factory::TransportFactory;
use router_engine_config::source::RouterConfig;
use router_engine_config::Loader;
use tower::BoxError;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Options for the compiler
#[derive(Parser, Debug)]
#[clap(
    name = "router-config",
    about = "Compiles a router configuration into the engine's plan configuration"
)]
struct Opt {
    /// Log level (off|error|warn|info|debug|trace).
    #[clap(long = "log", default_value = "info", env = "ROUTER_CONFIG_LOG")]
    log_level: String,

    /// Router settings (YAML).
    #[clap(short, long = "settings", env = "ROUTER_CONFIG_SETTINGS_PATH")]
    settings_path: Option<PathBuf>,

    /// Keep type and field usage information in the plan.
    #[clap(long)]
    include_info: bool,

    /// Prints the settings schema.
    #[clap(long)]
    schema: bool,

    /// The composed router configuration (JSON).
    router_config_path: Option<PathBuf>,
}

/// Subgraphs are never called while compiling.
#[derive(Debug)]
struct Offline;

impl Transport for Offline {
    fn round_trip(
        &self,
        _request: http::Request<Bytes>,
    ) -> BoxFuture<'static, Result<http::Response<Bytes>, BoxError>> {
        async { Err("subgraphs are not reachable from router-config".into()) }.boxed()
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
        Duration::from_secs(60)
    }

    fn default_http_proxy_url(&self) -> Option<Url> {
        std::env::var("HTTPS_PROXY")
            .or_else(|_| std::env::var("HTTP_PROXY"))
            .ok()
            .and_then(|proxy| Url::parse(&proxy).ok())
    }
}

impl PubSubConnector for Offline {
    fn publish(&self, _topic: &str, _data: Bytes) -> BoxFuture<'static, Result<(), BoxError>> {
        async { Err("brokers are not reachable from router-config".into()) }.boxed()
    }

    fn subscribe(
        &self,
        _topic: &str,
    ) -> BoxFuture<'static, Result<BoxStream<'static, Bytes>, BoxError>> {
        async { Err("brokers are not reachable from router-config".into()) }.boxed()
    }
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    if opt.schema {
        let schema = generate_config_schema();
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let builder = tracing_subscriber::fmt::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_new(&opt.log_level).context("could not parse log configuration")?,
        );
    if std::io::stderr().is_terminal() {
        builder.init();
    } else {
        builder.json().init();
    }

    let router_config_path = opt
        .router_config_path
        .context("a router configuration is required, see --help")?;
    let router_config: RouterConfig = std::fs::read_to_string(&router_config_path)
        .with_context(|| format!("could not read {}", router_config_path.display()))?
        .parse()?;

    let settings = match &opt.settings_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?
            .parse()?,
        None => RouterEngineConfiguration::default(),
    };

    let logger = tracing::dispatcher::get_default(|dispatch| dispatch.clone());
    let resolver = DefaultFactoryResolver::new(
        &Offline,
        Arc::new(Offline),
        Arc::new(Offline),
        settings.execution.enable_single_flight,
        Some(logger),
    );
    let loader = Loader::new(
        opt.include_info || settings.execution.include_info,
        vec![Arc::new(resolver) as Arc<dyn FactoryResolver>],
    );

    let plan = loader.compile(&router_config, &settings)?;
    tracing::info!(
        version = %router_config.version,
        data_sources = plan.data_sources.len(),
        "compiled router configuration"
    );
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
