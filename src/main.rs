use anyhow::Context as _;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use saambaa_adapter::bidding::{run_cycle, EndpointClient};
use saambaa_adapter::config::adapters::load_json;
use saambaa_adapter::config::{ConfigSource, FileConfigSource};
use saambaa_adapter::mock_dsp;
use saambaa_adapter::model::{BidDescriptor, BidderRequestContext, Environment};
use saambaa_adapter::SaambaaAdapter;

#[derive(Parser, Debug)]
#[command(author = "whiteCcinn", version = "1.0", about = "Saambaa bid adapter runner")]
struct CliArgs {
    /// descriptor 列表（JSON 数组）
    #[arg(long)]
    bids: PathBuf,
    /// 竞价上下文（referer、GDPR）
    #[arg(long)]
    context: Option<PathBuf>,
    /// 浏览环境快照（UA、屏幕、标题）
    #[arg(long)]
    environment: Option<PathBuf>,
    #[arg(long, default_value = "static/adapter_config.json")]
    config: PathBuf,
    #[arg(long)]
    coppa: bool,
    #[arg(long)]
    page_url: Option<String>,
    /// 覆盖两种格式的 endpoint 前缀
    #[arg(long)]
    endpoint: Option<String>,
    /// 启动本地 mock endpoint，并把请求指向它
    #[arg(long)]
    mock_port: Option<u16>,
    /// 只打印构建好的请求，不发送
    #[arg(long)]
    dry_run: bool,
    #[arg(long, default_value = "logs")]
    log_dir: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化全局 tracing 日志
    let log_file = rolling::hourly(&args.log_dir, "saambaa_adapter.json");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);
    let subscriber = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().json().with_writer(non_blocking));
    tracing::subscriber::set_global_default(subscriber).context("Unable to set global tracing subscriber")?;

    let bids: Vec<BidDescriptor> = load_json(&args.bids).context("Unable to load bid descriptors")?;
    let ctx: BidderRequestContext = match &args.context {
        Some(path) => load_json(path).context("Unable to load bidder request context")?,
        None => BidderRequestContext::default(),
    };
    let env: Environment = match &args.environment {
        Some(path) => load_json(path).context("Unable to load environment")?,
        None => Environment::default(),
    };

    let mock_endpoint = args.mock_port.map(mock_dsp::endpoint_base);
    let endpoint = mock_endpoint.as_deref().or(args.endpoint.as_deref());
    let config = FileConfigSource::new(&args.config)
        .adapter_config()
        .apply_overrides(args.coppa, args.page_url.clone(), endpoint);
    info!(?config, bids = bids.len(), "saambaa adapter starting");

    let adapter = SaambaaAdapter::new(config, env);

    if args.dry_run {
        let requests = adapter.build_requests(&bids, &ctx);
        println!("{}", serde_json::to_string_pretty(&requests)?);
        return Ok(());
    }

    if let Some(port) = args.mock_port {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("Unable to bind mock endpoint on port {}", port))?;
        tokio::spawn(async move {
            if let Err(e) = mock_dsp::serve(listener).await {
                warn!(error = %e, "mock endpoint stopped");
            }
        });
    }

    let client = EndpointClient::new(adapter.config().timeout_ms);
    let outcome = run_cycle(&adapter, &client, &bids, &ctx).await;
    info!(
        results = outcome.results.len(),
        attempts = outcome.log.request_attempts,
        "saambaa adapter finished"
    );
    println!("{}", serde_json::to_string_pretty(&outcome.results)?);
    Ok(())
}
