mod render;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use rehydrate::{
    provide_rehydrate_browser, provide_rehydrate_server, App, PartialRehydrationConfig,
    DEFAULT_APP_ID,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Rehydrate demo - Render a page on the "server" and hydrate it in the "browser"
#[derive(Parser, Debug)]
#[command(name = "rehydrate-demo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Comma-separated store slices to transfer
    #[arg(long, default_value = "auth,users", env = "REHYDRATE_STORES")]
    stores: String,

    /// Merge strategy used when rehydrating (OVERWRITE, MERGE or a custom name)
    #[arg(long, env = "REHYDRATE_MERGE_STRATEGY")]
    merge_strategy: Option<String>,

    /// Application id the transfer script element is named after
    #[arg(long, default_value = DEFAULT_APP_ID)]
    app_id: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_format);

    let config =
        PartialRehydrationConfig::from_vars(Some(&cli.stores), cli.merge_strategy.as_deref());

    let app = App::new(provide_rehydrate_browser(config).extend(provide_rehydrate_server()))
        .with_app_id(&cli.app_id);

    let page = render::server_render(&app).await?;
    println!("{page}");

    let hydration = render::browser_hydrate(&app, &page).await?;
    tracing::info!(
        first_fetch = hydration.first_fetch.len(),
        refresh = hydration.refresh.len(),
        "Browser hydration complete"
    );
    println!("{}", serde_json::to_string_pretty(&hydration.state)?);

    for event in app.logger().events() {
        println!("{}", serde_json::to_string(&event)?);
    }

    Ok(())
}

/// Initialize the tracing subscriber.
///
/// Logs go to stderr so stdout only carries the demo output.
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rehydrate=debug,rehydrate_demo=debug".into());

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
