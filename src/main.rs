use axum::serve;
use service_catalog::api::routes::create_router;
use service_catalog::build_context;
use service_catalog::config::AppConfig;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress reqwest debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper", LevelFilter::Warn)
        .init();

    println!("Service Catalog: control-plane aggregation server");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}, controller={}",
        config.server.host, config.server.port, config.controller.api_url
    );

    let context = build_context(&config)?;
    let app = create_router().with_state(context);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("Service catalog running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
