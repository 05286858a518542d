use mochi_backend::config::ServerConfig;
use mochi_backend::error::ConfigError;
use mochi_backend::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // A missing .env file is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        if let ConfigError::MissingEnvVar(var) = &e {
            eprintln!("  export {}=...", var);
        }
        std::process::exit(1);
    });

    eprintln!("🍡 Mochi backend v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {} ({})", config.llm.backend, config.llm.model);
    eprintln!("   HTTP: http://0.0.0.0:{}", config.port);
    eprintln!("   Timeout: {}s\n", config.generation_timeout.as_secs());

    server::serve(config).await?;

    Ok(())
}
