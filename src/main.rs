use kintone_mcp_server::client::ClientFactory;
use kintone_mcp_server::config::resolve;
use kintone_mcp_server::errors::ConfigError;
use kintone_mcp_server::services::logger::Logger;

#[tokio::main]
async fn main() {
    let logger = Logger::new("kintone");

    let resolved = match resolve() {
        Ok(resolved) => resolved,
        Err(ConfigError::Arguments(err)) => err.exit(),
        Err(err) => {
            logger.error("configuration rejected", None);
            eprintln!("kintone-mcp-server: {}", err);
            std::process::exit(1);
        }
    };

    let factory = ClientFactory::new(logger.clone());
    if let Err(err) = factory.get_client(&resolved) {
        logger.error("failed to construct kintone REST client", None);
        eprintln!("kintone-mcp-server: {}", err);
        std::process::exit(1);
    }

    let summary = resolved.summary();
    logger.info("kintone REST client ready", Some(&summary));
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
    );
}
