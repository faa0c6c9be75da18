use log::{error, info};
use paint_path_generator::config::ServerConfig;
use paint_path_generator::PathServerState;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;
use std::process;
use std::sync::Once;

// Use a Once to ensure we only initialize the logger once
static LOGGER_INIT: Once = Once::new();

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(2);
        }
    };

    init_logger(&config);

    info!("Starting paint path generator server...");
    info!("Server version: {}", env!("CARGO_PKG_VERSION"));

    let state = PathServerState::from_config(&config).map_err(|e| {
        error!("Failed to build server state: {}", e);
        e
    })?;

    paint_path_generator::run_stdio(state).await?;

    info!("Server shutting down");
    Ok(())
}

// Initialize the logger
fn init_logger(config: &ServerConfig) {
    LOGGER_INIT.call_once(|| {
        let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

        // Terminal output goes to stderr; stdout carries JSON-RPC
        let term_level = config.log_level.min(LevelFilter::Info);

        match File::create(&config.log_file) {
            Ok(log_file) => {
                let write_logger: Box<dyn SharedLogger> =
                    WriteLogger::new(config.log_level, log_config.clone(), log_file);
                let term_logger: Box<dyn SharedLogger> = TermLogger::new(
                    term_level,
                    log_config,
                    TerminalMode::Stderr,
                    ColorChoice::Auto,
                );

                if let Err(e) = CombinedLogger::init(vec![term_logger, write_logger]) {
                    eprintln!("Failed to initialize combined logger: {}", e);
                }

                info!("Logging initialized. Debug logs writing to: {:?}", config.log_file);
            }
            Err(e) => {
                eprintln!(
                    "Failed to create log file at {:?} ({}), logging to stderr only.",
                    config.log_file, e
                );
                if let Err(e) = TermLogger::init(
                    config.log_level,
                    log_config,
                    TerminalMode::Stderr,
                    ColorChoice::Auto,
                ) {
                    eprintln!("Failed to initialize terminal logger: {}", e);
                }
            }
        }
    });
}
