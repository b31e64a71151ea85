use clap::{Arg, ArgAction, Command, ValueHint};
use std::path::PathBuf;

/// CLI arguments for outagemap-server
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub port: Option<u16>,
    pub jwt_secret: Option<String>,
    pub config_file: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub memory_storage: bool,
    pub websocket_timeout: Option<u64>,
    pub max_device_guards: Option<usize>,
    pub max_request_size: Option<usize>,
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Parse command line arguments
    pub fn parse() -> Self {
        let matches = Command::new("outagemap-server")
            .version(outagemap::VERSION)
            .about("HTTP API server for OutageMap outage reports")
            .long_about(
                r#"OutageMap Server exposes community outage reports over a REST API
and pushes report snapshots to WebSocket clients whenever they change.

Signed-in users are identified by a JWT bearer token. Anonymous clients may
confirm reports; they should send an X-Device-Id header so repeat
confirmations from the same device are ignored.

Examples:
  outagemap-server --port 8080
  outagemap-server --config outagemap.toml --log-level debug
  outagemap-server --memory --jwt-secret dev-secret"#,
            )
            .arg(
                Arg::new("port")
                    .short('p')
                    .long("port")
                    .value_name("PORT")
                    .help("Port to listen on")
                    .long_help(
                        "Port number for the HTTP server to listen on.
Environment variable: OUTAGEMAP_PORT",
                    )
                    .value_hint(ValueHint::Other)
                    .value_parser(clap::value_parser!(u16)),
            )
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("OutageMap configuration file")
                    .long_help(
                        "Path to an OutageMap configuration file (TOML, YAML or JSON).
Environment variables prefixed with OUTAGEMAP_ are applied on top.
Environment variable: OUTAGEMAP_CONFIG_FILE",
                    )
                    .value_hint(ValueHint::FilePath)
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("data_dir")
                    .long("data-dir")
                    .value_name("DIR")
                    .help("Directory for the report database")
                    .value_hint(ValueHint::DirPath)
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("memory")
                    .long("memory")
                    .help("Keep reports in memory only")
                    .long_help(
                        "Use the in-memory report store. Reports are lost when the
server stops. Intended for development and demos.",
                    )
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("jwt_secret")
                    .long("jwt-secret")
                    .value_name("SECRET")
                    .help("JWT verification secret")
                    .long_help(
                        "Secret shared with the identity provider for verifying JWT
bearer tokens. If not provided, one will be generated for this process.
Environment variable: OUTAGEMAP_JWT_SECRET",
                    )
                    .value_hint(ValueHint::Other),
            )
            .arg(
                Arg::new("websocket_timeout")
                    .long("websocket-timeout")
                    .value_name("SECONDS")
                    .help("WebSocket idle timeout")
                    .long_help(
                        "How long to keep WebSocket connections alive without
client activity before closing them.
Environment variable: OUTAGEMAP_WEBSOCKET_TIMEOUT",
                    )
                    .value_parser(clap::value_parser!(u64)),
            )
            .arg(
                Arg::new("max_device_guards")
                    .long("max-device-guards")
                    .value_name("COUNT")
                    .help("Anonymous devices remembered for confirmations")
                    .long_help(
                        "How many anonymous devices to remember confirmations for.
The least recently seen device is forgotten first.
Environment variable: OUTAGEMAP_MAX_DEVICE_GUARDS",
                    )
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                Arg::new("max_request_size")
                    .long("max-request-size")
                    .value_name("BYTES")
                    .help("Maximum request body size in bytes")
                    .long_help(
                        "Maximum size allowed for HTTP request bodies.
Larger requests will be rejected.
Environment variable: OUTAGEMAP_MAX_REQUEST_SIZE",
                    )
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                Arg::new("log_level")
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Logging level")
                    .long_help(
                        "Set the logging level. Valid values: error, warn, info, debug, trace
RUST_LOG, when set, takes precedence.",
                    )
                    .value_parser(["error", "warn", "info", "debug", "trace"]),
            )
            .arg(
                Arg::new("help_env")
                    .long("help-env")
                    .help("Show all environment variables")
                    .action(ArgAction::SetTrue),
            )
            .get_matches();

        if matches.get_flag("help_env") {
            Self::print_env_help();
            std::process::exit(0);
        }

        Self {
            port: matches.get_one::<u16>("port").copied(),
            jwt_secret: matches.get_one::<String>("jwt_secret").cloned(),
            config_file: matches.get_one::<PathBuf>("config").cloned(),
            data_dir: matches.get_one::<PathBuf>("data_dir").cloned(),
            memory_storage: matches.get_flag("memory"),
            websocket_timeout: matches.get_one::<u64>("websocket_timeout").copied(),
            max_device_guards: matches.get_one::<usize>("max_device_guards").copied(),
            max_request_size: matches.get_one::<usize>("max_request_size").copied(),
            log_level: matches.get_one::<String>("log_level").cloned(),
        }
    }

    /// Print environment variable help
    fn print_env_help() {
        println!("OutageMap Server Environment Variables");
        println!("======================================");
        println!();
        println!("Server:");
        println!("  OUTAGEMAP_PORT                     - Server port (default: 3000)");
        println!("  OUTAGEMAP_MAX_REQUEST_SIZE         - Max request body size in bytes (default: 1MB)");
        println!("  OUTAGEMAP_CONFIG_FILE              - Library configuration file");
        println!("  OUTAGEMAP_WEBSOCKET_TIMEOUT        - WebSocket idle timeout in seconds (default: 300)");
        println!("  OUTAGEMAP_MAX_DEVICE_GUARDS        - Anonymous devices remembered (default: 10000)");
        println!();
        println!("Authentication:");
        println!("  OUTAGEMAP_JWT_SECRET               - JWT secret (generated if not set)");
        println!();
        println!("Storage, geocoding and feeds (nested keys use a double underscore):");
        println!("  OUTAGEMAP_STORAGE__ENGINE          - memory or rocksdb (default: rocksdb)");
        println!("  OUTAGEMAP_STORAGE__DATA_DIR        - Data directory");
        println!("  OUTAGEMAP_GEOCODING__ENABLED       - Reverse geocode new reports (default: true)");
        println!("  OUTAGEMAP_FEEDS__NEARBY_RADIUS_M   - Nearby feed radius in meters (default: 5000)");
        println!();
        println!("Logging:");
        println!("  RUST_LOG                           - Logging level (error, warn, info, debug, trace)");
        println!();
        println!("Note: Command line arguments take precedence over environment variables.");
    }
}
