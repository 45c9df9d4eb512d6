//! Tasklist Web Server
//!
//! Multi-tenant task list service with JWT authentication.

use clap::Parser;
use tasklist_web::server::TasklistServerBuilder;
use tasklist_web::init_logging;

/// Tasklist Web Server - multi-tenant task lists with JWT authentication
#[derive(Parser)]
#[command(name = "tasklist-web")]
#[command(about = "A multi-tenant task list service")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Database URL (e.g. sqlite://tasklist.db); in-memory stores when omitted
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Set up logging
    init_logging(&args.log_level);

    println!("🚀 Starting Tasklist Web Server");
    println!("📍 Server: http://{}:{}", args.host, args.port);

    if std::env::var("JWT_SECRET").is_err() {
        println!("⚠️  Warning: JWT_SECRET is not set, using the built-in development secret.");
        println!("   Every restart keeps old tokens valid; set a real secret in production.");
    }

    // Build the server: environment configuration first, command line
    // arguments override
    let mut builder = TasklistServerBuilder::new()
        .host(args.host)
        .port(args.port)
        .dev_mode(args.dev);

    if let Some(database_url) = args.database_url {
        builder = builder.database_url(database_url);
    }

    let server = match builder.build().await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("❌ Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    // Start the server (this will block until shutdown)
    if let Err(e) = server.start().await {
        eprintln!("❌ Server failed to start: {}", e);
        std::process::exit(1);
    }
}
