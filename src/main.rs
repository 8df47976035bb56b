//! CLI entry point for glitchy-kernel

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "glitchy-kernel")]
#[command(version)]
#[command(about = "Static renderer and dev server for the GlitchyKernel blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate static files
    #[command(alias = "g")]
    Generate,

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Clean the public folder
    Clean,

    /// List site information
    List {
        /// Type of content to list (posts, updates, tags)
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Print the headings of an article as JSON
    Toc {
        /// Article id
        id: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "glitchy_kernel=debug,info"
    } else {
        "glitchy_kernel=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Generate => {
            let site = glitchy_kernel::Site::new(&base_dir)?;
            tracing::info!("Generating static files...");
            site.generate()?;
            println!("Generated successfully!");
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let site = glitchy_kernel::Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            glitchy_kernel::server::start(site, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let site = glitchy_kernel::Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = glitchy_kernel::Site::new(&base_dir)?;
            glitchy_kernel::commands::list::run(&site, &r#type)?;
        }

        Commands::Toc { id } => {
            let site = glitchy_kernel::Site::new(&base_dir)?;
            glitchy_kernel::commands::toc::run(&site, &id)?;
        }

        Commands::Version => {
            println!("glitchy-kernel version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
