//! Terminal client: the page's user actions as subcommands.
//!
//! Every invocation mounts the page (one full listing), runs one action and
//! renders the result.

mod handlers;
mod render;
mod setup;
mod styles;

use clap::Parser;
use directories::ProjectDirs;
use pantry::backend::{BackendHandles, BlobStore, DocumentStore};
use pantry::config::PantryConfig;
use pantry::controller::InventoryController;
use pantry::error::{PantryError, Result};
use setup::{Cli, Commands, OutputMode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub(crate) struct AppContext {
    pub controller: InventoryController<Arc<dyn DocumentStore>, Arc<dyn BlobStore>>,
    pub output: OutputMode,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let home = resolve_home(cli.home.as_deref())?;

    if let Some(Commands::Config { key, value }) = &cli.command {
        return handlers::handle_config(&home, key.clone(), value.clone(), cli.output);
    }

    let config = PantryConfig::load(&home)?;
    let handles = BackendHandles::init(&config, &home)?;
    handles.start_analytics(console::user_attended());
    tracing::debug!(backend = %handles.kind, home = %home.display(), "backend ready");

    let mut ctx = AppContext {
        controller: InventoryController::new(
            Arc::clone(&handles.documents),
            Arc::clone(&handles.blobs),
        ),
        output: cli.output,
    };
    ctx.controller.mount().await?;

    match cli.command {
        None => handlers::handle_list(&mut ctx, None),
        Some(Commands::List { search }) => handlers::handle_list(&mut ctx, search),
        Some(Commands::Search { term }) => handlers::handle_list(&mut ctx, Some(term)),
        Some(Commands::Add {
            name,
            quantity,
            image,
        }) => handlers::handle_add(&mut ctx, name, quantity, image).await,
        Some(Commands::Inc { name }) => handlers::handle_inc(&mut ctx, name).await,
        Some(Commands::Dec { name }) => handlers::handle_dec(&mut ctx, name).await,
        Some(Commands::Set { name, quantity }) => {
            handlers::handle_set(&mut ctx, name, quantity).await
        }
        Some(Commands::Remove { name }) => handlers::handle_remove(&mut ctx, name).await,
        Some(Commands::Config { .. }) => Ok(()),
    }
}

/// Logs go to stderr. `PANTRY_LOG` takes an `EnvFilter` directive; without
/// it only warnings and errors are shown, or debug output with `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "pantry=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("PANTRY_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn resolve_home(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    ProjectDirs::from("com", "pantry", "pantry")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| PantryError::Config("Could not determine a home directory".into()))
}
