use super::render::{print_messages, render_json, render_page};
use super::setup::OutputMode;
use super::AppContext;
use pantry::commands::{CmdMessage, CmdResult};
use pantry::config::PantryConfig;
use pantry::error::{PantryError, Result};
use pantry::model::PendingUpload;
use std::path::{Path, PathBuf};

pub(super) fn handle_list(ctx: &mut AppContext, search: Option<String>) -> Result<()> {
    if let Some(query) = search {
        ctx.controller.set_search(query);
    }
    print_page(ctx)
}

pub(super) async fn handle_add(
    ctx: &mut AppContext,
    name: String,
    quantity: i64,
    image: Option<PathBuf>,
) -> Result<()> {
    let pending = match image {
        Some(path) => Some(read_image(&path).await?),
        None => None,
    };

    ctx.controller.open_form();
    ctx.controller.set_form_name(name);
    ctx.controller.set_form_quantity(quantity);
    ctx.controller.select_image(pending);
    let result = ctx.controller.submit_form().await?;
    finish(ctx, result)
}

pub(super) async fn handle_inc(ctx: &mut AppContext, name: String) -> Result<()> {
    let result = ctx.controller.increment(&name).await?;
    finish(ctx, result)
}

pub(super) async fn handle_dec(ctx: &mut AppContext, name: String) -> Result<()> {
    let result = ctx.controller.decrement(&name).await?;
    finish(ctx, result)
}

pub(super) async fn handle_set(ctx: &mut AppContext, name: String, quantity: i64) -> Result<()> {
    let result = ctx.controller.adjust_quantity(&name, quantity).await?;
    finish(ctx, result)
}

pub(super) async fn handle_remove(ctx: &mut AppContext, name: String) -> Result<()> {
    let result = ctx.controller.remove(&name).await?;
    finish(ctx, result)
}

pub(super) fn handle_config(
    home: &Path,
    key: Option<String>,
    value: Option<String>,
    output: OutputMode,
) -> Result<()> {
    let mut config = PantryConfig::load(home)?;

    match (key, value) {
        (None, _) => {
            let entries = config.entries();
            match output {
                OutputMode::Json => {
                    let map: serde_json::Map<String, serde_json::Value> = entries
                        .into_iter()
                        .map(|(k, v)| (k, serde_json::Value::String(v)))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&map)?);
                }
                OutputMode::Text => {
                    for (k, v) in entries {
                        println!("{} = {}", k, v);
                    }
                }
            }
        }
        (Some(key), None) => println!("{} = {}", key, config.get(&key)?),
        (Some(key), Some(value)) => {
            config.set(&key, value)?;
            config.save(home)?;
            print_messages(&[CmdMessage::success(format!(
                "{} set to {}",
                key,
                config.get(&key)?
            ))]);
        }
    }
    Ok(())
}

/// Read a photo the way the page's file input hands it over: name + bytes.
async fn read_image(path: &Path) -> Result<PendingUpload> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        PantryError::Api(format!("Cannot read image {}: {}", path.display(), e))
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(PendingUpload::new(file_name, bytes))
}

fn print_page(ctx: &AppContext) -> Result<()> {
    match ctx.output {
        OutputMode::Json => println!("{}", render_json(&ctx.controller.visible())?),
        OutputMode::Text => print!(
            "{}",
            render_page(&ctx.controller.cards(), &ctx.controller.state().search)
        ),
    }
    Ok(())
}

/// After a mutation: the reloaded page, preceded by messages in text mode.
fn finish(ctx: &AppContext, result: CmdResult) -> Result<()> {
    if ctx.output == OutputMode::Text {
        print_messages(&result.messages);
        println!();
    }
    print_page(ctx)
}
