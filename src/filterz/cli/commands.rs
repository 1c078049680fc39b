use super::logging::init_logging;
use super::render::{print_messages, render_schema, render_tree};
use super::setup::{Cli, Commands, FilterFields};
use clap::Parser;
use filterz::api::FilterzApi;
use filterz::clipboard::{copy_to_clipboard, get_from_clipboard};
use filterz::commands::CmdMessage;
use filterz::config::FilterzConfig;
use filterz::error::{FilterzError, Result};
use filterz::model::{Connector, FilterId, FilterUpdate, GroupId, Schema};
use filterz::store::fs::FileStore;
use std::fs;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

struct AppContext {
    api: FilterzApi<FileStore>,
    config: FilterzConfig,
    dir: PathBuf,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!(dir = %cli.dir.display(), "starting");

    // Init must work before a config exists.
    if let Some(Commands::Init) = &cli.command {
        return handle_init(&cli.dir);
    }

    let mut ctx = init_context(&cli.dir)?;

    match cli.command {
        Some(Commands::Init) => Ok(()),
        Some(Commands::Show) | None => handle_show(&ctx),
        Some(Commands::Add { group, fields }) => handle_add(&mut ctx, group, fields),
        Some(Commands::Group { parent, or }) => handle_group(&mut ctx, parent, or),
        Some(Commands::Set { id, fields }) => handle_set(&mut ctx, id, fields),
        Some(Commands::Rm { id }) => handle_remove(&mut ctx, id),
        Some(Commands::Rmgroup { group }) => handle_remove_group(&mut ctx, group),
        Some(Commands::Toggle { group }) => handle_toggle(&mut ctx, group),
        Some(Commands::Export { output, clipboard }) => handle_export(&ctx, output, clipboard),
        Some(Commands::Import { path, clipboard }) => handle_import(&mut ctx, path, clipboard),
        Some(Commands::Reset) => handle_reset(&mut ctx),
        Some(Commands::Schema { load }) => handle_schema(&mut ctx, load),
    }
}

fn init_context(dir: &Path) -> Result<AppContext> {
    let config = FilterzConfig::load(dir)?;
    if config.schema.is_empty() {
        warn!("no schema configured in {}", dir.display());
    }
    let api = FilterzApi::open(FileStore::new(dir.to_path_buf()), config.schema.clone())?;
    Ok(AppContext {
        api,
        config,
        dir: dir.to_path_buf(),
    })
}

fn handle_init(dir: &Path) -> Result<()> {
    let message = if FilterzConfig::exists(dir) {
        CmdMessage::info(format!("Already initialized in {}", dir.display()))
    } else {
        FilterzConfig::sample().save(dir)?;
        CmdMessage::success(format!(
            "Initialized {} with a sample schema",
            dir.display()
        ))
    };
    print_messages(&[message]);
    Ok(())
}

fn handle_show(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.show();
    print!("{}", render_tree(&result.tree));
    print_messages(&result.messages);
    Ok(())
}

fn to_update(fields: FilterFields) -> FilterUpdate {
    FilterUpdate {
        filter_type: fields.filter_type,
        predicate: fields.predicate,
        ref_value: fields.ref_value,
    }
}

fn handle_add(ctx: &mut AppContext, group: String, fields: FilterFields) -> Result<()> {
    let result = ctx.api.add_filter(&GroupId::from(group), to_update(fields))?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_group(ctx: &mut AppContext, parent: String, or: bool) -> Result<()> {
    let connector = if or { Connector::Or } else { Connector::And };
    let result = ctx.api.create_group(&GroupId::from(parent), connector)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_set(ctx: &mut AppContext, id: FilterId, fields: FilterFields) -> Result<()> {
    let result = ctx.api.update_filter(id, to_update(fields))?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_remove(ctx: &mut AppContext, id: FilterId) -> Result<()> {
    let result = ctx.api.remove_filter(id)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_remove_group(ctx: &mut AppContext, group: String) -> Result<()> {
    let result = ctx.api.remove_group(&GroupId::from(group))?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_toggle(ctx: &mut AppContext, group: String) -> Result<()> {
    let result = ctx.api.toggle_connector(&GroupId::from(group))?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &AppContext, output: Option<Option<PathBuf>>, clipboard: bool) -> Result<()> {
    let result = ctx.api.export()?;
    let Some(document) = result.document else {
        print_messages(&result.messages);
        return Ok(());
    };

    let mut messages = result.messages;
    if clipboard {
        copy_to_clipboard(&document)?;
        messages.push(CmdMessage::success("Document copied to clipboard"));
    }
    match output {
        Some(path) => {
            let path = path.unwrap_or_else(|| PathBuf::from(&ctx.config.document));
            fs::write(&path, &document)?;
            messages.push(CmdMessage::success(format!("Exported to {}", path.display())));
        }
        None if !clipboard => println!("{}", document),
        None => {}
    }
    print_messages(&messages);
    Ok(())
}

fn handle_import(ctx: &mut AppContext, path: Option<PathBuf>, clipboard: bool) -> Result<()> {
    let text = if clipboard {
        get_from_clipboard()?
    } else if let Some(path) = path {
        fs::read_to_string(path)?
    } else if !std::io::stdin().is_terminal() {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(&ctx.config.document)?
    };

    let result = ctx.api.import(&text)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_reset(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.reset()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_schema(ctx: &mut AppContext, load: Option<PathBuf>) -> Result<()> {
    let result = match load {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let schema: Schema = serde_json::from_str(&content)
                .map_err(|e| FilterzError::Config(format!("{}: {}", path.display(), e)))?;
            ctx.config.schema = schema.clone();
            ctx.config.save(&ctx.dir)?;

            let mut result = ctx.api.set_schema(schema);
            result.add_message(CmdMessage::success(format!(
                "Schema loaded from {}",
                path.display()
            )));
            result
        }
        None => ctx.api.schema(),
    };
    if let Some(schema) = &result.schema {
        print!("{}", render_schema(schema));
    }
    print_messages(&result.messages);
    Ok(())
}
