//! `claimboard` - CLI for the shared resource status board.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use claimboard::cli::{
    AddCommand, Cli, Command, ConfigCommand, ExportCommand, ListCommand, OutputFormat,
    SummaryCommand,
};
use claimboard::{
    init_logging, Board, Config, CsvExporter, NewItem, ResourceItem, StatusFilter, Storage,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Config commands must work while the active configuration is invalid
    let command = match cli.command {
        Command::Config(cmd) => return handle_config(cli.config, cmd),
        command => command,
    };

    let config = load_config(cli.config)?;

    match command {
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Add(cmd) => handle_add(&config, cmd),
        Command::SetStatus(cmd) => {
            open_board_for_update(&config)?.set_status(&cmd.id, cmd.status.into())?;
            Ok(())
        }
        Command::SetOwner(cmd) => {
            open_board_for_update(&config)?
                .set_owner(&cmd.id, cmd.owner.as_deref().unwrap_or_default())?;
            Ok(())
        }
        Command::Remove(cmd) => {
            open_board_for_update(&config)?.remove(&cmd.id)?;
            Ok(())
        }
        Command::Export(cmd) => handle_export(&config, &cmd),
        Command::Summary(cmd) => handle_summary(&config, &cmd),
        // Handled above
        Command::Config(_) => Ok(()),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(path).context("loading configuration")
}

/// Board for reading; an unreadable database shows the default items.
fn open_board(config: &Config) -> anyhow::Result<Board<Storage>> {
    Ok(Board::open(config.database_path(), config.storage.key.clone())?)
}

/// Board whose changes must reach the database file.
fn open_board_for_update(config: &Config) -> anyhow::Result<Board<Storage>> {
    let path = config.database_path();
    let storage = Storage::open(&path).with_context(|| {
        format!("board database {} is unreadable, changes cannot be saved", path.display())
    })?;
    Ok(Board::load(storage, config.storage.key.clone()))
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let board = open_board(config)?;
    let filter: StatusFilter = cmd.status.into();
    let items = board.view(filter, cmd.search.as_deref().unwrap_or_default());
    let exporter = CsvExporter::from_config(config);

    match cmd.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Plain => {
            for item in &items {
                println!("{}", plain_line(item, &exporter));
            }
        }
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No items match (filter: {}).", filter.label());
                return Ok(());
            }
            println!(
                "{:<44}  {:<6}  {:<10}  {:<19}  名称",
                "ID", "状态", "领取人", "更新时间"
            );
            for item in &items {
                println!(
                    "{:<44}  {:<6}  {:<10}  {:<19}  {}",
                    item.id,
                    item.status.label(),
                    item.owner.as_deref().unwrap_or("-"),
                    exporter.format_timestamp(&item.updated_at),
                    item.name
                );
            }
        }
    }
    Ok(())
}

fn plain_line(item: &ResourceItem, exporter: &CsvExporter) -> String {
    let mut fields = vec![item.id.clone(), item.status.to_string(), item.name.clone()];
    if let Some(owner) = &item.owner {
        fields.push(format!("@{owner}"));
    }
    if let Some(description) = &item.description {
        fields.push(description.clone());
    }
    fields.push(exporter.format_timestamp(&item.updated_at));
    fields.join("\t")
}

fn handle_add(config: &Config, cmd: AddCommand) -> anyhow::Result<()> {
    let mut board = open_board_for_update(config)?;

    let mut new_item = NewItem::new(cmd.name).status(cmd.status.into());
    if let Some(description) = cmd.description {
        new_item = new_item.description(description);
    }
    if let Some(owner) = cmd.owner {
        new_item = new_item.owner(owner);
    }

    if let Some(created) = board.add(new_item)? {
        println!("{}", created.id);
    }
    Ok(())
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> anyhow::Result<()> {
    let board = open_board(config)?;
    let exporter = CsvExporter::from_config(config);

    if cmd.stdout {
        println!("{}", exporter.render(board.items()));
        return Ok(());
    }

    let dir = cmd.output.clone().unwrap_or_else(|| config.export_dir());
    let path = exporter.write_to_dir(&dir, board.items())?;
    println!("{}", path.display());
    Ok(())
}

fn handle_summary(config: &Config, cmd: &SummaryCommand) -> anyhow::Result<()> {
    let board = open_board(config)?;
    let summary = board.summary();
    let stats = board.store().stats()?;

    if cmd.json {
        let status = serde_json::json!({
            "total": summary.total(),
            "available": summary.available,
            "reserved": summary.reserved,
            "claimed": summary.claimed,
            "database_path": board.store().path(),
            "storage_key": board.key(),
            "db_size_bytes": stats.db_size_bytes,
            "last_write": stats.last_write,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("claimboard summary");
        println!("------------------");
        println!("全部:          {}", summary.total());
        for status in claimboard::ResourceStatus::ALL {
            println!("{}:        {}", status.label(), summary.count(status));
        }
        println!();
        println!("Database:      {}", board.store().path().display());
        println!("Storage key:   {}", board.key());
        println!("Size (bytes):  {}", stats.db_size_bytes);
        match stats.last_write {
            Some(ts) => println!("Last write:    {}", ts.to_rfc3339()),
            None => println!("Last write:    never (showing defaults)"),
        }
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Key:                {}", config.storage.key);
                println!();
                println!("[Export]");
                println!("  Directory:          {}", config.export_dir().display());
                println!("  File prefix:        {}", config.export.file_prefix);
                println!("  Timestamp format:   {}", config.export.timestamp_format);
                println!("  UTC offset:         {}", config.display_offset());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::check_file(&path).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
