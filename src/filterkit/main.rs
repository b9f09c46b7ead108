use colored::Colorize;
use filterkit::codec::{self, DecodeReport};
use filterkit::error::{FilterError, Result};
use filterkit::location::MemoryLocation;
use filterkit::presets::PresetManager;
use filterkit::schema::{FieldCategory, FieldDescriptor, FieldRegistry, FieldType};
use filterkit::store::FilterStore;
use filterkit::value::FilterValue;
use serde_json::Value;
use std::path::{Path, PathBuf};

use clap::Parser;

mod args;
use args::{Cli, Commands, PresetAction};

const PRESET_FILENAME: &str = "presets.json";

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}

struct AppContext {
    registry: FieldRegistry,
    preset_path: PathBuf,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let ctx = init_context(&cli.schema)?;

    match cli.command {
        Commands::Decode { query } => handle_decode(&ctx, &query),
        Commands::Encode { pairs } => handle_encode(&ctx, &pairs),
        Commands::Fields { query } => handle_fields(&ctx, &query),
        Commands::Preset { action } => match action {
            PresetAction::Save { name, query } => handle_preset_save(&ctx, &name, &query),
            PresetAction::List => handle_preset_list(&ctx),
            PresetAction::Load { name } => handle_preset_load(&ctx, &name),
            PresetAction::Delete { name } => handle_preset_delete(&ctx, &name),
        },
    }
}

fn init_context(schema_path: &Path) -> Result<AppContext> {
    let text = std::fs::read_to_string(schema_path)?;
    let registry = FieldRegistry::from_json(&text)?;
    let preset_path = schema_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(PRESET_FILENAME);
    Ok(AppContext {
        registry,
        preset_path,
    })
}

fn handle_decode(ctx: &AppContext, query: &str) -> Result<()> {
    let report = codec::decode(&ctx.registry, query);
    print_dropped(&report);

    for (id, value) in report.values.iter() {
        let rendered = render_value(value);
        match ctx.registry.get(id) {
            Some(field) => println!("{}  {} = {}", field.label.bold(), id, rendered),
            None => println!("{}  {} = {}", "(passthrough)".dimmed(), id, rendered.dimmed()),
        }
    }
    println!("{}", format!("{} filters active", report.values.active_count()).green());
    Ok(())
}

fn handle_encode(ctx: &AppContext, pairs: &[String]) -> Result<()> {
    let mut store = FilterStore::new(ctx.registry.clone(), MemoryLocation::new());
    let updates = pairs
        .iter()
        .map(|pair| parse_pair(&ctx.registry, pair))
        .collect::<Result<Vec<_>>>()?;
    store.apply_many(updates)?;
    println!("{}", store.location().query());
    Ok(())
}

fn handle_fields(ctx: &AppContext, query: &str) -> Result<()> {
    let report = codec::decode(&ctx.registry, query);
    print_dropped(&report);
    let visible = filterkit::visibility::visible_fields(&ctx.registry, &report.values);

    for category in [FieldCategory::Primary, FieldCategory::Advanced] {
        let mut fields: Vec<&FieldDescriptor> =
            ctx.registry.in_category(category).collect();
        if fields.is_empty() {
            continue;
        }
        fields.sort_by_key(|f| f.sort_order);
        println!(
            "{}",
            match category {
                FieldCategory::Primary => "Primary".bold(),
                FieldCategory::Advanced => "Advanced".bold(),
            }
        );
        for field in fields {
            let marker = if report.values.contains(&field.id) {
                "●".green()
            } else {
                "○".normal()
            };
            let line = format!(
                "  {} {} [{}] {}",
                marker,
                field.label,
                type_name(&field.field_type),
                field.id.dimmed()
            );
            if visible.contains(&field.id) {
                println!("{}", line);
            } else {
                println!("{} {}", line.dimmed(), "(hidden)".dimmed());
            }
        }
    }
    Ok(())
}

fn handle_preset_save(ctx: &AppContext, name: &str, query: &str) -> Result<()> {
    let report = codec::decode(&ctx.registry, query);
    print_dropped(&report);

    let mut manager = PresetManager::load_file(&ctx.preset_path)?;
    let preset = manager.save(name, &report.values);
    manager.save_file(&ctx.preset_path)?;

    println!(
        "{}",
        format!("Saved preset '{}' ({})", preset.name, preset.id).green()
    );
    Ok(())
}

fn handle_preset_list(ctx: &AppContext) -> Result<()> {
    let manager = PresetManager::load_file(&ctx.preset_path)?;
    if manager.list().is_empty() {
        println!("No presets saved.");
        return Ok(());
    }
    for preset in manager.list() {
        println!(
            "{}  {}  {}",
            preset.name.bold(),
            format!("{} filters", preset.filters.active_count()),
            preset
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .dimmed()
        );
        println!("  {}", codec::encode(&preset.filters).dimmed());
    }
    Ok(())
}

fn handle_preset_load(ctx: &AppContext, name: &str) -> Result<()> {
    let manager = PresetManager::load_file(&ctx.preset_path)?;
    match manager.find_by_name(name) {
        Some(preset) => println!("{}", codec::encode(&preset.filters)),
        // Unknown presets are a no-op, not an error: the list may lag.
        None => println!("{}", format!("No preset named '{}'", name).yellow()),
    }
    Ok(())
}

fn handle_preset_delete(ctx: &AppContext, name: &str) -> Result<()> {
    let mut manager = PresetManager::load_file(&ctx.preset_path)?;
    let Some(id) = manager.find_by_name(name).map(|p| p.id) else {
        println!("{}", format!("No preset named '{}'", name).yellow());
        return Ok(());
    };
    manager.delete(id);
    manager.save_file(&ctx.preset_path)?;
    println!("{}", format!("Deleted preset '{}'", name).green());
    Ok(())
}

fn parse_pair(registry: &FieldRegistry, pair: &str) -> Result<(String, FilterValue)> {
    let Some((id, raw)) = pair.split_once('=') else {
        return Err(FilterError::Usage(format!(
            "expected field=value, got '{}'",
            pair
        )));
    };
    let field = registry
        .get(id)
        .ok_or_else(|| FilterError::UnknownField(id.to_string()))?;
    let parsed: Value =
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    let value = FilterValue::coerce(&field.field_type, &parsed).ok_or_else(|| {
        FilterError::Validation {
            field: id.to_string(),
        }
    })?;
    Ok((id.to_string(), value))
}

fn print_dropped(report: &DecodeReport) {
    for dropped in &report.dropped {
        eprintln!(
            "{}",
            format!("Skipped '{}': {}", dropped.key, dropped.reason).yellow()
        );
    }
}

fn render_value(value: &FilterValue) -> String {
    serde_json::to_string(&value.to_query_value()).unwrap_or_else(|_| "<unprintable>".to_string())
}

fn type_name(field_type: &FieldType) -> &'static str {
    match field_type {
        FieldType::TextSearch => "text-search",
        FieldType::SingleSelect { .. } => "single-select",
        FieldType::MultiSelect { .. } => "multi-select",
        FieldType::Boolean => "boolean",
        FieldType::NumericRange => "numeric-range",
        FieldType::DateRange => "date-range",
        FieldType::Rating { .. } => "rating",
    }
}
