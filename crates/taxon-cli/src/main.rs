use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;

use taxon_core::config::Config;
use taxon_core::hooks::{
    Action, AllowAll, AuthGate, CacheInvalidator, NoopInvalidator, CATEGORY_SCOPE,
};
use taxon_core::store::CategoryStore;
use taxon_core::tree::partition;
use taxon_core::{Category, Result, Selection, TaxonError};

mod args;
use args::{Cli, Commands, ConfigAction, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let base_dir = resolve_base_dir(cli.base_dir);

    let result = match cli.command {
        Some(Commands::Add { name, parent }) => handle_add(&base_dir, &name, parent),
        Some(Commands::Rename { id, name }) => handle_rename(&base_dir, id, &name),
        Some(Commands::List {
            parent,
            roots,
            json,
        }) => handle_list(&base_dir, parent, roots, json),
        Some(Commands::Tree {
            root,
            first,
            second,
            json,
        }) => handle_tree(
            &base_dir,
            root.as_deref(),
            first.as_deref(),
            second.as_deref(),
            json,
        ),
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "taxon", &mut io::stdout());
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    if let Ok(base) = std::env::var("TAXON_BASE") {
        return PathBuf::from(base);
    }

    dirs::home_dir()
        .map(|h| h.join(".taxon"))
        .unwrap_or_else(|| PathBuf::from(".taxon"))
}

fn open_store(base_dir: &Path) -> Result<CategoryStore> {
    let config = Config::load(base_dir)?;
    CategoryStore::load_with_file(base_dir, &config.catalog.file)
}

/// Auth is checked here, before the store sees the mutation; the store
/// itself never authenticates.
fn require_clearance(gate: &impl AuthGate, action: Action) -> Result<()> {
    if !gate.is_authenticated() || !gate.is_authorized(action) {
        return Err(TaxonError::Forbidden {
            action: action.as_str().to_string(),
        });
    }
    Ok(())
}

fn handle_add(base_dir: &Path, name: &str, parent: Option<u64>) -> Result<()> {
    require_clearance(&AllowAll, Action::CreateCategory)?;

    let store = open_store(base_dir)?;
    let category = store.create(name, parent)?;
    NoopInvalidator.invalidate(CATEGORY_SCOPE);

    println!(
        "{} {} (id {}, depth {})",
        "Created:".green(),
        category.name,
        category.id,
        category.depth
    );
    Ok(())
}

fn handle_rename(base_dir: &Path, id: u64, name: &str) -> Result<()> {
    require_clearance(&AllowAll, Action::RenameCategory)?;

    let store = open_store(base_dir)?;
    let category = store.rename(id, name)?;
    NoopInvalidator.invalidate(CATEGORY_SCOPE);

    println!("{} {} -> {}", "Renamed:".green(), id, category.name);
    Ok(())
}

fn handle_list(base_dir: &Path, parent: Option<u64>, roots: bool, json: bool) -> Result<()> {
    let store = open_store(base_dir)?;

    let categories = if roots {
        store.children_of(None)?
    } else if parent.is_some() {
        store.children_of(parent)?
    } else {
        store.all()?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    if categories.is_empty() {
        println!("No categories.");
        return Ok(());
    }

    for c in &categories {
        let indent = "  ".repeat(c.depth as usize);
        match c.parent_id {
            Some(pid) => {
                let origin = format!("(parent {})", pid);
                println!("{:>4}  {}{}  {}", c.id, indent, c.name, origin.dimmed());
            }
            None => println!("{:>4}  {}{}", c.id, indent, c.name.cyan()),
        }
    }
    Ok(())
}

fn handle_tree(
    base_dir: &Path,
    root: Option<&str>,
    first: Option<&str>,
    second: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = Config::load(base_dir)?;
    let store = CategoryStore::load_with_file(base_dir, &config.catalog.file)?;

    let selection = Selection::decode(root, first, second);
    let all = store.all()?;
    let view = partition(&all, &selection);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let glyphs = config.output.tree_glyphs;

    println!();
    print_level("Roots", &view.roots, selection.root_id, glyphs);

    if selection.root_id.is_some() {
        let title = view
            .selected_root
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "(unknown root)".to_string());
        println!();
        print_level(&title, &view.first_level, selection.first_id, glyphs);
    }

    if selection.first_id.is_some() {
        let title = view
            .selected_first
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "(unknown category)".to_string());
        println!();
        print_level(&title, &view.second_level, selection.second_id, glyphs);
    }

    println!();
    Ok(())
}

fn print_level(title: &str, level: &[Category], selected: Option<u64>, glyphs: bool) {
    println!("{}:", title.bold());

    if level.is_empty() {
        println!("  (none)");
        return;
    }

    let (tee, elbow) = if glyphs {
        ("├──", "└──")
    } else {
        ("|--", "`--")
    };

    for (i, c) in level.iter().enumerate() {
        let branch = if i + 1 == level.len() { elbow } else { tee };
        let label = format!("[{}] {}", c.id, c.name);
        if selected == Some(c.id) {
            println!("  {} {} {}", branch, label.green().bold(), "*".green());
        } else {
            println!("  {} {}", branch, label);
        }
    }
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(TaxonError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(base_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}
