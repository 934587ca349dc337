use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use ganttstore::{Config, Filter, Task, TaskField, TaskStore, jsonl};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ganttstore")]
#[command(about = "ganttstore CLI - edit a Gantt task list snapshot from the terminal")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Snapshot file to operate on (overrides the config)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Config file (default: <config dir>/ganttstore/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the built-in construction schedule to the snapshot
    Seed {
        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },

    /// Print the task tree
    List {
        /// Only tasks assigned to this person
        #[arg(long)]
        assignee: Option<String>,

        /// Only tasks of this type
        #[arg(long = "type")]
        task_type: Option<String>,
    },

    /// Insert a blank task at a row and print its id
    Add { position: usize },

    /// Remove a task
    Delete { id: String },

    /// Nest a task (and its subtree) one level deeper
    Indent { id: String },

    /// Lift a task (and its subtree) one level
    Unindent { id: String },

    /// Set a cell: name, task-type, assignee, duration, start-date, end-date, progress, dependencies
    Set {
        row: usize,
        field: TaskField,
        value: String,
    },

    /// Report hierarchy violations; fails if there are any
    Check,
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let path = cli.file.unwrap_or(config.tasks_file);

    // Held until main returns, covering load, mutation and save
    let _lock = jsonl::lock_snapshot(&path)?;

    let mut store = open_store(&path, config.seed_when_missing)?;

    let changed = match cli.command {
        Commands::Seed { force } => {
            if path.exists() && !force {
                return Err(eyre!("{} already exists (use --force to overwrite)", path.display()));
            }
            store = TaskStore::seeded();
            println!("Seeding {} tasks into {}", store.len(), path.display());
            true
        }
        Commands::List { assignee, task_type } => {
            let mut filters = Vec::new();
            if let Some(a) = assignee {
                filters.push(Filter::eq_str("assignee", a));
            }
            if let Some(t) = task_type {
                filters.push(Filter::eq_str("task_type", t));
            }
            print_tree(&store, &filters);
            false
        }
        Commands::Add { position } => {
            let id = store.add(position);
            println!("{}", id);
            true
        }
        Commands::Delete { id } => report(store.delete(&id), &format!("delete {}", id)),
        Commands::Indent { id } => report(store.indent(&id), &format!("indent {}", id)),
        Commands::Unindent { id } => report(store.unindent(&id), &format!("unindent {}", id)),
        Commands::Set { row, field, value } => report(
            store.set_field(row, field, &value),
            &format!("set row {} {} = {:?}", row, field, value),
        ),
        Commands::Check => {
            let violations = store.check();
            if !violations.is_empty() {
                for v in &violations {
                    println!("{} {}", "✗".red(), v);
                }
                return Err(eyre!("{} hierarchy violation(s) in {}", violations.len(), path.display()));
            }
            println!("{} {} tasks, hierarchy consistent", "✓".green(), store.len());
            false
        }
    };

    if changed {
        jsonl::write_jsonl(&path, store.tasks())?;
        info!(file = ?path, "Snapshot saved");
    }

    Ok(())
}

fn open_store(path: &Path, seed_when_missing: bool) -> Result<TaskStore> {
    if !path.exists() && seed_when_missing {
        info!(file = ?path, "No snapshot yet, starting from the built-in schedule");
        return Ok(TaskStore::seeded());
    }
    Ok(TaskStore::from_tasks(jsonl::read_jsonl(path)?))
}

fn report(applied: bool, what: &str) -> bool {
    if !applied {
        println!("{} {}: nothing changed", "!".yellow(), what);
    }
    applied
}

fn print_tree(store: &TaskStore, filters: &[Filter]) {
    println!(
        "{}",
        format!("{:>4}  {:<40} {:<10} {:<10} {:>5} {:>5}  {}", "row", "task", "start", "end", "days", "done", "assignee")
            .bold()
    );

    for task in store.list(filters) {
        let row = store.position(&task.id).unwrap_or_default();
        println!("{:>4}  {}", row.to_string().dimmed(), format_task(task));
    }
}

fn format_task(task: &Task) -> String {
    let label = format!("{}{}", "  ".repeat(task.indent as usize), display_name(task));
    let label = format!("{:<40}", label);
    let label = if task.indent == 0 { label.bold().to_string() } else { label };

    let progress = format!("{:>4}%", task.progress.round() as i64);
    let progress = if task.progress >= 100.0 {
        progress.green()
    } else if task.progress > 0.0 {
        progress.yellow()
    } else {
        progress.normal()
    };

    format!(
        "{} {:<10} {:<10} {:>5} {}  {}",
        label,
        task.start_date,
        task.end_date,
        task.duration,
        progress,
        task.assignee.cyan()
    )
}

fn display_name(task: &Task) -> String {
    if task.name.is_empty() {
        format!("(untitled {})", task.id.chars().take(8).collect::<String>())
    } else {
        task.name.clone()
    }
}
