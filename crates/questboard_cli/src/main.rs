use clap::{CommandFactory, Parser};
use questboard_core::board::{QuestBoard, TaskDraft, TaskPatch};
use questboard_core::config;
use questboard_core::error::AppError;
use questboard_core::model::{INBOX_CATEGORY_ID, Priority, Status, Task};
use questboard_core::progress::achievements;
use questboard_core::storage::backend_for_config;
use std::io::{self, BufRead};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{CategoryCommand, Cli, Command, ListScope};

#[derive(Tabled)]
struct QuestRow {
    id: String,
    title: String,
    status: &'static str,
    priority: &'static str,
    xp: u32,
    category: String,
    due: String,
}

impl QuestRow {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status.as_str(),
            priority: task.priority.as_str(),
            xp: task.xp,
            category: task.category_id.clone(),
            due: if task.due_date.is_empty() {
                "-".to_string()
            } else {
                task.due_date.clone()
            },
        }
    }
}

fn print_tasks_plain(tasks: &[&Task]) {
    if tasks.is_empty() {
        println!("No quests.");
        return;
    }
    let rows: Vec<QuestRow> = tasks.iter().map(|task| QuestRow::from_task(task)).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn announce_unlocks(board: &mut QuestBoard, json: bool) {
    if !json {
        for achievement in board.recent_unlocks() {
            println!(
                "Achievement unlocked: {} {} ({})",
                achievement.icon, achievement.title, achievement.description
            );
        }
    }
    board.clear_recent_unlocks();
}

fn parse_priority(raw: &str) -> Result<Priority, AppError> {
    Priority::parse(raw)
        .ok_or_else(|| AppError::invalid_input(format!("unknown priority: {raw}")))
}

fn require_known_task(board: &QuestBoard, id: &str) -> Result<(), AppError> {
    if id.trim().is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    if board.task(id).is_none() {
        return Err(AppError::invalid_input(format!("no quest with id {id}")));
    }
    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn load_board(config_override: &[String]) -> Result<QuestBoard, AppError> {
    let overrides = config::ConfigOverrides::parse(config_override)?;
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!("configuration unreadable, using defaults: {err}");
    }
    let merged = config::merge_overrides(&loaded.config, &overrides);
    let backend = backend_for_config(&merged)?;
    QuestBoard::load(backend)
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let mut board = load_board(&cli.config_override)?;

    match cli.command {
        Command::Add {
            title,
            desc,
            due,
            priority,
            xp,
            category,
            tags,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("title is required")),
            };

            let mut draft = TaskDraft {
                title,
                description: desc,
                tags,
                ..TaskDraft::default()
            };
            if let Some(due) = due {
                draft.due_date = due;
            }
            if let Some(raw) = priority.as_deref() {
                draft.priority = parse_priority(raw)?;
            }
            if let Some(xp) = xp {
                draft.xp = xp;
            }
            if let Some(category) = category {
                if !board.categories().iter().any(|c| c.id == category) {
                    return Err(AppError::invalid_input(format!(
                        "no category with id {category}"
                    )));
                }
                draft.category_id = category;
            }

            let task = board.add_task(draft)?;
            if cli.json {
                print_json(&task)?;
            } else {
                println!("Added quest: {} ({})", task.title, task.id);
            }
        }
        Command::List { scope } => {
            let tasks: Vec<&Task> = match scope {
                None | Some(ListScope::All) => board.tasks().iter().collect(),
                Some(ListScope::Category { id }) => board
                    .tasks()
                    .iter()
                    .filter(|task| task.category_id == id)
                    .collect(),
                Some(ListScope::Done) => board
                    .tasks()
                    .iter()
                    .filter(|task| task.status == Status::Done)
                    .collect(),
            };
            if cli.json {
                print_json(&tasks)?;
            } else {
                print_tasks_plain(&tasks);
            }
        }
        Command::Edit {
            id,
            title,
            desc,
            due,
            priority,
            xp,
            tags,
        } => {
            require_known_task(&board, &id)?;
            let priority = match priority.as_deref() {
                Some(raw) => Some(parse_priority(raw)?),
                None => None,
            };
            let patch = TaskPatch {
                title,
                description: desc,
                due_date: due,
                priority,
                xp,
                tags: if tags.is_empty() { None } else { Some(tags) },
                ..TaskPatch::default()
            };
            if let Some(task) = board.update_task(&id, patch) {
                if cli.json {
                    print_json(&task)?;
                } else {
                    println!("Updated quest: {} ({})", task.title, task.id);
                }
            }
        }
        Command::Delete { id } => {
            require_known_task(&board, &id)?;
            if let Some(task) = board.delete_task(&id) {
                if cli.json {
                    print_json(&task)?;
                } else {
                    println!("Deleted quest: {} ({})", task.title, task.id);
                }
            }
        }
        Command::Start { id } => {
            require_known_task(&board, &id)?;
            board.set_task_status(&id, Status::InProgress)?;
            if let Some(task) = board.task(&id) {
                if cli.json {
                    print_json(task)?;
                } else {
                    println!("Started quest: {} ({})", task.title, task.id);
                }
            }
        }
        Command::Done { id } => {
            require_known_task(&board, &id)?;
            board.set_task_status(&id, Status::Done)?;
            if let Some(task) = board.task(&id) {
                if cli.json {
                    print_json(task)?;
                } else {
                    println!("Completed quest: {} (+{} XP)", task.title, task.xp);
                }
            }
            announce_unlocks(&mut board, cli.json);
        }
        Command::Undone { id } => {
            require_known_task(&board, &id)?;
            board.set_task_status(&id, Status::Todo)?;
            if let Some(task) = board.task(&id) {
                if cli.json {
                    print_json(task)?;
                } else {
                    println!("Reopened quest: {} (-{} XP)", task.title, task.xp);
                }
            }
        }
        Command::Move { id, category } => {
            require_known_task(&board, &id)?;
            if !board.categories().iter().any(|c| c.id == category) {
                return Err(AppError::invalid_input(format!(
                    "no category with id {category}"
                )));
            }
            if let Some(task) = board.move_task(&id, &category) {
                if cli.json {
                    print_json(&task)?;
                } else {
                    println!("Moved quest: {} -> {}", task.title, task.category_id);
                }
            }
        }
        Command::Reorder { ids } => {
            if ids.is_empty() {
                return Err(AppError::invalid_input("at least one id is required"));
            }
            board.reorder_tasks(&ids);
            if cli.json {
                print_json(&board.tasks())?;
            } else {
                let listed: Vec<&Task> = board.tasks().iter().collect();
                print_tasks_plain(&listed);
            }
        }
        Command::Category { action } => match action {
            CategoryCommand::Add { name } => {
                if name.trim().is_empty() {
                    return Err(AppError::invalid_input("name is required"));
                }
                let category = board.add_category(&name);
                if cli.json {
                    print_json(&category)?;
                } else {
                    println!("Added category: {} ({})", category.name, category.id);
                }
            }
            CategoryCommand::Remove { id } => {
                let Some(category) = board.categories().iter().find(|c| c.id == id) else {
                    return Err(AppError::invalid_input(format!(
                        "no category with id {id}"
                    )));
                };
                if id == INBOX_CATEGORY_ID {
                    return Err(AppError::invalid_input("the inbox cannot be removed"));
                }
                let name = category.name.clone();
                board.delete_category(&id);
                if cli.json {
                    print_json(&serde_json::json!({ "id": id, "name": name }))?;
                } else {
                    println!("Removed category: {name} ({id})");
                }
            }
            CategoryCommand::List => {
                if cli.json {
                    print_json(&board.categories())?;
                } else {
                    for category in board.categories() {
                        println!(
                            "{} | {} | {}",
                            category.id,
                            category.name,
                            category.kind.as_str()
                        );
                    }
                }
            }
        },
        Command::Xp { amount, remove } => {
            if remove {
                board.revoke_xp(amount);
            } else {
                board.grant_xp(amount);
            }
            let stats = board.stats();
            if cli.json {
                print_json(stats)?;
            } else {
                println!(
                    "Level {} | {}/{} XP",
                    stats.level, stats.current_xp, stats.next_level_xp
                );
            }
            announce_unlocks(&mut board, cli.json);
        }
        Command::Stats => {
            let stats = board.stats();
            if cli.json {
                print_json(stats)?;
            } else {
                println!("Level:            {}", stats.level);
                println!(
                    "XP:               {}/{}",
                    stats.current_xp, stats.next_level_xp
                );
                println!("Total XP earned:  {}", stats.total_xp_earned);
                println!("Quests completed: {}", stats.quests_completed);
                println!(
                    "Achievements:     {}/{}",
                    stats.unlocked_achievements.len(),
                    achievements::CATALOG.len()
                );
            }
        }
        Command::Achievements => {
            let unlocked = &board.stats().unlocked_achievements;
            if cli.json {
                let payload: Vec<serde_json::Value> = achievements::CATALOG
                    .iter()
                    .map(|achievement| {
                        serde_json::json!({
                            "id": achievement.id,
                            "title": achievement.title,
                            "description": achievement.description,
                            "icon": achievement.icon,
                            "unlocked": unlocked.iter().any(|id| id == achievement.id),
                        })
                    })
                    .collect();
                print_json(&payload)?;
            } else {
                for achievement in achievements::CATALOG {
                    let mark = if unlocked.iter().any(|id| id == achievement.id) {
                        "[x]"
                    } else {
                        "[ ]"
                    };
                    println!(
                        "{} {} {} - {}",
                        mark, achievement.icon, achievement.title, achievement.description
                    );
                }
            }
        }
    }

    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("questboard".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
