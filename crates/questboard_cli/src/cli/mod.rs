use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new quest
    ///
    /// Example: questboard add "Buy milk" --xp 20 --priority high
    /// Example: questboard add "Ship release" --due 2026-09-01 --tag work --tag urgent
    Add {
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// low, medium, or high
        #[arg(long)]
        priority: Option<String>,
        /// XP awarded when the quest is completed
        #[arg(long)]
        xp: Option<u32>,
        /// Category id (defaults to the inbox)
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },
    /// List quests
    ///
    /// Example: questboard list
    /// Example: questboard list category inbox
    /// Example: questboard list done
    List {
        #[command(subcommand)]
        scope: Option<ListScope>,
    },
    /// Edit fields of a quest
    ///
    /// Example: questboard edit <id> --title "Buy organic milk" --xp 30
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        xp: Option<u32>,
        /// Replaces the tag list when given at least once
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },
    /// Delete a quest
    ///
    /// Example: questboard delete <id>
    Delete {
        id: String,
    },
    /// Mark a quest as in progress
    ///
    /// Example: questboard start <id>
    Start {
        id: String,
    },
    /// Mark a quest as done, counting it and granting its XP
    ///
    /// Example: questboard done <id>
    Done {
        id: String,
    },
    /// Mark a done quest as todo again, reversing its count and XP
    ///
    /// Example: questboard undone <id>
    Undone {
        id: String,
    },
    /// Move a quest to another category
    ///
    /// Example: questboard move <id> work
    Move {
        id: String,
        category: String,
    },
    /// Move the listed quests to the front, in the given order
    ///
    /// Example: questboard reorder <id-2> <id-1>
    Reorder {
        ids: Vec<String>,
    },
    /// Manage categories
    ///
    /// Example: questboard category add "Side project"
    Category {
        #[command(subcommand)]
        action: CategoryCommand,
    },
    /// Grant or revoke XP directly
    ///
    /// Example: questboard xp 50
    /// Example: questboard xp 50 --remove
    Xp {
        amount: u32,
        #[arg(long)]
        remove: bool,
    },
    /// Show level, XP, and quest-count stats
    ///
    /// Example: questboard stats
    Stats,
    /// Show the achievement catalog with unlock state
    ///
    /// Example: questboard achievements
    Achievements,
}

#[derive(Subcommand, Debug)]
pub enum ListScope {
    /// List every quest
    All,
    /// List quests in one category
    ///
    /// Example: questboard list category inbox
    Category {
        id: String,
    },
    /// List completed quests
    Done,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// Create a custom category
    Add {
        name: String,
    },
    /// Delete a custom category; its quests move to the inbox
    Remove {
        id: String,
    },
    /// List categories
    List,
}
