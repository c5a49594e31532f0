use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("questboard-{nanos}-{label}"))
}

fn questboard(dir: &PathBuf) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_questboard"));
    cmd.env("QUESTBOARD_DATA_DIR", dir);
    cmd.env("QUESTBOARD_CONFIG_PATH", dir.join("no-config.json"));
    cmd
}

#[test]
fn category_add_creates_prefixed_custom_category() {
    let dir = temp_dir("cli-category-add");

    let output = questboard(&dir)
        .args(["--json", "category", "add", "Side project"])
        .output()
        .expect("failed to run category command");

    std::fs::remove_dir_all(&dir).ok();
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output");

    assert!(parsed["id"].as_str().expect("id string").starts_with("cat_"));
    assert_eq!(parsed["name"], "Side project");
    assert_eq!(parsed["type"], "custom");
}

#[test]
fn category_remove_repoints_quests_to_inbox() {
    let dir = temp_dir("cli-category-remove");

    let added = questboard(&dir)
        .args(["--json", "category", "add", "Side project"])
        .output()
        .expect("failed to run category command");
    assert!(added.status.success());
    let category: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&added.stdout)).expect("json output");
    let category_id = category["id"].as_str().expect("id string").to_string();

    let add = questboard(&dir)
        .args(["add", "Orphan me", "--category", &category_id])
        .output()
        .expect("failed to run add command");
    assert!(add.status.success());

    let removed = questboard(&dir)
        .args(["category", "remove", &category_id])
        .output()
        .expect("failed to run category command");
    assert!(removed.status.success());

    let tasks: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("tasks.json")).unwrap()).unwrap();
    let categories: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("categories.json")).unwrap())
            .unwrap();
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(tasks[0]["categoryId"], "inbox");
    let remaining = categories.as_array().expect("category array");
    assert!(remaining.iter().all(|c| c["id"] != category_id.as_str()));
}

#[test]
fn category_remove_refuses_the_inbox() {
    let dir = temp_dir("cli-category-inbox");

    // First invocation seeds the default categories.
    let list = questboard(&dir)
        .args(["category", "list"])
        .output()
        .expect("failed to run category command");
    assert!(list.status.success());

    let output = questboard(&dir)
        .args(["category", "remove", "inbox"])
        .output()
        .expect("failed to run category command");

    std::fs::remove_dir_all(&dir).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("inbox cannot be removed"));
}

#[test]
fn stats_json_reports_fresh_defaults() {
    let dir = temp_dir("cli-stats");

    let output = questboard(&dir)
        .args(["--json", "stats"])
        .output()
        .expect("failed to run stats command");

    std::fs::remove_dir_all(&dir).ok();
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output");

    assert_eq!(parsed["level"], 1);
    assert_eq!(parsed["currentXp"], 0);
    assert_eq!(parsed["nextLevelXp"], 100);
    assert_eq!(parsed["totalXpEarned"], 0);
    assert_eq!(parsed["questsCompleted"], 0);
}

#[test]
fn xp_command_levels_up_and_persists() {
    let dir = temp_dir("cli-xp");

    let output = questboard(&dir)
        .args(["xp", "250"])
        .output()
        .expect("failed to run xp command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Level 2 | 150/240 XP"));

    let remove = questboard(&dir)
        .args(["--json", "xp", "250", "--remove"])
        .output()
        .expect("failed to run xp command");

    std::fs::remove_dir_all(&dir).ok();
    assert!(remove.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&remove.stdout)).expect("json output");

    assert_eq!(parsed["level"], 1);
    assert_eq!(parsed["currentXp"], 0);
    // Leveling down recomputes the threshold from the curve.
    assert_eq!(parsed["nextLevelXp"], 120);
}

#[test]
fn achievements_command_marks_unlock_state() {
    let dir = temp_dir("cli-achievements");

    let add = questboard(&dir)
        .args(["--json", "add", "One and done", "--xp", "5"])
        .output()
        .expect("failed to run add command");
    assert!(add.status.success());
    let added: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&add.stdout)).expect("json output");
    let id = added["id"].as_str().expect("id string").to_string();

    let done = questboard(&dir)
        .args(["done", &id])
        .output()
        .expect("failed to run done command");
    assert!(done.status.success());

    let output = questboard(&dir)
        .args(["--json", "achievements"])
        .output()
        .expect("failed to run achievements command");

    std::fs::remove_dir_all(&dir).ok();
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output");
    let entries = parsed.as_array().expect("achievement array");

    let first = entries
        .iter()
        .find(|entry| entry["id"] == "first_quest")
        .expect("first_quest entry");
    assert_eq!(first["unlocked"], true);
    let master = entries
        .iter()
        .find(|entry| entry["id"] == "quest_master")
        .expect("quest_master entry");
    assert_eq!(master["unlocked"], false);
}

#[test]
fn config_override_rejects_unknown_keys() {
    let dir = temp_dir("cli-override");

    let output = questboard(&dir)
        .args(["--config-override", "theme=noir", "stats"])
        .output()
        .expect("failed to run stats command");

    std::fs::remove_dir_all(&dir).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn config_override_selects_the_remote_backend() {
    let dir = temp_dir("cli-remote");
    let db_path = dir.join("questboard.db");
    let db_arg = format!("databasePath={}", db_path.display());

    let output = questboard(&dir)
        .args([
            "--config-override",
            "storageMode=remote",
            "--config-override",
            &db_arg,
            "--config-override",
            "userId=user-1",
            "add",
            "Stored remotely",
        ])
        .output()
        .expect("failed to run add command");

    assert!(output.status.success());
    assert!(db_path.exists());
    // Local JSON files stay untouched in remote mode.
    assert!(!dir.join("tasks.json").exists());
    std::fs::remove_dir_all(&dir).ok();
}
