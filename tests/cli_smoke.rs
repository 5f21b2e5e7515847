use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

struct CliEnv {
    dir: TempDir,
}

impl CliEnv {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    /// A `td` invocation pinned to an isolated memory backend and data dir.
    fn td(&self) -> Command {
        let mut cmd = Command::cargo_bin("td").expect("binary");
        cmd.env_remove("TASKDECK_CONFIG")
            .env_remove("TASKDECK_PASSWORD")
            .env_remove("RUST_LOG")
            .env("TASKDECK_BACKEND", "memory")
            .env(
                "TASKDECK_STATE",
                self.dir.path().join("state.json").display().to_string(),
            )
            .env("TASKDECK_DATA", self.dir.path().join("data").display().to_string());
        cmd
    }

    fn register_demo(&self) {
        self.td()
            .args([
                "register",
                "demo@example.com",
                "--username",
                "demo",
                "--password",
                "password",
            ])
            .assert()
            .success();
    }
}

fn json_data(output: &[u8]) -> serde_json::Value {
    let parsed: serde_json::Value = serde_json::from_slice(output).expect("json output");
    assert_eq!(parsed["status"], "success");
    parsed["data"].clone()
}

#[test]
fn td_help_works() {
    Command::cargo_bin("td")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("taskdeck"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = ["login", "register", "logout", "whoami", "profile", "task", "dash"];

    for cmd in subcommands {
        Command::cargo_bin("td")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn login_without_password_is_a_user_error() {
    let env = CliEnv::new();
    env.td()
        .args(["login", "demo@example.com"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn whoami_reports_unauthenticated_without_a_session() {
    let env = CliEnv::new();
    let output = env
        .td()
        .args(["whoami", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let data = json_data(&output);
    assert_eq!(data["authenticated"], false);
}

#[test]
fn register_then_whoami_is_authenticated() {
    let env = CliEnv::new();
    env.register_demo();

    let output = env
        .td()
        .args(["whoami", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let data = json_data(&output);
    assert_eq!(data["authenticated"], true);
    assert_eq!(data["username"], "demo");
}

#[test]
fn task_lifecycle_end_to_end() {
    let env = CliEnv::new();
    env.register_demo();

    // add
    let output = env
        .td()
        .args([
            "task",
            "add",
            "Write spec",
            "--description",
            "draft v1",
            "--priority",
            "high",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let added = json_data(&output);
    assert_eq!(added["status"], "todo");
    assert_eq!(added["priority"], "high");
    let id = added["id"].as_str().expect("task id").to_string();
    assert!(!id.is_empty());

    // ls sees it
    let output = env
        .td()
        .args(["task", "ls", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let listed = json_data(&output);
    assert_eq!(listed.as_array().expect("array").len(), 1);

    // filtered out by search
    let output = env
        .td()
        .args(["task", "ls", "--search", "standup", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let listed = json_data(&output);
    assert!(listed.as_array().expect("array").is_empty());

    // counts
    let output = env
        .td()
        .args(["task", "count", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let counts = json_data(&output);
    assert_eq!(counts["todo"], 1);
    assert_eq!(counts["completed"], 0);

    // cycle twice: todo -> in-progress -> completed
    let output = env
        .td()
        .args(["task", "cycle", &id, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(json_data(&output)["status"], "in-progress");

    let output = env
        .td()
        .args(["task", "cycle", &id, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(json_data(&output)["status"], "completed");

    // rm, then rm again fails as a user error
    env.td().args(["task", "rm", &id]).assert().success();
    env.td()
        .args(["task", "rm", &id])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn task_commands_require_authentication() {
    let env = CliEnv::new();
    env.td()
        .args(["task", "ls"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Not authenticated"));
}

#[test]
fn logout_clears_the_session() {
    let env = CliEnv::new();
    env.register_demo();

    env.td().arg("logout").assert().success();

    let output = env
        .td()
        .args(["whoami", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let data = json_data(&output);
    assert_eq!(data["authenticated"], false);
}

#[test]
fn profile_set_updates_theme() {
    let env = CliEnv::new();
    env.register_demo();

    let output = env
        .td()
        .args(["profile", "set", "--theme", "light", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let profile = json_data(&output);
    assert_eq!(profile["theme"], "light");

    let output = env
        .td()
        .args(["whoami", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let data = json_data(&output);
    assert_eq!(data["theme"], "light");
}

#[test]
fn profile_set_without_fields_is_a_user_error() {
    let env = CliEnv::new();
    env.register_demo();

    env.td()
        .args(["profile", "set"])
        .assert()
        .failure()
        .code(2);
}
