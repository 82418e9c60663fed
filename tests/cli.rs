#[cfg(test)]
mod tests {
    use museo::db::flags::FlagStore;
    use museo::libs::config::DEFAULT_ENTRY_FLAG_KEY;
    use museo::libs::daemon::PID_FILE;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Output, Stdio};
    use std::thread;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    const ENV_VARS: [&str; 7] = [
        "MUSEO_LAT",
        "MUSEO_LON",
        "MUSEO_RADIUS",
        "MUSEO_POLL_INTERVAL",
        "MUSEO_DISTANCE_FORMULA",
        "MUSEO_DEBUG",
        "RUST_LOG",
    ];

    /// Runs the binary with its data directory inside a temp dir.
    struct CliTestContext {
        temp_dir: TempDir,
    }

    impl TestContext for CliTestContext {
        fn setup() -> Self {
            CliTestContext {
                temp_dir: tempfile::tempdir().unwrap(),
            }
        }

        fn teardown(self) {
            let _ = self.command().args(["watch", "--stop"]).output();
        }
    }

    impl CliTestContext {
        fn command(&self) -> Command {
            let mut command = Command::new(env!("CARGO_BIN_EXE_museo"));
            command
                .current_dir(self.temp_dir.path())
                .env("HOME", self.temp_dir.path())
                .env("LOCALAPPDATA", self.temp_dir.path());
            for name in ENV_VARS {
                command.env_remove(name);
            }
            command
        }

        fn run(&self, args: &[&str]) -> Output {
            self.command().args(args).output().unwrap()
        }

        fn data_file(&self, name: &str) -> PathBuf {
            let base: &Path = self.temp_dir.path();
            if cfg!(target_os = "windows") {
                base.join("museo").join("museo").join(name)
            } else if cfg!(target_os = "macos") {
                base.join("Library/Application Support/museo/museo").join(name)
            } else {
                base.join(".local/share/museo/museo").join(name)
            }
        }
    }

    fn stdout(output: &Output) -> String {
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    #[test_context(CliTestContext)]
    #[test]
    fn test_check_inside(ctx: &mut CliTestContext) {
        let output = ctx.run(&["check", "-31.4201", "-64.1888"]);

        assert!(output.status.success());
        assert!(stdout(&output).contains("Inside the museum: 0.00m"), "{}", stdout(&output));
    }

    #[test_context(CliTestContext)]
    #[test]
    fn test_check_outside(ctx: &mut CliTestContext) {
        let output = ctx.run(&["check", "-31.4301", "-64.1888"]);

        assert!(output.status.success());
        assert!(stdout(&output).contains("Outside the museum"), "{}", stdout(&output));
    }

    #[test_context(CliTestContext)]
    #[test]
    fn test_check_honours_env_radius(ctx: &mut CliTestContext) {
        let output = ctx
            .command()
            .env("MUSEO_RADIUS", "5000")
            .args(["check", "-31.4301", "-64.1888"])
            .output()
            .unwrap();

        assert!(stdout(&output).contains("Inside the museum"), "{}", stdout(&output));
    }

    #[test_context(CliTestContext)]
    #[test]
    fn test_invalid_env_value_fails(ctx: &mut CliTestContext) {
        let output = ctx
            .command()
            .env("MUSEO_RADIUS", "-1")
            .args(["check", "0", "0"])
            .output()
            .unwrap();

        assert!(!output.status.success());
    }

    #[test_context(CliTestContext)]
    #[test]
    fn test_reset_clears_flag(ctx: &mut CliTestContext) {
        let db_path = ctx.data_file("museo.db");
        std::fs::create_dir_all(db_path.parent().unwrap()).unwrap();
        FlagStore::open(&db_path).unwrap().upsert(DEFAULT_ENTRY_FLAG_KEY, "true").unwrap();

        let output = ctx.run(&["reset"]);
        assert!(output.status.success());

        let store = FlagStore::open(&db_path).unwrap();
        assert!(store.fetch(DEFAULT_ENTRY_FLAG_KEY).unwrap().is_none());
    }

    #[test_context(CliTestContext)]
    #[test]
    fn test_status_without_watcher(ctx: &mut CliTestContext) {
        let output = ctx.run(&["status"]);

        assert!(output.status.success());
        let text = stdout(&output);
        assert!(text.contains("not set"), "{}", text);
        assert!(text.contains("not running"), "{}", text);
    }

    #[test_context(CliTestContext)]
    #[test]
    fn test_stop_without_watcher_is_ok(ctx: &mut CliTestContext) {
        let output = ctx.run(&["watch", "--stop"]);
        assert!(output.status.success());
    }

    #[test_context(CliTestContext)]
    #[test]
    fn test_status_ignores_stale_pid_file(ctx: &mut CliTestContext) {
        // A process that has already exited and been reaped
        let mut finished = Command::new(env!("CARGO_BIN_EXE_museo"))
            .arg("--version")
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        let dead_pid = finished.id();
        finished.wait().unwrap();

        let pid_path = ctx.data_file(PID_FILE);
        std::fs::create_dir_all(pid_path.parent().unwrap()).unwrap();
        std::fs::write(&pid_path, dead_pid.to_string()).unwrap();

        let output = ctx.run(&["status"]);
        assert!(output.status.success());
        let text = stdout(&output);
        assert!(text.contains("not running"), "{}", text);
        assert!(!text.contains(&format!("PID {}", dead_pid)), "{}", text);
    }

    #[test_context(CliTestContext)]
    #[test]
    fn test_watch_lifecycle(ctx: &mut CliTestContext) {
        let pid_path = ctx.data_file(PID_FILE);

        // Returns right away: the detached watcher does not hold on to our pipes
        let started = Instant::now();
        let output = ctx.run(&["watch"]);
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(pid_path.exists(), "PID file should exist after starting watch");

        let first_pid = std::fs::read_to_string(&pid_path).unwrap();
        thread::sleep(Duration::from_millis(500));
        let status = stdout(&ctx.run(&["status"]));
        assert!(status.contains(&format!("PID {}", first_pid.trim())), "{}", status);

        // A second start replaces the first watcher
        let output = ctx.run(&["watch"]);
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let second_pid = std::fs::read_to_string(&pid_path).unwrap();
        assert_ne!(first_pid.trim(), second_pid.trim());

        thread::sleep(Duration::from_millis(500));
        let output = ctx.run(&["watch", "--stop"]);
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        assert!(!pid_path.exists(), "PID file should be removed after stopping");
    }
}
