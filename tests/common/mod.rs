// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

pub const RUN_TESTS_TEMPLATE: &str = "#!/bin/sh\necho \"testing %%MODULE_NAME%%\"\n";
pub const RUN_BASH_TEMPLATE: &str = "#!/bin/sh\nexec /bin/sh -c \"cd /kb/module/%%MODULE_NAME%% && $*\"\n";

/// A base directory laid out the way a batch run expects it:
///
/// ```text
/// <base>/templates/test_local/{run_tests.sh, run_bash.sh, readme.txt}
/// <base>/test.cfg
/// <base>/remotes/<module>/run.sh
/// ```
///
/// Modules are "checked out" by copying them from `remotes/`, and their test
/// command runs `run.sh`, so every scenario stays local and deterministic.
pub struct BatchFixture {
    pub dir: TempDir,
}

impl BatchFixture {
    pub fn new() -> Self {
        let dir = tempdir().expect("Failed to create temporary directory");
        let template = dir.path().join("templates").join("test_local");
        fs::create_dir_all(&template).expect("Failed to create template directory");
        fs::write(template.join("run_tests.sh"), RUN_TESTS_TEMPLATE).expect("Failed to write run_tests.sh");
        fs::write(template.join("run_bash.sh"), RUN_BASH_TEMPLATE).expect("Failed to write run_bash.sh");
        fs::write(template.join("readme.txt"), "%%MODULE_NAME%% stays here\n").expect("Failed to write readme.txt");
        fs::write(dir.path().join("test.cfg"), "test_token=abc\n").expect("Failed to write test.cfg");
        fs::create_dir_all(dir.path().join("remotes")).expect("Failed to create remotes directory");
        Self { dir }
    }

    pub fn base(&self) -> &Path {
        self.dir.path()
    }

    pub fn harness_config(&self) -> PathBuf {
        self.base().join("test.cfg")
    }

    /// Adds a remote module whose test run prints `output`.
    pub fn add_module(&self, name: &str, output: &str, exit_code: i32) -> &Self {
        let module_dir = self.base().join("remotes").join(name);
        fs::create_dir_all(&module_dir).expect("Failed to create module directory");
        let mut script = String::from("#!/bin/sh\n");
        for line in output.lines() {
            script.push_str(&format!("echo '{}'\n", line));
        }
        script.push_str(&format!("exit {}\n", exit_code));
        fs::write(module_dir.join("run.sh"), script).expect("Failed to write run.sh");
        self
    }

    /// Writes the module list and returns its path.
    pub fn write_module_list(&self, content: &str) -> PathBuf {
        let path = self.base().join("modules.cfg");
        fs::write(&path, content).expect("Failed to write module list");
        path
    }

    /// Writes run settings that copy modules from `remotes/` and run `sh run.sh`.
    pub fn write_settings(&self) -> PathBuf {
        let path = self.base().join("batch.toml");
        let content = format!(
            r#"checkout_command = "cp -R '{}/remotes/{{module}}' ."
test_command = "sh run.sh"
report_prefix = "batch"
"#,
            self.base().display()
        );
        fs::write(&path, content).expect("Failed to write settings");
        path
    }

    /// Every report written under `<base>/reports`.
    pub fn reports(&self) -> Vec<PathBuf> {
        let dir = self.base().join("reports");
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut reports: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "tsv"))
            .collect();
        reports.sort();
        reports
    }

    /// Content of the only report of the run.
    pub fn single_report(&self) -> String {
        let reports = self.reports();
        assert_eq!(reports.len(), 1, "expected exactly one report, found {:?}", reports);
        fs::read_to_string(&reports[0]).expect("Failed to read report")
    }
}

/// Row of `report` belonging to `module`, split into its tab-separated cells.
pub fn report_row<'a>(report: &'a str, module: &str) -> Vec<&'a str> {
    report
        .lines()
        .find(|line| line.split('\t').next() == Some(module))
        .unwrap_or_else(|| panic!("no row for {module} in:\n{report}"))
        .split('\t')
        .collect()
}
