//! # Report Store Unit Tests / 报告存储单元测试
//!
//! Tests for creating, updating, resuming and rendering the TSV report.
//!
//! 测试 TSV 报告的创建、更新、恢复和渲染。

use module_batch_tester::config::ModuleSpec;
use module_batch_tester::models::{ScoreRecord, Tally, Verdict};
use module_batch_tester::report::{ReportError, ReportStore, HEADER, PLACEHOLDER};
use std::fs;
use tempfile::TempDir;

fn modules() -> Vec<ModuleSpec> {
    vec![
        ModuleSpec::new("kb_alpha", "github.com/kbaseapps/kb_alpha"),
        ModuleSpec::new("kb_beta", "github.com/kbaseapps/kb_beta"),
        ModuleSpec::new("kb_gamma", "github.com/other/kb_gamma"),
    ]
}

fn passing_score() -> ScoreRecord {
    ScoreRecord {
        verdict: Verdict::Pass,
        total: 12,
        passed: Tally::Known(10),
        failed: Tally::Known(0),
        skipped: Tally::Known(2),
        elapsed_secs: 4,
    }
}

fn failing_score() -> ScoreRecord {
    ScoreRecord {
        verdict: Verdict::Fail,
        total: 5,
        passed: Tally::Known(2),
        failed: Tally::Known(3),
        skipped: Tally::Known(0),
        elapsed_secs: 1,
    }
}

fn store_in(dir: &TempDir) -> ReportStore {
    ReportStore::new(dir.path().join("report.tsv"))
}

#[cfg(test)]
mod create_tests {
    use super::*;

    #[test]
    fn test_create_writes_header_and_placeholders() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let buffer = store.create(&modules()).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(buffer.line_count(), 4);
        assert_eq!(lines[0], HEADER.join("\t"));
        assert_eq!(
            lines[1],
            "kb_alpha\tgithub.com/kbaseapps/kb_alpha\t-\t-\t-\t-\t-\t-"
        );
        assert!(lines[3].starts_with("kb_gamma\tgithub.com/other/kb_gamma\t"));
        assert!(content.ends_with('\n'));
        assert_eq!(content, buffer.render());
    }

    #[test]
    fn test_create_keeps_configured_order() {
        let dir = TempDir::new().unwrap();
        let buffer = store_in(&dir).create(&modules()).unwrap();
        let names: Vec<&str> = buffer.rows().iter().map(|r| r.module.name.as_str()).collect();
        assert_eq!(names, ["kb_alpha", "kb_beta", "kb_gamma"]);
        assert!(buffer.rows().iter().all(|r| r.verdict() == PLACEHOLDER));
        assert_eq!(buffer.pending_count(), 3);
    }

    #[test]
    fn test_create_twice_fails_and_keeps_first_report() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.create(&modules()).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let err = store.create(&modules()[..1]).unwrap_err();
        assert!(matches!(err, ReportError::AlreadyExists(_)));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_create_refuses_foreign_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "not a report\n").unwrap();

        assert!(matches!(
            store.create(&modules()),
            Err(ReportError::AlreadyExists(_))
        ));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "not a report\n");
    }
}

#[cfg(test)]
mod apply_score_tests {
    use super::*;

    #[test]
    fn test_apply_grades_only_the_matching_row() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let buffer = store.create(&modules()).unwrap();

        let buffer = store
            .apply_score(buffer, &modules()[1], &passing_score())
            .unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[2],
            "kb_beta\tgithub.com/kbaseapps/kb_beta\tPASS\t12\t10\t0\t2\t4sec"
        );
        assert!(lines[1].contains("\t-\t"));
        assert!(lines[3].contains("\t-\t"));
        assert!(buffer.is_graded(&modules()[1]));
        assert!(!buffer.is_graded(&modules()[0]));
        assert_eq!(content, buffer.render());
    }

    #[test]
    fn test_key_includes_source_location() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let buffer = store.create(&modules()).unwrap();

        let other_fork = ModuleSpec::new("kb_alpha", "github.com/fork/kb_alpha");
        let buffer = store.apply_score(buffer, &other_fork, &passing_score()).unwrap();

        assert_eq!(buffer.pending_count(), 3);
    }

    #[test]
    fn test_apply_twice_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let buffer = store.create(&modules()).unwrap();

        let buffer = store.apply_score(buffer, &modules()[0], &passing_score()).unwrap();
        let after_first = fs::read_to_string(store.path()).unwrap();
        let buffer = store.apply_score(buffer, &modules()[0], &passing_score()).unwrap();
        let after_second = fs::read_to_string(store.path()).unwrap();

        assert_eq!(after_first, after_second);
        assert_eq!(buffer.render(), after_second);
    }

    #[test]
    fn test_graded_row_is_never_regraded() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let buffer = store.create(&modules()).unwrap();
        let graded = store.apply_score(buffer, &modules()[2], &passing_score()).unwrap();

        let again = store
            .apply_score(graded.clone(), &modules()[2], &failing_score())
            .unwrap();

        assert_eq!(again, graded);
        assert_eq!(again.find(&modules()[2]).unwrap().verdict(), "PASS");
    }

    #[test]
    fn test_row_count_never_changes() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut buffer = store.create(&modules()).unwrap();

        for module in modules().iter().chain(modules().iter()) {
            buffer = store.apply_score(buffer, module, &failing_score()).unwrap();
            let content = fs::read_to_string(store.path()).unwrap();
            assert_eq!(content.lines().count(), 4);
        }
        assert_eq!(buffer.pending_count(), 0);
    }

    #[test]
    fn test_unknown_counts_render_as_marker() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let buffer = store.create(&modules()[..1]).unwrap();
        let score = ScoreRecord {
            verdict: Verdict::Fail,
            total: 0,
            passed: Tally::Unknown,
            failed: Tally::Unknown,
            skipped: Tally::Unknown,
            elapsed_secs: 0,
        };

        store.apply_score(buffer, &modules()[0], &score).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            content.lines().nth(1).unwrap(),
            "kb_alpha\tgithub.com/kbaseapps/kb_alpha\tFAIL\t0\tN/A\tN/A\tN/A\t0sec"
        );
    }

    #[test]
    fn test_apply_without_report_fails() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let buffer = store.create(&modules()).unwrap();
        fs::remove_file(store.path()).unwrap();

        let err = store
            .apply_score(buffer, &modules()[0], &passing_score())
            .unwrap_err();
        assert!(matches!(err, ReportError::ReportMissing(_)));
        assert!(!store.path().exists());
    }
}

#[cfg(test)]
mod open_tests {
    use super::*;

    #[test]
    fn test_open_round_trips_a_partial_report() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let buffer = store.create(&modules()).unwrap();
        let written = store.apply_score(buffer, &modules()[0], &passing_score()).unwrap();

        let reopened = ReportStore::new(store.path()).open().unwrap();

        assert_eq!(reopened, written);
        assert!(reopened.is_graded(&modules()[0]));
        assert_eq!(reopened.pending_count(), 2);
    }

    #[test]
    fn test_resumed_store_continues_grading() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let buffer = store.create(&modules()).unwrap();
        store.apply_score(buffer, &modules()[0], &passing_score()).unwrap();

        let resumed = ReportStore::new(store.path());
        let buffer = resumed.open().unwrap();
        let buffer = resumed.apply_score(buffer, &modules()[0], &failing_score()).unwrap();
        let buffer = resumed.apply_score(buffer, &modules()[1], &failing_score()).unwrap();

        assert_eq!(buffer.find(&modules()[0]).unwrap().verdict(), "PASS");
        assert_eq!(buffer.find(&modules()[1]).unwrap().verdict(), "FAIL");
    }

    #[test]
    fn test_open_missing_report() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            store_in(&dir).open(),
            Err(ReportError::ReportMissing(_))
        ));
    }

    #[test]
    fn test_open_rejects_malformed_rows() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            format!("{}\nkb_alpha\tgithub.com/kbaseapps/kb_alpha\t-\t-\n", HEADER.join("\t")),
        )
        .unwrap();

        match store.open() {
            Err(ReportError::MalformedRow { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a malformed row error, got {:?}", other),
        }
    }
}
