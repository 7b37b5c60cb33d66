//! Incremental build simulation across several runs
//!
//! Each "run" opens a fresh table on the same output directory, plans with
//! `mark_for_rebuild`, records with `update_*`, and commits. Timestamps are
//! set explicitly with `filetime` so the tests do not depend on how fast the
//! filesystem clock ticks.

use convenient_history::{
    BuildMetadata, BuildTarget, SimpleConfiguration, TargetHistory, TargetHistoryTable,
    TargetInfo, Timestamp,
};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;

const T1: i64 = 1_650_000_000;
const T2: i64 = 1_650_000_100;

struct Project {
    _tmp: TempDir,
    out: PathBuf,
    src: PathBuf,
}

impl Project {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = fs::canonicalize(tmp.path()).unwrap();
        let out = root.join("build");
        let src = root.join("src");
        fs::create_dir_all(&out).unwrap();
        fs::create_dir_all(&src).unwrap();
        Self { _tmp: tmp, out, src }
    }

    fn source(&self, name: &str, secs: i64) -> PathBuf {
        let path = self.src.join(name);
        fs::write(&path, format!("/* {name} */")).unwrap();
        set_mtime(&path, secs, 0);
        path
    }

    /// Simulate the compiler writing an output after the history file was stamped
    fn produce(&self, name: &str, secs: i64) {
        let path = self.out.join(name);
        fs::write(&path, b"\x7fELF").unwrap();
        set_mtime(&path, secs, 0);
    }

    fn target(&self, config: &str, sources: &[&PathBuf], output: &str) -> TargetInfo {
        TargetInfo::new(
            config,
            sources.iter().map(|p| (*p).clone()).collect(),
            Vec::new(),
            self.out.join(output),
            false,
        )
    }

    fn needs_rebuild(&self, config: &str, sources: &[&PathBuf], output: &str) -> bool {
        let table = TargetHistoryTable::open(&self.out).unwrap();
        let mut target = self.target(config, sources, output);
        table.mark_for_rebuild(&mut target);
        target.rebuild()
    }
}

fn set_mtime(path: &Path, secs: i64, nanos: u32) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(secs, nanos)).unwrap();
}

fn later() -> i64 {
    FileTime::from_system_time(SystemTime::now()).unix_seconds() + 3600
}

fn millis(secs: i64) -> Timestamp {
    Timestamp::from_millis(secs * 1000)
}

#[test]
fn test_concrete_scenario() {
    let project = Project::new();
    let foo_c = project.source("foo.c", T1);
    let t0 = later();

    // First run: nothing recorded yet
    {
        let mut table = TargetHistoryTable::open(&project.out).unwrap();
        let mut target = project.target("S1", &[&foo_c], "foo.o");
        table.mark_for_rebuild(&mut target);
        assert!(target.rebuild(), "never built outputs must be rebuilt");

        project.produce("foo.o", t0);
        assert!(table.update_linked(&target));
        table.commit().unwrap();
    }

    // Second run: unchanged
    assert!(!project.needs_rebuild("S1", &[&foo_c], "foo.o"));

    // Touch foo.c
    set_mtime(&foo_c, T2, 0);
    assert!(project.needs_rebuild("S1", &[&foo_c], "foo.o"));

    // Rebuild and record the new output
    let t3 = t0 + 60;
    {
        let mut table = TargetHistoryTable::open(&project.out).unwrap();
        project.produce("foo.o", t3);
        assert!(table.update_output("S1", "foo.o", &[&foo_c]));
        table.commit().unwrap();
    }

    let table = TargetHistoryTable::open(&project.out).unwrap();
    let record = table.get("S1", "foo.o").unwrap();
    assert_eq!(record.output_last_modified(), millis(t3));
    assert_eq!(record.sources().len(), 1);
    assert_eq!(record.sources()[0].last_modified(), millis(T2));
    assert!(!project.needs_rebuild("S1", &[&foo_c], "foo.o"));
}

#[test]
fn test_round_trip_preserves_records() {
    let project = Project::new();
    let a = project.source("a.c", T1);
    let b = project.source("b.c", T1 + 5);
    let header = project.source("common.h", T1 + 9);

    let written: Vec<TargetHistory> = {
        let mut table = TargetHistoryTable::open(&project.out).unwrap();
        project.produce("a.o", later());
        project.produce("b.o", later());
        project.produce("app", later() + 1);
        assert!(table.update_output("cc -O2", "a.o", &[&a, &header]));
        assert!(table.update_output("cc -O2", "b.o", &[&b, &header]));
        assert!(table.update_output(
            "ld \"quoted\" & <special>",
            "app",
            &[project.out.join("a.o"), project.out.join("b.o")]
        ));
        table.commit().unwrap();
        table.iter().cloned().collect()
    };

    let reloaded = TargetHistoryTable::open(&project.out).unwrap();
    assert_eq!(reloaded.len(), written.len());
    for record in &written {
        assert_eq!(
            reloaded.get(record.configuration(), record.output()),
            Some(record)
        );
    }
    assert!(!reloaded.is_dirty());
}

#[test]
fn test_signature_sensitivity() {
    let project = Project::new();
    let a = project.source("a.c", T1);
    {
        let mut table = TargetHistoryTable::open(&project.out).unwrap();
        project.produce("a.o", later());
        assert!(table.update_output("gcc-12 -O2", "a.o", &[&a]));
        table.commit().unwrap();
    }

    assert!(!project.needs_rebuild("gcc-12 -O2", &[&a], "a.o"));
    assert!(project.needs_rebuild("gcc-13 -O2", &[&a], "a.o"));
}

#[test]
fn test_source_set_sensitivity() {
    let project = Project::new();
    let a = project.source("a.c", T1);
    let h = project.source("a.h", T1);
    let extra = project.source("extra.h", T1);
    {
        let mut table = TargetHistoryTable::open(&project.out).unwrap();
        project.produce("a.o", later());
        assert!(table.update_output("cc", "a.o", &[&a, &h]));
        table.commit().unwrap();
    }

    assert!(!project.needs_rebuild("cc", &[&h, &a], "a.o"));
    assert!(project.needs_rebuild("cc", &[&a, &h, &extra], "a.o"));
    assert!(project.needs_rebuild("cc", &[&a], "a.o"));
    assert!(project.needs_rebuild("cc", &[&a, &extra], "a.o"));
}

#[test]
fn test_deleted_output_is_forgotten() {
    let project = Project::new();
    let a = project.source("a.c", T1);
    {
        let mut table = TargetHistoryTable::open(&project.out).unwrap();
        project.produce("a.o", later());
        assert!(table.update_output("cc", "a.o", &[&a]));
        table.commit().unwrap();
    }

    fs::remove_file(project.out.join("a.o")).unwrap();

    let table = TargetHistoryTable::open(&project.out).unwrap();
    assert!(table.get("cc", "a.o").is_none());
    assert!(project.needs_rebuild("cc", &[&a], "a.o"));
}

#[test]
fn test_output_timestamp_tolerance_on_load() {
    let project = Project::new();
    let a = project.source("a.c", T1);
    let built = later();
    {
        let mut table = TargetHistoryTable::open(&project.out).unwrap();
        project.produce("a.o", built);
        assert!(table.update_output("cc", "a.o", &[&a]));
        table.commit().unwrap();
    }

    // Sub-second drift of the output is absorbed
    set_mtime(&project.out.join("a.o"), built, 400_000_000);
    assert!(!project.needs_rebuild("cc", &[&a], "a.o"));

    // A source drifting by far less is not: sources compare exactly
    set_mtime(&a, T1, 1_000_000);
    assert!(project.needs_rebuild("cc", &[&a], "a.o"));
    set_mtime(&a, T1, 0);

    // Output rewritten by something else
    set_mtime(&project.out.join("a.o"), built + 2, 0);
    assert!(project.needs_rebuild("cc", &[&a], "a.o"));
    let table = TargetHistoryTable::open(&project.out).unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_stale_artifact_is_not_recorded() {
    let project = Project::new();
    let a = project.source("a.c", T1);

    let mut table = TargetHistoryTable::open(&project.out).unwrap();
    // Left over from a run long before this table was opened
    project.produce("a.o", T1);
    assert!(!table.update_output("cc", "a.o", &[&a]));
    assert!(table.get("cc", "a.o").is_none());
    assert!(!table.is_dirty());

    table.commit().unwrap();
    assert!(project.needs_rebuild("cc", &[&a], "a.o"));
}

#[test]
fn test_stale_artifact_does_not_replace_existing_record() {
    let project = Project::new();
    let a = project.source("a.c", T1);
    let built = later();
    {
        let mut table = TargetHistoryTable::open(&project.out).unwrap();
        project.produce("a.o", built);
        assert!(table.update_output("cc -O0", "a.o", &[&a]));
        table.commit().unwrap();
    }

    let mut table = TargetHistoryTable::open(&project.out).unwrap();
    // The -O2 compile failed and the old artifact is still there, dated before this run
    project.produce("a.o", T1);
    assert!(!table.update_output("cc -O2", "a.o", &[&a]));
    assert!(table.get("cc -O2", "a.o").is_none());
    assert!(!table.is_dirty());
}

#[test]
fn test_bulk_compile_and_link() {
    let project = Project::new();
    let sources: Vec<PathBuf> = ["main.c", "util.c", "io.c"]
        .iter()
        .enumerate()
        .map(|(i, name)| project.source(name, T1 + i64::try_from(i).unwrap()))
        .collect();
    let cc = SimpleConfiguration::new("gcc -c -Wall", "o");
    let metadata = BuildMetadata::default();

    {
        let mut table = TargetHistoryTable::open(&project.out).unwrap();
        for name in ["main.o", "util.o", "io.o"] {
            project.produce(name, later());
        }
        assert_eq!(table.update_compiled(&cc, &sources, &metadata), 3);

        project.produce("app", later() + 1);
        let objects: Vec<PathBuf> = ["main.o", "util.o", "io.o"]
            .iter()
            .map(|n| project.out.join(n))
            .collect();
        let link = TargetInfo::new("gcc -o app", objects, Vec::new(), project.out.join("app"), true);
        assert!(table.update_linked(&link));
        table.commit().unwrap();
    }

    let table = TargetHistoryTable::open(&project.out).unwrap();
    assert_eq!(table.len(), 4);
    let mut targets: Vec<TargetInfo> = sources
        .iter()
        .map(|s| {
            let output = format!("{}.o", s.file_stem().unwrap().to_string_lossy());
            project.target("gcc -c -Wall", &[s], &output)
        })
        .collect();
    table.mark_all_for_rebuild(targets.iter_mut());
    assert!(targets.iter().all(|t| !t.rebuild()));

    let text = fs::read_to_string(table.history_file()).unwrap();
    assert_eq!(text.matches("<processor ").count(), 2);
    assert_eq!(text.matches("<target ").count(), 4);
}

#[test]
fn test_moved_tree_keeps_history() {
    let project = Project::new();
    let a = project.source("a.c", T1);
    {
        let mut table = TargetHistoryTable::open(&project.out).unwrap();
        project.produce("a.o", later());
        assert!(table.update_output("cc", "a.o", &[&a]));
        table.commit().unwrap();
    }

    let text = fs::read_to_string(project.out.join("history.xml")).unwrap();
    assert!(text.contains("file=\"a.o\""));
    assert!(!text.contains(project.src.to_string_lossy().as_ref()));

    // Move the whole tree; relative source paths still resolve
    let root = project.out.parent().unwrap();
    let moved = root.join("moved");
    fs::create_dir(&moved).unwrap();
    fs::rename(&project.out, moved.join("build")).unwrap();
    fs::rename(&project.src, moved.join("src")).unwrap();

    let table = TargetHistoryTable::open(moved.join("build")).unwrap();
    let mut target = TargetInfo::new(
        "cc",
        vec![moved.join("src").join("a.c")],
        Vec::new(),
        moved.join("build").join("a.o"),
        false,
    );
    table.mark_for_rebuild(&mut target);
    assert!(!target.rebuild());
}
