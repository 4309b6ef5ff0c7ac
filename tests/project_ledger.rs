use case_ledger::{
    AppError, AppResult, Ledger, LedgerConfig, MoveTarget, Opener, Project, ProjectService, ProjectStore,
    Timestamp, DEFAULT_STATUS,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

fn temp_ledger() -> (tempfile::TempDir, Ledger) {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = Ledger::open(LedgerConfig::in_dir(dir.path().join("data")));
    (dir, ledger)
}

#[derive(Default)]
struct RecordingOpener {
    opened: Mutex<Vec<PathBuf>>,
}

impl Opener for RecordingOpener {
    fn open(&self, path: &Path) -> AppResult<()> {
        self.opened
            .lock()
            .map_err(|_| AppError::Internal("poisoned".to_string()))?
            .push(path.to_path_buf());
        Ok(())
    }
}

#[test]
fn upserted_projects_load_back_unchanged() {
    let (_dir, ledger) = temp_ledger();
    let service = ledger.projects();

    let mut draft = Project::named("Chen v. Harbour Logistics");
    draft.client = "Chen Wei".to_string();
    draft.opponent = "Harbour Logistics Ltd.".to_string();
    draft.lawyer = "Liu".to_string();
    draft.stage = "一审".to_string();
    draft.notes = "Evidence exchange due next week".to_string();
    draft.files = case_ledger::links_from_selection(["/cases/chen/complaint.pdf"], false);

    let saved = service.upsert(draft.clone()).expect("upsert");
    let loaded = service
        .find_by_id(&saved.id)
        .expect("find")
        .expect("stored");

    assert_eq!(loaded, saved);
    assert_eq!(loaded.name, draft.name);
    assert_eq!(loaded.files, draft.files);
    assert_eq!(loaded.status, DEFAULT_STATUS);
}

#[test]
fn concurrent_upserts_to_distinct_ids_all_persist() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(ProjectStore::in_dir(dir.path()));
    let service = ProjectService::new(store);

    let handles: Vec<_> = (0..8)
        .map(|index| {
            let service = service.clone();
            thread::spawn(move || {
                let project = Project {
                    id: format!("case-{index}"),
                    name: format!("Case {index}"),
                    ..Project::default()
                };
                service.upsert(project).expect("upsert");
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }

    let ids: HashSet<_> = service
        .try_get_all()
        .expect("list")
        .into_iter()
        .map(|project| project.id)
        .collect();
    let expected: HashSet<_> = (0..8).map(|index| format!("case-{index}")).collect();
    assert_eq!(ids, expected);
}

#[test]
fn import_file_merges_legacy_exports() {
    let (dir, ledger) = temp_ledger();
    let export = dir.path().join("export.json");
    std::fs::write(
        &export,
        r#"[
          {"id": "a", "name": "Imported A", "files": null, "created_at": "2024-01-02T15:04:05.123456789+08:00"},
          {"id": "b", "name": "Imported B", "created_at": "2024-01-02", "updated_at": "null"}
        ]"#,
    )
    .expect("write export");

    assert_eq!(ledger.projects().import_file(&export).expect("import"), 2);
    let all = ledger.projects().try_get_all().expect("list");
    assert_eq!(all.len(), 2);

    let a = all.iter().find(|project| project.id == "a").expect("a");
    assert_eq!(
        a.created_at,
        Timestamp::parse("2024-01-02T15:04:05.123456789+08:00").expect("ts")
    );
    assert!(a.files.is_empty());
}

#[test]
fn board_flow_moves_and_reorders() {
    let (_dir, ledger) = temp_ledger();
    let service = ledger.projects();
    let a = service.upsert(Project::named("a")).expect("a");
    let b = service.upsert(Project::named("b")).expect("b");

    service
        .reorder(&[a.id.clone(), b.id.clone()])
        .expect("reorder");
    assert!(service
        .move_project(&b.id, MoveTarget::Status("已结案".to_string()))
        .expect("move"));

    let all = service.get_all();
    assert_eq!(all[0].id, a.id);
    assert_eq!(all[1].status, "已结案");
}

#[test]
fn ledger_delegates_opening_to_its_opener() {
    let dir = tempfile::tempdir().expect("tempdir");
    let opener = Arc::new(RecordingOpener::default());
    let ledger = Ledger::with_opener(LedgerConfig::in_dir(dir.path()), opener.clone());

    ledger
        .open_path(Path::new("/cases/chen/complaint.pdf"))
        .expect("open");
    let opened = opener.opened.lock().expect("lock");
    assert_eq!(*opened, vec![PathBuf::from("/cases/chen/complaint.pdf")]);
    assert_eq!(ledger.config().store_path(), dir.path().join("projects.json"));
}

#[test]
fn with_tracing_writes_logs_under_the_log_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = LedgerConfig::in_dir(dir.path());
    let (ledger, guard) = Ledger::with_tracing(config).expect("ledger with tracing");

    ledger.projects().upsert(Project::named("logged")).expect("upsert");
    drop(guard);

    assert!(dir.path().join("logs").is_dir());
}
