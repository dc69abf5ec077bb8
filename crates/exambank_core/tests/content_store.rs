use exambank_core::db::open_db_in_memory;
use exambank_core::{
    AddModuleOutcome, ContentRepository, ContentService, ContentServiceError, ExamConfigRepository,
    PoolOrder, RepoError, SqliteContentRepository,
};
use rusqlite::Connection;

#[test]
fn module_names_are_unique_and_conflict_is_not_an_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::new(&conn);

    let first = repo.add_module("Algorithms").unwrap();
    assert!(matches!(first, AddModuleOutcome::Created(_)));
    assert_eq!(
        repo.add_module("Algorithms").unwrap(),
        AddModuleOutcome::DuplicateName
    );
    assert_eq!(repo.get_modules().unwrap().len(), 1);

    // Matching is exact; a different case is a different module.
    assert!(repo.add_module("algorithms").unwrap().created_id().is_some());
}

#[test]
fn modules_are_listed_by_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::new(&conn);
    for name in ["Statistics", "Algorithms", "Networks"] {
        repo.add_module(name).unwrap();
    }

    let names: Vec<_> = repo
        .get_modules()
        .unwrap()
        .into_iter()
        .map(|module| module.name)
        .collect();
    assert_eq!(names, vec!["Algorithms", "Networks", "Statistics"]);
}

#[test]
fn pool_for_missing_module_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::new(&conn);

    let err = repo.add_pool("Sorting", 42).unwrap_err();
    assert!(matches!(
        err,
        RepoError::MissingParent {
            entity: "module",
            id: 42
        }
    ));
    assert_eq!(count_rows(&conn, "pools"), 0);
}

#[test]
fn task_for_missing_pool_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::new(&conn);

    let err = repo.add_task("What is a heap?", 7).unwrap_err();
    assert!(matches!(err, RepoError::MissingParent { entity: "pool", id: 7 }));
}

#[test]
fn deleting_module_cascades_to_pools_tasks_and_config() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::new(&conn);

    let module_id = created(repo.add_module("Algorithms").unwrap());
    let sorting = repo.add_pool("Sorting", module_id).unwrap();
    let graphs = repo.add_pool("Graphs", module_id).unwrap();
    repo.add_task("Explain quicksort.", sorting).unwrap();
    repo.add_task("Explain Dijkstra.", graphs).unwrap();
    repo.save_exam_config(module_id, &PoolOrder::new(vec![sorting, graphs]))
        .unwrap();

    let other_id = created(repo.add_module("Networks").unwrap());
    let other_pool = repo.add_pool("Routing", other_id).unwrap();
    repo.add_task("Explain BGP.", other_pool).unwrap();

    repo.delete_module(module_id).unwrap();

    assert!(repo.get_module_by_id(module_id).unwrap().is_none());
    assert!(repo.get_pools_for_module(module_id).unwrap().is_empty());
    assert!(repo.get_exam_config_for_module(module_id).unwrap().is_none());
    assert_eq!(count_rows(&conn, "pools"), 1);
    assert_eq!(count_rows(&conn, "tasks"), 1);
    assert_eq!(count_rows(&conn, "exam_configs"), 0);
}

#[test]
fn deleting_pool_cascades_to_its_tasks_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::new(&conn);

    let module_id = created(repo.add_module("Algorithms").unwrap());
    let sorting = repo.add_pool("Sorting", module_id).unwrap();
    let graphs = repo.add_pool("Graphs", module_id).unwrap();
    repo.add_task("Explain quicksort.", sorting).unwrap();
    repo.add_task("Explain mergesort.", sorting).unwrap();
    repo.add_task("Explain BFS.", graphs).unwrap();

    repo.delete_pool(sorting).unwrap();

    assert!(repo.get_tasks_from_pool(sorting).unwrap().is_empty());
    assert_eq!(repo.get_tasks_from_pool(graphs).unwrap().len(), 1);
    assert_eq!(count_rows(&conn, "tasks"), 1);
}

#[test]
fn deletes_of_missing_rows_are_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::new(&conn);

    repo.delete_module(1).unwrap();
    repo.delete_pool(1).unwrap();
    repo.delete_task(1).unwrap();

    let module_id = created(repo.add_module("Algorithms").unwrap());
    repo.delete_module(module_id).unwrap();
    repo.delete_module(module_id).unwrap();
}

#[test]
fn update_task_reports_missing_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::new(&conn);

    let module_id = created(repo.add_module("Algorithms").unwrap());
    let pool_id = repo.add_pool("Sorting", module_id).unwrap();
    let task_id = repo.add_task("draft", pool_id).unwrap();

    assert!(repo.update_task(task_id, "final").unwrap());
    assert!(!repo.update_task(task_id + 100, "ghost").unwrap());

    let tasks = repo.get_tasks_from_pool(pool_id).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].content, "final");
}

#[test]
fn tasks_are_returned_in_insertion_order_verbatim() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::new(&conn);

    let module_id = created(repo.add_module("Algorithms").unwrap());
    let pool_id = repo.add_pool("Sorting", module_id).unwrap();
    let contents = ["  **bold** first\n", "second $x^2$", "third"];
    for content in contents {
        repo.add_task(content, pool_id).unwrap();
    }

    let loaded: Vec<_> = repo
        .get_tasks_from_pool(pool_id)
        .unwrap()
        .into_iter()
        .map(|task| task.content)
        .collect();
    assert_eq!(loaded, contents);
}

#[test]
fn pool_lookup_includes_owning_module() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::new(&conn);

    let module_id = created(repo.add_module("Algorithms").unwrap());
    let pool_id = repo.add_pool("Sorting", module_id).unwrap();

    let info = repo.get_pool_with_module_info(pool_id).unwrap().unwrap();
    assert_eq!(info.pool.name, "Sorting");
    assert_eq!(info.pool.module_id, module_id);
    assert_eq!(info.module_name, "Algorithms");
    assert!(repo.get_pool_with_module_info(pool_id + 1).unwrap().is_none());
}

#[test]
fn pool_names_may_repeat_and_lookup_picks_lowest_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::new(&conn);

    let module_id = created(repo.add_module("Algorithms").unwrap());
    let first = repo.add_pool("Sorting", module_id).unwrap();
    let _second = repo.add_pool("Sorting", module_id).unwrap();

    let found = repo.find_pool_by_name(module_id, "Sorting").unwrap().unwrap();
    assert_eq!(found.id, first);
    assert!(repo.find_pool_by_name(module_id, "sorting").unwrap().is_none());
}

#[test]
fn service_trims_names_and_rejects_blank_input() {
    let conn = open_db_in_memory().unwrap();
    let service = ContentService::new(SqliteContentRepository::new(&conn));

    let module_id = service
        .add_module("  Algorithms ")
        .unwrap()
        .created_id()
        .unwrap();
    assert_eq!(service.get_module(module_id).unwrap().unwrap().name, "Algorithms");
    assert_eq!(
        service.add_module("Algorithms").unwrap(),
        AddModuleOutcome::DuplicateName
    );

    assert!(matches!(
        service.add_module("   "),
        Err(ContentServiceError::InvalidName)
    ));
    assert!(matches!(
        service.add_pool("", module_id),
        Err(ContentServiceError::InvalidName)
    ));

    let pool_id = service.add_pool("Sorting", module_id).unwrap();
    assert!(matches!(
        service.add_task(" \n ", pool_id),
        Err(ContentServiceError::EmptyTaskContent)
    ));

    let task_id = service.add_task("  Explain heapsort.\n", pool_id).unwrap();
    assert_eq!(service.list_tasks(pool_id).unwrap()[0].content, "Explain heapsort.");
    assert!(!service.update_task(task_id + 1, "other").unwrap());
    assert!(matches!(
        service.add_task("x", pool_id + 1),
        Err(ContentServiceError::Repo(RepoError::MissingParent { .. }))
    ));
}

fn created(outcome: AddModuleOutcome) -> i64 {
    outcome.created_id().expect("module should be created")
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
