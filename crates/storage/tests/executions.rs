#![forbid(unsafe_code)]

use pk_core::fields::{AnswerValue, Answers, FieldKind, TextOptions};
use pk_core::ids::TenantId;
use pk_core::model::{ExecutionStatus, ProcedureCategory};
use pk_storage::{
    ExecutionCancelRequest, ExecutionStartRequest, ExecutionSubmitRequest, FieldInput,
    ListExecutionsRequest, ProcedureCreateRequest, SqliteStore, StoreError,
};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("pk_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn tenant(value: &str) -> TenantId {
    TenantId::try_new(value).expect("tenant id")
}

fn seed_procedure(store: &mut SqliteStore, ws: &TenantId) -> String {
    let created = store
        .procedure_create(
            ws,
            ProcedureCreateRequest {
                title: "Bearing inspection".to_string(),
                description: None,
                category: ProcedureCategory::Inspection,
                tags: Vec::new(),
                is_global: false,
                fields: vec![FieldInput {
                    id: Some("FLD-NOTES".to_string()),
                    label: "Notes".to_string(),
                    kind: FieldKind::Text(TextOptions::default()),
                    required: true,
                }],
            },
        )
        .expect("create procedure");
    created.procedure.id
}

#[test]
fn start_creates_an_in_progress_run_with_empty_answers() {
    let dir = temp_dir("start_in_progress");
    let mut store = SqliteStore::open(&dir).expect("open store");
    let ws = tenant("acme");
    let procedure_id = seed_procedure(&mut store, &ws);

    let execution = store
        .execution_start(
            &ws,
            ExecutionStartRequest {
                procedure_id: procedure_id.clone(),
                work_order_id: Some("WO-77".to_string()),
                user_id: Some("tech-4".to_string()),
            },
        )
        .expect("start execution");

    assert_eq!(execution.status, ExecutionStatus::InProgress);
    assert!(execution.answers.is_empty());
    assert_eq!(execution.score, 0.0);
    assert!(execution.completed_at_ms.is_none());
    assert_eq!(execution.work_order_id.as_deref(), Some("WO-77"));

    // The procedure's derived count sees the new run.
    let record = store
        .procedure_get(&ws, &procedure_id)
        .expect("get procedure")
        .expect("exists");
    assert_eq!(record.procedure.executions_count, 1);
}

#[test]
fn start_requires_a_visible_procedure() {
    let dir = temp_dir("start_unknown_procedure");
    let mut store = SqliteStore::open(&dir).expect("open store");
    let ws = tenant("acme");

    let result = store.execution_start(
        &ws,
        ExecutionStartRequest {
            procedure_id: "PROC-999".to_string(),
            work_order_id: None,
            user_id: None,
        },
    );
    assert!(matches!(result, Err(StoreError::UnknownId)));
}

#[test]
fn submit_completes_and_stamps_completed_at() {
    let dir = temp_dir("submit_completes");
    let mut store = SqliteStore::open(&dir).expect("open store");
    let ws = tenant("acme");
    let procedure_id = seed_procedure(&mut store, &ws);

    let execution = store
        .execution_start(
            &ws,
            ExecutionStartRequest {
                procedure_id,
                work_order_id: None,
                user_id: None,
            },
        )
        .expect("start execution");

    let mut answers = Answers::new();
    answers.insert("FLD-NOTES", AnswerValue::Text("all good".to_string()));
    let submitted = store
        .execution_submit(
            &ws,
            ExecutionSubmitRequest {
                execution_id: execution.id.clone(),
                answers: answers.clone(),
                score: Some(92.5),
            },
        )
        .expect("submit execution");

    assert_eq!(submitted.status, ExecutionStatus::Completed);
    assert!(submitted.completed_at_ms.is_some());
    assert_eq!(submitted.score, 92.5);
    assert_eq!(submitted.answers, answers);
}

#[test]
fn gateway_accepts_empty_answers_and_defaults_score() {
    // The gateway records what it is told; required-field policy lives in
    // the service layer.
    let dir = temp_dir("submit_empty_answers");
    let mut store = SqliteStore::open(&dir).expect("open store");
    let ws = tenant("acme");
    let procedure_id = seed_procedure(&mut store, &ws);

    let execution = store
        .execution_start(
            &ws,
            ExecutionStartRequest {
                procedure_id,
                work_order_id: None,
                user_id: None,
            },
        )
        .expect("start execution");

    let submitted = store
        .execution_submit(
            &ws,
            ExecutionSubmitRequest {
                execution_id: execution.id,
                answers: Answers::new(),
                score: None,
            },
        )
        .expect("submit execution");
    assert_eq!(submitted.status, ExecutionStatus::Completed);
    assert_eq!(submitted.score, 0.0);
}

#[test]
fn terminal_executions_never_transition_again() {
    let dir = temp_dir("terminal_guard");
    let mut store = SqliteStore::open(&dir).expect("open store");
    let ws = tenant("acme");
    let procedure_id = seed_procedure(&mut store, &ws);

    let execution = store
        .execution_start(
            &ws,
            ExecutionStartRequest {
                procedure_id,
                work_order_id: None,
                user_id: None,
            },
        )
        .expect("start execution");
    store
        .execution_submit(
            &ws,
            ExecutionSubmitRequest {
                execution_id: execution.id.clone(),
                answers: Answers::new(),
                score: None,
            },
        )
        .expect("first submit");

    let again = store.execution_submit(
        &ws,
        ExecutionSubmitRequest {
            execution_id: execution.id.clone(),
            answers: Answers::new(),
            score: Some(100.0),
        },
    );
    assert!(matches!(
        again,
        Err(StoreError::ExecutionAlreadyTerminal { ref status, .. }) if status == "completed"
    ));

    let cancel_after = store.execution_cancel(
        &ws,
        ExecutionCancelRequest {
            execution_id: execution.id,
        },
    );
    assert!(matches!(
        cancel_after,
        Err(StoreError::ExecutionAlreadyTerminal { .. })
    ));
}

#[test]
fn cancel_is_terminal_and_preserves_answers() {
    let dir = temp_dir("cancel_terminal");
    let mut store = SqliteStore::open(&dir).expect("open store");
    let ws = tenant("acme");
    let procedure_id = seed_procedure(&mut store, &ws);

    let execution = store
        .execution_start(
            &ws,
            ExecutionStartRequest {
                procedure_id,
                work_order_id: None,
                user_id: None,
            },
        )
        .expect("start execution");

    let cancelled = store
        .execution_cancel(
            &ws,
            ExecutionCancelRequest {
                execution_id: execution.id.clone(),
            },
        )
        .expect("cancel execution");
    assert_eq!(cancelled.status, ExecutionStatus::Cancelled);
    assert!(cancelled.completed_at_ms.is_some());

    let resubmit = store.execution_submit(
        &ws,
        ExecutionSubmitRequest {
            execution_id: execution.id,
            answers: Answers::new(),
            score: None,
        },
    );
    assert!(matches!(
        resubmit,
        Err(StoreError::ExecutionAlreadyTerminal { ref status, .. }) if status == "cancelled"
    ));
}

#[test]
fn list_filters_by_procedure_and_work_order() {
    let dir = temp_dir("list_filters");
    let mut store = SqliteStore::open(&dir).expect("open store");
    let ws = tenant("acme");
    let first = seed_procedure(&mut store, &ws);
    let second = seed_procedure(&mut store, &ws);

    for (procedure_id, work_order) in [
        (&first, Some("WO-1")),
        (&first, None),
        (&second, Some("WO-1")),
    ] {
        store
            .execution_start(
                &ws,
                ExecutionStartRequest {
                    procedure_id: procedure_id.clone(),
                    work_order_id: work_order.map(str::to_string),
                    user_id: None,
                },
            )
            .expect("start execution");
    }

    let by_procedure = store
        .execution_list(
            &ws,
            ListExecutionsRequest {
                procedure_id: Some(first.clone()),
                work_order_id: None,
                limit: 10,
                offset: 0,
            },
        )
        .expect("list by procedure");
    assert_eq!(by_procedure.len(), 2);

    let by_work_order = store
        .execution_list(
            &ws,
            ListExecutionsRequest {
                procedure_id: None,
                work_order_id: Some("WO-1".to_string()),
                limit: 10,
                offset: 0,
            },
        )
        .expect("list by work order");
    assert_eq!(by_work_order.len(), 2);

    let both = store
        .execution_list(
            &ws,
            ListExecutionsRequest {
                procedure_id: Some(second.clone()),
                work_order_id: Some("WO-1".to_string()),
                limit: 10,
                offset: 0,
            },
        )
        .expect("list by both");
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].procedure_id, second);

    // Executions are invisible to other tenants.
    let rival = tenant("rival");
    let cross = store
        .execution_list(
            &rival,
            ListExecutionsRequest {
                procedure_id: None,
                work_order_id: None,
                limit: 10,
                offset: 0,
            },
        )
        .expect("cross-tenant list");
    assert!(cross.is_empty());
}
