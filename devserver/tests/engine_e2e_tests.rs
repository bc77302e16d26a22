use pretty_assertions::assert_eq;
use roster_devserver::{build_router, Directory};
use roster_sync::{
    ApiConfig, EngineConfig, FetchOutcome, HttpEmployeeApi, ListEngine, ReconcileStrategy,
    SaveOutcome, SyncError,
};
use roster_types::{EmployeeForm, EmployeeId, SexId};
use std::sync::Arc;

async fn spawn_test_server(directory: Arc<Directory>) -> String {
    let app = build_router(directory);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}/api", port)
}

async fn connect(directory: Arc<Directory>, config: EngineConfig) -> ListEngine {
    let base_url = spawn_test_server(directory).await;
    let api = HttpEmployeeApi::new(ApiConfig {
        base_url,
        ..Default::default()
    })
    .unwrap();
    ListEngine::new(Arc::new(api), config)
}

#[tokio::test]
async fn pages_through_live_directory() {
    let engine = connect(Arc::new(Directory::seeded(12)), EngineConfig::default()).await;

    let mut lengths = Vec::new();
    engine.refresh().await.unwrap();
    lengths.push(engine.snapshot().await.items.len());
    while engine.snapshot().await.has_more {
        engine.fetch_more().await.unwrap();
        lengths.push(engine.snapshot().await.items.len());
    }

    assert_eq!(lengths, vec![5, 10, 12]);
    assert_eq!(engine.snapshot().await.total_count, Some(12));
    assert_eq!(engine.fetch_more().await.unwrap(), FetchOutcome::Exhausted);
}

#[tokio::test]
async fn edit_session_round_trip() {
    let directory = Arc::new(Directory::seeded(6));
    let engine = connect(directory.clone(), EngineConfig::default()).await;
    engine.refresh().await.unwrap();

    let original = engine.begin_edit(&EmployeeId::from(3)).await.unwrap();
    let edited = EmployeeForm {
        age: 25,
        ..original.to_form()
    };
    let outcome = engine.save(&edited).await.unwrap();
    assert!(matches!(outcome, SaveOutcome::Updated(_)));

    assert_eq!(directory.employees().await[2].age, 25);
    assert_eq!(engine.snapshot().await.items[2].age, 25);
}

#[tokio::test]
async fn create_and_delete_round_trip() {
    let directory = Arc::new(Directory::seeded(3));
    let engine = connect(directory.clone(), EngineConfig::default()).await;
    engine.refresh().await.unwrap();

    let form = EmployeeForm {
        first_name: "Zoe".into(),
        sex: Some(SexId::from(2)),
        ..Default::default()
    };
    let created = engine.create(&form).await.unwrap().unwrap();
    assert_eq!(engine.snapshot().await.items.len(), 4);

    engine.toggle_selection(created.id.clone(), true).await;
    engine.toggle_selection(EmployeeId::from(1), true).await;
    engine.delete_selected().await.unwrap();

    let snapshot = engine.snapshot().await;
    assert!(snapshot.selection.is_empty());
    assert!(snapshot.items.iter().all(|i| i.id != created.id && i.id != EmployeeId::from(1)));
    assert_eq!(directory.len().await, 2);
}

#[tokio::test]
async fn server_validation_surfaces_local_field_names() {
    let config = EngineConfig {
        validate_locally: false,
        ..Default::default()
    };
    let engine = connect(Arc::new(Directory::new()), config).await;

    let form = EmployeeForm {
        first_name: String::new(),
        age: 12,
        sex: Some(SexId::from(1)),
        ..Default::default()
    };
    let err = engine.create(&form).await.unwrap_err();
    let fields = err.field_errors().unwrap();
    assert!(fields.first("firstName").is_some());
    assert!(fields.first("age").is_some());
}

#[tokio::test]
async fn stale_delete_refreshes_list() {
    let directory = Arc::new(Directory::seeded(4));
    let engine = connect(directory.clone(), EngineConfig::default()).await;
    engine.refresh().await.unwrap();

    // Removed behind the engine's back.
    directory.delete(&[EmployeeId::from(2)]).await.unwrap();

    let err = engine.delete(&[EmployeeId::from(2)]).await.unwrap_err();
    assert!(matches!(err, SyncError::NotFound(_)));

    let ids: Vec<_> = engine
        .snapshot()
        .await
        .items
        .iter()
        .filter_map(|i| i.id.as_number())
        .collect();
    assert_eq!(ids, vec![1, 3, 4]);
}

#[tokio::test]
async fn local_patch_uses_cached_labels() {
    let directory = Arc::new(Directory::seeded(2));
    let config = EngineConfig {
        strategy: ReconcileStrategy::LocalPatch,
        ..Default::default()
    };
    let engine = connect(directory, config).await;
    engine.load_sexes().await.unwrap();
    engine.refresh().await.unwrap();

    let original = engine.begin_edit(&EmployeeId::from(1)).await.unwrap();
    let edited = EmployeeForm {
        sex: Some(SexId::from(2)),
        ..original.to_form()
    };
    engine.save(&edited).await.unwrap();

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.items[0].sex, "Female");
    assert!(snapshot.editing.is_none());
}
