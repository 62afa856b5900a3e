use sockroute::{
    Args, BoxError, ExecutorOptions, Fault, Json, MapOptions, MetadataRegistry, PruneMapper,
    SyncHandler, json, testing::Emission,
};

mod common;
use common::{connect, serve, serve_with};

#[derive(serde::Serialize)]
struct Saved {
    id: u32,
    #[serde(rename = "_rev")]
    rev: u32,
}

#[tokio::test]
async fn test_success_emits_result_once() {
    let mut registry = MetadataRegistry::new();
    let mut ctrl = registry.controller("Jobs");
    ctrl.method("run", |_args: Args| async { json!({ "x": 1 }) })
        .on_message("run")
        .emit_on_success("done");

    let root = serve(&registry);
    let socket = connect(&root, "s1").await;
    socket.receive("run", None).await;

    assert_eq!(
        socket.emitted(),
        vec![Emission::new("done", Some(json!({ "x": 1 })))]
    );
}

#[tokio::test]
async fn test_empty_result_emits_without_payload() {
    let mut registry = MetadataRegistry::new();
    let mut ctrl = registry.controller("Jobs");
    ctrl.method("run", |_args: Args| async {})
        .on_message("run")
        .emit_on_success("done");
    ctrl.method("quiet", |_args: Args| async { None::<String> })
        .on_message("quiet")
        .emit_on_success("done")
        .skip_emit_on_empty_result();

    let root = serve(&registry);
    let socket = connect(&root, "s1").await;
    socket.receive("run", None).await;
    socket.receive("quiet", None).await;

    assert_eq!(socket.emitted(), vec![Emission::new("done", None)]);
}

#[tokio::test]
async fn test_no_rule_no_emission() {
    let mut registry = MetadataRegistry::new();
    let mut ctrl = registry.controller("Jobs");
    ctrl.method("run", |_args: Args| async { "result" })
        .on_message("run");
    ctrl.method("fail", |_args: Args| async { Err::<(), BoxError>("boom".into()) })
        .on_message("fail");

    let root = serve(&registry);
    let socket = connect(&root, "s1").await;
    socket.receive("run", None).await;
    socket.receive("fail", None).await;

    assert!(socket.emitted().is_empty());
}

#[tokio::test]
async fn test_error_emits_string_form() {
    let mut registry = MetadataRegistry::new();
    let mut ctrl = registry.controller("Jobs");
    ctrl.method("fail", |_args: Args| async { Err::<(), BoxError>("boom".into()) })
        .on_message("fail")
        .emit_on_success("done")
        .emit_on_fail("err");

    let root = serve(&registry);
    let socket = connect(&root, "s1").await;
    socket.receive("fail", None).await;

    assert_eq!(socket.emitted(), vec![Emission::new("err", Some(json!("boom")))]);
}

#[tokio::test]
async fn test_skip_empty_does_not_silence_failures() {
    let mut registry = MetadataRegistry::new();
    let mut ctrl = registry.controller("Jobs");
    ctrl.method("fail", SyncHandler(|_args: Args| Err::<(), _>(Fault::new("denied"))))
        .on_message("fail")
        .emit_on_fail("err")
        .skip_emit_on_empty_result();

    let root = serve(&registry);
    let socket = connect(&root, "s1").await;
    socket.receive("fail", None).await;

    assert_eq!(socket.emitted(), vec![Emission::new("err", Some(json!("denied")))]);
}

#[tokio::test]
async fn test_fault_payload_is_mapped_with_fail_options() {
    let mut registry = MetadataRegistry::new();
    let mut ctrl = registry.controller("Billing");
    ctrl.method("charge", |_args: Args| async {
        Err::<(), _>(Fault::new("card declined").with_payload(json!({
            "code": "declined",
            "_trace": "abc"
        })))
    })
    .on_message("charge")
    .emit_on_fail_with("charge_error", MapOptions::new().exclude_prefix("_"));

    let options = ExecutorOptions::default().with_mapper(PruneMapper::new());
    let root = serve_with(&registry, options);
    let socket = connect(&root, "s1").await;
    socket.receive("charge", None).await;

    assert_eq!(
        socket.emitted(),
        vec![Emission::new("charge_error", Some(json!({ "code": "declined" })))]
    );
}

#[tokio::test]
async fn test_serialized_result_is_mapped_globally() {
    let mut registry = MetadataRegistry::new();
    let mut ctrl = registry.controller("Store");
    ctrl.method("save", SyncHandler(|_args: Args| Json(Saved { id: 3, rev: 9 })))
        .on_message("save")
        .emit_on_success("saved");

    let options = ExecutorOptions::default()
        .with_mapper(PruneMapper::new())
        .with_instance_to_plain(MapOptions::new().exclude_prefix("_"));
    let root = serve_with(&registry, options);
    let socket = connect(&root, "s1").await;
    socket.receive("save", None).await;

    assert_eq!(
        socket.emitted(),
        vec![Emission::new("saved", Some(json!({ "id": 3 })))]
    );
}

#[tokio::test]
async fn test_scalar_results_skip_mapping() {
    let mut registry = MetadataRegistry::new();
    let mut ctrl = registry.controller("Counter");
    ctrl.method("count", SyncHandler(|_args: Args| json!(3)))
        .on_message("count")
        .emit_on_success_with("counted", MapOptions::new().exclude("anything"));

    let options = ExecutorOptions::default().with_mapper(PruneMapper::new());
    let root = serve_with(&registry, options);
    let socket = connect(&root, "s1").await;
    socket.receive("count", None).await;

    assert_eq!(socket.emitted(), vec![Emission::new("counted", Some(json!(3)))]);
}
