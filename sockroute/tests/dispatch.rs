use sockroute::{
    Args, BoxError, Coercion, MetadataRegistry, ParamKind, ParamSpec, SocketRef, json,
    testing::{Emission, MockSocket},
};
use std::{sync::Arc, time::Duration};

mod common;
use common::{CallLog, connect, serve};

#[tokio::test]
async fn test_args_follow_index_order() {
    let log = CallLog::default();
    let mut registry = MetadataRegistry::new();
    let mut ctrl = registry.controller("Ordered");
    let calls = log.clone();
    ctrl.method("handle", move |args: Args| {
        let calls = calls.clone();
        async move {
            calls.push(format!(
                "{}|{}|{}",
                args.socket(0)?.id(),
                args.value(1)?.cloned().unwrap_or_default(),
                args.str(2)?.unwrap_or_default()
            ));
            Ok::<_, BoxError>(())
        }
    })
    .on_message("evt")
    .param_at(2, ParamSpec::new(ParamKind::SocketId))
    .param_at(0, ParamSpec::new(ParamKind::ConnectedSocket))
    .param_at(1, ParamSpec::new(ParamKind::MessageBody).coercion(Coercion::Number));

    let root = serve(&registry);
    let socket = connect(&root, "client-1").await;
    socket.receive("evt", Some(json!("42"))).await;

    assert_eq!(log.entries(), vec!["client-1|42|client-1"]);
}

#[tokio::test]
async fn test_back_to_back_messages_survive_failure() {
    let log = CallLog::default();
    let mut registry = MetadataRegistry::new();
    let mut ctrl = registry.controller("Chat");
    ctrl.method("explode", |_args: Args| async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Err::<(), BoxError>("exploded".into())
    })
    .on_message("explode")
    .emit_on_fail("explode_error");
    let calls = log.clone();
    ctrl.method("say", move |args: Args| {
        let calls = calls.clone();
        async move {
            calls.push(args.str(0)?.unwrap_or_default());
            Ok::<_, BoxError>(())
        }
    })
    .on_message("say")
    .message_body(Coercion::Text);

    let root = serve(&registry);
    let socket = connect(&root, "s1").await;

    let (first, second) = tokio::join!(
        socket.receive("explode", None),
        socket.receive("say", Some(json!("hello"))),
    );
    assert_eq!((first, second), (1, 1));
    socket.receive("say", Some(json!("again"))).await;

    assert_eq!(log.entries(), vec!["hello", "again"]);
    assert_eq!(
        socket.emitted_named("explode_error"),
        vec![Emission::new("explode_error", Some(json!("exploded")))]
    );
}

#[tokio::test]
async fn test_failed_connect_action_keeps_listeners() {
    let mut registry = MetadataRegistry::new();
    let mut ctrl = registry.controller("Session");
    ctrl.method("connected", |_args: Args| async {
        Err::<(), BoxError>("no session".into())
    })
    .on_connect()
    .emit_on_fail("session_error");
    ctrl.method("ping", |_args: Args| async { "pong" })
        .on_message("ping")
        .emit_on_success("pong");

    let root = serve(&registry);
    let socket = connect(&root, "s1").await;
    socket.receive("ping", None).await;

    assert_eq!(
        socket.emitted(),
        vec![
            Emission::new("session_error", Some(json!("no session"))),
            Emission::new("pong", Some(json!("pong"))),
        ]
    );
}

#[tokio::test]
async fn test_namespaced_controllers_are_isolated() {
    let log = CallLog::default();
    let mut registry = MetadataRegistry::new();
    for (target, namespace) in [("Lobby", None), ("Chat", Some("/chat")), ("Admin", Some("/admin"))] {
        let mut ctrl = registry.controller(target);
        if let Some(namespace) = namespace {
            ctrl = ctrl.namespace(namespace);
        }
        let calls = log.clone();
        ctrl.method("join", move |args: Args| {
            let calls = calls.clone();
            async move {
                let socket = args.socket(0)?;
                calls.push(format!("{target}@{}", socket.namespace()));
                Ok::<_, BoxError>(())
            }
        })
        .on_connect()
        .connected_socket();
    }

    let root = serve(&registry);
    assert_eq!(root.namespaces(), vec!["/", "/chat", "/admin"]);

    root.connect(Arc::new(MockSocket::new("a").with_namespace("/chat")))
        .await
        .unwrap();
    connect(&root, "b").await;

    assert_eq!(log.entries(), vec!["Chat@/chat", "Lobby@/"]);
}

#[tokio::test]
async fn test_root_controllers_share_one_registration() {
    let mut registry = MetadataRegistry::new();
    for target in ["First", "Second"] {
        let mut ctrl = registry.controller(target);
        ctrl.method("on_ping", |_args: Args| async {})
            .on_message("ping");
    }

    let root = serve(&registry);
    assert_eq!(root.namespaces(), vec!["/"]);

    let socket = connect(&root, "s1").await;
    assert_eq!(socket.listener_count("ping"), 2);
}

#[tokio::test]
async fn test_disconnect_action_runs_once_per_signal() {
    let log = CallLog::default();
    let mut registry = MetadataRegistry::new();
    let mut ctrl = registry.controller("Presence");
    let calls = log.clone();
    ctrl.method("left", move |args: Args| {
        let calls = calls.clone();
        async move {
            let socket: &SocketRef = args.socket(0)?;
            calls.push(format!("left {}", socket.id()));
            Ok::<_, BoxError>(())
        }
    })
    .on_disconnect()
    .connected_socket();

    let root = serve(&registry);
    let socket = connect(&root, "s1").await;
    assert!(log.entries().is_empty());

    socket.disconnect().await;
    assert_eq!(log.entries(), vec!["left s1"]);
}

#[tokio::test]
async fn test_selected_controllers_only() {
    let mut registry = MetadataRegistry::new();
    for target in ["Kept", "Skipped"] {
        let mut ctrl = registry.controller(target);
        ctrl.method("m", |_args: Args| async {}).on_message(target);
    }

    let root = sockroute::testing::MockRoot::new();
    sockroute::Executor::new(root.clone(), Default::default())
        .execute(&registry, Some(&["Kept"]), None)
        .unwrap();

    let socket = connect(&root, "s1").await;
    assert_eq!(socket.listener_count("Kept"), 1);
    assert_eq!(socket.listener_count("Skipped"), 0);
}
