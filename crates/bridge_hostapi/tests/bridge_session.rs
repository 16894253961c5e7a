//! End-to-end bridge session tests: generated registration glue, host
//! dispatch, client proxies, signals, events, and input round trips.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::time::timeout;

use bridge_hostapi::{HOST_API_SCHEMA_JSON, catalog, host_api_schema, register_host_api_capabilities};
use bridge_runtime::{
    BridgeHost, BridgeNotification, BridgeRoot, ClientOptions, EventHandler, HostConfig,
    HostHandle, HostNotification, SignalHandler, channel_pair, connect,
};

async fn start_session(options: ClientOptions) -> (BridgeRoot, HostHandle) {
    let (host_end, client_end) = channel_pair();
    let mut host = BridgeHost::new(
        host_end,
        HostConfig {
            version: catalog::VERSION.to_string(),
            schema_json: HOST_API_SCHEMA_JSON.to_string(),
            valid_event_types: catalog::EVENT_TYPES.iter().map(|s| s.to_string()).collect(),
        },
    );
    register_host_api_capabilities(&mut host);
    let handle = host.handle();
    tokio::spawn(host.run());

    let root = connect(client_end, options).await.expect("connect failed");
    (root, handle)
}

async fn wait_until(condition: impl Fn() -> bool) {
    timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_client_sees_the_embedded_schema() {
    let (root, _handle) = start_session(ClientOptions::default()).await;
    assert_eq!(root.version(), catalog::VERSION);
    assert_eq!(root.schema().as_ref(), host_api_schema());
    assert_eq!(root.valid_event_types(), catalog::EVENT_TYPES);
    assert!(root.version_mismatch().is_none());
}

#[tokio::test]
async fn test_generated_capability_methods() {
    let (root, _handle) = start_session(ClientOptions::default()).await;
    let example = root.capability("example").expect("example proxy");

    let reply = example.call("echo", vec![json!("ping")]).unwrap();
    assert_eq!(reply.wait().await.unwrap(), json!("ping"));

    let reply = example.call("add", vec![json!(2), json!(40)]).unwrap();
    assert_eq!(reply.wait().await.unwrap(), json!(42));
}

#[tokio::test]
async fn test_status_signal_fires_once_per_change() {
    let (root, _handle) = start_session(ClientOptions::default()).await;
    let example = root.capability("example").unwrap();

    let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    let handler = SignalHandler::new(move |args| {
        s.lock().push(args.first().cloned().unwrap_or(Value::Null));
    });
    example
        .register_event_handler("statusChanged", handler.clone())
        .unwrap();

    // Void call: resolves immediately, signal arrives asynchronously.
    let reply = example.call("setStatus", vec![json!("busy")]).unwrap();
    assert_eq!(reply.wait().await.unwrap(), Value::Null);
    // Same status again is not a change and must not re-emit.
    example.call("setStatus", vec![json!("busy")]).unwrap();

    wait_until(|| !seen.lock().is_empty()).await;
    assert_eq!(*seen.lock(), vec![json!("busy")]);

    example.remove_event_handler("statusChanged", &handler).unwrap();
    example.call("setStatus", vec![json!("idle")]).unwrap();
    // Drain with a real round trip so a stray signal would have landed.
    let reply = example.call("echo", vec![json!("sync")]).unwrap();
    reply.wait().await.unwrap();
    assert_eq!(seen.lock().len(), 1);
}

#[tokio::test]
async fn test_event_listeners_run_in_order_with_panic_isolation() {
    let (root, handle) = start_session(ClientOptions::default()).await;

    let seen: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    let first = EventHandler::new(move |_| {
        s.lock().push(1);
        panic!("first listener fails");
    });
    let s = seen.clone();
    let second = EventHandler::new(move |_| s.lock().push(2));

    root.add_event_listener("actionOne", first).unwrap();
    root.add_event_listener("actionOne", second).unwrap();

    handle.trigger_event("actionOne", json!({"value": 42})).unwrap();
    wait_until(|| seen.lock().len() == 2).await;
    assert_eq!(*seen.lock(), vec![1, 2]);
}

#[tokio::test]
async fn test_unknown_event_type_is_rejected_on_both_sides() {
    let (root, handle) = start_session(ClientOptions::default()).await;

    let error = handle.trigger_event("bogus", Value::Null).unwrap_err();
    assert_eq!(error.to_string(), "eventType bogus not found.");

    let error = root
        .add_event_listener("bogus", EventHandler::new(|_| {}))
        .unwrap_err();
    assert_eq!(error.to_string(), "eventType bogus not found.");

    let error = root
        .remove_event_listener("bogus", &EventHandler::new(|_| {}))
        .unwrap_err();
    assert_eq!(error.to_string(), "eventType bogus not found.");

    let example = root.capability("example").unwrap();
    let error = example
        .remove_event_handler("noSuchSignal", &SignalHandler::new(|_| {}))
        .unwrap_err();
    assert!(error.to_string().contains("noSuchSignal"));
}

#[tokio::test]
async fn test_get_input_round_trip() {
    let (root, handle) = start_session(ClientOptions::default()).await;
    let mut notifications = handle.subscribe();

    let input_task = tokio::spawn(async move {
        root.get_input().await
    });

    let token = loop {
        match timeout(Duration::from_secs(5), notifications.recv())
            .await
            .expect("no input request")
            .unwrap()
        {
            HostNotification::InputRequested { token } => break token,
            _ => continue,
        }
    };
    handle.provide_input(&token, json!("typed text")).unwrap();

    let value = input_task.await.unwrap().unwrap();
    assert_eq!(value, json!("typed text"));
}

#[tokio::test]
async fn test_handshake_notifications_reach_a_presubscribed_channel() {
    let (tx, mut notifications) = ClientOptions::notification_channel();
    let (_root, _handle) = start_session(ClientOptions {
        expected_version: Some("9.9.9".to_string()),
        notifications: Some(tx),
        ..ClientOptions::default()
    })
    .await;

    let BridgeNotification::VersionMismatch { expected, actual } = timeout(
        Duration::from_secs(5),
        notifications.recv(),
    )
    .await
    .expect("no mismatch notification")
    .unwrap()
    else {
        panic!("expected version mismatch first");
    };
    assert_eq!(expected, "9.9.9");
    assert_eq!(actual, catalog::VERSION);

    let BridgeNotification::Ready { version, schema } = timeout(
        Duration::from_secs(5),
        notifications.recv(),
    )
    .await
    .expect("no ready notification")
    .unwrap()
    else {
        panic!("expected ready");
    };
    assert_eq!(version, catalog::VERSION);
    assert_eq!(schema.as_ref(), host_api_schema());
}

#[tokio::test]
async fn test_version_mismatch_is_advisory_only() {
    let (root, _handle) = start_session(ClientOptions {
        expected_version: Some("9.9.9".to_string()),
        ..ClientOptions::default()
    })
    .await;

    assert_eq!(
        root.version_mismatch(),
        Some(("9.9.9", catalog::VERSION))
    );

    // The session still works end to end.
    let example = root.capability("example").unwrap();
    let reply = example.call("echo", vec![json!("still works")]).unwrap();
    assert_eq!(reply.wait().await.unwrap(), json!("still works"));
}

#[tokio::test]
async fn test_send_data_and_set_output_reach_the_host() {
    let (root, handle) = start_session(ClientOptions::default()).await;
    let mut notifications = handle.subscribe();

    root.send_data(json!({"kind": "telemetry"})).unwrap();
    root.set_output("done").unwrap();

    let mut data = None;
    let mut output = None;
    while data.is_none() || output.is_none() {
        match timeout(Duration::from_secs(5), notifications.recv())
            .await
            .expect("notification missing")
            .unwrap()
        {
            HostNotification::DataReceived(payload) => data = Some(payload),
            HostNotification::OutputChanged(text) => output = Some(text),
            _ => continue,
        }
    }
    assert_eq!(data.unwrap(), json!({"kind": "telemetry"}));
    assert_eq!(output.unwrap(), "done");
}
