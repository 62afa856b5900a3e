//! Response emission.

use super::Dispatch;
use serde_json::Value;
use sockroute_core::{ActionDescriptor, BoxError, DispatchError, Fault, MapOptions, Socket};
use tracing::{debug, warn};

impl Dispatch {
    /// Emit the success event, if the action declares one.
    ///
    /// Fails only when the result cannot be mapped; nothing is emitted then.
    pub(super) fn emit_success(
        &self,
        action: &ActionDescriptor,
        socket: &dyn Socket,
        result: Option<Value>,
    ) -> Result<(), BoxError> {
        let Some(rule) = &action.on_success else {
            return Ok(());
        };

        match result.filter(|value| !value.is_null()) {
            Some(value) => {
                let payload = self.to_plain(value, rule.options.as_ref())?;
                emit(socket, &rule.event, Some(payload));
            }
            None if !action.skip_empty_result => emit(socket, &rule.event, None),
            None => debug!(event = %rule.event, "skipping emission of empty result"),
        }
        Ok(())
    }

    /// Emit the failure event, if the action declares one.
    ///
    /// A [`Fault`] with a non-empty object or array payload is emitted as
    /// that payload; every other failure is emitted as its message.
    pub(super) fn emit_failure(
        &self,
        action: &ActionDescriptor,
        socket: &dyn Socket,
        failure: &DispatchError,
    ) {
        let Some(rule) = &action.on_fail else {
            return;
        };

        let structured = failure
            .inner()
            .downcast_ref::<Fault>()
            .map(Fault::payload)
            .filter(|payload| has_content(payload))
            .and_then(|payload| match self.to_plain(payload.clone(), rule.options.as_ref()) {
                Ok(mapped) => Some(mapped).filter(has_content),
                Err(err) => {
                    warn!(error = %err, "failed to map failure payload");
                    None
                }
            });

        let payload = structured.unwrap_or_else(|| Value::String(failure.to_string()));
        emit(socket, &rule.event, Some(payload));
    }

    fn to_plain(&self, value: Value, options: Option<&MapOptions>) -> Result<Value, BoxError> {
        if !self.options.use_value_mapper || !(value.is_object() || value.is_array()) {
            return Ok(value);
        }
        let options = options.unwrap_or(&self.options.instance_to_plain);
        self.options.mapper.to_plain(value, options)
    }
}

fn has_content(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn emit(socket: &dyn Socket, event: &str, payload: Option<Value>) {
    debug!(event, has_payload = payload.is_some(), "emitting");
    if let Err(err) = socket.emit(event, payload) {
        warn!(event, error = %err, "failed to emit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ExecutorOptions,
        mapper::PruneMapper,
        testing::{Emission, MockSocket},
    };
    use serde_json::json;
    use sockroute_core::{Args, EmissionRule, ResolveError};
    use std::sync::{Arc, Weak};

    fn dispatch(options: ExecutorOptions) -> Dispatch {
        Dispatch {
            root: Weak::<crate::testing::MockRoot>::new(),
            options,
        }
    }

    fn action(
        on_success: Option<&str>,
        on_fail: Option<EmissionRule>,
        skip: bool,
    ) -> ActionDescriptor {
        ActionDescriptor {
            target: "C".to_string(),
            method: "m".to_string(),
            kind: sockroute_core::ActionKind::Connect,
            params: Vec::new(),
            on_success: on_success.map(EmissionRule::new),
            on_fail,
            skip_empty_result: skip,
            handler: Arc::new(|_args: Args| async {}),
        }
    }

    #[test]
    fn test_success_with_and_without_result() {
        let dispatch = dispatch(ExecutorOptions::default());
        let socket = MockSocket::new("s");

        let done = action(Some("done"), None, false);
        dispatch.emit_success(&done, &socket, Some(json!({ "x": 1 }))).unwrap();
        dispatch.emit_success(&done, &socket, None).unwrap();
        dispatch.emit_success(&done, &socket, Some(Value::Null)).unwrap();

        let skipping = action(Some("done"), None, true);
        dispatch.emit_success(&skipping, &socket, None).unwrap();

        assert_eq!(
            socket.emitted(),
            vec![
                Emission::new("done", Some(json!({ "x": 1 }))),
                Emission::new("done", None),
                Emission::new("done", None),
            ]
        );
    }

    #[test]
    fn test_no_rule_emits_nothing() {
        let dispatch = dispatch(ExecutorOptions::default());
        let socket = MockSocket::new("s");
        let bare = action(None, None, false);

        dispatch.emit_success(&bare, &socket, Some(json!(1))).unwrap();
        dispatch.emit_failure(&bare, &socket, &DispatchError::Handler("x".into()));

        assert!(socket.emitted().is_empty());
    }

    #[test]
    fn test_success_maps_with_rule_options() {
        let dispatch = dispatch(ExecutorOptions::default().with_mapper(PruneMapper::new()));
        let socket = MockSocket::new("s");
        let mut done = action(None, None, false);
        done.on_success =
            Some(EmissionRule::new("done").with_options(MapOptions::new().exclude("secret")));

        dispatch
            .emit_success(&done, &socket, Some(json!({ "id": 1, "secret": "s" })))
            .unwrap();
        assert_eq!(socket.emitted()[0].payload, Some(json!({ "id": 1 })));
    }

    #[test]
    fn test_mapping_disabled_passes_through() {
        let options = ExecutorOptions::default()
            .with_mapper(PruneMapper::new())
            .with_instance_to_plain(MapOptions::new().exclude("secret"))
            .with_value_mapper(false);
        let dispatch = dispatch(options);
        let socket = MockSocket::new("s");

        let done = action(Some("done"), None, false);
        dispatch
            .emit_success(&done, &socket, Some(json!({ "secret": "s" })))
            .unwrap();
        assert_eq!(socket.emitted()[0].payload, Some(json!({ "secret": "s" })));
    }

    #[test]
    fn test_failure_uses_message_without_content() {
        let dispatch = dispatch(ExecutorOptions::default());
        let socket = MockSocket::new("s");
        let failing = action(None, Some(EmissionRule::new("err")), true);

        dispatch.emit_failure(&failing, &socket, &DispatchError::Handler("boom".into()));
        dispatch.emit_failure(
            &failing,
            &socket,
            &DispatchError::Handler(Box::new(Fault::new("empty").with_payload(json!({})))),
        );
        dispatch.emit_failure(
            &failing,
            &socket,
            &DispatchError::Resolve(ResolveError::RootUnavailable),
        );

        let payloads: Vec<_> = socket.emitted().into_iter().map(|e| e.payload).collect();
        assert_eq!(
            payloads,
            vec![
                Some(json!("boom")),
                Some(json!("empty")),
                Some(json!("messaging root is no longer available")),
            ]
        );
    }

    #[test]
    fn test_failure_maps_with_own_options() {
        let options = ExecutorOptions::default()
            .with_mapper(PruneMapper::new())
            .with_instance_to_plain(MapOptions::new().exclude("trace"));
        let dispatch = dispatch(options);
        let socket = MockSocket::new("s");

        let mut failing = action(None, None, false);
        failing.on_success =
            Some(EmissionRule::new("ok").with_options(MapOptions::new().exclude("code")));
        failing.on_fail = Some(EmissionRule::new("err"));

        let fault = Fault::new("bad").with_payload(json!({ "code": 1, "trace": "t" }));
        dispatch.emit_failure(&failing, &socket, &DispatchError::Handler(Box::new(fault)));

        assert_eq!(socket.emitted()[0].payload, Some(json!({ "code": 1 })));
    }
}
