//! Termination chain between the orchestrator and the components it drives.
//!
//! ```text
//! app.shutdown ──▶ [app pre-hook] operator.shutdown, await operator terminated
//!                          │
//!                          ▼
//!              [operator pre-hook, first] log plugin.shutdown, await plugin terminated
//!                          │
//!                          ▼
//!              operator terminated ──▶ [operator post-hook] app.shutdown
//!                                      (no-op if already terminating)
//!
//! log plugin terminated on its own ──▶ [plugin post-hook] operator.shutdown
//! ```

use super::shutter::Shutter;

/// Make `upstream` terminate `downstream` first and adopt its terminal cause,
/// and make `downstream` terminating on its own bring `upstream` down.
pub fn cascade(upstream: &Shutter, downstream: &Shutter, name: &'static str) {
    let target = downstream.clone();
    upstream.on_terminating(move |cause| async move {
        tracing::info!(component = name, "Requesting termination");
        target.shutdown(cause);
        target.terminated().await
    });

    let back = upstream.clone();
    downstream.on_terminated(move |cause| {
        match &cause {
            Some(err) => tracing::info!(
                component = name,
                error = %err,
                "Component terminated, shutting down"
            ),
            None => tracing::info!(component = name, "Component terminated, shutting down"),
        }
        back.shutdown(cause);
    });
}

/// Put a gracefully-terminating plugin ahead of `component`: the plugin drains
/// before `component` tears down, and the plugin dying takes `component` with it.
///
/// The drain runs ahead of `component`'s own pre-terminate hooks, whenever those
/// were registered.
pub fn drain_before(component: &Shutter, plugin: &Shutter, name: &'static str) {
    let target = plugin.clone();
    component.on_terminating_first(move |cause| async move {
        tracing::info!(plugin = name, "Draining plugin before teardown");
        target.shutdown(cause);
        target.terminated().await;
        None
    });

    let back = component.clone();
    plugin.on_terminated(move |cause| back.shutdown(cause));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::shutter::cause;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct Failure(&'static str);

    fn recorder() -> Arc<Mutex<Vec<&'static str>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn test_upstream_shutdown_terminates_downstream_first() {
        let app = Shutter::new();
        let operator = Shutter::new();
        let events = recorder();

        let e = events.clone();
        operator.on_terminating(move |_| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            e.lock().unwrap().push("operator teardown");
            None
        });
        cascade(&app, &operator, "operator");

        app.shutdown(None);
        app.terminated().await;

        assert!(operator.is_terminated());
        assert_eq!(*events.lock().unwrap(), vec!["operator teardown"]);
    }

    #[tokio::test]
    async fn test_downstream_crash_propagates_cause() {
        let app = Shutter::new();
        let operator = Shutter::new();
        cascade(&app, &operator, "operator");

        operator.shutdown(Some(cause(Failure("process exited with status 1"))));

        let terminal = tokio::time::timeout(Duration::from_secs(1), app.terminated())
            .await
            .expect("app should terminate");
        assert_eq!(terminal.unwrap().to_string(), "process exited with status 1");
    }

    #[tokio::test]
    async fn test_app_adopts_operator_cause() {
        let app = Shutter::new();
        let operator = Shutter::new();
        operator.on_terminating(|_| async { Some(cause(Failure("unclean stop"))) });
        cascade(&app, &operator, "operator");

        app.shutdown(None);
        assert_eq!(app.terminated().await.unwrap().to_string(), "unclean stop");
    }

    #[tokio::test]
    async fn test_plugin_drains_before_component_teardown() {
        let operator = Shutter::new();
        let plugin = Shutter::new();
        let events = recorder();

        // The component installs its teardown when it is built, before any chain exists.
        let e = events.clone();
        operator.on_terminating(move |_| async move {
            e.lock().unwrap().push("operator teardown");
            None
        });
        let e = events.clone();
        plugin.on_terminating(move |_| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            e.lock().unwrap().push("plugin flush");
            None
        });
        drain_before(&operator, &plugin, "log");

        operator.shutdown(None);
        operator.terminated().await;

        assert_eq!(*events.lock().unwrap(), vec!["plugin flush", "operator teardown"]);
    }

    #[tokio::test]
    async fn test_plugin_drains_before_teardown_registered_later() {
        let operator = Shutter::new();
        let plugin = Shutter::new();
        let events = recorder();

        let e = events.clone();
        plugin.on_terminating(move |_| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            e.lock().unwrap().push("plugin flush");
            None
        });
        drain_before(&operator, &plugin, "log");
        let e = events.clone();
        operator.on_terminating(move |_| async move {
            e.lock().unwrap().push("operator teardown");
            None
        });

        operator.shutdown(None);
        operator.terminated().await;

        assert_eq!(*events.lock().unwrap(), vec!["plugin flush", "operator teardown"]);
    }

    #[tokio::test]
    async fn test_plugin_termination_stops_component() {
        let operator = Shutter::new();
        let plugin = Shutter::new();
        drain_before(&operator, &plugin, "log");

        plugin.shutdown(Some(cause(Failure("log sink closed"))));

        let terminal = tokio::time::timeout(Duration::from_secs(1), operator.terminated())
            .await
            .expect("operator should terminate");
        assert_eq!(terminal.unwrap().to_string(), "log sink closed");
    }
}
