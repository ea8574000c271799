//! Shutdown coordination
//!
//! A latched flag shared between the signal listener and the HTTP server.
//! Once triggered it stays triggered, so late waiters return immediately.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct Shutdown {
    state: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// Trigger shutdown. Returns false if it was already triggered.
    pub fn trigger(&self) -> bool {
        let first = self.state.send_if_modified(|stopping| {
            if *stopping {
                false
            } else {
                *stopping = true;
                true
            }
        });
        if first {
            tracing::info!("shutting down, draining in-flight requests");
        }
        first
    }

    pub fn is_triggered(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves once shutdown has been triggered.
    ///
    /// The returned future owns its receiver, so it can be handed to
    /// `axum::serve(..).with_graceful_shutdown(..)`.
    pub fn wait(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.state.subscribe();
        async move {
            // Err only if every sender is gone, which also means nothing is left to wait for
            let _ = rx.wait_for(|stopping| *stopping).await;
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for Ctrl+C or SIGTERM, then trigger `shutdown`.
pub async fn listen_for_signals(shutdown: Shutdown) {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                tracing::error!("cannot listen for Ctrl+C: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                tracing::error!("cannot listen for SIGTERM: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };

    tracing::info!("received {}", received);
    shutdown.trigger();
}
