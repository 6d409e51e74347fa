use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lapin::{Channel, ConnectionProperties};
use tokio::sync::{watch, Notify, RwLock};
use tracing::{error, info, warn};

use crate::errors::BusError;

/// A supervised AMQP connection. Mirrors the original's
/// `Connection`/`runNotifyWatcher` pair: a background task watches for
/// close notifications and keeps retrying (sleep = `reconnect_timeout`)
/// until a new connection is established or [`Connection::close`] is
/// called explicitly.
pub struct Connection {
    uri: String,
    reconnect_timeout: Duration,
    inner: Arc<RwLock<lapin::Connection>>,
    closed: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
}

impl Connection {
    /// Dials `uri` and spawns the reconnect supervisor.
    pub async fn connect(uri: impl Into<String>, reconnect_timeout: Duration) -> Result<Self, BusError> {
        let uri = uri.into();
        let conn = lapin::Connection::connect(&uri, ConnectionProperties::default()).await?;
        let inner = Arc::new(RwLock::new(conn));
        let closed = Arc::new(AtomicBool::new(false));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        spawn_notify_watcher(
            uri.clone(),
            reconnect_timeout,
            inner.clone(),
            closed.clone(),
            shutdown_rx,
        );

        Ok(Self {
            uri,
            reconnect_timeout,
            inner,
            closed,
            shutdown: shutdown_tx,
        })
    }

    /// Opens a fresh channel over the current (possibly just-reconnected)
    /// connection. Per spec §5 shared-resource policy (c), each
    /// publisher/consumer owns its own channel.
    pub async fn channel(&self) -> Result<Channel, BusError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BusError::ConnectionClosed);
        }
        let guard = self.inner.read().await;
        Ok(guard.create_channel().await?)
    }

    /// Explicitly closes the connection and stops the reconnect
    /// supervisor. A second call returns `ConnectionClosed`, matching the
    /// original's `ConnAlreadyClosedErr`.
    pub async fn close(&self) -> Result<(), BusError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(BusError::ConnectionClosed);
        }
        let _ = self.shutdown.send(true);
        let guard = self.inner.read().await;
        guard
            .close(0, "closed by caller")
            .await
            .map_err(BusError::from)
    }
}

fn spawn_notify_watcher(
    uri: String,
    reconnect_timeout: Duration,
    inner: Arc<RwLock<lapin::Connection>>,
    closed: Arc<AtomicBool>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        loop {
            let notify = Arc::new(Notify::new());
            {
                let guard = inner.read().await;
                let notify_for_callback = notify.clone();
                guard.on_error(move |err| {
                    warn!(target: "bus.connection", error = %err, "amqp connection reported an error");
                    notify_for_callback.notify_one();
                });
            }

            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!(target: "bus.connection", "connection supervisor shutting down");
                        return;
                    }
                }
                _ = notify.notified() => {
                    if closed.load(Ordering::SeqCst) {
                        return;
                    }
                    warn!(target: "bus.connection", "amqp connection closed unexpectedly, reconnecting");
                    loop {
                        match lapin::Connection::connect(&uri, ConnectionProperties::default()).await {
                            Ok(fresh) => {
                                *inner.write().await = fresh;
                                info!(target: "bus.connection", "amqp connection re-established");
                                break;
                            }
                            Err(err) => {
                                error!(target: "bus.connection", error = %err, "reconnect attempt failed");
                                tokio::time::sleep(reconnect_timeout).await;
                            }
                        }
                    }
                }
            }
        }
    });
}
