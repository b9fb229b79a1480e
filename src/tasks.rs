use std::future::Future;

use tokio::task::AbortHandle;

/// A handler that returned an error or panicked.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub label: String,
    pub message: String,
}

/// Runs handlers as isolated tasks and funnels their failures into one channel.
#[derive(Clone)]
pub struct TaskSupervisor {
    failure_tx: flume::Sender<TaskFailure>,
}

impl TaskSupervisor {
    pub fn new() -> (Self, flume::Receiver<TaskFailure>) {
        let (failure_tx, failure_rx) = flume::unbounded();
        (Self { failure_tx }, failure_rx)
    }

    /// Spawns `future` on its own task. The returned handle can cancel it.
    pub fn spawn<F>(&self, label: impl Into<String>, future: F) -> AbortHandle
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let label = label.into();
        let failure_tx = self.failure_tx.clone();

        let inner = tokio::spawn(future);
        let abort_handle = inner.abort_handle();

        tokio::spawn(async move {
            let message = match inner.await {
                Ok(Ok(())) => return,
                Ok(Err(err)) => format!("{err:#}"),
                Err(join_err) if join_err.is_cancelled() => return,
                Err(join_err) => format!("panicked: {join_err}"),
            };
            let _ = failure_tx.send(TaskFailure { label, message });
        });

        abort_handle
    }
}

/// Logs every failure until all supervisors are dropped.
pub async fn report_failures(failure_rx: flume::Receiver<TaskFailure>) {
    while let Ok(failure) = failure_rx.recv_async().await {
        tracing::error!(task = %failure.label, "{}", failure.message);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_error_is_reported_with_label() {
        let (supervisor, failure_rx) = TaskSupervisor::new();
        supervisor.spawn("command:ping", async { anyhow::bail!("gateway hiccup") });

        let failure = tokio::time::timeout(Duration::from_secs(5), failure_rx.recv_async())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(failure.label, "command:ping");
        assert_eq!(failure.message, "gateway hiccup");
    }

    #[tokio::test]
    async fn test_panic_is_reported_and_contained() {
        let (supervisor, failure_rx) = TaskSupervisor::new();
        supervisor.spawn("listener:mention", async {
            panic!("boom");
        });

        let failure = tokio::time::timeout(Duration::from_secs(5), failure_rx.recv_async())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(failure.label, "listener:mention");
        assert!(failure.message.starts_with("panicked"));
    }

    #[tokio::test]
    async fn test_success_and_abort_report_nothing() {
        let (supervisor, failure_rx) = TaskSupervisor::new();
        supervisor.spawn("ok", async { Ok(()) });
        let handle = supervisor.spawn("slow", async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        });
        handle.abort();
        drop(supervisor);

        let received = tokio::time::timeout(Duration::from_secs(5), failure_rx.recv_async())
            .await
            .unwrap();
        assert!(received.is_err(), "expected channel to close without failures");
    }
}
