//! Deadline and cancellation helpers for collaborator calls

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use docrag_core::ErrorKind;

/// Run `call` under `limit`; on expiry yield `on_timeout(limit)`
pub async fn with_deadline<T, E, F>(
    limit: Duration,
    call: F,
    on_timeout: fn(Duration) -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(limit)),
    }
}

/// Race `work` against `cancel`, preferring cancellation when both are ready
pub async fn cancellable<T, F>(cancel: &CancellationToken, work: F) -> Result<T, ErrorKind>
where
    F: Future<Output = Result<T, ErrorKind>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ErrorKind::Cancelled),
        result = work => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrag_core::StoreError;

    #[tokio::test]
    async fn test_deadline_expires() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, StoreError>(())
        };
        let err = with_deadline(Duration::from_millis(20), slow, StoreError::Timeout)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Timeout(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_deadline_passes_result_through() {
        let fast = async { Err::<(), _>(StoreError::Unavailable("down".to_string())) };
        let err = with_deadline(Duration::from_secs(1), fast, StoreError::Timeout)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Unavailable("down".to_string()));
    }

    #[tokio::test]
    async fn test_cancelled_token_wins() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = cancellable(&cancel, async { Ok(42) }).await;
        assert!(matches!(result, Err(ErrorKind::Cancelled)));
    }

    #[tokio::test]
    async fn test_uncancelled_work_completes() {
        let cancel = CancellationToken::new();
        assert_eq!(cancellable(&cancel, async { Ok(7) }).await.unwrap(), 7);
    }
}
