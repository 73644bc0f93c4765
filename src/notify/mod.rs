//! Legacy listener-count push.
//!
//! Some studio clock displays expect the exporter to push the current
//! listener count to `http://<host>/?Command=SetMem=Listeners,<n>`.
//! Pushes run on detached tasks. Responses and errors are dropped without
//! logging, so a slow or dead target never delays a poll cycle.

use std::time::Duration;

const PUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Fire-and-forget sender for the legacy push target.
#[derive(Debug, Clone)]
pub struct LegacyNotifier {
    host: String,
    client: reqwest::Client,
}

impl LegacyNotifier {
    /// Creates a notifier for `host`; an empty host disables pushing.
    pub fn new(host: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(PUSH_TIMEOUT).build()?;
        Ok(Self {
            host: host.into(),
            client,
        })
    }

    /// A notifier that never sends anything.
    pub fn disabled() -> Self {
        Self {
            host: String::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Returns true if a push target is configured.
    pub fn is_enabled(&self) -> bool {
        !self.host.is_empty()
    }

    /// Renders the push URL for a listener count.
    pub fn push_url(&self, listeners: u64) -> String {
        format!("http://{}/?Command=SetMem=Listeners,{}", self.host, listeners)
    }

    /// Dispatches one push on a detached task and returns immediately.
    ///
    /// Transport errors and responses are discarded. Outside a tokio
    /// runtime there is nothing to run the push on, so it is skipped.
    pub fn notify(&self, listeners: u64) {
        if !self.is_enabled() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let client = self.client.clone();
        let url = self.push_url(listeners);
        runtime.spawn(async move {
            let _ = client.get(url).send().await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_url_format() {
        let notifier = LegacyNotifier::new("clock.local:8080").unwrap();
        assert_eq!(
            notifier.push_url(17),
            "http://clock.local:8080/?Command=SetMem=Listeners,17"
        );
    }

    #[test]
    fn test_empty_host_disabled() {
        assert!(!LegacyNotifier::disabled().is_enabled());
        assert!(LegacyNotifier::new("clock").unwrap().is_enabled());
        assert!(!LegacyNotifier::new("").unwrap().is_enabled());
    }

    #[test]
    fn test_notify_without_runtime_is_skipped() {
        let notifier = LegacyNotifier::new("127.0.0.1:9").unwrap();
        notifier.notify(3);
    }

    #[tokio::test]
    async fn test_unreachable_target_is_silent() {
        // Port 9 on localhost is normally closed; the push must not panic or block.
        let notifier = LegacyNotifier::new("127.0.0.1:9").unwrap();
        notifier.notify(3);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
