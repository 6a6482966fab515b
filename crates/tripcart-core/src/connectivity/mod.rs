//! Online/offline tracking.
//!
//! `ConnectivityMonitor` holds the current status and reports transitions;
//! `HttpProbe` is the network indicator for processes without a platform
//! signal, treating any HTTP response from the backend as "online".

use std::time::Duration;

use reqwest::Client;
use tokio::sync::watch;

/// Default timeout of a single probe request
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// A change of connectivity status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CameOnline,
    WentOffline,
}

/// Current online flag plus change notification
#[derive(Debug)]
pub struct ConnectivityMonitor {
    status: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    /// Start from the platform's reading at construction time
    pub fn new(online: bool) -> Self {
        let (status, _) = watch::channel(online);
        Self { status }
    }

    pub fn is_online(&self) -> bool {
        *self.status.borrow()
    }

    /// Record a status report.
    ///
    /// Returns the transition it caused, or `None` when the status is
    /// unchanged.
    pub fn update(&self, online: bool) -> Option<Transition> {
        let changed = self.status.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });

        if !changed {
            return None;
        }
        if online {
            tracing::info!("Connectivity restored");
            Some(Transition::CameOnline)
        } else {
            tracing::info!("Connectivity lost");
            Some(Transition::WentOffline)
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.status.subscribe()
    }
}

/// Probes reachability with a `HEAD` request against a fixed URL
#[derive(Debug, Clone)]
pub struct HttpProbe {
    url: String,
    client: Client,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>) -> reqwest::Result<Self> {
        Self::with_timeout(url, DEFAULT_PROBE_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            url: url.into(),
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    /// `true` when the server answered at all, whatever the status code
    pub async fn is_online(&self) -> bool {
        match self.client.head(&self.url).send().await {
            Ok(response) => {
                tracing::debug!("Probe {} answered {}", self.url, response.status());
                true
            }
            Err(error) => {
                tracing::debug!("Probe {} failed: {}", self.url, error);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_reports_cause_one_transition() {
        let monitor = ConnectivityMonitor::new(false);

        assert_eq!(monitor.update(true), Some(Transition::CameOnline));
        assert_eq!(monitor.update(true), None);
        assert_eq!(monitor.update(true), None);
        assert!(monitor.is_online());

        assert_eq!(monitor.update(false), Some(Transition::WentOffline));
        assert_eq!(monitor.update(false), None);
        assert!(!monitor.is_online());
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let monitor = ConnectivityMonitor::new(true);
        let mut receiver = monitor.subscribe();

        monitor.update(false);
        receiver.changed().await.unwrap();
        assert!(!*receiver.borrow_and_update());
    }

    #[tokio::test]
    async fn probe_reports_offline_when_nothing_listens() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = HttpProbe::with_timeout(format!("http://{addr}"), Duration::from_millis(500))
            .unwrap();
        assert!(!probe.is_online().await);
    }
}
