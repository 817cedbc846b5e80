//! Helpers for running a controller in-process on an ephemeral port

use rendezvous::{Config, Controller, ControllerClient};
use std::path::Path;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub struct TestController {
    pub url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<rendezvous::Result<()>>,
}

impl TestController {
    pub async fn start(state_file: Option<&Path>, poll_interval_ms: u64) -> Self {
        let config = Config {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            persist: state_file.is_some(),
            state_file: state_file
                .map(Path::to_path_buf)
                .unwrap_or_else(|| "unused.json".into()),
            poll_interval_ms,
            ..Default::default()
        };
        let controller = Controller::new(config);
        let listener = controller.bind().await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(controller.serve_on(listener, async {
            let _ = rx.await;
        }));

        Self {
            url,
            shutdown: Some(tx),
            handle,
        }
    }

    pub fn client(&self) -> ControllerClient {
        ControllerClient::new(self.url.clone())
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}
