use lumen_core::Result;
use tokio::sync::mpsc;

/// Receiving end of one streamed assistant reply.
///
/// Yields `Some(Ok(fragment))` in arrival order, then `None` once the reply
/// is complete. A `Some(Err(_))` is terminal: every later call returns `None`.
#[derive(Debug)]
pub struct ReplyStream {
    rx: mpsc::UnboundedReceiver<Result<String>>,
    finished: bool,
}

impl ReplyStream {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<Result<String>>) -> Self {
        Self { rx, finished: false }
    }

    /// Next fragment of the reply
    pub async fn next(&mut self) -> Option<Result<String>> {
        if self.finished {
            return None;
        }

        let item = self.rx.recv().await;
        if !matches!(item, Some(Ok(_))) {
            self.finished = true;
            self.rx.close();
        }
        item
    }

    /// Drain the stream into the full reply text
    pub async fn collect_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(fragment) = self.next().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
