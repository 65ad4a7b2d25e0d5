use super::TextureError;

pub(crate) type Outcome = Result<(), TextureError>;

/// Completion handle returned by `TextureVault::load`.
///
/// Resolves once the vault has uploaded (or failed) the texture during a
/// `poll`. Blocking on it from the thread that polls the vault never returns;
/// use [`try_outcome`](Self::try_outcome) there.
#[derive(Debug)]
pub struct LoadTicket {
    name: String,
    rx: flume::Receiver<Outcome>,
    outcome: Option<Outcome>,
}

impl LoadTicket {
    pub(crate) fn new(name: &str) -> (Self, flume::Sender<Outcome>) {
        let (tx, rx) = flume::bounded(1);
        (
            Self {
                name: name.to_string(),
                rx,
                outcome: None,
            },
            tx,
        )
    }

    /// A ticket that is already resolved.
    pub(crate) fn resolved(name: &str, outcome: Outcome) -> Self {
        let (ticket, tx) = Self::new(name);
        let _ = tx.send(outcome);
        ticket
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Non-blocking check. `None` while the load is in flight; once resolved
    /// the outcome is kept and returned by every later call.
    pub fn try_outcome(&mut self) -> Option<&Outcome> {
        if self.outcome.is_none() {
            self.outcome = match self.rx.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(flume::TryRecvError::Empty) => None,
                Err(flume::TryRecvError::Disconnected) => {
                    Some(Err(TextureError::Discarded(self.name.clone())))
                }
            };
        }
        self.outcome.as_ref()
    }

    pub fn wait(self) -> Outcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(TextureError::Discarded(self.name)))
    }

    pub async fn wait_async(self) -> Outcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        match self.rx.recv_async().await {
            Ok(outcome) => outcome,
            Err(_) => Err(TextureError::Discarded(self.name)),
        }
    }
}
