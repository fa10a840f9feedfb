use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};

use crate::error::{PeriphError, Result};
use crate::sink::TelemetrySink;

fn emitter_thread(rx: Receiver<String>, mut sink: Box<dyn TelemetrySink>) {
    // Runs until every sender is gone, so queued payloads are flushed on drop
    for payload in rx.iter() {
        if let Err(e) = sink.emit(&payload) {
            warn!("Emitter: dropping payload, sink failed: {}", e);
        }
    }
    debug!("Emitter: channel closed");
}

///
/// ## Emitter
///
/// Background worker that owns the telemetry sink. Payloads are queued on an
/// unbounded channel, so the key path never waits on a slow serial line or
/// socket, and they reach the sink in submission order.
///
pub struct Emitter {
    tx: Option<Sender<String>>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl Emitter {
    pub fn spawn<S: TelemetrySink + 'static>(sink: S) -> Result<Self> {
        let (tx, rx) = unbounded();
        let sink: Box<dyn TelemetrySink> = Box::new(sink);
        let handle = std::thread::Builder::new()
            .name("dsky-emitter".into())
            .spawn(move || emitter_thread(rx, sink))?;

        Ok(Emitter {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    pub fn submit(&self, payload: String) -> Result<()> {
        match &self.tx {
            Some(tx) => tx.send(payload).map_err(|_| PeriphError::Disconnected),
            None => Err(PeriphError::Disconnected),
        }
    }
}

impl Drop for Emitter {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Emitter: worker panicked");
            }
        }
    }
}
