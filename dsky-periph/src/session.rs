use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};

use dsky_core::clock::WallClock;
use dsky_core::timer::{TimerKind, TimerRequest};
use dsky_core::{Dsky, Key, MacroStore, Outcome};

use crate::emitter::Emitter;
use crate::error::Result;
use crate::payload::TelemetryPayload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Raw key token, parsed by the session.
    Key(String),
    Expire { kind: TimerKind, epoch: u32 },
    Shutdown,
}

fn timer_thread(req_rx: Receiver<TimerRequest>, tx: Sender<SessionEvent>) {
    let mut pending: Vec<(Instant, TimerRequest)> = Vec::new();

    loop {
        let incoming = match pending.first() {
            Some((deadline, _)) => req_rx.recv_deadline(*deadline),
            None => req_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match incoming {
            Ok(req) => {
                let deadline = Instant::now() + Duration::from_millis(req.after_ms as u64);
                // Kept sorted; equal deadlines fire in request order
                let at = pending.partition_point(|(d, _)| *d <= deadline);
                pending.insert(at, (deadline, req));
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let now = Instant::now();
        let due = pending.partition_point(|(d, _)| *d <= now);
        for (_, req) in pending.drain(..due) {
            let event = SessionEvent::Expire {
                kind: req.kind,
                epoch: req.epoch,
            };
            if tx.send(event).is_err() {
                return;
            }
        }
    }
    debug!("Session: timer channel closed");
}

///
/// ## Session
///
/// Single owner of the panel state machine. Consoles, socket listeners and
/// the timer thread only hold a `Sender<SessionEvent>`; the session applies
/// the events one at a time, so the snapshot has exactly one writer.
///
/// Timer requests go to one long-lived timer thread, which posts
/// `SessionEvent::Expire` back once each deadline passes.
///
pub struct Session<M: MacroStore, C: WallClock> {
    dsky: Dsky<M, C>,
    emitter: Option<Emitter>,
    tx: Sender<SessionEvent>,
    rx: Receiver<SessionEvent>,
    timer_tx: Option<Sender<TimerRequest>>,
    timer_handle: Option<std::thread::JoinHandle<()>>,
}

impl<M: MacroStore, C: WallClock> Session<M, C> {
    pub fn new(dsky: Dsky<M, C>, emitter: Option<Emitter>) -> Result<Self> {
        let (tx, rx) = unbounded();
        let (timer_tx, timer_rx) = unbounded();

        let expire_tx = tx.clone();
        let timer_handle = std::thread::Builder::new()
            .name("dsky-timer".into())
            .spawn(move || timer_thread(timer_rx, expire_tx))?;

        Ok(Session {
            dsky,
            emitter,
            tx,
            rx,
            timer_tx: Some(timer_tx),
            timer_handle: Some(timer_handle),
        })
    }

    /// Handle for event producers.
    pub fn sender(&self) -> Sender<SessionEvent> {
        self.tx.clone()
    }

    pub fn dsky(&self) -> &Dsky<M, C> {
        &self.dsky
    }

    ///
    /// # Description
    ///
    /// Applies one event to the panel, emits the snapshot when the panel asks
    /// for it and schedules any requested timer.
    ///
    /// # Return Value
    ///
    ///  - `None` when the event asks the session to stop.
    ///
    pub fn dispatch(&mut self, event: SessionEvent) -> Option<Outcome> {
        let outcome = match event {
            SessionEvent::Key(token) => match Key::parse(&token) {
                Some(key) => self.dsky.handle_key(key),
                None => {
                    debug!("Session: ignoring unknown key {:?}", token);
                    Outcome::ignored()
                }
            },
            SessionEvent::Expire { kind, epoch } => self.dsky.expire(kind, epoch),
            SessionEvent::Shutdown => return None,
        };

        if outcome.emit {
            self.emit();
        }
        if let Some(req) = outcome.timer {
            self.schedule(req);
        }
        Some(outcome)
    }

    fn emit(&self) {
        let emitter = match &self.emitter {
            Some(e) => e,
            None => return,
        };

        let res = TelemetryPayload::from(self.dsky.snapshot())
            .to_json()
            .and_then(|json| emitter.submit(json));
        if let Err(e) = res {
            warn!("Session: unable to emit snapshot: {}", e);
        }
    }

    fn schedule(&self, req: TimerRequest) {
        let sent = match &self.timer_tx {
            Some(tx) => tx.send(req).is_ok(),
            None => false,
        };
        if !sent {
            warn!("Session: timer thread gone, dropping {:?} timer", req.kind);
        }
    }

    ///
    /// Processes events until `Shutdown` arrives. `observer` is called after
    /// every event that changed what the panel shows.
    ///
    pub fn run<F: FnMut(&Dsky<M, C>, &Outcome)>(&mut self, mut observer: F) {
        info!("Session: running");
        loop {
            let event = match self.rx.recv() {
                Ok(x) => x,
                _ => break,
            };

            match self.dispatch(event) {
                Some(outcome) if outcome.redraw => observer(&self.dsky, &outcome),
                Some(_) => {}
                None => break,
            }
        }
        info!("Session: stopped");
    }
}

impl<M: MacroStore, C: WallClock> Drop for Session<M, C> {
    fn drop(&mut self) {
        // Closing the request channel wakes the timer thread; pending timers die with it
        self.timer_tx.take();
        if let Some(handle) = self.timer_handle.take() {
            if handle.join().is_err() {
                warn!("Session: timer thread panicked");
            }
        }
    }
}
