use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use surety_common::{
    config::SuretyConfig,
    error::{Result, SuretyError},
    events::SuretyEvent,
};

use crate::app::FlightSurety;

use super::{
    command::{Command, Outcome},
    handle::SuretyHandle,
    journal::{JobStatus, Journal, JournalEntry},
};

const EVENT_CAPACITY: usize = 1024;

/// Result of a command the sequencer committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub job_id: Uuid,
    pub seq: u64,
    pub outcome: Outcome,
}

pub(crate) type Inspector = Box<dyn FnOnce(&FlightSurety) + Send>;

pub(crate) enum Envelope {
    Execute {
        command: Command,
        reply: oneshot::Sender<Result<Receipt>>,
    },
    Inspect(Inspector),
    Journal(oneshot::Sender<Journal>),
}

/// Single writer over the `FlightSurety` state.
///
/// Commands are taken off one queue and each runs to completion before the next
/// starts, in arrival order. Notifications of committed commands are broadcast;
/// a failed command publishes nothing.
pub struct Sequencer {
    app: FlightSurety,
    rx: mpsc::Receiver<Envelope>,
    events: broadcast::Sender<SuretyEvent>,
    journal: Journal,
    seq: u64,
    last_committed: u64,
}

impl Sequencer {
    pub fn spawn(config: SuretyConfig) -> Result<SuretyHandle> {
        let capacity = config.queue_capacity;
        let app = FlightSurety::new(config)?;
        Ok(Self::spawn_with(app, capacity))
    }

    /// Runs the sequencer on an existing state, e.g. one rebuilt by [`replay`].
    pub fn spawn_with(app: FlightSurety, queue_capacity: usize) -> SuretyHandle {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let sequencer = Sequencer {
            app,
            rx,
            events: events.clone(),
            journal: Journal::new(),
            seq: 0,
            last_committed: 0,
        };
        tokio::spawn(sequencer.run());

        SuretyHandle::new(tx, events)
    }

    async fn run(mut self) {
        info!("🚦 Sequencer started");
        while let Some(envelope) = self.rx.recv().await {
            match envelope {
                Envelope::Execute { command, reply } => {
                    let result = self.process(command);
                    let _ = reply.send(result);
                }
                Envelope::Inspect(inspect) => inspect(&self.app),
                Envelope::Journal(reply) => {
                    let _ = reply.send(self.journal.clone());
                }
            }
        }
        info!("🛑 Sequencer stopped after {} commands", self.seq);
    }

    fn process(&mut self, command: Command) -> Result<Receipt> {
        self.seq += 1;
        let seq = self.seq;
        let job_id = Uuid::new_v4();

        let (result, events) = step(&mut self.app, &mut self.last_committed, seq, &command);

        let (status, err_msg) = match &result {
            Ok(_) => (JobStatus::Completed, None),
            Err(e) => {
                warn!("⚠️ Command #{} from {} rejected: {}", seq, command.caller(), e);
                (JobStatus::Failed, Some(e.to_string()))
            }
        };
        self.journal.push(JournalEntry {
            job_id,
            seq,
            command,
            status,
            err_msg,
            executed_at: Utc::now(),
        });

        for event in events {
            debug!("📣 Publishing {}", event.name());
            // No subscriber is not an error.
            let _ = self.events.send(event);
        }

        result.map(|outcome| Receipt { job_id, seq, outcome })
    }
}

/// Executes one command the same way live and during replay.
///
/// The seed visible to the command is the sequence number of the last committed one.
fn step(
    app: &mut FlightSurety,
    last_committed: &mut u64,
    seq: u64,
    command: &Command,
) -> (Result<Outcome>, Vec<SuretyEvent>) {
    app.set_seed(*last_committed);
    let result = command.execute(app);
    let events = app.drain_events();
    if result.is_ok() {
        *last_committed = seq;
        (result, events)
    } else {
        (result, Vec::new())
    }
}

/// Rebuilds state by re-executing a journal on a fresh instance.
///
/// Fails if a command's outcome differs from the recorded one.
pub fn replay(config: SuretyConfig, journal: &Journal) -> Result<FlightSurety> {
    journal.check_sequence()?;
    let mut app = FlightSurety::new(config)?;
    let mut last_committed = 0;

    for entry in journal.entries() {
        let (result, _) = step(&mut app, &mut last_committed, entry.seq, &entry.command);
        let status = if result.is_ok() {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        };
        if status != entry.status {
            return Err(SuretyError::Runtime(format!(
                "Replay diverged at seq {}: recorded {:?}, got {:?}",
                entry.seq, entry.status, status
            )));
        }
    }

    info!("🔁 Replayed {} commands", journal.len());
    Ok(app)
}
