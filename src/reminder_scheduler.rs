// src/reminder_scheduler.rs - Reminder scheduler module
use std::collections::HashSet;
use std::sync::{Arc, Weak};

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use log::{debug, error, info, trace};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};

use crate::{Board, BoardError, Config, Note, Result};

/// Source of the current local date and time
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// A note that is due right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub note_id: String,
    pub title: String,
    pub due: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct ReminderSchedulerStatus {
    /// Whether the scheduler is running
    pub is_running: bool,
    /// The time of the last completed check
    pub last_check: Option<NaiveDateTime>,
    /// Number of reminders sent since start
    pub reminders_sent: usize,
}

#[derive(Debug, Clone)]
pub enum ReminderCommand {
    /// Check for due notes immediately
    CheckNow,
    /// Stop the reminder scheduler
    Stop,
}

/// Open notes due at the current minute of `now`.
///
/// A note is due when it is in todo or in progress, its date is today and its
/// time matches the current hour and minute. Notes with a date but no time
/// are due at `default_time`.
pub fn due_notes(notes: &[Note], now: NaiveDateTime, default_time: NaiveTime) -> Vec<Reminder> {
    let today: NaiveDate = now.date();
    notes
        .iter()
        .filter(|n| n.is_active() && n.date == Some(today))
        .filter_map(|n| {
            let time = n.time.unwrap_or(default_time);
            if time.hour() != now.hour() || time.minute() != now.minute() {
                return None;
            }
            Some(Reminder {
                note_id: n.id.clone(),
                title: n.title.clone(),
                due: today.and_time(time),
            })
        })
        .collect()
}

/// Remembers which reminders went out so each note alerts once per due minute
#[derive(Debug, Default)]
pub struct ReminderTracker {
    sent: HashSet<(String, NaiveDateTime)>,
}

impl ReminderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only reminders not sent before, and marks them as sent
    pub fn filter_new(&mut self, reminders: Vec<Reminder>) -> Vec<Reminder> {
        reminders
            .into_iter()
            .filter(|r| self.sent.insert((r.note_id.clone(), r.due)))
            .collect()
    }

    /// Forgets reminders due before `now`'s date
    pub fn prune(&mut self, now: NaiveDateTime) {
        let today = now.date();
        self.sent.retain(|(_, due)| due.date() >= today);
    }
}

pub struct ReminderScheduler {
    /// Configuration for the scheduler
    config: Config,

    /// Channel to send commands to the scheduler task
    command_tx: mpsc::Sender<ReminderCommand>,

    /// Handle to the scheduler task
    scheduler_task: Option<JoinHandle<ReminderSchedulerStatus>>,

    /// Current status of the scheduler
    status: ReminderSchedulerStatus,

    /// Weak reference to the board
    board: Option<Weak<Mutex<Board>>>,

    clock: Clock,
}

impl ReminderScheduler {
    /// Create a new reminder scheduler with the provided config
    pub fn new(config: Config) -> Self {
        debug!("Initializing reminder scheduler with config: {:?}", config);
        let (command_tx, _) = mpsc::channel(10);

        Self {
            config,
            command_tx,
            scheduler_task: None,
            status: ReminderSchedulerStatus {
                is_running: false,
                last_check: None,
                reminders_sent: 0,
            },
            board: None,
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Set the weak reference to the board
    pub fn set_board(&mut self, board: &Arc<Mutex<Board>>) {
        self.board = Some(Arc::downgrade(board));
        debug!("Board reference set in ReminderScheduler.");
    }

    /// Replace the wall clock, e.g. with a fixed time
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    /// Start the reminder scheduler. Due reminders arrive on the returned
    /// channel; the first check runs immediately.
    pub fn start(&mut self) -> Result<mpsc::Receiver<Reminder>> {
        info!("Starting reminder scheduler...");
        if !self.config.reminders_enabled {
            return Err(BoardError::ConfigError {
                message: "Reminders are disabled; run `kbboard config --set reminders_enabled=true`"
                    .to_string(),
            });
        }
        if self.scheduler_task.is_some() {
            return Err(BoardError::SchedulerError {
                message: "Reminder scheduler is already running".to_string(),
            });
        }

        let board = match &self.board {
            Some(weak) => match weak.upgrade() {
                Some(_) => Weak::clone(weak),
                None => {
                    error!("Failed to retrieve Board - reference is no longer valid.");
                    return Err(BoardError::SchedulerError {
                        message: "Board reference is no longer valid.".to_string(),
                    });
                }
            },
            None => {
                error!("No board reference found in ReminderScheduler.");
                return Err(BoardError::SchedulerError {
                    message: "ReminderScheduler does not have a board reference.".to_string(),
                });
            }
        };

        let default_time = self.config.reminder_time()?;
        let (command_tx, mut command_rx) = mpsc::channel(10);
        let (reminder_tx, reminder_rx) = mpsc::channel(32);
        self.command_tx = command_tx;

        let interval_secs = self.config.reminder_interval_secs.max(1);
        let clock = Arc::clone(&self.clock);

        let task = tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(interval_secs));
            let mut tracker = ReminderTracker::new();
            let mut status = ReminderSchedulerStatus {
                is_running: true,
                last_check: None,
                reminders_sent: 0,
            };

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    cmd = command_rx.recv() => match cmd {
                        Some(ReminderCommand::CheckNow) => debug!("Manual reminder check"),
                        Some(ReminderCommand::Stop) | None => {
                            info!("Reminder scheduler stopping...");
                            break;
                        }
                    }
                }

                let Some(shared) = board.upgrade() else {
                    info!("Board dropped, stopping reminder scheduler");
                    break;
                };
                let now = clock();
                let due = {
                    let board = shared.lock().await;
                    due_notes(board.notes(), now, default_time)
                };
                tracker.prune(now);
                status.last_check = Some(now);

                for reminder in tracker.filter_new(due) {
                    trace!("Sending reminder for {}", reminder.note_id);
                    if reminder_tx.send(reminder).await.is_err() {
                        info!("Reminder receiver dropped, stopping scheduler");
                        status.is_running = false;
                        return status;
                    }
                    status.reminders_sent += 1;
                }
            }

            status.is_running = false;
            status
        });

        self.scheduler_task = Some(task);
        self.status.is_running = true;

        Ok(reminder_rx)
    }

    /// Stop the reminder scheduler if it's running
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.scheduler_task.take() {
            // The task may already have exited if its receiver was dropped
            if let Err(e) = self.command_tx.send(ReminderCommand::Stop).await {
                debug!("Reminder scheduler already stopped: {}", e);
            }

            match task.await {
                Ok(status) => self.status = status,
                Err(e) => {
                    let error_mgs = format!("Failed to stop reminder scheduler: {}", e);
                    error!("{}", error_mgs);
                    return Err(BoardError::SchedulerError { message: error_mgs });
                }
            }

            self.status.is_running = false;
            info!("Reminder scheduler stopped");
        } else {
            debug!("Reminder scheduler is not running");
        }

        Ok(())
    }

    /// Check for due notes immediately, regardless of the schedule
    pub async fn check_now(&self) -> Result<()> {
        if !self.status.is_running {
            return Err(BoardError::SchedulerError {
                message: "Reminder scheduler is not running".to_string(),
            });
        }

        self.command_tx
            .send(ReminderCommand::CheckNow)
            .await
            .map_err(|e| BoardError::SchedulerError {
                message: format!("Failed to send check command: {}", e),
            })?;

        Ok(())
    }

    /// Get the current status of the reminder scheduler
    pub fn get_status(&self) -> ReminderSchedulerStatus {
        self.status.clone()
    }
}
