//! The poll-check-notify cycle and the loop that drives it.
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{Config, Secrets};
use crate::error::{BotError, Result};
use crate::homework::{check_response, parse_status};
use crate::practicum::HomeworkApi;
use crate::telegram::{send_message, Messenger};

/// Loop-local state carried between ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    pub last_notified_message: Option<String>,
    pub cursor_timestamp: i64,
}

#[async_trait]
pub trait Clock: Send + Sync {
    /// Current unix time in seconds.
    fn now_unix(&self) -> i64;
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A changed verdict was dispatched.
    Notified(String),
    Unchanged,
    NoUpdate,
    /// The cycle failed; carries the failure text meant for the user.
    Failed(String),
}

pub struct Poller {
    secrets: Secrets,
    retry_period: Duration,
    suppress_repeated_failures: bool,
    api: Arc<dyn HomeworkApi>,
    messenger: Arc<dyn Messenger>,
    clock: Arc<dyn Clock>,
    state: PollState,
    last_failure: Option<String>,
}

impl Poller {
    /// The cursor starts at the clock's current time.
    pub fn new(
        config: &Config,
        api: Arc<dyn HomeworkApi>,
        messenger: Arc<dyn Messenger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cursor_timestamp = clock.now_unix();
        Self {
            secrets: config.secrets.clone(),
            retry_period: config.settings.retry_period(),
            suppress_repeated_failures: config.settings.suppress_repeated_failures,
            api,
            messenger,
            clock,
            state: PollState {
                last_notified_message: None,
                cursor_timestamp,
            },
            last_failure: None,
        }
    }

    pub fn with_cursor(mut self, cursor_timestamp: i64) -> Self {
        self.state.cursor_timestamp = cursor_timestamp;
        self
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Tick, sleep, repeat. `Some(n)` stops after n ticks; `None` runs until a
    /// fatal error.
    pub async fn run(&mut self, max_ticks: Option<u64>) -> Result<()> {
        let mut ticks = 0u64;
        while max_ticks.map_or(true, |max| ticks < max) {
            self.tick().await?;
            ticks += 1;
            self.clock.sleep(self.retry_period).await;
        }
        Ok(())
    }

    /// One polling cycle. Only a token guard failure is returned as an error;
    /// every other failure is announced to the chat and folded into the outcome.
    #[instrument(skip_all)]
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        self.secrets.check()?;
        match self.cycle().await {
            Ok(outcome) => {
                self.last_failure = None;
                Ok(outcome)
            }
            Err(err) => Ok(self.report_failure(err).await),
        }
    }

    async fn cycle(&mut self) -> Result<TickOutcome> {
        let response = self
            .api
            .get_api_answer(self.state.cursor_timestamp)
            .await?;

        let outcome = match check_response(&response)? {
            None => TickOutcome::NoUpdate,
            Some(homework) => {
                let message = parse_status(homework)?;
                if self.state.last_notified_message.as_deref() == Some(message.as_str()) {
                    debug!("homework status unchanged");
                    TickOutcome::Unchanged
                } else {
                    send_message(
                        self.messenger.as_ref(),
                        &self.secrets.telegram_chat_id,
                        &message,
                    )
                    .await;
                    info!("homework status change dispatched");
                    self.state.last_notified_message = Some(message.clone());
                    TickOutcome::Notified(message)
                }
            }
        };

        self.advance_cursor(response.get("current_date"));
        Ok(outcome)
    }

    fn advance_cursor(&mut self, current_date: Option<&Value>) {
        match current_date.and_then(Value::as_i64) {
            Some(ts) if ts >= self.state.cursor_timestamp => self.state.cursor_timestamp = ts,
            Some(ts) => warn!(
                current_date = ts,
                cursor = self.state.cursor_timestamp,
                "current_date is behind the cursor; keeping cursor"
            ),
            None => warn!(
                cursor = self.state.cursor_timestamp,
                "current_date is not an integer; keeping cursor"
            ),
        }
    }

    async fn report_failure(&mut self, err: BotError) -> TickOutcome {
        error!(?err, "polling cycle failed");
        let message = format!("Сбой в работе программы: {}", err);
        if self.suppress_repeated_failures && self.last_failure.as_deref() == Some(message.as_str())
        {
            debug!("failure already announced");
        } else {
            send_message(
                self.messenger.as_ref(),
                &self.secrets.telegram_chat_id,
                &message,
            )
            .await;
        }
        self.last_failure = Some(message.clone());
        TickOutcome::Failed(message)
    }
}
