//! Interactive command loop driving the alarm controller.

use std::sync::Arc;

use async_trait::async_trait;
use miette::IntoDiagnostic;
use tokio::io::{AsyncBufReadExt, BufReader};
use touchalarm_core::{
    AlarmController, AlarmEvent, AlarmEventSink, AlarmRecord, AlarmStore,
};
use tracing::warn;

use crate::output::Output;

/// Commands the terminal user can type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Set { hour: i32, minute: i32 },
    Arm,
    Disarm,
    Snooze,
    Stop,
    MinutesUp,
    MinutesDown,
    HoursUp,
    HoursDown,
    Status,
    Help,
    Quit,
}

/// Parse one input line. `Ok(None)` is an empty line.
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let parsed = match (command, arg) {
        ("set", Some(time)) => {
            let (hour, minute) = time
                .split_once(':')
                .ok_or_else(|| format!("expected HH:MM, got '{time}'"))?;
            let hour = hour
                .parse::<i32>()
                .map_err(|_| format!("bad hour '{hour}'"))?;
            let minute = minute
                .parse::<i32>()
                .map_err(|_| format!("bad minute '{minute}'"))?;
            ReplCommand::Set { hour, minute }
        }
        ("set", None) => return Err("set needs a time, e.g. 'set 06:30'".to_string()),
        ("arm", _) | ("on", _) => ReplCommand::Arm,
        ("disarm", _) | ("off", _) => ReplCommand::Disarm,
        ("snooze", _) => ReplCommand::Snooze,
        ("stop", _) => ReplCommand::Stop,
        ("up", _) => ReplCommand::MinutesUp,
        ("down", _) => ReplCommand::MinutesDown,
        ("hup", _) => ReplCommand::HoursUp,
        ("hdown", _) => ReplCommand::HoursDown,
        ("status", _) => ReplCommand::Status,
        ("help", _) | ("?", _) => ReplCommand::Help,
        ("quit", _) | ("exit", _) | ("q", _) => ReplCommand::Quit,
        (other, _) => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(parsed))
}

fn print_help(output: &Output) {
    output.status("commands:");
    output.list_item("set HH:MM   set the displayed alarm time");
    output.list_item("up / down   step minutes, hup / hdown step hours");
    output.list_item("arm / disarm (or on / off)");
    output.list_item("snooze      snooze the ringing alarm");
    output.list_item("stop        acknowledge the ringing alarm");
    output.list_item("status, help, quit");
}

fn print_status(controller: &AlarmController, output: &Output) {
    let snapshot = controller.snapshot();
    output.status(&format!("display time: {}", controller.display_time()));
    if controller.is_ringing() {
        output.warning("alarm is RINGING (snooze or stop)");
    } else if snapshot.active {
        match snapshot.next_alarm {
            Some(instant) => output.status(&format!(
                "armed for {:02}:{:02}, next firing {}",
                snapshot.hour, snapshot.minutes, instant
            )),
            None => output.status("armed"),
        }
    } else {
        output.status("disarmed");
    }
}

/// Prints controller events as they happen.
pub struct PrintSink {
    output: Output,
}

impl PrintSink {
    pub fn new(output: Output) -> Self {
        Self { output }
    }
}

#[async_trait]
impl AlarmEventSink for PrintSink {
    async fn send(&self, event: AlarmEvent) {
        match event {
            AlarmEvent::Changed {
                active,
                next_alarm,
                hour,
                minutes,
            } => {
                let detail = match (active, next_alarm) {
                    (true, Some(instant)) => {
                        format!("armed {:02}:{:02}, fires {}", hour, minutes, instant)
                    }
                    (true, None) => format!("armed {:02}:{:02}", hour, minutes),
                    (false, _) => "disarmed".to_string(),
                };
                self.output.event("alarm changed", &detail);
            }
            AlarmEvent::Fired { hour, minutes } => {
                self.output
                    .event("ALARM", &format!("{:02}:{:02} - wake up!", hour, minutes));
            }
            AlarmEvent::Snoozed { hour, minutes } => {
                self.output
                    .event("snoozed", &format!("until {:02}:{:02}", hour, minutes));
            }
        }
    }
}

/// Persists every state change through the alarm store.
pub struct StoreSink {
    store: Arc<dyn AlarmStore>,
}

impl StoreSink {
    pub fn new(store: Arc<dyn AlarmStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AlarmEventSink for StoreSink {
    async fn send(&self, event: AlarmEvent) {
        if let AlarmEvent::Changed {
            active,
            next_alarm,
            hour,
            minutes,
        } = event
        {
            let record = AlarmRecord {
                hour,
                minutes,
                active,
                next_alarm,
            };
            if let Err(e) = self.store.save(&record).await {
                warn!("failed to persist alarm state: {e}");
            }
        }
    }
}

/// Read commands from stdin until quit or EOF.
pub async fn run_repl(controller: AlarmController, output: Output) -> miette::Result<()> {
    output.status(&format!(
        "touchalarm ready, display time {} (type 'help' for commands)",
        controller.display_time()
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.into_diagnostic()? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                output.error(&message);
                continue;
            }
        };

        match command {
            ReplCommand::Set { hour, minute } => {
                controller.set_display_time(hour, minute);
                output.success(&format!("display time {}", controller.display_time()));
            }
            ReplCommand::Arm => {
                controller.arm().await;
            }
            ReplCommand::Disarm => {
                controller.disarm().await;
            }
            ReplCommand::Snooze => {
                if let Err(e) = controller.snooze().await {
                    output.error(&e.to_string());
                }
            }
            ReplCommand::Stop => {
                controller.stop();
                output.success("alarm stopped");
            }
            ReplCommand::MinutesUp => {
                controller.change_minutes(true);
                output.status(&controller.display_time().to_string());
            }
            ReplCommand::MinutesDown => {
                controller.change_minutes(false);
                output.status(&controller.display_time().to_string());
            }
            ReplCommand::HoursUp => {
                controller.change_hours(true);
                output.status(&controller.display_time().to_string());
            }
            ReplCommand::HoursDown => {
                controller.change_hours(false);
                output.status(&controller.display_time().to_string());
            }
            ReplCommand::Status => print_status(&controller, &output),
            ReplCommand::Help => print_help(&output),
            ReplCommand::Quit => break,
        }
    }

    controller.stop();
    Ok(())
}
