// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interactive shell over the operation registry
//!
//! The shell is a domain-specific repl: each line is a command with flagged
//! arguments, dispatched against the registry. Scheduling commands answer
//! with the new operation id immediately; progress is observed later through
//! `list` and `status`.

use crate::parse::{parse_flags, tokenize, CommandSpec, FlagSpec, Parsed, ParseError};
use chrono::{DateTime, Local, TimeZone, Utc};
use resv_api::{Credentials, ReservationApi, SearchQuery};
use resv_core::{
    AttemptSpec, Clock, DeadlineTriggerParams, IntervalRetryParams, OperationId,
    OperationStatus, Registry, RegistryError,
};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("invalid date format")]
    InvalidDate,
    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

/// What the repl loop should do with a handled line
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Reply(String),
    Quit,
}

const CREDENTIAL_FLAGS: [FlagSpec; 2] = [
    FlagSpec::one("e", "email", "Login email; optional when already logged in", false),
    FlagSpec::one("p", "password", "Login password; optional when already logged in", false),
];

const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "search",
        help: "Finds restaurant info",
        flags: &[
            FlagSpec::one("n", "name", "Name of the restaurant", true),
            FlagSpec::one("l", "limit", "Max amount of results to return", false),
        ],
    },
    CommandSpec {
        name: "rais",
        help: "Reserve At Interval Scheduler",
        flags: &[
            CREDENTIAL_FLAGS[0],
            CREDENTIAL_FLAGS[1],
            FlagSpec::one("v", "venue-id", "Venue id (use search to find by name)", true),
            FlagSpec::one("resD", "reservation-day", "Reservation day, yyyy:mm:dd", true),
            FlagSpec::many("resT", "reservation-times", "Priority time list, hh:mm", true),
            FlagSpec::one("ps", "party-size", "Size of party", true),
            FlagSpec::one("i", "interval", "Retry interval, hh:mm", true),
        ],
    },
    CommandSpec {
        name: "rats",
        help: "Reserve At Time Scheduler",
        flags: &[
            CREDENTIAL_FLAGS[0],
            CREDENTIAL_FLAGS[1],
            FlagSpec::one("v", "venue-id", "Venue id (use search to find by name)", true),
            FlagSpec::one("resD", "reservation-day", "Reservation day, yyyy:mm:dd", true),
            FlagSpec::many("resT", "reservation-times", "Priority time list, hh:mm", true),
            FlagSpec::one("ps", "party-size", "Size of party", true),
            FlagSpec::one("reqD", "request-date", "Instant to fire the attempt, yyyy:mm:dd:hh:mm", true),
        ],
    },
    CommandSpec {
        name: "list",
        help: "List all operations",
        flags: &[],
    },
    CommandSpec {
        name: "status",
        help: "Show the status of one operation",
        flags: &[FlagSpec::one("i", "id", "Operation id", true)],
    },
    CommandSpec {
        name: "cancel",
        help: "Cancel operations given ids",
        flags: &[FlagSpec::many("i", "id", "Ids of operations to cancel", true)],
    },
    CommandSpec {
        name: "clean",
        help: "Clean operations given ids",
        flags: &[FlagSpec::many("i", "id", "Ids of operations to remove", true)],
    },
    CommandSpec {
        name: "login",
        help: "Set login defaults",
        flags: &[
            FlagSpec::one("e", "email", "Login email", true),
            FlagSpec::one("p", "password", "Login password", true),
        ],
    },
    CommandSpec {
        name: "logout",
        help: "Clear default login credentials",
        flags: &[],
    },
    CommandSpec {
        name: "quit",
        help: "Exits the shell",
        flags: &[],
    },
    CommandSpec {
        name: "exit",
        help: "Exits the shell",
        flags: &[],
    },
    CommandSpec {
        name: "help",
        help: "Displays helpful info about commands",
        flags: &[],
    },
];

pub struct Shell<A: ReservationApi, C: Clock> {
    registry: Registry<A, C>,
}

impl<A: ReservationApi, C: Clock> Shell<A, C> {
    pub fn new(registry: Registry<A, C>) -> Self {
        Self { registry }
    }

    /// Handle one input line
    pub async fn handle_line(&self, line: &str) -> Result<Action, ShellError> {
        let tokens = tokenize(line)?;
        let Some((name, rest)) = tokens.split_first() else {
            return Err(ParseError::UnknownCommand.into());
        };
        let spec = COMMANDS
            .iter()
            .find(|c| c.name == name.as_str())
            .ok_or(ParseError::UnknownCommand)?;
        let parsed = parse_flags(spec, rest)?;

        match spec.name {
            "search" => self.handle_search(&parsed).await,
            "rais" => self.handle_rais(&parsed),
            "rats" => self.handle_rats(&parsed),
            "list" => Ok(Action::Reply(self.registry.list_all()?)),
            "status" => self.handle_status(&parsed),
            "cancel" => self.handle_cancel(&parsed),
            "clean" => self.handle_clean(&parsed),
            "login" => self.handle_login(&parsed).await,
            "logout" => {
                self.registry.logout()?;
                Ok(Action::Reply("Successfully logged out".to_string()))
            }
            "help" => Ok(Action::Reply(render_help())),
            "quit" | "exit" => Ok(Action::Quit),
            _ => Err(ParseError::UnknownCommand.into()),
        }
    }

    async fn handle_search(&self, parsed: &Parsed) -> Result<Action, ShellError> {
        let query = SearchQuery {
            query: required(parsed, "n")?.to_string(),
            limit: parsed.one("l").map(num::<usize>).transpose()?,
        };
        let results = self.registry.search(&query).await?;
        Ok(Action::Reply(results.to_string()))
    }

    fn handle_rais(&self, parsed: &Parsed) -> Result<Action, ShellError> {
        let (h, m) = parse_hm(required(parsed, "i")?)?;
        let retry_interval = Duration::from_secs(u64::from(h) * 3600 + u64::from(m) * 60);
        let id = self.registry.schedule_interval_retry(IntervalRetryParams {
            credentials: credentials(parsed),
            attempt: attempt(parsed)?,
            retry_interval,
        })?;
        Ok(Action::Reply(format!(
            "Successfully started rais operation with ID {id}"
        )))
    }

    fn handle_rats(&self, parsed: &Parsed) -> Result<Action, ShellError> {
        let fire_at = parse_instant(required(parsed, "reqD")?)?;
        let id = self.registry.schedule_deadline_trigger(DeadlineTriggerParams {
            credentials: credentials(parsed),
            attempt: attempt(parsed)?,
            fire_at,
        })?;
        Ok(Action::Reply(format!(
            "Successfully started rats operation with ID {id}"
        )))
    }

    fn handle_status(&self, parsed: &Parsed) -> Result<Action, ShellError> {
        let id = OperationId(num(required(parsed, "i")?)?);
        let status = self.registry.status(id)?;
        Ok(Action::Reply(format!("ID: {id}\nStatus: {status}")))
    }

    /// Cancel all listed operations, or none: every id is checked before the
    /// first token is raised
    fn handle_cancel(&self, parsed: &Parsed) -> Result<Action, ShellError> {
        let ids = operation_ids(parsed)?;
        for id in &ids {
            if self.registry.status(*id)? != OperationStatus::InProgress {
                return Err(RegistryError::NotInProgress(*id).into());
            }
        }
        for id in ids {
            let _ = self.registry.cancel(id);
        }
        Ok(Action::Reply("Cancelled operations successfully".to_string()))
    }

    /// Remove all listed operations, or none
    fn handle_clean(&self, parsed: &Parsed) -> Result<Action, ShellError> {
        let ids = operation_ids(parsed)?;
        for id in &ids {
            if self.registry.status(*id)? == OperationStatus::InProgress {
                return Err(RegistryError::StillInProgress(*id).into());
            }
        }
        for id in ids {
            let _ = self.registry.clean(id);
        }
        Ok(Action::Reply("Cleaned operations successfully".to_string()))
    }

    async fn handle_login(&self, parsed: &Parsed) -> Result<Action, ShellError> {
        let creds = Credentials::new(required(parsed, "e")?, required(parsed, "p")?);
        self.registry.login(creds).await?;
        Ok(Action::Reply("Successfully logged in".to_string()))
    }
}

/// Explicit credentials when both overrides were given, the cached default
/// otherwise
fn credentials(parsed: &Parsed) -> Option<Credentials> {
    match (parsed.one("e"), parsed.one("p")) {
        (Some(email), Some(password)) => Some(Credentials::new(email, password)),
        _ => None,
    }
}

fn attempt(parsed: &Parsed) -> Result<AttemptSpec, ShellError> {
    let (year, month, day) = parse_day(required(parsed, "resD")?)?;
    let mut reservation_times = Vec::new();
    for entry in parsed.many("resT") {
        let (hour, minute) = parse_hm(entry)?;
        reservation_times.push(local_to_utc(year, month, day, hour, minute)?);
    }
    Ok(AttemptSpec {
        venue_id: num(required(parsed, "v")?)?,
        reservation_times,
        party_size: num(required(parsed, "ps")?)?,
    })
}

fn operation_ids(parsed: &Parsed) -> Result<Vec<OperationId>, ShellError> {
    parsed
        .many("i")
        .iter()
        .map(|raw| num(raw).map(OperationId))
        .collect()
}

fn required<'a>(parsed: &'a Parsed, name: &'static str) -> Result<&'a str, ShellError> {
    parsed
        .one(name)
        .ok_or(ShellError::Parse(ParseError::MissingFlag(name)))
}

fn num<T: std::str::FromStr>(raw: &str) -> Result<T, ShellError> {
    raw.parse()
        .map_err(|_| ShellError::InvalidNumber(raw.to_string()))
}

/// "yyyy:mm:dd"
fn parse_day(raw: &str) -> Result<(i32, u32, u32), ShellError> {
    match raw.split(':').collect::<Vec<_>>().as_slice() {
        [y, m, d] => Ok((num(y)?, num(m)?, num(d)?)),
        _ => Err(ShellError::InvalidDate),
    }
}

/// "hh:mm"
fn parse_hm(raw: &str) -> Result<(u32, u32), ShellError> {
    match raw.split(':').collect::<Vec<_>>().as_slice() {
        [h, m] => Ok((num(h)?, num(m)?)),
        _ => Err(ShellError::InvalidDate),
    }
}

/// "yyyy:mm:dd:hh:mm", entered in local time
fn parse_instant(raw: &str) -> Result<DateTime<Utc>, ShellError> {
    match raw.split(':').collect::<Vec<_>>().as_slice() {
        [y, mo, d, h, mi] => local_to_utc(num(y)?, num(mo)?, num(d)?, num(h)?, num(mi)?),
        _ => Err(ShellError::InvalidDate),
    }
}

fn local_to_utc(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> Result<DateTime<Utc>, ShellError> {
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .map(|t| t.with_timezone(&Utc))
        .ok_or(ShellError::InvalidDate)
}

fn render_help() -> String {
    let mut out = String::from("Commands:\n");
    for cmd in COMMANDS {
        out.push_str(&format!("\t{}", cmd.name));
        for flag in cmd.flags {
            out.push_str(&format!(" [-{}|--{}]", flag.name, flag.long));
        }
        out.push_str(&format!(": {}\n", cmd.help));
        for flag in cmd.flags {
            out.push_str(&format!("\t\t[-{}|--{}]: {}\n", flag.name, flag.long, flag.help));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use resv_api::FakeApi;
    use resv_core::SystemClock;

    fn shell() -> (FakeApi, Shell<FakeApi, SystemClock>) {
        let api = FakeApi::new();
        (api.clone(), Shell::new(Registry::new(api, SystemClock)))
    }

    fn reply(action: Action) -> String {
        match action {
            Action::Reply(text) => text,
            Action::Quit => panic!("expected a reply"),
        }
    }

    #[tokio::test]
    async fn unknown_command_is_an_error() {
        let (_api, shell) = shell();
        let err = shell.handle_line("frobnicate").await.unwrap_err();
        assert!(matches!(err, ShellError::Parse(ParseError::UnknownCommand)));
    }

    #[tokio::test]
    async fn quit_and_exit_end_the_shell() {
        let (_api, shell) = shell();
        assert_eq!(shell.handle_line("quit").await.unwrap(), Action::Quit);
        assert_eq!(shell.handle_line("exit").await.unwrap(), Action::Quit);
    }

    #[tokio::test]
    async fn help_lists_every_command() {
        let (_api, shell) = shell();
        let text = reply(shell.handle_line("help").await.unwrap());
        for name in ["search", "rais", "rats", "list", "cancel", "clean", "login"] {
            assert!(text.contains(name), "help is missing {name}");
        }
    }

    #[tokio::test]
    async fn login_then_schedule_without_credentials() {
        let (_api, shell) = shell();
        let text = reply(
            shell
                .handle_line("login -e diner@example.com -p hunter2")
                .await
                .unwrap(),
        );
        assert_eq!(text, "Successfully logged in");

        let text = reply(
            shell
                .handle_line("rais -v 42 -resD 2030:09:12 -resT 19:00 18:30 -ps 2 -i 00:01")
                .await
                .unwrap(),
        );
        assert_eq!(text, "Successfully started rais operation with ID 1");
    }

    #[tokio::test]
    async fn rats_schedules_with_explicit_credentials() {
        let (_api, shell) = shell();
        let text = reply(
            shell
                .handle_line(
                    "rats -e diner@example.com -p hunter2 -v 42 -resD 2030:09:12 \
                     -resT 19:00 -ps 2 -reqD 2030:09:05:09:00",
                )
                .await
                .unwrap(),
        );
        assert_eq!(text, "Successfully started rats operation with ID 1");

        let listing = reply(shell.handle_line("list").await.unwrap());
        assert!(listing.contains("ID: 1"));
    }

    #[tokio::test]
    async fn schedule_without_any_credentials_is_rejected() {
        let (_api, shell) = shell();
        let err = shell
            .handle_line("rais -v 42 -resD 2030:09:12 -resT 19:00 -ps 2 -i 00:01")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShellError::Registry(RegistryError::NoCredentials)
        ));
    }

    #[tokio::test]
    async fn cancel_is_all_or_nothing() {
        let (api, shell) = shell();
        api.reject_first_reserves(u32::MAX);
        reply(
            shell
                .handle_line("login -e diner@example.com -p hunter2")
                .await
                .unwrap(),
        );
        reply(
            shell
                .handle_line("rais -v 42 -resD 2030:09:12 -resT 19:00 -ps 2 -i 10:00")
                .await
                .unwrap(),
        );

        // Unknown id 9 rejects the whole batch, leaving op 1 untouched
        assert!(shell.handle_line("cancel -i 1 9").await.is_err());
        let status = reply(shell.handle_line("status -i 1").await.unwrap());
        assert!(status.contains("In Progress"));

        let text = reply(shell.handle_line("cancel -i 1").await.unwrap());
        assert_eq!(text, "Cancelled operations successfully");
        let status = reply(shell.handle_line("status -i 1").await.unwrap());
        assert!(status.contains("Cancelled"));
    }

    #[tokio::test]
    async fn clean_removes_cancelled_operations() {
        let (api, shell) = shell();
        api.reject_first_reserves(u32::MAX);
        reply(
            shell
                .handle_line("login -e diner@example.com -p hunter2")
                .await
                .unwrap(),
        );
        reply(
            shell
                .handle_line("rais -v 42 -resD 2030:09:12 -resT 19:00 -ps 2 -i 10:00")
                .await
                .unwrap(),
        );

        assert!(shell.handle_line("clean -i 1").await.is_err());

        reply(shell.handle_line("cancel -i 1").await.unwrap());
        let text = reply(shell.handle_line("clean -i 1").await.unwrap());
        assert_eq!(text, "Cleaned operations successfully");
        assert!(shell.handle_line("status -i 1").await.is_err());
    }

    #[tokio::test]
    async fn search_renders_hits() {
        let (api, shell) = shell();
        api.add_hit(resv_api::SearchHit {
            venue_id: 7,
            name: "Lilia".to_string(),
            region: "NY".to_string(),
            locality: "New York".to_string(),
            neighborhood: "Williamsburg".to_string(),
        });

        let text = reply(shell.handle_line("search -n [li lia]").await.unwrap());
        assert!(text.contains("Name: Lilia"));
        assert_eq!(
            api.calls(),
            vec![resv_api::ApiCall::Search {
                query: "li lia".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn malformed_dates_are_rejected() {
        let (_api, shell) = shell();
        reply(
            shell
                .handle_line("login -e diner@example.com -p hunter2")
                .await
                .unwrap(),
        );
        let err = shell
            .handle_line("rais -v 42 -resD 2030-09-12 -resT 19:00 -ps 2 -i 00:01")
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::InvalidDate));
    }
}
