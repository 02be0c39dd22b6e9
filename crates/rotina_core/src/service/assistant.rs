//! Conversation controller: per-message state machine and dispatch.
//!
//! # Responsibility
//! - Look up or create the user for each inbound message.
//! - Enforce the opt-in gate before any task feature runs.
//! - Dispatch classified intents to the task store and compose the single
//!   outbound reply, including the opportunistic same-day digest.
//!
//! # Invariants
//! - A user with `opted_in = false` never reaches a task-mutating path;
//!   the only mutation allowed through the gate is the opt-in flip itself.
//! - Exactly one outbound text per inbound message; the digest is appended
//!   to it, never sent separately, and is suppressed for `list_reminders`.
//! - Storage failures propagate to the caller; they are never converted
//!   into a "success" reply.

use crate::model::task::TaskStatus;
use crate::model::user::User;
use crate::nlp::intent::{classify, DateFilter, Intent, IntentKind};
use crate::repo::task_repo::TaskRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::service::replies;
use chrono::{Days, NaiveDate, NaiveDateTime};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Outcome envelope handed to the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundResponse {
    /// First contact: user was created and asked for consent.
    PromptedOptIn { text: String },
    /// Message handled while the consent gate was closed.
    OptInProcessed { text: String },
    /// Message handled in the active state.
    Processed { intent: IntentKind, text: String },
    /// Nothing usable in the inbound payload; no state was touched.
    Ignored { reason: String },
}

impl OutboundResponse {
    /// The reply text to deliver, if this outcome produces one.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::PromptedOptIn { text }
            | Self::OptInProcessed { text }
            | Self::Processed { text, .. } => Some(text),
            Self::Ignored { .. } => None,
        }
    }
}

/// Failure while handling one inbound message.
#[derive(Debug)]
pub enum AssistantError {
    Repo(RepoError),
}

impl Display for AssistantError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AssistantError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for AssistantError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Conversation controller over pluggable user/task repositories.
pub struct Assistant<U: UserRepository, T: TaskRepository> {
    users: U,
    tasks: T,
}

impl<U: UserRepository, T: TaskRepository> Assistant<U, T> {
    pub fn new(users: U, tasks: T) -> Self {
        Self { users, tasks }
    }

    /// Handles one inbound message and returns the outbound outcome.
    ///
    /// `now` anchors relative dates and the digest window; passing it in
    /// keeps the controller deterministic for tests.
    pub fn handle_message(
        &self,
        channel_id: &str,
        contact: &str,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<OutboundResponse, AssistantError> {
        if text.trim().is_empty() {
            return Ok(OutboundResponse::Ignored {
                reason: "empty or non-text message".to_string(),
            });
        }

        let user = match self.users.find_by_channel_id(channel_id)? {
            Some(user) => user,
            None => {
                // First contact: create the user and stop before any
                // classification; only consent matters now.
                self.users.create(channel_id, contact)?;
                info!("event=user_created module=assistant status=ok channel_id={channel_id}");
                return Ok(OutboundResponse::PromptedOptIn {
                    text: replies::consent_prompt(),
                });
            }
        };

        let intent = classify(text, now);
        info!(
            "event=message_classified module=assistant status=ok channel_id={channel_id} intent={:?}",
            intent.kind()
        );

        if !user.opted_in {
            return Ok(self.handle_gated(&user, intent)?);
        }

        // Snapshot the digest before dispatch so a task created by this very
        // message does not echo straight back as a reminder.
        let digest = self.today_digest(&user, now)?;

        let kind = intent.kind();
        let mut reply = self.dispatch(&user, intent, now)?;
        if kind != IntentKind::ListReminders {
            if let Some(digest_text) = digest {
                reply.push_str(&digest_text);
            }
        }

        Ok(OutboundResponse::Processed {
            intent: kind,
            text: reply,
        })
    }

    /// Consent gate: only the opt-in intents have any effect here.
    fn handle_gated(&self, user: &User, intent: Intent) -> Result<OutboundResponse, AssistantError> {
        let text = match intent {
            Intent::OptInYes => {
                self.users.set_opted_in(&user.channel_id, true)?;
                info!(
                    "event=opt_in module=assistant status=ok channel_id={} accepted=true",
                    user.channel_id
                );
                replies::opt_in_confirmed()
            }
            Intent::OptInNo => {
                self.users.set_opted_in(&user.channel_id, false)?;
                info!(
                    "event=opt_in module=assistant status=ok channel_id={} accepted=false",
                    user.channel_id
                );
                replies::opt_in_declined()
            }
            _ => replies::opt_in_reprompt(),
        };

        Ok(OutboundResponse::OptInProcessed { text })
    }

    fn dispatch(
        &self,
        user: &User,
        intent: Intent,
        now: NaiveDateTime,
    ) -> Result<String, AssistantError> {
        let reply = match intent {
            Intent::AddTask { description, due } => {
                let task = self
                    .tasks
                    .create(user.id, &description, Some(due.due_at), None)?;
                replies::task_added(&task)
            }
            Intent::ClarifyAddTask => replies::clarify_add_task(),
            Intent::ListTasks { filter } => {
                let tasks = self.tasks.list_by_status(user.id, TaskStatus::Pending)?;
                replies::pending_task_list(&tasks, filter)
            }
            Intent::ListReminders { filter } => {
                let date = reminder_date(filter, now);
                let tasks = self.tasks.list_due_on(user.id, date)?;
                replies::reminder_list(&tasks, filter)
            }
            Intent::CompleteTask { task_id } => {
                match self
                    .tasks
                    .set_status(user.id, task_id, TaskStatus::Completed)?
                {
                    Some(_) => replies::task_completed(task_id),
                    None => replies::task_not_found(task_id),
                }
            }
            Intent::Help => replies::help_text(),
            Intent::Unknown { .. } => replies::unknown_fallback(),
            // Consent keywords after the gate is already open.
            Intent::OptInYes | Intent::OptInNo => replies::fallback_generic(),
        };

        Ok(reply)
    }

    fn today_digest(
        &self,
        user: &User,
        now: NaiveDateTime,
    ) -> Result<Option<String>, AssistantError> {
        let due_today = self.tasks.list_due_on(user.id, now.date())?;
        Ok(replies::digest(&due_today))
    }
}

/// Maps a listing filter to the reminder day; open-ended filters are not
/// meaningful for reminders and resolve to today.
fn reminder_date(filter: DateFilter, now: NaiveDateTime) -> NaiveDate {
    let today = now.date();
    match filter {
        DateFilter::Tomorrow => today.checked_add_days(Days::new(1)).unwrap_or(today),
        DateFilter::Today | DateFilter::All => today,
    }
}
