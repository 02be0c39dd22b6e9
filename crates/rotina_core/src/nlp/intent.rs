//! Rule-based intent classification and entity extraction.
//!
//! # Responsibility
//! - Map raw Portuguese text to exactly one [`Intent`].
//! - Extract the entities each intent needs (description, date/time tokens,
//!   task id), delegating temporal tokens to [`crate::nlp::datetime`].
//!
//! # Invariants
//! - [`RULES`] is evaluated top to bottom and the first match wins. The
//!   order is load-bearing: the generic "tarefa" keyword of the creation
//!   rule must be tried after the listing phrases, or "minhas tarefas de
//!   hoje" would be misread as a creation request.
//! - `classify` is total: no input ever fails, the worst case is
//!   [`Intent::Unknown`].

use crate::nlp::datetime::{resolve, DueResolution};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Day filter attached to listing intents.
///
/// `All` is the explicit "no date given" value; it is distinct from `Today`
/// so task listing can stay unfiltered while reminder listing defaults to
/// the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    All,
    Today,
    Tomorrow,
}

impl DateFilter {
    /// Human label used when composing list replies.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "todas",
            Self::Today => "hoje",
            Self::Tomorrow => "amanhã",
        }
    }

    fn from_token(token: Option<&str>) -> Self {
        match token.map(|value| value.to_lowercase()).as_deref() {
            Some("hoje") => Self::Today,
            Some("amanhã") => Self::Tomorrow,
            _ => Self::All,
        }
    }
}

/// Closed set of message interpretations, with their extracted entities.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    AddTask {
        description: String,
        due: DueResolution,
    },
    /// A creation phrase matched but carried no description.
    ClarifyAddTask,
    ListTasks {
        filter: DateFilter,
    },
    ListReminders {
        filter: DateFilter,
    },
    CompleteTask {
        task_id: i64,
    },
    OptInYes,
    OptInNo,
    Help,
    Unknown {
        original_message: String,
    },
}

/// Bare intent tag, used on response envelopes and for dispatch checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    AddTask,
    ClarifyAddTask,
    ListTasks,
    ListReminders,
    CompleteTask,
    OptInYes,
    OptInNo,
    Help,
    Unknown,
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Self::AddTask { .. } => IntentKind::AddTask,
            Self::ClarifyAddTask => IntentKind::ClarifyAddTask,
            Self::ListTasks { .. } => IntentKind::ListTasks,
            Self::ListReminders { .. } => IntentKind::ListReminders,
            Self::CompleteTask { .. } => IntentKind::CompleteTask,
            Self::OptInYes => IntentKind::OptInYes,
            Self::OptInNo => IntentKind::OptInNo,
            Self::Help => IntentKind::Help,
            Self::Unknown { .. } => IntentKind::Unknown,
        }
    }
}

struct Rule {
    name: &'static str,
    pattern: Regex,
    extract: fn(&Captures<'_>, NaiveDateTime) -> Option<Intent>,
}

impl Rule {
    fn new(
        name: &'static str,
        pattern: &str,
        extract: fn(&Captures<'_>, NaiveDateTime) -> Option<Intent>,
    ) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("intent rule pattern is valid"),
            extract,
        }
    }
}

/// Ordered rule table; first match wins.
///
/// Listing and completion phrases come before creation because the creation
/// rule's "tarefa"/"lembrete" keywords are substrings of theirs. An
/// extractor may return `None` (e.g. a task id too large for `i64`), in
/// which case evaluation falls through to the remaining rules.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(
            "list_tasks",
            r"(?i)(quais minhas tarefas|minhas tarefas|listar tarefas|ver tarefas)(?:\s+(?:de|para)\s+(?P<date>hoje|amanhã))?",
            extract_list_tasks,
        ),
        Rule::new(
            "list_reminders",
            r"(?i)(quais meus lembretes|meus lembretes|ver lembretes|lembretes de hoje|consultar lembretes)(?:\s+(?:de|para)\s+(?P<date>hoje|amanhã))?",
            extract_list_reminders,
        ),
        Rule::new(
            "complete_task",
            r"(?i)(marcar tarefa|concluir tarefa|tarefa concluída|finalizar tarefa)[:\s]*(?P<task_id>\d+)(?:\s+como concluída)?",
            extract_complete_task,
        ),
        Rule::new(
            "add_task",
            r"(?i)(lembrar de|adicionar tarefa|anotar|lembrete|tarefa)[:\s]*(?P<description>.+?)(?:\s+(?:(?:para|em|no dia)\s+)?(?P<date>amanhã|hoje|\d{1,2}[-/]\d{1,2}(?:[-/]\d{2,4})?))?(?:\s+(?:(?:às|as|@)\s+)?(?P<time>\d{1,2}(?:[:hH]\d{2})?[hH]?))?$",
            extract_add_task,
        ),
        Rule::new("opt_in_yes", r"(?i)\b(sim|s|aceito|concordo)\b", |_, _| {
            Some(Intent::OptInYes)
        }),
        Rule::new("opt_in_no", r"(?i)\b(não|nao|n|recuso|negar)\b", |_, _| {
            Some(Intent::OptInNo)
        }),
        Rule::new("help", r"(?i)\b(ajuda|comandos|o que você faz\??)\b", |_, _| {
            Some(Intent::Help)
        }),
    ]
});

/// Classifies one message into exactly one intent.
///
/// `now` anchors relative date resolution for creation phrases so the
/// classifier stays a pure function of its inputs.
pub fn classify(text: &str, now: NaiveDateTime) -> Intent {
    for rule in RULES.iter() {
        if let Some(caps) = rule.pattern.captures(text) {
            if let Some(intent) = (rule.extract)(&caps, now) {
                return intent;
            }
        }
    }

    Intent::Unknown {
        original_message: text.to_string(),
    }
}

/// Rule names in evaluation order; the precedence contract tests assert on
/// this instead of re-stating the table.
pub fn rule_order() -> Vec<&'static str> {
    RULES.iter().map(|rule| rule.name).collect()
}

fn extract_list_tasks(caps: &Captures<'_>, _now: NaiveDateTime) -> Option<Intent> {
    Some(Intent::ListTasks {
        filter: DateFilter::from_token(caps.name("date").map(|m| m.as_str())),
    })
}

fn extract_list_reminders(caps: &Captures<'_>, _now: NaiveDateTime) -> Option<Intent> {
    Some(Intent::ListReminders {
        filter: DateFilter::from_token(caps.name("date").map(|m| m.as_str())),
    })
}

fn extract_complete_task(caps: &Captures<'_>, _now: NaiveDateTime) -> Option<Intent> {
    // A non-i64 id (overflow) makes this rule a non-match instead of an
    // error; later rules get their chance.
    let task_id = caps.name("task_id")?.as_str().parse::<i64>().ok()?;
    Some(Intent::CompleteTask { task_id })
}

fn extract_add_task(caps: &Captures<'_>, now: NaiveDateTime) -> Option<Intent> {
    let description = caps
        .name("description")
        .map(|m| m.as_str().trim())
        .unwrap_or_default();
    if description.is_empty() {
        return Some(Intent::ClarifyAddTask);
    }

    let due = resolve(
        caps.name("date").map(|m| m.as_str()),
        caps.name("time").map(|m| m.as_str()),
        now,
    );
    Some(Intent::AddTask {
        description: description.to_string(),
        due,
    })
}
