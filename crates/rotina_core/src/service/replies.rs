//! Outbound reply text composition (pt-BR).
//!
//! # Responsibility
//! - Keep every user-visible string in one place, away from control flow.
//!
//! # Invariants
//! - Due timestamps render as `dd/mm/yyyy HH:MM`; digest lines show `HH:MM`.

use crate::model::task::Task;
use crate::nlp::intent::DateFilter;

pub fn consent_prompt() -> String {
    "Olá! Sou sua assistente de rotina pessoal. \
     Posso te ajudar a organizar suas tarefas e mais. \
     Você concorda em receber minhas mensagens e utilizar meus serviços? \
     Responda 'Sim' para continuar ou 'Não' para cancelar."
        .to_string()
}

pub fn opt_in_confirmed() -> String {
    "Ótimo! Sua inscrição foi confirmada. Como posso te ajudar hoje? \
     Digite 'ajuda' para ver os comandos."
        .to_string()
}

pub fn opt_in_declined() -> String {
    "Entendido. Se mudar de ideia, é só me chamar e dizer 'Sim'.".to_string()
}

pub fn opt_in_reprompt() -> String {
    "Por favor, responda 'Sim' para confirmar o uso do serviço ou 'Não' para cancelar."
        .to_string()
}

pub fn task_added(task: &Task) -> String {
    let mut text = format!("Tarefa '{}' adicionada!", task.description);
    if let Some(due_at) = task.due_at {
        text.push_str(&format!(" para {}.", due_at.format("%d/%m/%Y %H:%M")));
    }
    text
}

pub fn clarify_add_task() -> String {
    "Para adicionar uma tarefa, me diga a descrição. \
     Ex: Lembrar de comprar pão amanhã às 8h"
        .to_string()
}

pub fn pending_task_list(tasks: &[Task], filter: DateFilter) -> String {
    if tasks.is_empty() {
        return format!("Você não tem tarefas pendentes ({}).", filter.label());
    }

    let mut text = format!("Suas tarefas pendentes ({}):\n", filter.label());
    for task in tasks {
        text.push_str(&format!("{}. {}", task.id, task.description));
        match task.due_at {
            Some(due_at) => {
                text.push_str(&format!(" (Prazo: {})\n", due_at.format("%d/%m/%Y %H:%M")));
            }
            None => text.push('\n'),
        }
    }
    text
}

pub fn reminder_list(tasks: &[Task], filter: DateFilter) -> String {
    if tasks.is_empty() {
        return format!(
            "Você não tem lembretes agendados para {}.",
            filter.label()
        );
    }

    let mut text = format!("Seus lembretes para {}:\n", filter.label());
    for task in tasks {
        text.push_str(&format!("{}. {}", task.id, task.description));
        match task.due_at {
            Some(due_at) => {
                text.push_str(&format!(" (Prazo: {})\n", due_at.format("%d/%m/%Y %H:%M")));
            }
            None => text.push('\n'),
        }
    }
    text
}

pub fn task_completed(task_id: i64) -> String {
    format!("Tarefa {task_id} marcada como concluída!")
}

pub fn task_not_found(task_id: i64) -> String {
    format!("Não encontrei a tarefa {task_id} ou ela não é sua.")
}

pub fn help_text() -> String {
    "Comandos disponíveis:\n\
     - Adicionar tarefa: 'Lembrar de [descrição] para [data] às [hora]'\n\
     - Listar tarefas: 'Minhas tarefas de hoje'\n\
     - Listar lembretes: 'Meus lembretes de hoje' ou 'Lembretes para amanhã'\n\
     - Concluir tarefa: 'Concluir tarefa [número da tarefa]'\n\
     - Ajuda: 'ajuda'"
        .to_string()
}

pub fn unknown_fallback() -> String {
    "Não entendi. Tente 'ajuda' para ver o que posso fazer.".to_string()
}

/// Generic apology for intents that make no sense in the active state
/// (e.g. a second "Sim" after consent was already given).
pub fn fallback_generic() -> String {
    "Desculpe, não entendi o que você quis dizer. Pode tentar de outra forma?".to_string()
}

/// One-line-per-task same-day summary appended to active-state replies.
///
/// Returns `None` when there is nothing due, so callers can skip the
/// append entirely.
pub fn digest(tasks: &[Task]) -> Option<String> {
    if tasks.is_empty() {
        return None;
    }

    let mut text = "\n\nLembrete Rápido! Você tem as seguintes tarefas para hoje:\n".to_string();
    for task in tasks {
        text.push_str(&format!("- {}", task.description));
        match task.due_at {
            Some(due_at) => text.push_str(&format!(" (Prazo: {})\n", due_at.format("%H:%M"))),
            None => text.push('\n'),
        }
    }
    Some(text)
}
