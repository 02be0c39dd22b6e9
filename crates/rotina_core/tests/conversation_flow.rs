use chrono::{NaiveDate, NaiveDateTime};
use rotina_core::db::open_db_in_memory;
use rotina_core::{
    Assistant, IntentKind, OutboundResponse, SqliteTaskRepository, SqliteUserRepository,
    TaskRepository, TaskStatus, UserRepository,
};
use rusqlite::Connection;

const ALICE: &str = "5511911111111";
const BOB: &str = "5511922222222";

fn assistant(conn: &Connection) -> Assistant<SqliteUserRepository<'_>, SqliteTaskRepository<'_>> {
    Assistant::new(
        SqliteUserRepository::new(conn),
        SqliteTaskRepository::new(conn),
    )
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 10)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

/// Runs the opt-in handshake so later messages hit the active state.
fn activate(assistant: &Assistant<SqliteUserRepository<'_>, SqliteTaskRepository<'_>>, id: &str) {
    assistant.handle_message(id, id, "Olá", now()).unwrap();
    assistant.handle_message(id, id, "Sim", now()).unwrap();
}

#[test]
fn first_contact_prompts_for_consent_without_classification() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);

    // Even a feature phrase is not interpreted on first contact.
    let response = assistant
        .handle_message(ALICE, ALICE, "Lembrar de comprar pão amanhã", now())
        .unwrap();

    match response {
        OutboundResponse::PromptedOptIn { text } => {
            assert!(text.contains("Responda 'Sim'"));
        }
        other => panic!("expected PromptedOptIn, got {other:?}"),
    }

    let user = SqliteUserRepository::new(&conn)
        .find_by_channel_id(ALICE)
        .unwrap()
        .unwrap();
    assert!(!user.opted_in);
    let tasks = SqliteTaskRepository::new(&conn)
        .list_by_status(user.id, TaskStatus::Pending)
        .unwrap();
    assert!(tasks.is_empty());
}

#[test]
fn opt_in_yes_activates_the_user() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);

    assistant.handle_message(ALICE, ALICE, "Olá", now()).unwrap();
    let response = assistant.handle_message(ALICE, ALICE, "Sim", now()).unwrap();

    match response {
        OutboundResponse::OptInProcessed { text } => {
            assert!(text.contains("inscrição foi confirmada"));
        }
        other => panic!("expected OptInProcessed, got {other:?}"),
    }

    let user = SqliteUserRepository::new(&conn)
        .find_by_channel_id(ALICE)
        .unwrap()
        .unwrap();
    assert!(user.opted_in);
}

#[test]
fn opt_in_no_keeps_the_gate_closed() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);

    assistant.handle_message(ALICE, ALICE, "Olá", now()).unwrap();
    let response = assistant
        .handle_message(ALICE, ALICE, "Não quero", now())
        .unwrap();

    match response {
        OutboundResponse::OptInProcessed { text } => {
            assert!(text.contains("Se mudar de ideia"));
        }
        other => panic!("expected OptInProcessed, got {other:?}"),
    }

    let user = SqliteUserRepository::new(&conn)
        .find_by_channel_id(ALICE)
        .unwrap()
        .unwrap();
    assert!(!user.opted_in);
}

#[test]
fn gated_user_cannot_reach_the_task_store() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);

    assistant.handle_message(ALICE, ALICE, "Olá", now()).unwrap();

    for message in [
        "Lembrar de comprar pão amanhã às 8h",
        "minhas tarefas de hoje",
        "concluir tarefa 1",
        "ajuda",
    ] {
        let response = assistant.handle_message(ALICE, ALICE, message, now()).unwrap();
        match response {
            OutboundResponse::OptInProcessed { text } => {
                assert!(text.contains("responda 'Sim'"), "expected re-prompt for {message:?}");
            }
            other => panic!("expected OptInProcessed for {message:?}, got {other:?}"),
        }
    }

    let user = SqliteUserRepository::new(&conn)
        .find_by_channel_id(ALICE)
        .unwrap()
        .unwrap();
    let tasks = SqliteTaskRepository::new(&conn)
        .list_by_status(user.id, TaskStatus::Pending)
        .unwrap();
    assert!(tasks.is_empty(), "gate must block all task mutations");
}

#[test]
fn add_task_strips_tokens_and_stores_the_resolved_due_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);
    activate(&assistant, ALICE);

    let response = assistant
        .handle_message(ALICE, ALICE, "Lembrar de comprar leite amanhã às 10h", now())
        .unwrap();

    match &response {
        OutboundResponse::Processed { intent, text } => {
            assert_eq!(*intent, IntentKind::AddTask);
            assert!(text.contains("Tarefa 'comprar leite' adicionada!"));
            assert!(text.contains("11/03/2025 10:00"));
        }
        other => panic!("expected Processed, got {other:?}"),
    }

    let user = SqliteUserRepository::new(&conn)
        .find_by_channel_id(ALICE)
        .unwrap()
        .unwrap();
    let tasks = SqliteTaskRepository::new(&conn)
        .list_by_status(user.id, TaskStatus::Pending)
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].description, "comprar leite");
    assert_eq!(
        tasks[0].due_at,
        Some(
            NaiveDate::from_ymd_opt(2025, 3, 11)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        )
    );
}

#[test]
fn creation_phrase_without_description_asks_for_it() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);
    activate(&assistant, ALICE);

    let response = assistant.handle_message(ALICE, ALICE, "tarefa: ", now()).unwrap();
    match response {
        OutboundResponse::Processed { intent, text } => {
            assert_eq!(intent, IntentKind::ClarifyAddTask);
            assert!(text.contains("me diga a descrição"));
        }
        other => panic!("expected Processed, got {other:?}"),
    }
}

#[test]
fn list_tasks_shows_ids_and_due_dates() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);
    activate(&assistant, ALICE);

    assistant
        .handle_message(ALICE, ALICE, "Lembrar de pagar boleto para 20/12 às 14:30", now())
        .unwrap();
    let response = assistant
        .handle_message(ALICE, ALICE, "listar tarefas", now())
        .unwrap();

    match response {
        OutboundResponse::Processed { intent, text } => {
            assert_eq!(intent, IntentKind::ListTasks);
            assert!(text.contains("Suas tarefas pendentes (todas):"));
            assert!(text.contains("pagar boleto"));
            assert!(text.contains("(Prazo: 20/12/2025 14:30)"));
        }
        other => panic!("expected Processed, got {other:?}"),
    }
}

#[test]
fn complete_task_marks_it_done_and_unknown_ids_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);
    activate(&assistant, ALICE);

    assistant
        .handle_message(ALICE, ALICE, "Lembrar de lavar o carro", now())
        .unwrap();
    let user = SqliteUserRepository::new(&conn)
        .find_by_channel_id(ALICE)
        .unwrap()
        .unwrap();
    let task_id = SqliteTaskRepository::new(&conn)
        .list_by_status(user.id, TaskStatus::Pending)
        .unwrap()[0]
        .id;

    let done = assistant
        .handle_message(ALICE, ALICE, &format!("concluir tarefa {task_id}"), now())
        .unwrap();
    match done {
        OutboundResponse::Processed { intent, text } => {
            assert_eq!(intent, IntentKind::CompleteTask);
            assert!(text.contains(&format!("Tarefa {task_id} marcada como concluída!")));
        }
        other => panic!("expected Processed, got {other:?}"),
    }
    let reloaded = SqliteTaskRepository::new(&conn)
        .get(user.id, task_id)
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, TaskStatus::Completed);

    let missing = assistant
        .handle_message(ALICE, ALICE, "concluir tarefa 9999", now())
        .unwrap();
    match missing {
        OutboundResponse::Processed { text, .. } => {
            assert!(text.contains("Não encontrei a tarefa 9999"));
        }
        other => panic!("expected Processed, got {other:?}"),
    }
}

#[test]
fn completing_a_foreign_task_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);
    activate(&assistant, ALICE);
    activate(&assistant, BOB);

    assistant
        .handle_message(ALICE, ALICE, "Lembrar de segredo da alice", now())
        .unwrap();
    let alice = SqliteUserRepository::new(&conn)
        .find_by_channel_id(ALICE)
        .unwrap()
        .unwrap();
    let task_id = SqliteTaskRepository::new(&conn)
        .list_by_status(alice.id, TaskStatus::Pending)
        .unwrap()[0]
        .id;

    let response = assistant
        .handle_message(BOB, BOB, &format!("concluir tarefa {task_id}"), now())
        .unwrap();
    match response {
        OutboundResponse::Processed { text, .. } => {
            assert!(text.contains(&format!("Não encontrei a tarefa {task_id}")));
        }
        other => panic!("expected Processed, got {other:?}"),
    }

    let untouched = SqliteTaskRepository::new(&conn)
        .get(alice.id, task_id)
        .unwrap()
        .unwrap();
    assert_eq!(untouched.status, TaskStatus::Pending);
}

#[test]
fn unknown_message_carries_the_digest_but_list_reminders_does_not() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);
    activate(&assistant, ALICE);

    assistant
        .handle_message(ALICE, ALICE, "Lembrar de pagar boleto hoje às 9h", now())
        .unwrap();

    let unknown = assistant
        .handle_message(ALICE, ALICE, "Qual o tempo para amanhã?", now())
        .unwrap();
    match &unknown {
        OutboundResponse::Processed { intent, text } => {
            assert_eq!(*intent, IntentKind::Unknown);
            assert!(text.contains("Não entendi."));
            assert!(text.contains("Lembrete Rápido!"));
            assert!(text.contains("- pagar boleto (Prazo: 09:00)"));
        }
        other => panic!("expected Processed, got {other:?}"),
    }

    let reminders = assistant
        .handle_message(ALICE, ALICE, "Meus lembretes de hoje", now())
        .unwrap();
    match &reminders {
        OutboundResponse::Processed { intent, text } => {
            assert_eq!(*intent, IntentKind::ListReminders);
            assert!(text.contains("Seus lembretes para hoje:"));
            assert!(text.contains("pagar boleto"));
            assert!(
                !text.contains("Lembrete Rápido!"),
                "digest must be suppressed for list_reminders"
            );
        }
        other => panic!("expected Processed, got {other:?}"),
    }
}

#[test]
fn digest_snapshot_excludes_the_task_created_by_this_message() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);
    activate(&assistant, ALICE);

    let response = assistant
        .handle_message(ALICE, ALICE, "Lembrar de pagar boleto hoje às 9h", now())
        .unwrap();
    match response {
        OutboundResponse::Processed { text, .. } => {
            assert!(
                !text.contains("Lembrete Rápido!"),
                "the just-created task must not echo back as a reminder"
            );
        }
        other => panic!("expected Processed, got {other:?}"),
    }
}

#[test]
fn reminders_for_tomorrow_use_the_next_day_window() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);
    activate(&assistant, ALICE);

    assistant
        .handle_message(ALICE, ALICE, "Lembrar de call com o time amanhã às 15h", now())
        .unwrap();

    let tomorrow = assistant
        .handle_message(ALICE, ALICE, "ver lembretes para amanhã", now())
        .unwrap();
    match &tomorrow {
        OutboundResponse::Processed { text, .. } => {
            assert!(text.contains("Seus lembretes para amanhã:"));
            assert!(text.contains("call com o time"));
        }
        other => panic!("expected Processed, got {other:?}"),
    }

    let today = assistant
        .handle_message(ALICE, ALICE, "Meus lembretes de hoje", now())
        .unwrap();
    match &today {
        OutboundResponse::Processed { text, .. } => {
            assert!(text.contains("Você não tem lembretes agendados para hoje."));
        }
        other => panic!("expected Processed, got {other:?}"),
    }
}

#[test]
fn blank_text_is_ignored_and_creates_no_user() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);

    let response = assistant.handle_message(ALICE, ALICE, "   ", now()).unwrap();
    assert!(matches!(response, OutboundResponse::Ignored { .. }));

    let user = SqliteUserRepository::new(&conn)
        .find_by_channel_id(ALICE)
        .unwrap();
    assert!(user.is_none(), "ignored payloads must not touch state");
}

#[test]
fn active_state_consent_keywords_get_the_generic_apology() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);
    activate(&assistant, ALICE);

    let response = assistant.handle_message(ALICE, ALICE, "Sim", now()).unwrap();
    match response {
        OutboundResponse::Processed { intent, text } => {
            assert_eq!(intent, IntentKind::OptInYes);
            assert!(text.contains("Desculpe, não entendi"));
        }
        other => panic!("expected Processed, got {other:?}"),
    }
}

#[test]
fn outbound_response_serializes_with_kind_tag() {
    let conn = open_db_in_memory().unwrap();
    let assistant = assistant(&conn);
    activate(&assistant, ALICE);

    let response = assistant.handle_message(ALICE, ALICE, "ajuda", now()).unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["kind"], "processed");
    assert_eq!(json["intent"], "help");
    assert!(json["text"]
        .as_str()
        .unwrap()
        .contains("Comandos disponíveis"));
}
