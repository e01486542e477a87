//! Interactive client loop.

use std::thread;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;
use uketsuke_shared::time::now_millis;

use crate::{
    config::ClientConfig,
    error::ClientError,
    persistence::{ConversationPersistence, InMemoryPersistence, JsonFilePersistence},
    relay::RelayLink,
    scheduler::{CleanupSchedule, CleanupScheduler},
    session::{Action, Command, Profile, Session},
    store::ConversationStore,
};

pub async fn run(config: ClientConfig) -> Result<(), ClientError> {
    let user_id = config.user_id();
    let name = config.name.clone().unwrap_or_else(|| user_id.clone());
    let mut session = Session::new(Profile::new(user_id, name, config.role)?);

    let persistence: Box<dyn ConversationPersistence> = if config.ephemeral {
        Box::new(InMemoryPersistence::new())
    } else {
        Box::new(JsonFilePersistence::new(&config.store))
    };
    let mut store = ConversationStore::open(persistence);

    let (_scheduler, mut cleanup) =
        CleanupScheduler::spawn(CleanupSchedule::anchored_at_local_midnight());

    let (link, mut inbound) = RelayLink::connect(&config.url).await?;
    link.send(session.profile().registration())?;

    let profile = session.profile();
    println!(
        "connected as {} ({}, {}). Type /help for commands.",
        profile.name, profile.id, profile.role
    );
    let mut lines = spawn_prompt(format!("{}> ", profile.name))?;

    let result = loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else { break Ok(()) };
                let command = match Command::parse(&line, session.profile().role) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                };
                match session.handle_command(&mut store, command, now_millis()) {
                    Ok(Action::Send(events)) => {
                        for event in events {
                            link.send(event)?;
                        }
                    }
                    Ok(Action::Print(output)) => {
                        for line in output {
                            println!("{line}");
                        }
                    }
                    Ok(Action::Quit) => break Ok(()),
                    Err(e) => eprintln!("{e}"),
                }
            }
            event = inbound.recv() => {
                let Some(event) = event else { break Err(ClientError::Disconnected) };
                if let Some(line) = session.handle_event(&mut store, event, now_millis()) {
                    println!("{line}");
                }
            }
            Some(trigger) = cleanup.recv() => {
                let report = store.reconcile();
                if !report.is_empty() {
                    tracing::debug!("{:?} cleanup: {:?}", trigger, report);
                }
            }
            _ = tokio::signal::ctrl_c() => break Ok(()),
        }
    };

    link.close().await;
    result
}

/// Read lines on a dedicated thread; the channel closes on Ctrl+C or Ctrl+D.
fn spawn_prompt(prompt: String) -> Result<mpsc::UnboundedReceiver<String>, ClientError> {
    let mut editor = DefaultEditor::new()?;
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || {
        loop {
            match editor.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::warn!("Readline error: {}", e);
                    break;
                }
            }
        }
    });

    Ok(rx)
}
