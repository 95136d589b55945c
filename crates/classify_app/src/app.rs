use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use classify_core::AppViewModel;
use classify_engine::EngineHandle;
use client_logging::{client_info, client_warn};

use crate::config::ClientConfig;
use crate::controller::{Controller, ViewSink};
use crate::ui::input::{parse_command, Command, InputError, HELP};
use crate::ui::render::render;

/// Interval at which engine completions are applied while waiting for input.
const TICK: Duration = Duration::from_millis(75);

/// Prints every published snapshot to stdout.
struct TerminalSink;

impl ViewSink for TerminalSink {
    fn publish(&self, view: &AppViewModel) {
        print_lines(&render(view));
    }
}

pub fn run_app(config: &ClientConfig) -> anyhow::Result<()> {
    let engine = EngineHandle::new(config.classifier_settings())
        .context("failed to start the classifier engine")?;
    let mut controller = Controller::new(engine, config.endpoint.clone());
    controller.subscribe(Box::new(TerminalSink));
    controller.start();
    println!("{HELP}");

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || read_commands(cmd_tx))
        .context("failed to spawn the input reader")?;

    loop {
        match cmd_rx.recv_timeout(TICK) {
            Ok(Command::Quit) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Ok(command) => handle_command(&mut controller, command),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }
        controller.pump();
    }

    controller.shutdown();
    client_info!("Session closed");
    Ok(())
}

fn read_commands(cmd_tx: mpsc::Sender<Command>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        match parse_command(&line) {
            Ok(command) => {
                if cmd_tx.send(command).is_err() {
                    return;
                }
            }
            Err(InputError::Empty) => {}
            Err(err) => eprintln!("{err}"),
        }
    }
    let _ = cmd_tx.send(Command::Quit);
}

fn handle_command(controller: &mut Controller, command: Command) {
    match command {
        Command::Select(path) => {
            if let Err(err) = controller.select_file(&path) {
                client_warn!("Could not read {:?}: {}", path, err);
                eprintln!("Could not read {}: {}", path.display(), err);
            }
        }
        Command::Submit => {
            if let Err(reason) = controller.submit() {
                client_info!("Submit rejected: {}", reason);
            }
        }
        Command::Reset => controller.reset(),
        Command::Dismiss => controller.dismiss_error(),
        Command::Health => controller.request_health(),
        Command::Categories => match &controller.state().server().categories {
            Some(categories) => print_lines(&[categories.join(", ")]),
            None => {
                println!("Categories not loaded yet; asking the server again.");
                controller.request_categories();
            }
        },
        Command::Show => print_lines(&render(&controller.snapshot())),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

fn print_lines(lines: &[String]) {
    let mut stdout = io::stdout().lock();
    for line in lines {
        let _ = writeln!(stdout, "{line}");
    }
    let _ = writeln!(stdout);
    let _ = stdout.flush();
}
