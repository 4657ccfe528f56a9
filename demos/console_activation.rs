//! Console activation example.
//!
//! Runs the startup gate against a settings file, prompting on stdin until
//! a valid key or `TRIAL-000000000000` is entered, or the user types `quit`.
//!
//! # Running
//!
//! ```bash
//! cargo run --example console_activation -- /tmp/demo-settings.json
//! ```
//!
//! Issue a key for it with the same secret:
//!
//! ```bash
//! GATEKEY_SECRET=demo-secret-change-me cargo run --bin gatekey-issue -- issue you@example.com 2030-01-01
//! ```

use gatekey::{
    ActivationGate, FileStore, GateConfig, LicenseError, Notice, PromptResponse, Prompter,
};
use std::io::{self, BufRead, Write};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

// In production this is a compile-time constant in your binary.
const SECRET: &str = "demo-secret-change-me";

struct ConsolePrompter<R> {
    input: R,
}

impl<R: BufRead> Prompter for ConsolePrompter<R> {
    fn prompt(&mut self, reason: Option<&LicenseError>) -> PromptResponse {
        match reason {
            Some(err) => println!("\n{}", err),
            None => println!("\nThis copy is not activated."),
        }
        print!("Enter license key (or 'quit'): ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            // EOF behaves like Quit
            Ok(0) | Err(_) => PromptResponse::Quit,
            Ok(_) if line.trim().eq_ignore_ascii_case("quit") => PromptResponse::Quit,
            Ok(_) => PromptResponse::Submit(line),
        }
    }

    fn notify(&mut self, notice: &Notice) {
        println!("[notice] {}", notice);
    }
}

fn main() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();

    let config = GateConfig::new("gatekey-demo", SECRET, "gatekey-demo");

    let store = match std::env::args().nth(1) {
        Some(path) => FileStore::with_path(path),
        None => match FileStore::new(config.store_namespace) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("Store error: {}", e);
                std::process::exit(1);
            }
        },
    };
    println!("Settings file: {}", store.path().display());

    let mut gate = match ActivationGate::new(config, store) {
        Ok(gate) => gate,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut prompter = ConsolePrompter {
        input: stdin.lock(),
    };

    match gate.run_or_exit(&mut prompter) {
        Ok(info) => {
            println!("\nApplication unlocked.\n{}", info);
        }
        Err(e) => {
            eprintln!("Activation state could not be saved: {}", e);
            std::process::exit(1);
        }
    }
}
