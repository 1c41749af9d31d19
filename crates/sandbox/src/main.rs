//! Sandbox binary: lets the automaton play a small simulated level.
//!
//! # Examples
//!
//! ```bash
//! # Headless run of the built-in cave, logging to stderr
//! RUST_LOG=automaton=debug cargo run -p automaton-sandbox
//!
//! # Watch it play a custom scenario; press any key to take over
//! SANDBOX_RENDER=true SANDBOX_SCENARIO=my_level.ron cargo run -p automaton-sandbox
//! ```
mod config;
mod host;
mod logging;
mod scenario;
mod terminal;
mod world;

use anyhow::Result;
use automaton::{AutomatonConfig, InputRouter, StopReason};

use crate::config::SandboxConfig;
use crate::host::SandboxHost;
use crate::scenario::Scenario;
use crate::world::SandboxWorld;

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SandboxConfig::from_env();
    let automaton_config = AutomatonConfig::from_env();

    let _log_guard = logging::setup_logging(!config.render)?;

    let scenario = match &config.scenario {
        Some(path) => Scenario::load_from_file(path)?,
        None => Scenario::builtin()?,
    };
    tracing::info!(scenario = %scenario.name, "starting sandbox");

    let mut host = SandboxHost::new(SandboxWorld::from_scenario(&scenario), &config);

    let terminal = if config.render {
        Some(terminal::init()?)
    } else {
        None
    };

    let mut router = InputRouter::new();
    router.start_automaton(&host, automaton_config);
    run(&mut router, &mut host, config.max_keys);

    drop(terminal);

    let sandbox = host.sandbox();
    let outcome = host.finished().unwrap_or("The automaton handed control back.");
    println!("{outcome}");
    println!(
        "{} turns, {} keys, {} hostiles left",
        sandbox.turn(),
        host.keys_read(),
        sandbox.hostiles_left()
    );
    Ok(())
}

/// Feeds keys from the router to the host until the automaton stops, the
/// scenario ends, or the key budget runs out.
fn run(router: &mut InputRouter, host: &mut SandboxHost, max_keys: usize) {
    while router.is_automated() && host.finished().is_none() {
        if host.keys_read() >= max_keys {
            tracing::warn!(max_keys, "key budget exhausted");
            router.stop_automaton(StopReason::Requested);
            break;
        }
        let key = router.next_key(host, false);
        host.feed(key);
    }

    if host.finished().is_some() {
        router.stop_automaton(StopReason::HostShutdown);
    }
}
