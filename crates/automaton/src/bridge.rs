//! Input-injection bridge between the automaton and the host's key loop.
//!
//! The host always asks one [`InputRouter`] for its next key. Normally the
//! router forwards the request to the real input device. While the
//! automaton is running the router calls into [`AutomatonInput`] instead,
//! which hands out queued keys, runs a fresh decision cycle whenever the
//! queue drains at the command prompt, and gives control back the moment a
//! real key is pressed.
use crate::config::AutomatonConfig;
use crate::controller::{Automaton, StopReason};
use crate::queue::{ESCAPE, Key};
use crate::world::World;

/// What the automaton needs from the host's input subsystem.
pub trait Host {
    /// Current view of the game.
    fn world(&self) -> &dyn World;

    /// A pending real keypress, without waiting.
    fn poll_user_key(&mut self) -> Option<Key>;

    /// Blocks until the user presses a key.
    fn read_user_key(&mut self) -> Key;

    /// The host is waiting for a new command rather than, say, a menu
    /// selection.
    fn waiting_for_command(&self) -> bool;

    /// Shows an informational message to the user.
    fn message(&mut self, text: &str);

    /// Gives the user a moment to follow what is happening.
    fn pause(&mut self) {}
}

/// A supplier of keys for the host.
///
/// Different implementations can handle:
/// - The user at the keyboard
/// - The automaton
/// - Scripted key sequences in tests
pub trait KeySource {
    /// Next key for the host.
    ///
    /// `flush_first` is the host asking for any buffered input to be thrown
    /// away first.
    fn next_key(&mut self, host: &mut dyn Host, flush_first: bool) -> Key;

    /// False once the source should no longer be asked for keys.
    fn is_active(&self) -> bool {
        true
    }
}

/// Reads keys from the real input device.
#[derive(Debug, Default)]
pub struct HumanInput;

impl KeySource for HumanInput {
    fn next_key(&mut self, host: &mut dyn Host, _flush_first: bool) -> Key {
        host.read_user_key()
    }
}

/// Feeds the automaton's queued keys to the host.
pub struct AutomatonInput {
    automaton: Automaton,
}

impl AutomatonInput {
    pub fn new(automaton: Automaton) -> Self {
        Self { automaton }
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn automaton_mut(&mut self) -> &mut Automaton {
        &mut self.automaton
    }

    fn run_turn(&mut self, host: &mut dyn Host) {
        let result = self.automaton.take_turn(host.world());
        match result {
            Ok(report) => {
                tracing::debug!(
                    turn = report.turn,
                    policy = report.policy,
                    pending = self.automaton.pending_keys(),
                    "keys queued"
                );
            }
            Err(err) if err.deactivates() => host.message(&err.to_string()),
            Err(err) => {
                tracing::warn!(%err, severity = err.severity().as_str(), "turn failed");
            }
        }
        host.pause();
    }
}

impl KeySource for AutomatonInput {
    fn next_key(&mut self, host: &mut dyn Host, flush_first: bool) -> Key {
        if !self.automaton.is_active() {
            return ESCAPE;
        }

        // Queued keys are kept: a trap confirmation must survive the
        // host's flush before the "really walk onto the trap?" prompt.
        if flush_first && self.automaton.peek_key().is_some() {
            tracing::debug!(
                pending = self.automaton.pending_keys(),
                "flush requested, keeping queued keys"
            );
        }

        if let Some(key) = host.poll_user_key() {
            tracing::debug!(?key, "user key pressed");
            self.automaton.deactivate(StopReason::UserInterrupt);
            return ESCAPE;
        }

        if self.automaton.peek_key().is_none() {
            if !host.waiting_for_command() {
                self.automaton.deactivate(StopReason::NotAtPrompt);
                return ESCAPE;
            }
            self.run_turn(host);
        }

        self.automaton.next_key().unwrap_or('\0')
    }

    fn is_active(&self) -> bool {
        self.automaton.is_active()
    }
}

/// The single place the host asks for keys.
///
/// Holds the automaton hook while it is installed and removes it as soon as
/// the automaton goes idle.
#[derive(Default)]
pub struct InputRouter {
    human: HumanInput,
    hook: Option<AutomatonInput>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_automated(&self) -> bool {
        self.hook.is_some()
    }

    pub fn hook(&self) -> Option<&AutomatonInput> {
        self.hook.as_ref()
    }

    /// Creates and activates an automaton for the host's current level and
    /// installs it as the key source.
    pub fn start_automaton(&mut self, host: &dyn Host, config: AutomatonConfig) {
        let mut automaton = Automaton::new(config);
        automaton.activate(host.world().dimensions());
        self.install(automaton);
    }

    /// Installs an already configured automaton.
    pub fn install(&mut self, automaton: Automaton) {
        if let Some(mut previous) = self.hook.take() {
            previous.automaton_mut().deactivate(StopReason::Requested);
        }
        self.hook = Some(AutomatonInput::new(automaton));
        tracing::debug!("automaton input hook installed");
    }

    /// Stops the automaton, if running, and restores human input.
    pub fn stop_automaton(&mut self, reason: StopReason) {
        if let Some(mut hook) = self.hook.take() {
            hook.automaton_mut().deactivate(reason);
            tracing::debug!(%reason, "automaton input hook removed");
        }
    }

    pub fn next_key(&mut self, host: &mut dyn Host, flush_first: bool) -> Key {
        let Some(hook) = self.hook.as_mut() else {
            return self.human.next_key(host, flush_first);
        };

        let key = hook.next_key(host, flush_first);
        if !hook.is_active() {
            self.hook = None;
            tracing::debug!("automaton went idle, input hook removed");
        }
        key
    }
}

impl Drop for InputRouter {
    fn drop(&mut self) {
        self.stop_automaton(StopReason::HostShutdown);
    }
}
