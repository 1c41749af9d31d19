//! The sandbox side of the key loop.
//!
//! [`SandboxHost`] reads keys one at a time exactly as a game's command
//! parser would: a command key, then whatever prompt it opens. Completed
//! commands advance the simulated world by one turn.
use std::time::Duration;

use automaton::{Direction, ESCAPE, Host, Key, RETURN, Skill, World, WorldView};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::config::SandboxConfig;
use crate::terminal;
use crate::world::SandboxWorld;

/// Messages kept for display.
const MESSAGE_HISTORY: usize = 64;

/// What the host is waiting for after the keys read so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Prompt {
    Command,
    Direction { bash: bool },
    ConfirmTrap(Direction),
    Stairs,
    UseItem,
    /// `g` or `w` waiting for the `-` that selects the floor item.
    FloorItem { wield: bool },
    ReplaceQuiver,
    /// `f` or `F` waiting for the target key.
    FireTarget { slot: usize },
    Character,
    Skills { row: usize },
}

pub struct SandboxHost {
    world: SandboxWorld,
    prompt: Prompt,
    messages: Vec<String>,
    render: bool,
    frame_delay: Duration,
    keys_read: usize,
    finished: Option<String>,
}

impl SandboxHost {
    pub fn new(world: SandboxWorld, config: &SandboxConfig) -> Self {
        Self {
            world,
            prompt: Prompt::Command,
            messages: Vec::new(),
            render: config.render,
            frame_delay: config.frame_delay,
            keys_read: 0,
            finished: None,
        }
    }

    pub fn sandbox(&self) -> &SandboxWorld {
        &self.world
    }

    pub fn keys_read(&self) -> usize {
        self.keys_read
    }

    /// Why the scenario ended, if it has.
    pub fn finished(&self) -> Option<&str> {
        self.finished.as_deref()
    }

    /// Consumes one key from the input stream.
    pub fn feed(&mut self, key: Key) {
        self.keys_read += 1;
        let prompt = self.prompt;
        self.prompt = Prompt::Command;

        // Escape backs out of any prompt.
        if key == ESCAPE {
            return;
        }

        match prompt {
            Prompt::Command => self.command(key),
            Prompt::Direction { bash } => {
                let Some(direction) = Direction::from_keypad(key) else {
                    return self.say("Illegal direction.");
                };
                let stepped = self.world.player().position.step(direction);
                if !bash && self.world.has_visible_trap(stepped) {
                    self.prompt = Prompt::ConfirmTrap(direction);
                    return;
                }
                let message = if bash {
                    self.world.bash(direction)
                } else {
                    self.world.walk(direction)
                };
                self.finish_command(message);
            }
            Prompt::ConfirmTrap(direction) => {
                if key == 'y' {
                    let message = self.world.walk(direction);
                    self.finish_command(message);
                }
            }
            Prompt::Stairs => {
                if key == 'y' {
                    let message = self.world.take_stairs();
                    if let Some(text) = &message {
                        self.finished = Some(text.clone());
                    }
                    self.finish_command(message);
                }
            }
            Prompt::UseItem => {
                let message = self.world.use_item(key);
                self.finish_command(message);
            }
            Prompt::FloorItem { wield } => {
                if key != '-' {
                    return self.say("You see nothing there.");
                }
                if !wield {
                    let message = self.world.pick_up();
                    return self.finish_command(message);
                }
                let [first, second] = self.world.player().equipment.quivers;
                let on_floor_is_ammo = self.world.ground_items().iter().any(|item| {
                    item.position == self.world.player().position
                        && item.appraisal.slot == automaton::SlotKind::Quiver
                });
                if on_floor_is_ammo && first.is_occupied() && second.is_occupied() {
                    self.prompt = Prompt::ReplaceQuiver;
                    return;
                }
                let message = self.world.wield(None);
                self.finish_command(message);
            }
            Prompt::ReplaceQuiver => {
                let slot = match key {
                    'm' => 0,
                    'n' => 1,
                    _ => return self.say("Illegal quiver slot."),
                };
                let message = self.world.wield(Some(slot));
                self.finish_command(message);
            }
            Prompt::FireTarget { slot } => {
                if key == 'f' {
                    let message = self.world.fire(slot);
                    self.finish_command(message);
                }
            }
            Prompt::Character => {
                if key == 'i' {
                    self.prompt = Prompt::Skills { row: 0 };
                }
            }
            Prompt::Skills { row } => {
                self.prompt = Prompt::Skills { row };
                match key {
                    '2' => {
                        let row = (row + 1).min(Skill::COUNT - 1);
                        self.prompt = Prompt::Skills { row };
                    }
                    '8' => {
                        let row = row.saturating_sub(1);
                        self.prompt = Prompt::Skills { row };
                    }
                    '6' => {
                        if let Some(message) = self.world.raise_skill(row) {
                            self.say(&message);
                        }
                    }
                    RETURN => self.say("Skills accepted."),
                    _ => {}
                }
            }
        }
    }

    fn command(&mut self, key: Key) {
        self.prompt = match key {
            ';' => Prompt::Direction { bash: false },
            '/' => Prompt::Direction { bash: true },
            ',' => Prompt::Stairs,
            'u' => Prompt::UseItem,
            'g' => Prompt::FloorItem { wield: false },
            'w' => Prompt::FloorItem { wield: true },
            'f' => Prompt::FireTarget { slot: 0 },
            'F' => Prompt::FireTarget { slot: 1 },
            '@' => Prompt::Character,
            other => {
                tracing::debug!(?other, "ignoring unknown command key");
                Prompt::Command
            }
        };
    }

    fn finish_command(&mut self, message: Option<String>) {
        if let Some(text) = message {
            self.say(&text);
        }
        for text in self.world.end_turn() {
            self.say(&text);
        }
        if self.world.is_defeated() {
            self.finished = Some("You die.".to_owned());
        }
    }

    fn say(&mut self, text: &str) {
        tracing::info!(turn = self.world.turn(), "{text}");
        self.messages.push(text.to_owned());
        if self.messages.len() > MESSAGE_HISTORY {
            self.messages.remove(0);
        }
    }
}

impl Host for SandboxHost {
    fn world(&self) -> &dyn World {
        &self.world
    }

    fn poll_user_key(&mut self) -> Option<Key> {
        if !self.render {
            return None;
        }
        match event::poll(Duration::ZERO) {
            Ok(true) => read_key_event(),
            _ => None,
        }
    }

    fn read_user_key(&mut self) -> Key {
        if !self.render {
            return ESCAPE;
        }
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    return key_to_char(key.code);
                }
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(%err, "failed to read terminal input");
                    return ESCAPE;
                }
            }
        }
    }

    fn waiting_for_command(&self) -> bool {
        self.prompt == Prompt::Command
    }

    fn message(&mut self, text: &str) {
        self.say(text);
    }

    fn pause(&mut self) {
        if !self.render {
            return;
        }
        if let Err(err) = terminal::draw(&self.world, &self.messages) {
            tracing::warn!(%err, "failed to draw the map");
        }
        std::thread::sleep(self.frame_delay);
    }
}

fn read_key_event() -> Option<Key> {
    match event::read() {
        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => Some(key_to_char(key.code)),
        _ => None,
    }
}

fn key_to_char(code: KeyCode) -> Key {
    match code {
        KeyCode::Char(c) => c,
        KeyCode::Enter => RETURN,
        _ => ESCAPE,
    }
}

#[cfg(test)]
mod tests {
    use automaton::Cell;

    use super::*;
    use crate::scenario::Scenario;

    /// Parses a scenario document built from `rows` plus optional extra fields.
    fn host(rows: &[&str], extra: &str) -> SandboxHost {
        let source = format!("(name: \"test\", rows: {rows:?}, {extra})");
        let scenario = Scenario::parse(&source).unwrap();
        SandboxHost::new(SandboxWorld::from_scenario(&scenario), &SandboxConfig::default())
    }

    fn type_keys(host: &mut SandboxHost, keys: &str) {
        for key in keys.chars() {
            host.feed(key);
        }
    }

    #[test]
    fn move_command_takes_a_direction() {
        let mut host = host(&["#####", "#@..#", "#####"], "");

        host.feed(';');
        assert!(!host.waiting_for_command());
        host.feed('6');

        assert!(host.waiting_for_command());
        assert_eq!(host.world().player().position, Cell::new(1, 2));
        assert_eq!(host.sandbox().turn(), 1);
    }

    #[test]
    fn trap_needs_confirmation() {
        let mut host = host(&["#####", "#@^.#", "#####"], "");

        type_keys(&mut host, ";6");
        assert_eq!(host.world().player().position, Cell::new(1, 1));
        host.feed('y');
        assert_eq!(host.world().player().position, Cell::new(1, 2));
    }

    #[test]
    fn skills_screen_raises_the_selected_row() {
        let mut host = host(&["###", "#@#", "###"], "player: (unspent_exp: 100)");

        type_keys(&mut host, "@i226\r\x1b");

        assert!(host.waiting_for_command());
        assert_eq!(host.world().player().skills[Skill::Evasion as usize], 1);
        assert_eq!(host.world().player().unspent_exp, 0);
        assert_eq!(host.sandbox().turn(), 0);
    }

    #[test]
    fn taking_stairs_finishes_the_scenario() {
        let mut host = host(&["####", "#@>#", "####"], "");

        type_keys(&mut host, ";6,y");

        assert_eq!(host.finished(), Some("You descend to depth 2."));
    }
}
