//! Terminal setup/teardown and map drawing.
use std::io::{self, Write};

use anyhow::Result;
use automaton::{Cell, WorldView};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::Print,
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};

use crate::world::SandboxWorld;

/// Messages shown under the map.
const MESSAGE_LINES: usize = 6;

pub fn init() -> Result<TerminalGuard> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, Hide)?;
    Ok(TerminalGuard)
}

pub fn restore() -> Result<()> {
    execute!(io::stdout(), Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Restores the terminal when dropped.
pub struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore();
    }
}

/// Draws the remembered map, a status line and the latest messages.
pub fn draw(world: &SandboxWorld, messages: &[String]) -> Result<()> {
    let mut stdout = io::stdout();
    queue!(stdout, Clear(ClearType::All))?;

    let dimensions = world.dimensions();
    for y in 0..dimensions.height {
        let row: String = (0..dimensions.width)
            .map(|x| world.glyph_at(Cell::new(y as i32, x as i32)))
            .collect();
        queue!(stdout, MoveTo(0, y as u16), Print(row))?;
    }

    let player = world.player();
    let light = player
        .equipment
        .light
        .map_or_else(|| "none".to_owned(), |light| format!("{:?} {}", light.kind, light.fuel));
    let status = format!(
        "turn {}  hp {}/{}  depth {}  food {}  light {}  exp {}  (any key stops)",
        world.turn(),
        player.hp,
        player.max_hp,
        player.depth,
        player.food,
        light,
        player.unspent_exp,
    );
    let top = dimensions.height as u16 + 1;
    queue!(stdout, MoveTo(0, top), Print(status))?;

    let recent = messages.len().saturating_sub(MESSAGE_LINES);
    for (line, message) in messages[recent..].iter().enumerate() {
        queue!(stdout, MoveTo(0, top + 2 + line as u16), Print(message))?;
    }

    stdout.flush()?;
    Ok(())
}
