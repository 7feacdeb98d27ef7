use std::io::Write;

use crate::calendar::DateKey;
use crate::config::Config;
use crate::error::Result;
use crate::events::{Dispatcher, Event};
use crate::selection::SelectionController;

use super::command::{Command, CommandParser};
use super::MonthPane;

const PROMPT: &str = "> ";

pub struct App<'a> {
    config: &'a Config,
    controller: SelectionController,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, controller: SelectionController) -> App<'a> {
        App { config, controller }
    }

    pub fn draw<W: Write>(&self, out: &mut W) -> Result<()> {
        let view = self.controller.view(DateKey::today());
        write!(out, "{}", MonthPane::new(&view, &self.config.theme))?;
        out.flush()?;
        Ok(())
    }

    /// Applies one input line. Returns `false` once the user asked to quit.
    fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<bool> {
        let displayed = self.controller.displayed();
        let command = match CommandParser::new(&displayed).run_command(line) {
            Ok(command) => command,
            Err(err) => {
                writeln!(out, "error: {}", err)?;
                return Ok(true);
            }
        };

        match command {
            Command::Quit => Ok(false),
            Command::Actions(actions) => {
                for action in actions {
                    if let Err(err) = self.controller.handle(action) {
                        log::warn!("{}", err);
                        writeln!(out, "error: {}", err)?;
                        break;
                    }
                }
                Ok(true)
            }
        }
    }

    pub fn run<W: Write>(&mut self, dispatcher: Dispatcher, mut out: W) -> Result<()> {
        let mut run = true;

        while run {
            // Draw
            self.draw(&mut out)?;
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            // Handle events
            match dispatcher.next() {
                Ok(Event::Input(line)) => run = self.handle_line(&line, &mut out)?,
                Ok(Event::Eof) | Err(_) => run = false,
            }
            writeln!(out)?;
        }

        Ok(())
    }
}
