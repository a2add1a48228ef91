//! Interactive selection prompts
//!
//! The questions and their choice lists live here; picking an entry is
//! delegated to a `Chooser`. The binary uses `TerminalChooser` (a dialoguer
//! select list), tests script the picks.

use crate::crawler::{flat_type_choices, normalize_filter, town_choices};
use crate::models::LaunchSummary;
use dialoguer::Select;
use std::io;

/// Picks one entry from a list
pub trait Chooser {
    /// Returns the index of the chosen entry
    fn choose(&mut self, prompt: &str, choices: &[String], default: usize) -> io::Result<usize>;
}

/// Arrow-key select list on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalChooser;

impl Chooser for TerminalChooser {
    fn choose(&mut self, prompt: &str, choices: &[String], default: usize) -> io::Result<usize> {
        Select::new()
            .with_prompt(prompt)
            .items(choices)
            .default(default)
            .interact()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

/// Asks for the launch, flat type and town to scrape
pub struct Prompter<C> {
    chooser: C,
}

impl<C: Chooser> Prompter<C> {
    pub fn new(chooser: C) -> Self {
        Self { chooser }
    }

    /// Asks `prompt` over `choices` and returns the chosen entry
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The chosen entry as listed
    /// * `Err(io::Error)` - Nothing to choose from, or the chooser failed
    fn pick(&mut self, prompt: &str, choices: &[String], default: usize) -> io::Result<String> {
        if choices.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("nothing to choose for '{}'", prompt),
            ));
        }

        let index = self.chooser.choose(prompt, choices, default.min(choices.len() - 1))?;
        choices.get(index).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("choice {} is out of range for '{}'", index, prompt),
            )
        })
    }

    /// Asks for one of the discovered launch dates
    pub fn launch_date(&mut self, launches: &[LaunchSummary]) -> io::Result<String> {
        let dates: Vec<String> = launches.iter().map(|l| l.launch_date.clone()).collect();
        self.pick("Which launch date are you interested in", &dates, 0)
    }

    /// Asks for a room count; `All` yields `None`
    pub fn flat_type(&mut self, launch: &LaunchSummary) -> io::Result<Option<String>> {
        let choices = flat_type_choices(launch);
        let answer = self.pick("How many rooms are you looking at", &choices, choices.len())?;
        Ok(normalize_filter(Some(&answer)))
    }

    /// Asks for a town offering the flat type; `All` yields `None`
    pub fn town(&mut self, launch: &LaunchSummary, flat_type: Option<&str>) -> io::Result<Option<String>> {
        let choices = town_choices(launch, flat_type);
        let answer = self.pick("Which town are you interested in", &choices, choices.len())?;
        Ok(normalize_filter(Some(&answer)))
    }
}
