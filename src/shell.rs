use anyhow::Result;
use crossterm::style::Stylize;
use std::io::{BufRead, Write};

use crate::analysis;
use crate::config::AppConfig;
use crate::error::PmaError;
use crate::report;
use crate::storage::Storage;
use crate::watchlist::{self, AddOutcome, DeleteOutcome};

// --- Menu ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ShowList,
    Delete,
    Add,
    Analysis,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::ShowList),
            "2" => Some(MenuChoice::Delete),
            "3" => Some(MenuChoice::Add),
            "4" => Some(MenuChoice::Analysis),
            "5" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

const MENU: &str = "\n1. Show ticker list\n2. Delete ticker\n3. Add ticker\n4. Analysis\n5. Exit\n";

/// Turns an action failure into the line shown to the user.
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<PmaError>() {
        Some(PmaError::SourceNotFound { path, .. }) => format!("{} file not found.", path.display()),
        Some(e) if e.is_permission_denied() => match e.path() {
            Some(path) => format!("Permission denied to access {} file.", path.display()),
            None => format!("An error occurred: {}", e),
        },
        Some(e) => format!("An error occurred: {}", e),
        None => format!("An error occurred: {:#}", err),
    }
}

// --- Shell ---

/// Line-oriented menu over any reader/writer pair.
pub struct Shell<R, W> {
    input: R,
    output: W,
    config: AppConfig,
    export: Option<Storage>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W, config: AppConfig, export: Option<Storage>) -> Self {
        Self {
            input,
            output,
            config,
            export,
        }
    }

    pub fn show_credits(&mut self) -> Result<()> {
        writeln!(self.output, "{}", "Price Movement Analyzer".bold().cyan())?;
        writeln!(
            self.output,
            "{}",
            "Rank your watchlist, spot the fallers, find the leaders.".dark_grey()
        )?;
        Ok(())
    }

    /// Prints `message` and reads one line. `None` at end of input.
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn get_user_choice(&mut self) -> Result<Option<MenuChoice>> {
        loop {
            write!(self.output, "{}", MENU)?;
            let Some(line) = self.prompt("Enter your choice (1-5): ")? else {
                return Ok(None);
            };
            match MenuChoice::parse(&line) {
                Some(choice) => return Ok(Some(choice)),
                None => writeln!(self.output, "Invalid choice. Please try again.")?,
            }
        }
    }

    /// Menu loop. Returns when the user confirms exit or input runs out.
    pub fn run(&mut self) -> Result<()> {
        while let Some(choice) = self.get_user_choice()? {
            let outcome = match choice {
                MenuChoice::ShowList => self.show_ticker_list(),
                MenuChoice::Delete => self.delete_ticker(),
                MenuChoice::Add => self.add_ticker(),
                MenuChoice::Analysis => self.analysis(),
                MenuChoice::Exit => {
                    if self.confirm_exit()? {
                        break;
                    }
                    Ok(())
                }
            };

            if let Err(e) = outcome {
                tracing::debug!(error = %e, ?choice, "menu action failed");
                writeln!(self.output, "{}", describe_error(&e))?;
            }
        }
        writeln!(self.output, "Goodbye.")?;
        Ok(())
    }

    fn confirm_exit(&mut self) -> Result<bool> {
        Ok(match self.prompt("Are you sure you want to exit? (y/n) ")? {
            Some(answer) => answer.eq_ignore_ascii_case("y"),
            None => true,
        })
    }

    fn show_ticker_list(&mut self) -> Result<()> {
        let symbols = watchlist::list_symbols(&self.config.watchlist)?;
        writeln!(self.output, "\nTicker List:")?;
        for symbol in symbols {
            writeln!(self.output, "{}", symbol)?;
        }
        Ok(())
    }

    fn delete_ticker(&mut self) -> Result<()> {
        let Some(symbol) = self.prompt("Enter the ticker to delete: ")? else {
            return Ok(());
        };
        match watchlist::delete_symbol(&self.config.watchlist, &symbol)? {
            DeleteOutcome::Deleted(_) => writeln!(self.output, "The ticker {} has been deleted.", symbol)?,
            DeleteOutcome::NotListed => writeln!(
                self.output,
                "No ticker has been deleted because {} doesn't exist in the list.",
                symbol
            )?,
        }
        Ok(())
    }

    fn add_ticker(&mut self) -> Result<()> {
        let Some(symbol) = self.prompt("Enter the ticker to add: ")? else {
            return Ok(());
        };
        match watchlist::add_symbol(&self.config.watchlist, &self.config.prices, &symbol)? {
            AddOutcome::Added => writeln!(self.output, "The ticker {} has been added.", symbol)?,
            AddOutcome::AlreadyListed => {
                writeln!(self.output, "The ticker {} is already in the list.", symbol)?
            }
            AddOutcome::NotInUniverse => writeln!(
                self.output,
                "The ticker does not exist in {}. Please try again.",
                self.config.prices.display()
            )?,
        }
        Ok(())
    }

    /// Runs the pipeline once, prints the three tables and exports if enabled.
    pub fn analysis(&mut self) -> Result<()> {
        let result = analysis::run_analysis(&self.config.watchlist, &self.config.prices, self.config.top_n)?;
        write!(self.output, "{}", report::render_report(&result))?;

        if let Some(storage) = &self.export {
            let path = report::export(storage, &result)?;
            writeln!(self.output, "\nResults saved to {}", path.display())?;
        }
        Ok(())
    }
}
