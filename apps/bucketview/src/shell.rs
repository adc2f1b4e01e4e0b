//! Interactive command loop over stdin.

use std::io::Write;

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use bucketview_core::navigator::crumb_target;
use bucketview_core::preferences::PreferenceStore;
use bucketview_core::{BrowserController, FetchTicket, ListingSource, Outcome, Step};
use bucketview_model::Location;

use crate::render::{Palette, render};

const HELP: &str = "\
commands:
  ls                 redraw the current page
  refresh            reload the current folder
  open <n>           enter folder or bucket <n>, or print the link of file <n>
  up                 go to the parent folder
  crumb <n>          follow breadcrumb <n> (0 is Home)
  home               list all buckets
  bucket <name>      open the root of another bucket
  next | prev        change page
  page <n>           jump to a loaded page
  find <text>        filter rows by name (no text clears)
  theme [on|off]     toggle or set the dark theme
  help               show this text
  quit               exit";

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Refresh,
    Open(usize),
    Up,
    Crumb(usize),
    Home,
    Bucket(String),
    Next,
    Prev,
    Page(usize),
    Find(String),
    Theme(Option<bool>),
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines redraw.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word {
            "" | "ls" => Self::List,
            "refresh" | "r" => Self::Refresh,
            "open" | "o" | "cd" => Self::Open(parse_number(rest)?),
            "up" | ".." => Self::Up,
            "crumb" => Self::Crumb(parse_number(rest)?),
            "home" => Self::Home,
            "bucket" => Self::Bucket(rest.to_owned()),
            "next" | "n" => Self::Next,
            "prev" | "p" => Self::Prev,
            "page" => Self::Page(parse_number(rest)?),
            "find" | "/" => Self::Find(rest.to_owned()),
            "theme" => Self::Theme(match rest {
                "" => None,
                "on" | "dark" => Some(true),
                "off" | "light" => Some(false),
                other => bail!("theme expects on or off, got {other:?}"),
            }),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("unknown command {other:?}, type help"),
        };
        Ok(command)
    }
}

fn parse_number(text: &str) -> Result<usize> {
    text.parse()
        .with_context(|| format!("expected a number, got {text:?}"))
}

/// Interactive session state.
pub struct Shell<'a, S: ?Sized> {
    controller: BrowserController,
    source: &'a S,
    preferences: Option<PreferenceStore>,
    dark_mode: bool,
}

impl<S: ?Sized> std::fmt::Debug for Shell<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("location", self.controller.location())
            .field("dark_mode", &self.dark_mode)
            .finish_non_exhaustive()
    }
}

impl<'a, S> Shell<'a, S>
where
    S: ListingSource + ?Sized,
{
    /// Wrap an already loaded controller.
    pub fn new(
        controller: BrowserController,
        source: &'a S,
        preferences: Option<PreferenceStore>,
    ) -> Self {
        let dark_mode = preferences.as_ref().is_some_and(PreferenceStore::dark_mode);
        Self {
            controller,
            source,
            preferences,
            dark_mode,
        }
    }

    /// Read commands until `quit`, end of input or Ctrl-C.
    pub async fn run(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        self.draw()?;

        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        loop {
            prompt()?;
            let line = tokio::select! {
                line = lines.next_line() => line.context("failed to read command")?,
                _ = &mut interrupt => {
                    info!("interrupted, leaving shell");
                    None
                }
            };
            let Some(line) = line else { break };

            match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => self.execute(command).await?,
                Err(e) => println!("{e}"),
            }
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<()> {
        debug!(?command, "executing");
        match command {
            Command::List => self.draw()?,
            Command::Refresh => {
                let ticket = self.controller.begin_refresh();
                self.load(ticket).await?;
                while let Some(ticket) = self.controller.begin_restore() {
                    self.load(ticket).await?;
                }
            }
            Command::Open(number) => self.open(number).await?,
            Command::Up => match self.controller.parent_location() {
                Some(target) => self.navigate(target).await?,
                None => println!("already at the top"),
            },
            Command::Crumb(0) | Command::Home => self.navigate(Location::default()).await?,
            Command::Crumb(number) => {
                let view = self.controller.view();
                let target = view
                    .breadcrumb
                    .get(number - 1)
                    .and_then(|entry| crumb_target(&view.location, entry));
                match target {
                    Some(target) => self.navigate(target).await?,
                    None => println!("breadcrumb {number} is not a link"),
                }
            }
            Command::Bucket(name) => self.navigate(Location::root(name)).await?,
            Command::Next => match self.controller.begin_next() {
                Step::Local => self.draw()?,
                Step::Fetch(ticket) => self.load(ticket).await?,
                Step::None => println!("already on the last page"),
            },
            Command::Prev => {
                if self.controller.previous() {
                    self.draw()?;
                } else {
                    println!("already on the first page");
                }
            }
            Command::Page(page) => {
                self.controller.go_to_page(page);
                self.draw()?;
            }
            Command::Find(text) => {
                self.controller.set_filter(text);
                self.draw()?;
            }
            Command::Theme(value) => {
                self.set_theme(value.unwrap_or(!self.dark_mode));
                self.draw()?;
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
        Ok(())
    }

    async fn open(&mut self, number: usize) -> Result<()> {
        let row = number
            .checked_sub(1)
            .and_then(|index| self.controller.view().visible_rows().nth(index));
        let Some(row) = row else {
            println!("no row {number}");
            return Ok(());
        };

        if let Some(target) = row.target.location().cloned() {
            return self.navigate(target).await;
        }
        if let Some(url) = row.target.url() {
            println!("{url}");
        }
        Ok(())
    }

    async fn navigate(&mut self, location: Location) -> Result<()> {
        let ticket = self.controller.begin_navigate(location);
        self.load(ticket).await
    }

    async fn load(&mut self, ticket: FetchTicket) -> Result<()> {
        self.draw()?;
        let result = self.source.fetch(ticket.query()).await;
        if self.controller.complete(ticket, result) != Outcome::Stale {
            self.draw()?;
        }
        Ok(())
    }

    fn set_theme(&mut self, dark_mode: bool) {
        self.dark_mode = dark_mode;
        if let Some(store) = &self.preferences {
            if let Err(e) = store.set_dark_mode(dark_mode) {
                warn!(error = %e, "failed to save theme preference");
            }
        }
    }

    fn draw(&self) -> Result<()> {
        let mut out = std::io::stdout().lock();
        render(&mut out, self.controller.view(), Palette::for_theme(self.dark_mode))?;
        out.flush()?;
        Ok(())
    }
}

fn prompt() -> Result<()> {
    let mut out = std::io::stdout().lock();
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}
