//! Subcommand bodies. Each writes to the given sink so output can be
//! checked without a terminal.

use std::io::{self, Write};
use std::ops::ControlFlow;
use std::time::Duration;

use chrono::Local;
use clap::Subcommand;

use rollcall_core::{
    Category, Roster, Session, SessionError, StatusStore, SubmitOutcome, SyncEngine,
};

use crate::render;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum StatusArgs {
    /// Present in the room
    InRoom {
        /// Planned departure (HH:MM, 24-hour)
        #[arg(long, value_name = "HH:MM")]
        leave: Option<String>,
    },

    /// Away, optionally with an expected arrival and a reason
    NotInRoom {
        /// Earliest arrival (HH:MM, 24-hour)
        #[arg(long, value_name = "HH:MM")]
        arrive: Option<String>,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Excused by another member
    RolledOut {
        /// Who rolled them out
        #[arg(long, value_name = "NAME")]
        by: Option<String>,
    },
}

pub fn board<S: StatusStore, W: Write>(
    engine: &mut SyncEngine<S>,
    out: &mut W,
) -> Result<(), CommandError> {
    let outcome = engine.pull();
    let board = engine.board(&Local::now());
    write!(out, "{}", render::board(&board, outcome))?;
    Ok(())
}

/// Redraws the board after every pull until stdout goes away.
pub fn watch<S: StatusStore, W: Write>(
    engine: &mut SyncEngine<S>,
    interval: Duration,
    out: &mut W,
) -> Result<(), CommandError> {
    let mut failure = None;
    engine.run(interval, |board, outcome| {
        let frame = format!("{}{}", CLEAR_SCREEN, render::board(board, outcome));
        match out.write_all(frame.as_bytes()).and_then(|_| out.flush()) {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => {
                failure = Some(err);
                ControlFlow::Break(())
            }
        }
    });
    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

pub fn set<S: StatusStore, W: Write>(
    engine: &mut SyncEngine<S>,
    roster: &Roster,
    member: &str,
    args: StatusArgs,
    out: &mut W,
) -> Result<SubmitOutcome, CommandError> {
    engine.pull();

    let mut session = Session::new(roster.clone());
    session.select(Some(member), engine.statuses())?;
    match args {
        StatusArgs::InRoom { leave } => {
            session.choose(Category::InRoom)?;
            if let Some(leave) = leave {
                session.set_leave_time(&leave)?;
            }
        }
        StatusArgs::NotInRoom { arrive, reason } => {
            session.choose(Category::NotInRoom)?;
            if let Some(arrive) = arrive {
                session.set_arrival_time(&arrive)?;
            }
            if let Some(reason) = reason {
                session.set_reason(&reason)?;
            }
        }
        StatusArgs::RolledOut { by } => {
            session.choose(Category::RolledOut)?;
            if let Some(by) = by {
                session.set_rolled_out_by(&by)?;
            }
        }
    }

    let outcome = session.submit(engine)?;
    let label = session.editing().map(|category| category.label()).unwrap_or_default();
    report(out, outcome, &format!("{} is now {}", member.trim(), label))?;
    Ok(outcome)
}

pub fn clear<S: StatusStore, W: Write>(
    engine: &mut SyncEngine<S>,
    roster: &Roster,
    member: &str,
    out: &mut W,
) -> Result<SubmitOutcome, CommandError> {
    let member = member.trim();
    if !roster.contains(member) {
        return Err(SessionError::UnknownMember(member.to_string()).into());
    }

    let outcome = engine.remove(member);
    report(out, outcome, &format!("Cleared status for {}", member))?;
    Ok(outcome)
}

pub fn roster<S: StatusStore, W: Write>(
    engine: &mut SyncEngine<S>,
    roster: &Roster,
    out: &mut W,
) -> Result<(), CommandError> {
    engine.pull();
    write!(out, "{}", render::roster(roster, engine.statuses()))?;
    Ok(())
}

fn report<W: Write>(out: &mut W, outcome: SubmitOutcome, message: &str) -> io::Result<()> {
    match outcome {
        SubmitOutcome::Stored => writeln!(out, "{}", message),
        SubmitOutcome::LocalOnly => writeln!(
            out,
            "{} (server unreachable, saved on this machine only)",
            message
        ),
    }
}
