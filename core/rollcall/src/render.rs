//! Plain-text board rendering.

use rollcall_core::board::EMPTY_BOARD_MESSAGE;
use rollcall_core::{Board, Listing, PullOutcome, Roster, StatusMap};

pub fn board(board: &Board, outcome: PullOutcome) -> String {
    let mut out = String::new();

    match outcome {
        PullOutcome::Remote => {}
        PullOutcome::Cached => out.push_str("(offline: showing cached statuses)\n"),
        PullOutcome::Unchanged => out.push_str("(offline: no cached statuses)\n"),
    }

    out.push_str(&format!(
        "In the room: {} ({} present, {} rolled out)\n",
        board.effective_total(),
        board.present_count,
        board.rolled_out_count
    ));
    out.push_str(&format!("Minimum needed: {}\n", board.required));
    out.push_str(&board.quorum.message());
    out.push_str("\n\n");

    match &board.listing {
        Listing::NobodyCheckedIn => {
            out.push_str(EMPTY_BOARD_MESSAGE);
            out.push('\n');
        }
        Listing::Entries(entries) => {
            for entry in entries {
                out.push_str(&format!("{} [{}]\n", entry.name, entry.badge()));
                for detail in &entry.details {
                    out.push_str(&format!("    {}\n", detail));
                }
            }
        }
    }
    out
}

/// One line per roster member; members without a record show a dash.
pub fn roster(roster: &Roster, statuses: &StatusMap) -> String {
    let width = roster.names().iter().map(|name| name.chars().count()).max().unwrap_or(0);
    roster
        .names()
        .iter()
        .map(|name| {
            let label = statuses
                .get(name)
                .map(|record| record.category().label())
                .unwrap_or("-");
            format!("{:<width$}  {}\n", name, label, width = width)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rollcall_core::{aggregate, ClockTime, QuorumPolicy, StatusRecord};

    fn at(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn empty_board_says_nobody_checked_in() {
        let board = aggregate(&StatusMap::new(), &at(12), &QuorumPolicy::default());
        let text = super::board(&board, PullOutcome::Remote);

        assert!(text.starts_with("In the room: 0 (0 present, 0 rolled out)\n"));
        assert!(text.contains("Minimum needed: 13\n"));
        assert!(text.contains("Need 13 more people\n"));
        assert!(text.ends_with("No one has checked in yet\n"));
    }

    #[test]
    fn entries_show_badge_and_details() {
        let mut statuses = StatusMap::new();
        statuses.insert("DJ".into(), StatusRecord::in_room(ClockTime::new(23, 30)));
        statuses.insert(
            "Alex Nania".into(),
            StatusRecord::not_in_room(ClockTime::new(20, 0), Some("Class")),
        );
        let board = aggregate(&statuses, &at(22), &QuorumPolicy::default());

        let text = super::board(&board, PullOutcome::Cached);

        assert!(text.starts_with("(offline: showing cached statuses)\n"));
        assert!(text.contains("Minimum needed: 20\nNeed 19 more people\n"));
        assert!(text.contains(
            "DJ [In Room]\n    Leaving at: 11:30 PM\nAlex Nania [Not In Room]\n    Can come at: 8:00 PM\n    Reason: Class\n"
        ));
    }

    #[test]
    fn roster_marks_members_without_records() {
        let roster = Roster::new(["DJ", "Owen Rowe"]);
        let mut statuses = StatusMap::new();
        statuses.insert("Owen Rowe".into(), StatusRecord::rolled_out(None));

        assert_eq!(
            super::roster(&roster, &statuses),
            "DJ         -\nOwen Rowe  Rolled Out\n"
        );
    }
}
