//! Terminal presenter: draws the board on stdout.

use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};
use strictly_chess::{Notice, Occupant, Presenter, Side, Snapshot};
use tracing::warn;

const FILES: &str = "abcdefgh";

/// Draws the board from the local participant's point of view.
///
/// Both participants see their own pieces at the bottom and read coordinates
/// the same way they type them.
pub struct TerminalPresenter<W: Write + Send = io::Stdout> {
    out: W,
    colored: bool,
}

impl TerminalPresenter {
    /// Presenter writing coloured output to stdout.
    pub fn stdout() -> Self {
        Self {
            out: io::stdout(),
            colored: true,
        }
    }
}

impl<W: Write + Send> TerminalPresenter<W> {
    /// Presenter writing plain text to `out`.
    pub fn plain(out: W) -> Self {
        Self {
            out,
            colored: false,
        }
    }

    fn draw(&mut self, snapshot: &Snapshot, viewer: Side) -> io::Result<()> {
        let border = |left: char, mid: char, right: char| {
            let mut line = format!("  {}", left);
            for file in 0..8 {
                line.push_str("───");
                line.push(if file == 7 { right } else { mid });
            }
            line
        };

        writeln!(self.out)?;
        writeln!(self.out, "{}", file_labels())?;
        writeln!(self.out, "{}", border('┌', '┬', '┐'))?;
        for row in 0..8u8 {
            let rank = 7 - row;
            write!(self.out, "{} │", rank + 1)?;
            for file in 0..8u8 {
                let occupant = square_at(snapshot, viewer, file, rank);
                self.piece(occupant)?;
                write!(self.out, "│")?;
            }
            writeln!(self.out, " {}", rank + 1)?;
            if row < 7 {
                writeln!(self.out, "{}", border('├', '┼', '┤'))?;
            }
        }
        writeln!(self.out, "{}", border('└', '┴', '┘'))?;
        writeln!(self.out, "{}", file_labels())?;
        if let Some(kind) = snapshot.last_capture {
            writeln!(self.out, "Captured: {}", kind)?;
        }
        self.out.flush()
    }

    fn piece(&mut self, occupant: Option<Occupant>) -> io::Result<()> {
        let Some(occupant) = occupant else {
            return write!(self.out, "   ");
        };
        if !self.colored {
            let glyph = match occupant.side {
                Side::First => occupant.kind.glyph(),
                Side::Second => occupant
                    .kind
                    .letter()
                    .map_or('p', |letter| letter.to_ascii_lowercase()),
            };
            return write!(self.out, " {} ", glyph);
        }
        queue!(
            self.out,
            SetForegroundColor(side_color(occupant.side)),
            Print(format!(" {} ", occupant.kind.glyph())),
            ResetColor
        )
    }

    fn message(&mut self, notice: &Notice) -> io::Result<()> {
        let color = match notice {
            Notice::Check | Notice::Lost { .. } | Notice::SyntaxError => Some(Color::Red),
            Notice::Won => Some(Color::Green),
            Notice::Waiting { .. } | Notice::WrapUp => None,
        };
        match color {
            Some(color) if self.colored => queue!(
                self.out,
                SetForegroundColor(color),
                Print(notice.to_string()),
                ResetColor,
                Print("\n")
            )?,
            _ => writeln!(self.out, "{}", notice)?,
        }
        self.out.flush()
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn render(&mut self, snapshot: &Snapshot, viewer: Side) {
        if let Err(e) = self.draw(snapshot, viewer) {
            warn!(error = %e, "Failed to draw board");
        }
    }

    fn notify(&mut self, notice: &Notice) {
        if let Err(e) = self.message(notice) {
            warn!(error = %e, "Failed to print notice");
        }
    }
}

fn file_labels() -> String {
    let mut line = String::from("  ");
    for file in FILES.chars() {
        line.push_str(&format!("  {} ", file));
    }
    line
}

/// Occupant of the square the viewer calls (`file`, `rank`).
fn square_at(snapshot: &Snapshot, viewer: Side, file: u8, rank: u8) -> Option<Occupant> {
    let (file, rank) = if viewer.is_mirrored() {
        (7 - file, 7 - rank)
    } else {
        (file, rank)
    };
    let index = usize::from(rank) * 8 + usize::from(file);
    snapshot.board.get(index).and_then(|square| square.occupant)
}

fn side_color(side: Side) -> Color {
    match side {
        Side::First => Color::White,
        Side::Second => Color::DarkYellow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_chess::{RulesEngine, ShakmatyEngine};

    fn rendered(viewer: Side) -> Vec<String> {
        let mut engine = ShakmatyEngine::new();
        engine.apply_move("e4").unwrap();
        let snapshot = Snapshot::new(engine.status(), None);

        let mut presenter = TerminalPresenter::plain(Vec::new());
        presenter.render(&snapshot, viewer);
        String::from_utf8(presenter.out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn row<'a>(lines: &'a [String], rank: char) -> &'a str {
        lines
            .iter()
            .find(|line| line.starts_with(rank))
            .map(String::as_str)
            .unwrap()
    }

    #[test]
    fn test_first_side_sees_own_pieces_at_bottom() {
        let lines = rendered(Side::First);
        assert!(row(&lines, '1').contains('♚'));
        assert!(row(&lines, '8').contains(" k "));
        // e4 pawn in the fifth column
        let cells: Vec<&str> = row(&lines, '4').split('│').collect();
        assert_eq!(cells[5].trim(), "♟");
    }

    #[test]
    fn test_second_side_sees_mirrored_board() {
        let lines = rendered(Side::Second);
        assert!(row(&lines, '1').contains(" k "));
        assert!(row(&lines, '8').contains('♚'));
        // Canonical e4 is d5 from the second side.
        let cells: Vec<&str> = row(&lines, '5').split('│').collect();
        assert_eq!(cells[4].trim(), "♟");
    }

    #[test]
    fn test_notice_is_printed() {
        let mut presenter = TerminalPresenter::plain(Vec::new());
        presenter.notify(&Notice::Check);
        assert_eq!(String::from_utf8(presenter.out).unwrap(), "CHECK!\n");
    }
}
