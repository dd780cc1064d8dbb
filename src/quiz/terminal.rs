use std::io::{self, BufRead, Write};

use itertools::Itertools;

use super::session::{Advance, QuizResult, QuizSession, SessionError};

/// Plays the session on a line-based terminal. Each answer line lists option
/// ids separated by spaces or commas. Returns `None` when input ends early.
pub fn play<R: BufRead, W: Write>(
    session: &mut QuizSession,
    mut input: R,
    mut output: W,
) -> io::Result<Option<QuizResult>> {
    loop {
        let Some(question) = session.current() else {
            return Ok(Some(session.result()));
        };
        let (position, total) = session.position();
        writeln!(
            output,
            "\n[{position}/{total}] {} · {} · {}",
            question.category, question.chapter, question.kind
        )?;
        writeln!(output, "{}", question.text)?;
        for option in &question.options {
            writeln!(output, "  {}) {}", option.id, option.text)?;
        }

        let feedback = loop {
            write!(output, "> ")?;
            output.flush()?;
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let picked: Vec<&str> = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .collect();
            match pick_all(session, &picked) {
                Ok(()) => match session.submit() {
                    Ok(feedback) => break feedback,
                    Err(e) => writeln!(output, "{e}")?,
                },
                Err(e) => writeln!(output, "{e}")?,
            }
        };

        if feedback.correct {
            writeln!(output, "Correct!")?;
        } else {
            writeln!(
                output,
                "Wrong, the answer is {}",
                feedback.correct_option_ids.iter().join(", ")
            )?;
        }
        writeln!(output, "{}", feedback.explanation)?;

        if let Advance::Finished(result) = session
            .advance()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
        {
            writeln!(
                output,
                "\n{}% · {} / {} correct",
                result.percent, result.score, result.total
            )?;
            return Ok(Some(result));
        }
    }
}

// every line is a fresh selection
fn pick_all(session: &mut QuizSession, picked: &[&str]) -> Result<(), SessionError> {
    session.clear_selection();
    for id in picked.iter().unique() {
        session.select(id)?;
    }
    Ok(())
}
