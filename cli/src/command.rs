use habit_core::Frequency;

pub const HELP: &str = "\
commands:
  add [daily|weekly] <name>   add a habit
  done <id>                   mark a habit complete
  rm <id>                     delete a habit
  refresh                     reload habits and stats
  help                        show this text
  quit                        leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `frequency` of `None` keeps whatever the form already holds.
    Add {
        frequency: Option<Frequency>,
        name: String,
    },
    Done(i64),
    Remove(i64),
    Refresh,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.trim().is_empty() {
        return Ok(None);
    }
    let (word, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));

    let command = match word {
        "add" => parse_add(rest),
        "done" => Command::Done(parse_id(rest)?),
        "rm" => Command::Remove(parse_id(rest)?),
        "refresh" => Command::Refresh,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(command))
}

fn parse_add(rest: &str) -> Command {
    let rest = rest.trim_start();
    let (first, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    match first.parse::<Frequency>() {
        Ok(frequency) => Command::Add {
            frequency: Some(frequency),
            name: tail.trim_start().to_string(),
        },
        Err(_) => Command::Add {
            frequency: None,
            name: rest.to_string(),
        },
    }
}

fn parse_id(rest: &str) -> Result<i64, String> {
    let raw = rest.trim();
    raw.parse()
        .map_err(|_| format!("expected a habit id, got {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse(""), Ok(None));
        assert_eq!(parse("   \n"), Ok(None));
    }

    #[test]
    fn add_with_frequency() {
        assert_eq!(
            parse("add weekly Call grandma\n"),
            Ok(Some(Command::Add {
                frequency: Some(Frequency::Weekly),
                name: "Call grandma".to_string(),
            }))
        );
    }

    #[test]
    fn add_without_frequency_keeps_whole_name() {
        assert_eq!(
            parse("add Read for 30 minutes"),
            Ok(Some(Command::Add {
                frequency: None,
                name: "Read for 30 minutes".to_string(),
            }))
        );
    }

    #[test]
    fn add_with_only_frequency_has_blank_name() {
        assert_eq!(
            parse("add daily"),
            Ok(Some(Command::Add {
                frequency: Some(Frequency::Daily),
                name: String::new(),
            }))
        );
    }

    #[test]
    fn ids_must_be_numeric() {
        assert_eq!(parse("done 12"), Ok(Some(Command::Done(12))));
        assert_eq!(parse("rm 3"), Ok(Some(Command::Remove(3))));
        assert!(parse("rm three").is_err());
        assert!(parse("done").is_err());
    }

    #[test]
    fn unknown_command() {
        assert_eq!(parse("dance"), Err("unknown command: dance".to_string()));
    }

    #[test]
    fn quit_aliases() {
        assert_eq!(parse("quit"), Ok(Some(Command::Quit)));
        assert_eq!(parse("exit"), Ok(Some(Command::Quit)));
    }
}
