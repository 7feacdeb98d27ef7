use nom::{
    bytes::complete::take_till1,
    character::complete::{digit1, space1},
    combinator::{all_consuming, map_res, opt, rest},
    sequence::{preceded, tuple},
    IResult,
};

use crate::calendar::{DateKey, MonthIndex};
use crate::error::{Error, ErrorKind, Result};
use crate::selection::{Action, Direction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Actions(Vec<Action>),
    Quit,
}

pub enum Handler {
    Arg(fn(&MonthIndex, &str) -> Result<Command>),
    NoArg(fn() -> Command),
    Repeatable(fn(u32) -> Command),
}

/// Turns one input line into a command. Day numbers given to `select`
/// refer to the displayed month.
pub struct CommandParser<'a> {
    displayed: &'a MonthIndex,
}

/// Upper bound for a count prefix such as `12n`, one century of months.
const MAX_REPEAT: u32 = 1200;

fn split_command(input: &str) -> IResult<&str, (Option<u32>, &str, Option<&str>)> {
    all_consuming(tuple((
        opt(map_res(digit1, str::parse::<u32>)),
        take_till1(|c: char| c.is_whitespace()),
        opt(preceded(space1, rest)),
    )))(input)
}

fn find_handler(name: &str) -> Option<&'static Handler> {
    COMMANDS
        .iter()
        .find(|(names, _)| names.contains(&name))
        .map(|(_, handler)| handler)
}

fn unknown(cmd: &str) -> Error {
    Error::new(ErrorKind::CommandParse, &format!("'{}'", cmd))
}

impl<'a> CommandParser<'a> {
    pub fn new(displayed: &'a MonthIndex) -> Self {
        CommandParser { displayed }
    }

    pub fn run_command(&self, cmd: &str) -> Result<Command> {
        let cmd = cmd.trim_start();
        if cmd.trim().is_empty() {
            return Ok(Command::Actions(Vec::new()));
        }

        let (_, (repeat, name, arg)) = split_command(cmd).map_err(|_| unknown(cmd))?;
        let handler = find_handler(name).ok_or_else(|| unknown(name))?;

        // trailing blanks only count as an argument for commands that take one
        let bare_arg = arg.filter(|a| !a.trim().is_empty());

        match (handler, repeat, bare_arg) {
            (Handler::Repeatable(act), repeat, None) => {
                let count = repeat.unwrap_or(1);
                if count > MAX_REPEAT {
                    return Err(Error::new(
                        ErrorKind::CommandParse,
                        &format!("count {} for '{}' exceeds {}", count, name, MAX_REPEAT),
                    ));
                }
                Ok(act(count))
            }
            (Handler::NoArg(act), None, None) => Ok(act()),
            (Handler::Arg(act), None, _) => act(self.displayed, arg.unwrap_or("")),
            (Handler::Repeatable(_), _, Some(_))
            | (Handler::NoArg(_), _, _)
            | (Handler::Arg(_), Some(_), _) => Err(Error::new(
                ErrorKind::CommandParse,
                &format!("unexpected argument or count for '{}'", name),
            )),
        }
    }
}

fn parse_day(displayed: &MonthIndex, arg: &str) -> Result<DateKey> {
    let arg = arg.trim();

    if let Ok(day) = arg.parse::<u32>() {
        return DateKey::from_ymd(
            displayed.year(),
            displayed.month().number_from_month(),
            day,
        )
        .ok_or_else(|| {
            Error::new(
                ErrorKind::DateParse,
                &format!("{} has no day {}", displayed.first_day().format("%B %Y"), day),
            )
        });
    }

    arg.parse::<DateKey>()
}

fn repeated(action: Action, count: u32) -> Command {
    Command::Actions(std::iter::repeat(action).take(count as usize).collect())
}

const COMMANDS: &[(&[&str], Handler)] = &[
    (
        &["n", "next"],
        Handler::Repeatable(|p| repeated(Action::NavigateMonth(Direction::Next), p)),
    ),
    (
        &["p", "prev"],
        Handler::Repeatable(|p| repeated(Action::NavigateMonth(Direction::Prev), p)),
    ),
    (
        &["t", "today"],
        Handler::NoArg(|| Command::Actions(vec![Action::GoToToday])),
    ),
    (
        &["s", "select"],
        Handler::Arg(|m, arg| {
            Ok(Command::Actions(vec![Action::SelectDate(parse_day(m, arg)?)]))
        }),
    ),
    (
        &["e", "edit"],
        Handler::NoArg(|| Command::Actions(vec![Action::BeginEdit])),
    ),
    (
        &["w", "write"],
        Handler::Arg(|_, arg| Ok(Command::Actions(vec![Action::ChangeDraft(arg.to_owned())]))),
    ),
    (
        &["save"],
        Handler::NoArg(|| Command::Actions(vec![Action::SaveMemo])),
    ),
    (
        &["d", "delete"],
        Handler::NoArg(|| Command::Actions(vec![Action::DeleteMemo])),
    ),
    (&["q", "quit"], Handler::NoArg(|| Command::Quit)),
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Month;

    fn parse(cmd: &str) -> Result<Command> {
        let feb = MonthIndex::new(Month::February, 2024).unwrap();
        CommandParser::new(&feb).run_command(cmd)
    }

    fn actions(cmd: &str) -> Vec<Action> {
        match parse(cmd).unwrap() {
            Command::Actions(actions) => actions,
            Command::Quit => panic!("'{}' parsed as quit", cmd),
        }
    }

    #[test]
    fn navigation_with_count() {
        assert_eq!(actions("n"), vec![Action::NavigateMonth(Direction::Next)]);
        assert_eq!(actions("prev"), vec![Action::NavigateMonth(Direction::Prev)]);
        assert_eq!(
            actions("3n"),
            vec![Action::NavigateMonth(Direction::Next); 3]
        );
    }

    #[test]
    fn select_by_day_or_date() {
        let feb14 = "2024-02-14".parse::<DateKey>().unwrap();
        assert_eq!(actions("s 14"), vec![Action::SelectDate(feb14)]);
        assert_eq!(actions("select 2024-02-14"), vec![Action::SelectDate(feb14)]);
        assert_eq!(
            actions("s 2024-03-02"),
            vec![Action::SelectDate("2024-03-02".parse().unwrap())]
        );
    }

    #[test]
    fn select_rejects_day_outside_month() {
        assert!(parse("s 30").is_err());
        assert!(parse("s").is_err());
        assert!(parse("s tomorrow").is_err());
    }

    #[test]
    fn write_keeps_text_verbatim() {
        assert_eq!(
            actions("w  Dentist at 10:00 "),
            vec![Action::ChangeDraft("Dentist at 10:00 ".to_owned())]
        );
        assert_eq!(actions("w"), vec![Action::ChangeDraft(String::new())]);
    }

    #[test]
    fn simple_commands() {
        assert_eq!(actions("save"), vec![Action::SaveMemo]);
        assert_eq!(actions("e"), vec![Action::BeginEdit]);
        assert_eq!(actions("delete"), vec![Action::DeleteMemo]);
        assert_eq!(actions("today"), vec![Action::GoToToday]);
        assert_eq!(parse("q").unwrap(), Command::Quit);
        assert!(actions("   ").is_empty());
    }

    #[test]
    fn count_is_capped() {
        assert_eq!(actions("1200p").len(), 1200);
        assert!(parse("1201p").is_err());
        assert!(parse("999999999n").is_err());
    }

    #[test]
    fn trailing_blanks_after_bare_commands() {
        assert_eq!(actions("save "), vec![Action::SaveMemo]);
        assert_eq!(actions("n \t"), vec![Action::NavigateMonth(Direction::Next)]);
        assert_eq!(actions("2p  "), vec![Action::NavigateMonth(Direction::Prev); 2]);
        assert_eq!(parse("q ").unwrap(), Command::Quit);
        assert_eq!(actions("w "), vec![Action::ChangeDraft(String::new())]);
    }

    #[test]
    fn rejects_unknown_and_misused_commands() {
        assert!(parse("jump").is_err());
        assert!(parse("2save").is_err());
        assert!(parse("save now").is_err());
        assert!(parse("n 2").is_err());
    }
}
