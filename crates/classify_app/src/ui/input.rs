use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  select <path>   pick an image file
  submit          classify the selected image
  reset           clear the image and any result
  dismiss         close the error banner
  health          re-check the server
  categories      list the classes the server knows
  show            redraw the current screen
  help            show this text
  quit            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(PathBuf),
    Submit,
    Reset,
    Dismiss,
    Health,
    Categories,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("empty input")]
    Empty,
    #[error("`select` needs a file path")]
    MissingPath,
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
}

pub fn parse_command(line: &str) -> Result<Command, InputError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Err(InputError::Empty),
        "select" | "open" => {
            let path = rest.trim_matches(|c| c == '"' || c == '\'');
            if path.is_empty() {
                Err(InputError::MissingPath)
            } else {
                Ok(Command::Select(PathBuf::from(path)))
            }
        }
        "submit" | "classify" => Ok(Command::Submit),
        "reset" | "clear" => Ok(Command::Reset),
        "dismiss" => Ok(Command::Dismiss),
        "health" => Ok(Command::Health),
        "categories" => Ok(Command::Categories),
        "show" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(InputError::Unknown(other.to_string())),
    }
}
