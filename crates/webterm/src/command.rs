//! Parsing of lines typed at the REPL.
//!
//! Lines starting with `:` are meta-commands; everything else goes to the
//! remote shell. A leading `::` sends a literal `:`.

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Send to the remote shell
    Submit(String),
    /// `:connect HOST:USER:PASS`
    Connect(String),
    /// `:disconnect`
    Disconnect,
    /// `:clear`
    Clear,
    /// `:interrupt`
    Interrupt,
    /// `:prev`
    Previous,
    /// `:next`
    Next,
    /// `:history`
    History,
    /// `:status`
    Status,
    /// `:help`
    Help,
    /// `:quit`
    Quit,
    /// Unrecognized meta-command
    Unknown(String),
}

impl Input {
    /// Classify a line read from stdin.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(literal) = line.strip_prefix("::") {
            return Self::Submit(format!(":{literal}"));
        }
        let Some(meta) = line.strip_prefix(':') else {
            return Self::Submit(line.to_string());
        };

        let (name, arg) = meta
            .trim()
            .split_once(char::is_whitespace)
            .map_or((meta.trim(), ""), |(name, arg)| (name, arg.trim()));

        match name {
            "connect" | "c" => Self::Connect(arg.to_string()),
            "disconnect" | "d" => Self::Disconnect,
            "clear" => Self::Clear,
            "interrupt" | "int" => Self::Interrupt,
            "prev" | "p" => Self::Previous,
            "next" | "n" => Self::Next,
            "history" | "h" => Self::History,
            "status" | "s" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Help text for `:help`.
pub const HELP: &str = "\
Commands:
  :connect HOST:USER:PASS   open a session
  :disconnect               close the session
  :interrupt                send Ctrl-C (also bound to Ctrl-C)
  :prev / :next             recall history into the input line
  :history                  list submitted commands
  :clear                    clear the transcript
  :status                   show state, target and elapsed time
  :quit                     disconnect and exit
Any other line is sent to the remote shell. Start a line with :: to send a literal ':'.";
