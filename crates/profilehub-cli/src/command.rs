use anyhow::{anyhow, bail, Result};

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Signup { email: Option<String> },
    Login { email: Option<String> },
    Logout,
    Status,
    Profile,
    Bio { text: String },
    Interests,
    AllInterests,
    SetInterests { ids: Vec<i64> },
    Help,
}

pub const USAGE: &str = "\
Usage: profilehub <command>

Commands:
  signup [email]            Create an account
  login [email]             Log in and store session tokens
  logout                    Forget stored session tokens
  status                    Show login state and API endpoint
  profile                   Show profile and interests
  bio <text...>             Replace the profile bio
  interests                 Show your interests by category
  interests --all           Show every interest with its id
  interests set <id>...     Replace your interests with the given ids
  help                      Show this message

Environment:
  PROFILEHUB_API_BASE_URL      API base URL (default http://localhost:8000/api)
  PROFILEHUB_PASSWORD          Password for login/signup instead of prompting
  PROFILEHUB_STORE_PASSPHRASE  Encrypt the session file with this passphrase
  PROFILEHUB_LOG_DIR           Also write logs to a daily file in this directory
  RUST_LOG                     Log filter (default warn)";

impl Command {
    /// Parse arguments, excluding the program name
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some(name) = args.first() else {
            return Ok(Command::Help);
        };
        let rest = &args[1..];

        let command = match name.as_str() {
            "signup" => Command::Signup {
                email: optional_single(rest)?,
            },
            "login" => Command::Login {
                email: optional_single(rest)?,
            },
            "logout" => no_args(rest, Command::Logout)?,
            "status" => no_args(rest, Command::Status)?,
            "profile" => no_args(rest, Command::Profile)?,
            "bio" => {
                if rest.is_empty() {
                    bail!("bio requires the new bio text");
                }
                Command::Bio {
                    text: rest.join(" "),
                }
            }
            "interests" => match rest.first().map(String::as_str) {
                None => Command::Interests,
                Some("--all") => no_args(&rest[1..], Command::AllInterests)?,
                Some("set") => Command::SetInterests {
                    ids: parse_ids(&rest[1..])?,
                },
                Some(other) => bail!("Unknown interests option: {}", other),
            },
            "help" | "--help" | "-h" => Command::Help,
            other => bail!("Unknown command: {}", other),
        };
        Ok(command)
    }
}

fn no_args(rest: &[String], command: Command) -> Result<Command> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(anyhow!("Unexpected argument: {}", rest[0]))
    }
}

fn optional_single(rest: &[String]) -> Result<Option<String>> {
    match rest {
        [] => Ok(None),
        [value] => Ok(Some(value.clone())),
        [_, extra, ..] => Err(anyhow!("Unexpected argument: {}", extra)),
    }
}

fn parse_ids(values: &[String]) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(values.len());
    for value in values {
        let id: i64 = value
            .parse()
            .map_err(|_| anyhow!("Invalid interest id: {}", value))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
