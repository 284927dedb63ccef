//! Stdin command parsing

use anyhow::{Context, Result, bail};
use mailwidget::{ComposeField, Filter, MailId, SortKey};
use std::path::PathBuf;
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  search <text>        type into the search box (empty clears)
  filter <all|unread|attachments>
  sort <sender|subject|date>   click a column header
  dir                  flip the sort direction
  size <n>             rows per page
  next | prev          change page
  open <id> | close    read a mail
  delete <id> [no]     delete a mail (\"no\" declines the prompt)
  compose | cancel     start or discard a draft
  to|subject|body <text>
  attach <path>        add a file to the draft
  remove <slot>        remove an attachment slot
  send                 send the draft
  show | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Filter(Filter),
    Sort(SortKey),
    Dir,
    Size(usize),
    Next,
    Prev,
    Open(MailId),
    Close,
    Delete { id: MailId, confirm: bool },
    Compose,
    Field(ComposeField, String),
    Attach(PathBuf),
    Remove(usize),
    Send,
    Cancel,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match name {
            "search" | "/" => Command::Search(rest.to_string()),
            "filter" => Command::Filter(rest.parse()?),
            "sort" => Command::Sort(rest.parse()?),
            "dir" => Command::Dir,
            "size" => Command::Size(
                rest.parse()
                    .with_context(|| format!("Page size must be a number, got {:?}", rest))?,
            ),
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Prev,
            "open" => Command::Open(required_id(rest)?),
            "close" => Command::Close,
            "delete" | "rm" => {
                let (id, answer) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let confirm = match answer.trim() {
                    "" | "yes" | "y" => true,
                    "no" | "n" => false,
                    other => bail!("Expected yes or no, got {:?}", other),
                };
                Command::Delete {
                    id: required_id(id)?,
                    confirm,
                }
            }
            "compose" => Command::Compose,
            "to" => Command::Field(ComposeField::To, rest.to_string()),
            "subject" => Command::Field(ComposeField::Subject, rest.to_string()),
            "body" => Command::Field(ComposeField::Body, rest.replace("\\n", "\n")),
            "attach" => {
                if rest.is_empty() {
                    bail!("attach needs a file path");
                }
                Command::Attach(PathBuf::from(rest))
            }
            "remove" => Command::Remove(
                rest.parse()
                    .with_context(|| format!("Slot must be a number, got {:?}", rest))?,
            ),
            "send" => Command::Send,
            "cancel" => Command::Cancel,
            "show" | "" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => bail!("Unknown command {:?}; type help for a list", other),
        };
        Ok(command)
    }
}

fn required_id(s: &str) -> Result<MailId> {
    let s = s.trim();
    if s.is_empty() {
        bail!("Missing mail id");
    }
    Ok(MailId::new(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_commands() {
        assert_eq!("search  hello world ".parse::<Command>().unwrap(), Command::Search("hello world".into()));
        assert_eq!("search".parse::<Command>().unwrap(), Command::Search(String::new()));
        assert_eq!("filter unread".parse::<Command>().unwrap(), Command::Filter(Filter::Unread));
        assert_eq!("sort from".parse::<Command>().unwrap(), Command::Sort(SortKey::Sender));
        assert_eq!("size 20".parse::<Command>().unwrap(), Command::Size(20));
        assert!("size many".parse::<Command>().is_err());
        assert!("filter starred".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_delete() {
        assert_eq!(
            "delete 42".parse::<Command>().unwrap(),
            Command::Delete { id: MailId::new("42"), confirm: true }
        );
        assert_eq!(
            "delete 42 no".parse::<Command>().unwrap(),
            Command::Delete { id: MailId::new("42"), confirm: false }
        );
        assert!("delete".parse::<Command>().is_err());
        assert!("delete 42 maybe".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_compose_commands() {
        assert_eq!(
            "body line one\\nline two".parse::<Command>().unwrap(),
            Command::Field(ComposeField::Body, "line one\nline two".into())
        );
        assert_eq!("remove 1".parse::<Command>().unwrap(), Command::Remove(1));
        assert!("attach".parse::<Command>().is_err());
        assert!("frobnicate".parse::<Command>().is_err());
        assert_eq!("".parse::<Command>().unwrap(), Command::Show);
    }
}
