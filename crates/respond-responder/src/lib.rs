//! respond-responder: runtime-registered trigger → response replies.
//!
//! Users teach the robot with `respond to <trigger> with <response>`,
//! remove with `delete respond to <trigger>` and inspect with
//! `list responds`. Any later message containing a registered trigger as a
//! whole token gets the stored response.

pub mod command;
pub mod matcher;
pub mod store;

use std::sync::Arc;

use respond_config::{RespondConfig, RobotConfig};
use respond_storage::Brain;
use respond_types::{InboundMessage, OutboundMessage};

pub use command::{Command, CommandError, CommandParser};
pub use matcher::TriggerMatcher;
pub use store::{ResponseStore, StoreError, Upsert};

#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid robot name pattern: {0}")]
    RobotName(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, ResponderError>;

/// Usage lines for the commands a robot called `name` understands.
pub fn help_lines(name: &str) -> Vec<String> {
    vec![
        format!(
            "{name} respond to <text> with <response> - reply <response> whenever <text> is said"
        ),
        format!("{name} delete respond to <text> - stop replying to <text>"),
        format!("{name} list responds - show every registered respond"),
    ]
}

/// Handles respond commands and trigger replies for one robot.
pub struct Responder {
    robot_name: String,
    parser: CommandParser,
    store: ResponseStore,
}

impl Responder {
    pub fn new(robot: &RobotConfig, brain: Arc<dyn Brain>, brain_key: &str) -> Result<Self> {
        Ok(Self {
            robot_name: robot.name.clone(),
            parser: CommandParser::new(&robot.name, robot.alias.as_deref())?,
            store: ResponseStore::new(brain, brain_key),
        })
    }

    pub fn from_config(config: &RespondConfig, brain: Arc<dyn Brain>) -> Result<Self> {
        Self::new(&config.robot, brain, &config.brain.key)
    }

    pub fn robot_name(&self) -> &str {
        &self.robot_name
    }

    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    /// Process one chat message and return the messages to post in reply.
    ///
    /// Messages addressed to the robot are only ever treated as commands;
    /// everything else is checked against the registered triggers.
    pub async fn handle(&self, msg: &InboundMessage) -> Result<Vec<OutboundMessage>> {
        if msg.sender_id.eq_ignore_ascii_case(&self.robot_name) {
            return Ok(Vec::new());
        }

        if let Some(body) = self.parser.addressed(&msg.text) {
            return match command::parse_body(body) {
                Ok(Some(cmd)) => Ok(vec![self.execute(msg, cmd).await?]),
                Ok(None) => {
                    tracing::debug!(
                        sender = %msg.sender_id,
                        "Addressed message is not a respond command"
                    );
                    Ok(Vec::new())
                }
                Err(e) => {
                    tracing::warn!(sender = %msg.sender_id, "Rejected respond: {e}");
                    Ok(Vec::new())
                }
            };
        }

        match self.store.find(&msg.text).await? {
            Some(entry) => {
                tracing::debug!(room = %msg.room, trigger = %entry.trigger, "Trigger matched");
                Ok(vec![OutboundMessage::send(msg, entry.response)])
            }
            None => Ok(Vec::new()),
        }
    }

    async fn execute(&self, msg: &InboundMessage, cmd: Command) -> Result<OutboundMessage> {
        let text = match cmd {
            Command::Add { trigger, response } => {
                match self.store.upsert(&trigger, &response).await? {
                    Upsert::Added => {
                        tracing::info!(sender = %msg.sender_id, %trigger, "Respond added");
                        "Respond added".to_string()
                    }
                    Upsert::Updated => {
                        tracing::info!(sender = %msg.sender_id, %trigger, "Respond updated");
                        "Respond updated".to_string()
                    }
                }
            }
            Command::Delete { trigger } => {
                if self.store.remove(&trigger).await? {
                    tracing::info!(sender = %msg.sender_id, %trigger, "Respond deleted");
                    format!("respond to {trigger} deleted")
                } else {
                    format!("respond to {trigger} not found")
                }
            }
            Command::List => {
                let entries = self.store.list().await?;
                if entries.is_empty() {
                    "No responds registered".to_string()
                } else {
                    entries
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
        };
        Ok(OutboundMessage::reply(msg, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use respond_storage::{MemoryBrain, SqliteBrain};

    /// A chat room transcript: every user message and every robot reply, in order.
    struct Room {
        responder: Responder,
        messages: Vec<(String, String)>,
    }

    impl Room {
        fn new() -> Self {
            Self::with_brain(Arc::new(MemoryBrain::new()))
        }

        fn with_brain(brain: Arc<dyn Brain>) -> Self {
            let responder = Responder::new(&RobotConfig::default(), brain, "respond").unwrap();
            Self {
                responder,
                messages: Vec::new(),
            }
        }

        async fn say(&mut self, user: &str, text: &str) {
            self.messages.push((user.to_string(), text.to_string()));
            let inbound = InboundMessage::text("room1", user, text);
            for out in self.responder.handle(&inbound).await.unwrap() {
                self.messages.push(("hubot".to_string(), out.rendered()));
            }
        }

        fn last(&self) -> (&str, &str) {
            let (user, text) = self.messages.last().unwrap();
            (user.as_str(), text.as_str())
        }
    }

    #[tokio::test]
    async fn test_add_responds() {
        let mut room = Room::new();
        room.say("alice", "@hubot respond to foo with bar").await;
        assert_eq!(room.last(), ("hubot", "@alice Respond added"));

        room.say("bob", "@hubot respond to lorem with ipsum").await;
        assert_eq!(room.last(), ("hubot", "@bob Respond added"));
    }

    #[tokio::test]
    async fn test_rejects_pipe_in_trigger() {
        let mut room = Room::new();
        room.say("bob", "@hubot respond to abc|def with ipsum").await;
        assert_eq!(room.last(), ("bob", "@hubot respond to abc|def with ipsum"));
        assert!(room.responder.store().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_responds_to_matching_messages() {
        let mut room = Room::new();
        room.say("alice", "@hubot respond to foo with bar").await;

        room.say("john", "foo").await;
        assert_eq!(room.last(), ("hubot", "bar"));

        room.say(
            "john",
            "This is a message, where the foo text is embedded somewhere",
        )
        .await;
        assert_eq!(room.last(), ("hubot", "bar"));

        let len = room.messages.len();
        room.say(
            "john",
            "This is a message, where the fooish text is embedded somewhere",
        )
        .await;
        assert_eq!(room.messages.len(), len + 1);
    }

    #[tokio::test]
    async fn test_case_insensitive_match() {
        let mut room = Room::new();
        room.say("alice", "@hubot respond to lOrEm with ipsum").await;
        room.say("john", "LoReM").await;
        assert_eq!(room.last(), ("hubot", "ipsum"));
    }

    #[tokio::test]
    async fn test_dotted_capital_i_trigger() {
        let mut room = Room::new();
        room.say("alice", "@hubot respond to İstanbul with city").await;
        assert_eq!(room.last(), ("hubot", "@alice Respond added"));

        room.say("john", "İstanbul").await;
        assert_eq!(room.last(), ("hubot", "city"));

        room.say("john", "@hubot list responds").await;
        assert_eq!(room.last(), ("hubot", "@john respond to İstanbul with city"));
    }

    #[tokio::test]
    async fn test_list_shows_trigger_as_typed() {
        let mut room = Room::new();
        room.say("alice", "@hubot respond to lOrEm with ipsum").await;
        room.say("bob", "@hubot list responds").await;
        assert_eq!(room.last(), ("hubot", "@bob respond to lOrEm with ipsum"));
    }

    #[tokio::test]
    async fn test_update_in_other_case_replaces() {
        let mut room = Room::new();
        room.say("alice", "@hubot respond to foo with bar").await;
        room.say("alice", "@hubot respond to FOO with baz").await;
        assert_eq!(room.last(), ("hubot", "@alice Respond updated"));

        room.say("john", "foo").await;
        assert_eq!(room.last(), ("hubot", "baz"));

        room.say("bob", "@hubot list responds").await;
        assert_eq!(room.last(), ("hubot", "@bob respond to FOO with baz"));
    }

    #[tokio::test]
    async fn test_unicode_trigger() {
        let mut room = Room::new();
        room.say("alice", "@hubot respond to ❇ with flower").await;

        room.say("john", "❇").await;
        assert_eq!(room.last(), ("hubot", "flower"));

        room.say("john", "-❇\"").await;
        assert_eq!(room.last(), ("hubot", "flower"));
    }

    #[tokio::test]
    async fn test_delete_respond() {
        let mut room = Room::new();
        room.say("alice", "@hubot respond to foo with bar").await;

        room.say("alice", "@hubot delete respond to foo").await;
        assert_eq!(room.messages.len(), 4);
        assert_eq!(room.last(), ("hubot", "@alice respond to foo deleted"));

        let len = room.messages.len();
        room.say("alice", "foo").await;
        assert_eq!(room.messages.len(), len + 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_respond() {
        let mut room = Room::new();
        room.say("alice", "@hubot delete respond to ghost").await;
        assert_eq!(room.last(), ("hubot", "@alice respond to ghost not found"));
    }

    #[tokio::test]
    async fn test_update_respond() {
        let mut room = Room::new();
        room.say("alice", "@hubot respond to foo with bar").await;

        room.say("alice", "@hubot respond to foo with baz").await;
        assert_eq!(room.messages.len(), 4);
        assert_eq!(room.last(), ("hubot", "@alice Respond updated"));

        room.say("alice", "foo").await;
        assert_eq!(room.messages.len(), 6);
        assert_eq!(room.last(), ("hubot", "baz"));
    }

    #[tokio::test]
    async fn test_list_responds() {
        let mut room = Room::new();
        room.say("alice", "@hubot respond to foo with bar").await;
        room.say("bob", "@hubot respond to lorem with ipsum").await;

        room.say("bob", "@hubot list responds").await;
        assert_eq!(room.messages.len(), 6);
        assert_eq!(
            room.last(),
            (
                "hubot",
                "@bob respond to foo with bar\nrespond to lorem with ipsum"
            )
        );
    }

    #[tokio::test]
    async fn test_list_empty() {
        let mut room = Room::new();
        room.say("bob", "hubot: list responds").await;
        assert_eq!(room.last(), ("hubot", "@bob No responds registered"));
    }

    #[tokio::test]
    async fn test_addressed_messages_never_auto_reply() {
        let mut room = Room::new();
        room.say("alice", "@hubot respond to foo with bar").await;

        let len = room.messages.len();
        room.say("alice", "@hubot what is foo").await;
        assert_eq!(room.messages.len(), len + 1);
    }

    #[tokio::test]
    async fn test_ignores_own_messages() {
        let mut room = Room::new();
        room.say("alice", "@hubot respond to bar with bar").await;

        let len = room.messages.len();
        room.say("hubot", "bar").await;
        assert_eq!(room.messages.len(), len + 1);
    }

    #[tokio::test]
    async fn test_responds_survive_restart() {
        let brain: Arc<dyn Brain> = Arc::new(SqliteBrain::open_in_memory().unwrap());

        let mut room = Room::with_brain(brain.clone());
        room.say("alice", "@hubot respond to foo with bar").await;

        let mut room = Room::with_brain(brain);
        room.say("john", "foo").await;
        assert_eq!(room.last(), ("hubot", "bar"));
    }

    #[test]
    fn test_help_lines_for_name() {
        let help = help_lines("marvin");
        assert_eq!(help.len(), 3);
        assert!(help.iter().all(|line| line.starts_with("marvin ")));
        assert!(help[0].contains("respond to <text> with <response>"));
    }
}
