use std::io::{self, BufRead, Write};

use anyhow::Result;

use respond_responder::Responder;
use respond_types::InboundMessage;

const ROOM: &str = "shell";

/// Split an input line into speaker and text.
///
/// `bob> hello` speaks as `bob`; anything else speaks as `default_user`.
fn parse_line<'a>(default_user: &'a str, line: &'a str) -> (&'a str, &'a str) {
    if let Some((user, text)) = line.split_once("> ") {
        let user = user.trim();
        if !user.is_empty() && !user.contains(char::is_whitespace) {
            return (user, text.trim());
        }
    }
    (default_user, line)
}

/// Run the interactive chat room REPL.
pub async fn run_chat(responder: Responder, user: String) -> Result<()> {
    let robot = responder.robot_name().to_string();

    println!("respond chat (robot: {robot}, you are: {user})");
    println!("Address the robot with \"@{robot} ...\".");
    println!("Prefix a line with \"name> \" to speak as someone else.");
    println!("Type 'exit' or Ctrl+D to quit.\n");

    let stdin = io::stdin();
    loop {
        print!("{user}> ");
        io::stdout().flush()?;

        let mut line = String::new();
        let bytes = stdin.lock().read_line(&mut line)?;
        if bytes == 0 {
            // EOF (Ctrl+D)
            println!();
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        let (speaker, text) = parse_line(&user, input);
        let mut inbound = InboundMessage::text(ROOM, speaker, text);
        inbound.timestamp = chrono::Utc::now().timestamp_millis();

        match responder.handle(&inbound).await {
            Ok(replies) => {
                for reply in replies {
                    println!("{robot}: {}", reply.rendered());
                }
            }
            Err(e) => eprintln!("[error: {e}]"),
        }
    }

    println!("Goodbye!");
    Ok(())
}
