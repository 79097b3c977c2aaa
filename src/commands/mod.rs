pub mod controls;
pub mod help;
pub mod hover;
pub mod news;
pub mod refresh;
pub mod status;

use tracing::{info, warn};

use crate::session::Session;

/// What the prompt loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parse one input line and run the matching command
pub fn handle_line(session: &mut Session, line: &str) -> Flow {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((first, args)) = parts.split_first() else {
        return Flow::Continue;
    };
    let command = first.to_lowercase();

    info!("⌨️ Command {} called with args: {:?}", command, args);

    let result = match command.as_str() {
        "mode" => controls::execute_mode(session, args),
        "category" | "cat" => controls::execute_category(session, args),
        "unit" => controls::execute_unit(session, args),
        "range" | "tf" => controls::execute_range(session, args),
        "news" | "n" => news::execute(session, args),
        "next" => news::execute_next(session, args),
        "prev" | "previous" => news::execute_prev(session, args),
        "page" => news::execute_goto(session, args),
        "hover" => hover::execute(session, args),
        "leave" => hover::execute_leave(session, args),
        "refresh" | "reload" => refresh::execute(session, args),
        "fetch" | "update" => refresh::execute_fetch(session, args),
        "resize" => refresh::execute_resize(session, args),
        "status" => status::execute(session, args),
        "legend" => status::execute_legend(session, args),
        "help" | "?" => Ok(help::execute()),
        "quit" | "exit" | "q" => return Flow::Quit,
        _ => Err(format!("❌ Unknown command '{}'. Type `help` for a list.", command)),
    };

    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            warn!("Command {} failed: {}", command, e);
            println!("{}", e);
        }
    }
    Flow::Continue
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::snapshot::SnapshotClient;
    use crate::config::AppConfig;
    use tokio::sync::mpsc;

    /// A session that never loaded anything
    pub(crate) fn idle_session() -> Session {
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = AppConfig {
            out_dir: std::env::temp_dir().join("mrnews_idle_session"),
            ..AppConfig::default()
        };
        Session::new(config, SnapshotClient::from_dir(std::env::temp_dir()), tx)
    }

    #[test]
    fn test_handle_line_flow() {
        let mut session = idle_session();

        assert_eq!(handle_line(&mut session, ""), Flow::Continue);
        assert_eq!(handle_line(&mut session, "   "), Flow::Continue);
        assert_eq!(handle_line(&mut session, "frobnicate"), Flow::Continue);
        assert_eq!(handle_line(&mut session, "UNIT irr"), Flow::Continue);
        assert_eq!(session.controls.unit.to_string(), "IRR");
        assert_eq!(handle_line(&mut session, "Quit"), Flow::Quit);
        assert_eq!(handle_line(&mut session, "exit now"), Flow::Quit);
    }
}
