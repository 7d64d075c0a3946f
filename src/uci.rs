// Line codec for the engine side of the conversation: commands we write to
// the engine's stdin and the replies we read back from its stdout.
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Uci,
    IsReady,
    UciNewGame,
    SetOption { name: String, value: String },
    PositionFen(String),
    GoDepth(u32),
    Stop,
    Quit,
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCommand::Uci => write!(f, "uci"),
            EngineCommand::IsReady => write!(f, "isready"),
            EngineCommand::UciNewGame => write!(f, "ucinewgame"),
            EngineCommand::SetOption { name, value } => write!(f, "setoption name {name} value {value}"),
            EngineCommand::PositionFen(fen) => write!(f, "position fen {fen}"),
            EngineCommand::GoDepth(d) => write!(f, "go depth {d}"),
            EngineCommand::Stop => write!(f, "stop"),
            EngineCommand::Quit => write!(f, "quit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineReply {
    UciOk,
    ReadyOk,
    Id { key: String, value: String },
    /// `best` is `None` for `bestmove (none)` / `bestmove 0000`.
    BestMove { best: Option<String>, ponder: Option<String> },
    Info(String),
    Other(String),
}

pub fn parse_reply(line: &str) -> EngineReply {
    let line = line.trim();
    if line == "uciok" { return EngineReply::UciOk; }
    if line == "readyok" { return EngineReply::ReadyOk; }
    if let Some(rest) = line.strip_prefix("id ") {
        let mut parts = rest.splitn(2, ' ');
        let key = parts.next().unwrap_or_default().to_string();
        let value = parts.next().unwrap_or_default().trim().to_string();
        return EngineReply::Id { key, value };
    }
    if line == "bestmove" || line.starts_with("bestmove ") {
        let mut tokens = line.split_whitespace().skip(1);
        let best = tokens.next().filter(|m| *m != "(none)" && *m != "0000").map(str::to_string);
        let mut ponder = None;
        while let Some(tok) = tokens.next() {
            if tok == "ponder" { ponder = tokens.next().map(str::to_string); }
        }
        return EngineReply::BestMove { best, ponder };
    }
    if let Some(rest) = line.strip_prefix("info") {
        return EngineReply::Info(rest.trim().to_string());
    }
    EngineReply::Other(line.to_string())
}
