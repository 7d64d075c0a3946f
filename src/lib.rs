// Chess board front end: game record, clocks and an external engine opponent
pub mod board;
pub mod clock;
pub mod engine;
pub mod game;
pub mod notation;
pub mod session;
pub mod settings;
pub mod uci;

pub use clock::{Clock, TimeControl};
pub use engine::{BridgeConfig, Difficulty, EngineBridge, EngineError};
pub use game::{Game, GameStatus, HistoryMove};
pub use notation::CodedMove;
pub use session::{GameConfig, GameMode, Session};
pub use settings::Settings;
