#![allow(dead_code)]
// Scripted stand-in for a UCI engine process.

use pieboard::engine::{BridgeConfig, EngineBridge, EngineWorker, WorkerEvent};
use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Default)]
pub struct Script {
    /// Never answer `isready`.
    pub mute: bool,
    /// Keep searching until `stop` instead of answering `go` at once.
    pub hold: bool,
    /// Ignore `stop` as well.
    pub deaf: bool,
}

pub struct ScriptedEngine {
    tx: Sender<WorkerEvent>,
    log: Arc<Mutex<Vec<String>>>,
    replies: VecDeque<String>,
    script: Script,
    searching: bool,
}

impl ScriptedEngine {
    fn say(&self, line: &str) { let _ = self.tx.send(WorkerEvent::Line(line.to_string())); }

    fn best(&mut self) {
        let mv = self.replies.pop_front().unwrap_or_else(|| "(none)".to_string());
        self.say("info depth 1 score cp 13 pv e2e4");
        self.say(&format!("bestmove {mv}"));
    }
}

impl EngineWorker for ScriptedEngine {
    fn post(&mut self, line: &str) -> io::Result<()> {
        self.log.lock().unwrap().push(line.to_string());
        match line {
            "uci" => {
                self.say("id name Scripted 1.0");
                self.say("id author nobody");
                self.say("option name Skill Level type spin default 20 min 0 max 20");
                self.say("uciok");
            }
            "isready" if !self.script.mute => self.say("readyok"),
            "stop" if self.searching && !self.script.deaf => {
                self.searching = false;
                self.best();
            }
            l if l.starts_with("go") => {
                if self.script.hold { self.searching = true; } else { self.best(); }
            }
            _ => {}
        }
        Ok(())
    }
}

pub struct Harness {
    pub bridge: EngineBridge,
    pub log: Arc<Mutex<Vec<String>>>,
    /// Injects worker events as if they came from the engine side.
    pub events: Sender<WorkerEvent>,
}

pub fn scripted(replies: &[&str], script: Script, config: BridgeConfig) -> Harness {
    let (tx, rx) = mpsc::channel();
    let log = Arc::new(Mutex::new(Vec::new()));
    let worker = ScriptedEngine {
        tx: tx.clone(),
        log: Arc::clone(&log),
        replies: replies.iter().map(|s| s.to_string()).collect(),
        script,
        searching: false,
    };
    Harness { bridge: EngineBridge::new(Box::new(worker), rx, config), log, events: tx }
}

pub fn loaded(replies: &[&str], script: Script) -> Harness {
    let mut h = scripted(replies, script, BridgeConfig::default());
    h.bridge.load().expect("scripted engine loads");
    h
}

pub fn posted(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> { log.lock().unwrap().clone() }
