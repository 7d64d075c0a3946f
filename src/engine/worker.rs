use crate::engine::EngineError;
use crate::uci::EngineCommand;
use log::{debug, warn};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// How long an engine gets to exit on its own after `quit`
const QUIT_GRACE: Duration = Duration::from_millis(500);

/// What the worker side reports back, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Line(String),
    Error(String),
    Exited,
}

/// The message-passing boundary to an engine. Commands go in through
/// `post`; everything the engine says arrives on the event channel handed
/// out alongside the worker.
pub trait EngineWorker: Send {
    fn post(&mut self, line: &str) -> io::Result<()>;

    fn terminate(&mut self) {}
}

/// An engine binary running as a child process. A reader thread forwards
/// its stdout line by line.
pub struct ProcessWorker {
    child: Child,
    stdin: ChildStdin,
    reader: Option<JoinHandle<()>>,
    terminated: bool,
    status: Option<ExitStatus>,
}

impl ProcessWorker {
    pub fn spawn(path: &Path) -> Result<(Self, Receiver<WorkerEvent>), EngineError> {
        Self::from_command(Command::new(path))
    }

    /// Runs a prepared command as the engine; stdio is set up here.
    pub fn from_command(mut cmd: Command) -> Result<(Self, Receiver<WorkerEvent>), EngineError> {
        let program = cmd.get_program().to_string_lossy().into_owned();
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn { path: program.clone(), source })?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(EngineError::Pipes);
        };
        let (tx, rx) = mpsc::channel();
        let reader = thread::Builder::new()
            .name("engine-reader".into())
            .spawn(move || pump_lines(stdout, tx))
            .map_err(EngineError::Io)?;
        debug!("spawned engine {program} (pid {})", child.id());
        Ok((Self { child, stdin, reader: Some(reader), terminated: false, status: None }, rx))
    }

    /// Exit status once [`EngineWorker::terminate`] has reaped the process.
    pub fn exit_status(&self) -> Option<ExitStatus> { self.status }

    fn wait_for_exit(&mut self, grace: Duration) -> Option<ExitStatus> {
        let deadline = Instant::now() + grace;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => return Some(status),
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
                _ => return None,
            }
        }
    }
}

impl EngineWorker for ProcessWorker {
    fn post(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.stdin, "{line}")?;
        self.stdin.flush()
    }

    fn terminate(&mut self) {
        if self.terminated { return; }
        self.terminated = true;
        let _ = self.post(&EngineCommand::Quit.to_string());
        self.status = match self.wait_for_exit(QUIT_GRACE) {
            Some(status) => Some(status),
            None => {
                warn!("engine did not quit within {QUIT_GRACE:?}; killing it");
                if let Err(e) = self.child.kill() { warn!("failed to kill engine: {e}"); }
                self.child.wait().ok()
            }
        };
        debug!("engine exited: {:?}", self.status);
        if let Some(h) = self.reader.take() { let _ = h.join(); }
    }
}

impl Drop for ProcessWorker {
    fn drop(&mut self) { self.terminate(); }
}

/// Forwards `src` line by line until EOF, then reports `Exited`. Stops early
/// once the receiving side is gone.
pub(crate) fn pump_lines<R: Read>(src: R, tx: Sender<WorkerEvent>) {
    for line in BufReader::new(src).lines() {
        match line {
            Ok(l) => {
                if tx.send(WorkerEvent::Line(l)).is_err() { return; }
            }
            Err(e) => {
                let _ = tx.send(WorkerEvent::Error(e.to_string()));
                return;
            }
        }
    }
    let _ = tx.send(WorkerEvent::Exited);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn pump_forwards_lines_then_exit() {
        let (tx, rx) = mpsc::channel();
        pump_lines(Cursor::new("id name Fake\nreadyok\n"), tx);
        let got: Vec<WorkerEvent> = rx.iter().collect();
        assert_eq!(got, vec![
            WorkerEvent::Line("id name Fake".into()),
            WorkerEvent::Line("readyok".into()),
            WorkerEvent::Exited,
        ]);
    }

    #[cfg(unix)]
    #[test]
    fn quit_lets_the_engine_exit_on_its_own() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "read line; [ \"$line\" = quit ] && exit 7; exit 1"]);
        let (mut worker, _events) = ProcessWorker::from_command(cmd).unwrap();
        worker.terminate();
        assert_eq!(worker.exit_status().and_then(|s| s.code()), Some(7));
    }

    #[cfg(unix)]
    #[test]
    fn engine_ignoring_quit_is_killed() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "while read line; do :; done; sleep 30"]);
        let (mut worker, _events) = ProcessWorker::from_command(cmd).unwrap();
        worker.terminate();
        // Killed by a signal, so no exit code.
        assert_eq!(worker.exit_status().map(|s| s.code()), Some(None));
    }

    #[test]
    fn spawning_a_missing_binary_fails() {
        let r = ProcessWorker::spawn(Path::new("/nonexistent/pieboard-engine"));
        assert!(matches!(r, Err(EngineError::Spawn { .. })));
    }
}
