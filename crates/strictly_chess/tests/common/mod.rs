//! Shared helpers for session tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use strictly_chess::{
    MemoryLog, MoveSource, Notice, Participant, Presenter, Prompt, SessionError, Side, Snapshot,
};

/// Move source that replays a fixed list of lines and records every prompt.
pub struct ScriptedMoves {
    lines: VecDeque<String>,
    prompts: Arc<Mutex<Vec<Prompt>>>,
}

impl ScriptedMoves {
    pub fn new(lines: &[&str]) -> (Self, Arc<Mutex<Vec<Prompt>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let source = Self {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            prompts: Arc::clone(&prompts),
        };
        (source, prompts)
    }
}

#[async_trait::async_trait]
impl MoveSource for ScriptedMoves {
    async fn request_move(&mut self, prompt: &Prompt) -> Result<String, SessionError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.lines.pop_front().ok_or_else(|| SessionError::Input {
            message: "script exhausted".to_string(),
        })
    }
}

/// What a [`RecordingPresenter`] saw.
#[derive(Debug, Default)]
pub struct Recording {
    pub snapshots: Vec<(Snapshot, Side)>,
    pub notices: Vec<Notice>,
}

/// Presenter that keeps everything it is given.
pub struct RecordingPresenter {
    recording: Arc<Mutex<Recording>>,
}

impl RecordingPresenter {
    pub fn new() -> (Self, Arc<Mutex<Recording>>) {
        let recording = Arc::new(Mutex::new(Recording::default()));
        (
            Self {
                recording: Arc::clone(&recording),
            },
            recording,
        )
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, snapshot: &Snapshot, viewer: Side) {
        self.recording
            .lock()
            .unwrap()
            .snapshots
            .push((snapshot.clone(), viewer));
    }

    fn notify(&mut self, notice: &Notice) {
        self.recording.lock().unwrap().notices.push(notice.clone());
    }
}

pub fn alice() -> Participant {
    Participant::new("alice")
}

pub fn bob() -> Participant {
    Participant::new("bob")
}

/// A fresh in-memory log with a handle for alice.
pub fn memory_log() -> MemoryLog {
    MemoryLog::new(alice(), vec![alice(), bob()])
}
