use std::sync::mpsc::Sender;
use std::sync::Mutex;

use crate::runtime::WhackEvent;
use crate::stats::RoundSummary;
use crate::target::lock_or_recover;

/// What the game core tells whatever is drawing it
pub trait Surface: Send + Sync {
    fn render_target(&self, id: usize, active: bool);
    fn render_score(&self, score: u32);
    fn render_remaining_time(&self, remaining: u32);
    fn set_start_enabled(&self, enabled: bool);

    /// A target was knocked down by the player
    fn render_hit(&self, _id: usize) {}

    fn render_summary(&self, _summary: &RoundSummary) {}
}

/// A single draw instruction, as posted to the UI thread
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Target { id: usize, active: bool },
    Hit(usize),
    Score(u32),
    RemainingTime(u32),
    StartEnabled(bool),
    Summary(RoundSummary),
}

/// Posts render commands into the UI event queue instead of drawing directly
#[derive(Debug, Clone)]
pub struct ChannelSurface {
    tx: Sender<WhackEvent>,
}

impl ChannelSurface {
    pub fn new(tx: Sender<WhackEvent>) -> Self {
        Self { tx }
    }

    fn post(&self, cmd: RenderCommand) {
        // The receiver only goes away when the UI loop has exited
        if self.tx.send(WhackEvent::Render(cmd)).is_err() {
            log::trace!("ui is gone, dropping render command");
        }
    }
}

impl Surface for ChannelSurface {
    fn render_target(&self, id: usize, active: bool) {
        self.post(RenderCommand::Target { id, active });
    }

    fn render_score(&self, score: u32) {
        self.post(RenderCommand::Score(score));
    }

    fn render_remaining_time(&self, remaining: u32) {
        self.post(RenderCommand::RemainingTime(remaining));
    }

    fn set_start_enabled(&self, enabled: bool) {
        self.post(RenderCommand::StartEnabled(enabled));
    }

    fn render_hit(&self, id: usize) {
        self.post(RenderCommand::Hit(id));
    }

    fn render_summary(&self, summary: &RoundSummary) {
        self.post(RenderCommand::Summary(summary.clone()));
    }
}

/// Test surface that keeps every command it receives
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Mutex<Vec<RenderCommand>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<RenderCommand> {
        lock_or_recover(&self.commands).clone()
    }

    pub fn clear(&self) {
        lock_or_recover(&self.commands).clear();
    }

    fn push(&self, cmd: RenderCommand) {
        lock_or_recover(&self.commands).push(cmd);
    }
}

impl Surface for RecordingSurface {
    fn render_target(&self, id: usize, active: bool) {
        self.push(RenderCommand::Target { id, active });
    }

    fn render_score(&self, score: u32) {
        self.push(RenderCommand::Score(score));
    }

    fn render_remaining_time(&self, remaining: u32) {
        self.push(RenderCommand::RemainingTime(remaining));
    }

    fn set_start_enabled(&self, enabled: bool) {
        self.push(RenderCommand::StartEnabled(enabled));
    }

    fn render_hit(&self, id: usize) {
        self.push(RenderCommand::Hit(id));
    }

    fn render_summary(&self, summary: &RoundSummary) {
        self.push(RenderCommand::Summary(summary.clone()));
    }
}

impl<S: Surface + ?Sized> Surface for std::sync::Arc<S> {
    fn render_target(&self, id: usize, active: bool) {
        (**self).render_target(id, active)
    }

    fn render_score(&self, score: u32) {
        (**self).render_score(score)
    }

    fn render_remaining_time(&self, remaining: u32) {
        (**self).render_remaining_time(remaining)
    }

    fn set_start_enabled(&self, enabled: bool) {
        (**self).set_start_enabled(enabled)
    }

    fn render_hit(&self, id: usize) {
        (**self).render_hit(id)
    }

    fn render_summary(&self, summary: &RoundSummary) {
        (**self).render_summary(summary)
    }
}
