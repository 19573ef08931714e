pub mod grid;
pub mod keymap;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::session::{Phase, TARGET_COUNT};
use crate::stats::RoundSummary;
use crate::surface::RenderCommand;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

const UP_FACE: &str = ":-)";
const WHACKED_FACE: &str = ":-(";

/// What one grid cell currently shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetCell {
    #[default]
    Dormant,
    Up,
    Whacked,
}

/// The UI thread's copy of the game, built only from render commands
#[derive(Debug, Clone)]
pub struct View {
    cells: [TargetCell; TARGET_COUNT],
    score: u32,
    remaining: u32,
    start_enabled: bool,
    summary: Option<RoundSummary>,
}

impl View {
    pub fn new(session_units: u32) -> Self {
        Self {
            cells: [TargetCell::Dormant; TARGET_COUNT],
            score: 0,
            remaining: session_units,
            start_enabled: true,
            summary: None,
        }
    }

    pub fn apply(&mut self, cmd: RenderCommand) {
        match cmd {
            RenderCommand::Target { id, active } => {
                if let Some(cell) = self.cells.get_mut(id) {
                    *cell = if active {
                        TargetCell::Up
                    } else {
                        TargetCell::Dormant
                    };
                }
            }
            RenderCommand::Hit(id) => {
                if let Some(cell) = self.cells.get_mut(id) {
                    *cell = TargetCell::Whacked;
                }
            }
            RenderCommand::Score(score) => self.score = score,
            RenderCommand::RemainingTime(remaining) => self.remaining = remaining,
            RenderCommand::StartEnabled(enabled) => self.start_enabled = enabled,
            RenderCommand::Summary(summary) => self.summary = Some(summary),
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.start_enabled, self.remaining) {
            (true, _) => Phase::Idle,
            (false, 0) => Phase::Cooldown,
            (false, _) => Phase::Running,
        }
    }

    pub fn cell(&self, id: usize) -> Option<TargetCell> {
        self.cells.get(id).copied()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn start_enabled(&self) -> bool {
        self.start_enabled
    }

    pub fn summary(&self) -> Option<&RoundSummary> {
        self.summary.as_ref()
    }
}

/// Screen regions, shared by rendering and mouse hit testing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLayout {
    pub header: Rect,
    pub board: Rect,
    pub summary: Rect,
    pub legend: Rect,
}

impl ViewLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(3), // score / time / start
                Constraint::Min(6),    // targets
                Constraint::Length(1), // last round
                Constraint::Length(1), // legend
            ])
            .split(area);

        Self {
            header: chunks[0],
            board: chunks[1],
            summary: chunks[2],
            legend: chunks[3],
        }
    }

    /// The target under a mouse click, if any
    pub fn target_at(&self, column: u16, row: u16) -> Option<usize> {
        grid::target_at(self.board, column, row)
    }
}

impl Widget for &View {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = ViewLayout::new(area);
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let phase = self.phase();

        let start_span = match phase {
            Phase::Idle => Span::styled(
                "[ space: start ]",
                Style::default().patch(bold_style).fg(Color::Green),
            ),
            Phase::Running => Span::styled("[ running ]", dim_style),
            Phase::Cooldown => Span::styled("[ cooling down ]", dim_style),
        };

        let time_style = if phase == Phase::Running && self.remaining <= 5 {
            Style::default().patch(bold_style).fg(Color::Red)
        } else {
            bold_style
        };

        let header = Paragraph::new(Line::from(vec![
            Span::raw("Score: "),
            Span::styled(self.score.to_string(), bold_style),
            Span::raw("   Time Left: "),
            Span::styled(self.remaining.to_string(), time_style),
            Span::raw("   "),
            start_span,
        ]))
        .block(Block::default().borders(Borders::ALL).title("whack"))
        .alignment(Alignment::Center);
        header.render(layout.header, buf);

        for (id, rect) in grid::cells(layout.board).into_iter().enumerate() {
            render_cell(self.cells[id], id, phase, rect, buf);
        }

        if let Some(summary) = &self.summary {
            Paragraph::new(Span::styled(
                format!("last round: {}", summary.describe()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .render(layout.summary, buf);
        }

        Paragraph::new(Span::styled(
            "(space) start / (1-4 q-r a-f) or click to whack / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(layout.legend, buf);
    }
}

fn render_cell(cell: TargetCell, id: usize, phase: Phase, area: Rect, buf: &mut Buffer) {
    let (face, fill) = match cell {
        TargetCell::Dormant => ("", Style::default()),
        TargetCell::Up => (
            UP_FACE,
            Style::default()
                .bg(Color::Green)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        TargetCell::Whacked => (
            WHACKED_FACE,
            Style::default().bg(Color::Red).fg(Color::White),
        ),
    };

    let border_style = if phase == Phase::Running {
        Style::default()
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let title = keymap::key_for_target(id)
        .map(|k| format!(" {k} "))
        .unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.is_empty() {
        return;
    }
    buf.set_style(inner, fill);

    let face_width = face.width() as u16;
    if face_width == 0 || face_width > inner.width {
        return;
    }
    let x = inner.x + (inner.width - face_width) / 2;
    let y = inner.y + inner.height / 2;
    buf.set_string(x, y, face, fill);
}
