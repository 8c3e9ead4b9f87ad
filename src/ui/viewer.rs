//! Generation viewer
//!
//! Draws the level as it grows, with walkers highlighted and a status
//! sidebar, then the finished map with its spawned entities.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ecs::{Position, Renderable};
use crate::render::{detect_render_mode, draw_layer, screen_cell, RenderMode};
use crate::world::generation::{
    GeneratedMap, GenerationStats, LevelGenerator, Phase, TileRenderer,
};
use crate::world::Tile;

/// Width of the status sidebar in columns
const SIDEBAR_WIDTH: u16 = 28;

/// Walker highlight
const WALKER_COLOR: Color = Color::Rgb(255, 220, 80);

/// What the host loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    None,
    Quit,
    Regenerate,
}

/// Terminal view over a generator or a finished map
pub struct Viewer {
    render_mode: RenderMode,
    paused: bool,
    seed: u64,
    /// Last error or notice, shown under the stats
    message: Option<String>,
}

impl Viewer {
    pub fn new(seed: u64) -> Self {
        Self {
            render_mode: detect_render_mode(),
            paused: false,
            seed,
            message: None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.message = None;
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Handle a key press. Pause and glyph toggles are handled here.
    pub fn handle_input(&mut self, key: KeyEvent) -> ViewerAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => ViewerAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                ViewerAction::Quit
            }
            KeyCode::Char('r') => ViewerAction::Regenerate,
            KeyCode::Char(' ') => {
                self.paused = !self.paused;
                log::debug!("Viewer {}", if self.paused { "paused" } else { "resumed" });
                ViewerAction::None
            }
            KeyCode::Char('m') => {
                self.render_mode = self.render_mode.toggled();
                ViewerAction::None
            }
            _ => ViewerAction::None,
        }
    }

    /// Draw a generator mid-run
    pub fn render_progress(&self, frame: &mut Frame, generator: &LevelGenerator<'_>) {
        frame.render_widget(Clear, frame.area());
        let (map_area, side_area) = self.split(frame.area());

        let walkers: Vec<Position> = generator.walkers().iter().map(|w| w.position).collect();
        let inner = self.render_map(
            frame,
            map_area,
            generator.renderer(),
            generator.grid().height(),
            generator.phase(),
        );
        let buf = frame.buffer_mut();
        for pos in walkers {
            if let Some((x, y)) = screen_cell(inner, generator.grid().height(), pos) {
                buf[(x, y)].set_char('*');
                buf[(x, y)].set_fg(WALKER_COLOR);
            }
        }

        let target = generator.config().fill_percentage;
        self.render_sidebar(frame, side_area, generator.phase(), &generator.stats(), Some(target));
    }

    /// Draw a completed map with its entities on top
    pub fn render_finished(
        &self,
        frame: &mut Frame,
        map: &GeneratedMap,
        layer: &dyn TileRenderer,
        drawables: &[(Position, Renderable)],
    ) {
        frame.render_widget(Clear, frame.area());
        let (map_area, side_area) = self.split(frame.area());

        let height = map.grid().height();
        let inner = self.render_map(frame, map_area, layer, height, Phase::Complete);
        let buf = frame.buffer_mut();
        for (pos, renderable) in drawables {
            if let Some((x, y)) = screen_cell(inner, height, *pos) {
                let (r, g, b) = renderable.fg;
                buf[(x, y)].set_char(renderable.glyph);
                buf[(x, y)].set_fg(Color::Rgb(r, g, b));
            }
        }

        self.render_sidebar(frame, side_area, Phase::Complete, map.stats(), None);
    }

    fn split(&self, area: Rect) -> (Rect, Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(SIDEBAR_WIDTH)])
            .split(area);
        (chunks[0], chunks[1])
    }

    /// Draw the tile layer inside a titled block and return the inner area
    fn render_map(
        &self,
        frame: &mut Frame,
        area: Rect,
        layer: &dyn TileRenderer,
        map_height: i32,
        phase: Phase,
    ) -> Rect {
        let border_color = if phase == Phase::Complete {
            Color::Rgb(90, 150, 90)
        } else {
            Color::DarkGray
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Seed {} [{}] ", self.seed, self.render_mode.name()))
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        draw_layer(layer, map_height, frame.buffer_mut(), inner, self.render_mode);
        inner
    }

    fn render_sidebar(
        &self,
        frame: &mut Frame,
        area: Rect,
        phase: Phase,
        stats: &GenerationStats,
        target: Option<f32>,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Status ")
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let area_cells = (stats.width * stats.height).max(1) as f32;
        let fill = stats.floor_tally as f32 / area_cells;
        let fill_color = match target {
            Some(t) if fill >= t => Color::Green,
            Some(_) => Color::Yellow,
            None => Color::Cyan,
        };
        let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::Gray));

        let mut lines = vec![
            Line::from(Span::styled(
                phase.name(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                label("Size:    "),
                Span::raw(format!("{}x{}", stats.width, stats.height)),
            ]),
            Line::from(vec![label("Step:    "), Span::raw(stats.growth_steps.to_string())]),
            Line::from(vec![
                label("Fill:    "),
                Span::styled(format!("{:.1}%", fill * 100.0), Style::default().fg(fill_color)),
            ]),
            Line::from(vec![label("Tally:   "), Span::raw(stats.floor_tally.to_string())]),
            Line::from(vec![
                label("Walkers: "),
                Span::raw(format!("peak {}", stats.peak_walkers)),
            ]),
            Line::from(""),
        ];

        for (tile, count) in [
            (Tile::Floor, stats.floor_cells),
            (Tile::Obstacle, stats.obstacle_cells),
            (Tile::Decor, stats.decor_cells),
            (Tile::Empty, stats.empty_cells),
        ] {
            let (r, g, b) = tile.fg_color();
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ", crate::render::TileCanvas::tile_char(self.render_mode, tile)),
                    Style::default().fg(Color::Rgb(r, g, b)),
                ),
                Span::raw(format!("{:?}: {}", tile, count)),
            ]));
        }

        if phase == Phase::Complete {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                label("Spawned: "),
                Span::raw(format!("{} in {} tries", stats.spawns_placed, stats.spawn_attempts)),
            ]));
        }

        if self.paused {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "PAUSED",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
        }

        if let Some(message) = &self.message {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red))));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "q quit  r regen",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            "space pause  m glyphs",
            Style::default().fg(Color::DarkGray),
        )));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_space_toggles_pause() {
        let mut viewer = Viewer::new(7);
        assert!(!viewer.is_paused());
        assert_eq!(viewer.handle_input(press(KeyCode::Char(' '))), ViewerAction::None);
        assert!(viewer.is_paused());
        viewer.handle_input(press(KeyCode::Char(' ')));
        assert!(!viewer.is_paused());
    }

    #[test]
    fn test_quit_and_regenerate_keys() {
        let mut viewer = Viewer::new(7);
        assert_eq!(viewer.handle_input(press(KeyCode::Char('q'))), ViewerAction::Quit);
        assert_eq!(viewer.handle_input(press(KeyCode::Esc)), ViewerAction::Quit);
        assert_eq!(viewer.handle_input(press(KeyCode::Char('r'))), ViewerAction::Regenerate);
    }

    #[test]
    fn test_mode_toggle() {
        let mut viewer = Viewer::new(7);
        let before = viewer.render_mode();
        viewer.handle_input(press(KeyCode::Char('m')));
        assert_ne!(viewer.render_mode(), before);
    }
}
