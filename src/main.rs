use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io::{stdout, Stdout};

use blocktris::config::{FORCED_DESCENT_EVERY, SPAWN_COL, START_DROP_TIME_MS};
use blocktris::game::RandomPieceProvider;
use blocktris::{Action, Game, GameConfig, Phase, COLS, ROWS};

// ============================================================================
// Command Line
// ============================================================================

/// Falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(name = "blocktris", version, about)]
struct Args {
    /// Seed for piece selection. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Starting gravity interval in milliseconds.
    #[arg(long, default_value_t = START_DROP_TIME_MS, value_name = "MS")]
    drop_time: u32,

    /// Column new pieces spawn at.
    #[arg(long, default_value_t = SPAWN_COL, value_name = "COL")]
    spawn_col: i32,

    /// Every N-th move or rotation also drops the piece a row (0 disables).
    #[arg(long, default_value_t = FORCED_DESCENT_EVERY, value_name = "N")]
    force_every: u32,
}

impl Args {
    fn config(&self) -> GameConfig {
        GameConfig {
            start_drop_time_ms: self.drop_time,
            spawn_col: self.spawn_col,
            forced_descent_every: self.force_every,
            ..GameConfig::default()
        }
    }
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "__";

// ============================================================================
// Color Mapping
// ============================================================================

fn cell_color(color: u8) -> Color {
    match color {
        1 => Color::Red,
        2 => Color::White,
        3 => Color::Magenta,
        4 => Color::Blue,
        5 => Color::Green,
        6 => Color::Yellow,
        _ => Color::Cyan,
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game) {
    let area = frame.size();

    render_game(frame, game, area);
    match game.phase() {
        Phase::Paused => render_paused(frame, area),
        Phase::GameOver => render_game_over(frame, game, area),
        _ => {}
    }
}

fn render_game(frame: &mut Frame, game: &Game, area: Rect) {
    let grid_display_width = (COLS as u16 * CELL_WIDTH) + 2;
    let grid_display_height = ROWS as u16 + 2;
    let info_width = 14;
    let total_width = grid_display_width + info_width + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(info_width),
    ])
    .split(game_row);

    render_grid(frame, game, horizontal[0]);
    render_info(frame, game, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←/A →/S: Move | ↑/R/X/Space: Rotate | ↓/Z: Drop | J: Step | P: Pause | Q: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blocktris ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = (0..ROWS)
        .map(|row| {
            let spans: Vec<Span> = (0..COLS)
                .map(|col| match game.visual_cell(row, col) {
                    0 => Span::styled(EMPTY_CHAR, Style::default().fg(Color::DarkGray)),
                    color => Span::styled(BLOCK_CHAR, Style::default().fg(cell_color(color))),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score())),
        Line::from(""),
        Line::from(Span::styled("Streak", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.streak())),
        Line::from(""),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", game.level())),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score())),
        Line::from(""),
        Line::from(Span::styled(
            "Restart (r) or quit (q)?",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(28, 10, area);
    frame.render_widget(paragraph, popup_area);
}

fn render_paused(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to resume",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Paused ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(28, 8, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Input
// ============================================================================

fn key_action(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Left | KeyCode::Char('a') => Some(Action::Left),
        KeyCode::Right | KeyCode::Char('s') => Some(Action::Right),
        KeyCode::Up | KeyCode::Char('r') | KeyCode::Char('x') | KeyCode::Char(' ') => {
            Some(Action::Rotate)
        }
        KeyCode::Down | KeyCode::Char('z') => Some(Action::HardDrop),
        KeyCode::Char('j') => Some(Action::SoftDrop),
        _ => None,
    }
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, game: &mut Game) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, game))?;

        // A quiet poll window is a gravity tick
        if !event::poll(game.poll_timeout())? {
            game.apply(Action::Tick);
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match (game.phase(), key.code) {
            (_, KeyCode::Esc) | (_, KeyCode::Char('q')) | (_, KeyCode::Char('Q')) => break,
            (Phase::GameOver, KeyCode::Char('r')) => game.restart(),
            (Phase::Paused, _) => game.toggle_pause(),
            (Phase::Falling, KeyCode::Char('p')) => game.toggle_pause(),
            (Phase::Falling, code) => {
                if let Some(action) = key_action(code) {
                    game.apply(action);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let provider = match args.seed {
        Some(seed) => RandomPieceProvider::seeded(seed),
        None => RandomPieceProvider::from_entropy(),
    };
    let mut game = Game::with_config(Box::new(provider), args.config())
        .context("invalid game settings")?;

    enable_raw_mode().context("failed to enable raw mode")?;
    stdout()
        .execute(EnterAlternateScreen)
        .context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout());
    let result = Terminal::new(backend)
        .map_err(anyhow::Error::from)
        .and_then(|mut terminal| run(&mut terminal, &mut game));

    finish(result, restore_terminal())
}

/// Undoes both terminal modes even when the first step fails.
fn restore_terminal() -> Result<()> {
    let raw = disable_raw_mode().context("failed to disable raw mode");
    let screen = stdout()
        .execute(LeaveAlternateScreen)
        .map(|_| ())
        .context("failed to leave alternate screen");
    raw.and(screen)
}

/// The game loop's error wins over a restore error.
fn finish(result: Result<()>, restored: Result<()>) -> Result<()> {
    result?;
    restored
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn finish_reports_the_game_loop_error_first() {
        let err = finish(Err(anyhow!("draw failed")), Err(anyhow!("restore failed"))).unwrap_err();
        assert_eq!(err.to_string(), "draw failed");
    }

    #[test]
    fn finish_reports_a_restore_error_after_a_clean_run() {
        let err = finish(Ok(()), Err(anyhow!("restore failed"))).unwrap_err();
        assert_eq!(err.to_string(), "restore failed");
        assert!(finish(Ok(()), Ok(())).is_ok());
    }
}
