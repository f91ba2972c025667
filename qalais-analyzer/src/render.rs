//! Terminal rendering of the analyzer page

use crate::grid::{Grid, GRID_COLS};
use crate::page::PageState;
use colored::Colorize;

pub const TITLE: &str = "Qalais Analyzer";
pub const SUBTITLE: &str = "Анализатор игровых уровней Telegram бота";
pub const LOADING: &str = "Обрабатываю изображение...";
pub const RESULT_HEADING: &str = "Правильные позиции:";
pub const HINT: &str = "Вставьте ссылку на сообщение бота с игровым полем";

const WIN_MARK: &str = "💸";

/// Render without ANSI colors
pub fn render_plain(state: &PageState) -> String {
    let mut out = String::new();

    if state.is_analyzing {
        out.push_str(LOADING);
        out.push('\n');
    }

    if state.has_results() {
        out.push_str(&grid_lines(&state.grid()).join("\n"));
        out.push('\n');
        out.push_str(RESULT_HEADING);
        out.push(' ');
        out.push_str(&state.result_text);
        out.push('\n');
    }

    out
}

/// Render for a color terminal
pub fn render_colored(state: &PageState) -> String {
    let mut out = String::new();

    if state.is_analyzing {
        out.push_str(&format!("{}\n", LOADING.dimmed()));
    }

    if state.has_results() {
        for line in grid_lines(&state.grid()) {
            out.push_str(&format!("  {}\n", line.as_str().magenta()));
        }
        out.push('\n');
        out.push_str(&format!("{}\n", RESULT_HEADING.bold()));
        out.push_str(&format!("{}\n", state.result_text.as_str().green()));
    }

    out
}

/// Box-drawn grid, one string per terminal line
pub fn grid_lines(grid: &Grid) -> Vec<String> {
    let cell_width = 4;
    let bar = "─".repeat(cell_width);
    let edge = |left: &str, mid: &str, right: &str| {
        format!("{left}{}{right}", vec![bar.as_str(); GRID_COLS].join(mid))
    };

    let mut lines = vec![edge("┌", "┬", "┐")];
    let rows = grid.rows();
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| {
                if cell.winning {
                    // the emoji is two columns wide
                    format!(" {WIN_MARK} ")
                } else {
                    " ".repeat(cell_width)
                }
            })
            .collect();
        lines.push(format!("│{}│", cells.join("│")));
        if i + 1 < rows.len() {
            lines.push(edge("├", "┼", "┤"));
        }
    }
    lines.push(edge("└", "┴", "┘"));
    lines
}
