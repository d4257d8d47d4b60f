//! Cell-grid drawing surface used by the screens.
//!
//! Screens never touch ratatui directly; they draw glyphs and colour markup
//! through [`Display`]. `BufferDisplay` writes into a ratatui `Buffer` for
//! the terminal, `RecordingDisplay` keeps the cells around for tests.

use std::collections::HashMap;

use ratatui::buffer::Buffer;
use ratatui::style::{Color as TuiColor, Style};

use dungeon::{Color, Glyph};

/// Colours used when markup does not say otherwise.
pub const DEFAULT_FG: Color = Color::White;
pub const DEFAULT_BG: Color = Color::Black;

/// Trait for anything the screens can draw on
pub trait Display {
    /// Width and height in cells.
    fn size(&self) -> (u16, u16);

    /// Draw one glyph. Out-of-range cells are ignored.
    fn draw(&mut self, x: i32, y: i32, ch: char, fg: Color, bg: Color);

    /// Draw a line of text with `%c{..}` / `%b{..}` colour markup.
    fn draw_text(&mut self, x: i32, y: i32, markup: &str) {
        for (offset, glyph) in parse_markup(markup).into_iter().enumerate() {
            self.draw(x + offset as i32, y, glyph.ch, glyph.fg, glyph.bg);
        }
    }

    fn draw_glyph(&mut self, x: i32, y: i32, glyph: Glyph) {
        self.draw(x, y, glyph.ch, glyph.fg, glyph.bg);
    }
}

/// Expand colour markup into one glyph per visible character.
///
/// `%c{name}` sets the foreground, `%b{name}` the background, an empty
/// `{}` restores the default. Names are the lowercase colour names or
/// `rgb(r,g,b)`; unknown names also restore the default. Anything that is
/// not well-formed markup is drawn literally.
pub fn parse_markup(markup: &str) -> Vec<Glyph> {
    let mut glyphs = Vec::with_capacity(markup.len());
    let mut fg = DEFAULT_FG;
    let mut bg = DEFAULT_BG;
    let chars: Vec<char> = markup.chars().collect();

    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '%' && i + 2 < chars.len() && chars[i + 2] == '{' {
            let kind = chars[i + 1];
            let close = chars[i + 3..].iter().position(|c| *c == '}');
            if let (true, Some(len)) = (kind == 'c' || kind == 'b', close) {
                let name: String = chars[i + 3..i + 3 + len].iter().collect();
                if kind == 'c' {
                    fg = Color::parse(&name).unwrap_or(DEFAULT_FG);
                } else {
                    bg = Color::parse(&name).unwrap_or(DEFAULT_BG);
                }
                i += 4 + len;
                continue;
            }
        }
        glyphs.push(Glyph::new(chars[i], fg, bg));
        i += 1;
    }
    glyphs
}

/// 将地牢颜色转换为终端颜色
pub fn to_tui_color(color: Color) -> TuiColor {
    match color {
        Color::Black => TuiColor::Black,
        Color::Red => TuiColor::Red,
        Color::Green => TuiColor::Green,
        Color::Yellow => TuiColor::Yellow,
        Color::Blue => TuiColor::Blue,
        Color::Magenta => TuiColor::Magenta,
        Color::Cyan => TuiColor::Cyan,
        Color::Gray => TuiColor::Gray,
        Color::DarkGray => TuiColor::DarkGray,
        Color::White => TuiColor::White,
        Color::Brown => TuiColor::Rgb(165, 42, 42),
        Color::Rgb(r, g, b) => TuiColor::Rgb(r, g, b),
    }
}

/// Draws into a ratatui buffer, e.g. `frame.buffer_mut()`.
pub struct BufferDisplay<'a> {
    buf: &'a mut Buffer,
}

impl<'a> BufferDisplay<'a> {
    pub fn new(buf: &'a mut Buffer) -> Self {
        Self { buf }
    }
}

impl Display for BufferDisplay<'_> {
    fn size(&self) -> (u16, u16) {
        (self.buf.area.width, self.buf.area.height)
    }

    fn draw(&mut self, x: i32, y: i32, ch: char, fg: Color, bg: Color) {
        let area = self.buf.area;
        if x < 0 || y < 0 || x >= i32::from(area.width) || y >= i32::from(area.height) {
            return;
        }
        let style = Style::default().fg(to_tui_color(fg)).bg(to_tui_color(bg));
        self.buf.set_string(
            area.x + x as u16,
            area.y + y as u16,
            ch.to_string(),
            style,
        );
    }
}

/// In-memory display that remembers every drawn cell.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    width: u16,
    height: u16,
    cells: HashMap<(i32, i32), Glyph>,
}

impl RecordingDisplay {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: HashMap::new(),
        }
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<Glyph> {
        self.cells.get(&(x, y)).copied()
    }

    /// The characters of one row; undrawn cells read as spaces and trailing
    /// spaces are trimmed.
    pub fn row(&self, y: i32) -> String {
        let line: String = (0..i32::from(self.width))
            .map(|x| self.cell(x, y).map_or(' ', |g| g.ch))
            .collect();
        line.trim_end().to_string()
    }

    pub fn contains_text(&self, text: &str) -> bool {
        (0..i32::from(self.height)).any(|y| self.row(y).contains(text))
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

impl Display for RecordingDisplay {
    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn draw(&mut self, x: i32, y: i32, ch: char, fg: Color, bg: Color) {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return;
        }
        self.cells.insert((x, y), Glyph::new(ch, fg, bg));
    }
}
