use super::theme::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// 搜索框文本，支持 UTF-8 (中英文)
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
    /// 输入内容
    text: String,
    /// 光标位置（按字符计数，非字节）
    cursor: usize,
}

impl SearchInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取内容
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// 获取光标位置
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// 在光标处插入字符
    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    /// Backspace: 删除光标前的字符
    pub fn delete_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.remove_at_cursor();
        true
    }

    /// Delete: 删除光标后的字符
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        self.remove_at_cursor();
        true
    }

    fn remove_at_cursor(&mut self) {
        let byte_pos = char_to_byte(&self.text, self.cursor);
        let next_byte_pos = char_to_byte(&self.text, self.cursor + 1);
        self.text.drain(byte_pos..next_byte_pos);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }
}

/// UTF-8 安全的字符位置转字节位置
fn char_to_byte(s: &str, char_pos: usize) -> usize {
    s.char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// 渲染搜索框：图标 + 输入文本，聚焦时显示光标块
pub fn render_search_box(
    f: &mut Frame,
    input: &SearchInput,
    theme: &Theme,
    focused: bool,
    area: Rect,
) {
    let color = if focused { theme.focus } else { theme.gray };
    let text_style = Style::default().fg(color);

    let chars: Vec<char> = input.text().chars().collect();
    let cursor = input.cursor().min(chars.len());
    let before: String = chars[..cursor].iter().collect();

    let mut spans = vec![Span::styled(" 🔍 ", text_style)];

    if input.text().is_empty() && !focused {
        spans.push(Span::styled(
            "Search...  (press / to search)",
            Style::default().fg(theme.gray).add_modifier(Modifier::ITALIC),
        ));
    } else if focused {
        let cursor_char = chars.get(cursor).map(|c| c.to_string()).unwrap_or_else(|| " ".into());
        let after: String = chars.get(cursor + 1..).map(|s| s.iter().collect()).unwrap_or_default();
        spans.push(Span::styled(before, text_style));
        spans.push(Span::styled(
            cursor_char,
            Style::default().fg(theme.base).bg(theme.focus),
        ));
        spans.push(Span::styled(after, text_style));
    } else {
        spans.push(Span::styled(input.text().to_string(), text_style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
