use crate::style::Size;
use crate::style::Variant;
use crate::style::VisualState;
use formkit_core::input::InputEvent;
use formkit_core::input::KeyCode;
use formkit_core::input::KeyEvent;
use formkit_core::input::MouseEvent;
use formkit_core::keymap;
use formkit_core::render;
use formkit_core::theme::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Block;
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthChar;

/// Braille spinner shown while the field is loading; advanced via
/// [`TextField::tick`].
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const CLEAR_GLYPH: &str = "×";
const REVEAL_ON_GLYPH: &str = "◉";
const REVEAL_OFF_GLYPH: &str = "◎";
const MASK_CHAR: char = '•';

/// Key bindings for the field's two affordances. Both are also reachable by
/// mouse click on the rendered glyph.
#[derive(Clone, Debug)]
pub struct TextFieldBindings {
    pub clear: Vec<KeyEvent>,
    pub toggle_reveal: Vec<KeyEvent>,
}

impl Default for TextFieldBindings {
    fn default() -> Self {
        Self {
            clear: vec![keymap::key_ctrl('u')],
            toggle_reveal: vec![keymap::key_ctrl('r')],
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TextFieldOptions {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub helper_text: Option<String>,
    pub variant: Variant,
    pub size: Size,
    pub bindings: TextFieldBindings,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextFieldAction {
    None,
    Redraw,
    Changed,
}

#[derive(Clone, Copy, Debug)]
struct FieldLayout {
    text: Rect,
    clear_x: Option<u16>,
    reveal_x: Option<u16>,
    spinner_x: Option<u16>,
}

/// Single-line validated text input.
///
/// The widget owns the edit buffer; the caller owns validity. Push `disabled`
/// / `invalid` / `loading` / the error message before rendering each frame and
/// read the value back with [`TextField::value`].
///
/// The field masks its value when the configured label contains the substring
/// "password" (case-insensitive); a reveal affordance is rendered in that case
/// only.
pub struct TextField {
    value: String,
    cursor: usize, // char index
    scroll_x: u32, // display columns
    reveal: bool,
    disabled: bool,
    invalid: bool,
    loading: bool,
    error_message: Option<String>,
    spinner_frame: usize,
    options: TextFieldOptions,
    layout: Option<FieldLayout>,
}

impl Default for TextField {
    fn default() -> Self {
        Self::new()
    }
}

impl TextField {
    pub fn new() -> Self {
        Self::with_options(TextFieldOptions::default())
    }

    pub fn with_options(options: TextFieldOptions) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            scroll_x: 0,
            reveal: false,
            disabled: false,
            invalid: false,
            loading: false,
            error_message: None,
            spinner_frame: 0,
            options,
            layout: None,
        }
    }

    pub fn options(&self) -> &TextFieldOptions {
        &self.options
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
        self.scroll_x = 0;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn set_invalid(&mut self, invalid: bool) {
        self.invalid = invalid;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_error_message(&mut self, message: Option<String>) {
        self.error_message = message;
    }

    /// Advances the loading spinner one frame.
    pub fn tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    /// A field is a password field when its label contains "password",
    /// case-insensitive.
    pub fn is_password(&self) -> bool {
        self.options
            .label
            .as_deref()
            .is_some_and(|l| l.to_lowercase().contains("password"))
    }

    pub fn visual_state(&self) -> VisualState {
        VisualState::resolve(self.loading, self.disabled, self.invalid)
    }

    /// Loading forces the field non-editable.
    pub fn editable(&self) -> bool {
        !self.loading && !self.disabled
    }

    /// Rows this widget needs: label + field (3 for the bordered variant,
    /// 1 otherwise) + helper/error line when one would render.
    pub fn height(&self) -> u16 {
        let label = u16::from(self.options.label.is_some());
        let field = if self.options.variant.has_border() {
            3
        } else {
            1
        };
        label + field + u16::from(self.message().is_some())
    }

    /// Screen position of the edit cursor within the last rendered layout,
    /// for hosts that show the terminal cursor. `None` while not editable or
    /// before the first render.
    pub fn cursor_pos(&self) -> Option<(u16, u16)> {
        if !self.editable() {
            return None;
        }
        let layout = self.layout?;
        let col = self.cursor_display_col() as u32;
        if col < self.scroll_x {
            return None;
        }
        let dx = col - self.scroll_x;
        if dx >= layout.text.width as u32 {
            return None;
        }
        Some((layout.text.x + dx as u16, layout.text.y))
    }

    pub fn handle_event(&mut self, event: InputEvent) -> TextFieldAction {
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Paste(s) => {
                if !self.editable() {
                    return TextFieldAction::None;
                }
                let mut changed = false;
                for ch in s.chars().filter(|c| *c != '\n' && *c != '\r') {
                    self.insert_char(ch);
                    changed = true;
                }
                if changed {
                    TextFieldAction::Changed
                } else {
                    TextFieldAction::None
                }
            }
            InputEvent::Mouse(m) => self.handle_mouse(m),
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        self.layout = None;
        if area.width == 0 || area.height == 0 {
            return;
        }

        let state = self.visual_state();
        let bottom = area.y + area.height;
        let mut y = area.y;

        if let Some(label) = &self.options.label {
            if y >= bottom {
                return;
            }
            render::render_str_windowed(area.x, y, 0, area.width, buf, label, theme.header);
            y += 1;
        }

        let field_h = if self.options.variant.has_border() {
            3
        } else {
            1
        };
        if y >= bottom {
            return;
        }
        let field_h = field_h.min(bottom - y);
        let field_area = Rect::new(area.x, y, area.width, field_h);

        let inner = if self.options.variant.has_border() && field_h == 3 {
            let border_style = theme.text_muted.patch(state.patch(theme));
            let block = Block::bordered().border_style(border_style);
            let inner = block.inner(field_area);
            block.render(field_area, buf);
            inner
        } else {
            Rect::new(field_area.x, field_area.y, field_area.width, 1)
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }
        let field_row = inner.y;

        let field_style = self
            .options
            .variant
            .field_style(theme)
            .patch(state.patch(theme));
        buf.set_style(Rect::new(inner.x, field_row, inner.width, 1), field_style);

        let pad = self.options.size.padding().min(inner.width / 2);
        let text_x = inner.x + pad;
        let avail_w = inner.width - pad * 2;
        let right_x = inner.x + inner.width - 1 - pad;

        // Right-edge affordances, two columns each (glyph + gap). Loading
        // suppresses clear and reveal.
        let mut reserved: u16 = 0;
        let mut spinner_x = None;
        let mut clear_x = None;
        let mut reveal_x = None;
        if self.loading {
            if avail_w > 2 {
                spinner_x = Some(right_x);
                reserved = 2;
            }
        } else {
            let mut next_x = right_x;
            if !self.value.is_empty() && !self.disabled && avail_w > reserved + 2 {
                clear_x = Some(next_x);
                reserved += 2;
                next_x = next_x.saturating_sub(2);
            }
            if self.is_password() && avail_w > reserved + 2 {
                reveal_x = Some(next_x);
                reserved += 2;
            }
        }
        let text_w = avail_w.saturating_sub(reserved);

        if text_w > 0 {
            self.ensure_cursor_visible(text_w);
            if self.value.is_empty() {
                if let Some(placeholder) = &self.options.placeholder {
                    render::render_str_windowed(
                        text_x,
                        field_row,
                        0,
                        text_w,
                        buf,
                        placeholder,
                        theme.placeholder,
                    );
                }
            } else {
                let display = self.display_value();
                render::render_str_windowed(
                    text_x,
                    field_row,
                    self.scroll_x,
                    text_w,
                    buf,
                    &display,
                    field_style,
                );
            }
        }

        if let Some(x) = spinner_x {
            let frame = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
            buf.set_stringn(x, field_row, frame, 1, theme.accent);
        }
        if let Some(x) = clear_x {
            buf.set_stringn(x, field_row, CLEAR_GLYPH, 1, theme.text_muted);
        }
        if let Some(x) = reveal_x {
            let glyph = if self.reveal {
                REVEAL_ON_GLYPH
            } else {
                REVEAL_OFF_GLYPH
            };
            buf.set_stringn(x, field_row, glyph, 1, theme.text_muted);
        }

        self.layout = Some(FieldLayout {
            text: Rect::new(text_x, field_row, text_w, 1),
            clear_x,
            reveal_x,
            spinner_x,
        });

        let message_y = y + field_h;
        if message_y < bottom {
            if let Some((msg, is_error)) = self.message() {
                let style = if is_error {
                    theme.danger
                } else {
                    theme.text_muted
                };
                render::render_str_windowed(area.x, message_y, 0, area.width, buf, msg, style);
            }
        }
    }

    /// The helper/error line: error message only when invalid and set, helper
    /// text only when not invalid. Never both.
    fn message(&self) -> Option<(&str, bool)> {
        if self.invalid {
            self.error_message.as_deref().map(|m| (m, true))
        } else {
            self.options.helper_text.as_deref().map(|m| (m, false))
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> TextFieldAction {
        if keymap::any_match(&self.options.bindings.clear, &key) {
            return self.activate_clear();
        }
        if keymap::any_match(&self.options.bindings.toggle_reveal, &key) {
            return self.activate_reveal();
        }
        if !self.editable() {
            return TextFieldAction::None;
        }

        match key.code {
            KeyCode::Char(c) => {
                if key.modifiers.ctrl || key.modifiers.alt {
                    return TextFieldAction::None;
                }
                self.insert_char(c);
                TextFieldAction::Changed
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return TextFieldAction::None;
                }
                self.cursor -= 1;
                self.remove_char_at(self.cursor);
                TextFieldAction::Changed
            }
            KeyCode::Delete => {
                if self.cursor >= self.char_len() {
                    return TextFieldAction::None;
                }
                self.remove_char_at(self.cursor);
                TextFieldAction::Changed
            }
            KeyCode::Left => {
                if self.cursor == 0 {
                    return TextFieldAction::None;
                }
                self.cursor -= 1;
                TextFieldAction::Redraw
            }
            KeyCode::Right => {
                if self.cursor >= self.char_len() {
                    return TextFieldAction::None;
                }
                self.cursor += 1;
                TextFieldAction::Redraw
            }
            KeyCode::Home => {
                self.cursor = 0;
                TextFieldAction::Redraw
            }
            KeyCode::End => {
                self.cursor = self.char_len();
                TextFieldAction::Redraw
            }
            _ => TextFieldAction::None,
        }
    }

    fn handle_mouse(&mut self, m: MouseEvent) -> TextFieldAction {
        if !m.is_left_down() {
            return TextFieldAction::None;
        }
        let Some(layout) = self.layout else {
            return TextFieldAction::None;
        };
        if m.y != layout.text.y {
            return TextFieldAction::None;
        }
        if layout.clear_x == Some(m.x) {
            return self.activate_clear();
        }
        if layout.reveal_x == Some(m.x) {
            return self.activate_reveal();
        }
        let in_text = m.x >= layout.text.x && m.x < layout.text.x + layout.text.width;
        if in_text && self.editable() {
            let col = self.scroll_x + (m.x - layout.text.x) as u32;
            self.cursor = self.char_index_at_col(col as usize);
            return TextFieldAction::Redraw;
        }
        TextFieldAction::None
    }

    fn activate_clear(&mut self) -> TextFieldAction {
        if self.value.is_empty() || !self.editable() {
            return TextFieldAction::None;
        }
        self.value.clear();
        self.cursor = 0;
        self.scroll_x = 0;
        TextFieldAction::Changed
    }

    fn activate_reveal(&mut self) -> TextFieldAction {
        if !self.is_password() || self.loading {
            return TextFieldAction::None;
        }
        self.reveal = !self.reveal;
        TextFieldAction::Redraw
    }

    fn masked(&self) -> bool {
        self.is_password() && !self.reveal
    }

    fn display_value(&self) -> String {
        if self.masked() {
            std::iter::repeat(MASK_CHAR).take(self.char_len()).collect()
        } else {
            self.value.clone()
        }
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    fn cursor_display_col(&self) -> usize {
        if self.masked() {
            // mask characters are one column each
            return self.cursor;
        }
        self.value
            .chars()
            .take(self.cursor)
            .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
            .sum()
    }

    fn char_index_at_col(&self, target_col: usize) -> usize {
        if self.masked() {
            return target_col.min(self.char_len());
        }
        let mut cols = 0usize;
        let mut idx = 0usize;
        for ch in self.value.chars() {
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if cols + w > target_col {
                return idx;
            }
            cols += w;
            idx += 1;
        }
        idx
    }

    fn ensure_cursor_visible(&mut self, text_w: u16) {
        let col = self.cursor_display_col() as u32;
        if col < self.scroll_x {
            self.scroll_x = col;
        } else if col >= self.scroll_x + text_w as u32 {
            self.scroll_x = col - text_w as u32 + 1;
        }
    }

    fn insert_char(&mut self, ch: char) {
        let byte_idx = byte_index_from_char_index(&self.value, self.cursor);
        self.value.insert(byte_idx, ch);
        self.cursor += 1;
    }

    fn remove_char_at(&mut self, char_idx: usize) {
        let start = byte_index_from_char_index(&self.value, char_idx);
        let end = byte_index_from_char_index(&self.value, char_idx + 1);
        self.value.replace_range(start..end, "");
    }
}

fn byte_index_from_char_index(s: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    match s.char_indices().nth(char_idx) {
        Some((i, _)) => i,
        None => s.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formkit_core::input::KeyCode;

    fn field(options: TextFieldOptions) -> TextField {
        TextField::with_options(options)
    }

    fn type_str(tf: &mut TextField, s: &str) {
        for c in s.chars() {
            tf.handle_event(InputEvent::key(KeyCode::Char(c)));
        }
    }

    fn rendered_row(tf: &mut TextField, width: u16, height: u16, row: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        let theme = Theme::default();
        tf.render(area, &mut buf, &theme);
        let mut out = String::new();
        for x in 0..width {
            out.push_str(buf.cell((x, row)).map(|c| c.symbol()).unwrap_or(" "));
        }
        out
    }

    #[test]
    fn typing_changes_value() {
        let mut tf = TextField::new();
        assert_eq!(
            tf.handle_event(InputEvent::key(KeyCode::Char('a'))),
            TextFieldAction::Changed
        );
        type_str(&mut tf, "bc");
        assert_eq!(tf.value(), "abc");
        tf.handle_event(InputEvent::key(KeyCode::Backspace));
        assert_eq!(tf.value(), "ab");
    }

    #[test]
    fn clear_binding_empties_value() {
        let mut tf = TextField::new();
        tf.set_value("abc@gmail.com");
        assert_eq!(
            tf.handle_event(InputEvent::Key(keymap::key_ctrl('u'))),
            TextFieldAction::Changed
        );
        assert_eq!(tf.value(), "");
        // clearing an empty field is a no-op
        assert_eq!(
            tf.handle_event(InputEvent::Key(keymap::key_ctrl('u'))),
            TextFieldAction::None
        );
    }

    #[test]
    fn clear_affordance_rendered_and_clickable() {
        let mut tf = field(TextFieldOptions {
            variant: Variant::Ghost,
            size: Size::Sm,
            ..Default::default()
        });
        tf.set_value("abc@gmail.com");
        let row = rendered_row(&mut tf, 20, 1, 0);
        assert!(row.contains('×'));

        let x = tf.layout.unwrap().clear_x.unwrap();
        assert_eq!(tf.handle_event(InputEvent::click(x, 0)), TextFieldAction::Changed);
        assert_eq!(tf.value(), "");
    }

    #[test]
    fn disabled_ignores_edits() {
        let mut tf = TextField::new();
        tf.set_disabled(true);
        assert_eq!(
            tf.handle_event(InputEvent::key(KeyCode::Char('a'))),
            TextFieldAction::None
        );
        assert_eq!(tf.value(), "");
    }

    #[test]
    fn loading_suppresses_edits_and_affordances() {
        let mut tf = field(TextFieldOptions {
            label: Some("Password".to_string()),
            variant: Variant::Ghost,
            size: Size::Sm,
            ..Default::default()
        });
        tf.set_value("secret");
        tf.set_loading(true);
        assert_eq!(
            tf.handle_event(InputEvent::key(KeyCode::Char('x'))),
            TextFieldAction::None
        );
        let _ = rendered_row(&mut tf, 20, 2, 1);
        let layout = tf.layout.unwrap();
        assert!(layout.clear_x.is_none());
        assert!(layout.reveal_x.is_none());
        assert!(layout.spinner_x.is_some());
    }

    #[test]
    fn password_label_masks_value_until_revealed() {
        let mut tf = field(TextFieldOptions {
            label: Some("Password".to_string()),
            variant: Variant::Ghost,
            size: Size::Sm,
            ..Default::default()
        });
        assert!(tf.is_password());
        type_str(&mut tf, "abc");
        let row = rendered_row(&mut tf, 20, 2, 1);
        assert!(row.contains("•••"));
        assert!(!row.contains("abc"));

        assert_eq!(
            tf.handle_event(InputEvent::Key(keymap::key_ctrl('r'))),
            TextFieldAction::Redraw
        );
        let row = rendered_row(&mut tf, 20, 2, 1);
        assert!(row.contains("abc"));
    }

    #[test]
    fn non_password_field_has_no_reveal_toggle() {
        let mut tf = field(TextFieldOptions {
            label: Some("Name".to_string()),
            variant: Variant::Ghost,
            size: Size::Sm,
            ..Default::default()
        });
        type_str(&mut tf, "ab");
        assert_eq!(
            tf.handle_event(InputEvent::Key(keymap::key_ctrl('r'))),
            TextFieldAction::None
        );
        let _ = rendered_row(&mut tf, 20, 2, 1);
        assert!(tf.layout.unwrap().reveal_x.is_none());
    }

    #[test]
    fn error_message_replaces_helper_text() {
        let mut tf = field(TextFieldOptions {
            helper_text: Some("Please enter your full name.".to_string()),
            variant: Variant::Ghost,
            size: Size::Sm,
            ..Default::default()
        });
        type_str(&mut tf, "ab");
        tf.set_invalid(true);
        tf.set_error_message(Some("Name must be at least 3 characters".to_string()));
        let row = rendered_row(&mut tf, 40, 2, 1);
        assert!(row.contains("Name must be at least 3 characters"));
        assert!(!row.contains("Please enter"));

        tf.set_invalid(false);
        let row = rendered_row(&mut tf, 40, 2, 1);
        assert!(row.contains("Please enter your full name."));
        assert!(!row.contains("at least 3"));
    }

    #[test]
    fn invalid_without_message_renders_helper_line_empty() {
        let mut tf = field(TextFieldOptions {
            helper_text: Some("hint".to_string()),
            variant: Variant::Ghost,
            size: Size::Sm,
            ..Default::default()
        });
        tf.set_invalid(true);
        let row = rendered_row(&mut tf, 10, 2, 1);
        assert!(!row.contains("hint"));
    }

    #[test]
    fn height_accounts_for_label_border_and_message() {
        let tf = field(TextFieldOptions {
            label: Some("Name".to_string()),
            helper_text: Some("hint".to_string()),
            variant: Variant::Outlined,
            ..Default::default()
        });
        assert_eq!(tf.height(), 5);

        let tf = field(TextFieldOptions {
            variant: Variant::Ghost,
            ..Default::default()
        });
        assert_eq!(tf.height(), 1);
    }

    #[test]
    fn paste_strips_newlines() {
        let mut tf = TextField::new();
        tf.handle_event(InputEvent::Paste("a\nb\r\nc".to_string()));
        assert_eq!(tf.value(), "abc");
    }

    #[test]
    fn long_value_scrolls_to_keep_cursor_visible() {
        let mut tf = field(TextFieldOptions {
            variant: Variant::Ghost,
            size: Size::Sm,
            ..Default::default()
        });
        type_str(&mut tf, "0123456789abcdef");
        let row = rendered_row(&mut tf, 8, 1, 0);
        // window ends at the cursor, which follows the last typed char
        assert!(row.contains("def"));
        assert!(!row.contains("012"));
    }
}
