use formkit_core::input::InputEvent;
use formkit_core::input::KeyCode;
use formkit_core::input::KeyEvent;
use formkit_core::input::MouseEvent;
use formkit_core::keymap;
use formkit_core::render;
use formkit_core::theme::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

const SORT_ASC_GLYPH: &str = "▲";
const SORT_DESC_GLYPH: &str = "▼";
const SORT_IDLE_GLYPH: &str = "↕";
const CHECKBOX_ON: &str = "[x]";
const CHECKBOX_OFF: &str = "[ ]";
const CHECKBOX_W: u16 = 3;

/// A typed cell value with a natural ordering.
///
/// Same-variant values compare with the native ordering of the variant;
/// mixed variants are incomparable and compare equal, so a column mixing
/// types sorts as if all its values were equal.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn cmp_natural(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(v as i64)
    }
}

impl From<u32> for CellValue {
    fn from(v: u32) -> Self {
        CellValue::Int(v as i64)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

/// Column descriptor: unique key, display title, fixed width, and an accessor
/// reading the cell value out of a row. Declaration order is render order.
pub struct Column<T> {
    key: String,
    title: String,
    width: u16,
    sortable: bool,
    accessor: Arc<dyn Fn(&T) -> CellValue>,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            title: self.title.clone(),
            width: self.width,
            sortable: self.sortable,
            accessor: self.accessor.clone(),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("width", &self.width)
            .field("sortable", &self.sortable)
            .finish_non_exhaustive()
    }
}

impl<T> Column<T> {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        width: u16,
        accessor: impl Fn(&T) -> CellValue + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            width,
            sortable: false,
            accessor: Arc::new(accessor),
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SortState {
    col: usize,
    direction: SortDirection,
}

/// Key bindings for table interactions; every gesture is also reachable by
/// mouse on the rendered header/rows.
#[derive(Clone, Debug)]
pub struct TableBindings {
    pub sort: Vec<KeyEvent>,
    pub toggle_row: Vec<KeyEvent>,
    pub select_all: Vec<KeyEvent>,
    pub activate: Vec<KeyEvent>,
    pub clear: Vec<KeyEvent>,
}

impl Default for TableBindings {
    fn default() -> Self {
        Self {
            sort: vec![keymap::key_char('s')],
            toggle_row: vec![keymap::key_char(' ')],
            select_all: vec![keymap::key_char('a')],
            activate: vec![KeyEvent::new(KeyCode::Enter)],
            clear: vec![KeyEvent::new(KeyCode::Esc)],
        }
    }
}

#[derive(Clone, Debug)]
pub struct DataTableOptions {
    pub selectable: bool,
    pub col_gap: u16,
    pub loading_text: String,
    pub empty_text: String,
    pub bindings: TableBindings,
}

impl Default for DataTableOptions {
    fn default() -> Self {
        Self {
            selectable: false,
            col_gap: 1,
            loading_text: "Loading...".to_string(),
            empty_text: "No data available".to_string(),
            bindings: TableBindings::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataTableAction<K> {
    None,
    Redraw,
    SelectionChanged,
    Activated(K),
}

#[derive(Clone, Debug)]
struct TableLayout {
    header_y: u16,
    body: Rect,
    checkbox_span: Option<(u16, u16)>,
    col_spans: Vec<(u16, u16)>,
}

/// Sortable, multi-selectable data table, generic over the row type `T` and
/// an explicit row-identity key `K`.
///
/// The caller supplies a key-extraction function at construction; selection
/// membership is tracked by key, so it survives re-sorting and row-set
/// changes. There is no positional-identity fallback.
///
/// The widget owns sort and selection state; the caller observes them through
/// accessors and the [`DataTableAction`] returned by `handle_event`. Sort
/// state changes only through user interaction, never when the row set is
/// replaced.
pub struct DataTable<T, K> {
    columns: Vec<Column<T>>,
    rows: Vec<T>,
    row_key: Box<dyn Fn(&T) -> K>,
    options: DataTableOptions,
    loading: bool,
    sort: Option<SortState>,
    view: Vec<usize>,
    selected: HashSet<K>,
    cursor: Option<usize>, // index into `view`
    focused_col: usize,
    scroll_y: usize,
    layout: Option<TableLayout>,
}

impl<T, K: Eq + Hash + Clone> DataTable<T, K> {
    pub fn new(columns: Vec<Column<T>>, row_key: impl Fn(&T) -> K + 'static) -> Self {
        Self::with_options(columns, row_key, DataTableOptions::default())
    }

    pub fn with_options(
        columns: Vec<Column<T>>,
        row_key: impl Fn(&T) -> K + 'static,
        options: DataTableOptions,
    ) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            row_key: Box::new(row_key),
            options,
            loading: false,
            sort: None,
            view: Vec::new(),
            selected: HashSet::new(),
            cursor: None,
            focused_col: 0,
            scroll_y: 0,
            layout: None,
        }
    }

    pub fn options(&self) -> &DataTableOptions {
        &self.options
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    /// Replaces the row set. Sort state is retained and re-applied; the
    /// selection is kept as-is (call [`DataTable::prune_selection`] to drop
    /// keys that no longer exist).
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.resort();
        if self.view.is_empty() {
            self.cursor = None;
            self.scroll_y = 0;
        } else if let Some(c) = self.cursor {
            self.cursor = Some(c.min(self.view.len() - 1));
        }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Rows in their current display (sorted) order.
    pub fn display_rows(&self) -> impl Iterator<Item = &T> {
        self.view.iter().map(|&i| &self.rows[i])
    }

    pub fn sort_state(&self) -> Option<(&str, SortDirection)> {
        self.sort
            .map(|s| (self.columns[s.col].key(), s.direction))
    }

    /// Programmatic equivalent of activating the header of `column_key`.
    pub fn sort_by_key(&mut self, column_key: &str) -> DataTableAction<K> {
        match self.columns.iter().position(|c| c.key() == column_key) {
            Some(idx) => self.toggle_sort(idx),
            None => DataTableAction::None,
        }
    }

    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    /// Selected rows in display order.
    pub fn selected_rows(&self) -> Vec<&T> {
        self.view
            .iter()
            .map(|&i| &self.rows[i])
            .filter(|r| self.selected.contains(&(self.row_key)(r)))
            .collect()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Drops selected keys that no longer appear in the row set. Returns
    /// `true` when the selection changed.
    pub fn prune_selection(&mut self) -> bool {
        let live: HashSet<K> = self.rows.iter().map(|r| (self.row_key)(r)).collect();
        let before = self.selected.len();
        self.selected.retain(|k| live.contains(k));
        self.selected.len() != before
    }

    /// Checked iff every displayed row is selected and the displayed set is
    /// non-empty.
    pub fn header_checkbox_checked(&self) -> bool {
        self.all_displayed_selected()
    }

    pub fn cursor_row(&self) -> Option<&T> {
        self.cursor.map(|c| &self.rows[self.view[c]])
    }

    pub fn handle_event(&mut self, event: InputEvent) -> DataTableAction<K> {
        if self.loading {
            // the placeholder row has no interactions
            return DataTableAction::None;
        }
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Mouse(m) => self.handle_mouse(m),
            InputEvent::Paste(_) => DataTableAction::None,
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        self.layout = None;
        if area.width == 0 || area.height == 0 {
            return;
        }

        let header_y = area.y;
        let body = Rect::new(
            area.x,
            area.y + 1,
            area.width,
            area.height.saturating_sub(1),
        );

        let gap = self.options.col_gap;
        let mut x = area.x;
        let right = area.x + area.width;

        let checkbox_span = if self.options.selectable && x + CHECKBOX_W <= right {
            let span = (x, CHECKBOX_W);
            let glyph = if self.header_checkbox_checked() {
                CHECKBOX_ON
            } else {
                CHECKBOX_OFF
            };
            buf.set_stringn(x, header_y, glyph, CHECKBOX_W as usize, theme.header);
            x += CHECKBOX_W + gap;
            Some(span)
        } else {
            None
        };

        let mut col_spans = Vec::with_capacity(self.columns.len());
        for (idx, col) in self.columns.iter().enumerate() {
            if x >= right {
                break;
            }
            let w = col.width().min(right - x);
            let style = if idx == self.focused_col {
                theme.header.patch(theme.accent)
            } else {
                theme.header
            };
            let title = match self.sort_glyph(idx) {
                Some(glyph) => format!("{} {}", col.title(), glyph),
                None => col.title().to_string(),
            };
            render::render_str_windowed(x, header_y, 0, w, buf, &title, style);
            col_spans.push((x, w));
            x += w + gap;
        }

        self.layout = Some(TableLayout {
            header_y,
            body,
            checkbox_span,
            col_spans,
        });

        if body.height == 0 {
            return;
        }

        if self.loading {
            render::render_str_windowed(
                body.x,
                body.y,
                0,
                body.width,
                buf,
                &self.options.loading_text,
                theme.text_muted,
            );
            return;
        }
        if self.view.is_empty() {
            render::render_str_windowed(
                body.x,
                body.y,
                0,
                body.width,
                buf,
                &self.options.empty_text,
                theme.text_muted,
            );
            return;
        }

        self.scroll_y = self
            .scroll_y
            .min(self.view.len().saturating_sub(body.height as usize));
        self.clamp_scroll_to_cursor(body.height as usize);

        for dy in 0..body.height {
            let idx = self.scroll_y + dy as usize;
            if idx >= self.view.len() {
                break;
            }
            let row = &self.rows[self.view[idx]];
            let key = (self.row_key)(row);
            let is_selected = self.selected.contains(&key);
            let is_cursor = self.cursor == Some(idx);

            let mut style = if is_selected {
                theme.selected
            } else {
                theme.text_primary
            };
            if is_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }

            let y = body.y + dy;
            buf.set_style(Rect::new(body.x, y, body.width, 1), style);

            let mut x = body.x;
            if self.options.selectable {
                let glyph = if is_selected { CHECKBOX_ON } else { CHECKBOX_OFF };
                buf.set_stringn(x, y, glyph, CHECKBOX_W as usize, style);
                x += CHECKBOX_W + gap;
            }
            for col in &self.columns {
                if x >= right {
                    break;
                }
                let w = col.width().min(right - x);
                let cell = (col.accessor)(row).to_string();
                render::render_str_windowed(x, y, 0, w, buf, &cell, style);
                x += w + gap;
            }
        }
    }

    fn sort_glyph(&self, col_idx: usize) -> Option<&'static str> {
        if !self.columns[col_idx].is_sortable() {
            return None;
        }
        match self.sort {
            Some(s) if s.col == col_idx => Some(match s.direction {
                SortDirection::Ascending => SORT_ASC_GLYPH,
                SortDirection::Descending => SORT_DESC_GLYPH,
            }),
            _ => Some(SORT_IDLE_GLYPH),
        }
    }

    /// Rebuilds the display order from the original row order, so equal sort
    /// keys keep their original relative order in both directions.
    fn resort(&mut self) {
        self.view = (0..self.rows.len()).collect();
        let Some(sort) = self.sort else {
            return;
        };
        let accessor = &self.columns[sort.col].accessor;
        let keys: Vec<CellValue> = self.rows.iter().map(|r| accessor(r)).collect();
        self.view.sort_by(|&a, &b| {
            let ord = keys[a].cmp_natural(&keys[b]);
            match sort.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }

    fn toggle_sort(&mut self, col_idx: usize) -> DataTableAction<K> {
        if col_idx >= self.columns.len() || !self.columns[col_idx].is_sortable() {
            return DataTableAction::None;
        }
        self.sort = Some(match self.sort {
            Some(s) if s.col == col_idx => SortState {
                col: col_idx,
                direction: match s.direction {
                    SortDirection::Ascending => SortDirection::Descending,
                    SortDirection::Descending => SortDirection::Ascending,
                },
            },
            _ => SortState {
                col: col_idx,
                direction: SortDirection::Ascending,
            },
        });
        self.resort();
        DataTableAction::Redraw
    }

    fn all_displayed_selected(&self) -> bool {
        !self.view.is_empty()
            && self
                .view
                .iter()
                .all(|&i| self.selected.contains(&(self.row_key)(&self.rows[i])))
    }

    /// Select-all is a toggle: fully selected -> clear everything, otherwise
    /// select every displayed row.
    fn toggle_select_all(&mut self) -> DataTableAction<K> {
        if !self.options.selectable || self.view.is_empty() {
            return DataTableAction::None;
        }
        if self.all_displayed_selected() {
            self.selected.clear();
        } else {
            for &i in &self.view {
                self.selected.insert((self.row_key)(&self.rows[i]));
            }
        }
        DataTableAction::SelectionChanged
    }

    fn toggle_row_at(&mut self, view_idx: usize) -> DataTableAction<K> {
        let key = (self.row_key)(&self.rows[self.view[view_idx]]);
        if !self.selected.remove(&key) {
            self.selected.insert(key);
        }
        DataTableAction::SelectionChanged
    }

    fn handle_key(&mut self, key: KeyEvent) -> DataTableAction<K> {
        let b = &self.options.bindings;
        if keymap::any_match(&b.clear, &key) {
            if self.selected.is_empty() {
                return DataTableAction::None;
            }
            self.selected.clear();
            return DataTableAction::SelectionChanged;
        }
        if keymap::any_match(&b.select_all, &key) {
            return self.toggle_select_all();
        }
        if keymap::any_match(&b.toggle_row, &key) {
            return match self.cursor {
                Some(c) if self.options.selectable => self.toggle_row_at(c),
                _ => DataTableAction::None,
            };
        }
        if keymap::any_match(&b.sort, &key) {
            return self.toggle_sort(self.focused_col);
        }
        if keymap::any_match(&b.activate, &key) {
            return match self.cursor {
                Some(c) => {
                    DataTableAction::Activated((self.row_key)(&self.rows[self.view[c]]))
                }
                None => DataTableAction::None,
            };
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor_by(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor_by(-1),
            KeyCode::Home | KeyCode::Char('g') => self.move_cursor_to(0),
            KeyCode::End | KeyCode::Char('G') => {
                self.move_cursor_to(self.view.len().saturating_sub(1))
            }
            KeyCode::Left => self.move_focused_col(-1),
            KeyCode::Right => self.move_focused_col(1),
            _ => DataTableAction::None,
        }
    }

    fn handle_mouse(&mut self, m: MouseEvent) -> DataTableAction<K> {
        if !m.is_left_down() {
            return DataTableAction::None;
        }
        let Some(layout) = self.layout.clone() else {
            return DataTableAction::None;
        };

        if m.y == layout.header_y {
            if let Some((cx, cw)) = layout.checkbox_span {
                if m.x >= cx && m.x < cx + cw {
                    return self.toggle_select_all();
                }
            }
            for (idx, &(sx, sw)) in layout.col_spans.iter().enumerate() {
                if m.x >= sx && m.x < sx + sw {
                    self.focused_col = idx;
                    return self.toggle_sort(idx);
                }
            }
            return DataTableAction::None;
        }

        let body = layout.body;
        if m.y >= body.y && m.y < body.y + body.height && m.x >= body.x && m.x < body.x + body.width
        {
            let idx = self.scroll_y + (m.y - body.y) as usize;
            if idx >= self.view.len() {
                return DataTableAction::None;
            }
            self.cursor = Some(idx);
            // A click on the row checkbox and a click elsewhere on the row go
            // through this single path, so one click toggles exactly once.
            if self.options.selectable {
                return self.toggle_row_at(idx);
            }
            return DataTableAction::Redraw;
        }
        DataTableAction::None
    }

    fn move_cursor_by(&mut self, delta: i64) -> DataTableAction<K> {
        if self.view.is_empty() {
            self.cursor = None;
            return DataTableAction::None;
        }
        let cur = self.cursor.unwrap_or(0) as i64;
        let next = (cur + delta).clamp(0, self.view.len() as i64 - 1) as usize;
        self.move_cursor_to(next)
    }

    fn move_cursor_to(&mut self, idx: usize) -> DataTableAction<K> {
        if self.view.is_empty() {
            self.cursor = None;
            return DataTableAction::None;
        }
        let idx = idx.min(self.view.len() - 1);
        if self.cursor == Some(idx) {
            return DataTableAction::None;
        }
        self.cursor = Some(idx);
        let body_h = self
            .layout
            .as_ref()
            .map(|l| l.body.height as usize)
            .unwrap_or(0);
        self.clamp_scroll_to_cursor(body_h);
        DataTableAction::Redraw
    }

    fn move_focused_col(&mut self, delta: i64) -> DataTableAction<K> {
        if self.columns.is_empty() {
            return DataTableAction::None;
        }
        let next =
            (self.focused_col as i64 + delta).clamp(0, self.columns.len() as i64 - 1) as usize;
        if next == self.focused_col {
            return DataTableAction::None;
        }
        self.focused_col = next;
        DataTableAction::Redraw
    }

    fn clamp_scroll_to_cursor(&mut self, body_h: usize) {
        let Some(cursor) = self.cursor else {
            return;
        };
        if body_h == 0 {
            return;
        }
        if cursor < self.scroll_y {
            self.scroll_y = cursor;
        } else if cursor >= self.scroll_y + body_h {
            self.scroll_y = cursor - body_h + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formkit_core::input::KeyCode;

    #[derive(Clone, Debug, PartialEq)]
    struct User {
        id: u32,
        name: &'static str,
    }

    fn users(list: &[(u32, &'static str)]) -> Vec<User> {
        list.iter().map(|&(id, name)| User { id, name }).collect()
    }

    fn columns() -> Vec<Column<User>> {
        vec![
            Column::new("id", "ID", 4, |u: &User| u.id.into()).sortable(),
            Column::new("name", "Name", 10, |u: &User| u.name.into()).sortable(),
            Column::new("email", "Email", 20, |u: &User| {
                format!("{}@example.com", u.name).into()
            }),
        ]
    }

    fn table(selectable: bool) -> DataTable<User, u32> {
        DataTable::with_options(
            columns(),
            |u| u.id,
            DataTableOptions {
                selectable,
                ..Default::default()
            },
        )
    }

    fn names(t: &DataTable<User, u32>) -> Vec<&'static str> {
        t.display_rows().map(|u| u.name).collect()
    }

    fn render_to(t: &mut DataTable<User, u32>, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        let theme = Theme::default();
        t.render(area, &mut buf, &theme);
        buf
    }

    fn row_text(buf: &Buffer, width: u16, y: u16) -> String {
        let mut out = String::new();
        for x in 0..width {
            out.push_str(buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "));
        }
        out
    }

    #[test]
    fn ascending_then_descending_is_exact_reverse() {
        let mut t = table(false);
        t.set_rows(users(&[(1, "Bob"), (2, "Ann"), (3, "Eve"), (4, "Cal")]));
        t.sort_by_key("name");
        let asc = names(&t);
        t.sort_by_key("name");
        let mut desc = names(&t);
        desc.reverse();
        assert_eq!(asc, desc);
        assert_eq!(asc, vec!["Ann", "Bob", "Cal", "Eve"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut t = table(false);
        t.set_rows(users(&[(1, "Ann"), (2, "Bob"), (3, "Ann"), (4, "Bob")]));
        t.sort_by_key("name");
        let ids: Vec<u32> = t.display_rows().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 3, 2, 4]);

        // descending keeps original relative order among equals too
        t.sort_by_key("name");
        let ids: Vec<u32> = t.display_rows().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn click_scenario_ann_then_bob() {
        let mut t = table(false);
        t.set_rows(users(&[(1, "Bob"), (2, "Ann")]));
        let buf = render_to(&mut t, 40, 4);
        assert!(row_text(&buf, 40, 0).contains("Name ↕"));

        // click the Name header
        let (x, _) = t.layout.as_ref().unwrap().col_spans[1];
        t.handle_event(InputEvent::click(x, 0));
        assert_eq!(names(&t), vec!["Ann", "Bob"]);
        t.handle_event(InputEvent::click(x, 0));
        assert_eq!(names(&t), vec!["Bob", "Ann"]);
    }

    #[test]
    fn non_sortable_header_click_is_a_noop() {
        let mut t = table(false);
        t.set_rows(users(&[(1, "Bob"), (2, "Ann")]));
        let _ = render_to(&mut t, 50, 4);
        let (x, _) = t.layout.as_ref().unwrap().col_spans[2];
        assert_eq!(t.handle_event(InputEvent::click(x, 0)), DataTableAction::None);
        assert_eq!(names(&t), vec!["Bob", "Ann"]);
        assert!(t.sort_state().is_none());
    }

    #[test]
    fn sort_survives_row_replacement() {
        let mut t = table(false);
        t.set_rows(users(&[(1, "Bob"), (2, "Ann")]));
        t.sort_by_key("name");
        t.set_rows(users(&[(1, "Bob"), (2, "Ann"), (3, "Aaa")]));
        assert_eq!(names(&t), vec!["Aaa", "Ann", "Bob"]);
        assert_eq!(
            t.sort_state(),
            Some(("name", SortDirection::Ascending))
        );
    }

    #[test]
    fn sorting_does_not_mutate_rows() {
        let mut t = table(false);
        let original = users(&[(1, "Bob"), (2, "Ann")]);
        t.set_rows(original.clone());
        t.sort_by_key("name");
        assert_eq!(t.rows(), original.as_slice());
    }

    #[test]
    fn select_all_is_a_toggle() {
        let mut t = table(true);
        t.set_rows(users(&[(1, "Bob"), (2, "Ann"), (3, "Eve")]));
        assert_eq!(
            t.handle_event(InputEvent::key(KeyCode::Char('a'))),
            DataTableAction::SelectionChanged
        );
        assert_eq!(t.selection_len(), 3);
        assert!(t.header_checkbox_checked());

        assert_eq!(
            t.handle_event(InputEvent::key(KeyCode::Char('a'))),
            DataTableAction::SelectionChanged
        );
        assert_eq!(t.selection_len(), 0);
        assert!(!t.header_checkbox_checked());
    }

    #[test]
    fn row_toggle_by_key_and_mouse() {
        let mut t = table(true);
        t.set_rows(users(&[(1, "Bob"), (2, "Ann")]));
        t.handle_event(InputEvent::key(KeyCode::Down)); // cursor on Ann (display row 1)
        assert_eq!(
            t.handle_event(InputEvent::key(KeyCode::Char(' '))),
            DataTableAction::SelectionChanged
        );
        assert_eq!(t.selection_len(), 1);
        assert!(t.is_selected(&2));

        // a single click on the first row's checkbox cell toggles exactly once
        let _ = render_to(&mut t, 40, 4);
        assert_eq!(
            t.handle_event(InputEvent::click(0, 1)),
            DataTableAction::SelectionChanged
        );
        assert_eq!(t.selection_len(), 2);
        assert!(t.is_selected(&1));
    }

    #[test]
    fn selection_matches_checked_checkboxes() {
        let mut t = table(true);
        t.set_rows(users(&[(1, "Bob"), (2, "Ann"), (3, "Eve")]));
        let _ = render_to(&mut t, 40, 5);
        t.handle_event(InputEvent::click(0, 1));
        t.handle_event(InputEvent::click(0, 3));
        let buf = render_to(&mut t, 40, 5);
        let checked = (1..5)
            .filter(|&y| row_text(&buf, 40, y).contains("[x]"))
            .count();
        assert_eq!(checked, t.selection_len());
        assert_eq!(checked, 2);
    }

    #[test]
    fn selection_keyed_by_id_survives_sorting() {
        let mut t = table(true);
        t.set_rows(users(&[(1, "Bob"), (2, "Ann")]));
        let _ = render_to(&mut t, 40, 4);
        t.handle_event(InputEvent::click(0, 1)); // selects Bob (id 1)
        t.sort_by_key("name"); // Bob moves to the second display row
        assert!(t.is_selected(&1));
        assert_eq!(
            t.selected_rows().iter().map(|u| u.name).collect::<Vec<_>>(),
            vec!["Bob"]
        );
    }

    #[test]
    fn loading_renders_exactly_one_placeholder_row() {
        let mut t = table(false);
        t.set_rows(users(&[(1, "Bob"), (2, "Ann"), (3, "Eve")]));
        t.set_loading(true);
        let buf = render_to(&mut t, 40, 6);
        assert!(row_text(&buf, 40, 1).contains("Loading..."));
        for y in 2..6 {
            assert_eq!(row_text(&buf, 40, y).trim(), "");
        }
    }

    #[test]
    fn empty_rows_render_exactly_one_no_data_row() {
        let mut t = table(false);
        let buf = render_to(&mut t, 40, 5);
        assert!(row_text(&buf, 40, 1).contains("No data available"));
        for y in 2..5 {
            assert_eq!(row_text(&buf, 40, y).trim(), "");
        }
    }

    #[test]
    fn loading_table_ignores_interaction() {
        let mut t = table(true);
        t.set_rows(users(&[(1, "Bob")]));
        t.set_loading(true);
        let _ = render_to(&mut t, 40, 4);
        assert_eq!(
            t.handle_event(InputEvent::key(KeyCode::Char('a'))),
            DataTableAction::None
        );
        assert_eq!(t.selection_len(), 0);
    }

    #[test]
    fn prune_selection_drops_missing_keys() {
        let mut t = table(true);
        t.set_rows(users(&[(1, "Bob"), (2, "Ann")]));
        t.handle_event(InputEvent::key(KeyCode::Char('a')));
        assert_eq!(t.selection_len(), 2);
        t.set_rows(users(&[(1, "Bob")]));
        assert!(t.prune_selection());
        assert_eq!(t.selection_len(), 1);
        assert!(t.is_selected(&1));
        assert!(!t.prune_selection());
    }

    #[test]
    fn escape_clears_a_nonempty_selection() {
        let mut t = table(true);
        t.set_rows(users(&[(1, "Bob"), (2, "Ann")]));
        t.handle_event(InputEvent::key(KeyCode::Char('a')));
        assert_eq!(
            t.handle_event(InputEvent::key(KeyCode::Esc)),
            DataTableAction::SelectionChanged
        );
        assert_eq!(t.selection_len(), 0);
        assert_eq!(
            t.handle_event(InputEvent::key(KeyCode::Esc)),
            DataTableAction::None
        );
    }

    #[test]
    fn keyboard_sort_on_focused_column() {
        let mut t = table(false);
        t.set_rows(users(&[(1, "Bob"), (2, "Ann")]));
        t.handle_event(InputEvent::key(KeyCode::Right)); // focus "name"
        assert_eq!(
            t.handle_event(InputEvent::key(KeyCode::Char('s'))),
            DataTableAction::Redraw
        );
        assert_eq!(names(&t), vec!["Ann", "Bob"]);

        t.handle_event(InputEvent::key(KeyCode::Right)); // focus "email", not sortable
        assert_eq!(
            t.handle_event(InputEvent::key(KeyCode::Char('s'))),
            DataTableAction::None
        );
    }

    #[test]
    fn activate_reports_cursor_row_key() {
        let mut t = table(false);
        t.set_rows(users(&[(1, "Bob"), (2, "Ann")]));
        t.handle_event(InputEvent::key(KeyCode::Down)); // cursor on display row 1
        assert_eq!(
            t.handle_event(InputEvent::key(KeyCode::Enter)),
            DataTableAction::Activated(2)
        );
    }

    #[test]
    fn mixed_cell_values_compare_equal() {
        assert_eq!(
            CellValue::from(1).cmp_natural(&CellValue::from("1")),
            Ordering::Equal
        );
        assert_eq!(
            CellValue::from(1).cmp_natural(&CellValue::from(2)),
            Ordering::Less
        );
        assert_eq!(
            CellValue::from("b").cmp_natural(&CellValue::from("a")),
            Ordering::Greater
        );
    }
}
