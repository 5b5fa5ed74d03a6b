use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use formkit::crossterm_input::input_event_from_crossterm;
use formkit::input::InputEvent;
use formkit::input::KeyCode;
use formkit::style::Size;
use formkit::style::Variant;
use formkit::table::Column;
use formkit::table::DataTable;
use formkit::table::DataTableOptions;
use formkit::text_field::TextField;
use formkit::text_field::TextFieldAction;
use formkit::text_field::TextFieldOptions;
use formkit::theme::Theme;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::text::Span;
use std::io;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Focus {
    Name,
    Gmail,
    Table,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Name => Focus::Gmail,
            Focus::Gmail => Focus::Table,
            Focus::Table => Focus::Name,
        }
    }
}

struct App {
    name_field: TextField,
    gmail_field: TextField,
    table: DataTable<User, u32>,
    focus: Focus,
}

fn seed_users() -> Vec<User> {
    [
        (1, "Alice", "alice@example.com"),
        (2, "Bob", "bob@example.com"),
        (3, "Charlie", "charlie@example.com"),
    ]
    .into_iter()
    .map(|(id, name, email)| User {
        id,
        name: name.to_string(),
        email: email.to_string(),
    })
    .collect()
}

fn is_valid_gmail(value: &str) -> bool {
    // mirrors ^\S+@gmail.com$: no whitespace, non-empty local part
    match value.strip_suffix("@gmail.com") {
        Some(local) => !local.is_empty() && !value.chars().any(char::is_whitespace),
        None => false,
    }
}

fn name_long_enough(value: &str) -> bool {
    value.chars().count() >= 3
}

impl App {
    fn new() -> Self {
        let name_field = TextField::with_options(TextFieldOptions {
            label: Some("Name".to_string()),
            placeholder: Some("Enter your name".to_string()),
            helper_text: Some("Please enter your full name.".to_string()),
            variant: Variant::Filled,
            size: Size::Md,
            ..Default::default()
        });
        let gmail_field = TextField::with_options(TextFieldOptions {
            label: Some("Gmail".to_string()),
            placeholder: Some("Enter your Gmail address".to_string()),
            helper_text: Some("Please enter a valid Gmail address.".to_string()),
            variant: Variant::Filled,
            size: Size::Md,
            ..Default::default()
        });

        let columns = vec![
            Column::new("id", "ID", 4, |u: &User| u.id.into()).sortable(),
            Column::new("name", "Name", 14, |u: &User| u.name.clone().into()).sortable(),
            Column::new("email", "Email", 26, |u: &User| u.email.clone().into()),
        ];
        let table = DataTable::with_options(
            columns,
            |u: &User| u.id,
            DataTableOptions {
                selectable: true,
                ..Default::default()
            },
        );

        let mut app = Self {
            name_field,
            gmail_field,
            table,
            focus: Focus::Name,
        };
        app.refresh_rows();
        app
    }

    /// Recomputes validity, the synthesized row, and the pruned selection
    /// after any input change.
    fn refresh_rows(&mut self) {
        let name = self.name_field.value().to_string();
        let gmail = self.gmail_field.value().to_string();

        let name_invalid = !name.is_empty() && !name_long_enough(&name);
        self.name_field.set_invalid(name_invalid);
        self.name_field.set_error_message(if name_invalid {
            Some("Name must be at least 3 characters".to_string())
        } else {
            None
        });

        let gmail_invalid = !gmail.is_empty() && !is_valid_gmail(&gmail);
        self.gmail_field.set_invalid(gmail_invalid);
        self.gmail_field.set_error_message(if gmail_invalid {
            Some("Please enter a valid Gmail address".to_string())
        } else {
            None
        });

        let mut rows = seed_users();
        if name_long_enough(&name) && is_valid_gmail(&gmail) {
            rows.push(User {
                id: rows.len() as u32 + 1,
                name,
                email: gmail,
            });
        }
        self.table.set_rows(rows);
        self.table.prune_selection();
    }

    fn handle(&mut self, event: InputEvent) {
        if let InputEvent::Key(key) = &event {
            if key.code == KeyCode::Tab {
                self.focus = self.focus.next();
                return;
            }
        }

        match &event {
            InputEvent::Mouse(_) => {
                // every widget hit-tests its own last layout
                let name_changed = self.name_field.handle_event(event.clone());
                let gmail_changed = self.gmail_field.handle_event(event.clone());
                self.table.handle_event(event);
                if name_changed == TextFieldAction::Changed
                    || gmail_changed == TextFieldAction::Changed
                {
                    self.refresh_rows();
                }
            }
            _ => match self.focus {
                Focus::Name => {
                    if self.name_field.handle_event(event) == TextFieldAction::Changed {
                        self.refresh_rows();
                    }
                }
                Focus::Gmail => {
                    if self.gmail_field.handle_event(event) == TextFieldAction::Changed {
                        self.refresh_rows();
                    }
                }
                Focus::Table => {
                    self.table.handle_event(event);
                }
            },
        }
    }
}

fn main() -> io::Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    res
}

fn run<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>) -> io::Result<()> {
    let theme = Theme::default();
    let mut app = App::new();

    loop {
        terminal.draw(|f| {
            let area = f.area();
            let buf = f.buffer_mut();
            let mut y = area.y;

            let title = Span::styled("Welcome!", theme.accent);
            buf.set_span(area.x, y, &title, area.width);
            y += 2;

            let name_h = app.name_field.height().min(area.height.saturating_sub(y));
            let name_area = Rect::new(area.x, y, area.width.min(44), name_h);
            app.name_field.render(name_area, buf, &theme);
            y += name_h + 1;

            let gmail_h = app.gmail_field.height().min(area.height.saturating_sub(y));
            let gmail_area = Rect::new(area.x, y, area.width.min(44), gmail_h);
            app.gmail_field.render(gmail_area, buf, &theme);
            y += gmail_h + 1;

            let heading = Span::styled("User Data Table", theme.accent);
            buf.set_span(area.x, y, &heading, area.width);
            y += 1;

            let footer_h = 2u16;
            let table_h = (area.y + area.height)
                .saturating_sub(y)
                .saturating_sub(footer_h);
            let table_area = Rect::new(area.x, y, area.width, table_h);
            app.table.render(table_area, buf, &theme);

            let mut selected: Vec<&str> = Vec::new();
            for user in app.table.selected_rows() {
                if !selected.contains(&user.name.as_str()) {
                    selected.push(user.name.as_str());
                }
            }
            let selected_line = if selected.is_empty() {
                "Selected rows: None".to_string()
            } else {
                format!("Selected rows: {}", selected.join(", "))
            };
            let fy = area.y + area.height - footer_h;
            buf.set_stringn(
                area.x,
                fy,
                &selected_line,
                area.width as usize,
                theme.text_primary,
            );
            let help = "tab focus  s sort  space select  a select all  ctrl-u clear  ctrl-c quit";
            buf.set_stringn(area.x, fy + 1, help, area.width as usize, theme.text_muted);

            let cursor = match app.focus {
                Focus::Name => app.name_field.cursor_pos(),
                Focus::Gmail => app.gmail_field.cursor_pos(),
                Focus::Table => None,
            };
            if let Some((cx, cy)) = cursor {
                f.set_cursor_position((cx, cy));
            }
        })?;

        if crossterm::event::poll(Duration::from_millis(50))? {
            let ev = crossterm::event::read()?;
            if let crossterm::event::Event::Key(key) = &ev {
                let ctrl_c = key.code == crossterm::event::KeyCode::Char('c')
                    && key
                        .modifiers
                        .contains(crossterm::event::KeyModifiers::CONTROL);
                if ctrl_c {
                    return Ok(());
                }
            }
            if let Some(ev) = input_event_from_crossterm(ev) {
                app.handle(ev);
            }
        }
    }
}
