use ratatui::style::Style;

/// Named styles shared by the formkit widgets.
///
/// Widgets take a `&Theme` at render time; apps can restyle everything by
/// constructing their own instance.
#[derive(Clone, Debug)]
pub struct Theme {
    pub text_primary: Style,
    pub text_muted: Style,
    pub accent: Style,
    pub danger: Style,
    pub header: Style,
    pub selected: Style,
    pub placeholder: Style,
    pub field_filled_bg: Style,
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Stylize;

        Self {
            text_primary: Style::default(),
            text_muted: Style::default().dark_gray(),
            accent: Style::default().cyan(),
            danger: Style::default().red(),
            header: Style::default().bold(),
            selected: Style::default().bold().cyan(),
            placeholder: Style::default().dark_gray().italic(),
            field_filled_bg: Style::default().on_dark_gray(),
        }
    }
}
