use formkit_core::theme::Theme;
use ratatui::style::Modifier;
use ratatui::style::Style;

/// Visual variant of a [`crate::text_field::TextField`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Variant {
    Filled,
    #[default]
    Outlined,
    Ghost,
}

impl Variant {
    /// Base style of the field body for this variant.
    pub fn field_style(self, theme: &Theme) -> Style {
        match self {
            Variant::Filled => theme.field_filled_bg,
            Variant::Outlined => theme.text_primary,
            Variant::Ghost => theme.text_primary,
        }
    }

    /// Outlined fields draw a one-cell border around the value row.
    pub fn has_border(self) -> bool {
        matches!(self, Variant::Outlined)
    }
}

/// Size of a [`crate::text_field::TextField`], mapped to horizontal padding
/// inside the field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Size {
    Sm,
    #[default]
    Md,
    Lg,
}

impl Size {
    pub fn padding(self) -> u16 {
        match self {
            Size::Sm => 0,
            Size::Md => 1,
            Size::Lg => 2,
        }
    }
}

/// Mutually exclusive visual states, highest precedence first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualState {
    Loading,
    Disabled,
    Invalid,
    Normal,
}

impl VisualState {
    /// Single ranking point for simultaneous state flags:
    /// loading > disabled > invalid > normal.
    pub fn resolve(loading: bool, disabled: bool, invalid: bool) -> Self {
        if loading {
            VisualState::Loading
        } else if disabled {
            VisualState::Disabled
        } else if invalid {
            VisualState::Invalid
        } else {
            VisualState::Normal
        }
    }

    /// Style patch layered over the variant's base style.
    pub fn patch(self, theme: &Theme) -> Style {
        match self {
            VisualState::Loading => theme.text_muted,
            VisualState::Disabled => Style::default().add_modifier(Modifier::DIM),
            VisualState::Invalid => theme.danger,
            VisualState::Normal => Style::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_precedence_is_loading_disabled_invalid_normal() {
        assert_eq!(VisualState::resolve(true, true, true), VisualState::Loading);
        assert_eq!(
            VisualState::resolve(false, true, true),
            VisualState::Disabled
        );
        assert_eq!(
            VisualState::resolve(false, false, true),
            VisualState::Invalid
        );
        assert_eq!(
            VisualState::resolve(false, false, false),
            VisualState::Normal
        );
    }

    #[test]
    fn only_outlined_draws_a_border() {
        assert!(Variant::Outlined.has_border());
        assert!(!Variant::Filled.has_border());
        assert!(!Variant::Ghost.has_border());
    }

    #[test]
    fn sizes_map_to_increasing_padding() {
        assert!(Size::Sm.padding() < Size::Md.padding());
        assert!(Size::Md.padding() < Size::Lg.padding());
    }
}
