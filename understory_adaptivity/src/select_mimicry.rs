// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Select mimicry: a form field that looks like a native select.
//!
//! This is a small consumer of [`AdaptivityState`]. It reads only the two size
//! classes and turns them into a dropdown icon size and class-name modifiers;
//! it never looks at pixel values.
//!
//! ```
//! use understory_adaptivity::select_mimicry::{DropdownIcon, SelectMimicryProps};
//! use understory_adaptivity::{AdaptivityState, SizeType};
//!
//! let state = AdaptivityState {
//!     view_width: 320.0,
//!     view_height: 567.5,
//!     size_x: SizeType::Compact,
//!     size_y: SizeType::Compact,
//!     has_mouse: false,
//!     has_hover: false,
//!     is_desktop: false,
//! };
//! let view = SelectMimicryProps::default().render(&state);
//! assert_eq!(view.dropdown_icon, DropdownIcon::Dropdown16);
//! assert!(view.class_names.iter().any(|c| c == "Select--sizeX--compact"));
//! ```

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::classify::SizeType;
use crate::overrides::AdaptivityState;

/// Horizontal alignment of the field's text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Align {
    /// Start-aligned.
    Left,
    /// Centered.
    Center,
    /// End-aligned.
    Right,
}

impl Align {
    fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Dropdown chevron variants, named after their pixel size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DropdownIcon {
    /// 16px, for compact widths.
    Dropdown16,
    /// 20px, for compact heights.
    Dropdown20,
    /// 24px, the regular icon.
    Dropdown24,
}

impl DropdownIcon {
    /// Pick the icon for a pair of size classes. A compact width wins over a
    /// compact height.
    pub fn for_sizes(size_x: SizeType, size_y: SizeType) -> Self {
        if size_x.is_compact() {
            Self::Dropdown16
        } else if size_y.is_compact() {
            Self::Dropdown20
        } else {
            Self::Dropdown24
        }
    }

    /// Icon edge length in pixels.
    pub fn size(self) -> u8 {
        match self {
            Self::Dropdown16 => 16,
            Self::Dropdown20 => 20,
            Self::Dropdown24 => 24,
        }
    }
}

/// Caller-facing inputs of the field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectMimicryProps {
    /// Currently displayed value, if one is selected.
    pub value: Option<String>,
    /// Shown when there is no value.
    pub placeholder: Option<String>,
    /// Allow the value to wrap.
    pub multiline: bool,
    /// Disabled fields are neither focusable nor clickable.
    pub disabled: bool,
    /// Text alignment.
    pub align: Option<Align>,
    /// Tab index while enabled. Defaults to `0`.
    pub tab_index: i32,
    /// Extra class appended after the generated ones.
    pub class_name: Option<String>,
}

/// What the renderer should draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectMimicryView {
    /// Class names, generated ones first.
    pub class_names: Vec<String>,
    /// Text shown in the title slot: the value, else the placeholder.
    pub title: Option<String>,
    /// Chevron to draw.
    pub dropdown_icon: DropdownIcon,
    /// `None` removes the field from the tab order.
    pub tab_index: Option<i32>,
    /// Whether click handlers should be attached.
    pub clickable: bool,
}

impl SelectMimicryView {
    /// Class names joined with spaces.
    pub fn class_name(&self) -> String {
        self.class_names.join(" ")
    }
}

impl SelectMimicryProps {
    /// Render against a resolved adaptivity state.
    pub fn render(&self, adaptivity: &AdaptivityState) -> SelectMimicryView {
        let mut class_names: Vec<String> = ["Select", "Select--mimicry"]
            .into_iter()
            .map(String::from)
            .collect();
        if self.value.is_none() {
            class_names.push("Select--not-selected".into());
        }
        if self.multiline {
            class_names.push("Select--multiline".into());
        }
        if self.disabled {
            class_names.push("Select--disabled".into());
        }
        if let Some(align) = self.align {
            class_names.push(format!("Select--align-{}", align.as_str()));
        }
        class_names.push(format!("Select--sizeX--{}", adaptivity.size_x.as_str()));
        class_names.push(format!("Select--sizeY--{}", adaptivity.size_y.as_str()));
        if let Some(extra) = &self.class_name {
            class_names.push(extra.clone());
        }

        SelectMimicryView {
            class_names,
            title: self.value.clone().or_else(|| self.placeholder.clone()),
            dropdown_icon: DropdownIcon::for_sizes(adaptivity.size_x, adaptivity.size_y),
            tab_index: (!self.disabled).then_some(self.tab_index),
            clickable: !self.disabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(size_x: SizeType, size_y: SizeType) -> AdaptivityState {
        AdaptivityState {
            view_width: 1024.0,
            view_height: 720.0,
            size_x,
            size_y,
            has_mouse: true,
            has_hover: true,
            is_desktop: false,
        }
    }

    #[test]
    fn icon_prefers_compact_width() {
        use SizeType::{Compact, Regular};
        assert_eq!(DropdownIcon::for_sizes(Compact, Compact), DropdownIcon::Dropdown16);
        assert_eq!(DropdownIcon::for_sizes(Compact, Regular), DropdownIcon::Dropdown16);
        assert_eq!(DropdownIcon::for_sizes(Regular, Compact), DropdownIcon::Dropdown20);
        assert_eq!(DropdownIcon::for_sizes(Regular, Regular), DropdownIcon::Dropdown24);
        assert_eq!(DropdownIcon::Dropdown20.size(), 20);
    }

    #[test]
    fn regular_selected_field() {
        let props = SelectMimicryProps {
            value: Some("Moscow".into()),
            align: Some(Align::Center),
            class_name: Some("CityPicker".into()),
            ..SelectMimicryProps::default()
        };
        let view = props.render(&state(SizeType::Regular, SizeType::Regular));
        assert_eq!(
            view.class_name(),
            "Select Select--mimicry Select--align-center Select--sizeX--regular \
             Select--sizeY--regular CityPicker"
        );
        assert_eq!(view.title.as_deref(), Some("Moscow"));
        assert_eq!(view.dropdown_icon, DropdownIcon::Dropdown24);
        assert_eq!(view.tab_index, Some(0));
        assert!(view.clickable);
    }

    #[test]
    fn placeholder_and_disabled() {
        let props = SelectMimicryProps {
            placeholder: Some("Choose a city".into()),
            disabled: true,
            multiline: true,
            tab_index: 3,
            ..SelectMimicryProps::default()
        };
        let view = props.render(&state(SizeType::Regular, SizeType::Compact));
        assert_eq!(
            view.class_names,
            [
                "Select",
                "Select--mimicry",
                "Select--not-selected",
                "Select--multiline",
                "Select--disabled",
                "Select--sizeX--regular",
                "Select--sizeY--compact",
            ]
        );
        assert_eq!(view.title.as_deref(), Some("Choose a city"));
        assert_eq!(view.dropdown_icon, DropdownIcon::Dropdown20);
        assert_eq!(view.tab_index, None);
        assert!(!view.clickable);
    }
}
