use egui::Color32;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MESSAGE_KEYS: [&str; 7] = [
    "Director",
    "Scenario",
    "Outcome",
    "DelayedEffect",
    "SideEvent",
    "Ending",
    "System",
];

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UiSettings {
    pub ui_scale: f32,

    // Message::color_key -> bubble color
    pub message_colors: HashMap<String, [u8; 4]>,
}

impl Default for UiSettings {
    fn default() -> Self {
        let mut message_colors = HashMap::new();

        message_colors.insert("Director".into(), [40, 70, 120, 255]);
        message_colors.insert("Scenario".into(), [60, 60, 70, 255]);
        message_colors.insert("Outcome".into(), [40, 90, 60, 255]);
        message_colors.insert("DelayedEffect".into(), [90, 60, 120, 255]);
        message_colors.insert("SideEvent".into(), [120, 80, 40, 255]);
        message_colors.insert("Ending".into(), [130, 40, 50, 255]);
        message_colors.insert("System".into(), [80, 80, 80, 255]);

        Self {
            ui_scale: 1.0,
            message_colors,
        }
    }
}

impl UiSettings {
    pub fn color(&self, key: &str) -> Color32 {
        self.message_colors
            .get(key)
            .map(|c| Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]))
            .unwrap_or(Color32::DARK_GRAY)
    }

    pub fn set_color(&mut self, key: &str, color: Color32) {
        self.message_colors.insert(
            key.to_string(),
            [color.r(), color.g(), color.b(), color.a()],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_message_kind_has_a_color() {
        let settings = UiSettings::default();
        for key in MESSAGE_KEYS {
            assert!(settings.message_colors.contains_key(key), "{key}");
        }
        assert_eq!(settings.color("nope"), Color32::DARK_GRAY);
    }
}
