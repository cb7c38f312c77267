use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Callback actions carried by inline buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TempWater,
    TempAir,
    WaterLeak,
    Light,
    LightOn,
    LightOff,
    Status,
    Refresh,
    Back,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TempWater => "temp_water",
            Self::TempAir => "temp_air",
            Self::WaterLeak => "water_leak",
            Self::Light => "light",
            Self::LightOn => "light_on",
            Self::LightOff => "light_off",
            Self::Status => "status",
            Self::Refresh => "refresh",
            Self::Back => "back",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown button action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "temp_water" => Self::TempWater,
            "temp_air" => Self::TempAir,
            "water_leak" => Self::WaterLeak,
            "light" => Self::Light,
            "light_on" => Self::LightOn,
            "light_off" => Self::LightOff,
            "status" => Self::Status,
            "refresh" => Self::Refresh,
            "back" => Self::Back,
            other => return Err(UnknownAction(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    Callback { label: String, action: Action },
    Link { label: String, url: String },
}

impl Button {
    fn callback(label: &str, action: Action) -> Self {
        Self::Callback {
            label: label.to_string(),
            action,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Callback { label, .. } | Self::Link { label, .. } => label,
        }
    }
}

/// Rows of buttons, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// Every callback action on the keyboard, in reading order.
    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.rows.iter().flatten().filter_map(|b| match b {
            Button::Callback { action, .. } => Some(*action),
            Button::Link { .. } => None,
        })
    }

    /// Main menu. A website link row is appended when a URL is configured.
    pub fn main(website_url: Option<&str>) -> Self {
        let mut rows = vec![
            vec![
                Button::callback("🌡️ Water temperature", Action::TempWater),
                Button::callback("🌡️ Air temperature", Action::TempAir),
            ],
            vec![Button::callback("⚠️ Water leak", Action::WaterLeak)],
            vec![Button::callback("💡 Lighting", Action::Light)],
            vec![Button::callback("📊 System status", Action::Status)],
            vec![Button::callback("🔄 Refresh", Action::Refresh)],
        ];
        if let Some(url) = website_url.filter(|u| !u.is_empty()) {
            rows.push(vec![Button::Link {
                label: "🌐 Dashboard".to_string(),
                url: url.to_string(),
            }]);
        }
        Self { rows }
    }

    pub fn light() -> Self {
        Self {
            rows: vec![
                vec![
                    Button::callback("💡 On", Action::LightOn),
                    Button::callback("🔌 Off", Action::LightOff),
                ],
                vec![Button::callback("↩️ Back", Action::Back)],
            ],
        }
    }
}
