use aquarium_core::AquariumState;

fn yes_no(b: bool) -> &'static str {
    if b { "Yes" } else { "No" }
}

/// Multi-line status summary shown by `/status` and the status button.
pub fn status_text(s: &AquariumState) -> String {
    let manual = if s.has_manual_override() {
        "\n✋ Manual overrides active (/auto to clear)"
    } else {
        ""
    };
    format!(
        "📊 System status:\n\
         🌡️ Water temperature: {:.1}°C\n\
         🌡️ Air temperature: {:.1}°C\n\
         ⚠️ Water leak: {}\n\
         💡 Lighting: {}\n\
         🕒 Feeding: {}\n\
         🌊 Water level: {}\n\
         🧪 pH level: {:.1}\n\
         🌀 Filter: {}{manual}",
        s.temp_water,
        s.temp_air,
        yes_no(s.water_leak),
        if s.light_on { "On" } else { "Off" },
        s.extras.feeding_time,
        s.extras.water_level,
        s.extras.ph_level,
        if s.extras.filter_on { "Running" } else { "Stopped" },
    )
}
