/// When enabled, `main` wires the echo model instead of a provider client.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaffoldConfig {
    pub enabled: bool,
}

impl ScaffoldConfig {
    /// Reads `SCAFFOLD_MODE`.
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("SCAFFOLD_MODE")
                .map(|value| is_truthy(&value))
                .unwrap_or(false),
        }
    }
}

pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
