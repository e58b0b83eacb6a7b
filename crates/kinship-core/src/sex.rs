use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum Sex {
    M,
    F,
    #[default]
    U,
}

impl Sex {
    /// Lenient parse used for free-form gender columns: anything that is not
    /// a recognizable `M`/`F` is unknown.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "M" | "MALE" => Sex::M,
            "F" | "FEMALE" => Sex::F,
            _ => Sex::U,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Sex::M => "M",
            Sex::F => "F",
            Sex::U => "U",
        }
    }
}

impl<'de> Deserialize<'de> for Sex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = Option::<String>::deserialize(deserializer)?;
        Ok(code.map(|c| Sex::from_code(&c)).unwrap_or_default())
    }
}
