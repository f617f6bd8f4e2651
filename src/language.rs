#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    German,
    French,
    Spanish,
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::German,
        Language::French,
        Language::Spanish,
    ];

    /// Maps a language tag to a variant. Tags are matched exactly; anything
    /// outside the known set falls back to English.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "English" => Language::English,
            "German" => Language::German,
            "French" => Language::French,
            "Spanish" => Language::Spanish,
            _ => Language::English,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::German => "German",
            Language::French => "French",
            Language::Spanish => "Spanish",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Language::English => "Generate a concise alt text description for this image.",
            Language::German => "Generiere einen prägnanten Alt-Text für dieses Bild.",
            Language::French => "Générez un texte alternatif concis pour cette image.",
            Language::Spanish => "Genera un texto alternativo conciso para esta imagen.",
        }
    }
}

pub fn prompt_for(tag: &str) -> &'static str {
    Language::from_tag(tag).instruction()
}
