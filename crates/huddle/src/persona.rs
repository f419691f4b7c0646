//! Persona registry.
//!
//! Personas pair a system prompt with display metadata under a mood name.
//! The set is fixed for the process lifetime; lookups never fail — an
//! unrecognized name resolves to the first registered persona. That fallback
//! is part of the contract, not an accident of map defaults.

use serde::Serialize;

/// A named persona: prompt text plus display metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Persona {
    /// Mood name used to select this persona.
    pub name: String,
    /// System prompt handed to the completion provider.
    pub prompt: String,
    /// Display color (hex).
    pub color: String,
    /// Display glyph.
    pub glyph: String,
}

/// Registry of available personas, in registration order.
#[derive(Debug)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
}

impl PersonaRegistry {
    /// Build a registry from an ordered persona list.
    ///
    /// The first entry doubles as the fallback for unknown names, so the
    /// list must not be empty.
    pub fn new(personas: Vec<Persona>) -> Self {
        assert!(!personas.is_empty(), "persona registry needs at least one entry");
        Self { personas }
    }

    /// The built-in persona set.
    pub fn builtin() -> Self {
        let persona = |name: &str, prompt: &str, color: &str, glyph: &str| Persona {
            name: name.to_string(),
            prompt: prompt.to_string(),
            color: color.to_string(),
            glyph: glyph.to_string(),
        };

        Self::new(vec![
            persona(
                "happy",
                "You are a cheerful and optimistic AI. Respond with enthusiasm and positivity. Keep responses concise but warm.",
                "#FFD700",
                "😊",
            ),
            persona(
                "calm",
                "You are a peaceful and measured AI. Speak slowly and thoughtfully. Provide calming and reassuring responses.",
                "#87CEEB",
                "😌",
            ),
            persona(
                "energetic",
                "You are a dynamic and enthusiastic AI. Use exciting language and be motivational. Keep the energy high!",
                "#FF6347",
                "⚡",
            ),
            persona(
                "wise",
                "You are a thoughtful and insightful AI. Provide deep, philosophical responses with wisdom and understanding.",
                "#9370DB",
                "🦉",
            ),
            persona(
                "playful",
                "You are a creative and fun AI. Use humor, wordplay, and imaginative responses. Be lighthearted and entertaining.",
                "#FF69B4",
                "🎭",
            ),
            persona(
                "professional",
                "You are a formal and business-focused AI. Use professional language and provide structured, informative responses.",
                "#708090",
                "💼",
            ),
        ])
    }

    /// Look up a persona by mood name.
    ///
    /// Unknown names return the first registered persona.
    pub fn lookup(&self, name: &str) -> &Persona {
        self.personas
            .iter()
            .find(|p| p.name == name)
            .unwrap_or(&self.personas[0])
    }

    /// All personas in registration order.
    pub fn list(&self) -> &[Persona] {
        &self.personas
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
