//! User-facing message templates.
//!
//! All outbound copy lives here so the state machine stays free of
//! formatting concerns. Texts are Spanish, matching the product voice.

use crate::engagement::model::Challenge;

/// Fixed pool of emotionally affirming templates, one of which is chosen
/// uniformly at random when a response is accepted.
pub const AFFIRMATIONS: &[&str] = &[
    "🌱 Qué hermoso lo que compartiste. Tu corazón está floreciendo.",
    "💫 Me alegra que te abras así. Tu voz merece ser escuchada.",
    "🌸 Gracias por confiar. Cada palabra tuya es un paso hacia tu luz.",
    "🌿 Lo que dijiste tiene fuerza y ternura. Estoy contigo.",
    "🕊️ Tu sinceridad es un regalo. Gracias por compartirla.",
    "🔥 Cada paso que das te acerca a tu verdad. Estoy orgulloso de ti.",
];

pub const CATALOG_EXHAUSTED: &str =
    "✨ Ya completaste todos los retos disponibles. ¡Pronto habrá más!";

pub const EXIT_ACK: &str =
    "🌙 Has salido del modo reto. Puedes volver cuando quieras con /reto 💫";

pub const TOO_BRIEF: &str =
    "🌱 Tu respuesta es muy breve. ¿Podrías compartir un poco más?";

pub const DUPLICATE: &str =
    "🌸 Ya compartiste algo similar antes. ¿Quieres intentar con otra perspectiva?";

pub const IDLE_FALLBACK: &str =
    "🌸 Estoy aquí para ti. Usa el menú para comenzar un reto o ver tus puntos.";

pub const GENERIC_FAILURE: &str =
    "😔 Algo salió mal de mi lado. Inténtalo de nuevo en un momento.";

pub fn welcome(bot_name: &str, user_name: &str) -> String {
    format!(
        "🌸 Hola {user_name}, soy {bot_name}. Estoy aquí para acompañarte, \
         escucharte y ayudarte a florecer desde dentro.\n\n\
         ¿Quieres comenzar con tu primer reto emocional? Usa el menú o escribe /reto 💫"
    )
}

pub fn challenge_prompt(challenge: &Challenge) -> String {
    format!("🌼 Reto {}: {}", challenge.id, challenge.text)
}

pub fn points_total(points: u32) -> String {
    format!("✨ Tienes {points} puntos acumulados. ¡Sigue creciendo!")
}

pub fn response_accepted(affirmation: &str, awarded: u32, total: u32) -> String {
    format!("{affirmation}\n✨ Has ganado +{awarded} puntos. Total acumulado: {total} puntos.")
}

pub fn command_suggestion(command: &str) -> String {
    format!("¿Querías decir {command}? 🌸 Puedes usar el menú también.")
}
