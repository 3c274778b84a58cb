//! Bundled traffic-law question bank
//!
//! Shipped as JSON so a different bank can be dropped in without touching
//! code (see `QuizConfig::bank_path` for the native override).

use rand::Rng;

use crate::config::QuizConfig;
use crate::error::ConfigError;
use crate::sim::quiz::QuestionBank;

/// Raw JSON of the default bank
pub const DEFAULT_BANK_JSON: &str = include_str!("../data/questions.json");

/// The hand-written questions only
pub fn base_bank() -> Result<QuestionBank, ConfigError> {
    QuestionBank::from_json(DEFAULT_BANK_JSON)
}

/// Default bank grown to `target` entries with variants
pub fn default_bank<R: Rng + ?Sized>(target: usize, rng: &mut R) -> Result<QuestionBank, ConfigError> {
    Ok(base_bank()?.with_variants(target, rng))
}

/// Bank for a quiz config: the file at `bank_path` when set (native only),
/// otherwise the bundled questions, grown to `bank_size`
pub fn configured_bank<R: Rng + ?Sized>(quiz: &QuizConfig, rng: &mut R) -> Result<QuestionBank, ConfigError> {
    let base = match quiz.bank_path.as_deref() {
        #[cfg(not(target_arch = "wasm32"))]
        Some(path) => {
            log::info!("Loading questions from {}", path);
            QuestionBank::from_json(&std::fs::read_to_string(path)?)?
        }
        _ => base_bank()?,
    };
    Ok(base.with_variants(quiz.bank_size, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_bundled_bank_is_valid() {
        let bank = base_bank().expect("bundled bank must parse");
        assert!(bank.len() >= 10);
    }

    #[test]
    fn test_default_bank_reaches_target() {
        let mut rng = Pcg32::seed_from_u64(5);
        let bank = default_bank(400, &mut rng).unwrap();
        assert_eq!(bank.len(), 400);
    }

    #[test]
    fn test_bank_path_override() {
        let path = std::env::temp_dir().join("roadwise_bank_test.json");
        std::fs::write(
            &path,
            r#"[{ "prompt": "Red means?", "answers": ["Stop", "Go", "Honk", "Turn"], "correct": 0 }]"#,
        )
        .unwrap();

        let quiz = QuizConfig {
            bank_path: Some(path.to_string_lossy().into_owned()),
            bank_size: 3,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let bank = configured_bank(&quiz, &mut rng).unwrap();
        assert_eq!(bank.len(), 3);
        assert_eq!(bank.get(0).unwrap().prompt, "Red means?");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_bank_file_is_an_error() {
        let quiz = QuizConfig {
            bank_path: Some("/nonexistent/roadwise/questions.json".to_string()),
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(matches!(configured_bank(&quiz, &mut rng), Err(ConfigError::Io(_))));
    }
}
