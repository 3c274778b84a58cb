//! Quiz selection and answering
//!
//! The bank is static data; the interesting parts are the served-set picker
//! (no repeats until the bank is exhausted) and the per-question option
//! shuffle with the correct index remapped.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of options every question must have
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A multiple choice question as stored in the bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub answers: Vec<String>,
    /// Index into `answers` of the single correct option
    pub correct: usize,
}

impl Question {
    /// Check the one-correct-answer invariant
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if self.prompt.trim().is_empty() {
            return Err(ConfigError::InvalidQuestion {
                index,
                reason: "empty prompt".into(),
            });
        }
        if self.answers.len() != OPTIONS_PER_QUESTION {
            return Err(ConfigError::InvalidQuestion {
                index,
                reason: format!(
                    "expected {} answers, found {}",
                    OPTIONS_PER_QUESTION,
                    self.answers.len()
                ),
            });
        }
        if self.correct >= self.answers.len() {
            return Err(ConfigError::InvalidQuestion {
                index,
                reason: format!("correct index {} out of range", self.correct),
            });
        }
        Ok(())
    }
}

/// Validated, non-empty list of questions
#[derive(Debug, Clone, Serialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
    /// How many leading entries are hand-written (the rest are variants)
    base_len: usize,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, ConfigError> {
        if questions.is_empty() {
            return Err(ConfigError::EmptyBank);
        }
        for (i, q) in questions.iter().enumerate() {
            q.validate(i)?;
        }
        let base_len = questions.len();
        Ok(Self {
            questions,
            base_len,
        })
    }

    /// Parse and validate a JSON array of questions
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    /// Grow the bank to `target` entries with reworded, reshuffled copies
    ///
    /// Variant `k` of a base question has " (variant k)" appended and its
    /// answers in a fresh random order.
    pub fn with_variants<R: Rng + ?Sized>(mut self, target: usize, rng: &mut R) -> Self {
        let base_len = self.base_len;
        let mut i = 0;
        while self.questions.len() < target {
            let base = &self.questions[i % base_len];
            let round = self.questions.len() / base_len + 1;

            let mut order: Vec<usize> = (0..base.answers.len()).collect();
            order.shuffle(rng);
            let answers = order.iter().map(|&j| base.answers[j].clone()).collect();
            let correct = order
                .iter()
                .position(|&j| j == base.correct)
                .unwrap_or(base.correct);

            let variant = Question {
                prompt: format!("{} (variant {})", base.prompt, round),
                answers,
                correct,
            };
            self.questions.push(variant);
            i += 1;
        }
        log::debug!(
            "Question bank expanded to {} ({} base)",
            self.questions.len(),
            base_len
        );
        self
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

/// Served-set picker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizPicker {
    served: Vec<bool>,
    served_count: usize,
}

impl QuizPicker {
    pub fn new(bank_len: usize) -> Self {
        Self {
            served: vec![false; bank_len],
            served_count: 0,
        }
    }

    /// Pick an index not yet served in this cycle
    ///
    /// When every question has been served the set is cleared first, so
    /// picks continue uniformly across cycles.
    pub fn pick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        if self.served.is_empty() {
            return 0;
        }
        if self.served_count >= self.served.len() {
            self.reset();
            log::debug!("All {} questions served, starting a new cycle", self.served.len());
        }

        let remaining = self.served.len() - self.served_count;
        let nth = rng.random_range(0..remaining);
        let index = self
            .served
            .iter()
            .enumerate()
            .filter(|(_, served)| !**served)
            .map(|(i, _)| i)
            .nth(nth)
            .unwrap_or(0);

        self.served[index] = true;
        self.served_count += 1;
        index
    }

    pub fn reset(&mut self) {
        self.served.iter_mut().for_each(|s| *s = false);
        self.served_count = 0;
    }

    pub fn served_count(&self) -> usize {
        self.served_count
    }
}

/// How wrong answers are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnswerPolicy {
    /// Disable the wrong button, keep the other options open
    #[default]
    RetryWrong,
    /// Any answer closes the question
    SingleAttempt,
}

/// Result of pressing an option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerResult {
    Correct,
    Wrong { closes: bool },
    /// Out of range or already disabled
    Ignored,
}

/// A question on screen: options in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveQuestion {
    /// Bank index (for logging/debugging)
    pub bank_index: usize,
    pub prompt: String,
    /// Options in display order
    pub options: Vec<String>,
    /// Correct option in display order
    pub correct: usize,
    /// Buttons the player already used up
    pub disabled: Vec<bool>,
}

impl ActiveQuestion {
    /// Shuffle a question's options for display
    ///
    /// The display order never equals the storage order when there is more
    /// than one option.
    pub fn present<R: Rng + ?Sized>(bank_index: usize, question: &Question, rng: &mut R) -> Self {
        let n = question.answers.len();
        let mut order: Vec<usize> = (0..n).collect();
        if n > 1 {
            loop {
                order.shuffle(rng);
                if order.iter().enumerate().any(|(i, &j)| i != j) {
                    break;
                }
            }
        }

        let options = order.iter().map(|&j| question.answers[j].clone()).collect();
        let correct = order
            .iter()
            .position(|&j| j == question.correct)
            .unwrap_or(0);

        Self {
            bank_index,
            prompt: question.prompt.clone(),
            options,
            correct,
            disabled: vec![false; n],
        }
    }

    pub fn is_enabled(&self, option: usize) -> bool {
        option < self.options.len() && !self.disabled[option]
    }

    /// Press an option
    pub fn answer(&mut self, option: usize, policy: AnswerPolicy) -> AnswerResult {
        if !self.is_enabled(option) {
            return AnswerResult::Ignored;
        }
        if option == self.correct {
            return AnswerResult::Correct;
        }
        self.disabled[option] = true;
        AnswerResult::Wrong {
            closes: policy == AnswerPolicy::SingleAttempt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn q(prompt: &str, correct: usize) -> Question {
        Question {
            prompt: prompt.into(),
            answers: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
        }
    }

    #[test]
    fn test_bank_rejects_bad_questions() {
        assert!(matches!(QuestionBank::new(vec![]), Err(ConfigError::EmptyBank)));

        let mut three = q("three", 0);
        three.answers.pop();
        assert!(matches!(
            QuestionBank::new(vec![q("ok", 0), three]),
            Err(ConfigError::InvalidQuestion { index: 1, .. })
        ));

        assert!(QuestionBank::new(vec![q("bad index", 4)]).is_err());
    }

    #[test]
    fn test_every_question_once_per_cycle() {
        let mut rng = Pcg32::seed_from_u64(7);
        let n = 25;
        let mut picker = QuizPicker::new(n);
        let mut seen = vec![0u32; n];
        for _ in 0..n {
            seen[picker.pick(&mut rng)] += 1;
        }
        assert!(seen.iter().all(|&c| c == 1));

        // Next cycle starts over
        let next = picker.pick(&mut rng);
        assert!(next < n);
        assert_eq!(picker.served_count(), 1);
    }

    #[test]
    fn test_present_remaps_correct_answer() {
        let mut rng = Pcg32::seed_from_u64(42);
        let question = Question {
            prompt: "Which light means stop?".into(),
            answers: vec!["Red".into(), "Amber".into(), "Green".into(), "Blue".into()],
            correct: 0,
        };
        for _ in 0..50 {
            let active = ActiveQuestion::present(0, &question, &mut rng);
            assert_eq!(active.options[active.correct], "Red");
            assert_ne!(active.options, question.answers);
            let mut sorted = active.options.clone();
            sorted.sort();
            let mut expected = question.answers.clone();
            expected.sort();
            assert_eq!(sorted, expected);
        }
    }

    #[test]
    fn test_retry_wrong_disables_only_that_option() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut active = ActiveQuestion::present(0, &q("p", 2), &mut rng);
        let wrong = (active.correct + 1) % 4;

        assert_eq!(
            active.answer(wrong, AnswerPolicy::RetryWrong),
            AnswerResult::Wrong { closes: false }
        );
        assert_eq!(active.answer(wrong, AnswerPolicy::RetryWrong), AnswerResult::Ignored);
        let other_wrong = (active.correct + 2) % 4;
        assert!(active.is_enabled(other_wrong));
        assert_eq!(
            active.answer(active.correct, AnswerPolicy::RetryWrong),
            AnswerResult::Correct
        );
    }

    #[test]
    fn test_single_attempt_closes() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut active = ActiveQuestion::present(0, &q("p", 1), &mut rng);
        let wrong = (active.correct + 1) % 4;
        assert_eq!(
            active.answer(wrong, AnswerPolicy::SingleAttempt),
            AnswerResult::Wrong { closes: true }
        );
        assert_eq!(active.answer(9, AnswerPolicy::SingleAttempt), AnswerResult::Ignored);
    }

    #[test]
    fn test_variants_keep_correct_answer() {
        let mut rng = Pcg32::seed_from_u64(11);
        let base = vec![
            Question {
                prompt: "Stop sign?".into(),
                answers: vec!["Stop fully".into(), "Slow".into(), "Go".into(), "Park".into()],
                correct: 0,
            },
            q("Other", 3),
        ];
        let bank = QuestionBank::new(base).unwrap().with_variants(10, &mut rng);
        assert_eq!(bank.len(), 10);
        let v = bank.get(2).unwrap();
        assert_eq!(v.prompt, "Stop sign? (variant 2)");
        assert_eq!(v.answers[v.correct], "Stop fully");
        for (i, q) in bank.questions().iter().enumerate() {
            q.validate(i).unwrap();
        }
    }
}
