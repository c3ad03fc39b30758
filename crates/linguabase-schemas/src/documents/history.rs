//! Practice History: the append-only log of finished exercises
//!
//! The shape of an exercise's `result` depends on its `practice_kind`;
//! [`ExerciseOutcome`] carries both so that one cannot disagree with the
//! other once validated.
//!
//! Copyright (c) 2025 Linguabase Team
//! Licensed under the Apache-2.0 license

use super::{DocumentKind, Language, Timestamp};
use crate::validation::base::{DocumentSchema, SchemaValidator, Strictness, ValidationContext};
use crate::validation::error::{Rule, ValidationError, ValidationErrors, ValidationResult};
use crate::validation::fields::{
    expect_bool, expect_enum, expect_list, expect_string, ObjectReader, SchemaEnum,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

schema_enum! {
    /// The kind of practice an exercise belongs to
    pub enum PracticeKind {
        Translation => "translation",
        Listening => "listening",
        Pronunciation => "pronunciation",
        Dialogue => "dialogue",
        NumberPronunciation => "number_pronunciation",
    }
}

schema_enum! {
    /// Three-way verdict used by pronunciation and dialogue practice
    pub enum Correctness {
        Yes => "yes",
        Partial => "partial",
        No => "no",
    }
}

schema_enum! {
    /// A field of a knowledge record that a translation exercise can show or ask for
    pub enum RecordField {
        SourceText => "source_text",
        SyllableBreakdown => "syllable_breakdown",
        PhoneticTranscription => "phonetic_transcription",
        Translation => "translation",
    }
}

schema_enum! {
    /// Audio playback speed used during a listening exercise
    pub enum PlaybackSpeed {
        Normal => "1.0",
        ThreeQuarters => "0.75",
        Half => "0.5",
    }
}

impl PlaybackSpeed {
    /// Playback rate as a multiplier
    pub fn rate(&self) -> f64 {
        match self {
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::ThreeQuarters => 0.75,
            PlaybackSpeed::Half => 0.5,
        }
    }

    fn from_rate(rate: f64) -> Option<Self> {
        [Self::Normal, Self::ThreeQuarters, Self::Half]
            .into_iter()
            .find(|speed| speed.rate() == rate)
    }
}

/// Result of a translation exercise
///
/// `fields_filled`, `values_filled` and `field_results` are parallel lists:
/// entry `i` of each describes the same answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub field_given: RecordField,
    pub fields_filled: Vec<RecordField>,
    pub values_filled: Vec<String>,
    pub field_results: Vec<bool>,
}

/// Result of a listening exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningResult {
    pub source_text: String,
    pub user_transcript: String,
    pub correct: bool,
    pub playback_speed: PlaybackSpeed,
}

/// Result of a pronunciation exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronunciationResult {
    pub source_text: String,
    pub stt_transcript: String,
    pub correct: Correctness,
    pub comment: String,
}

/// Result of a dialogue exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueResult {
    pub correct: Correctness,
}

/// Result of a number pronunciation exercise
///
/// The written and the spoken half of the exercise are both optional; a
/// learner may abandon either one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberPronunciationResult {
    pub reference_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_correct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_correct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_comment: Option<String>,
}

/// `practice_kind` together with the matching `result`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "practice_kind", content = "result", rename_all = "snake_case")]
pub enum ExerciseOutcome {
    Translation(TranslationResult),
    Listening(ListeningResult),
    Pronunciation(PronunciationResult),
    Dialogue(DialogueResult),
    NumberPronunciation(NumberPronunciationResult),
}

impl ExerciseOutcome {
    /// The practice kind this outcome belongs to
    pub fn practice_kind(&self) -> PracticeKind {
        match self {
            ExerciseOutcome::Translation(_) => PracticeKind::Translation,
            ExerciseOutcome::Listening(_) => PracticeKind::Listening,
            ExerciseOutcome::Pronunciation(_) => PracticeKind::Pronunciation,
            ExerciseOutcome::Dialogue(_) => PracticeKind::Dialogue,
            ExerciseOutcome::NumberPronunciation(_) => PracticeKind::NumberPronunciation,
        }
    }
}

/// One finished exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub timestamp: Timestamp,
    pub exercise_id: Uuid,
    /// Usually the id of a knowledge record, but older entries hold free text
    pub knowledge_id: String,
    pub language: Language,
    #[serde(flatten)]
    pub outcome: ExerciseOutcome,
}

/// The Practice History document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeHistory {
    pub exercises: Vec<Exercise>,
}

impl PracticeHistory {
    /// A history without exercises
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append an exercise as the newest entry
    ///
    /// An `exercise_id` already in the history is a violation at the
    /// position the exercise would have taken.
    pub fn try_push(&mut self, exercise: Exercise) -> ValidationResult<()> {
        if self.contains(exercise.exercise_id) {
            let ctx = ValidationContext::root()
                .child("exercises")
                .child_index(self.len());
            return Err(duplicate_exercise_id(&ctx, exercise.exercise_id).into());
        }
        self.exercises.push(exercise);
        Ok(())
    }

    pub fn contains(&self, exercise_id: Uuid) -> bool {
        self.exercises.iter().any(|e| e.exercise_id == exercise_id)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

/// Validator for a single exercise
#[derive(Debug, Default, Clone, Copy)]
pub struct ExerciseValidator;

impl ExerciseValidator {
    fn read_exercise(
        value: &Value,
        ctx: &ValidationContext,
        errors: &mut ValidationErrors,
    ) -> Option<Exercise> {
        let mut reader = ObjectReader::new(value, ctx, errors)?;
        let timestamp = reader.timestamp("timestamp");
        let exercise_id = reader.uuid("exercise_id");
        let knowledge_id = reader.string("knowledge_id");
        let language = reader.enumeration::<Language>("language");
        let practice_kind = reader.enumeration::<PracticeKind>("practice_kind");
        // Without a valid kind the result is still required, but its shape
        // cannot be checked.
        let outcome = match practice_kind {
            Some(kind) => reader.with("result", |value, ctx, errors| {
                read_outcome(kind, value, ctx, errors)
            }),
            None => reader.required("result").and(None),
        };
        reader.finish(Strictness::Open);

        Some(Exercise {
            timestamp: timestamp?,
            exercise_id: exercise_id?,
            knowledge_id: knowledge_id?,
            language: language?,
            outcome: outcome?,
        })
    }
}

impl SchemaValidator for ExerciseValidator {
    type Output = Exercise;

    fn validate_with_context(
        &self,
        input: &Value,
        context: &ValidationContext,
    ) -> ValidationResult<Self::Output> {
        let mut errors = ValidationErrors::new();
        match Self::read_exercise(input, context, &mut errors) {
            Some(exercise) => errors.into_result(exercise),
            None => Err(errors),
        }
    }
}

/// Validator for the Practice History document
#[derive(Debug, Default, Clone, Copy)]
pub struct PracticeHistoryValidator;

impl SchemaValidator for PracticeHistoryValidator {
    type Output = PracticeHistory;

    fn validate_with_context(
        &self,
        input: &Value,
        context: &ValidationContext,
    ) -> ValidationResult<Self::Output> {
        let mut errors = ValidationErrors::new();
        let exercises = ObjectReader::new(input, context, &mut errors).and_then(|mut reader| {
            let exercises = reader.with("exercises", |value, ctx, errors| {
                let exercises =
                    expect_list(value, ctx, errors, 0, None, ExerciseValidator::read_exercise)?;
                let mut seen = HashSet::new();
                for (index, exercise) in exercises.iter().enumerate() {
                    if !seen.insert(exercise.exercise_id) {
                        errors.add(duplicate_exercise_id(
                            &ctx.child_index(index),
                            exercise.exercise_id,
                        ));
                    }
                }
                Some(exercises)
            });
            reader.finish(Strictness::Open);
            exercises
        });
        match exercises {
            Some(exercises) => errors.into_result(PracticeHistory { exercises }),
            None => Err(errors),
        }
    }
}

impl DocumentSchema for PracticeHistoryValidator {
    const KIND: DocumentKind = DocumentKind::PracticeHistory;

    fn entry_count(document: &Self::Output) -> usize {
        document.len()
    }
}

fn duplicate_exercise_id(ctx: &ValidationContext, exercise_id: Uuid) -> ValidationError {
    ctx.child("exercise_id").error(
        format!("duplicate exercise id '{}'", exercise_id),
        Rule::Unique,
        "an id not used by an earlier exercise",
        exercise_id.to_string(),
    )
}

fn read_outcome(
    kind: PracticeKind,
    value: &Value,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) -> Option<ExerciseOutcome> {
    let mut reader = ObjectReader::new(value, ctx, errors)?;
    let outcome = match kind {
        PracticeKind::Translation => read_translation(&mut reader).map(ExerciseOutcome::Translation),
        PracticeKind::Listening => read_listening(&mut reader).map(ExerciseOutcome::Listening),
        PracticeKind::Pronunciation => {
            read_pronunciation(&mut reader).map(ExerciseOutcome::Pronunciation)
        }
        PracticeKind::Dialogue => reader
            .enumeration::<Correctness>("correct")
            .map(|correct| ExerciseOutcome::Dialogue(DialogueResult { correct })),
        PracticeKind::NumberPronunciation => {
            read_number_pronunciation(&mut reader).map(ExerciseOutcome::NumberPronunciation)
        }
    };
    reader.finish(Strictness::Open);
    outcome
}

fn read_translation(reader: &mut ObjectReader<'_, '_>) -> Option<TranslationResult> {
    let field_given = reader.enumeration::<RecordField>("field_given");
    let fields_filled = reader.with("fields_filled", |value, ctx, errors| {
        expect_list(value, ctx, errors, 1, Some(3), expect_enum::<RecordField>)
    });
    let values_filled = reader.string_list("values_filled", 1, Some(3));
    let field_results = reader.with("field_results", |value, ctx, errors| {
        expect_list(value, ctx, errors, 1, Some(3), expect_bool)
    });

    let (fields_filled, values_filled, field_results) =
        (fields_filled?, values_filled?, field_results?);
    let lengths = [fields_filled.len(), values_filled.len(), field_results.len()];
    if lengths.iter().any(|len| *len != lengths[0]) {
        reader.reject(
            "field_results",
            format!(
                "fields_filled, values_filled and field_results must have the same length, found {}, {} and {}",
                lengths[0], lengths[1], lengths[2]
            ),
            Rule::Consistency,
            "lists of equal length",
            format!("lengths {}, {} and {}", lengths[0], lengths[1], lengths[2]),
        );
        return None;
    }

    Some(TranslationResult {
        field_given: field_given?,
        fields_filled,
        values_filled,
        field_results,
    })
}

fn read_listening(reader: &mut ObjectReader<'_, '_>) -> Option<ListeningResult> {
    let source_text = reader.string("source_text");
    let user_transcript = reader.string("user_transcript");
    let correct = reader.boolean("correct");
    let playback_speed = reader.with("playback_speed", read_playback_speed);

    Some(ListeningResult {
        source_text: source_text?,
        user_transcript: user_transcript?,
        correct: correct?,
        playback_speed: playback_speed?,
    })
}

fn read_playback_speed(
    value: &Value,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) -> Option<PlaybackSpeed> {
    let speed = match value {
        Value::Number(number) => number.as_f64().and_then(PlaybackSpeed::from_rate),
        Value::String(_) => return expect_enum::<PlaybackSpeed>(value, ctx, errors),
        other => {
            return expect_string(other, ctx, errors).and(None);
        }
    };
    if speed.is_none() {
        errors.add(ctx.error(
            format!("invalid playback speed {}", value),
            Rule::Enumeration,
            format!("one of: {}", PlaybackSpeed::ALLOWED.join(", ")),
            value.to_string(),
        ));
    }
    speed
}

fn read_pronunciation(reader: &mut ObjectReader<'_, '_>) -> Option<PronunciationResult> {
    let source_text = reader.string("source_text");
    let stt_transcript = reader.string("stt_transcript");
    let correct = reader.enumeration::<Correctness>("correct");
    let comment = reader.string("comment");

    Some(PronunciationResult {
        source_text: source_text?,
        stt_transcript: stt_transcript?,
        correct: correct?,
        comment: comment?,
    })
}

fn read_number_pronunciation(
    reader: &mut ObjectReader<'_, '_>,
) -> Option<NumberPronunciationResult> {
    let reference_number = reader.string("reference_number");
    let user_text = reader.optional_string("user_text");
    let text_correct = reader.optional_boolean("text_correct");
    let text_comment = reader.optional_string("text_comment");
    let audio_transcript = reader.optional_string("audio_transcript");
    let audio_correct = reader.optional_boolean("audio_correct");
    let audio_comment = reader.optional_string("audio_comment");

    Some(NumberPronunciationResult {
        reference_number: reference_number?,
        user_text,
        text_correct,
        text_comment,
        audio_transcript,
        audio_correct,
        audio_comment,
    })
}
