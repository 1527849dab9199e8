mod test_utils;

use quiz_forge::export::COLUMNS;
use quiz_forge::{Difficulty, ExportTarget, QuestionKind, QuizError, QuizSession, SessionState};

use crate::test_utils::{mock_generator, ok, repeat, FLAT_EARTH, FRANCE_BLANK, FRANCE_CHOICE, SHORT_CHOICE};

async fn generated_session(responses: Vec<quiz_forge::clients::MockResponse>, kind: QuestionKind) -> QuizSession {
    let count = responses.len();
    let (generator, _handle) = mock_generator(responses);
    let mut session = QuizSession::new();
    session
        .generate(&generator, "Geography", kind, Difficulty::Medium, count)
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn single_choice_round_trip() {
    let mut session = generated_session(vec![ok(FRANCE_CHOICE)], QuestionKind::Choice).await;
    assert_eq!(session.state(), SessionState::Generated);

    session.record_answer(0, "Paris").unwrap();
    assert_eq!(session.state(), SessionState::Attempted);

    let results = session.evaluate().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].question_number, 1);
    assert_eq!(results[0].question_type, QuestionKind::Choice);
    assert_eq!(results[0].correct_answer, "Paris");
    assert!(results[0].is_correct);
    assert_eq!(session.state(), SessionState::Evaluated);
    assert_eq!(session.score().unwrap().to_string(), "Score: 1/1 (100.0%)");
}

#[tokio::test]
async fn batch_aborts_when_third_question_exhausts_retries() {
    let mut responses = vec![ok(FRANCE_CHOICE), ok(FRANCE_CHOICE)];
    responses.extend(repeat(ok(SHORT_CHOICE), 3));
    responses.extend(repeat(ok(FRANCE_CHOICE), 2));
    let (generator, handle) = mock_generator(responses);
    let mut session = QuizSession::new();

    let err = session
        .generate(&generator, "Geography", QuestionKind::Choice, Difficulty::Easy, 5)
        .await
        .unwrap_err();

    assert!(matches!(err, QuizError::Generation(ref e) if e.attempts == 3));
    assert!(session.questions().is_empty());
    assert_eq!(session.state(), SessionState::Empty);
    // two good questions, then three failed attempts; nothing after
    assert_eq!(handle.call_count(), 5);
}

#[tokio::test]
async fn failed_generation_discards_previous_quiz() {
    let mut session = generated_session(vec![ok(FLAT_EARTH)], QuestionKind::Boolean).await;
    session.record_answer(0, "False").unwrap();
    session.evaluate().unwrap();

    let (generator, _handle) = mock_generator(Vec::new());
    assert!(session
        .generate(&generator, "Astronomy", QuestionKind::Boolean, Difficulty::Easy, 1)
        .await
        .is_err());

    assert!(session.questions().is_empty());
    assert!(session.answers().is_empty());
    assert!(session.results().is_empty());
}

#[tokio::test]
async fn evaluate_is_idempotent() {
    let mut session =
        generated_session(vec![ok(FRANCE_CHOICE), ok(FRANCE_CHOICE)], QuestionKind::Choice).await;
    session.submit_answers(["Berlin", " PARIS"]).unwrap();

    let first = session.evaluate().unwrap().to_vec();
    let second = session.evaluate().unwrap().to_vec();

    assert_eq!(first, second);
    assert_eq!(second.len(), 2);
    assert!(!second[0].is_correct);
    assert!(second[1].is_correct);
    assert_eq!(session.score().unwrap().correct, 1);
}

#[tokio::test]
async fn scoring_trims_and_ignores_case() {
    let mut session = generated_session(vec![ok(FRANCE_BLANK)], QuestionKind::Blank).await;

    session.submit_answers([" paris "]).unwrap();
    let results = session.evaluate().unwrap();

    assert!(results[0].is_correct);
    assert_eq!(results[0].user_answer, " paris ");
    assert_eq!(results[0].question, "The capital of France is _____.");
}

#[tokio::test]
async fn evaluation_requires_every_answer() {
    let mut session =
        generated_session(vec![ok(FLAT_EARTH), ok(FLAT_EARTH)], QuestionKind::Boolean).await;
    session.record_answer(0, "True").unwrap();

    assert!(matches!(
        session.evaluate(),
        Err(QuizError::IncompleteAnswers { answered: 1, total: 2 })
    ));

    session.record_answer(1, "False").unwrap();
    let results = session.evaluate().unwrap();
    assert!(!results[0].is_correct);
    assert!(results[1].is_correct);
    assert_eq!(session.score().unwrap().to_string(), "Score: 1/2 (50.0%)");
}

#[tokio::test]
async fn answers_are_recorded_in_order() {
    let mut session =
        generated_session(vec![ok(FLAT_EARTH), ok(FLAT_EARTH)], QuestionKind::Boolean).await;

    assert!(matches!(
        session.record_answer(1, "True"),
        Err(QuizError::AnswerOutOfOrder { index: 1, expected: 0 })
    ));
    assert!(matches!(
        session.record_answer(2, "True"),
        Err(QuizError::AnswerIndexOutOfRange { index: 2, total: 2 })
    ));

    session.record_answer(0, "True").unwrap();
    session.record_answer(0, "False").unwrap();
    assert_eq!(session.answers(), ["False".to_string()]);
}

#[tokio::test]
async fn rejected_bulk_submit_keeps_previous_answers() {
    let mut session =
        generated_session(vec![ok(FLAT_EARTH), ok(FLAT_EARTH)], QuestionKind::Boolean).await;
    session.record_answer(0, "True").unwrap();

    assert!(matches!(
        session.submit_answers(["False", "False", "extra"]),
        Err(QuizError::AnswerIndexOutOfRange { index: 2, total: 2 })
    ));

    assert_eq!(session.state(), SessionState::Attempted);
    assert_eq!(session.answers(), ["True".to_string()]);
    assert!(matches!(
        session.evaluate(),
        Err(QuizError::IncompleteAnswers { answered: 1, total: 2 })
    ));
}

#[tokio::test]
async fn changing_an_answer_invalidates_results() {
    let mut session = generated_session(vec![ok(FLAT_EARTH)], QuestionKind::Boolean).await;
    session.submit_answers(["True"]).unwrap();
    session.evaluate().unwrap();

    session.record_answer(0, "False").unwrap();

    assert_eq!(session.state(), SessionState::Attempted);
    assert!(session.results().is_empty());
    assert!(session.score().is_none());
    assert!(session.evaluate().unwrap()[0].is_correct);
}

#[tokio::test]
async fn generating_again_resets_answers() {
    let mut session = generated_session(vec![ok(FLAT_EARTH)], QuestionKind::Boolean).await;
    session.submit_answers(["True"]).unwrap();
    session.evaluate().unwrap();

    let (generator, _handle) = mock_generator(vec![ok(FRANCE_CHOICE)]);
    session
        .generate(&generator, "Geography", QuestionKind::Choice, Difficulty::Hard, 1)
        .await
        .unwrap();

    assert_eq!(session.state(), SessionState::Generated);
    assert!(session.answers().is_empty());
    assert!(session.results().is_empty());
}

#[test]
fn empty_session_exports_header_only() {
    let session = QuizSession::new();
    let table = session.export();

    assert_eq!(table.len(), 0);
    assert_eq!(table.columns(), COLUMNS);
    assert_eq!(
        table.to_csv().unwrap(),
        "question_number,question,question_type,user_answer,correct_answer,is_correct\n"
    );
}

#[tokio::test]
async fn persist_without_results_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let session = generated_session(vec![ok(FLAT_EARTH)], QuestionKind::Boolean).await;

    let err = session.persist(&ExportTarget::in_dir(dir.path().join("results"))).await.unwrap_err();

    assert!(matches!(err, QuizError::NoResults));
    assert!(!dir.path().join("results").exists());
}

#[tokio::test]
async fn persist_writes_timestamped_csv() {
    let dir = tempfile::tempdir().unwrap();
    let results_dir = dir.path().join("results");
    let mut session =
        generated_session(vec![ok(FLAT_EARTH), ok(FLAT_EARTH)], QuestionKind::Boolean).await;
    session.submit_answers(["False", "true"]).unwrap();
    session.evaluate().unwrap();

    let path = session.persist(&ExportTarget::in_dir(&results_dir)).await.unwrap();

    assert_eq!(path.parent(), Some(results_dir.as_path()));
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("quiz_results_"));
    assert!(name.ends_with(".csv"));
    let stamp = &name["quiz_results_".len()..name.len() - ".csv".len()];
    assert_eq!(stamp.len(), "YYYYMMDD_HHMMSS".len());
    assert_eq!(stamp.as_bytes()[8], b'_');
    assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], COLUMNS.join(","));
    assert_eq!(lines[1], "1,The Earth is flat.,True/False,False,False,true");
    assert_eq!(lines[2], "2,The Earth is flat.,True/False,true,False,false");
}

#[tokio::test]
async fn persist_reports_unwritable_directory() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "file").unwrap();
    let mut session = generated_session(vec![ok(FLAT_EARTH)], QuestionKind::Boolean).await;
    session.submit_answers(["False"]).unwrap();
    session.evaluate().unwrap();

    let err = session.persist(&ExportTarget::in_dir(&blocker)).await.unwrap_err();

    assert!(matches!(err, QuizError::Persistence { .. }));
    assert_eq!(session.state(), SessionState::Evaluated);
}
