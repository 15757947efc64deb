use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bank::QuestionBank;
use exam_core::config::ExamConfig;
use exam_core::countdown::ExamDuration;
use exam_core::model::{OptionId, Question, QuestionId, QuestionOption};
use exam_core::time::fixed_clock;
use services::{ExamLoopService, ExamSession, NavOutcome, SeedSource, SubmitOutcome};

fn lock(session: &Arc<Mutex<ExamSession>>) -> MutexGuard<'_, ExamSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Five questions with varied answer sets, including one multi-answer.
fn five_question_bank() -> Arc<QuestionBank> {
    let single = |id: u64, right: OptionId| {
        Question::new(
            QuestionId::new(id),
            Some(id as u32),
            format!("Prompt {id}"),
            vec![
                QuestionOption::new(OptionId::A, "first"),
                QuestionOption::new(OptionId::B, "second"),
                QuestionOption::new(OptionId::C, "third"),
            ],
            [right].into_iter().collect(),
            false,
        )
        .unwrap()
    };
    let multi = Question::new(
        QuestionId::new(5),
        Some(5),
        "Pick all that apply",
        vec![
            QuestionOption::new(OptionId::A, "first"),
            QuestionOption::new(OptionId::B, "second"),
            QuestionOption::new(OptionId::C, "third"),
        ],
        [OptionId::A, OptionId::C].into_iter().collect(),
        true,
    )
    .unwrap();

    Arc::new(
        QuestionBank::from_questions(vec![
            single(1, OptionId::A),
            single(2, OptionId::B),
            single(3, OptionId::C),
            single(4, OptionId::A),
            multi,
        ])
        .unwrap(),
    )
}

fn three_of_five(seeds: SeedSource) -> ExamLoopService {
    ExamLoopService::new(
        fixed_clock(),
        five_question_bank(),
        ExamConfig::new(3, ExamDuration::new(0, 1)),
    )
    .with_seeds(seeds)
}

#[test]
fn perfect_run_scores_three_of_three() {
    let service = three_of_five(SeedSource::sequence([42]));
    let session = service.start().unwrap();

    loop {
        let mut exam = lock(&session);
        let answer = exam.current_question().answer().clone();
        for option in answer {
            exam.select_option(option);
        }
        assert!(matches!(
            exam.submit_question(),
            SubmitOutcome::Submitted { correct: true }
        ));
        match exam.next(fixed_clock().now()) {
            NavOutcome::Moved { .. } => {}
            NavOutcome::Finished => break,
            other => panic!("unexpected navigation outcome: {other:?}"),
        }
    }

    let report = service.exit(&session).unwrap();
    assert_eq!(report.correct, 3);
    assert_eq!(report.total, 3);
    assert_eq!(report.percentage(), 100);

    let exam = lock(&session);
    let review = exam.review().unwrap();
    assert_eq!(review.len(), 3);
    assert!(review.iter().all(|entry| entry.correct));
}

#[test]
fn seed_42_draws_the_same_three_questions_every_time() {
    let draw_ids = || -> Vec<QuestionId> {
        let service = three_of_five(SeedSource::sequence([42]));
        let session = service.start().unwrap();
        let ids = lock(&session).quiz().iter().map(Question::id).collect();
        ids
    };

    let first = draw_ids();
    assert_eq!(first.len(), 3);
    assert_eq!(first, draw_ids());
}

#[test]
fn retry_draws_a_fresh_set_from_the_next_seed() {
    // A wider bank keeps the odds of two seeds agreeing on one ordering
    // astronomically small.
    let questions = (1..=12)
        .map(|id| {
            Question::new(
                QuestionId::new(id),
                Some(id as u32),
                format!("Prompt {id}"),
                vec![
                    QuestionOption::new(OptionId::A, "first"),
                    QuestionOption::new(OptionId::B, "second"),
                ],
                [OptionId::A].into_iter().collect(),
                false,
            )
            .unwrap()
        })
        .collect();
    let bank = Arc::new(QuestionBank::from_questions(questions).unwrap());
    let service = ExamLoopService::new(
        fixed_clock(),
        bank,
        ExamConfig::new(6, ExamDuration::new(0, 1)),
    )
    .with_seeds(SeedSource::sequence([7, 8, 9]));
    let session = service.start().unwrap();
    let first: Vec<QuestionId> = lock(&session).quiz().iter().map(Question::id).collect();

    lock(&session).end_now(fixed_clock().now());
    service.retry(&session).unwrap();
    let second: Vec<QuestionId> = lock(&session).quiz().iter().map(Question::id).collect();

    lock(&session).end_now(fixed_clock().now());
    service.retry(&session).unwrap();
    let third: Vec<QuestionId> = lock(&session).quiz().iter().map(Question::id).collect();

    // The bank is unchanged but the draws differ between distinct seeds.
    assert_ne!(first, second);
    assert_ne!(second, third);
    assert!(!lock(&session).is_submitted());
}

#[test]
fn ending_early_freezes_the_sheet_mid_exam() {
    let service = three_of_five(SeedSource::sequence([42]));
    let session = service.start().unwrap();

    {
        let mut exam = lock(&session);
        let answer = exam.current_question().answer().clone();
        for option in answer {
            exam.select_option(option);
        }
        assert!(exam.end_now(fixed_clock().now()));
    }

    let report = service.exit(&session).unwrap();
    assert_eq!(report.correct, 1);
    assert_eq!(report.total, 3);
    assert_eq!(report.percentage(), 33);
}
