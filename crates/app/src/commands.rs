//! Subcommand handlers.

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};

use playtest_core::model::{AnswerKey, BlockId, GameMode, PerformanceBand, SessionOutcome, UserId};
use services::{AppServices, PracticePlanner, PracticeSession, SessionLength};
use storage::repository::QuestionRepository;

use crate::seed::seed_demo_block;

pub async fn seed(app: &AppServices, block: BlockId) -> Result<()> {
    let count = seed_demo_block(app.questions().as_ref(), block).await?;
    println!("Bloque {block}: {count} preguntas cargadas");
    Ok(())
}

pub async fn plan(app: &AppServices, user: UserId, block: BlockId, count: SessionLength) -> Result<()> {
    let pool = app.questions().questions_for_block(user, block).await?;
    let plan = PracticePlanner::new(count).plan(pool)?;
    if plan.is_empty() {
        bail!("el bloque {block} no tiene preguntas");
    }

    let progress = plan.progress;
    println!(
        "Bloque {block}: {}/{} dominadas ({:.0}%)",
        progress.mastered,
        progress.total,
        progress.percent()
    );
    println!(
        "Sesión de {} preguntas: {} falladas, {} nuevas, {} en aprendizaje, {} dominadas ({} de relleno)",
        plan.total(),
        plan.composition.failed,
        plan.composition.new,
        plan.composition.learning,
        plan.composition.mastered,
        plan.backfilled
    );
    for (n, question) in plan.questions.iter().enumerate() {
        let accuracy = question
            .stats()
            .accuracy_percent()
            .map_or_else(|| "-".to_string(), |a| format!("{a:.0}%"));
        println!(
            "{:>3}. [{}] {} ({accuracy})",
            n + 1,
            question.id(),
            question.content().text()
        );
    }
    Ok(())
}

pub async fn practice(
    app: &AppServices,
    user: UserId,
    block: BlockId,
    count: SessionLength,
    mode: GameMode,
) -> Result<()> {
    let practice_loop = app.practice_loop();
    let mut session = practice_loop.start_session(user, block, count, mode).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while !session.is_complete() {
        let answer = {
            let Some(question) = session.current_question() else {
                break;
            };
            let progress = session.progress();
            println!();
            println!(
                "Pregunta {}/{}: {}",
                progress.answered + 1,
                progress.total,
                question.content().text()
            );
            let offered: Vec<AnswerKey> = question
                .content()
                .available_options()
                .map(|(key, text)| {
                    println!("  {key}) {text}");
                    key
                })
                .collect();
            read_answer(&mut lines, &offered).await?
        };

        let result = practice_loop.answer_current(&mut session, answer).await?;
        if result.answer.correct {
            println!("¡Correcto!");
        } else {
            println!("Incorrecto. La respuesta era {}.", result.answer.expected);
        }
        if let Some(explanation) = &result.answer.explanation {
            println!("Explicación: {explanation}");
        }
    }

    print_summary(&session);
    Ok(())
}

/// Prompt until the user types one of the `offered` keys.
async fn read_answer<R>(lines: &mut tokio::io::Lines<R>, offered: &[AnswerKey]) -> Result<AnswerKey>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    loop {
        print!("> ");
        std::io::Write::flush(&mut std::io::stdout())?;
        let line = lines
            .next_line()
            .await?
            .context("entrada cerrada antes de terminar la sesión")?;
        match line.parse::<AnswerKey>() {
            Ok(key) if offered.contains(&key) => return Ok(key),
            _ => {
                let keys: Vec<&str> = offered.iter().map(|k| k.as_str()).collect();
                println!("Responde con {}.", keys.join(", "));
            }
        }
    }
}

fn print_summary(session: &PracticeSession) {
    let Some(outcome) = session.outcome() else {
        return;
    };
    let band = session
        .performance()
        .unwrap_or(PerformanceBand::NeedsPractice);
    println!();
    println!(
        "{}/{} correctas. {}",
        outcome.correct_answers,
        outcome.total_questions,
        band.message()
    );
    if let Some(reward) = session.reward() {
        println!(
            "+{} Luminarias (saldo: {})",
            reward.amount, reward.balance
        );
    }
}

pub async fn reward(
    app: &AppServices,
    user: UserId,
    correct: u32,
    total: u32,
    mode: GameMode,
    victory: bool,
) -> Result<()> {
    if correct > total {
        bail!("--correct ({correct}) no puede superar --total ({total})");
    }
    let outcome = SessionOutcome::new(mode, correct, total).with_victory(victory);
    let receipt = app.luminarias().reward_session(user, &outcome).await?;
    println!(
        "+{} Luminarias en modo {} (saldo: {})",
        receipt.amount,
        outcome.game_mode.label(),
        receipt.balance
    );
    Ok(())
}

pub async fn balance(app: &AppServices, user: UserId, limit: u32) -> Result<()> {
    let wallet = app.luminarias();
    let balance = wallet.balance(user).await?;
    println!("Saldo de {user}: {balance} Luminarias");
    for row in wallet.history(user, limit).await? {
        let tx = &row.transaction;
        println!(
            "  #{:<4} {} {:>+5}  {}",
            row.id,
            tx.created_at().format("%Y-%m-%d %H:%M"),
            tx.signed_amount(),
            tx.description()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_answer_skips_keys_that_are_not_offered() {
        let input: &[u8] = b"c\nx\nB\n";
        let mut lines = BufReader::new(input).lines();
        let key = read_answer(&mut lines, &[AnswerKey::A, AnswerKey::B])
            .await
            .unwrap();
        assert_eq!(key, AnswerKey::B);
    }

    #[tokio::test]
    async fn read_answer_fails_on_closed_input() {
        let input: &[u8] = b"z\n";
        let mut lines = BufReader::new(input).lines();
        assert!(read_answer(&mut lines, &AnswerKey::ALL).await.is_err());
    }
}
