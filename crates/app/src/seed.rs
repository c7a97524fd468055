//! Demo question block.

use anyhow::{Context, Result};

use playtest_core::model::{AnswerKey, BlockId, Question, QuestionContent, QuestionId, TopicId};
use storage::repository::QuestionRepository;

struct DemoQuestion {
    text: &'static str,
    options: [&'static str; 4],
    correct: AnswerKey,
    explanation: &'static str,
}

const DEMO: &[DemoQuestion] = &[
    DemoQuestion {
        text: "¿Cuál es el planeta más grande del sistema solar?",
        options: ["Saturno", "Júpiter", "Neptuno", "Tierra"],
        correct: AnswerKey::B,
        explanation: "Júpiter tiene más del doble de masa que el resto de planetas juntos.",
    },
    DemoQuestion {
        text: "¿Qué gas absorben las plantas en la fotosíntesis?",
        options: ["Oxígeno", "Nitrógeno", "Dióxido de carbono", "Helio"],
        correct: AnswerKey::C,
        explanation: "Las plantas fijan CO2 y liberan oxígeno.",
    },
    DemoQuestion {
        text: "¿Cuántos lados tiene un hexágono?",
        options: ["Cinco", "Siete", "Ocho", "Seis"],
        correct: AnswerKey::D,
        explanation: "Hexa significa seis.",
    },
    DemoQuestion {
        text: "¿En qué año llegó el ser humano a la Luna?",
        options: ["1969", "1959", "1975", "1981"],
        correct: AnswerKey::A,
        explanation: "El Apolo 11 alunizó el 20 de julio de 1969.",
    },
    DemoQuestion {
        text: "¿Cuál es el símbolo químico del oro?",
        options: ["Ag", "Au", "Or", "Go"],
        correct: AnswerKey::B,
        explanation: "Au viene del latín aurum.",
    },
    DemoQuestion {
        text: "¿Qué océano es el más extenso?",
        options: ["Atlántico", "Índico", "Pacífico", "Ártico"],
        correct: AnswerKey::C,
        explanation: "El Pacífico cubre cerca de un tercio de la superficie terrestre.",
    },
    DemoQuestion {
        text: "¿Quién escribió «Don Quijote de la Mancha»?",
        options: ["Lope de Vega", "Quevedo", "Góngora", "Cervantes"],
        correct: AnswerKey::D,
        explanation: "Miguel de Cervantes publicó la primera parte en 1605.",
    },
    DemoQuestion {
        text: "¿Cuál es el resultado de 7 × 8?",
        options: ["56", "54", "64", "48"],
        correct: AnswerKey::A,
        explanation: "7 × 8 = 56.",
    },
    DemoQuestion {
        text: "¿Qué órgano bombea la sangre?",
        options: ["Pulmón", "Corazón", "Hígado", "Riñón"],
        correct: AnswerKey::B,
        explanation: "El corazón impulsa la sangre por el sistema circulatorio.",
    },
    DemoQuestion {
        text: "¿Cuál es la capital de Australia?",
        options: ["Sídney", "Melbourne", "Canberra", "Perth"],
        correct: AnswerKey::C,
        explanation: "Canberra se eligió como compromiso entre Sídney y Melbourne.",
    },
    DemoQuestion {
        text: "¿A qué temperatura hierve el agua a nivel del mar?",
        options: ["90 °C", "110 °C", "120 °C", "100 °C"],
        correct: AnswerKey::D,
        explanation: "A una atmósfera de presión el agua hierve a 100 °C.",
    },
    DemoQuestion {
        text: "¿Cuántos continentes se suelen contar?",
        options: ["Siete", "Cinco", "Seis", "Ocho"],
        correct: AnswerKey::A,
        explanation: "El modelo más extendido cuenta siete continentes.",
    },
];

/// Upsert the demo questions into `block_id` and return how many were written.
///
/// Question ids are derived from the block so seeding twice is idempotent.
pub async fn seed_demo_block(questions: &dyn QuestionRepository, block_id: BlockId) -> Result<usize> {
    demo_question_id(block_id, DEMO.len() as u64)?;
    for (offset, demo) in (1_u64..).zip(DEMO) {
        let content = QuestionContent::new(
            demo.text,
            demo.options.map(str::to_string),
            demo.correct,
            Some(demo.explanation.to_string()),
        )?;
        let question = Question::new(
            demo_question_id(block_id, offset)?,
            block_id,
            Some(TopicId::new(1)),
            content,
        );
        questions.upsert_question(&question).await?;
    }
    tracing::info!(block = %block_id, count = DEMO.len(), "seeded demo block");
    Ok(DEMO.len())
}

/// `block * 1000 + offset`, kept within the `i64` range the store uses.
fn demo_question_id(block_id: BlockId, offset: u64) -> Result<QuestionId> {
    block_id
        .value()
        .checked_mul(1000)
        .and_then(|base| base.checked_add(offset))
        .filter(|id| i64::try_from(*id).is_ok())
        .map(QuestionId::new)
        .with_context(|| format!("el bloque {block_id} es demasiado grande para generar ids"))
}
