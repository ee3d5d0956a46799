//! Canned interviewer texts. The product speaks Russian; these strings are
//! part of the observable contract and stay verbatim.

use crate::models::profile::CandidateProfile;

/// Sentinel ids for the in-memory fallback message when no session could
/// be created at all.
pub const TEMP_SESSION_ID: &str = "temp";
pub const TEMP_MESSAGE_ID: &str = "temp-1";

/// Shown instead of failing the send flow when a collaborator errors out.
pub const APOLOGY_MESSAGE: &str = "Извините, произошла ошибка при обработке вашего ответа. \
Давайте продолжим - расскажите мне больше о вашем опыте работы.";

/// Returned by finalize when fewer than three answers have been given.
pub const FINALIZE_GUIDANCE: &str =
    "Пожалуйста, ответьте еще на несколько вопросов для создания полного профиля.";

/// Opening line sent to the RAG engine to seed the first interviewer turn.
pub fn interview_greeting(name: &str) -> String {
    format!("Привет! Меня зовут {name}, готов к собеседованию.")
}

/// Hardcoded welcome shown when the RAG engine cannot produce an opening.
pub fn fallback_welcome(name: &str) -> String {
    format!(
        "Добро пожаловать в AI собеседование с RAG, {name}! 🤖\n\n\
         Я использую передовую технологию RAG (Retrieval Augmented Generation) \
         для проведения интеллектуальных собеседований.\n\n\
         Расскажите немного о себе: ваш опыт работы, навыки и что вас интересует \
         в профессиональном развитии?"
    )
}

/// Closing summary appended when an interview is finalized: overall score,
/// how many skills were assessed and the top three recommendations.
pub fn completion_message(profile: &CandidateProfile) -> String {
    let recommendations = profile
        .recommendations
        .iter()
        .take(3)
        .map(|rec| format!("• {rec}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Спасибо за интересную беседу! 🎉\n\n\
         Ваш профиль кандидата готов. Основные результаты:\n\
         • Общий балл: {}/100\n\
         • Технических навыков оценено: {}\n\
         • Soft skills оценено: {}\n\n\
         {}\n\n\
         Рекомендации для развития:\n{}",
        profile.overall_score,
        profile.technical_skills.len(),
        profile.soft_skills.len(),
        profile.summary,
        recommendations
    )
}
