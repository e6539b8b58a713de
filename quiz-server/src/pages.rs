//! HTML pages.

use maud::{DOCTYPE, Markup, html};
use quiz_core::{QuestionView, StartView};

use crate::server::{GIFT_PATH, LETSGO_PATH, START_PATH, SUBMIT_PATH, question_path};

fn layout(title: &str, page: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="fr" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="/static/quiz.css";
            }
            body data-page=(page) {
                main class="card" {
                    (content)
                }
                script src="/static/quiz.js" {}
            }
        }
    }
}

pub fn start(view: &StartView) -> Markup {
    layout(
        "Le quiz",
        "start",
        html! {
            h1 { "Prête pour un petit quiz ?" }
            p { "Quatre questions, dans l'ordre. Une bonne réponse débloque la suivante." }
            div class="actions" {
                button id="startQuizBtn" data-href=(question_path(1, view.first_token.as_str())) {
                    "Commencer"
                }
                @if let Some(resume) = &view.resume {
                    button id="resumeBtn" class="secondary"
                        data-resume-id=(resume.question_id)
                        data-href=(question_path(resume.question_id, resume.token.as_str())) {
                        "Reprendre à la question " (resume.question_id)
                    }
                }
            }
        },
    )
}

pub fn question(view: &QuestionView) -> Markup {
    let question = view.question;
    layout(
        &format!("Question {}", question.id),
        "question",
        html! {
            div class="progress" {
                div class="progress-bar" style=(format!("width: {}%", view.progress_percent)) {}
            }
            p class="counter" { "Question " (question.id) " / " (view.total) }
            h1 { (question.text) }
            form id="answerForm" method="post" action=(SUBMIT_PATH) data-token=(view.token.as_str()) {
                input type="hidden" name="question_id" value=(question.id);
                input id="answerInput" type="text" name="answer" autocomplete="off" required;
                button type="submit" { "Valider" }
            }
            p id="answerMessage" class="message" role="status" {}
        },
    )
}

pub fn success() -> Markup {
    layout(
        "Bravo !",
        "success",
        html! {
            h1 { "Bravo, tout est juste !" }
            p { "Alors, ce quiz ?" }
            div class="actions" {
                button class="feedback" data-feedback="positive" { "Mais trop" }
                button class="feedback secondary" data-feedback="negative" { "Mouis..." }
            }
            p id="feedbackMessage" class="message" role="status" {}
            button id="revealBtn" data-log-button="reveal" data-href=(GIFT_PATH) { "Découvrir la surprise" }
        },
    )
}

pub fn gift() -> Markup {
    layout(
        "La surprise",
        "gift",
        html! {
            h1 { "Une surprise t'attend" }
            p { "Prépare-toi, on sort ce soir." }
            button data-log-button="letsgo" data-href=(LETSGO_PATH) { "C'est parti" }
        },
    )
}

pub fn letsgo() -> Markup {
    layout(
        "C'est parti",
        "letsgo",
        html! {
            h1 { "C'est parti !" }
            a href=(format!("{}?reset=1", START_PATH)) data-log-button="restart" { "Recommencer le quiz" }
        },
    )
}
