mod quiz;

use std::sync::Arc;

use dotenv::dotenv;
use rand::seq::SliceRandom;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode},
    utils::command::BotCommands,
};
use url::Url;

use quiz::catalog::{Category, TopicCatalog};
use quiz::dispatch::{Dispatcher as QuizDispatcher, ErrorKind, Event, Outcome};
use quiz::loader::LoadError;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const YOUTUBE_LINK: &str = "https://www.youtube.com/@sscwalistudy?sub_confirmation=1";

const MOTIVATION_LINES: [&str; 4] = [
    "Mehnat itni karo ki kismat bhi bol uthe, 'Le le beta, isme tera hi haq hai!'",
    "Sapne woh nahi jo hum sote huye dekhte hain, sapne woh hain jo hamein sone nahi dete.",
    "Mushkilon se bhago mat, unka saamna karo!",
    "Koshish karne walon ki kabhi haar nahi hoti.",
];

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    #[command(description = "open the quiz menu")]
    Start,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting quiz bot...");

    let bot = Bot::from_env();

    let root = std::env::current_dir().expect("Failed to resolve working directory");
    let catalog = Arc::new(TopicCatalog::build(&root));
    let dispatcher = Arc::new(QuizDispatcher::new(catalog));

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(on_command),
        )
        .branch(Update::filter_callback_query().endpoint(on_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn on_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    quiz: Arc<QuizDispatcher>,
) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    match cmd {
        Command::Start => {
            let outcomes = quiz.handle(user.id.0, Event::ShowMenu).await;
            render_outcomes(&bot, msg.chat.id, user.id.0, None, None, &quiz, outcomes).await
        }
    }
}

async fn on_callback(bot: Bot, q: CallbackQuery, quiz: Arc<QuizDispatcher>) -> HandlerResult {
    // Telegram can redeliver stale taps long after the message they belong
    // to; anything unparseable just gets acknowledged and dropped.
    let event = q.data.as_deref().and_then(parse_callback);
    let (Some(event), Some(message)) = (event, q.message.as_ref()) else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };
    let chat_id = message.chat.id;
    // Menu navigation edits the tapped message in place instead of piling
    // up new ones; quiz traffic always posts fresh messages.
    let edit = matches!(event, Event::ShowMenu | Event::SelectCategory(_)).then(|| message.id);

    let outcomes = quiz.handle(q.from.id.0, event).await;
    render_outcomes(&bot, chat_id, q.from.id.0, Some(&q), edit, &quiz, outcomes).await
}

/// The transport owns the wire encoding of button payloads; the core only
/// ever sees the closed `Event` enum.
fn parse_callback(data: &str) -> Option<Event> {
    if data == "menu" {
        return Some(Event::ShowMenu);
    }
    if data == "skip" {
        return Some(Event::SkipQuestion);
    }
    if let Some(code) = data.strip_prefix("cat:") {
        return Category::from_code(code).map(Event::SelectCategory);
    }
    if let Some(rest) = data.strip_prefix("topic:") {
        let (code, id) = rest.split_once(':')?;
        return Some(Event::SelectTopic(Category::from_code(code)?, id.to_string()));
    }
    if let Some(option) = data.strip_prefix("ans:") {
        return Some(Event::SubmitAnswer(option.to_string()));
    }
    None
}

async fn render_outcomes(
    bot: &Bot,
    chat_id: ChatId,
    user_id: u64,
    callback: Option<&CallbackQuery>,
    edit: Option<MessageId>,
    quiz: &QuizDispatcher,
    outcomes: Vec<Outcome>,
) -> HandlerResult {
    let mut answered = false;
    for outcome in outcomes {
        match outcome {
            Outcome::MainMenu => send_main_menu(bot, chat_id, edit).await?,
            Outcome::CategoryMenu { category, entries } => {
                let mut rows: Vec<Vec<InlineKeyboardButton>> = entries
                    .iter()
                    .map(|entry| {
                        vec![InlineKeyboardButton::callback(
                            entry.title.clone(),
                            format!("topic:{}:{}", entry.category.code(), entry.id),
                        )]
                    })
                    .collect();
                rows.push(vec![InlineKeyboardButton::callback("⬅️ Back", "menu")]);
                let header = match category {
                    Category::General => "📘 GK Topics:",
                    Category::CurrentAffairs => "📰 Current Affairs:",
                };
                let markup = InlineKeyboardMarkup::new(rows);
                match edit {
                    Some(message_id) => {
                        bot.edit_message_text(chat_id, message_id, header)
                            .reply_markup(markup)
                            .await?;
                    }
                    None => {
                        bot.send_message(chat_id, header)
                            .reply_markup(markup)
                            .await?;
                    }
                }
            }
            Outcome::QuizStarted { title } => {
                bot.send_message(chat_id, format!("📝 **{}**\n\nQuiz shuru ho raha hai...", title))
                    .parse_mode(ParseMode::Markdown)
                    .await?;
            }
            Outcome::QuestionView {
                question,
                index,
                total: _,
            } => {
                let mut rows: Vec<Vec<InlineKeyboardButton>> = question
                    .options
                    .iter()
                    .map(|option| {
                        vec![InlineKeyboardButton::callback(
                            option.clone(),
                            format!("ans:{}", option),
                        )]
                    })
                    .collect();
                rows.push(vec![InlineKeyboardButton::callback(
                    "⏩ Skip Question",
                    "skip",
                )]);
                let sent = bot
                    .send_message(
                        chat_id,
                        format!("**Question {}:**\n\n{}", index + 1, question.question),
                    )
                    .parse_mode(ParseMode::Markdown)
                    .reply_markup(InlineKeyboardMarkup::new(rows))
                    .await?;
                quiz.note_presented(user_id, i64::from(sent.id.0)).await;
            }
            Outcome::AnswerFeedback {
                correct,
                correct_answer,
            } => {
                let text = if correct {
                    "✅ Sahi Jawab!".to_string()
                } else {
                    format!("❌ Galat! Sahi jawab: {}", correct_answer)
                };
                answered = answer_toast(bot, chat_id, callback, &text).await? || answered;
            }
            Outcome::QuizSummary(summary) => {
                bot.send_message(
                    chat_id,
                    format!(
                        "**Quiz Samapt! 🎉**\n\n\
                         🏆 Score: {}\n\
                         ✅ Sahi: {}\n\
                         ❌ Galat: {}\n\
                         ❓ Attempted: {}\n\
                         ⏱️ Samay: {} sec",
                        summary.score,
                        summary.correct,
                        summary.incorrect,
                        summary.attempted,
                        summary.elapsed_secs
                    ),
                )
                .parse_mode(ParseMode::Markdown)
                .await?;
            }
            Outcome::Error(kind) => {
                answered = render_error(bot, chat_id, callback, kind).await? || answered;
            }
        }
    }

    // Telegram keeps the button spinner running until the callback query is
    // answered at least once.
    if let (false, Some(q)) = (answered, callback) {
        bot.answer_callback_query(q.id.clone()).await?;
    }
    Ok(())
}

async fn render_error(
    bot: &Bot,
    chat_id: ChatId,
    callback: Option<&CallbackQuery>,
    kind: ErrorKind,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    match kind {
        // Stale or duplicate tap: a toast is enough, no chat noise.
        ErrorKind::SessionNotFound => answer_toast(bot, chat_id, callback, "⚠️ Quiz state lost!").await,
        ErrorKind::TopicNotFound => {
            bot.send_message(chat_id, "❌ Yeh topic ab available nahi hai.")
                .await?;
            Ok(false)
        }
        ErrorKind::InvalidQuestion(_) => {
            bot.send_message(chat_id, "⚠️ Question format galat hai, skip kiya ja raha hai.")
                .await?;
            Ok(false)
        }
        ErrorKind::Load(LoadError::Empty) => {
            bot.send_message(chat_id, "❌ Is topic me questions nahi mile.")
                .await?;
            Ok(false)
        }
        ErrorKind::Load(_) => {
            bot.send_message(chat_id, "❌ File read karne me error aaya.")
                .await?;
            Ok(false)
        }
    }
}

/// Short feedback rides on the callback answer (a toast) when there is one,
/// and falls back to a plain message otherwise.
async fn answer_toast(
    bot: &Bot,
    chat_id: ChatId,
    callback: Option<&CallbackQuery>,
    text: &str,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    match callback {
        Some(q) => {
            bot.answer_callback_query(q.id.clone()).text(text).await?;
            Ok(true)
        }
        None => {
            bot.send_message(chat_id, text).await?;
            Ok(false)
        }
    }
}

fn main_menu_markup() -> InlineKeyboardMarkup {
    let mut rows = vec![
        vec![InlineKeyboardButton::callback(
            "🧠 GK TOPICS",
            format!("cat:{}", Category::General.code()),
        )],
        vec![InlineKeyboardButton::callback(
            "📰 CURRENT AFFAIRS",
            format!("cat:{}", Category::CurrentAffairs.code()),
        )],
    ];
    if let Ok(url) = Url::parse(YOUTUBE_LINK) {
        rows.push(vec![InlineKeyboardButton::url("➡️ SUBSCRIBE NOW", url)]);
    }
    InlineKeyboardMarkup::new(rows)
}

async fn send_main_menu(bot: &Bot, chat_id: ChatId, edit: Option<MessageId>) -> HandlerResult {
    // A Back tap rewrites the tapped menu in place; everything else gets
    // the full welcome message.
    if let Some(message_id) = edit {
        bot.edit_message_text(chat_id, message_id, "⬅️ Back to Main Menu")
            .reply_markup(main_menu_markup())
            .await?;
        return Ok(());
    }

    let motivation = MOTIVATION_LINES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(MOTIVATION_LINES[0]);
    bot.send_message(
        chat_id,
        format!(
            "**Welcome to DEEP STUDY QUIZ 📚**\n\n💡 {}\n\nAb aap apne quiz ka subject chunein:",
            motivation
        ),
    )
    .parse_mode(ParseMode::Markdown)
    .reply_markup(main_menu_markup())
    .await?;
    Ok(())
}
