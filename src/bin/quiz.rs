use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};
use quiz_forge::clients::GroqClient;
use quiz_forge::config::QuizConfig;
use quiz_forge::{Difficulty, ExportTarget, Question, QuestionGenerator, QuestionKind, QuizSession};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "📝 Generate a quiz on any topic and test yourself", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    GROQ_API_KEY       API key for the Groq client (required, may live in .env)
    GROQ_MODEL         Model id [default: llama-3.3-70b-versatile]
    GROQ_TEMPERATURE   Sampling temperature [default: 0.9]
    GROQ_JSON_MODE     Request JSON-object responses [default: false]
    QUIZ_RESULTS_DIR   Where saved results go [default: results]

EXAMPLES:
    quiz --topic \"Indian History\"
    quiz --topic Geography --kind blank --difficulty hard --count 3
    quiz --topic Physics --kind boolean --save")]
struct Args {
    /// Topic the questions are about
    #[arg(short, long)]
    topic: String,

    /// Question type
    #[arg(short, long, value_enum, default_value_t = QuestionKind::Choice)]
    kind: QuestionKind,

    /// Difficulty level
    #[arg(short, long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// Number of questions
    #[arg(short = 'n', long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=10))]
    count: u8,

    /// Directory for saved results (overrides QUIZ_RESULTS_DIR)
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Save results without asking
    #[arg(long)]
    save: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .try_init();

    let config = QuizConfig::from_env().context("failed to load configuration")?;
    let target = ExportTarget::in_dir(args.results_dir.clone().unwrap_or(config.results_dir.clone()));
    let generator = QuestionGenerator::new(GroqClient::new(config.groq));
    let mut session = QuizSession::new();

    println!("📝 Generating {} {} question(s) about {}...", args.count, args.kind, args.topic);
    if let Err(e) = session
        .generate(&generator, &args.topic, args.kind, args.difficulty, usize::from(args.count))
        .await
    {
        eprintln!("❌ Error generating questions: {}", e);
        exit(1);
    }

    println!("\n🎓 Quiz\n");
    let answers: Vec<String> = session
        .questions()
        .iter()
        .enumerate()
        .map(|(i, question)| ask(i + 1, question))
        .collect::<io::Result<Vec<String>>>()
        .or_else(cancelled)?;
    session.submit_answers(answers)?;
    session.evaluate()?;

    print_results(&session);

    if args.save || prompt_yes_no("Save results? (y/N): ").or_else(cancelled)? {
        match session.persist(&target).await {
            Ok(path) => println!("💾 Results saved to {}", path.display()),
            Err(e) => eprintln!("❌ Failed to save results: {}", e),
        }
    }

    Ok(())
}

fn ask(number: usize, question: &Question) -> io::Result<String> {
    println!("Question {}: {}", number, question.text());

    let choices = question.choices();
    if choices.is_empty() {
        return read_line(&format!("Fill in the blank for Question {}: ", number));
    }

    let keys: Vec<char> = match question {
        Question::Boolean(_) => vec!['t', 'f'],
        _ => ['a', 'b', 'c', 'd'].into_iter().take(choices.len()).collect(),
    };
    for (key, choice) in keys.iter().zip(&choices) {
        println!("  {}) {}", key, choice);
    }

    loop {
        print!("Select an answer for Question {}: ", number);
        io::stdout().flush()?;
        let key = match read_single_key() {
            Ok(Some(key)) => {
                println!("{}", key);
                key
            }
            Ok(None) => {
                println!();
                continue;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Err(e),
            // No raw terminal (piped input): fall back to a typed line
            Err(_) => read_line("")?.trim().chars().next().unwrap_or(' '),
        };
        if let Some(pos) = keys.iter().position(|k| *k == key.to_ascii_lowercase()) {
            println!();
            return Ok(choices[pos].to_string());
        }
        println!("Please press one of: {}", keys.iter().collect::<String>());
    }
}

/// Attempt to read a single keystroke
fn read_single_key() -> io::Result<Option<char>> {
    terminal::enable_raw_mode()?;

    let result = (|| -> io::Result<Option<char>> {
        loop {
            if !event::poll(Duration::from_secs(300))? {
                return Ok(None);
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                return key_to_char(key);
            }
        }
    })();

    terminal::disable_raw_mode()?;
    result
}

/// Raw mode swallows SIGINT, so Ctrl-C arrives as a key and becomes `Interrupted`.
fn key_to_char(key: KeyEvent) -> io::Result<Option<char>> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled with Ctrl-C"))
        }
        KeyCode::Char(c) => Ok(Some(c)),
        KeyCode::Enter => Ok(Some('\n')),
        _ => Ok(None),
    }
}

/// Exit on Ctrl-C; pass every other outcome through.
fn cancelled<T>(err: io::Error) -> io::Result<T> {
    if err.kind() == io::ErrorKind::Interrupted {
        println!();
        eprintln!("❌ Quiz cancelled");
        exit(130);
    }
    Err(err)
}

fn read_line(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_yes_no(prompt: &str) -> io::Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let answer = match read_single_key() {
        Ok(Some(key)) => {
            println!("{}", key);
            key
        }
        Ok(None) => 'n',
        Err(e) if e.kind() == io::ErrorKind::Interrupted => return Err(e),
        Err(_) => read_line("")?.trim().chars().next().unwrap_or('n'),
    };
    Ok(answer.eq_ignore_ascii_case(&'y'))
}

fn print_results(session: &QuizSession) {
    println!("\n🏆 Quiz Results\n");
    let Some(score) = session.score() else {
        println!("No results available. Please complete the quiz first.");
        return;
    };
    println!("{}\n", score);

    for result in session.results() {
        if result.is_correct {
            println!("✅ Question {}: {}", result.question_number, result.question);
        } else {
            println!("❌ Question {}: {}", result.question_number, result.question);
            println!("   Your Answer: {}", result.user_answer);
            println!("   Correct Answer: {}", result.correct_answer);
        }
        println!("---");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_c_interrupts_instead_of_selecting() {
        let err = key_to_char(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
    }

    #[test]
    fn plain_keys_map_to_chars() {
        assert_eq!(key_to_char(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)).unwrap(), Some('c'));
        assert_eq!(key_to_char(KeyEvent::new(KeyCode::Char('T'), KeyModifiers::SHIFT)).unwrap(), Some('T'));
        assert_eq!(key_to_char(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)).unwrap(), Some('\n'));
        assert_eq!(key_to_char(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)).unwrap(), None);
    }
}
