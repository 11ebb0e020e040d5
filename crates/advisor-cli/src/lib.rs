//! Fraud Expert Console
//!
//! Drives the read-eval-ask loop: analyze, report, ask the most valuable
//! question, load the answer, repeat until the advisor is satisfied.

use anyhow::{bail, Context, Result};
use fraud_advisor::{FraudAdvisor, Recommendation};
use rule_engine::{FactValue, Facts};
use std::collections::{BTreeMap, HashMap};
use std::io::{self, BufRead, StdinLock, Write};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const RULE: &str = "============================================================";

/// Source of answers for questions without a pre-supplied answer
pub trait AnswerSource {
    fn ask(&mut self, prompt: &str) -> Result<bool>;
}

/// Reads one answer per line; yes/y/1/true mean yes, anything else no
pub struct LineAnswers<R> {
    reader: R,
}

impl<R: BufRead> LineAnswers<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl LineAnswers<StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> AnswerSource for LineAnswers<R> {
    fn ask(&mut self, prompt: &str) -> Result<bool> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .with_context(|| format!("reading answer to {:?}", prompt))?;
        if read == 0 {
            bail!("input closed before answering {:?}", prompt);
        }
        Ok(parse_answer(&line))
    }
}

pub fn parse_answer(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "yes" | "y" | "1" | "true"
    )
}

/// Final decision of a console session
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub decision: Recommendation,
    pub questions_asked: usize,
}

/// Transaction used when none is supplied: a traveller on a known device
pub fn demo_transaction() -> Facts {
    [
        ("amount", FactValue::Int(1)),
        ("ip_risk_score", FactValue::Int(0)),
        ("account_age_days", FactValue::Int(1)),
        ("country_mismatch", FactValue::Bool(true)),
        ("device_seen_before", FactValue::Bool(true)),
        ("failed_logins_24h", FactValue::Int(0)),
        ("transactions_last_hour", FactValue::Int(4)),
        ("billing_shipping_mismatch", FactValue::Bool(false)),
        ("phone_verified", FactValue::Bool(true)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Run one advisory session, writing the transcript to `out`.
///
/// Questions with an entry in `auto_answers` are answered from it; the rest
/// go to `source`. At most `max_questions` are asked.
pub fn run_session<W: Write>(
    advisor: &mut FraudAdvisor,
    transaction: &Facts,
    auto_answers: &HashMap<String, bool>,
    source: &mut dyn AnswerSource,
    max_questions: usize,
    out: &mut W,
) -> Result<SessionOutcome> {
    advisor.load_data(transaction);

    writeln!(out, "\n{}\nFRAUD DETECTION EXPERT SYSTEM\n{}\n", RULE, RULE)?;
    writeln!(out, "Transaction Data:")?;
    let sorted: BTreeMap<_, _> = transaction.iter().collect();
    for (key, value) in sorted {
        writeln!(out, "  {}: {}", key, value)?;
    }

    let mut questions_asked = 0;
    let decision = loop {
        if questions_asked >= max_questions {
            writeln!(out, "\n[Final] Analyzing...")?;
            advisor.forward_chain();
            break report_assessment(advisor, out)?;
        }

        writeln!(out, "\n[Step {}] Analyzing...", questions_asked + 1)?;
        advisor.forward_chain();
        let top = report_assessment(advisor, out)?;

        if !advisor.should_continue_asking() {
            break top;
        }

        let Some(question) = advisor.relevant_questions().into_iter().next() else {
            break top;
        };

        advisor.mark_asked(&question.fact);
        let prompt = advisor
            .prompt(&question.fact)
            .unwrap_or(question.fact.as_str())
            .to_string();
        writeln!(out, "\n[?] {}", prompt)?;
        writeln!(out, "    ({})", question.reason)?;

        let value = match auto_answers.get(&question.fact) {
            Some(&value) => {
                writeln!(out, "    Auto-answer: {}", if value { "yes" } else { "no" })?;
                value
            }
            None => {
                write!(out, "    Answer: ")?;
                out.flush()?;
                source.ask(&prompt)?
            }
        };
        info!("Answer {} = {}", question.fact, value);

        let mut answer = Facts::new();
        answer.insert(question.fact, FactValue::Bool(value));
        advisor.load_data(&answer);
        questions_asked += 1;
    };

    writeln!(
        out,
        "\n>>> FINAL: {} ({:.2})",
        decision.action.label(),
        decision.confidence
    )?;

    writeln!(out, "\n{}\nREASONING TRACE\n{}", RULE, RULE)?;
    for entry in advisor.trace() {
        writeln!(out, "  {}", entry)?;
    }
    writeln!(out)?;

    Ok(SessionOutcome {
        decision,
        questions_asked,
    })
}

/// Print risk, indicators and the top three recommendations; returns the top one
fn report_assessment<W: Write>(advisor: &FraudAdvisor, out: &mut W) -> Result<Recommendation> {
    writeln!(out, "\nRisk Level: {:.2}", advisor.risk_level())?;
    let active = advisor.active_risk_indicators();
    if active.is_empty() {
        writeln!(out, "Active Indicators: None")?;
    } else {
        writeln!(out, "Active Indicators: {}", active.join(", "))?;
    }

    let recs = advisor.recommendations();
    writeln!(out, "\nCurrent Assessment:")?;
    for rec in recs.iter().take(3) {
        writeln!(out, "  {}: {:.2}", rec.action.label(), rec.confidence)?;
    }

    recs.into_iter()
        .next()
        .context("advisor produced no recommendation")
}

/// Initialize logging on stderr, keeping stdout for the transcript
pub fn init_logging(verbosity: u8, json: bool) -> Result<()> {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
