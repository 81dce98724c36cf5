//! The turn-by-turn drill loop.
//!
//! Each turn asks one working-set question until it is answered correctly,
//! feeds the result to the rotation engine and saves the full state. The
//! first turn of every run is a warm-up and is not recorded.

use anyhow::{Context, Result};
use rand::Rng;

use crate::bank::{default_bank, load_bank, validate_bank};
use crate::config::DrillConfig;
use crate::engine::{self, TurnOutcome};
use crate::error::DrillError;
use crate::model::{Question, SessionState};
use crate::picker::next_question;
use crate::store::SessionStore;
use crate::traits::Console;

/// Load the stored session, or create a new one from the configured bank.
pub fn open_state<R: Rng + ?Sized>(
    config: &DrillConfig,
    store: &SessionStore,
    rng: &mut R,
) -> Result<SessionState> {
    if let Some(state) = store.load()? {
        tracing::info!(
            "resuming session from {} ({} answers recorded)",
            store.path().display(),
            state.history.len()
        );
        return Ok(state);
    }

    let questions = match &config.bank_file {
        Some(path) => load_bank(path)?,
        None => default_bank(),
    };
    new_state(questions, config, rng)
}

/// A fresh session with a randomly sampled working set.
pub fn new_state<R: Rng + ?Sized>(
    questions: Vec<Question>,
    config: &DrillConfig,
    rng: &mut R,
) -> Result<SessionState> {
    let warnings = validate_bank(&questions, config.working_set_size)?;
    for w in &warnings {
        tracing::warn!("question {}: {}", w.question, w.message);
    }

    let working_set = rand::seq::index::sample(rng, questions.len(), config.working_set_size)
        .into_iter()
        .collect();
    let mut state = SessionState::new(questions, working_set);
    state.target_time = config.initial_target_time;

    let prompts = state
        .working_set
        .iter()
        .map(|&q| state.prompt(q))
        .collect::<Vec<_>>()
        .join(", ");
    state.log(format!("Initialized with working set: {prompts}"));
    Ok(state)
}

/// Result of one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnResult {
    /// The run's first answer; nothing was recorded.
    WarmUp { question: usize },
    /// The answer was recorded and the state saved.
    Recorded(TurnOutcome),
    /// The target time changed; the session is over.
    Finished(TurnOutcome),
}

/// An interactive drill session.
pub struct DrillSession<C, R> {
    state: SessionState,
    store: SessionStore,
    console: C,
    rng: R,
    echo_log: bool,
    echoed: usize,
    warmed_up: bool,
    last_asked: Option<usize>,
}

impl<C: Console, R: Rng> DrillSession<C, R> {
    pub fn new(state: SessionState, store: SessionStore, console: C, rng: R) -> Self {
        let echoed = state.log.len();
        let last_asked = state.last_asked();
        Self {
            state,
            store,
            console,
            rng,
            echo_log: false,
            echoed,
            warmed_up: false,
            last_asked,
        }
    }

    /// Echo diagnostic lines to the console as `// <line>`.
    pub fn with_echo_log(mut self, echo_log: bool) -> Self {
        self.echo_log = echo_log;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Drill until the target time changes.
    pub fn run(&mut self) -> Result<TurnOutcome> {
        loop {
            if let TurnResult::Finished(outcome) = self.play_turn()? {
                return Ok(outcome);
            }
        }
    }

    /// Ask one question until it is answered correctly and process the result.
    pub fn play_turn(&mut self) -> Result<TurnResult> {
        let index = next_question(&self.state.working_set, self.last_asked, &mut self.rng)
            .ok_or_else(|| DrillError::InvalidRecord("working set is empty".into()))?;
        self.last_asked = Some(index);
        let question = self.state.questions[index].clone();

        let duration = self.ask_until_correct(&question)?;

        if !self.warmed_up {
            self.warmed_up = true;
            self.state.log("Skipping first answer");
            self.echo_new_lines()?;
            return Ok(TurnResult::WarmUp { question: index });
        }

        match duration {
            Some(t) => self.state.log(format!("Got answer with time {t} sec")),
            None => self.state.log("Got failed answer"),
        }
        let outcome = engine::on_answer(&mut self.state, index, duration, &mut self.rng);
        self.echo_new_lines()?;

        if let Some(mastered) = outcome.mastered {
            let q = &self.state.questions[mastered];
            let message = format!(
                "CONGRATULATIONS! You seem to know that {} = {} very well!",
                q.prompt, q.answer
            );
            self.console.say(&message)?;
        }

        self.store
            .save(&self.state)
            .context("failed to persist session state")?;

        if outcome.target_changed() {
            tracing::info!(
                "target time changed {:?} -> {:?}, ending session",
                outcome.target_before,
                outcome.target_after
            );
            self.console
                .say("CONGRATULATIONS, you know all the numbers! Bye!")?;
            return Ok(TurnResult::Finished(outcome));
        }
        Ok(TurnResult::Recorded(outcome))
    }

    /// Seconds to the first correct answer, or `None` if a retry was needed.
    fn ask_until_correct(&mut self, question: &Question) -> Result<Option<f64>> {
        let mut failed = false;
        loop {
            let prompt = if failed {
                format!("Think again, {} = ", question.prompt)
            } else {
                format!("{} = ", question.prompt)
            };
            let answer = self.console.ask(&prompt)?;
            if question.accepts(&answer.text) {
                return Ok((!failed).then(|| answer.elapsed.as_secs_f64()));
            }
            failed = true;
        }
    }

    fn echo_new_lines(&mut self) -> Result<()> {
        if self.echo_log {
            for line in &self.state.log[self.echoed..] {
                self.console.say(&format!("// {line}"))?;
            }
        }
        self.echoed = self.state.log.len();
        Ok(())
    }
}
