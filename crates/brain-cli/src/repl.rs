//! Interactive train and explore loops

use std::io::Write;

use anyhow::anyhow;
use brain_core::graph::{GraphService, IngestReport, Label, UpsertOutcome, format_edges};
use brain_core::train::{
    ASSERTION_FORMAT, Assertion, ConceptSource, IngestChoice, NODE_QUERY_FORMAT, NodeQuery,
    Trainer, is_exit, numbered_triples, parse_selection,
};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;

/// Line source for the loops; `None` means end of input
pub trait Prompt {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>>;
}

/// Terminal prompt with history
pub struct TerminalPrompt {
    editor: DefaultEditor,
}

impl TerminalPrompt {
    pub fn new() -> anyhow::Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| anyhow!("failed to init rustyline: {e}"))?;
        Ok(Self { editor })
    }
}

impl Prompt for TerminalPrompt {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        loop {
            // readline blocks; keep the runtime's other workers free
            let read = tokio::task::block_in_place(|| self.editor.readline(prompt));
            match read {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        self.editor
                            .add_history_entry(line.as_str())
                            .map_err(|e| anyhow!("failed to record history: {e}"))?;
                    }
                    return Ok(Some(line));
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(ReadlineError::Interrupted) => continue,
                Err(e) => return Err(anyhow!("readline error: {e}")),
            }
        }
    }
}

/// Canned input, one line per call
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    lines: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl ScriptedPrompt {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
impl Prompt for ScriptedPrompt {
    fn read_line(&mut self, _prompt: &str) -> anyhow::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

enum ReplControl {
    Continue,
    Exit,
}

pub fn describe_outcome(assertion: &Assertion, outcome: &UpsertOutcome) -> String {
    match outcome {
        UpsertOutcome::Created { confidence } => {
            format!("Created {} (confidence {:.3})", assertion, confidence)
        }
        UpsertOutcome::Strengthened {
            previous,
            confidence,
        } => format!(
            "Strengthened {} (confidence {:.3} -> {:.3})",
            assertion, previous, confidence
        ),
    }
}

/// `error: ...` plus a hint when one is known
fn write_error(out: &mut impl Write, e: &brain_core::Error) -> std::io::Result<()> {
    writeln!(out, "error: {}", e)?;
    if let Some(hint) = e.suggestion() {
        writeln!(out, "  try: {}", hint)?;
    } else if e.is_transient() {
        writeln!(out, "  (temporary failure, try again)")?;
    }
    Ok(())
}

pub fn describe_report(report: &IngestReport) -> String {
    format!(
        "Added {} new, strengthened {}, failed {}",
        report.created, report.strengthened, report.failed
    )
}

/// Assert → suggest → ingest until `exit` or end of input
pub async fn run_train<S, P>(
    trainer: &Trainer<S>,
    label: &Label,
    prompt: &mut P,
    out: &mut impl Write,
    quiet: bool,
) -> anyhow::Result<()>
where
    S: ConceptSource,
    P: Prompt,
{
    if !quiet {
        writeln!(out, "Enter relationships as: {}", ASSERTION_FORMAT)?;
        writeln!(out, "Type 'exit' to quit.")?;
    }

    loop {
        let Some(line) = prompt.read_line("assert> ")? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }

        let assertion = match Assertion::parse(line) {
            Ok(assertion) => assertion,
            Err(e) => {
                write_error(out, &e)?;
                continue;
            }
        };

        match trainer.assert(&assertion).await {
            Ok(outcome) => writeln!(out, "{}", describe_outcome(&assertion, &outcome))?,
            Err(e) => {
                write_error(out, &e)?;
                continue;
            }
        }

        let suggestions = trainer.suggest(&assertion.names()).await;
        for (name, error) in &suggestions.failures {
            writeln!(out, "ConceptNet lookup for '{}' failed: {}", name, error)?;
        }
        if suggestions.is_empty() {
            writeln!(out, "No ConceptNet suggestions.")?;
            continue;
        }

        writeln!(out, "{}", numbered_triples(&suggestions.triples))?;

        let choice = loop {
            let Some(answer) = prompt.read_line(&format!("{}\n> ", IngestChoice::PROMPT))? else {
                return Ok(());
            };
            match IngestChoice::parse(&answer) {
                Ok(choice) => break choice,
                Err(e) => writeln!(out, "{}", e)?,
            }
        };

        match choice {
            IngestChoice::All => {
                let report = trainer.ingest(&suggestions.triples, label).await;
                writeln!(out, "{}", describe_report(&report))?;
            }
            IngestChoice::Select => {
                let picked = loop {
                    let Some(answer) =
                        prompt.read_line("Numbers to add (e.g. 0 2 4-6): ")?
                    else {
                        return Ok(());
                    };
                    match parse_selection(&answer, suggestions.triples.len()) {
                        Ok(indices) => break suggestions.pick(&indices),
                        Err(e) => write_error(out, &e)?,
                    }
                };
                let report = trainer.ingest(&picked, label).await;
                writeln!(out, "{}", describe_report(&report))?;
            }
            IngestChoice::Manual => {
                if let ReplControl::Exit = run_manual(trainer, prompt, out).await? {
                    return Ok(());
                }
            }
            IngestChoice::Skip => {}
            IngestChoice::Exit => break,
        }
    }

    info!("Training session closed");
    Ok(())
}

/// Extra assertions until `exit`; `Exit` when input ran out
async fn run_manual<S, P>(
    trainer: &Trainer<S>,
    prompt: &mut P,
    out: &mut impl Write,
) -> anyhow::Result<ReplControl>
where
    S: ConceptSource,
    P: Prompt,
{
    writeln!(out, "Enter relationships as: {} ('exit' when done)", ASSERTION_FORMAT)?;

    loop {
        let Some(line) = prompt.read_line("manual> ")? else {
            return Ok(ReplControl::Exit);
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            return Ok(ReplControl::Continue);
        }

        match Assertion::parse(line) {
            Ok(assertion) => match trainer.assert(&assertion).await {
                Ok(outcome) => writeln!(out, "{}", describe_outcome(&assertion, &outcome))?,
                Err(e) => write_error(out, &e)?,
            },
            Err(e) => write_error(out, &e)?,
        }
    }
}

/// `<name> [type]` → every relationship of the node
pub async fn run_explore<P: Prompt>(
    graph: &GraphService,
    prompt: &mut P,
    out: &mut impl Write,
    quiet: bool,
) -> anyhow::Result<()> {
    if !quiet {
        writeln!(out, "Look up relationships as: {}", NODE_QUERY_FORMAT)?;
        writeln!(out, "Type 'exit' to quit.")?;
    }

    while let Some(line) = prompt.read_line("explore> ")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }

        let query = match NodeQuery::parse(line) {
            Ok(query) => query,
            Err(e) => {
                write_error(out, &e)?;
                continue;
            }
        };

        match graph.neighbourhood(&query.name, query.label.as_ref()).await {
            Ok(edges) => writeln!(out, "{}", format_edges(&edges))?,
            Err(e) => write_error(out, &e)?,
        }
    }

    Ok(())
}
