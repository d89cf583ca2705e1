//! Scripted browsing sessions for the view-sync engine.
//!
//! A script is one command per line; blank lines and `#` comments are
//! skipped:
//!
//! ```text
//! toggle secondary      # flip a category
//! show primary          # set a category visible
//! hide primary          # set a category hidden
//! select kiyomizu       # select a point from the list
//! wait 0.5              # advance the clock (seconds)
//! settle                # renderer reports the last camera move finished
//! reset                 # "fit all"
//! list                  # dump the grouped list view
//! ```

use catalog::Category;
use scene::ViewSync;
use scene::renderer::{RecordingRenderer, RenderCommand};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Toggle(Category),
    Show(Category),
    Hide(Category),
    Select(String),
    Wait(f64),
    Settle,
    Reset,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "script line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ScriptError {}

pub fn parse_script(raw: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;
        let text = line.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        let err = |message: String| ScriptError {
            line: line_no,
            message,
        };

        let mut parts = text.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let arg = parts.next();
        if let Some(extra) = parts.next() {
            return Err(err(format!("unexpected argument: {extra}")));
        }

        let step = match (cmd, arg) {
            ("toggle", Some(c)) => Step::Toggle(parse_category(c).map_err(err)?),
            ("show", Some(c)) => Step::Show(parse_category(c).map_err(err)?),
            ("hide", Some(c)) => Step::Hide(parse_category(c).map_err(err)?),
            ("select", Some(id)) => Step::Select(id.to_string()),
            ("wait", Some(s)) => {
                let secs: f64 = s
                    .parse()
                    .map_err(|_| err(format!("invalid duration: {s}")))?;
                if !secs.is_finite() || secs < 0.0 {
                    return Err(err(format!("invalid duration: {s}")));
                }
                Step::Wait(secs)
            }
            ("settle", None) => Step::Settle,
            ("reset", None) => Step::Reset,
            ("list", None) => Step::List,
            (other, _) => return Err(err(format!("unknown or malformed command: {other}"))),
        };
        steps.push(step);
    }
    Ok(steps)
}

fn parse_category(raw: &str) -> Result<Category, String> {
    Category::ALL
        .into_iter()
        .find(|c| c.as_str() == raw)
        .ok_or_else(|| format!("unknown category: {raw} (expected primary or secondary)"))
}

#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub directions_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListGroup {
    pub area: String,
    pub count: usize,
    pub points: Vec<ListEntry>,
}

/// What one script step did, as printed by the `tour` binary.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub at: f64,
    pub step: String,
    pub commands: Vec<RenderCommand>,
    pub selection: String,
    pub visible: usize,
    pub empty: bool,
    /// Engine events recorded during the step, as `kind: message`.
    pub events: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<ListGroup>>,
}

/// Runs `steps` in order. Step-level failures (an unknown id) are reported
/// and the session continues.
pub fn run(engine: &mut ViewSync<RecordingRenderer>, steps: &[Step]) -> Vec<StepReport> {
    let mut reports = Vec::with_capacity(steps.len());
    for step in steps {
        let mut error = None;
        let mut list = None;
        match step {
            Step::Toggle(c) => {
                engine.toggle_category(*c);
            }
            Step::Show(c) => {
                engine.set_category_visible(*c, true);
            }
            Step::Hide(c) => {
                engine.set_category_visible(*c, false);
            }
            Step::Select(id) => {
                if let Err(e) = engine.select(id) {
                    error = Some(e.to_string());
                }
            }
            Step::Wait(secs) => engine.advance(*secs),
            Step::Settle => {
                let last = engine
                    .renderer()
                    .camera_commands()
                    .last()
                    .and_then(|c| match c {
                        RenderCommand::FlyTo { transition, .. }
                        | RenderCommand::FlyToBounds { transition, .. } => Some(*transition),
                        _ => None,
                    });
                if let Some(t) = last {
                    engine.transition_settled(t);
                }
            }
            Step::Reset => {
                engine.reset_view();
            }
            Step::List => list = Some(list_view(engine)),
        }

        reports.push(StepReport {
            at: engine.now().seconds(),
            step: describe(step),
            commands: engine.renderer_mut().drain(),
            selection: engine.selection().to_string(),
            visible: engine.visible().len(),
            empty: engine.is_empty_state(),
            events: engine
                .drain_events()
                .into_iter()
                .map(|ev| format!("{}: {}", ev.kind, ev.message))
                .collect(),
            error,
            list,
        });
    }
    reports
}

fn list_view(engine: &ViewSync<RecordingRenderer>) -> Vec<ListGroup> {
    engine
        .grouped()
        .into_iter()
        .map(|g| ListGroup {
            area: g.area.label().to_string(),
            count: g.count(),
            points: g
                .points
                .iter()
                .map(|p| ListEntry {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    category: p.category,
                    directions_url: p.directions_url(),
                })
                .collect(),
        })
        .collect()
}

fn describe(step: &Step) -> String {
    match step {
        Step::Toggle(c) => format!("toggle {}", c.as_str()),
        Step::Show(c) => format!("show {}", c.as_str()),
        Step::Hide(c) => format!("hide {}", c.as_str()),
        Step::Select(id) => format!("select {id}"),
        Step::Wait(s) => format!("wait {s}"),
        Step::Settle => "settle".to_string(),
        Step::Reset => "reset".to_string(),
        Step::List => "list".to_string(),
    }
}
