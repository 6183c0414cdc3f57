//! End-to-end pipeline runs against scripted model and analyzer doubles.

use std::{cell::RefCell, collections::VecDeque, time::Duration};

use sigil::{
    Compiler,
    analyzer::{AnalyzerError, Issue, StaticAnalyzer},
    config::{AppConfig, Stage},
    model::{CodeModel, CompletionRequest, ModelError},
    prompt::PromptSet,
    result::PipelineResult,
};

const STAGES: [Stage; 4] = [
    Stage::Synthesis,
    Stage::Refinement,
    Stage::Review,
    Stage::Correction,
];

/// Model double that answers from a per-stage queue.
///
/// The stage of a request is recognised by its system prompt. When a queue
/// runs dry the stage falls back to a neutral answer: empty code for the
/// rewriting stages and an unsuccessful fix for correction.
struct ScriptedModel {
    prompts: PromptSet,
    replies: RefCell<Vec<(Stage, VecDeque<Result<String, ModelError>>)>>,
    calls: RefCell<Vec<(Stage, CompletionRequest)>>,
}

impl ScriptedModel {
    fn new(config: &AppConfig) -> Self {
        Self {
            prompts: PromptSet::for_language(config.language()).with_overrides(config.prompts()),
            replies: RefCell::new(STAGES.iter().map(|s| (*s, VecDeque::new())).collect()),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn reply(self, stage: Stage, reply: Result<&str, ModelError>) -> Self {
        for (s, queue) in self.replies.borrow_mut().iter_mut() {
            if *s == stage {
                queue.push_back(reply.clone().map(str::to_string));
            }
        }
        self
    }

    fn code(self, stage: Stage, code: &str, notes: &str) -> Self {
        let reply = generated(code, notes);
        self.reply(stage, Ok(&reply))
    }

    fn fix(self, fixed_code: &str, success: bool) -> Self {
        let reply = format!(
            r#"{{"fixed_code": {}, "success": {success}}}"#,
            json_string(fixed_code)
        );
        self.reply(Stage::Correction, Ok(&reply))
    }

    fn stage_of(&self, request: &CompletionRequest) -> Stage {
        let system = request.messages()[0].content();
        STAGES
            .into_iter()
            .find(|stage| self.prompts.get(*stage) == system)
            .expect("request carries a known system prompt")
    }

    fn calls_to(&self, stage: Stage) -> Vec<CompletionRequest> {
        self.calls
            .borrow()
            .iter()
            .filter(|(s, _)| *s == stage)
            .map(|(_, request)| request.clone())
            .collect()
    }
}

impl CodeModel for ScriptedModel {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        let stage = self.stage_of(request);
        self.calls.borrow_mut().push((stage, request.clone()));

        let mut replies = self.replies.borrow_mut();
        let queue = replies
            .iter_mut()
            .find(|(s, _)| *s == stage)
            .map(|(_, queue)| queue)
            .expect("every stage has a queue");

        queue.pop_front().unwrap_or_else(|| match stage {
            Stage::Correction => Ok(r#"{"fixed_code": "", "success": false}"#.to_string()),
            _ => Ok(generated("", "")),
        })
    }
}

/// Analyzer double that answers from a queue, repeating the last answer.
struct ScriptedAnalyzer {
    reports: RefCell<VecDeque<Vec<Issue>>>,
    seen: RefCell<Vec<String>>,
}

impl ScriptedAnalyzer {
    fn new(reports: &[&[&str]]) -> Self {
        Self {
            reports: RefCell::new(
                reports
                    .iter()
                    .map(|report| report.iter().map(|m| Issue::new(*m)).collect())
                    .collect(),
            ),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn clean() -> Self {
        Self::new(&[&[]])
    }

    fn runs(&self) -> usize {
        self.seen.borrow().len()
    }
}

impl StaticAnalyzer for ScriptedAnalyzer {
    fn analyze_source(&self, source: &str) -> Result<Vec<Issue>, AnalyzerError> {
        self.seen.borrow_mut().push(source.to_string());
        let mut reports = self.reports.borrow_mut();
        if reports.len() > 1 {
            Ok(reports.pop_front().unwrap())
        } else {
            Ok(reports.front().cloned().unwrap_or_default())
        }
    }
}

struct BrokenAnalyzer;

impl StaticAnalyzer for BrokenAnalyzer {
    fn analyze_source(&self, _source: &str) -> Result<Vec<Issue>, AnalyzerError> {
        Err(AnalyzerError::Timeout(Duration::from_secs(30)))
    }
}

fn json_string(text: &str) -> String {
    format!(
        "\"{}\"",
        text.replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    )
}

fn generated(code: &str, notes: &str) -> String {
    format!(
        r#"{{"code": {}, "raised_exception": false, "notes": {}}}"#,
        json_string(code),
        json_string(notes)
    )
}

fn compile(
    config: AppConfig,
    source: &str,
    model: &ScriptedModel,
    analyzer: &dyn StaticAnalyzer,
) -> PipelineResult {
    let compiler = Compiler::new(config);
    let parsed = compiler.parse(source);
    compiler.compile(parsed.document(), model, analyzer)
}

const ADD: &str = "def add(a, b):\n    return a + b";

#[test]
fn single_declaration_clean_run() {
    let config = AppConfig::default();
    let model = ScriptedModel::new(&config).code(Stage::Synthesis, ADD, "");
    let analyzer = ScriptedAnalyzer::clean();

    let result = compile(config, "!func name=add[adds two integers]", &model, &analyzer);

    let synthesis = model.calls_to(Stage::Synthesis);
    assert_eq!(synthesis.len(), 1);
    assert_eq!(synthesis[0].messages().len(), 2);
    assert_eq!(
        synthesis[0].messages()[1].content(),
        "!func name=add[adds two integers]"
    );

    assert_eq!(result.program(), ADD);
    assert!(result.unresolved_issues().is_empty());
    assert_eq!(result.candidates().len(), 1);
    assert!(model.calls_to(Stage::Correction).is_empty());
    assert_eq!(analyzer.runs(), 1);
}

#[test]
fn fix_then_clean_reanalysis() {
    let config = AppConfig::default();
    let fixed = format!("import math\n\n{ADD}");
    let model = ScriptedModel::new(&config)
        .code(Stage::Synthesis, ADD, "")
        .fix(&fixed, true);
    let analyzer = ScriptedAnalyzer::new(&[&["missing import"], &[]]);

    let result = compile(config, "!func name=add[adds two integers]", &model, &analyzer);

    assert_eq!(result.program(), fixed);
    assert!(result.unresolved_issues().is_empty());
    assert_eq!(model.calls_to(Stage::Correction).len(), 1);
    assert_eq!(analyzer.runs(), 2);
    assert_eq!(analyzer.seen.borrow()[1], fixed);
}

#[test]
fn exhausted_correction_returns_pre_loop_program() {
    let config = AppConfig::default();
    let model = ScriptedModel::new(&config)
        .code(Stage::Synthesis, ADD, "")
        .fix("def add(a, b): return a - b", false);
    let analyzer = ScriptedAnalyzer::new(&[&["syntax error"]]);

    let result = compile(config, "!func name=add[adds two integers]", &model, &analyzer);

    let corrections = model.calls_to(Stage::Correction);
    assert_eq!(corrections.len(), 4);
    assert!(
        corrections
            .iter()
            .all(|request| request.messages().last().unwrap().content()
                == format!("Errors:\n- syntax error\n\nCode:\n{ADD}"))
    );
    assert_eq!(result.program(), ADD);
    assert_eq!(result.unresolved_issues(), ["syntax error"]);
    // No re-analysis after exhaustion.
    assert_eq!(analyzer.runs(), 1);
}

#[test]
fn regression_after_fix_gets_one_more_loop() {
    let config = AppConfig::default().with_max_retries(1);
    let model = ScriptedModel::new(&config)
        .code(Stage::Synthesis, ADD, "")
        .fix("first fix", true)
        .fix("", false)
        .fix("", false);
    let analyzer = ScriptedAnalyzer::new(&[&["missing import"], &["undefined name"]]);

    let result = compile(config, "!func name=add[adds two integers]", &model, &analyzer);

    assert_eq!(result.program(), "first fix");
    assert_eq!(result.unresolved_issues(), ["undefined name"]);
    assert_eq!(model.calls_to(Stage::Correction).len(), 3);
    assert_eq!(analyzer.runs(), 2);
}

#[test]
fn notes_accumulate_in_declaration_order() {
    let config = AppConfig::default();
    let model = ScriptedModel::new(&config)
        .code(Stage::Synthesis, "def a(): pass", "first")
        .code(Stage::Synthesis, "def b(): pass", "  ")
        .code(Stage::Synthesis, "def c(): pass", "third");
    let analyzer = ScriptedAnalyzer::clean();

    let result = compile(
        config,
        "!func name=a[x]\n!func name=b[y]\n!func name=c[z]",
        &model,
        &analyzer,
    );

    assert_eq!(result.notes(), ["first", "third"]);
    assert_eq!(result.program(), "def a(): pass\n\ndef b(): pass\n\ndef c(): pass");

    let synthesis = model.calls_to(Stage::Synthesis);
    assert_eq!(synthesis[0].messages().len(), 2);
    assert_eq!(
        synthesis[1].messages()[1].content(),
        "These are notes the user left:\nfirst"
    );
    assert_eq!(
        synthesis[2].messages()[1].content(),
        "These are notes the user left:\nfirst"
    );

    let review = model.calls_to(Stage::Review);
    assert_eq!(
        review[0].messages()[1].content(),
        "These are notes the user left:\nfirst\nthird"
    );
}

#[test]
fn author_notes_reach_every_stage() {
    let config = AppConfig::default();
    let model = ScriptedModel::new(&config)
        .code(Stage::Synthesis, ADD, "")
        .fix("", false);
    let analyzer = ScriptedAnalyzer::new(&[&["syntax error"]]);

    compile(
        config.with_max_retries(0),
        "!notes[stdlib only]\n!func name=add[adds two integers]",
        &model,
        &analyzer,
    );

    let calls = model.calls.borrow();
    assert_eq!(calls.len(), 4);
    for (stage, request) in calls.iter() {
        assert_eq!(
            request.messages()[1].content(),
            "These are notes the user left:\nstdlib only",
            "{stage:?} call is missing the notes"
        );
    }
}

#[test]
fn refinement_replaces_and_empty_review_keeps() {
    let config = AppConfig::default();
    let model = ScriptedModel::new(&config)
        .code(Stage::Synthesis, ADD, "")
        .code(Stage::Refinement, "def add(a: int, b: int) -> int:\n    return a + b", "")
        .code(Stage::Review, "", "");
    let analyzer = ScriptedAnalyzer::clean();

    let result = compile(config, "!func name=add[adds two integers]", &model, &analyzer);

    assert_eq!(
        result.program(),
        "def add(a: int, b: int) -> int:\n    return a + b"
    );
    assert_eq!(
        model.calls_to(Stage::Review)[0].messages()[1].content(),
        "def add(a: int, b: int) -> int:\n    return a + b"
    );
}

#[test]
fn synthesis_timeout_becomes_sentinel_and_run_continues() {
    let config = AppConfig::default();
    let model = ScriptedModel::new(&config)
        .reply(Stage::Synthesis, Err(ModelError::Timeout(Duration::from_secs(30))))
        .code(Stage::Synthesis, "def sub(a, b):\n    return a - b", "");
    let analyzer = ScriptedAnalyzer::clean();

    let result = compile(
        config,
        "!func name=add[adds two integers]\n!func name=sub[subtracts]",
        &model,
        &analyzer,
    );

    assert_eq!(
        result.program(),
        "# Error: API request timed out for function signature: !func name=add[adds two integers]\n\n\
         def sub(a, b):\n    return a - b"
    );
    assert!(result.candidates()[0].raised_exception());
    assert!(!result.candidates()[1].raised_exception());
    assert_eq!(model.calls_to(Stage::Refinement).len(), 1);
}

#[test]
fn analyzer_failure_counts_as_clean() {
    let config = AppConfig::default();
    let model = ScriptedModel::new(&config).code(Stage::Synthesis, ADD, "");

    let result = compile(
        config,
        "!func name=add[adds two integers]",
        &model,
        &BrokenAnalyzer,
    );

    assert_eq!(result.program(), ADD);
    assert!(result.unresolved_issues().is_empty());
    assert!(model.calls_to(Stage::Correction).is_empty());
}

#[test]
fn stage_settings_reach_requests() {
    let config: AppConfig = toml::from_str(
        r#"
        [model]
        name = "base-model"
        timeout_secs = 12

        [stages.correction]
        model = "fixer-model"
        temperature = 0.1
        "#,
    )
    .unwrap();
    let model = ScriptedModel::new(&config)
        .code(Stage::Synthesis, ADD, "")
        .fix("fixed", true);
    let analyzer = ScriptedAnalyzer::new(&[&["bad"], &[]]);

    compile(config, "!func name=add[adds two integers]", &model, &analyzer);

    let synthesis = &model.calls_to(Stage::Synthesis)[0];
    assert_eq!(synthesis.model(), "base-model");
    assert_eq!(synthesis.temperature(), 0.8);
    assert_eq!(synthesis.timeout(), Duration::from_secs(12));

    let correction = &model.calls_to(Stage::Correction)[0];
    assert_eq!(correction.model(), "fixer-model");
    assert_eq!(correction.temperature(), 0.1);
    assert_eq!(correction.response_format().name(), "error_fix");
}
