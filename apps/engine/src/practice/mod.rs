//! Practice session controller: one current problem, a timer, and dispatch
//! to the language's execution strategy.
//!
//! Submitted code is never judged against expected output; submission is an
//! honor-system timer stop. The timer is tick-driven: the embedder calls
//! [`PracticeSession::tick`] once per second of wall clock, which keeps the
//! controller free of ambient clocks and deterministic under test.

pub mod exec;
pub mod templates;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::compiler::RemoteCompiler;
use crate::gateway::problem::{Difficulty, GeneratedProblem, WorkedExample};
use crate::gateway::{AiGateway, GatewayError};
use exec::{ScriptHost, WasmInterpreter};
use templates::Language;

/// Reported instead of executing when the interpreter has not finished
/// bootstrapping.
pub const INTERPRETER_LOADING_MESSAGE: &str =
    "Python interpreter is loading... Please try again in a moment.";

const NO_OUTPUT_MESSAGE: &str = "Code executed successfully (no output)";

#[derive(Debug, Error)]
pub enum PracticeError {
    #[error("write some code before running")]
    EmptyBuffer,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Clipboard paste is rejected by policy to simulate handwriting conditions.
/// Not a security boundary; trivially bypassable and documented as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("paste is blocked, type your code manually to simulate real interview conditions")]
pub struct PasteBlocked;

/// Elapsed-time tracking. Starts on the first keystroke, stops on reset or
/// submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PracticeTimer {
    pub elapsed_seconds: u64,
    pub running: bool,
}

impl PracticeTimer {
    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn tick(&mut self) {
        if self.running {
            self.elapsed_seconds += 1;
        }
    }
}

/// Renders elapsed seconds as `m:ss`.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Drives one coding-practice session. Owns the current problem, the code
/// buffer, the output panel contents, and the timer.
pub struct PracticeSession {
    gateway: Arc<dyn AiGateway>,
    script_host: Arc<dyn ScriptHost>,
    interpreter: Arc<Mutex<Box<dyn WasmInterpreter>>>,
    compiler: Arc<dyn RemoteCompiler>,
    language: Language,
    difficulty: Difficulty,
    problem: GeneratedProblem,
    code: String,
    output: String,
    timer: PracticeTimer,
}

impl PracticeSession {
    pub fn new(
        gateway: Arc<dyn AiGateway>,
        script_host: Arc<dyn ScriptHost>,
        interpreter: Arc<Mutex<Box<dyn WasmInterpreter>>>,
        compiler: Arc<dyn RemoteCompiler>,
    ) -> Self {
        let language = Language::JavaScript;
        Self {
            gateway,
            script_host,
            interpreter,
            compiler,
            language,
            difficulty: Difficulty::Beginner,
            problem: starter_problem(),
            code: language.starter_template().to_string(),
            output: String::new(),
            timer: PracticeTimer::default(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn problem(&self) -> &GeneratedProblem {
        &self.problem
    }

    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    pub fn output(&self) -> &str {
        self.output.as_str()
    }

    pub fn timer(&self) -> PracticeTimer {
        self.timer
    }

    /// Switches the editor language: the buffer is replaced with that
    /// language's starter template and the output panel is cleared.
    pub fn select_language(&mut self, language: Language) {
        self.language = language;
        self.code = language.starter_template().to_string();
        self.output.clear();
        info!(language = language.name(), "language selected");
    }

    /// Pure selection state; takes effect on the next problem generation.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Replaces the buffer contents. The first non-whitespace edit starts
    /// the timer.
    pub fn edit(&mut self, code: String) {
        self.code = code;
        if !self.code.trim().is_empty() && !self.timer.running {
            self.timer.start();
        }
    }

    /// Rejects clipboard input into the editor. Policy, not security.
    pub fn paste(&self, _clipboard: &str) -> Result<(), PasteBlocked> {
        Err(PasteBlocked)
    }

    /// Advances the timer by one second of wall clock.
    pub fn tick(&mut self) {
        self.timer.tick();
    }

    pub fn reset_timer(&mut self) {
        self.timer = PracticeTimer::default();
    }

    /// Restores the starter template and clears the output panel.
    pub fn reset_code(&mut self) {
        self.code = self.language.starter_template().to_string();
        self.output.clear();
    }

    /// Honor-system submission: stops the timer and reports the time taken.
    pub fn submit_solution(&mut self) -> u64 {
        self.timer.stop();
        info!(
            elapsed = %format_elapsed(self.timer.elapsed_seconds),
            "solution submitted"
        );
        self.timer.elapsed_seconds
    }

    /// Asks the gateway for a fresh problem at the selected difficulty.
    ///
    /// Success replaces the current problem and resets buffer, output, and
    /// timer. Failure leaves the existing problem in place; credential and
    /// quota failures carry remediation text in their message.
    pub async fn generate_new_problem(&mut self) -> Result<(), PracticeError> {
        info!(difficulty = %self.difficulty, "requesting a new problem");
        match self.gateway.generate_problem(self.difficulty).await {
            Ok(problem) => {
                info!(title = %problem.title, "problem replaced");
                self.problem = problem;
                self.code = self.language.starter_template().to_string();
                self.output.clear();
                self.timer = PracticeTimer::default();
                Ok(())
            }
            Err(error) => {
                warn!(%error, "problem generation failed, keeping the current problem");
                Err(error.into())
            }
        }
    }

    /// Runs the buffer with the selected language's execution strategy and
    /// stores the result in the output panel. Execution faults become
    /// output text; only an empty buffer is an error.
    pub async fn run(&mut self) -> Result<&str, PracticeError> {
        if self.code.trim().is_empty() {
            return Err(PracticeError::EmptyBuffer);
        }

        self.output = match self.language {
            Language::JavaScript => self.run_in_process().await,
            Language::Python => self.run_interpreted().await,
            Language::Java | Language::Cpp => self.run_remote().await,
        };
        Ok(self.output.as_str())
    }

    async fn run_in_process(&self) -> String {
        match self.script_host.eval(&self.code).await {
            Ok(output) if output.is_empty() => NO_OUTPUT_MESSAGE.to_string(),
            Ok(output) => output,
            Err(fault) => format!("Error: {fault}"),
        }
    }

    async fn run_interpreted(&self) -> String {
        // The interpreter is a process-wide singleton; concurrent use is not
        // guaranteed safe, so runs are serialized behind this lock.
        let interpreter = self.interpreter.lock().await;
        if !interpreter.is_ready() {
            return INTERPRETER_LOADING_MESSAGE.to_string();
        }
        match interpreter.eval_captured(&self.code).await {
            Ok(output) if output.is_empty() => NO_OUTPUT_MESSAGE.to_string(),
            Ok(output) => output,
            Err(fault) => format!("Python Error: {fault}"),
        }
    }

    async fn run_remote(&self) -> String {
        let Some(language_id) = self.language.remote_language_id() else {
            return self.static_run_summary();
        };
        match self.compiler.execute(language_id, &self.code).await {
            Ok(report) => {
                if let Some(stdout) = report.stdout {
                    stdout
                } else if let Some(stderr) = report.stderr {
                    format!("Compilation Error:\n{stderr}")
                } else if let Some(diagnostics) = report.compile_output {
                    format!("Compilation Error:\n{diagnostics}")
                } else {
                    NO_OUTPUT_MESSAGE.to_string()
                }
            }
            Err(error) => {
                warn!(%error, "remote compiler unavailable, degrading to static summary");
                self.static_run_summary()
            }
        }
    }

    /// Degraded output when remote execution is unreachable: a static
    /// description of the code instead of a hard failure.
    fn static_run_summary(&self) -> String {
        format!(
            "{} execution is unavailable right now. Static summary of your code:\n\nLines: {}\nCharacters: {}",
            self.language.name(),
            self.code.lines().count(),
            self.code.len()
        )
    }
}

/// The canonical seed problem shown before the first generation.
fn starter_problem() -> GeneratedProblem {
    GeneratedProblem {
        title: "Two Sum".to_string(),
        description: "Given an array of integers nums and an integer target, return indices \
            of the two numbers such that they add up to target."
            .to_string(),
        difficulty: Difficulty::Beginner,
        examples: vec![WorkedExample {
            input: "nums = [2,7,11,15], target = 9".to_string(),
            output: "[0,1]".to_string(),
            explanation: "Because nums[0] + nums[1] == 9, we return [0, 1].".to_string(),
        }],
        constraints: Vec::new(),
        hints: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompilerError, ExecutionReport};
    use crate::gateway::problem::fallback_problem;
    use async_trait::async_trait;
    use exec::ScriptFault;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeGateway {
        problem: Result<GeneratedProblem, fn() -> GatewayError>,
    }

    #[async_trait]
    impl AiGateway for FakeGateway {
        async fn transcribe(&self, _audio: &[u8], _mime: &str) -> Result<String, GatewayError> {
            unimplemented!("not used by practice tests")
        }

        async fn generate_feedback(
            &self,
            _question: &str,
            _answer: &str,
        ) -> Result<String, GatewayError> {
            unimplemented!("not used by practice tests")
        }

        async fn generate_problem(
            &self,
            _difficulty: Difficulty,
        ) -> Result<GeneratedProblem, GatewayError> {
            match &self.problem {
                Ok(problem) => Ok(problem.clone()),
                Err(make_error) => Err(make_error()),
            }
        }
    }

    struct FakeScriptHost {
        result: Result<String, ScriptFault>,
    }

    #[async_trait]
    impl ScriptHost for FakeScriptHost {
        async fn eval(&self, _source: &str) -> Result<String, ScriptFault> {
            self.result.clone()
        }
    }

    struct FakeInterpreter {
        ready: bool,
        evaluated: Arc<AtomicBool>,
    }

    #[async_trait]
    impl WasmInterpreter for FakeInterpreter {
        fn is_ready(&self) -> bool {
            self.ready
        }

        async fn eval_captured(&self, _source: &str) -> Result<String, ScriptFault> {
            self.evaluated.store(true, Ordering::SeqCst);
            Ok("Result: None\n".to_string())
        }
    }

    struct FakeCompiler {
        report: Option<ExecutionReport>,
    }

    #[async_trait]
    impl RemoteCompiler for FakeCompiler {
        async fn execute(
            &self,
            _language_id: u32,
            _source: &str,
        ) -> Result<ExecutionReport, CompilerError> {
            match &self.report {
                Some(report) => Ok(report.clone()),
                None => Err(CompilerError::Api {
                    status: 503,
                    message: "service unavailable".to_string(),
                }),
            }
        }
    }

    struct SessionBuilder {
        problem: Result<GeneratedProblem, fn() -> GatewayError>,
        script_result: Result<String, ScriptFault>,
        interpreter_ready: bool,
        compiler_report: Option<ExecutionReport>,
    }

    impl SessionBuilder {
        fn new() -> Self {
            Self {
                problem: Ok(fallback_problem(Difficulty::Beginner)),
                script_result: Ok("Result: [0, 1]\n".to_string()),
                interpreter_ready: true,
                compiler_report: Some(ExecutionReport {
                    stdout: Some("Result: 0 1\n".to_string()),
                    ..ExecutionReport::default()
                }),
            }
        }

        fn build(self) -> (PracticeSession, Arc<AtomicBool>) {
            let evaluated = Arc::new(AtomicBool::new(false));
            let interpreter: Arc<Mutex<Box<dyn WasmInterpreter>>> =
                Arc::new(Mutex::new(Box::new(FakeInterpreter {
                    ready: self.interpreter_ready,
                    evaluated: evaluated.clone(),
                })));
            let session = PracticeSession::new(
                Arc::new(FakeGateway {
                    problem: self.problem,
                }),
                Arc::new(FakeScriptHost {
                    result: self.script_result,
                }),
                interpreter,
                Arc::new(FakeCompiler {
                    report: self.compiler_report,
                }),
            );
            (session, evaluated)
        }
    }

    #[test]
    fn session_starts_with_the_seed_problem_and_template() {
        let (session, _) = SessionBuilder::new().build();
        assert_eq!(session.problem().title, "Two Sum");
        assert_eq!(session.language(), Language::JavaScript);
        assert_eq!(session.code(), Language::JavaScript.starter_template());
        assert_eq!(session.timer(), PracticeTimer::default());
    }

    #[test]
    fn language_switch_replaces_buffer_and_clears_output() {
        let (mut session, _) = SessionBuilder::new().build();
        session.edit("console.log('x')".to_string());
        session.select_language(Language::Python);

        assert_eq!(session.code(), Language::Python.starter_template());
        assert_eq!(session.output(), "");
    }

    #[test]
    fn timer_starts_on_first_real_edit_and_stops_on_submit() {
        let (mut session, _) = SessionBuilder::new().build();
        session.edit("   ".to_string());
        assert!(!session.timer().running);

        session.edit("print(1)".to_string());
        assert!(session.timer().running);

        session.tick();
        session.tick();
        session.tick();
        let elapsed = session.submit_solution();

        assert_eq!(elapsed, 3);
        assert!(!session.timer().running);
        // Stopped timer no longer accumulates.
        session.tick();
        assert_eq!(session.timer().elapsed_seconds, 3);
    }

    #[test]
    fn paste_is_always_rejected() {
        let (session, _) = SessionBuilder::new().build();
        assert_eq!(session.paste("stolen solution"), Err(PasteBlocked));
    }

    #[tokio::test]
    async fn generating_a_problem_resets_the_working_state() {
        let mut builder = SessionBuilder::new();
        builder.problem = Ok(fallback_problem(Difficulty::Advanced));
        let (mut session, _) = builder.build();

        session.select_difficulty(Difficulty::Advanced);
        session.edit("function solve() {}".to_string());
        session.tick();

        session.generate_new_problem().await.unwrap();

        assert_eq!(session.problem().title, "Advanced Coding Challenge");
        assert_eq!(session.code(), Language::JavaScript.starter_template());
        assert_eq!(session.output(), "");
        assert_eq!(session.timer(), PracticeTimer::default());
    }

    #[tokio::test]
    async fn failed_generation_keeps_the_existing_problem() {
        let mut builder = SessionBuilder::new();
        builder.problem = Err(|| GatewayError::CredentialOrQuota {
            status: 429,
            remediation: "Rate limit exceeded.".to_string(),
        });
        let (mut session, _) = builder.build();

        let result = session.generate_new_problem().await;

        let error = result.unwrap_err();
        assert!(error.to_string().contains("Rate limit exceeded"));
        assert_eq!(session.problem().title, "Two Sum");
    }

    #[tokio::test]
    async fn run_rejects_an_empty_buffer() {
        let (mut session, _) = SessionBuilder::new().build();
        session.edit("  \n ".to_string());
        assert!(matches!(session.run().await, Err(PracticeError::EmptyBuffer)));
    }

    #[tokio::test]
    async fn in_process_run_surfaces_captured_output() {
        let (mut session, _) = SessionBuilder::new().build();
        session.edit("console.log('Result:', [0, 1])".to_string());
        let output = session.run().await.unwrap();
        assert_eq!(output, "Result: [0, 1]\n");
    }

    #[tokio::test]
    async fn in_process_fault_is_rendered_not_propagated() {
        let mut builder = SessionBuilder::new();
        builder.script_result = Err(ScriptFault("solve is not defined".to_string()));
        let (mut session, _) = builder.build();
        session.edit("solve()".to_string());

        let output = session.run().await.unwrap();

        assert_eq!(output, "Error: solve is not defined");
    }

    #[tokio::test]
    async fn loading_interpreter_reports_without_executing() {
        let mut builder = SessionBuilder::new();
        builder.interpreter_ready = false;
        let (mut session, evaluated) = builder.build();
        session.select_language(Language::Python);
        session.edit("print('hi')".to_string());

        let output = session.run().await.unwrap();

        assert_eq!(output, INTERPRETER_LOADING_MESSAGE);
        assert!(!evaluated.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn ready_interpreter_returns_sink_contents() {
        let (mut session, evaluated) = SessionBuilder::new().build();
        session.select_language(Language::Python);
        session.edit("print('Result: None')".to_string());

        let output = session.run().await.unwrap();

        assert_eq!(output, "Result: None\n");
        assert!(evaluated.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn remote_run_prefers_stdout_then_diagnostics() {
        let (mut session, _) = SessionBuilder::new().build();
        session.select_language(Language::Cpp);
        session.edit("int main() { return 0; }".to_string());
        assert_eq!(session.run().await.unwrap(), "Result: 0 1\n");

        let mut builder = SessionBuilder::new();
        builder.compiler_report = Some(ExecutionReport {
            stderr: Some("undefined reference to main".to_string()),
            ..ExecutionReport::default()
        });
        let (mut session, _) = builder.build();
        session.select_language(Language::Java);
        session.edit("class X {}".to_string());
        let output = session.run().await.unwrap();
        assert!(output.starts_with("Compilation Error:\n"));
        assert!(output.contains("undefined reference"));
    }

    #[tokio::test]
    async fn remote_transport_failure_degrades_to_static_summary() {
        let mut builder = SessionBuilder::new();
        builder.compiler_report = None;
        let (mut session, _) = builder.build();
        session.select_language(Language::Cpp);
        session.edit("int main() {\nreturn 0;\n}".to_string());

        let output = session.run().await.unwrap();

        assert!(output.contains("Lines: 3"));
        assert!(output.contains("Characters: 24"));
        assert!(output.starts_with("C++ execution is unavailable"));
    }

    #[test]
    fn elapsed_time_formats_as_minutes_and_seconds() {
        assert_eq!(format_elapsed(0), "0:00");
        assert_eq!(format_elapsed(59), "0:59");
        assert_eq!(format_elapsed(61), "1:01");
        assert_eq!(format_elapsed(600), "10:00");
    }
}
