//! BDD 스타일 스위트 실행
//!
//! 스위트마다 새 [`SuiteContext`]가 만들어지고, 스위트가 끝나면 버려집니다.
//! 한 스위트에서 등록한 훅은 다음 스위트로 넘어가지 않습니다.
//!
//! ```ignore
//! let suite = Suite::new("Update inventory")
//!     .located(file!())
//!     .before(|h| Box::pin(seed(h)));
//!
//! engine
//!     .describe(suite, |ctx| {
//!         Box::pin(async move {
//!             ctx.it("adds the action to the quantity", |h| Box::pin(check_quantity(h)))
//!                 .await?;
//!             Ok(())
//!         })
//!     })
//!     .await?;
//! ```
//!
//! # 실패 정책
//!
//! - 테스트 본문의 [`CheckError`]는 해당 테스트만 실패로 기록합니다.
//! - [`CheckError::Fatal`]은 [`RunAbort`]로 승격되어 실행 전체를 멈춥니다.
//! - 훅 실패는 스위트를 중단합니다. 남은 본문, 테스트, `after` 훅은 건너뜁니다.

use std::sync::Arc;
use std::time::Instant;

use colored::Colorize;
use stagehand_core::error::CheckError;
use stagehand_core::metrics as m;
use stagehand_core::types::{SuiteResult, TestResult};
use stagehand_fixtures::Backend;
use tracing::{debug, info, warn};

use crate::BoxFuture;
use crate::error::{RunAbort, SuiteAbort};
use crate::harness::Harness;

/// 훅 (before / after / before_each / after_each)
pub type Hook<B> =
    Box<dyn for<'a> Fn(&'a Harness<B>) -> BoxFuture<'a, Result<(), CheckError>> + Send + Sync>;

/// 스위트 선언
pub struct Suite<B: Backend> {
    name: String,
    location: String,
    before: Vec<Hook<B>>,
    after: Vec<Hook<B>>,
    before_each: Vec<Hook<B>>,
    after_each: Vec<Hook<B>>,
}

impl<B: Backend> Suite<B> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: String::new(),
            before: Vec::new(),
            after: Vec::new(),
            before_each: Vec::new(),
            after_each: Vec::new(),
        }
    }

    /// 정의 위치 (보통 `file!()`)
    pub fn located(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// 본문 전에 한 번 실행되는 훅
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a Harness<B>) -> BoxFuture<'a, Result<(), CheckError>>
            + Send
            + Sync
            + 'static,
    {
        self.before.push(Box::new(hook));
        self
    }

    /// 본문 후에 한 번 실행되는 훅
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a Harness<B>) -> BoxFuture<'a, Result<(), CheckError>>
            + Send
            + Sync
            + 'static,
    {
        self.after.push(Box::new(hook));
        self
    }

    /// 각 테스트 전에 실행되는 훅
    pub fn before_each<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a Harness<B>) -> BoxFuture<'a, Result<(), CheckError>>
            + Send
            + Sync
            + 'static,
    {
        self.before_each.push(Box::new(hook));
        self
    }

    /// 각 테스트 후에 실행되는 훅
    pub fn after_each<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a Harness<B>) -> BoxFuture<'a, Result<(), CheckError>>
            + Send
            + Sync
            + 'static,
    {
        self.after_each.push(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// 실행 중인 스위트 하나의 상태
///
/// 스위트 본문은 이 컨텍스트로 테스트를 실행하고 훅을 추가 등록합니다.
pub struct SuiteContext<B: Backend> {
    harness: Arc<Harness<B>>,
    after: Vec<Hook<B>>,
    before_each: Vec<Hook<B>>,
    after_each: Vec<Hook<B>>,
    results: Vec<TestResult>,
    console: bool,
}

impl<B: Backend> SuiteContext<B> {
    pub fn harness(&self) -> &Harness<B> {
        &self.harness
    }

    /// 지금까지 기록된 테스트 결과
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn after<F>(&mut self, hook: F)
    where
        F: for<'a> Fn(&'a Harness<B>) -> BoxFuture<'a, Result<(), CheckError>>
            + Send
            + Sync
            + 'static,
    {
        self.after.push(Box::new(hook));
    }

    pub fn before_each<F>(&mut self, hook: F)
    where
        F: for<'a> Fn(&'a Harness<B>) -> BoxFuture<'a, Result<(), CheckError>>
            + Send
            + Sync
            + 'static,
    {
        self.before_each.push(Box::new(hook));
    }

    pub fn after_each<F>(&mut self, hook: F)
    where
        F: for<'a> Fn(&'a Harness<B>) -> BoxFuture<'a, Result<(), CheckError>>
            + Send
            + Sync
            + 'static,
    {
        self.after_each.push(Box::new(hook));
    }

    /// 테스트 하나를 실행하고 결과를 기록합니다.
    ///
    /// `after_each` 훅은 본문 결과와 관계없이 실행됩니다.
    pub async fn it<F>(&mut self, name: &str, body: F) -> Result<(), SuiteAbort>
    where
        F: for<'a> FnOnce(&'a Harness<B>) -> BoxFuture<'a, Result<(), CheckError>>,
    {
        let harness = Arc::clone(&self.harness);
        let started = Instant::now();

        run_hooks("before_each", &self.before_each, &*harness).await?;
        let outcome = body(&*harness).await;
        let after_each = run_hooks("after_each", &self.after_each, &*harness).await;

        let failure = match outcome {
            Ok(()) => None,
            Err(CheckError::Fatal { location, reason }) => {
                return Err(RunAbort { location, reason }.into());
            }
            Err(err) => Some(err.to_string()),
        };

        let result = TestResult {
            name: name.to_owned(),
            elapsed_secs: started.elapsed().as_secs_f64(),
            failure,
        };
        self.record(result);
        after_each
    }

    fn record(&mut self, result: TestResult) {
        let label = if result.passed() { "passed" } else { "failed" };
        metrics::counter!(m::TESTS_TOTAL, m::LABEL_RESULT => label).increment(1);
        debug!(
            test = result.name.as_str(),
            result = label,
            elapsed_secs = result.elapsed_secs,
            "test finished"
        );

        if self.console {
            match &result.failure {
                None => println!(
                    "  {} {} ({:.3}s)",
                    "passed".green(),
                    result.name,
                    result.elapsed_secs
                ),
                Some(message) => {
                    println!(
                        "  {} {} ({:.3}s)",
                        "failed".red(),
                        result.name,
                        result.elapsed_secs
                    );
                    for line in message.lines() {
                        println!("      {}", line.red());
                    }
                }
            }
        }
        self.results.push(result);
    }
}

async fn run_hooks<B: Backend>(
    stage: &'static str,
    hooks: &[Hook<B>],
    harness: &Harness<B>,
) -> Result<(), SuiteAbort> {
    for hook in hooks {
        hook(harness)
            .await
            .map_err(|err| SuiteAbort::from_hook(stage, err))?;
    }
    Ok(())
}

/// 스위트 실행기
///
/// 스위트는 항상 하나씩 순서대로 실행됩니다.
pub struct Engine<B: Backend> {
    harness: Arc<Harness<B>>,
    console: bool,
}

impl<B: Backend> Engine<B> {
    pub fn new(harness: Arc<Harness<B>>) -> Self {
        Self {
            harness,
            console: false,
        }
    }

    /// 테스트마다 콘솔에 passed/failed 줄을 출력합니다.
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn harness(&self) -> &Harness<B> {
        &self.harness
    }

    /// 스위트를 실행하고 결과를 반환합니다.
    ///
    /// 훅 실패로 중단된 스위트도 `Ok`이며 `aborted`에 사유가 담깁니다.
    /// `Err`는 실행 전체를 멈춰야 하는 경우뿐입니다.
    pub async fn describe<F>(&self, suite: Suite<B>, body: F) -> Result<SuiteResult, RunAbort>
    where
        F: for<'a> FnOnce(&'a mut SuiteContext<B>) -> BoxFuture<'a, Result<(), SuiteAbort>>,
    {
        let Suite {
            name,
            location,
            before,
            after,
            before_each,
            after_each,
        } = suite;

        let started = Instant::now();
        info!(suite = name.as_str(), location = location.as_str(), "suite started");
        if self.console {
            println!("{}", name.bold());
        }

        let mut ctx = SuiteContext {
            harness: Arc::clone(&self.harness),
            after,
            before_each,
            after_each,
            results: Vec::new(),
            console: self.console,
        };

        let outcome = match run_hooks("before", &before, &self.harness).await {
            Ok(()) => body(&mut ctx).await,
            Err(abort) => Err(abort),
        };
        let outcome = match outcome {
            Ok(()) => run_hooks("after", &ctx.after, &self.harness).await,
            Err(abort) => Err(abort),
        };

        let aborted = match outcome {
            Ok(()) => None,
            Err(SuiteAbort::Fatal(abort)) => {
                warn!(suite = name.as_str(), error = %abort, "fatal error, stopping run");
                return Err(abort);
            }
            Err(abort) => {
                warn!(suite = name.as_str(), error = %abort, "suite aborted");
                if self.console {
                    println!("  {} {}", "aborted".red().bold(), abort);
                }
                Some(abort.to_string())
            }
        };

        // 컨텍스트와 함께 훅도 버려짐
        let SuiteContext { results, .. } = ctx;
        let elapsed = started.elapsed().as_secs_f64();
        metrics::histogram!(m::SUITE_DURATION_SECONDS).record(elapsed);

        let result = SuiteResult::finalize(name, location, elapsed, results, aborted);
        info!(
            suite = result.name.as_str(),
            passed = result.passed,
            failed = result.failed,
            elapsed_secs = result.elapsed_secs,
            "suite finished"
        );
        Ok(result)
    }
}
