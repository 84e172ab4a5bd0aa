//! Orchestrator - drives an accepted proposal to a terminal stage
//!
//! Each proposal runs in its own task. The task waits for the deadline,
//! submits a data request, waits for the tally, reports it to the DAO's
//! queue, waits out the DAO's grace period and executes the result. Every
//! settled step is fed to the state machine before the next one starts.

use crate::chain::{OutcomeExecutor, OutcomeReporter};
use crate::clock::Clock;
use crate::config::{EthNetwork, Settings};
use crate::dao::DaoBinding;
use crate::error::AppError;
use crate::oracle::{OracleClient, OracleRequestBuilder, RequestId};
use crate::pipeline::notify::{messages, Notifier};
use crate::pipeline::proposal::{MessageRef, Proposal};
use crate::pipeline::schedule;
use crate::pipeline::state::{LifecycleEvent, Stage};
use crate::pipeline::store::ProposalStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// External services a proposal passes through
pub struct Collaborators {
    pub oracle: Arc<dyn OracleClient>,
    pub reporter: Arc<dyn OutcomeReporter>,
    pub executor: Arc<dyn OutcomeExecutor>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}

pub struct ProposalOrchestrator {
    oracle: Arc<dyn OracleClient>,
    reporter: Arc<dyn OutcomeReporter>,
    executor: Arc<dyn OutcomeExecutor>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    store: Arc<ProposalStore>,
    builder: OracleRequestBuilder,
    tally_timeout: Duration,
    max_timer_arm: Duration,
    notify_on_tally_failure: bool,
    network: EthNetwork,
}

impl ProposalOrchestrator {
    pub fn new(
        collaborators: Collaborators,
        store: Arc<ProposalStore>,
        settings: &Settings,
    ) -> Self {
        Self {
            oracle: collaborators.oracle,
            reporter: collaborators.reporter,
            executor: collaborators.executor,
            notifier: collaborators.notifier,
            clock: collaborators.clock,
            store,
            builder: OracleRequestBuilder::new(&settings.oracle),
            tally_timeout: settings.oracle.tally_timeout,
            max_timer_arm: settings.pipeline.max_timer_arm,
            notify_on_tally_failure: settings.pipeline.notify_on_tally_failure,
            network: settings.network,
        }
    }

    /// Accept a validated proposal: record it, acknowledge it at its origin
    /// and start its lifecycle. The returned handle resolves to the terminal stage.
    pub async fn accept(
        self: &Arc<Self>,
        proposal: Proposal,
        dao: Arc<DaoBinding>,
    ) -> Result<JoinHandle<Stage>, AppError> {
        self.store.register(proposal.clone(), self.clock.now()).await?;
        info!(
            message_id = %proposal.message_id(),
            dao = %dao.dao.name,
            deadline = %proposal.deadline,
            "Proposal scheduled"
        );
        self.notify(&proposal.origin, messages::accepted(&proposal)).await;

        let orchestrator = Arc::clone(self);
        Ok(tokio::spawn(async move { orchestrator.run(proposal, dao).await }))
    }

    async fn run(&self, proposal: Proposal, dao: Arc<DaoBinding>) -> Stage {
        let message_id = proposal.message_id().to_string();
        match self.drive(&proposal, &dao).await {
            Ok(stage) if stage.is_failure() => {
                warn!(
                    message_id = %message_id,
                    stage = ?stage,
                    "Proposal orchestration ended without execution"
                );
                stage
            }
            Ok(stage) => {
                info!(message_id = %message_id, stage = ?stage, "Proposal orchestration finished");
                stage
            }
            Err(e) => {
                error!(message_id = %message_id, error = %e, "Proposal orchestration aborted");
                self.store
                    .get(&message_id)
                    .await
                    .map(|record| record.stage)
                    .unwrap_or_default()
            }
        }
    }

    async fn drive(&self, proposal: &Proposal, dao: &DaoBinding) -> Result<Stage, AppError> {
        let message_id = proposal.message_id();
        let origin = &proposal.origin;

        // Scheduled -> RequestBuilt
        let arms =
            schedule::wait_until(self.clock.as_ref(), proposal.deadline, self.max_timer_arm).await;
        self.transition(message_id, LifecycleEvent::DeadlineReached).await?;
        info!(
            message_id = %message_id,
            arms,
            "Creating data request for channelId {} and messageId {}",
            origin.channel_id,
            origin.message_id
        );
        let request = self.builder.build(&origin.channel_id, &origin.message_id);

        // RequestBuilt -> RequestSubmitted -> TallyPending
        let request_id = match self.oracle.submit(&request).await {
            Ok(request_id) => request_id,
            Err(e) => {
                warn!(
                    message_id = %message_id,
                    error = %e,
                    "Data request was not accepted, dropping proposal"
                );
                let event = LifecycleEvent::SubmissionRejected {
                    reason: e.to_string(),
                };
                return self.transition(message_id, event).await;
            }
        };
        info!(
            message_id = %message_id,
            request_id = %request_id,
            "Data request sent to oracle network"
        );
        self.transition(
            message_id,
            LifecycleEvent::RequestAccepted {
                request_id: request_id.0.clone(),
            },
        )
        .await?;
        self.transition(message_id, LifecycleEvent::AwaitingTally).await?;

        let tally_wait = self.oracle.await_result(&request_id);
        let tally = match tokio::time::timeout(self.tally_timeout, tally_wait).await {
            Ok(Ok(tally)) => tally,
            Ok(Err(e)) => return self.tally_failed(proposal, &request_id, e.to_string()).await,
            Err(_) => {
                let reason = format!("no tally within {}s", self.tally_timeout.as_secs());
                return self.tally_failed(proposal, &request_id, reason).await;
            }
        };
        info!(
            message_id = %message_id,
            request_id = %request_id,
            payload_len = tally.payload.len(),
            resolved_at = %tally.resolved_at,
            "Tallied proposal result"
        );

        // TallyPending -> Reported | ReportFailed
        let report = match self.reporter.report(&dao.dao, &request_id, dao.grace_period).await {
            Ok(report) if !report.transaction_hash.0.is_empty() => report,
            Ok(_) => {
                return self
                    .report_failed(origin, "reporter returned no transaction hash".to_string())
                    .await
            }
            Err(e) => return self.report_failed(origin, e.to_string()).await,
        };
        self.transition(
            message_id,
            LifecycleEvent::ReportSettled {
                transaction_hash: report.transaction_hash.0.clone(),
            },
        )
        .await?;
        self.notify(origin, messages::reported(&request_id.0, &report.transaction_hash.0))
            .await;

        // Reported -> ExecutionPending
        tokio::time::sleep(dao.grace_period).await;
        self.transition(message_id, LifecycleEvent::GraceElapsed).await?;

        // ExecutionPending -> Executed | ExecutionFailed
        match self.executor.execute(&dao.dao, &report.payload).await {
            Ok(tx) if !tx.0.is_empty() => {
                let stage = self
                    .transition(
                        message_id,
                        LifecycleEvent::ExecutionSettled {
                            transaction_hash: tx.0.clone(),
                        },
                    )
                    .await?;
                self.notify(origin, messages::executed(&self.network.tx_url(&tx.0)))
                    .await;
                Ok(stage)
            }
            settled => {
                let reason = match settled {
                    Err(e) => e.to_string(),
                    Ok(_) => "executor returned no transaction hash".to_string(),
                };
                warn!(message_id = %message_id, reason = %reason, "Execution failed");
                let stage = self
                    .transition(message_id, LifecycleEvent::ExecutionRejected { reason })
                    .await?;
                self.notify(origin, messages::execution_failed()).await;
                Ok(stage)
            }
        }
    }

    async fn tally_failed(
        &self,
        proposal: &Proposal,
        request_id: &RequestId,
        reason: String,
    ) -> Result<Stage, AppError> {
        warn!(
            message_id = %proposal.message_id(),
            request_id = %request_id,
            reason = %reason,
            "Oracle network did not resolve the data request, dropping proposal"
        );
        let stage = self
            .transition(proposal.message_id(), LifecycleEvent::TallyFailed { reason })
            .await?;
        if self.notify_on_tally_failure {
            self.notify(&proposal.origin, messages::tally_failed(&request_id.0))
                .await;
        }
        Ok(stage)
    }

    async fn report_failed(&self, origin: &MessageRef, reason: String) -> Result<Stage, AppError> {
        warn!(message_id = %origin.message_id, reason = %reason, "Reporting failed");
        let stage = self
            .transition(&origin.message_id, LifecycleEvent::ReportRejected { reason })
            .await?;
        self.notify(origin, messages::report_failed()).await;
        Ok(stage)
    }

    async fn transition(&self, message_id: &str, event: LifecycleEvent) -> Result<Stage, AppError> {
        let stage = self.store.apply(message_id, event, self.clock.now()).await?;
        info!(message_id = %message_id, stage = ?stage, "Proposal advanced");
        Ok(stage)
    }

    async fn notify(&self, origin: &MessageRef, text: String) {
        if let Err(e) = self.notifier.reply(origin, &text).await {
            warn!(message_id = %origin.message_id, error = %e, "Failed to deliver reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Report, TxHash};
    use crate::clock::TokioClock;
    use crate::dao::{sample_entry, RegistryEntry};
    use crate::oracle::{OracleRequest, TallyResult};
    use crate::pipeline::proposal::sample_proposal;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Clone, Copy)]
    enum TallyBehavior {
        Resolve,
        Fail,
        Hang,
    }

    struct FakeOracle {
        submit_fails: bool,
        tally: TallyBehavior,
        submitted: Mutex<Vec<OracleRequest>>,
        waited: Mutex<Vec<RequestId>>,
    }

    impl FakeOracle {
        fn new(submit_fails: bool, tally: TallyBehavior) -> Arc<Self> {
            Arc::new(Self {
                submit_fails,
                tally,
                submitted: Mutex::new(Vec::new()),
                waited: Mutex::new(Vec::new()),
            })
        }

        fn submitted(&self) -> Vec<OracleRequest> {
            self.submitted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OracleClient for FakeOracle {
        async fn submit(&self, request: &OracleRequest) -> Result<RequestId, AppError> {
            self.submitted.lock().unwrap().push(request.clone());
            if self.submit_fails {
                Err(AppError::Oracle("node refused request".into()))
            } else {
                Ok(RequestId("dr-1".into()))
            }
        }

        async fn await_result(&self, request_id: &RequestId) -> Result<TallyResult, AppError> {
            self.waited.lock().unwrap().push(request_id.clone());
            match self.tally {
                TallyBehavior::Resolve => Ok(TallyResult {
                    request_id: request_id.clone(),
                    payload: vec![1, 0],
                    resolved_at: chrono::Utc::now(),
                }),
                TallyBehavior::Fail => Err(AppError::Oracle("insufficient consensus".into())),
                TallyBehavior::Hang => std::future::pending().await,
            }
        }
    }

    struct FakeReporter {
        succeed: bool,
        calls: Mutex<Vec<(String, RequestId, Duration)>>,
    }

    impl FakeReporter {
        fn new(succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                succeed,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, RequestId, Duration)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OutcomeReporter for FakeReporter {
        async fn report(
            &self,
            dao: &RegistryEntry,
            request_id: &RequestId,
            execution_delay: Duration,
        ) -> Result<Report, AppError> {
            self.calls
                .lock()
                .unwrap()
                .push((dao.name.clone(), request_id.clone(), execution_delay));
            if self.succeed {
                Ok(Report {
                    transaction_hash: TxHash("0xAA".into()),
                    payload: b"P".to_vec(),
                })
            } else {
                Err(AppError::Chain("queue rejected container".into()))
            }
        }
    }

    struct FakeExecutor {
        tx: Option<&'static str>,
        calls: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl FakeExecutor {
        fn new(tx: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                tx,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, Vec<u8>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OutcomeExecutor for FakeExecutor {
        async fn execute(&self, dao: &RegistryEntry, payload: &[u8]) -> Result<TxHash, AppError> {
            self.calls
                .lock()
                .unwrap()
                .push((dao.name.clone(), payload.to_vec()));
            match self.tx {
                Some(tx) => Ok(TxHash(tx.into())),
                None => Err(AppError::Chain("execution reverted".into())),
            }
        }
    }

    struct RecordingNotifier {
        fail: bool,
        texts: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn texts(&self) -> Vec<String> {
            self.texts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn reply(&self, _origin: &MessageRef, text: &str) -> Result<(), AppError> {
            self.texts.lock().unwrap().push(text.to_string());
            if self.fail {
                Err(AppError::Notification("channel deleted".into()))
            } else {
                Ok(())
            }
        }
    }

    struct Harness {
        orchestrator: Arc<ProposalOrchestrator>,
        notifier: Arc<RecordingNotifier>,
        store: Arc<ProposalStore>,
        clock: Arc<TokioClock>,
    }

    fn harness_with(
        oracle: Arc<FakeOracle>,
        reporter: Arc<FakeReporter>,
        executor: Arc<FakeExecutor>,
        settings: Settings,
        notifier_fails: bool,
    ) -> Harness {
        let notifier = Arc::new(RecordingNotifier {
            fail: notifier_fails,
            texts: Mutex::new(Vec::new()),
        });
        let clock = Arc::new(TokioClock::new());
        let store = Arc::new(ProposalStore::new());
        let orchestrator = Arc::new(ProposalOrchestrator::new(
            Collaborators {
                oracle,
                reporter,
                executor,
                notifier: notifier.clone(),
                clock: clock.clone(),
            },
            store.clone(),
            &settings,
        ));
        Harness {
            orchestrator,
            notifier,
            store,
            clock,
        }
    }

    fn harness(
        oracle: Arc<FakeOracle>,
        reporter: Arc<FakeReporter>,
        executor: Arc<FakeExecutor>,
    ) -> Harness {
        harness_with(oracle, reporter, executor, Settings::default(), false)
    }

    fn binding(grace_secs: u64) -> Arc<DaoBinding> {
        Arc::new(DaoBinding {
            guild_id: "guild-1".to_string(),
            dao: sample_entry("pizza"),
            grace_period: Duration::from_secs(grace_secs),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_triggers_single_submission() {
        let oracle = FakeOracle::new(false, TallyBehavior::Resolve);
        let h = harness(oracle.clone(), FakeReporter::new(true), FakeExecutor::new(Some("0xBB")));
        let deadline = h.clock.now() + chrono::Duration::seconds(1000);

        let handle = h
            .orchestrator
            .accept(sample_proposal("m1", deadline), binding(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(999)).await;
        assert!(oracle.submitted().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        let submitted = oracle.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].channel_id, "channel-1");
        assert_eq!(submitted[0].message_id, "m1");

        assert_eq!(handle.await.unwrap(), Stage::Executed);
        assert_eq!(oracle.submitted().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_deadline_fires_immediately() {
        let oracle = FakeOracle::new(false, TallyBehavior::Resolve);
        let h = harness(oracle.clone(), FakeReporter::new(true), FakeExecutor::new(Some("0xBB")));
        let deadline = h.clock.now() - chrono::Duration::seconds(500);

        let _handle = h
            .orchestrator
            .accept(sample_proposal("m1", deadline), binding(60))
            .await
            .unwrap();

        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(oracle.submitted().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_then_execute_after_grace() {
        let reporter = FakeReporter::new(true);
        let executor = FakeExecutor::new(Some("0xBB"));
        let h = harness(
            FakeOracle::new(false, TallyBehavior::Resolve),
            reporter.clone(),
            executor.clone(),
        );
        let deadline = h.clock.now();

        let handle = h
            .orchestrator
            .accept(sample_proposal("m1", deadline), binding(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(
            reporter.calls(),
            vec![("pizza".to_string(), RequestId("dr-1".into()), Duration::from_secs(60))]
        );
        assert!(executor.calls().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(executor.calls(), vec![("pizza".to_string(), b"P".to_vec())]);

        assert_eq!(handle.await.unwrap(), Stage::Executed);
        assert_eq!(executor.calls().len(), 1);

        let texts = h.notifier.texts();
        assert_eq!(texts.len(), 3);
        assert!(texts[0]
            .starts_with("Received a request for creating a proposal with message_id='m1'"));
        assert_eq!(texts[1], messages::reported("dr-1", "0xAA"));
        assert_eq!(
            texts[2],
            "The proposal has been executed in Ethereum transaction: \
             https://rinkeby.etherscan.io/tx/0xBB"
        );

        let record = h.store.get("m1").await.unwrap();
        assert_eq!(record.report_tx.as_deref(), Some("0xAA"));
        assert_eq!(record.execution_tx.as_deref(), Some("0xBB"));
        let stages: Vec<Stage> = record.history.iter().map(|t| t.to).collect();
        assert_eq!(
            stages,
            vec![
                Stage::RequestBuilt,
                Stage::RequestSubmitted,
                Stage::TallyPending,
                Stage::Reported,
                Stage::ExecutionPending,
                Stage::Executed,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_grace_period_comes_from_dao_binding() {
        let reporter = FakeReporter::new(true);
        let executor = FakeExecutor::new(Some("0xBB"));
        let h = harness(
            FakeOracle::new(false, TallyBehavior::Resolve),
            reporter.clone(),
            executor.clone(),
        );
        let started = tokio::time::Instant::now();

        let handle = h
            .orchestrator
            .accept(sample_proposal("m1", h.clock.now()), binding(300))
            .await
            .unwrap();

        assert_eq!(handle.await.unwrap(), Stage::Executed);
        assert_eq!(started.elapsed(), Duration::from_secs(300));
        assert_eq!(reporter.calls()[0].2, Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_failure_skips_execution() {
        let executor = FakeExecutor::new(Some("0xBB"));
        let h = harness(
            FakeOracle::new(false, TallyBehavior::Resolve),
            FakeReporter::new(false),
            executor.clone(),
        );
        let started = tokio::time::Instant::now();

        let handle = h
            .orchestrator
            .accept(sample_proposal("m1", h.clock.now()), binding(60))
            .await
            .unwrap();

        assert_eq!(handle.await.unwrap(), Stage::ReportFailed);
        // no grace timer was armed
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(executor.calls().is_empty());

        let texts = h.notifier.texts();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[1], messages::report_failed());

        let record = h.store.get("m1").await.unwrap();
        assert_eq!(record.stage, Stage::ReportFailed);
        assert_eq!(record.failure.as_deref(), Some("Chain error: queue rejected container"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_execution_failure_is_reported_distinctly() {
        let h = harness(
            FakeOracle::new(false, TallyBehavior::Resolve),
            FakeReporter::new(true),
            FakeExecutor::new(None),
        );

        let handle = h
            .orchestrator
            .accept(sample_proposal("m1", h.clock.now()), binding(60))
            .await
            .unwrap();

        assert_eq!(handle.await.unwrap(), Stage::ExecutionFailed);
        let texts = h.notifier.texts();
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[2], messages::execution_failed());
        assert!(!texts[2].contains("executed in Ethereum transaction"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_transaction_hash_counts_as_failure() {
        let h = harness(
            FakeOracle::new(false, TallyBehavior::Resolve),
            FakeReporter::new(true),
            FakeExecutor::new(Some("")),
        );

        let handle = h
            .orchestrator
            .accept(sample_proposal("m1", h.clock.now()), binding(60))
            .await
            .unwrap();

        assert_eq!(handle.await.unwrap(), Stage::ExecutionFailed);
        assert_eq!(h.notifier.texts().last().unwrap(), &messages::execution_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tally_failure_drops_without_reply() {
        let reporter = FakeReporter::new(true);
        let h = harness(
            FakeOracle::new(false, TallyBehavior::Fail),
            reporter.clone(),
            FakeExecutor::new(Some("0xBB")),
        );

        let handle = h
            .orchestrator
            .accept(sample_proposal("m1", h.clock.now()), binding(60))
            .await
            .unwrap();

        assert_eq!(handle.await.unwrap(), Stage::TallyFailed);
        assert!(reporter.calls().is_empty());
        assert_eq!(h.notifier.texts().len(), 1);

        let record = h.store.get("m1").await.unwrap();
        assert_eq!(record.failure.as_deref(), Some("Oracle error: insufficient consensus"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tally_timeout() {
        let mut settings = Settings::default();
        settings.oracle.tally_timeout = Duration::from_secs(120);
        settings.pipeline.notify_on_tally_failure = true;
        let h = harness_with(
            FakeOracle::new(false, TallyBehavior::Hang),
            FakeReporter::new(true),
            FakeExecutor::new(Some("0xBB")),
            settings,
            false,
        );
        let started = tokio::time::Instant::now();

        let handle = h
            .orchestrator
            .accept(sample_proposal("m1", h.clock.now()), binding(60))
            .await
            .unwrap();

        assert_eq!(handle.await.unwrap(), Stage::TallyFailed);
        assert_eq!(started.elapsed(), Duration::from_secs(120));

        let texts = h.notifier.texts();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[1], messages::tally_failed("dr-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_failure_stops_before_tally() {
        let oracle = FakeOracle::new(true, TallyBehavior::Resolve);
        let h = harness(oracle.clone(), FakeReporter::new(true), FakeExecutor::new(Some("0xBB")));

        let handle = h
            .orchestrator
            .accept(sample_proposal("m1", h.clock.now()), binding(60))
            .await
            .unwrap();

        assert_eq!(handle.await.unwrap(), Stage::SubmissionFailed);
        assert!(oracle.waited.lock().unwrap().is_empty());
        assert_eq!(h.notifier.texts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_message_rejected() {
        let h = harness(
            FakeOracle::new(false, TallyBehavior::Resolve),
            FakeReporter::new(true),
            FakeExecutor::new(Some("0xBB")),
        );
        let deadline = h.clock.now() + chrono::Duration::seconds(100);

        h.orchestrator
            .accept(sample_proposal("m1", deadline), binding(60))
            .await
            .unwrap();
        let again = h
            .orchestrator
            .accept(sample_proposal("m1", deadline), binding(60))
            .await;

        assert!(matches!(again, Err(AppError::Conflict(_))));
        assert_eq!(h.notifier.texts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_failures_do_not_stop_the_pipeline() {
        let h = harness_with(
            FakeOracle::new(false, TallyBehavior::Resolve),
            FakeReporter::new(true),
            FakeExecutor::new(Some("0xBB")),
            Settings::default(),
            true,
        );

        let handle = h
            .orchestrator
            .accept(sample_proposal("m1", h.clock.now()), binding(60))
            .await
            .unwrap();

        assert_eq!(handle.await.unwrap(), Stage::Executed);
        assert_eq!(h.notifier.texts().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_proposals_run_independently() {
        let oracle = FakeOracle::new(false, TallyBehavior::Resolve);
        let h = harness(oracle.clone(), FakeReporter::new(true), FakeExecutor::new(Some("0xBB")));

        let late = h
            .orchestrator
            .accept(
                sample_proposal("late", h.clock.now() + chrono::Duration::seconds(500)),
                binding(60),
            )
            .await
            .unwrap();
        let early = h
            .orchestrator
            .accept(
                sample_proposal("early", h.clock.now() + chrono::Duration::seconds(10)),
                binding(60),
            )
            .await
            .unwrap();

        assert_eq!(early.await.unwrap(), Stage::Executed);
        assert_eq!(h.store.get("late").await.unwrap().stage, Stage::Scheduled);
        assert_eq!(late.await.unwrap(), Stage::Executed);

        let order: Vec<String> = oracle.submitted().into_iter().map(|r| r.message_id).collect();
        assert_eq!(order, vec!["early", "late"]);
    }
}
