//! Poller - the periodic request/dispatch loop.
//!
//! Every tick the poller requests each registered variable in turn and
//! drains the dispatch queue right after each request, before moving on to
//! the next variable. Tracking is requested before camera state, so a
//! tracking sample is judged against the camera state of the previous tick.
//!
//! The poller owns the [`Session`] and the [`ReactionPolicy`]; nothing else
//! touches them while it runs. When it stops it hands the session back so
//! the caller can close it.

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::dispatch::{DispatchDecoder, DrainOutcome};
use crate::lifecycle::{ShutdownReason, ShutdownSender};
use crate::reaction::{Reaction, ReactionPolicy};
use crate::session::Session;
use crate::simconnect::SimConnectClient;
use crate::simvar::{RegistrationHandle, SimVarId};

/// Default interval between poll ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(350);

/// Poller configuration.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between ticks.
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Ticker for the poll loop.
///
/// The first tick fires one period from now, not immediately. Ticks missed
/// during a stall are dropped and the schedule stays on its original grid.
fn poll_ticker(period: Duration) -> tokio::time::Interval {
    let start = tokio::time::Instant::now() + period;
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The simulator sent `Quit`.
    Quit,
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub ticks: u64,
    pub samples: u64,
    pub corrections: u64,
    pub failed_requests: u64,
}

/// The poll loop.
pub struct Poller<C> {
    session: Session<C>,
    policy: ReactionPolicy,
    decoder: DispatchDecoder,
    variables: Vec<SimVarId>,
    config: PollerConfig,
    shutdown: ShutdownSender,
    stats: PollStats,
}

impl<C: SimConnectClient + 'static> Poller<C> {
    /// Create a poller over the variables in `registered`, in that order.
    pub fn new(
        session: Session<C>,
        policy: ReactionPolicy,
        decoder: DispatchDecoder,
        registered: &[RegistrationHandle],
        config: PollerConfig,
        shutdown: ShutdownSender,
    ) -> Self {
        Self {
            session,
            policy,
            decoder,
            variables: registered.iter().map(|handle| handle.id).collect(),
            config,
            shutdown,
            stats: PollStats::default(),
        }
    }

    pub fn stats(&self) -> PollStats {
        self.stats
    }

    pub fn policy(&self) -> &ReactionPolicy {
        &self.policy
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    /// Spawn the loop on the tokio runtime.
    ///
    /// The task resolves to the session once the loop stops.
    pub fn start(self, cancellation: CancellationToken) -> JoinHandle<Session<C>> {
        tokio::spawn(self.run(cancellation))
    }

    /// Tick until cancelled or the simulator quits.
    pub async fn run(mut self, cancellation: CancellationToken) -> Session<C> {
        info!(
            interval_ms = self.config.interval.as_millis() as u64,
            variables = self.variables.len(),
            "Poll loop started"
        );

        let mut ticker = poll_ticker(self.config.interval);

        loop {
            tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    debug!("Poll loop cancelled");
                    break;
                }
                tick = ticker.tick() => {
                    if self.poll_tick(tick.into_std()) == TickOutcome::Quit {
                        self.shutdown.notify(ShutdownReason::SimulatorQuit);
                        break;
                    }
                }
            }
        }

        let stats = self.stats;
        info!(
            ticks = stats.ticks,
            samples = stats.samples,
            corrections = stats.corrections,
            failed_requests = stats.failed_requests,
            "Poll loop stopped"
        );
        self.session
    }

    /// Run one tick: request and drain each variable in turn.
    pub fn poll_tick(&mut self, now: Instant) -> TickOutcome {
        self.stats.ticks += 1;

        for index in 0..self.variables.len() {
            let variable = self.variables[index];

            match self.session.request_data(variable) {
                Ok(request_id) => {
                    trace!(?variable, request_id = request_id.0, "Data requested");
                }
                Err(e) => {
                    self.stats.failed_requests += 1;
                    debug!(?variable, error = %e, "Data request failed");
                }
            }

            match self
                .decoder
                .drain(&mut self.session, &mut self.policy, now)
            {
                DrainOutcome::Quit => return TickOutcome::Quit,
                DrainOutcome::Delivered(reaction) => {
                    self.stats.samples += 1;
                    if matches!(reaction, Reaction::Corrected { .. }) {
                        self.stats.corrections += 1;
                    }
                }
                DrainOutcome::Quiescent => {}
            }
        }

        TickOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Arc;

    use crate::lifecycle::termination_channel;
    use crate::log::NoOpLogger;
    use crate::simconnect::protocol::{
        HEADER_SIZE, OBJECT_DATA_SIZE, RECV_ID_QUIT, RECV_ID_SIMOBJECT_DATA_BYTYPE,
    };
    use crate::simconnect::{DataSetFlag, DataType, SimConnectError, SimObjectType};

    /// Answers every data request with the current value of its variable.
    #[derive(Default)]
    struct EchoClient {
        values: HashMap<u32, f64>,
        queue: VecDeque<Vec<u8>>,
        quit_on_request: Option<usize>,
        requested: Vec<u32>,
        writes: Vec<f64>,
    }

    fn sample(define_id: u32, value: f64) -> Vec<u8> {
        let mut buf = Vec::new();
        for field in [OBJECT_DATA_SIZE as u32, 6, RECV_ID_SIMOBJECT_DATA_BYTYPE] {
            buf.extend_from_slice(&field.to_le_bytes());
        }
        for field in [1u32, 1, define_id, 0, 1, 1, 1] {
            buf.extend_from_slice(&field.to_le_bytes());
        }
        buf.extend_from_slice(&value.to_le_bytes());
        buf
    }

    fn quit() -> Vec<u8> {
        let mut buf = Vec::new();
        for field in [HEADER_SIZE as u32, 6, RECV_ID_QUIT] {
            buf.extend_from_slice(&field.to_le_bytes());
        }
        buf
    }

    impl SimConnectClient for EchoClient {
        fn open(&mut self, _app_name: &str) -> Result<(), SimConnectError> {
            Ok(())
        }

        fn add_to_data_definition(
            &mut self,
            _define_id: u32,
            _name: &str,
            _unit: &str,
            _data_type: DataType,
        ) -> Result<(), SimConnectError> {
            Ok(())
        }

        fn request_data_on_sim_object_type(
            &mut self,
            _request_id: u32,
            define_id: u32,
            _radius_meters: u32,
            _object_type: SimObjectType,
        ) -> Result<(), SimConnectError> {
            self.requested.push(define_id);
            if self.quit_on_request == Some(self.requested.len()) {
                self.queue.push_back(quit());
            } else if let Some(value) = self.values.get(&define_id) {
                self.queue.push_back(sample(define_id, *value));
            }
            Ok(())
        }

        fn get_next_dispatch(&mut self) -> Result<Option<Vec<u8>>, SimConnectError> {
            Ok(self.queue.pop_front())
        }

        fn set_data_on_sim_object(
            &mut self,
            _define_id: u32,
            _object_id: u32,
            _flags: DataSetFlag,
            _array_count: u32,
            data: &[u8],
        ) -> Result<(), SimConnectError> {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(data);
            self.writes.push(f64::from_le_bytes(bytes));
            Ok(())
        }

        fn close(&mut self) -> Result<(), SimConnectError> {
            Ok(())
        }
    }

    fn poller(client: EchoClient, shutdown: ShutdownSender) -> Poller<EchoClient> {
        let mut session = Session::new(client);
        session.try_open("test").unwrap();
        let handles = session.register_all().unwrap();
        let logger = Arc::new(NoOpLogger);
        Poller::new(
            session,
            ReactionPolicy::new(logger.clone()),
            DispatchDecoder::new(logger),
            &handles,
            PollerConfig::default(),
            shutdown,
        )
    }

    fn disabled_in_cockpit() -> EchoClient {
        EchoClient {
            values: HashMap::from([(0, 0.0), (1, 3.0)]),
            ..Default::default()
        }
    }

    #[test]
    fn test_tracking_requested_before_camera_state() {
        let (tx, _rx) = termination_channel();
        let mut poller = poller(EchoClient::default(), tx);

        poller.poll_tick(Instant::now());

        assert_eq!(poller.session().client().requested, vec![0, 1]);
    }

    #[test]
    fn test_camera_state_lags_one_tick() {
        let (tx, _rx) = termination_channel();
        let mut poller = poller(disabled_in_cockpit(), tx);
        let now = Instant::now();

        // Tracking is judged before this tick's camera sample arrives.
        assert_eq!(poller.poll_tick(now), TickOutcome::Continue);
        assert!(poller.session().client().writes.is_empty());
        assert_eq!(poller.policy().state().camera_state(), 3);

        poller.poll_tick(now);
        assert_eq!(poller.session().client().writes, vec![1.0]);

        let stats = poller.stats();
        assert_eq!(stats.ticks, 2);
        assert_eq!(stats.samples, 4);
        assert_eq!(stats.corrections, 1);
    }

    #[test]
    fn test_quit_ends_tick_early() {
        let (tx, _rx) = termination_channel();
        let client = EchoClient {
            quit_on_request: Some(1),
            ..disabled_in_cockpit()
        };
        let mut poller = poller(client, tx);

        assert_eq!(poller.poll_tick(Instant::now()), TickOutcome::Quit);
        // Camera state is never requested once the simulator quits.
        assert_eq!(poller.session().client().requested, vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_on_interval_until_cancelled() {
        let (tx, _rx) = termination_channel();
        let cancellation = CancellationToken::new();
        let handle = poller(EchoClient::default(), tx).start(cancellation.clone());

        // Ticks at 350 ms and 700 ms; the first tick is not immediate.
        tokio::time::sleep(Duration::from_millis(1000)).await;
        cancellation.cancel();

        let session = handle.await.unwrap();
        assert_eq!(session.client().requested.len(), 4);
        assert!(session.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_drops_ticks_missed_during_stall() {
        let base = tokio::time::Instant::now();
        let mut ticker = poll_ticker(DEFAULT_POLL_INTERVAL);
        assert_eq!(ticker.missed_tick_behavior(), MissedTickBehavior::Skip);

        // Stall past the 350 ms and 700 ms ticks.
        tokio::time::advance(Duration::from_millis(1000)).await;

        // One overdue tick fires at once, then the grid resumes at 1050 ms.
        ticker.tick().await;
        assert_eq!(base.elapsed(), Duration::from_millis(1000));
        ticker.tick().await;
        assert_eq!(base.elapsed(), Duration::from_millis(1050));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_reports_simulator_quit() {
        let (tx, rx) = termination_channel();
        let client = EchoClient {
            quit_on_request: Some(3),
            ..Default::default()
        };
        let handle = poller(client, tx).start(CancellationToken::new());

        assert_eq!(rx.wait().await, ShutdownReason::SimulatorQuit);
        let session = handle.await.unwrap();
        assert_eq!(session.client().requested.len(), 3);
    }
}
