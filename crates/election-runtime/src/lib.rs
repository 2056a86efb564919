//! # Election Runtime
//!
//! Wires the election crates into one process.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, `EV_CONFIG` file, environment)
//! 2. Build the election store and import the voter roll, if configured
//! 3. Build the OTP and ledger services over the store
//! 4. Start the expired-challenge sweep
//! 5. Serve HTTP until shutdown

pub mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use ev_01_otp_auth::{
    sweep_task, ChallengeStore, InMemoryChallengeStore, LogDelivery, OtpAuthService, OtpSecret,
};
use ev_02_vote_ledger::VoteLedgerService;
use ev_03_election_store::{import_seed, load_seed_file, ImportReport, InMemoryElectionStore};
use ev_04_api_gateway::{ElectionConfig, ElectionGateway};
use shared_types::{SystemTimeSource, TimeSource};
use tracing::{info, warn};

/// A fully wired election service.
pub struct ElectionRuntime {
    config: ElectionConfig,
    store: Arc<InMemoryElectionStore>,
    challenges: Arc<dyn ChallengeStore>,
    clock: Arc<dyn TimeSource>,
    gateway: ElectionGateway,
}

impl ElectionRuntime {
    /// Build every component from `config`.
    pub fn new(config: ElectionConfig) -> Result<Self> {
        let clock: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
        let store = Arc::new(InMemoryElectionStore::new());
        let challenges: Arc<dyn ChallengeStore> =
            Arc::new(InMemoryChallengeStore::new(config.otp.max_entries));

        let secret_bytes = config
            .otp
            .secret_bytes()
            .context("failed to decode OTP secret")?;
        anyhow::ensure!(
            secret_bytes.iter().any(|b| *b != 0),
            "OTP HMAC secret is unset; load configuration through config::load_config"
        );
        let secret = OtpSecret::new(&secret_bytes).context("failed to key OTP MAC")?;

        let otp = OtpAuthService::new(
            store.clone(),
            Arc::clone(&challenges),
            Arc::new(LogDelivery),
            Arc::clone(&clock),
            secret,
            config.otp_config(),
        );
        let ledger =
            VoteLedgerService::with_retry(store.clone(), Arc::clone(&clock), config.retry_policy());

        let gateway = ElectionGateway::new(config.clone(), Arc::new(otp), Arc::new(ledger))
            .context("failed to build HTTP gateway")?;

        Ok(Self {
            config,
            store,
            challenges,
            clock,
            gateway,
        })
    }

    /// Import the configured voter roll. Returns `None` if none is configured.
    pub async fn import_roll(&self) -> Result<Option<ImportReport>> {
        let Some(path) = &self.config.seed_file else {
            warn!("No seed file configured; starting with an empty voter roll");
            return Ok(None);
        };

        let seed = load_seed_file(path)
            .with_context(|| format!("failed to load seed file {}", path.display()))?;
        let report = import_seed(self.store.as_ref(), &seed).await;
        for row in &report.errors {
            warn!(row = row.row, code = ?row.error_code, "{}", row.message);
        }
        Ok(Some(report))
    }

    pub fn store(&self) -> Arc<InMemoryElectionStore> {
        Arc::clone(&self.store)
    }

    /// Run until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.import_roll().await?;

        info!(
            voters = self.store.voter_count(),
            candidates = self.store.candidate_count(),
            mode = ?self.config.mode,
            "Election runtime ready"
        );

        let sweeper = tokio::spawn(sweep_task(
            Arc::clone(&self.challenges),
            Arc::clone(&self.clock),
            self.config.otp.sweep_interval,
        ));

        let result = self.gateway.serve(shutdown).await;
        sweeper.abort();
        result.context("HTTP gateway failed")
    }
}
