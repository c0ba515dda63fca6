use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vectormap_types::{AttackOutcome, AttackResults, HostAttackResults, HostRecord};

use crate::traits::{AttackProbe, ProbeError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Hosts probed at the same time.
    pub max_parallel_hosts: usize,
    /// Upper bound for all probes against one host. Zero disables it.
    pub host_timeout: Duration,
    /// Upper bound for a single probe run. Zero disables it.
    pub probe_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_parallel_hosts: 16,
            host_timeout: Duration::ZERO,
            probe_timeout: Duration::from_secs(30),
        }
    }
}

pub struct ProbeEngine;

impl ProbeEngine {
    /// Run every applicable probe against every open port of `hosts`.
    ///
    /// Hosts run in parallel, bounded by `max_parallel_hosts`; probes within
    /// a host run one after another. Probe failures are recorded as failed
    /// outcomes. On cancellation the outcomes gathered so far are returned.
    pub async fn run(
        hosts: &[HostRecord],
        probes: Vec<Arc<dyn AttackProbe>>,
        config: &ProbeConfig,
        cancel: CancellationToken,
    ) -> AttackResults {
        let mut results = AttackResults::new();
        if hosts.is_empty() || probes.is_empty() {
            debug!(
                hosts = hosts.len(),
                probes = probes.len(),
                "nothing to probe"
            );
            return results;
        }

        let parallel = config.max_parallel_hosts.clamp(1, hosts.len());
        info!(
            hosts = hosts.len(),
            probes = probes.len(),
            parallel,
            host_timeout_ms = config.host_timeout.as_millis(),
            "probing hosts"
        );

        let probes: Arc<[Arc<dyn AttackProbe>]> = probes.into();
        let semaphore = Arc::new(Semaphore::new(parallel));
        let mut join_set: JoinSet<(IpAddr, HostAttackResults)> = JoinSet::new();

        for host in hosts {
            let host = host.clone();
            let probes = Arc::clone(&probes);
            let semaphore = Arc::clone(&semaphore);
            let config = config.clone();

            join_set.spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        warn!(host = %host.ip, error = %e, "semaphore acquire failed");
                        return (host.ip, HostAttackResults::new());
                    }
                };
                let outcomes = probe_host(&host, &probes, &config).await;
                (host.ip, outcomes)
            });
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    join_set.abort_all();
                    // Keep hosts that finished before the abort landed
                    while let Some(joined) = join_set.join_next().await {
                        if let Ok((ip, outcomes)) = joined {
                            store(&mut results, ip, outcomes);
                        }
                    }
                    info!(hosts_done = results.len(), "probing cancelled");
                    break;
                }
                joined = join_set.join_next() => {
                    match joined {
                        Some(Ok((ip, outcomes))) => store(&mut results, ip, outcomes),
                        Some(Err(e)) => warn!(error = %e, "host probe task failed"),
                        None => break,
                    }
                }
            }
        }

        results
    }
}

fn store(results: &mut AttackResults, ip: IpAddr, outcomes: HostAttackResults) {
    if !outcomes.is_empty() {
        results.insert(ip, outcomes);
    }
}

/// Probe one host, bounded by the host timeout.
///
/// Outcomes recorded before the timeout fires are kept.
async fn probe_host(
    host: &HostRecord,
    probes: &[Arc<dyn AttackProbe>],
    config: &ProbeConfig,
) -> HostAttackResults {
    let mut outcomes = HostAttackResults::new();

    if config.host_timeout.is_zero() {
        probe_host_inner(host, probes, config, &mut outcomes).await;
    } else if tokio::time::timeout(
        config.host_timeout,
        probe_host_inner(host, probes, config, &mut outcomes),
    )
    .await
    .is_err()
    {
        info!(
            host = %host.ip,
            timeout_ms = config.host_timeout.as_millis(),
            recorded = outcomes.len(),
            "host timed out"
        );
    }

    outcomes
}

async fn probe_host_inner(
    host: &HostRecord,
    probes: &[Arc<dyn AttackProbe>],
    config: &ProbeConfig,
    outcomes: &mut HostAttackResults,
) {
    for port in host.open_ports() {
        for probe in probes.iter().filter(|p| p.applies_to(port)) {
            let outcome = match run_probe(probe.as_ref(), host.ip, port.port, config).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    debug!(
                        host = %host.ip,
                        port = port.port,
                        attack_type = probe.attack_type(),
                        error = %e,
                        "probe failed"
                    );
                    AttackOutcome::failed(e.to_string())
                }
            };
            record(outcomes, probe.attack_type(), outcome);
        }
    }
}

async fn run_probe(
    probe: &dyn AttackProbe,
    ip: IpAddr,
    port: u16,
    config: &ProbeConfig,
) -> Result<AttackOutcome, ProbeError> {
    if config.probe_timeout.is_zero() {
        return probe.run(ip, port).await;
    }
    tokio::time::timeout(config.probe_timeout, probe.run(ip, port))
        .await
        .map_err(|_| ProbeError::Timeout {
            host: ip.to_string(),
        })?
}

/// Merge an outcome for `attack_type` into the host map. A success is never
/// replaced by a failure; failures accumulate their errors.
fn record(outcomes: &mut HostAttackResults, attack_type: &str, outcome: AttackOutcome) {
    match outcomes.get_mut(attack_type) {
        None => {
            outcomes.insert(attack_type.to_string(), outcome);
        }
        Some(existing) if existing.success => {}
        Some(existing) if outcome.success => *existing = outcome,
        Some(existing) => existing.errors.extend(outcome.errors),
    }
}
