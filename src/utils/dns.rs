//! Mail-exchange resolution for candidate domains.
//!
//! A missing MX record is a normal outcome here, not a fault: every lookup
//! failure collapses to an empty record list and the caller decides what
//! that means for the address being verified.

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::MailExchange;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::net::{IpAddr, SocketAddr};
use trust_dns_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::TokioAsyncResolver;

const DNS_PORT: u16 = 53;

/// Seam between the orchestrator and DNS so tests can substitute lookups.
pub trait MxLookup: Send + Sync {
    /// Resolves the mail exchange hosts for `domain`, sorted ascending by
    /// priority (stable on ties). Empty when the domain has no MX records
    /// or the lookup fails.
    fn lookup_mx<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, Vec<MailExchange>>;
}

/// The production resolver, backed by trust-dns.
pub struct MxResolver {
    resolver: TokioAsyncResolver,
}

impl MxResolver {
    /// Builds a resolver from the configured DNS servers, falling back to
    /// the system configuration when none are set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let resolver = if config.dns_servers.is_empty() {
            TokioAsyncResolver::tokio_from_system_conf()?
        } else {
            let mut resolver_config = ResolverConfig::new();
            for server in &config.dns_servers {
                let ip: IpAddr = server.parse().map_err(|e| {
                    AppError::Initialization(format!("Invalid DNS server address '{server}': {e}"))
                })?;
                let socket_addr = SocketAddr::new(ip, DNS_PORT);
                resolver_config.add_name_server(NameServerConfig::new(socket_addr, Protocol::Udp));
            }
            let mut opts = ResolverOpts::default();
            opts.timeout = config.dns_timeout;
            TokioAsyncResolver::tokio(resolver_config, opts)
        };
        Ok(Self { resolver })
    }

    async fn resolve(&self, domain: &str) -> Vec<MailExchange> {
        match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => {
                let mut records: Vec<MailExchange> = lookup
                    .iter()
                    .map(|mx| MailExchange {
                        host: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
                        priority: mx.preference(),
                    })
                    .collect();
                sort_by_priority(&mut records);
                tracing::debug!(target: "dns_task", "Resolved {} MX record(s) for {}", records.len(), domain);
                records
            }
            Err(e) => {
                match e.kind() {
                    ResolveErrorKind::NoRecordsFound { .. } => {
                        tracing::debug!(target: "dns_task", "No MX records for {}", domain);
                    }
                    _ => {
                        tracing::warn!(target: "dns_task", "MX lookup for {} failed: {}", domain, e);
                    }
                }
                Vec::new()
            }
        }
    }
}

impl MxLookup for MxResolver {
    fn lookup_mx<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, Vec<MailExchange>> {
        self.resolve(domain).boxed()
    }
}

/// Ascending priority; sort is stable, so ties keep discovery order.
pub(crate) fn sort_by_priority(records: &mut [MailExchange]) {
    records.sort_by_key(|record| record.priority);
}
