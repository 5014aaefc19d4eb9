use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::{Batch, BatchError, Quality};

/// One accepted, trimmed video URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlEntry(String);

impl UrlEntry {
    /// Validates a single URL without any host restriction.
    pub fn parse(raw: &str) -> Result<Self, InvalidReason> {
        let candidate = raw.trim();
        validate(candidate, &HostPolicy::Any)?;
        Ok(UrlEntry(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UrlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UrlEntry {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    Empty,
    Malformed,
    UnsupportedScheme,
    MissingHost,
    HostNotAllowed,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Empty => write!(f, "empty input"),
            InvalidReason::Malformed => write!(f, "not a valid absolute url"),
            InvalidReason::UnsupportedScheme => write!(f, "only http and https are supported"),
            InvalidReason::MissingHost => write!(f, "url has no host"),
            InvalidReason::HostNotAllowed => write!(f, "host is not on the allow list"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    DuplicateRejected,
    InvalidRejected(InvalidReason),
}

const YOUTUBE_PRESET: &str = "youtube";

/// Which hosts the registry accepts once a URL is syntactically valid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HostPolicy {
    #[default]
    Any,
    /// Exact host or any subdomain of a listed host.
    AllowList(Vec<String>),
}

impl HostPolicy {
    pub fn youtube() -> Self {
        HostPolicy::AllowList(vec!["youtube.com".to_string(), "youtu.be".to_string()])
    }

    /// Builds a policy from configured hosts; an empty list accepts any host.
    /// The name `youtube` stands for the YouTube hosts.
    pub fn from_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut expanded = Vec::new();
        for host in hosts {
            let host = host
                .as_ref()
                .trim()
                .trim_start_matches('.')
                .to_ascii_lowercase();
            match host.as_str() {
                "" => {}
                YOUTUBE_PRESET => {
                    if let HostPolicy::AllowList(preset) = HostPolicy::youtube() {
                        expanded.extend(preset);
                    }
                }
                _ => expanded.push(host),
            }
        }
        let mut hosts = Vec::with_capacity(expanded.len());
        for host in expanded {
            if !hosts.contains(&host) {
                hosts.push(host);
            }
        }
        if hosts.is_empty() {
            HostPolicy::Any
        } else {
            HostPolicy::AllowList(hosts)
        }
    }

    pub fn allows(&self, host: &str) -> bool {
        match self {
            HostPolicy::Any => true,
            HostPolicy::AllowList(hosts) => {
                let host = host.to_ascii_lowercase();
                hosts.iter().any(|allowed| {
                    host == *allowed
                        || host
                            .strip_suffix(allowed.as_str())
                            .is_some_and(|prefix| prefix.ends_with('.'))
                })
            }
        }
    }
}

/// Ordered, duplicate-free set of submitted URLs.
///
/// Owned by whichever surface takes user input; the orchestrator never sees
/// it, only the [`Batch`] built from it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlRegistry {
    entries: Vec<UrlEntry>,
    seen: HashSet<String>,
    policy: HostPolicy,
}

impl UrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: HostPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn add(&mut self, raw: &str) -> AddOutcome {
        let candidate = raw.trim();
        if let Err(reason) = validate(candidate, &self.policy) {
            return AddOutcome::InvalidRejected(reason);
        }
        if self.seen.contains(candidate) {
            return AddOutcome::DuplicateRejected;
        }
        self.seen.insert(candidate.to_string());
        self.entries.push(UrlEntry(candidate.to_string()));
        AddOutcome::Inserted
    }

    /// Adds every non-blank line of pasted text, in order.
    pub fn add_many(&mut self, text: &str) -> Vec<(String, AddOutcome)> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| (line.to_string(), self.add(line)))
            .collect()
    }

    pub fn remove(&mut self, raw: &str) -> bool {
        let candidate = raw.trim();
        if !self.seen.remove(candidate) {
            return false;
        }
        self.entries.retain(|entry| entry.as_str() != candidate);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen.clear();
    }

    pub fn entries(&self) -> &[UrlEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_batch(&self, quality: Quality, output_dir: PathBuf) -> Result<Batch, BatchError> {
        Batch::new(self.entries.clone(), quality, output_dir)
    }
}

fn validate(candidate: &str, policy: &HostPolicy) -> Result<(), InvalidReason> {
    if candidate.is_empty() {
        return Err(InvalidReason::Empty);
    }
    let parsed = Url::parse(candidate).map_err(|_| InvalidReason::Malformed)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(InvalidReason::UnsupportedScheme);
    }
    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return Err(InvalidReason::MissingHost),
    };
    if !policy.allows(host) {
        return Err(InvalidReason::HostNotAllowed);
    }
    Ok(())
}
