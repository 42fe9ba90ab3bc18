// ABOUTME: Linear-probe CIDR allocation from a single-token template.
// ABOUTME: Also derives the gateway (first usable host) of a subnet.

use ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use thiserror::Error;

/// The substitutable token in a CIDR template.
pub const CIDR_TOKEN: char = 'X';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CidrError {
    #[error("CIDR template '{0}' must contain exactly one 'X'")]
    InvalidTemplate(String),

    #[error("invalid IPv4 CIDR: {0}")]
    Invalid(String),

    #[error("CIDR {0} has no usable host address for a gateway")]
    NoUsableHost(String),
}

/// Check that a template carries exactly one substitution token.
pub fn validate_template(template: &str) -> Result<(), CidrError> {
    if template.matches(CIDR_TOKEN).count() == 1 {
        Ok(())
    } else {
        Err(CidrError::InvalidTemplate(template.to_string()))
    }
}

/// Pick the next CIDR from `template` that none of `existing` already uses.
///
/// Probing starts at `existing.len() + 1` and increments on every string
/// collision. Gaps below the starting point (left by subnets deleted out of
/// order) are never reused; the start only tracks history while subnets are
/// removed in creation order.
pub fn next_free_cidr<S: AsRef<str>>(template: &str, existing: &[S]) -> Result<String, CidrError> {
    validate_template(template)?;

    let mut counter = existing.len() + 1;
    loop {
        let candidate = template.replace(CIDR_TOKEN, &counter.to_string());
        if !existing.iter().any(|cidr| cidr.as_ref() == candidate) {
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// First usable host address of `cidr`, used as the subnet gateway.
pub fn gateway_address(cidr: &str) -> Result<Ipv4Addr, CidrError> {
    let net: Ipv4Net = cidr
        .parse()
        .map_err(|_| CidrError::Invalid(cidr.to_string()))?;

    if net.prefix_len() >= 31 {
        return Err(CidrError::NoUsableHost(cidr.to_string()));
    }

    net.hosts()
        .next()
        .ok_or_else(|| CidrError::NoUsableHost(cidr.to_string()))
}
