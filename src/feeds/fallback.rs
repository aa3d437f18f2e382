//! Synthetic fallback datasets
//!
//! Static records substituted when a live upstream fetch fails. Every record
//! is tagged `source: "Synthetic"` so callers can tell it apart from live
//! data. The OWASP Top-10 list also lives here; it is static by nature and
//! served without going through the cache.

use super::records::{
    AdvisoryRecord, CveStatistics, KevRecord, NvdRecord, OwaspEntry, SeverityCounts,
};

const SYNTHETIC: &str = "Synthetic";

/// Fallback NVD records
pub fn nvd_fallback() -> Vec<NvdRecord> {
    vec![
        NvdRecord {
            id: "CVE-2024-21762".to_string(),
            description: "Out-of-bounds write vulnerability in SSL VPN allows remote \
                          unauthenticated code execution via crafted requests."
                .to_string(),
            severity: "CRITICAL".to_string(),
            score: 9.8,
            published: "2024-02-09T00:00:00Z".to_string(),
            source: SYNTHETIC.to_string(),
        },
        NvdRecord {
            id: "CVE-2024-23897".to_string(),
            description: "Arbitrary file read through the CLI command parser can expose \
                          secrets and lead to remote code execution."
                .to_string(),
            severity: "HIGH".to_string(),
            score: 8.8,
            published: "2024-01-24T00:00:00Z".to_string(),
            source: SYNTHETIC.to_string(),
        },
        NvdRecord {
            id: "CVE-2024-27198".to_string(),
            description: "Authentication bypass in the web component allows creation of \
                          administrative accounts."
                .to_string(),
            severity: "CRITICAL".to_string(),
            score: 9.8,
            published: "2024-03-04T00:00:00Z".to_string(),
            source: SYNTHETIC.to_string(),
        },
    ]
}

/// Fallback CISA KEV records
pub fn kev_fallback() -> Vec<KevRecord> {
    vec![
        KevRecord {
            cve_id: "CVE-2023-4966".to_string(),
            vendor_project: "Citrix".to_string(),
            product: "NetScaler ADC and Gateway".to_string(),
            vulnerability_name: "Citrix NetScaler Buffer Overflow Vulnerability".to_string(),
            date_added: "2023-10-18".to_string(),
            short_description: "Session token leakage enabling session hijacking.".to_string(),
            required_action: "Apply mitigations per vendor instructions.".to_string(),
            source: SYNTHETIC.to_string(),
        },
        KevRecord {
            cve_id: "CVE-2024-3400".to_string(),
            vendor_project: "Palo Alto Networks".to_string(),
            product: "PAN-OS".to_string(),
            vulnerability_name: "PAN-OS Command Injection Vulnerability".to_string(),
            date_added: "2024-04-12".to_string(),
            short_description: "Command injection in GlobalProtect allows root-level remote \
                                code execution."
                .to_string(),
            required_action: "Apply vendor patches or disable device telemetry.".to_string(),
            source: SYNTHETIC.to_string(),
        },
    ]
}

/// Fallback GitHub advisory records
pub fn github_fallback() -> Vec<AdvisoryRecord> {
    vec![
        AdvisoryRecord {
            id: "GHSA-jfh8-c2jp-5v3q".to_string(),
            cve_id: "CVE-2021-44228".to_string(),
            severity: "CRITICAL".to_string(),
            summary: "Remote code execution in log message lookup substitution".to_string(),
            description: "JNDI features used in configuration and log messages do not \
                          protect against attacker-controlled endpoints."
                .to_string(),
            published: "2021-12-10T00:00:00Z".to_string(),
            updated: "2022-01-07T00:00:00Z".to_string(),
            ecosystem: "maven".to_string(),
            package: "org.apache.logging.log4j:log4j-core".to_string(),
            source: SYNTHETIC.to_string(),
        },
        AdvisoryRecord {
            id: "GHSA-c3h9-896r-86jm".to_string(),
            cve_id: "CVE-2024-28863".to_string(),
            severity: "MEDIUM".to_string(),
            summary: "Denial of service while parsing a tar file".to_string(),
            description: "Missing folder count limits allow memory exhaustion via crafted \
                          archives."
                .to_string(),
            published: "2024-03-21T00:00:00Z".to_string(),
            updated: "2024-03-22T00:00:00Z".to_string(),
            ecosystem: "npm".to_string(),
            package: "tar".to_string(),
            source: SYNTHETIC.to_string(),
        },
    ]
}

/// Fallback CVE statistics
pub fn stats_fallback() -> CveStatistics {
    CveStatistics {
        total: 100,
        by_severity: SeverityCounts {
            critical: 12,
            high: 31,
            medium: 42,
            low: 9,
            unknown: 6,
        },
        recent_30_days: 37,
        avg_cvss: 6.4,
        source: SYNTHETIC.to_string(),
    }
}

/// The static OWASP Top-10 (2021) list
pub fn owasp_top10() -> Vec<OwaspEntry> {
    let entries = [
        (
            "A01:2021",
            "Broken Access Control",
            "Restrictions on what authenticated users are allowed to do are often not \
             properly enforced.",
        ),
        (
            "A02:2021",
            "Cryptographic Failures",
            "Failures related to cryptography which often lead to exposure of sensitive \
             data.",
        ),
        (
            "A03:2021",
            "Injection",
            "User-supplied data is not validated, filtered, or sanitized by the \
             application.",
        ),
        (
            "A04:2021",
            "Insecure Design",
            "Missing or ineffective control design, distinct from implementation defects.",
        ),
        (
            "A05:2021",
            "Security Misconfiguration",
            "Missing appropriate security hardening across any part of the application \
             stack.",
        ),
        (
            "A06:2021",
            "Vulnerable and Outdated Components",
            "Using components with known vulnerabilities or out-of-date software.",
        ),
        (
            "A07:2021",
            "Identification and Authentication Failures",
            "Confirmation of the user's identity, authentication, and session management \
             is handled incorrectly.",
        ),
        (
            "A08:2021",
            "Software and Data Integrity Failures",
            "Code and infrastructure that do not protect against integrity violations.",
        ),
        (
            "A09:2021",
            "Security Logging and Monitoring Failures",
            "Insufficient logging and monitoring to detect and respond to breaches.",
        ),
        (
            "A10:2021",
            "Server-Side Request Forgery",
            "The application fetches a remote resource without validating the \
             user-supplied URL.",
        ),
    ];

    entries
        .into_iter()
        .map(|(id, name, description)| OwaspEntry {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_are_nonempty_and_tagged_synthetic() {
        assert!(!nvd_fallback().is_empty());
        assert!(!kev_fallback().is_empty());
        assert!(!github_fallback().is_empty());

        assert!(nvd_fallback().iter().all(|r| r.source == "Synthetic"));
        assert!(kev_fallback().iter().all(|r| r.source == "Synthetic"));
        assert!(github_fallback().iter().all(|r| r.source == "Synthetic"));
        assert_eq!(stats_fallback().source, "Synthetic");
    }

    #[test]
    fn test_stats_fallback_is_internally_consistent() {
        let stats = stats_fallback();
        assert_eq!(stats.by_severity.total(), stats.total);
        assert!(stats.recent_30_days <= stats.total);
    }

    #[test]
    fn test_owasp_list_has_ten_entries() {
        let list = owasp_top10();
        assert_eq!(list.len(), 10);
        assert_eq!(list[0].id, "A01:2021");
        assert_eq!(list[9].id, "A10:2021");
    }

    #[test]
    fn test_fallbacks_are_deterministic() {
        assert_eq!(nvd_fallback(), nvd_fallback());
        assert_eq!(owasp_top10(), owasp_top10());
    }
}
