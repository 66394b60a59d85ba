// file: src/agent/risk.rs
// description: compiled regex rules for contractual risk detection
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    // Warranty disclaimers
    pub static ref NO_WARRANTY: Regex = Regex::new(
        r"(?i)\bno\s+warrant(?:y|ies)\b"
    ).expect("NO_WARRANTY regex is valid");

    // Payment fully deferred until delivery
    pub static ref FULL_PAYMENT: Regex = Regex::new(
        r"100\s*%"
    ).expect("FULL_PAYMENT regex is valid");

    pub static ref PAYMENT_TIMING: Regex = Regex::new(
        r"(?i)\b(?:completion|after)\b"
    ).expect("PAYMENT_TIMING regex is valid");

    // Intellectual property assignment
    pub static ref IP_CLAUSE: Regex = Regex::new(
        r"(?i)\bintellectual\s+property\b"
    ).expect("IP_CLAUSE regex is valid");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskFinding {
    NoWarranty,
    FullPaymentAfterCompletion,
    MissingIpClause,
}

impl RiskFinding {
    pub fn title(&self) -> &'static str {
        match self {
            Self::NoWarranty => "No warranty",
            Self::FullPaymentAfterCompletion => "Full payment after completion",
            Self::MissingIpClause => "Missing IP clause",
        }
    }
}

impl std::fmt::Display for RiskFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Flag only risks that are evidenced by the content itself; the absence
/// rule (missing IP clause) is the one exception and fires on empty input
/// too, so callers should hand in real document text.
pub fn assess(content: &str) -> Vec<RiskFinding> {
    let mut findings = Vec::new();

    if NO_WARRANTY.is_match(content) {
        findings.push(RiskFinding::NoWarranty);
    }

    if FULL_PAYMENT.is_match(content) && PAYMENT_TIMING.is_match(content) {
        findings.push(RiskFinding::FullPaymentAfterCompletion);
    }

    if !IP_CLAUSE.is_match(content) {
        findings.push(RiskFinding::MissingIpClause);
    }

    findings
}

/// Tool output: one risk title per line, nothing else.
pub fn render_findings(findings: &[RiskFinding]) -> String {
    if findings.is_empty() {
        return "No major risks identified".to_string();
    }

    findings
        .iter()
        .map(RiskFinding::title)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_SOW: &str = "The contractor warrants all deliverables for 12 months. \
        Payment is 50% upfront and 50% at the midpoint. \
        All intellectual property vests in the client upon payment.";

    #[test]
    fn test_clean_sow_has_no_findings() {
        let findings = assess(CLEAN_SOW);
        assert!(findings.is_empty());
        assert_eq!(render_findings(&findings), "No major risks identified");
    }

    #[test]
    fn test_no_warranty_detected() {
        let findings = assess("Deliverables are provided with NO WARRANTY of any kind. \
            Intellectual property transfers on signature.");
        assert_eq!(findings, vec![RiskFinding::NoWarranty]);
    }

    #[test]
    fn test_no_warranties_plural_detected() {
        let findings = assess("There are no warranties, express or implied. \
            Intellectual property transfers on signature.");
        assert_eq!(findings[0], RiskFinding::NoWarranty);
    }

    #[test]
    fn test_full_payment_after_completion_detected() {
        let findings = assess("100% of the fee is payable after completion of the engagement. \
            Intellectual property is assigned to the client.");
        assert_eq!(findings, vec![RiskFinding::FullPaymentAfterCompletion]);
    }

    #[test]
    fn test_percentage_without_timing_is_not_flagged() {
        let findings = assess("The contractor retains 100% ownership of pre-existing tools. \
            Intellectual property in new work vests in the client.");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_missing_ip_clause_detected() {
        let findings = assess("The contractor warrants the work. Payment is net 30.");
        assert_eq!(findings, vec![RiskFinding::MissingIpClause]);
    }

    #[test]
    fn test_findings_render_as_bare_titles() {
        let findings = assess("No warranty. 100% due after completion.");
        assert_eq!(findings.len(), 3);
        assert_eq!(
            render_findings(&findings),
            "No warranty\nFull payment after completion\nMissing IP clause"
        );
    }
}
