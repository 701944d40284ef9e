//! Claim detection: decide whether a sentence asserts something that should
//! carry a citation, and say why.
//!
//! Detection is a fixed, ordered table of `(pattern, reason)` rules. The first
//! rule that matches decides the reason, so the table order is the tie-break
//! policy. Sentences that already carry an inline citation marker are never
//! flagged.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Why a sentence was flagged as needing a citation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimReason {
    #[serde(rename = "Studies claim")]
    StudiesClaim,
    #[serde(rename = "Research claims")]
    ResearchClaims,
    #[serde(rename = "Evidence cited")]
    EvidenceCited,
    #[serde(rename = "Passive claim")]
    PassiveClaim,
    #[serde(rename = "Attribution needed")]
    AttributionNeeded,
    #[serde(rename = "Established claim")]
    EstablishedClaim,
    #[serde(rename = "Statistical claim")]
    StatisticalClaim,
    #[serde(rename = "Data claim")]
    DataClaim,
    #[serde(rename = "Expert opinion")]
    ExpertOpinion,
    #[serde(rename = "Accepted belief")]
    AcceptedBelief,
    #[serde(rename = "Impact claim")]
    ImpactClaim,
    #[serde(rename = "Effect claim")]
    EffectClaim,
    #[serde(rename = "Percentage figure")]
    PercentageFigure,
    #[serde(rename = "Comparison claim")]
    ComparisonClaim,
    #[serde(rename = "Significant claim")]
    SignificantClaim,
    #[serde(rename = "Causation claim")]
    CausationClaim,
    #[serde(rename = "Correlation claim")]
    CorrelationClaim,
    #[serde(rename = "Comparative claim")]
    ComparativeClaim,
    #[serde(rename = "Quantitative claim")]
    QuantitativeClaim,
    #[serde(rename = "Population claim")]
    PopulationClaim,
    #[serde(rename = "Prevalence claim")]
    PrevalenceClaim,
    #[serde(rename = "Prior literature")]
    PriorLiterature,
    #[serde(rename = "Study type")]
    StudyType,
    #[serde(rename = "Risk/benefit claim")]
    RiskBenefitClaim,
    #[serde(rename = "Risk claim")]
    RiskClaim,
    #[serde(rename = "Definition claim")]
    DefinitionClaim,
    #[serde(rename = "Reference needed")]
    ReferenceNeeded,
    #[serde(rename = "Temporal trend")]
    TemporalTrend,
    #[serde(rename = "Growing evidence")]
    GrowingEvidence,
    #[serde(rename = "Numeric fact")]
    NumericFact,
    #[serde(rename = "Approximate figure")]
    ApproximateFigure,
}

impl ClaimReason {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ClaimReason::StudiesClaim => "Studies claim",
            ClaimReason::ResearchClaims => "Research claims",
            ClaimReason::EvidenceCited => "Evidence cited",
            ClaimReason::PassiveClaim => "Passive claim",
            ClaimReason::AttributionNeeded => "Attribution needed",
            ClaimReason::EstablishedClaim => "Established claim",
            ClaimReason::StatisticalClaim => "Statistical claim",
            ClaimReason::DataClaim => "Data claim",
            ClaimReason::ExpertOpinion => "Expert opinion",
            ClaimReason::AcceptedBelief => "Accepted belief",
            ClaimReason::ImpactClaim => "Impact claim",
            ClaimReason::EffectClaim => "Effect claim",
            ClaimReason::PercentageFigure => "Percentage figure",
            ClaimReason::ComparisonClaim => "Comparison claim",
            ClaimReason::SignificantClaim => "Significant claim",
            ClaimReason::CausationClaim => "Causation claim",
            ClaimReason::CorrelationClaim => "Correlation claim",
            ClaimReason::ComparativeClaim => "Comparative claim",
            ClaimReason::QuantitativeClaim => "Quantitative claim",
            ClaimReason::PopulationClaim => "Population claim",
            ClaimReason::PrevalenceClaim => "Prevalence claim",
            ClaimReason::PriorLiterature => "Prior literature",
            ClaimReason::StudyType => "Study type",
            ClaimReason::RiskBenefitClaim => "Risk/benefit claim",
            ClaimReason::RiskClaim => "Risk claim",
            ClaimReason::DefinitionClaim => "Definition claim",
            ClaimReason::ReferenceNeeded => "Reference needed",
            ClaimReason::TemporalTrend => "Temporal trend",
            ClaimReason::GrowingEvidence => "Growing evidence",
            ClaimReason::NumericFact => "Numeric fact",
            ClaimReason::ApproximateFigure => "Approximate figure",
        }
    }
}

impl fmt::Display for ClaimReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Default rule table, in priority order
const STANDARD_RULES: &[(&str, ClaimReason)] = &[
    (r"\bstudies (show|suggest|indicate|demonstrate|have shown)\b", ClaimReason::StudiesClaim),
    (r"\bresearch (shows|suggests|indicates|demonstrates|has shown)\b", ClaimReason::ResearchClaims),
    (r"\bevidence (suggests|indicates|shows|demonstrates)\b", ClaimReason::EvidenceCited),
    (r"\bit (has been|is) (shown|demonstrated|found|reported|established)\b", ClaimReason::PassiveClaim),
    (r"\baccording to\b", ClaimReason::AttributionNeeded),
    (r"\bhas been (proven|demonstrated|established|shown)\b", ClaimReason::EstablishedClaim),
    (r"\bstatistics (show|indicate|suggest)\b", ClaimReason::StatisticalClaim),
    (r"\bdata (shows|indicates|suggests|demonstrate)\b", ClaimReason::DataClaim),
    (r"\bexperts (argue|suggest|believe|claim|agree)\b", ClaimReason::ExpertOpinion),
    (r"\bis (widely|generally|commonly) (accepted|known|believed|recognized)\b", ClaimReason::AcceptedBelief),
    (r"\bhas a significant (effect|impact|influence)\b", ClaimReason::ImpactClaim),
    (r"\b(increases|decreases|improves|reduces|enhances|affects)\b", ClaimReason::EffectClaim),
    (r"\b\d+\s*%", ClaimReason::PercentageFigure),
    (r"\bcompared to\b", ClaimReason::ComparisonClaim),
    (r"\bsignificant(ly)?\b", ClaimReason::SignificantClaim),
    (r"\b(causes|caused by|leads? to|results? in|due to|attributed to)\b", ClaimReason::CausationClaim),
    (r"\b(correlated|associated|linked|related) with\b", ClaimReason::CorrelationClaim),
    (r"\b(positive|negative|strong|weak) (correlation|association|relationship)\b", ClaimReason::CorrelationClaim),
    (r"\b(higher|lower|greater|fewer|more|less) than\b", ClaimReason::ComparativeClaim),
    (r"\b\d+\s*(times|fold)\b", ClaimReason::QuantitativeClaim),
    (
        r"\b(most|many|majority of|nearly all|approximately|about)\b.*\b(people|patients|individuals|participants|adults|children|women|men)\b",
        ClaimReason::PopulationClaim,
    ),
    (r"\b(prevalence|incidence|proportion|rate) of\b", ClaimReason::PrevalenceClaim),
    (r"\b(previous|prior|earlier|recent|past) (studies|research|work|literature|findings)\b", ClaimReason::PriorLiterature),
    (r"\b(meta-analysis|systematic review|randomized|clinical trial|cohort study|longitudinal)\b", ClaimReason::StudyType),
    (r"\b(risk|benefit|efficacy|effectiveness|safety) of\b", ClaimReason::RiskBenefitClaim),
    (r"\b(reduces?|increases?) (the )?(risk|likelihood|chance|probability)\b", ClaimReason::RiskClaim),
    (r"\bis (defined|classified|characterized) as\b", ClaimReason::DefinitionClaim),
    (r"\brefers? to\b", ClaimReason::ReferenceNeeded),
    (r"\bover the (past|last) (decade|century|years?|decades?)\b", ClaimReason::TemporalTrend),
    (r"\b(growing|increasing|declining|rising) (evidence|trend|number|rate|concern)\b", ClaimReason::GrowingEvidence),
    (r"\b\d{1,3}(,\d{3})+ (people|cases|deaths|patients)\b", ClaimReason::NumericFact),
    (r"\bapproximately \d+\b", ClaimReason::ApproximateFigure),
];

/// Inline markers showing a sentence is already cited: `[12]`, `(Smith, 2020)`,
/// `^3`, `ibid.`, `op. cit.`
const EXISTING_CITATION: &str = r"\[\d+\]|\(\w[\w\s]*,?\s*\d{4}\)|\^\d+|ibid\.|op\.\s*cit\.";

/// A single detection rule
#[derive(Debug, Clone)]
pub struct ClaimRule {
    pattern: Regex,
    reason: ClaimReason,
}

impl ClaimRule {
    /// Compile a case-insensitive rule
    pub fn new(pattern: &str, reason: ClaimReason) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: case_insensitive(pattern)?,
            reason,
        })
    }

    /// The reason this rule assigns
    pub fn reason(&self) -> ClaimReason {
        self.reason
    }

    /// The rule's pattern source
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether the rule fires on a sentence
    pub fn matches(&self, sentence: &str) -> bool {
        self.pattern.is_match(sentence)
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Ordered rule table, first match wins
#[derive(Debug, Clone)]
pub struct ClaimDetector {
    rules: Vec<ClaimRule>,
    already_cited: Regex,
}

impl ClaimDetector {
    /// Build a detector from an explicit rule list
    pub fn with_rules(rules: Vec<ClaimRule>) -> Self {
        Self {
            rules,
            already_cited: case_insensitive(EXISTING_CITATION)
                .expect("citation marker pattern is valid"),
        }
    }

    /// The built-in rule table
    pub fn standard() -> &'static ClaimDetector {
        static STANDARD: OnceLock<ClaimDetector> = OnceLock::new();
        STANDARD.get_or_init(|| {
            let rules = STANDARD_RULES
                .iter()
                .map(|(pattern, reason)| {
                    ClaimRule::new(pattern, *reason).expect("built-in claim pattern is valid")
                })
                .collect();
            ClaimDetector::with_rules(rules)
        })
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[ClaimRule] {
        &self.rules
    }

    /// Whether the sentence already carries an inline citation marker
    pub fn is_already_cited(&self, sentence: &str) -> bool {
        self.already_cited.is_match(sentence)
    }

    /// Return why the sentence needs a citation, or `None`
    pub fn classify(&self, sentence: &str) -> Option<ClaimReason> {
        if self.is_already_cited(sentence) {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(sentence))
            .map(ClaimRule::reason)
    }
}

impl Default for ClaimDetector {
    fn default() -> Self {
        Self::standard().clone()
    }
}

/// Return a reason why the sentence needs a citation, using the built-in rules
pub fn citation_reason(sentence: &str) -> Option<ClaimReason> {
    ClaimDetector::standard().classify(sentence)
}

/// Return true if the sentence likely needs a citation
pub fn needs_citation(sentence: &str) -> bool {
    citation_reason(sentence).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_claims_flagged() {
        assert!(needs_citation("Studies show that exercise reduces cardiovascular risk."));
        assert!(needs_citation("The treatment was effective in 73% of patients."));
        assert!(needs_citation("The difference was statistically significant."));
        assert!(needs_citation("The group performed better compared to controls."));
        assert!(needs_citation("Smoking causes lung cancer."));
        assert!(needs_citation("Obesity is correlated with diabetes."));
        assert!(needs_citation("A meta-analysis of 50 studies found a strong effect."));
    }

    #[test]
    fn test_plain_statement_not_flagged() {
        assert_eq!(citation_reason("The sky is blue."), None);
    }

    #[test]
    fn test_already_cited_never_flagged() {
        for sentence in [
            "Exercise reduces cardiovascular risk [1].",
            "Studies confirm this (Smith, 2020).",
            "Studies show a 40% reduction in mortality^2.",
            "Studies show the same effect, ibid. p. 4.",
            "Research shows this causes harm, op. cit. 12.",
            "IBID. studies show it too.",
        ] {
            assert_eq!(citation_reason(sentence), None, "{sentence}");
        }
    }

    #[test]
    fn test_reason_labels() {
        assert_eq!(
            citation_reason("Efficacy was 95% in clinical trials."),
            Some(ClaimReason::PercentageFigure)
        );
        assert_eq!(
            citation_reason("Studies show that vaccines are effective."),
            Some(ClaimReason::StudiesClaim)
        );
        assert_eq!(
            citation_reason("Smoking causes lung cancer."),
            Some(ClaimReason::CausationClaim)
        );
        assert_eq!(
            citation_reason("Obesity is correlated with diabetes."),
            Some(ClaimReason::CorrelationClaim)
        );
        assert_eq!(
            citation_reason("The outbreak killed 12,500 people in the region."),
            Some(ClaimReason::NumericFact)
        );
        assert_eq!(
            citation_reason("Most adults in the region drink coffee daily."),
            Some(ClaimReason::PopulationClaim)
        );
        assert_eq!(
            citation_reason("A randomized trial was run in the spring."),
            Some(ClaimReason::StudyType)
        );
    }

    #[test]
    fn test_first_rule_wins() {
        // Matches both "studies show" and the percentage rule.
        assert_eq!(
            citation_reason("Studies show 40% of cases go unreported."),
            Some(ClaimReason::StudiesClaim)
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            citation_reason("ACCORDING TO the ministry, rainfall fell."),
            Some(ClaimReason::AttributionNeeded)
        );
    }

    #[test]
    fn test_custom_rule_order() {
        let detector = ClaimDetector::with_rules(vec![
            ClaimRule::new(r"\d+\s*%", ClaimReason::PercentageFigure).unwrap(),
            ClaimRule::new(r"\bstudies show\b", ClaimReason::StudiesClaim).unwrap(),
        ]);
        assert_eq!(
            detector.classify("Studies show 40% of cases go unreported."),
            Some(ClaimReason::PercentageFigure)
        );
        assert_eq!(detector.classify("Studies show 40% [3]."), None);
    }

    #[test]
    fn test_standard_table_order() {
        let rules = ClaimDetector::standard().rules();
        assert_eq!(rules.len(), STANDARD_RULES.len());
        assert_eq!(rules[0].reason(), ClaimReason::StudiesClaim);
        assert_eq!(rules.last().map(ClaimRule::reason), Some(ClaimReason::ApproximateFigure));
    }

    #[test]
    fn test_reason_serializes_as_label() {
        let json = serde_json::to_string(&ClaimReason::RiskBenefitClaim).unwrap();
        assert_eq!(json, "\"Risk/benefit claim\"");
        assert_eq!(ClaimReason::RiskBenefitClaim.to_string(), "Risk/benefit claim");
    }
}
