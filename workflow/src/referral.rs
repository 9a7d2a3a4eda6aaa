//! Threshold-based auto-referral over recent violations.
//!
//! Rules are data, loaded once at startup from a JSON file or falling back
//! to the built-in set; evaluation is reactive only, driven by
//! [`StudentEvent::ViolationRecorded`].

use db::models::counseling_referral::{self, ReferralType};
use db::models::student_permit::UrgencyLevel;
use db::models::student_violation;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::actor::ActingUser;
use crate::error::WorkflowResult;
use crate::events::StudentEvent;

/// One auto-referral rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralRule {
    /// Referral fires once the windowed violation count reaches this.
    pub violation_threshold: u64,
    /// Trailing window, in calendar days, anchored at the triggering
    /// violation's date.
    pub time_period_days: i64,
    /// Violation-type name fragments; empty means every type counts.
    #[serde(default)]
    pub violation_type_filter: Vec<String>,
    pub urgency_level: UrgencyLevel,
    /// Assign the evaluating actor as counselor when one is present.
    #[serde(default)]
    pub auto_assign: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralRuleSet {
    pub rules: Vec<ReferralRule>,
}

impl ReferralRuleSet {
    /// The rule set the student-affairs office runs with when no file is
    /// configured.
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                ReferralRule {
                    violation_threshold: 5,
                    time_period_days: 30,
                    violation_type_filter: vec![],
                    urgency_level: UrgencyLevel::Urgent,
                    auto_assign: true,
                },
                ReferralRule {
                    violation_threshold: 3,
                    time_period_days: 30,
                    violation_type_filter: vec![],
                    urgency_level: UrgencyLevel::High,
                    auto_assign: false,
                },
                ReferralRule {
                    violation_threshold: 2,
                    time_period_days: 14,
                    violation_type_filter: vec!["pulang".to_owned()],
                    urgency_level: UrgencyLevel::Normal,
                    auto_assign: false,
                },
            ],
        }
    }

    pub async fn load(path: &str) -> Result<Self, std::io::Error> {
        let raw = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&raw).map_err(std::io::Error::other)
    }

    /// Loads the configured rule file, or the built-in set when none is
    /// configured.
    pub async fn from_config() -> Result<Self, std::io::Error> {
        // Copy the path out before awaiting so the config read guard is not
        // held across the file IO.
        let path = util::config::AppConfig::global().referral_rules_path.clone();
        match path {
            Some(path) => Self::load(&path).await,
            None => Ok(Self::builtin()),
        }
    }
}

pub struct ReferralEngine {
    db: DatabaseConnection,
    rules: ReferralRuleSet,
}

impl ReferralEngine {
    pub fn new(db: DatabaseConnection, rules: ReferralRuleSet) -> Self {
        Self { db, rules }
    }

    /// Evaluates the rule set against the event's student.
    ///
    /// The first matching rule wins. A student with an open violation
    /// referral (pending or in progress) is never referred again; completed
    /// and cancelled referrals do not suppress a new one. Returns the
    /// created referral, if any.
    pub async fn handle_event(
        &self,
        event: &StudentEvent,
        acting: Option<&ActingUser>,
    ) -> WorkflowResult<Option<counseling_referral::Model>> {
        let StudentEvent::ViolationRecorded {
            student_id,
            violation_date,
            ..
        } = event;

        if counseling_referral::Model::has_open_violation_referral(&self.db, *student_id).await? {
            debug!(student_id, "open violation referral exists; skipping");
            return Ok(None);
        }

        for (index, rule) in self.rules.rules.iter().enumerate() {
            let count = student_violation::Model::count_active_in_window(
                &self.db,
                *student_id,
                *violation_date,
                rule.time_period_days,
                &rule.violation_type_filter,
            )
            .await?;

            if count < rule.violation_threshold {
                continue;
            }

            let assigned = match (rule.auto_assign, acting) {
                (true, Some(actor)) => Some(actor.id),
                _ => None,
            };

            let reason = format!(
                "Otomatis: {count} pelanggaran aktif dalam {} hari (ambang {}{})",
                rule.time_period_days,
                rule.violation_threshold,
                if rule.violation_type_filter.is_empty() {
                    String::new()
                } else {
                    format!(", jenis: {}", rule.violation_type_filter.join(", "))
                }
            );

            let referral = counseling_referral::Model::create(
                &self.db,
                *student_id,
                ReferralType::Violation,
                rule.urgency_level.clone(),
                &reason,
                assigned,
            )
            .await?;

            info!(
                student_id,
                referral_id = referral.id,
                rule_index = index,
                count,
                "auto-referral created"
            );
            return Ok(Some(referral));
        }

        Ok(None)
    }
}
